//! Statement grammar.

use super::{string_value, ParseResult, ScriptParser};
use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::script::ast::{
    BinaryOperator, Expression, ForBinding, FunctionDeclaration, ImportDeclaration, ImportSpecifier,
    Pattern, Statement, SwitchCase, VarDeclaration,
};
use crate::script::token::TokenKind;
use crate::stream::{Position, Span};

/// Which declaration keyword introduced a declarator list.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Let,
    Const,
    Var,
}

impl<'src> ScriptParser<'src> {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_kind() {
            TokenKind::Semicolon => {
                let token = self.get();
                Ok(Statement::Empty { span: token.span })
            }
            TokenKind::Let => self.parse_declaration_statement(DeclKind::Let, false),
            TokenKind::Const => self.parse_declaration_statement(DeclKind::Const, false),
            TokenKind::Var => self.parse_declaration_statement(DeclKind::Var, false),
            TokenKind::LBrace => self.parse_block_statement(),
            TokenKind::If => self.parse_if(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_jump(TokenKind::Break),
            TokenKind::Continue => self.parse_jump(TokenKind::Continue),
            TokenKind::For => self.parse_for(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Function => self.parse_function(false),
            TokenKind::Export => self.parse_export(),
            TokenKind::Import => self.parse_import(),
            _ => self.parse_expression_statement(),
        }
    }

    /// Semicolons are optional: a statement may also end before `}`, at the
    /// end of input or at a line break.
    fn parse_terminator(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(());
        }
        if matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) || self.next_on_new_line() {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start_of_next();
        let expression = self.parse_expr()?;
        self.parse_terminator()?;
        Ok(Statement::Expression {
            expression,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn parse_declaration_statement(&mut self, kind: DeclKind, exported: bool) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let declarations = self.parse_declarators(kind)?;
        self.parse_terminator()?;
        Ok(make_declaration(kind, declarations, exported, self.span_from(start)))
    }

    fn parse_declarators(&mut self, kind: DeclKind) -> ParseResult<Vec<VarDeclaration>> {
        let mut declarations = Vec::new();
        loop {
            let start = self.start_of_next();
            let target = self.parse_binding_target()?;
            declarations.push(self.parse_declarator_rest(kind, start, target)?);
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(declarations);
            }
        }
    }

    fn parse_declarator_rest(
        &mut self,
        kind: DeclKind,
        start: Position,
        target: Pattern,
    ) -> ParseResult<VarDeclaration> {
        let init = if self.eat(TokenKind::Assignment).is_some() {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        if init.is_none() && (kind == DeclKind::Const || !matches!(target, Pattern::Identifier { .. })) {
            let kind = if kind == DeclKind::Const {
                ErrorKind::MissingConstInitializer
            } else {
                ErrorKind::TokenExpected("=".to_string())
            };
            let span = self.peek().span;
            return Err(Diagnostic::spanning(kind, span));
        }
        Ok(VarDeclaration {
            target,
            init,
            span: self.span_from(start),
        })
    }

    fn parse_function(&mut self, exported: bool) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let name = self.parse_binding_name()?;
        let (params, rest) = self.parse_parameter_list()?;
        let body = self.in_function_body(|p| p.parse_block_body())?;
        Ok(Statement::Function(FunctionDeclaration {
            name,
            params,
            rest,
            body,
            exported,
            span: self.span_from(start),
        }))
    }

    fn parse_export(&mut self) -> ParseResult<Statement> {
        let export = self.get();
        if self.nesting > 0 {
            return Err(Diagnostic::spanning(ErrorKind::NestedExport, export.span));
        }
        let statement = match self.peek_kind() {
            TokenKind::Const => self.parse_declaration_statement(DeclKind::Const, true)?,
            TokenKind::Function => self.parse_function(true)?,
            _ => {
                let span = self.peek().span;
                return Err(Diagnostic::spanning(ErrorKind::InvalidExport, span));
            }
        };
        // The export keyword belongs to the declaration's span.
        Ok(match statement {
            Statement::Const { declarations, span, .. } => Statement::Const {
                declarations,
                exported: true,
                span: export.span.to(span),
            },
            Statement::Function(mut func) => {
                func.span = export.span.to(func.span);
                Statement::Function(func)
            }
            other => other,
        })
    }

    /// `import { a, b as c } from "path"`
    fn parse_import(&mut self) -> ParseResult<Statement> {
        let import = self.get();
        if self.nesting > 0 {
            return Err(Diagnostic::spanning(ErrorKind::NestedImport, import.span));
        }
        self.expect(TokenKind::LBrace, "{")?;
        let mut specifiers = Vec::new();
        while self.peek_kind() != TokenKind::RBrace {
            let token = self.get();
            if !token.is_binding_name() {
                return Err(Diagnostic::spanning(ErrorKind::IdentifierExpected, token.span));
            }
            let alias = if self.eat(TokenKind::As).is_some() {
                self.parse_binding_name()?
            } else {
                token.text.clone()
            };
            specifiers.push(ImportSpecifier {
                name: token.text,
                alias,
                span: self.span_from(token.span.start),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "}")?;
        self.expect(TokenKind::From, "from")?;
        let path = self.expect(TokenKind::StringLiteral, "module path")?;
        let module = string_value(&path)?;
        self.parse_terminator()?;
        Ok(Statement::Import(ImportDeclaration {
            specifiers,
            module,
            span: self.span_from(import.span.start),
        }))
    }

    // ------------------------------------------------------------------------
    // Blocks and control flow
    // ------------------------------------------------------------------------

    fn parse_block_statement(&mut self) -> ParseResult<Statement> {
        let start = self.start_of_next();
        self.nesting += 1;
        let body = self.parse_block_body();
        self.nesting -= 1;
        Ok(Statement::Block {
            body: body?,
            span: self.span_from(start),
        })
    }

    /// `{ statement* }`
    pub(super) fn parse_block_body(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(TokenKind::LBrace, "{")?;
        let mut body = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    let span = self.peek().span;
                    return Err(Diagnostic::spanning(ErrorKind::TokenExpected("}".to_string()), span));
                }
                _ => body.push(self.parse_statement()?),
            }
        }
        self.get();
        Ok(body)
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let condition = self.parse_parenthesized_condition()?;
        let then_branch = Box::new(self.parse_nested_statement()?);
        let else_branch = if self.eat(TokenKind::Else).is_some() {
            Some(Box::new(self.parse_nested_statement()?))
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        })
    }

    fn parse_parenthesized_condition(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen, "(")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen, ")")?;
        Ok(condition)
    }

    /// A single-statement body of `if`, `else` or a loop. It is never at
    /// module top level, braced or not.
    fn parse_nested_statement(&mut self) -> ParseResult<Statement> {
        self.nesting += 1;
        let statement = self.parse_statement();
        self.nesting -= 1;
        statement
    }

    fn parse_loop_body(&mut self) -> ParseResult<Statement> {
        self.loop_depth += 1;
        let body = self.parse_nested_statement();
        self.loop_depth -= 1;
        body
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let condition = self.parse_parenthesized_condition()?;
        let body = Box::new(self.parse_loop_body()?);
        Ok(Statement::While {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_do_while(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let body = Box::new(self.parse_loop_body()?);
        self.expect(TokenKind::While, "while")?;
        let condition = self.parse_parenthesized_condition()?;
        self.eat(TokenKind::Semicolon);
        Ok(Statement::DoWhile {
            body,
            condition,
            span: self.span_from(start),
        })
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let value = if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) || self.next_on_new_line()
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.parse_terminator()?;
        Ok(Statement::Return {
            value,
            span: self.span_from(start),
        })
    }

    fn parse_jump(&mut self, kind: TokenKind) -> ParseResult<Statement> {
        let token = self.get();
        let allowed = match kind {
            TokenKind::Break => self.loop_depth > 0 || self.switch_depth > 0,
            _ => self.loop_depth > 0,
        };
        if !allowed {
            return Err(Diagnostic::spanning(
                ErrorKind::OutsideOfLoop(token.text.clone()),
                token.span,
            ));
        }
        self.parse_terminator()?;
        let span = self.span_from(token.span.start);
        Ok(match kind {
            TokenKind::Break => Statement::Break { span },
            _ => Statement::Continue { span },
        })
    }

    fn parse_throw(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let value = self.parse_expr()?;
        self.parse_terminator()?;
        Ok(Statement::Throw {
            value,
            span: self.span_from(start),
        })
    }

    fn parse_try(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let block = Box::new(self.parse_block_statement()?);
        let mut catch_param = None;
        let mut catch_block = None;
        if self.eat(TokenKind::Catch).is_some() {
            if self.eat(TokenKind::LParen).is_some() {
                catch_param = Some(self.parse_binding_target()?);
                self.expect(TokenKind::RParen, ")")?;
            }
            catch_block = Some(Box::new(self.parse_block_statement()?));
        }
        let finally_block = if self.eat(TokenKind::Finally).is_some() {
            Some(Box::new(self.parse_block_statement()?))
        } else {
            None
        };
        if catch_block.is_none() && finally_block.is_none() {
            let span = self.peek().span;
            return Err(Diagnostic::spanning(ErrorKind::CatchOrFinallyExpected, span));
        }
        Ok(Statement::Try {
            block,
            catch_param,
            catch_block,
            finally_block,
            span: self.span_from(start),
        })
    }

    fn parse_switch(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        let discriminant = self.parse_parenthesized_condition()?;
        self.expect(TokenKind::LBrace, "{")?;
        self.switch_depth += 1;
        self.nesting += 1;
        let cases = self.parse_switch_cases();
        self.nesting -= 1;
        self.switch_depth -= 1;
        let cases = cases?;
        self.expect(TokenKind::RBrace, "}")?;
        Ok(Statement::Switch {
            discriminant,
            cases,
            span: self.span_from(start),
        })
    }

    fn parse_switch_cases(&mut self) -> ParseResult<Vec<SwitchCase>> {
        let mut cases = Vec::new();
        let mut has_default = false;
        while self.peek_kind() != TokenKind::RBrace {
            let label = self.get();
            let test = match label.kind {
                TokenKind::Case => Some(self.parse_expr()?),
                TokenKind::Default if has_default => {
                    return Err(Diagnostic::spanning(ErrorKind::DuplicateDefaultClause, label.span));
                }
                TokenKind::Default => {
                    has_default = true;
                    None
                }
                _ => {
                    return Err(Diagnostic::spanning(
                        ErrorKind::TokenExpected("case".to_string()),
                        label.span,
                    ))
                }
            };
            self.expect(TokenKind::Colon, ":")?;
            let mut body = Vec::new();
            while !matches!(
                self.peek_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                body,
                span: self.span_from(label.span.start),
            });
        }
        Ok(cases)
    }

    // ------------------------------------------------------------------------
    // for / for-in / for-of
    // ------------------------------------------------------------------------

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let start = self.get().span.start;
        self.expect(TokenKind::LParen, "(")?;

        let decl_kind = match self.peek_kind() {
            TokenKind::Let => Some(DeclKind::Let),
            TokenKind::Const => Some(DeclKind::Const),
            TokenKind::Var => Some(DeclKind::Var),
            _ => None,
        };

        let init = if let Some(kind) = decl_kind {
            let decl_start = self.get().span.start;
            let target_start = self.start_of_next();
            let target = self.parse_binding_target()?;
            if matches!(self.peek_kind(), TokenKind::Of | TokenKind::In) {
                let binding = match kind {
                    DeclKind::Let => ForBinding::Let,
                    DeclKind::Const => ForBinding::Const,
                    DeclKind::Var => ForBinding::Var,
                };
                return self.parse_for_in_of(start, binding, target);
            }
            let mut declarations = vec![self.parse_declarator_rest(kind, target_start, target)?];
            if self.eat(TokenKind::Comma).is_some() {
                declarations.extend(self.parse_declarators(kind)?);
            }
            Some(Box::new(make_declaration(
                kind,
                declarations,
                false,
                self.span_from(decl_start),
            )))
        } else if self.peek_kind() == TokenKind::Semicolon {
            None
        } else {
            let expression = self.parse_expr()?;
            if self.peek_kind() == TokenKind::Of {
                let target = self.expression_to_pattern(expression)?;
                return self.parse_for_in_of(start, ForBinding::None, target);
            }
            // `for (x in obj)` arrives here as a single `in` expression.
            let expression = match expression {
                Expression::Binary {
                    operator: BinaryOperator::In,
                    left,
                    right,
                    ..
                } if self.peek_kind() == TokenKind::RParen => {
                    let target = self.expression_to_pattern(*left)?;
                    self.get();
                    let body = Box::new(self.parse_loop_body()?);
                    return Ok(Statement::ForIn {
                        binding: ForBinding::None,
                        target,
                        object: *right,
                        body,
                        span: self.span_from(start),
                    });
                }
                other => other,
            };
            Some(Box::new(expression_statement(expression)))
        };
        self.parse_for_rest(start, init)
    }

    /// The `; condition; update) body` part of a classic `for`.
    fn parse_for_rest(
        &mut self,
        start: Position,
        init: Option<Box<Statement>>,
    ) -> ParseResult<Statement> {
        self.expect(TokenKind::Semicolon, ";")?;
        let condition = if self.peek_kind() == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, ";")?;
        let update = if self.peek_kind() == TokenKind::RParen {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen, ")")?;
        let body = Box::new(self.parse_loop_body()?);
        Ok(Statement::For {
            init,
            condition,
            update,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_for_in_of(
        &mut self,
        start: Position,
        binding: ForBinding,
        target: Pattern,
    ) -> ParseResult<Statement> {
        let keyword = self.get();
        let subject = self.parse_expr()?;
        self.expect(TokenKind::RParen, ")")?;
        let body = Box::new(self.parse_loop_body()?);
        let span = self.span_from(start);
        Ok(if keyword.kind == TokenKind::Of {
            Statement::ForOf {
                binding,
                target,
                iterable: subject,
                body,
                span,
            }
        } else {
            Statement::ForIn {
                binding,
                target,
                object: subject,
                body,
                span,
            }
        })
    }
}

fn make_declaration(
    kind: DeclKind,
    declarations: Vec<VarDeclaration>,
    exported: bool,
    span: Span,
) -> Statement {
    match kind {
        DeclKind::Let => Statement::Let { declarations, span },
        DeclKind::Const => Statement::Const {
            declarations,
            exported,
            span,
        },
        DeclKind::Var => Statement::Var { declarations, span },
    }
}

fn expression_statement(expression: Expression) -> Statement {
    let span = expression.span();
    Statement::Expression { expression, span }
}
