//! Recursive-descent parser for the XMLUI scripting language.
//!
//! Statements are parsed by [`statements`], expressions by a
//! precedence-climbing parser in [`expressions`], and destructuring patterns
//! are produced by re-interpreting already parsed literal expressions in
//! [`patterns`].
//!
//! Inside one parse a syntax error aborts the whole fragment: every parse
//! method returns [`ParseResult`] and failures travel up with `?`. The entry
//! points ([`parse_script`], [`parse_expression`]) turn that failure into a
//! diagnostic next to the ones the lexer recorded.

mod expressions;
mod patterns;
mod statements;

use serde::Serialize;

use crate::diagnostics::{has_errors, Diagnostic, ErrorKind};
use crate::script::ast::{Expression, Statement};
use crate::script::lexer::{unescape, ScriptLexer};
use crate::script::token::{Token, TokenKind};
use crate::stream::{Position, Span};

pub type ParseResult<T> = Result<T, Diagnostic>;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Outcome of parsing a script module or script block.
///
/// `statements` is `None` whenever `errors` holds at least one
/// error-category diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptParseResult {
    pub statements: Option<Vec<Statement>>,
    pub errors: Vec<Diagnostic>,
}

impl ScriptParseResult {
    pub fn is_ok(&self) -> bool {
        self.statements.is_some()
    }
}

/// Outcome of parsing a single expression (a bound property value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionParseResult {
    pub expression: Option<Expression>,
    pub errors: Vec<Diagnostic>,
}

/// Parses a complete script. Never fails; problems are returned as
/// diagnostics.
pub fn parse_script(source: &str) -> ScriptParseResult {
    log::debug!("parsing script ({} bytes)", source.len());
    let mut parser = ScriptParser::new(source);
    let result = parser.parse_statements();
    let (statements, errors) = parser.finish(result);
    log::debug!(
        "script parsed: {} statements, {} diagnostics",
        statements.as_ref().map_or(0, Vec::len),
        errors.len()
    );
    ScriptParseResult { statements, errors }
}

/// Parses `source` as exactly one expression.
pub fn parse_expression(source: &str) -> ExpressionParseResult {
    let mut parser = ScriptParser::new(source);
    let result = parser.parse_expr().and_then(|expr| {
        parser.expect_eof()?;
        Ok(expr)
    });
    let (expression, errors) = parser.finish(result);
    ExpressionParseResult { expression, errors }
}

// ============================================================================
// PARSER STATE
// ============================================================================

/// Parser over one source string.
pub struct ScriptParser<'src> {
    lexer: ScriptLexer<'src>,
    /// Number of enclosing loops in the current function body.
    loop_depth: usize,
    /// Number of enclosing `switch` statements in the current function body.
    switch_depth: usize,
    /// Number of enclosing blocks and function bodies; zero at module level.
    nesting: usize,
}

impl<'src> ScriptParser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: ScriptLexer::new(source),
            loop_depth: 0,
            switch_depth: 0,
            nesting: 0,
        }
    }

    /// Parses statements up to the end of the input.
    pub fn parse_statements(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Merges the parse outcome with the lexer's diagnostics, in source
    /// order. The value is dropped when any error was found.
    fn finish<T>(&mut self, result: ParseResult<T>) -> (Option<T>, Vec<Diagnostic>) {
        let mut errors = self.lexer.take_diagnostics();
        let value = match result {
            Ok(value) => Some(value),
            Err(diagnostic) => {
                if !errors
                    .iter()
                    .any(|d| d.pos == diagnostic.pos && d.code == diagnostic.code)
                {
                    errors.push(diagnostic);
                }
                None
            }
        };
        errors.sort_by_key(|d| d.pos);
        if has_errors(&errors) {
            (None, errors)
        } else {
            (value, errors)
        }
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    fn peek(&mut self) -> &Token {
        self.lexer.peek()
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().kind
    }

    fn get(&mut self) -> Token {
        self.lexer.get()
    }

    /// Consumes the next token when it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_kind() == kind {
            Some(self.get())
        } else {
            None
        }
    }

    /// Consumes a token of `kind` or fails with "'spelling' expected" at the
    /// offending token.
    fn expect(&mut self, kind: TokenKind, spelling: &str) -> ParseResult<Token> {
        if self.peek_kind() == kind {
            Ok(self.get())
        } else {
            let span = self.peek().span;
            Err(Diagnostic::spanning(ErrorKind::TokenExpected(spelling.to_string()), span))
        }
    }

    fn expect_eof(&mut self) -> ParseResult<()> {
        if self.peek_kind() == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// "Unexpected token" at the next token.
    fn unexpected(&mut self) -> Diagnostic {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            Diagnostic::spanning(ErrorKind::ExpressionExpected, token.span)
        } else {
            Diagnostic::spanning(ErrorKind::UnexpectedToken(token.text.clone()), token.span)
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.lexer.last_end())
    }

    fn start_of_next(&mut self) -> Position {
        self.peek().span.start
    }

    /// True when the next token starts on a later line than the last
    /// consumed one ends on.
    fn next_on_new_line(&mut self) -> bool {
        let last_line = self.lexer.last_end().line;
        self.peek().span.start.line > last_line
    }

    /// Runs `f` as the body of a function: loop and switch context is reset
    /// and the nesting level rises.
    fn in_function_body<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = (self.loop_depth, self.switch_depth);
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        (self.loop_depth, self.switch_depth) = saved;
        result
    }
}

/// Decodes the value of a string literal token.
fn string_value(token: &Token) -> ParseResult<String> {
    let text = token.text.as_str();
    let mut chars = text.chars();
    let quote = chars.next();
    let inner = match quote {
        Some(q) if text.len() >= 2 && text.ends_with(q) => &text[q.len_utf8()..text.len() - q.len_utf8()],
        Some(q) => &text[q.len_utf8()..],
        None => "",
    };
    unescape(inner).map_err(|kind| Diagnostic::spanning(kind, token.span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ast::{BinaryOperator, Literal};

    fn expr(source: &str) -> Expression {
        let result = parse_expression(source);
        assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        result.expression.unwrap()
    }

    #[test]
    fn test_empty_source() {
        let result = parse_script("");
        assert_eq!(result.statements, Some(vec![]));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_precedence() {
        let Expression::Binary { operator, left, right, .. } = expr("1 + 2 * 3") else {
            panic!("expected a binary expression");
        };
        assert_eq!(operator, BinaryOperator::Add);
        assert!(matches!(*left, Expression::Literal { value: Literal::Integer(1), .. }));
        assert!(matches!(
            *right,
            Expression::Binary { operator: BinaryOperator::Multiply, .. }
        ));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let Expression::Binary { operator, left, right, .. } = expr("2 ** 3 ** 2") else {
            panic!("expected a binary expression");
        };
        assert_eq!(operator, BinaryOperator::Exponent);
        assert!(matches!(*left, Expression::Literal { value: Literal::Integer(2), .. }));
        let Expression::Binary { operator, left, right, .. } = *right else {
            panic!("expected a nested binary expression");
        };
        assert_eq!(operator, BinaryOperator::Exponent);
        assert!(matches!(*left, Expression::Literal { value: Literal::Integer(3), .. }));
        assert!(matches!(*right, Expression::Literal { value: Literal::Integer(2), .. }));
    }

    #[test]
    fn test_error_points_at_offending_token() {
        let result = parse_script("let 1 = 2;");
        assert!(result.statements.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "W003");
        assert_eq!(result.errors[0].pos, 4);
    }

    #[test]
    fn test_trailing_garbage_in_expression() {
        let result = parse_expression("a b");
        assert!(result.expression.is_none());
        assert_eq!(result.errors[0].code, "W002");
        assert_eq!(result.errors[0].pos, 2);
    }

    #[test]
    fn test_string_value_strips_quotes() {
        let token = Token::new(TokenKind::StringLiteral, r#""a\tb""#, Span::default());
        assert_eq!(string_value(&token).unwrap(), "a\tb");
    }
}
