//! Expression grammar.
//!
//! Binary operators are parsed by precedence climbing over
//! [`binary_operator`]; everything above and below the binary levels has a
//! dedicated method. The ladder from loosest to tightest binding is:
//!
//! ```text
//! sequence        a, b
//! assignment      a = b, a ? b : c, x => y      (right-associative)
//! ??  ||  &&  |  ^  &  equality  relational/in  shift  additive  multiplicative
//! exponent        a ** b                         (right-associative)
//! unary/prefix    typeof delete + - ~ ! ++ --
//! member/call     a.b a?.b a[b] a(b) a++ a--
//! primary         literals, identifiers, (…), […], {…}, `…`, /re/
//! ```

use super::{string_value, ParseResult, ScriptParser};
use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::script::ast::{
    ArrowBody, AssignmentOperator, BinaryOperator, Binding, Expression, Literal, ObjectProperty,
    Pattern, PropertyKey, TemplatePart, UnaryOperator, UpdateOperator,
};
use crate::script::lexer::{unescape, StartingPhase};
use crate::script::token::{Token, TokenKind};
use crate::stream::Position;

/// Largest integer that is still exact in a double.
const MAX_SAFE_INTEGER: u128 = (1 << 53) - 1;

/// Binding power of the exponent operator; the only right-associative
/// binary level.
const EXPONENT_PRECEDENCE: u8 = 12;

impl<'src> ScriptParser<'src> {
    // ------------------------------------------------------------------------
    // Sequence, assignment, conditional, arrow
    // ------------------------------------------------------------------------

    /// `expr := assignment ("," assignment)*`
    pub(super) fn parse_expr(&mut self) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let first = self.parse_assignment()?;
        if self.peek_kind() != TokenKind::Comma {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(TokenKind::Comma).is_some() {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence {
            expressions,
            parenthesized: false,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let left = self.parse_conditional()?;

        if self.peek_kind() == TokenKind::Arrow {
            self.get();
            let (params, rest) = self.arrow_parameters(left)?;
            return self.parse_arrow_body(start, params, rest);
        }

        let Some(operator) = assignment_operator(self.peek_kind()) else {
            return Ok(left);
        };
        self.check_assignment_target(&left, operator)?;
        self.get();
        let value = self.parse_assignment()?;
        Ok(Expression::Assignment {
            operator,
            target: Box::new(left),
            value: Box::new(value),
            span: self.span_from(start),
        })
    }

    fn parse_conditional(&mut self) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let condition = self.parse_binary(0)?;
        if self.eat(TokenKind::QuestionMark).is_none() {
            return Ok(condition);
        }
        let consequent = self.parse_assignment()?;
        self.expect(TokenKind::Colon, ":")?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional {
            condition: Box::new(condition),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.span_from(start),
        })
    }

    /// Parses the body after `=>`.
    fn parse_arrow_body(
        &mut self,
        start: Position,
        params: Vec<Binding>,
        rest: Option<Box<Pattern>>,
    ) -> ParseResult<Expression> {
        let body = if self.peek_kind() == TokenKind::LBrace {
            ArrowBody::Block(self.in_function_body(|p| p.parse_block_body())?)
        } else {
            ArrowBody::Expression(Box::new(self.parse_assignment()?))
        };
        Ok(Expression::Arrow {
            params,
            rest,
            body,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------------
    // Binary operators
    // ------------------------------------------------------------------------

    /// Precedence climbing: parses operands binding tighter than
    /// `min_precedence`.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let mut left = self.parse_unary()?;
        loop {
            let Some((precedence, operator)) = binary_operator(self.peek_kind()) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.get();
            let next_min = if precedence == EXPONENT_PRECEDENCE {
                precedence - 1
            } else {
                precedence
            };
            let right = self.parse_binary(next_min)?;
            left = Expression::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            };
        }
        Ok(left)
    }

    // ------------------------------------------------------------------------
    // Unary, member access, invocation, postfix
    // ------------------------------------------------------------------------

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let kind = self.peek_kind();
        if let Some(operator) = unary_operator(kind) {
            self.get();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                operator,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }
        if let Some(operator) = update_operator(kind) {
            self.get();
            let operand = self.parse_unary()?;
            check_update_target(&operand)?;
            return Ok(Expression::Update {
                operator,
                prefix: true,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let operand = self.parse_member_or_invocation()?;
        let Some(operator) = update_operator(self.peek_kind()) else {
            return Ok(operand);
        };
        // `a\n++b` is `a; ++b`
        if self.next_on_new_line() {
            return Ok(operand);
        }
        check_update_target(&operand)?;
        self.get();
        Ok(Expression::Update {
            operator,
            prefix: false,
            operand: Box::new(operand),
            span: self.span_from(start),
        })
    }

    fn parse_member_or_invocation(&mut self) -> ParseResult<Expression> {
        let start = self.start_of_next();
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.peek_kind() {
                TokenKind::Dot => {
                    self.get();
                    let property = self.parse_property_name()?;
                    Expression::Member {
                        object: Box::new(expr),
                        property,
                        optional: false,
                        span: self.span_from(start),
                    }
                }
                TokenKind::OptionalChaining => {
                    self.get();
                    match self.peek_kind() {
                        TokenKind::LParen => self.parse_invocation(start, expr, true)?,
                        TokenKind::LSquare => self.parse_computed_member(start, expr, true)?,
                        _ => {
                            let property = self.parse_property_name()?;
                            Expression::Member {
                                object: Box::new(expr),
                                property,
                                optional: true,
                                span: self.span_from(start),
                            }
                        }
                    }
                }
                TokenKind::LSquare => self.parse_computed_member(start, expr, false)?,
                TokenKind::LParen => self.parse_invocation(start, expr, false)?,
                _ => return Ok(expr),
            };
        }
    }

    fn parse_property_name(&mut self) -> ParseResult<String> {
        let token = self.get();
        if token.is_property_name() {
            Ok(token.text)
        } else {
            Err(Diagnostic::spanning(ErrorKind::IdentifierExpected, token.span))
        }
    }

    fn parse_computed_member(
        &mut self,
        start: Position,
        object: Expression,
        optional: bool,
    ) -> ParseResult<Expression> {
        self.expect(TokenKind::LSquare, "[")?;
        let property = self.parse_expr()?;
        self.expect(TokenKind::RSquare, "]")?;
        Ok(Expression::ComputedMember {
            object: Box::new(object),
            property: Box::new(property),
            optional,
            span: self.span_from(start),
        })
    }

    fn parse_invocation(
        &mut self,
        start: Position,
        callee: Expression,
        optional: bool,
    ) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen, "(")?;
        let mut arguments = Vec::new();
        while self.peek_kind() != TokenKind::RParen {
            arguments.push(self.parse_spread_or_assignment()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(Expression::Invocation {
            callee: Box::new(callee),
            arguments,
            optional,
            span: self.span_from(start),
        })
    }

    /// An assignment expression, or `...expr` where spreading is allowed
    /// (array literals, argument lists, parenthesized parameter lists).
    fn parse_spread_or_assignment(&mut self) -> ParseResult<Expression> {
        let Some(spread) = self.eat(TokenKind::Spread) else {
            return self.parse_assignment();
        };
        let argument = self.parse_assignment()?;
        Ok(Expression::Spread {
            argument: Box::new(argument),
            span: self.span_from(spread.span.start),
        })
    }

    // ------------------------------------------------------------------------
    // Primary expressions
    // ------------------------------------------------------------------------

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.peek().clone();
        let literal = |value| Expression::Literal {
            value,
            span: token.span,
        };
        match token.kind {
            TokenKind::Identifier | TokenKind::Of | TokenKind::As | TokenKind::From => {
                self.get();
                Ok(Expression::Identifier {
                    name: token.text,
                    span: token.span,
                })
            }
            TokenKind::True => {
                self.get();
                Ok(literal(Literal::Boolean(true)))
            }
            TokenKind::False => {
                self.get();
                Ok(literal(Literal::Boolean(false)))
            }
            TokenKind::Null => {
                self.get();
                Ok(literal(Literal::Null))
            }
            TokenKind::Undefined => {
                self.get();
                Ok(literal(Literal::Undefined))
            }
            TokenKind::Infinity => {
                self.get();
                Ok(literal(Literal::Infinity))
            }
            TokenKind::NaN => {
                self.get();
                Ok(literal(Literal::NaN))
            }
            TokenKind::DecimalLiteral | TokenKind::HexLiteral | TokenKind::BinaryLiteral => {
                self.get();
                Ok(literal(parse_integer(&token)?))
            }
            TokenKind::RealLiteral => {
                self.get();
                let value = token
                    .text
                    .replace('_', "")
                    .parse::<f64>()
                    .map_err(|_| invalid_number(&token))?;
                Ok(literal(Literal::Real(value)))
            }
            TokenKind::StringLiteral => {
                self.get();
                Ok(literal(Literal::String(string_value(&token)?)))
            }
            TokenKind::Backtick => self.parse_template(),
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::LSquare => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Divide | TokenKind::DivideAssignment => self.parse_regexp(),
            TokenKind::Eof
            | TokenKind::RParen
            | TokenKind::RSquare
            | TokenKind::RBrace
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::Colon => Err(Diagnostic::spanning(ErrorKind::ExpressionExpected, token.span)),
            _ => Err(Diagnostic::spanning(ErrorKind::UnexpectedToken(token.text), token.span)),
        }
    }

    /// `( … )`: a grouped expression, a parenthesized sequence, or an arrow
    /// function parameter list.
    fn parse_parenthesized(&mut self) -> ParseResult<Expression> {
        let open = self.get();
        let start = open.span.start;

        if self.eat(TokenKind::RParen).is_some() {
            // `()` only ever introduces an arrow function.
            if self.peek_kind() != TokenKind::Arrow {
                let span = self.peek().span;
                return Err(Diagnostic::spanning(ErrorKind::TokenExpected("=>".to_string()), span));
            }
            self.get();
            return self.parse_arrow_body(start, Vec::new(), None);
        }

        let mut expressions = Vec::new();
        loop {
            expressions.push(self.parse_spread_or_assignment()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        let span = self.span_from(start);

        let has_spread = expressions.iter().any(|e| matches!(e, Expression::Spread { .. }));
        if has_spread && self.peek_kind() != TokenKind::Arrow {
            return Err(Diagnostic::spanning(ErrorKind::InvalidArrowParams, span));
        }
        if expressions.len() == 1 && !has_spread {
            if let Some(inner) = expressions.pop() {
                return Ok(inner.with_span(span));
            }
        }
        Ok(Expression::Sequence {
            expressions,
            parenthesized: true,
            span,
        })
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let start = self.get().span.start;
        let mut elements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RSquare => break,
                TokenKind::Comma => {
                    self.get();
                    elements.push(None);
                    continue;
                }
                _ => elements.push(Some(self.parse_spread_or_assignment()?)),
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RSquare, "]")?;
        Ok(Expression::Array {
            elements,
            span: self.span_from(start),
        })
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expression> {
        let start = self.get().span.start;
        let mut properties = Vec::new();
        while self.peek_kind() != TokenKind::RBrace {
            properties.push(self.parse_object_property()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "}")?;
        Ok(Expression::Object {
            properties,
            span: self.span_from(start),
        })
    }

    fn parse_object_property(&mut self) -> ParseResult<ObjectProperty> {
        let token = self.get();
        let start = token.span.start;
        let key = match token.kind {
            TokenKind::Spread => {
                let argument = self.parse_assignment()?;
                return Ok(ObjectProperty::Spread {
                    argument,
                    span: self.span_from(start),
                });
            }
            TokenKind::LSquare => {
                let key = self.parse_assignment()?;
                self.expect(TokenKind::RSquare, "]")?;
                PropertyKey::Computed(Box::new(key))
            }
            TokenKind::StringLiteral => PropertyKey::String(string_value(&token)?),
            TokenKind::DecimalLiteral
            | TokenKind::HexLiteral
            | TokenKind::BinaryLiteral
            | TokenKind::RealLiteral => PropertyKey::Number(token.text.clone()),
            _ if token.is_property_name() => PropertyKey::Name(token.text.clone()),
            _ => {
                return Err(Diagnostic::spanning(
                    ErrorKind::UnexpectedToken(token.text.clone()),
                    token.span,
                ))
            }
        };

        if self.eat(TokenKind::Colon).is_some() {
            let value = self.parse_assignment()?;
            return Ok(ObjectProperty::KeyValue {
                key,
                value,
                span: self.span_from(start),
            });
        }

        let PropertyKey::Name(name) = key else {
            let span = self.peek().span;
            return Err(Diagnostic::spanning(ErrorKind::TokenExpected(":".to_string()), span));
        };
        if !token.is_binding_name() {
            let span = self.peek().span;
            return Err(Diagnostic::spanning(ErrorKind::TokenExpected(":".to_string()), span));
        }
        // `{ a = 1 }` is only meaningful once converted into a pattern; it
        // is kept as `a: a = 1`.
        if self.eat(TokenKind::Assignment).is_some() {
            let default = self.parse_assignment()?;
            let span = self.span_from(start);
            let value = Expression::Assignment {
                operator: AssignmentOperator::Assign,
                target: Box::new(Expression::Identifier {
                    name: name.clone(),
                    span: token.span,
                }),
                value: Box::new(default),
                span,
            };
            return Ok(ObjectProperty::KeyValue {
                key: PropertyKey::Name(name),
                value,
                span,
            });
        }
        Ok(ObjectProperty::Shorthand {
            name,
            span: token.span,
        })
    }

    fn parse_template(&mut self) -> ParseResult<Expression> {
        let start = self.get().span.start;
        self.lexer.set_starting_phase(StartingPhase::TemplateString);
        let mut parts = Vec::new();
        loop {
            let token = self.get();
            match token.kind {
                TokenKind::Backtick => break,
                TokenKind::TemplateSegment => {
                    let text = unescape(&token.text).map_err(|kind| Diagnostic::spanning(kind, token.span))?;
                    parts.push(TemplatePart::Text(text));
                }
                TokenKind::DollarLBrace => {
                    let expression = self.parse_expr()?;
                    self.expect(TokenKind::RBrace, "}")?;
                    self.lexer.set_starting_phase(StartingPhase::TemplateString);
                    parts.push(TemplatePart::Expression(expression));
                }
                TokenKind::Eof => {
                    return Err(Diagnostic::spanning(ErrorKind::UnterminatedTemplate, token.span));
                }
                _ => {
                    return Err(Diagnostic::spanning(
                        ErrorKind::UnexpectedToken(token.text),
                        token.span,
                    ))
                }
            }
        }
        Ok(Expression::Template {
            parts,
            span: self.span_from(start),
        })
    }

    fn parse_regexp(&mut self) -> ParseResult<Expression> {
        let token = self.lexer.get_regexp()?;
        let close = token.text.rfind('/').unwrap_or(0);
        let pattern = token.text.get(1..close).unwrap_or("").to_string();
        let flags = token.text.get(close + 1..).unwrap_or("").to_string();
        Ok(Expression::RegExp {
            pattern,
            flags,
            span: token.span,
        })
    }

    // ------------------------------------------------------------------------
    // Binding names, targets and parameter lists
    // ------------------------------------------------------------------------

    pub(super) fn parse_binding_name(&mut self) -> ParseResult<String> {
        let token = self.peek();
        if token.is_binding_name() {
            Ok(self.get().text)
        } else {
            Err(Diagnostic::spanning(ErrorKind::IdentifierExpected, token.span))
        }
    }

    /// A plain name or a destructuring pattern, written as an object or
    /// array literal and converted afterwards.
    pub(super) fn parse_binding_target(&mut self) -> ParseResult<Pattern> {
        match self.peek_kind() {
            TokenKind::LBrace | TokenKind::LSquare => {
                let literal = self.parse_primary()?;
                self.expression_to_pattern(literal)
            }
            _ => {
                let span = self.peek().span;
                let name = self.parse_binding_name()?;
                Ok(Pattern::Identifier {
                    name,
                    span,
                })
            }
        }
    }

    /// `( binding ("=" default)? , … , ...rest )`
    pub(super) fn parse_parameter_list(&mut self) -> ParseResult<(Vec<Binding>, Option<Box<Pattern>>)> {
        self.expect(TokenKind::LParen, "(")?;
        let mut params = Vec::new();
        let mut rest = None;
        while self.peek_kind() != TokenKind::RParen {
            if self.eat(TokenKind::Spread).is_some() {
                rest = Some(Box::new(self.parse_binding_target()?));
                break;
            }
            let start = self.start_of_next();
            let target = self.parse_binding_target()?;
            let default = if self.eat(TokenKind::Assignment).is_some() {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Binding {
                target,
                default,
                span: self.span_from(start),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok((params, rest))
    }
}

// ============================================================================
// OPERATOR TABLES
// ============================================================================

/// Precedence and operator of a binary operator token; higher binds tighter.
fn binary_operator(kind: TokenKind) -> Option<(u8, BinaryOperator)> {
    use BinaryOperator as Op;
    let entry = match kind {
        TokenKind::NullCoalesce => (1, Op::NullCoalesce),
        TokenKind::LogicalOr => (2, Op::LogicalOr),
        TokenKind::LogicalAnd => (3, Op::LogicalAnd),
        TokenKind::BitwiseOr => (4, Op::BitwiseOr),
        TokenKind::BitwiseXor => (5, Op::BitwiseXor),
        TokenKind::BitwiseAnd => (6, Op::BitwiseAnd),
        TokenKind::Equal => (7, Op::Equal),
        TokenKind::StrictEqual => (7, Op::StrictEqual),
        TokenKind::NotEqual => (7, Op::NotEqual),
        TokenKind::StrictNotEqual => (7, Op::StrictNotEqual),
        TokenKind::LessThan => (8, Op::LessThan),
        TokenKind::LessThanOrEqual => (8, Op::LessThanOrEqual),
        TokenKind::GreaterThan => (8, Op::GreaterThan),
        TokenKind::GreaterThanOrEqual => (8, Op::GreaterThanOrEqual),
        TokenKind::In => (8, Op::In),
        TokenKind::ShiftLeft => (9, Op::ShiftLeft),
        TokenKind::SignedShiftRight => (9, Op::SignedShiftRight),
        TokenKind::ShiftRight => (9, Op::ShiftRight),
        TokenKind::Plus => (10, Op::Add),
        TokenKind::Minus => (10, Op::Subtract),
        TokenKind::Multiply => (11, Op::Multiply),
        TokenKind::Divide => (11, Op::Divide),
        TokenKind::Remainder => (11, Op::Remainder),
        TokenKind::Exponent => (EXPONENT_PRECEDENCE, Op::Exponent),
        _ => return None,
    };
    Some(entry)
}

fn unary_operator(kind: TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::Typeof => Some(UnaryOperator::Typeof),
        TokenKind::Delete => Some(UnaryOperator::Delete),
        TokenKind::Plus => Some(UnaryOperator::Plus),
        TokenKind::Minus => Some(UnaryOperator::Minus),
        TokenKind::BitwiseNot => Some(UnaryOperator::BitwiseNot),
        TokenKind::LogicalNot => Some(UnaryOperator::LogicalNot),
        _ => None,
    }
}

fn update_operator(kind: TokenKind) -> Option<UpdateOperator> {
    match kind {
        TokenKind::IncOp => Some(UpdateOperator::Increment),
        TokenKind::DecOp => Some(UpdateOperator::Decrement),
        _ => None,
    }
}

fn assignment_operator(kind: TokenKind) -> Option<AssignmentOperator> {
    use AssignmentOperator as Op;
    let op = match kind {
        TokenKind::Assignment => Op::Assign,
        TokenKind::AddAssignment => Op::Add,
        TokenKind::SubtractAssignment => Op::Subtract,
        TokenKind::MultiplyAssignment => Op::Multiply,
        TokenKind::DivideAssignment => Op::Divide,
        TokenKind::RemainderAssignment => Op::Remainder,
        TokenKind::ExponentAssignment => Op::Exponent,
        TokenKind::ShiftLeftAssignment => Op::ShiftLeft,
        TokenKind::SignedShiftRightAssignment => Op::SignedShiftRight,
        TokenKind::ShiftRightAssignment => Op::ShiftRight,
        TokenKind::BitwiseAndAssignment => Op::BitwiseAnd,
        TokenKind::BitwiseOrAssignment => Op::BitwiseOr,
        TokenKind::BitwiseXorAssignment => Op::BitwiseXor,
        TokenKind::LogicalAndAssignment => Op::LogicalAnd,
        TokenKind::LogicalOrAssignment => Op::LogicalOr,
        TokenKind::NullCoalesceAssignment => Op::NullCoalesce,
        _ => return None,
    };
    Some(op)
}

// ============================================================================
// LITERAL HELPERS
// ============================================================================

fn invalid_number(token: &Token) -> Diagnostic {
    Diagnostic::spanning(ErrorKind::InvalidNumber(token.text.clone()), token.span)
}

/// Folds a decimal, hex or binary literal. Values up to 2^53 - 1 stay
/// `Integer`; larger ones become `BigInt`.
fn parse_integer(token: &Token) -> ParseResult<Literal> {
    let digits = token.text.replace('_', "");
    let (digits, radix) = match token.kind {
        TokenKind::HexLiteral => (&digits[2..], 16),
        TokenKind::BinaryLiteral => (&digits[2..], 2),
        _ => (digits.as_str(), 10),
    };
    let value = u128::from_str_radix(digits, radix).map_err(|_| invalid_number(token))?;
    if value <= MAX_SAFE_INTEGER {
        // Fits in i64 by the bound above.
        Ok(Literal::Integer(value as i64))
    } else {
        Ok(Literal::BigInt(value))
    }
}

fn check_update_target(operand: &Expression) -> ParseResult<()> {
    match operand {
        Expression::Identifier { .. } | Expression::Member { .. } | Expression::ComputedMember { .. } => Ok(()),
        other => Err(Diagnostic::spanning(ErrorKind::InvalidAssignmentTarget, other.span())),
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_expression;
    use super::*;

    fn parse(source: &str) -> Expression {
        let result = parse_expression(source);
        assert!(result.errors.is_empty(), "{source}: {:?}", result.errors);
        result.expression.unwrap()
    }

    fn error_code(source: &str) -> String {
        let result = parse_expression(source);
        assert!(result.expression.is_none(), "{source} should not parse");
        result.errors[0].code.clone()
    }

    #[test]
    fn test_integer_folding() {
        assert!(matches!(
            parse("9007199254740991"),
            Expression::Literal { value: Literal::Integer(9_007_199_254_740_991), .. }
        ));
        assert!(matches!(
            parse("9007199254740992"),
            Expression::Literal { value: Literal::BigInt(9_007_199_254_740_992), .. }
        ));
        assert!(matches!(parse("0xff"), Expression::Literal { value: Literal::Integer(255), .. }));
        assert!(matches!(parse("0b101"), Expression::Literal { value: Literal::Integer(5), .. }));
        assert!(matches!(parse("1_000"), Expression::Literal { value: Literal::Integer(1000), .. }));
    }

    #[test]
    fn test_real_literal() {
        let Expression::Literal { value: Literal::Real(value), .. } = parse("1.5e3") else {
            panic!("expected a real literal");
        };
        assert_eq!(value, 1500.0);
    }

    #[test]
    fn test_conditional_and_logical() {
        let Expression::Conditional { condition, .. } = parse("a || b && c ? 1 : 2") else {
            panic!("expected a conditional");
        };
        let Expression::Binary { operator, right, .. } = *condition else {
            panic!("expected a binary condition");
        };
        assert_eq!(operator, BinaryOperator::LogicalOr);
        assert!(matches!(*right, Expression::Binary { operator: BinaryOperator::LogicalAnd, .. }));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let Expression::Assignment { value, .. } = parse("a = b += 1") else {
            panic!("expected an assignment");
        };
        assert!(matches!(
            *value,
            Expression::Assignment { operator: AssignmentOperator::Add, .. }
        ));
    }

    #[test]
    fn test_member_chain_and_optional_calls() {
        let Expression::Invocation { callee, optional, arguments, .. } = parse("a.b?.[c]?.(1, ...d)") else {
            panic!("expected an invocation");
        };
        assert!(optional);
        assert_eq!(arguments.len(), 2);
        assert!(matches!(arguments[1], Expression::Spread { .. }));
        assert!(matches!(*callee, Expression::ComputedMember { optional: true, .. }));
    }

    #[test]
    fn test_keyword_as_property_name() {
        assert!(matches!(parse("a.default"), Expression::Member { .. }));
    }

    #[test]
    fn test_prefix_and_postfix_updates() {
        assert!(matches!(parse("++a"), Expression::Update { prefix: true, .. }));
        assert!(matches!(parse("a.b--"), Expression::Update { prefix: false, .. }));
        assert_eq!(error_code("++1"), "W017");
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(parse("() => 1"), Expression::Arrow { .. }));
        let Expression::Arrow { params, .. } = parse("x => x * 2") else {
            panic!("expected an arrow");
        };
        assert_eq!(params.len(), 1);
        let Expression::Arrow { params, rest, body, .. } = parse("(a, b = 1, {c}, [d], ...e) => { return a; }") else {
            panic!("expected an arrow");
        };
        assert_eq!(params.len(), 4);
        assert!(params[1].default.is_some());
        assert!(matches!(params[2].target, Pattern::Object { .. }));
        assert!(matches!(params[3].target, Pattern::Array { .. }));
        assert!(rest.is_some());
        assert!(matches!(body, ArrowBody::Block(_)));
    }

    #[test]
    fn test_invalid_arrow_parameters() {
        assert_eq!(error_code("(a + 1) => a"), "W010");
        assert_eq!(error_code("(...a)"), "W010");
    }

    #[test]
    fn test_parenthesized_sequence() {
        assert!(matches!(parse("(a, b)"), Expression::Sequence { parenthesized: true, .. }));
        assert!(matches!(parse("a, b"), Expression::Sequence { parenthesized: false, .. }));
        let grouped = parse("(a)");
        assert_eq!(grouped.span().start.offset, 0);
        assert_eq!(grouped.span().end.offset, 3);
    }

    #[test]
    fn test_array_holes_and_objects() {
        let Expression::Array { elements, .. } = parse("[1, , 2]") else {
            panic!("expected an array");
        };
        assert_eq!(elements.len(), 3);
        assert!(elements[1].is_none());

        let Expression::Object { properties, .. } = parse("{ a, 'b': 1, [c]: 2, ...d, 3: x }") else {
            panic!("expected an object");
        };
        assert_eq!(properties.len(), 5);
        assert!(matches!(properties[0], ObjectProperty::Shorthand { .. }));
        assert!(matches!(properties[3], ObjectProperty::Spread { .. }));
    }

    #[test]
    fn test_template_literal() {
        let Expression::Template { parts, .. } = parse("`a${x + 1}b${`in${y}`}`") else {
            panic!("expected a template");
        };
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], TemplatePart::Text("a".to_string()));
        assert!(matches!(parts[1], TemplatePart::Expression(Expression::Binary { .. })));
        assert!(matches!(parts[3], TemplatePart::Expression(Expression::Template { .. })));
    }

    #[test]
    fn test_unterminated_template() {
        assert_eq!(error_code("`abc"), "W020");
    }

    #[test]
    fn test_regexp_literal() {
        let Expression::Invocation { callee, .. } = parse("/ab+c/gi.test(s)") else {
            panic!("expected an invocation");
        };
        let Expression::Member { object, .. } = *callee else {
            panic!("expected a member");
        };
        let Expression::RegExp { pattern, flags, .. } = *object else {
            panic!("expected a regexp");
        };
        assert_eq!(pattern, "ab+c");
        assert_eq!(flags, "gi");
    }

    #[test]
    fn test_division_is_not_a_regexp() {
        assert!(matches!(parse("a / b / c"), Expression::Binary { operator: BinaryOperator::Divide, .. }));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(error_code("1 +"), "W001");
        assert_eq!(error_code("a ? b"), "W004");
    }
}
