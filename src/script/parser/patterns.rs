//! Re-interpretation of literal expressions as binding patterns.
//!
//! Destructuring is not special-cased while scanning: `{ a, b: [c] }` is
//! parsed as an object literal and converted here when it turns out to be a
//! declaration target, an arrow parameter or the left side of `=`.

use super::{ParseResult, ScriptParser};
use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::script::ast::{
    AssignmentOperator, Binding, Expression, ObjectProperty, Pattern, PropertyBinding, PropertyKey,
};

impl<'src> ScriptParser<'src> {
    pub(super) fn expression_to_pattern(&self, expr: Expression) -> ParseResult<Pattern> {
        to_pattern(expr)
    }

    /// Classifies the expression that preceded `=>` as a parameter list.
    pub(super) fn arrow_parameters(
        &self,
        expr: Expression,
    ) -> ParseResult<(Vec<Binding>, Option<Box<Pattern>>)> {
        let span = expr.span();
        let invalid = |_| Diagnostic::spanning(ErrorKind::InvalidArrowParams, span);
        match expr {
            Expression::Sequence {
                expressions,
                parenthesized: true,
                ..
            } => {
                let count = expressions.len();
                let mut params = Vec::new();
                let mut rest = None;
                for (index, item) in expressions.into_iter().enumerate() {
                    match item {
                        Expression::Spread { argument, .. } if index + 1 == count => {
                            rest = Some(Box::new(to_pattern(*argument).map_err(invalid)?));
                        }
                        item => params.push(to_binding(item).map_err(invalid)?),
                    }
                }
                Ok((params, rest))
            }
            Expression::Identifier { .. }
            | Expression::Object { .. }
            | Expression::Array { .. }
            | Expression::Assignment {
                operator: AssignmentOperator::Assign,
                ..
            } => Ok((vec![to_binding(expr).map_err(invalid)?], None)),
            _ => Err(Diagnostic::spanning(ErrorKind::InvalidArrowParams, span)),
        }
    }

    /// Only names, member accesses and (for plain `=`) destructuring
    /// literals can be assigned to.
    pub(super) fn check_assignment_target(
        &self,
        target: &Expression,
        operator: AssignmentOperator,
    ) -> ParseResult<()> {
        let valid = match target {
            Expression::Identifier { .. } | Expression::Member { .. } | Expression::ComputedMember { .. } => {
                true
            }
            Expression::Object { .. } | Expression::Array { .. } if operator == AssignmentOperator::Assign => {
                to_pattern(target.clone()).is_ok()
            }
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(Diagnostic::spanning(ErrorKind::InvalidAssignmentTarget, target.span()))
        }
    }
}

fn invalid_destructure(expr: &Expression) -> Diagnostic {
    Diagnostic::spanning(ErrorKind::InvalidDestructure, expr.span())
}

fn to_pattern(expr: Expression) -> ParseResult<Pattern> {
    match expr {
        Expression::Identifier { name, span } => Ok(Pattern::Identifier { name, span }),
        Expression::Object { properties, span } => {
            let count = properties.len();
            let mut bindings = Vec::new();
            let mut rest = None;
            for (index, property) in properties.into_iter().enumerate() {
                match property {
                    ObjectProperty::Shorthand { name, span } => bindings.push(PropertyBinding {
                        key: name.clone(),
                        binding: Binding {
                            target: Pattern::Identifier { name, span },
                            default: None,
                            span,
                        },
                        span,
                    }),
                    ObjectProperty::KeyValue { key, value, span } => {
                        let key = match key {
                            PropertyKey::Name(key) | PropertyKey::String(key) | PropertyKey::Number(key) => key,
                            PropertyKey::Computed(key) => return Err(invalid_destructure(&key)),
                        };
                        bindings.push(PropertyBinding {
                            key,
                            binding: to_binding(value)?,
                            span,
                        });
                    }
                    ObjectProperty::Spread { argument, .. } if index + 1 == count => match argument {
                        Expression::Identifier { name, .. } => rest = Some(name),
                        other => return Err(invalid_destructure(&other)),
                    },
                    ObjectProperty::Spread { argument, .. } => return Err(invalid_destructure(&argument)),
                }
            }
            Ok(Pattern::Object {
                properties: bindings,
                rest,
                span,
            })
        }
        Expression::Array { elements, span } => {
            let count = elements.len();
            let mut bindings = Vec::new();
            let mut rest = None;
            for (index, element) in elements.into_iter().enumerate() {
                match element {
                    None => bindings.push(None),
                    Some(Expression::Spread { argument, .. }) if index + 1 == count => {
                        rest = Some(Box::new(to_pattern(*argument)?));
                    }
                    Some(element @ Expression::Spread { .. }) => return Err(invalid_destructure(&element)),
                    Some(element) => bindings.push(Some(to_binding(element)?)),
                }
            }
            Ok(Pattern::Array {
                elements: bindings,
                rest,
                span,
            })
        }
        other => Err(invalid_destructure(&other)),
    }
}

/// A pattern with an optional `= default`.
fn to_binding(expr: Expression) -> ParseResult<Binding> {
    let span = expr.span();
    match expr {
        Expression::Assignment {
            operator: AssignmentOperator::Assign,
            target,
            value,
            ..
        } => Ok(Binding {
            target: to_pattern(*target)?,
            default: Some(*value),
            span,
        }),
        other => Ok(Binding {
            target: to_pattern(other)?,
            default: None,
            span,
        }),
    }
}
