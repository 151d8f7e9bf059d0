//! Namespace scopes introduced by `xmlns` attributes.
//!
//! Every element opens a scope holding the declarations of its own `xmlns`
//! and `xmlns:prefix` attributes on top of everything its ancestors
//! declared. Scopes are persistent maps, so pushing one is a cheap clone of
//! the parent.

use im::HashMap;

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::markup::syntax::Attribute;

/// Prefix under which the default namespace (`xmlns="…"`) is stored.
pub const DEFAULT_PREFIX: &str = "";

#[derive(Debug, Clone, Default)]
pub struct NamespaceScopes {
    stack: Vec<HashMap<String, String>>,
}

/// Returns the declared prefix when `attribute` is a namespace declaration:
/// `""` for `xmlns`, `"p"` for `xmlns:p`.
pub fn declared_prefix(attribute: &Attribute) -> Option<&str> {
    match (&attribute.name.namespace, attribute.name.name.as_str()) {
        (None, "xmlns") => Some(DEFAULT_PREFIX),
        (Some(ns), prefix) if ns == "xmlns" => Some(prefix),
        _ => None,
    }
}

impl NamespaceScopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Opens the scope of an element with the given attributes.
    ///
    /// An empty declaration value is T026; declaring the same prefix twice
    /// on one element is T027. Nothing is pushed when an error is returned.
    pub fn push(&mut self, attributes: &[Attribute]) -> Result<(), Diagnostic> {
        let mut scope = self.stack.last().cloned().unwrap_or_default();
        let mut declared: Vec<&str> = Vec::new();
        for attribute in attributes {
            let Some(prefix) = declared_prefix(attribute) else {
                continue;
            };
            let display = attribute.name.to_string();
            if declared.contains(&prefix) {
                return Err(Diagnostic::spanning(ErrorKind::DuplicateNamespace(display), attribute.span));
            }
            let value = attribute.value.as_deref().unwrap_or_default().trim();
            if value.is_empty() {
                return Err(Diagnostic::spanning(ErrorKind::EmptyNamespace(display), attribute.span));
            }
            declared.push(prefix);
            scope.insert(prefix.to_string(), value.to_string());
        }
        self.stack.push(scope);
        Ok(())
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// The namespace bound to `prefix` in the innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.stack.last()?.get(prefix).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;

    fn attributes(source: &str) -> Vec<Attribute> {
        let result = parse_markup(source);
        let attributes = result.tree.elements().next().unwrap().attributes.clone();
        attributes
    }

    #[test]
    fn test_scopes_nest_and_unwind() {
        let mut scopes = NamespaceScopes::new();
        scopes.push(&attributes(r#"<A xmlns:ns="M" xmlns="D"/>"#)).unwrap();
        assert_eq!(scopes.resolve("ns"), Some("M"));
        assert_eq!(scopes.resolve(DEFAULT_PREFIX), Some("D"));

        scopes.push(&attributes(r#"<B xmlns:ns="N"/>"#)).unwrap();
        assert_eq!(scopes.resolve("ns"), Some("N"));
        scopes.pop();
        assert_eq!(scopes.resolve("ns"), Some("M"));
        scopes.pop();
        assert_eq!(scopes.resolve("ns"), None);
    }

    #[test]
    fn test_empty_namespace() {
        let mut scopes = NamespaceScopes::new();
        let error = scopes.push(&attributes(r#"<A xmlns:ns=""/>"#)).unwrap_err();
        assert_eq!(error.code, "T026");
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_duplicate_in_one_scope() {
        let mut scopes = NamespaceScopes::new();
        // The markup parser drops duplicate attributes; build the list by hand.
        let mut attrs = attributes(r#"<A xmlns:ns="M"/>"#);
        attrs.push(attrs[0].clone());
        assert_eq!(scopes.push(&attrs).unwrap_err().code, "T027");
    }
}
