//! Turns a markup tree into a component definition.
//!
//! Markup problems are collected exhaustively by the markup parser. The
//! shape checks done here stop at the first violation: every step returns
//! [`BuildStep`] and the first `Err` travels up to [`ComponentBuilder::build`],
//! which reports it as the single semantic diagnostic of the file.
//!
//! Script problems never stop the build. They end up on the owning
//! definition as `script_error`.

use std::collections::BTreeMap;

use crate::component::code_behind::collect_code_behind;
use crate::component::definition::{
    BuildResult, BuiltComponent, ComponentDefinition, DebugSource, PropValue, ReusableComponentDefinition,
};
use crate::component::namespaces::{declared_prefix, NamespaceScopes, DEFAULT_PREFIX};
use crate::diagnostics::{has_errors, Diagnostic, ErrorKind};
use crate::markup::parse_markup;
use crate::markup::syntax::{Attribute, Document, Element, MarkupNode, TextNode, TextSegment};
use crate::script::lexer::{is_id_continue, is_id_start};
use crate::stream::Span;

type BuildStep<T> = Result<T, Diagnostic>;

/// Maps a resolved namespace to the one stored on a definition.
pub type NamespaceMapper<'a> = Box<dyn Fn(&str) -> String + 'a>;

/// Loads an imported script module: `(from, path) -> source`.
pub type ModuleLoader<'a> = Box<dyn FnMut(&str, &str) -> Option<String> + 'a>;

/// Tag of the reusable component wrapper.
pub const COMPONENT_TAG: &str = "Component";

/// Synthetic parent of the nested components of a reusable definition with
/// more than one of them.
pub const FRAGMENT_TAG: &str = "Fragment";

/// Definition type of text content.
pub const TEXT_NODE_TAG: &str = "TextNode";

/// Child elements that describe their parent instead of nesting a component.
const RESERVED_ELEMENTS: &[&str] = &["property", "event", "variable", "method", "loaders", "uses", "field", "item"];

/// Module name given to script blocks unless configured otherwise.
pub const DEFAULT_MODULE_NAME: &str = "Main";

/// Builds a component definition from markup source.
pub fn build_component<'a, M>(source: &'a str, file_id: u32, namespace_mapper: M) -> BuildResult
where
    M: Fn(&str) -> String + 'a,
{
    ComponentBuilder::new(source, file_id)
        .namespace_mapper(namespace_mapper)
        .build()
}

pub struct ComponentBuilder<'a> {
    source: &'a str,
    file_id: u32,
    module_name: String,
    namespace_mapper: NamespaceMapper<'a>,
    module_loader: ModuleLoader<'a>,
    scopes: NamespaceScopes,
    /// Name of the reusable definition being built, once known.
    reusable_name: Option<String>,
}

impl<'a> ComponentBuilder<'a> {
    pub fn new(source: &'a str, file_id: u32) -> Self {
        Self {
            source,
            file_id,
            module_name: DEFAULT_MODULE_NAME.to_string(),
            namespace_mapper: Box::new(|ns: &str| ns.to_string()),
            module_loader: Box::new(|_, _| None),
            scopes: NamespaceScopes::new(),
            reusable_name: None,
        }
    }

    pub fn namespace_mapper<M>(mut self, mapper: M) -> Self
    where
        M: Fn(&str) -> String + 'a,
    {
        self.namespace_mapper = Box::new(mapper);
        self
    }

    /// Loader used to resolve `import` declarations of script blocks.
    pub fn module_loader<L>(mut self, loader: L) -> Self
    where
        L: FnMut(&str, &str) -> Option<String> + 'a,
    {
        self.module_loader = Box::new(loader);
        self
    }

    /// Module name script blocks are resolved under.
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn build(mut self) -> BuildResult {
        log::debug!("building component (file {}, {} bytes)", self.file_id, self.source.len());
        let markup = parse_markup(self.source);
        let mut errors = markup.errors;
        if has_errors(&errors) {
            log::debug!("markup has errors; no component built");
            return BuildResult {
                component: None,
                errors,
                erroneous_reusable_component_name: None,
            };
        }

        match self.build_document(&markup.tree) {
            Ok(component) => BuildResult {
                component: Some(component),
                errors,
                erroneous_reusable_component_name: None,
            },
            Err(diagnostic) => {
                log::debug!("component build failed: {}", diagnostic);
                errors.push(diagnostic);
                BuildResult {
                    component: None,
                    errors,
                    erroneous_reusable_component_name: self.reusable_name,
                }
            }
        }
    }

    fn debug_source(&self, span: Span) -> DebugSource {
        DebugSource {
            start: span.start.offset,
            end: span.end.offset,
            file_id: self.file_id,
        }
    }

    // ------------------------------------------------------------------------
    // Roots
    // ------------------------------------------------------------------------

    fn build_document(&mut self, document: &Document) -> BuildStep<BuiltComponent> {
        let roots: Vec<&Element> = document.elements().collect();
        let root = match roots.as_slice() {
            [root] => *root,
            [_, second, ..] => return Err(Diagnostic::spanning(ErrorKind::ExactlyOneRoot, second.span)),
            [] => return Err(Diagnostic::spanning(ErrorKind::ExactlyOneRoot, document.span)),
        };
        if let Some(script) = document.children.iter().find(|n| matches!(n, MarkupNode::Script(_))) {
            return Err(Diagnostic::spanning(ErrorKind::ExactlyOneRoot, script.span()));
        }

        if is_reusable(root) {
            self.build_reusable(root).map(BuiltComponent::Reusable)
        } else {
            self.build_element(root).map(BuiltComponent::Component)
        }
    }

    fn build_reusable(&mut self, element: &Element) -> BuildStep<ReusableComponentDefinition> {
        self.scopes.push(&element.attributes)?;

        let name = element
            .attribute("name")
            .map(|a| a.value().trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Diagnostic::spanning(ErrorKind::ReusableNameMissing, element.name.span))?;
        self.reusable_name = Some(name.clone());
        if !starts_uppercase(&name) {
            return Err(Diagnostic::spanning(
                ErrorKind::ReusableNameNotCapitalized(name),
                element.name.span,
            ));
        }
        log::trace!("reusable component '{}'", name);

        let mut code_behind = None;
        let mut moved_attributes = Vec::new();
        for attribute in &element.attributes {
            if declared_prefix(attribute).is_some() {
                continue;
            }
            let attribute_name = attribute.name.name.as_str();
            match (&attribute.name.namespace, attribute_name) {
                (None, "name") => {}
                (None, "codeBehind") => code_behind = Some(attribute.value().to_string()),
                (None, n) if n.starts_with("var.") || n.starts_with("method.") => moved_attributes.push(attribute),
                _ => {
                    return Err(Diagnostic::spanning(
                        ErrorKind::InvalidReusableAttribute(attribute.name.to_string()),
                        attribute.span,
                    ))
                }
            }
        }

        let mut nested = Vec::new();
        let mut moved_elements = Vec::new();
        let mut script_parts = Vec::new();
        for child in &element.children {
            match child {
                MarkupNode::Element(e) if is_reusable(e) => {
                    return Err(Diagnostic::spanning(ErrorKind::NestedReusable, e.span))
                }
                MarkupNode::Element(e) => match reserved_kind(e) {
                    Some("variable" | "method") => {
                        self.check_reserved_element(e)?;
                        moved_elements.push(e);
                    }
                    Some(kind @ ("field" | "item")) => {
                        return Err(Diagnostic::spanning(
                            ErrorKind::ValueElementOutsideProperty(kind.to_string()),
                            e.span,
                        ))
                    }
                    Some(kind) => {
                        return Err(Diagnostic::spanning(
                            ErrorKind::ReservedMisplaced {
                                element: kind.to_string(),
                                parent: COMPONENT_TAG.to_string(),
                            },
                            e.span,
                        ))
                    }
                    None => nested.push(self.build_element(e)?),
                },
                MarkupNode::Script(script) if script.has_attributes => {
                    return Err(Diagnostic::spanning(ErrorKind::ScriptWithAttributes, script.span))
                }
                MarkupNode::Script(script) => script_parts.push(script.body.clone()),
                MarkupNode::Text(text) if !text.is_whitespace() => {
                    return Err(Diagnostic::spanning(
                        ErrorKind::TextNotAllowed(COMPONENT_TAG.to_string()),
                        text.span,
                    ))
                }
                MarkupNode::Text(_) | MarkupNode::Error(_) => {}
            }
        }

        let mut component = match nested.len() {
            0 => return Err(Diagnostic::spanning(ErrorKind::ReusableWithoutContent(name), element.span)),
            1 => nested.remove(0),
            _ => {
                let mut fragment = ComponentDefinition::new(FRAGMENT_TAG);
                fragment.children = nested;
                fragment.debug = self.debug_source(element.span);
                fragment
            }
        };

        let mut ignored_script = Vec::new();
        for attribute in moved_attributes {
            apply_attribute(&mut component, attribute, &mut ignored_script)?;
        }
        for reserved in moved_elements {
            self.apply_reserved(&mut component, reserved)?;
        }
        if !script_parts.is_empty() {
            let mut parts: Vec<String> = component.script.take().into_iter().collect();
            parts.extend(script_parts);
            self.attach_script(&mut component, parts);
        }

        self.scopes.pop();
        Ok(ReusableComponentDefinition {
            name,
            component,
            code_behind,
            debug: self.debug_source(element.span),
        })
    }

    // ------------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------------

    fn build_element(&mut self, element: &Element) -> BuildStep<ComponentDefinition> {
        if is_reusable(element) {
            return Err(Diagnostic::spanning(ErrorKind::NestedReusable, element.span));
        }
        if !starts_uppercase(&element.name.name) {
            return Err(Diagnostic::spanning(
                ErrorKind::InvalidComponentName(element.name.to_string()),
                element.name.span,
            ));
        }
        self.scopes.push(&element.attributes)?;

        let mut component = ComponentDefinition::new(element.name.name.clone());
        component.namespace = self.resolve_namespace(element)?;
        component.debug = self.debug_source(element.span);

        let mut script_parts = Vec::new();
        for attribute in &element.attributes {
            apply_attribute(&mut component, attribute, &mut script_parts)?;
        }

        for child in &element.children {
            match child {
                MarkupNode::Element(e) if reserved_kind(e).is_some() => {
                    self.check_reserved_element(e)?;
                    self.apply_reserved(&mut component, e)?;
                }
                MarkupNode::Element(e) => {
                    let nested = self.build_element(e)?;
                    component.children.push(nested);
                }
                MarkupNode::Text(text) if !text.is_whitespace() => {
                    let text_node = self.text_node(text);
                    component.children.push(text_node);
                }
                MarkupNode::Script(script) if script.has_attributes => {
                    return Err(Diagnostic::spanning(ErrorKind::ScriptWithAttributes, script.span))
                }
                MarkupNode::Script(script) => script_parts.push(script.body.clone()),
                MarkupNode::Text(_) | MarkupNode::Error(_) => {}
            }
        }

        self.attach_script(&mut component, script_parts);
        self.scopes.pop();
        Ok(component)
    }

    /// The mapped namespace of an element's tag. An unprefixed tag takes the
    /// default namespace, if one is declared.
    fn resolve_namespace(&self, element: &Element) -> BuildStep<Option<String>> {
        let resolved = match &element.name.namespace {
            Some(prefix) => Some(self.scopes.resolve(prefix).ok_or_else(|| {
                Diagnostic::spanning(ErrorKind::UnresolvedNamespace(prefix.clone()), element.name.span)
            })?),
            None => self.scopes.resolve(DEFAULT_PREFIX),
        };
        Ok(resolved.map(|ns| (self.namespace_mapper)(ns)))
    }

    fn text_node(&self, text: &TextNode) -> ComponentDefinition {
        let mut node = ComponentDefinition::new(TEXT_NODE_TAG);
        node.props
            .insert("value".to_string(), PropValue::Text(segments_text(&text.segments, true)));
        node.debug = self.debug_source(text.span);
        node
    }

    fn attach_script(&mut self, component: &mut ComponentDefinition, parts: Vec<String>) {
        if parts.is_empty() {
            return;
        }
        let script = parts.join("\n");
        match collect_code_behind(&self.module_name, &script, &mut self.module_loader) {
            Ok(collected) => component.script_collected = Some(collected),
            Err(error) => {
                log::debug!(
                    "script of '{}' has {} error(s)",
                    component.name,
                    error.diagnostics().count()
                );
                component.script_error = Some(error);
            }
        }
        component.script = Some(script);
    }

    // ------------------------------------------------------------------------
    // Reserved elements
    // ------------------------------------------------------------------------

    /// Checks that do not depend on the reserved element's kind.
    fn check_reserved_element(&self, element: &Element) -> BuildStep<()> {
        let kind = element.name.name.as_str();
        if element.name.namespace.is_some() {
            return Err(Diagnostic::spanning(
                ErrorKind::ReservedWithNamespace(element.name.to_string()),
                element.name.span,
            ));
        }
        if let Some(attribute) = element.attributes.iter().find(|a| declared_prefix(a).is_some()) {
            return Err(Diagnostic::spanning(
                ErrorKind::NamespaceOnReserved(kind.to_string()),
                attribute.span,
            ));
        }
        Ok(())
    }

    fn apply_reserved(&mut self, component: &mut ComponentDefinition, element: &Element) -> BuildStep<()> {
        let kind = element.name.name.as_str();
        match kind {
            "property" | "variable" => {
                let name = reserved_name(element, kind)?;
                check_attributes(element, &["name", "value"])?;
                let value = self.property_value(element, kind)?;
                let target = if kind == "property" {
                    &mut component.props
                } else {
                    &mut component.vars
                };
                target.insert(name, value);
            }
            "event" | "method" => {
                let name = reserved_name(element, kind)?;
                check_attributes(element, &["name", "value"])?;
                let value = text_only(element, kind)?;
                let target = if kind == "event" {
                    &mut component.events
                } else {
                    &mut component.api
                };
                target.insert(name, value);
            }
            "loaders" => {
                check_attributes(element, &[])?;
                for child in &element.children {
                    match child {
                        MarkupNode::Element(e) if reserved_kind(e).is_none() && !is_reusable(e) => {
                            let loader = self.build_element(e)?;
                            if loader.uid.is_none() {
                                return Err(Diagnostic::spanning(ErrorKind::LoaderUidMissing, e.name.span));
                            }
                            component.loaders.push(loader);
                        }
                        MarkupNode::Text(text) if text.is_whitespace() => {}
                        MarkupNode::Error(_) => {}
                        other => return Err(Diagnostic::spanning(ErrorKind::LoaderNotComponent, other.span())),
                    }
                }
            }
            "uses" => {
                check_attributes(element, &["value"])?;
                let value = element
                    .attribute("value")
                    .ok_or_else(|| Diagnostic::spanning(ErrorKind::UsesValueMissing, element.name.span))?;
                let uses = component.uses.get_or_insert_with(Vec::new);
                uses.extend(
                    value
                        .value()
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            "field" | "item" => {
                return Err(Diagnostic::spanning(
                    ErrorKind::ValueElementOutsideProperty(kind.to_string()),
                    element.span,
                ))
            }
            _ => {
                return Err(Diagnostic::spanning(
                    ErrorKind::ReservedMisplaced {
                        element: kind.to_string(),
                        parent: component.name.clone(),
                    },
                    element.span,
                ))
            }
        }
        Ok(())
    }

    /// The value held by a `property`, `variable`, `field` or `item`
    /// element: its `value` attribute, text, nested components, an object
    /// of `field`s or an array of `item`s.
    fn property_value(&mut self, element: &Element, kind: &str) -> BuildStep<PropValue> {
        if let Some(attribute) = element.attribute("value") {
            return Ok(PropValue::Text(attribute.value().to_string()));
        }
        let elements: Vec<&Element> = element.child_elements().collect();
        if elements.is_empty() {
            return Ok(PropValue::Text(content_text(element)));
        }

        let mut fields = 0;
        let mut items = 0;
        let mut components = 0;
        for child in &elements {
            match reserved_kind(child) {
                Some("field") => fields += 1,
                Some("item") => items += 1,
                Some(other) => {
                    return Err(Diagnostic::spanning(
                        ErrorKind::ReservedMisplaced {
                            element: other.to_string(),
                            parent: kind.to_string(),
                        },
                        child.span,
                    ))
                }
                None => components += 1,
            }
        }
        if fields > 0 && items > 0 {
            return Err(Diagnostic::spanning(ErrorKind::MixedFieldAndItem, element.span));
        }
        if (fields > 0 || items > 0) && components > 0 {
            return Err(Diagnostic::spanning(
                ErrorKind::MixedReservedAndComponents(kind.to_string()),
                element.span,
            ));
        }

        if fields > 0 {
            let mut object = BTreeMap::new();
            for field in elements {
                self.check_reserved_element(field)?;
                let name = field
                    .attribute("name")
                    .map(|a| a.value().trim().to_string())
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| Diagnostic::spanning(ErrorKind::FieldNameMissing, field.name.span))?;
                check_attributes(field, &["name", "value"])?;
                let value = self.property_value(field, "field")?;
                object.insert(name, value);
            }
            Ok(PropValue::Object(object))
        } else if items > 0 {
            let mut array = Vec::new();
            for item in elements {
                self.check_reserved_element(item)?;
                check_attributes(item, &["value"])?;
                array.push(self.property_value(item, "item")?);
            }
            Ok(PropValue::Array(array))
        } else {
            let mut nested = Vec::new();
            for child in &element.children {
                match child {
                    MarkupNode::Element(e) => nested.push(self.build_element(e)?),
                    MarkupNode::Text(text) if !text.is_whitespace() => nested.push(self.text_node(text)),
                    _ => {}
                }
            }
            Ok(PropValue::Components(nested))
        }
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Routes one attribute of a component element.
fn apply_attribute(
    component: &mut ComponentDefinition,
    attribute: &Attribute,
    script_parts: &mut Vec<String>,
) -> BuildStep<()> {
    if let Some(prefix) = declared_prefix(attribute) {
        component
            .namespaces
            .insert(prefix.to_string(), attribute.value().trim().to_string());
        return Ok(());
    }
    if attribute.name.namespace.is_some() {
        return Err(Diagnostic::spanning(
            ErrorKind::InvalidAttributeName(attribute.name.to_string()),
            attribute.span,
        ));
    }

    let name = attribute.name.name.as_str();
    let value = PropValue::from(attribute.value());
    let segmented = [("var.", 0), ("method.", 1), ("event.", 2)]
        .into_iter()
        .find_map(|(prefix, slot)| name.strip_prefix(prefix).map(|rest| (rest, slot)));

    if let Some((rest, slot)) = segmented {
        if !is_identifier(rest) {
            return Err(Diagnostic::spanning(
                ErrorKind::InvalidIdentifier(rest.to_string()),
                attribute.span,
            ));
        }
        let target = match slot {
            0 => &mut component.vars,
            1 => &mut component.api,
            _ => &mut component.events,
        };
        target.insert(rest.to_string(), value);
        return Ok(());
    }

    match name {
        "id" | "uid" => component.uid = Some(attribute.value().to_string()),
        "script" => script_parts.push(attribute.value().to_string()),
        _ => match event_name(name) {
            Some(event) => {
                component.events.insert(event, value);
            }
            None => {
                component.props.insert(name.to_string(), value);
            }
        },
    }
    Ok(())
}

/// `onClick` -> `click`. The letter after `on` must be uppercase.
fn event_name(attribute: &str) -> Option<String> {
    let rest = attribute.strip_prefix("on")?;
    let mut chars = rest.chars();
    let first = chars.next().filter(char::is_ascii_uppercase)?;
    Some(first.to_ascii_lowercase().to_string() + chars.as_str())
}

fn check_attributes(element: &Element, allowed: &[&str]) -> BuildStep<()> {
    match element
        .attributes
        .iter()
        .find(|a| a.name.namespace.is_some() || !allowed.contains(&a.name.name.as_str()))
    {
        Some(attribute) => Err(Diagnostic::spanning(
            ErrorKind::ReservedAttributeNotAllowed {
                element: element.name.to_string(),
                attribute: attribute.name.to_string(),
            },
            attribute.span,
        )),
        None => Ok(()),
    }
}

fn reserved_name(element: &Element, kind: &str) -> BuildStep<String> {
    element
        .attribute("name")
        .map(|a| a.value().trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Diagnostic::spanning(ErrorKind::ReservedNameMissing(kind.to_string()), element.name.span))
}

// ============================================================================
// TEXT
// ============================================================================

/// Text of an element that may only hold text.
fn text_only(element: &Element, kind: &str) -> BuildStep<PropValue> {
    if let Some(attribute) = element.attribute("value") {
        return Ok(PropValue::from(attribute.value()));
    }
    match element
        .children
        .iter()
        .find(|c| !matches!(c, MarkupNode::Text(_) | MarkupNode::Error(_)))
    {
        Some(other) => Err(Diagnostic::spanning(ErrorKind::TextContentOnly(kind.to_string()), other.span())),
        None => Ok(PropValue::Text(content_text(element))),
    }
}

/// Raw text content of an element, trimmed at both ends.
fn content_text(element: &Element) -> String {
    let segments: Vec<TextSegment> = element
        .children
        .iter()
        .filter_map(|c| match c {
            MarkupNode::Text(text) => Some(text.segments.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect();
    segments_text(&segments, false)
}

/// Joins text segments. CDATA is copied verbatim; text may have its
/// whitespace runs collapsed to one space. Text at either end of the run is
/// trimmed.
fn segments_text(segments: &[TextSegment], collapse: bool) -> String {
    let last = segments.len().saturating_sub(1);
    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            TextSegment::CData(raw) => out.push_str(raw),
            TextSegment::Text(text) => {
                let mut piece = if collapse {
                    collapse_whitespace(text)
                } else {
                    text.clone()
                };
                if index == 0 {
                    piece = piece.trim_start().to_string();
                }
                if index == last {
                    piece = piece.trim_end().to_string();
                }
                out.push_str(&piece);
            }
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

// ============================================================================
// NAMES
// ============================================================================

fn is_reusable(element: &Element) -> bool {
    element.name.namespace.is_none() && element.name.name == COMPONENT_TAG
}

/// The reserved kind of an element, judged by its local name.
fn reserved_kind(element: &Element) -> Option<&'static str> {
    RESERVED_ELEMENTS
        .iter()
        .copied()
        .find(|kind| *kind == element.name.name)
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_id_start) && chars.all(is_id_continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> BuildResult {
        build_component(source, 0, |ns| ns.to_string())
    }

    fn component(source: &str) -> ComponentDefinition {
        let result = build(source);
        assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        match result.component {
            Some(BuiltComponent::Component(c)) => c,
            other => panic!("expected a plain component, got {:?}", other),
        }
    }

    fn error_code(source: &str) -> String {
        let result = build(source);
        assert!(result.component.is_none());
        result.errors.last().unwrap().code.clone()
    }

    #[test]
    fn test_attribute_routing() {
        let c = component(r#"<Button id="b1" label="Hi" onClick="go()" var.count="0" method.reset="x = 0" event.hover="h()" enabled/>"#);
        assert_eq!(c.uid.as_deref(), Some("b1"));
        assert_eq!(c.prop_text("label"), Some("Hi"));
        assert_eq!(c.prop_text("enabled"), Some("true"));
        assert_eq!(c.events["click"], PropValue::from("go()"));
        assert_eq!(c.events["hover"], PropValue::from("h()"));
        assert_eq!(c.vars["count"], PropValue::from("0"));
        assert_eq!(c.api["reset"], PropValue::from("x = 0"));
        assert_eq!(c.debug.start, 0);
    }

    #[test]
    fn test_on_prefix_needs_uppercase() {
        let c = component(r#"<Box online="yes"/>"#);
        assert_eq!(c.prop_text("online"), Some("yes"));
        assert!(c.events.is_empty());
    }

    #[test]
    fn test_text_children() {
        let c = component("<Text>  hello \n  world  </Text>");
        assert_eq!(c.children.len(), 1);
        assert_eq!(c.children[0].name, TEXT_NODE_TAG);
        assert_eq!(c.children[0].prop_text("value"), Some("hello world"));

        let c = component("<Text><![CDATA[  a  b ]]></Text>");
        assert_eq!(c.children[0].prop_text("value"), Some("  a  b "));
    }

    #[test]
    fn test_property_values() {
        let c = component(
            r#"<List>
                <property name="title">  Items  </property>
                <property name="header"><Text>H</Text></property>
                <property name="options"><field name="a" value="1"/><field name="b"><item>x</item><item>y</item></field></property>
            </List>"#,
        );
        assert_eq!(c.prop_text("title"), Some("Items"));
        match &c.props["header"] {
            PropValue::Components(components) => assert_eq!(components[0].name, "Text"),
            other => panic!("unexpected {:?}", other),
        }
        let PropValue::Object(options) = &c.props["options"] else {
            panic!("expected an object");
        };
        assert_eq!(options["a"], PropValue::from("1"));
        assert_eq!(options["b"], PropValue::Array(vec![PropValue::from("x"), PropValue::from("y")]));
    }

    #[test]
    fn test_reserved_elements() {
        let c = component(
            r#"<App>
                <variable name="count" value="0"/>
                <event name="click">inc()</event>
                <method name="reset">count = 0</method>
                <uses value="a, b,c"/>
                <loaders><DataLoader uid="users" url="/api"/></loaders>
            </App>"#,
        );
        assert_eq!(c.vars["count"], PropValue::from("0"));
        assert_eq!(c.events["click"], PropValue::from("inc()"));
        assert_eq!(c.api["reset"], PropValue::from("count = 0"));
        assert_eq!(c.uses, Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
        assert_eq!(c.loaders[0].uid.as_deref(), Some("users"));
        assert!(c.children.is_empty());
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(error_code("<A/><B/>"), "T001");
        assert_eq!(error_code(""), "T001");
        assert_eq!(error_code("<button/>"), "T002");
        assert_eq!(error_code("<Component/>"), "T003");
        assert_eq!(error_code(r#"<Component name="foo"><A/></Component>"#), "T004");
        assert_eq!(error_code(r#"<Component name="Foo"></Component>"#), "T005");
        assert_eq!(error_code(r#"<A><Component name="Foo"><B/></Component></A>"#), "T006");
        assert_eq!(error_code(r#"<Component name="Foo" label="x"><A/></Component>"#), "T007");
        assert_eq!(error_code("<A><property/></A>"), "T008");
        assert_eq!(error_code(r#"<A><property name="p" extra="1"/></A>"#), "T009");
        assert_eq!(error_code(r#"<A><event name="e"><B/></event></A>"#), "T010");
        assert_eq!(error_code("<A><uses/></A>"), "T011");
        assert_eq!(error_code(r#"<A><property name="p"><uses value="x"/></property></A>"#), "T012");
        assert_eq!(error_code("<A><script type='x'>var a;</script></A>"), "T013");
        assert_eq!(error_code("<A><loaders>text</loaders></A>"), "T014");
        assert_eq!(error_code("<A><loaders><Loader/></loaders></A>"), "T015");
        assert_eq!(error_code(r#"<A xmlns:x="X"><x:property name="p"/></A>"#), "T016");
        assert_eq!(error_code(r#"<A><property name="p"><field name="a"/><item/></property></A>"#), "T017");
        assert_eq!(error_code(r#"<A><property name="p"><field/></property></A>"#), "T018");
        assert_eq!(error_code("<A><item/></A>"), "T019");
        assert_eq!(error_code(r#"<A><property name="p"><field name="a"/><B/></property></A>"#), "T020");
        assert_eq!(error_code(r#"<A x:y="1" xmlns:x="X"/>"#), "T021");
        assert_eq!(error_code(r#"<A var.1x="1"/>"#), "T022");
        assert_eq!(error_code("<x:A/>"), "T025");
        assert_eq!(error_code(r#"<A xmlns:x=""/>"#), "T026");
        assert_eq!(error_code(r#"<A><property name="p" xmlns:x="X"/></A>"#), "T028");
        assert_eq!(error_code(r#"<Component name="Foo">text<A/></Component>"#), "T029");
    }

    #[test]
    fn test_first_semantic_error_wins() {
        let result = build("<A><property/><item/></A>");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "T008");
    }

    #[test]
    fn test_markup_errors_stop_the_build() {
        let result = build("<A><B></A>");
        assert!(result.component.is_none());
        assert!(result.errors.iter().all(|d| d.code.starts_with('U')));
    }

    #[test]
    fn test_namespaces_are_mapped() {
        let result = build_component(r#"<A xmlns:ns="component-ns"><ns:B/></A>"#, 3, |ns| format!("mapped:{ns}"));
        let Some(BuiltComponent::Component(c)) = result.component else {
            panic!("expected a component");
        };
        assert_eq!(c.namespace, None);
        assert_eq!(c.namespaces.get("ns").map(String::as_str), Some("component-ns"));
        assert_eq!(c.children[0].namespace.as_deref(), Some("mapped:component-ns"));
        assert!(c.children[0].namespaces.is_empty());
        assert_eq!(c.children[0].debug.file_id, 3);
    }

    #[test]
    fn test_reusable_component() {
        let result = build(
            r#"<Component name="Counter" var.count="0" codeBehind="Counter.xs">
                <variable name="step" value="1"/>
                <Button label="+"/>
                <script>function inc() { count += step; }</script>
            </Component>"#,
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let Some(BuiltComponent::Reusable(reusable)) = result.component else {
            panic!("expected a reusable component");
        };
        assert_eq!(reusable.name, "Counter");
        assert_eq!(reusable.code_behind.as_deref(), Some("Counter.xs"));
        let button = &reusable.component;
        assert_eq!(button.name, "Button");
        assert_eq!(button.vars["count"], PropValue::from("0"));
        assert_eq!(button.vars["step"], PropValue::from("1"));
        assert!(button.script_collected.as_ref().unwrap().functions.contains_key("inc"));
    }

    #[test]
    fn test_reusable_with_several_children_gets_a_fragment() {
        let result = build(r#"<Component name="Pair"><A/><B/></Component>"#);
        let component = result.component.unwrap();
        let fragment = component.definition();
        assert_eq!(fragment.name, FRAGMENT_TAG);
        assert_eq!(fragment.children.len(), 2);
    }

    #[test]
    fn test_erroneous_reusable_name() {
        let result = build(r#"<Component name="Broken"><A><item/></A></Component>"#);
        assert_eq!(result.erroneous_reusable_component_name.as_deref(), Some("Broken"));
        assert_eq!(result.errors[0].code, "T019");
    }

    #[test]
    fn test_script_errors_are_attached() {
        let result = build("<A script='var a = 1;'><script>a++;</script></A>");
        assert!(result.errors.is_empty());
        let c = result.component.unwrap();
        let definition = c.definition();
        assert_eq!(definition.script.as_deref(), Some("var a = 1;\na++;"));
        let error = definition.script_error.as_ref().unwrap();
        assert_eq!(error.diagnostics().next().unwrap().code, "W024");
        assert_eq!(build("<A><B><script>let</script></B></A>").script_errors().len(), 1);
    }

    #[test]
    fn test_module_loader_is_used_for_imports() {
        let result = ComponentBuilder::new("<A><script>import { f } from './lib.xs';</script></A>", 0)
            .module_loader(|_, path| (path == "./lib.xs").then(|| "export function f() {}".to_string()))
            .build();
        let component = result.component.unwrap();
        let collected = component.definition().script_collected.as_ref().unwrap();
        assert!(collected.functions.contains_key("f"));
    }
}
