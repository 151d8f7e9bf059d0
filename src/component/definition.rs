//! The component definition object graph produced from markup.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::component::code_behind::{CollectedScript, ScriptError};
use crate::diagnostics::Diagnostic;

/// The value of a property, event, variable or method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Text(String),
    Components(Vec<ComponentDefinition>),
    /// Built from `<field>` children.
    Object(BTreeMap<String, PropValue>),
    /// Built from `<item>` children.
    Array(Vec<PropValue>),
}

impl PropValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

/// Where a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSource {
    pub start: usize,
    pub end: usize,
    pub file_id: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    /// The component type (`Button`, `Stack`, `TextNode`, …).
    #[serde(rename = "type")]
    pub name: String,
    /// Resolved (and mapped) namespace of the tag, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// `xmlns` declarations made on this element, by prefix (`""` is the
    /// default namespace). Values are as declared, before mapping.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, PropValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub events: BTreeMap<String, PropValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, PropValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub api: BTreeMap<String, PropValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub loaders: Vec<ComponentDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentDefinition>,
    /// Script blocks and `script` attributes, joined with newlines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_collected: Option<CollectedScript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_error: Option<ScriptError>,
    pub debug: DebugSource,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn prop_text(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(PropValue::as_text)
    }

    /// Visits this definition and every nested one (children, loaders and
    /// component-valued properties), depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ComponentDefinition)) {
        visit(self);
        for child in self.children.iter().chain(&self.loaders) {
            child.walk(visit);
        }
        for value in self
            .props
            .values()
            .chain(self.events.values())
            .chain(self.vars.values())
            .chain(self.api.values())
        {
            walk_value(value, visit);
        }
    }
}

fn walk_value<'a>(value: &'a PropValue, visit: &mut dyn FnMut(&'a ComponentDefinition)) {
    match value {
        PropValue::Text(_) => {}
        PropValue::Components(components) => components.iter().for_each(|c| c.walk(visit)),
        PropValue::Object(fields) => fields.values().for_each(|v| walk_value(v, visit)),
        PropValue::Array(items) => items.iter().for_each(|v| walk_value(v, visit)),
    }
}

/// A named definition declared with a `<Component name="…">` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReusableComponentDefinition {
    pub name: String,
    pub component: ComponentDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_behind: Option<String>,
    pub debug: DebugSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BuiltComponent {
    Component(ComponentDefinition),
    Reusable(ReusableComponentDefinition),
}

impl BuiltComponent {
    /// The component tree: the definition itself, or the one a reusable
    /// wrapper declares.
    pub fn definition(&self) -> &ComponentDefinition {
        match self {
            BuiltComponent::Component(component) => component,
            BuiltComponent::Reusable(reusable) => &reusable.component,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub component: Option<BuiltComponent>,
    pub errors: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erroneous_reusable_component_name: Option<String>,
}

impl BuildResult {
    /// Script errors attached anywhere in the built tree.
    pub fn script_errors<'a>(&'a self) -> Vec<&'a ScriptError> {
        let mut errors = Vec::new();
        if let Some(component) = &self.component {
            component.definition().walk(&mut |c: &'a ComponentDefinition| {
                if let Some(error) = &c.script_error {
                    errors.push(error);
                }
            });
        }
        errors
    }
}
