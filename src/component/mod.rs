//! Component definitions built from markup.

pub mod builder;
pub mod code_behind;
pub mod definition;
pub mod namespaces;

pub use builder::{build_component, ComponentBuilder, ModuleLoader, NamespaceMapper};
pub use code_behind::{collect_code_behind, CollectedScript, ScriptError};
pub use definition::{
    BuildResult, BuiltComponent, ComponentDefinition, DebugSource, PropValue, ReusableComponentDefinition,
};
pub use namespaces::NamespaceScopes;
