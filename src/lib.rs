//! Language front end for XMLUI.
//!
//! Source text goes through four stages, each usable on its own:
//!
//! - [`script`]: lexer and parser of the scripting language ([`parse_script`]).
//! - [`markup`]: lexer and error-recovering parser of the markup ([`parse_markup`]).
//! - [`component`]: builds component definitions from markup ([`build_component`]).
//! - [`modules`]: links script modules through `import`/`export` ([`resolve_module`]).
//!
//! Every stage reports problems as [`Diagnostic`]s instead of failing.

pub mod cli;
pub mod component;
pub mod diagnostics;
pub mod markup;
pub mod modules;
pub mod script;
pub mod stream;

pub use crate::component::{build_component, BuildResult, ComponentBuilder, ComponentDefinition};
pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, ErrorKind, SourceDiagnostic};
pub use crate::markup::{parse_markup, MarkupParseResult};
pub use crate::modules::{resolve_module, ModuleGraph};
pub use crate::script::{parse_expression, parse_script, ScriptParseResult};
