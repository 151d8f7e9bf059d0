//! Code-behind collection: the declarations a component script contributes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::modules::{normalize_module_path, resolve_module, ModuleErrors};
use crate::script::ast::{FunctionDeclaration, Statement, VarDeclaration};
use crate::stream::Span;

/// Variables and functions declared by a script block.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedScript {
    pub vars: BTreeMap<String, VarDeclaration>,
    /// Local functions plus the functions brought in by `import`, keyed by
    /// their local name.
    pub functions: BTreeMap<String, FunctionDeclaration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imported_modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

/// Why a script block could not be collected, per module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptError {
    pub errors: ModuleErrors,
}

impl ScriptError {
    fn single(module: &str, errors: Vec<Diagnostic>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(module.to_string(), errors);
        Self { errors: map }
    }

    /// Every diagnostic, ordered by module name.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.values().flatten()
    }
}

/// Parses a script block as module `module_name`, resolves its imports and
/// collects what it declares.
///
/// Only `var` declarations, function declarations, imports and empty
/// statements may appear at the top level of a script block.
pub fn collect_code_behind<F>(module_name: &str, source: &str, load_module: F) -> Result<CollectedScript, ScriptError>
where
    F: FnMut(&str, &str) -> Option<String>,
{
    let graph = resolve_module(module_name, source, load_module).map_err(|errors| ScriptError { errors })?;
    let Some(root) = graph.root_module() else {
        return Ok(CollectedScript::default());
    };

    let mut collected = CollectedScript {
        imported_modules: root.imported_modules.clone(),
        warnings: root.diagnostics.clone(),
        ..Default::default()
    };
    let mut errors = Vec::new();

    for statement in &root.statements {
        match statement {
            Statement::Var { declarations, .. } => {
                for declaration in declarations {
                    for name in declaration.target.bound_names() {
                        if is_new(&collected, name, declaration.span, &mut errors) {
                            collected.vars.insert(name.to_string(), declaration.clone());
                        }
                    }
                }
            }
            Statement::Function(func) => {
                if is_new(&collected, &func.name, func.span, &mut errors) {
                    collected.functions.insert(func.name.clone(), func.clone());
                }
            }
            Statement::Import(import) => {
                let linked = root.imports.get(&normalize_module_path(module_name, &import.module));
                for specifier in &import.specifiers {
                    let imported = linked
                        .and_then(|linked| linked.get(&specifier.alias))
                        .and_then(|declaration| declaration.as_function());
                    if let Some(func) = imported {
                        if is_new(&collected, &specifier.alias, specifier.span, &mut errors) {
                            collected.functions.insert(specifier.alias.clone(), func.clone());
                        }
                    }
                }
            }
            Statement::Empty { .. } => {}
            other => errors.push(Diagnostic::spanning(ErrorKind::StatementNotAllowed, other.span())),
        }
    }

    if errors.is_empty() {
        log::trace!(
            "code-behind '{}': {} vars, {} functions",
            module_name,
            collected.vars.len(),
            collected.functions.len()
        );
        Ok(collected)
    } else {
        Err(ScriptError::single(module_name, errors))
    }
}

/// Records W025 when `name` is already declared.
fn is_new(collected: &CollectedScript, name: &str, span: Span, errors: &mut Vec<Diagnostic>) -> bool {
    if collected.vars.contains_key(name) || collected.functions.contains_key(name) {
        errors.push(Diagnostic::spanning(ErrorKind::DuplicateDeclaration(name.to_string()), span));
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_modules(_: &str, _: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_vars_and_functions() {
        let collected = collect_code_behind("Main", "var a = 1, {b, c} = x; function f() { return a; } ;", no_modules)
            .unwrap();
        assert_eq!(collected.vars.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(collected.functions.keys().collect::<Vec<_>>(), vec!["f"]);
    }

    #[test]
    fn test_statement_not_allowed() {
        let error = collect_code_behind("Main", "var a = 1; a++;", no_modules).unwrap_err();
        let codes: Vec<_> = error.diagnostics().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["W024"]);
        assert!(error.errors.contains_key("Main"));
    }

    #[test]
    fn test_duplicate_declaration() {
        let error = collect_code_behind("Main", "var a = 1; function a() {}", no_modules).unwrap_err();
        assert_eq!(error.diagnostics().next().unwrap().code, "W025");
    }

    #[test]
    fn test_imported_functions() {
        let loader = |_: &str, path: &str| match path {
            "./util.xs" => Some("export function twice(x) { return x * 2; }".to_string()),
            _ => None,
        };
        let collected = collect_code_behind("Main", "import { twice as double } from './util.xs';", loader).unwrap();
        assert!(collected.functions.contains_key("double"));
        assert_eq!(collected.imported_modules, vec!["util.xs"]);
    }

    #[test]
    fn test_imports_link_against_their_own_module() {
        let loader = |_: &str, path: &str| match path {
            "./a.xs" => Some("export function f(x) {}".to_string()),
            "./b.xs" => Some("export function f(x, y) {} export function h() {}".to_string()),
            _ => None,
        };
        let collected = collect_code_behind(
            "Main",
            "import { f as g } from './b.xs'; import { f } from './a.xs';",
            loader,
        )
        .unwrap();
        assert_eq!(collected.functions["g"].params.len(), 2);
        assert_eq!(collected.functions["f"].params.len(), 1);
        assert_eq!(collected.imported_modules, vec!["b.xs", "a.xs"]);
    }

    #[test]
    fn test_parse_error_becomes_script_error() {
        let error = collect_code_behind("Main", "var = ;", no_modules).unwrap_err();
        assert_eq!(error.errors.keys().collect::<Vec<_>>(), vec!["Main"]);
    }
}
