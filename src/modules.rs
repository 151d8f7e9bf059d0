//! Script module resolution.
//!
//! [`resolve_module`] parses a root module, follows its `import`
//! declarations through a caller-supplied loader and links every imported
//! name against the target module's export table.
//!
//! Modules are keyed by their normalized path (`./` and `../` folded
//! against the importing module's directory). Each call owns a private
//! cache, so a module imported from several places is parsed once, and a
//! module that is still being resolved is reused instead of re-entered;
//! that is what lets two modules import each other. Circular *value*
//! dependencies are not analysed: a module reached again through a cycle is
//! linked with whatever exports it declares.
//!
//! The result is all-or-nothing. When any module in the closure has an
//! error-category diagnostic the caller gets the per-module diagnostic map
//! and no graph. Warnings (duplicate exports, duplicate import aliases) stay
//! on the modules of a successful graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::diagnostics::{has_errors, Diagnostic, ErrorKind};
use crate::script::ast::{FunctionDeclaration, ImportDeclaration, Statement, VarDeclaration};
use crate::script::parser::parse_script;

/// Diagnostics per module name, returned when resolution fails.
pub type ModuleErrors = BTreeMap<String, Vec<Diagnostic>>;

/// A declaration visible to importing modules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ExportedDeclaration {
    Const(VarDeclaration),
    Function(FunctionDeclaration),
}

impl ExportedDeclaration {
    pub fn as_function(&self) -> Option<&FunctionDeclaration> {
        match self {
            ExportedDeclaration::Function(func) => Some(func),
            ExportedDeclaration::Const(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptModule {
    pub name: String,
    pub exports: BTreeMap<String, ExportedDeclaration>,
    /// Names of the modules this one imports from, in import order.
    pub imported_modules: Vec<String>,
    /// Imported declarations: module name -> local alias -> declaration.
    pub imports: BTreeMap<String, BTreeMap<String, ExportedDeclaration>>,
    /// Every top-level function declaration, exported or not.
    pub functions: BTreeMap<String, FunctionDeclaration>,
    pub statements: Vec<Statement>,
    /// Warning-category diagnostics of this module.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleGraph {
    pub root: String,
    pub modules: BTreeMap<String, ScriptModule>,
}

impl ModuleGraph {
    pub fn root_module(&self) -> Option<&ScriptModule> {
        self.modules.get(&self.root)
    }

    pub fn module(&self, name: &str) -> Option<&ScriptModule> {
        self.modules.get(name)
    }
}

/// Resolves `root_source` (named `root_name`) and everything it imports.
///
/// `load_module(from, path)` receives the importing module's name and the
/// path exactly as written in the `import`; it returns the source text or
/// `None` when the module does not exist.
pub fn resolve_module<F>(root_name: &str, root_source: &str, load_module: F) -> Result<ModuleGraph, ModuleErrors>
where
    F: FnMut(&str, &str) -> Option<String>,
{
    ModuleResolver::new(load_module).resolve(root_name, root_source)
}

/// One resolution run. Not meant to be shared: every top-level resolution
/// needs its own instance.
pub struct ModuleResolver<F> {
    load_module: F,
    modules: BTreeMap<String, ScriptModule>,
    /// Modules whose source failed to parse.
    failed: BTreeSet<String>,
    diagnostics: ModuleErrors,
}

impl<F> ModuleResolver<F>
where
    F: FnMut(&str, &str) -> Option<String>,
{
    pub fn new(load_module: F) -> Self {
        Self {
            load_module,
            modules: BTreeMap::new(),
            failed: BTreeSet::new(),
            diagnostics: BTreeMap::new(),
        }
    }

    pub fn resolve(mut self, root_name: &str, root_source: &str) -> Result<ModuleGraph, ModuleErrors> {
        log::debug!("resolving module graph from '{}'", root_name);
        self.resolve_source(root_name, root_source);

        let failed = self.diagnostics.values().any(|d| has_errors(d));
        if failed {
            log::debug!("module resolution failed in {} module(s)", self.diagnostics.len());
            return Err(self.diagnostics);
        }
        for (name, diagnostics) in self.diagnostics {
            if let Some(module) = self.modules.get_mut(&name) {
                module.diagnostics = diagnostics;
            }
        }
        log::debug!("module graph resolved: {} module(s)", self.modules.len());
        Ok(ModuleGraph {
            root: root_name.to_string(),
            modules: self.modules,
        })
    }

    fn record(&mut self, module: &str, diagnostic: Diagnostic) {
        self.diagnostics.entry(module.to_string()).or_default().push(diagnostic);
    }

    fn resolve_source(&mut self, name: &str, source: &str) {
        let parsed = parse_script(source);
        for diagnostic in &parsed.errors {
            self.record(name, diagnostic.clone());
        }
        let Some(statements) = parsed.statements else {
            self.failed.insert(name.to_string());
            return;
        };

        let mut module = ScriptModule {
            name: name.to_string(),
            exports: BTreeMap::new(),
            imported_modules: Vec::new(),
            imports: BTreeMap::new(),
            functions: BTreeMap::new(),
            statements: Vec::new(),
            diagnostics: Vec::new(),
        };
        let mut warnings = Vec::new();
        for statement in &statements {
            collect_declarations(statement, &mut module, &mut warnings);
        }
        for warning in warnings {
            self.record(name, warning);
        }

        // Exports are visible before imports are followed, so a module that
        // imports this one back can link against them.
        module.statements = statements;
        self.modules.insert(name.to_string(), module);

        let imports: Vec<ImportDeclaration> = self.modules[name]
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::Import(import) => Some(import.clone()),
                _ => None,
            })
            .collect();
        for import in imports {
            self.resolve_import(name, &import);
        }
    }

    fn resolve_import(&mut self, from: &str, import: &ImportDeclaration) {
        let mut seen = BTreeSet::new();
        for specifier in &import.specifiers {
            if !seen.insert(specifier.alias.as_str()) {
                self.record(
                    from,
                    Diagnostic::spanning(ErrorKind::DuplicateImportAlias(specifier.alias.clone()), specifier.span),
                );
            }
        }

        let target = normalize_module_path(from, &import.module);
        if self.modules.contains_key(&target) || self.failed.contains(&target) {
            log::trace!("module cache hit: '{}'", target);
        } else {
            match (self.load_module)(from, &import.module) {
                Some(source) => self.resolve_source(&target, &source),
                None => {
                    self.record(
                        from,
                        Diagnostic::spanning(ErrorKind::UnresolvedModule(import.module.clone()), import.span),
                    );
                    return;
                }
            }
        }
        if self.failed.contains(&target) {
            return;
        }

        let mut linked = BTreeMap::new();
        let mut missing = Vec::new();
        if let Some(target_module) = self.modules.get(&target) {
            for specifier in &import.specifiers {
                match target_module.exports.get(&specifier.name) {
                    Some(declaration) => {
                        linked
                            .entry(specifier.alias.clone())
                            .or_insert_with(|| declaration.clone());
                    }
                    None => missing.push(Diagnostic::spanning(
                        ErrorKind::MissingExport {
                            module: import.module.clone(),
                            name: specifier.name.clone(),
                        },
                        specifier.span,
                    )),
                }
            }
        }
        for diagnostic in missing {
            self.record(from, diagnostic);
        }
        if let Some(module) = self.modules.get_mut(from) {
            if !module.imported_modules.contains(&target) {
                module.imported_modules.push(target.clone());
            }
            module.imports.entry(target).or_default().extend(linked);
        }
    }
}

/// Fills the export and function tables from one top-level statement.
fn collect_declarations(statement: &Statement, module: &mut ScriptModule, warnings: &mut Vec<Diagnostic>) {
    let mut export = |name: &str, declaration: ExportedDeclaration, span| {
        if module.exports.contains_key(name) {
            warnings.push(Diagnostic::spanning(ErrorKind::DuplicateExport(name.to_string()), span));
        } else {
            module.exports.insert(name.to_string(), declaration);
        }
    };
    match statement {
        Statement::Const {
            declarations,
            exported: true,
            ..
        } => {
            for declaration in declarations {
                for name in declaration.target.bound_names() {
                    export(name, ExportedDeclaration::Const(declaration.clone()), declaration.span);
                }
            }
        }
        Statement::Function(func) => {
            if func.exported {
                export(&func.name, ExportedDeclaration::Function(func.clone()), func.span);
            }
            module.functions.entry(func.name.clone()).or_insert_with(|| func.clone());
        }
        _ => {}
    }
}

/// Folds `path` against the directory of `from`. Relative paths start with
/// `./` or `../`; anything else is only cleaned up.
pub fn normalize_module_path(from: &str, path: &str) -> String {
    let relative = path.starts_with("./") || path.starts_with("../");
    let joined = if relative {
        match from.rfind('/') {
            Some(index) => format!("{}/{}", &from[..index], path),
            None => path.to_string(),
        }
    } else {
        path.to_string()
    };

    let absolute = joined.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|s| *s != "..") => {
                segments.pop();
            }
            ".." if absolute => {}
            other => segments.push(other),
        }
    }
    let normalized = segments.join("/");
    if absolute {
        format!("/{normalized}")
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_module_path() {
        assert_eq!(normalize_module_path("src/main.xs", "./util.xs"), "src/util.xs");
        assert_eq!(normalize_module_path("src/a/main.xs", "../b/./util.xs"), "src/b/util.xs");
        assert_eq!(normalize_module_path("main.xs", "./util.xs"), "util.xs");
        assert_eq!(normalize_module_path("main.xs", "../util.xs"), "../util.xs");
        assert_eq!(normalize_module_path("/app/main.xs", "./lib/x.xs"), "/app/lib/x.xs");
        assert_eq!(normalize_module_path("/main.xs", "../x.xs"), "/x.xs");
        assert_eq!(normalize_module_path("main.xs", "lib//x.xs"), "lib/x.xs");
    }

    #[test]
    fn test_single_module_exports() {
        let graph = resolve_module(
            "main",
            "export const a = 1, b = 2; export function f() {} function g() {}",
            |_, _| None,
        )
        .unwrap();
        let root = graph.root_module().unwrap();
        assert_eq!(root.exports.keys().collect::<Vec<_>>(), vec!["a", "b", "f"]);
        assert_eq!(root.functions.len(), 2);
    }

    #[test]
    fn test_duplicate_export_is_a_warning() {
        let graph = resolve_module("main", "export const a = 1; export function a() {}", |_, _| None).unwrap();
        let root = graph.root_module().unwrap();
        assert_eq!(root.exports.len(), 1);
        assert!(matches!(root.exports["a"], ExportedDeclaration::Const(_)));
        assert_eq!(root.diagnostics.len(), 1);
        assert_eq!(root.diagnostics[0].code, "W021");
    }

    #[test]
    fn test_parse_errors_fail_resolution() {
        let errors = resolve_module("main", "let = ;", |_, _| None).unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["main"]);
    }
}
