// Module graph resolution with an in-memory loader.

use std::cell::RefCell;
use std::collections::HashMap;

use xmlui_front::modules::{resolve_module, ExportedDeclaration};

/// An in-memory file system that counts how often each path was loaded.
struct Files {
    sources: HashMap<&'static str, &'static str>,
    loads: RefCell<HashMap<String, usize>>,
}

impl Files {
    fn new(sources: &[(&'static str, &'static str)]) -> Self {
        Self {
            sources: sources.iter().copied().collect(),
            loads: RefCell::new(HashMap::new()),
        }
    }

    fn load(&self, _from: &str, path: &str) -> Option<String> {
        *self.loads.borrow_mut().entry(path.to_string()).or_default() += 1;
        self.sources.get(path).map(|s| s.to_string())
    }

    fn loads_of(&self, path: &str) -> usize {
        self.loads.borrow().get(path).copied().unwrap_or(0)
    }
}

#[test]
fn mutually_importing_modules_resolve() {
    let files = Files::new(&[
        ("./b.xs", "import { f } from './a.xs'; export function g() { return 1; }"),
        ("./a.xs", "import { g } from './b.xs'; export function f() { return g(); }"),
    ]);
    let graph = resolve_module("a.xs", files.sources["./a.xs"], |from, path| files.load(from, path)).unwrap();

    assert_eq!(graph.modules.len(), 2);
    assert_eq!(files.loads_of("./b.xs"), 1);
    assert_eq!(files.loads_of("./a.xs"), 0);

    let a = graph.module("a.xs").unwrap();
    assert!(a.imports["b.xs"]["g"].as_function().is_some());
    let b = graph.module("b.xs").unwrap();
    assert!(b.imports["a.xs"]["f"].as_function().is_some());
}

#[test]
fn shared_import_is_parsed_once() {
    let files = Files::new(&[
        ("./left.xs", "import { base } from './base.xs'; export function left() {}"),
        ("./right.xs", "import { base } from './base.xs'; export function right() {}"),
        ("./base.xs", "export function base() {}"),
    ]);
    let root = "import { left } from './left.xs'; import { right } from './right.xs';";
    let graph = resolve_module("main.xs", root, |from, path| files.load(from, path)).unwrap();
    assert_eq!(graph.modules.len(), 4);
    assert_eq!(files.loads_of("./base.xs"), 1);
}

#[test]
fn duplicate_export_is_reported_once() {
    let graph = resolve_module(
        "main.xs",
        "export const a = 1; export function a() {} export const b = 2;",
        |_, _| None,
    )
    .unwrap();
    let root = graph.root_module().unwrap();
    let w021: Vec<_> = root.diagnostics.iter().filter(|d| d.code == "W021").collect();
    assert_eq!(w021.len(), 1);
    assert_eq!(root.exports.keys().filter(|k| *k == "a").count(), 1);
    assert!(matches!(root.exports["a"], ExportedDeclaration::Const(_)));
}

#[test]
fn duplicate_import_alias_is_a_warning() {
    let graph = resolve_module(
        "main.xs",
        "import { f, g as f } from './lib.xs';",
        |_, _| Some("export function f() {} export function g() {}".to_string()),
    )
    .unwrap();
    let root = graph.root_module().unwrap();
    assert_eq!(root.diagnostics.len(), 1);
    assert_eq!(root.diagnostics[0].code, "W019");
}

#[test]
fn unresolved_module_is_reported_on_the_importer() {
    let errors = resolve_module("main.xs", "import { f } from './missing.xs';", |_, _| None).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["main.xs"][0].code, "W022");
}

#[test]
fn missing_export_is_reported_on_the_importer() {
    let errors = resolve_module("main.xs", "import { nope } from './lib.xs';", |_, _| {
        Some("export function f() {}".to_string())
    })
    .unwrap_err();
    assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["main.xs"]);
    assert_eq!(errors["main.xs"][0].code, "W023");
}

#[test]
fn parse_errors_in_an_import_fail_the_whole_graph() {
    let errors = resolve_module("main.xs", "import { f } from './lib.xs';", |_, _| Some("export function f( {".to_string()))
        .unwrap_err();
    assert!(errors.contains_key("lib.xs"));
    assert!(!errors.contains_key("main.xs"));
}

#[test]
fn relative_paths_are_resolved_against_the_importer() {
    let graph = resolve_module("src/pages/home.xs", "import { f } from '../lib/util.xs';", |from, path| {
        assert_eq!((from, path), ("src/pages/home.xs", "../lib/util.xs"));
        Some("export function f() {}".to_string())
    })
    .unwrap();
    assert!(graph.module("src/lib/util.xs").is_some());
    assert_eq!(graph.root_module().unwrap().imported_modules, vec!["src/lib/util.xs"]);
}
