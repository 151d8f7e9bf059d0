// Component definitions built from whole markup files.

use xmlui_front::component::{build_component, BuildResult, BuiltComponent, ComponentBuilder, PropValue};
use xmlui_front::ComponentDefinition;

fn identity(ns: &str) -> String {
    ns.to_string()
}

fn build(source: &str) -> BuildResult {
    build_component(source, 1, identity)
}

fn plain(result: BuildResult) -> ComponentDefinition {
    match result.component {
        Some(BuiltComponent::Component(component)) => component,
        other => panic!("expected a plain component, got {:?}", other),
    }
}

#[test]
fn reusable_component_end_to_end() {
    let result = build(r#"<Component name="Foo"><Stack><Button label="Hi"/></Stack></Component>"#);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.erroneous_reusable_component_name.is_none());

    let Some(BuiltComponent::Reusable(foo)) = result.component else {
        panic!("expected a reusable component");
    };
    assert_eq!(foo.name, "Foo");
    let stack = &foo.component;
    assert_eq!(stack.name, "Stack");
    assert_eq!(stack.children.len(), 1);
    assert_eq!(stack.children[0].name, "Button");
    assert_eq!(stack.children[0].prop_text("label"), Some("Hi"));
}

#[test]
fn duplicate_attribute_first_value_wins() {
    let result = build(r#"<Button a="1" a="2" />"#);
    let duplicates: Vec<_> = result.errors.iter().filter(|d| d.code == "U012").collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].message.contains("'a'"));
    assert_eq!(result.errors.len(), 1);
    let button = plain(result);
    assert_eq!(button.props["a"], PropValue::from("1"));
}

#[test]
fn namespace_is_resolved_inside_its_scope() {
    let root = plain(build(r#"<Root><A xmlns:ns="M"><ns:B/></A></Root>"#));
    let b = &root.children[0].children[0];
    assert_eq!(b.name, "B");
    assert_eq!(b.namespace.as_deref(), Some("M"));
}

#[test]
fn namespace_is_gone_after_its_scope() {
    let result = build(r#"<Root><A xmlns:ns="M"><ns:B/></A><ns:B/></Root>"#);
    assert!(result.component.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "T025");
    assert!(result.errors[0].message.contains("ns"));
}

#[test]
fn default_namespace_applies_to_unprefixed_tags() {
    let root = plain(build_component(r#"<App xmlns="core"><Button/></App>"#, 0, |ns| {
        format!("#{ns}")
    }));
    assert_eq!(root.namespace.as_deref(), Some("#core"));
    assert_eq!(root.children[0].namespace.as_deref(), Some("#core"));
}

#[test]
fn only_one_semantic_error_is_reported() {
    let result = build(r#"<Root><property/><A xmlns:x=""/></Root>"#);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "T008");
}

#[test]
fn markup_errors_are_all_reported() {
    let result = build("<A><B></C><D = /></A>");
    assert!(result.component.is_none());
    assert!(result.errors.len() >= 2);
}

#[test]
fn errors_inside_a_reusable_component_name_it() {
    let result = build(r#"<Component name="Card"><Stack><uses/></Stack></Component>"#);
    assert_eq!(result.errors[0].code, "T011");
    assert_eq!(result.erroneous_reusable_component_name.as_deref(), Some("Card"));
}

#[test]
fn script_block_with_imports() {
    let result = ComponentBuilder::new(
        r#"<App><script>import { add } from './math.xs'; var total = add(1, 2);</script></App>"#,
        7,
    )
    .module_name("app/Main.xmlui")
    .module_loader(|from, path| {
        assert_eq!((from, path), ("app/Main.xmlui", "./math.xs"));
        Some("export function add(a, b) { return a + b; }".to_string())
    })
    .build();
    let app = plain(result);
    let collected = app.script_collected.as_ref().unwrap();
    assert!(collected.vars.contains_key("total"));
    assert!(collected.functions.contains_key("add"));
    assert_eq!(collected.imported_modules, vec!["app/math.xs"]);
    assert_eq!(app.debug.file_id, 7);
}

#[test]
fn script_errors_do_not_stop_the_build() {
    let result = build("<App><script>var a = ;</script><Text>after</Text></App>");
    assert!(result.errors.is_empty());
    assert_eq!(result.script_errors().len(), 1);
    let app = plain(result);
    assert_eq!(app.children[0].name, "Text");
    assert!(app.script_error.is_some());
}

#[test]
fn definitions_serialize_with_camel_case_keys() {
    let result = build(r#"<Component name="Foo"><Button onClick="go()"/></Component>"#);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["component"]["name"], "Foo");
    assert_eq!(json["component"]["component"]["type"], "Button");
    assert_eq!(json["component"]["component"]["events"]["click"], "go()");
    assert_eq!(json["component"]["component"]["debug"]["fileId"], 1);
}

#[test]
fn self_closing_script_keeps_the_following_children() {
    let app = plain(build("<App><script/><B/><script>var x = 1;</script></App>"));
    assert_eq!(app.children.len(), 1);
    assert_eq!(app.children[0].name, "B");
    assert!(app.script_collected.as_ref().unwrap().vars.contains_key("x"));
}
