// Markup parsing and recovery through the public API.

use xmlui_front::markup::{
    parse_markup, tokenize_markup, Element, ElementPartKind, MarkupNode, MarkupTokenKind, TextSegment,
};
use xmlui_front::stream::Span;

fn root(source: &str) -> (Element, Vec<String>) {
    let result = parse_markup(source);
    let codes = result.errors.iter().map(|d| d.code.clone()).collect();
    let element = result.tree.elements().next().cloned().expect("a root element");
    (element, codes)
}

#[test]
fn tag_mismatch_keeps_the_tree() {
    let (foo, codes) = root("<Foo><Bar/></Baz>");
    assert_eq!(codes, vec!["U007"]);
    assert_eq!(foo.name.name, "Foo");
    let children: Vec<&Element> = foo.child_elements().collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name.name, "Bar");
}

#[test]
fn closing_an_ancestor_reports_the_missing_tag() {
    let (outer, codes) = root("<A><B><C/></A>");
    assert_eq!(codes, vec!["U006"]);
    assert_eq!(outer.name.name, "A");
    let b = outer.child_elements().next().unwrap();
    assert_eq!(b.child_elements().count(), 1);
}

#[test]
fn duplicate_attribute_keeps_the_first_value() {
    let result = parse_markup(r#"<Button a="1" a="2" />"#);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "U012");
    assert!(result.errors[0].message.contains('a'));
    let button = result.tree.elements().next().unwrap();
    assert_eq!(button.attribute("a").unwrap().value(), "1");
}

#[test]
fn siblings_parse_after_a_broken_element() {
    let result = parse_markup("<Root><A = /><B/></Root>");
    assert!(!result.errors.is_empty());
    let root = result.tree.elements().next().unwrap();
    assert!(root.child_elements().any(|e| e.name.name == "B"));
}

#[test]
fn namespaced_names_and_bare_attributes() {
    let (element, codes) = root(r#"<ui:Button xmlns:ui="core" enabled label='x &amp; y'/>"#);
    assert!(codes.is_empty());
    assert_eq!(element.name.namespace.as_deref(), Some("ui"));
    assert_eq!(element.attribute("enabled").unwrap().value(), "true");
    assert_eq!(element.attribute("label").unwrap().value(), "x & y");
    assert!(element.self_closing);
}

#[test]
fn text_is_decoded_once_per_run() {
    let (element, _) = root("<Text>1 &lt; 2 &amp;&amp; <![CDATA[<b>]]> ok</Text>");
    let MarkupNode::Text(text) = &element.children[0] else {
        panic!("expected text");
    };
    assert_eq!(
        text.segments,
        vec![
            TextSegment::Text("1 < 2 && ".to_string()),
            TextSegment::CData("<b>".to_string()),
            TextSegment::Text(" ok".to_string()),
        ]
    );
}

#[test]
fn script_blocks_are_kept_raw() {
    let (element, codes) = root("<App><script>if (a < b) { x = '</div>'; }</script></App>");
    assert!(codes.is_empty());
    let MarkupNode::Script(script) = &element.children[0] else {
        panic!("expected a script node");
    };
    assert_eq!(script.body, "if (a < b) { x = '</div>'; }");
}

#[test]
fn text_outside_an_element_is_reported() {
    let result = parse_markup("hello <A/>");
    assert_eq!(result.errors[0].code, "U013");
}

#[test]
fn stray_closing_tag_is_reported() {
    let result = parse_markup("<A/></B>");
    assert!(result.errors.iter().any(|d| d.code == "U011"));
}

#[test]
fn comments_never_reach_the_parser() {
    let (tokens, errors) = tokenize_markup("<!-- a --><A><!-- b --></A>");
    assert!(errors.is_empty());
    assert!(tokens.iter().all(|t| t.kind != MarkupTokenKind::Text));
}

#[test]
fn diagnostics_carry_line_and_column() {
    let result = parse_markup("<A>\n  <B></C>\n</A>");
    let mismatch = result.errors.iter().find(|d| d.code == "U007").unwrap();
    assert_eq!(mismatch.line, 2);
    assert!(mismatch.column >= 5);
}

#[test]
fn self_closing_script_does_not_swallow_its_siblings() {
    let (app, codes) = root("<App><script/><B/><script>var x;</script></App>");
    assert!(codes.is_empty());
    assert_eq!(app.child_elements().map(|e| e.name.name.as_str()).collect::<Vec<_>>(), vec!["B"]);
    let bodies: Vec<&str> = app
        .children
        .iter()
        .filter_map(|node| match node {
            MarkupNode::Script(script) => Some(script.body.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(bodies, vec!["", "var x;"]);
}

fn assert_ordered(spans: &[Span], parent: Span, what: &str) {
    for span in spans {
        assert!(parent.contains(span), "{what} {span:?} escapes {parent:?}");
    }
    for pair in spans.windows(2) {
        assert!(pair[0].end.offset <= pair[1].start.offset, "{what} out of order: {pair:?}");
    }
}

fn assert_element_spans(element: &Element) {
    let parts: Vec<Span> = element.parts.iter().map(|p| p.span).collect();
    assert_ordered(&parts, element.span, "part");

    let mut children = vec![element.name.span];
    children.extend(element.attributes.iter().map(|a| a.span));
    children.extend(element.children.iter().map(MarkupNode::span));
    children.extend(element.closing_name.iter().map(|n| n.span));
    assert_ordered(&children, element.span, "child");

    for attribute in &element.attributes {
        let inner: Vec<Span> = std::iter::once(attribute.name.span).chain(attribute.value_span).collect();
        assert_ordered(&inner, attribute.span, "attribute piece");
    }
    for child in element.child_elements() {
        assert_element_spans(child);
    }
}

#[test]
fn element_spans_nest_and_siblings_are_ordered() {
    let source = r#"<!-- page -->
<App xmlns:ui="core" var.count="{0}" enabled>
  <ui:Stack gap='4'>
    <Text>Count: {count} &amp; more <![CDATA[<raw>]]></Text>
    <Button label="Add" onClick="count++"/>
    <property name="footer"><Text>x</Text></property>
  </ui:Stack>
  <script>
    function reset() { count = 0; }
  </script>
</App>
"#;
    let result = parse_markup(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let top: Vec<Span> = result.tree.children.iter().map(MarkupNode::span).collect();
    assert_ordered(&top, result.tree.span, "top-level node");

    let app = result.tree.elements().next().unwrap();
    assert_eq!(
        app.part_kinds(),
        vec![
            ElementPartKind::OpenNodeStart,
            ElementPartKind::TagName,
            ElementPartKind::AttributeList,
            ElementPartKind::NodeEnd,
            ElementPartKind::ContentList,
            ElementPartKind::CloseNodeStart,
            ElementPartKind::TagName,
            ElementPartKind::NodeEnd,
        ]
    );
    assert_element_spans(app);
}
