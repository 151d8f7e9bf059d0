//! Tokens and tree nodes of XMLUI markup.

use serde::Serialize;

use crate::stream::Span;

// ============================================================================
// TOKENS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkupTokenKind {
    Eof,
    Unknown,
    /// `<`
    OpenNodeStart,
    /// `</`
    CloseNodeStart,
    /// `>`
    NodeEnd,
    /// `/>`
    NodeClose,
    Identifier,
    Colon,
    Equal,
    StringLiteral,
    /// A run of character data in element content.
    Text,
    AmpEntity,
    LtEntity,
    GtEntity,
    QuotEntity,
    AposEntity,
    /// `<![CDATA[ … ]]>`
    CData,
    /// `<script …> … </script>`, captured verbatim.
    Script,
}

impl MarkupTokenKind {
    /// The character an entity token stands for.
    pub fn entity_char(self) -> Option<char> {
        match self {
            MarkupTokenKind::AmpEntity => Some('&'),
            MarkupTokenKind::LtEntity => Some('<'),
            MarkupTokenKind::GtEntity => Some('>'),
            MarkupTokenKind::QuotEntity => Some('"'),
            MarkupTokenKind::AposEntity => Some('\''),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupToken {
    pub kind: MarkupTokenKind,
    pub text: String,
    pub span: Span,
}

impl MarkupToken {
    pub fn new(kind: MarkupTokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// The five predefined entities, as spelled in source.
pub const ENTITIES: &[(&str, MarkupTokenKind)] = &[
    ("&amp;", MarkupTokenKind::AmpEntity),
    ("&lt;", MarkupTokenKind::LtEntity),
    ("&gt;", MarkupTokenKind::GtEntity),
    ("&quot;", MarkupTokenKind::QuotEntity),
    ("&apos;", MarkupTokenKind::AposEntity),
];

/// Replaces the predefined entities in `text` with their characters.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('&') {
        out.push_str(&rest[..index]);
        rest = &rest[index..];
        let decoded = ENTITIES
            .iter()
            .find(|(spelling, _)| rest.starts_with(spelling))
            .and_then(|(spelling, kind)| Some((spelling.len(), kind.entity_char()?)));
        match decoded {
            Some((len, ch)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// TREE
// ============================================================================

/// A possibly namespace-qualified name (`Button`, `ns:Button`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub name: String,
    pub span: Span,
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}:{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// The attribute key.
    pub name: QualifiedName,
    /// Entity-decoded value; `None` for a bare attribute.
    pub value: Option<String>,
    /// The quoted value as written.
    pub value_span: Option<Span>,
    pub span: Span,
}

impl Attribute {
    /// The attribute value; a bare attribute reads as `"true"`.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("true")
    }
}

/// The syntactic pieces an element is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementPartKind {
    /// `<`
    OpenNodeStart,
    /// The opening or the closing tag name.
    TagName,
    /// All attributes of the opening tag.
    AttributeList,
    /// `>`
    NodeEnd,
    /// `/>`
    NodeClose,
    /// Everything between the opening and the closing tag.
    ContentList,
    /// `</`
    CloseNodeStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementPart {
    pub kind: ElementPartKind,
    pub span: Span,
}

/// An element with its name, attributes and content, plus the spans of
/// its syntax in source order:
///
/// ```text
/// OpenNodeStart TagName AttributeList? (NodeEnd | NodeClose)
///     ContentList? CloseNodeStart TagName NodeEnd
/// ```
///
/// Self-closing elements stop after `NodeClose`. Parts that are missing
/// from broken markup are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub name: QualifiedName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<MarkupNode>,
    /// The name in the closing tag, when one was matched.
    pub closing_name: Option<QualifiedName>,
    pub parts: Vec<ElementPart>,
    pub self_closing: bool,
    pub span: Span,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.name == name)
    }

    pub fn part_kinds(&self) -> Vec<ElementPartKind> {
        self.parts.iter().map(|p| p.kind).collect()
    }

    /// Child elements, skipping text, scripts and error nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            MarkupNode::Element(e) => Some(e),
            _ => None,
        })
    }
}

/// Decoded text content. CDATA sections stay separate so that later
/// whitespace handling can leave them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TextSegment {
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub segments: Vec<TextSegment>,
    pub span: Span,
}

impl TextNode {
    pub fn is_whitespace(&self) -> bool {
        self.segments.iter().all(|s| match s {
            TextSegment::Text(t) => t.trim().is_empty(),
            TextSegment::CData(_) => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptNode {
    /// Source text between `<script>` and `</script>`.
    pub body: String,
    pub has_attributes: bool,
    pub span: Span,
    pub body_span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNode {
    pub code: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum MarkupNode {
    Element(Element),
    Text(TextNode),
    Script(ScriptNode),
    Error(ErrorNode),
}

impl MarkupNode {
    pub fn span(&self) -> Span {
        match self {
            MarkupNode::Element(e) => e.span,
            MarkupNode::Text(t) => t.span,
            MarkupNode::Script(s) => s.span,
            MarkupNode::Error(e) => e.span,
        }
    }
}

/// The root of a markup parse: the top-level content list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub children: Vec<MarkupNode>,
    pub span: Span,
}

impl Document {
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            MarkupNode::Element(e) => Some(e),
            _ => None,
        })
    }
}
