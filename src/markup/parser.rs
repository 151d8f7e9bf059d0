//! Markup parser with per-node error recovery.
//!
//! A structural error never stops the parse: the problem is recorded, an
//! [`ErrorNode`] takes the place of the broken construct where there is one,
//! and parsing continues with the next plausible token.
//!
//! Text content is finished in two passes once a content list is complete:
//! adjacent text, entity and CDATA pieces are first coalesced into runs, and
//! each run is then decoded into [`TextSegment`]s.

use serde::Serialize;

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::markup::lexer::tokenize_markup;
use crate::markup::syntax::{
    decode_entities, Attribute, Document, Element, ElementPart, ElementPartKind, ErrorNode, MarkupNode,
    MarkupToken, MarkupTokenKind, QualifiedName, ScriptNode, TextNode, TextSegment,
};
use crate::stream::{Position, Span};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkupParseResult {
    pub tree: Document,
    pub errors: Vec<Diagnostic>,
}

/// Parses a markup document. Never fails; problems are returned next to the
/// (possibly partial) tree.
pub fn parse_markup(source: &str) -> MarkupParseResult {
    log::debug!("parsing markup ({} bytes)", source.len());
    let (tokens, lexer_errors) = tokenize_markup(source);
    let mut parser = MarkupParser::new(tokens);
    let tree = parser.parse_document();
    let mut errors = lexer_errors;
    errors.append(&mut parser.errors);
    errors.sort_by_key(|d| d.pos);
    log::debug!(
        "markup parsed: {} top-level nodes, {} diagnostics",
        tree.children.len(),
        errors.len()
    );
    MarkupParseResult { tree, errors }
}

/// Text pieces collected while scanning one content list.
enum Piece {
    Text(String, Span),
    Entity(char, Span),
    CData(String, Span),
}

impl Piece {
    fn span(&self) -> Span {
        match self {
            Piece::Text(_, span) | Piece::Entity(_, span) | Piece::CData(_, span) => *span,
        }
    }
}

enum Pending {
    Node(MarkupNode),
    Piece(Piece),
}

struct MarkupParser {
    tokens: Vec<MarkupToken>,
    index: usize,
    last_end: Position,
    /// Names of the elements enclosing the one being parsed.
    open: Vec<String>,
    errors: Vec<Diagnostic>,
}

impl MarkupParser {
    fn new(tokens: Vec<MarkupToken>) -> Self {
        Self {
            tokens,
            index: 0,
            last_end: Position::default(),
            open: Vec::new(),
            errors: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    /// The token `n` positions ahead; the final `Eof` repeats forever.
    fn ahead(&self, n: usize) -> &MarkupToken {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + n).min(last)]
    }

    fn peek(&self) -> &MarkupToken {
        self.ahead(0)
    }

    fn peek_kind(&self) -> MarkupTokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> MarkupToken {
        let token = self.peek().clone();
        if token.kind != MarkupTokenKind::Eof {
            self.index += 1;
            self.last_end = token.span.end;
        }
        token
    }

    fn error(&mut self, kind: ErrorKind, span: Span) {
        log::warn!("markup {} at {}: {}", kind.code(), span.start.offset, kind);
        self.errors.push(Diagnostic::spanning(kind, span));
    }

    fn error_node(&mut self, kind: ErrorKind, span: Span) -> MarkupNode {
        let code = kind.code().to_string();
        self.error(kind, span);
        MarkupNode::Error(ErrorNode { code, span })
    }

    // ------------------------------------------------------------------------
    // Document and content
    // ------------------------------------------------------------------------

    fn parse_document(&mut self) -> Document {
        let children = self.parse_content();
        let stray_text: Vec<Span> = children
            .iter()
            .filter_map(|node| match node {
                MarkupNode::Text(text) if !text.is_whitespace() => Some(text.span),
                _ => None,
            })
            .collect();
        for span in stray_text {
            self.error(ErrorKind::TextOutsideElement, span);
        }
        let end = self.peek().span.end;
        Document {
            children,
            span: Span::new(Position::default(), end),
        }
    }

    /// Parses content up to the enclosing element's closing tag or the end
    /// of input.
    fn parse_content(&mut self) -> Vec<MarkupNode> {
        let mut pending = Vec::new();
        loop {
            let token = self.peek().clone();
            match token.kind {
                MarkupTokenKind::Eof => break,
                MarkupTokenKind::CloseNodeStart if !self.open.is_empty() => break,
                MarkupTokenKind::CloseNodeStart => {
                    let node = self.parse_stray_closing_tag();
                    pending.push(Pending::Node(node));
                }
                MarkupTokenKind::OpenNodeStart => {
                    let node = self.parse_element();
                    pending.push(Pending::Node(node));
                }
                MarkupTokenKind::Text => {
                    self.advance();
                    pending.push(Pending::Piece(Piece::Text(token.text, token.span)));
                }
                MarkupTokenKind::CData => {
                    self.advance();
                    pending.push(Pending::Piece(Piece::CData(cdata_body(&token.text), token.span)));
                }
                MarkupTokenKind::Script => {
                    self.advance();
                    pending.push(Pending::Node(MarkupNode::Script(script_node(&token))));
                }
                kind => match kind.entity_char() {
                    Some(ch) => {
                        self.advance();
                        pending.push(Pending::Piece(Piece::Entity(ch, token.span)));
                    }
                    None => {
                        self.advance();
                        let node = self.error_node(ErrorKind::UnexpectedContent(token.text), token.span);
                        pending.push(Pending::Node(node));
                    }
                },
            }
        }
        finish_content(pending)
    }

    /// `</name>` with no open element.
    fn parse_stray_closing_tag(&mut self) -> MarkupNode {
        let start = self.advance().span.start;
        let name = self.parse_qualified_name();
        if self.peek_kind() == MarkupTokenKind::NodeEnd {
            self.advance();
        }
        let found = name.map(|n| n.to_string()).unwrap_or_default();
        let span = Span::new(start, self.last_end);
        self.error_node(ErrorKind::UnexpectedClosingTag(found), span)
    }

    // ------------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------------

    fn parse_element(&mut self) -> MarkupNode {
        let open = self.advance();
        let start = open.span.start;
        let mut parts = vec![part(ElementPartKind::OpenNodeStart, open.span)];

        let Some(name) = self.parse_qualified_name() else {
            let span = self.peek().span;
            self.skip_broken_tag();
            return self.error_node(ErrorKind::TagNameExpected, span);
        };
        parts.push(part(ElementPartKind::TagName, name.span));

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut attribute_list: Option<Span> = None;
        loop {
            let token = self.peek().clone();
            match token.kind {
                MarkupTokenKind::Identifier => {
                    let attribute = self.parse_attribute();
                    attribute_list = Some(attribute_list.map_or(attribute.span, |s| s.to(attribute.span)));
                    let duplicate = attributes
                        .iter()
                        .any(|a| a.name.namespace == attribute.name.namespace && a.name.name == attribute.name.name);
                    if duplicate {
                        self.error(
                            ErrorKind::DuplicateAttribute(attribute.name.to_string()),
                            attribute.name.span,
                        );
                    } else {
                        attributes.push(attribute);
                    }
                }
                MarkupTokenKind::NodeClose => {
                    self.advance();
                    parts.extend(attribute_list.map(|span| part(ElementPartKind::AttributeList, span)));
                    parts.push(part(ElementPartKind::NodeClose, token.span));
                    return MarkupNode::Element(Element {
                        name,
                        attributes,
                        children: Vec::new(),
                        closing_name: None,
                        parts,
                        self_closing: true,
                        span: Span::new(start, self.last_end),
                    });
                }
                MarkupTokenKind::NodeEnd => {
                    self.advance();
                    parts.extend(attribute_list.map(|span| part(ElementPartKind::AttributeList, span)));
                    parts.push(part(ElementPartKind::NodeEnd, token.span));
                    break;
                }
                MarkupTokenKind::Eof | MarkupTokenKind::OpenNodeStart | MarkupTokenKind::CloseNodeStart => {
                    self.error(ErrorKind::TagEndExpected, token.span);
                    parts.extend(attribute_list.map(|span| part(ElementPartKind::AttributeList, span)));
                    return MarkupNode::Element(Element {
                        name,
                        attributes,
                        children: Vec::new(),
                        closing_name: None,
                        parts,
                        self_closing: true,
                        span: Span::new(start, self.last_end),
                    });
                }
                _ => {
                    self.advance();
                    self.error(ErrorKind::AttributeNameExpected, token.span);
                }
            }
        }

        self.open.push(name.to_string());
        let children = self.parse_content();
        self.open.pop();
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            parts.push(part(ElementPartKind::ContentList, first.span().to(last.span())));
        }
        let closing_name = self.parse_closing_tag(&name, &mut parts);

        MarkupNode::Element(Element {
            name,
            attributes,
            children,
            closing_name,
            parts,
            self_closing: false,
            span: Span::new(start, self.last_end),
        })
    }

    /// Matches the closing tag of `name`. A closing tag that belongs to an
    /// enclosing element is left for that element.
    fn parse_closing_tag(&mut self, name: &QualifiedName, parts: &mut Vec<ElementPart>) -> Option<QualifiedName> {
        if self.peek_kind() != MarkupTokenKind::CloseNodeStart {
            self.error(ErrorKind::MissingClosingTag(name.to_string()), name.span);
            return None;
        }
        let expected = name.to_string();
        let found = self.closing_name_ahead();
        match found {
            Some(found) if found == expected => {}
            Some(found) if self.open.contains(&found) => {
                self.error(ErrorKind::MissingClosingTag(expected), name.span);
                return None;
            }
            Some(found) => {
                let span = self.ahead(1).span;
                self.error(ErrorKind::TagMismatch { expected, found }, span);
            }
            None => {
                let span = self.ahead(1).span;
                self.error(ErrorKind::TagNameExpected, span);
            }
        }
        let close = self.advance();
        parts.push(part(ElementPartKind::CloseNodeStart, close.span));
        let closing_name = self.parse_qualified_name();
        if let Some(closing) = &closing_name {
            parts.push(part(ElementPartKind::TagName, closing.span));
        }
        if self.peek_kind() == MarkupTokenKind::NodeEnd {
            let end = self.advance();
            parts.push(part(ElementPartKind::NodeEnd, end.span));
        } else {
            let span = self.peek().span;
            self.error(ErrorKind::NodeEndExpected, span);
        }
        closing_name
    }

    /// The name after an upcoming `</`, without consuming anything.
    fn closing_name_ahead(&self) -> Option<String> {
        let first = self.ahead(1);
        if first.kind != MarkupTokenKind::Identifier {
            return None;
        }
        if self.ahead(2).kind == MarkupTokenKind::Colon && self.ahead(3).kind == MarkupTokenKind::Identifier {
            return Some(format!("{}:{}", first.text, self.ahead(3).text));
        }
        Some(first.text.clone())
    }

    /// Skips the rest of a tag whose name is missing.
    fn skip_broken_tag(&mut self) {
        loop {
            match self.peek_kind() {
                MarkupTokenKind::NodeEnd | MarkupTokenKind::NodeClose => {
                    self.advance();
                    return;
                }
                MarkupTokenKind::Eof | MarkupTokenKind::OpenNodeStart | MarkupTokenKind::CloseNodeStart => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `name` or `namespace:name`.
    fn parse_qualified_name(&mut self) -> Option<QualifiedName> {
        if self.peek_kind() != MarkupTokenKind::Identifier {
            return None;
        }
        let first = self.advance();
        if self.peek_kind() != MarkupTokenKind::Colon {
            return Some(QualifiedName {
                namespace: None,
                name: first.text,
                span: first.span,
            });
        }
        self.advance();
        if self.peek_kind() != MarkupTokenKind::Identifier {
            let span = Span::new(first.span.start, self.last_end);
            self.error(ErrorKind::InvalidQualifiedName(format!("{}:", first.text)), span);
            return Some(QualifiedName {
                namespace: None,
                name: first.text,
                span: first.span,
            });
        }
        let second = self.advance();
        let span = first.span.to(second.span);
        if self.peek_kind() == MarkupTokenKind::Colon {
            self.advance();
            let mut text = format!("{}:{}:", first.text, second.text);
            if self.peek_kind() == MarkupTokenKind::Identifier {
                text.push_str(&self.advance().text);
            }
            self.error(ErrorKind::InvalidQualifiedName(text), Span::new(span.start, self.last_end));
        }
        Some(QualifiedName {
            namespace: Some(first.text),
            name: second.text,
            span,
        })
    }

    /// `name ("=" value)?`
    fn parse_attribute(&mut self) -> Attribute {
        let start = self.peek().span.start;
        let name = self.parse_qualified_name().unwrap_or_else(|| QualifiedName {
            namespace: None,
            name: String::new(),
            span: Span::new(start, start),
        });
        let mut value = None;
        let mut value_span = None;
        if self.peek_kind() == MarkupTokenKind::Equal {
            self.advance();
            if self.peek_kind() == MarkupTokenKind::StringLiteral {
                let token = self.advance();
                value = Some(decode_entities(strip_quotes(&token.text)));
                value_span = Some(token.span);
            } else {
                let span = self.peek().span;
                self.error(ErrorKind::AttributeValueExpected, span);
            }
        }
        Attribute {
            name,
            value,
            value_span,
            span: Span::new(start, self.last_end),
        }
    }
}

// ============================================================================
// CONTENT POST-PASSES
// ============================================================================

/// Pass one coalesces adjacent pieces into runs; pass two decodes each run.
fn finish_content(pending: Vec<Pending>) -> Vec<MarkupNode> {
    let mut nodes = Vec::new();
    let mut run: Vec<Piece> = Vec::new();
    for item in pending {
        match item {
            Pending::Piece(piece) => run.push(piece),
            Pending::Node(node) => {
                if !run.is_empty() {
                    nodes.push(MarkupNode::Text(decode_run(std::mem::take(&mut run))));
                }
                nodes.push(node);
            }
        }
    }
    if !run.is_empty() {
        nodes.push(MarkupNode::Text(decode_run(run)));
    }
    nodes
}

fn decode_run(run: Vec<Piece>) -> TextNode {
    let span = match (run.first(), run.last()) {
        (Some(first), Some(last)) => first.span().to(last.span()),
        _ => Span::default(),
    };
    let mut segments = Vec::new();
    let mut text = String::new();
    for piece in run {
        match piece {
            Piece::Text(t, _) => text.push_str(&t),
            Piece::Entity(ch, _) => text.push(ch),
            Piece::CData(data, _) => {
                if !text.is_empty() {
                    segments.push(TextSegment::Text(std::mem::take(&mut text)));
                }
                segments.push(TextSegment::CData(data));
            }
        }
    }
    if !text.is_empty() {
        segments.push(TextSegment::Text(text));
    }
    TextNode { segments, span }
}

fn part(kind: ElementPartKind, span: Span) -> ElementPart {
    ElementPart { kind, span }
}

fn strip_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some(q @ ('"' | '\'' | '`')) => {
            let inner = &text[1..];
            inner.strip_suffix(q).unwrap_or(inner)
        }
        _ => text,
    }
}

fn cdata_body(text: &str) -> String {
    let body = text.strip_prefix("<![CDATA[").unwrap_or(text);
    body.strip_suffix("]]>").unwrap_or(body).to_string()
}

fn script_node(token: &MarkupToken) -> ScriptNode {
    let text = token.text.as_str();
    let open_end = text.find('>').map_or(text.len(), |i| i + 1);
    let opening = &text[..open_end];
    let attributes = opening
        .trim_start_matches("<script")
        .trim_end_matches('>')
        .trim_end_matches('/');
    let body_end = text.rfind("</script>").filter(|i| *i >= open_end).unwrap_or(text.len());
    let body = &text[open_end..body_end];

    let start = token.span.start;
    let body_start = advance_position(start, opening);
    let body_end_pos = advance_position(body_start, body);
    ScriptNode {
        body: body.to_string(),
        has_attributes: !attributes.trim().is_empty(),
        span: token.span,
        body_span: Span::new(body_start, body_end_pos),
    }
}

/// The position reached after reading `text` from `pos`.
fn advance_position(mut pos: Position, text: &str) -> Position {
    for ch in text.chars() {
        pos.offset += ch.len_utf8();
        if ch == '\n' {
            pos.line += 1;
            pos.column = 0;
        } else {
            pos.column += 1;
        }
    }
    pos
}
