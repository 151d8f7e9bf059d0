//! XMLUI markup: lexer, parser and the generic markup tree.

pub mod lexer;
pub mod parser;
pub mod syntax;

pub use lexer::{tokenize_markup, MarkupLexer};
pub use parser::{parse_markup, MarkupParseResult};
pub use syntax::{
    Attribute, Document, Element, ElementPart, ElementPartKind, ErrorNode, MarkupNode, MarkupToken, MarkupTokenKind, QualifiedName,
    ScriptNode, TextNode, TextSegment,
};
