//! Tokens of the XMLUI scripting language.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::stream::Span;

/// The closed set of token categories the script lexer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Eof,
    Unknown,

    // Trivia
    Whitespace,
    NewLine,
    LineComment,
    BlockComment,

    // Names and literals
    Identifier,
    DecimalLiteral,
    HexLiteral,
    BinaryLiteral,
    RealLiteral,
    StringLiteral,
    RegExpLiteral,

    // Template literals
    Backtick,
    TemplateSegment,
    DollarLBrace,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LSquare,
    RSquare,
    Dot,
    Spread,
    Semicolon,
    Comma,
    Colon,
    QuestionMark,
    OptionalChaining,
    Arrow,

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    IncOp,
    DecOp,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    LogicalAnd,
    LogicalOr,
    LogicalNot,
    NullCoalesce,
    ShiftLeft,
    SignedShiftRight,
    ShiftRight,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Assignment operators
    Assignment,
    AddAssignment,
    SubtractAssignment,
    MultiplyAssignment,
    DivideAssignment,
    RemainderAssignment,
    ExponentAssignment,
    ShiftLeftAssignment,
    SignedShiftRightAssignment,
    ShiftRightAssignment,
    BitwiseAndAssignment,
    BitwiseOrAssignment,
    BitwiseXorAssignment,
    LogicalAndAssignment,
    LogicalOrAssignment,
    NullCoalesceAssignment,

    // Keywords
    True,
    False,
    Null,
    Undefined,
    Infinity,
    NaN,
    Typeof,
    Delete,
    In,
    Of,
    Let,
    Const,
    Var,
    If,
    Else,
    Return,
    Break,
    Continue,
    Do,
    While,
    For,
    Try,
    Catch,
    Finally,
    Throw,
    Switch,
    Case,
    Default,
    Function,
    Export,
    Import,
    As,
    From,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::NewLine | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.values().any(|k| *k == self)
    }

    /// Contextual keywords that can still name a binding.
    pub fn is_contextual_keyword(self) -> bool {
        matches!(self, TokenKind::Of | TokenKind::As | TokenKind::From)
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Assignment
                | TokenKind::AddAssignment
                | TokenKind::SubtractAssignment
                | TokenKind::MultiplyAssignment
                | TokenKind::DivideAssignment
                | TokenKind::RemainderAssignment
                | TokenKind::ExponentAssignment
                | TokenKind::ShiftLeftAssignment
                | TokenKind::SignedShiftRightAssignment
                | TokenKind::ShiftRightAssignment
                | TokenKind::BitwiseAndAssignment
                | TokenKind::BitwiseOrAssignment
                | TokenKind::BitwiseXorAssignment
                | TokenKind::LogicalAndAssignment
                | TokenKind::LogicalOrAssignment
                | TokenKind::NullCoalesceAssignment
        )
    }
}

/// A classified, positioned run of source characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self { kind, text: text.into(), span }
    }

    /// Identifiers and contextual keywords can be used as binding names.
    pub fn is_binding_name(&self) -> bool {
        self.kind == TokenKind::Identifier || self.kind.is_contextual_keyword()
    }

    /// Any identifier or keyword may appear as a property name (`a.if`,
    /// `{ default: 1 }`).
    pub fn is_property_name(&self) -> bool {
        self.kind == TokenKind::Identifier || self.kind.is_keyword()
    }
}

/// Keyword table consulted after an identifier has been scanned in full.
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    [
        ("true", True),
        ("false", False),
        ("null", Null),
        ("undefined", Undefined),
        ("Infinity", Infinity),
        ("NaN", NaN),
        ("typeof", Typeof),
        ("delete", Delete),
        ("in", In),
        ("of", Of),
        ("let", Let),
        ("const", Const),
        ("var", Var),
        ("if", If),
        ("else", Else),
        ("return", Return),
        ("break", Break),
        ("continue", Continue),
        ("do", Do),
        ("while", While),
        ("for", For),
        ("try", Try),
        ("catch", Catch),
        ("finally", Finally),
        ("throw", Throw),
        ("switch", Switch),
        ("case", Case),
        ("default", Default),
        ("function", Function),
        ("export", Export),
        ("import", Import),
        ("as", As),
        ("from", From),
    ]
    .into_iter()
    .collect()
});

/// Operator and punctuation spellings, longest first, so the first match
/// is the longest one.
pub static OPERATORS: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::ShiftRightAssignment),
    ("===", TokenKind::StrictEqual),
    ("!==", TokenKind::StrictNotEqual),
    ("**=", TokenKind::ExponentAssignment),
    ("<<=", TokenKind::ShiftLeftAssignment),
    (">>=", TokenKind::SignedShiftRightAssignment),
    (">>>", TokenKind::ShiftRight),
    ("...", TokenKind::Spread),
    ("&&=", TokenKind::LogicalAndAssignment),
    ("||=", TokenKind::LogicalOrAssignment),
    ("??=", TokenKind::NullCoalesceAssignment),
    ("=>", TokenKind::Arrow),
    ("==", TokenKind::Equal),
    ("!=", TokenKind::NotEqual),
    ("<=", TokenKind::LessThanOrEqual),
    (">=", TokenKind::GreaterThanOrEqual),
    ("&&", TokenKind::LogicalAnd),
    ("||", TokenKind::LogicalOr),
    ("??", TokenKind::NullCoalesce),
    ("?.", TokenKind::OptionalChaining),
    ("++", TokenKind::IncOp),
    ("--", TokenKind::DecOp),
    ("+=", TokenKind::AddAssignment),
    ("-=", TokenKind::SubtractAssignment),
    ("*=", TokenKind::MultiplyAssignment),
    ("/=", TokenKind::DivideAssignment),
    ("%=", TokenKind::RemainderAssignment),
    ("&=", TokenKind::BitwiseAndAssignment),
    ("|=", TokenKind::BitwiseOrAssignment),
    ("^=", TokenKind::BitwiseXorAssignment),
    ("**", TokenKind::Exponent),
    ("<<", TokenKind::ShiftLeft),
    (">>", TokenKind::SignedShiftRight),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LSquare),
    ("]", TokenKind::RSquare),
    (".", TokenKind::Dot),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    ("?", TokenKind::QuestionMark),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    ("%", TokenKind::Remainder),
    ("&", TokenKind::BitwiseAnd),
    ("|", TokenKind::BitwiseOr),
    ("^", TokenKind::BitwiseXor),
    ("~", TokenKind::BitwiseNot),
    ("!", TokenKind::LogicalNot),
    ("<", TokenKind::LessThan),
    (">", TokenKind::GreaterThan),
    ("=", TokenKind::Assignment),
];
