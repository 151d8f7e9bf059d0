//! Diagnostics for every stage of the XMLUI front end.
//!
//! # Overview
//!
//! All problems found while lexing, parsing, building component definitions,
//! or resolving script modules are reported as a [`Diagnostic`]: a small,
//! serializable record with a stable string code, a category, a message and
//! a source span. The span is expressed both as byte offsets (`pos`, `end`)
//! and as the line/column of the start position.
//!
//! What went wrong is described by an [`ErrorKind`] variant. Its `Display`
//! implementation (derived with `thiserror`) produces the message text, and
//! [`ErrorKind::code`] produces the code:
//!
//! | Prefix | Layer |
//! |--------|-------|
//! | `W0xx` | script lexing/parsing, markup lexing, module resolution |
//! | `U0xx` | markup structure |
//! | `T0xx` | component-definition shape |
//!
//! # Rendering
//!
//! [`Diagnostic`] implements [`miette::Diagnostic`] (code, severity and a
//! primary label) so it can be wrapped into a `miette::Report`. Use
//! [`SourceDiagnostic`] to attach the source text for snippet rendering.

use miette::{LabeledSpan, NamedSource, Severity, SourceCode, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stream::{Position, Span};

// ============================================================================
// CATEGORY
// ============================================================================

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "Warning",
            DiagnosticCategory::Error => "Error",
            DiagnosticCategory::Suggestion => "Suggestion",
            DiagnosticCategory::Message => "Message",
        }
    }
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// Every problem the front end knows how to report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Script and lexical problems
    #[error("An expression expected")]
    ExpressionExpected,
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("An identifier expected")]
    IdentifierExpected,
    #[error("'{0}' expected")]
    TokenExpected(String),
    #[error("Invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unterminated comment")]
    UnterminatedComment,
    #[error("Unterminated regular expression")]
    UnterminatedRegExp,
    #[error("Invalid numeric literal '{0}'")]
    InvalidNumber(String),
    #[error("Invalid arrow function parameter list")]
    InvalidArrowParams,
    #[error("Invalid destructuring pattern")]
    InvalidDestructure,
    #[error("'export' is only allowed at the top level of a module")]
    NestedExport,
    #[error("'{0}' can only be used inside a loop")]
    OutsideOfLoop(String),
    #[error("Missing initializer in const declaration")]
    MissingConstInitializer,
    #[error("A 'catch' or 'finally' block expected")]
    CatchOrFinallyExpected,
    #[error("Duplicate 'default' clause in a switch statement")]
    DuplicateDefaultClause,
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("Only 'const' and 'function' declarations can be exported")]
    InvalidExport,
    #[error("Duplicate import alias '{0}'")]
    DuplicateImportAlias(String),
    #[error("Unterminated template literal")]
    UnterminatedTemplate,
    #[error("Duplicate export '{0}'")]
    DuplicateExport(String),
    #[error("Cannot resolve module '{0}'")]
    UnresolvedModule(String),
    #[error("Module '{module}' does not export '{name}'")]
    MissingExport { module: String, name: String },
    #[error("Only variable declarations, function declarations and imports are allowed in a script block")]
    StatementNotAllowed,
    #[error("Duplicate declaration '{0}' in a script block")]
    DuplicateDeclaration(String),
    #[error("'import' is only allowed at the top level of a module")]
    NestedImport,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Unterminated CDATA section")]
    UnterminatedCData,
    #[error("Unterminated script block")]
    UnterminatedScript,

    // Markup structure
    #[error("An element expected")]
    ElementExpected,
    #[error("A tag name expected")]
    TagNameExpected,
    #[error("'>' or '/>' expected")]
    TagEndExpected,
    #[error("An attribute name expected")]
    AttributeNameExpected,
    #[error("An attribute value expected")]
    AttributeValueExpected,
    #[error("Closing tag '</{0}>' expected")]
    MissingClosingTag(String),
    #[error("Closing tag '</{found}>' does not match opening tag '<{expected}>'")]
    TagMismatch { expected: String, found: String },
    #[error("'>' expected")]
    NodeEndExpected,
    #[error("Unexpected '{0}' in element content")]
    UnexpectedContent(String),
    #[error("Invalid qualified name '{0}'")]
    InvalidQualifiedName(String),
    #[error("Unexpected closing tag '</{0}>'")]
    UnexpectedClosingTag(String),
    #[error("Duplicate attribute '{0}'")]
    DuplicateAttribute(String),
    #[error("Text is not allowed outside of an element")]
    TextOutsideElement,

    // Component-definition shape
    #[error("A component definition must have exactly one XMLUI element")]
    ExactlyOneRoot,
    #[error("Invalid component name '{0}'; component names must start with an uppercase letter")]
    InvalidComponentName(String),
    #[error("A reusable component definition must have a 'name' attribute")]
    ReusableNameMissing,
    #[error("Reusable component name '{0}' must start with an uppercase letter")]
    ReusableNameNotCapitalized(String),
    #[error("Reusable component '{0}' must contain at least one nested component")]
    ReusableWithoutContent(String),
    #[error("A reusable component definition cannot be nested into another component")]
    NestedReusable,
    #[error("Invalid attribute '{0}' on a reusable component definition")]
    InvalidReusableAttribute(String),
    #[error("A '{0}' element must have a non-empty 'name' attribute")]
    ReservedNameMissing(String),
    #[error("Attribute '{attribute}' is not allowed on a '{element}' element")]
    ReservedAttributeNotAllowed { element: String, attribute: String },
    #[error("A '{0}' element accepts only text content")]
    TextContentOnly(String),
    #[error("A 'uses' element must have a 'value' attribute")]
    UsesValueMissing,
    #[error("A '{element}' element cannot appear inside '{parent}'")]
    ReservedMisplaced { element: String, parent: String },
    #[error("A script element must not have attributes")]
    ScriptWithAttributes,
    #[error("Children of 'loaders' must be components")]
    LoaderNotComponent,
    #[error("A loader must have a 'uid' attribute")]
    LoaderUidMissing,
    #[error("Reserved element '{0}' cannot have a namespace prefix")]
    ReservedWithNamespace(String),
    #[error("'field' and 'item' elements cannot be mixed under the same parent")]
    MixedFieldAndItem,
    #[error("A 'field' element must have a non-empty 'name' attribute")]
    FieldNameMissing,
    #[error("A '{0}' element can only appear inside a property value")]
    ValueElementOutsideProperty(String),
    #[error("Reserved elements and nested components cannot be mixed inside '{0}'")]
    MixedReservedAndComponents(String),
    #[error("Invalid attribute name '{0}'")]
    InvalidAttributeName(String),
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("Unresolved namespace prefix '{0}'")]
    UnresolvedNamespace(String),
    #[error("Namespace declaration '{0}' has an empty value")]
    EmptyNamespace(String),
    #[error("Duplicate namespace declaration '{0}'")]
    DuplicateNamespace(String),
    #[error("Namespace declarations are not allowed on a '{0}' element")]
    NamespaceOnReserved(String),
    #[error("Text is not allowed inside a '{0}' element")]
    TextNotAllowed(String),
}

impl ErrorKind {
    /// The stable diagnostic code of this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ExpressionExpected => "W001",
            Self::UnexpectedToken(_) => "W002",
            Self::IdentifierExpected => "W003",
            Self::TokenExpected(_) => "W004",
            Self::InvalidCharacter(_) => "W005",
            Self::UnterminatedString => "W006",
            Self::UnterminatedComment => "W007",
            Self::UnterminatedRegExp => "W008",
            Self::InvalidNumber(_) => "W009",
            Self::InvalidArrowParams => "W010",
            Self::InvalidDestructure => "W011",
            Self::NestedExport => "W012",
            Self::OutsideOfLoop(_) => "W013",
            Self::MissingConstInitializer => "W014",
            Self::CatchOrFinallyExpected => "W015",
            Self::DuplicateDefaultClause => "W016",
            Self::InvalidAssignmentTarget => "W017",
            Self::InvalidExport => "W018",
            Self::DuplicateImportAlias(_) => "W019",
            Self::UnterminatedTemplate => "W020",
            Self::DuplicateExport(_) => "W021",
            Self::UnresolvedModule(_) => "W022",
            Self::MissingExport { .. } => "W023",
            Self::StatementNotAllowed => "W024",
            Self::DuplicateDeclaration(_) => "W025",
            Self::NestedImport => "W026",
            Self::InvalidEscape => "W027",
            Self::UnterminatedCData => "W028",
            Self::UnterminatedScript => "W029",

            Self::ElementExpected => "U001",
            Self::TagNameExpected => "U002",
            Self::TagEndExpected => "U003",
            Self::AttributeNameExpected => "U004",
            Self::AttributeValueExpected => "U005",
            Self::MissingClosingTag(_) => "U006",
            Self::TagMismatch { .. } => "U007",
            Self::NodeEndExpected => "U008",
            Self::UnexpectedContent(_) => "U009",
            Self::InvalidQualifiedName(_) => "U010",
            Self::UnexpectedClosingTag(_) => "U011",
            Self::DuplicateAttribute(_) => "U012",
            Self::TextOutsideElement => "U013",

            Self::ExactlyOneRoot => "T001",
            Self::InvalidComponentName(_) => "T002",
            Self::ReusableNameMissing => "T003",
            Self::ReusableNameNotCapitalized(_) => "T004",
            Self::ReusableWithoutContent(_) => "T005",
            Self::NestedReusable => "T006",
            Self::InvalidReusableAttribute(_) => "T007",
            Self::ReservedNameMissing(_) => "T008",
            Self::ReservedAttributeNotAllowed { .. } => "T009",
            Self::TextContentOnly(_) => "T010",
            Self::UsesValueMissing => "T011",
            Self::ReservedMisplaced { .. } => "T012",
            Self::ScriptWithAttributes => "T013",
            Self::LoaderNotComponent => "T014",
            Self::LoaderUidMissing => "T015",
            Self::ReservedWithNamespace(_) => "T016",
            Self::MixedFieldAndItem => "T017",
            Self::FieldNameMissing => "T018",
            Self::ValueElementOutsideProperty(_) => "T019",
            Self::MixedReservedAndComponents(_) => "T020",
            Self::InvalidAttributeName(_) => "T021",
            Self::InvalidIdentifier(_) => "T022",
            Self::UnresolvedNamespace(_) => "T025",
            Self::EmptyNamespace(_) => "T026",
            Self::DuplicateNamespace(_) => "T027",
            Self::NamespaceOnReserved(_) => "T028",
            Self::TextNotAllowed(_) => "T029",
        }
    }

    /// Duplicate names (import aliases, exports, attributes) keep their first
    /// occurrence and do not stop linking or building; everything else is an
    /// error.
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            Self::DuplicateImportAlias(_) | Self::DuplicateExport(_) | Self::DuplicateAttribute(_) => {
                DiagnosticCategory::Warning
            }
            _ => DiagnosticCategory::Error,
        }
    }
}

// ============================================================================
// DIAGNOSTIC
// ============================================================================

/// A positioned problem report. This is the stable wire format consumed by
/// editors and other tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct Diagnostic {
    pub code: String,
    pub category: DiagnosticCategory,
    pub message: String,
    /// Byte offset where the problem starts.
    pub pos: usize,
    /// Byte offset where the problem ends (exclusive).
    pub end: usize,
    /// 1-based line of `pos`.
    pub line: usize,
    /// 0-based column of `pos`.
    pub column: usize,
}

impl Diagnostic {
    /// Creates a diagnostic spanning `start..end`.
    pub fn new(kind: ErrorKind, start: Position, end: Position) -> Self {
        Self {
            code: kind.code().to_string(),
            category: kind.category(),
            message: kind.to_string(),
            pos: start.offset,
            end: end.offset.max(start.offset),
            line: start.line,
            column: start.column,
        }
    }

    /// Creates a diagnostic covering `span`.
    pub fn spanning(kind: ErrorKind, span: Span) -> Self {
        Self::new(kind, span.start, span.end)
    }

    /// Creates a zero-width diagnostic at `pos`.
    pub fn at(kind: ErrorKind, pos: Position) -> Self {
        Self::new(kind, pos, pos)
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// The byte range of this diagnostic, never empty so that renderers can
    /// always point at something.
    pub fn source_span(&self) -> SourceSpan {
        let len = if self.end > self.pos { self.end - self.pos } else { 1 };
        SourceSpan::from((self.pos, len))
    }
}

/// Returns true when at least one diagnostic is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

fn severity_of(category: DiagnosticCategory) -> Severity {
    match category {
        DiagnosticCategory::Error => Severity::Error,
        DiagnosticCategory::Warning => Severity::Warning,
        DiagnosticCategory::Suggestion | DiagnosticCategory::Message => Severity::Advice,
    }
}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<Severity> {
        Some(severity_of(self.category))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(Some(self.message.clone()), self.source_span());
        Some(Box::new(std::iter::once(label)))
    }
}

/// A diagnostic together with the source it refers to, for snippet rendering.
#[derive(Debug, Error)]
#[error("{diagnostic}")]
pub struct SourceDiagnostic {
    pub diagnostic: Diagnostic,
    pub source_code: NamedSource<String>,
}

impl SourceDiagnostic {
    pub fn new(diagnostic: Diagnostic, name: impl AsRef<str>, source: impl Into<String>) -> Self {
        Self {
            diagnostic,
            source_code: NamedSource::new(name, source.into()),
        }
    }
}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic.code))
    }

    fn severity(&self) -> Option<Severity> {
        Some(severity_of(self.diagnostic.category))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source_code)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        miette::Diagnostic::labels(&self.diagnostic)
    }
}
