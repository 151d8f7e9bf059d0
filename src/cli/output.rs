//! User-facing output of the CLI: JSON, token listings, colored diagnostic
//! lines and miette source reports.

use std::io::Write;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::{Diagnostic, DiagnosticCategory, SourceDiagnostic};
use crate::script::Token;

/// Counts of what a command reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Tally {
    pub fn add(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            match diagnostic.category {
                DiagnosticCategory::Error => self.errors += 1,
                DiagnosticCategory::Warning => self.warnings += 1,
                DiagnosticCategory::Suggestion | DiagnosticCategory::Message => {}
            }
        }
    }
}

// ============================================================================
// STDOUT
// ============================================================================

pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per token: `Kind text @line:column`.
pub fn print_tokens(tokens: &[Token]) {
    for token in tokens {
        println!(
            "{:?} {:?} @{}:{}",
            token.kind, token.text, token.span.start.line, token.span.start.column
        );
    }
}

// ============================================================================
// STDERR
// ============================================================================

/// Prints `file:line:column: error CODE: message` for every diagnostic.
pub fn print_diagnostics(color: ColorChoice, file: &str, diagnostics: &[Diagnostic]) {
    let mut stderr = StandardStream::stderr(color);
    for diagnostic in diagnostics {
        let (label, fg) = match diagnostic.category {
            DiagnosticCategory::Error => ("error", Color::Red),
            DiagnosticCategory::Warning => ("warning", Color::Yellow),
            DiagnosticCategory::Suggestion | DiagnosticCategory::Message => ("note", Color::Cyan),
        };
        let _ = write!(stderr, "{}:{}:{}: ", file, diagnostic.line, diagnostic.column + 1);
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(fg)).set_bold(true));
        let _ = write!(stderr, "{} {}", label, diagnostic.code);
        let _ = stderr.reset();
        let _ = writeln!(stderr, ": {}", diagnostic.message);
    }
}

/// Renders diagnostics with a source snippet through miette.
pub fn print_reports(file: &str, source: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let report = miette::Report::new(SourceDiagnostic::new(diagnostic.clone(), file, source));
        eprintln!("{report:?}");
    }
}

pub fn print_summary(color: ColorChoice, tally: Tally) {
    let mut stdout = StandardStream::stdout(color);
    let fg = if tally.errors > 0 { Color::Red } else { Color::Green };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(fg)).set_bold(true));
    let _ = writeln!(
        stdout,
        "{} file(s) checked: {} error(s), {} warning(s)",
        tally.files, tally.errors, tally.warnings
    );
    let _ = stdout.reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;
    use crate::stream::Position;

    #[test]
    fn test_tally_counts_by_category() {
        let mut tally = Tally::default();
        tally.add(&[
            Diagnostic::at(ErrorKind::ExactlyOneRoot, Position::default()),
            Diagnostic::at(ErrorKind::DuplicateAttribute("a".into()), Position::default()),
            Diagnostic::at(ErrorKind::DuplicateExport("b".into()), Position::default()),
        ]);
        assert_eq!((tally.errors, tally.warnings), (1, 2));
    }
}
