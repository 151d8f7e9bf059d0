//! Markup lexer.
//!
//! Two modes: *content* (character data, entities, CDATA, comments, script
//! blocks) and *tag* (names, `=`, quoted values). The lexer flips modes on
//! its own: `<` and `</` enter tag mode, `>` and `/>` return to content.
//! Comments and whitespace inside tags are trivia and never reach the
//! parser.

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::markup::syntax::{MarkupToken, MarkupTokenKind, ENTITIES};
use crate::script::lexer::{is_id_continue, is_id_start};
use crate::stream::{CharacterStream, Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Content,
    Tag,
}

pub struct MarkupLexer<'src> {
    stream: CharacterStream<'src>,
    mode: Mode,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> MarkupLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            stream: CharacterStream::new(source),
            mode: Mode::Content,
            diagnostics: Vec::new(),
        }
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, kind: ErrorKind, start: Position, end: Position) {
        self.diagnostics.push(Diagnostic::new(kind, start, end));
    }

    fn token(&self, kind: MarkupTokenKind, start: Position) -> MarkupToken {
        let end = self.stream.position();
        let text = &self.stream.source()[start.offset..end.offset];
        MarkupToken::new(kind, text, Span::new(start, end))
    }

    /// Scans the next significant token.
    pub fn next_token(&mut self) -> MarkupToken {
        match self.mode {
            Mode::Content => self.scan_content(),
            Mode::Tag => self.scan_tag(),
        }
    }

    // ------------------------------------------------------------------------
    // Content mode
    // ------------------------------------------------------------------------

    fn scan_content(&mut self) -> MarkupToken {
        loop {
            let start = self.stream.position();
            if self.stream.is_eof() {
                return self.token(MarkupTokenKind::Eof, start);
            }
            if self.stream.starts_with("<!--") {
                self.skip_comment(start);
                continue;
            }
            if self.stream.starts_with("<![CDATA[") {
                return self.scan_cdata(start);
            }
            if self.at_script_start() {
                return self.scan_script(start);
            }
            if self.stream.starts_with("</") {
                self.stream.skip(2);
                self.mode = Mode::Tag;
                return self.token(MarkupTokenKind::CloseNodeStart, start);
            }
            if self.stream.starts_with("<") {
                self.stream.get();
                self.mode = Mode::Tag;
                return self.token(MarkupTokenKind::OpenNodeStart, start);
            }
            if let Some((spelling, kind)) = ENTITIES.iter().find(|(s, _)| self.stream.starts_with(s)) {
                self.stream.skip(spelling.len());
                return self.token(*kind, start);
            }
            return self.scan_text(start);
        }
    }

    fn scan_text(&mut self, start: Position) -> MarkupToken {
        // Always consume at least one character; a lone `&` is plain text.
        self.stream.get();
        while let Some(c) = self.stream.peek(0) {
            if c == '<' || (c == '&' && self.at_entity()) {
                break;
            }
            self.stream.get();
        }
        self.token(MarkupTokenKind::Text, start)
    }

    fn at_entity(&self) -> bool {
        ENTITIES.iter().any(|(s, _)| self.stream.starts_with(s))
    }

    fn skip_comment(&mut self, start: Position) {
        let tail = self.stream.tail();
        match tail.find("-->") {
            Some(index) => self.stream.skip(tail[..index + 3].chars().count()),
            None => {
                self.stream.skip(tail.chars().count());
                self.report(ErrorKind::UnterminatedComment, start, self.stream.position());
            }
        }
    }

    fn scan_cdata(&mut self, start: Position) -> MarkupToken {
        let tail = self.stream.tail();
        match tail.find("]]>") {
            Some(index) => self.stream.skip(tail[..index + 3].chars().count()),
            None => {
                self.stream.skip(tail.chars().count());
                self.report(ErrorKind::UnterminatedCData, start, self.stream.position());
            }
        }
        self.token(MarkupTokenKind::CData, start)
    }

    fn at_script_start(&self) -> bool {
        self.stream.starts_with("<script")
            && self
                .stream
                .peek(7)
                .is_some_and(|c| c == '>' || c == '/' || c.is_whitespace())
    }

    fn scan_script(&mut self, start: Position) -> MarkupToken {
        let tail = self.stream.tail();
        let len = match tail.find('>') {
            // `<script/>` has no body and no closing tag.
            Some(open_end) if tail[..open_end].ends_with('/') => Some(open_end + 1),
            Some(open_end) => tail[open_end..]
                .find("</script>")
                .map(|index| open_end + index + "</script>".len()),
            None => None,
        };
        match len {
            Some(len) => self.stream.skip(tail[..len].chars().count()),
            None => {
                self.stream.skip(tail.chars().count());
                self.report(ErrorKind::UnterminatedScript, start, self.stream.position());
            }
        }
        self.token(MarkupTokenKind::Script, start)
    }

    // ------------------------------------------------------------------------
    // Tag mode
    // ------------------------------------------------------------------------

    fn scan_tag(&mut self) -> MarkupToken {
        while self.stream.peek(0).is_some_and(char::is_whitespace) {
            self.stream.get();
        }
        let start = self.stream.position();
        let Some(ch) = self.stream.peek(0) else {
            return self.token(MarkupTokenKind::Eof, start);
        };
        match ch {
            '>' => {
                self.stream.get();
                self.mode = Mode::Content;
                self.token(MarkupTokenKind::NodeEnd, start)
            }
            '/' if self.stream.peek(1) == Some('>') => {
                self.stream.skip(2);
                self.mode = Mode::Content;
                self.token(MarkupTokenKind::NodeClose, start)
            }
            '<' if self.stream.peek(1) == Some('/') => {
                self.stream.skip(2);
                self.token(MarkupTokenKind::CloseNodeStart, start)
            }
            '<' => {
                self.stream.get();
                self.token(MarkupTokenKind::OpenNodeStart, start)
            }
            ':' => {
                self.stream.get();
                self.token(MarkupTokenKind::Colon, start)
            }
            '=' => {
                self.stream.get();
                self.token(MarkupTokenKind::Equal, start)
            }
            '"' | '\'' | '`' => self.scan_string(start, ch),
            c if is_name_start(c) => {
                self.stream.get();
                while self.stream.peek(0).is_some_and(is_name_continue) {
                    self.stream.get();
                }
                self.token(MarkupTokenKind::Identifier, start)
            }
            c => {
                self.stream.get();
                self.report(ErrorKind::InvalidCharacter(c), start, self.stream.position());
                self.token(MarkupTokenKind::Unknown, start)
            }
        }
    }

    fn scan_string(&mut self, start: Position, quote: char) -> MarkupToken {
        self.stream.get();
        loop {
            match self.stream.get() {
                Some(c) if c == quote => break,
                Some(_) => {}
                None => {
                    self.report(ErrorKind::UnterminatedString, start, self.stream.position());
                    break;
                }
            }
        }
        self.token(MarkupTokenKind::StringLiteral, start)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_id_start(c)
}

/// Names may also carry `.` and `-` (`var.count`, `data-id`).
fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') || is_id_continue(c)
}

/// Tokenizes a whole markup document, including the final `Eof` token.
pub fn tokenize_markup(source: &str) -> (Vec<MarkupToken>, Vec<Diagnostic>) {
    let mut lexer = MarkupLexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == MarkupTokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, lexer.take_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;
    use MarkupTokenKind::*;

    fn kinds(source: &str) -> Vec<MarkupTokenKind> {
        tokenize_markup(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_element_tokens() {
        assert_eq!(
            kinds(r#"<ns:Button label="Hi" enabled/>"#),
            vec![
                OpenNodeStart,
                Identifier,
                Colon,
                Identifier,
                Identifier,
                Equal,
                StringLiteral,
                Identifier,
                NodeClose,
                Eof
            ]
        );
    }

    #[test]
    fn test_content_entities_and_cdata() {
        assert_eq!(
            kinds("<A>x &amp; y<![CDATA[<raw>]]></A>"),
            vec![
                OpenNodeStart,
                Identifier,
                NodeEnd,
                Text,
                AmpEntity,
                Text,
                CData,
                CloseNodeStart,
                Identifier,
                NodeEnd,
                Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(kinds("<!-- c --><A/>"), vec![OpenNodeStart, Identifier, NodeClose, Eof]);
        let (_, diagnostics) = tokenize_markup("<A/><!-- never");
        assert_eq!(diagnostics[0].code, "W007");
    }

    #[test]
    fn test_script_block_is_raw() {
        let (tokens, diagnostics) = tokenize_markup("<A><script>let a = 1 < 2;</script></A>");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[3].kind, Script);
        assert_eq!(tokens[3].text, "<script>let a = 1 < 2;</script>");
        let (_, diagnostics) = tokenize_markup("<script>let a");
        assert_eq!(diagnostics[0].code, "W029");
    }

    #[test]
    fn test_self_closing_script_ends_at_its_tag() {
        let (tokens, diagnostics) = tokenize_markup("<A><script/><B/><script>x</script></A>");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[3].text, "<script/>");
        let kinds: Vec<MarkupTokenKind> = tokens[4..7].iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![OpenNodeStart, Identifier, NodeClose]);
        assert_eq!(tokens[7].text, "<script>x</script>");
    }

    #[test]
    fn test_dotted_attribute_names() {
        let (tokens, _) = tokenize_markup("<A var.count='0' on-click=`x`/>");
        assert_eq!(tokens[2].text, "var.count");
        assert_eq!(tokens[5].text, "on-click");
        assert_eq!(tokens[7].text, "`x`");
    }

    #[test]
    fn test_invalid_character_in_tag() {
        let (tokens, diagnostics) = tokenize_markup("<A #/>");
        assert_eq!(tokens[2].kind, Unknown);
        assert_eq!(diagnostics[0].code, "W005");
        assert_eq!(tokens[3].kind, NodeClose);
    }

    #[test]
    fn test_unterminated_cdata() {
        let (_, diagnostics) = tokenize_markup("<A><![CDATA[abc");
        assert_eq!(diagnostics[0].code, "W028");
    }
}
