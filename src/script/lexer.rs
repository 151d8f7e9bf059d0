//! Script lexer.
//!
//! [`ScriptLexer::fetch`] runs a small state machine: every [`Phase`] has one
//! handler that consumes characters and either moves to another phase or
//! finishes the token. Identifiers are scanned to their full length first
//! and classified against [`KEYWORDS`] afterwards.
//!
//! Template literals are scanned in a separate starting phase. The parser
//! switches to it right after consuming an opening backtick or the `}` that
//! closes a `${ … }` placeholder (see [`ScriptLexer::set_starting_phase`]).
//!
//! Lexical problems never abort scanning: the offending run becomes an
//! [`TokenKind::Unknown`] (or best-effort) token and a diagnostic is recorded.

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::script::token::{Token, TokenKind, KEYWORDS, OPERATORS};
use crate::stream::{CharacterStream, Position, Span};

/// Maximum number of tokens the lexer buffers for lookahead.
pub const MAX_LOOKAHEAD: usize = 16;

/// Where scanning of the next token starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartingPhase {
    /// Ordinary token scanning.
    Start,
    /// Inside the text part of a template literal.
    TemplateString,
}

/// States of the token state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Whitespace,
    LineComment,
    BlockComment,
    BlockCommentStar,
    Identifier,
    Zero,
    HexDigits,
    BinaryDigits,
    Decimal,
    Fraction,
    ExponentSign,
    ExponentDigits,
    String(char),
    StringEscape(char),
    TemplateString,
    TemplateText,
}

/// Outcome of running one phase handler.
enum Step {
    Next(Phase),
    Done(TokenKind),
}

type ErrorHandler<'src> = Box<dyn FnMut(&Diagnostic) + 'src>;

/// Tokenizer for the scripting language with bounded lookahead.
pub struct ScriptLexer<'src> {
    stream: CharacterStream<'src>,
    buffer: Vec<Token>,
    starting_phase: StartingPhase,
    with_trivia: bool,
    last_end: Position,
    diagnostics: Vec<Diagnostic>,
    on_error: Option<ErrorHandler<'src>>,
}

impl<'src> ScriptLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            stream: CharacterStream::new(source),
            buffer: Vec::with_capacity(MAX_LOOKAHEAD),
            starting_phase: StartingPhase::Start,
            with_trivia: false,
            last_end: Position::default(),
            diagnostics: Vec::new(),
            on_error: None,
        }
    }

    /// Makes the lexer return whitespace, newline and comment tokens.
    pub fn with_trivia(mut self, include: bool) -> Self {
        self.with_trivia = include;
        self
    }

    /// Installs a callback invoked for every lexical diagnostic.
    pub fn on_error(mut self, handler: impl FnMut(&Diagnostic) + 'src) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    pub fn source(&self) -> &'src str {
        self.stream.source()
    }

    /// Diagnostics recorded so far, in source order of discovery.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// End position of the most recently consumed token.
    pub fn last_end(&self) -> Position {
        self.last_end
    }

    // ------------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------------

    /// Looks at the token `n` positions ahead without consuming it.
    /// Lookahead is capped at [`MAX_LOOKAHEAD`] tokens.
    pub fn ahead(&mut self, n: usize) -> &Token {
        let n = n.min(MAX_LOOKAHEAD - 1);
        while self.buffer.len() <= n {
            let token = self.fetch_significant();
            self.buffer.push(token);
        }
        &self.buffer[n]
    }

    pub fn peek(&mut self) -> &Token {
        self.ahead(0)
    }

    /// Consumes the next token.
    pub fn get(&mut self) -> Token {
        let token = if self.buffer.is_empty() {
            self.fetch_significant()
        } else {
            self.buffer.remove(0)
        };
        self.last_end = token.span.end;
        token
    }

    /// Rewinds the lexer so that scanning restarts at `token`'s start,
    /// discarding any buffered lookahead.
    pub fn back(&mut self, token: &Token) {
        self.buffer.clear();
        self.stream.reset(token.span.start);
        self.starting_phase = StartingPhase::Start;
    }

    /// Discards lookahead and restarts scanning right after the last consumed
    /// token in `phase`.
    pub fn set_starting_phase(&mut self, phase: StartingPhase) {
        log::trace!("script lexer phase -> {:?} at {}", phase, self.last_end.offset);
        self.buffer.clear();
        self.stream.reset(self.last_end);
        self.starting_phase = phase;
    }

    /// Re-scans the upcoming `/` or `/=` token as a regular expression
    /// literal, working directly on the raw tail of the source.
    pub fn get_regexp(&mut self) -> Result<Token, Diagnostic> {
        let slash = self.peek().clone();
        if !matches!(slash.kind, TokenKind::Divide | TokenKind::DivideAssignment) {
            return Err(Diagnostic::spanning(
                ErrorKind::UnexpectedToken(slash.text.clone()),
                slash.span,
            ));
        }
        self.back(&slash);
        let start = self.stream.position();
        let tail = self.stream.tail();
        let body_len = match regexp_body_len(tail) {
            Some(len) => len,
            None => {
                let line_end = tail.find('\n').unwrap_or(tail.len());
                self.stream.skip(tail[..line_end].chars().count());
                self.last_end = self.stream.position();
                return Err(Diagnostic::new(
                    ErrorKind::UnterminatedRegExp,
                    start,
                    self.stream.position(),
                ));
            }
        };
        let flags_len = tail[body_len..]
            .chars()
            .take_while(|c| is_id_continue(*c))
            .map(char::len_utf8)
            .sum::<usize>();
        let text = &tail[..body_len + flags_len];
        self.stream.skip(text.chars().count());
        let end = self.stream.position();
        self.last_end = end;
        Ok(Token::new(TokenKind::RegExpLiteral, text, Span::new(start, end)))
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    fn fetch_significant(&mut self) -> Token {
        loop {
            let token = self.fetch();
            if self.with_trivia || !token.kind.is_trivia() {
                return token;
            }
        }
    }

    /// Scans exactly one token (trivia included) from the current position.
    pub fn fetch(&mut self) -> Token {
        let start = self.stream.position();
        let mut phase = match self.starting_phase {
            StartingPhase::Start => Phase::Start,
            StartingPhase::TemplateString => Phase::TemplateString,
        };
        let kind = loop {
            let step = match phase {
                Phase::Start => self.scan_start(),
                Phase::Whitespace => self.scan_whitespace(),
                Phase::LineComment => self.scan_line_comment(),
                Phase::BlockComment => self.scan_block_comment(start),
                Phase::BlockCommentStar => self.scan_block_comment_star(),
                Phase::Identifier => self.scan_identifier(),
                Phase::Zero => self.scan_zero(),
                Phase::HexDigits => self.scan_radix_digits(start, 16, TokenKind::HexLiteral),
                Phase::BinaryDigits => self.scan_radix_digits(start, 2, TokenKind::BinaryLiteral),
                Phase::Decimal => self.scan_decimal(),
                Phase::Fraction => self.scan_fraction(),
                Phase::ExponentSign => self.scan_exponent_sign(),
                Phase::ExponentDigits => self.scan_exponent_digits(start),
                Phase::String(quote) => self.scan_string(start, quote),
                Phase::StringEscape(quote) => self.scan_string_escape(quote),
                Phase::TemplateString => self.scan_template_string(start),
                Phase::TemplateText => self.scan_template_text(),
            };
            match step {
                Step::Next(next) => phase = next,
                Step::Done(kind) => break kind,
            }
        };
        let end = self.stream.position();
        let text = &self.stream.source()[start.offset..end.offset];
        let kind = match kind {
            TokenKind::Identifier => KEYWORDS.get(text).copied().unwrap_or(TokenKind::Identifier),
            other => other,
        };
        Token::new(kind, text, Span::new(start, end))
    }

    fn report(&mut self, kind: ErrorKind, start: Position, end: Position) {
        let diagnostic = Diagnostic::new(kind, start, end);
        // Rewinding may scan the same text twice; report each problem once.
        if self
            .diagnostics
            .iter()
            .any(|d| d.pos == diagnostic.pos && d.code == diagnostic.code)
        {
            return;
        }
        if let Some(handler) = self.on_error.as_mut() {
            handler(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    // ------------------------------------------------------------------------
    // Phase handlers
    // ------------------------------------------------------------------------

    fn scan_start(&mut self) -> Step {
        let Some(ch) = self.stream.peek(0) else {
            return Step::Done(TokenKind::Eof);
        };
        let next = self.stream.peek(1);
        match ch {
            '\n' => {
                self.stream.get();
                Step::Done(TokenKind::NewLine)
            }
            c if is_inline_whitespace(c) => {
                self.stream.get();
                Step::Next(Phase::Whitespace)
            }
            '/' if next == Some('/') => {
                self.stream.skip(2);
                Step::Next(Phase::LineComment)
            }
            '/' if next == Some('*') => {
                self.stream.skip(2);
                Step::Next(Phase::BlockComment)
            }
            '"' | '\'' => {
                self.stream.get();
                Step::Next(Phase::String(ch))
            }
            '`' => {
                self.stream.get();
                Step::Done(TokenKind::Backtick)
            }
            '0' => {
                self.stream.get();
                Step::Next(Phase::Zero)
            }
            '1'..='9' => {
                self.stream.get();
                Step::Next(Phase::Decimal)
            }
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => {
                self.stream.get();
                Step::Next(Phase::Fraction)
            }
            c if is_id_start(c) => {
                self.stream.get();
                Step::Next(Phase::Identifier)
            }
            _ => self.scan_operator(ch),
        }
    }

    fn scan_operator(&mut self, ch: char) -> Step {
        let tail = self.stream.tail();
        for (spelling, kind) in OPERATORS {
            if !tail.starts_with(spelling) {
                continue;
            }
            // `a?.5:b` is a conditional, not optional chaining
            if *kind == TokenKind::OptionalChaining
                && self.stream.peek(2).is_some_and(|c| c.is_ascii_digit())
            {
                continue;
            }
            self.stream.skip(spelling.len());
            return Step::Done(*kind);
        }
        let start = self.stream.position();
        self.stream.get();
        self.report(ErrorKind::InvalidCharacter(ch), start, self.stream.position());
        Step::Done(TokenKind::Unknown)
    }

    fn scan_whitespace(&mut self) -> Step {
        while self.stream.peek(0).is_some_and(is_inline_whitespace) {
            self.stream.get();
        }
        Step::Done(TokenKind::Whitespace)
    }

    fn scan_line_comment(&mut self) -> Step {
        while self.stream.peek(0).is_some_and(|c| c != '\n') {
            self.stream.get();
        }
        Step::Done(TokenKind::LineComment)
    }

    fn scan_block_comment(&mut self, start: Position) -> Step {
        match self.stream.get() {
            None => {
                self.report(ErrorKind::UnterminatedComment, start, self.stream.position());
                Step::Done(TokenKind::BlockComment)
            }
            Some('*') => Step::Next(Phase::BlockCommentStar),
            Some(_) => Step::Next(Phase::BlockComment),
        }
    }

    fn scan_block_comment_star(&mut self) -> Step {
        match self.stream.peek(0) {
            Some('/') => {
                self.stream.get();
                Step::Done(TokenKind::BlockComment)
            }
            Some('*') => {
                self.stream.get();
                Step::Next(Phase::BlockCommentStar)
            }
            _ => Step::Next(Phase::BlockComment),
        }
    }

    fn scan_identifier(&mut self) -> Step {
        while self.stream.peek(0).is_some_and(is_id_continue) {
            self.stream.get();
        }
        Step::Done(TokenKind::Identifier)
    }

    fn scan_zero(&mut self) -> Step {
        match self.stream.peek(0) {
            Some('x' | 'X') => {
                self.stream.get();
                Step::Next(Phase::HexDigits)
            }
            Some('b' | 'B') => {
                self.stream.get();
                Step::Next(Phase::BinaryDigits)
            }
            Some(c) if c.is_ascii_digit() || c == '_' => Step::Next(Phase::Decimal),
            Some('.') if self.stream.peek(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.stream.get();
                Step::Next(Phase::Fraction)
            }
            Some('e' | 'E') => {
                self.stream.get();
                Step::Next(Phase::ExponentSign)
            }
            _ => Step::Done(TokenKind::DecimalLiteral),
        }
    }

    fn scan_radix_digits(&mut self, start: Position, radix: u32, kind: TokenKind) -> Step {
        let mut digits = 0;
        while let Some(c) = self.stream.peek(0) {
            if c.is_digit(radix) {
                digits += 1;
            } else if c != '_' {
                break;
            }
            self.stream.get();
        }
        if digits == 0 {
            let end = self.stream.position();
            let text = self.stream.source()[start.offset..end.offset].to_string();
            self.report(ErrorKind::InvalidNumber(text), start, end);
            return Step::Done(TokenKind::Unknown);
        }
        Step::Done(kind)
    }

    fn scan_decimal(&mut self) -> Step {
        while self.stream.peek(0).is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.stream.get();
        }
        match self.stream.peek(0) {
            Some('.') if self.stream.peek(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.stream.get();
                Step::Next(Phase::Fraction)
            }
            Some('e' | 'E') => {
                self.stream.get();
                Step::Next(Phase::ExponentSign)
            }
            _ => Step::Done(TokenKind::DecimalLiteral),
        }
    }

    fn scan_fraction(&mut self) -> Step {
        while self.stream.peek(0).is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.stream.get();
        }
        if matches!(self.stream.peek(0), Some('e' | 'E')) {
            self.stream.get();
            return Step::Next(Phase::ExponentSign);
        }
        Step::Done(TokenKind::RealLiteral)
    }

    fn scan_exponent_sign(&mut self) -> Step {
        if matches!(self.stream.peek(0), Some('+' | '-')) {
            self.stream.get();
        }
        Step::Next(Phase::ExponentDigits)
    }

    fn scan_exponent_digits(&mut self, start: Position) -> Step {
        if !self.stream.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            let end = self.stream.position();
            let text = self.stream.source()[start.offset..end.offset].to_string();
            self.report(ErrorKind::InvalidNumber(text), start, end);
            return Step::Done(TokenKind::Unknown);
        }
        while self.stream.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            self.stream.get();
        }
        Step::Done(TokenKind::RealLiteral)
    }

    fn scan_string(&mut self, start: Position, quote: char) -> Step {
        match self.stream.peek(0) {
            None | Some('\n') => {
                self.report(ErrorKind::UnterminatedString, start, self.stream.position());
                Step::Done(TokenKind::StringLiteral)
            }
            Some('\\') => {
                self.stream.get();
                Step::Next(Phase::StringEscape(quote))
            }
            Some(c) => {
                self.stream.get();
                if c == quote {
                    Step::Done(TokenKind::StringLiteral)
                } else {
                    Step::Next(Phase::String(quote))
                }
            }
        }
    }

    fn scan_string_escape(&mut self, quote: char) -> Step {
        // The escaped character is taken verbatim; decoding happens in `unescape`.
        self.stream.get();
        Step::Next(Phase::String(quote))
    }

    fn scan_template_string(&mut self, start: Position) -> Step {
        if self.stream.starts_with("`") {
            self.stream.get();
            self.starting_phase = StartingPhase::Start;
            return Step::Done(TokenKind::Backtick);
        }
        if self.stream.starts_with("${") {
            self.stream.skip(2);
            self.starting_phase = StartingPhase::Start;
            return Step::Done(TokenKind::DollarLBrace);
        }
        if self.stream.is_eof() {
            self.report(ErrorKind::UnterminatedTemplate, start, start);
            self.starting_phase = StartingPhase::Start;
            return Step::Done(TokenKind::Eof);
        }
        Step::Next(Phase::TemplateText)
    }

    fn scan_template_text(&mut self) -> Step {
        loop {
            if self.stream.is_eof() || self.stream.starts_with("`") || self.stream.starts_with("${") {
                return Step::Done(TokenKind::TemplateSegment);
            }
            if self.stream.get() == Some('\\') {
                self.stream.get();
            }
        }
    }
}

// ============================================================================
// CHARACTER CLASSES AND HELPERS
// ============================================================================

fn is_inline_whitespace(c: char) -> bool {
    c != '\n' && (c.is_whitespace() || c == '\u{feff}')
}

pub(crate) fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_id_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Length in bytes of `/body/` at the start of `text`, or `None` when the
/// literal is not closed on the same line.
fn regexp_body_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    if chars.next()?.1 != '/' {
        return None;
    }
    let mut in_class = false;
    while let Some((i, c)) = chars.next() {
        match c {
            '\n' => return None,
            '\\' => {
                if matches!(chars.next(), None | Some((_, '\n'))) {
                    return None;
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Decodes escape sequences in the body of a string literal or template
/// segment (without the surrounding quotes).
pub fn unescape(raw: &str) -> Result<String, ErrorKind> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('0') => result.push('\0'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                result.push(decode_code_point(&hex, 2)?);
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    let digits: String = chars.by_ref().take_while(|c| *c != '}').collect();
                    if digits.is_empty() || digits.len() > 6 {
                        return Err(ErrorKind::InvalidEscape);
                    }
                    digits
                } else {
                    let digits: String = chars.by_ref().take(4).collect();
                    if digits.len() != 4 {
                        return Err(ErrorKind::InvalidEscape);
                    }
                    digits
                };
                result.push(decode_code_point(&hex, hex.len())?);
            }
            Some(other) => result.push(other),
            None => return Err(ErrorKind::InvalidEscape),
        }
    }
    Ok(result)
}

fn decode_code_point(hex: &str, expected_len: usize) -> Result<char, ErrorKind> {
    if hex.len() != expected_len || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ErrorKind::InvalidEscape);
    }
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(ErrorKind::InvalidEscape)
}

/// Tokenizes a whole source string. Trivia is included when `with_trivia`
/// is set. The final token is always [`TokenKind::Eof`].
pub fn tokenize(source: &str, with_trivia: bool) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = ScriptLexer::new(source).with_trivia(with_trivia);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.get();
        let eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if eof {
            break;
        }
    }
    let diagnostics = lexer.take_diagnostics();
    (tokens, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, false).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_after_identifier_scan() {
        use TokenKind::*;
        assert_eq!(kinds("let letter in inner"), vec![Let, Identifier, In, Identifier, Eof]);
        assert_eq!(kinds("typeof NaN Infinity"), vec![Typeof, NaN, Infinity, Eof]);
    }

    #[test]
    fn test_longest_operator_match() {
        use TokenKind::*;
        assert_eq!(
            kinds("a >>>= b === c ??= d => e ?. f ... g"),
            vec![
                Identifier,
                ShiftRightAssignment,
                Identifier,
                StrictEqual,
                Identifier,
                NullCoalesceAssignment,
                Identifier,
                Arrow,
                Identifier,
                OptionalChaining,
                Identifier,
                Spread,
                Identifier,
                Eof
            ]
        );
    }

    #[test]
    fn test_question_dot_before_digit() {
        use TokenKind::*;
        assert_eq!(
            kinds("a?.5:1"),
            vec![Identifier, QuestionMark, RealLiteral, Colon, DecimalLiteral, Eof]
        );
    }

    #[test]
    fn test_numeric_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("0 12 0x1F 0b101 3.14 .5 1e10 2.5E-3 1_000"),
            vec![
                DecimalLiteral,
                DecimalLiteral,
                HexLiteral,
                BinaryLiteral,
                RealLiteral,
                RealLiteral,
                RealLiteral,
                RealLiteral,
                DecimalLiteral,
                Eof
            ]
        );
    }

    #[test]
    fn test_invalid_hex_literal_reports() {
        let (tokens, diags) = tokenize("0x", false);
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
        assert_eq!(diags[0].code, "W009");
    }

    #[test]
    fn test_strings_and_unterminated() {
        let (tokens, diags) = tokenize(r#"'a\'b' "c"#, false);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, r#"'a\'b'"#);
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "W006");
    }

    #[test]
    fn test_comments_are_trivia() {
        let (tokens, _) = tokenize("a // one\n/* two */ b", true);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::LineComment,
                TokenKind::NewLine,
                TokenKind::BlockComment,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, diags) = tokenize("a /* never", false);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(diags[0].code, "W007");
    }

    #[test]
    fn test_invalid_character_resumes() {
        let (tokens, diags) = tokenize("a # b", false);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Unknown, TokenKind::Identifier, TokenKind::Eof]
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "W005");
        assert_eq!(diags[0].pos, 2);
    }

    #[test]
    fn test_template_phase() {
        let mut lexer = ScriptLexer::new("`a${x}b`");
        assert_eq!(lexer.get().kind, TokenKind::Backtick);
        lexer.set_starting_phase(StartingPhase::TemplateString);
        let seg = lexer.get();
        assert_eq!((seg.kind, seg.text.as_str()), (TokenKind::TemplateSegment, "a"));
        assert_eq!(lexer.get().kind, TokenKind::DollarLBrace);
        assert_eq!(lexer.get().kind, TokenKind::Identifier);
        assert_eq!(lexer.get().kind, TokenKind::RBrace);
        lexer.set_starting_phase(StartingPhase::TemplateString);
        assert_eq!(lexer.get().text, "b");
        assert_eq!(lexer.get().kind, TokenKind::Backtick);
        assert_eq!(lexer.get().kind, TokenKind::Eof);
    }

    #[test]
    fn test_lookahead_and_back() {
        let mut lexer = ScriptLexer::new("a + b");
        assert_eq!(lexer.ahead(2).text, "b");
        let a = lexer.get();
        assert_eq!(lexer.peek().kind, TokenKind::Plus);
        lexer.back(&a);
        assert_eq!(lexer.get().text, "a");
    }

    #[test]
    fn test_regexp_rescan() {
        let mut lexer = ScriptLexer::new("/a[/]b\\//gi.test(x)");
        let re = lexer.get_regexp().unwrap();
        assert_eq!(re.kind, TokenKind::RegExpLiteral);
        assert_eq!(re.text, "/a[/]b\\//gi");
        assert_eq!(lexer.get().kind, TokenKind::Dot);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb\x41B\u{1F600}").unwrap(), "a\nbAB\u{1F600}");
        assert_eq!(unescape(r"\q").unwrap(), "q");
        assert_eq!(unescape(r"\x4"), Err(ErrorKind::InvalidEscape));
    }

    #[test]
    fn test_positions() {
        let (tokens, _) = tokenize("a\n  bc", false);
        assert_eq!(tokens[1].span.start.line, 2);
        assert_eq!(tokens[1].span.start.column, 2);
        assert_eq!(tokens[1].span.start.offset, 4);
    }
}
