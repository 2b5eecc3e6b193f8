//! UTF-8 source to token stream, with indentation folded into
//! `Indent`/`Dedent` tokens (spec §4.2).
//!
//! Mirrors the teacher's batch, indent-stack-driven lexing style
//! (`logicaffeine_language::lexer::LineLexer`), simplified to a single stage
//! since Trace has no word-classification pass to hand off to.

use crate::error::{LexError, MAX_ERRORS};
use crate::token::{Interrogative, Keyword, Operator, Token, TokenKind};
use tracec_base::Span;

/// Lexes `source` into a token stream terminated by `Eof`.
///
/// Errors accumulate (spec §7: bounded at [`MAX_ERRORS`]) rather than
/// aborting on the first bad character; the lexer resynchronizes by
/// skipping to the next newline, matching the parser's own recovery
/// strategy so a single typo doesn't suppress every later diagnostic.
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    indent_stack: Vec<usize>,
    at_line_start: bool,
    bracket_depth: i32,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            indent_stack: vec![0],
            at_line_start: true,
            bracket_depth: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Token>, Vec<LexError>) {
        while self.errors.len() < MAX_ERRORS {
            if self.at_line_start && self.bracket_depth == 0 {
                if !self.handle_line_start() {
                    break;
                }
                continue;
            }
            match self.next_token() {
                Some(Ok(tok)) => {
                    let is_eof = matches!(tok.kind, TokenKind::Eof);
                    self.tokens.push(tok);
                    if is_eof {
                        break;
                    }
                }
                Some(Err(err)) => {
                    self.errors.push(err);
                    self.resync_to_newline();
                }
                None => break,
            }
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, self.here()));
        }
        if !matches!(self.tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            self.tokens.push(Token::new(TokenKind::Eof, self.here()));
        }
        (self.tokens, self.errors)
    }

    fn here(&self) -> Span {
        Span::at(self.pos, self.pos, self.line, self.col)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    /// Processes indentation at the start of a (non-bracketed) physical
    /// line: measures leading whitespace, compares to the indent stack, and
    /// emits `Indent`/`Dedent`/`Newline` as needed. Blank and comment-only
    /// lines emit only `Newline` and do not affect the stack (spec §4.2).
    /// Returns `false` at end of input.
    fn handle_line_start(&mut self) -> bool {
        let line_start = self.pos;
        let mut indent = 0usize;
        while let Some(b) = self.peek_byte() {
            match b {
                b' ' => {
                    indent += 1;
                    self.advance_byte();
                }
                b'\t' => {
                    indent += 8 - (indent % 8);
                    self.advance_byte();
                }
                _ => break,
            }
        }
        if self.peek_byte().is_none() {
            self.at_line_start = false;
            return false;
        }
        let blank_or_comment = matches!(self.peek_byte(), Some(b'\n') | Some(b'#') | None);
        if blank_or_comment {
            if self.peek_byte() == Some(b'#') {
                while let Some(b) = self.peek_byte() {
                    if b == b'\n' {
                        break;
                    }
                    self.advance_byte();
                }
            }
            let span = self.here();
            if self.peek_byte() == Some(b'\n') {
                self.advance_byte();
            }
            self.tokens.push(Token::new(TokenKind::Newline, span));
            self.at_line_start = true;
            return true;
        }
        let current = *self.indent_stack.last().unwrap();
        if indent > current {
            self.indent_stack.push(indent);
            self.tokens.push(Token::new(TokenKind::Indent, Span::at(line_start, self.pos, self.line, self.col)));
        } else {
            while indent < *self.indent_stack.last().unwrap() {
                self.indent_stack.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, self.here()));
            }
            if indent != *self.indent_stack.last().unwrap() {
                self.errors.push(LexError::InconsistentIndent { span: self.here() });
            }
        }
        self.at_line_start = false;
        true
    }

    fn resync_to_newline(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b == b'\n' {
                self.advance_byte();
                break;
            }
            self.advance_byte();
        }
        self.at_line_start = true;
    }

    /// Lexes the next non-whitespace token. Returns `None` once input (and
    /// any trailing synthetic `Dedent`s, handled by the caller) is exhausted.
    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            match self.peek_byte() {
                None => return Some(Ok(Token::new(TokenKind::Eof, self.here()))),
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.advance_byte();
                }
                Some(b'\n') => {
                    let span = self.here();
                    self.advance_byte();
                    self.at_line_start = self.bracket_depth == 0;
                    if self.bracket_depth == 0 {
                        return Some(Ok(Token::new(TokenKind::Newline, span)));
                    }
                }
                Some(b'#') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance_byte();
                    }
                }
                Some(b) if b.is_ascii_digit() => return Some(self.lex_number()),
                Some(b'"') | Some(b'\'') => return Some(self.lex_string()),
                Some(b) if b.is_ascii_alphabetic() || b == b'_' => return Some(Ok(self.lex_word())),
                Some(_) => return Some(self.lex_operator()),
            }
        }
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let (line, col) = (self.line, self.col);
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
            self.advance_byte();
        }
        if self.peek_byte() == Some(b'.')
            && matches!(self.bytes.get(self.pos + 1), Some(b) if b.is_ascii_digit())
        {
            self.advance_byte();
            while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                self.advance_byte();
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            self.advance_byte();
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.advance_byte();
            }
            if matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                    self.advance_byte();
                }
            } else {
                self.pos = save;
            }
        }
        let text = &self.source[start..self.pos];
        let value: f64 = text.parse().expect("validated digit run must parse");
        Ok(Token::new(TokenKind::Number(value), Span::at(start, self.pos, line, col)))
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let (line, col) = (self.line, self.col);
        let quote = self.advance_byte().expect("caller checked quote present");
        let mut out = Vec::new();
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => {
                    return Err(LexError::UnterminatedString { span: Span::at(start, self.pos, line, col) });
                }
                Some(b) if b == quote => {
                    self.advance_byte();
                    break;
                }
                Some(b'\\') => {
                    let esc_span = self.here();
                    self.advance_byte();
                    match self.advance_byte() {
                        Some(b'n') => out.push(b'\n'),
                        Some(b't') => out.push(b'\t'),
                        Some(b'r') => out.push(b'\r'),
                        Some(b'"') => out.push(b'"'),
                        Some(b'\'') => out.push(b'\''),
                        Some(b'\\') => out.push(b'\\'),
                        Some(b'0') => out.push(0),
                        Some(other) => {
                            return Err(LexError::InvalidEscape { ch: other as char, span: esc_span });
                        }
                        None => {
                            return Err(LexError::UnterminatedString { span: Span::at(start, self.pos, line, col) });
                        }
                    }
                }
                Some(b) => {
                    out.push(b);
                    self.advance_byte();
                }
            }
        }
        Ok(Token::new(TokenKind::Str(out), Span::at(start, self.pos, line, col)))
    }

    fn lex_word(&mut self) -> Token {
        let start = self.pos;
        let (line, col) = (self.line, self.col);
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.advance_byte();
        }
        let text = &self.source[start..self.pos];
        let span = Span::at(start, self.pos, line, col);
        if let Some(interrogative) = Interrogative::from_str(text) {
            return Token::new(TokenKind::Interrogative(interrogative), span);
        }
        if let Some(keyword) = Keyword::from_str(text) {
            return Token::new(TokenKind::Keyword(keyword), span);
        }
        Token::new(TokenKind::Identifier(text.to_string()), span)
    }

    fn lex_operator(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let (line, col) = (self.line, self.col);
        let first = self.advance_byte().expect("caller checked a byte is present");
        let second = self.peek_byte();
        let (op, two_char) = match (first, second) {
            (b'<', Some(b'=')) => (Operator::Le, true),
            (b'>', Some(b'=')) => (Operator::Ge, true),
            (b'!', Some(b'=')) => (Operator::Ne, true),
            (b'+', _) => (Operator::Plus, false),
            (b'-', _) => (Operator::Minus, false),
            (b'*', _) => (Operator::Star, false),
            (b'/', _) => (Operator::Slash, false),
            (b'%', _) => (Operator::Percent, false),
            (b'=', _) => (Operator::Eq, false),
            (b'<', _) => (Operator::Lt, false),
            (b'>', _) => (Operator::Gt, false),
            (b'(', _) => {
                self.bracket_depth += 1;
                (Operator::LParen, false)
            }
            (b')', _) => {
                self.bracket_depth = (self.bracket_depth - 1).max(0);
                (Operator::RParen, false)
            }
            (b'[', _) => {
                self.bracket_depth += 1;
                (Operator::LBracket, false)
            }
            (b']', _) => {
                self.bracket_depth = (self.bracket_depth - 1).max(0);
                (Operator::RBracket, false)
            }
            (b',', _) => (Operator::Comma, false),
            (b':', _) => (Operator::Colon, false),
            (other, _) => {
                let ch = self.source[start..].chars().next().unwrap_or(other as char);
                return Err(LexError::InvalidCharacter { ch, span: Span::at(start, self.pos, line, col) });
            }
        };
        if two_char {
            self.advance_byte();
        }
        Ok(Token::new(TokenKind::Operator(op), Span::at(start, self.pos, line, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, errors) = lex(src);
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_assignment() {
        let kinds = kinds("x is 42\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Keyword(Keyword::Is),
                TokenKind::Number(42.0),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn indentation_produces_indent_and_dedent() {
        let src = "define f as:\n  return 1\nprint of f\n";
        let kinds = kinds(src);
        assert!(kinds.contains(&TokenKind::Indent));
        assert!(kinds.contains(&TokenKind::Dedent));
    }

    #[test]
    fn comment_only_line_is_ignored_for_indentation() {
        let src = "x is 1\n  # a comment, not a block\ny is 2\n";
        let (tokens, errors) = lex(src);
        assert!(errors.is_empty());
        assert!(!tokens.iter().any(|t| matches!(t.kind, TokenKind::Indent)));
    }

    #[test]
    fn string_literal_handles_escapes() {
        let kinds = kinds("\"a\\nb\"\n");
        assert_eq!(kinds[0], TokenKind::Str(b"a\nb".to_vec()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let (_, errors) = lex("\"abc\n");
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn invalid_character_is_reported_and_lexing_continues() {
        let (tokens, errors) = lex("x is 1\n@\ny is 2\n");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::InvalidCharacter { ch: '@', .. }));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Identifier("y".into())));
    }

    #[test]
    fn longest_match_operators() {
        let kinds = kinds("a <= b\nc != d\n");
        assert!(kinds.contains(&TokenKind::Operator(Operator::Le)));
        assert!(kinds.contains(&TokenKind::Operator(Operator::Ne)));
    }

    #[test]
    fn interrogative_is_its_own_token_kind() {
        let kinds = kinds("WHO\n");
        assert_eq!(kinds[0], TokenKind::Interrogative(Interrogative::Who));
    }

    #[test]
    fn ends_with_eof() {
        let (tokens, _) = lex("x is 1\n");
        assert!(matches!(tokens.last().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn dedents_to_zero_are_synthesized_at_eof() {
        let src = "define f as:\n  x is 1\n";
        let (tokens, _) = lex(src);
        let dedents = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Dedent)).count();
        assert_eq!(dedents, 1);
    }
}
