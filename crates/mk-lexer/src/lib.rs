// Manaknight lexer -- tokenizer for the Manaknight language.

mod error;

use mk_common::span::Span;
use mk_common::token::{keyword_from_str, Token, TokenKind};

pub use error::{LexError, LexErrorKind};

/// The result of tokenizing a source buffer.
///
/// The token vector always ends with an `Eof` token. Lexical errors do not
/// halt the stream; the offending region is covered by an `Error` token (or
/// a literal token whose value is recorded as bad) and scanning continues.
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// The Manaknight lexer. Converts source text into a stream of tokens.
///
/// The lexer walks the source character by character, tracking its byte
/// offset so every token carries an exact [`Span`]. Whitespace (spaces,
/// tabs, line feeds) is skipped; line comments become `Comment` trivia
/// tokens so tooling can see them. Every other lexeme maps 1:1 to a token.
pub struct Lexer<'src> {
    source: &'src str,
    chars: std::str::Chars<'src>,
    /// Byte offset of the next unconsumed character.
    pos: u32,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source, returning tokens and lexical errors.
    pub fn tokenize(source: &str) -> LexResult {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        LexResult {
            tokens,
            errors: lexer.errors,
        }
    }

    // ── Character scanning ─────────────────────────────────────────────

    /// Look at the current character without consuming it.
    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Consume the current character, advancing the byte offset.
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume characters while the predicate holds.
    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
    }

    /// The source text between two byte offsets.
    fn lexeme(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }

    // ── Tokenization ───────────────────────────────────────────────────

    /// Produce the next token.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Delimiters and punctuation ──────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),

            // ── Operators needing one character of lookahead ────────────
            '=' => self.lex_eq(start),
            '!' => self.lex_bang(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_amp(start),
            '|' => self.lex_pipe(start),
            '-' => self.lex_minus(start),
            '/' => self.lex_slash(start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '%' => self.single_char_token(TokenKind::Percent, start),

            // ── Literals ────────────────────────────────────────────────
            '0'..='9' => self.lex_number(start),
            '"' => self.lex_string(start),

            // ── Identifiers and keywords ────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character (error recovery) ──────────────────────
            other => {
                self.bump();
                let span = Span::new(start, self.pos);
                self.errors
                    .push(LexError::new(LexErrorKind::UnexpectedCharacter(other), span));
                Token::new(TokenKind::Error, start, self.pos)
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Skip whitespace. Newlines are not significant in Manaknight.
    fn skip_whitespace(&mut self) {
        self.eat_while(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r');
    }

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.bump();
        Token::new(kind, start, self.pos)
    }

    /// Consume the operator's first character, then pick a one- or
    /// two-character token based on what follows.
    fn one_or_two(&mut self, start: u32, single: TokenKind, next: char, double: TokenKind) -> Token {
        self.bump();
        if self.peek() == Some(next) {
            self.bump();
            Token::new(double, start, self.pos)
        } else {
            Token::new(single, start, self.pos)
        }
    }

    // ── Operator lexing ────────────────────────────────────────────────

    /// `=` -> `Eq`, `==` -> `EqEq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, start: u32) -> Token {
        self.bump();
        match self.peek() {
            Some('=') => {
                self.bump();
                Token::new(TokenKind::EqEq, start, self.pos)
            }
            Some('>') => {
                self.bump();
                Token::new(TokenKind::FatArrow, start, self.pos)
            }
            _ => Token::new(TokenKind::Eq, start, self.pos),
        }
    }

    /// `!` -> `Bang`, `!=` -> `NotEq`
    fn lex_bang(&mut self, start: u32) -> Token {
        self.one_or_two(start, TokenKind::Bang, '=', TokenKind::NotEq)
    }

    /// `<` -> `Lt`, `<=` -> `LtEq`
    fn lex_lt(&mut self, start: u32) -> Token {
        self.one_or_two(start, TokenKind::Lt, '=', TokenKind::LtEq)
    }

    /// `>` -> `Gt`, `>=` -> `GtEq`
    fn lex_gt(&mut self, start: u32) -> Token {
        self.one_or_two(start, TokenKind::Gt, '=', TokenKind::GtEq)
    }

    /// `&&` -> `AmpAmp`, single `&` -> `Error`
    fn lex_amp(&mut self, start: u32) -> Token {
        self.bump();
        if self.peek() == Some('&') {
            self.bump();
            Token::new(TokenKind::AmpAmp, start, self.pos)
        } else {
            let span = Span::new(start, self.pos);
            self.errors
                .push(LexError::new(LexErrorKind::UnexpectedCharacter('&'), span));
            Token::new(TokenKind::Error, start, self.pos)
        }
    }

    /// `||` -> `PipePipe`, `|>` -> `Pipe`, single `|` -> `Bar`
    fn lex_pipe(&mut self, start: u32) -> Token {
        self.bump();
        match self.peek() {
            Some('|') => {
                self.bump();
                Token::new(TokenKind::PipePipe, start, self.pos)
            }
            Some('>') => {
                self.bump();
                Token::new(TokenKind::Pipe, start, self.pos)
            }
            _ => Token::new(TokenKind::Bar, start, self.pos),
        }
    }

    /// `-` -> `Minus`, `->` -> `Arrow`
    fn lex_minus(&mut self, start: u32) -> Token {
        self.one_or_two(start, TokenKind::Minus, '>', TokenKind::Arrow)
    }

    /// `/` -> `Slash`, `//` -> line comment to end of line.
    fn lex_slash(&mut self, start: u32) -> Token {
        self.bump();
        if self.peek() == Some('/') {
            self.bump();
            self.eat_while(|c| c != '\n' && c != '\r');
            Token::new(TokenKind::Comment, start, self.pos)
        } else {
            Token::new(TokenKind::Slash, start, self.pos)
        }
    }

    // ── Literals ───────────────────────────────────────────────────────

    /// Lex a decimal integer literal into a signed 64-bit value.
    ///
    /// Overflow is reported but the token stays an `IntLiteral` so the
    /// parser does not cascade.
    fn lex_number(&mut self, start: u32) -> Token {
        self.eat_while(|c| c.is_ascii_digit());
        let end = self.pos;
        let lexeme = self.lexeme(start, end);
        if lexeme.parse::<i64>().is_err() {
            self.errors.push(LexError::new(
                LexErrorKind::IntOverflow(lexeme.to_string()),
                Span::new(start, end),
            ));
        }
        Token::new(TokenKind::IntLiteral, start, end)
    }

    /// Lex a double-quoted string literal.
    ///
    /// Supports `\"` and `\\` escapes. The literal must close on the same
    /// line; a line feed or end of input before the closing quote yields a
    /// single unterminated-string error and a synthetic error token.
    fn lex_string(&mut self, start: u32) -> Token {
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    let span = Span::new(start, self.pos);
                    self.errors
                        .push(LexError::new(LexErrorKind::UnterminatedString, span));
                    return Token::new(TokenKind::Error, start, self.pos);
                }
                Some('"') => {
                    self.bump();
                    return Token::new(TokenKind::StringLiteral, start, self.pos);
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('"') | Some('\\') => {
                            self.bump();
                        }
                        Some(other) => {
                            let esc_start = self.pos - 1;
                            self.bump();
                            self.errors.push(LexError::new(
                                LexErrorKind::InvalidEscape(other),
                                Span::new(esc_start, self.pos),
                            ));
                        }
                        None => {} // loop reports unterminated on next turn
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Lex an identifier, then map it through the keyword table.
    ///
    /// Keyword lookup after acceptance is what makes keywords reserved:
    /// `fn` can never reach the parser as an identifier.
    fn lex_ident(&mut self, start: u32) -> Token {
        self.eat_while(is_ident_continue);
        let end = self.pos;
        let kind = keyword_from_str(self.lexeme(start, end)).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, end)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Decode the contents of a `StringLiteral` lexeme (including its quotes)
/// into the string value it denotes, resolving `\"` and `\\` escapes.
pub fn unescape_string(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= -> |> => && ||"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Arrow,
                TokenKind::Pipe,
                TokenKind::FatArrow,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_is_trivia_token() {
        assert_eq!(
            kinds("1 // note\n2"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::Comment,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_e1001() {
        let result = Lexer::tokenize("\"abc\nfn");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedString);
        assert_eq!(
            result.errors[0].code(),
            mk_common::diag::codes::UNTERMINATED_STRING
        );
        // The stream continues after the error token.
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Fn));
    }

    #[test]
    fn int_overflow_reports_e1002_but_keeps_token() {
        let result = Lexer::tokenize("99999999999999999999");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0].kind, LexErrorKind::IntOverflow(_)));
        assert_eq!(result.tokens[0].kind, TokenKind::IntLiteral);
    }

    #[test]
    fn max_i64_is_not_overflow() {
        let result = Lexer::tokenize("9223372036854775807");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn keywords_are_reserved() {
        assert_eq!(
            kinds("fn function match uses api pub"),
            vec![
                TokenKind::Fn,
                TokenKind::Function,
                TokenKind::Match,
                TokenKind::Uses,
                TokenKind::Api,
                TokenKind::Pub,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn identifiers_with_underscore() {
        let result = Lexer::tokenize("_tmp my_var x1");
        let idents: Vec<TokenKind> = result.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            idents,
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn spans_track_multibyte_characters() {
        // 'é' is two bytes; the span after it must land on the byte
        // boundary, not the character count.
        let result = Lexer::tokenize("é x");
        assert!(result.errors.is_empty());
        assert_eq!(result.tokens[0].kind, TokenKind::Ident);
        assert_eq!(result.tokens[0].span, Span::new(0, 2));
        assert_eq!(result.tokens[1].span, Span::new(3, 4));
    }

    #[test]
    fn unexpected_character_recovers() {
        let result = Lexer::tokenize("1 @ 2");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].kind,
            LexErrorKind::UnexpectedCharacter('@')
        );
        assert_eq!(
            result.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::IntLiteral,
                TokenKind::Error,
                TokenKind::IntLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unescape_resolves_escapes() {
        assert_eq!(unescape_string("\"a\\\"b\""), "a\"b");
        assert_eq!(unescape_string("\"a\\\\b\""), "a\\b");
        assert_eq!(unescape_string("\"plain\""), "plain");
    }
}
