use std::fmt;

use mk_common::diag::{codes, ErrorCode};
use mk_common::span::Span;

/// A lexical error with location information.
///
/// Errors are collected during lexing rather than aborting the stream,
/// so the parser can resynchronize and later passes can still report
/// independent problems.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    /// Create a new lexical error.
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The catalog code for this error.
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            LexErrorKind::UnterminatedString => codes::UNTERMINATED_STRING,
            LexErrorKind::IntOverflow(_) => codes::INT_OVERFLOW,
            LexErrorKind::UnexpectedCharacter(_) => codes::UNEXPECTED_CHARACTER,
            LexErrorKind::InvalidEscape(_) => codes::UNEXPECTED_CHARACTER,
        }
    }
}

/// The specific kind of lexical error.
#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    /// A string literal was not closed before end of line or input.
    UnterminatedString,
    /// An integer literal does not fit in a signed 64-bit value.
    IntOverflow(String),
    /// An unexpected character was encountered.
    UnexpectedCharacter(char),
    /// An escape sequence other than `\"` or `\\` inside a string.
    InvalidEscape(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::IntOverflow(s) => {
                write!(f, "integer literal `{s}` does not fit in 64 bits")
            }
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::InvalidEscape(c) => write!(f, "invalid escape sequence: \\{c}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}
