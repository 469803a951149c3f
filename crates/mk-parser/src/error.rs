//! Parse error types for the Manaknight parser.

use std::fmt;

use mk_common::diag::ErrorCode;
use mk_common::span::Span;

/// A parse error with a stable catalog code and location information.
///
/// Parse errors carry the primary span where the problem was detected, a
/// human-readable message, and an optional related span for context (e.g.
/// "opened here" for unclosed delimiters).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Catalog code (E1004 for generic structural errors, E1005/E1006 and
    /// E6001/E6002 for the specific rules the grammar enforces).
    pub code: ErrorCode,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Primary source location where the error was detected.
    pub span: Span,
    /// Optional related location with context message.
    pub related: Option<(String, Span)>,
}

impl ParseError {
    /// Create a new parse error with a code, message, and span.
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            related: None,
        }
    }

    /// Create a parse error with a related span for additional context.
    pub fn with_related(
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use mk_common::diag::codes;

    #[test]
    fn parse_error_new() {
        let err = ParseError::new(codes::UNEXPECTED_TOKEN, "expected expression", Span::new(5, 10));
        assert_eq!(err.code, codes::UNEXPECTED_TOKEN);
        assert_eq!(err.message, "expected expression");
        assert!(err.related.is_none());
    }

    #[test]
    fn parse_error_with_related() {
        let err = ParseError::with_related(
            codes::UNEXPECTED_TOKEN,
            "expected `}` to close block",
            Span::new(50, 53),
            "block started here",
            Span::new(10, 11),
        );
        let (msg, span) = err.related.unwrap();
        assert_eq!(msg, "block started here");
        assert_eq!(span, Span::new(10, 11));
    }
}
