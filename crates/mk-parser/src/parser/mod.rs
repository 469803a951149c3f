//! Event-based parser for Manaknight.
//!
//! The parser consumes a token stream and produces events (Open/Close/
//! Advance) that are later converted into a rowan green tree. This
//! decouples parsing logic from tree construction.
//!
//! # Architecture
//!
//! The parser uses matklad's event-based approach (as in rust-analyzer):
//!
//! 1. Parse functions call `open()` to start a node, `advance()` to consume
//!    tokens, and `close()` to finish a node with its actual kind.
//! 2. Events are collected into a flat `Vec<Event>`.
//! 3. `build_tree()` converts events into a rowan `GreenNode`.
//!
//! The `open_before()` method enables wrapping a previously completed node
//! (e.g., turning `ident` into `call_expr(ident, arg_list)`) using the
//! "forward parent" technique.
//!
//! # Error recovery
//!
//! The parser is total: every production either returns a well-formed node
//! or a partial node plus a diagnostic, after which it resynchronizes on
//! the next `}` or declaration keyword (`fn`, `api`, `module`, `type`,
//! `effect`, `import`) or end of input. Skipped tokens are wrapped in an
//! `ERROR_NODE` so the CST still covers them.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod patterns;
pub(crate) mod types;

use mk_common::diag::{codes, ErrorCode};
use mk_common::span::Span;
use mk_common::token::Token;

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

/// A parser event. Events are collected during parsing and later converted
/// into a rowan green tree by [`Parser::build_tree`].
#[derive(Debug)]
enum Event {
    /// Start a new CST node. The `kind` is initially TOMBSTONE and gets
    /// patched by `close()` with the real node kind.
    ///
    /// `forward_parent` is used by `open_before()` to indicate that this
    /// node should be opened before the node at the specified event index.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    /// Finish the current CST node.
    Close,
    /// Consume the current token, advancing the token position.
    Advance,
}

/// An opaque marker for a started but not-yet-closed CST node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// An opaque marker for a completed (opened and closed) CST node.
/// Used by `open_before()` to wrap a previously completed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

/// The token kinds the parser resynchronizes on after an error.
pub(crate) const RECOVERY_SET: &[SyntaxKind] = &[
    SyntaxKind::R_BRACE,
    SyntaxKind::FN_KW,
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::API_KW,
    SyntaxKind::MODULE_KW,
    SyntaxKind::TYPE_KW,
    SyntaxKind::EFFECT_KW,
    SyntaxKind::IMPORT_KW,
];

/// Event-based parser for Manaknight source code.
pub(crate) struct Parser<'src> {
    /// All tokens from the lexer (including Eof).
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Collected parser events.
    events: Vec<Event>,
    /// Original source text (for extracting token text via spans).
    source: &'src str,
    /// Collected parse errors.
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source text.
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Returns the SyntaxKind of the current significant token.
    ///
    /// Skips over trivia (comments). Returns `SyntaxKind::EOF` past the end.
    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Returns the SyntaxKind of the Nth significant token ahead.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        let mut pos = self.pos;
        let mut remaining = n;
        while pos < self.tokens.len() {
            let kind = SyntaxKind::from(self.tokens[pos].kind);
            if kind.is_trivia() {
                pos += 1;
                continue;
            }
            if remaining == 0 {
                return kind;
            }
            remaining -= 1;
            pos += 1;
        }
        SyntaxKind::EOF
    }

    /// Returns the text of the current significant token.
    pub(crate) fn current_text(&self) -> &str {
        let pos = self.skip_to_significant(self.pos);
        if pos < self.tokens.len() {
            let span = &self.tokens[pos].span;
            &self.source[span.start as usize..span.end as usize]
        } else {
            ""
        }
    }

    /// Returns the span of the current significant token.
    pub(crate) fn current_span(&self) -> Span {
        let pos = self.skip_to_significant(self.pos);
        if pos < self.tokens.len() {
            self.tokens[pos].span
        } else {
            let end = self.source.len() as u32;
            Span::new(end, end)
        }
    }

    /// Check if the current significant token matches the given kind.
    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check if the current significant token matches any of the given kinds.
    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    // ── Mutation: node management ──────────────────────────────────────

    /// Start a new CST node. Returns a marker that must be passed to
    /// `close()` to finish the node.
    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a new CST node BEFORE a previously completed node.
    ///
    /// Uses the "forward parent" technique: instead of physically inserting
    /// into the events vec (which would invalidate indices), we set a
    /// `forward_parent` link on the completed node's Open event.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    /// Close a CST node, patching its Open event with the actual kind.
    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open { kind: slot, .. } = &mut self.events[m.index] {
            *slot = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Mutation: token consumption ────────────────────────────────────

    /// Consume the current token, emitting Advance events for all skipped
    /// trivia tokens and then for the significant token itself.
    pub(crate) fn advance(&mut self) {
        while self.pos < self.tokens.len()
            && SyntaxKind::from(self.tokens[self.pos].kind).is_trivia()
        {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
        if self.pos < self.tokens.len()
            && SyntaxKind::from(self.tokens[self.pos].kind) != SyntaxKind::EOF
        {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Emit Advance events for any trailing trivia. Called once before the
    /// root node closes so end-of-file comments stay in the tree.
    pub(crate) fn flush_trivia(&mut self) {
        while self.pos < self.tokens.len()
            && SyntaxKind::from(self.tokens[self.pos].kind).is_trivia()
        {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Consume the current token wrapped in an ERROR_NODE.
    pub(crate) fn advance_with_error(&mut self, message: &str) {
        let m = self.open();
        self.error(codes::UNEXPECTED_TOKEN, message);
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    /// If the current token matches `kind`, consume it and return true.
    /// Otherwise, record an E1004 and return false without consuming.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error(
                codes::UNEXPECTED_TOKEN,
                &format!("expected {}, found {}", describe(kind), describe(self.current())),
            );
            false
        }
    }

    /// If the current token matches `kind`, consume it and return true.
    /// Otherwise, return false (no error emitted).
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip tokens (wrapped in an ERROR_NODE) until one of `stop` kinds or
    /// end of input. This is the per-construct resynchronization point.
    pub(crate) fn recover_until(&mut self, stop: &[SyntaxKind]) {
        if self.at(SyntaxKind::EOF) || self.at_any(stop) {
            return;
        }
        let m = self.open();
        while !self.at(SyntaxKind::EOF) && !self.at_any(stop) {
            self.advance();
        }
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    // ── Error reporting ────────────────────────────────────────────────

    /// Record a parse error at the current position.
    pub(crate) fn error(&mut self, code: ErrorCode, message: &str) {
        let span = self.current_span();
        self.errors.push(ParseError::new(code, message, span));
    }

    /// Record a parse error at an explicit span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: &str, span: Span) {
        self.errors.push(ParseError::new(code, message, span));
    }

    /// Record a parse error with a related span for additional context.
    pub(crate) fn error_with_related(
        &mut self,
        code: ErrorCode,
        message: &str,
        related_span: Span,
        related_msg: &str,
    ) {
        let span = self.current_span();
        self.errors.push(ParseError::with_related(
            code,
            message,
            span,
            related_msg,
            related_span,
        ));
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Find the position of the next significant token starting from `pos`.
    fn skip_to_significant(&self, mut pos: usize) -> usize {
        while pos < self.tokens.len() && SyntaxKind::from(self.tokens[pos].kind).is_trivia() {
            pos += 1;
        }
        pos
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert collected events into a rowan `GreenNode` and errors.
    ///
    /// Forward parents: when `open_before(completed)` was called, the
    /// completed node's Open event carries a `forward_parent` link to the
    /// wrapping Open event. When we encounter such an Open we follow the
    /// chain, open the wrappers outermost-first, and tombstone the wrapper
    /// events so they are skipped when reached in sequence.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos: usize = 0;
        let mut forward_parents: Vec<(usize, SyntaxKind)> = Vec::new();

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent,
                } => {
                    if forward_parent.is_some() {
                        forward_parents.clear();
                        let mut current = i;
                        loop {
                            let (fk, fp) = match self.events[current] {
                                Event::Open {
                                    kind,
                                    forward_parent,
                                } => (kind, forward_parent),
                                _ => unreachable!("forward parent must point at an Open event"),
                            };
                            forward_parents.push((current, fk));
                            match fp {
                                Some(next) => current = next,
                                None => break,
                            }
                        }

                        for &(fp_idx, _) in forward_parents.iter().skip(1) {
                            if let Event::Open {
                                ref mut kind,
                                ref mut forward_parent,
                            } = self.events[fp_idx]
                            {
                                *kind = SyntaxKind::TOMBSTONE;
                                *forward_parent = None;
                            }
                        }
                        if let Event::Open {
                            ref mut forward_parent,
                            ..
                        } = self.events[i]
                        {
                            *forward_parent = None;
                        }

                        for &(_, fk) in forward_parents.iter().rev() {
                            if fk != SyntaxKind::TOMBSTONE {
                                builder.start_node(rowan::SyntaxKind(fk as u16));
                            }
                        }
                    } else if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Close => {
                    builder.finish_node();
                }
                Event::Advance => {
                    if token_pos < self.tokens.len() {
                        let token = &self.tokens[token_pos];
                        let syntax_kind = SyntaxKind::from(token.kind);
                        let text =
                            &self.source[token.span.start as usize..token.span.end as usize];
                        builder.token(rowan::SyntaxKind(syntax_kind as u16), text);
                        token_pos += 1;
                    }
                }
            }
            i += 1;
        }

        (builder.finish(), self.errors)
    }
}

/// Human-readable description of a syntax kind for error messages.
pub(crate) fn describe(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::IDENT => "an identifier",
        SyntaxKind::INT_LITERAL => "an integer literal",
        SyntaxKind::STRING_LITERAL => "a string literal",
        SyntaxKind::L_PAREN => "`(`",
        SyntaxKind::R_PAREN => "`)`",
        SyntaxKind::L_BRACE => "`{`",
        SyntaxKind::R_BRACE => "`}`",
        SyntaxKind::COMMA => "`,`",
        SyntaxKind::DOT => "`.`",
        SyntaxKind::COLON => "`:`",
        SyntaxKind::SEMICOLON => "`;`",
        SyntaxKind::EQ => "`=`",
        SyntaxKind::ARROW => "`->`",
        SyntaxKind::FAT_ARROW => "`=>`",
        SyntaxKind::LT => "`<`",
        SyntaxKind::GT => "`>`",
        SyntaxKind::BAR => "`|`",
        SyntaxKind::FN_KW => "`fn`",
        SyntaxKind::ELSE_KW => "`else`",
        SyntaxKind::USES_KW => "`uses`",
        SyntaxKind::EOF => "end of input",
        _ => "an unexpected token",
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a complete source file.
///
/// Opens a SOURCE_FILE node, parses the optional `language` header and then
/// top-level items until EOF, and closes the root node.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();

    items::parse_optional_language_header(p);

    while !p.at(SyntaxKind::EOF) {
        items::parse_top_item(p);
    }

    p.flush_trivia();
    p.close(root, SyntaxKind::SOURCE_FILE);
}
