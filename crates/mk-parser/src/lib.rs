//! Manaknight parser: recursive descent producing a rowan-based CST.
//!
//! This crate transforms the token stream from `mk-lexer` into a lossless
//! concrete syntax tree (CST) using the `rowan` library, then exposes a
//! typed AST layer on top. The CST preserves all tokens including comments,
//! enabling the formatter and future tooling to work from the same tree.
//!
//! The parser is total: every input produces a tree. Errors are collected
//! with stable catalog codes and the parser resynchronizes at the next
//! closing brace or declaration keyword, so one bad construct does not
//! hide diagnostics in its siblings.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

use mk_lexer::Lexer;

/// Result of parsing a Manaknight source file.
///
/// Contains the green tree (the immutable, cheap-to-clone CST) and all
/// lexical and structural errors encountered, in source order.
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Build the syntax tree root from the green node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The typed view of the root node.
    pub fn source_file(&self) -> ast::item::SourceFile {
        use ast::AstNode;
        ast::item::SourceFile::cast(self.syntax()).expect("root node is always SOURCE_FILE")
    }

    /// Parse errors encountered during lexing and parsing.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether parsing completed without errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a Manaknight source file into a CST.
///
/// This is the main entry point for the parser. It lexes the source,
/// parses the token stream, and returns a [`Parse`] result containing
/// the syntax tree and any errors.
pub fn parse(source: &str) -> Parse {
    let lexed = Lexer::tokenize(source);
    let mut lex_errors: Vec<ParseError> = lexed
        .errors
        .iter()
        .map(|e| ParseError::new(e.code(), e.to_string(), e.span))
        .collect();

    let mut p = parser::Parser::new(lexed.tokens, source);
    parser::parse_source_file(&mut p);
    let (green, parse_errors) = p.build_tree();

    let mut errors = Vec::new();
    errors.append(&mut lex_errors);
    errors.extend(parse_errors);
    errors.sort_by_key(|e| (e.span.start, e.span.end));

    Parse { green, errors }
}

/// Parse a single expression (test and tooling helper).
///
/// The returned tree's root is a `SOURCE_FILE` containing just the
/// expression.
pub fn parse_expr(source: &str) -> Parse {
    let lexed = Lexer::tokenize(source);
    let mut lex_errors: Vec<ParseError> = lexed
        .errors
        .iter()
        .map(|e| ParseError::new(e.code(), e.to_string(), e.span))
        .collect();

    let mut p = parser::Parser::new(lexed.tokens, source);
    let root = p.open();
    parser::expressions::expr(&mut p);
    p.flush_trivia();
    p.close(root, SyntaxKind::SOURCE_FILE);
    let (green, parse_errors) = p.build_tree();

    let mut errors = Vec::new();
    errors.append(&mut lex_errors);
    errors.extend(parse_errors);
    errors.sort_by_key(|e| (e.span.start, e.span.end));

    Parse { green, errors }
}

/// Render a CST as an indented debug tree, one node or token per line.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    render_node(node, 0, &mut out);
    out
}

fn render_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    use std::fmt::Write;

    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{}{:?}", indent, node.kind());
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => render_node(&n, depth + 1, out),
            rowan::NodeOrToken::Token(t) => {
                let indent = "  ".repeat(depth + 1);
                let _ = writeln!(out, "{}{:?} {:?}", indent, t.kind(), t.text());
            }
        }
    }
}
