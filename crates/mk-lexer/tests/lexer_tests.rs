//! Integration tests for the Manaknight lexer.
//!
//! These exercise the public `Lexer::tokenize` surface over realistic
//! source fragments: whole declarations, operator runs, comment handling,
//! and the lexeme-concatenation contract.

use mk_common::token::TokenKind;
use mk_lexer::Lexer;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize(source)
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn lexes_a_function_declaration() {
    let src = r#"fn greet(name: String) : String { "hi " + name }"#;
    assert_eq!(
        kinds(src),
        vec![
            TokenKind::Fn,
            TokenKind::Ident,
            TokenKind::LParen,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::Ident,
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Ident,
            TokenKind::LBrace,
            TokenKind::StringLiteral,
            TokenKind::Plus,
            TokenKind::Ident,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_an_effectful_function_header() {
    let src = "fn now() : Int uses { time } { 0 }";
    let ks = kinds(src);
    assert!(ks.contains(&TokenKind::Uses));
    assert_eq!(Lexer::tokenize(src).errors.len(), 0);
}

#[test]
fn lexes_an_api_route() {
    let src = r#"api GET "/u/:id" (id: String) : String { id }"#;
    let ks = kinds(src);
    assert_eq!(ks[0], TokenKind::Api);
    assert_eq!(ks[1], TokenKind::Ident); // GET is an identifier
    assert_eq!(ks[2], TokenKind::StringLiteral);
}

#[test]
fn token_spans_cover_the_source_in_order() {
    let src = "let x = 1 + 2 // done";
    let result = Lexer::tokenize(src);
    assert!(result.errors.is_empty());
    let mut last_end = 0u32;
    for token in &result.tokens {
        assert!(token.span.start >= last_end, "tokens must not overlap");
        last_end = token.span.end;
    }
    assert_eq!(last_end as usize, src.len());
}

#[test]
fn pipe_chain_lexes_as_pipe_tokens() {
    assert_eq!(
        kinds("1 |> inc |> inc"),
        vec![
            TokenKind::IntLiteral,
            TokenKind::Pipe,
            TokenKind::Ident,
            TokenKind::Pipe,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn union_bar_vs_logical_or() {
    assert_eq!(
        kinds("Circle | Dot || x"),
        vec![
            TokenKind::Ident,
            TokenKind::Bar,
            TokenKind::Ident,
            TokenKind::PipePipe,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_with_escapes_stays_one_token() {
    let src = r#""say \"hi\" \\ twice""#;
    let result = Lexer::tokenize(src);
    assert!(result.errors.is_empty());
    assert_eq!(result.tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(result.tokens[0].span.end as usize, src.len());
    assert_eq!(mk_lexer::unescape_string(src), "say \"hi\" \\ twice");
}

#[test]
fn multiple_errors_all_reported() {
    let src = "@ \"open\n$";
    let result = Lexer::tokenize(src);
    // '@', unterminated string, '$' -- three independent errors.
    assert_eq!(result.errors.len(), 3);
}
