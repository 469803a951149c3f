//! Type-form parsers for Manaknight.
//!
//! Type forms are: a (possibly qualified) named type, a generic
//! application `Name<T, U>`, and a function type
//! `(T, U) -> R [uses { e }]`. Primitive types (`Int`, `Bool`, `String`,
//! `Unit`) are ordinary names resolved against the prelude.

use mk_common::diag::codes;

use super::items::{parse_path, parse_uses_clause};
use super::{describe, Parser};
use crate::syntax_kind::SyntaxKind;

/// Parse a type.
pub(crate) fn parse_type(p: &mut Parser) {
    match p.current() {
        SyntaxKind::IDENT => parse_named_type(p),
        SyntaxKind::L_PAREN => parse_fn_type(p),
        _ => {
            p.error(
                codes::UNEXPECTED_TOKEN,
                &format!("expected a type, found {}", describe(p.current())),
            );
        }
    }
}

/// Parse a named type or a generic application:
/// `Int`, `util.Money`, `Option<Int>`, `Map<String, Int>`.
fn parse_named_type(p: &mut Parser) {
    let m = p.open();
    parse_path(p);

    if p.at(SyntaxKind::LT) {
        let args = p.open();
        p.advance(); // <
        parse_type(p);
        while p.eat(SyntaxKind::COMMA) {
            parse_type(p);
        }
        p.expect(SyntaxKind::GT);
        p.close(args, SyntaxKind::GENERIC_ARG_LIST);
        p.close(m, SyntaxKind::GENERIC_TYPE);
    } else {
        p.close(m, SyntaxKind::PATH_TYPE);
    }
}

/// Parse a function type: `(T, U) -> R [uses { e1, e2 }]`.
fn parse_fn_type(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (

    if !p.at(SyntaxKind::R_PAREN) {
        parse_type(p);
        while p.eat(SyntaxKind::COMMA) {
            parse_type(p);
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.expect(SyntaxKind::ARROW);
    parse_type(p);

    if p.at(SyntaxKind::USES_KW) {
        parse_uses_clause(p);
    }

    p.close(m, SyntaxKind::FN_TYPE);
}
