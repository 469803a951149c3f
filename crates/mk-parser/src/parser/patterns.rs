//! Pattern parsers for Manaknight match arms.
//!
//! Patterns are deliberately flat: an arm is either a wildcard `_` or a
//! constructor with optional binding sub-patterns, `Some(x)` / `None` /
//! `Circle(r)`. Sub-patterns may only be bindings or wildcards; nested
//! constructor patterns are rejected so exhaustiveness stays a
//! constructor-coverage question.

use mk_common::diag::codes;

use super::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse an arm-level pattern: wildcard or constructor.
pub(crate) fn parse_pattern(p: &mut Parser) {
    if p.at(SyntaxKind::IDENT) && p.current_text() == "_" {
        let m = p.open();
        p.advance();
        p.close(m, SyntaxKind::WILDCARD_PAT);
        return;
    }

    if p.at(SyntaxKind::IDENT) {
        let m = p.open();
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);

        if p.at(SyntaxKind::L_PAREN) {
            p.advance(); // (
            if !p.at(SyntaxKind::R_PAREN) {
                parse_sub_pattern(p);
                while p.eat(SyntaxKind::COMMA) {
                    parse_sub_pattern(p);
                }
            }
            p.expect(SyntaxKind::R_PAREN);
        }

        p.close(m, SyntaxKind::CONSTRUCTOR_PAT);
        return;
    }

    p.error(
        codes::UNEXPECTED_TOKEN,
        "expected a constructor pattern or `_`",
    );
}

/// Parse a constructor sub-pattern: a binding name or `_`.
fn parse_sub_pattern(p: &mut Parser) {
    if p.at(SyntaxKind::IDENT) {
        if p.nth(1) == SyntaxKind::L_PAREN {
            p.error(
                codes::UNEXPECTED_TOKEN,
                "nested constructor patterns are not supported; bind the field and match again",
            );
        }
        let kind = if p.current_text() == "_" {
            SyntaxKind::WILDCARD_PAT
        } else {
            SyntaxKind::BINDING_PAT
        };
        let m = p.open();
        p.advance();
        p.close(m, kind);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected a binding name or `_`");
    }
}
