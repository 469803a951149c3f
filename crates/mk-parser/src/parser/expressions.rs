//! Pratt expression parser for Manaknight.
//!
//! Implements operator precedence parsing using binding power tables.
//! Handles all expression forms: literals, identifiers, unary/binary
//! operators, calls, field access, pipe, lambdas, if and match
//! expressions, grouping, and blocks with statements.

use mk_common::diag::codes;

use super::patterns::parse_pattern;
use super::types::parse_type;
use super::{describe, MarkClosed, Parser, RECOVERY_SET};
use crate::syntax_kind::SyntaxKind;

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for infix operators.
///
/// Left < right means left-associative. Comparisons get an ordinary pair
/// here; their non-associativity is enforced separately by the chain check
/// in `expr_bp`.
fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    match op {
        // Pipe: lowest expression precedence, left-associative
        SyntaxKind::PIPE => Some((1, 2)),

        // Logical OR
        SyntaxKind::PIPE_PIPE => Some((3, 4)),

        // Logical AND
        SyntaxKind::AMP_AMP => Some((5, 6)),

        // Equality
        SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ => Some((7, 8)),

        // Comparison (non-associative)
        SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ => Some((9, 10)),

        // Additive
        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((11, 12)),

        // Multiplicative
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => Some((13, 14)),

        _ => None,
    }
}

/// Whether a kind is a comparison operator (for the chain check).
fn is_comparison(op: SyntaxKind) -> bool {
    matches!(
        op,
        SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ
    )
}

/// Returns ((), right_bp) for prefix operators: unary `-` and `!`.
fn prefix_binding_power(op: SyntaxKind) -> Option<((), u8)> {
    match op {
        SyntaxKind::MINUS | SyntaxKind::BANG => Some(((), 17)),
        _ => None,
    }
}

/// Postfix operations (call, field access) bind tighter than everything.
const POSTFIX_BP: u8 = 19;

// ── Expression Entry Point ─────────────────────────────────────────────

/// Parse an expression at the default (lowest) binding power.
pub(crate) fn expr(p: &mut Parser) -> Option<MarkClosed> {
    expr_bp(p, 0)
}

/// Parse an expression with the given minimum binding power.
///
/// This is the core Pratt parsing loop. It first parses an atom or prefix
/// expression (the LHS), then loops over postfix and infix operators,
/// consuming them as long as their binding power exceeds `min_bp`.
fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = lhs(p)?;
    let mut lhs_was_comparison = false;

    loop {
        let current = p.current();

        // ── Postfix: function call ──
        if current == SyntaxKind::L_PAREN && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            parse_arg_list(p);
            lhs = p.close(m, SyntaxKind::CALL_EXPR);
            continue;
        }

        // ── Postfix: field access / qualified reference ──
        if current == SyntaxKind::DOT && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // .
            p.expect(SyntaxKind::IDENT);
            lhs = p.close(m, SyntaxKind::FIELD_ACCESS);
            continue;
        }

        // ── Infix operators ──
        if let Some((l_bp, r_bp)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }

            // Comparisons do not associate: `a < b < c` is a parse error,
            // not a Bool-vs-Int type error further downstream.
            if is_comparison(current) && lhs_was_comparison {
                p.error(
                    codes::CHAINED_COMPARISON,
                    "comparison operators cannot be chained",
                );
            }
            lhs_was_comparison = is_comparison(current);

            let m = p.open_before(lhs);
            p.advance(); // operator
            expr_bp(p, r_bp);

            let kind = if current == SyntaxKind::PIPE {
                SyntaxKind::PIPE_EXPR
            } else {
                SyntaxKind::BINARY_EXPR
            };
            lhs = p.close(m, kind);
            continue;
        }

        break;
    }

    Some(lhs)
}

// ── Atom / Prefix Parsing (LHS) ───────────────────────────────────────

/// Parse the left-hand side of an expression: an atom or prefix form.
fn lhs(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        // Literals
        SyntaxKind::INT_LITERAL
        | SyntaxKind::STRING_LITERAL
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }

        // Unit literal `()` or parenthesized expression
        SyntaxKind::L_PAREN => {
            if p.nth(1) == SyntaxKind::R_PAREN {
                let m = p.open();
                p.advance(); // (
                p.advance(); // )
                Some(p.close(m, SyntaxKind::LITERAL))
            } else {
                let m = p.open();
                p.advance(); // (
                expr(p);
                p.expect(SyntaxKind::R_PAREN);
                Some(p.close(m, SyntaxKind::PAREN_EXPR))
            }
        }

        // Identifier reference
        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF))
        }

        // Prefix operators
        kind @ (SyntaxKind::MINUS | SyntaxKind::BANG) => {
            let ((), r_bp) = prefix_binding_power(kind)
                .unwrap_or(((), 17));
            let m = p.open();
            p.advance();
            expr_bp(p, r_bp);
            Some(p.close(m, SyntaxKind::UNARY_EXPR))
        }

        // Lambda: `fn (x: Int) => expr` -- effects are forbidden on lambdas,
        // so there is no `uses` clause to parse here.
        SyntaxKind::FN_KW | SyntaxKind::FUNCTION_KW => {
            let m = p.open();
            p.advance(); // fn
            if p.at(SyntaxKind::L_PAREN) {
                super::items::parse_param_list(p);
            } else {
                p.error(codes::UNEXPECTED_TOKEN, "expected `(` after `fn`");
            }
            p.expect(SyntaxKind::FAT_ARROW);
            expr(p);
            Some(p.close(m, SyntaxKind::LAMBDA_EXPR))
        }

        SyntaxKind::IF_KW => Some(parse_if_expr(p)),
        SyntaxKind::MATCH_KW => Some(parse_match_expr(p)),

        _ => {
            p.error(
                codes::UNEXPECTED_TOKEN,
                &format!("expected expression, found {}", describe(p.current())),
            );
            None
        }
    }
}

/// Parse a call argument list: `(a, b)` or named `(x: 1, y: 2)`.
///
/// Named arguments (record construction) are recognized by the `IDENT :`
/// prefix; positional and named forms may not mix -- the type checker
/// rejects mixtures when it matches arguments against the callee.
pub(crate) fn parse_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (

    if !p.at(SyntaxKind::R_PAREN) {
        parse_arg(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_PAREN) {
                p.error(codes::UNEXPECTED_TOKEN, "trailing comma is not allowed");
                break;
            }
            parse_arg(p);
        }
    }

    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::ARG_LIST);
}

/// Parse one argument: `expr` or `name: expr`.
fn parse_arg(p: &mut Parser) {
    if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::COLON {
        let m = p.open();
        let name = p.open();
        p.advance(); // field name
        p.close(name, SyntaxKind::NAME);
        p.advance(); // :
        expr(p);
        p.close(m, SyntaxKind::NAMED_ARG);
    } else {
        expr(p);
    }
}

// ── If Expressions ─────────────────────────────────────────────────────

/// Parse an if expression: `if cond { ... } else { ... }`.
///
/// `else` is mandatory; `else if` chains nest as if expressions inside the
/// else branch. A missing `else` is E1006.
fn parse_if_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let if_span = p.current_span();
    p.advance(); // if

    expr(p);

    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected `{` after if condition");
        p.recover_until(RECOVERY_SET);
    }

    if p.at(SyntaxKind::ELSE_KW) {
        let e = p.open();
        p.advance(); // else
        if p.at(SyntaxKind::IF_KW) {
            parse_if_expr(p);
        } else if p.at(SyntaxKind::L_BRACE) {
            parse_block(p);
        } else {
            p.error(codes::UNEXPECTED_TOKEN, "expected `{` or `if` after `else`");
        }
        p.close(e, SyntaxKind::ELSE_BRANCH);
    } else {
        p.error_at(
            codes::IF_MISSING_ELSE,
            "`if` requires an `else` branch",
            if_span,
        );
    }

    p.close(m, SyntaxKind::IF_EXPR)
}

// ── Match Expressions ──────────────────────────────────────────────────

/// Parse a match expression: `match scrutinee { Pat => body, ... }`.
fn parse_match_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // match

    expr(p);

    let brace_span = p.current_span();
    if !p.expect(SyntaxKind::L_BRACE) {
        p.recover_until(RECOVERY_SET);
        return p.close(m, SyntaxKind::MATCH_EXPR);
    }

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) {
        parse_match_arm(p);
        // Arms are comma-separated; the comma after the last arm is
        // optional so `}` directly after a body is fine.
        if !p.eat(SyntaxKind::COMMA) && !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) {
            p.error(codes::UNEXPECTED_TOKEN, "expected `,` between match arms");
            p.recover_until(&[SyntaxKind::R_BRACE, SyntaxKind::COMMA]);
            p.eat(SyntaxKind::COMMA);
        }
    }

    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related(
            codes::UNEXPECTED_TOKEN,
            "expected `}` to close match",
            brace_span,
            "match body started here",
        );
    }

    p.close(m, SyntaxKind::MATCH_EXPR)
}

/// Parse a single match arm: `Pattern => expr` or `Pattern => { ... }`.
fn parse_match_arm(p: &mut Parser) {
    let m = p.open();
    parse_pattern(p);
    p.expect(SyntaxKind::FAT_ARROW);
    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        expr(p);
    }
    p.close(m, SyntaxKind::MATCH_ARM);
}

// ── Blocks and Statements ──────────────────────────────────────────────

/// Parse a block: `{ stmt* [tail-expr] }`.
///
/// The final expression, when not terminated by `;`, is the block's value
/// and is left as a bare child node; every other statement is wrapped in
/// `LET_STMT` or `EXPR_STMT`.
pub(crate) fn parse_block(p: &mut Parser) {
    let m = p.open();
    let brace_span = p.current_span();
    p.advance(); // {

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) {
        if p.at(SyntaxKind::SEMICOLON) {
            p.advance(); // stray separator
            continue;
        }
        if p.at(SyntaxKind::LET_KW) {
            parse_let_stmt(p);
            continue;
        }

        match expr(p) {
            Some(closed) => {
                if p.at(SyntaxKind::SEMICOLON) {
                    let s = p.open_before(closed);
                    p.advance(); // ;
                    p.close(s, SyntaxKind::EXPR_STMT);
                } else if !p.at(SyntaxKind::R_BRACE) {
                    // Statement position without a separator.
                    let s = p.open_before(closed);
                    p.close(s, SyntaxKind::EXPR_STMT);
                }
                // At `}` the expression stays bare: it is the tail value.
            }
            None => {
                p.recover_until(&[
                    SyntaxKind::R_BRACE,
                    SyntaxKind::SEMICOLON,
                    SyntaxKind::LET_KW,
                ]);
                p.eat(SyntaxKind::SEMICOLON);
            }
        }
    }

    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related(
            codes::UNEXPECTED_TOKEN,
            "expected `}` to close block",
            brace_span,
            "block started here",
        );
    }

    p.close(m, SyntaxKind::BLOCK);
}

/// Parse a let binding: `let x [: T] = expr [;]`.
fn parse_let_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // let

    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected a name after `let`");
    }

    if p.at(SyntaxKind::COLON) {
        let ret = p.open();
        p.advance(); // :
        parse_type(p);
        p.close(ret, SyntaxKind::RETURN_TYPE);
    }

    if p.expect(SyntaxKind::EQ) {
        expr(p);
    } else {
        p.recover_until(&[
            SyntaxKind::R_BRACE,
            SyntaxKind::SEMICOLON,
            SyntaxKind::LET_KW,
        ]);
    }

    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::LET_STMT);
}
