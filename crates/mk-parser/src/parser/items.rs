//! Item/declaration parsers for Manaknight.
//!
//! Parses the version header, modules, function definitions, type
//! definitions (records and tagged unions), effect declarations, imports,
//! and API routes. Handles the `pub` visibility marker.

use mk_common::diag::codes;

use super::expressions::parse_block;
use super::types::parse_type;
use super::{describe, Parser, RECOVERY_SET};
use crate::syntax_kind::SyntaxKind;

/// Token kinds that can start a top-level item.
const TOP_STARTERS: &[SyntaxKind] = &[
    SyntaxKind::MODULE_KW,
    SyntaxKind::API_KW,
    SyntaxKind::PUB_KW,
    SyntaxKind::FN_KW,
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::TYPE_KW,
    SyntaxKind::EFFECT_KW,
    SyntaxKind::IMPORT_KW,
];

/// The HTTP methods an `api` route may use.
const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

// ── Version header ───────────────────────────────────────────────────────

/// Parse the optional `language v1.0` header at the start of a file.
///
/// `language` is contextual: it only has meaning as the very first token,
/// so it is an ordinary identifier everywhere else.
pub(crate) fn parse_optional_language_header(p: &mut Parser) {
    if p.at(SyntaxKind::IDENT) && p.current_text() == "language" {
        let m = p.open();
        p.advance(); // language
        if p.at(SyntaxKind::IDENT) && p.current_text().starts_with('v') {
            p.advance(); // v1
            p.expect(SyntaxKind::DOT);
            p.expect(SyntaxKind::INT_LITERAL);
        } else {
            p.error(codes::UNEXPECTED_TOKEN, "expected a version like `v1.0`");
        }
        p.close(m, SyntaxKind::LANGUAGE_HEADER);
    }
}

// ── Top-level dispatch ───────────────────────────────────────────────────

/// Parse one top-level item: a module, an API route, or a loose declaration.
pub(crate) fn parse_top_item(p: &mut Parser) {
    match p.current() {
        SyntaxKind::MODULE_KW => parse_module_def(p),
        SyntaxKind::API_KW => parse_api_route(p),
        SyntaxKind::PUB_KW
        | SyntaxKind::FN_KW
        | SyntaxKind::FUNCTION_KW
        | SyntaxKind::TYPE_KW
        | SyntaxKind::EFFECT_KW
        | SyntaxKind::IMPORT_KW => parse_decl(p),
        _ => {
            // Not a valid item start: report once, then skip quietly to the
            // next synchronization point.
            let m = p.open();
            p.error(codes::UNEXPECTED_TOKEN, "expected a declaration");
            p.advance();
            while !p.at(SyntaxKind::EOF) && !p.at_any(TOP_STARTERS) {
                p.advance();
            }
            p.close(m, SyntaxKind::ERROR_NODE);
        }
    }
}

// ── Module definition ────────────────────────────────────────────────────

/// Parse a module definition: `module a.b.c { decl* }`
pub(crate) fn parse_module_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // module

    parse_path(p);

    let brace_span = p.current_span();
    if !p.expect(SyntaxKind::L_BRACE) {
        p.recover_until(RECOVERY_SET);
        p.close(m, SyntaxKind::MODULE_DEF);
        return;
    }

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) {
        match p.current() {
            SyntaxKind::API_KW => parse_api_route(p),
            SyntaxKind::PUB_KW
            | SyntaxKind::FN_KW
            | SyntaxKind::FUNCTION_KW
            | SyntaxKind::TYPE_KW
            | SyntaxKind::EFFECT_KW
            | SyntaxKind::IMPORT_KW => parse_decl(p),
            _ => {
                let e = p.open();
                p.error(codes::UNEXPECTED_TOKEN, "expected a declaration");
                p.advance();
                while !p.at(SyntaxKind::EOF)
                    && !p.at(SyntaxKind::R_BRACE)
                    && !p.at_any(TOP_STARTERS)
                {
                    p.advance();
                }
                p.close(e, SyntaxKind::ERROR_NODE);
            }
        }
    }

    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related(
            codes::UNEXPECTED_TOKEN,
            "expected `}` to close module body",
            brace_span,
            "module body started here",
        );
    }

    p.close(m, SyntaxKind::MODULE_DEF);
}

// ── Declarations ─────────────────────────────────────────────────────────

/// Parse a declaration, with an optional leading `pub` marker.
pub(crate) fn parse_decl(p: &mut Parser) {
    // Optional visibility. Remember it so a stray `pub` before a
    // non-declaration still produces a sensible message.
    if p.at(SyntaxKind::PUB_KW) {
        let v = p.open();
        p.advance();
        p.close(v, SyntaxKind::VISIBILITY);
    }

    match p.current() {
        SyntaxKind::FN_KW | SyntaxKind::FUNCTION_KW => parse_fn_def(p),
        SyntaxKind::TYPE_KW => parse_type_def(p),
        SyntaxKind::EFFECT_KW => parse_effect_def(p),
        SyntaxKind::IMPORT_KW => parse_import_decl(p),
        _ => {
            p.error(
                codes::UNEXPECTED_TOKEN,
                "expected `fn`, `type`, `effect`, or `import`",
            );
            p.recover_until(RECOVERY_SET);
        }
    }
}

/// Parse a function definition:
/// `fn name(p: T, q: U) [: R] [uses { e1, e2 }] { body }`
pub(crate) fn parse_fn_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // fn or function

    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected function name");
        p.recover_until(RECOVERY_SET);
        p.close(m, SyntaxKind::FN_DEF);
        return;
    }

    if p.at(SyntaxKind::L_PAREN) {
        parse_param_list(p);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected `(` after function name");
    }

    if p.at(SyntaxKind::COLON) {
        let ret = p.open();
        p.advance(); // :
        parse_type(p);
        p.close(ret, SyntaxKind::RETURN_TYPE);
    }

    if p.at(SyntaxKind::USES_KW) {
        parse_uses_clause(p);
    }

    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected `{` to start function body");
        p.recover_until(RECOVERY_SET);
    }

    p.close(m, SyntaxKind::FN_DEF);
}

/// Parse a parameter list: `(a: T, b: U)`. A trailing comma is rejected.
pub(crate) fn parse_param_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (

    if !p.at(SyntaxKind::R_PAREN) {
        parse_param(p);
        while p.at(SyntaxKind::COMMA) {
            p.advance(); // ,
            if p.at(SyntaxKind::R_PAREN) {
                p.error(codes::UNEXPECTED_TOKEN, "trailing comma is not allowed");
                break;
            }
            parse_param(p);
        }
    }

    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PARAM_LIST);
}

/// Parse a single parameter: `name: Type`.
fn parse_param(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
        p.expect(SyntaxKind::COLON);
        parse_type(p);
    } else {
        p.error(
            codes::UNEXPECTED_TOKEN,
            &format!("expected parameter name, found {}", describe(p.current())),
        );
    }
    p.close(m, SyntaxKind::PARAM);
}

/// Parse a declared effect set: `uses { time, log }`.
pub(crate) fn parse_uses_clause(p: &mut Parser) {
    let m = p.open();
    p.advance(); // uses
    p.expect(SyntaxKind::L_BRACE);
    if p.at(SyntaxKind::IDENT) {
        p.advance();
        while p.eat(SyntaxKind::COMMA) {
            if !p.at(SyntaxKind::IDENT) {
                p.error(codes::UNEXPECTED_TOKEN, "expected effect name");
                break;
            }
            p.advance();
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::USES_CLAUSE);
}

// ── Type definitions ─────────────────────────────────────────────────────

/// Parse a type definition. The body is either a record or a tagged union:
///
/// - `type Point { x: Int, y: Int }`
/// - `type Shape<T> { Circle(radius: Int) | Dot }`
///
/// After `{`, a first identifier followed by `:` means record fields;
/// anything else is read as a variant list.
pub(crate) fn parse_type_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // type

    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected type name");
        p.recover_until(RECOVERY_SET);
        p.close(m, SyntaxKind::TYPE_DEF);
        return;
    }

    if p.at(SyntaxKind::LT) {
        parse_generic_param_list(p);
    }

    let brace_span = p.current_span();
    if !p.expect(SyntaxKind::L_BRACE) {
        p.recover_until(RECOVERY_SET);
        p.close(m, SyntaxKind::TYPE_DEF);
        return;
    }

    if p.at(SyntaxKind::R_BRACE) {
        p.error(codes::UNEXPECTED_TOKEN, "type body cannot be empty");
    } else if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::COLON {
        parse_record_fields(p);
    } else {
        parse_variant(p);
        while p.eat(SyntaxKind::BAR) {
            parse_variant(p);
        }
    }

    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related(
            codes::UNEXPECTED_TOKEN,
            "expected `}` to close type body",
            brace_span,
            "type body started here",
        );
        p.recover_until(RECOVERY_SET);
    }

    p.close(m, SyntaxKind::TYPE_DEF);
}

/// Parse generic parameters: `<T, U>`.
fn parse_generic_param_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // <
    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
        while p.eat(SyntaxKind::COMMA) {
            let name = p.open();
            p.expect(SyntaxKind::IDENT);
            p.close(name, SyntaxKind::NAME);
        }
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected type parameter name");
    }
    p.expect(SyntaxKind::GT);
    p.close(m, SyntaxKind::GENERIC_PARAM_LIST);
}

/// Parse record fields: `x: Int, y: Int`.
fn parse_record_fields(p: &mut Parser) {
    let m = p.open();
    parse_field_def(p);
    while p.eat(SyntaxKind::COMMA) {
        if p.at(SyntaxKind::R_BRACE) {
            p.error(codes::UNEXPECTED_TOKEN, "trailing comma is not allowed");
            break;
        }
        parse_field_def(p);
    }
    p.close(m, SyntaxKind::RECORD_FIELDS);
}

/// Parse a single `name: Type` field.
fn parse_field_def(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
        p.expect(SyntaxKind::COLON);
        parse_type(p);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected field name");
    }
    p.close(m, SyntaxKind::FIELD_DEF);
}

/// Parse one union variant: `Circle(radius: Int)` or a bare `Dot`.
fn parse_variant(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
        if p.at(SyntaxKind::L_PAREN) {
            p.advance(); // (
            parse_field_def(p);
            while p.eat(SyntaxKind::COMMA) {
                parse_field_def(p);
            }
            p.expect(SyntaxKind::R_PAREN);
        }
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected constructor name");
    }
    p.close(m, SyntaxKind::VARIANT_DEF);
}

// ── Effect declarations ──────────────────────────────────────────────────

/// Parse an effect declaration: `effect log`. Operations are host-provided,
/// so the declaration is name-only.
pub(crate) fn parse_effect_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // effect
    if p.at(SyntaxKind::IDENT) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected effect name");
    }
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::EFFECT_DEF);
}

// ── Imports ──────────────────────────────────────────────────────────────

/// Parse an import declaration: `import a.b.c [as alias]`.
pub(crate) fn parse_import_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // import

    parse_path(p);

    if p.eat(SyntaxKind::AS_KW) {
        let name = p.open();
        p.expect(SyntaxKind::IDENT);
        p.close(name, SyntaxKind::NAME);
    }

    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::IMPORT_DECL);
}

/// Parse a dot-separated module path: `a.b.c`.
pub(crate) fn parse_path(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) {
        p.advance();
        while p.at(SyntaxKind::DOT) {
            p.advance(); // .
            p.expect(SyntaxKind::IDENT);
        }
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected module name");
    }
    p.close(m, SyntaxKind::PATH);
}

// ── API routes ───────────────────────────────────────────────────────────

/// Parse an API route:
/// `api GET "/users/:id" (id: String) -> T [uses { ... }] { body }`
pub(crate) fn parse_api_route(p: &mut Parser) {
    let m = p.open();
    p.advance(); // api

    // Method. Any identifier is consumed so the rest of the route still
    // parses; unknown methods get E6001.
    if p.at(SyntaxKind::IDENT) {
        let method = p.current_text().to_string();
        if !HTTP_METHODS.contains(&method.as_str()) {
            p.error(
                codes::BAD_METHOD,
                &format!("`{method}` is not a valid HTTP method"),
            );
        }
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
    } else {
        p.error(codes::BAD_METHOD, "expected an HTTP method");
    }

    // Path literal.
    if p.at(SyntaxKind::STRING_LITERAL) {
        check_route_path(p);
        p.advance();
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected a route path string");
    }

    if p.at(SyntaxKind::L_PAREN) {
        parse_param_list(p);
    }

    if p.at(SyntaxKind::ARROW) {
        let ret = p.open();
        p.advance(); // ->
        parse_type(p);
        p.close(ret, SyntaxKind::RETURN_TYPE);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected `->` and a response type");
    }

    if p.at(SyntaxKind::USES_KW) {
        parse_uses_clause(p);
    }

    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        p.error(codes::UNEXPECTED_TOKEN, "expected `{` to start route body");
        p.recover_until(RECOVERY_SET);
    }

    p.close(m, SyntaxKind::API_ROUTE);
}

/// Validate the current route path literal: slash-prefixed segments, no
/// empty segments (E6002).
fn check_route_path(p: &mut Parser) {
    let span = p.current_span();
    let text = mk_lexer::unescape_string(p.current_text());
    if !text.starts_with('/') {
        p.error_at(codes::BAD_PATH, "route path must start with `/`", span);
        return;
    }
    if text == "/" {
        return;
    }
    for segment in text[1..].split('/') {
        if segment.is_empty() {
            p.error_at(codes::BAD_PATH, "route path contains an empty segment", span);
            return;
        }
    }
}
