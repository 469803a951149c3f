//! Parser integration tests.
//!
//! Each test parses a fragment or a whole file and asserts on the typed
//! AST structure and on the collected diagnostics, including the stable
//! catalog codes for the grammar's specific rules.

use mk_common::diag::codes;
use mk_parser::ast::expr::{Expr, LiteralValue, Stmt};
use mk_parser::ast::item::Item;
use mk_parser::{parse, parse_expr};

/// Parse an expression and return the root's single expression child.
fn expr_of(source: &str) -> Expr {
    let parse = parse_expr(source);
    assert!(
        parse.errors().is_empty(),
        "unexpected errors for {source:?}: {:?}",
        parse.errors()
    );
    parse
        .syntax()
        .children()
        .find_map(Expr::cast)
        .expect("expression root")
}

// ── Literals and atoms ─────────────────────────────────────────────────

#[test]
fn literal_int() {
    match expr_of("42") {
        Expr::Literal(lit) => assert_eq!(lit.value(), Some(LiteralValue::Int(42))),
        other => panic!("expected literal, got {other:?}"),
    }
}

#[test]
fn literal_string_unescapes() {
    match expr_of(r#""a\"b""#) {
        Expr::Literal(lit) => assert_eq!(lit.value(), Some(LiteralValue::Str("a\"b".into()))),
        other => panic!("expected literal, got {other:?}"),
    }
}

#[test]
fn literal_unit() {
    match expr_of("()") {
        Expr::Literal(lit) => assert_eq!(lit.value(), Some(LiteralValue::Unit)),
        other => panic!("expected unit literal, got {other:?}"),
    }
}

#[test]
fn literal_bools() {
    match expr_of("true") {
        Expr::Literal(lit) => assert_eq!(lit.value(), Some(LiteralValue::Bool(true))),
        other => panic!("expected literal, got {other:?}"),
    }
}

// ── Precedence ─────────────────────────────────────────────────────────

#[test]
fn mul_binds_tighter_than_add() {
    // a + b * c => a + (b * c)
    let expr = expr_of("a + b * c");
    let Expr::Binary(add) = expr else {
        panic!("expected binary expr")
    };
    assert_eq!(add.op().unwrap().text(), "+");
    let Some(Expr::Binary(mul)) = add.rhs() else {
        panic!("rhs should be the multiplication")
    };
    assert_eq!(mul.op().unwrap().text(), "*");
}

#[test]
fn comparison_looser_than_arithmetic() {
    // a + 1 < b  =>  (a + 1) < b
    let expr = expr_of("a + 1 < b");
    let Expr::Binary(cmp) = expr else {
        panic!("expected binary expr")
    };
    assert_eq!(cmp.op().unwrap().text(), "<");
}

#[test]
fn pipe_is_loosest_and_left_associative() {
    // 1 |> f |> g  =>  (1 |> f) |> g
    let expr = expr_of("1 |> f |> g");
    let Expr::Pipe(outer) = expr else {
        panic!("expected pipe expr")
    };
    assert!(matches!(outer.lhs(), Some(Expr::Pipe(_))));
    assert!(matches!(outer.rhs(), Some(Expr::NameRef(_))));
}

#[test]
fn pipe_binds_looser_than_logical_or() {
    // a || b |> f  =>  (a || b) |> f
    let expr = expr_of("a || b |> f");
    assert!(matches!(expr, Expr::Pipe(_)));
}

#[test]
fn unary_binds_tighter_than_mul() {
    // -a * b => (-a) * b
    let expr = expr_of("-a * b");
    let Expr::Binary(mul) = expr else {
        panic!("expected binary expr")
    };
    assert!(matches!(mul.lhs(), Some(Expr::Unary(_))));
}

#[test]
fn call_binds_tightest() {
    // -f(x) => -(f(x))
    let expr = expr_of("-f(x)");
    let Expr::Unary(neg) = expr else {
        panic!("expected unary expr")
    };
    assert!(matches!(neg.operand(), Some(Expr::Call(_))));
}

#[test]
fn chained_comparison_is_e1005() {
    let parse = parse_expr("a < b < c");
    assert_eq!(parse.errors().len(), 1);
    assert_eq!(parse.errors()[0].code, codes::CHAINED_COMPARISON);
}

#[test]
fn field_access_chains() {
    let expr = expr_of("p.pos.x");
    let Expr::FieldAccess(outer) = expr else {
        panic!("expected field access")
    };
    assert_eq!(outer.field_name().unwrap(), "x");
    let Some(Expr::FieldAccess(inner)) = outer.base() else {
        panic!("base should be a field access")
    };
    assert_eq!(inner.field_name().unwrap(), "pos");
}

// ── Compound expressions ───────────────────────────────────────────────

#[test]
fn if_requires_else() {
    let parse = parse_expr("if x { 1 }");
    assert!(parse
        .errors()
        .iter()
        .any(|e| e.code == codes::IF_MISSING_ELSE));
}

#[test]
fn if_with_else_parses_clean() {
    let expr = expr_of("if x { 1 } else { 2 }");
    let Expr::If(ifx) = expr else {
        panic!("expected if expr")
    };
    assert!(ifx.condition().is_some());
    assert!(ifx.then_block().is_some());
    assert!(ifx.else_branch().is_some());
}

#[test]
fn else_if_chain_nests() {
    let expr = expr_of("if a { 1 } else if b { 2 } else { 3 }");
    let Expr::If(outer) = expr else {
        panic!("expected if expr")
    };
    let body = outer.else_branch().unwrap().body().unwrap();
    assert!(matches!(body, Expr::If(_)));
}

#[test]
fn match_arms_parse() {
    let expr = expr_of("match opt { Some(x) => x, None => 0 }");
    let Expr::Match(m) = expr else {
        panic!("expected match expr")
    };
    let arms = m.arms();
    assert_eq!(arms.len(), 2);
    let pat = arms[0].pattern().unwrap();
    match pat {
        mk_parser::ast::pat::Pattern::Constructor(c) => {
            assert_eq!(c.name().unwrap().text(), "Some");
            assert_eq!(c.sub_patterns().len(), 1);
        }
        other => panic!("expected constructor pattern, got {other:?}"),
    }
}

#[test]
fn wildcard_arm_parses() {
    let expr = expr_of("match x { Some(v) => v, _ => 0 }");
    let Expr::Match(m) = expr else {
        panic!("expected match expr")
    };
    let arms = m.arms();
    assert!(matches!(
        arms[1].pattern(),
        Some(mk_parser::ast::pat::Pattern::Wildcard(_))
    ));
}

#[test]
fn lambda_parses_with_typed_params() {
    let expr = expr_of("fn (x: Int) => x + 1");
    let Expr::Lambda(lambda) = expr else {
        panic!("expected lambda")
    };
    let params: Vec<_> = lambda.param_list().unwrap().params().collect();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name().unwrap().text(), "x");
    assert!(matches!(lambda.body(), Some(Expr::Binary(_))));
}

#[test]
fn named_args_parse_as_record_construction() {
    let expr = expr_of("Point(x: 1, y: 2)");
    let Expr::Call(call) = expr else {
        panic!("expected call")
    };
    let args = call.arg_list().unwrap().args();
    assert_eq!(args.len(), 2);
    assert!(matches!(
        args[0],
        mk_parser::ast::expr::Arg::Named(_)
    ));
}

// ── Blocks ─────────────────────────────────────────────────────────────

#[test]
fn block_tail_expression_is_bare() {
    let src = "fn f() : Int { let x = 1; x + 1 }";
    let parse = parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let file = parse.source_file();
    let Some(Item::Fn(f)) = file.items().next() else {
        panic!("expected fn")
    };
    let body = f.body().unwrap();
    assert_eq!(body.statements().len(), 1);
    assert!(matches!(body.statements()[0], Stmt::Let(_)));
    assert!(body.tail_expr().is_some());
}

#[test]
fn statement_expression_with_semicolon_is_not_tail() {
    let src = "fn f() : Unit { log(1); }";
    let parse = parse(src);
    assert!(parse.errors().is_empty());
    let Some(Item::Fn(f)) = parse.source_file().items().next() else {
        panic!("expected fn")
    };
    let body = f.body().unwrap();
    assert_eq!(body.statements().len(), 1);
    assert!(body.tail_expr().is_none());
}

// ── Declarations ───────────────────────────────────────────────────────

#[test]
fn function_header_round_trips() {
    let src = "pub fn now() : Int uses { time } { 0 }";
    let parse = parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let Some(Item::Fn(f)) = parse.source_file().items().next() else {
        panic!("expected fn")
    };
    assert!(f.is_pub());
    assert_eq!(f.name().unwrap().text(), "now");
    assert_eq!(f.uses_clause().unwrap().effects(), vec!["time"]);
}

#[test]
fn record_type_parses() {
    let src = "type Point { x: Int, y: Int }";
    let parse = parse(src);
    assert!(parse.errors().is_empty());
    let Some(Item::Type(t)) = parse.source_file().items().next() else {
        panic!("expected type")
    };
    assert!(!t.is_union());
    let fields: Vec<_> = t.record_fields().unwrap().fields().collect();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name().unwrap().text(), "x");
}

#[test]
fn union_type_parses() {
    let src = "type Shape<T> { Circle(radius: Int) | Dot }";
    let parse = parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let Some(Item::Type(t)) = parse.source_file().items().next() else {
        panic!("expected type")
    };
    assert!(t.is_union());
    assert_eq!(t.generic_params(), vec!["T"]);
    let variants = t.variants();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].name().unwrap().text(), "Circle");
    assert_eq!(variants[0].fields().len(), 1);
    assert!(variants[1].fields().is_empty());
}

#[test]
fn module_with_imports_parses() {
    let src = "module util.strings { import core.text as t  pub fn id(x: Int) : Int { x } }";
    let parse = parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let Some(Item::Module(m)) = parse.source_file().items().next() else {
        panic!("expected module")
    };
    assert_eq!(m.path().unwrap().text(), "util.strings");
    let items: Vec<_> = m.items().collect();
    assert_eq!(items.len(), 2);
    let Item::Import(imp) = &items[0] else {
        panic!("expected import")
    };
    assert_eq!(imp.binding_name().unwrap(), "t");
}

#[test]
fn language_header_parses() {
    let src = "language v1.0\nfn main() : Int { 0 }";
    let parse = parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let header = parse.source_file().language_header().unwrap();
    assert_eq!(header.version().unwrap(), "1.0");
}

// ── API routes ─────────────────────────────────────────────────────────

#[test]
fn api_route_parses() {
    let src = r#"api GET "/u/:id" (id: String) -> String { id }"#;
    let parse = parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let Some(Item::Api(route)) = parse.source_file().items().next() else {
        panic!("expected api route")
    };
    assert_eq!(route.method().unwrap(), "GET");
    assert_eq!(route.path().unwrap(), "/u/:id");
    assert_eq!(route.placeholders(), vec!["id"]);
    assert_eq!(route.handler_name(), "get_u_id");
}

#[test]
fn bad_method_is_e6001() {
    let src = r#"api FETCH "/x" () -> String { "x" }"#;
    let parse = parse(src);
    assert!(parse.errors().iter().any(|e| e.code == codes::BAD_METHOD));
}

#[test]
fn empty_path_segment_is_e6002() {
    let src = r#"api GET "/a//b" () -> String { "x" }"#;
    let parse = parse(src);
    assert!(parse.errors().iter().any(|e| e.code == codes::BAD_PATH));
}

// ── Error recovery ─────────────────────────────────────────────────────

#[test]
fn recovery_reports_errors_in_both_functions() {
    // The first function is broken; the second has an independent error.
    let src = "fn a() : Int { 1 + } fn b() : Int { let = 2; 0 }";
    let parse = parse(src);
    assert!(parse.errors().len() >= 2, "{:?}", parse.errors());
}

#[test]
fn recovery_still_produces_later_items() {
    let src = "fn broken( { } type Point { x: Int }";
    let parse = parse(src);
    assert!(!parse.errors().is_empty());
    let kinds: Vec<_> = parse.source_file().items().collect();
    // Both the broken fn and the type survive as items.
    assert!(kinds
        .iter()
        .any(|i| matches!(i, Item::Type(_))));
}

#[test]
fn lexer_errors_surface_in_parse_errors() {
    let parse = parse("fn f() : Int { \"oops\n }");
    assert!(parse
        .errors()
        .iter()
        .any(|e| e.code == codes::UNTERMINATED_STRING));
}
