//! Integration tests for the effect analyzer: capability declaration,
//! leakage into pure functions, lambda purity, and unknown effects.

use mk_common::diag::codes;
use mk_typeck::TypeckResult;

fn check_source(src: &str) -> TypeckResult {
    let parse = mk_parser::parse(src);
    assert!(
        parse.errors().is_empty(),
        "parse errors in test input: {:?}",
        parse.errors()
    );
    mk_typeck::check(&parse)
}

#[test]
fn declared_effects_permit_effectful_calls() {
    let result = check_source("fn stamp() : Int uses { time } { now() }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn effect_leak_into_pure_is_exactly_e3002() {
    // The call to `now()` is the one and only error.
    let result = check_source("fn stale() : Int { now() }");
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::EFFECT_IN_PURE);
}

#[test]
fn missing_effect_is_e3001_per_effect() {
    let result = check_source(
        "fn both() : Int uses { time, random } { now() + random_int(0, 9) }\n\
         fn partial() : Int uses { time } { both() }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::UNDECLARED_EFFECT);
}

#[test]
fn spurious_declared_effects_are_allowed() {
    let result = check_source("fn cautious() : Int uses { time, log } { now() }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn effects_propagate_through_callers() {
    let result = check_source(
        "fn stamp() : Int uses { time } { now() }\n\
         fn relay() : Int uses { time } { stamp() }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn user_declared_effects_work() {
    let result = check_source(
        "effect db\n\
         fn query(sql: String) : String uses { db } { sql }\n\
         fn run() : String uses { db } { query(\"select 1\") }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn unknown_effect_in_uses_is_e3005() {
    let result = check_source("fn f() : Int uses { teleport } { 1 }");
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::UNKNOWN_EFFECT);
}

#[test]
fn lambda_bodies_must_be_pure() {
    let result = check_source(
        "fn f() : Int uses { time } { let g = fn (x: Int) => now() + x; g(1) }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::EFFECT_IN_LAMBDA);
}

#[test]
fn pure_lambdas_are_fine() {
    let result = check_source("fn f() : Int { let g = fn (x: Int) => x + 1; g(1) }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn effects_union_across_branches() {
    let result = check_source(
        "fn f(b: Bool) : Int uses { time, random } { if b { now() } else { random_int(0, 9) } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn pipe_through_effectful_function_needs_declaration() {
    let result = check_source(
        "fn delay(x: Int) : Int uses { time } { x + now() }\n\
         fn g(x: Int) : Int { x |> delay }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::EFFECT_IN_PURE);
}

#[test]
fn effect_side_table_is_populated() {
    let src = "fn stamp() : Int uses { time } { now() }";
    let parse = mk_parser::parse(src);
    let result = mk_typeck::check(&parse);
    assert!(result.ok());
    // Some expression (the call) carries the `time` effect.
    assert!(result
        .effects
        .values()
        .any(|set| set.contains("time")));
}

#[test]
fn route_effects_are_checked_like_functions() {
    let result = check_source(
        "api GET \"/ts\" () -> Int uses { time } { now() }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let result = check_source("api GET \"/ts\" () -> Int { now() }");
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::EFFECT_IN_PURE);
}
