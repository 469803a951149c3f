//! Integration tests for core type inference rules: literals, lets,
//! calls, pipes, if expressions, lambdas, comparisons, and totality.

use mk_common::diag::codes;
use mk_typeck::error::TypeError;
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

fn assert_clean(result: &TypeckResult) {
    assert!(
        result.errors.is_empty(),
        "expected no errors, got: {:?}",
        result.errors
    );
}

fn assert_single_code(result: &TypeckResult, code: mk_common::diag::ErrorCode) {
    assert_eq!(
        result.errors.len(),
        1,
        "expected exactly one error, got: {:?}",
        result.errors
    );
    assert_eq!(result.errors[0].code(), code, "got: {:?}", result.errors[0]);
}

// ── Basics ─────────────────────────────────────────────────────────────

#[test]
fn literal_body_checks() {
    assert_clean(&check_source("fn main() : String { \"hi\" }"));
}

#[test]
fn arithmetic_checks() {
    assert_clean(&check_source("fn f(x: Int) : Int { x * 2 + 1 % 3 - 4 / 5 }"));
}

#[test]
fn string_concat_with_plus() {
    assert_clean(&check_source("fn f(a: String, b: String) : String { a + b }"));
}

#[test]
fn string_plus_int_is_mismatch() {
    let result = check_source("fn f(a: String) : String { a + 1 }");
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

#[test]
fn let_binding_infers_rhs() {
    assert_clean(&check_source("fn f() : Int { let x = 41; x + 1 }"));
}

#[test]
fn let_annotation_must_unify() {
    let result = check_source("fn f() : Int { let x: String = 1; 0 }");
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

#[test]
fn unknown_identifier_is_e2001() {
    let result = check_source("fn f() : Int { y }");
    assert_single_code(&result, codes::UNKNOWN_IDENTIFIER);
}

// ── Calls ──────────────────────────────────────────────────────────────

#[test]
fn call_checks_argument_types() {
    let result = check_source(
        "fn add(a: Int, b: Int) : Int { a + b }\nfn g() : Int { add(1, \"x\") }",
    );
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

#[test]
fn call_arity_is_e2003() {
    let result = check_source(
        "fn add(a: Int, b: Int) : Int { a + b }\nfn g() : Int { add(1) }",
    );
    assert_single_code(&result, codes::ARITY_MISMATCH);
}

#[test]
fn calling_a_non_function_is_an_error() {
    let result = check_source("fn f() : Int { let x = 1; x(2) }");
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

#[test]
fn prelude_helpers_are_polymorphic() {
    assert_clean(&check_source(
        "fn f() : Int { identity(1) }\nfn g() : String { identity(\"s\") }",
    ));
}

// ── Pipes ──────────────────────────────────────────────────────────────

#[test]
fn pipe_types_like_a_call() {
    assert_clean(&check_source(
        "fn inc(x: Int) : Int { x + 1 }\nfn g() : Int { 1 |> inc }",
    ));
}

#[test]
fn pipe_stages_compose_left_to_right() {
    assert_clean(&check_source(
        "fn inc(x: Int) : Int { x + 1 }\nfn show(x: Int) : String { \"n\" }\nfn g() : String { 1 |> inc |> show }",
    ));
}

#[test]
fn pipe_type_mismatch_is_reported() {
    let result = check_source(
        "fn shout(s: String) : String { s }\nfn g() : String { 1 |> shout }",
    );
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

// ── If expressions ─────────────────────────────────────────────────────

#[test]
fn if_condition_must_be_bool() {
    let result = check_source("fn f() : Int { if 1 { 2 } else { 3 } }");
    assert_single_code(&result, codes::CONDITION_NOT_BOOL);
}

#[test]
fn if_arms_must_agree() {
    let result = check_source("fn f() : Int { if true { 1 } else { \"x\" } }");
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

#[test]
fn else_if_chains_check() {
    assert_clean(&check_source(
        "fn f(n: Int) : String { if n < 0 { \"neg\" } else if n == 0 { \"zero\" } else { \"pos\" } }",
    ));
}

// ── Lambdas ────────────────────────────────────────────────────────────

#[test]
fn lambda_is_a_pure_function_value() {
    assert_clean(&check_source(
        "fn apply(f: (Int) -> Int, x: Int) : Int { f(x) }\nfn g() : Int { apply(fn (n: Int) => n * 2, 21) }",
    ));
}

#[test]
fn lambda_body_type_flows_out() {
    let result = check_source(
        "fn apply(f: (Int) -> String, x: Int) : String { f(x) }\nfn g() : String { apply(fn (n: Int) => n + 1, 2) }",
    );
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

// ── Comparisons and equality ───────────────────────────────────────────

#[test]
fn int_and_string_comparisons_check() {
    assert_clean(&check_source(
        "fn f() : Bool { 1 < 2 }\nfn g() : Bool { \"a\" <= \"b\" }",
    ));
}

#[test]
fn bool_comparison_is_rejected() {
    let result = check_source("fn f() : Bool { true < false }");
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

#[test]
fn equality_works_on_options() {
    assert_clean(&check_source("fn f() : Bool { Some(1) == None }"));
}

#[test]
fn equality_on_functions_is_rejected() {
    let result = check_source("fn f() : Bool { identity == identity }");
    assert_single_code(&result, codes::TYPE_MISMATCH);
}

// ── Return types and totality ──────────────────────────────────────────

#[test]
fn return_type_mismatch_is_e2004() {
    let result = check_source("fn f() : String { 1 }");
    assert_single_code(&result, codes::RETURN_TYPE_MISMATCH);
}

#[test]
fn missing_tail_value_is_e2005() {
    let result = check_source("fn f() : Int { let x = 1; }");
    assert_single_code(&result, codes::NON_TOTAL_FUNCTION);
    assert!(matches!(
        result.errors[0],
        TypeError::NonTotalFunction { .. }
    ));
}

#[test]
fn unit_function_without_tail_is_fine() {
    assert_clean(&check_source("fn f() : Unit { identity(1); }"));
}

#[test]
fn omitted_return_type_means_unit() {
    assert_clean(&check_source("fn f() { identity(1); }"));
}

#[test]
fn if_is_total_when_both_arms_are() {
    assert_clean(&check_source(
        "fn f(b: Bool) : Int { if b { 1 } else { 2 } }",
    ));
}

// ── Side tables ────────────────────────────────────────────────────────

#[test]
fn every_checked_expression_has_a_type() {
    let src = "fn f(x: Int) : Int { let y = x + 1; y * 2 }";
    let parse = mk_parser::parse(src);
    let result = mk_typeck::check(&parse);
    assert!(result.ok());
    // The tail expression `y * 2` must carry Int.
    let tail_ty = result
        .types
        .values()
        .any(|t| t.to_string() == "Int");
    assert!(tail_ty);
    assert!(!result.types.is_empty());
}
