//! Integration tests for tagged unions: constructor application, match
//! typing, pattern bindings, and exhaustiveness.

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

// ── Constructors ───────────────────────────────────────────────────────

#[test]
fn nullary_and_payload_constructors_check() {
    let result = check_source(
        "type Shape { Circle(radius: Int) | Dot }\n\
         fn a() : Shape { Circle(3) }\n\
         fn b() : Shape { Dot }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn constructor_arity_is_checked() {
    let result = check_source(
        "type Shape { Circle(radius: Int) | Dot }\nfn f() : Shape { Circle(1, 2) }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::ARITY_MISMATCH);
}

#[test]
fn generic_constructor_instantiates() {
    let result = check_source(
        "type Box<T> { Full(value: T) | Empty }\n\
         fn f() : Box<Int> { Full(1) }\n\
         fn g() : Box<String> { Full(\"s\") }\n\
         fn h() : Box<Int> { Empty }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn prelude_option_and_result_constructors() {
    let result = check_source(
        "fn a() : Option<Int> { Some(1) }\n\
         fn b() : Option<Int> { None }\n\
         fn c() : Result<Int, String> { Ok(1) }\n\
         fn d() : Result<Int, String> { Err(\"no\") }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn named_args_on_constructor_are_rejected() {
    let result = check_source(
        "type Shape { Circle(radius: Int) | Dot }\nfn f() : Shape { Circle(radius: 1) }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::TYPE_MISMATCH);
}

// ── Match typing ───────────────────────────────────────────────────────

#[test]
fn match_narrows_pattern_bindings() {
    let result = check_source(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x + 1, None => 0 } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn match_arm_types_must_agree() {
    let result = check_source(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x, None => \"zero\" } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::ARM_TYPE_MISMATCH);
}

#[test]
fn non_adt_scrutinee_is_e4002() {
    let result = check_source("fn f(x: Int) : Int { match x { Some(v) => v, _ => 0 } }");
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.code() == codes::NON_ADT_SCRUTINEE),
        "{:?}",
        result.errors
    );
}

#[test]
fn wrong_constructor_for_type_is_reported() {
    let result = check_source(
        "type Shape { Circle(radius: Int) | Dot }\n\
         fn f(s: Shape) : Int { match s { Some(x) => x, _ => 0 } }",
    );
    assert!(
        result
            .errors
            .iter()
            .any(|e| matches!(e, TypeError::NotAConstructorOf { .. })),
        "{:?}",
        result.errors
    );
}

#[test]
fn pattern_binding_shadowing_is_rejected() {
    let result = check_source(
        "fn f(x: Int, o: Option<Int>) : Int { match o { Some(x) => x, None => 0 } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::SHADOWED_NAME);
}

// ── Exhaustiveness ─────────────────────────────────────────────────────

#[test]
fn missing_constructor_is_e4001_naming_it() {
    let result = check_source(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    match &result.errors[0] {
        TypeError::NonExhaustiveMatch { missing, .. } => {
            assert_eq!(missing, &vec!["None".to_string()]);
        }
        other => panic!("expected NonExhaustiveMatch, got {other:?}"),
    }
}

#[test]
fn wildcard_completes_coverage() {
    let result = check_source(
        "type Color { Red | Green | Blue }\n\
         fn f(c: Color) : Int { match c { Red => 0, _ => 1 } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn duplicate_constructor_arm_is_e4003() {
    let result = check_source(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x, Some(y) => y, None => 0 } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::DUPLICATE_ARM);
}

#[test]
fn arm_after_wildcard_is_e4003() {
    let result = check_source(
        "fn f(o: Option<Int>) : Int { match o { _ => 0, Some(x) => x } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(matches!(result.errors[0], TypeError::UnreachableArm { .. }));
}

#[test]
fn redundant_wildcard_is_e4003() {
    let result = check_source(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x, None => 0, _ => 9 } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(matches!(
        result.errors[0],
        TypeError::RedundantWildcard { .. }
    ));
}

#[test]
fn full_coverage_without_wildcard_is_clean() {
    let result = check_source(
        "type Color { Red | Green | Blue }\n\
         fn f(c: Color) : Int { match c { Red => 0, Green => 1, Blue => 2 } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn generic_union_exhaustiveness() {
    let result = check_source(
        "fn f(r: Result<Int, String>) : Int { match r { Ok(v) => v } }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    match &result.errors[0] {
        TypeError::NonExhaustiveMatch { missing, .. } => {
            assert_eq!(missing, &vec!["Err".to_string()]);
        }
        other => panic!("expected NonExhaustiveMatch, got {other:?}"),
    }
}
