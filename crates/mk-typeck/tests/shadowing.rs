//! Integration tests for shadow prohibition: no scope may declare a name
//! that exists in the current or any enclosing scope.

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

fn assert_single_shadow(result: &TypeckResult) {
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::SHADOWED_NAME);
}

#[test]
fn let_rebinding_in_same_scope() {
    let result = check_source("fn f() : Int { let x = 1; let x = 2; x }");
    assert_single_shadow(&result);
}

#[test]
fn let_shadowing_in_nested_block() {
    let result = check_source(
        "fn f() : Int { let x = 1; if true { let x = 2; x } else { x } }",
    );
    assert_single_shadow(&result);
}

#[test]
fn parameter_shadowed_by_let() {
    let result = check_source("fn f(x: Int) : Int { let x = 2; x }");
    assert_single_shadow(&result);
}

#[test]
fn lambda_parameter_may_not_shadow() {
    let result = check_source(
        "fn f(x: Int) : Int { let g = fn (x: Int) => x; g(x) }",
    );
    assert_single_shadow(&result);
}

#[test]
fn function_may_not_shadow_prelude() {
    let result = check_source("fn identity(x: Int) : Int { x }");
    assert_single_shadow(&result);
}

#[test]
fn duplicate_function_names() {
    let result = check_source(
        "fn f() : Int { 1 }\nfn f() : Int { 2 }",
    );
    assert_single_shadow(&result);
}

#[test]
fn duplicate_effect_declaration() {
    let result = check_source("effect db\neffect db");
    assert_single_shadow(&result);
}

#[test]
fn type_name_collision_with_function() {
    let result = check_source(
        "type Thing { One | Two }\nfn Thing() : Int { 1 }",
    );
    assert_single_shadow(&result);
}

#[test]
fn sibling_scopes_may_reuse_names() {
    // The two arms are sibling scopes; no ancestor chain repeats a name.
    let result = check_source(
        "fn f(o: Option<Int>, p: Option<Int>) : Int {\n\
           let a = match o { Some(v) => v, None => 0 };\n\
           let b = match p { Some(v) => v, None => 0 };\n\
           a + b\n\
         }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn distinct_names_are_fine() {
    let result = check_source("fn f() : Int { let x = 1; let y = 2; x + y }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}
