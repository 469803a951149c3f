//! Integration tests for the JS emitter, the effect manifest, and the
//! OpenAPI artifact. These assert on the emitted text because the output
//! contract is textual: a fixed prologue, restricted constructs, and
//! deterministic bytes.

use mk_codegen::{emit_module, openapi_document, EmitResult};

fn compile(src: &str) -> EmitResult {
    let parse = mk_parser::parse(src);
    assert!(parse.errors().is_empty(), "parse errors: {:?}", parse.errors());
    let typeck = mk_typeck::check(&parse);
    assert!(typeck.errors.is_empty(), "type errors: {:?}", typeck.errors);
    emit_module(&parse, &typeck)
}

// ── Prologue ───────────────────────────────────────────────────────────

#[test]
fn module_starts_with_use_strict_and_meta() {
    let result = compile("fn main() : String { \"hi\" }");
    assert!(result.js.starts_with("\"use strict\";\n"));
    assert!(result.js.contains("const __meta = { languageVersion: \"1.0\""));
    assert!(result.js.contains("effectsHash:"));
    assert!(result.js.contains("effectsList: []"));
}

#[test]
fn language_header_version_reaches_meta() {
    let result = compile("language v1.0\nfn main() : Int { 0 }");
    assert!(result.js.contains("languageVersion: \"1.0\""));
}

// ── Functions ──────────────────────────────────────────────────────────

#[test]
fn hello_lowering() {
    let result = compile("fn main() : String { \"hi\" }");
    assert!(result.js.contains("function main() {\n  return \"hi\";\n}"));
    assert!(result.manifest.entries.is_empty(), "pure module has no manifest entries");
}

#[test]
fn let_becomes_const() {
    let result = compile("fn f() : Int { let x = 1; x + 1 }");
    assert!(result.js.contains("const x = 1;"));
    assert!(result.js.contains("return (x + 1);"));
}

#[test]
fn unit_function_returns_unit_value() {
    let result = compile("fn f() : Unit { identity(1); }");
    assert!(result.js.contains("identity(1);"));
    assert!(result.js.contains("return { tag: \"Unit\" };"));
}

#[test]
fn reserved_word_identifiers_get_suffixed() {
    let result = compile("fn f(new: Int) : Int { new + 1 }");
    assert!(result.js.contains("function f(new_) {"));
    assert!(result.js.contains("return (new_ + 1);"));
}

// ── Pipes and calls ────────────────────────────────────────────────────

#[test]
fn pipe_lowers_to_direct_call() {
    let result = compile("fn inc(x: Int) : Int { x + 1 }\nfn g() : Int { 1 |> inc }");
    assert!(result.js.contains("return inc(1);"));
}

#[test]
fn pipe_stages_compose_left_to_right() {
    let result = compile(
        "fn inc(x: Int) : Int { x + 1 }\nfn g() : Int { 1 |> inc |> inc }",
    );
    assert!(result.js.contains("return inc(inc(1));"));
}

// ── Effects ────────────────────────────────────────────────────────────

#[test]
fn effectful_function_gets_effects_parameter() {
    let result = compile("pub fn tick() : Int uses { time } { now() }");
    assert!(result.js.contains("function tick(__effects) {"));
    assert!(result.js.contains("return now(__effects);"));
}

#[test]
fn effectful_calls_thread_effects_through_callers() {
    let result = compile(
        "fn tick() : Int uses { time } { now() }\n\
         pub fn relay() : Int uses { time } { tick() }",
    );
    assert!(result.js.contains("return tick(__effects);"));
}

#[test]
fn manifest_lists_exported_effectful_entries() {
    let result = compile(
        "pub fn tick() : Int uses { time } { now() }\n\
         fn hidden() : Int uses { random } { random_int(0, 9) }",
    );
    assert_eq!(result.manifest.entries.len(), 1);
    assert_eq!(result.manifest.entries[0].name, "tick");
    assert_eq!(result.manifest.entries[0].effects, vec!["time"]);
    assert_eq!(result.manifest.effects_list, vec!["time"]);
    assert_eq!(result.manifest.effects_hash.len(), 16);
}

// ── Constructors and records ───────────────────────────────────────────

#[test]
fn constructor_application_is_a_tagged_object() {
    let result = compile("fn f() : Option<Int> { Some(1) }");
    assert!(result.js.contains("return { tag: \"Some\", value: 1 };"));
}

#[test]
fn nullary_constructor_is_a_tagged_object() {
    let result = compile("fn f() : Option<Int> { None }");
    assert!(result.js.contains("return { tag: \"None\" };"));
}

#[test]
fn record_construction_uses_declared_field_order() {
    let result = compile(
        "type Point { x: Int, y: Int }\nfn f() : Point { Point(y: 2, x: 1) }",
    );
    assert!(result.js.contains("return { x: 1, y: 2 };"));
}

#[test]
fn field_access_is_property_access() {
    let result = compile(
        "type Point { x: Int, y: Int }\nfn f(p: Point) : Int { p.x }",
    );
    assert!(result.js.contains("return p.x;"));
}

// ── Control flow ───────────────────────────────────────────────────────

#[test]
fn simple_if_becomes_a_ternary() {
    let result = compile("fn f(b: Bool) : Int { if b { 1 } else { 2 } }");
    assert!(result.js.contains("return (b ? 1 : 2);"));
}

#[test]
fn if_with_statements_becomes_an_iife() {
    let result = compile(
        "fn f(b: Bool) : Int { if b { let x = 1; x + 1 } else { 0 } }",
    );
    assert!(result.js.contains("(function () {"));
    assert!(result.js.contains("const x = 1;"));
}

#[test]
fn match_lowers_to_tag_dispatch() {
    let result = compile(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x, None => 0 } }",
    );
    assert!(result.js.contains("const __subject = o;"));
    assert!(result.js.contains("if (__subject.tag === \"Some\") {"));
    assert!(result.js.contains("const x = __subject.value;"));
    assert!(result.js.contains("} else if (__subject.tag === \"None\") {"));
    // Full coverage without a wildcard keeps the corruption assertion.
    assert!(result.js.contains("__mk_unreachable(\"E7004\")"));
}

#[test]
fn match_wildcard_becomes_plain_else() {
    let result = compile(
        "fn f(o: Option<Int>) : Int { match o { Some(x) => x, _ => 0 } }",
    );
    assert!(result.js.contains("} else {"));
    assert!(!result.js.contains("__mk_unreachable"));
}

#[test]
fn equality_is_strict_for_primitives_structural_otherwise() {
    let result = compile(
        "fn a(x: Int, y: Int) : Bool { x == y }\n\
         fn b(p: Option<Int>, q: Option<Int>) : Bool { p == q }",
    );
    assert!(result.js.contains("return (x === y);"));
    assert!(result.js.contains("return equals(p, q);"));
}

// ── API routes ─────────────────────────────────────────────────────────

#[test]
fn route_registration_shape() {
    let result = compile(
        "api GET \"/u/:id\" (id: String) -> String { \"ok: \" + id }",
    );
    assert!(result
        .js
        .contains("__router.register(\"GET\", \"/u/:id\", function get_u_id(id, __effects) {"));
    assert!(result.js.contains("return (\"ok: \" + id);"));
}

#[test]
fn openapi_document_shape() {
    let src = "api GET \"/u/:id\" (id: String) -> String { \"ok: \" + id }";
    let parse = mk_parser::parse(src);
    let typeck = mk_typeck::check(&parse);
    assert!(typeck.errors.is_empty(), "{:?}", typeck.errors);
    let doc = openapi_document(&parse.source_file(), &typeck.registry);

    assert_eq!(doc["openapi"], "3.0.0");
    let response = &doc["paths"]["/u/:id"]["get"]["responses"]["200"];
    assert_eq!(
        response["content"]["application/json"]["schema"]["type"],
        "string"
    );
}

// ── Output discipline ──────────────────────────────────────────────────

#[test]
fn emission_is_deterministic() {
    let src = "type Shape { Circle(radius: Int) | Dot }\n\
               fn area(s: Shape) : Int { match s { Circle(r) => r * r * 3, Dot => 0 } }\n\
               pub fn tick() : Int uses { time } { now() }\n\
               api GET \"/area\" () -> Int { area(Dot) }";
    let first = compile(src);
    let second = compile(src);
    assert_eq!(first.js, second.js, "emit must be byte-identical across runs");
    assert_eq!(first.manifest.effects_hash, second.manifest.effects_hash);
}

#[test]
fn no_forbidden_construct_in_output() {
    let src = "type Shape { Circle(radius: Int) | Dot }\n\
               fn area(s: Shape) : Int { match s { Circle(r) => r * r * 3, _ => 0 } }\n\
               fn pick(b: Bool) : Int { if b { let x = area(Dot); x } else { 0 } }\n\
               pub fn tick() : Int uses { time } { now() }";
    let result = compile(src);
    for forbidden in [
        "eval(", "with (", "this.", "class ", "throw ", "try ", "null", "undefined", "var ",
        "let ", "for (", "while (",
    ] {
        assert!(
            !result.js.contains(forbidden),
            "forbidden construct {forbidden:?} in output:\n{}",
            result.js
        );
    }
}
