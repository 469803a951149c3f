//! Integration tests for record types: named construction, field access,
//! generics, and module exports.

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
fn named_construction_and_field_access() {
    let result = check_source(
        "type Point { x: Int, y: Int }\n\
         fn f() : Int { let p = Point(x: 1, y: 2); p.x + p.y }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn positional_record_args_are_rejected() {
    let result = check_source(
        "type Point { x: Int, y: Int }\nfn f() : Point { Point(1, 2) }",
    );
    assert!(
        result
            .errors
            .iter()
            .all(|e| e.code() == codes::TYPE_MISMATCH),
        "{:?}",
        result.errors
    );
    assert!(!result.errors.is_empty());
}

#[test]
fn missing_field_is_reported() {
    let result = check_source(
        "type Point { x: Int, y: Int }\nfn f() : Point { Point(x: 1) }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::TYPE_MISMATCH);
}

#[test]
fn unknown_field_is_reported() {
    let result = check_source(
        "type Point { x: Int, y: Int }\nfn f() : Point { Point(x: 1, y: 2, z: 3) }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::TYPE_MISMATCH);
}

#[test]
fn field_type_must_unify() {
    let result = check_source(
        "type Point { x: Int, y: Int }\nfn f() : Point { Point(x: 1, y: \"two\") }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::TYPE_MISMATCH);
}

#[test]
fn no_such_field_on_access() {
    let result = check_source(
        "type Point { x: Int, y: Int }\n\
         fn f() : Int { let p = Point(x: 1, y: 2); p.z }",
    );
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::TYPE_MISMATCH);
}

#[test]
fn generic_record_instantiates_per_use() {
    let result = check_source(
        "type Pair<A, B> { first: A, second: B }\n\
         fn f() : Int { let p = Pair(first: 1, second: \"s\"); p.first }\n\
         fn g() : String { let p = Pair(first: 1, second: \"s\"); p.second }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn records_nest_inside_unions() {
    let result = check_source(
        "type Point { x: Int, y: Int }\n\
         type Located { At(pos: Point) | Nowhere }\n\
         fn f(l: Located) : Int { match l { At(p) => p.x, Nowhere => 0 } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn exports_carry_pub_functions_and_types() {
    let src = "module geo.shapes {\n\
           pub type Point { x: Int, y: Int }\n\
           pub fn origin() : Point { Point(x: 0, y: 0) }\n\
           fn hidden() : Int { 1 }\n\
         }";
    let parse = mk_parser::parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let result = mk_typeck::check(&parse);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let (path, exports) = result
        .module_exports
        .iter()
        .find(|(p, _)| p.is_some())
        .expect("module block exports");
    assert_eq!(path.as_deref(), Some("geo.shapes"));
    assert!(exports.functions.contains_key("origin"));
    assert!(!exports.functions.contains_key("hidden"));
    assert!(exports.types.contains_key("Point"));
}

#[test]
fn imported_symbols_resolve_through_the_alias() {
    use mk_typeck::{ImportContext, ModuleExports};
    use mk_typeck::ty::{Scheme, Ty};

    let mut imports = ImportContext::empty();
    let mut exports = ModuleExports {
        module_name: "util.math".into(),
        ..Default::default()
    };
    exports.functions.insert(
        "double".into(),
        Scheme::mono(Ty::fun(vec![Ty::int()], Ty::int())),
    );
    imports.modules.insert("util.math".into(), exports);

    let src = "import util.math as m\nfn f() : Int { m.double(21) }";
    let parse = mk_parser::parse(src);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    let result = mk_typeck::check_with_imports(&parse, &imports);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn importing_a_missing_symbol_is_e5003() {
    use mk_typeck::{ImportContext, ModuleExports};

    let mut imports = ImportContext::empty();
    imports.modules.insert(
        "util.math".into(),
        ModuleExports {
            module_name: "util.math".into(),
            ..Default::default()
        },
    );

    let src = "import util.math as m\nfn f() : Int { m.secret(1) }";
    let parse = mk_parser::parse(src);
    let result = mk_typeck::check_with_imports(&parse, &imports);
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code(), codes::NOT_EXPORTED);
}
