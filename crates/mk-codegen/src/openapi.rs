//! OpenAPI artifact emission.
//!
//! Builds the `openapi: "3.0.0"` document from the file's route
//! declarations: one path item per route, with a 200 response whose JSON
//! schema is derived from the route's declared return type. `serde_json`'s
//! map keeps keys sorted, so the document is byte-stable across runs.

use serde_json::{json, Map, Value};

use mk_parser::ast::item::{ApiRoute, Item, SourceFile};
use mk_parser::ast::ty::TypeRef;
use mk_typeck::registry::{TypeDefKind, TypeRegistry};

use crate::emit::flatten_items;

/// Build the OpenAPI document for a checked file.
pub fn openapi_document(file: &SourceFile, registry: &TypeRegistry) -> Value {
    let mut paths = Map::new();

    for item in flatten_items(file) {
        let Item::Api(route) = item else { continue };
        let Some(path) = route.path() else { continue };
        let Some(method) = route.method() else { continue };

        let entry = paths
            .entry(path)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = entry {
            methods.insert(method.to_lowercase(), path_item(&route, registry));
        }
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Manaknight API",
            "version": "1.0"
        },
        "paths": Value::Object(paths)
    })
}

/// One method entry: parameters and the fixed 200 response.
fn path_item(route: &ApiRoute, registry: &TypeRegistry) -> Value {
    let mut parameters = Vec::new();
    if let Some(params) = route.param_list() {
        for param in params.params() {
            let Some(name) = param.name() else { continue };
            let schema = param
                .ty()
                .map(|t| type_ref_schema(&t, registry))
                .unwrap_or_else(|| json!({ "type": "string" }));
            parameters.push(json!({
                "name": name.text(),
                "in": "path",
                "required": true,
                "schema": schema
            }));
        }
    }

    let response_schema = route
        .return_type()
        .and_then(|r| r.ty())
        .map(|t| type_ref_schema(&t, registry))
        .unwrap_or_else(unit_schema);

    json!({
        "parameters": parameters,
        "responses": {
            "200": {
                "description": "OK",
                "content": {
                    "application/json": {
                        "schema": response_schema
                    }
                }
            }
        }
    })
}

/// Map a syntactic type reference to a JSON schema.
fn type_ref_schema(type_ref: &TypeRef, registry: &TypeRegistry) -> Value {
    match type_ref {
        TypeRef::Path(path) => named_schema(&path.text(), &[], registry),
        TypeRef::Generic(generic) => {
            let args = generic.args();
            named_schema(&generic.name(), &args, registry)
        }
        // Function types never cross the API boundary; the checker has
        // already rejected them as route types.
        TypeRef::Fn(_) => json!({}),
    }
}

fn named_schema(name: &str, args: &[TypeRef], registry: &TypeRegistry) -> Value {
    match name {
        "Int" => json!({ "type": "integer", "format": "int64" }),
        "Bool" => json!({ "type": "boolean" }),
        "String" => json!({ "type": "string" }),
        "Unit" => unit_schema(),
        "List" => {
            let items = args
                .first()
                .map(|a| type_ref_schema(a, registry))
                .unwrap_or_else(|| json!({}));
            json!({ "type": "array", "items": items })
        }
        "Map" => {
            let values = args
                .get(1)
                .map(|a| type_ref_schema(a, registry))
                .unwrap_or_else(|| json!({}));
            json!({ "type": "object", "additionalProperties": values })
        }
        "Option" => {
            let mut inner = args
                .first()
                .map(|a| type_ref_schema(a, registry))
                .unwrap_or_else(|| json!({}));
            if let Value::Object(obj) = &mut inner {
                obj.insert("nullable".into(), Value::Bool(true));
            }
            inner
        }
        other => user_type_schema(other, registry),
    }
}

/// Schema for a user-declared record or union.
fn user_type_schema(name: &str, registry: &TypeRegistry) -> Value {
    match registry.lookup(name).map(|d| &d.kind) {
        Some(TypeDefKind::Record { fields }) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (field_name, field_ty) in fields {
                properties.insert(field_name.clone(), ty_schema_shallow(field_ty, registry));
                required.push(Value::String(field_name.clone()));
            }
            json!({
                "type": "object",
                "properties": Value::Object(properties),
                "required": required
            })
        }
        Some(TypeDefKind::Union { variants }) => {
            let cases: Vec<Value> = variants
                .iter()
                .map(|variant| {
                    let mut properties = Map::new();
                    properties.insert(
                        "tag".into(),
                        json!({ "type": "string", "enum": [variant.name.clone()] }),
                    );
                    let mut required = vec![Value::String("tag".into())];
                    for (field_name, field_ty) in &variant.fields {
                        properties
                            .insert(field_name.clone(), ty_schema_shallow(field_ty, registry));
                        required.push(Value::String(field_name.clone()));
                    }
                    json!({
                        "type": "object",
                        "properties": Value::Object(properties),
                        "required": required
                    })
                })
                .collect();
            json!({ "oneOf": cases })
        }
        _ => json!({}),
    }
}

/// Schema for a registry-resolved type, primitives and named types only.
fn ty_schema_shallow(ty: &mk_typeck::ty::Ty, registry: &TypeRegistry) -> Value {
    match ty.head_name() {
        Some("Int") => json!({ "type": "integer", "format": "int64" }),
        Some("Bool") => json!({ "type": "boolean" }),
        Some("String") => json!({ "type": "string" }),
        Some("Unit") => unit_schema(),
        Some(other) => user_type_schema(other, registry),
        None => json!({}),
    }
}

fn unit_schema() -> Value {
    json!({ "type": "object" })
}
