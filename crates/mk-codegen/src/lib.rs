//! Manaknight code generation: lowering a checked file to the restricted
//! JavaScript subset, plus the effect manifest and the OpenAPI artifact.
//!
//! Emission is deterministic: the same checked file produces a
//! byte-identical JS string, manifest, and OpenAPI document on every run
//! and platform. No file paths, timestamps, or host identifiers appear in
//! any artifact. Emission is only meaningful for a file that checked
//! without errors; the driver gates on that.

mod emit;
pub mod manifest;
pub mod openapi;

use mk_parser::ast::item::Item;
use mk_parser::Parse;
use mk_typeck::TypeckResult;

pub use manifest::{EffectManifest, ManifestEntry};
pub use openapi::openapi_document;

/// The current language version, stamped into `__meta` when the source
/// carries no `language` header.
pub const LANGUAGE_VERSION: &str = "1.0";
/// The stdlib version the emitted code was built against.
pub const STDLIB_VERSION: &str = "1.0";

/// Everything emitted for one input file.
pub struct EmitResult {
    /// The lowered JavaScript module.
    pub js: String,
    /// The effect manifest; `entries` is empty for a fully pure module.
    pub manifest: EffectManifest,
}

/// Lower a checked file to JavaScript and its effect manifest.
pub fn emit_module(parse: &Parse, typeck: &TypeckResult) -> EmitResult {
    let file = parse.source_file();

    let language_version = file
        .language_header()
        .and_then(|h| h.version())
        .unwrap_or_else(|| LANGUAGE_VERSION.to_string());

    // Manifest entries: exported effectful functions and effectful routes,
    // in source order.
    let mut entries = Vec::new();
    for item in emit::flatten_items(&file) {
        match item {
            Item::Fn(def) => {
                let effects: Vec<String> = def
                    .uses_clause()
                    .map(|c| {
                        let mut effects = c.effects();
                        effects.sort();
                        effects.dedup();
                        effects
                    })
                    .unwrap_or_default();
                if def.is_pub() && !effects.is_empty() {
                    if let Some(name) = def.name() {
                        entries.push(ManifestEntry {
                            name: name.text(),
                            kind: "function".to_string(),
                            effects,
                        });
                    }
                }
            }
            Item::Api(route) => {
                let effects: Vec<String> = route
                    .uses_clause()
                    .map(|c| {
                        let mut effects = c.effects();
                        effects.sort();
                        effects.dedup();
                        effects
                    })
                    .unwrap_or_default();
                if !effects.is_empty() {
                    entries.push(ManifestEntry {
                        name: route.handler_name(),
                        kind: "route".to_string(),
                        effects,
                    });
                }
            }
            _ => {}
        }
    }

    let manifest = EffectManifest::new(language_version.clone(), STDLIB_VERSION, entries);

    let js = emit::JsEmitter::new(typeck).emit_file(
        &file,
        &language_version,
        STDLIB_VERSION,
        &manifest.effects_hash,
        &manifest.effects_list,
    );

    EmitResult { js, manifest }
}
