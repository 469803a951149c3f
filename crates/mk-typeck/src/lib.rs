//! Manaknight semantic analysis: type checking, effect analysis, and
//! exhaustiveness checking.
//!
//! This crate consumes the parser's CST/AST and produces side tables --
//! the tree is never mutated. Every expression gets a resolved type and an
//! inferred effect set, keyed by the node's text range, and every semantic
//! rule failure becomes a [`TypeError`] with a stable catalog code.
//!
//! # Architecture
//!
//! - [`ty`]: core type representation (Ty, TyCon, TyVar, EffectSet, Scheme)
//! - [`unify`]: unification engine with occurs check and instantiation
//! - [`scope`]: scope stack with shadow prohibition
//! - [`registry`]: record/union definitions and constructor ownership
//! - [`builtins`]: prelude installation
//! - [`infer`]: the bottom-up type checker
//! - [`effects`]: the effect analyzer
//! - [`exhaustiveness`]: constructor-coverage checking for `match`
//! - [`error`]: error types with spans and stable catalog codes
//!
//! Rendering is the driver's concern: every error exposes its span, code,
//! and message, and the CLI turns those into one-line or labeled reports.

pub mod builtins;
mod effects;
pub mod error;
mod exhaustiveness;
mod infer;
pub mod registry;
pub mod scope;
pub mod ty;
pub mod unify;

use std::collections::BTreeSet;

use rowan::TextRange;
use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::registry::{TypeDefInfo, TypeRegistry};
use crate::ty::{EffectSet, Scheme, Ty};

// ── Cross-module types ──────────────────────────────────────────────────

/// Context built by the driver from already-checked dependency modules.
/// Pre-seeds the checker before inference begins.
#[derive(Debug, Default)]
pub struct ImportContext {
    /// Full module path -> that module's exports.
    pub modules: FxHashMap<String, ModuleExports>,
}

impl ImportContext {
    /// An empty context, for single-file checking.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The exported surface of a single module.
#[derive(Debug, Default, Clone)]
pub struct ModuleExports {
    /// The full module path, e.g. `"util.strings"`.
    pub module_name: String,
    /// Exported function schemes, keyed by unqualified name.
    pub functions: FxHashMap<String, Scheme>,
    /// Constructors of exported union types.
    pub constructors: FxHashMap<String, Scheme>,
    /// Exported type definitions.
    pub types: FxHashMap<String, TypeDefInfo>,
    /// Effects declared by the module (effects are program-global).
    pub effects: BTreeSet<String>,
}

// ── Result ──────────────────────────────────────────────────────────────

/// The result of checking one compilation unit.
pub struct TypeckResult {
    /// Resolved type of every expression, keyed by text range.
    pub types: FxHashMap<TextRange, Ty>,
    /// Inferred effect set of every expression, keyed by text range.
    pub effects: FxHashMap<TextRange, EffectSet>,
    /// All semantic errors, in discovery order.
    pub errors: Vec<TypeError>,
    /// Every type definition visible to this unit.
    pub registry: TypeRegistry,
    /// Every effect name declared by the prelude, dependencies, or this
    /// unit.
    pub known_effects: BTreeSet<String>,
    /// Exports per module group: `None` keys the file's loose
    /// declarations, `Some(path)` each `module path { .. }` block.
    pub module_exports: Vec<(Option<String>, ModuleExports)>,
    /// References resolved through import bindings (`alias.name`), keyed
    /// by the reference's text range. Codegen uses this to distinguish
    /// module-qualified calls from record field access.
    pub qualified_refs: FxHashMap<TextRange, (String, String)>,
}

impl TypeckResult {
    /// Whether checking found no errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Type-check a parsed file with no dependencies.
pub fn check(parse: &mk_parser::Parse) -> TypeckResult {
    let imports = ImportContext::empty();
    infer::check_file(parse, &imports)
}

/// Type-check a parsed file against already-checked dependencies.
pub fn check_with_imports(parse: &mk_parser::Parse, imports: &ImportContext) -> TypeckResult {
    infer::check_file(parse, imports)
}
