//! Registry of type definitions.
//!
//! The central store of every record and tagged-union definition visible to
//! the current compilation unit: prelude types, the module's own types, and
//! imported types. The exhaustiveness checker reads union variants from
//! here, and codegen reads field orders for object construction.

use rustc_hash::FxHashMap;

use crate::ty::Ty;

/// A registered type definition.
#[derive(Clone, Debug)]
pub struct TypeDefInfo {
    /// The type's name, e.g. `"Shape"`.
    pub name: String,
    /// Generic parameter names, e.g. `["T"]` for `Option<T>`. Field types
    /// reference them as `Con` placeholders of the same name.
    pub generic_params: Vec<String>,
    pub kind: TypeDefKind,
}

/// Whether a type is a record, a tagged union, or an opaque builtin.
#[derive(Clone, Debug)]
pub enum TypeDefKind {
    /// Ordered named fields.
    Record { fields: Vec<(String, Ty)> },
    /// Ordered constructor variants.
    Union { variants: Vec<VariantInfo> },
    /// Builtin with no user-visible structure (`List`, `Map`).
    Opaque,
}

/// A single variant of a tagged union with its ordered named fields.
#[derive(Clone, Debug)]
pub struct VariantInfo {
    pub name: String,
    pub fields: Vec<(String, Ty)>,
}

/// Registry for all type definitions in a compilation unit.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    defs: FxHashMap<String, TypeDefInfo>,
    /// Maps constructor names to their owning union type.
    constructor_owner: FxHashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Returns false when the name is taken.
    pub fn register(&mut self, info: TypeDefInfo) -> bool {
        if self.defs.contains_key(&info.name) {
            return false;
        }
        if let TypeDefKind::Union { variants } = &info.kind {
            for variant in variants {
                self.constructor_owner
                    .insert(variant.name.clone(), info.name.clone());
            }
        }
        self.defs.insert(info.name.clone(), info);
        true
    }

    /// Replace a previously registered definition (used when a placeholder
    /// registered in the name pass gets its real body).
    pub fn replace(&mut self, info: TypeDefInfo) {
        if let TypeDefKind::Union { variants } = &info.kind {
            for variant in variants {
                self.constructor_owner
                    .insert(variant.name.clone(), info.name.clone());
            }
        }
        self.defs.insert(info.name.clone(), info);
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeDefInfo> {
        self.defs.get(name)
    }

    /// Find the union that owns a constructor, with the variant itself.
    pub fn lookup_constructor(&self, ctor: &str) -> Option<(&TypeDefInfo, &VariantInfo)> {
        let owner = self.constructor_owner.get(ctor)?;
        let def = self.defs.get(owner)?;
        match &def.kind {
            TypeDefKind::Union { variants } => variants
                .iter()
                .find(|v| v.name == ctor)
                .map(|v| (def, v)),
            _ => None,
        }
    }

    /// The constructor names of a union type, in declaration order.
    pub fn variant_names(&self, type_name: &str) -> Option<Vec<String>> {
        match &self.lookup(type_name)?.kind {
            TypeDefKind::Union { variants } => {
                Some(variants.iter().map(|v| v.name.clone()).collect())
            }
            _ => None,
        }
    }

    /// Whether the named type is a tagged union.
    pub fn is_union(&self, type_name: &str) -> bool {
        matches!(
            self.lookup(type_name).map(|d| &d.kind),
            Some(TypeDefKind::Union { .. })
        )
    }
}
