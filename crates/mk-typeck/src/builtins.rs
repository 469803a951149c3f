//! Prelude installation.
//!
//! Registers the always-imported core into a fresh compilation unit: the
//! primitive types, `Option`/`Result`/`List`/`Map`, the helper functions,
//! the core effect declarations, and a small set of host-backed effect
//! operations. These form the starting vocabulary of every Manaknight
//! module and are installed before any user declarations are processed.

use std::collections::BTreeSet;

use rowan::TextRange;

use crate::registry::{TypeDefInfo, TypeDefKind, TypeRegistry, VariantInfo};
use crate::scope::{ScopeTable, Symbol, SymbolKind};
use crate::ty::{effect_set, Scheme, Ty, TyCon, TyVar};

/// The effect names every program starts with.
pub const CORE_EFFECTS: &[&str] = &["time", "random", "http", "log", "crypto"];

/// Install the prelude into the global scope, the type registry, and the
/// known-effect set.
pub fn install_prelude(
    scope: &mut ScopeTable,
    registry: &mut TypeRegistry,
    known_effects: &mut BTreeSet<String>,
) {
    let span = TextRange::empty(0.into());
    let declare = |scope: &mut ScopeTable, name: &str, kind: SymbolKind, scheme: Scheme| {
        scope
            .declare(Symbol::new(name, kind, scheme, span))
            .expect("prelude installs into an empty scope");
    };

    // ── Primitive types ─────────────────────────────────────────────
    for prim in ["Int", "Bool", "String", "Unit"] {
        registry.register(TypeDefInfo {
            name: prim.into(),
            generic_params: vec![],
            kind: TypeDefKind::Opaque,
        });
        declare(
            scope,
            prim,
            SymbolKind::Type,
            Scheme::mono(Ty::Con(TyCon::new(prim))),
        );
    }

    // ── Option<T> ───────────────────────────────────────────────────
    registry.register(TypeDefInfo {
        name: "Option".into(),
        generic_params: vec!["T".into()],
        kind: TypeDefKind::Union {
            variants: vec![
                VariantInfo {
                    name: "Some".into(),
                    fields: vec![("value".into(), Ty::Con(TyCon::new("T")))],
                },
                VariantInfo {
                    name: "None".into(),
                    fields: vec![],
                },
            ],
        },
    });
    declare(
        scope,
        "Option",
        SymbolKind::Type,
        Scheme::mono(Ty::Con(TyCon::new("Option"))),
    );
    let t = TyVar(0);
    declare(
        scope,
        "Some",
        SymbolKind::Constructor,
        Scheme::poly(
            vec![t],
            Ty::fun(vec![Ty::Var(t)], Ty::option(Ty::Var(t))),
        ),
    );
    declare(
        scope,
        "None",
        SymbolKind::Constructor,
        Scheme::poly(vec![t], Ty::option(Ty::Var(t))),
    );

    // ── Result<T, E> ────────────────────────────────────────────────
    registry.register(TypeDefInfo {
        name: "Result".into(),
        generic_params: vec!["T".into(), "E".into()],
        kind: TypeDefKind::Union {
            variants: vec![
                VariantInfo {
                    name: "Ok".into(),
                    fields: vec![("value".into(), Ty::Con(TyCon::new("T")))],
                },
                VariantInfo {
                    name: "Err".into(),
                    fields: vec![("error".into(), Ty::Con(TyCon::new("E")))],
                },
            ],
        },
    });
    declare(
        scope,
        "Result",
        SymbolKind::Type,
        Scheme::mono(Ty::Con(TyCon::new("Result"))),
    );
    let e = TyVar(1);
    declare(
        scope,
        "Ok",
        SymbolKind::Constructor,
        Scheme::poly(
            vec![t, e],
            Ty::fun(vec![Ty::Var(t)], Ty::result(Ty::Var(t), Ty::Var(e))),
        ),
    );
    declare(
        scope,
        "Err",
        SymbolKind::Constructor,
        Scheme::poly(
            vec![t, e],
            Ty::fun(vec![Ty::Var(e)], Ty::result(Ty::Var(t), Ty::Var(e))),
        ),
    );

    // ── Opaque collections ──────────────────────────────────────────
    registry.register(TypeDefInfo {
        name: "List".into(),
        generic_params: vec!["T".into()],
        kind: TypeDefKind::Opaque,
    });
    declare(
        scope,
        "List",
        SymbolKind::Type,
        Scheme::mono(Ty::Con(TyCon::new("List"))),
    );
    registry.register(TypeDefInfo {
        name: "Map".into(),
        generic_params: vec!["K".into(), "V".into()],
        kind: TypeDefKind::Opaque,
    });
    declare(
        scope,
        "Map",
        SymbolKind::Type,
        Scheme::mono(Ty::Con(TyCon::new("Map"))),
    );

    // ── Helper functions ────────────────────────────────────────────
    let a = TyVar(2);
    let b = TyVar(3);
    let c = TyVar(4);

    declare(
        scope,
        "identity",
        SymbolKind::Function,
        Scheme::poly(vec![a], Ty::fun(vec![Ty::Var(a)], Ty::Var(a))),
    );
    declare(
        scope,
        "equals",
        SymbolKind::Function,
        Scheme::poly(
            vec![a],
            Ty::fun(vec![Ty::Var(a), Ty::Var(a)], Ty::bool()),
        ),
    );
    declare(
        scope,
        "hash",
        SymbolKind::Function,
        Scheme::poly(vec![a], Ty::fun(vec![Ty::Var(a)], Ty::int())),
    );
    declare(
        scope,
        "pipe",
        SymbolKind::Function,
        Scheme::poly(
            vec![a, b],
            Ty::fun(
                vec![Ty::Var(a), Ty::fun(vec![Ty::Var(a)], Ty::Var(b))],
                Ty::Var(b),
            ),
        ),
    );
    declare(
        scope,
        "compose",
        SymbolKind::Function,
        Scheme::poly(
            vec![a, b, c],
            Ty::fun(
                vec![
                    Ty::fun(vec![Ty::Var(a)], Ty::Var(b)),
                    Ty::fun(vec![Ty::Var(b)], Ty::Var(c)),
                ],
                Ty::fun(vec![Ty::Var(a)], Ty::Var(c)),
            ),
        ),
    );
    declare(
        scope,
        "not",
        SymbolKind::Function,
        Scheme::mono(Ty::fun(vec![Ty::bool()], Ty::bool())),
    );
    declare(
        scope,
        "and",
        SymbolKind::Function,
        Scheme::mono(Ty::fun(vec![Ty::bool(), Ty::bool()], Ty::bool())),
    );
    declare(
        scope,
        "or",
        SymbolKind::Function,
        Scheme::mono(Ty::fun(vec![Ty::bool(), Ty::bool()], Ty::bool())),
    );

    // ── Core effects and their host operations ──────────────────────
    for effect in CORE_EFFECTS {
        known_effects.insert((*effect).to_string());
        declare(
            scope,
            effect,
            SymbolKind::Effect,
            Scheme::mono(Ty::unit()),
        );
    }

    declare(
        scope,
        "now",
        SymbolKind::Function,
        Scheme::mono(Ty::fun_with_effects(vec![], Ty::int(), effect_set(["time"]))),
    );
    declare(
        scope,
        "random_int",
        SymbolKind::Function,
        Scheme::mono(Ty::fun_with_effects(
            vec![Ty::int(), Ty::int()],
            Ty::int(),
            effect_set(["random"]),
        )),
    );
    declare(
        scope,
        "http_get",
        SymbolKind::Function,
        Scheme::mono(Ty::fun_with_effects(
            vec![Ty::string()],
            Ty::result(Ty::string(), Ty::string()),
            effect_set(["http"]),
        )),
    );
    declare(
        scope,
        "log_info",
        SymbolKind::Function,
        Scheme::mono(Ty::fun_with_effects(
            vec![Ty::string()],
            Ty::unit(),
            effect_set(["log"]),
        )),
    );
    declare(
        scope,
        "sha256",
        SymbolKind::Function,
        Scheme::mono(Ty::fun_with_effects(
            vec![Ty::string()],
            Ty::string(),
            effect_set(["crypto"]),
        )),
    );
}
