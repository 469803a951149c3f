//! Type representation for the Manaknight type system.
//!
//! Defines the core `Ty` enum, type constructors (`TyCon`), type variables
//! (`TyVar`), effect sets, and polymorphic type schemes (`Scheme`). Function
//! types carry their declared effect set, which is what makes effects part
//! of the typed API surface.

use std::collections::BTreeSet;
use std::fmt;

/// A type variable, identified by a `u32` index into the unification table.
///
/// Type variables are created when a generic symbol is instantiated and are
/// bound by subsequent unifications. The `ena` crate handles the union-find
/// mechanics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// An unordered set of effect names. The empty set means *pure*.
///
/// A `BTreeSet` keeps every iteration over effects sorted, which the
/// deterministic-output rules require.
pub type EffectSet = BTreeSet<String>;

/// Build an effect set from a list of names.
pub fn effect_set<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> EffectSet {
    names.into_iter().map(Into::into).collect()
}

/// A type constructor: a named type like `Int`, `Option`, or `Point`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyCon {
    pub name: String,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into() }
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A Manaknight type.
///
/// - `Var`: an inference variable (bound by unification)
/// - `Con`: a concrete type constructor (Int, Bool, a record, an ADT, or a
///   type-definition generic parameter placeholder)
/// - `App`: a type constructor application (`Option<Int>`, `Map<K, V>`)
/// - `Fun`: a function type with parameter types, return type, and the
///   declared effect set
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Var(TyVar),
    Con(TyCon),
    App(Box<Ty>, Vec<Ty>),
    Fun(Vec<Ty>, Box<Ty>, EffectSet),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Con(TyCon::new("Int"))
    }

    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("Bool"))
    }

    pub fn string() -> Ty {
        Ty::Con(TyCon::new("String"))
    }

    pub fn unit() -> Ty {
        Ty::Con(TyCon::new("Unit"))
    }

    pub fn option(inner: Ty) -> Ty {
        Ty::App(Box::new(Ty::Con(TyCon::new("Option"))), vec![inner])
    }

    pub fn result(ok: Ty, err: Ty) -> Ty {
        Ty::App(Box::new(Ty::Con(TyCon::new("Result"))), vec![ok, err])
    }

    pub fn list(inner: Ty) -> Ty {
        Ty::App(Box::new(Ty::Con(TyCon::new("List"))), vec![inner])
    }

    pub fn map(key: Ty, value: Ty) -> Ty {
        Ty::App(Box::new(Ty::Con(TyCon::new("Map"))), vec![key, value])
    }

    /// Create a pure function type.
    pub fn fun(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fun(params, Box::new(ret), EffectSet::new())
    }

    /// Create a function type with declared effects.
    pub fn fun_with_effects(params: Vec<Ty>, ret: Ty, effects: EffectSet) -> Ty {
        Ty::Fun(params, Box::new(ret), effects)
    }

    /// The head constructor name of this type, if it has one:
    /// `Option<Int>` -> `Some("Option")`, `Int` -> `Some("Int")`.
    pub fn head_name(&self) -> Option<&str> {
        match self {
            Ty::Con(c) => Some(&c.name),
            Ty::App(head, _) => head.head_name(),
            _ => None,
        }
    }

    /// Whether a function type occurs anywhere inside this type.
    ///
    /// Types containing functions are not structurally comparable, so `==`
    /// and `!=` reject them.
    pub fn contains_fn(&self) -> bool {
        match self {
            Ty::Var(_) | Ty::Con(_) => false,
            Ty::App(head, args) => head.contains_fn() || args.iter().any(Ty::contains_fn),
            Ty::Fun(..) => true,
        }
    }

    /// Substitute type-definition generic parameter placeholders by name.
    ///
    /// Registry entries store a generic parameter `T` as `Con("T")`; when a
    /// generic type is instantiated, those placeholders are replaced with
    /// the actual (or fresh) type arguments.
    pub fn substitute_params(&self, mapping: &[(String, Ty)]) -> Ty {
        match self {
            Ty::Var(_) => self.clone(),
            Ty::Con(c) => {
                for (name, replacement) in mapping {
                    if *name == c.name {
                        return replacement.clone();
                    }
                }
                self.clone()
            }
            Ty::App(head, args) => Ty::App(
                Box::new(head.substitute_params(mapping)),
                args.iter().map(|a| a.substitute_params(mapping)).collect(),
            ),
            Ty::Fun(params, ret, effects) => Ty::Fun(
                params.iter().map(|p| p.substitute_params(mapping)).collect(),
                Box::new(ret.substitute_params(mapping)),
                effects.clone(),
            ),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Con(c) => write!(f, "{}", c),
            Ty::App(head, args) => {
                write!(f, "{}", head)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Fun(params, ret, effects) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)?;
                if !effects.is_empty() {
                    let names: Vec<&str> = effects.iter().map(String::as_str).collect();
                    write!(f, " uses {{ {} }}", names.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// A polymorphic type scheme: a type with universally quantified variables.
///
/// Only prelude helpers and generic constructors are polymorphic in
/// Manaknight; user functions are monomorphic, so most schemes have no
/// quantified variables.
#[derive(Clone, Debug)]
pub struct Scheme {
    /// The quantified (generic) type variables.
    pub vars: Vec<TyVar>,
    /// The underlying type (may reference vars).
    pub ty: Ty,
}

impl Scheme {
    /// Create a monomorphic scheme (no quantified variables).
    pub fn mono(ty: Ty) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }

    /// Create a scheme quantifying the given variables.
    pub fn poly(vars: Vec<TyVar>, ty: Ty) -> Self {
        Scheme { vars, ty }
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Ty::int().to_string(), "Int");
        assert_eq!(Ty::option(Ty::int()).to_string(), "Option<Int>");
        assert_eq!(
            Ty::fun(vec![Ty::int(), Ty::string()], Ty::bool()).to_string(),
            "(Int, String) -> Bool"
        );
        assert_eq!(
            Ty::fun_with_effects(vec![], Ty::int(), effect_set(["time"])).to_string(),
            "() -> Int uses { time }"
        );
    }

    #[test]
    fn head_name_unwraps_applications() {
        assert_eq!(Ty::option(Ty::int()).head_name(), Some("Option"));
        assert_eq!(Ty::int().head_name(), Some("Int"));
        assert_eq!(Ty::fun(vec![], Ty::unit()).head_name(), None);
    }

    #[test]
    fn contains_fn_sees_through_applications() {
        assert!(!Ty::option(Ty::int()).contains_fn());
        assert!(Ty::option(Ty::fun(vec![], Ty::int())).contains_fn());
        assert!(Ty::fun(vec![], Ty::int()).contains_fn());
    }

    #[test]
    fn substitute_params_replaces_placeholders() {
        let field = Ty::option(Ty::Con(TyCon::new("T")));
        let instantiated = field.substitute_params(&[("T".to_string(), Ty::int())]);
        assert_eq!(instantiated, Ty::option(Ty::int()));
    }
}
