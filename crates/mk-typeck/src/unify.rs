//! Unification engine for the Manaknight type checker.
//!
//! Implements unification over concrete types and explicit generic
//! instantiation using `ena`'s union-find table. There is no
//! let-polymorphism: only prelude helpers and generic constructors carry
//! quantified variables, so instantiation is the only source of fresh
//! variables and unification binds them.

use ena::unify::InPlaceUnificationTable;
use rowan::TextRange;
use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::ty::{Scheme, Ty, TyVar};

/// The inference context: owns the unification table and accumulated
/// errors.
pub struct InferCtx {
    /// The union-find unification table (ena).
    table: InPlaceUnificationTable<TyVar>,
    /// Type errors accumulated during inference.
    pub errors: Vec<TypeError>,
}

impl InferCtx {
    /// Create a new, empty inference context.
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            errors: Vec::new(),
        }
    }

    /// Create a fresh type variable.
    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.table.new_key(None))
    }

    /// Whether a variable belongs to this context's table. Scheme
    /// variables from another compilation unit (possible on error paths)
    /// are foreign and must never be probed.
    fn is_known(&self, var: TyVar) -> bool {
        (var.0 as usize) < self.table.len()
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Resolve a type by following union-find indirection. Foreign
    /// variables resolve to themselves.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) if !self.is_known(v) => Ty::Var(v),
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::App(head, args) => {
                let head = Box::new(self.resolve(*head));
                let args = args.into_iter().map(|a| self.resolve(a)).collect();
                Ty::App(head, args)
            }
            Ty::Fun(params, ret, effects) => {
                let params = params.into_iter().map(|p| self.resolve(p)).collect();
                let ret = Box::new(self.resolve(*ret));
                Ty::Fun(params, ret, effects)
            }
            other => other,
        }
    }

    // ── Occurs check ────────────────────────────────────────────────────

    /// Check if a type variable occurs anywhere within a type. Prevents
    /// binding a variable to a type containing itself.
    fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if *v == var {
                    return true;
                }
                if !self.is_known(*v) {
                    return false;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Con(_) => false,
            Ty::App(head, args) => {
                self.occurs_in(var, head) || args.iter().any(|a| self.occurs_in(var, a))
            }
            Ty::Fun(params, ret, _) => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, ret)
            }
        }
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, recording a `Mismatch` at `span` on failure.
    ///
    /// Declared effect sets on function types are ignored here: effect
    /// discipline is the effect analyzer's job, and a pure function is
    /// always an acceptable value where an effectful signature is written.
    pub fn unify(&mut self, a: Ty, b: Ty, span: TextRange) -> bool {
        if self.unify_inner(a.clone(), b.clone()) {
            true
        } else {
            let expected = self.resolve(a);
            let found = self.resolve(b);
            self.errors.push(TypeError::Mismatch {
                expected,
                found,
                span,
            });
            false
        }
    }

    /// Unify two types without recording an error. Callers use this when
    /// a more specific error variant should be reported on failure.
    pub fn unify_quiet(&mut self, a: Ty, b: Ty) -> bool {
        self.unify_inner(a, b)
    }

    fn unify_inner(&mut self, a: Ty, b: Ty) -> bool {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => true,

            // Foreign variables (error artifacts from another unit) are
            // treated as wildcards rather than probed.
            (Ty::Var(v), _) | (_, Ty::Var(v)) if !self.is_known(v) => true,

            (Ty::Var(v1), Ty::Var(v2)) => {
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars cannot fail");
                true
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    false
                } else {
                    self.table
                        .unify_var_value(v, Some(ty))
                        .expect("binding after occurs check cannot fail");
                    true
                }
            }

            (Ty::Con(c1), Ty::Con(c2)) => c1 == c2,

            (Ty::App(h1, a1), Ty::App(h2, a2)) => {
                if a1.len() != a2.len() {
                    return false;
                }
                if !self.unify_inner(*h1, *h2) {
                    return false;
                }
                a1.into_iter()
                    .zip(a2)
                    .all(|(x, y)| self.unify_inner(x, y))
            }

            (Ty::Fun(p1, r1, _), Ty::Fun(p2, r2, _)) => {
                if p1.len() != p2.len() {
                    return false;
                }
                if !p1
                    .into_iter()
                    .zip(p2)
                    .all(|(x, y)| self.unify_inner(x, y))
                {
                    return false;
                }
                self.unify_inner(*r1, *r2)
            }

            _ => false,
        }
    }

    // ── Instantiation ───────────────────────────────────────────────────

    /// Instantiate a polymorphic scheme with fresh type variables.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        let substitution: FxHashMap<TyVar, Ty> = scheme
            .vars
            .iter()
            .map(|v| (*v, self.fresh_var()))
            .collect();
        substitute_vars(&scheme.ty, &substitution)
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace quantified variables by their substitutions.
fn substitute_vars(ty: &Ty, subst: &FxHashMap<TyVar, Ty>) -> Ty {
    match ty {
        Ty::Var(v) => subst.get(v).cloned().unwrap_or_else(|| ty.clone()),
        Ty::Con(_) => ty.clone(),
        Ty::App(head, args) => Ty::App(
            Box::new(substitute_vars(head, subst)),
            args.iter().map(|a| substitute_vars(a, subst)).collect(),
        ),
        Ty::Fun(params, ret, effects) => Ty::Fun(
            params.iter().map(|p| substitute_vars(p, subst)).collect(),
            Box::new(substitute_vars(ret, subst)),
            effects.clone(),
        ),
    }
}
