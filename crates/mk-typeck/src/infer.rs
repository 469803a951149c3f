//! The Manaknight type checker.
//!
//! Walks the typed AST bottom-up, resolving every expression to a type and
//! recording it in a side table keyed by the node's text range. The tree is
//! never mutated. Checking covers name resolution with shadow prohibition,
//! explicit generic instantiation, comparability rules, record and
//! constructor application, totality, and the API-route parameter rules.
//!
//! The pass runs in two phases over a compilation unit: declaration
//! collection (effects, imports, types, function signatures), then body
//! checking. Effect analysis and exhaustiveness run afterwards over the
//! same side tables (see `effects` and `exhaustiveness`).

use std::collections::BTreeSet;

use rowan::TextRange;
use rustc_hash::FxHashMap;

use mk_parser::ast::expr::{Arg, Block, Expr, Stmt};
use mk_parser::ast::item::{ApiRoute, FnDef, Item, ParamList, SourceFile, TypeDef};
use mk_parser::ast::pat::{Pattern, SubPattern};
use mk_parser::ast::ty::TypeRef;
use mk_parser::ast::AstNode;
use mk_parser::syntax_kind::SyntaxKind;
use mk_parser::Parse;

use crate::builtins;
use crate::error::TypeError;
use crate::registry::{TypeDefInfo, TypeDefKind, TypeRegistry, VariantInfo};
use crate::scope::{ScopeTable, Symbol, SymbolKind};
use crate::ty::{EffectSet, Scheme, Ty, TyCon, TyVar};
use crate::unify::InferCtx;
use crate::{ImportContext, ModuleExports, TypeckResult};

/// The primitive types an API route parameter may have.
const ROUTE_PARAM_TYPES: &[&str] = &["Int", "String", "Bool"];

/// Check a parsed file against an import context.
pub(crate) fn check_file(parse: &Parse, imports: &ImportContext) -> TypeckResult {
    let mut checker = Checker::new(imports);
    checker.run(&parse.source_file());

    // Side-table entries may contain variables that were bound after the
    // entry was written; resolve everything before handing the table on.
    let mut types = FxHashMap::default();
    for (range, ty) in checker.types.clone() {
        types.insert(range, checker.ctx.resolve(ty));
    }

    let mut errors = checker.errors;
    errors.extend(checker.ctx.errors);

    let effects = crate::effects::analyze(
        &parse.source_file(),
        &types,
        &mut errors,
    );
    crate::exhaustiveness::check_matches(parse, &types, &checker.registry, &mut errors);

    TypeckResult {
        types,
        effects,
        errors,
        registry: checker.registry,
        known_effects: checker.known_effects,
        module_exports: checker.module_exports,
        qualified_refs: checker.qualified_refs,
    }
}

struct Checker<'a> {
    ctx: InferCtx,
    scope: ScopeTable,
    registry: TypeRegistry,
    known_effects: BTreeSet<String>,
    types: FxHashMap<TextRange, Ty>,
    errors: Vec<TypeError>,
    imports: &'a ImportContext,
    /// Maps import binding names to full module paths.
    module_bindings: FxHashMap<String, String>,
    /// Qualified references resolved through a module binding, for codegen.
    qualified_refs: FxHashMap<TextRange, (String, String)>,
    /// Exports per module block (`None` for the file's loose declarations).
    module_exports: Vec<(Option<String>, ModuleExports)>,
    /// Counter for scheme-quantified variables; kept far away from the
    /// unification table's indices.
    next_scheme_var: u32,
    /// Signatures keyed by the defining node, so body checking reads the
    /// right signature even when the name collided with another symbol.
    fn_sigs: FxHashMap<TextRange, (Vec<Ty>, Ty)>,
}

impl<'a> Checker<'a> {
    fn new(imports: &'a ImportContext) -> Self {
        let mut scope = ScopeTable::new();
        let mut registry = TypeRegistry::new();
        let mut known_effects = BTreeSet::new();
        builtins::install_prelude(&mut scope, &mut registry, &mut known_effects);

        // Effects are program-global, and dependency type definitions must
        // be known to the registry so matches over imported unions check.
        // Modules are visited in name order so ties resolve the same way
        // on every run.
        let mut module_names: Vec<&String> = imports.modules.keys().collect();
        module_names.sort();
        for module_name in module_names {
            let exports = &imports.modules[module_name];
            known_effects.extend(exports.effects.iter().cloned());
            let mut type_names: Vec<&String> = exports.types.keys().collect();
            type_names.sort();
            for type_name in type_names {
                let def = &exports.types[type_name];
                if registry.lookup(&def.name).is_none() {
                    registry.register(def.clone());
                }
            }
        }

        Checker {
            ctx: InferCtx::new(),
            scope,
            registry,
            known_effects,
            types: FxHashMap::default(),
            errors: Vec::new(),
            imports,
            module_bindings: FxHashMap::default(),
            qualified_refs: FxHashMap::default(),
            module_exports: Vec::new(),
            next_scheme_var: 1_000_000,
            fn_sigs: FxHashMap::default(),
        }
    }

    fn run(&mut self, file: &SourceFile) {
        // Flatten module blocks: a file is one lexical unit; module blocks
        // contribute namespacing for the resolver, not nested scopes.
        let groups = collect_groups(file);

        // Phase A: declarations, leaves first so signatures can refer to
        // everything declared anywhere in the file.
        for (_, items) in &groups {
            for item in items {
                if let Item::Effect(def) = item {
                    self.declare_effect(def);
                }
            }
        }
        for (_, items) in &groups {
            for item in items {
                if let Item::Import(import) = item {
                    self.declare_import(import);
                }
            }
        }
        // Type names first, then bodies, so definitions may reference each
        // other in any order.
        for (_, items) in &groups {
            for item in items {
                if let Item::Type(def) = item {
                    self.declare_type_name(def);
                }
            }
        }
        for (_, items) in &groups {
            for item in items {
                if let Item::Type(def) = item {
                    self.define_type(def);
                }
            }
        }
        for (_, items) in &groups {
            for item in items {
                if let Item::Fn(def) = item {
                    self.declare_fn(def);
                }
            }
        }

        // Phase B: bodies.
        for (_, items) in &groups {
            for item in items {
                match item {
                    Item::Fn(def) => self.check_fn_body(def),
                    Item::Api(route) => self.check_route(route),
                    _ => {}
                }
            }
        }

        // Exports per group.
        for (module_path, items) in &groups {
            let exports = self.build_exports(module_path.as_deref(), items);
            self.module_exports.push((module_path.clone(), exports));
        }
    }

    // ── Phase A: declarations ───────────────────────────────────────────

    fn declare_effect(&mut self, def: &mk_parser::ast::item::EffectDef) {
        let Some(name) = def.name() else { return };
        let text = name.text();
        let span = name.syntax().text_range();
        self.known_effects.insert(text.clone());
        if self
            .scope
            .declare(Symbol::new(
                text.clone(),
                SymbolKind::Effect,
                Scheme::mono(Ty::unit()),
                span,
            ))
            .is_err()
        {
            self.errors.push(TypeError::ShadowedName { name: text, span });
        }
    }

    fn declare_import(&mut self, import: &mk_parser::ast::item::ImportDecl) {
        let Some(path) = import.path() else { return };
        let Some(binding) = import.binding_name() else {
            return;
        };
        let full = path.text();
        let span = import.syntax().text_range();
        self.module_bindings.insert(binding.clone(), full);
        if self
            .scope
            .declare(Symbol::new(
                binding.clone(),
                SymbolKind::Module,
                Scheme::mono(Ty::unit()),
                span,
            ))
            .is_err()
        {
            self.errors.push(TypeError::ShadowedName {
                name: binding,
                span,
            });
        }
    }

    /// Name pass: reserve the type's name (and scope symbol) so later
    /// definitions can reference it before its body is built.
    fn declare_type_name(&mut self, def: &TypeDef) {
        let Some(name) = def.name() else { return };
        let text = name.text();
        let span = name.syntax().text_range();

        let placeholder = TypeDefInfo {
            name: text.clone(),
            generic_params: def.generic_params(),
            kind: TypeDefKind::Opaque,
        };
        if !self.registry.register(placeholder) {
            self.errors.push(TypeError::ShadowedName {
                name: text.clone(),
                span,
            });
            return;
        }
        if self
            .scope
            .declare(Symbol::new(
                text.clone(),
                SymbolKind::Type,
                Scheme::mono(Ty::Con(TyCon::new(&text))),
                span,
            ))
            .is_err()
        {
            self.errors.push(TypeError::ShadowedName { name: text, span });
        }
    }

    /// Body pass: resolve fields and variants, replace the placeholder,
    /// and declare the union's constructors.
    fn define_type(&mut self, def: &TypeDef) {
        let Some(name) = def.name() else { return };
        let text = name.text();
        let span = name.syntax().text_range();
        let generic_params = def.generic_params();

        let kind = if let Some(record) = def.record_fields() {
            let mut fields = Vec::new();
            for field in record.fields() {
                let Some(field_name) = field.name() else {
                    continue;
                };
                let ty = field
                    .ty()
                    .map(|t| self.resolve_type(&t, &generic_params))
                    .unwrap_or_else(|| self.ctx.fresh_var());
                fields.push((field_name.text(), ty));
            }
            TypeDefKind::Record { fields }
        } else {
            let mut variants = Vec::new();
            for variant in def.variants() {
                let Some(variant_name) = variant.name() else {
                    continue;
                };
                let mut fields = Vec::new();
                for field in variant.fields() {
                    let Some(field_name) = field.name() else {
                        continue;
                    };
                    let ty = field
                        .ty()
                        .map(|t| self.resolve_type(&t, &generic_params))
                        .unwrap_or_else(|| self.ctx.fresh_var());
                    fields.push((field_name.text(), ty));
                }
                variants.push(VariantInfo {
                    name: variant_name.text(),
                    fields,
                });
            }
            TypeDefKind::Union { variants }
        };

        self.registry.replace(TypeDefInfo {
            name: text.clone(),
            generic_params: generic_params.clone(),
            kind: kind.clone(),
        });

        // Union constructors become callable (or nullary) symbols whose
        // schemes quantify the type's generic parameters.
        if let TypeDefKind::Union { variants } = kind {
            for variant in &variants {
                let scheme = self.constructor_scheme(&text, &generic_params, variant);
                if self
                    .scope
                    .declare(Symbol::new(
                        variant.name.clone(),
                        SymbolKind::Constructor,
                        scheme,
                        span,
                    ))
                    .is_err()
                {
                    self.errors.push(TypeError::ShadowedName {
                        name: variant.name.clone(),
                        span,
                    });
                }
            }
        }
    }

    /// Build a constructor's scheme: `forall params. (fields) -> Type<params>`,
    /// or just `Type<params>` for a nullary constructor.
    fn constructor_scheme(
        &mut self,
        type_name: &str,
        generic_params: &[String],
        variant: &VariantInfo,
    ) -> Scheme {
        let vars: Vec<TyVar> = generic_params
            .iter()
            .map(|_| {
                let v = TyVar(self.next_scheme_var);
                self.next_scheme_var += 1;
                v
            })
            .collect();
        let mapping: Vec<(String, Ty)> = generic_params
            .iter()
            .cloned()
            .zip(vars.iter().map(|v| Ty::Var(*v)))
            .collect();

        let result = if generic_params.is_empty() {
            Ty::Con(TyCon::new(type_name))
        } else {
            Ty::App(
                Box::new(Ty::Con(TyCon::new(type_name))),
                vars.iter().map(|v| Ty::Var(*v)).collect(),
            )
        };

        let ty = if variant.fields.is_empty() {
            result
        } else {
            let params = variant
                .fields
                .iter()
                .map(|(_, t)| t.substitute_params(&mapping))
                .collect();
            Ty::Fun(params, Box::new(result), EffectSet::new())
        };

        Scheme::poly(vars, ty)
    }

    fn declare_fn(&mut self, def: &FnDef) {
        let Some(name) = def.name() else { return };
        let text = name.text();
        let span = name.syntax().text_range();

        let params = self.param_types(def.param_list());
        let ret = def
            .return_type()
            .and_then(|r| r.ty())
            .map(|t| self.resolve_type(&t, &[]))
            .unwrap_or_else(Ty::unit);
        let effects = self.declared_effects(def.uses_clause());

        self.fn_sigs.insert(
            def.syntax().text_range(),
            (params.clone(), ret.clone()),
        );

        let ty = Ty::fun_with_effects(params, ret, effects);
        if self
            .scope
            .declare(Symbol::new(text.clone(), SymbolKind::Function, Scheme::mono(ty), span))
            .is_err()
        {
            self.errors.push(TypeError::ShadowedName { name: text, span });
        }
    }

    fn param_types(&mut self, params: Option<ParamList>) -> Vec<Ty> {
        let Some(list) = params else {
            return Vec::new();
        };
        list.params()
            .map(|p| {
                p.ty()
                    .map(|t| self.resolve_type(&t, &[]))
                    .unwrap_or_else(|| self.ctx.fresh_var())
            })
            .collect()
    }

    /// Read a `uses` clause, checking every name against the known effects.
    fn declared_effects(&mut self, clause: Option<mk_parser::ast::item::UsesClause>) -> EffectSet {
        let Some(clause) = clause else {
            return EffectSet::new();
        };
        let span = clause.syntax().text_range();
        let mut set = EffectSet::new();
        for effect in clause.effects() {
            if !self.known_effects.contains(&effect) {
                self.errors.push(TypeError::UnknownEffect {
                    effect: effect.clone(),
                    span,
                });
            }
            set.insert(effect);
        }
        set
    }

    // ── Phase B: bodies ─────────────────────────────────────────────────

    fn check_fn_body(&mut self, def: &FnDef) {
        let Some(name) = def.name() else { return };
        let fn_name = name.text();
        let name_span = name.syntax().text_range();
        let Some(body) = def.body() else { return };

        // The signature was resolved by `declare_fn`; reuse it so unknown
        // types in the header are reported exactly once. Keyed by the
        // defining node, not the name, so a name collision cannot hand us
        // someone else's signature.
        let (param_tys, ret) = self
            .fn_sigs
            .get(&def.syntax().text_range())
            .cloned()
            .unwrap_or_else(|| (Vec::new(), Ty::unit()));

        self.scope.push_scope();
        self.bind_params_with(def.param_list(), &param_tys);
        let body_ty = self.infer_block(&body, false);
        self.scope.pop_scope();

        self.check_signature(&fn_name, name_span, &body, body_ty, ret);
    }

    fn check_route(&mut self, route: &ApiRoute) {
        let handler = route.handler_name();
        let span = route.syntax().text_range();

        // Resolve route parameters once: the placeholder rule and the body
        // bindings both use the same resolved types.
        let placeholders = route.placeholders();
        let mut param_tys = Vec::new();
        if let Some(params) = route.param_list() {
            for param in params.params() {
                let ty = param
                    .ty()
                    .map(|t| self.resolve_type(&t, &[]))
                    .unwrap_or_else(|| self.ctx.fresh_var());
                param_tys.push(ty.clone());

                let Some(name) = param.name() else { continue };
                let text = name.text();
                let param_span = param.syntax().text_range();
                let ty_ok =
                    matches!(ty.head_name(), Some(n) if ROUTE_PARAM_TYPES.contains(&n));
                if !ty_ok || !placeholders.contains(&text) {
                    self.errors.push(TypeError::BadRouteParam {
                        name: text,
                        span: param_span,
                    });
                }
            }
        }

        // The declared effect set is read even though the route has no
        // name in scope; it is checked exactly like a function's.
        let _ = self.declared_effects(route.uses_clause());

        let ret = route
            .return_type()
            .and_then(|r| r.ty())
            .map(|t| self.resolve_type(&t, &[]))
            .unwrap_or_else(Ty::unit);

        let Some(body) = route.body() else { return };
        self.scope.push_scope();
        self.bind_params_with(route.param_list(), &param_tys);
        let body_ty = self.infer_block(&body, false);
        self.scope.pop_scope();

        self.check_signature(&handler, span, &body, body_ty, ret);
    }

    /// Shared return-type and totality checking for functions and routes.
    fn check_signature(
        &mut self,
        fn_name: &str,
        name_span: TextRange,
        body: &Block,
        body_ty: Ty,
        ret: Ty,
    ) {
        let ret_is_unit = ret == Ty::unit();
        let total = block_is_total(body);

        if !total && !ret_is_unit {
            // A missing value is a totality problem, not a mismatch.
            self.errors.push(TypeError::NonTotalFunction {
                fn_name: fn_name.to_string(),
                span: name_span,
            });
            return;
        }

        if total && !self.ctx.unify_quiet(body_ty.clone(), ret.clone()) {
            let found = self.ctx.resolve(body_ty);
            let expected = self.ctx.resolve(ret);
            self.errors.push(TypeError::ReturnTypeMismatch {
                fn_name: fn_name.to_string(),
                expected,
                found,
                span: name_span,
            });
        }
    }

    fn bind_params(&mut self, params: Option<ParamList>) {
        let Some(list) = params else { return };
        for param in list.params() {
            let Some(name) = param.name() else { continue };
            let text = name.text();
            let span = name.syntax().text_range();
            let ty = param
                .ty()
                .map(|t| self.resolve_type(&t, &[]))
                .unwrap_or_else(|| self.ctx.fresh_var());
            if self
                .scope
                .declare(Symbol::new(text.clone(), SymbolKind::Variable, Scheme::mono(ty), span))
                .is_err()
            {
                self.errors.push(TypeError::ShadowedName { name: text, span });
            }
        }
    }

    /// Bind parameters to pre-resolved types (from the declared signature),
    /// avoiding a second resolution of the annotations.
    fn bind_params_with(&mut self, params: Option<ParamList>, tys: &[Ty]) {
        let Some(list) = params else { return };
        for (i, param) in list.params().enumerate() {
            let Some(name) = param.name() else { continue };
            let text = name.text();
            let span = name.syntax().text_range();
            let ty = tys
                .get(i)
                .cloned()
                .unwrap_or_else(|| self.ctx.fresh_var());
            if self
                .scope
                .declare(Symbol::new(text.clone(), SymbolKind::Variable, Scheme::mono(ty), span))
                .is_err()
            {
                self.errors.push(TypeError::ShadowedName { name: text, span });
            }
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn infer_expr(&mut self, expr: &Expr) -> Ty {
        let range = expr.syntax().text_range();
        let ty = match expr {
            Expr::Literal(lit) => self.infer_literal(lit),
            Expr::NameRef(name) => self.infer_name_ref(name),
            Expr::FieldAccess(access) => self.infer_field_access(access),
            Expr::Call(call) => self.infer_call(call),
            Expr::Lambda(lambda) => self.infer_lambda(lambda),
            Expr::If(if_expr) => self.infer_if(if_expr),
            Expr::Match(match_expr) => self.infer_match(match_expr),
            Expr::Binary(binary) => self.infer_binary(binary),
            Expr::Unary(unary) => self.infer_unary(unary),
            Expr::Pipe(pipe) => self.infer_pipe(pipe),
            Expr::Paren(paren) => match paren.inner() {
                Some(inner) => self.infer_expr(&inner),
                None => self.ctx.fresh_var(),
            },
            Expr::Block(block) => self.infer_block(block, true),
        };
        self.types.insert(range, ty.clone());
        ty
    }

    fn infer_literal(&mut self, lit: &mk_parser::ast::expr::Literal) -> Ty {
        use mk_parser::ast::expr::LiteralValue;
        match lit.value() {
            Some(LiteralValue::Int(_)) => Ty::int(),
            Some(LiteralValue::Str(_)) => Ty::string(),
            Some(LiteralValue::Bool(_)) => Ty::bool(),
            Some(LiteralValue::Unit) => Ty::unit(),
            None => self.ctx.fresh_var(),
        }
    }

    fn infer_name_ref(&mut self, name: &mk_parser::ast::expr::NameRef) -> Ty {
        let text = name.text();
        let span = name.syntax().text_range();
        match self.scope.lookup(&text) {
            Some(symbol) => {
                let scheme = symbol.scheme.clone();
                self.ctx.instantiate(&scheme)
            }
            None => {
                self.errors.push(TypeError::UnknownIdentifier {
                    name: text,
                    span,
                });
                self.ctx.fresh_var()
            }
        }
    }

    /// Resolve `base.name` where `base` is an import binding. Returns
    /// `None` when the access is an ordinary record field access.
    fn qualified_target(
        &self,
        access: &mk_parser::ast::expr::FieldAccess,
    ) -> Option<(String, String)> {
        let base = access.base()?;
        let Expr::NameRef(base_name) = base else {
            return None;
        };
        let module = self.module_bindings.get(&base_name.text())?;
        let field = access.field_name()?;
        Some((module.clone(), field))
    }

    fn infer_field_access(&mut self, access: &mk_parser::ast::expr::FieldAccess) -> Ty {
        let span = access.syntax().text_range();

        if let Some((module, name)) = self.qualified_target(access) {
            self.qualified_refs
                .insert(span, (module.clone(), name.clone()));
            return self.lookup_qualified(&module, &name, span);
        }

        let Some(base) = access.base() else {
            return self.ctx.fresh_var();
        };
        let base_ty = self.infer_expr(&base);
        let resolved = self.ctx.resolve(base_ty);
        let Some(field) = access.field_name() else {
            return self.ctx.fresh_var();
        };

        if let Some(head) = resolved.head_name() {
            if let Some(def) = self.registry.lookup(head) {
                if let TypeDefKind::Record { fields } = &def.kind {
                    let mapping = self.generic_mapping(def, &resolved);
                    if let Some((_, field_ty)) =
                        fields.iter().find(|(name, _)| *name == field)
                    {
                        return field_ty.substitute_params(&mapping);
                    }
                }
            }
        }

        self.errors.push(TypeError::NoSuchField {
            ty: resolved,
            field,
            span,
        });
        self.ctx.fresh_var()
    }

    /// Look up an exported symbol of a dependency module.
    fn lookup_qualified(&mut self, module: &str, name: &str, span: TextRange) -> Ty {
        let Some(exports) = self.imports.modules.get(module) else {
            // The resolver already reported the missing module.
            return self.ctx.fresh_var();
        };
        let scheme = exports
            .functions
            .get(name)
            .or_else(|| exports.constructors.get(name))
            .cloned();
        match scheme {
            Some(scheme) => self.ctx.instantiate(&scheme),
            None => {
                self.errors.push(TypeError::NotExported {
                    module: module.to_string(),
                    name: name.to_string(),
                    span,
                });
                self.ctx.fresh_var()
            }
        }
    }

    /// Zip a resolved `App` type's arguments against the definition's
    /// generic parameters, yielding a substitution mapping.
    fn generic_mapping(&self, def: &TypeDefInfo, resolved: &Ty) -> Vec<(String, Ty)> {
        match resolved {
            Ty::App(_, args) => def
                .generic_params
                .iter()
                .cloned()
                .zip(args.iter().cloned())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn infer_call(&mut self, call: &mk_parser::ast::expr::CallExpr) -> Ty {
        let span = call.syntax().text_range();
        let args = call
            .arg_list()
            .map(|l| l.args())
            .unwrap_or_default();

        // Record construction and constructor application are recognized
        // by what the callee name resolves to.
        if let Some(Expr::NameRef(name)) = call.callee() {
            let text = name.text();
            let symbol_kind = self.scope.lookup(&text).map(|s| s.kind);
            match symbol_kind {
                Some(SymbolKind::Type) => {
                    let callee_range = name.syntax().text_range();
                    self.types.insert(callee_range, Ty::unit());
                    return self.infer_record_construction(&text, &args, span);
                }
                Some(SymbolKind::Constructor) => {
                    let scheme = self
                        .scope
                        .lookup(&text)
                        .map(|s| s.scheme.clone())
                        .unwrap_or_else(|| Scheme::mono(Ty::unit()));
                    let ctor_ty = self.ctx.instantiate(&scheme);
                    let callee_range = name.syntax().text_range();
                    self.types.insert(callee_range, ctor_ty.clone());
                    return self.apply_constructor(&text, ctor_ty, &args, span);
                }
                _ => {}
            }
        }

        // A qualified callee may also be a dependency's record type.
        if let Some(Expr::FieldAccess(access)) = call.callee() {
            if let Some((module, name)) = self.qualified_target(&access) {
                if let Some(exports) = self.imports.modules.get(&module) {
                    if exports.types.contains_key(&name) {
                        let def = exports.types.get(&name).cloned();
                        if let Some(def) = def {
                            if matches!(def.kind, TypeDefKind::Record { .. }) {
                                self.qualified_refs.insert(
                                    access.syntax().text_range(),
                                    (module, name.clone()),
                                );
                                return self
                                    .infer_record_construction_with(&def, &args, span);
                            }
                        }
                    }
                }
            }
        }

        let Some(callee) = call.callee() else {
            return self.ctx.fresh_var();
        };
        let callee_ty = self.infer_expr(&callee);
        self.apply_function(callee_ty, &args, span)
    }

    /// Apply a general function value to positional arguments.
    fn apply_function(&mut self, callee_ty: Ty, args: &[Arg], span: TextRange) -> Ty {
        let resolved = self.ctx.resolve(callee_ty);
        match resolved {
            Ty::Fun(params, ret, _) => {
                if params.len() != args.len() {
                    self.errors.push(TypeError::ArityMismatch {
                        expected: params.len(),
                        found: args.len(),
                        span,
                    });
                    // Still walk the arguments for their own errors.
                    for arg in args {
                        self.infer_arg_value(arg);
                    }
                    return *ret;
                }
                for (param_ty, arg) in params.iter().zip(args) {
                    match arg {
                        Arg::Positional(value) => {
                            let value_span = value.syntax().text_range();
                            let value_ty = self.infer_expr(value);
                            self.ctx.unify(param_ty.clone(), value_ty, value_span);
                        }
                        Arg::Named(named) => {
                            self.errors.push(TypeError::NamedConstructorArgs {
                                name: named
                                    .name()
                                    .map(|n| n.text())
                                    .unwrap_or_default(),
                                span: named.syntax().text_range(),
                            });
                            if let Some(value) = named.value() {
                                self.infer_expr(&value);
                            }
                        }
                    }
                }
                *ret
            }
            Ty::Var(_) => {
                // Bind the unknown callee to a fresh function shape.
                let param_vars: Vec<Ty> =
                    args.iter().map(|_| self.ctx.fresh_var()).collect();
                let ret = self.ctx.fresh_var();
                let shape = Ty::fun(param_vars.clone(), ret.clone());
                self.ctx.unify(resolved, shape, span);
                for (param_ty, arg) in param_vars.iter().zip(args) {
                    if let Arg::Positional(value) = arg {
                        let value_span = value.syntax().text_range();
                        let value_ty = self.infer_expr(value);
                        self.ctx.unify(param_ty.clone(), value_ty, value_span);
                    }
                }
                ret
            }
            other => {
                self.errors.push(TypeError::NotAFunction { found: other, span });
                for arg in args {
                    self.infer_arg_value(arg);
                }
                self.ctx.fresh_var()
            }
        }
    }

    fn infer_arg_value(&mut self, arg: &Arg) {
        match arg {
            Arg::Positional(value) => {
                self.infer_expr(value);
            }
            Arg::Named(named) => {
                if let Some(value) = named.value() {
                    self.infer_expr(&value);
                }
            }
        }
    }

    /// Apply a union constructor to positional arguments.
    fn apply_constructor(
        &mut self,
        name: &str,
        ctor_ty: Ty,
        args: &[Arg],
        span: TextRange,
    ) -> Ty {
        if args
            .iter()
            .any(|a| matches!(a, Arg::Named(_)))
        {
            self.errors.push(TypeError::NamedConstructorArgs {
                name: name.to_string(),
                span,
            });
            for arg in args {
                self.infer_arg_value(arg);
            }
            return self.ctx.fresh_var();
        }
        self.apply_function(ctor_ty, args, span)
    }

    /// Construct a record from named arguments.
    fn infer_record_construction(&mut self, name: &str, args: &[Arg], span: TextRange) -> Ty {
        let Some(def) = self.registry.lookup(name).cloned() else {
            self.errors.push(TypeError::UnknownType {
                name: name.to_string(),
                span,
            });
            return self.ctx.fresh_var();
        };
        if !matches!(def.kind, TypeDefKind::Record { .. }) {
            self.errors.push(TypeError::NotAFunction {
                found: Ty::Con(TyCon::new(name)),
                span,
            });
            for arg in args {
                self.infer_arg_value(arg);
            }
            return self.ctx.fresh_var();
        }
        self.infer_record_construction_with(&def, args, span)
    }

    fn infer_record_construction_with(
        &mut self,
        def: &TypeDefInfo,
        args: &[Arg],
        span: TextRange,
    ) -> Ty {
        let TypeDefKind::Record { fields } = &def.kind else {
            return self.ctx.fresh_var();
        };

        let type_args: Vec<Ty> = def
            .generic_params
            .iter()
            .map(|_| self.ctx.fresh_var())
            .collect();
        let mapping: Vec<(String, Ty)> = def
            .generic_params
            .iter()
            .cloned()
            .zip(type_args.iter().cloned())
            .collect();

        let mut seen: Vec<String> = Vec::new();
        for arg in args {
            match arg {
                Arg::Named(named) => {
                    let Some(field_name) = named.name().map(|n| n.text()) else {
                        continue;
                    };
                    let named_span = named.syntax().text_range();
                    match fields.iter().find(|(n, _)| *n == field_name) {
                        Some((_, field_ty)) => {
                            seen.push(field_name);
                            if let Some(value) = named.value() {
                                let value_span = value.syntax().text_range();
                                let value_ty = self.infer_expr(&value);
                                let expected = field_ty.substitute_params(&mapping);
                                self.ctx.unify(expected, value_ty, value_span);
                            }
                        }
                        None => {
                            self.errors.push(TypeError::UnknownField {
                                type_name: def.name.clone(),
                                field: field_name,
                                span: named_span,
                            });
                            if let Some(value) = named.value() {
                                self.infer_expr(&value);
                            }
                        }
                    }
                }
                Arg::Positional(value) => {
                    self.errors.push(TypeError::PositionalRecordArgs {
                        type_name: def.name.clone(),
                        span: value.syntax().text_range(),
                    });
                    self.infer_expr(value);
                }
            }
        }
        for (field_name, _) in fields {
            if !seen.contains(field_name) {
                self.errors.push(TypeError::MissingField {
                    type_name: def.name.clone(),
                    field: field_name.clone(),
                    span,
                });
            }
        }

        if def.generic_params.is_empty() {
            Ty::Con(TyCon::new(&def.name))
        } else {
            Ty::App(Box::new(Ty::Con(TyCon::new(&def.name))), type_args)
        }
    }

    fn infer_lambda(&mut self, lambda: &mk_parser::ast::expr::LambdaExpr) -> Ty {
        self.scope.push_scope();
        self.bind_params(lambda.param_list());
        let param_tys = self.param_types_of_bound(lambda.param_list());
        let body_ty = match lambda.body() {
            Some(body) => self.infer_expr(&body),
            None => self.ctx.fresh_var(),
        };
        self.scope.pop_scope();
        // Lambda values are always pure; the effect analyzer enforces the
        // body's purity separately.
        Ty::fun(param_tys, body_ty)
    }

    /// The parameter types as bound in the current scope (after
    /// `bind_params`), in declaration order.
    fn param_types_of_bound(&mut self, params: Option<ParamList>) -> Vec<Ty> {
        let Some(list) = params else {
            return Vec::new();
        };
        list.params()
            .map(|p| {
                let name = p.name().map(|n| n.text()).unwrap_or_default();
                self.scope
                    .lookup(&name)
                    .map(|s| s.scheme.ty.clone())
                    .unwrap_or_else(|| self.ctx.fresh_var())
            })
            .collect()
    }

    fn infer_if(&mut self, if_expr: &mk_parser::ast::expr::IfExpr) -> Ty {
        let span = if_expr.syntax().text_range();

        if let Some(cond) = if_expr.condition() {
            let cond_span = cond.syntax().text_range();
            let cond_ty = self.infer_expr(&cond);
            if !self.ctx.unify_quiet(cond_ty.clone(), Ty::bool()) {
                let found = self.ctx.resolve(cond_ty);
                self.errors.push(TypeError::ConditionNotBool {
                    found,
                    span: cond_span,
                });
            }
        }

        let then_ty = match if_expr.then_block() {
            Some(block) => {
                let ty = self.infer_block(&block, true);
                self.types
                    .insert(AstNode::syntax(&block).text_range(), ty.clone());
                ty
            }
            None => self.ctx.fresh_var(),
        };

        match if_expr.else_branch().and_then(|b| b.body()) {
            Some(else_body) => {
                let else_ty = self.infer_expr(&else_body);
                self.ctx.unify(then_ty.clone(), else_ty, span);
            }
            None => {
                // Missing else was already a parse error (E1006).
            }
        }

        then_ty
    }

    fn infer_match(&mut self, match_expr: &mk_parser::ast::expr::MatchExpr) -> Ty {
        let span = match_expr.syntax().text_range();

        let scrutinee_ty = match match_expr.scrutinee() {
            Some(scrutinee) => self.infer_expr(&scrutinee),
            None => self.ctx.fresh_var(),
        };
        let resolved = self.ctx.resolve(scrutinee_ty);

        let union_def = resolved
            .head_name()
            .and_then(|head| self.registry.lookup(head))
            .filter(|def| matches!(def.kind, TypeDefKind::Union { .. }))
            .cloned();

        if union_def.is_none() {
            self.errors.push(TypeError::NonAdtScrutinee {
                found: resolved.clone(),
                span,
            });
        }
        let mapping = union_def
            .as_ref()
            .map(|def| self.generic_mapping(def, &resolved))
            .unwrap_or_default();

        let mut result_ty: Option<Ty> = None;
        for arm in match_expr.arms() {
            self.scope.push_scope();
            if let Some(Pattern::Constructor(ctor)) = arm.pattern() {
                self.bind_constructor_pattern(&ctor, union_def.as_ref(), &mapping);
            }
            let body_ty = match arm.body() {
                Some(body) => self.infer_expr(&body),
                None => self.ctx.fresh_var(),
            };
            self.scope.pop_scope();

            match &result_ty {
                None => result_ty = Some(body_ty),
                Some(expected) => {
                    if !self.ctx.unify_quiet(expected.clone(), body_ty.clone()) {
                        let expected = self.ctx.resolve(expected.clone());
                        let found = self.ctx.resolve(body_ty);
                        let arm_span = arm.syntax().text_range();
                        self.errors.push(TypeError::ArmTypeMismatch {
                            expected,
                            found,
                            span: arm_span,
                        });
                    }
                }
            }
        }

        result_ty.unwrap_or_else(|| self.ctx.fresh_var())
    }

    /// Bind a constructor pattern's sub-patterns to the variant's field
    /// types, substituted with the scrutinee's type arguments.
    fn bind_constructor_pattern(
        &mut self,
        ctor: &mk_parser::ast::pat::ConstructorPat,
        union_def: Option<&TypeDefInfo>,
        mapping: &[(String, Ty)],
    ) {
        let Some(name) = ctor.name() else { return };
        let ctor_name = name.text();
        let span = name.syntax().text_range();

        let variant = union_def.and_then(|def| match &def.kind {
            TypeDefKind::Union { variants } => {
                variants.iter().find(|v| v.name == ctor_name).cloned()
            }
            _ => None,
        });

        let Some(variant) = variant else {
            if let Some(def) = union_def {
                self.errors.push(TypeError::NotAConstructorOf {
                    name: ctor_name,
                    type_name: def.name.clone(),
                    span,
                });
            }
            // Bind sub-patterns to fresh vars to limit cascades.
            for sub in ctor.sub_patterns() {
                if let SubPattern::Binding(binding) = sub {
                    let text = binding.text();
                    let fresh = self.ctx.fresh_var();
                    let sub_span = AstNode::syntax(&binding).text_range();
                    let _ = self.scope.declare(Symbol::new(
                        text,
                        SymbolKind::Variable,
                        Scheme::mono(fresh),
                        sub_span,
                    ));
                }
            }
            return;
        };

        let subs = ctor.sub_patterns();
        if subs.len() != variant.fields.len() {
            self.errors.push(TypeError::ArityMismatch {
                expected: variant.fields.len(),
                found: subs.len(),
                span,
            });
        }
        for (sub, (_, field_ty)) in subs.iter().zip(&variant.fields) {
            if let SubPattern::Binding(binding) = sub {
                let text = binding.text();
                let sub_span = AstNode::syntax(binding).text_range();
                let bound = field_ty.substitute_params(mapping);
                if self
                    .scope
                    .declare(Symbol::new(
                        text.clone(),
                        SymbolKind::Variable,
                        Scheme::mono(bound),
                        sub_span,
                    ))
                    .is_err()
                {
                    self.errors.push(TypeError::ShadowedName {
                        name: text,
                        span: sub_span,
                    });
                }
            }
        }
    }

    fn infer_binary(&mut self, binary: &mk_parser::ast::expr::BinaryExpr) -> Ty {
        let span = binary.syntax().text_range();
        let op = binary.op().map(|t| t.kind());

        let lhs_ty = match binary.lhs() {
            Some(lhs) => self.infer_expr(&lhs),
            None => self.ctx.fresh_var(),
        };
        let rhs_ty = match binary.rhs() {
            Some(rhs) => self.infer_expr(&rhs),
            None => self.ctx.fresh_var(),
        };

        match op {
            Some(SyntaxKind::PLUS) => {
                // `+` is Int addition, and also String concatenation when
                // both sides are Strings.
                let l = self.ctx.resolve(lhs_ty.clone());
                let r = self.ctx.resolve(rhs_ty.clone());
                if l.head_name() == Some("String") || r.head_name() == Some("String") {
                    self.ctx.unify(Ty::string(), lhs_ty, span);
                    self.ctx.unify(Ty::string(), rhs_ty, span);
                    Ty::string()
                } else {
                    self.ctx.unify(Ty::int(), lhs_ty, span);
                    self.ctx.unify(Ty::int(), rhs_ty, span);
                    Ty::int()
                }
            }
            Some(
                SyntaxKind::MINUS | SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT,
            ) => {
                self.ctx.unify(Ty::int(), lhs_ty, span);
                self.ctx.unify(Ty::int(), rhs_ty, span);
                Ty::int()
            }
            Some(
                SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ,
            ) => {
                let l = self.ctx.resolve(lhs_ty.clone());
                let r = self.ctx.resolve(rhs_ty.clone());
                let l_head = l.head_name().map(str::to_string);
                let r_head = r.head_name().map(str::to_string);
                let is_ok = |h: &Option<String>| {
                    matches!(h.as_deref(), Some("Int") | Some("String") | None)
                };
                if !is_ok(&l_head) || !is_ok(&r_head) {
                    self.errors.push(TypeError::BadComparison {
                        left: l,
                        right: r,
                        span,
                    });
                } else if l_head.as_deref() == Some("String")
                    || r_head.as_deref() == Some("String")
                {
                    self.ctx.unify(Ty::string(), lhs_ty, span);
                    self.ctx.unify(Ty::string(), rhs_ty, span);
                } else {
                    self.ctx.unify(Ty::int(), lhs_ty, span);
                    self.ctx.unify(Ty::int(), rhs_ty, span);
                }
                Ty::bool()
            }
            Some(SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ) => {
                self.ctx.unify(lhs_ty.clone(), rhs_ty, span);
                let resolved = self.ctx.resolve(lhs_ty);
                if resolved.contains_fn() {
                    self.errors.push(TypeError::NotComparable {
                        found: resolved,
                        span,
                    });
                }
                Ty::bool()
            }
            Some(SyntaxKind::AMP_AMP | SyntaxKind::PIPE_PIPE) => {
                self.ctx.unify(Ty::bool(), lhs_ty, span);
                self.ctx.unify(Ty::bool(), rhs_ty, span);
                Ty::bool()
            }
            _ => self.ctx.fresh_var(),
        }
    }

    fn infer_unary(&mut self, unary: &mk_parser::ast::expr::UnaryExpr) -> Ty {
        let span = unary.syntax().text_range();
        let operand_ty = match unary.operand() {
            Some(operand) => self.infer_expr(&operand),
            None => self.ctx.fresh_var(),
        };
        match unary.op().map(|t| t.kind()) {
            Some(SyntaxKind::MINUS) => {
                self.ctx.unify(Ty::int(), operand_ty, span);
                Ty::int()
            }
            Some(SyntaxKind::BANG) => {
                self.ctx.unify(Ty::bool(), operand_ty, span);
                Ty::bool()
            }
            _ => self.ctx.fresh_var(),
        }
    }

    fn infer_pipe(&mut self, pipe: &mk_parser::ast::expr::PipeExpr) -> Ty {
        let span = pipe.syntax().text_range();
        let lhs_ty = match pipe.lhs() {
            Some(lhs) => self.infer_expr(&lhs),
            None => self.ctx.fresh_var(),
        };
        let rhs_ty = match pipe.rhs() {
            Some(rhs) => self.infer_expr(&rhs),
            None => self.ctx.fresh_var(),
        };

        let resolved = self.ctx.resolve(rhs_ty.clone());
        match resolved {
            Ty::Fun(params, ret, _) => {
                if params.len() != 1 {
                    self.errors.push(TypeError::ArityMismatch {
                        expected: params.len(),
                        found: 1,
                        span,
                    });
                    return *ret;
                }
                self.ctx.unify(params[0].clone(), lhs_ty, span);
                *ret
            }
            Ty::Var(_) => {
                let ret = self.ctx.fresh_var();
                let shape = Ty::fun(vec![lhs_ty], ret.clone());
                self.ctx.unify(resolved, shape, span);
                ret
            }
            other => {
                self.errors.push(TypeError::NotAFunction { found: other, span });
                self.ctx.fresh_var()
            }
        }
    }

    /// Infer a block. `own_scope` is false for function bodies, whose
    /// parameters already live in the scope pushed by the caller.
    fn infer_block(&mut self, block: &Block, own_scope: bool) -> Ty {
        if own_scope {
            self.scope.push_scope();
        }

        for stmt in block.statements() {
            match stmt {
                Stmt::Let(let_stmt) => self.infer_let(&let_stmt),
                Stmt::Expr(expr_stmt) => {
                    if let Some(expr) = expr_stmt.expr() {
                        self.infer_expr(&expr);
                    }
                }
            }
        }

        let ty = match block.tail_expr() {
            Some(tail) => self.infer_expr(&tail),
            None => Ty::unit(),
        };

        if own_scope {
            self.scope.pop_scope();
        }
        self.types
            .insert(AstNode::syntax(block).text_range(), ty.clone());
        ty
    }

    fn infer_let(&mut self, let_stmt: &mk_parser::ast::expr::LetStmt) {
        let value_ty = match let_stmt.value() {
            Some(value) => self.infer_expr(&value),
            None => self.ctx.fresh_var(),
        };

        let bound_ty = match let_stmt.ty().and_then(|t| t.ty()) {
            Some(annotation) => {
                let declared = self.resolve_type(&annotation, &[]);
                let span = let_stmt
                    .value()
                    .map(|v| v.syntax().text_range())
                    .unwrap_or_else(|| let_stmt.syntax().text_range());
                self.ctx.unify(declared.clone(), value_ty, span);
                declared
            }
            None => value_ty,
        };

        let Some(name) = let_stmt.name() else { return };
        let text = name.text();
        let span = name.syntax().text_range();
        if self
            .scope
            .declare(Symbol::new(
                text.clone(),
                SymbolKind::Variable,
                Scheme::mono(bound_ty),
                span,
            ))
            .is_err()
        {
            self.errors.push(TypeError::ShadowedName { name: text, span });
        }
    }

    // ── Type resolution ─────────────────────────────────────────────────

    /// Resolve a syntactic type reference to a `Ty`. `generic_env` holds
    /// the generic parameter names in scope inside a type definition.
    fn resolve_type(&mut self, type_ref: &TypeRef, generic_env: &[String]) -> Ty {
        match type_ref {
            TypeRef::Path(path) => {
                let span = AstNode::syntax(path).text_range();
                let segments = path
                    .path()
                    .map(|p| p.segments())
                    .unwrap_or_default();
                match segments.as_slice() {
                    [single] => self.resolve_type_name(single, generic_env, span),
                    [module_binding, type_name] => {
                        self.resolve_qualified_type(module_binding, type_name, span)
                    }
                    _ => {
                        self.errors.push(TypeError::UnknownType {
                            name: path.text(),
                            span,
                        });
                        self.ctx.fresh_var()
                    }
                }
            }
            TypeRef::Generic(generic) => {
                let span = AstNode::syntax(generic).text_range();
                let name = generic.name();
                let args: Vec<Ty> = generic
                    .args()
                    .iter()
                    .map(|a| self.resolve_type(a, generic_env))
                    .collect();
                match self.registry.lookup(&name) {
                    Some(def) => {
                        if def.generic_params.len() != args.len() {
                            self.errors.push(TypeError::TypeArityMismatch {
                                name: name.clone(),
                                expected: def.generic_params.len(),
                                found: args.len(),
                                span,
                            });
                        }
                        Ty::App(Box::new(Ty::Con(TyCon::new(&name))), args)
                    }
                    None => {
                        self.errors.push(TypeError::UnknownType { name, span });
                        self.ctx.fresh_var()
                    }
                }
            }
            TypeRef::Fn(fn_type) => {
                let params: Vec<Ty> = fn_type
                    .param_types()
                    .iter()
                    .map(|t| self.resolve_type(t, generic_env))
                    .collect();
                let ret = fn_type
                    .return_type()
                    .map(|t| self.resolve_type(&t, generic_env))
                    .unwrap_or_else(Ty::unit);
                let effects = self.declared_effects(fn_type.uses_clause());
                Ty::fun_with_effects(params, ret, effects)
            }
        }
    }

    fn resolve_type_name(&mut self, name: &str, generic_env: &[String], span: TextRange) -> Ty {
        if generic_env.iter().any(|p| p == name) {
            // Generic parameter placeholder inside a type definition.
            return Ty::Con(TyCon::new(name));
        }
        match self.registry.lookup(name) {
            Some(def) => {
                if !def.generic_params.is_empty() {
                    self.errors.push(TypeError::TypeArityMismatch {
                        name: name.to_string(),
                        expected: def.generic_params.len(),
                        found: 0,
                        span,
                    });
                }
                Ty::Con(TyCon::new(name))
            }
            None => {
                self.errors.push(TypeError::UnknownType {
                    name: name.to_string(),
                    span,
                });
                self.ctx.fresh_var()
            }
        }
    }

    fn resolve_qualified_type(
        &mut self,
        module_binding: &str,
        type_name: &str,
        span: TextRange,
    ) -> Ty {
        let Some(module) = self.module_bindings.get(module_binding).cloned() else {
            self.errors.push(TypeError::UnknownType {
                name: format!("{module_binding}.{type_name}"),
                span,
            });
            return self.ctx.fresh_var();
        };
        let Some(exports) = self.imports.modules.get(&module) else {
            return self.ctx.fresh_var();
        };
        if let Some(def) = exports.types.get(type_name) {
            // Type identity is the bare name; the registry learns the
            // imported definition so matches and field accesses work.
            if self.registry.lookup(type_name).is_none() {
                self.registry.register(def.clone());
            }
            Ty::Con(TyCon::new(type_name))
        } else {
            self.errors.push(TypeError::NotExported {
                module,
                name: type_name.to_string(),
                span,
            });
            self.ctx.fresh_var()
        }
    }

    // ── Exports ─────────────────────────────────────────────────────────

    fn build_exports(&mut self, module_path: Option<&str>, items: &[Item]) -> ModuleExports {
        let mut exports = ModuleExports {
            module_name: module_path.unwrap_or_default().to_string(),
            functions: FxHashMap::default(),
            constructors: FxHashMap::default(),
            types: FxHashMap::default(),
            effects: self.known_effects.clone(),
        };
        for item in items {
            match item {
                Item::Fn(def) if def.is_pub() => {
                    if let Some(name) = def.name() {
                        let text = name.text();
                        if let Some(symbol) = self.scope.lookup(&text) {
                            exports.functions.insert(text, symbol.scheme.clone());
                        }
                    }
                }
                Item::Type(def) if def.is_pub() => {
                    if let Some(name) = def.name() {
                        let text = name.text();
                        if let Some(info) = self.registry.lookup(&text) {
                            exports.types.insert(text.clone(), info.clone());
                        }
                        // Exported unions bring their constructors along.
                        if let Some(TypeDefKind::Union { variants }) =
                            self.registry.lookup(&text).map(|d| d.kind.clone())
                        {
                            for variant in variants {
                                if let Some(symbol) = self.scope.lookup(&variant.name) {
                                    exports
                                        .constructors
                                        .insert(variant.name.clone(), symbol.scheme.clone());
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        exports
    }
}

/// Flatten a file into groups of items: the loose declarations (keyed
/// `None`) plus one group per `module` block.
fn collect_groups(file: &SourceFile) -> Vec<(Option<String>, Vec<Item>)> {
    let mut loose = Vec::new();
    let mut groups = Vec::new();
    for item in file.items() {
        match item {
            Item::Module(module) => {
                let path = module.path().map(|p| p.text());
                let items: Vec<Item> = module.items().collect();
                groups.push((path, items));
            }
            other => loose.push(other),
        }
    }
    let mut result = vec![(None, loose)];
    result.append(&mut groups);
    result
}

// ── Totality ───────────────────────────────────────────────────────────

/// Whether every control path through the block produces a value.
pub(crate) fn block_is_total(block: &Block) -> bool {
    match block.tail_expr() {
        Some(tail) => expr_is_total(&tail),
        None => false,
    }
}

fn expr_is_total(expr: &Expr) -> bool {
    match expr {
        Expr::If(if_expr) => {
            let then_total = if_expr
                .then_block()
                .map(|b| block_is_total(&b))
                .unwrap_or(false);
            let else_total = if_expr
                .else_branch()
                .and_then(|b| b.body())
                .map(|e| match &e {
                    Expr::Block(block) => block_is_total(block),
                    other => expr_is_total(other),
                })
                .unwrap_or(false);
            then_total && else_total
        }
        Expr::Match(match_expr) => {
            let arms = match_expr.arms();
            !arms.is_empty()
                && arms.iter().all(|arm| {
                    arm.body()
                        .map(|body| match &body {
                            Expr::Block(block) => block_is_total(block),
                            other => expr_is_total(other),
                        })
                        .unwrap_or(false)
                })
        }
        Expr::Block(block) => block_is_total(block),
        Expr::Paren(paren) => paren
            .inner()
            .map(|inner| expr_is_total(&inner))
            .unwrap_or(false),
        // Literals, names, calls, lambdas, and operators all yield values.
        _ => true,
    }
}
