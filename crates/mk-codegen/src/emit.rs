//! The JavaScript emitter.
//!
//! Lowers a checked file to the restricted JS subset: function
//! declarations, `const` bindings, `if/else`, object literals, strict
//! equality, and explicit `return`. Nothing else -- in particular no
//! `var`, `let`, `class`, `this`, `throw`, `try`, `null`, or `undefined`
//! ever appears in the output.
//!
//! Evaluation order matches the source: arguments left-to-right, pipe
//! stages left-to-right, a match scrutinee exactly once, match arms
//! top-to-bottom. Every walk is in source order, so emission is
//! deterministic byte-for-byte.

use std::fmt::Write;

use mk_parser::ast::expr::{Arg, Block, Expr, LiteralValue, Stmt};
use mk_parser::ast::item::{ApiRoute, FnDef, Item, SourceFile};
use mk_parser::ast::pat::{Pattern, SubPattern};
use mk_parser::ast::AstNode;
use mk_parser::syntax_kind::SyntaxKind;
use mk_typeck::registry::TypeDefKind;
use mk_typeck::ty::Ty;
use mk_typeck::TypeckResult;

/// JS reserved words (plus `eval`/`arguments`, restricted in strict
/// mode). Source identifiers that collide get a trailing underscore.
const JS_RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Rename identifiers that shadow a JS reserved word.
pub(crate) fn sanitize(name: &str) -> String {
    if JS_RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// JSON-style string escaping.
pub(crate) fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) struct JsEmitter<'a> {
    typeck: &'a TypeckResult,
    out: String,
}

impl<'a> JsEmitter<'a> {
    pub(crate) fn new(typeck: &'a TypeckResult) -> Self {
        JsEmitter {
            typeck,
            out: String::new(),
        }
    }

    /// Emit the whole module: prologue, then functions, then route
    /// registrations, in source order.
    pub(crate) fn emit_file(
        mut self,
        file: &SourceFile,
        language_version: &str,
        stdlib_version: &str,
        effects_hash: &str,
        effects_list: &[String],
    ) -> String {
        self.out.push_str("\"use strict\";\n");
        let list = effects_list
            .iter()
            .map(|e| escape_string(e))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            self.out,
            "const __meta = {{ languageVersion: {}, stdlibVersion: {}, effectsHash: {}, effectsList: [{}] }};",
            escape_string(language_version),
            escape_string(stdlib_version),
            escape_string(effects_hash),
            list,
        );

        let items = flatten_items(file);
        for item in &items {
            if let Item::Fn(def) = item {
                self.emit_fn(def);
            }
        }
        for item in &items {
            if let Item::Api(route) = item {
                self.emit_route(route);
            }
        }

        self.out
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn emit_fn(&mut self, def: &FnDef) {
        let Some(name) = def.name() else { return };
        let Some(body) = def.body() else { return };

        let mut params: Vec<String> = def
            .param_list()
            .map(|list| {
                list.params()
                    .filter_map(|p| p.name())
                    .map(|n| sanitize(&n.text()))
                    .collect()
            })
            .unwrap_or_default();
        let effectful = def
            .uses_clause()
            .map(|c| !c.effects().is_empty())
            .unwrap_or(false);
        if effectful {
            params.push("__effects".to_string());
        }

        self.out.push('\n');
        let _ = writeln!(
            self.out,
            "function {}({}) {{",
            sanitize(&name.text()),
            params.join(", ")
        );
        self.emit_block_body(&body, 1);
        self.out.push_str("}\n");
    }

    fn emit_route(&mut self, route: &ApiRoute) {
        let Some(body) = route.body() else { return };
        let method = route.method().unwrap_or_default();
        let path = route.path().unwrap_or_default();

        let mut params: Vec<String> = route
            .param_list()
            .map(|list| {
                list.params()
                    .filter_map(|p| p.name())
                    .map(|n| sanitize(&n.text()))
                    .collect()
            })
            .unwrap_or_default();
        // Routes are entry points: the runtime always passes the injected
        // capabilities record, declared or not.
        params.push("__effects".to_string());

        self.out.push('\n');
        let _ = writeln!(
            self.out,
            "__router.register({}, {}, function {}({}) {{",
            escape_string(&method),
            escape_string(&path),
            route.handler_name(),
            params.join(", ")
        );
        self.emit_block_body(&body, 1);
        self.out.push_str("});\n");
    }

    // ── Blocks and statements ───────────────────────────────────────────

    /// Emit a block's statements and its `return`. A block without a tail
    /// expression returns the unit value explicitly.
    fn emit_block_body(&mut self, block: &Block, indent: usize) {
        let pad = "  ".repeat(indent);
        for stmt in block.statements() {
            match stmt {
                Stmt::Let(let_stmt) => {
                    let name = let_stmt
                        .name()
                        .map(|n| sanitize(&n.text()))
                        .unwrap_or_default();
                    let value = let_stmt
                        .value()
                        .map(|v| self.expr_js(&v, indent))
                        .unwrap_or_default();
                    let _ = writeln!(self.out, "{pad}const {name} = {value};");
                }
                Stmt::Expr(expr_stmt) => {
                    if let Some(expr) = expr_stmt.expr() {
                        let value = self.expr_js(&expr, indent);
                        let _ = writeln!(self.out, "{pad}{value};");
                    }
                }
            }
        }
        match block.tail_expr() {
            Some(tail) => {
                let value = self.expr_js(&tail, indent);
                let _ = writeln!(self.out, "{pad}return {value};");
            }
            None => {
                let _ = writeln!(self.out, "{pad}return {};", unit_value());
            }
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn expr_js(&mut self, expr: &Expr, indent: usize) -> String {
        match expr {
            Expr::Literal(lit) => match lit.value() {
                Some(LiteralValue::Int(value)) => value.to_string(),
                Some(LiteralValue::Str(value)) => escape_string(&value),
                Some(LiteralValue::Bool(value)) => value.to_string(),
                Some(LiteralValue::Unit) | None => unit_value().to_string(),
            },

            Expr::NameRef(name) => {
                let text = name.text();
                // A bare constructor reference is a value: nullary
                // constructors are their tagged object, constructors with
                // fields become a constructor function.
                if let Some((_, variant)) = self.typeck.registry.lookup_constructor(&text) {
                    return self.constructor_value(&text, &variant.fields.clone());
                }
                sanitize(&text)
            }

            Expr::FieldAccess(access) => {
                let range = access.syntax().text_range();
                if let Some((_, name)) = self.typeck.qualified_refs.get(&range) {
                    // Module-qualified reference: identifiers are unchanged
                    // across module boundaries.
                    return sanitize(name);
                }
                let base = access
                    .base()
                    .map(|b| self.expr_js(&b, indent))
                    .unwrap_or_default();
                let field = access
                    .field_name()
                    .map(|f| sanitize(&f))
                    .unwrap_or_default();
                format!("{base}.{field}")
            }

            Expr::Call(call) => self.call_js(call, indent),

            Expr::Lambda(lambda) => {
                let params: Vec<String> = lambda
                    .param_list()
                    .map(|list| {
                        list.params()
                            .filter_map(|p| p.name())
                            .map(|n| sanitize(&n.text()))
                            .collect()
                    })
                    .unwrap_or_default();
                let body = lambda
                    .body()
                    .map(|b| self.expr_js(&b, indent))
                    .unwrap_or_default();
                format!("function ({}) {{ return {}; }}", params.join(", "), body)
            }

            Expr::If(if_expr) => self.if_js(if_expr, indent),
            Expr::Match(match_expr) => self.match_js(match_expr, indent),

            Expr::Binary(binary) => self.binary_js(binary, indent),

            Expr::Unary(unary) => {
                let op = match unary.op().map(|t| t.kind()) {
                    Some(SyntaxKind::BANG) => "!",
                    _ => "-",
                };
                let operand = unary
                    .operand()
                    .map(|o| self.expr_js(&o, indent))
                    .unwrap_or_default();
                format!("({op}{operand})")
            }

            Expr::Pipe(pipe) => {
                // `a |> f` is exactly `f(a)`.
                let value = pipe
                    .lhs()
                    .map(|l| self.expr_js(&l, indent))
                    .unwrap_or_default();
                let Some(rhs) = pipe.rhs() else {
                    return value;
                };
                let callee = self.callee_js(&rhs, indent);
                let mut args = vec![value];
                if self.is_effectful(&rhs) {
                    args.push("__effects".to_string());
                }
                format!("{}({})", callee, args.join(", "))
            }

            Expr::Paren(paren) => {
                let inner = paren
                    .inner()
                    .map(|i| self.expr_js(&i, indent))
                    .unwrap_or_default();
                format!("({inner})")
            }

            Expr::Block(block) => self.block_iife(block, indent),
        }
    }

    fn call_js(&mut self, call: &mk_parser::ast::expr::CallExpr, indent: usize) -> String {
        let args = call.arg_list().map(|l| l.args()).unwrap_or_default();

        if let Some(Expr::NameRef(name)) = call.callee() {
            let text = name.text();

            // Constructor application: a tagged object literal.
            if let Some((_, variant)) = self.typeck.registry.lookup_constructor(&text) {
                let fields = variant.fields.clone();
                let mut parts = vec![format!("tag: {}", escape_string(&text))];
                for ((field_name, _), arg) in fields.iter().zip(&args) {
                    if let Arg::Positional(value) = arg {
                        let value = self.expr_js(value, indent);
                        parts.push(format!("{}: {}", sanitize(field_name), value));
                    }
                }
                return format!("{{ {} }}", parts.join(", "));
            }

            // Record construction: a plain object literal with the
            // declared field names, in declaration order.
            if let Some(def) = self.typeck.registry.lookup(&text) {
                if let TypeDefKind::Record { fields } = &def.kind {
                    return self.record_literal(&fields.clone(), &args, indent);
                }
            }
        }

        // Qualified record construction through an import binding.
        if let Some(Expr::FieldAccess(access)) = call.callee() {
            let range = access.syntax().text_range();
            if let Some((_, name)) = self.typeck.qualified_refs.get(&range).cloned() {
                if let Some(def) = self.typeck.registry.lookup(&name) {
                    if let TypeDefKind::Record { fields } = &def.kind {
                        return self.record_literal(&fields.clone(), &args, indent);
                    }
                }
            }
        }

        // Plain call; effectful callees get `__effects` threaded last.
        let Some(callee) = call.callee() else {
            return String::new();
        };
        let callee_js = self.callee_js(&callee, indent);
        let mut arg_js: Vec<String> = args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Positional(value) => Some(self.expr_js(value, indent)),
                Arg::Named(_) => None,
            })
            .collect();
        if self.is_effectful(&callee) {
            arg_js.push("__effects".to_string());
        }
        format!("{}({})", callee_js, arg_js.join(", "))
    }

    /// Lower a record construction to an object literal in declared field
    /// order.
    fn record_literal(&mut self, fields: &[(String, Ty)], args: &[Arg], indent: usize) -> String {
        let mut parts = Vec::new();
        for (field_name, _) in fields {
            let value = args.iter().find_map(|arg| match arg {
                Arg::Named(named)
                    if named.name().map(|n| n.text()).as_deref() == Some(field_name) =>
                {
                    named.value()
                }
                _ => None,
            });
            if let Some(value) = value {
                let value = self.expr_js(&value, indent);
                parts.push(format!("{}: {}", sanitize(field_name), value));
            }
        }
        format!("{{ {} }}", parts.join(", "))
    }

    /// A first-class constructor value.
    fn constructor_value(&mut self, name: &str, fields: &[(String, Ty)]) -> String {
        if fields.is_empty() {
            return format!("{{ tag: {} }}", escape_string(name));
        }
        let params: Vec<String> = fields.iter().map(|(n, _)| sanitize(n)).collect();
        let mut parts = vec![format!("tag: {}", escape_string(name))];
        for param in &params {
            parts.push(format!("{param}: {param}"));
        }
        format!(
            "function ({}) {{ return {{ {} }}; }}",
            params.join(", "),
            parts.join(", ")
        )
    }

    /// Lower the callee position of a call. Wraps anything that is not a
    /// plain name or member access in parentheses.
    fn callee_js(&mut self, callee: &Expr, indent: usize) -> String {
        match callee {
            Expr::NameRef(_) | Expr::FieldAccess(_) => self.expr_js(callee, indent),
            other => format!("({})", self.expr_js(other, indent)),
        }
    }

    /// Whether a call through this callee needs `__effects` threaded.
    fn is_effectful(&self, callee: &Expr) -> bool {
        matches!(
            self.typeck.types.get(&callee.syntax().text_range()),
            Some(Ty::Fun(_, _, effects)) if !effects.is_empty()
        )
    }

    fn binary_js(&mut self, binary: &mk_parser::ast::expr::BinaryExpr, indent: usize) -> String {
        let lhs_expr = binary.lhs();
        let lhs = lhs_expr
            .as_ref()
            .map(|l| self.expr_js(l, indent))
            .unwrap_or_default();
        let rhs = binary
            .rhs()
            .map(|r| self.expr_js(&r, indent))
            .unwrap_or_default();

        let op_kind = binary.op().map(|t| t.kind());
        match op_kind {
            Some(SyntaxKind::EQ_EQ) | Some(SyntaxKind::NOT_EQ) => {
                // Strict equality for primitives; structural comparison
                // through the stdlib for everything else.
                let primitive = lhs_expr
                    .as_ref()
                    .and_then(|l| self.typeck.types.get(&l.syntax().text_range()))
                    .map(is_primitive)
                    .unwrap_or(false);
                let negated = op_kind == Some(SyntaxKind::NOT_EQ);
                if primitive {
                    let op = if negated { "!==" } else { "===" };
                    format!("({lhs} {op} {rhs})")
                } else if negated {
                    format!("(!equals({lhs}, {rhs}))")
                } else {
                    format!("equals({lhs}, {rhs})")
                }
            }
            Some(kind) => {
                let op = match kind {
                    SyntaxKind::PLUS => "+",
                    SyntaxKind::MINUS => "-",
                    SyntaxKind::STAR => "*",
                    SyntaxKind::SLASH => "/",
                    SyntaxKind::PERCENT => "%",
                    SyntaxKind::LT => "<",
                    SyntaxKind::GT => ">",
                    SyntaxKind::LT_EQ => "<=",
                    SyntaxKind::GT_EQ => ">=",
                    SyntaxKind::AMP_AMP => "&&",
                    SyntaxKind::PIPE_PIPE => "||",
                    _ => "+",
                };
                format!("({lhs} {op} {rhs})")
            }
            None => lhs,
        }
    }

    /// Lower an if expression: a ternary when both arms are plain
    /// expressions, an immediately-invoked function when a body needs
    /// statements. Both encodings preserve evaluation order.
    fn if_js(&mut self, if_expr: &mk_parser::ast::expr::IfExpr, indent: usize) -> String {
        if if_is_simple(if_expr) {
            let cond = if_expr
                .condition()
                .map(|c| self.expr_js(&c, indent))
                .unwrap_or_default();
            let then = if_expr
                .then_block()
                .and_then(|b| b.tail_expr())
                .map(|t| self.expr_js(&t, indent))
                .unwrap_or_default();
            let else_js = match if_expr.else_branch().and_then(|b| b.body()) {
                Some(Expr::Block(block)) => block
                    .tail_expr()
                    .map(|t| self.expr_js(&t, indent))
                    .unwrap_or_default(),
                Some(Expr::If(nested)) => self.if_js(&nested, indent),
                Some(other) => self.expr_js(&other, indent),
                None => unit_value().to_string(),
            };
            return format!("({cond} ? {then} : {else_js})");
        }

        let pad = "  ".repeat(indent + 1);
        let close = "  ".repeat(indent);
        let cond = if_expr
            .condition()
            .map(|c| self.expr_js(&c, indent + 1))
            .unwrap_or_default();

        let mut out = String::new();
        let _ = writeln!(out, "(function () {{");
        let _ = writeln!(out, "{pad}if ({cond}) {{");
        if let Some(block) = if_expr.then_block() {
            self.emit_into(&mut out, &block, indent + 2);
        }
        match if_expr.else_branch().and_then(|b| b.body()) {
            Some(Expr::Block(block)) => {
                let _ = writeln!(out, "{pad}}} else {{");
                self.emit_into(&mut out, &block, indent + 2);
                let _ = writeln!(out, "{pad}}}");
            }
            Some(other) => {
                let _ = writeln!(out, "{pad}}} else {{");
                let value = self.expr_js(&other, indent + 2);
                let inner_pad = "  ".repeat(indent + 2);
                let _ = writeln!(out, "{inner_pad}return {value};");
                let _ = writeln!(out, "{pad}}}");
            }
            None => {
                let _ = writeln!(out, "{pad}}}");
            }
        }
        let _ = write!(out, "{close}}})()");
        out
    }

    /// Lower a match to a tag-dispatch chain inside an immediately-invoked
    /// function. The scrutinee is evaluated exactly once; arms run
    /// top-to-bottom; without a wildcard the final `else` is the proven-
    /// unreachable assertion that keeps corrupted input from becoming
    /// undefined behavior.
    fn match_js(&mut self, match_expr: &mk_parser::ast::expr::MatchExpr, indent: usize) -> String {
        let pad = "  ".repeat(indent + 1);
        let close = "  ".repeat(indent);
        let scrutinee = match_expr
            .scrutinee()
            .map(|s| self.expr_js(&s, indent + 1))
            .unwrap_or_default();

        let mut out = String::new();
        let _ = writeln!(out, "(function () {{");
        let _ = writeln!(out, "{pad}const __subject = {scrutinee};");

        let mut saw_wildcard = false;
        let mut first = true;
        for arm in match_expr.arms() {
            match arm.pattern() {
                Some(Pattern::Constructor(ctor)) => {
                    let Some(name) = ctor.name() else { continue };
                    let ctor_name = name.text();
                    let keyword = if first { "if" } else { "} else if" };
                    first = false;
                    let _ = writeln!(
                        out,
                        "{pad}{keyword} (__subject.tag === {}) {{",
                        escape_string(&ctor_name)
                    );

                    // Bind sub-patterns to the variant's field names.
                    if let Some((_, variant)) =
                        self.typeck.registry.lookup_constructor(&ctor_name)
                    {
                        let fields = variant.fields.clone();
                        let inner_pad = "  ".repeat(indent + 2);
                        for (sub, (field_name, _)) in
                            ctor.sub_patterns().iter().zip(&fields)
                        {
                            if let SubPattern::Binding(binding) = sub {
                                let _ = writeln!(
                                    out,
                                    "{inner_pad}const {} = __subject.{};",
                                    sanitize(&binding.text()),
                                    sanitize(field_name)
                                );
                            }
                        }
                    }
                    self.emit_arm_body(&mut out, &arm, indent + 2);
                }
                Some(Pattern::Wildcard(_)) => {
                    saw_wildcard = true;
                    if first {
                        // A lone wildcard arm: no dispatch needed.
                        self.emit_arm_body(&mut out, &arm, indent + 1);
                    } else {
                        let _ = writeln!(out, "{pad}}} else {{");
                        self.emit_arm_body(&mut out, &arm, indent + 2);
                        let _ = writeln!(out, "{pad}}}");
                    }
                    break;
                }
                None => {}
            }
        }

        if !first && !saw_wildcard {
            let _ = writeln!(out, "{pad}}} else {{");
            let inner_pad = "  ".repeat(indent + 2);
            let _ = writeln!(out, "{inner_pad}return __mk_unreachable(\"E7004\");");
            let _ = writeln!(out, "{pad}}}");
        }

        let _ = write!(out, "{close}}})()");
        out
    }

    /// Emit a match arm's body: a block inline, or a single `return`.
    fn emit_arm_body(
        &mut self,
        out: &mut String,
        arm: &mk_parser::ast::expr::MatchArm,
        indent: usize,
    ) {
        let pad = "  ".repeat(indent);
        match arm.body() {
            Some(Expr::Block(block)) => self.emit_into(out, &block, indent),
            Some(other) => {
                let value = self.expr_js(&other, indent);
                let _ = writeln!(out, "{pad}return {value};");
            }
            None => {}
        }
    }

    /// Lower a bare block expression via an immediately-invoked function.
    fn block_iife(&mut self, block: &Block, indent: usize) -> String {
        let mut out = String::new();
        let close = "  ".repeat(indent);
        let _ = writeln!(out, "(function () {{");
        self.emit_into(&mut out, block, indent + 1);
        let _ = write!(out, "{close}}})()");
        out
    }

    /// Emit a block body into a scratch buffer (used inside IIFEs).
    fn emit_into(&mut self, out: &mut String, block: &Block, indent: usize) {
        let saved = std::mem::take(&mut self.out);
        self.emit_block_body(block, indent);
        let body = std::mem::replace(&mut self.out, saved);
        out.push_str(&body);
    }
}

/// The runtime representation of the unit value.
fn unit_value() -> &'static str {
    "{ tag: \"Unit\" }"
}

/// Whether both sides of an equality can use JS strict equality directly.
fn is_primitive(ty: &Ty) -> bool {
    matches!(ty.head_name(), Some("Int") | Some("Bool") | Some("String"))
}

/// An if expression is simple when every arm is a bare expression (no
/// statements), so a ternary preserves its meaning.
fn if_is_simple(if_expr: &mk_parser::ast::expr::IfExpr) -> bool {
    let then_simple = if_expr
        .then_block()
        .map(|b| b.statements().is_empty() && b.tail_expr().is_some())
        .unwrap_or(false);
    let else_simple = match if_expr.else_branch().and_then(|b| b.body()) {
        Some(Expr::Block(block)) => {
            block.statements().is_empty() && block.tail_expr().is_some()
        }
        Some(Expr::If(nested)) => if_is_simple(&nested),
        Some(_) => true,
        None => false,
    };
    then_simple && else_simple
}

/// Flatten module blocks into one source-ordered item stream.
pub(crate) fn flatten_items(file: &SourceFile) -> Vec<Item> {
    let mut items = Vec::new();
    for item in file.items() {
        match item {
            Item::Module(module) => items.extend(module.items()),
            other => items.push(other),
        }
    }
    items
}
