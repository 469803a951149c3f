//! CST-to-FormatIR walker for Manaknight source code.
//!
//! Walks the parsed tree and rebuilds the document from structure alone:
//! canonical spacing, four-space indentation, `;` after statements, none
//! after tail expressions. Literal and keyword tokens are reproduced
//! verbatim so a re-parse yields the identical AST.
//!
//! Comments survive formatting: block-level comments keep their slots,
//! and comments buried inside a construct are hoisted onto their own
//! lines in front of the enclosing statement or declaration. Both
//! placements are fixed points, which is what makes the formatter
//! idempotent.

use mk_parser::ast::expr::{Arg, Block, Expr, Stmt};
use mk_parser::ast::item::{
    ApiRoute, EffectDef, FnDef, ImportDecl, Item, ModuleDef, ParamList, SourceFile, TypeDef,
    UsesClause,
};
use mk_parser::ast::pat::{Pattern, SubPattern};
use mk_parser::ast::ty::TypeRef;
use mk_parser::ast::AstNode;
use mk_parser::{SyntaxKind, SyntaxNode};

use crate::ir::{concat, hardline, indent, join, text, FormatIR};

/// One top-level element: a comment line or a declaration.
enum Element {
    Comment(FormatIR),
    Item(FormatIR),
}

/// Join elements: comments attach tightly to what follows them; items are
/// separated from their predecessor by a blank line.
fn join_elements(elements: Vec<Element>) -> FormatIR {
    let mut parts = Vec::new();
    let mut previous_was_comment = false;
    for (i, element) in elements.into_iter().enumerate() {
        if i > 0 {
            parts.push(hardline());
            if !previous_was_comment {
                parts.push(hardline());
            }
        }
        match element {
            Element::Comment(ir) => {
                parts.push(ir);
                previous_was_comment = true;
            }
            Element::Item(ir) => {
                parts.push(ir);
                previous_was_comment = false;
            }
        }
    }
    concat(parts)
}

/// Walk a parsed file and produce its canonical document.
pub fn walk_file(file: &SourceFile) -> FormatIR {
    let mut elements = Vec::new();

    if let Some(header) = file.language_header() {
        for comment in comment_lines(header.syntax()) {
            elements.push(Element::Comment(comment));
        }
        if let Some(version) = header.version() {
            elements.push(Element::Item(text(format!("language v{version}"))));
        }
    }

    for element in file.syntax().children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(node) => {
                if let Some(item) = Item::cast(node) {
                    elements.push(Element::Item(item_ir(&item)));
                }
            }
            rowan::NodeOrToken::Token(token) => {
                // Only trailing comments live directly under the root.
                if token.kind() == SyntaxKind::COMMENT {
                    elements.push(Element::Comment(text(
                        token.text().trim_end().to_string(),
                    )));
                }
            }
        }
    }

    join_elements(elements)
}

// ── Items ───────────────────────────────────────────────────────────────

fn item_ir(item: &Item) -> FormatIR {
    // Modules keep their comments in their own element stream; everything
    // else hoists buried comments onto lines above the declaration.
    let mut parts = match item {
        Item::Module(_) => Vec::new(),
        _ => {
            let mut parts = Vec::new();
            for comment in comment_lines(item.syntax()) {
                parts.push(comment);
                parts.push(hardline());
            }
            parts
        }
    };
    let body = match item {
        Item::Module(module) => module_ir(module),
        Item::Fn(def) => fn_ir(def),
        Item::Type(def) => type_def_ir(def),
        Item::Effect(def) => effect_ir(def),
        Item::Import(import) => import_ir(import),
        Item::Api(route) => api_ir(route),
    };
    parts.push(body);
    concat(parts)
}

/// Hoisted comments for a declaration or statement, one IR per comment.
fn comment_lines(node: &SyntaxNode) -> Vec<FormatIR> {
    let mut comments = Vec::new();
    collect_comments(node, &mut comments);
    comments.into_iter().map(text).collect()
}

/// Collect comment tokens in a subtree, stopping at nested blocks (whose
/// own walker keeps their comments in place).
fn collect_comments(node: &SyntaxNode, out: &mut Vec<String>) {
    for element in node.children_with_tokens() {
        match element {
            rowan::NodeOrToken::Token(token) if token.kind() == SyntaxKind::COMMENT => {
                out.push(token.text().trim_end().to_string());
            }
            rowan::NodeOrToken::Node(child) if child.kind() != SyntaxKind::BLOCK => {
                collect_comments(&child, out);
            }
            _ => {}
        }
    }
}

fn module_ir(module: &ModuleDef) -> FormatIR {
    let path = module.path().map(|p| p.text()).unwrap_or_default();
    let mut elements = Vec::new();
    for element in module.syntax().children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(node) => {
                if let Some(item) = Item::cast(node) {
                    elements.push(Element::Item(item_ir(&item)));
                }
            }
            rowan::NodeOrToken::Token(token) => {
                if token.kind() == SyntaxKind::COMMENT {
                    elements.push(Element::Comment(text(
                        token.text().trim_end().to_string(),
                    )));
                }
            }
        }
    }

    if elements.is_empty() {
        return text(format!("module {path} {{}}"));
    }
    concat(vec![
        text(format!("module {path} {{")),
        indent(concat(vec![hardline(), join_elements(elements)])),
        hardline(),
        text("}"),
    ])
}

fn fn_ir(def: &FnDef) -> FormatIR {
    let mut parts = Vec::new();
    if def.is_pub() {
        parts.push(text("pub "));
    }
    // Keep the author's `fn`/`function` spelling.
    let keyword = def
        .syntax()
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| matches!(t.kind(), SyntaxKind::FN_KW | SyntaxKind::FUNCTION_KW))
        .map(|t| t.text().to_string())
        .unwrap_or_else(|| "fn".to_string());
    let name = def.name().map(|n| n.text()).unwrap_or_default();
    parts.push(text(format!("{keyword} {name}")));
    parts.push(param_list_ir(def.param_list()));
    if let Some(ret) = def.return_type().and_then(|r| r.ty()) {
        parts.push(text(" : "));
        parts.push(type_ref_ir(&ret));
    }
    if let Some(clause) = def.uses_clause() {
        parts.push(text(" "));
        parts.push(uses_ir(&clause));
    }
    parts.push(text(" "));
    parts.push(match def.body() {
        Some(body) => block_ir(&body),
        None => text("{}"),
    });
    concat(parts)
}

fn param_list_ir(params: Option<ParamList>) -> FormatIR {
    let Some(list) = params else {
        return text("()");
    };
    let parts: Vec<FormatIR> = list
        .params()
        .map(|param| {
            let name = param.name().map(|n| n.text()).unwrap_or_default();
            match param.ty() {
                Some(ty) => concat(vec![text(format!("{name}: ")), type_ref_ir(&ty)]),
                None => text(name),
            }
        })
        .collect();
    concat(vec![text("("), join(parts, text(", ")), text(")")])
}

fn uses_ir(clause: &UsesClause) -> FormatIR {
    let effects = clause.effects();
    if effects.is_empty() {
        text("uses {}")
    } else {
        text(format!("uses {{ {} }}", effects.join(", ")))
    }
}

fn type_def_ir(def: &TypeDef) -> FormatIR {
    let mut header = String::new();
    if def.is_pub() {
        header.push_str("pub ");
    }
    header.push_str("type ");
    header.push_str(&def.name().map(|n| n.text()).unwrap_or_default());
    let generics = def.generic_params();
    if !generics.is_empty() {
        header.push('<');
        header.push_str(&generics.join(", "));
        header.push('>');
    }
    header.push_str(" { ");

    let body = if let Some(record) = def.record_fields() {
        let fields: Vec<FormatIR> = record.fields().map(|f| field_def_ir(&f)).collect();
        join(fields, text(", "))
    } else {
        let variants: Vec<FormatIR> = def
            .variants()
            .iter()
            .map(|variant| {
                let name = variant.name().map(|n| n.text()).unwrap_or_default();
                let fields = variant.fields();
                if fields.is_empty() {
                    text(name)
                } else {
                    let fields: Vec<FormatIR> =
                        fields.iter().map(field_def_ir).collect();
                    concat(vec![
                        text(format!("{name}(")),
                        join(fields, text(", ")),
                        text(")"),
                    ])
                }
            })
            .collect();
        join(variants, text(" | "))
    };

    concat(vec![text(header), body, text(" }")])
}

fn field_def_ir(field: &mk_parser::ast::item::FieldDef) -> FormatIR {
    let name = field.name().map(|n| n.text()).unwrap_or_default();
    match field.ty() {
        Some(ty) => concat(vec![text(format!("{name}: ")), type_ref_ir(&ty)]),
        None => text(name),
    }
}

fn effect_ir(def: &EffectDef) -> FormatIR {
    text(format!(
        "effect {}",
        def.name().map(|n| n.text()).unwrap_or_default()
    ))
}

fn import_ir(import: &ImportDecl) -> FormatIR {
    let path = import.path().map(|p| p.text()).unwrap_or_default();
    match import.alias() {
        Some(alias) => text(format!("import {path} as {}", alias.text())),
        None => text(format!("import {path}")),
    }
}

fn api_ir(route: &ApiRoute) -> FormatIR {
    let mut parts = Vec::new();
    let method = route.method().unwrap_or_default();
    let path_token = route
        .path_token()
        .map(|t| t.text().to_string())
        .unwrap_or_default();
    parts.push(text(format!("api {method} {path_token} ")));
    parts.push(param_list_ir(route.param_list()));
    if let Some(ret) = route.return_type().and_then(|r| r.ty()) {
        parts.push(text(" -> "));
        parts.push(type_ref_ir(&ret));
    }
    if let Some(clause) = route.uses_clause() {
        parts.push(text(" "));
        parts.push(uses_ir(&clause));
    }
    parts.push(text(" "));
    parts.push(match route.body() {
        Some(body) => block_ir(&body),
        None => text("{}"),
    });
    concat(parts)
}

// ── Types ───────────────────────────────────────────────────────────────

fn type_ref_ir(type_ref: &TypeRef) -> FormatIR {
    match type_ref {
        TypeRef::Path(path) => text(path.text()),
        TypeRef::Generic(generic) => {
            let args: Vec<FormatIR> = generic.args().iter().map(type_ref_ir).collect();
            concat(vec![
                text(format!("{}<", generic.name())),
                join(args, text(", ")),
                text(">"),
            ])
        }
        TypeRef::Fn(fn_type) => {
            let params: Vec<FormatIR> =
                fn_type.param_types().iter().map(type_ref_ir).collect();
            let mut parts = vec![text("("), join(params, text(", ")), text(")")];
            if let Some(ret) = fn_type.return_type() {
                parts.push(text(" -> "));
                parts.push(type_ref_ir(&ret));
            }
            if let Some(clause) = fn_type.uses_clause() {
                parts.push(text(" "));
                parts.push(uses_ir(&clause));
            }
            concat(parts)
        }
    }
}

// ── Blocks and statements ───────────────────────────────────────────────

fn block_ir(block: &Block) -> FormatIR {
    let mut lines = Vec::new();

    for element in AstNode::syntax(block).children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(node) => {
                if let Some(stmt) = Stmt::cast(node.clone()) {
                    for comment in comment_lines(stmt.syntax()) {
                        lines.push(comment);
                    }
                    lines.push(stmt_ir(&stmt));
                } else if let Some(expr) = Expr::cast(node) {
                    // The tail expression: no terminator.
                    for comment in comment_lines(expr.syntax()) {
                        lines.push(comment);
                    }
                    lines.push(expr_ir(&expr));
                }
            }
            rowan::NodeOrToken::Token(token) => {
                if token.kind() == SyntaxKind::COMMENT {
                    lines.push(text(token.text().trim_end().to_string()));
                }
            }
        }
    }

    if lines.is_empty() {
        return text("{}");
    }

    let mut inner = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            inner.push(hardline());
        }
        inner.push(line);
    }
    concat(vec![
        text("{"),
        indent(concat(vec![hardline(), concat(inner)])),
        hardline(),
        text("}"),
    ])
}

fn stmt_ir(stmt: &Stmt) -> FormatIR {
    match stmt {
        Stmt::Let(let_stmt) => {
            let name = let_stmt.name().map(|n| n.text()).unwrap_or_default();
            let mut parts = vec![text(format!("let {name}"))];
            if let Some(ty) = let_stmt.ty().and_then(|t| t.ty()) {
                parts.push(text(": "));
                parts.push(type_ref_ir(&ty));
            }
            parts.push(text(" = "));
            if let Some(value) = let_stmt.value() {
                parts.push(expr_ir(&value));
            }
            parts.push(text(";"));
            concat(parts)
        }
        Stmt::Expr(expr_stmt) => match expr_stmt.expr() {
            Some(expr) => concat(vec![expr_ir(&expr), text(";")]),
            None => FormatIR::Empty,
        },
    }
}

// ── Expressions ─────────────────────────────────────────────────────────

fn expr_ir(expr: &Expr) -> FormatIR {
    match expr {
        Expr::Literal(lit) => text(literal_text(lit)),
        Expr::NameRef(name) => text(name.text()),
        Expr::FieldAccess(access) => {
            let base = access
                .base()
                .map(|b| expr_ir(&b))
                .unwrap_or(FormatIR::Empty);
            let field = access.field_name().unwrap_or_default();
            concat(vec![base, text(format!(".{field}"))])
        }
        Expr::Call(call) => {
            let callee = call
                .callee()
                .map(|c| expr_ir(&c))
                .unwrap_or(FormatIR::Empty);
            let args: Vec<FormatIR> = call
                .arg_list()
                .map(|l| l.args())
                .unwrap_or_default()
                .iter()
                .map(arg_ir)
                .collect();
            concat(vec![callee, text("("), join(args, text(", ")), text(")")])
        }
        Expr::Lambda(lambda) => {
            let body = lambda
                .body()
                .map(|b| expr_ir(&b))
                .unwrap_or(FormatIR::Empty);
            concat(vec![
                text("fn "),
                param_list_ir(lambda.param_list()),
                text(" => "),
                body,
            ])
        }
        Expr::If(if_expr) => if_ir(if_expr),
        Expr::Match(match_expr) => match_ir(match_expr),
        Expr::Binary(binary) => {
            let op = binary
                .op()
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            let lhs = binary
                .lhs()
                .map(|l| expr_ir(&l))
                .unwrap_or(FormatIR::Empty);
            let rhs = binary
                .rhs()
                .map(|r| expr_ir(&r))
                .unwrap_or(FormatIR::Empty);
            concat(vec![lhs, text(format!(" {op} ")), rhs])
        }
        Expr::Unary(unary) => {
            let op = unary
                .op()
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            let operand = unary
                .operand()
                .map(|o| expr_ir(&o))
                .unwrap_or(FormatIR::Empty);
            concat(vec![text(op), operand])
        }
        Expr::Pipe(pipe) => {
            let lhs = pipe.lhs().map(|l| expr_ir(&l)).unwrap_or(FormatIR::Empty);
            let rhs = pipe.rhs().map(|r| expr_ir(&r)).unwrap_or(FormatIR::Empty);
            concat(vec![lhs, text(" |> "), rhs])
        }
        Expr::Paren(paren) => {
            let inner = paren
                .inner()
                .map(|i| expr_ir(&i))
                .unwrap_or(FormatIR::Empty);
            concat(vec![text("("), inner, text(")")])
        }
        Expr::Block(block) => block_ir(block),
    }
}

fn arg_ir(arg: &Arg) -> FormatIR {
    match arg {
        Arg::Positional(value) => expr_ir(value),
        Arg::Named(named) => {
            let name = named
                .name()
                .map(|n| n.text())
                .unwrap_or_default();
            let value = named
                .value()
                .map(|v| expr_ir(&v))
                .unwrap_or(FormatIR::Empty);
            concat(vec![text(format!("{name}: ")), value])
        }
    }
}

fn if_ir(if_expr: &mk_parser::ast::expr::IfExpr) -> FormatIR {
    let cond = if_expr
        .condition()
        .map(|c| expr_ir(&c))
        .unwrap_or(FormatIR::Empty);
    let then = if_expr
        .then_block()
        .map(|b| block_ir(&b))
        .unwrap_or_else(|| text("{}"));
    let mut parts = vec![text("if "), cond, text(" "), then];
    if let Some(body) = if_expr.else_branch().and_then(|b| b.body()) {
        parts.push(text(" else "));
        parts.push(expr_ir(&body));
    }
    concat(parts)
}

fn match_ir(match_expr: &mk_parser::ast::expr::MatchExpr) -> FormatIR {
    let scrutinee = match_expr
        .scrutinee()
        .map(|s| expr_ir(&s))
        .unwrap_or(FormatIR::Empty);
    let arms = match_expr.arms();
    if arms.is_empty() {
        return concat(vec![text("match "), scrutinee, text(" {}")]);
    }

    let mut inner = Vec::new();
    let count = arms.len();
    for (i, arm) in arms.iter().enumerate() {
        if i > 0 {
            inner.push(hardline());
        }
        let pattern = arm
            .pattern()
            .map(|p| pattern_ir(&p))
            .unwrap_or(FormatIR::Empty);
        let body = arm
            .body()
            .map(|b| expr_ir(&b))
            .unwrap_or(FormatIR::Empty);
        inner.push(pattern);
        inner.push(text(" => "));
        inner.push(body);
        if i + 1 < count {
            inner.push(text(","));
        }
    }

    concat(vec![
        text("match "),
        scrutinee,
        text(" {"),
        indent(concat(vec![hardline(), concat(inner)])),
        hardline(),
        text("}"),
    ])
}

fn pattern_ir(pattern: &Pattern) -> FormatIR {
    match pattern {
        Pattern::Wildcard(_) => text("_"),
        Pattern::Constructor(ctor) => {
            let name = ctor.name().map(|n| n.text()).unwrap_or_default();
            let subs = ctor.sub_patterns();
            if subs.is_empty() {
                return text(name);
            }
            let subs: Vec<FormatIR> = subs
                .iter()
                .map(|sub| match sub {
                    SubPattern::Binding(binding) => text(binding.text()),
                    SubPattern::Wildcard(_) => text("_"),
                })
                .collect();
            concat(vec![
                text(format!("{name}(")),
                join(subs, text(", ")),
                text(")"),
            ])
        }
    }
}

/// The literal's token text, reproduced verbatim (`()` for unit).
fn literal_text(lit: &mk_parser::ast::expr::Literal) -> String {
    let tokens: Vec<String> = AstNode::syntax(lit)
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() != SyntaxKind::COMMENT)
        .map(|t| t.text().to_string())
        .collect();
    tokens.join("")
}
