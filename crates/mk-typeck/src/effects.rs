//! The effect analyzer.
//!
//! Runs after type checking, bottom-up, assigning an effect set to every
//! expression. Effects enter a body only through calls (and pipes, which
//! are calls): the callee's resolved function type carries its declared
//! effect set, and every introduction is checked against the enclosing
//! context at the call site.
//!
//! - A call inside a pure function introducing effects is E3002.
//! - A call inside an effectful function introducing an effect missing
//!   from the declared set is E3001, one error per missing effect.
//! - Any effect inside a lambda body is E3004; lambdas must be pure.
//!
//! Spurious declared effects are allowed without error.

use rowan::TextRange;
use rustc_hash::FxHashMap;

use mk_parser::ast::expr::{Block, Expr, Stmt};
use mk_parser::ast::item::{Item, SourceFile};
use mk_parser::ast::AstNode;

use crate::error::TypeError;
use crate::ty::{EffectSet, Ty};

/// The declaration context a call site is checked against.
enum Context<'a> {
    /// Inside a named function or route with the given declared set.
    Declared { fn_name: &'a str, effects: &'a EffectSet },
    /// Inside a lambda body: no effects at all.
    Lambda,
}

/// Walk every function and route body, filling the per-expression effect
/// side table and reporting discipline violations.
pub(crate) fn analyze(
    file: &SourceFile,
    types: &FxHashMap<TextRange, Ty>,
    errors: &mut Vec<TypeError>,
) -> FxHashMap<TextRange, EffectSet> {
    let mut analyzer = Analyzer {
        types,
        effects: FxHashMap::default(),
        errors,
    };

    for item in all_items(file) {
        match item {
            Item::Fn(def) => {
                let fn_name = def.name().map(|n| n.text()).unwrap_or_default();
                let declared: EffectSet = def
                    .uses_clause()
                    .map(|c| c.effects().into_iter().collect())
                    .unwrap_or_default();
                if let Some(body) = def.body() {
                    analyzer.block_effects(
                        &body,
                        &Context::Declared {
                            fn_name: &fn_name,
                            effects: &declared,
                        },
                    );
                }
            }
            Item::Api(route) => {
                let handler = route.handler_name();
                let declared: EffectSet = route
                    .uses_clause()
                    .map(|c| c.effects().into_iter().collect())
                    .unwrap_or_default();
                if let Some(body) = route.body() {
                    analyzer.block_effects(
                        &body,
                        &Context::Declared {
                            fn_name: &handler,
                            effects: &declared,
                        },
                    );
                }
            }
            _ => {}
        }
    }

    analyzer.effects
}

/// Flatten module blocks into one item stream.
fn all_items(file: &SourceFile) -> Vec<Item> {
    let mut items = Vec::new();
    for item in file.items() {
        match item {
            Item::Module(module) => items.extend(module.items()),
            other => items.push(other),
        }
    }
    items
}

struct Analyzer<'a> {
    types: &'a FxHashMap<TextRange, Ty>,
    effects: FxHashMap<TextRange, EffectSet>,
    errors: &'a mut Vec<TypeError>,
}

impl<'a> Analyzer<'a> {
    fn block_effects(&mut self, block: &Block, context: &Context) -> EffectSet {
        let mut set = EffectSet::new();
        for stmt in block.statements() {
            match stmt {
                Stmt::Let(let_stmt) => {
                    if let Some(value) = let_stmt.value() {
                        set.extend(self.expr_effects(&value, context));
                    }
                }
                Stmt::Expr(expr_stmt) => {
                    if let Some(expr) = expr_stmt.expr() {
                        set.extend(self.expr_effects(&expr, context));
                    }
                }
            }
        }
        if let Some(tail) = block.tail_expr() {
            set.extend(self.expr_effects(&tail, context));
        }
        self.effects
            .insert(AstNode::syntax(block).text_range(), set.clone());
        set
    }

    fn expr_effects(&mut self, expr: &Expr, context: &Context) -> EffectSet {
        let range = expr.syntax().text_range();
        let set = match expr {
            Expr::Literal(_) | Expr::NameRef(_) => EffectSet::new(),

            Expr::FieldAccess(access) => match access.base() {
                // A qualified reference evaluates to a value; accessing it
                // performs nothing.
                Some(base) => self.expr_effects(&base, context),
                None => EffectSet::new(),
            },

            Expr::Call(call) => {
                let mut set = EffectSet::new();
                if let Some(callee) = call.callee() {
                    set.extend(self.expr_effects(&callee, context));
                    let introduced = self.callee_effects(&callee);
                    self.check_introduced(&introduced, context, range);
                    set.extend(introduced);
                }
                if let Some(args) = call.arg_list() {
                    for arg in args.args() {
                        match arg {
                            mk_parser::ast::expr::Arg::Positional(value) => {
                                set.extend(self.expr_effects(&value, context));
                            }
                            mk_parser::ast::expr::Arg::Named(named) => {
                                if let Some(value) = named.value() {
                                    set.extend(self.expr_effects(&value, context));
                                }
                            }
                        }
                    }
                }
                set
            }

            Expr::Pipe(pipe) => {
                let mut set = EffectSet::new();
                if let Some(lhs) = pipe.lhs() {
                    set.extend(self.expr_effects(&lhs, context));
                }
                if let Some(rhs) = pipe.rhs() {
                    set.extend(self.expr_effects(&rhs, context));
                    let introduced = self.callee_effects(&rhs);
                    self.check_introduced(&introduced, context, range);
                    set.extend(introduced);
                }
                set
            }

            Expr::Lambda(lambda) => {
                // The body is analyzed under the lambda rule; the lambda
                // value itself contributes nothing.
                if let Some(body) = lambda.body() {
                    self.expr_effects(&body, &Context::Lambda);
                }
                EffectSet::new()
            }

            Expr::If(if_expr) => {
                let mut set = EffectSet::new();
                if let Some(cond) = if_expr.condition() {
                    set.extend(self.expr_effects(&cond, context));
                }
                if let Some(block) = if_expr.then_block() {
                    set.extend(self.block_effects(&block, context));
                }
                if let Some(body) = if_expr.else_branch().and_then(|b| b.body()) {
                    set.extend(self.expr_effects(&body, context));
                }
                set
            }

            Expr::Match(match_expr) => {
                let mut set = EffectSet::new();
                if let Some(scrutinee) = match_expr.scrutinee() {
                    set.extend(self.expr_effects(&scrutinee, context));
                }
                for arm in match_expr.arms() {
                    if let Some(body) = arm.body() {
                        set.extend(self.expr_effects(&body, context));
                    }
                }
                set
            }

            Expr::Binary(binary) => {
                let mut set = EffectSet::new();
                if let Some(lhs) = binary.lhs() {
                    set.extend(self.expr_effects(&lhs, context));
                }
                if let Some(rhs) = binary.rhs() {
                    set.extend(self.expr_effects(&rhs, context));
                }
                set
            }

            Expr::Unary(unary) => match unary.operand() {
                Some(operand) => self.expr_effects(&operand, context),
                None => EffectSet::new(),
            },

            Expr::Paren(paren) => match paren.inner() {
                Some(inner) => self.expr_effects(&inner, context),
                None => EffectSet::new(),
            },

            Expr::Block(block) => self.block_effects(block, context),
        };

        self.effects.insert(range, set.clone());
        set
    }

    /// The effects a call through this callee introduces: the declared
    /// effect set of the callee's resolved function type.
    fn callee_effects(&self, callee: &Expr) -> EffectSet {
        match self.types.get(&callee.syntax().text_range()) {
            Some(Ty::Fun(_, _, effects)) => effects.clone(),
            _ => EffectSet::new(),
        }
    }

    /// Check introduced effects against the enclosing context.
    fn check_introduced(&mut self, introduced: &EffectSet, context: &Context, span: TextRange) {
        if introduced.is_empty() {
            return;
        }
        match context {
            Context::Lambda => {
                for effect in introduced {
                    self.errors.push(TypeError::EffectInLambda {
                        effect: effect.clone(),
                        span,
                    });
                }
            }
            Context::Declared { fn_name, effects } => {
                if effects.is_empty() {
                    self.errors.push(TypeError::EffectInPure {
                        effects: introduced.iter().cloned().collect(),
                        fn_name: fn_name.to_string(),
                        span,
                    });
                } else {
                    for effect in introduced {
                        if !effects.contains(effect) {
                            self.errors.push(TypeError::UndeclaredEffect {
                                effect: effect.clone(),
                                fn_name: fn_name.to_string(),
                                span,
                            });
                        }
                    }
                }
            }
        }
    }
}
