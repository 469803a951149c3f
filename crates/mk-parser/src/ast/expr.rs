//! Typed AST nodes for expressions, statements, and blocks.

use crate::ast::item::{Name, ParamList, ReturnType};
use crate::ast::pat::Pattern;
use crate::ast::{ast_node, child_node, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Expr enum ────────────────────────────────────────────────────────────

/// Any expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    NameRef(NameRef),
    FieldAccess(FieldAccess),
    Call(CallExpr),
    Lambda(LambdaExpr),
    If(IfExpr),
    Match(MatchExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Pipe(PipeExpr),
    Paren(ParenExpr),
    Block(Block),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LITERAL => Some(Expr::Literal(Literal { syntax: node })),
            SyntaxKind::NAME_REF => Some(Expr::NameRef(NameRef { syntax: node })),
            SyntaxKind::FIELD_ACCESS => Some(Expr::FieldAccess(FieldAccess { syntax: node })),
            SyntaxKind::CALL_EXPR => Some(Expr::Call(CallExpr { syntax: node })),
            SyntaxKind::LAMBDA_EXPR => Some(Expr::Lambda(LambdaExpr { syntax: node })),
            SyntaxKind::IF_EXPR => Some(Expr::If(IfExpr { syntax: node })),
            SyntaxKind::MATCH_EXPR => Some(Expr::Match(MatchExpr { syntax: node })),
            SyntaxKind::BINARY_EXPR => Some(Expr::Binary(BinaryExpr { syntax: node })),
            SyntaxKind::UNARY_EXPR => Some(Expr::Unary(UnaryExpr { syntax: node })),
            SyntaxKind::PIPE_EXPR => Some(Expr::Pipe(PipeExpr { syntax: node })),
            SyntaxKind::PAREN_EXPR => Some(Expr::Paren(ParenExpr { syntax: node })),
            SyntaxKind::BLOCK => Some(Expr::Block(Block { syntax: node })),
            _ => None,
        }
    }

    /// Access the underlying syntax node regardless of variant.
    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(n) => &n.syntax,
            Expr::NameRef(n) => &n.syntax,
            Expr::FieldAccess(n) => &n.syntax,
            Expr::Call(n) => &n.syntax,
            Expr::Lambda(n) => &n.syntax,
            Expr::If(n) => &n.syntax,
            Expr::Match(n) => &n.syntax,
            Expr::Binary(n) => &n.syntax,
            Expr::Unary(n) => &n.syntax,
            Expr::Pipe(n) => &n.syntax,
            Expr::Paren(n) => &n.syntax,
            Expr::Block(n) => AstNode::syntax(n),
        }
    }
}

/// Find the first child expression of a node.
pub(crate) fn child_expr(parent: &SyntaxNode) -> Option<Expr> {
    parent.children().find_map(Expr::cast)
}

/// Find the nth child expression of a node.
pub(crate) fn nth_child_expr(parent: &SyntaxNode, n: usize) -> Option<Expr> {
    parent.children().filter_map(Expr::cast).nth(n)
}

// ── Literals ─────────────────────────────────────────────────────────────

/// The decoded value of a literal expression.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Unit,
}

ast_node!(Literal, LITERAL);

impl Literal {
    /// Decode the literal's value from its token(s).
    pub fn value(&self) -> Option<LiteralValue> {
        let token = self
            .syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())?;
        match token.kind() {
            SyntaxKind::INT_LITERAL => token.text().parse::<i64>().ok().map(LiteralValue::Int),
            SyntaxKind::STRING_LITERAL => {
                Some(LiteralValue::Str(mk_lexer::unescape_string(token.text())))
            }
            SyntaxKind::TRUE_KW => Some(LiteralValue::Bool(true)),
            SyntaxKind::FALSE_KW => Some(LiteralValue::Bool(false)),
            SyntaxKind::L_PAREN => Some(LiteralValue::Unit),
            _ => None,
        }
    }
}

// ── Simple expressions ───────────────────────────────────────────────────

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> String {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

ast_node!(FieldAccess, FIELD_ACCESS);

impl FieldAccess {
    /// The expression being accessed.
    pub fn base(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }

    /// The accessed member name (after the dot).
    pub fn field_name(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}

// ── Calls ────────────────────────────────────────────────────────────────

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }
}

ast_node!(ArgList, ARG_LIST);

/// One call argument: positional or named (`x: 1`).
#[derive(Debug, Clone)]
pub enum Arg {
    Positional(Expr),
    Named(NamedArg),
}

impl ArgList {
    pub fn args(&self) -> Vec<Arg> {
        self.syntax
            .children()
            .filter_map(|node| {
                if node.kind() == SyntaxKind::NAMED_ARG {
                    Some(Arg::Named(NamedArg { syntax: node }))
                } else {
                    Expr::cast(node).map(Arg::Positional)
                }
            })
            .collect()
    }
}

ast_node!(NamedArg, NAMED_ARG);

impl NamedArg {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn value(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}

// ── Lambdas ──────────────────────────────────────────────────────────────

ast_node!(LambdaExpr, LAMBDA_EXPR);

impl LambdaExpr {
    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    /// The lambda body expression (after `=>`).
    pub fn body(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}

// ── Control flow ─────────────────────────────────────────────────────────

ast_node!(IfExpr, IF_EXPR);

impl IfExpr {
    pub fn condition(&self) -> Option<Expr> {
        // The condition is the first expression child; the then-block is a
        // BLOCK, which casts as an expression too, so filter it by kind.
        self.syntax
            .children()
            .filter(|n| n.kind() != SyntaxKind::BLOCK)
            .find_map(Expr::cast)
    }

    pub fn then_block(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    pub fn else_branch(&self) -> Option<ElseBranch> {
        child_node(&self.syntax)
    }
}

ast_node!(ElseBranch, ELSE_BRANCH);

impl ElseBranch {
    /// The else body: a block, or a nested if for `else if` chains.
    pub fn body(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}

ast_node!(MatchExpr, MATCH_EXPR);

impl MatchExpr {
    pub fn scrutinee(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }

    pub fn arms(&self) -> Vec<MatchArm> {
        self.syntax
            .children()
            .filter_map(MatchArm::cast)
            .collect()
    }
}

ast_node!(MatchArm, MATCH_ARM);

impl MatchArm {
    pub fn pattern(&self) -> Option<Pattern> {
        self.syntax.children().find_map(Pattern::cast)
    }

    pub fn body(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}

// ── Operators ────────────────────────────────────────────────────────────

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        nth_child_expr(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_child_expr(&self.syntax, 1)
    }

    /// The operator token between the operands.
    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::PLUS
                        | SyntaxKind::MINUS
                        | SyntaxKind::STAR
                        | SyntaxKind::SLASH
                        | SyntaxKind::PERCENT
                        | SyntaxKind::EQ_EQ
                        | SyntaxKind::NOT_EQ
                        | SyntaxKind::LT
                        | SyntaxKind::GT
                        | SyntaxKind::LT_EQ
                        | SyntaxKind::GT_EQ
                        | SyntaxKind::AMP_AMP
                        | SyntaxKind::PIPE_PIPE
                )
            })
    }
}

ast_node!(UnaryExpr, UNARY_EXPR);

impl UnaryExpr {
    pub fn operand(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::MINUS | SyntaxKind::BANG))
    }
}

ast_node!(PipeExpr, PIPE_EXPR);

impl PipeExpr {
    /// The piped value (left side).
    pub fn lhs(&self) -> Option<Expr> {
        nth_child_expr(&self.syntax, 0)
    }

    /// The applied function (right side).
    pub fn rhs(&self) -> Option<Expr> {
        nth_child_expr(&self.syntax, 1)
    }
}

// ── Blocks and statements ────────────────────────────────────────────────

ast_node!(Block, BLOCK);

/// A statement inside a block.
#[derive(Debug, Clone)]
pub enum Stmt {
    Let(LetStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LET_STMT => Some(Stmt::Let(LetStmt { syntax: node })),
            SyntaxKind::EXPR_STMT => Some(Stmt::Expr(ExprStmt { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Let(n) => &n.syntax,
            Stmt::Expr(n) => &n.syntax,
        }
    }
}

impl Block {
    /// The block's statements, in source order (tail expression excluded).
    pub fn statements(&self) -> Vec<Stmt> {
        self.syntax.children().filter_map(Stmt::cast).collect()
    }

    /// The tail expression whose value the block produces, if any.
    pub fn tail_expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(LetStmt, LET_STMT);

impl LetStmt {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// The optional declared type of the binding.
    pub fn ty(&self) -> Option<ReturnType> {
        child_node(&self.syntax)
    }

    pub fn value(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        child_expr(&self.syntax)
    }
}
