//! Typed AST nodes for type references.

use crate::ast::item::{Path, UsesClause};
use crate::ast::{ast_node, child_node, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

/// Any syntactic type form.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// `Int`, `Point`, `util.Money`
    Path(PathType),
    /// `Option<Int>`, `Map<String, Int>`
    Generic(GenericType),
    /// `(Int, Int) -> Bool uses { log }`
    Fn(FnType),
}

impl TypeRef {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::PATH_TYPE => Some(TypeRef::Path(PathType { syntax: node })),
            SyntaxKind::GENERIC_TYPE => Some(TypeRef::Generic(GenericType { syntax: node })),
            SyntaxKind::FN_TYPE => Some(TypeRef::Fn(FnType { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            TypeRef::Path(n) => &n.syntax,
            TypeRef::Generic(n) => &n.syntax,
            TypeRef::Fn(n) => &n.syntax,
        }
    }
}

ast_node!(PathType, PATH_TYPE);

impl PathType {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// The dotted name, e.g. `"Int"` or `"util.Money"`.
    pub fn text(&self) -> String {
        self.path().map(|p| p.text()).unwrap_or_default()
    }
}

ast_node!(GenericType, GENERIC_TYPE);

impl GenericType {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// The applied type constructor name, e.g. `"Option"`.
    pub fn name(&self) -> String {
        self.path().map(|p| p.text()).unwrap_or_default()
    }

    /// The type arguments in source order.
    pub fn args(&self) -> Vec<TypeRef> {
        match self
            .syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::GENERIC_ARG_LIST)
        {
            Some(list) => list.children().filter_map(TypeRef::cast).collect(),
            None => Vec::new(),
        }
    }
}

ast_node!(FnType, FN_TYPE);

impl FnType {
    /// Parameter types followed by the return type, in token order. The
    /// return type is the child after the `->` token.
    pub fn param_types(&self) -> Vec<TypeRef> {
        let mut types = self.all_types();
        if !types.is_empty() {
            types.pop();
        }
        types
    }

    pub fn return_type(&self) -> Option<TypeRef> {
        self.all_types().pop()
    }

    pub fn uses_clause(&self) -> Option<UsesClause> {
        child_node(&self.syntax)
    }

    fn all_types(&self) -> Vec<TypeRef> {
        self.syntax.children().filter_map(TypeRef::cast).collect()
    }
}
