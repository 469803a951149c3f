//! Typed AST nodes for match-arm patterns.

use crate::ast::item::Name;
use crate::ast::{ast_node, child_node, child_token, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

/// An arm-level pattern: a constructor or the wildcard `_`.
#[derive(Debug, Clone)]
pub enum Pattern {
    Constructor(ConstructorPat),
    Wildcard(WildcardPat),
}

impl Pattern {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::CONSTRUCTOR_PAT => {
                Some(Pattern::Constructor(ConstructorPat { syntax: node }))
            }
            SyntaxKind::WILDCARD_PAT => Some(Pattern::Wildcard(WildcardPat { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Pattern::Constructor(n) => &n.syntax,
            Pattern::Wildcard(n) => &n.syntax,
        }
    }
}

ast_node!(ConstructorPat, CONSTRUCTOR_PAT);

impl ConstructorPat {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// The sub-patterns bound against the constructor's fields, in order.
    pub fn sub_patterns(&self) -> Vec<SubPattern> {
        self.syntax
            .children()
            .filter_map(SubPattern::cast)
            .collect()
    }
}

ast_node!(WildcardPat, WILDCARD_PAT);

/// A sub-pattern inside a constructor pattern: a field binding or `_`.
#[derive(Debug, Clone)]
pub enum SubPattern {
    /// `x` -- binds the field to a fresh immutable name.
    Binding(BindingPat),
    /// `_` -- ignores the field.
    Wildcard(WildcardPat),
}

impl SubPattern {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::BINDING_PAT => Some(SubPattern::Binding(BindingPat { syntax: node })),
            SyntaxKind::WILDCARD_PAT => Some(SubPattern::Wildcard(WildcardPat { syntax: node })),
            _ => None,
        }
    }
}

ast_node!(BindingPat, BINDING_PAT);

impl BindingPat {
    /// The bound name's text.
    pub fn text(&self) -> String {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}
