//! Symbol table with shadow prohibition.
//!
//! Scopes form a stack: the global scope holds the prelude and module
//! bindings, and each function, block, lambda body, and match arm pushes a
//! fresh frame. Lookup searches from the innermost frame outward.
//!
//! Declaration is where Manaknight differs from most languages: a name may
//! not be declared if it already exists in the current frame *or any
//! enclosing frame*. There is no shadowing anywhere.

use rowan::TextRange;
use rustc_hash::FxHashMap;

use crate::ty::Scheme;

/// What kind of thing a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    /// A tagged-union constructor such as `Some`.
    Constructor,
    Type,
    Effect,
    Module,
}

/// A named entry in some scope.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scheme: Scheme,
    /// Where the symbol was declared; zero-width for prelude entries.
    pub span: TextRange,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, scheme: Scheme, span: TextRange) -> Self {
        Symbol {
            name: name.into(),
            kind,
            scheme,
            span,
        }
    }
}

/// Error returned when a declaration would shadow or duplicate a name.
#[derive(Debug, Clone)]
pub struct AlreadyDeclared {
    pub name: String,
    /// Span of the earlier declaration.
    pub original_span: TextRange,
}

/// The scope stack. Index 0 is the global scope.
pub struct ScopeTable {
    scopes: Vec<FxHashMap<String, Symbol>>,
}

impl ScopeTable {
    /// Create a table with one empty global scope.
    pub fn new() -> Self {
        ScopeTable {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Push a new empty scope onto the stack.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the top scope from the stack.
    ///
    /// # Panics
    ///
    /// Panics if called when only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Declare a symbol in the current (topmost) scope.
    ///
    /// Fails when the name already exists in *any* scope on the stack:
    /// Manaknight prohibits shadowing outright.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), AlreadyDeclared> {
        for scope in self.scopes.iter().rev() {
            if let Some(existing) = scope.get(&symbol.name) {
                return Err(AlreadyDeclared {
                    name: symbol.name.clone(),
                    original_span: existing.span,
                });
            }
        }
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Look up a name, searching from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
        }
        None
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}
