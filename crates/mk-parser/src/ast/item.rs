//! Typed AST nodes for declarations and top-level items.

use crate::ast::expr::Block;
use crate::ast::ty::TypeRef;
use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Item enum ────────────────────────────────────────────────────────────

/// Any top-level or module-level item.
#[derive(Debug, Clone)]
pub enum Item {
    Module(ModuleDef),
    Fn(FnDef),
    Type(TypeDef),
    Effect(EffectDef),
    Import(ImportDecl),
    Api(ApiRoute),
}

impl Item {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::MODULE_DEF => Some(Item::Module(ModuleDef { syntax: node })),
            SyntaxKind::FN_DEF => Some(Item::Fn(FnDef { syntax: node })),
            SyntaxKind::TYPE_DEF => Some(Item::Type(TypeDef { syntax: node })),
            SyntaxKind::EFFECT_DEF => Some(Item::Effect(EffectDef { syntax: node })),
            SyntaxKind::IMPORT_DECL => Some(Item::Import(ImportDecl { syntax: node })),
            SyntaxKind::API_ROUTE => Some(Item::Api(ApiRoute { syntax: node })),
            _ => None,
        }
    }

    /// Access the underlying syntax node regardless of variant.
    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::Module(n) => &n.syntax,
            Item::Fn(n) => &n.syntax,
            Item::Type(n) => &n.syntax,
            Item::Effect(n) => &n.syntax,
            Item::Import(n) => &n.syntax,
            Item::Api(n) => &n.syntax,
        }
    }
}

// ── Source file ──────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    /// The optional `language v1.0` header.
    pub fn language_header(&self) -> Option<LanguageHeader> {
        child_node(&self.syntax)
    }

    /// All top-level items in source order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.syntax.children().filter_map(Item::cast)
    }
}

ast_node!(LanguageHeader, LANGUAGE_HEADER);

impl LanguageHeader {
    /// The declared version, e.g. `"1.0"` for `language v1.0`.
    pub fn version(&self) -> Option<String> {
        let mut tokens = self
            .syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| !t.kind().is_trivia());
        let _language = tokens.next()?;
        let major = tokens.next()?; // `v1`
        let _dot = tokens.next()?;
        let minor = tokens.next()?;
        let major = major.text().strip_prefix('v')?.to_string();
        Some(format!("{}.{}", major, minor.text()))
    }
}

// ── Names and paths ──────────────────────────────────────────────────────

ast_node!(Name, NAME);

impl Name {
    /// The identifier text of this name.
    pub fn text(&self) -> String {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

ast_node!(Path, PATH);

impl Path {
    /// The identifier segments of the path.
    pub fn segments(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .collect()
    }

    /// The dotted rendering of the path, e.g. `"a.b.c"`.
    pub fn text(&self) -> String {
        self.segments().join(".")
    }
}

// ── Module definition ────────────────────────────────────────────────────

ast_node!(ModuleDef, MODULE_DEF);

impl ModuleDef {
    /// The module's dotted name path.
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// The declarations and routes inside the module, in source order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.syntax.children().filter_map(Item::cast)
    }
}

// ── Function definition ──────────────────────────────────────────────────

ast_node!(FnDef, FN_DEF);

impl FnDef {
    /// Whether the function carries a `pub` marker.
    pub fn is_pub(&self) -> bool {
        child_node::<Visibility>(&self.syntax).is_some()
    }

    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    /// The declared return type; `None` means `Unit`.
    pub fn return_type(&self) -> Option<ReturnType> {
        child_node(&self.syntax)
    }

    /// The declared effect set; `None` or an empty list means pure.
    pub fn uses_clause(&self) -> Option<UsesClause> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

ast_node!(Visibility, VISIBILITY);
ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.syntax.children().find_map(TypeRef::cast)
    }
}

ast_node!(ReturnType, RETURN_TYPE);

impl ReturnType {
    pub fn ty(&self) -> Option<TypeRef> {
        self.syntax.children().find_map(TypeRef::cast)
    }
}

ast_node!(UsesClause, USES_CLAUSE);

impl UsesClause {
    /// The declared effect names, in source order.
    pub fn effects(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .collect()
    }
}

// ── Type definition ──────────────────────────────────────────────────────

ast_node!(TypeDef, TYPE_DEF);

impl TypeDef {
    pub fn is_pub(&self) -> bool {
        child_node::<Visibility>(&self.syntax).is_some()
    }

    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// Declared generic parameter names, e.g. `["T", "E"]`.
    pub fn generic_params(&self) -> Vec<String> {
        match child_node::<GenericParamList>(&self.syntax) {
            Some(list) => list.names(),
            None => Vec::new(),
        }
    }

    /// The record field list, when this is a record type.
    pub fn record_fields(&self) -> Option<RecordFields> {
        child_node(&self.syntax)
    }

    /// The constructor variants, when this is a tagged union.
    pub fn variants(&self) -> Vec<VariantDef> {
        child_nodes(&self.syntax).collect()
    }

    /// Whether this type is a tagged union (has at least one variant).
    pub fn is_union(&self) -> bool {
        !self.variants().is_empty()
    }
}

ast_node!(GenericParamList, GENERIC_PARAM_LIST);

impl GenericParamList {
    pub fn names(&self) -> Vec<String> {
        child_nodes::<Name>(&self.syntax)
            .map(|n| n.text())
            .collect()
    }
}

ast_node!(RecordFields, RECORD_FIELDS);

impl RecordFields {
    pub fn fields(&self) -> impl Iterator<Item = FieldDef> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(FieldDef, FIELD_DEF);

impl FieldDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.syntax.children().find_map(TypeRef::cast)
    }
}

ast_node!(VariantDef, VARIANT_DEF);

impl VariantDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn fields(&self) -> Vec<FieldDef> {
        child_nodes(&self.syntax).collect()
    }
}

// ── Effect declaration ───────────────────────────────────────────────────

ast_node!(EffectDef, EFFECT_DEF);

impl EffectDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }
}

// ── Import declaration ───────────────────────────────────────────────────

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// The alias after `as`, when present.
    pub fn alias(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// The name the imported module is bound to in this module's scope:
    /// the alias, or the last path segment.
    pub fn binding_name(&self) -> Option<String> {
        if let Some(alias) = self.alias() {
            return Some(alias.text());
        }
        self.path().and_then(|p| p.segments().last().cloned())
    }
}

// ── API routes ───────────────────────────────────────────────────────────

ast_node!(ApiRoute, API_ROUTE);

impl ApiRoute {
    /// The HTTP method name, e.g. `"GET"`.
    pub fn method(&self) -> Option<String> {
        child_node::<Name>(&self.syntax).map(|n| n.text())
    }

    /// The raw path string token, quotes included.
    pub fn path_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::STRING_LITERAL)
    }

    /// The unescaped route path, e.g. `"/users/:id"`.
    pub fn path(&self) -> Option<String> {
        self.path_token().map(|t| mk_lexer::unescape_string(t.text()))
    }

    /// The placeholder names in the path, in order: `["id"]` for `/u/:id`.
    pub fn placeholders(&self) -> Vec<String> {
        match self.path() {
            Some(path) => path
                .split('/')
                .filter_map(|seg| seg.strip_prefix(':'))
                .map(|s| s.to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn return_type(&self) -> Option<ReturnType> {
        child_node(&self.syntax)
    }

    pub fn uses_clause(&self) -> Option<UsesClause> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    /// The generated handler name: `get_users_id` for `GET /users/:id`.
    pub fn handler_name(&self) -> String {
        let method = self.method().unwrap_or_default().to_lowercase();
        let path = self.path().unwrap_or_default();
        let mut name = method;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            name.push('_');
            name.push_str(segment.trim_start_matches(':'));
        }
        name
    }
}
