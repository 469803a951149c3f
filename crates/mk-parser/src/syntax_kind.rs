//! SyntaxKind enum for the Manaknight CST.
//!
//! This is a superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE) plus
//! composite node kinds for CST nodes produced by the parser.

use mk_common::token::TokenKind;

/// Every kind of syntax element in the Manaknight CST.
///
/// Token kinds (leaves) are mapped 1:1 from [`TokenKind`]. Composite node
/// kinds represent parser-produced tree nodes. The first two values are
/// sentinels used by the event-based parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for incomplete/unfinished parser events.
    TOMBSTONE = 0,
    /// Wrapper for tokens/nodes that couldn't be parsed.
    ERROR_NODE = 1,

    // ── Keywords (16) ──────────────────────────────────────────────────
    API_KW,
    AS_KW,
    EFFECT_KW,
    ELSE_KW,
    FALSE_KW,
    FN_KW,
    FUNCTION_KW,
    IF_KW,
    IMPORT_KW,
    LET_KW,
    MATCH_KW,
    MODULE_KW,
    PUB_KW,
    TRUE_KW,
    TYPE_KW,
    USES_KW,

    // ── Operators (19) ─────────────────────────────────────────────────
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    EQ_EQ,
    NOT_EQ,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    AMP_AMP,
    PIPE_PIPE,
    BANG,
    /// `|>` pipe operator
    PIPE,
    /// `|` union-variant separator
    BAR,
    EQ,
    ARROW,
    FAT_ARROW,

    // ── Delimiters (4) ─────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACE,
    R_BRACE,

    // ── Punctuation (4) ────────────────────────────────────────────────
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // ── Literals (2) ───────────────────────────────────────────────────
    INT_LITERAL,
    STRING_LITERAL,

    // ── Identifiers and comments (2) ───────────────────────────────────
    IDENT,
    COMMENT,

    // ── Special (2) ────────────────────────────────────────────────────
    EOF,
    /// Lexer error token
    ERROR,

    // ── Composite node kinds ───────────────────────────────────────────
    /// Root node of a parsed source file.
    SOURCE_FILE,
    /// `language v1.0` version header.
    LANGUAGE_HEADER,
    /// Module definition: `module a.b { ... }`
    MODULE_DEF,
    /// Function definition: `fn name(params) : T uses { e } { ... }`
    FN_DEF,
    /// Type definition: `type Name<T> { ... }`
    TYPE_DEF,
    /// Record field list inside a type definition.
    RECORD_FIELDS,
    /// One `name: Type` field of a record or variant.
    FIELD_DEF,
    /// One constructor variant of a tagged union.
    VARIANT_DEF,
    /// Effect declaration: `effect log`
    EFFECT_DEF,
    /// Import declaration: `import a.b [as c]`
    IMPORT_DECL,
    /// API route: `api GET "/p/:x" (x: T) -> R { ... }`
    API_ROUTE,
    /// Dotted path: `a.b.c`
    PATH,
    /// Name in a definition position.
    NAME,
    /// `pub` visibility marker.
    VISIBILITY,
    /// Parameter list: `(a: T, b: U)`
    PARAM_LIST,
    /// Single parameter in a parameter list.
    PARAM,
    /// Declared effect set: `uses { time, log }`
    USES_CLAUSE,
    /// Generic parameter list: `<T, U>`
    GENERIC_PARAM_LIST,
    /// Generic argument list in a type application: `<Int, String>`
    GENERIC_ARG_LIST,
    /// Return-type annotation: `: Type` or `-> Type`
    RETURN_TYPE,
    /// Named or primitive type reference: `Int`, `util.Money`
    PATH_TYPE,
    /// Generic type application: `Option<Int>`
    GENERIC_TYPE,
    /// Function type: `(Int) -> Bool uses { log }`
    FN_TYPE,
    /// Block: `{ stmt* [tail-expr] }`
    BLOCK,
    /// Let binding statement: `let x = expr`
    LET_STMT,
    /// Expression statement (non-tail position).
    EXPR_STMT,
    /// Literal expression (int, string, bool, unit).
    LITERAL,
    /// Name reference (identifier used as expression).
    NAME_REF,
    /// Field access / qualified reference: `expr.name`
    FIELD_ACCESS,
    /// Function call: `f(args)`
    CALL_EXPR,
    /// Argument list: `(a, b)` or `(x: 1, y: 2)`
    ARG_LIST,
    /// Named argument in record construction: `x: 1`
    NAMED_ARG,
    /// Lambda: `fn (x: Int) => expr`
    LAMBDA_EXPR,
    /// If expression: `if cond { ... } else { ... }`
    IF_EXPR,
    /// Else branch of an if expression.
    ELSE_BRANCH,
    /// Match expression: `match x { arms }`
    MATCH_EXPR,
    /// Single arm in a match expression.
    MATCH_ARM,
    /// Binary expression: `a + b`, `a == b`, ...
    BINARY_EXPR,
    /// Unary expression: `-x`, `!x`
    UNARY_EXPR,
    /// Pipe expression: `x |> f`
    PIPE_EXPR,
    /// Parenthesized expression: `(expr)`
    PAREN_EXPR,
    /// Constructor pattern: `Some(x)`, `None`
    CONSTRUCTOR_PAT,
    /// Wildcard pattern: `_`
    WILDCARD_PAT,
    /// Binding sub-pattern: `x` inside `Some(x)`
    BINDING_PAT,
}

impl SyntaxKind {
    /// Whether this kind is trivia (skipped by the parser's lookahead).
    pub fn is_trivia(self) -> bool {
        self == SyntaxKind::COMMENT
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Api => SyntaxKind::API_KW,
            TokenKind::As => SyntaxKind::AS_KW,
            TokenKind::Effect => SyntaxKind::EFFECT_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Fn => SyntaxKind::FN_KW,
            TokenKind::Function => SyntaxKind::FUNCTION_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::Match => SyntaxKind::MATCH_KW,
            TokenKind::Module => SyntaxKind::MODULE_KW,
            TokenKind::Pub => SyntaxKind::PUB_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::Type => SyntaxKind::TYPE_KW,
            TokenKind::Uses => SyntaxKind::USES_KW,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Bar => SyntaxKind::BAR,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Arrow => SyntaxKind::ARROW,
            TokenKind::FatArrow => SyntaxKind::FAT_ARROW,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::StringLiteral => SyntaxKind::STRING_LITERAL,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kinds_map_one_to_one() {
        assert_eq!(SyntaxKind::from(TokenKind::Fn), SyntaxKind::FN_KW);
        assert_eq!(SyntaxKind::from(TokenKind::Pipe), SyntaxKind::PIPE);
        assert_eq!(SyntaxKind::from(TokenKind::Bar), SyntaxKind::BAR);
        assert_eq!(SyntaxKind::from(TokenKind::Eof), SyntaxKind::EOF);
    }

    #[test]
    fn only_comments_are_trivia() {
        assert!(SyntaxKind::COMMENT.is_trivia());
        assert!(!SyntaxKind::IDENT.is_trivia());
        assert!(!SyntaxKind::ERROR.is_trivia());
    }
}
