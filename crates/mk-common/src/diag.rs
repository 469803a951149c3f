//! The Manaknight diagnostic catalog.
//!
//! Error codes are the compiler's public contract: they are stable once
//! assigned and grouped into nine fixed ranges, one per category. New codes
//! may only be appended within a range. Every pass reports errors through
//! this vocabulary; the driver renders them in a deterministic order.

use std::fmt;

use serde::Serialize;

/// A stable diagnostic code, e.g. `E2006`.
///
/// The numeric value encodes the category: `code / 1000` selects one of the
/// nine ranges listed in [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    /// The category this code belongs to, derived from its thousands range.
    pub fn category(self) -> Category {
        match self.0 / 1000 {
            1 => Category::Syntax,
            2 => Category::Type,
            3 => Category::Effect,
            4 => Category::Pattern,
            5 => Category::Module,
            6 => Category::Api,
            7 => Category::Runtime,
            8 => Category::Resource,
            _ => Category::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.0)
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// The nine diagnostic categories, one per thousand-range of codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// E1000-E1999: lexical and structural parse errors.
    Syntax,
    /// E2000-E2999: name resolution and type errors.
    Type,
    /// E3000-E3999: effect inference and capability errors.
    Effect,
    /// E4000-E4999: pattern-match coverage errors.
    Pattern,
    /// E5000-E5999: module resolution errors.
    Module,
    /// E6000-E6999: API route declaration errors.
    Api,
    /// E7000-E7999: runtime contract violations (raised by the host VM).
    Runtime,
    /// E8000-E8999: resource exhaustion (raised by the host VM).
    Resource,
    /// E9000-E9999: internal compiler errors; never shown verbatim.
    Internal,
}

/// Every code the compiler (or its runtime contract) can produce.
///
/// Runtime and resource codes are declared here because the catalog is the
/// shared contract with the host VM; the compiler itself never raises them.
pub mod codes {
    use super::ErrorCode;

    // ── Syntax ─────────────────────────────────────────────────────────
    /// Unterminated string literal.
    pub const UNTERMINATED_STRING: ErrorCode = ErrorCode(1001);
    /// Integer literal does not fit in a signed 64-bit value.
    pub const INT_OVERFLOW: ErrorCode = ErrorCode(1002);
    /// Unexpected character in the input.
    pub const UNEXPECTED_CHARACTER: ErrorCode = ErrorCode(1003);
    /// Unexpected token / structural parse error.
    pub const UNEXPECTED_TOKEN: ErrorCode = ErrorCode(1004);
    /// Comparison operators cannot be chained.
    pub const CHAINED_COMPARISON: ErrorCode = ErrorCode(1005);
    /// `if` expression missing its `else` branch.
    pub const IF_MISSING_ELSE: ErrorCode = ErrorCode(1006);

    // ── Type ───────────────────────────────────────────────────────────
    /// Reference to an identifier that is not in scope.
    pub const UNKNOWN_IDENTIFIER: ErrorCode = ErrorCode(2001);
    /// Two types that should be equal are not.
    pub const TYPE_MISMATCH: ErrorCode = ErrorCode(2002);
    /// Call with the wrong number of arguments.
    pub const ARITY_MISMATCH: ErrorCode = ErrorCode(2003);
    /// Function body value does not match the declared return type.
    pub const RETURN_TYPE_MISMATCH: ErrorCode = ErrorCode(2004);
    /// Some control path through the body produces no value.
    pub const NON_TOTAL_FUNCTION: ErrorCode = ErrorCode(2005);
    /// Declaration shadows or duplicates a name in scope.
    pub const SHADOWED_NAME: ErrorCode = ErrorCode(2006);
    /// Condition of `if` is not Bool.
    pub const CONDITION_NOT_BOOL: ErrorCode = ErrorCode(2007);

    // ── Effect ─────────────────────────────────────────────────────────
    /// Inferred effect missing from the function's declared set.
    pub const UNDECLARED_EFFECT: ErrorCode = ErrorCode(3001);
    /// Effect leak into a pure (no `uses`) function.
    pub const EFFECT_IN_PURE: ErrorCode = ErrorCode(3002);
    /// Lambda bodies must be pure.
    pub const EFFECT_IN_LAMBDA: ErrorCode = ErrorCode(3004);
    /// Effect name not declared anywhere in the program.
    pub const UNKNOWN_EFFECT: ErrorCode = ErrorCode(3005);

    // ── Pattern ────────────────────────────────────────────────────────
    /// Match does not cover every constructor.
    pub const NON_EXHAUSTIVE_MATCH: ErrorCode = ErrorCode(4001);
    /// Scrutinee is not a tagged union.
    pub const NON_ADT_SCRUTINEE: ErrorCode = ErrorCode(4002);
    /// Duplicate or unreachable match arm.
    pub const DUPLICATE_ARM: ErrorCode = ErrorCode(4003);
    /// Match arm result types do not agree.
    pub const ARM_TYPE_MISMATCH: ErrorCode = ErrorCode(4004);

    // ── Module ─────────────────────────────────────────────────────────
    /// Module file not found.
    pub const MODULE_NOT_FOUND: ErrorCode = ErrorCode(5001);
    /// Module defined in two locations.
    pub const DUPLICATE_MODULE: ErrorCode = ErrorCode(5002);
    /// Import of a symbol the module does not export.
    pub const NOT_EXPORTED: ErrorCode = ErrorCode(5003);
    /// Circular module dependency.
    pub const CIRCULAR_IMPORT: ErrorCode = ErrorCode(5004);

    // ── API ────────────────────────────────────────────────────────────
    /// Route method is not a known HTTP method.
    pub const BAD_METHOD: ErrorCode = ErrorCode(6001);
    /// Route path contains an empty segment.
    pub const BAD_PATH: ErrorCode = ErrorCode(6002);
    /// Route parameter is not a primitive-typed path placeholder.
    pub const BAD_ROUTE_PARAM: ErrorCode = ErrorCode(6003);

    // ── Runtime (host-raised; catalog-declared) ────────────────────────
    /// Malformed Option/Result payload observed at runtime.
    pub const INVALID_SUM_PAYLOAD: ErrorCode = ErrorCode(7001);
    /// Serialization failure at an API boundary.
    pub const SERIALIZATION_FAILED: ErrorCode = ErrorCode(7002);
    /// Declared effect binding missing at injection time.
    pub const MISSING_EFFECT_BINDING: ErrorCode = ErrorCode(7003);
    /// Bytecode `__meta` incompatible with the runtime.
    pub const INCOMPATIBLE_BYTECODE: ErrorCode = ErrorCode(7004);

    // ── Resource (host-raised; catalog-declared) ───────────────────────
    /// Request exceeded its CPU budget.
    pub const TIMEOUT: ErrorCode = ErrorCode(8001);
    /// Request exceeded its memory budget.
    pub const OUT_OF_MEMORY: ErrorCode = ErrorCode(8002);
    /// Recursion limit exceeded.
    pub const RECURSION_LIMIT: ErrorCode = ErrorCode(8003);
    /// Allocation count limit exceeded.
    pub const ALLOCATION_LIMIT: ErrorCode = ErrorCode(8004);

    // ── Internal ───────────────────────────────────────────────────────
    /// Compiler bug marker. Production builds render a generic message.
    pub const INTERNAL_ERROR: ErrorCode = ErrorCode(9001);
}

/// A rendered diagnostic: the structured record the programmatic interface
/// returns and the CLI prints as
/// `Error E####: <message> at <file>:<line>:<column>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub category: Category,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Diagnostic {
    /// Create a diagnostic; the category is derived from the code.
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error {}: {} at {}:{}:{}",
            self.code, self.message, self.file, self.line, self.column
        )
    }
}

/// Sort diagnostics into the deterministic reporting order: by file, then
/// by (line, column), then by code.
pub fn sort_diagnostics(diags: &mut [Diagnostic]) {
    diags.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
            .then(a.code.cmp(&b.code))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_display_is_zero_padded() {
        assert_eq!(codes::UNTERMINATED_STRING.to_string(), "E1001");
        assert_eq!(codes::INTERNAL_ERROR.to_string(), "E9001");
    }

    #[test]
    fn category_from_range() {
        assert_eq!(codes::UNEXPECTED_TOKEN.category(), Category::Syntax);
        assert_eq!(codes::SHADOWED_NAME.category(), Category::Type);
        assert_eq!(codes::EFFECT_IN_PURE.category(), Category::Effect);
        assert_eq!(codes::NON_EXHAUSTIVE_MATCH.category(), Category::Pattern);
        assert_eq!(codes::CIRCULAR_IMPORT.category(), Category::Module);
        assert_eq!(codes::BAD_METHOD.category(), Category::Api);
        assert_eq!(codes::INCOMPATIBLE_BYTECODE.category(), Category::Runtime);
        assert_eq!(codes::TIMEOUT.category(), Category::Resource);
        assert_eq!(codes::INTERNAL_ERROR.category(), Category::Internal);
    }

    #[test]
    fn diagnostic_display_format() {
        let d = Diagnostic::new(codes::SHADOWED_NAME, "`x` is already defined", "main.mk", 3, 9);
        assert_eq!(
            d.to_string(),
            "Error E2006: `x` is already defined at main.mk:3:9"
        );
    }

    #[test]
    fn sort_is_file_then_position_then_code() {
        let mut diags = vec![
            Diagnostic::new(codes::TYPE_MISMATCH, "b", "b.mk", 1, 1),
            Diagnostic::new(codes::TYPE_MISMATCH, "a2", "a.mk", 2, 1),
            Diagnostic::new(codes::ARITY_MISMATCH, "a1b", "a.mk", 1, 5),
            Diagnostic::new(codes::TYPE_MISMATCH, "a1a", "a.mk", 1, 5),
        ];
        sort_diagnostics(&mut diags);
        let order: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(order, vec!["a1a", "a1b", "a2", "b"]);
    }
}
