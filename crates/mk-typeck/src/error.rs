//! Semantic error types for the type checker, effect analyzer, and
//! exhaustiveness checker.
//!
//! Every variant carries its source span and maps onto a stable catalog
//! code via [`TypeError::code`]. Messages are rendered by the `Display`
//! impl; the driver adds file/line/column.

use std::fmt;

use mk_common::diag::{codes, ErrorCode};
use rowan::TextRange;

use crate::ty::Ty;

/// A semantic error found during checking.
#[derive(Clone, Debug)]
pub enum TypeError {
    /// A name is referenced but not in scope (E2001).
    UnknownIdentifier { name: String, span: TextRange },
    /// A type name is referenced but not defined (E2001).
    UnknownType { name: String, span: TextRange },
    /// Two types that should be equal are not (E2002).
    Mismatch {
        expected: Ty,
        found: Ty,
        span: TextRange,
    },
    /// A non-function value is called (E2002).
    NotAFunction { found: Ty, span: TextRange },
    /// Equality on a function-typed operand (E2002).
    NotComparable { found: Ty, span: TextRange },
    /// Comparison operands must both be Int or both be String (E2002).
    BadComparison {
        left: Ty,
        right: Ty,
        span: TextRange,
    },
    /// Field access on a type without that field (E2002).
    NoSuchField {
        ty: Ty,
        field: String,
        span: TextRange,
    },
    /// Record construction missing a declared field (E2002).
    MissingField {
        type_name: String,
        field: String,
        span: TextRange,
    },
    /// Record construction naming an undeclared field (E2002).
    UnknownField {
        type_name: String,
        field: String,
        span: TextRange,
    },
    /// Record construction requires named arguments (E2002).
    PositionalRecordArgs { type_name: String, span: TextRange },
    /// Union constructors take positional arguments (E2002).
    NamedConstructorArgs { name: String, span: TextRange },
    /// A pattern names a constructor of a different type (E2002).
    NotAConstructorOf {
        name: String,
        type_name: String,
        span: TextRange,
    },
    /// Call or pattern with the wrong number of arguments (E2003).
    ArityMismatch {
        expected: usize,
        found: usize,
        span: TextRange,
    },
    /// Generic type applied to the wrong number of arguments (E2003).
    TypeArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: TextRange,
    },
    /// The body's value does not match the declared return type (E2004).
    ReturnTypeMismatch {
        fn_name: String,
        expected: Ty,
        found: Ty,
        span: TextRange,
    },
    /// Some control path produces no value (E2005).
    NonTotalFunction { fn_name: String, span: TextRange },
    /// Declaration shadows or duplicates a name in scope (E2006).
    ShadowedName { name: String, span: TextRange },
    /// The condition of an `if` is not Bool (E2007).
    ConditionNotBool { found: Ty, span: TextRange },

    /// A call introduces an effect missing from the declared set (E3001).
    UndeclaredEffect {
        effect: String,
        fn_name: String,
        span: TextRange,
    },
    /// An effect leaks into a pure function (E3002).
    EffectInPure {
        effects: Vec<String>,
        fn_name: String,
        span: TextRange,
    },
    /// A lambda body performs an effect (E3004).
    EffectInLambda { effect: String, span: TextRange },
    /// An effect name is not declared anywhere in the program (E3005).
    UnknownEffect { effect: String, span: TextRange },

    /// A match does not cover every constructor (E4001).
    NonExhaustiveMatch {
        scrutinee_type: String,
        missing: Vec<String>,
        span: TextRange,
    },
    /// The scrutinee is not a tagged union (E4002).
    NonAdtScrutinee { found: Ty, span: TextRange },
    /// An arm repeats an already-covered constructor (E4003).
    DuplicateArm { name: String, span: TextRange },
    /// An arm follows a wildcard and can never match (E4003).
    UnreachableArm { span: TextRange },
    /// A wildcard arm when every constructor is already covered (E4003).
    RedundantWildcard { span: TextRange },
    /// Arm result types do not agree (E4004).
    ArmTypeMismatch {
        expected: Ty,
        found: Ty,
        span: TextRange,
    },

    /// Import of a symbol the module does not export (E5003).
    NotExported {
        module: String,
        name: String,
        span: TextRange,
    },

    /// A route parameter is not a primitive-typed path placeholder (E6003).
    BadRouteParam { name: String, span: TextRange },
}

impl TypeError {
    /// The primary span of this error.
    pub fn span(&self) -> TextRange {
        match self {
            TypeError::UnknownIdentifier { span, .. }
            | TypeError::UnknownType { span, .. }
            | TypeError::Mismatch { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::NotComparable { span, .. }
            | TypeError::BadComparison { span, .. }
            | TypeError::NoSuchField { span, .. }
            | TypeError::MissingField { span, .. }
            | TypeError::UnknownField { span, .. }
            | TypeError::PositionalRecordArgs { span, .. }
            | TypeError::NamedConstructorArgs { span, .. }
            | TypeError::NotAConstructorOf { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::TypeArityMismatch { span, .. }
            | TypeError::ReturnTypeMismatch { span, .. }
            | TypeError::NonTotalFunction { span, .. }
            | TypeError::ShadowedName { span, .. }
            | TypeError::ConditionNotBool { span, .. }
            | TypeError::UndeclaredEffect { span, .. }
            | TypeError::EffectInPure { span, .. }
            | TypeError::EffectInLambda { span, .. }
            | TypeError::UnknownEffect { span, .. }
            | TypeError::NonExhaustiveMatch { span, .. }
            | TypeError::NonAdtScrutinee { span, .. }
            | TypeError::DuplicateArm { span, .. }
            | TypeError::UnreachableArm { span }
            | TypeError::RedundantWildcard { span }
            | TypeError::ArmTypeMismatch { span, .. }
            | TypeError::NotExported { span, .. }
            | TypeError::BadRouteParam { span, .. } => *span,
        }
    }

    /// The stable catalog code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeError::UnknownIdentifier { .. } | TypeError::UnknownType { .. } => {
                codes::UNKNOWN_IDENTIFIER
            }
            TypeError::Mismatch { .. }
            | TypeError::NotAFunction { .. }
            | TypeError::NotComparable { .. }
            | TypeError::BadComparison { .. }
            | TypeError::NoSuchField { .. }
            | TypeError::MissingField { .. }
            | TypeError::UnknownField { .. }
            | TypeError::PositionalRecordArgs { .. }
            | TypeError::NamedConstructorArgs { .. }
            | TypeError::NotAConstructorOf { .. } => codes::TYPE_MISMATCH,
            TypeError::ArityMismatch { .. } | TypeError::TypeArityMismatch { .. } => {
                codes::ARITY_MISMATCH
            }
            TypeError::ReturnTypeMismatch { .. } => codes::RETURN_TYPE_MISMATCH,
            TypeError::NonTotalFunction { .. } => codes::NON_TOTAL_FUNCTION,
            TypeError::ShadowedName { .. } => codes::SHADOWED_NAME,
            TypeError::ConditionNotBool { .. } => codes::CONDITION_NOT_BOOL,
            TypeError::UndeclaredEffect { .. } => codes::UNDECLARED_EFFECT,
            TypeError::EffectInPure { .. } => codes::EFFECT_IN_PURE,
            TypeError::EffectInLambda { .. } => codes::EFFECT_IN_LAMBDA,
            TypeError::UnknownEffect { .. } => codes::UNKNOWN_EFFECT,
            TypeError::NonExhaustiveMatch { .. } => codes::NON_EXHAUSTIVE_MATCH,
            TypeError::NonAdtScrutinee { .. } => codes::NON_ADT_SCRUTINEE,
            TypeError::DuplicateArm { .. }
            | TypeError::UnreachableArm { .. }
            | TypeError::RedundantWildcard { .. } => codes::DUPLICATE_ARM,
            TypeError::ArmTypeMismatch { .. } => codes::ARM_TYPE_MISMATCH,
            TypeError::NotExported { .. } => codes::NOT_EXPORTED,
            TypeError::BadRouteParam { .. } => codes::BAD_ROUTE_PARAM,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnknownIdentifier { name, .. } => {
                write!(f, "unknown identifier `{name}`")
            }
            TypeError::UnknownType { name, .. } => write!(f, "unknown type `{name}`"),
            TypeError::Mismatch {
                expected, found, ..
            } => write!(f, "type mismatch: expected `{expected}`, found `{found}`"),
            TypeError::NotAFunction { found, .. } => {
                write!(f, "`{found}` is not a function")
            }
            TypeError::NotComparable { found, .. } => {
                write!(f, "values of type `{found}` cannot be compared for equality")
            }
            TypeError::BadComparison { left, right, .. } => write!(
                f,
                "comparison operands must both be Int or both be String, found `{left}` and `{right}`"
            ),
            TypeError::NoSuchField { ty, field, .. } => {
                write!(f, "type `{ty}` has no field `{field}`")
            }
            TypeError::MissingField {
                type_name, field, ..
            } => write!(f, "missing field `{field}` in construction of `{type_name}`"),
            TypeError::UnknownField {
                type_name, field, ..
            } => write!(f, "`{type_name}` has no field `{field}`"),
            TypeError::PositionalRecordArgs { type_name, .. } => {
                write!(f, "record `{type_name}` must be constructed with named arguments")
            }
            TypeError::NamedConstructorArgs { name, .. } => {
                write!(f, "constructor `{name}` takes positional arguments")
            }
            TypeError::NotAConstructorOf {
                name, type_name, ..
            } => write!(f, "`{name}` is not a constructor of `{type_name}`"),
            TypeError::ArityMismatch {
                expected, found, ..
            } => write!(f, "expected {expected} arguments, found {found}"),
            TypeError::TypeArityMismatch {
                name,
                expected,
                found,
                ..
            } => write!(
                f,
                "type `{name}` expects {expected} type arguments, found {found}"
            ),
            TypeError::ReturnTypeMismatch {
                fn_name,
                expected,
                found,
                ..
            } => write!(
                f,
                "`{fn_name}` declares return type `{expected}` but its body produces `{found}`"
            ),
            TypeError::NonTotalFunction { fn_name, .. } => write!(
                f,
                "not every path through `{fn_name}` produces a value"
            ),
            TypeError::ShadowedName { name, .. } => {
                write!(f, "`{name}` is already defined in an enclosing scope")
            }
            TypeError::ConditionNotBool { found, .. } => {
                write!(f, "if condition must be Bool, found `{found}`")
            }
            TypeError::UndeclaredEffect {
                effect, fn_name, ..
            } => write!(
                f,
                "`{fn_name}` uses effect `{effect}` but does not declare it"
            ),
            TypeError::EffectInPure {
                effects, fn_name, ..
            } => write!(
                f,
                "pure function `{fn_name}` performs effects: {}",
                effects.join(", ")
            ),
            TypeError::EffectInLambda { effect, .. } => {
                write!(f, "lambdas must be pure; this one uses effect `{effect}`")
            }
            TypeError::UnknownEffect { effect, .. } => {
                write!(f, "effect `{effect}` is not declared anywhere in the program")
            }
            TypeError::NonExhaustiveMatch {
                scrutinee_type,
                missing,
                ..
            } => write!(
                f,
                "match on `{scrutinee_type}` is not exhaustive: missing {}",
                missing
                    .iter()
                    .map(|m| format!("`{m}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TypeError::NonAdtScrutinee { found, .. } => {
                write!(f, "cannot match on `{found}`: not a tagged union")
            }
            TypeError::DuplicateArm { name, .. } => {
                write!(f, "constructor `{name}` is matched more than once")
            }
            TypeError::UnreachableArm { .. } => {
                write!(f, "arm is unreachable: it follows a wildcard")
            }
            TypeError::RedundantWildcard { .. } => {
                write!(f, "wildcard is redundant: every constructor is already covered")
            }
            TypeError::ArmTypeMismatch {
                expected, found, ..
            } => write!(
                f,
                "match arms disagree: expected `{expected}`, found `{found}`"
            ),
            TypeError::NotExported { module, name, .. } => {
                write!(f, "`{name}` is not exported by module `{module}`")
            }
            TypeError::BadRouteParam { name, .. } => write!(
                f,
                "route parameter `{name}` must be a path placeholder with a primitive type"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> TextRange {
        TextRange::empty(0.into())
    }

    #[test]
    fn codes_match_catalog_ranges() {
        let shadow = TypeError::ShadowedName {
            name: "x".into(),
            span: span(),
        };
        assert_eq!(shadow.code(), codes::SHADOWED_NAME);

        let leak = TypeError::EffectInPure {
            effects: vec!["time".into()],
            fn_name: "pure".into(),
            span: span(),
        };
        assert_eq!(leak.code(), codes::EFFECT_IN_PURE);

        let missing = TypeError::NonExhaustiveMatch {
            scrutinee_type: "Option<Int>".into(),
            missing: vec!["None".into()],
            span: span(),
        };
        assert_eq!(missing.code(), codes::NON_EXHAUSTIVE_MATCH);
    }

    #[test]
    fn non_exhaustive_message_lists_missing_constructors() {
        let err = TypeError::NonExhaustiveMatch {
            scrutinee_type: "Option<Int>".into(),
            missing: vec!["None".into()],
            span: span(),
        };
        assert_eq!(
            err.to_string(),
            "match on `Option<Int>` is not exhaustive: missing `None`"
        );
    }
}
