//! The exhaustiveness checker.
//!
//! Manaknight patterns are flat, so coverage is a covered-set walk rather
//! than a full usefulness analysis: each constructor arm adds its name to
//! the covered set, a wildcard covers the rest, and at the end every
//! constructor of the scrutinee's union must be accounted for.
//!
//! Reported here:
//! - E4001: uncovered constructors remain (the message lists them)
//! - E4003: a constructor matched twice, an arm after a wildcard, or a
//!   wildcard when everything is already covered

use std::collections::BTreeSet;

use rowan::TextRange;
use rustc_hash::FxHashMap;

use mk_parser::ast::expr::MatchExpr;
use mk_parser::ast::pat::Pattern;
use mk_parser::ast::AstNode;
use mk_parser::syntax_kind::SyntaxKind;
use mk_parser::Parse;

use crate::error::TypeError;
use crate::registry::TypeRegistry;
use crate::ty::Ty;

/// Check every `match` in the file for constructor coverage.
pub(crate) fn check_matches(
    parse: &Parse,
    types: &FxHashMap<TextRange, Ty>,
    registry: &TypeRegistry,
    errors: &mut Vec<TypeError>,
) {
    for node in parse.syntax().descendants() {
        if node.kind() != SyntaxKind::MATCH_EXPR {
            continue;
        }
        let Some(match_expr) = MatchExpr::cast(node) else {
            continue;
        };
        check_match(&match_expr, types, registry, errors);
    }
}

fn check_match(
    match_expr: &MatchExpr,
    types: &FxHashMap<TextRange, Ty>,
    registry: &TypeRegistry,
    errors: &mut Vec<TypeError>,
) {
    let Some(scrutinee) = match_expr.scrutinee() else {
        return;
    };
    let Some(scrutinee_ty) = types.get(&scrutinee.syntax().text_range()) else {
        return;
    };
    let Some(head) = scrutinee_ty.head_name() else {
        return;
    };
    // Non-union scrutinees were already rejected by the type checker.
    let Some(variants) = registry.variant_names(head) else {
        return;
    };

    let mut covered: BTreeSet<String> = BTreeSet::new();
    let mut saw_wildcard = false;

    for arm in match_expr.arms() {
        let arm_span = arm.syntax().text_range();

        if saw_wildcard {
            errors.push(TypeError::UnreachableArm { span: arm_span });
            continue;
        }

        match arm.pattern() {
            Some(Pattern::Wildcard(_)) => {
                if covered.len() == variants.len() {
                    errors.push(TypeError::RedundantWildcard { span: arm_span });
                }
                saw_wildcard = true;
            }
            Some(Pattern::Constructor(ctor)) => {
                let Some(name) = ctor.name() else { continue };
                let ctor_name = name.text();
                if !variants.contains(&ctor_name) {
                    // Already reported as not-a-constructor-of.
                    continue;
                }
                if !covered.insert(ctor_name.clone()) {
                    errors.push(TypeError::DuplicateArm {
                        name: ctor_name,
                        span: arm_span,
                    });
                }
            }
            None => {}
        }
    }

    if !saw_wildcard && covered.len() < variants.len() {
        let missing: Vec<String> = variants
            .iter()
            .filter(|v| !covered.contains(*v))
            .cloned()
            .collect();
        errors.push(TypeError::NonExhaustiveMatch {
            scrutinee_type: scrutinee_ty.to_string(),
            missing,
            span: match_expr.syntax().text_range(),
        });
    }
}
