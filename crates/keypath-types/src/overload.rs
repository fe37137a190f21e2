//! Overload resolution
//!
//! Picks a method among same-name overloads for a list of argument
//! type names. Resolution runs in three passes of decreasing
//! strictness: exact, widening, narrowing. A pass that produces any
//! applicable candidate ends the search; later passes never override
//! an earlier match.

use std::sync::Arc;

use crate::info::{MethodInfo, TypeInfo, TypeKind};
use crate::registry::TypeRegistry;

/// Resolve `name(arg_types)` on `ty`
///
/// A `"null"` argument matches any position in the exact pass and any
/// non-value-primitive parameter in the widening pass. When several
/// candidates survive a pass, the most specific one wins; a genuine
/// tie goes to the earliest declaration.
pub fn resolve_method(
    registry: &TypeRegistry,
    ty: &TypeInfo,
    name: &str,
    arg_types: &[&str],
    statics_only: bool,
) -> Option<Arc<MethodInfo>> {
    let candidates: Vec<Arc<MethodInfo>> = ty
        .methods_named(name)
        .into_iter()
        .filter(|m| m.access.is_accessible())
        .filter(|m| !statics_only || m.is_static)
        .filter(|m| m.param_types.len() == arg_types.len())
        .collect();
    if candidates.is_empty() {
        return None;
    }

    for pass in [Pass::Exact, Pass::Widening, Pass::Narrowing] {
        let applicable: Vec<&Arc<MethodInfo>> = candidates
            .iter()
            .filter(|m| applicable_in_pass(registry, m, arg_types, pass))
            .collect();
        if let Some(found) = pick_most_specific(registry, &applicable, arg_types) {
            return Some(found.clone());
        }
    }
    None
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    Exact,
    Widening,
    Narrowing,
}

fn applicable_in_pass(
    registry: &TypeRegistry,
    method: &MethodInfo,
    arg_types: &[&str],
    pass: Pass,
) -> bool {
    method
        .param_types
        .iter()
        .zip(arg_types)
        .all(|(param, arg)| match pass {
            Pass::Exact => matches_exact(registry, arg, param),
            Pass::Widening => {
                matches_exact(registry, arg, param) || is_widening(registry, arg, param)
            }
            Pass::Narrowing => {
                matches_exact(registry, arg, param)
                    || is_widening(registry, arg, param)
                    || is_narrowing(registry, arg, param)
            }
        })
}

/// Among applicable candidates, the one whose parameter list no other
/// candidate is strictly more specific than; declaration order breaks
/// ties. Null arguments carry no specificity information and are
/// skipped in the comparison.
fn pick_most_specific<'a>(
    registry: &TypeRegistry,
    applicable: &[&'a Arc<MethodInfo>],
    arg_types: &[&str],
) -> Option<&'a Arc<MethodInfo>> {
    match applicable {
        [] => None,
        [only] => Some(*only),
        many => {
            for candidate in many {
                let dominated = many.iter().any(|other| {
                    !Arc::ptr_eq(other, candidate)
                        && strictly_more_specific(registry, other, candidate, arg_types)
                });
                if !dominated {
                    return Some(*candidate);
                }
            }
            // A specificity cycle; fall back to declaration order.
            Some(many[0])
        }
    }
}

fn strictly_more_specific(
    registry: &TypeRegistry,
    a: &MethodInfo,
    b: &MethodInfo,
    arg_types: &[&str],
) -> bool {
    let mut strict = false;
    for ((pa, pb), arg) in a.param_types.iter().zip(&b.param_types).zip(arg_types) {
        if *arg == "null" {
            continue;
        }
        if matches_exact(registry, pa, pb) {
            continue;
        }
        if is_widening(registry, pa, pb) {
            strict = true;
        } else {
            return false;
        }
    }
    strict
}

/// Canonical name for comparison; unresolvable names compare as raw
/// strings
fn canonical(registry: &TypeRegistry, name: &str) -> String {
    registry
        .resolve(name)
        .map(|info| info.name().to_string())
        .unwrap_or_else(|| name.to_string())
}

fn matches_exact(registry: &TypeRegistry, arg: &str, param: &str) -> bool {
    if arg == "null" {
        // Null inhabits every type except the value primitives.
        return !is_value_primitive(&canonical(registry, param));
    }
    arg == param || canonical(registry, arg) == canonical(registry, param)
}

/// Widening ranks for the numeric value types
fn numeric_rank(name: &str) -> Option<u8> {
    match name {
        "int" => Some(0),
        "long" => Some(1),
        "float" => Some(2),
        "double" => Some(3),
        _ => None,
    }
}

fn is_value_primitive(name: &str) -> bool {
    matches!(name, "bool" | "int" | "long" | "float" | "double")
}

/// Whether an argument of type `from` widens into a parameter of type
/// `to`: anything into `any`, null into a non-value-primitive, a
/// narrower numeric into a wider one, or a subclass into an ancestor
fn is_widening(registry: &TypeRegistry, from: &str, to: &str) -> bool {
    let to_canonical = canonical(registry, to);
    if to_canonical == "any" {
        return true;
    }
    if from == "null" {
        return !is_value_primitive(&to_canonical);
    }
    let from_canonical = canonical(registry, from);
    if let (Some(f), Some(t)) = (
        numeric_rank(&from_canonical),
        numeric_rank(&to_canonical),
    ) {
        return f < t;
    }
    let (Some(from_info), Some(to_info)) = (registry.resolve(from), registry.resolve(to)) else {
        return false;
    };
    if from_info.kind() == TypeKind::Object && to_info.kind() == TypeKind::Object {
        if let (Some(sub), Some(ancestor)) = (from_info.class_id(), to_info.class_id()) {
            return registry.classes().is_subclass(sub, ancestor);
        }
    }
    false
}

/// Numeric-only reverse of widening
fn is_narrowing(registry: &TypeRegistry, from: &str, to: &str) -> bool {
    if from == "null" {
        return false;
    }
    if let (Some(f), Some(t)) = (
        numeric_rank(&canonical(registry, from)),
        numeric_rank(&canonical(registry, to)),
    ) {
        return f > t;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypath_core::{ClassDef, ClassRegistry, NativeFn, Value};

    fn method(name: &str, params: &[&str]) -> Arc<MethodInfo> {
        use keypath_core::Access;
        Arc::new(MethodInfo::new(
            "T",
            name,
            params.iter().map(|p| p.to_string()).collect(),
            "null",
            Access::Public,
            false,
        ))
    }

    fn noop_body() -> NativeFn {
        Arc::new(|_receiver, _args| Ok(Value::Null))
    }

    fn empty_registry() -> TypeRegistry {
        TypeRegistry::new(Arc::new(ClassRegistry::new()))
    }

    #[test]
    fn test_exact_match_beats_widening() {
        let registry = empty_registry();
        assert!(matches_exact(&registry, "int", "int"));
        assert!(matches_exact(&registry, "boolean", "bool"));
        assert!(!matches_exact(&registry, "int", "long"));
        assert!(is_widening(&registry, "int", "long"));
        assert!(is_widening(&registry, "int", "double"));
        assert!(!is_widening(&registry, "double", "int"));
        assert!(is_narrowing(&registry, "double", "int"));
    }

    #[test]
    fn test_null_argument_rules() {
        let registry = empty_registry();
        // Null never inhabits a value primitive, in any pass.
        assert!(!matches_exact(&registry, "null", "int"));
        assert!(!matches_exact(&registry, "null", "boolean"));
        assert!(!is_widening(&registry, "null", "int"));
        assert!(!is_narrowing(&registry, "null", "int"));
        assert!(matches_exact(&registry, "null", "string"));
        assert!(matches_exact(&registry, "null", "any"));
        assert!(is_widening(&registry, "null", "string"));
        assert!(is_widening(&registry, "null", "any"));
    }

    #[test]
    fn test_null_prefers_reference_parameter_over_primitive() {
        let classes = Arc::new(ClassRegistry::new());
        classes
            .register(
                ClassDef::new("fmt.Printer")
                    .method("f", vec!["int"], "null", noop_body())
                    .method("f", vec!["string"], "null", noop_body())
                    .build(),
            )
            .unwrap();
        let registry = TypeRegistry::new(classes);

        let info = registry.resolve("fmt.Printer").unwrap();
        let picked = resolve_method(&registry, &info, "f", &["null"], false).unwrap();
        assert_eq!(picked.munged_name(), "f(string)");
    }

    #[test]
    fn test_null_against_primitive_only_overloads_is_absent() {
        let classes = Arc::new(ClassRegistry::new());
        classes
            .register(
                ClassDef::new("m.Math")
                    .method("floor", vec!["int"], "int", noop_body())
                    .build(),
            )
            .unwrap();
        let registry = TypeRegistry::new(classes);

        let info = registry.resolve("m.Math").unwrap();
        assert!(resolve_method(&registry, &info, "floor", &["null"], false).is_none());
    }

    #[test]
    fn test_class_widening_follows_the_parent_chain() {
        let classes = Arc::new(ClassRegistry::new());
        let base = classes.register(ClassDef::new("Base").build()).unwrap();
        classes
            .register(ClassDef::new("Derived").parent(base).build())
            .unwrap();
        classes.register(ClassDef::new("Other").build()).unwrap();
        let registry = TypeRegistry::new(classes);

        assert!(is_widening(&registry, "Derived", "Base"));
        assert!(!is_widening(&registry, "Base", "Derived"));
        assert!(!is_widening(&registry, "Other", "Base"));
    }

    #[test]
    fn test_most_specific_candidate_wins() {
        let registry = empty_registry();
        let wide = method("f", &["double"]);
        let narrow = method("f", &["long"]);
        let applicable = vec![&wide, &narrow];
        let picked = pick_most_specific(&registry, &applicable, &["int"]).unwrap();
        assert_eq!(picked.param_types, vec!["long".to_string()]);
    }

    #[test]
    fn test_null_positions_do_not_sway_specificity() {
        let registry = empty_registry();
        let a = method("f", &["string", "long"]);
        let b = method("f", &["any", "long"]);
        let applicable = vec![&a, &b];
        // First position argument is null; second ties; declaration
        // order decides only when specificity does not.
        let picked = pick_most_specific(&registry, &applicable, &["null", "int"]).unwrap();
        assert_eq!(picked.param_types[0], "string");
    }
}
