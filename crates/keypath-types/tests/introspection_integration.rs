//! End-to-end introspection tests
//!
//! Exercises the registry, descriptor synthesis, overload passes, and
//! the alias table together over a small registered class hierarchy.

use std::io::Write;
use std::sync::Arc;

use keypath_core::{ClassDef, ClassRegistry, NativeFn, Value};
use keypath_types::{AliasRepository, TypeKind, TypeRegistry};

fn noop() -> NativeFn {
    Arc::new(|_receiver, _args| Ok(Value::Null))
}

/// A shape hierarchy with overloaded draw/scale methods
fn registry() -> TypeRegistry {
    let classes = Arc::new(ClassRegistry::new());
    let shape = classes
        .register(
            ClassDef::new("gfx.Shape")
                .field("name", "string")
                .method("draw", vec!["any"], "null", noop())
                .method("scale", vec!["double"], "null", noop())
                .build(),
        )
        .unwrap();
    classes
        .register(
            ClassDef::new("gfx.Circle")
                .parent(shape)
                .field("radius", "double")
                .method("draw", vec!["string"], "null", noop())
                .method("scale", vec!["long"], "null", noop())
                .build(),
        )
        .unwrap();
    TypeRegistry::new(classes)
}

#[test]
fn test_exact_beats_widening() {
    let registry = registry();
    // A string argument matches draw(string) exactly even though
    // draw(any) would also accept it by widening.
    let picked = registry
        .resolve_method("gfx.Circle", "draw", &["string"], false)
        .unwrap();
    assert_eq!(picked.munged_name(), "draw(string)");

    // An int argument has no exact overload; it widens into
    // scale(long), the more specific of the two widening candidates.
    let picked = registry
        .resolve_method("gfx.Circle", "scale", &["int"], false)
        .unwrap();
    assert_eq!(picked.munged_name(), "scale(long)");
}

#[test]
fn test_widening_only_when_exact_fails() {
    let registry = registry();
    // A circle argument widens into draw(any) through the universal
    // parameter; draw(string) is not applicable.
    let picked = registry
        .resolve_method("gfx.Circle", "draw", &["gfx.Circle"], false)
        .unwrap();
    assert_eq!(picked.munged_name(), "draw(any)");
}

#[test]
fn test_narrowing_is_the_last_resort() {
    let registry = registry();
    // scale(double) is exact; no narrowing needed.
    let picked = registry
        .resolve_method("gfx.Circle", "scale", &["double"], false)
        .unwrap();
    assert_eq!(picked.munged_name(), "scale(double)");

    // A double argument against only narrower parameters narrows.
    let classes = Arc::new(ClassRegistry::new());
    classes
        .register(
            ClassDef::new("m.Math")
                .method("floor", vec!["int"], "int", noop())
                .build(),
        )
        .unwrap();
    let narrow = TypeRegistry::new(classes);
    let picked = narrow
        .resolve_method("m.Math", "floor", &["double"], false)
        .unwrap();
    assert_eq!(picked.munged_name(), "floor(int)");

    // No pass applies for a non-numeric mismatch.
    assert!(narrow
        .resolve_method("m.Math", "floor", &["string"], false)
        .is_none());
}

#[test]
fn test_null_never_binds_to_primitive_parameters() {
    let classes = Arc::new(ClassRegistry::new());
    classes
        .register(
            ClassDef::new("m.Math")
                .method("floor", vec!["int"], "int", noop())
                .build(),
        )
        .unwrap();
    let registry = TypeRegistry::new(classes);

    // The only overload takes a value primitive; a null argument has no
    // home in any pass.
    assert!(registry
        .resolve_method("m.Math", "floor", &["null"], false)
        .is_none());
}

#[test]
fn test_null_matches_any_overload_position() {
    let registry = registry();
    let picked = registry
        .resolve_method("gfx.Circle", "draw", &["null"], false)
        .unwrap();
    // Both overloads accept null exactly; declaration order picks the
    // most-derived table entry.
    assert_eq!(picked.declaring, "gfx.Circle");
}

#[test]
fn test_inherited_members_visible_through_descriptors() {
    let registry = registry();
    let circle = registry.resolve("gfx.Circle").unwrap();
    assert_eq!(circle.kind(), TypeKind::Object);
    assert!(circle.field_named("name").is_some());
    assert!(circle.field_named("radius").is_some());
    assert_eq!(circle.methods_named("draw").len(), 2);
}

#[test]
fn test_container_and_array_synthesis_round_trip() {
    let registry = registry();
    let list = registry.resolve("list<gfx.Circle>").unwrap();
    assert_eq!(list.kind(), TypeKind::Container);
    assert_eq!(list.element_type().unwrap().name(), "gfx.Circle");

    let grid = registry.resolve("[[double").unwrap();
    assert_eq!(grid.kind(), TypeKind::Array);
    assert_eq!(grid.dimensions(), 2);

    // Synthesized descriptors are shared on repeat lookups.
    assert!(Arc::ptr_eq(&registry.resolve("[[double").unwrap(), &grid));
}

#[test]
fn test_alias_load_is_idempotent() {
    let registry = registry();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "type,alias").unwrap();
    writeln!(file, "gfx.Circle,circle_t").unwrap();
    writeln!(file, "gfx.Shape,shape_t").unwrap();
    file.flush().unwrap();

    let first = AliasRepository::load_from_path(file.path(), &registry);
    assert_eq!(first.len(), 2);
    registry.install_aliases(first);
    assert_eq!(registry.resolve("circle_t").unwrap().name(), "gfx.Circle");

    let second = AliasRepository::load_from_path(file.path(), &registry);
    assert_eq!(second.len(), 2);
    registry.install_aliases(second);
    assert_eq!(registry.resolve("circle_t").unwrap().name(), "gfx.Circle");
    assert_eq!(registry.alias_for("gfx.Shape").as_deref(), Some("shape_t"));
}

#[test]
fn test_safe_short_names_resolve_after_install() {
    let registry = registry();
    assert!(registry.resolve("Circle").is_none());
    registry.install_safe_types(&["gfx.Circle", "gfx.Shape"]);
    assert_eq!(registry.resolve("Circle").unwrap().name(), "gfx.Circle");
    assert_eq!(registry.resolve("Shape").unwrap().name(), "gfx.Shape");
}
