//! Type providers
//!
//! A provider resolves a type-name string to a `TypeInfo`. Providers
//! cache their own results by canonical name, so two lookups of the
//! same name through the same provider hand back the same shared
//! descriptor.

use std::sync::Arc;

use dashmap::DashMap;

use keypath_core::ClassRegistry;

use crate::info::TypeInfo;

/// Resolves type-name strings to descriptors
pub trait TypeProvider: Send + Sync {
    /// Provider name, for diagnostics
    fn name(&self) -> &str;

    /// Descriptor for `name`, or None when this provider does not
    /// recognize it
    fn resolve(&self, name: &str) -> Option<Arc<TypeInfo>>;
}

/// Builtin primitive and container-representation types
///
/// Canonical names: `bool`, `int`, `long`, `float`, `double`, `string`,
/// `null`, `any`, and the container representations `list`, `set`,
/// `map`. A few spelling aliases (`boolean`, `str`, `object`) map onto
/// their canonical entries.
pub struct PrimitiveTypeProvider {
    cache: DashMap<String, Arc<TypeInfo>>,
}

impl PrimitiveTypeProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    fn canonical(name: &str) -> Option<&'static str> {
        match name {
            "bool" | "boolean" => Some("bool"),
            "int" => Some("int"),
            "long" => Some("long"),
            "float" => Some("float"),
            "double" => Some("double"),
            "string" | "str" => Some("string"),
            "null" => Some("null"),
            "any" | "object" => Some("any"),
            "list" => Some("list"),
            "set" => Some("set"),
            "map" => Some("map"),
            _ => None,
        }
    }

    fn build(canonical: &str) -> Arc<TypeInfo> {
        match canonical {
            "bool" => TypeInfo::primitive("bool", "bool"),
            "int" => TypeInfo::primitive("int", "i32"),
            "long" => TypeInfo::primitive("long", "i64"),
            "float" => TypeInfo::primitive("float", "f32"),
            "double" => TypeInfo::primitive("double", "f64"),
            "string" => TypeInfo::primitive("string", "str"),
            "null" => TypeInfo::primitive("null", "null"),
            "any" => TypeInfo::primitive("any", "any"),
            "list" | "set" | "map" => TypeInfo::container_base(canonical),
            other => unreachable!("unknown canonical primitive {}", other),
        }
    }
}

impl Default for PrimitiveTypeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeProvider for PrimitiveTypeProvider {
    fn name(&self) -> &str {
        "primitives"
    }

    fn resolve(&self, name: &str) -> Option<Arc<TypeInfo>> {
        let canonical = Self::canonical(name)?;
        let entry = self
            .cache
            .entry(canonical.to_string())
            .or_insert_with(|| Self::build(canonical))
            .clone();
        Some(entry)
    }
}

/// Registered classes, backed by the core class registry
pub struct ObjectTypeProvider {
    classes: Arc<ClassRegistry>,
    cache: DashMap<String, Arc<TypeInfo>>,
}

impl ObjectTypeProvider {
    /// Create the provider over a class registry
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self {
            classes,
            cache: DashMap::new(),
        }
    }
}

impl TypeProvider for ObjectTypeProvider {
    fn name(&self) -> &str {
        "objects"
    }

    fn resolve(&self, name: &str) -> Option<Arc<TypeInfo>> {
        if let Some(hit) = self.cache.get(name) {
            return Some(hit.clone());
        }
        let class_id = self.classes.id_of(name)?;
        let info = TypeInfo::object(self.classes.clone(), class_id)?;
        let entry = self
            .cache
            .entry(name.to_string())
            .or_insert(info)
            .clone();
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypath_core::ClassDef;

    #[test]
    fn test_primitive_resolution_is_reference_identical() {
        let provider = PrimitiveTypeProvider::new();
        let a = provider.resolve("int").unwrap();
        let b = provider.resolve("int").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(provider.resolve("complex").is_none());
    }

    #[test]
    fn test_spelling_aliases_share_the_canonical_entry() {
        let provider = PrimitiveTypeProvider::new();
        let a = provider.resolve("bool").unwrap();
        let b = provider.resolve("boolean").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.name(), "bool");
    }

    #[test]
    fn test_object_provider_resolves_registered_classes() {
        let classes = Arc::new(ClassRegistry::new());
        classes
            .register(ClassDef::new("crm.Person").field("name", "string").build())
            .unwrap();
        let provider = ObjectTypeProvider::new(classes);

        let a = provider.resolve("crm.Person").unwrap();
        let b = provider.resolve("crm.Person").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.fields().len(), 1);
        assert!(provider.resolve("crm.Ghost").is_none());
    }
}
