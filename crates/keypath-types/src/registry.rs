//! Type registry and provider chain
//!
//! Resolves type-name strings through an ordered chain of providers
//! (primitives first, then registered classes), with alias fallback, a
//! safe short-name index, and synthesis of container and array
//! descriptors from their name encodings.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use keypath_core::ClassRegistry;

use crate::alias::AliasRepository;
use crate::info::{MethodInfo, TypeInfo, TypeKind};
use crate::provider::{ObjectTypeProvider, PrimitiveTypeProvider, TypeProvider};

/// Resolves type names through a provider chain
pub struct TypeRegistry {
    classes: Arc<ClassRegistry>,
    providers: RwLock<Vec<Arc<dyn TypeProvider>>>,
    /// Synthesized container/array descriptors, keyed by query name so
    /// repeated lookups are reference-identical
    synthesized: DashMap<String, Arc<TypeInfo>>,
    aliases: RwLock<AliasRepository>,
    safe_short_names: RwLock<FxHashMap<String, String>>,
}

impl TypeRegistry {
    /// Create a registry with the standard chain: primitives, then
    /// registered classes
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        let providers: Vec<Arc<dyn TypeProvider>> = vec![
            Arc::new(PrimitiveTypeProvider::new()),
            Arc::new(ObjectTypeProvider::new(classes.clone())),
        ];
        Self {
            classes,
            providers: RwLock::new(providers),
            synthesized: DashMap::new(),
            aliases: RwLock::new(AliasRepository::new()),
            safe_short_names: RwLock::new(FxHashMap::default()),
        }
    }

    /// The class registry behind the object provider
    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    /// Append a provider to the end of the chain
    pub fn push_provider(&self, provider: Arc<dyn TypeProvider>) {
        self.providers.write().push(provider);
    }

    /// Resolve a type name to a descriptor
    ///
    /// Chain order: direct resolution (arrays, generics, providers),
    /// then the alias table, then the safe short-name index.
    pub fn resolve(&self, name: &str) -> Option<Arc<TypeInfo>> {
        if let Some(info) = self.resolve_direct(name) {
            return Some(info);
        }
        let aliased = self.aliases.read().type_for(name).map(String::from);
        if let Some(target) = aliased {
            if let Some(info) = self.resolve_direct(&target) {
                return Some(info);
            }
        }
        let safe = self.safe_short_names.read().get(name).cloned();
        if let Some(full) = safe {
            return self.resolve_direct(&full);
        }
        None
    }

    fn resolve_direct(&self, name: &str) -> Option<Arc<TypeInfo>> {
        if let Some(hit) = self.synthesized.get(name) {
            return Some(hit.clone());
        }
        if name.starts_with('[') {
            return self.resolve_array(name);
        }
        if let Some((base, element)) = split_generic(name) {
            return self.resolve_generic(name, base, element);
        }
        let providers = self.providers.read().clone();
        for provider in providers {
            if let Some(info) = provider.resolve(name) {
                // A bare container representation gets the universal
                // element type.
                if info.kind() == TypeKind::Container && info.element_type().is_none() {
                    let any = self.resolve_direct("any")?;
                    let wrapped = TypeInfo::container(&info, any);
                    let entry = self
                        .synthesized
                        .entry(name.to_string())
                        .or_insert(wrapped)
                        .clone();
                    return Some(entry);
                }
                return Some(info);
            }
        }
        None
    }

    /// Peel the `[` dimension prefix and resolve the element type
    fn resolve_array(&self, name: &str) -> Option<Arc<TypeInfo>> {
        let element_name = name.trim_start_matches('[');
        let dimensions = name.len() - element_name.len();
        if element_name.is_empty() {
            return None;
        }
        let element = self.resolve(element_name)?;
        let info = TypeInfo::array(element, dimensions);
        let entry = self
            .synthesized
            .entry(name.to_string())
            .or_insert(info)
            .clone();
        Some(entry)
    }

    /// Resolve `base<element>` into a typed container descriptor
    fn resolve_generic(
        &self,
        name: &str,
        base: &str,
        element: &str,
    ) -> Option<Arc<TypeInfo>> {
        let providers = self.providers.read().clone();
        let base_info = providers.iter().find_map(|p| p.resolve(base))?;
        if base_info.kind() != TypeKind::Container {
            return None;
        }
        let element_info = self.resolve(element)?;
        let info = TypeInfo::container(&base_info, element_info);
        let entry = self
            .synthesized
            .entry(name.to_string())
            .or_insert(info)
            .clone();
        Some(entry)
    }

    /// Resolution that ignores the alias table
    ///
    /// Alias validation goes through this so that reloading an already
    /// installed table is idempotent: an alias must never be rejected
    /// merely because it is currently in effect.
    pub(crate) fn resolves_without_aliases(&self, name: &str) -> bool {
        if self.resolve_direct(name).is_some() {
            return true;
        }
        let safe = self.safe_short_names.read().get(name).cloned();
        match safe {
            Some(full) => self.resolve_direct(&full).is_some(),
            None => false,
        }
    }

    /// Install a loaded alias repository, replacing the current one
    pub fn install_aliases(&self, repository: AliasRepository) {
        *self.aliases.write() = repository;
    }

    /// Register a single alias programmatically, with the same
    /// validation as the file path; false when the alias was rejected
    pub fn register_alias(&self, type_name: &str, alias: &str) -> bool {
        // Validate before taking the write lock: the checks resolve
        // names through this registry, which reads the alias table.
        if let Err(reason) = AliasRepository::validate(self, type_name, alias) {
            tracing::warn!(alias, type_name, reason, "rejected type alias");
            return false;
        }
        self.aliases.write().insert_validated(type_name, alias)
    }

    /// Display alias for a fully-qualified type name
    pub fn alias_for(&self, type_name: &str) -> Option<String> {
        self.aliases.read().alias_for(type_name).map(String::from)
    }

    /// Target type name for an alias
    pub fn type_for_alias(&self, alias: &str) -> Option<String> {
        self.aliases.read().type_for(alias).map(String::from)
    }

    /// Build the safe short-name index from a whitelist of approved
    /// fully-qualified names; ambiguous short names are dropped
    pub fn install_safe_types(&self, approved: &[&str]) {
        let mut index: FxHashMap<String, String> = FxHashMap::default();
        let mut ambiguous: Vec<String> = Vec::new();
        for full in approved {
            if self.resolve_direct(full).is_none() {
                tracing::warn!(type_name = full, "safe-type entry does not resolve, skipped");
                continue;
            }
            let short = full.rsplit('.').next().unwrap_or(full).to_string();
            if short == *full {
                continue;
            }
            match index.get(&short) {
                Some(existing) if existing != full => {
                    tracing::warn!(short = %short, "ambiguous safe short name, dropped");
                    ambiguous.push(short);
                }
                _ => {
                    index.insert(short, full.to_string());
                }
            }
        }
        for short in ambiguous {
            index.remove(&short);
        }
        *self.safe_short_names.write() = index;
    }

    /// Resolve an overloaded method on a named type (see the overload
    /// module for the pass semantics)
    pub fn resolve_method(
        &self,
        type_name: &str,
        method: &str,
        arg_types: &[&str],
        statics_only: bool,
    ) -> Option<Arc<MethodInfo>> {
        let info = self.resolve(type_name)?;
        crate::overload::resolve_method(self, &info, method, arg_types, statics_only)
    }
}

/// Split `base<element>` at the outermost angle brackets
fn split_generic(name: &str) -> Option<(&str, &str)> {
    let open = name.find('<')?;
    if !name.ends_with('>') || open == 0 {
        return None;
    }
    Some((&name[..open], &name[open + 1..name.len() - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypath_core::ClassDef;

    fn registry_with_classes() -> TypeRegistry {
        let classes = Arc::new(ClassRegistry::new());
        classes
            .register(ClassDef::new("crm.Person").field("name", "string").build())
            .unwrap();
        classes
            .register(ClassDef::new("geo.Address").field("city", "string").build())
            .unwrap();
        TypeRegistry::new(classes)
    }

    #[test]
    fn test_provider_chain_order() {
        let registry = registry_with_classes();
        assert_eq!(registry.resolve("int").unwrap().kind(), TypeKind::Primitive);
        assert_eq!(
            registry.resolve("crm.Person").unwrap().kind(),
            TypeKind::Object
        );
        assert!(registry.resolve("crm.Ghost").is_none());
    }

    #[test]
    fn test_resolution_is_reference_identical() {
        let registry = registry_with_classes();
        let a = registry.resolve("crm.Person").unwrap();
        let b = registry.resolve("crm.Person").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_array_synthesis() {
        let registry = registry_with_classes();
        let arr = registry.resolve("[[int").unwrap();
        assert_eq!(arr.kind(), TypeKind::Array);
        assert_eq!(arr.dimensions(), 2);
        assert_eq!(arr.element_type().unwrap().name(), "int");

        let objs = registry.resolve("[crm.Person").unwrap();
        assert_eq!(objs.dimensions(), 1);
        assert_eq!(objs.element_type().unwrap().name(), "crm.Person");
        assert!(registry.resolve("[").is_none());
    }

    #[test]
    fn test_container_synthesis() {
        let registry = registry_with_classes();
        let bare = registry.resolve("list").unwrap();
        assert_eq!(bare.kind(), TypeKind::Container);
        assert_eq!(bare.element_type().unwrap().name(), "any");

        let typed = registry.resolve("list<crm.Person>").unwrap();
        assert_eq!(typed.element_type().unwrap().name(), "crm.Person");
        assert!(Arc::ptr_eq(
            &registry.resolve("list<crm.Person>").unwrap(),
            &typed
        ));
        assert!(registry.resolve("int<string>").is_none());
    }

    #[test]
    fn test_alias_fallback() {
        let registry = registry_with_classes();
        assert!(registry.resolve("Person").is_none());
        assert!(registry.register_alias("crm.Person", "person_t"));
        let via_alias = registry.resolve("person_t").unwrap();
        assert_eq!(via_alias.name(), "crm.Person");
    }

    #[test]
    fn test_safe_short_name_index() {
        let registry = registry_with_classes();
        registry.install_safe_types(&["crm.Person", "geo.Address"]);
        assert_eq!(registry.resolve("Person").unwrap().name(), "crm.Person");
        assert_eq!(registry.resolve("Address").unwrap().name(), "geo.Address");

        // An ambiguous short name is dropped entirely.
        let classes = registry.classes().clone();
        classes
            .register(ClassDef::new("hr.Person").build())
            .unwrap();
        registry.install_safe_types(&["crm.Person", "hr.Person"]);
        assert!(registry.resolve("Person").is_none());
    }
}
