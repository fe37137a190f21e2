//! Accessor resolution
//!
//! Locates or synthesizes a getter/setter for a (class, field) pair.
//! Resolution order, first match wins: declared field (exact or legacy
//! `_name` spelling), convention method, registered class extension,
//! dynamic map of an extensible class. Results are cached per
//! (class, field, direction); getters and setters cache independently
//! because a field may be gettable but not settable.

use std::sync::Arc;

use dashmap::DashMap;

use keypath_core::{ClassId, ClassRegistry, ExtensionRegistry, TypeKey};

use crate::access::accessor::{Accessor, Direction, Strategy};
use crate::error::PathError;
use keypath_core::AccessError;

/// Resolves and caches accessors against the class registry
pub struct AccessorResolver {
    classes: Arc<ClassRegistry>,
    extensions: Arc<ExtensionRegistry>,
    cache: DashMap<(ClassId, Arc<str>, Direction), Arc<Accessor>>,
}

impl AccessorResolver {
    /// Create a resolver over the given registries
    pub fn new(classes: Arc<ClassRegistry>, extensions: Arc<ExtensionRegistry>) -> Self {
        Self {
            classes,
            extensions,
            cache: DashMap::new(),
        }
    }

    /// Getter accessor for (class, field)
    pub fn getter_for(&self, class_id: ClassId, field: &str) -> Result<Arc<Accessor>, PathError> {
        self.accessor_for(class_id, field, Direction::Get)
    }

    /// Setter accessor for (class, field)
    pub fn setter_for(&self, class_id: ClassId, field: &str) -> Result<Arc<Accessor>, PathError> {
        self.accessor_for(class_id, field, Direction::Set)
    }

    fn accessor_for(
        &self,
        class_id: ClassId,
        field: &str,
        direction: Direction,
    ) -> Result<Arc<Accessor>, PathError> {
        let key = (class_id, Arc::<str>::from(field), direction);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let strategy = self.select_strategy(class_id, field, direction)?;
        let accessor = Arc::new(Accessor::new(class_id, key.1.clone(), direction, strategy));
        // A racing resolver may have landed first; keep the cached one
        // so at most one live accessor exists per key.
        let entry = self.cache.entry(key).or_insert(accessor).clone();
        Ok(entry)
    }

    fn select_strategy(
        &self,
        class_id: ClassId,
        field: &str,
        direction: Direction,
    ) -> Result<Strategy, PathError> {
        // 1. Declared field, exact name or legacy underscore spelling.
        let underscored = format!("_{}", field);
        for candidate in [field, underscored.as_str()] {
            if let Some(info) = self.classes.slot_of(class_id, candidate) {
                if !info.access.is_accessible() {
                    // A private field reference is a configuration
                    // mistake, not a miss: fail hard instead of falling
                    // through to the next strategy.
                    return Err(AccessError::NotPublic {
                        type_name: self.class_name(class_id),
                        member: info.field_name,
                    }
                    .into());
                }
                return Ok(Strategy::Slot {
                    declared_name: candidate.to_string(),
                });
            }
        }

        // 2. Convention method.
        if let Some(method_name) = self.convention_method(class_id, field, direction) {
            return Ok(Strategy::Method { method_name });
        }

        // 3. Registered class extension that serves this field.
        if let Some(extension) = self.extensions.class_chain_lookup(class_id) {
            if extension.provides(&self.classes, TypeKey::Class(class_id), field) {
                return Ok(Strategy::Extension { extension });
            }
        }

        // 4. Dynamic map of an extensible class.
        if let Some(class) = self.classes.get(class_id) {
            if class.extensible {
                return Ok(Strategy::DynamicMap);
            }
        }

        Err(PathError::NoAccessor {
            type_name: self.class_name(class_id),
            field: field.to_string(),
        })
    }

    /// Find a getter (`field()` / `isField()`, zero params) or setter
    /// (`setField(v)`, one param) convention method on the class chain
    fn convention_method(
        &self,
        class_id: ClassId,
        field: &str,
        direction: Direction,
    ) -> Option<String> {
        let capitalized = capitalize_first(field);
        let candidates: Vec<String> = match direction {
            Direction::Get => vec![field.to_string(), format!("is{}", capitalized)],
            Direction::Set => vec![format!("set{}", capitalized)],
        };
        let wanted_params = match direction {
            Direction::Get => 0,
            Direction::Set => 1,
        };
        candidates.into_iter().find(|name| {
            self.classes
                .methods_named(class_id, name)
                .iter()
                .any(|m| m.param_types.len() == wanted_params && m.access.is_accessible())
        })
    }

    fn class_name(&self, class_id: ClassId) -> String {
        self.classes
            .get(class_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("class#{}", class_id))
    }

    /// The class registry this resolver reads metadata from
    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    /// The extension registry consulted for strategy 3
    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// Number of cached accessors (visible for diagnostics)
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
