//! Class-extension registry
//!
//! Field-access behavior is attached to types externally, without the
//! receiver types implementing any shared interface. Lookup walks the
//! supertype chain and caches the winner per concrete key, so the chain
//! walk happens at most once per key.

mod builtin;

pub use builtin::{child_tag, AnyExtension, MapExtension, SequenceExtension};

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::class_registry::ClassRegistry;
use crate::error::AccessError;
use crate::value::{TypeKey, Value};
use crate::ClassId;

/// A tagged child exposed by a receiver for `*` / `Tag[]` navigation
#[derive(Debug, Clone)]
pub struct Child {
    /// Tag the child is selected by
    pub tag: String,
    /// The child value
    pub value: Value,
}

/// Externally registered behavior implementing field access for a type
pub trait ClassExtension: Send + Sync {
    /// Fetch the named value from the receiver
    fn get(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
    ) -> Result<Value, AccessError>;

    /// Store the named value on the receiver
    fn set(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
        value: Value,
    ) -> Result<(), AccessError>;

    /// Whether this extension can serve the named field for the given
    /// type key (drives the extension-backed accessor strategy)
    fn provides(&self, _classes: &ClassRegistry, _key: TypeKey, _field: &str) -> bool {
        false
    }

    /// Tagged children of the receiver, in original order
    fn children(
        &self,
        _classes: &ClassRegistry,
        _receiver: &Value,
    ) -> Result<Vec<Child>, AccessError> {
        Ok(Vec::new())
    }

    /// Construct an empty container of the receiver's concrete kind for
    /// on-demand intermediate creation (write path only); None when the
    /// kind does not support it
    fn create_intermediate(&self, _key: TypeKey) -> Option<Value> {
        None
    }
}

/// Registry mapping type keys to extension behaviors
///
/// Registrations happen at startup; per-key resolution results are
/// cached on demand and never evicted.
pub struct ExtensionRegistry {
    classes: Arc<ClassRegistry>,
    registered: RwLock<FxHashMap<TypeKey, Arc<dyn ClassExtension>>>,
    resolved: DashMap<TypeKey, Arc<dyn ClassExtension>>,
}

impl ExtensionRegistry {
    /// Create an empty registry (no behaviors, not even the `Any` root)
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self {
            classes,
            registered: RwLock::new(FxHashMap::default()),
            resolved: DashMap::new(),
        }
    }

    /// Create a registry with the builtin behaviors installed: maps,
    /// the three sequence kinds, and a universal `Any` root
    pub fn with_defaults(classes: Arc<ClassRegistry>) -> Self {
        let registry = Self::new(classes);
        registry.register(TypeKey::Map, Arc::new(MapExtension));
        registry.register(TypeKey::List, Arc::new(SequenceExtension));
        registry.register(TypeKey::Array, Arc::new(SequenceExtension));
        registry.register(TypeKey::Set, Arc::new(SequenceExtension));
        registry.register(TypeKey::Any, Arc::new(AnyExtension));
        registry
    }

    /// Register a behavior for a type key
    ///
    /// Later registrations for the same key replace earlier ones; the
    /// per-key resolution cache is flushed so existing consumers observe
    /// the new behavior.
    pub fn register(&self, key: TypeKey, extension: Arc<dyn ClassExtension>) {
        self.registered.write().insert(key, extension);
        self.resolved.clear();
        tracing::debug!(key = %self.classes.display_name(key), "registered class extension");
    }

    /// Behavior for a concrete type key
    ///
    /// Walks the supertype chain; the nearest registered ancestor wins.
    /// Reaching the root without a registration is a programming error.
    pub fn lookup(&self, key: TypeKey) -> Result<Arc<dyn ClassExtension>, AccessError> {
        if let Some(hit) = self.resolved.get(&key) {
            return Ok(hit.clone());
        }
        let registered = self.registered.read();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            if let Some(ext) = registered.get(&k) {
                let ext = ext.clone();
                drop(registered);
                self.resolved.insert(key, ext.clone());
                return Ok(ext);
            }
            cursor = self.classes.parent_key(k);
        }
        Err(AccessError::NoExtension {
            key: self.classes.display_name(key),
        })
    }

    /// Behavior explicitly registered for a class or one of its ancestor
    /// classes, ignoring the universal root
    ///
    /// Used by the accessor resolver: a class-level extension is only the
    /// third strategy, so it must be discoverable without the `Any`
    /// fallback shadowing field and method lookup.
    pub fn class_chain_lookup(&self, class_id: ClassId) -> Option<Arc<dyn ClassExtension>> {
        let registered = self.registered.read();
        let mut cursor = Some(class_id);
        while let Some(id) = cursor {
            if let Some(ext) = registered.get(&TypeKey::Class(id)) {
                return Some(ext.clone());
            }
            cursor = self.classes.get(id).and_then(|c| c.parent_id);
        }
        None
    }

    /// The class registry this registry dispatches against
    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }
}
