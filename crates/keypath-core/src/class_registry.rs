//! Class registry for runtime class metadata
//!
//! Process-wide, populated at startup, read-mostly thereafter. Lookups
//! hand out shared `Arc<ClassDef>` handles so readers never hold the
//! registry lock across metadata walks.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::AccessError;
use crate::object::{Access, ClassDef, Instance, MethodDef};
use crate::value::TypeKey;
use crate::ClassId;

/// Slot lookup result for a named field
#[derive(Debug, Clone)]
pub struct SlotInfo {
    /// Absolute slot index in the instance layout
    pub slot: usize,
    /// Resolved field name (the declared spelling, possibly `_name`)
    pub field_name: String,
    /// Declared type name of the field
    pub type_name: String,
    /// Accessibility tier of the field
    pub access: Access,
    /// Class that declares the field
    pub declared_in: ClassId,
}

#[derive(Default)]
struct Inner {
    classes: Vec<Arc<ClassDef>>,
    name_to_id: FxHashMap<String, ClassId>,
}

/// Thread-safe registry of class definitions
#[derive(Default)]
pub struct ClassRegistry {
    inner: RwLock<Inner>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class definition; assigns and returns its id
    ///
    /// A duplicate class name is a configuration mistake and fails hard.
    pub fn register(&self, mut class: ClassDef) -> Result<ClassId, AccessError> {
        let mut inner = self.inner.write();
        if inner.name_to_id.contains_key(&class.name) {
            return Err(AccessError::DuplicateClass {
                name: class.name.clone(),
            });
        }
        if let Some(parent) = class.parent_id {
            if parent >= inner.classes.len() {
                return Err(AccessError::TypeMismatch {
                    expected: "registered parent class id".to_string(),
                    found: format!("class#{}", parent),
                });
            }
        }
        let id = inner.classes.len();
        class.id = id;
        inner.name_to_id.insert(class.name.clone(), id);
        inner.classes.push(Arc::new(class));
        tracing::debug!(class = %inner.classes[id].name, id, "registered class");
        Ok(id)
    }

    /// Class definition by id
    pub fn get(&self, id: ClassId) -> Option<Arc<ClassDef>> {
        self.inner.read().classes.get(id).cloned()
    }

    /// Class definition by dotted name
    pub fn get_by_name(&self, name: &str) -> Option<Arc<ClassDef>> {
        let inner = self.inner.read();
        inner
            .name_to_id
            .get(name)
            .and_then(|id| inner.classes.get(*id))
            .cloned()
    }

    /// Class id by dotted name
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.inner.read().name_to_id.get(name).copied()
    }

    /// All registered dotted class names
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .classes
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Ancestor chain of `id`, most-derived first, self included
    pub fn ancestors(&self, id: ClassId) -> Vec<Arc<ClassDef>> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id);
        while let Some(class) = cursor {
            cursor = class.parent_id.and_then(|p| self.get(p));
            chain.push(class);
        }
        chain
    }

    /// True when `sub` is `ancestor` or inherits from it
    pub fn is_subclass(&self, sub: ClassId, ancestor: ClassId) -> bool {
        self.ancestors(sub).iter().any(|c| c.id == ancestor)
    }

    /// Total slot count of an instance of `id` (inherited included)
    pub fn slot_count(&self, id: ClassId) -> usize {
        self.ancestors(id).iter().map(|c| c.fields.len()).sum()
    }

    /// Number of slots occupied by ancestors of `id` (exclusive base offset
    /// for fields declared directly on `id`)
    fn base_offset(&self, id: ClassId) -> usize {
        match self.get(id).and_then(|c| c.parent_id) {
            Some(parent) => self.slot_count(parent),
            None => 0,
        }
    }

    /// Locate a declared field named exactly `name` on `id` or an
    /// ancestor, most-derived declaration first
    pub fn slot_of(&self, id: ClassId, name: &str) -> Option<SlotInfo> {
        for class in self.ancestors(id) {
            if let Some(pos) = class.fields.iter().position(|f| f.name == name) {
                let field = &class.fields[pos];
                return Some(SlotInfo {
                    slot: self.base_offset(class.id) + pos,
                    field_name: field.name.clone(),
                    type_name: field.type_name.clone(),
                    access: field.access,
                    declared_in: class.id,
                });
            }
        }
        None
    }

    /// Find methods named `name` on `id` or an ancestor, most-derived
    /// declarations first; overridden names shadow ancestor declarations
    pub fn methods_named(&self, id: ClassId, name: &str) -> Vec<MethodDef> {
        let mut found: Vec<MethodDef> = Vec::new();
        for class in self.ancestors(id) {
            for method in class.methods_named(name) {
                // An ancestor method with the same signature is overridden.
                let overridden = found
                    .iter()
                    .any(|m| m.param_types == method.param_types);
                if !overridden {
                    found.push(method.clone());
                }
            }
        }
        found
    }

    /// Create an instance of `id` with all slots null
    pub fn instantiate(&self, id: ClassId) -> Result<Instance, AccessError> {
        if self.get(id).is_none() {
            return Err(AccessError::TypeMismatch {
                expected: "registered class id".to_string(),
                found: format!("class#{}", id),
            });
        }
        Ok(Instance::new(id, self.slot_count(id)))
    }

    /// Display name for a type key (class keys render their dotted name)
    pub fn display_name(&self, key: TypeKey) -> String {
        match key {
            TypeKey::Class(id) => self
                .get(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| key.label()),
            other => other.label(),
        }
    }

    /// Parent key in the extension-dispatch hierarchy
    ///
    /// Builtin kinds and parentless classes fall back to `Any`; `Any` is
    /// the root and has no parent.
    pub fn parent_key(&self, key: TypeKey) -> Option<TypeKey> {
        match key {
            TypeKey::Any => None,
            TypeKey::Class(id) => match self.get(id).and_then(|c| c.parent_id) {
                Some(parent) => Some(TypeKey::Class(parent)),
                None => Some(TypeKey::Any),
            },
            _ => Some(TypeKey::Any),
        }
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ClassRegistry")
            .field("classes", &inner.classes.len())
            .finish()
    }
}
