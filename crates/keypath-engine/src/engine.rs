//! The consumer facade
//!
//! An `Engine` owns the class and extension registries plus the
//! accessor cache and exposes the operations the outer layers are
//! permitted to call: parse-path, get/set at path, and single-field
//! get/set. It is `Send + Sync`; callers share one engine per process.

use std::sync::Arc;

use keypath_core::{
    adapter_for, child_tag, AccessError, Child, ClassDef, ClassExtension, ClassId, ClassRegistry,
    ExtensionRegistry, TypeKey, Value,
};

use crate::access::AccessorResolver;
use crate::error::PathError;
use crate::path::PathExpression;

/// Property-path engine over a registered class system
pub struct Engine {
    classes: Arc<ClassRegistry>,
    extensions: Arc<ExtensionRegistry>,
    resolver: AccessorResolver,
}

impl Engine {
    /// Create an engine with fresh registries and the builtin extension
    /// behaviors installed
    pub fn new() -> Self {
        let classes = Arc::new(ClassRegistry::new());
        let extensions = Arc::new(ExtensionRegistry::with_defaults(classes.clone()));
        Self::with_registries(classes, extensions)
    }

    /// Create an engine over existing registries
    pub fn with_registries(
        classes: Arc<ClassRegistry>,
        extensions: Arc<ExtensionRegistry>,
    ) -> Self {
        let resolver = AccessorResolver::new(classes.clone(), extensions.clone());
        Self {
            classes,
            extensions,
            resolver,
        }
    }

    /// The class registry
    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    /// The extension registry
    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// The accessor resolver and cache
    pub fn resolver(&self) -> &AccessorResolver {
        &self.resolver
    }

    /// Register a class definition
    pub fn register_class(&self, class: ClassDef) -> Result<ClassId, AccessError> {
        self.classes.register(class)
    }

    /// Register an extension behavior for a type key
    pub fn register_extension(&self, key: TypeKey, extension: Arc<dyn ClassExtension>) {
        self.extensions.register(key, extension);
    }

    /// Create an instance of a registered class, all fields null
    pub fn instantiate(&self, class_name: &str) -> Result<Value, AccessError> {
        let id = self
            .classes
            .id_of(class_name)
            .ok_or_else(|| AccessError::TypeMismatch {
                expected: "registered class name".to_string(),
                found: class_name.to_string(),
            })?;
        Ok(Value::object(self.classes.instantiate(id)?))
    }

    /// Parse (or fetch the interned instance of) a path string
    pub fn parse_path(&self, path: &str) -> Result<Arc<PathExpression>, PathError> {
        PathExpression::parse(path)
    }

    /// Read a single field from a receiver
    ///
    /// A null receiver reads as absent. Class instances go through the
    /// accessor layer; every other kind goes through its extension.
    pub fn get_field(&self, receiver: &Value, field: &str) -> Result<Value, PathError> {
        match receiver.kind() {
            TypeKey::Null => Ok(Value::Null),
            TypeKey::Class(class_id) => {
                let accessor = self.resolver.getter_for(class_id, field)?;
                Ok(accessor.get(&self.classes, receiver)?)
            }
            kind => {
                let extension = self.extensions.lookup(kind)?;
                Ok(extension.get(&self.classes, receiver, field)?)
            }
        }
    }

    /// Write a single field on a receiver
    pub fn set_field(&self, receiver: &Value, field: &str, value: Value) -> Result<(), PathError> {
        match receiver.kind() {
            TypeKey::Null => Err(PathError::Access(AccessError::TypeMismatch {
                expected: "non-null receiver".to_string(),
                found: "null".to_string(),
            })),
            TypeKey::Class(class_id) => {
                let accessor = self.resolver.setter_for(class_id, field)?;
                Ok(accessor.set(&self.classes, receiver, value)?)
            }
            kind => {
                let extension = self.extensions.lookup(kind)?;
                Ok(extension.set(&self.classes, receiver, field, value)?)
            }
        }
    }

    /// Tagged children of a receiver, in original order
    ///
    /// Class instances expose the value of a sequence-valued `children`
    /// field (when one is declared); other kinds delegate to their
    /// extension behavior.
    pub(crate) fn children_of(&self, receiver: &Value) -> Result<Vec<Child>, PathError> {
        match receiver.kind() {
            TypeKey::Null => Ok(Vec::new()),
            TypeKey::Class(class_id) => {
                if self.classes.slot_of(class_id, "children").is_none() {
                    return Ok(Vec::new());
                }
                let value = self.get_field(receiver, "children")?;
                let adapter = match adapter_for(&value) {
                    Some(a) => a,
                    None => return Ok(Vec::new()),
                };
                Ok(adapter
                    .to_sequence()
                    .snapshot()
                    .into_iter()
                    .map(|value| Child {
                        tag: child_tag(&self.classes, &value),
                        value,
                    })
                    .collect())
            }
            kind => {
                let extension = self.extensions.lookup(kind)?;
                Ok(extension.children(&self.classes, receiver)?)
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("classes", &self.classes)
            .field("cached_accessors", &self.resolver.cached_count())
            .finish()
    }
}
