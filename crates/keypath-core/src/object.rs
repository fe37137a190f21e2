//! Class metadata and object instances
//!
//! Classes are registered at startup and describe fields (with slot
//! layout), methods (host closures), an optional parent class, and
//! whether instances carry a dynamic key/value fallback map.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::AccessError;
use crate::value::Value;
use crate::ClassId;

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Accessibility tier of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Not reachable through the access layer
    Private,
    /// Fully accessible
    Public,
    /// Accessible, flagged as safe for untrusted callers
    Safe,
}

impl Access {
    /// True for the tiers the access layer may touch
    pub fn is_accessible(&self) -> bool {
        !matches!(self, Access::Private)
    }
}

/// A declared instance field
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name (may carry a leading underscore by legacy convention)
    pub name: String,
    /// Declared type name (resolvable through the type registry)
    pub type_name: String,
    /// Accessibility tier
    pub access: Access,
}

/// Host closure implementing a method body
///
/// Invoked with the receiver (or `Value::Null` for statics) and the
/// argument list.
pub type NativeFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, AccessError> + Send + Sync>;

/// A declared method
#[derive(Clone)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Declared parameter type names, in order
    pub param_types: Vec<String>,
    /// Declared return type name
    pub return_type: String,
    /// Accessibility tier
    pub access: Access,
    /// True for class-level methods (no receiver)
    pub is_static: bool,
    /// Host implementation
    pub body: NativeFn,
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MethodDef({}({}) -> {})",
            self.name,
            self.param_types.join(","),
            self.return_type
        )
    }
}

/// Class definition metadata
///
/// Slot layout: inherited fields occupy the leading slots, declared
/// fields follow, so a field's slot index is stable for the class
/// lifetime.
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Class id (index into the registry, assigned on registration)
    pub id: ClassId,
    /// Dotted class name, e.g. `geo.Address`
    pub name: String,
    /// Parent class id (None for root classes)
    pub parent_id: Option<ClassId>,
    /// Fields declared by this class (excluding inherited)
    pub fields: Vec<FieldDef>,
    /// Methods declared by this class (excluding inherited)
    pub methods: Vec<MethodDef>,
    /// Whether instances carry a dynamic key/value fallback map
    pub extensible: bool,
    /// Accessibility tier of the class itself
    pub access: Access,
}

impl ClassDef {
    /// Start building a class with the given dotted name
    pub fn new(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            parent_id: None,
            fields: Vec::new(),
            methods: Vec::new(),
            extensible: false,
            access: Access::Public,
        }
    }

    /// Last segment of the dotted name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Locally declared field by name
    pub fn field_named(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Locally declared methods by name (all overloads)
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDef> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

/// Fluent builder for [`ClassDef`]
pub struct ClassBuilder {
    name: String,
    parent_id: Option<ClassId>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    extensible: bool,
    access: Access,
}

impl ClassBuilder {
    /// Set the parent class
    pub fn parent(mut self, parent_id: ClassId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Declare a public field
    pub fn field(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field_with_access(name, type_name, Access::Public)
    }

    /// Declare a field with an explicit accessibility tier
    pub fn field_with_access(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        access: Access,
    ) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            type_name: type_name.into(),
            access,
        });
        self
    }

    /// Declare a public instance method
    pub fn method(
        self,
        name: impl Into<String>,
        param_types: Vec<&str>,
        return_type: impl Into<String>,
        body: NativeFn,
    ) -> Self {
        self.method_full(name, param_types, return_type, Access::Public, false, body)
    }

    /// Declare a public static method
    pub fn static_method(
        self,
        name: impl Into<String>,
        param_types: Vec<&str>,
        return_type: impl Into<String>,
        body: NativeFn,
    ) -> Self {
        self.method_full(name, param_types, return_type, Access::Public, true, body)
    }

    /// Declare a method with full control over its metadata
    pub fn method_full(
        mut self,
        name: impl Into<String>,
        param_types: Vec<&str>,
        return_type: impl Into<String>,
        access: Access,
        is_static: bool,
        body: NativeFn,
    ) -> Self {
        self.methods.push(MethodDef {
            name: name.into(),
            param_types: param_types.into_iter().map(String::from).collect(),
            return_type: return_type.into(),
            access,
            is_static,
            body,
        });
        self
    }

    /// Mark instances as carrying a dynamic key/value fallback map
    pub fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Set the class accessibility tier
    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Finish the definition; the id is assigned on registration
    pub fn build(self) -> ClassDef {
        ClassDef {
            id: 0,
            name: self.name,
            parent_id: self.parent_id,
            fields: self.fields,
            methods: self.methods,
            extensible: self.extensible,
            access: self.access,
        }
    }
}

/// Object instance
#[derive(Debug, Clone)]
pub struct Instance {
    /// Unique object id (assigned on creation)
    pub object_id: u64,
    /// Class id (index into the class registry)
    pub class_id: ClassId,
    /// Field slots, inherited fields first
    pub slots: Vec<Value>,
    /// Dynamic fields; consulted only when the class is extensible
    pub dynamic: FxHashMap<String, Value>,
}

impl Instance {
    /// Create an instance with `slot_count` null slots
    pub fn new(class_id: ClassId, slot_count: usize) -> Self {
        Self {
            object_id: generate_object_id(),
            class_id,
            slots: vec![Value::Null; slot_count],
            dynamic: FxHashMap::default(),
        }
    }

    /// Slot value by index
    pub fn slot(&self, index: usize) -> Option<Value> {
        self.slots.get(index).cloned()
    }

    /// Replace a slot value; false when out of bounds
    pub fn set_slot(&mut self, index: usize, value: Value) -> bool {
        if index < self.slots.len() {
            self.slots[index] = value;
            true
        } else {
            false
        }
    }

    /// Dynamic field by name (extensible classes only)
    pub fn dynamic_field(&self, name: &str) -> Option<Value> {
        self.dynamic.get(name).cloned()
    }

    /// Insert or replace a dynamic field
    pub fn set_dynamic_field(&mut self, name: impl Into<String>, value: Value) {
        self.dynamic.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_produces_declared_members() {
        let class = ClassDef::new("geo.Address")
            .field("city", "string")
            .field_with_access("_zip", "string", Access::Safe)
            .build();
        assert_eq!(class.short_name(), "Address");
        assert_eq!(class.fields.len(), 2);
        assert!(class.field_named("city").is_some());
        assert!(class.field_named("_zip").is_some());
        assert!(class.field_named("zip").is_none());
    }

    #[test]
    fn test_instance_slots() {
        let mut inst = Instance::new(0, 2);
        assert_eq!(inst.slot(0), Some(Value::Null));
        assert!(inst.set_slot(1, Value::Int(5)));
        assert_eq!(inst.slot(1), Some(Value::Int(5)));
        assert!(!inst.set_slot(2, Value::Int(9)));
    }

    #[test]
    fn test_object_ids_are_unique() {
        let a = Instance::new(0, 0);
        let b = Instance::new(0, 0);
        assert_ne!(a.object_id, b.object_id);
    }
}
