//! Keypath core: dynamic value model, class system, container adapters,
//! and class extensions
//!
//! This crate holds the object model the path engine walks:
//!
//! - [`value::Value`] — dynamic values (primitives, strings, the three
//!   sequence kinds, string-keyed maps, class instances)
//! - [`object`] / [`class_registry`] — registered class metadata with
//!   slot layout, methods, inheritance, and accessibility
//! - [`container`] — uniform sequence operations per container kind
//! - [`extension`] — per-type behavior registry with supertype-chain
//!   dispatch and per-key caching

pub mod class_registry;
pub mod container;
pub mod error;
pub mod extension;
pub mod object;
pub mod value;

/// Class id: index into the class registry
pub type ClassId = usize;

pub use class_registry::{ClassRegistry, SlotInfo};
pub use container::{adapter_for, OrderedContainer};
pub use error::AccessError;
pub use extension::{child_tag, Child, ClassExtension, ExtensionRegistry};
pub use object::{Access, ClassDef, FieldDef, Instance, MethodDef, NativeFn};
pub use value::{ArrayRef, ListRef, MapRef, ObjectRef, SetRef, TypeKey, Value};
