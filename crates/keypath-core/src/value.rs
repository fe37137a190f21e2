//! Dynamic value model
//!
//! Every receiver the path engine can walk is a `Value`: primitives,
//! strings, the three sequence kinds, string-keyed maps, and class
//! instances. Container and object variants are shared handles; cloning
//! a `Value` clones the handle, not the contents.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::object::Instance;
use crate::ClassId;

/// Shared handle to a resizable sequence
#[derive(Clone, Default)]
pub struct ListRef(Arc<RwLock<Vec<Value>>>);

/// Shared handle to a fixed-size sequence (length set at construction)
#[derive(Clone)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

/// Shared handle to an unordered, duplicate-free collection
///
/// Backed by an insertion-ordered vector with equality-checked inserts;
/// iteration order is an implementation detail callers must not rely on.
#[derive(Clone, Default)]
pub struct SetRef(Arc<RwLock<Vec<Value>>>);

/// Shared handle to a string-keyed map (insertion-ordered)
#[derive(Clone, Default)]
pub struct MapRef(Arc<RwLock<IndexMap<String, Value>>>);

/// Shared handle to a class instance
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Instance>>);

/// Runtime type key used for extension dispatch
///
/// The supertype chain is: every builtin kind -> `Any`; `Class(id)` ->
/// parent class chain -> `Any`; `Any` is the root and has no parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// The null value
    Null,
    /// Booleans
    Bool,
    /// 64-bit integers
    Int,
    /// 64-bit floats
    Float,
    /// Strings
    Str,
    /// Resizable sequences
    List,
    /// Fixed-size sequences
    Array,
    /// Unordered collections
    Set,
    /// String-keyed maps
    Map,
    /// Instances of the registered class with this id
    Class(ClassId),
    /// Universal root of the type hierarchy
    Any,
}

impl TypeKey {
    /// Short display name of the key (class keys render as `class#id`;
    /// use [`crate::ClassRegistry::display_name`] for the real name)
    pub fn label(&self) -> String {
        match self {
            TypeKey::Null => "null".to_string(),
            TypeKey::Bool => "bool".to_string(),
            TypeKey::Int => "int".to_string(),
            TypeKey::Float => "float".to_string(),
            TypeKey::Str => "string".to_string(),
            TypeKey::List => "list".to_string(),
            TypeKey::Array => "array".to_string(),
            TypeKey::Set => "set".to_string(),
            TypeKey::Map => "map".to_string(),
            TypeKey::Class(id) => format!("class#{}", id),
            TypeKey::Any => "any".to_string(),
        }
    }
}

/// A dynamic value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent / null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Resizable sequence
    List(ListRef),
    /// Fixed-size sequence
    Array(ArrayRef),
    /// Unordered collection
    Set(SetRef),
    /// String-keyed map
    Map(MapRef),
    /// Class instance
    Object(ObjectRef),
}

impl Value {
    /// Build a string value
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Build a resizable list from the given elements
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(ListRef::from_vec(elements))
    }

    /// Build a fixed-size array from the given elements
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(ArrayRef::from_vec(elements))
    }

    /// Build a set from the given elements (duplicates dropped)
    pub fn set(elements: Vec<Value>) -> Value {
        let set = SetRef::new();
        for e in elements {
            set.insert(e);
        }
        Value::Set(set)
    }

    /// Build an empty map
    pub fn map() -> Value {
        Value::Map(MapRef::new())
    }

    /// Build a map from string/value pairs
    pub fn map_of(entries: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Value {
        let map = MapRef::new();
        for (k, v) in entries {
            map.insert(k.into(), v);
        }
        Value::Map(map)
    }

    /// Wrap an instance into an object value
    pub fn object(instance: Instance) -> Value {
        Value::Object(ObjectRef::new(instance))
    }

    /// Runtime type key of this value
    pub fn kind(&self) -> TypeKey {
        match self {
            Value::Null => TypeKey::Null,
            Value::Bool(_) => TypeKey::Bool,
            Value::Int(_) => TypeKey::Int,
            Value::Float(_) => TypeKey::Float,
            Value::Str(_) => TypeKey::Str,
            Value::List(_) => TypeKey::List,
            Value::Array(_) => TypeKey::Array,
            Value::Set(_) => TypeKey::Set,
            Value::Map(_) => TypeKey::Map,
            Value::Object(o) => TypeKey::Class(o.class_id()),
        }
    }

    /// True for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean contents, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Identity comparison: handle identity for containers, objects, and
    /// strings; bit-for-bit equality for primitives
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    /// Equality: content for primitives and strings, handle identity for
    /// containers and objects
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => self.identical(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(l) => write!(f, "list(len={})", l.len()),
            Value::Array(a) => write!(f, "array(len={})", a.len()),
            Value::Set(s) => write!(f, "set(len={})", s.len()),
            Value::Map(m) => write!(f, "map(len={})", m.len()),
            Value::Object(o) => write!(f, "object(class={})", o.class_id()),
        }
    }
}

impl ListRef {
    /// Create an empty list
    pub fn new() -> Self {
        ListRef(Arc::new(RwLock::new(Vec::new())))
    }

    /// Create a list from existing elements
    pub fn from_vec(elements: Vec<Value>) -> Self {
        ListRef(Arc::new(RwLock::new(elements)))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True when the list holds no elements
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Element at `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Replace the element at `index`; false when out of bounds
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut guard = self.0.write();
        if index < guard.len() {
            guard[index] = value;
            true
        } else {
            false
        }
    }

    /// Insert `value` at `index`, shifting later elements; false when out
    /// of bounds (index == len appends)
    pub fn insert(&self, index: usize, value: Value) -> bool {
        let mut guard = self.0.write();
        if index <= guard.len() {
            guard.insert(index, value);
            true
        } else {
            false
        }
    }

    /// Append `value`
    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Remove all elements
    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Snapshot of the current elements
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }
}

impl ArrayRef {
    /// Create a fixed-size array from existing elements
    pub fn from_vec(elements: Vec<Value>) -> Self {
        ArrayRef(Arc::new(RwLock::new(elements)))
    }

    /// Create a fixed-size array of `len` nulls
    pub fn nulls(len: usize) -> Self {
        ArrayRef(Arc::new(RwLock::new(vec![Value::Null; len])))
    }

    /// Number of elements (fixed for the array lifetime)
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True when the array has length zero
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Element at `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Replace the element at `index`; false when out of bounds
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut guard = self.0.write();
        if index < guard.len() {
            guard[index] = value;
            true
        } else {
            false
        }
    }

    /// Snapshot of the current elements
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }
}

impl SetRef {
    /// Create an empty set
    pub fn new() -> Self {
        SetRef(Arc::new(RwLock::new(Vec::new())))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True when the set holds no elements
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Insert `value` unless an equal element is already present; returns
    /// true when the set grew
    pub fn insert(&self, value: Value) -> bool {
        let mut guard = self.0.write();
        if guard.iter().any(|e| *e == value) {
            false
        } else {
            guard.push(value);
            true
        }
    }

    /// True when an equal element is present
    pub fn contains(&self, value: &Value) -> bool {
        self.0.read().iter().any(|e| e == value)
    }

    /// Remove all elements
    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Snapshot of the current elements in iteration order
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }
}

impl MapRef {
    /// Create an empty map
    pub fn new() -> Self {
        MapRef(Arc::new(RwLock::new(IndexMap::new())))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True when the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// True when `key` has an entry (even a null one)
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Insert or replace the entry under `key`
    pub fn insert(&self, key: String, value: Value) {
        self.0.write().insert(key, value);
    }

    /// Snapshot of the entries in insertion order
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl ObjectRef {
    /// Wrap an instance
    pub fn new(instance: Instance) -> Self {
        ObjectRef(Arc::new(RwLock::new(instance)))
    }

    /// Class id of the wrapped instance
    pub fn class_id(&self) -> ClassId {
        self.0.read().class_id
    }

    /// Unique object id of the wrapped instance
    pub fn object_id(&self) -> u64 {
        self.0.read().object_id
    }

    /// Run `f` with shared access to the instance
    pub fn with<R>(&self, f: impl FnOnce(&Instance) -> R) -> R {
        f(&self.0.read())
    }

    /// Run `f` with exclusive access to the instance
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Instance) -> R) -> R {
        f(&mut self.0.write())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef(class={})", self.class_id())
    }
}
