//! Ordered-container adapters
//!
//! A uniform sequence interface over the heterogeneous container kinds a
//! receiver may be. Capability gaps are surfaced as typed errors rather
//! than silently misbehaving: fixed arrays reject growth, sets reject
//! positional access.

mod array;
mod list;
mod set;

pub use array::ArrayAdapter;
pub use list::ListAdapter;
pub use set::SetAdapter;

use crate::error::AccessError;
use crate::value::{ListRef, TypeKey, Value};

/// Uniform sequence operations over a container receiver
///
/// Adapters hold cheap shared handles; all operations go through the
/// underlying container, so mutations are visible to every holder.
pub trait OrderedContainer: Send + Sync {
    /// Kind of the adapted receiver
    fn kind(&self) -> TypeKey;

    /// Number of elements
    fn len(&self) -> usize;

    /// True when the container holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`
    fn element_at(&self, index: usize) -> Result<Value, AccessError>;

    /// Replace the element at `index`
    fn set_element_at(&self, index: usize, value: Value) -> Result<(), AccessError>;

    /// Insert at `index`, shifting later elements
    fn insert_at(&self, index: usize, value: Value) -> Result<(), AccessError>;

    /// Add an element at the end (or into the collection, for sets)
    fn append(&self, value: Value) -> Result<(), AccessError>;

    /// First element, or None when empty; for sets this is an arbitrary
    /// element of iteration order
    fn first_element(&self) -> Option<Value>;

    /// Last element, or None when empty
    fn last_element(&self) -> Result<Option<Value>, AccessError>;

    /// Position of the first element equal to `value`
    fn index_of(&self, value: &Value) -> Result<Option<usize>, AccessError>;

    /// Position of the first element identical to `value` (handle
    /// identity for containers and objects)
    fn index_of_identical(&self, value: &Value) -> Result<Option<usize>, AccessError>;

    /// Elements in `[from, to)` as a fresh resizable list
    fn sublist(&self, from: usize, to: usize) -> Result<ListRef, AccessError>;

    /// Remove all elements
    fn clear_all(&self) -> Result<(), AccessError>;

    /// Materialize the current elements into a fresh resizable list
    fn to_sequence(&self) -> ListRef;

    /// Fresh empty resizable list, regardless of the receiver kind
    fn new_mutable_like(&self) -> ListRef {
        ListRef::new()
    }
}

/// Select the adapter for a container value; None for non-containers
pub fn adapter_for(value: &Value) -> Option<Box<dyn OrderedContainer>> {
    match value {
        Value::List(l) => Some(Box::new(ListAdapter::new(l.clone()))),
        Value::Array(a) => Some(Box::new(ArrayAdapter::new(a.clone()))),
        Value::Set(s) => Some(Box::new(SetAdapter::new(s.clone()))),
        _ => None,
    }
}

pub(crate) fn unsupported(kind: TypeKey, operation: &str) -> AccessError {
    AccessError::UnsupportedContainerOperation {
        kind: kind.label(),
        operation: operation.to_string(),
    }
}

pub(crate) fn bounds_check(index: usize, len: usize) -> Result<(), AccessError> {
    if index < len {
        Ok(())
    } else {
        Err(AccessError::IndexOutOfBounds { index, len })
    }
}
