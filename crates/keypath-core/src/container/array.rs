//! Adapter for fixed-size sequences
//!
//! Reads and in-place writes are supported; anything that would change
//! the length is an unsupported operation. `new_mutable_like` hands back
//! a resizable list, never another fixed array.

use super::{bounds_check, unsupported, OrderedContainer};
use crate::error::AccessError;
use crate::value::{ArrayRef, ListRef, TypeKey, Value};

/// Adapter over a fixed-size array receiver
pub struct ArrayAdapter {
    array: ArrayRef,
}

impl ArrayAdapter {
    /// Adapt an array handle
    pub fn new(array: ArrayRef) -> Self {
        Self { array }
    }
}

impl OrderedContainer for ArrayAdapter {
    fn kind(&self) -> TypeKey {
        TypeKey::Array
    }

    fn len(&self) -> usize {
        self.array.len()
    }

    fn element_at(&self, index: usize) -> Result<Value, AccessError> {
        self.array
            .get(index)
            .ok_or(AccessError::IndexOutOfBounds {
                index,
                len: self.array.len(),
            })
    }

    fn set_element_at(&self, index: usize, value: Value) -> Result<(), AccessError> {
        bounds_check(index, self.array.len())?;
        self.array.set(index, value);
        Ok(())
    }

    fn insert_at(&self, _index: usize, _value: Value) -> Result<(), AccessError> {
        Err(unsupported(TypeKey::Array, "insert_at"))
    }

    fn append(&self, _value: Value) -> Result<(), AccessError> {
        Err(unsupported(TypeKey::Array, "append"))
    }

    fn first_element(&self) -> Option<Value> {
        self.array.get(0)
    }

    fn last_element(&self) -> Result<Option<Value>, AccessError> {
        let len = self.array.len();
        Ok(if len == 0 {
            None
        } else {
            self.array.get(len - 1)
        })
    }

    fn index_of(&self, value: &Value) -> Result<Option<usize>, AccessError> {
        Ok(self.array.snapshot().iter().position(|e| e == value))
    }

    fn index_of_identical(&self, value: &Value) -> Result<Option<usize>, AccessError> {
        Ok(self
            .array
            .snapshot()
            .iter()
            .position(|e| e.identical(value)))
    }

    fn sublist(&self, from: usize, to: usize) -> Result<ListRef, AccessError> {
        let snapshot = self.array.snapshot();
        if from > to || to > snapshot.len() {
            return Err(AccessError::IndexOutOfBounds {
                index: to,
                len: snapshot.len(),
            });
        }
        Ok(ListRef::from_vec(snapshot[from..to].to_vec()))
    }

    fn clear_all(&self) -> Result<(), AccessError> {
        Err(unsupported(TypeKey::Array, "clear_all"))
    }

    fn to_sequence(&self) -> ListRef {
        ListRef::from_vec(self.array.snapshot())
    }
}
