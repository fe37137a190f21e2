//! Adapter for set-like receivers (no positional semantics)
//!
//! Positional operations are unsupported. `first_element` returns an
//! arbitrary element of iteration order; `last_element` is unsupported
//! because "last" is meaningless without positions.

use super::{unsupported, OrderedContainer};
use crate::error::AccessError;
use crate::value::{ListRef, SetRef, TypeKey, Value};

/// Adapter over a set receiver
pub struct SetAdapter {
    set: SetRef,
}

impl SetAdapter {
    /// Adapt a set handle
    pub fn new(set: SetRef) -> Self {
        Self { set }
    }
}

impl OrderedContainer for SetAdapter {
    fn kind(&self) -> TypeKey {
        TypeKey::Set
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    fn element_at(&self, _index: usize) -> Result<Value, AccessError> {
        Err(unsupported(TypeKey::Set, "element_at"))
    }

    fn set_element_at(&self, _index: usize, _value: Value) -> Result<(), AccessError> {
        Err(unsupported(TypeKey::Set, "set_element_at"))
    }

    fn insert_at(&self, _index: usize, _value: Value) -> Result<(), AccessError> {
        Err(unsupported(TypeKey::Set, "insert_at"))
    }

    fn append(&self, value: Value) -> Result<(), AccessError> {
        self.set.insert(value);
        Ok(())
    }

    fn first_element(&self) -> Option<Value> {
        self.set.snapshot().into_iter().next()
    }

    fn last_element(&self) -> Result<Option<Value>, AccessError> {
        Err(unsupported(TypeKey::Set, "last_element"))
    }

    fn index_of(&self, _value: &Value) -> Result<Option<usize>, AccessError> {
        Err(unsupported(TypeKey::Set, "index_of"))
    }

    fn index_of_identical(&self, _value: &Value) -> Result<Option<usize>, AccessError> {
        Err(unsupported(TypeKey::Set, "index_of_identical"))
    }

    fn sublist(&self, _from: usize, _to: usize) -> Result<ListRef, AccessError> {
        Err(unsupported(TypeKey::Set, "sublist"))
    }

    fn clear_all(&self) -> Result<(), AccessError> {
        self.set.clear();
        Ok(())
    }

    fn to_sequence(&self) -> ListRef {
        ListRef::from_vec(self.set.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> SetAdapter {
        let set = SetRef::new();
        set.insert(Value::Int(1));
        set.insert(Value::Int(2));
        SetAdapter::new(set)
    }

    #[test]
    fn test_membership_operations() {
        let a = adapter();
        assert_eq!(a.len(), 2);
        a.append(Value::Int(3)).unwrap();
        a.append(Value::Int(3)).unwrap();
        assert_eq!(a.len(), 3);
        assert!(a.first_element().is_some());
        a.clear_all().unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn test_positional_operations_unsupported() {
        let a = adapter();
        assert!(a.element_at(0).is_err());
        assert!(a.set_element_at(0, Value::Null).is_err());
        assert!(a.insert_at(0, Value::Null).is_err());
        assert!(a.index_of(&Value::Int(1)).is_err());
        assert!(a.index_of_identical(&Value::Int(1)).is_err());
        assert!(a.sublist(0, 1).is_err());
        assert!(a.last_element().is_err());
    }

    #[test]
    fn test_to_sequence_materializes_all_elements() {
        let a = adapter();
        let seq = a.to_sequence();
        assert_eq!(seq.len(), 2);
    }
}
