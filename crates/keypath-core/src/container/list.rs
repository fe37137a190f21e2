//! Adapter for resizable sequences (all operations supported)

use super::OrderedContainer;
use crate::error::AccessError;
use crate::value::{ListRef, TypeKey, Value};

/// Adapter over a resizable list receiver
pub struct ListAdapter {
    list: ListRef,
}

impl ListAdapter {
    /// Adapt a list handle
    pub fn new(list: ListRef) -> Self {
        Self { list }
    }
}

impl OrderedContainer for ListAdapter {
    fn kind(&self) -> TypeKey {
        TypeKey::List
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn element_at(&self, index: usize) -> Result<Value, AccessError> {
        self.list
            .get(index)
            .ok_or(AccessError::IndexOutOfBounds {
                index,
                len: self.list.len(),
            })
    }

    fn set_element_at(&self, index: usize, value: Value) -> Result<(), AccessError> {
        if self.list.set(index, value) {
            Ok(())
        } else {
            Err(AccessError::IndexOutOfBounds {
                index,
                len: self.list.len(),
            })
        }
    }

    fn insert_at(&self, index: usize, value: Value) -> Result<(), AccessError> {
        if self.list.insert(index, value) {
            Ok(())
        } else {
            Err(AccessError::IndexOutOfBounds {
                index,
                len: self.list.len(),
            })
        }
    }

    fn append(&self, value: Value) -> Result<(), AccessError> {
        self.list.push(value);
        Ok(())
    }

    fn first_element(&self) -> Option<Value> {
        self.list.get(0)
    }

    fn last_element(&self) -> Result<Option<Value>, AccessError> {
        let len = self.list.len();
        Ok(if len == 0 { None } else { self.list.get(len - 1) })
    }

    fn index_of(&self, value: &Value) -> Result<Option<usize>, AccessError> {
        Ok(self.list.snapshot().iter().position(|e| e == value))
    }

    fn index_of_identical(&self, value: &Value) -> Result<Option<usize>, AccessError> {
        Ok(self
            .list
            .snapshot()
            .iter()
            .position(|e| e.identical(value)))
    }

    fn sublist(&self, from: usize, to: usize) -> Result<ListRef, AccessError> {
        let snapshot = self.list.snapshot();
        if from > to || to > snapshot.len() {
            return Err(AccessError::IndexOutOfBounds {
                index: to,
                len: snapshot.len(),
            });
        }
        Ok(ListRef::from_vec(snapshot[from..to].to_vec()))
    }

    fn clear_all(&self) -> Result<(), AccessError> {
        self.list.clear();
        Ok(())
    }

    fn to_sequence(&self) -> ListRef {
        ListRef::from_vec(self.list.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> ListAdapter {
        ListAdapter::new(ListRef::from_vec(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
        ]))
    }

    #[test]
    fn test_positional_operations() {
        let a = adapter();
        assert_eq!(a.len(), 3);
        assert_eq!(a.element_at(0).unwrap(), Value::Int(1));
        assert_eq!(a.first_element(), Some(Value::Int(1)));
        assert_eq!(a.last_element().unwrap(), Some(Value::Int(3)));
        a.insert_at(1, Value::Int(9)).unwrap();
        assert_eq!(a.element_at(1).unwrap(), Value::Int(9));
        a.append(Value::Int(4)).unwrap();
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_index_of_variants() {
        let shared = Value::list(vec![]);
        let a = ListAdapter::new(ListRef::from_vec(vec![
            Value::str("x"),
            shared.clone(),
        ]));
        // Content-equal but distinct string handle: found by equality,
        // found by identity only via the same handle.
        assert_eq!(a.index_of(&Value::str("x")).unwrap(), Some(0));
        assert_eq!(a.index_of_identical(&Value::str("x")).unwrap(), None);
        assert_eq!(a.index_of_identical(&shared).unwrap(), Some(1));
    }

    #[test]
    fn test_sublist_and_clear() {
        let a = adapter();
        let sub = a.sublist(1, 3).unwrap();
        assert_eq!(sub.snapshot(), vec![Value::Int(2), Value::Int(3)]);
        assert!(a.sublist(2, 1).is_err());
        assert!(a.sublist(0, 9).is_err());
        a.clear_all().unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let a = adapter();
        assert!(matches!(
            a.element_at(9),
            Err(AccessError::IndexOutOfBounds { index: 9, len: 3 })
        ));
        assert!(a.set_element_at(9, Value::Null).is_err());
    }
}
