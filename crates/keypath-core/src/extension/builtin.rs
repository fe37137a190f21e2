//! Builtin extension behaviors for the non-class receiver kinds

use crate::class_registry::ClassRegistry;
use crate::container::adapter_for;
use crate::error::AccessError;
use crate::extension::{Child, ClassExtension};
use crate::value::{MapRef, SetRef, TypeKey, Value};

/// Tag under which a value is selected as a child: an object's `tag`
/// field when declared (and string-valued), else its class short name;
/// non-objects use their kind label.
pub fn child_tag(classes: &ClassRegistry, value: &Value) -> String {
    if let Value::Object(obj) = value {
        let class_id = obj.class_id();
        if let Some(info) = classes.slot_of(class_id, "tag") {
            if info.access.is_accessible() {
                if let Some(Value::Str(tag)) = obj.with(|inst| inst.slot(info.slot)) {
                    return tag.to_string();
                }
            }
        }
        if let Some(class) = classes.get(class_id) {
            return class.short_name().to_string();
        }
    }
    value.kind().label()
}

/// Behavior for string-keyed maps: every field name is an entry key
pub struct MapExtension;

impl ClassExtension for MapExtension {
    fn get(
        &self,
        _classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
    ) -> Result<Value, AccessError> {
        match receiver {
            // A missing entry reads as absent; maps are dynamic by nature.
            Value::Map(map) => Ok(map.get(field).unwrap_or(Value::Null)),
            other => Err(AccessError::TypeMismatch {
                expected: "map".to_string(),
                found: other.kind().label(),
            }),
        }
    }

    fn set(
        &self,
        _classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
        value: Value,
    ) -> Result<(), AccessError> {
        match receiver {
            Value::Map(map) => {
                map.insert(field.to_string(), value);
                Ok(())
            }
            other => Err(AccessError::TypeMismatch {
                expected: "map".to_string(),
                found: other.kind().label(),
            }),
        }
    }

    fn provides(&self, _classes: &ClassRegistry, key: TypeKey, _field: &str) -> bool {
        key == TypeKey::Map
    }

    fn children(
        &self,
        _classes: &ClassRegistry,
        receiver: &Value,
    ) -> Result<Vec<Child>, AccessError> {
        match receiver {
            Value::Map(map) => Ok(map
                .entries()
                .into_iter()
                .map(|(tag, value)| Child { tag, value })
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    fn create_intermediate(&self, key: TypeKey) -> Option<Value> {
        (key == TypeKey::Map).then(|| Value::Map(MapRef::new()))
    }
}

/// Behavior for the sequence kinds: `size`/`count`, `first`, `last`
/// pseudo-fields plus tagged children
pub struct SequenceExtension;

impl ClassExtension for SequenceExtension {
    fn get(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
    ) -> Result<Value, AccessError> {
        let adapter = adapter_for(receiver).ok_or_else(|| AccessError::TypeMismatch {
            expected: "sequence".to_string(),
            found: receiver.kind().label(),
        })?;
        match field {
            "size" | "count" => Ok(Value::Int(adapter.len() as i64)),
            "first" => Ok(adapter.first_element().unwrap_or(Value::Null)),
            "last" => Ok(adapter.last_element()?.unwrap_or(Value::Null)),
            "isEmpty" => Ok(Value::Bool(adapter.is_empty())),
            other => Err(AccessError::NoSuchField {
                type_name: classes.display_name(receiver.kind()),
                field: other.to_string(),
            }),
        }
    }

    fn set(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
        _value: Value,
    ) -> Result<(), AccessError> {
        Err(AccessError::NoSuchField {
            type_name: classes.display_name(receiver.kind()),
            field: field.to_string(),
        })
    }

    fn provides(&self, _classes: &ClassRegistry, key: TypeKey, field: &str) -> bool {
        matches!(key, TypeKey::List | TypeKey::Array | TypeKey::Set)
            && matches!(field, "size" | "count" | "first" | "last" | "isEmpty")
    }

    fn children(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
    ) -> Result<Vec<Child>, AccessError> {
        let adapter = match adapter_for(receiver) {
            Some(a) => a,
            None => return Ok(Vec::new()),
        };
        Ok(adapter
            .to_sequence()
            .snapshot()
            .into_iter()
            .map(|value| Child {
                tag: child_tag(classes, &value),
                value,
            })
            .collect())
    }

    fn create_intermediate(&self, key: TypeKey) -> Option<Value> {
        match key {
            TypeKey::List => Some(Value::list(Vec::new())),
            TypeKey::Set => Some(Value::Set(SetRef::new())),
            // Fixed arrays have no useful empty instance.
            _ => None,
        }
    }
}

/// Universal root behavior: rejects every field by name
///
/// Registered under `Any` so that chain walks terminate in a descriptive
/// failure instead of `NoExtension`.
pub struct AnyExtension;

impl ClassExtension for AnyExtension {
    fn get(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
    ) -> Result<Value, AccessError> {
        Err(AccessError::NoSuchField {
            type_name: classes.display_name(receiver.kind()),
            field: field.to_string(),
        })
    }

    fn set(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        field: &str,
        _value: Value,
    ) -> Result<(), AccessError> {
        Err(AccessError::NoSuchField {
            type_name: classes.display_name(receiver.kind()),
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ClassDef;
    use std::sync::Arc;

    #[test]
    fn test_map_get_set_and_absent() {
        let classes = ClassRegistry::new();
        let ext = MapExtension;
        let map = Value::map_of([("city", Value::str("Paris"))]);

        assert_eq!(ext.get(&classes, &map, "city").unwrap(), Value::str("Paris"));
        assert_eq!(ext.get(&classes, &map, "missing").unwrap(), Value::Null);
        ext.set(&classes, &map, "zip", Value::str("75001")).unwrap();
        assert_eq!(ext.get(&classes, &map, "zip").unwrap(), Value::str("75001"));
    }

    #[test]
    fn test_map_children_tagged_by_key() {
        let classes = ClassRegistry::new();
        let map = Value::map_of([("a", Value::Int(1)), ("b", Value::Int(2))]);
        let children = MapExtension.children(&classes, &map).unwrap();
        let tags: Vec<&str> = children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_sequence_pseudo_fields() {
        let classes = ClassRegistry::new();
        let ext = SequenceExtension;
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(ext.get(&classes, &list, "size").unwrap(), Value::Int(2));
        assert_eq!(ext.get(&classes, &list, "first").unwrap(), Value::Int(1));
        assert_eq!(ext.get(&classes, &list, "last").unwrap(), Value::Int(2));
        assert_eq!(ext.get(&classes, &list, "isEmpty").unwrap(), Value::Bool(false));
        assert!(ext.get(&classes, &list, "nope").is_err());
    }

    #[test]
    fn test_object_child_tag_prefers_tag_field() {
        let classes = Arc::new(ClassRegistry::new());
        let id = classes
            .register(ClassDef::new("ui.Widget").field("tag", "string").build())
            .unwrap();
        let mut inst = classes.instantiate(id).unwrap();
        inst.set_slot(0, Value::str("items"));
        let obj = Value::object(inst);

        assert_eq!(child_tag(&classes, &obj), "items");

        let untagged = Value::object(classes.instantiate(id).unwrap());
        // Null tag slot falls back to the class short name.
        assert_eq!(child_tag(&classes, &untagged), "Widget");
    }

    #[test]
    fn test_any_extension_rejects_by_name() {
        let classes = ClassRegistry::new();
        let err = AnyExtension.get(&classes, &Value::Int(3), "x").unwrap_err();
        assert!(matches!(err, AccessError::NoSuchField { .. }));
    }
}
