//! Path walking against live receivers
//!
//! Each step asks the engine to fetch the named value from the current
//! receiver and feeds the result to the next segment. Null intermediates
//! stop a read and yield absent; on the write path the governing
//! extension may construct the missing intermediate container.

use crate::engine::Engine;
use crate::error::PathError;
use crate::path::{PathExpression, Segment};
use keypath_core::Value;

impl Engine {
    /// Resolve a path string against a receiver (parse + walk)
    pub fn get(&self, receiver: &Value, path: &str) -> Result<Value, PathError> {
        let parsed = self.parse_path(path)?;
        self.get_path(receiver, &parsed)
    }

    /// Assign through a path string (parse + walk + write)
    pub fn set(&self, receiver: &Value, path: &str, value: Value) -> Result<(), PathError> {
        let parsed = self.parse_path(path)?;
        self.set_path(receiver, &parsed, value)
    }

    /// Walk a parsed path for reading
    ///
    /// A null receiver at any step stops the walk and yields absent.
    /// A terminal `Tag[]` yields the matching children in original
    /// relative order; a non-terminal one must match exactly one child.
    pub fn get_path(&self, receiver: &Value, path: &PathExpression) -> Result<Value, PathError> {
        let mut current = receiver.clone();
        let mut node = path;
        loop {
            if current.is_null() {
                return Ok(Value::Null);
            }
            let next = match node.segment() {
                Segment::Field(name) => self.get_field(&current, name)?,
                Segment::AllChildren => {
                    let children = self.children_of(&current)?;
                    Value::list(children.into_iter().map(|c| c.value).collect())
                }
                Segment::TagFilter(tag) => {
                    let matches: Vec<Value> = self
                        .children_of(&current)?
                        .into_iter()
                        .filter(|c| c.tag.as_str() == tag.as_ref())
                        .map(|c| c.value)
                        .collect();
                    match node.rest() {
                        // Terminal filters return the whole subsequence.
                        None => return Ok(Value::list(matches)),
                        Some(rest) => {
                            let mut matches = matches;
                            match matches.len() {
                                0 => return Ok(Value::Null),
                                1 => {
                                    current = matches.pop().expect("one element");
                                    node = rest;
                                    continue;
                                }
                                n => {
                                    return Err(PathError::AmbiguousPath {
                                        segment: tag.to_string(),
                                        matches: n,
                                    })
                                }
                            }
                        }
                    }
                }
            };
            match node.rest() {
                Some(rest) => {
                    current = next;
                    node = rest;
                }
                None => return Ok(next),
            }
        }
    }

    /// Walk a parsed path for writing
    ///
    /// Null intermediates are constructed on demand when the governing
    /// extension supports it (an empty container of the receiver's
    /// concrete kind); otherwise the write fails. The final segment must
    /// be a plain field.
    pub fn set_path(
        &self,
        receiver: &Value,
        path: &PathExpression,
        value: Value,
    ) -> Result<(), PathError> {
        let mut current = receiver.clone();
        let mut node = path;
        while let Some(rest) = node.rest() {
            match node.segment() {
                Segment::Field(name) => {
                    if current.is_null() {
                        return Err(PathError::UnresolvedIntermediate {
                            segment: name.to_string(),
                        });
                    }
                    let mut next = self.get_field(&current, name)?;
                    if next.is_null() {
                        let extension = self.extensions().lookup(current.kind())?;
                        match extension.create_intermediate(current.kind()) {
                            Some(created) => {
                                self.set_field(&current, name, created.clone())?;
                                next = created;
                            }
                            None => {
                                return Err(PathError::UnresolvedIntermediate {
                                    segment: name.to_string(),
                                })
                            }
                        }
                    }
                    current = next;
                    node = rest;
                }
                Segment::TagFilter(tag) => {
                    let mut matches: Vec<Value> = self
                        .children_of(&current)?
                        .into_iter()
                        .filter(|c| c.tag.as_str() == tag.as_ref())
                        .map(|c| c.value)
                        .collect();
                    match matches.len() {
                        0 => {
                            return Err(PathError::UnresolvedIntermediate {
                                segment: format!("{}[]", tag),
                            })
                        }
                        1 => {
                            current = matches.pop().expect("one element");
                            node = rest;
                        }
                        n => {
                            return Err(PathError::AmbiguousPath {
                                segment: tag.to_string(),
                                matches: n,
                            })
                        }
                    }
                }
                Segment::AllChildren => {
                    return Err(PathError::Malformed {
                        path: path.to_string(),
                        reason: "cannot write through a whole-children segment".to_string(),
                    })
                }
            }
        }
        match node.segment() {
            Segment::Field(name) => self.set_field(&current, name, value),
            other => Err(PathError::Malformed {
                path: path.to_string(),
                reason: format!("cannot assign to segment {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypath_core::ClassDef;

    #[test]
    fn test_map_path_get() {
        let engine = Engine::new();
        let receiver = Value::map_of([(
            "address",
            Value::map_of([("city", Value::str("Paris"))]),
        )]);
        assert_eq!(
            engine.get(&receiver, "address.city").unwrap(),
            Value::str("Paris")
        );
    }

    #[test]
    fn test_null_intermediate_reads_absent() {
        let engine = Engine::new();
        let receiver = Value::map_of([("address", Value::Null)]);
        assert_eq!(engine.get(&receiver, "address.city").unwrap(), Value::Null);
    }

    #[test]
    fn test_set_creates_map_intermediates() {
        let engine = Engine::new();
        let receiver = Value::map();
        engine
            .set(&receiver, "address.city", Value::str("Paris"))
            .unwrap();
        assert_eq!(
            engine.get(&receiver, "address.city").unwrap(),
            Value::str("Paris")
        );
    }

    #[test]
    fn test_set_through_object_intermediate_fails_without_creation() {
        let engine = Engine::new();
        engine
            .register_class(ClassDef::new("Person").field("home", "map").build())
            .unwrap();
        let person = engine.instantiate("Person").unwrap();
        // The object extension does not support on-demand creation, so
        // the null `home` intermediate stops the write.
        let err = engine
            .set(&person, "home.city.zone", Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, PathError::UnresolvedIntermediate { .. }));
    }

    #[test]
    fn test_assigning_to_filter_segment_is_malformed() {
        let engine = Engine::new();
        let receiver = Value::map();
        assert!(matches!(
            engine.set(&receiver, "a.items[]", Value::Null),
            Err(PathError::Malformed { .. })
        ));
    }
}
