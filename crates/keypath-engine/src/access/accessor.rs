//! Accessors with two-tier execution
//!
//! An accessor is resolved once per (class, field, direction) and then
//! cached. Invocations start on the reflective tier, which re-walks the
//! class metadata by name on every call. Each call bumps an atomic
//! counter; past the promotion threshold the invoking thread claims
//! synthesis with a CAS, builds a specialized closure bound directly to
//! the slot index or method handle, and publishes it through a
//! `OnceCell` — a single atomic publish, so racing readers observe
//! either tier, never a torn state.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use keypath_core::{AccessError, ClassExtension, ClassId, ClassRegistry, Value};

/// Calls on the reflective tier before synthesis is attempted
pub const PROMOTION_THRESHOLD: u32 = 32;

/// Whether an accessor reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Getter
    Get,
    /// Setter
    Set,
}

/// How an accessor reaches the field, selected once at resolution
#[derive(Clone)]
pub enum Strategy {
    /// Field-backed: a declared field (possibly under the legacy
    /// `_name` spelling) located by slot
    Slot {
        /// The declared spelling that matched (`name` or `_name`)
        declared_name: String,
    },
    /// Method-backed: a getter/setter-convention method
    Method {
        /// The convention method name that matched
        method_name: String,
    },
    /// Extension-backed: a registered class extension serves the field,
    /// receiver passed explicitly
    Extension {
        /// The behavior object found on the class chain
        extension: Arc<dyn ClassExtension>,
    },
    /// Map-backed: the class is extensible and the field lives in the
    /// instance's dynamic map
    DynamicMap,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Slot { declared_name } => write!(f, "Slot({})", declared_name),
            Strategy::Method { method_name } => write!(f, "Method({})", method_name),
            Strategy::Extension { .. } => write!(f, "Extension"),
            Strategy::DynamicMap => write!(f, "DynamicMap"),
        }
    }
}

type FastGetFn = Arc<dyn Fn(&Value) -> Result<Value, AccessError> + Send + Sync>;
type FastSetFn = Arc<dyn Fn(&Value, Value) -> Result<(), AccessError> + Send + Sync>;

enum FastFn {
    Get(FastGetFn),
    Set(FastSetFn),
}

/// A cached accessor for one (class, field, direction)
pub struct Accessor {
    class_id: ClassId,
    field: Arc<str>,
    direction: Direction,
    strategy: Strategy,
    calls: AtomicU32,
    synthesizing: AtomicBool,
    fast: OnceCell<FastFn>,
}

impl Accessor {
    pub(crate) fn new(
        class_id: ClassId,
        field: Arc<str>,
        direction: Direction,
        strategy: Strategy,
    ) -> Self {
        Self {
            class_id,
            field,
            direction,
            strategy,
            calls: AtomicU32::new(0),
            synthesizing: AtomicBool::new(false),
            fast: OnceCell::new(),
        }
    }

    /// Field name this accessor serves
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Direction this accessor serves
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Strategy selected at resolution
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// True once the specialized tier has been published
    pub fn is_promoted(&self) -> bool {
        self.fast.get().is_some()
    }

    /// Calls recorded on the reflective tier since the last reset
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Read the field from `receiver`
    pub fn get(&self, classes: &ClassRegistry, receiver: &Value) -> Result<Value, AccessError> {
        debug_assert_eq!(self.direction, Direction::Get);
        if let Some(FastFn::Get(fast)) = self.fast.get() {
            return fast(receiver);
        }
        self.record_call(classes);
        if let Some(FastFn::Get(fast)) = self.fast.get() {
            return fast(receiver);
        }
        self.reflective_get(classes, receiver)
    }

    /// Write the field on `receiver`
    pub fn set(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        value: Value,
    ) -> Result<(), AccessError> {
        debug_assert_eq!(self.direction, Direction::Set);
        if let Some(FastFn::Set(fast)) = self.fast.get() {
            return fast(receiver, value);
        }
        self.record_call(classes);
        if let Some(FastFn::Set(fast)) = self.fast.get() {
            return fast(receiver, value);
        }
        self.reflective_set(classes, receiver, value)
    }

    fn record_call(&self, classes: &ClassRegistry) {
        let count = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if count > PROMOTION_THRESHOLD {
            self.try_promote(classes);
        }
    }

    /// Claim synthesis with a CAS so a threshold race produces at most
    /// one attempt; losers keep using the reflective tier.
    fn try_promote(&self, classes: &ClassRegistry) {
        if self.fast.get().is_some() {
            return;
        }
        if self
            .synthesizing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        match self.synthesize(classes) {
            Some(fast) => {
                // The CAS claim guarantees a single setter; a failed set
                // would mean another publish won, which is fine too.
                let _ = self.fast.set(fast);
                tracing::debug!(
                    class = self.class_id,
                    field = %self.field,
                    strategy = ?self.strategy,
                    "promoted accessor to specialized tier"
                );
            }
            None => {
                // Unavailable for this strategy: reset so we do not pay
                // a synthesis attempt on every subsequent call.
                self.calls.store(0, Ordering::Relaxed);
            }
        }
        self.synthesizing.store(false, Ordering::Release);
    }

    /// Build the specialized closure, or None when the strategy has no
    /// profitable specialization
    fn synthesize(&self, classes: &ClassRegistry) -> Option<FastFn> {
        match (&self.strategy, self.direction) {
            (Strategy::Slot { declared_name }, Direction::Get) => {
                let info = classes.slot_of(self.class_id, declared_name)?;
                let slot = info.slot;
                let fast: FastGetFn = Arc::new(move |receiver| match receiver {
                    Value::Object(obj) => Ok(obj.with(|inst| inst.slot(slot)).unwrap_or(Value::Null)),
                    other => Err(AccessError::TypeMismatch {
                        expected: "object".to_string(),
                        found: other.kind().label(),
                    }),
                });
                Some(FastFn::Get(fast))
            }
            (Strategy::Slot { declared_name }, Direction::Set) => {
                let info = classes.slot_of(self.class_id, declared_name)?;
                let slot = info.slot;
                let fast: FastSetFn = Arc::new(move |receiver, value| match receiver {
                    Value::Object(obj) => {
                        obj.with_mut(|inst| inst.set_slot(slot, value));
                        Ok(())
                    }
                    other => Err(AccessError::TypeMismatch {
                        expected: "object".to_string(),
                        found: other.kind().label(),
                    }),
                });
                Some(FastFn::Set(fast))
            }
            (Strategy::Method { method_name }, Direction::Get) => {
                let method = classes
                    .methods_named(self.class_id, method_name)
                    .into_iter()
                    .find(|m| m.param_types.is_empty() && m.access.is_accessible())?;
                let body = method.body.clone();
                let fast: FastGetFn = Arc::new(move |receiver| body(receiver, &[]));
                Some(FastFn::Get(fast))
            }
            (Strategy::Method { method_name }, Direction::Set) => {
                let method = classes
                    .methods_named(self.class_id, method_name)
                    .into_iter()
                    .find(|m| m.param_types.len() == 1 && m.access.is_accessible())?;
                let body = method.body.clone();
                let fast: FastSetFn = Arc::new(move |receiver, value| {
                    body(receiver, &[value]).map(|_| ())
                });
                Some(FastFn::Set(fast))
            }
            // Extension and dynamic-map access already go through a
            // single dynamic call; there is nothing cheaper to bind to.
            (Strategy::Extension { .. }, _) | (Strategy::DynamicMap, _) => None,
        }
    }

    fn reflective_get(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
    ) -> Result<Value, AccessError> {
        match &self.strategy {
            Strategy::Slot { declared_name } => {
                let info = classes
                    .slot_of(self.class_id, declared_name)
                    .ok_or_else(|| self.no_such_field(classes))?;
                match receiver {
                    Value::Object(obj) => {
                        Ok(obj.with(|inst| inst.slot(info.slot)).unwrap_or(Value::Null))
                    }
                    other => Err(self.not_an_object(other)),
                }
            }
            Strategy::Method { method_name } => {
                let method = classes
                    .methods_named(self.class_id, method_name)
                    .into_iter()
                    .find(|m| m.param_types.is_empty() && m.access.is_accessible())
                    .ok_or_else(|| self.no_such_field(classes))?;
                (method.body)(receiver, &[])
            }
            Strategy::Extension { extension } => extension.get(classes, receiver, &self.field),
            Strategy::DynamicMap => match receiver {
                Value::Object(obj) => Ok(obj
                    .with(|inst| inst.dynamic_field(&self.field))
                    .unwrap_or(Value::Null)),
                other => Err(self.not_an_object(other)),
            },
        }
    }

    fn reflective_set(
        &self,
        classes: &ClassRegistry,
        receiver: &Value,
        value: Value,
    ) -> Result<(), AccessError> {
        match &self.strategy {
            Strategy::Slot { declared_name } => {
                let info = classes
                    .slot_of(self.class_id, declared_name)
                    .ok_or_else(|| self.no_such_field(classes))?;
                match receiver {
                    Value::Object(obj) => {
                        obj.with_mut(|inst| inst.set_slot(info.slot, value));
                        Ok(())
                    }
                    other => Err(self.not_an_object(other)),
                }
            }
            Strategy::Method { method_name } => {
                let method = classes
                    .methods_named(self.class_id, method_name)
                    .into_iter()
                    .find(|m| m.param_types.len() == 1 && m.access.is_accessible())
                    .ok_or_else(|| self.no_such_field(classes))?;
                (method.body)(receiver, &[value]).map(|_| ())
            }
            Strategy::Extension { extension } => {
                extension.set(classes, receiver, &self.field, value)
            }
            Strategy::DynamicMap => match receiver {
                Value::Object(obj) => {
                    obj.with_mut(|inst| inst.set_dynamic_field(self.field.to_string(), value));
                    Ok(())
                }
                other => Err(self.not_an_object(other)),
            },
        }
    }

    fn no_such_field(&self, classes: &ClassRegistry) -> AccessError {
        AccessError::NoSuchField {
            type_name: classes
                .get(self.class_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("class#{}", self.class_id)),
            field: self.field.to_string(),
        }
    }

    fn not_an_object(&self, receiver: &Value) -> AccessError {
        AccessError::TypeMismatch {
            expected: "object".to_string(),
            found: receiver.kind().label(),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("class_id", &self.class_id)
            .field("field", &self.field)
            .field("direction", &self.direction)
            .field("strategy", &self.strategy)
            .field("promoted", &self.is_promoted())
            .finish()
    }
}
