//! Keypath type introspection
//!
//! Descriptors for every value shape the engine works with, resolved
//! by name through a provider chain and shared process-wide:
//!
//! - [`TypeInfo`] describes a type (primitive, object, container, or
//!   array) with lazily loaded field and method tables
//! - [`TypeRegistry`] resolves name strings through providers, with
//!   synthesis of container (`list<T>`) and array (`[T`) descriptors
//! - [`resolve_method`] picks among overloads in exact, widening, and
//!   narrowing passes
//! - [`AliasRepository`] maps display aliases onto fully-qualified
//!   names, loaded leniently from a CSV resource
//!
//! All entry points take `&self` and are safe to share across threads.

pub mod alias;
pub mod info;
pub mod overload;
pub mod provider;
pub mod registry;

pub use alias::AliasRepository;
pub use info::{FieldInfo, MethodInfo, TypeInfo, TypeKind};
pub use overload::resolve_method;
pub use provider::{ObjectTypeProvider, PrimitiveTypeProvider, TypeProvider};
pub use registry::TypeRegistry;
