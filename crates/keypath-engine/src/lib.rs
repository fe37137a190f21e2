//! Keypath engine: property-path resolution over dynamic object graphs
//!
//! The engine walks dotted/bracketed path strings (`address.city`,
//! `form.items[].label`) against heterogeneous receivers: maps, lists,
//! arrays, sets, and registered class instances. Field access on class
//! instances goes through a resolved, cached accessor that starts on a
//! reflective tier and promotes itself to a specialized closure once it
//! runs hot.
//!
//! Consumer surface:
//! - [`Engine::parse_path`] / [`PathExpression::parse`]
//! - [`Engine::get`] / [`Engine::get_path`]
//! - [`Engine::set`] / [`Engine::set_path`]
//! - registration passthroughs for classes and extensions

pub mod access;
mod engine;
pub mod error;
pub mod path;

pub use access::{Accessor, AccessorResolver, Direction, Strategy, PROMOTION_THRESHOLD};
pub use engine::Engine;
pub use error::PathError;
pub use path::{PathExpression, Segment};
