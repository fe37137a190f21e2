//! Accessor resolution and the two-tier accessor cache

mod accessor;
mod resolver;

pub use accessor::{Accessor, Direction, Strategy, PROMOTION_THRESHOLD};
pub use resolver::AccessorResolver;
