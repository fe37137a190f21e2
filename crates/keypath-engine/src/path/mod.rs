//! Path expressions: parsing, interning, and resolution

mod parse;
mod resolve;

pub use parse::{PathExpression, Segment};
