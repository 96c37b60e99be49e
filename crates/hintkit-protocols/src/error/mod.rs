//! Error types for the hintkit protocol layer.

mod hook;

pub use hook::*;
