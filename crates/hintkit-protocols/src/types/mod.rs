//! Common types used across the hintkit workspace.

mod element;
mod geometry;
mod mutation;

pub use element::*;
pub use geometry::*;
pub use mutation::*;

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
