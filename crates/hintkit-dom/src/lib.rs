//! # hintkit DOM
//!
//! In-memory page snapshot implementing the hintkit host interfaces.
//!
//! A [`PageSnapshot`] is a flat, serde-loadable list of elements in document
//! order (parents before children) with their attributes, client rects, text
//! runs, computed styles and scroll metrics. [`MemoryDocument`] answers the
//! engine's [`Document`](hintkit_protocols::Document) queries against it and
//! applies structural changes, returning the mutation records a browser
//! would report. [`MemoryHooks`] plays the host's observers: it records
//! subscriptions and reports viewport intersections over a channel.

mod document;
mod dom_node;
mod dom_tree;
mod dom_types;
mod error;
mod hooks;

pub use document::MemoryDocument;
pub use dom_node::PageNode;
pub use dom_types::PageSnapshot;
pub use error::DomError;
pub use hooks::{HookLog, MemoryHooks};

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
