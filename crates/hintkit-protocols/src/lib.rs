//! # hintkit Protocols
//!
//! Shared types and host interface definitions (traits) for the hintkit
//! element tracking engine. Contains only interface definitions - no
//! implementations.
//!
//! ## Core Traits
//!
//! - [`Document`] - Read-only queries against the live page
//! - [`PageHooks`] - Observation sources and scheduling provided by the host
//! - [`Deadline`] - Time budget of a cooperative scheduling slice

pub mod deadline;
pub mod document;
pub mod error;
pub mod hooks;
pub mod types;

pub use deadline::{Deadline, InstantDeadline, Unbounded};
pub use document::{Document, ScrollMetrics, StyleProperty, TextRun};
pub use error::HookError;
pub use hooks::PageHooks;
pub use types::*;
