//! # hintkit Core
//!
//! Incremental element tracking for keyboard hints.
//!
//! ## Features
//!
//! - Element classification (links, clickables, text areas, scrollables)
//! - Time-sliced, resumable reconciliation of document mutations
//! - Capped visibility tracking with a whole-registry fallback
//! - Hint anchor placement, occlusion checks and deduplication

pub mod change_queue;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod registry;
pub mod stats;
pub mod visibility;

pub use change_queue::{BatchCursor, ChangeQueue, MutationBatch, QueueItem, QueueProgress, Reconciler};
pub use classify::{Classifier, Marks, has_scrollbar};
pub use config::ManagerConfig;
pub use dedup::Deduper;
pub use error::ManagerError;
pub use geometry::GeometryEngine;
pub use manager::{ElementFilter, ElementManager, VisibleElement};
pub use registry::Registry;
pub use stats::ManagerStats;
pub use visibility::VisibilityTracker;
