//! Change notifications produced by the host.

use serde::{Deserialize, Serialize};

use super::ElementId;

/// One record of a document mutation batch.
///
/// Only element nodes are carried; text node changes are irrelevant to
/// element tracking and are dropped at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Node whose children or attributes changed.
    pub target: ElementId,
    #[serde(default)]
    pub added: Vec<ElementId>,
    #[serde(default)]
    pub removed: Vec<ElementId>,
    /// Name of the changed attribute, for attribute records.
    #[serde(default)]
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    /// Record for nodes inserted under `target`.
    pub fn added(target: ElementId, added: Vec<ElementId>) -> Self {
        Self {
            target,
            added,
            ..Default::default()
        }
    }

    /// Record for nodes removed from `target`.
    pub fn removed(target: ElementId, removed: Vec<ElementId>) -> Self {
        Self {
            target,
            removed,
            ..Default::default()
        }
    }

    /// Record for an attribute change on `target`.
    pub fn attribute(target: ElementId, name: impl Into<String>) -> Self {
        Self {
            target,
            attribute_name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Visibility change reported by an intersection-style observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
}
