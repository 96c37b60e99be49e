//! Page snapshot errors.

use hintkit_protocols::ElementId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Invalid page snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    #[error("Element {child} refers to unknown parent {parent}")]
    UnknownParent { child: ElementId, parent: ElementId },

    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),

    #[error("Cannot move {element} under its own descendant {parent}")]
    Cycle { element: ElementId, parent: ElementId },
}
