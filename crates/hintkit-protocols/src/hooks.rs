//! Observation sources and scheduling provided by the host.

use async_trait::async_trait;

use crate::error::HookError;
use crate::types::ElementId;

/// Host side of the engine's subscriptions.
///
/// Implementations only start or stop delivering notifications; every
/// notification flows back into the engine through the element manager's
/// enqueue methods, never by mutating engine state directly.
#[async_trait]
pub trait PageHooks: Send + Sync {
    /// Start delivering document mutation batches.
    fn observe_document(&self);

    /// Stop delivering document mutation batches.
    fn disconnect_document(&self);

    /// Inject the page-context script that reports native click listeners.
    fn inject_page_script(&self) -> Result<(), HookError>;

    /// Start reporting intersection changes for an element.
    fn observe_intersection(&self, element: ElementId);

    fn unobserve_intersection(&self, element: ElementId);

    /// Stop all element intersection observation.
    fn disconnect_intersection(&self);

    /// Start reporting intersection changes for a child frame.
    fn observe_frame(&self, frame: ElementId);

    fn unobserve_frame(&self, frame: ElementId);

    fn disconnect_frames(&self);

    /// Report structural changes inside a subtree that was just removed from
    /// the document, as removal-only mutation batches.
    fn watch_detached(&self, root: ElementId);

    /// Stop watching every detached subtree.
    fn disconnect_detached(&self);

    /// Ask for `process_idle_slice` to be called when the page is idle.
    fn request_idle_slice(&self);

    /// Resolve once every intersection observation pending at call time has
    /// been delivered.
    async fn settle(&self);
}
