//! Visible element and frame sets fed by intersection entries.

use std::collections::HashSet;

use hintkit_protocols::{ElementId, IntersectionEntry, PageHooks};
use tracing::warn;

use crate::registry::Registry;

/// Tracks which registered elements and which child frames intersect the
/// viewport.
///
/// Element tracking is capped. Once the registry grows past the cap the
/// tracker bails: element observation is torn down for good and every
/// registered element counts as a visibility candidate. Frames are tracked
/// regardless.
#[derive(Debug)]
pub struct VisibilityTracker {
    max_tracked: usize,
    bailed: bool,
    visible: HashSet<ElementId>,
    frames: HashSet<ElementId>,
    visible_frames: HashSet<ElementId>,
}

impl VisibilityTracker {
    pub fn new(max_tracked: usize) -> Self {
        Self {
            max_tracked,
            bailed: false,
            visible: HashSet::new(),
            frames: HashSet::new(),
            visible_frames: HashSet::new(),
        }
    }

    pub fn is_bailed(&self) -> bool {
        self.bailed
    }

    /// Start observing a newly registered element. `registry_len` includes
    /// the element.
    pub fn track(&mut self, element: ElementId, registry_len: usize, hooks: &dyn PageHooks) {
        if self.bailed {
            return;
        }
        if registry_len > self.max_tracked {
            self.bail(hooks);
            return;
        }
        hooks.observe_intersection(element);
    }

    pub fn untrack(&mut self, element: ElementId, hooks: &dyn PageHooks) {
        self.visible.remove(&element);
        if !self.bailed {
            hooks.unobserve_intersection(element);
        }
    }

    pub fn track_frame(&mut self, frame: ElementId, hooks: &dyn PageHooks) {
        if self.frames.insert(frame) {
            hooks.observe_frame(frame);
        }
    }

    pub fn untrack_frame(&mut self, frame: ElementId, hooks: &dyn PageHooks) {
        self.visible_frames.remove(&frame);
        if self.frames.remove(&frame) {
            hooks.unobserve_frame(frame);
        }
    }

    fn bail(&mut self, hooks: &dyn PageHooks) {
        warn!(
            "More than {} tracked elements, treating every element as visible from now on",
            self.max_tracked
        );
        self.bailed = true;
        self.visible.clear();
        hooks.disconnect_intersection();
    }

    /// Apply one intersection entry. Entries for elements that are neither
    /// registered nor tracked frames are dropped.
    pub fn apply(&mut self, entry: IntersectionEntry, registry: &Registry) {
        let target = entry.target;
        if self.frames.contains(&target) {
            if entry.is_intersecting {
                self.visible_frames.insert(target);
            } else {
                self.visible_frames.remove(&target);
            }
        }
        if self.bailed || !registry.contains(target) {
            return;
        }
        if entry.is_intersecting {
            self.visible.insert(target);
        } else {
            self.visible.remove(&target);
        }
    }

    /// Elements that may be visible, sorted.
    pub fn candidates(&self, registry: &Registry) -> Vec<ElementId> {
        if self.bailed {
            return registry.ids();
        }
        let mut ids: Vec<ElementId> = self.visible.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Frames that may be visible, sorted.
    pub fn frame_candidates(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.visible_frames.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn visible_frame_count(&self) -> usize {
        self.visible_frames.len()
    }

    /// Forget every element and frame. Bail mode stays on.
    pub fn reset(&mut self) {
        self.visible.clear();
        self.frames.clear();
        self.visible_frames.clear();
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
