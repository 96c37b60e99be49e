//! MemoryHooks: observers for an in-memory page.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use hintkit_protocols::{ElementId, HookError, IntersectionEntry, PageHooks};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use crate::document::MemoryDocument;

/// Record of everything the engine asked the hooks to do.
#[derive(Debug, Clone, Default)]
pub struct HookLog {
    pub document_observed: bool,
    pub script_injections: usize,
    /// Elements under intersection observation.
    pub observed: BTreeSet<ElementId>,
    pub observed_frames: BTreeSet<ElementId>,
    /// Detached subtree roots currently watched.
    pub detached: Vec<ElementId>,
    pub detached_disconnects: usize,
    pub intersection_disconnects: usize,
    pub idle_requests: usize,
    pub settles: usize,
}

/// [`PageHooks`] over a [`MemoryDocument`].
///
/// Observing an element immediately reports whether it touches the viewport,
/// the way an intersection observer delivers an initial entry. Entries go to
/// the sender passed to [`MemoryHooks::attach`]; until then they are dropped.
pub struct MemoryHooks {
    document: Arc<MemoryDocument>,
    log: Mutex<HookLog>,
    sender: Mutex<Option<UnboundedSender<IntersectionEntry>>>,
    block_script: bool,
}

impl MemoryHooks {
    pub fn new(document: Arc<MemoryDocument>) -> Self {
        Self {
            document,
            log: Mutex::new(HookLog::default()),
            sender: Mutex::new(None),
            block_script: false,
        }
    }

    /// Make page-script injection fail, as on pages with a strict CSP.
    pub fn with_blocked_script(mut self) -> Self {
        self.block_script = true;
        self
    }

    /// Route intersection entries to the element manager.
    pub fn attach(&self, sender: UnboundedSender<IntersectionEntry>) {
        *self.sender.lock() = Some(sender);
    }

    pub fn log(&self) -> HookLog {
        self.log.lock().clone()
    }

    /// Re-report every observed element and frame, e.g. after layout or
    /// viewport changes.
    pub fn refresh_intersections(&self) {
        let targets: Vec<ElementId> = {
            let log = self.log.lock();
            log.observed
                .iter()
                .chain(log.observed_frames.iter())
                .copied()
                .collect()
        };
        for target in targets {
            self.report(target);
        }
    }

    fn report(&self, target: ElementId) {
        let entry = IntersectionEntry {
            target,
            is_intersecting: self.document.is_in_viewport(target),
        };
        if let Some(sender) = self.sender.lock().as_ref() {
            if sender.send(entry).is_err() {
                trace!("Intersection receiver dropped, entry for {} lost", target);
            }
        }
    }
}

#[async_trait]
impl PageHooks for MemoryHooks {
    fn observe_document(&self) {
        self.log.lock().document_observed = true;
    }

    fn disconnect_document(&self) {
        self.log.lock().document_observed = false;
    }

    fn inject_page_script(&self) -> Result<(), HookError> {
        if self.block_script {
            return Err(HookError::ScriptInjection(
                "blocked by content security policy".to_string(),
            ));
        }
        self.log.lock().script_injections += 1;
        Ok(())
    }

    fn observe_intersection(&self, element: ElementId) {
        self.log.lock().observed.insert(element);
        self.report(element);
    }

    fn unobserve_intersection(&self, element: ElementId) {
        self.log.lock().observed.remove(&element);
    }

    fn disconnect_intersection(&self) {
        let mut log = self.log.lock();
        log.observed.clear();
        log.intersection_disconnects += 1;
    }

    fn observe_frame(&self, frame: ElementId) {
        self.log.lock().observed_frames.insert(frame);
        self.report(frame);
    }

    fn unobserve_frame(&self, frame: ElementId) {
        self.log.lock().observed_frames.remove(&frame);
    }

    fn disconnect_frames(&self) {
        self.log.lock().observed_frames.clear();
    }

    fn watch_detached(&self, root: ElementId) {
        self.log.lock().detached.push(root);
    }

    fn disconnect_detached(&self) {
        let mut log = self.log.lock();
        log.detached.clear();
        log.detached_disconnects += 1;
    }

    fn request_idle_slice(&self) {
        self.log.lock().idle_requests += 1;
    }

    async fn settle(&self) {
        tokio::task::yield_now().await;
        let settles = {
            let mut log = self.log.lock();
            log.settles += 1;
            log.settles
        };
        debug!("Observers settled ({} round trips)", settles);
    }
}
