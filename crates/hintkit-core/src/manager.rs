//! Element manager.
//!
//! Owns the change queue, the registry and the visibility tracker, turns
//! host signals into queue items, and answers hint queries by measuring and
//! deduplicating the visible candidates.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use hintkit_protocols::{
    Deadline, Document, ElementId, ElementType, HintMeasurement, IntersectionEntry,
    MutationRecord, PageHooks, Unbounded, Viewport,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::change_queue::{ChangeQueue, MutationBatch, QueueItem, QueueProgress, Reconciler};
use crate::classify::{Classifier, Marks, has_scrollbar};
use crate::config::ManagerConfig;
use crate::dedup::Deduper;
use crate::error::ManagerError;
use crate::geometry::GeometryEngine;
use crate::registry::Registry;
use crate::stats::{ManagerStats, SliceCounters};
use crate::visibility::VisibilityTracker;

/// Which elements a hint query asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementFilter {
    /// Registered elements of these categories.
    Types(HashSet<ElementType>),
    /// Any element carrying text, for text selection.
    Selectable,
}

impl ElementFilter {
    pub fn types(types: impl IntoIterator<Item = ElementType>) -> Self {
        ElementFilter::Types(types.into_iter().collect())
    }

    /// Every category except `Selectable`.
    pub fn all() -> Self {
        Self::types(
            ElementType::ALL
                .into_iter()
                .filter(|t| *t != ElementType::Selectable),
        )
    }
}

/// One hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleElement {
    pub element: ElementId,
    pub element_type: ElementType,
    pub measurement: HintMeasurement,
    pub has_click_listener: bool,
}

struct ManagerState {
    running: bool,
    queue: ChangeQueue,
    registry: Registry,
    visibility: VisibilityTracker,
    counters: SliceCounters,
    started_at: Option<chrono::DateTime<Utc>>,
}

/// Queue steps applied to the registry and the visibility tracker.
struct Reconcile<'a> {
    document: &'a dyn Document,
    hooks: &'a dyn PageHooks,
    classifier: &'a Classifier,
    registry: &'a mut Registry,
    visibility: &'a mut VisibilityTracker,
}

impl Reconcile<'_> {
    fn reclassify(&mut self, element: ElementId) {
        let marks = Marks {
            click_listener: self.registry.has_click_listener(element),
            scrollbar: self.registry.has_scrollbar(element),
        };
        match self.classifier.classify(self.document, element, marks) {
            Some(element_type) => {
                if self.registry.insert(element, element_type).is_none() {
                    self.visibility
                        .track(element, self.registry.len(), self.hooks);
                }
            }
            None => {
                if self.registry.remove(element).is_some() {
                    self.visibility.untrack(element, self.hooks);
                }
            }
        }
    }
}

impl Reconciler for Reconcile<'_> {
    fn added(&mut self, element: ElementId) {
        if !self.document.is_connected(element) {
            return;
        }
        if matches!(
            self.document.tag_name(element).as_deref(),
            Some("iframe" | "frame")
        ) {
            self.visibility.track_frame(element, self.hooks);
        }
        self.registry
            .set_scrollbar(element, has_scrollbar(self.document, element));
        self.reclassify(element);
    }

    fn removed(&mut self, element: ElementId) {
        if self.registry.remove(element).is_some() {
            self.visibility.untrack(element, self.hooks);
        }
        self.visibility.untrack_frame(element, self.hooks);
    }

    fn changed(&mut self, element: ElementId) {
        if self.document.is_connected(element) {
            self.reclassify(element);
        }
    }

    fn clickable_changed(&mut self, element: ElementId, clickable: bool) {
        self.registry.set_click_listener(element, clickable);
        if self.document.is_connected(element) {
            self.reclassify(element);
        }
    }

    fn overflow_changed(&mut self, element: ElementId) {
        let scrollbar = has_scrollbar(self.document, element);
        if self.registry.set_scrollbar(element, scrollbar) && self.document.is_connected(element) {
            self.reclassify(element);
        }
    }

    fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        self.document.descendants(element)
    }

    fn watch_detached(&mut self, root: ElementId) {
        self.hooks.watch_detached(root);
    }

    fn queue_drained(&mut self) {
        self.hooks.disconnect_detached();
    }
}

/// Tracks the interactive elements of one document.
///
/// All state sits behind one mutex that is never held across an `.await`.
/// Intersection entries reported by the host travel over an unbounded
/// channel and are applied when a query settles.
pub struct ElementManager {
    document: Arc<dyn Document>,
    hooks: Arc<dyn PageHooks>,
    config: ManagerConfig,
    classifier: Classifier,
    geometry: GeometryEngine,
    state: Mutex<ManagerState>,
    intersections_tx: UnboundedSender<IntersectionEntry>,
    intersections_rx: Mutex<UnboundedReceiver<IntersectionEntry>>,
    settling: Mutex<Option<Shared<BoxFuture<'static, ()>>>>,
}

impl ElementManager {
    pub fn new(
        document: Arc<dyn Document>,
        hooks: Arc<dyn PageHooks>,
        config: ManagerConfig,
    ) -> Result<Self, ManagerError> {
        config.check()?;
        let (intersections_tx, intersections_rx) = mpsc::unbounded_channel();
        Ok(Self {
            classifier: Classifier::new(config.browser),
            geometry: GeometryEngine::new(config.geometry.clone()),
            state: Mutex::new(ManagerState {
                running: false,
                queue: ChangeQueue::new(),
                registry: Registry::new(),
                visibility: VisibilityTracker::new(config.max_tracked_elements),
                counters: SliceCounters::default(),
                started_at: None,
            }),
            document,
            hooks,
            config,
            intersections_tx,
            intersections_rx: Mutex::new(intersections_rx),
            settling: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Sender for the host's intersection observer.
    pub fn intersection_sender(&self) -> UnboundedSender<IntersectionEntry> {
        self.intersections_tx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Subscribe to the document and queue the whole tree for processing.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if state.running {
            return;
        }
        state.running = true;
        state.started_at = Some(Utc::now());

        self.hooks.observe_document();
        if let Err(e) = self.hooks.inject_page_script() {
            warn!("Page script unavailable, click listeners will not be reported: {}", e);
        }

        if let Some(root) = self.document.document_element() {
            state.queue.push(QueueItem::Mutations(MutationBatch::new(
                vec![MutationRecord::added(root, vec![root])],
                false,
            )));
            self.hooks.request_idle_slice();
        }

        info!("Element manager started");
    }

    /// Disconnect every observer and forget all state. Bail mode persists.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if !state.running {
            return;
        }
        self.hooks.disconnect_document();
        self.hooks.disconnect_intersection();
        self.hooks.disconnect_frames();
        self.hooks.disconnect_detached();

        state.queue.clear();
        state.registry.clear();
        state.visibility.reset();
        state.running = false;
        drop(state);

        let mut rx = self.intersections_rx.lock();
        while rx.try_recv().is_ok() {}
        drop(rx);
        *self.settling.lock() = None;

        info!("Element manager stopped");
    }

    fn enqueue(&self, item: QueueItem) {
        let mut state = self.state.lock();
        if !state.running {
            trace!("Element manager not running, dropping {:?}", item);
            return;
        }
        let was_empty = state.queue.is_empty();
        state.queue.push(item);
        if was_empty {
            self.hooks.request_idle_slice();
        }
    }

    /// Queue a document mutation batch. `removal_only` marks batches
    /// reported from detached subtrees.
    pub fn enqueue_mutations(&self, records: Vec<MutationRecord>, removal_only: bool) {
        if records.is_empty() {
            return;
        }
        self.enqueue(QueueItem::Mutations(MutationBatch::new(records, removal_only)));
    }

    /// Queue a click-listener change reported by the page script.
    pub fn enqueue_clickable(&self, target: ElementId, clickable: bool) {
        self.enqueue(QueueItem::ClickableChanged { target, clickable });
    }

    /// Queue an overflow change of an element.
    pub fn enqueue_overflow(&self, target: ElementId) {
        self.enqueue(QueueItem::OverflowChanged { target });
    }

    /// Hand intersection entries to the manager. They are applied on the
    /// next settle.
    pub fn record_intersections(&self, entries: impl IntoIterator<Item = IntersectionEntry>) {
        for entry in entries {
            if self.intersections_tx.send(entry).is_err() {
                warn!("Intersection channel closed, dropping entry for {}", entry.target);
            }
        }
    }

    /// Run the queue until it drains or `deadline` expires. Requests another
    /// slice when work is left.
    pub fn process_idle_slice(&self, deadline: &dyn Deadline) -> QueueProgress {
        let mut state = self.state.lock();
        if !state.running {
            return QueueProgress::Drained;
        }
        let progress = self.run_queue(&mut state, deadline);
        if progress == QueueProgress::Yielded {
            self.hooks.request_idle_slice();
        }
        progress
    }

    fn run_queue(&self, state: &mut ManagerState, deadline: &dyn Deadline) -> QueueProgress {
        if state.queue.is_empty() {
            return QueueProgress::Drained;
        }
        let started = Instant::now();
        let ManagerState {
            queue,
            registry,
            visibility,
            counters,
            ..
        } = state;
        let mut sink = Reconcile {
            document: self.document.as_ref(),
            hooks: self.hooks.as_ref(),
            classifier: &self.classifier,
            registry,
            visibility,
        };
        let progress = queue.process(&mut sink, deadline);
        let elapsed = started.elapsed();
        counters.record(elapsed);
        debug!(
            "Queue slice {:?} in {:?}: {} items left, {} elements tracked",
            progress,
            elapsed,
            queue.len(),
            sink.registry.len()
        );
        progress
    }

    /// Drain the queue without a deadline.
    fn flush(&self) -> Result<(), ManagerError> {
        let mut state = self.state.lock();
        if !state.running {
            return Err(ManagerError::NotRunning);
        }
        self.run_queue(&mut state, &Unbounded);
        Ok(())
    }

    fn apply_intersections(&self) {
        let entries: Vec<IntersectionEntry> = {
            let mut rx = self.intersections_rx.lock();
            std::iter::from_fn(|| rx.try_recv().ok()).collect()
        };
        if entries.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        let ManagerState {
            registry,
            visibility,
            ..
        } = &mut *state;
        for entry in entries {
            visibility.apply(entry, registry);
        }
    }

    /// Wait one observer round trip, then apply the entries it delivered.
    /// Concurrent callers share the same round trip.
    async fn settle(&self) {
        let settling = {
            let mut slot = self.settling.lock();
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let hooks = Arc::clone(&self.hooks);
                    let pending = async move { hooks.settle().await }.boxed().shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        settling.await;

        {
            let mut slot = self.settling.lock();
            if slot.as_ref().is_some_and(|pending| pending.peek().is_some()) {
                *slot = None;
            }
        }
        self.apply_intersections();
    }

    fn ensure_running(&self) -> Result<(), ManagerError> {
        if self.state.lock().running {
            Ok(())
        } else {
            Err(ManagerError::NotRunning)
        }
    }

    /// Hints for the visible elements matching `filter`.
    ///
    /// Without `candidates` the queue is drained and observers settled
    /// first, and the candidates are the visible elements (every registered
    /// element in bail mode, every element for [`ElementFilter::Selectable`]).
    /// Passing `candidates` only re-measures them. The result has one entry
    /// per candidate; `None` marks elements that are filtered out, not
    /// visible, covered or redundant.
    pub async fn get_visible_elements(
        &self,
        filter: &ElementFilter,
        viewports: &[Viewport],
        candidates: Option<&[ElementId]>,
    ) -> Result<Vec<Option<VisibleElement>>, ManagerError> {
        let candidates = match candidates {
            Some(candidates) => {
                self.ensure_running()?;
                candidates.to_vec()
            }
            None => {
                self.flush()?;
                self.settle().await;
                self.candidates(filter)?
            }
        };

        let known: Vec<(ElementId, Option<ElementType>, Marks)> = {
            let state = self.state.lock();
            if !state.running {
                return Err(ManagerError::NotRunning);
            }
            candidates
                .iter()
                .map(|&element| {
                    let marks = Marks {
                        click_listener: state.registry.has_click_listener(element),
                        scrollbar: state.registry.has_scrollbar(element),
                    };
                    (element, state.registry.get(element), marks)
                })
                .collect()
        };

        let document = self.document.as_ref();
        let mut results: Vec<Option<VisibleElement>> = known
            .into_iter()
            .map(|(element, registered, marks)| {
                if !document.is_connected(element) {
                    return None;
                }
                let element_type = match filter {
                    ElementFilter::Types(types) => registered
                        .or_else(|| self.classifier.classify(document, element, marks))
                        .filter(|t| types.contains(t))?,
                    ElementFilter::Selectable => {
                        self.classifier.classify_selectable(document, element)?
                    }
                };
                let measurement = self
                    .geometry
                    .measure(document, element, element_type, viewports)?;
                Some(VisibleElement {
                    element,
                    element_type,
                    measurement,
                    has_click_listener: marks.click_listener,
                })
            })
            .collect();

        if let ElementFilter::Types(_) = filter {
            let mut deduper = Deduper::new();
            for hint in results.iter().flatten() {
                deduper.add(document, hint.element, hint.element_type, &hint.measurement);
            }
            let rejected = deduper.finish();
            for slot in results.iter_mut() {
                if slot.as_ref().is_some_and(|h| rejected.contains(&h.element)) {
                    *slot = None;
                }
            }
        }

        debug!(
            "{} of {} candidates visible",
            results.iter().flatten().count(),
            results.len()
        );
        Ok(results)
    }

    fn candidates(&self, filter: &ElementFilter) -> Result<Vec<ElementId>, ManagerError> {
        match filter {
            ElementFilter::Types(_) => {
                let state = self.state.lock();
                if !state.running {
                    return Err(ManagerError::NotRunning);
                }
                Ok(state.visibility.candidates(&state.registry))
            }
            ElementFilter::Selectable => {
                self.ensure_running()?;
                Ok(self
                    .document
                    .document_element()
                    .map(|root| {
                        let mut all = vec![root];
                        all.extend(self.document.descendants(root));
                        all
                    })
                    .unwrap_or_default())
            }
        }
    }

    /// Child frames showing at least `min_frame_size` on both axes.
    pub fn get_visible_frames(&self, viewports: &[Viewport]) -> Result<Vec<ElementId>, ManagerError> {
        self.apply_intersections();
        let frames = {
            let state = self.state.lock();
            if !state.running {
                return Err(ManagerError::NotRunning);
            }
            state.visibility.frame_candidates()
        };
        let document = self.document.as_ref();
        Ok(frames
            .into_iter()
            .filter(|frame| document.is_connected(*frame))
            .filter(|frame| self.geometry.is_frame_visible(document, *frame, viewports))
            .collect())
    }

    pub fn get_stats(&self) -> ManagerStats {
        self.apply_intersections();
        let state = self.state.lock();
        ManagerStats {
            running: state.running,
            bailed: state.visibility.is_bailed(),
            elements: state.registry.counts(),
            total_elements: state.registry.len(),
            visible_elements: state.visibility.visible_count(),
            tracked_frames: state.visibility.frame_count(),
            visible_frames: state.visibility.visible_frame_count(),
            queue_length: state.queue.len(),
            slices: state.counters.slices,
            processing_time_ms: state.counters.busy_ms(),
            started_at: state.started_at,
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
