//! Time-sliced reconciliation of document changes.
//!
//! Host signals are queued as [`QueueItem`]s and drained in small slices.
//! Every unit of work checks the slice [`Deadline`] first; when the budget
//! runs out the position inside the current item is kept in its cursor and
//! the next slice resumes exactly there.

use std::collections::{HashSet, VecDeque};

use hintkit_protocols::{Deadline, ElementId, MutationRecord};

/// Receiver of the reconciliation steps.
pub trait Reconciler {
    /// An element entered the document.
    fn added(&mut self, element: ElementId);

    /// An element left the document.
    fn removed(&mut self, element: ElementId);

    /// An attribute of an element changed.
    fn changed(&mut self, element: ElementId);

    fn clickable_changed(&mut self, element: ElementId, clickable: bool);

    fn overflow_changed(&mut self, element: ElementId);

    /// Snapshot of an element's descendants, in document order.
    fn descendants(&self, element: ElementId) -> Vec<ElementId>;

    /// Start watching a just-removed subtree for further removals.
    fn watch_detached(&mut self, root: ElementId);

    /// The queue ran empty.
    fn queue_drained(&mut self);
}

/// Outcome of one [`ChangeQueue::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueProgress {
    /// Every item was processed.
    Drained,
    /// The deadline ran out with work left.
    Yielded,
}

/// Resumption point inside a [`MutationBatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCursor {
    pub record: usize,
    pub added: usize,
    pub removed: usize,
    pub child: usize,
    /// Descendants of the node at `added` or `removed` still being walked.
    pub pending: Option<Vec<ElementId>>,
}

/// Mutation records delivered together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
    /// Set for batches reported from detached subtrees: only removals count.
    pub removal_only: bool,
    pub cursor: BatchCursor,
}

impl MutationBatch {
    pub fn new(records: Vec<MutationRecord>, removal_only: bool) -> Self {
        Self {
            records,
            removal_only,
            cursor: BatchCursor::default(),
        }
    }
}

/// One queued host signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Mutations(MutationBatch),
    ClickableChanged { target: ElementId, clickable: bool },
    OverflowChanged { target: ElementId },
}

/// Outcome of one unit of work.
enum Step {
    Done,
    Yield,
}

fn expired(deadline: &dyn Deadline) -> bool {
    deadline.time_remaining() <= 0.0
}

/// FIFO of pending host signals.
///
/// Elements handled as added are remembered until the queue drains, so a
/// subtree reported both on its own and as part of an ancestor is only
/// added once.
#[derive(Debug, Default)]
pub struct ChangeQueue {
    items: VecDeque<QueueItem>,
    added: HashSet<ElementId>,
}

impl ChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: QueueItem) {
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements added in the current queue lifetime.
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn is_marked_added(&self, element: ElementId) -> bool {
        self.added.contains(&element)
    }

    /// Drop all items and start a new lifetime.
    pub fn clear(&mut self) {
        self.items.clear();
        self.added.clear();
    }

    /// Process items until the queue is empty or the deadline expires.
    pub fn process<R: Reconciler>(&mut self, sink: &mut R, deadline: &dyn Deadline) -> QueueProgress {
        if self.items.is_empty() {
            return QueueProgress::Drained;
        }

        while let Some(item) = self.items.front_mut() {
            let step = match item {
                QueueItem::Mutations(batch) => process_batch(batch, &mut self.added, sink, deadline),
                QueueItem::ClickableChanged { target, clickable } => {
                    if expired(deadline) {
                        Step::Yield
                    } else {
                        sink.clickable_changed(*target, *clickable);
                        Step::Done
                    }
                }
                QueueItem::OverflowChanged { target } => {
                    if expired(deadline) {
                        Step::Yield
                    } else {
                        sink.overflow_changed(*target);
                        Step::Done
                    }
                }
            };
            match step {
                Step::Done => {
                    self.items.pop_front();
                }
                Step::Yield => return QueueProgress::Yielded,
            }
        }

        self.added.clear();
        sink.queue_drained();
        QueueProgress::Drained
    }
}

fn process_batch<R: Reconciler>(
    batch: &mut MutationBatch,
    added: &mut HashSet<ElementId>,
    sink: &mut R,
    deadline: &dyn Deadline,
) -> Step {
    let removal_only = batch.removal_only;
    let cursor = &mut batch.cursor;

    while let Some(record) = batch.records.get(cursor.record) {
        if !removal_only {
            while let Some(&node) = record.added.get(cursor.added) {
                if let Step::Yield = add_subtree(node, cursor, added, sink, deadline) {
                    return Step::Yield;
                }
                cursor.added += 1;
            }
        }

        while let Some(&node) = record.removed.get(cursor.removed) {
            if let Step::Yield = remove_subtree(node, cursor, added, sink, deadline) {
                return Step::Yield;
            }
            cursor.removed += 1;
        }

        if !removal_only && record.attribute_name.is_some() {
            if expired(deadline) {
                return Step::Yield;
            }
            sink.changed(record.target);
        }

        cursor.record += 1;
        cursor.added = 0;
        cursor.removed = 0;
    }

    Step::Done
}

fn add_subtree<R: Reconciler>(
    node: ElementId,
    cursor: &mut BatchCursor,
    added: &mut HashSet<ElementId>,
    sink: &mut R,
    deadline: &dyn Deadline,
) -> Step {
    if cursor.pending.is_none() {
        if expired(deadline) {
            return Step::Yield;
        }
        if !added.insert(node) {
            // Already handled along with its subtree in this lifetime.
            return Step::Done;
        }
        sink.added(node);
        cursor.pending = Some(sink.descendants(node));
        cursor.child = 0;
    }

    if let Some(pending) = &cursor.pending {
        while let Some(&descendant) = pending.get(cursor.child) {
            if expired(deadline) {
                return Step::Yield;
            }
            if added.insert(descendant) {
                sink.added(descendant);
            }
            cursor.child += 1;
        }
    }

    cursor.pending = None;
    cursor.child = 0;
    Step::Done
}

fn remove_subtree<R: Reconciler>(
    node: ElementId,
    cursor: &mut BatchCursor,
    added: &mut HashSet<ElementId>,
    sink: &mut R,
    deadline: &dyn Deadline,
) -> Step {
    if cursor.pending.is_none() {
        if expired(deadline) {
            return Step::Yield;
        }
        sink.watch_detached(node);
        added.remove(&node);
        sink.removed(node);
        cursor.pending = Some(sink.descendants(node));
        cursor.child = 0;
    }

    if let Some(pending) = &cursor.pending {
        while let Some(&descendant) = pending.get(cursor.child) {
            if expired(deadline) {
                return Step::Yield;
            }
            added.remove(&descendant);
            sink.removed(descendant);
            cursor.child += 1;
        }
    }

    cursor.pending = None;
    cursor.child = 0;
    Step::Done
}

#[cfg(test)]
#[path = "change_queue_tests.rs"]
mod tests;
