//! Draining the change queue in arbitrary slices ends in the same state as
//! draining it in one pass.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use hintkit_core::{ElementManager, ManagerConfig, ManagerStats, QueueProgress};
use hintkit_dom::{MemoryDocument, MemoryHooks, PageNode, PageSnapshot};
use hintkit_protocols::{ElementId, ElementType, MutationRecord, Unbounded};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize, kind: usize },
    Remove { pick: usize },
    SetRole { pick: usize, clickable: bool },
    ClickListener { pick: usize, clickable: bool },
}

fn node(id: u64, kind: usize) -> PageNode {
    let y = (id as f64) * 25.0;
    match kind % 6 {
        0 => PageNode::new(id, "div").with_rect(10.0, y, 100.0, 20.0),
        1 => PageNode::new(id, "a")
            .with_attr("href", format!("/p/{id}"))
            .with_rect(10.0, y, 100.0, 20.0),
        2 => PageNode::new(id, "button").with_rect(10.0, y, 100.0, 20.0),
        3 => PageNode::new(id, "span").with_onclick().with_rect(10.0, y, 50.0, 20.0),
        4 => PageNode::new(id, "label").with_rect(10.0, y, 100.0, 20.0),
        _ => PageNode::new(id, "input")
            .with_attr("type", "checkbox")
            .with_rect(10.0, y, 16.0, 16.0),
    }
}

fn page(shape: &[(usize, usize)]) -> Vec<PageNode> {
    let mut nodes = vec![
        PageNode::new(1, "html").with_rect(0.0, 0.0, 1280.0, 3000.0),
        PageNode::new(2, "body")
            .with_parent(1)
            .with_rect(0.0, 0.0, 1280.0, 3000.0),
    ];
    for (i, (parent, kind)) in shape.iter().enumerate() {
        let id = 3 + i as u64;
        let parent = match parent % (i + 1) {
            0 => 2,
            p => 2 + p as u64,
        };
        nodes.push(node(id, *kind).with_parent(parent));
    }
    nodes
}

struct Session {
    doc: Arc<MemoryDocument>,
    manager: ElementManager,
}

impl Session {
    fn open(nodes: Vec<PageNode>) -> Self {
        let doc = Arc::new(
            MemoryDocument::new(PageSnapshot::new(nodes).with_url("https://example.com/")).unwrap(),
        );
        let hooks = Arc::new(MemoryHooks::new(doc.clone()));
        let manager = ElementManager::new(doc.clone(), hooks.clone(), ManagerConfig::default())
            .unwrap();
        hooks.attach(manager.intersection_sender());
        manager.start();
        Self { doc, manager }
    }

    /// Apply the operations to the page and queue what they report.
    fn apply(&self, ops: &[Op], known: &mut Vec<ElementId>) {
        let mut next_id = 1000;
        for op in ops {
            match op {
                Op::Insert { parent, kind } => {
                    let parent = known
                        .get(parent % (known.len() + 1))
                        .copied()
                        .unwrap_or(ElementId(2));
                    let child = next_id;
                    next_id += 1;
                    let record = self
                        .doc
                        .insert(
                            parent,
                            vec![
                                node(child, *kind),
                                node(child + 500, kind + 1).with_parent(child),
                            ],
                        )
                        .unwrap();
                    known.push(ElementId(child));
                    self.enqueue(vec![record]);
                }
                Op::Remove { pick } if !known.is_empty() => {
                    let element = known[pick % known.len()];
                    let record = self.doc.remove(element).unwrap();
                    self.enqueue(vec![record]);
                }
                Op::SetRole { pick, clickable } if !known.is_empty() => {
                    let element = known[pick % known.len()];
                    let value = clickable.then_some("button");
                    let record = self.doc.set_attribute(element, "role", value).unwrap();
                    self.enqueue(vec![record]);
                }
                Op::ClickListener { pick, clickable } if !known.is_empty() => {
                    let element = known[pick % known.len()];
                    self.manager.enqueue_clickable(element, *clickable);
                }
                _ => {}
            }
        }
    }

    fn enqueue(&self, records: Vec<MutationRecord>) {
        self.manager.enqueue_mutations(records, false);
    }
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), 0usize..6).prop_map(|(parent, kind)| Op::Insert { parent, kind }),
        any::<usize>().prop_map(|pick| Op::Remove { pick }),
        (any::<usize>(), any::<bool>()).prop_map(|(pick, clickable)| Op::SetRole { pick, clickable }),
        (any::<usize>(), any::<bool>())
            .prop_map(|(pick, clickable)| Op::ClickListener { pick, clickable }),
    ]
}

/// Registry contents that do not depend on how the work was sliced.
fn outcome(stats: &ManagerStats) -> (BTreeMap<ElementType, usize>, usize, usize) {
    (
        stats.elements.clone(),
        stats.total_elements,
        stats.visible_elements,
    )
}

fn drain_sliced(manager: &ElementManager, budgets: &[usize]) -> usize {
    let mut slices = 0;
    for units in budgets.iter().cycle() {
        let left = Cell::new(*units);
        let deadline = move || {
            let remaining = left.get();
            left.set(remaining.saturating_sub(1));
            remaining as f64
        };
        slices += 1;
        if manager.process_idle_slice(&deadline) == QueueProgress::Drained {
            break;
        }
        assert!(slices < 100_000, "queue never drained");
    }
    slices
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sliced_drain_matches_unbounded_drain(
        shape in prop::collection::vec((any::<usize>(), 0usize..6), 0..25),
        ops in prop::collection::vec(op(), 0..20),
        budgets in prop::collection::vec(1usize..4, 1..8),
    ) {
        let reference = Session::open(page(&shape));
        let sliced = Session::open(page(&shape));

        let base: Vec<ElementId> = (0..shape.len()).map(|i| ElementId(3 + i as u64)).collect();
        reference.apply(&ops, &mut base.clone());
        sliced.apply(&ops, &mut base.clone());

        prop_assert_eq!(reference.manager.process_idle_slice(&Unbounded), QueueProgress::Drained);
        drain_sliced(&sliced.manager, &budgets);

        let expected = reference.manager.get_stats();
        let actual = sliced.manager.get_stats();
        prop_assert_eq!(actual.queue_length, 0);
        prop_assert_eq!(outcome(&actual), outcome(&expected));
    }
}

#[test]
fn single_unit_slices_make_progress() {
    let session = Session::open(page(&[(0, 1), (1, 1), (2, 1), (0, 2)]));
    let slices = drain_sliced(&session.manager, &[1]);
    assert!(slices > 1);
    let stats = session.manager.get_stats();
    assert_eq!(stats.elements.get(&ElementType::Link), Some(&3));
    assert_eq!(stats.total_elements, 4);
}
