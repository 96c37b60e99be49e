//! PageTree: element storage, tree walks and hit testing.

use std::collections::{HashMap, HashSet};

use hintkit_protocols::{ElementId, Rect};

use crate::dom_node::PageNode;
use crate::dom_types::PageSnapshot;
use crate::error::DomError;

const LABELABLE_TAGS: [&str; 7] = [
    "button", "input", "meter", "output", "progress", "select", "textarea",
];

/// Element tree built from a [`PageSnapshot`].
///
/// Removed elements stay in `nodes` (detached), like a real DOM keeps
/// removed nodes alive while something references them.
#[derive(Debug, Default)]
pub(crate) struct PageTree {
    pub(crate) nodes: HashMap<ElementId, PageNode>,
    pub(crate) children: HashMap<ElementId, Vec<ElementId>>,
    pub(crate) connected: HashSet<ElementId>,
    pub(crate) root: Option<ElementId>,
    pub(crate) url: Option<String>,
    pub(crate) top_frame: bool,
    pub(crate) viewport: Rect,
}

impl PageTree {
    pub(crate) fn from_snapshot(snapshot: PageSnapshot) -> Result<Self, DomError> {
        let mut tree = PageTree {
            url: snapshot.url,
            top_frame: snapshot.top_frame,
            viewport: snapshot.viewport,
            ..Default::default()
        };

        for node in snapshot.nodes {
            if node.parent.is_none() && tree.root.is_none() {
                tree.root = Some(node.id);
            }
            tree.add_node(node)?;
        }

        if let Some(root) = tree.root {
            tree.connected.insert(root);
            let descendants = tree.descendants(root);
            tree.connected.extend(descendants);
        }

        Ok(tree)
    }

    fn add_node(&mut self, node: PageNode) -> Result<(), DomError> {
        if self.nodes.contains_key(&node.id) {
            return Err(DomError::DuplicateId(node.id));
        }
        if let Some(parent) = node.parent {
            if !self.nodes.contains_key(&parent) {
                return Err(DomError::UnknownParent {
                    child: node.id,
                    parent,
                });
            }
            self.children.entry(parent).or_default().push(node.id);
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    pub(crate) fn node(&self, element: ElementId) -> Option<&PageNode> {
        self.nodes.get(&element)
    }

    pub(crate) fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.children.get(&element).cloned().unwrap_or_default()
    }

    /// Pre-order descendants, excluding `element` itself.
    pub(crate) fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(element).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(children) = self.children.get(&next) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    pub(crate) fn contains(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        let mut current = Some(descendant);
        while let Some(element) = current {
            if element == ancestor {
                return true;
            }
            current = self.nodes.get(&element).and_then(|n| n.parent);
        }
        false
    }

    /// Connected elements in document order.
    pub(crate) fn document_order(&self) -> Vec<ElementId> {
        match self.root {
            Some(root) => {
                let mut order = vec![root];
                order.extend(self.descendants(root));
                order
            }
            None => Vec::new(),
        }
    }

    /// Insert a subtree under `parent`. The first node is the subtree root;
    /// the others must name a parent inside the subtree or already present.
    pub(crate) fn insert(
        &mut self,
        parent: ElementId,
        nodes: Vec<PageNode>,
    ) -> Result<Option<ElementId>, DomError> {
        if !self.nodes.contains_key(&parent) {
            return Err(DomError::UnknownElement(parent));
        }
        let mut root = None;
        for mut node in nodes {
            if root.is_none() {
                node.parent = Some(parent);
                root = Some(node.id);
            }
            self.add_node(node)?;
        }
        if let Some(root) = root {
            if self.connected.contains(&parent) {
                self.connected.insert(root);
                let descendants = self.descendants(root);
                self.connected.extend(descendants);
            }
        }
        Ok(root)
    }

    /// Move an existing element (attached or detached) under `parent`, as
    /// its last child. Returns the former parent.
    pub(crate) fn append(
        &mut self,
        parent: ElementId,
        element: ElementId,
    ) -> Result<Option<ElementId>, DomError> {
        if !self.nodes.contains_key(&parent) {
            return Err(DomError::UnknownElement(parent));
        }
        if self.contains(element, parent) {
            return Err(DomError::Cycle { element, parent });
        }
        let previous = self.remove(element)?;
        if let Some(node) = self.nodes.get_mut(&element) {
            node.parent = Some(parent);
        }
        self.children.entry(parent).or_default().push(element);
        if self.connected.contains(&parent) {
            self.connected.insert(element);
            let descendants = self.descendants(element);
            self.connected.extend(descendants);
        }
        Ok(previous)
    }

    /// Detach `element` (and its subtree) from its parent. Returns the
    /// former parent.
    pub(crate) fn remove(&mut self, element: ElementId) -> Result<Option<ElementId>, DomError> {
        let parent = self
            .nodes
            .get(&element)
            .ok_or(DomError::UnknownElement(element))?
            .parent;
        if let Some(parent) = parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| *c != element);
            }
        }
        if let Some(node) = self.nodes.get_mut(&element) {
            node.parent = None;
        }
        self.connected.remove(&element);
        for descendant in self.descendants(element) {
            self.connected.remove(&descendant);
        }
        if self.root == Some(element) {
            self.root = None;
        }
        Ok(parent)
    }

    /// Topmost connected element with a client rect containing the point.
    ///
    /// Higher paint order wins; on a tie, the later element in document
    /// order is painted on top.
    pub(crate) fn element_at(&self, x: f64, y: f64) -> Option<ElementId> {
        self.document_order()
            .into_iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let node = self.nodes.get(&id)?;
                node.rects
                    .iter()
                    .any(|r| r.contains(x, y))
                    .then_some((node.paint_order, index, id))
            })
            .max_by_key(|(paint_order, index, _)| (*paint_order, *index))
            .map(|(_, _, id)| id)
    }

    fn is_labelable(&self, element: ElementId) -> bool {
        self.nodes.get(&element).is_some_and(|node| {
            LABELABLE_TAGS.contains(&node.tag_name.as_str())
                && !(node.tag_name == "input"
                    && node.attributes.get("type").map(String::as_str) == Some("hidden"))
        })
    }

    /// The control a label is associated with.
    pub(crate) fn label_control(&self, label: ElementId) -> Option<ElementId> {
        let node = self.nodes.get(&label)?;
        if let Some(target) = node.attributes.get("for") {
            return self.document_order().into_iter().find(|id| {
                self.nodes
                    .get(id)
                    .and_then(|n| n.attributes.get("id"))
                    .is_some_and(|v| v == target)
                    && self.is_labelable(*id)
            });
        }
        self.descendants(label)
            .into_iter()
            .find(|id| self.is_labelable(*id))
    }

    pub(crate) fn labels(&self, control: ElementId) -> Vec<ElementId> {
        if !self.is_labelable(control) {
            return Vec::new();
        }
        self.document_order()
            .into_iter()
            .filter(|id| {
                self.nodes.get(id).is_some_and(|n| n.tag_name == "label")
                    && self.label_control(*id) == Some(control)
            })
            .collect()
    }

    /// Whether any client rect touches the viewport. Edges count, so that
    /// zero-width containers of floated content are still reported.
    pub(crate) fn is_in_viewport(&self, element: ElementId) -> bool {
        if !self.connected.contains(&element) {
            return false;
        }
        let viewport = self.viewport;
        self.nodes.get(&element).is_some_and(|node| {
            node.rects.iter().any(|r| {
                r.x <= viewport.right()
                    && r.right() >= viewport.x
                    && r.y <= viewport.bottom()
                    && r.bottom() >= viewport.y
            })
        })
    }
}
