//! MemoryDocument: `Document` over a page snapshot, plus mutations.

use std::path::Path;

use hintkit_protocols::{
    Document, ElementId, MutationRecord, Rect, ScrollMetrics, StyleProperty, TextRun,
};
use parking_lot::RwLock;
use tracing::debug;

use crate::dom_node::PageNode;
use crate::dom_tree::PageTree;
use crate::dom_types::PageSnapshot;
use crate::error::DomError;

/// In-memory page.
///
/// Mutating methods return the [`MutationRecord`] a browser mutation
/// observer would deliver for the change; feeding it to the element manager
/// is up to the caller.
#[derive(Debug)]
pub struct MemoryDocument {
    tree: RwLock<PageTree>,
}

impl MemoryDocument {
    pub fn new(snapshot: PageSnapshot) -> Result<Self, DomError> {
        Ok(Self {
            tree: RwLock::new(PageTree::from_snapshot(snapshot)?),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, DomError> {
        Self::new(PageSnapshot::from_json(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DomError> {
        Self::new(PageSnapshot::load(path)?)
    }

    /// Visible area of the page.
    pub fn viewport(&self) -> Rect {
        self.tree.read().viewport
    }

    /// Number of elements ever known to the page, detached ones included.
    pub fn len(&self) -> usize {
        self.tree.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().nodes.is_empty()
    }

    /// Whether any client rect of the element touches the viewport.
    pub fn is_in_viewport(&self, element: ElementId) -> bool {
        self.tree.read().is_in_viewport(element)
    }

    /// Insert a subtree (root first) under `parent`.
    pub fn insert(
        &self,
        parent: ElementId,
        nodes: Vec<PageNode>,
    ) -> Result<MutationRecord, DomError> {
        let root = self.tree.write().insert(parent, nodes)?;
        debug!("Inserted subtree {:?} under {}", root, parent);
        Ok(MutationRecord::added(parent, root.into_iter().collect()))
    }

    /// Detach an element and its subtree.
    pub fn remove(&self, element: ElementId) -> Result<MutationRecord, DomError> {
        let parent = self.tree.write().remove(element)?;
        debug!("Removed {} from {:?}", element, parent);
        Ok(MutationRecord::removed(parent.unwrap_or(element), vec![element]))
    }

    /// Move an element under `parent`. The observer reports this as a
    /// removal from the old parent and an addition to the new one.
    pub fn append(
        &self,
        parent: ElementId,
        element: ElementId,
    ) -> Result<Vec<MutationRecord>, DomError> {
        let previous = self.tree.write().append(parent, element)?;
        debug!("Moved {} from {:?} to {}", element, previous, parent);
        let mut records = Vec::with_capacity(2);
        if let Some(previous) = previous {
            records.push(MutationRecord::removed(previous, vec![element]));
        }
        records.push(MutationRecord::added(parent, vec![element]));
        Ok(records)
    }

    /// Set (`Some`) or remove (`None`) an attribute.
    pub fn set_attribute(
        &self,
        element: ElementId,
        name: &str,
        value: Option<&str>,
    ) -> Result<MutationRecord, DomError> {
        let mut tree = self.tree.write();
        let node = tree
            .nodes
            .get_mut(&element)
            .ok_or(DomError::UnknownElement(element))?;
        match value {
            Some(value) => {
                node.attributes.insert(name.to_string(), value.to_string());
            }
            None => {
                node.attributes.remove(name);
            }
        }
        Ok(MutationRecord::attribute(element, name))
    }

    /// Replace layout-only state (rects, scroll metrics, styles). Produces no
    /// mutation record, like a real layout change.
    pub fn update_layout<F>(&self, element: ElementId, update: F) -> Result<(), DomError>
    where
        F: FnOnce(&mut PageNode),
    {
        let mut tree = self.tree.write();
        let node = tree
            .nodes
            .get_mut(&element)
            .ok_or(DomError::UnknownElement(element))?;
        update(node);
        Ok(())
    }

    fn with_node<T>(&self, element: ElementId, default: T, f: impl FnOnce(&PageNode) -> T) -> T {
        self.tree.read().node(element).map(f).unwrap_or(default)
    }
}

impl Document for MemoryDocument {
    fn document_element(&self) -> Option<ElementId> {
        self.tree.read().root
    }

    fn body(&self) -> Option<ElementId> {
        let tree = self.tree.read();
        let root = tree.root?;
        tree.children(root)
            .into_iter()
            .find(|id| tree.node(*id).is_some_and(|n| n.tag_name == "body"))
    }

    fn scrolling_element(&self) -> Option<ElementId> {
        self.document_element()
    }

    fn is_top_frame(&self) -> bool {
        self.tree.read().top_frame
    }

    fn base_url(&self) -> Option<String> {
        self.tree.read().url.clone()
    }

    fn is_connected(&self, element: ElementId) -> bool {
        self.tree.read().connected.contains(&element)
    }

    fn tag_name(&self, element: ElementId) -> Option<String> {
        self.with_node(element, None, |n| Some(n.tag_name.clone()))
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.with_node(element, None, |n| n.attributes.get(name).cloned())
    }

    fn content_editable(&self, element: ElementId) -> Option<String> {
        self.with_node(element, None, |n| n.content_editable.clone())
    }

    fn has_native_click_handler(&self, element: ElementId) -> bool {
        self.with_node(element, false, |n| n.onclick)
    }

    fn computed_style(&self, element: ElementId, property: StyleProperty) -> Option<String> {
        self.with_node(element, None, |n| n.styles.get(&property).cloned())
    }

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics {
        self.with_node(element, ScrollMetrics::default(), |n| n.scroll)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.with_node(element, None, |n| n.parent)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.tree.read().children(element)
    }

    fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        self.tree.read().descendants(element)
    }

    fn contains(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        self.tree.read().contains(ancestor, descendant)
    }

    fn client_rects(&self, element: ElementId) -> Vec<Rect> {
        self.with_node(element, Vec::new(), |n| n.rects.clone())
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.with_node(element, Rect::default(), PageNode::bounding_rect)
    }

    fn text_runs(&self, element: ElementId) -> Vec<TextRun> {
        let tree = self.tree.read();
        std::iter::once(element)
            .chain(tree.descendants(element))
            .filter_map(|id| tree.node(id))
            .flat_map(|n| n.text_runs.iter().cloned())
            .collect()
    }

    fn has_direct_text(&self, element: ElementId) -> bool {
        self.with_node(element, false, |n| !n.text_runs.is_empty())
    }

    fn labels(&self, element: ElementId) -> Vec<ElementId> {
        self.tree.read().labels(element)
    }

    fn element_at_point(&self, x: f64, y: f64) -> Option<ElementId> {
        self.tree.read().element_at(x, y)
    }
}
