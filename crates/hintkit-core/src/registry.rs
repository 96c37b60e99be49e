//! Tracked elements and their durable marks.

use std::collections::{BTreeMap, HashMap, HashSet};

use hintkit_protocols::{ElementId, ElementType};

/// Element to category map.
///
/// The click-listener and scrollbar marks are kept in side tables keyed by
/// identity. They outlive registry entries, so an element that leaves the
/// tree and comes back keeps them; only [`Registry::clear`] drops them.
#[derive(Debug, Default)]
pub struct Registry {
    elements: HashMap<ElementId, ElementType>,
    click_listeners: HashSet<ElementId>,
    scrollbars: HashSet<ElementId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: ElementId) -> Option<ElementType> {
        self.elements.get(&element).copied()
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    /// Register or re-categorize an element. Returns the previous category.
    pub fn insert(&mut self, element: ElementId, element_type: ElementType) -> Option<ElementType> {
        self.elements.insert(element, element_type)
    }

    /// Drop an entry. Marks are kept.
    pub fn remove(&mut self, element: ElementId) -> Option<ElementType> {
        self.elements.remove(&element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, ElementType)> + '_ {
        self.elements.iter().map(|(id, ty)| (*id, *ty))
    }

    /// Registered element ids, sorted.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.elements.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Entry count per category. Categories without entries are omitted.
    pub fn counts(&self) -> BTreeMap<ElementType, usize> {
        let mut counts = BTreeMap::new();
        for ty in self.elements.values() {
            *counts.entry(*ty).or_insert(0) += 1;
        }
        counts
    }

    pub fn has_click_listener(&self, element: ElementId) -> bool {
        self.click_listeners.contains(&element)
    }

    pub fn set_click_listener(&mut self, element: ElementId, clickable: bool) {
        if clickable {
            self.click_listeners.insert(element);
        } else {
            self.click_listeners.remove(&element);
        }
    }

    pub fn has_scrollbar(&self, element: ElementId) -> bool {
        self.scrollbars.contains(&element)
    }

    /// Set the scrollbar mark. Returns whether it changed.
    pub fn set_scrollbar(&mut self, element: ElementId, scrollbar: bool) -> bool {
        if scrollbar {
            self.scrollbars.insert(element)
        } else {
            self.scrollbars.remove(&element)
        }
    }

    /// Drop every entry and mark.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.click_listeners.clear();
        self.scrollbars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut registry = Registry::new();
        assert_eq!(registry.insert(ElementId(1), ElementType::Link), None);
        assert_eq!(
            registry.insert(ElementId(1), ElementType::Clickable),
            Some(ElementType::Link)
        );
        assert_eq!(registry.get(ElementId(1)), Some(ElementType::Clickable));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.remove(ElementId(1)), Some(ElementType::Clickable));
        assert!(registry.is_empty());
        assert_eq!(registry.remove(ElementId(1)), None);
    }

    #[test]
    fn test_marks_survive_removal() {
        let mut registry = Registry::new();
        registry.insert(ElementId(1), ElementType::ClickableEvent);
        registry.set_click_listener(ElementId(1), true);
        assert!(registry.set_scrollbar(ElementId(1), true));

        registry.remove(ElementId(1));
        assert!(registry.has_click_listener(ElementId(1)));
        assert!(registry.has_scrollbar(ElementId(1)));

        registry.clear();
        assert!(!registry.has_click_listener(ElementId(1)));
        assert!(!registry.has_scrollbar(ElementId(1)));
    }

    #[test]
    fn test_scrollbar_toggle_reports_change() {
        let mut registry = Registry::new();
        assert!(registry.set_scrollbar(ElementId(1), true));
        assert!(!registry.set_scrollbar(ElementId(1), true));
        assert!(registry.set_scrollbar(ElementId(1), false));
        assert!(!registry.set_scrollbar(ElementId(1), false));
    }

    #[test]
    fn test_counts_and_ids() {
        let mut registry = Registry::new();
        registry.insert(ElementId(3), ElementType::Link);
        registry.insert(ElementId(1), ElementType::Link);
        registry.insert(ElementId(2), ElementType::Textarea);

        let counts = registry.counts();
        assert_eq!(counts.get(&ElementType::Link), Some(&2));
        assert_eq!(counts.get(&ElementType::Textarea), Some(&1));
        assert_eq!(counts.get(&ElementType::Label), None);
        assert_eq!(registry.ids(), vec![ElementId(1), ElementId(2), ElementId(3)]);
    }
}
