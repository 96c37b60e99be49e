//! A single element of a page snapshot.

use std::collections::{BTreeMap, HashMap};

use hintkit_protocols::{ElementId, Rect, ScrollMetrics, StyleProperty, TextRun};
use serde::{Deserialize, Serialize};

/// Element with everything the engine may ask about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNode {
    /// Identity, unique within the page.
    pub id: ElementId,

    /// Tag name (lowercase).
    pub tag_name: String,

    /// Parent element. `None` for the root and for detached fragments.
    #[serde(default)]
    pub parent: Option<ElementId>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Client rects in local coordinates.
    #[serde(default)]
    pub rects: Vec<Rect>,

    /// Runs of the element's own (direct) text nodes.
    #[serde(default)]
    pub text_runs: Vec<TextRun>,

    #[serde(default)]
    pub content_editable: Option<String>,

    /// Whether an `onclick` handler property is set.
    #[serde(default)]
    pub onclick: bool,

    #[serde(default)]
    pub styles: HashMap<StyleProperty, String>,

    #[serde(default)]
    pub scroll: ScrollMetrics,

    /// Paint order for hit testing (higher = on top).
    #[serde(default)]
    pub paint_order: i32,
}

impl PageNode {
    pub fn new(id: u64, tag_name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            tag_name: tag_name.into().to_lowercase(),
            parent: None,
            attributes: BTreeMap::new(),
            rects: Vec::new(),
            text_runs: Vec::new(),
            content_editable: None,
            onclick: false,
            styles: HashMap::new(),
            scroll: ScrollMetrics::default(),
            paint_order: 0,
        }
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(ElementId(parent));
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rects.push(Rect::new(x, y, width, height));
        self
    }

    /// Add a single-line text run.
    pub fn with_text(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.text_runs.push(TextRun {
            rects: vec![Rect::new(x, y, width, height)],
        });
        self
    }

    pub fn with_style(mut self, property: StyleProperty, value: impl Into<String>) -> Self {
        self.styles.insert(property, value.into());
        self
    }

    pub fn with_scroll(mut self, scroll: ScrollMetrics) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_onclick(mut self) -> Self {
        self.onclick = true;
        self
    }

    pub fn with_content_editable(mut self, state: impl Into<String>) -> Self {
        self.content_editable = Some(state.into());
        self
    }

    pub fn with_paint_order(mut self, paint_order: i32) -> Self {
        self.paint_order = paint_order;
        self
    }

    /// Envelope of the client rects.
    pub fn bounding_rect(&self) -> Rect {
        Rect::envelope(&self.rects).unwrap_or_default()
    }
}
