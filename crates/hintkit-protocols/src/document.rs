//! Read-only page queries consumed by the engine.

use serde::{Deserialize, Serialize};

use crate::types::{ElementId, Rect};

/// Computed style properties the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProperty {
    BorderLeftWidth,
    PaddingLeft,
    OverflowX,
    OverflowY,
}

impl StyleProperty {
    /// CSS property name.
    pub fn css_name(&self) -> &'static str {
        match self {
            StyleProperty::BorderLeftWidth => "border-left-width",
            StyleProperty::PaddingLeft => "padding-left",
            StyleProperty::OverflowX => "overflow-x",
            StyleProperty::OverflowY => "overflow-y",
        }
    }
}

/// Scroll and client sizes of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

/// One text node of an element, with leading and trailing whitespace
/// trimmed away, as the client rects of its lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub rects: Vec<Rect>,
}

/// Live page queries.
///
/// All rectangles are in the current frame's local coordinates. Queries on
/// an element that is no longer known to the host return empty values.
pub trait Document: Send + Sync {
    /// The root `<html>` element.
    fn document_element(&self) -> Option<ElementId>;

    /// The `<body>` element.
    fn body(&self) -> Option<ElementId>;

    /// The element that scrolls the whole page.
    fn scrolling_element(&self) -> Option<ElementId>;

    /// Whether this document lives in the top-level browsing context.
    fn is_top_frame(&self) -> bool;

    /// Base URL used to resolve relative hrefs.
    fn base_url(&self) -> Option<String>;

    /// Whether the element is currently attached to the document.
    fn is_connected(&self, element: ElementId) -> bool;

    /// Lowercase local name.
    fn tag_name(&self, element: ElementId) -> Option<String>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    /// Computed `contentEditable` state: `inherit`, `true`, `false` or
    /// `plaintext-only`. `None` is treated as `inherit`.
    fn content_editable(&self, element: ElementId) -> Option<String>;

    /// Whether the element has an `onclick` handler property set.
    fn has_native_click_handler(&self, element: ElementId) -> bool;

    fn computed_style(&self, element: ElementId, property: StyleProperty) -> Option<String>;

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Element children, in document order.
    fn children(&self, element: ElementId) -> Vec<ElementId>;

    /// All element descendants (not including `element`), in document order.
    fn descendants(&self, element: ElementId) -> Vec<ElementId>;

    /// Inclusive containment: an element contains itself.
    fn contains(&self, ancestor: ElementId, descendant: ElementId) -> bool;

    fn client_rects(&self, element: ElementId) -> Vec<Rect>;

    fn bounding_rect(&self, element: ElementId) -> Rect;

    /// Descendant text runs of the element, in document order.
    fn text_runs(&self, element: ElementId) -> Vec<TextRun>;

    /// Whether the element has a direct text child with non-whitespace content.
    fn has_direct_text(&self, element: ElementId) -> bool;

    /// Labels associated with a form control.
    fn labels(&self, element: ElementId) -> Vec<ElementId>;

    /// Topmost element rendered at a point, if any.
    fn element_at_point(&self, x: f64, y: f64) -> Option<ElementId>;
}
