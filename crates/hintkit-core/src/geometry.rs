//! Hint placement.
//!
//! Clips an element's client rects to the viewport chain, picks the point
//! its hint anchors to, makes sure nothing else is rendered on top of that
//! point, and computes a weight used to hand out the shortest hint labels.

use hintkit_config::GeometryConfig;
use hintkit_protocols::{
    Align, Document, ElementId, ElementType, HintMeasurement, Point, Rect, StyleProperty, Viewport,
};
use tracing::trace;

/// Clip `rect` (local coordinates of the innermost frame) to every viewport
/// of the chain, innermost last, and return the part left visible, in local
/// coordinates. `None` when nothing is visible.
pub fn visible_box(rect: &Rect, viewports: &[Viewport]) -> Option<Rect> {
    let (mut left, mut top, mut right, mut bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    let (mut offset_x, mut offset_y) = (0.0, 0.0);

    for viewport in viewports.iter().rev() {
        left = left.max(0.0) + viewport.x;
        top = top.max(0.0) + viewport.y;
        right = right.min(viewport.width) + viewport.x;
        bottom = bottom.min(viewport.height) + viewport.y;
        offset_x += viewport.x;
        offset_y += viewport.y;
    }

    let (width, height) = (right - left, bottom - top);
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(Rect::new(left - offset_x, top - offset_y, width, height))
}

/// Whether a point lies inside one of the boxes.
fn accepts(boxes: &[Rect], x: f64, y: f64) -> bool {
    boxes.iter().any(|b| b.contains(x, y))
}

fn middle(rect: &Rect) -> f64 {
    rect.y + rect.height / 2.0
}

/// `"3px"` -> 3.0. Anything unparsable counts as zero.
fn css_px(value: Option<String>) -> f64 {
    value
        .as_deref()
        .map(|v| v.trim().trim_end_matches("px"))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn weight(boxes: &[Rect], element_type: ElementType) -> f64 {
    let max_width = boxes.iter().map(|b| b.width).fold(0.0, f64::max);
    let max_height = boxes.iter().map(|b| b.height).fold(0.0, f64::max);
    let size = max_width.min(max_height).round();
    let base = if element_type.ranks_lower() { 10.0 } else { 2.0 };
    size.log(base).max(1.0)
}

/// Measures where hints go.
#[derive(Debug, Clone)]
pub struct GeometryEngine {
    config: GeometryConfig,
}

impl GeometryEngine {
    pub fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    fn is_degenerate(&self, rect: &Rect) -> bool {
        rect.width < self.config.min_rect_size || rect.height < self.config.min_rect_size
    }

    /// Anchor point and weight of a classified element, or `None` when the
    /// element is not visible or is covered by something else.
    pub fn measure(
        &self,
        document: &dyn Document,
        element: ElementId,
        element_type: ElementType,
        viewports: &[Viewport],
    ) -> Option<HintMeasurement> {
        let client_rects = document.client_rects(element);
        let mut rects: Vec<Rect> = client_rects
            .iter()
            .filter(|r| !self.is_degenerate(r))
            .copied()
            .collect();
        if rects.is_empty() {
            rects = client_rects;
        }

        if element_type == ElementType::ClickableEvent
            && rects.len() == 1
            && rects[0].area() >= self.config.max_clickable_event_area
        {
            trace!("{} is a page-sized click container, skipped", element);
            return None;
        }

        let boxes: Vec<Rect> = rects
            .iter()
            .filter_map(|r| visible_box(r, viewports))
            .collect();

        if boxes.is_empty() {
            // A zero-width box usually wraps floated children only.
            if rects.len() == 1 && rects[0].width == 0.0 {
                return document
                    .children(element)
                    .into_iter()
                    .find_map(|child| self.measure(document, child, element_type, viewports));
            }
            return None;
        }

        let point = if rects.len() == 1 {
            self.single_rect_point(document, element, element_type, &boxes, viewports)
        } else {
            self.multi_rect_point(document, element, &boxes, viewports)
        };
        let max_x = boxes.iter().map(Rect::right).fold(f64::NEG_INFINITY, f64::max);

        let point = match self.uncovered(document, element, point, max_x) {
            Some(point) => point,
            None if element_type == ElementType::Textarea
                && rects.iter().all(|r| r.width <= self.config.min_rect_size) =>
            {
                // Caret-tracking proxies are meant to sit under other content.
                point
            }
            None => return self.measure_file_input_wrapper(document, element, element_type, viewports),
        };

        Some(HintMeasurement {
            x: point.x,
            y: point.y,
            align: point.align,
            max_x,
            weight: weight(&boxes, element_type),
        })
    }

    fn single_rect_point(
        &self,
        document: &dyn Document,
        element: ElementId,
        element_type: ElementType,
        boxes: &[Rect],
        viewports: &[Viewport],
    ) -> Point {
        let rect = boxes[0];
        let y = middle(&rect);

        if element_type == ElementType::Scrollable {
            return Point::new(rect.right() - 1.0, y, Align::Right);
        }
        if rect.height >= self.config.box_min_height || element_type == ElementType::Textarea {
            return Point::new(rect.x, y, Align::Left);
        }

        let tag = document.tag_name(element).unwrap_or_default();

        // Inputs render neither text nodes nor images of their own.
        if tag != "input" {
            if let Some(point) = self.text_point(document, element, boxes, viewports, false) {
                return point;
            }
            if let Some(point) =
                self.image_point(document, element, boxes, viewports, f64::INFINITY)
            {
                return point;
            }
        }

        if tag == "input" {
            let kind = document
                .attribute(element, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();
            if kind == "checkbox" || kind == "radio" {
                return Point::new(rect.right(), y, Align::Right);
            }
        }

        if tag == "input" || tag == "select" {
            let x = rect.x
                + css_px(document.computed_style(element, StyleProperty::BorderLeftWidth))
                + css_px(document.computed_style(element, StyleProperty::PaddingLeft));
            if accepts(boxes, x, y) {
                return Point::new(x, y, Align::Left);
            }
        }

        Point::new(rect.x, y, Align::Left)
    }

    fn multi_rect_point(
        &self,
        document: &dyn Document,
        element: ElementId,
        boxes: &[Rect],
        viewports: &[Viewport],
    ) -> Point {
        if let Some(point) = self.text_point(document, element, boxes, viewports, true) {
            return point;
        }
        let envelope = Rect::envelope(boxes).unwrap_or(boxes[0]);
        Point::new(envelope.x, envelope.y, Align::Right)
    }

    /// Anchor at the start of the element's most prominent text line.
    fn text_point(
        &self,
        document: &dyn Document,
        element: ElementId,
        boxes: &[Rect],
        viewports: &[Viewport],
        prefer_start: bool,
    ) -> Option<Point> {
        let min = self.config.min_text_size;
        let lines: Vec<Rect> = document
            .text_runs(element)
            .iter()
            .flat_map(|run| run.rects.iter())
            .filter_map(|r| visible_box(r, viewports))
            .filter(|b| b.width >= min && b.height >= min && accepts(boxes, b.x, middle(b)))
            .collect();

        if prefer_start {
            let first = lines
                .iter()
                .min_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))?;
            return Some(Point::new(first.x, middle(first), Align::Left));
        }

        let tallest = lines.iter().max_by(|a, b| {
            a.height
                .total_cmp(&b.height)
                .then(a.width.total_cmp(&b.width))
        })?;
        let same_line: Vec<&Rect> = lines
            .iter()
            .filter(|b| b.overlaps_vertically(tallest))
            .collect();
        let leftmost = same_line
            .iter()
            .min_by(|a, b| a.x.total_cmp(&b.x))
            .copied()
            .unwrap_or(tallest);

        if same_line.len() == lines.len() {
            let element_left = boxes.iter().map(|b| b.x).fold(f64::INFINITY, f64::min);
            if leftmost.x - element_left >= self.config.min_icon_room {
                if let Some(icon) = self.image_point(document, element, boxes, viewports, leftmost.x)
                {
                    return Some(icon);
                }
            }
        }

        Some(Point::new(leftmost.x, middle(leftmost), Align::Left))
    }

    /// Anchor at the left edge of the first image (the element itself
    /// included) that starts left of `before_x`.
    fn image_point(
        &self,
        document: &dyn Document,
        element: ElementId,
        boxes: &[Rect],
        viewports: &[Viewport],
        before_x: f64,
    ) -> Option<Point> {
        std::iter::once(element)
            .chain(document.descendants(element))
            .filter(|id| matches!(document.tag_name(*id).as_deref(), Some("img" | "svg")))
            .find_map(|image| {
                let image_box = document
                    .client_rects(image)
                    .iter()
                    .filter_map(|r| visible_box(r, viewports))
                    .find(|b| !self.is_degenerate(b))?;
                let y = middle(&image_box);
                (image_box.x < before_x && accepts(boxes, image_box.x, y))
                    .then(|| Point::new(image_box.x, y, Align::Left))
            })
    }

    /// The point itself, the point just right of whatever covers it, or
    /// `None` when covered at both.
    fn uncovered(
        &self,
        document: &dyn Document,
        element: ElementId,
        point: Point,
        max_x: f64,
    ) -> Option<Point> {
        let mut point = point;
        for retried in [false, true] {
            let hit = document.element_at_point(point.x, point.y)?;
            if document.contains(element, hit) {
                return Some(point);
            }
            let hit_rect = document.bounding_rect(hit);
            // Pseudo-elements can make hit testing report a box that does
            // not reach the point.
            if !hit_rect.contains(point.x, point.y) {
                return Some(point);
            }
            if retried {
                break;
            }
            let x = hit_rect.right() + 1.0;
            if x > max_x {
                break;
            }
            trace!("{} covered by {} at ({}, {}), retrying at x={}", element, hit, point.x, point.y, x);
            point = Point { x, ..point };
        }
        None
    }

    /// File inputs are often made invisible and stretched over a smaller
    /// styled wrapper; measure the wrapper instead.
    fn measure_file_input_wrapper(
        &self,
        document: &dyn Document,
        element: ElementId,
        element_type: ElementType,
        viewports: &[Viewport],
    ) -> Option<HintMeasurement> {
        let is_file_input = document.tag_name(element).as_deref() == Some("input")
            && document
                .attribute(element, "type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("file"));
        if !is_file_input {
            return None;
        }
        let parent = document.parent(element)?;
        let own = document.bounding_rect(element);
        let wrapper = document.bounding_rect(parent);
        if wrapper.width < own.width || wrapper.height < own.height {
            return self.measure(document, parent, element_type, viewports);
        }
        None
    }

    /// Whether a frame shows at least `min_frame_size` on both axes.
    pub fn is_frame_visible(
        &self,
        document: &dyn Document,
        frame: ElementId,
        viewports: &[Viewport],
    ) -> bool {
        let min = self.config.min_frame_size;
        document
            .client_rects(frame)
            .iter()
            .filter_map(|r| visible_box(r, viewports))
            .any(|b| b.width >= min && b.height >= min)
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
