//! Element classification.
//!
//! Decides the hint category of an element from its tag, attributes,
//! content-editable state and the two marks kept by the registry. The first
//! matching rule wins.

use hintkit_config::Browser;
use hintkit_protocols::{Document, ElementId, ElementType, StyleProperty};
use url::Url;

const CLICKABLE_TAGS: [&str; 5] = ["button", "select", "summary", "audio", "video"];

const CLICKABLE_ROLES: [&str; 11] = [
    "button",
    "checkbox",
    "link",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "switch",
    "tab",
    "treeitem",
];

/// Attributes left behind by frameworks that attach click handlers.
const CLICK_ATTRIBUTES: [&str; 8] = [
    "onclick",
    "onmousedown",
    "jsaction",
    "ng-click",
    "data-ng-click",
    "v-on:click",
    "@click",
    "x-on:click",
];

const LINK_PROTOCOLS: [&str; 5] = ["http:", "https:", "ftp:", "chrome-extension:", "moz-extension:"];

const SELECTABLE_TAGS: [&str; 7] = ["canvas", "embed", "frame", "iframe", "img", "image", "object"];

/// Marks the registry keeps for an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    pub click_listener: bool,
    pub scrollbar: bool,
}

/// Element classifier.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    browser: Browser,
}

impl Classifier {
    pub fn new(browser: Browser) -> Self {
        Self { browser }
    }

    /// Category of an element, or `None` if it should not get a hint.
    pub fn classify(
        &self,
        document: &dyn Document,
        element: ElementId,
        marks: Marks,
    ) -> Option<ElementType> {
        let tag = document.tag_name(element)?;

        match tag.as_str() {
            "a" => {
                let href = document.attribute(element, "href");
                return Some(match href {
                    Some(href) if self.is_followable(&href, document.base_url().as_deref()) => {
                        ElementType::Link
                    }
                    _ => ElementType::Clickable,
                });
            }
            "input" => {
                let hidden = document
                    .attribute(element, "type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden"));
                return (!hidden).then_some(ElementType::Clickable);
            }
            "textarea" => return Some(ElementType::Textarea),
            "form" => return None,
            t if CLICKABLE_TAGS.contains(&t) => return Some(ElementType::Clickable),
            _ => {}
        }

        if let Some(state) = document.content_editable(element) {
            if state != "inherit" && state != "false" {
                return Some(ElementType::Textarea);
            }
        }

        if marks.scrollbar {
            let page_scroller =
                document.is_top_frame() && document.scrolling_element() == Some(element);
            if !page_scroller {
                return Some(ElementType::Scrollable);
            }
        }

        if is_root(document, element) {
            return None;
        }

        if let Some(role) = document.attribute(element, "role") {
            let role = role.trim().to_ascii_lowercase();
            if CLICKABLE_ROLES.contains(&role.as_str()) {
                return Some(ElementType::Clickable);
            }
        }

        if document.has_native_click_handler(element)
            || marks.click_listener
            || CLICK_ATTRIBUTES
                .iter()
                .any(|name| document.has_attribute(element, name))
        {
            return Some(ElementType::ClickableEvent);
        }

        if tag == "label" {
            return Some(ElementType::Label);
        }

        None
    }

    /// Category of an element in text selection mode.
    pub fn classify_selectable(
        &self,
        document: &dyn Document,
        element: ElementId,
    ) -> Option<ElementType> {
        let tag = document.tag_name(element)?;
        if SELECTABLE_TAGS.contains(&tag.as_str()) {
            return Some(ElementType::Selectable);
        }
        if is_root(document, element) {
            return None;
        }
        if document.children(element).is_empty() || document.has_direct_text(element) {
            return Some(ElementType::Selectable);
        }
        None
    }

    fn is_followable(&self, href: &str, base: Option<&str>) -> bool {
        let href = href.trim();
        if href.is_empty() || href == "#" {
            return false;
        }
        let resolved = match base.and_then(|b| Url::parse(b).ok()) {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        let Ok(url) = resolved else {
            return false;
        };
        let protocol = format!("{}:", url.scheme());
        LINK_PROTOCOLS.contains(&protocol.as_str())
            || (protocol == "file:" && self.browser == Browser::Chrome)
    }
}

/// Whether the element currently shows a scrollbar: content overflows on
/// an axis whose computed overflow lets the user scroll it.
pub fn has_scrollbar(document: &dyn Document, element: ElementId) -> bool {
    let scrolls = |property| {
        matches!(
            document.computed_style(element, property).as_deref(),
            Some("auto" | "scroll" | "overlay")
        )
    };
    let metrics = document.scroll_metrics(element);
    (metrics.scroll_width > metrics.client_width && scrolls(StyleProperty::OverflowX))
        || (metrics.scroll_height > metrics.client_height && scrolls(StyleProperty::OverflowY))
}

fn is_root(document: &dyn Document, element: ElementId) -> bool {
    document.document_element() == Some(element) || document.body() == Some(element)
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
