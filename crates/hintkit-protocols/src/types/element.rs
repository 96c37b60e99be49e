//! Element identity and classification categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque element identity assigned by the host.
///
/// Two ids are equal exactly when they refer to the same element for the
/// lifetime of the page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification result for a candidate element.
///
/// "Not a candidate" is expressed as `Option::None` by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    /// Natively interactive element (button, input, ARIA role, ...).
    Clickable,
    /// Element that is only known to have a click listener.
    ClickableEvent,
    /// A `<label>` element.
    Label,
    /// Anchor with a followable href.
    Link,
    /// Element with an active scrollbar.
    Scrollable,
    /// Text-bearing element, used when selecting text.
    Selectable,
    /// Free-text editing surface.
    Textarea,
}

impl ElementType {
    /// All categories, in declaration order.
    pub const ALL: [ElementType; 7] = [
        ElementType::Clickable,
        ElementType::ClickableEvent,
        ElementType::Label,
        ElementType::Link,
        ElementType::Scrollable,
        ElementType::Selectable,
        ElementType::Textarea,
    ];

    /// Kebab-case name, as used in configuration and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Clickable => "clickable",
            ElementType::ClickableEvent => "clickable-event",
            ElementType::Label => "label",
            ElementType::Link => "link",
            ElementType::Scrollable => "scrollable",
            ElementType::Selectable => "selectable",
            ElementType::Textarea => "textarea",
        }
    }

    /// Whether hints for this category should get longer labels.
    pub fn ranks_lower(&self) -> bool {
        matches!(self, ElementType::Scrollable | ElementType::Selectable)
    }

    /// Whether this category is a low-confidence guess that yields to a
    /// real interactive element at the same position.
    pub fn is_low_quality(&self) -> bool {
        matches!(self, ElementType::ClickableEvent)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown element type: {0}")]
pub struct ParseElementTypeError(pub String);

impl FromStr for ElementType {
    type Err = ParseElementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ParseElementTypeError(s.to_string()))
    }
}
