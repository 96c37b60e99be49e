//! Serializable page snapshot.

use std::fs;
use std::path::Path;

use hintkit_protocols::Rect;
use serde::{Deserialize, Serialize};

use crate::dom_node::PageNode;
use crate::error::DomError;

/// A page as a flat list of elements in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Page URL, used as the base for relative hrefs.
    #[serde(default)]
    pub url: Option<String>,

    /// Whether the page is the top-level browsing context.
    #[serde(default = "default_top_frame")]
    pub top_frame: bool,

    /// Visible area of the page, in local coordinates.
    #[serde(default = "default_viewport")]
    pub viewport: Rect,

    /// Elements; parents must precede their children.
    pub nodes: Vec<PageNode>,
}

fn default_top_frame() -> bool {
    true
}

fn default_viewport() -> Rect {
    Rect::new(0.0, 0.0, 1280.0, 720.0)
}

impl PageSnapshot {
    /// Empty top-level page with the default viewport.
    pub fn new(nodes: Vec<PageNode>) -> Self {
        Self {
            url: None,
            top_frame: default_top_frame(),
            viewport: default_viewport(),
            nodes,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, DomError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DomError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
