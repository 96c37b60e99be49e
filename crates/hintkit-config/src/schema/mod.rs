//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub geometry: GeometryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Browser the engine runs in. Decides a few platform-specific rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

/// Element tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub browser: Browser,

    /// Registry size above which visibility tracking falls back to
    /// treating every tracked element as visible.
    #[serde(default = "default_max_tracked_elements")]
    pub max_tracked_elements: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            browser: Browser::default(),
            max_tracked_elements: default_max_tracked_elements(),
        }
    }
}

fn default_max_tracked_elements() -> usize {
    10_000
}

/// Hint placement thresholds, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Rects narrower or shorter than this are degenerate.
    #[serde(default = "default_min_rect_size")]
    pub min_rect_size: f64,

    /// Smallest text line box considered for a text anchor.
    #[serde(default = "default_min_text_size")]
    pub min_text_size: f64,

    /// Single-rect elements at least this tall anchor at their left edge.
    #[serde(default = "default_box_min_height")]
    pub box_min_height: f64,

    /// Click-listener-only elements covering this area or more are ignored.
    #[serde(default = "default_max_clickable_event_area")]
    pub max_clickable_event_area: f64,

    /// Space needed left of a single text line to look for an icon there.
    #[serde(default = "default_min_icon_room")]
    pub min_icon_room: f64,

    /// Frames smaller than this on either axis are not reported.
    #[serde(default = "default_min_frame_size")]
    pub min_frame_size: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            min_rect_size: default_min_rect_size(),
            min_text_size: default_min_text_size(),
            box_min_height: default_box_min_height(),
            max_clickable_event_area: default_max_clickable_event_area(),
            min_icon_room: default_min_icon_room(),
            min_frame_size: default_min_frame_size(),
        }
    }
}

fn default_min_rect_size() -> f64 {
    1.0
}

fn default_min_text_size() -> f64 {
    2.0
}

fn default_box_min_height() -> f64 {
    110.0
}

fn default_max_clickable_event_area() -> f64 {
    1_000_000.0
}

fn default_min_icon_room() -> f64 {
    10.0
}

fn default_min_frame_size() -> f64 {
    6.0
}

/// Logging configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files. Console only when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
