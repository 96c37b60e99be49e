//! Element manager configuration.

use hintkit_config::{Browser, Config, GeometryConfig};
use serde::{Deserialize, Serialize};

use crate::error::ManagerError;

/// Runtime configuration of an [`ElementManager`](crate::ElementManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Decides whether `file:` links count as links.
    #[serde(default)]
    pub browser: Browser,

    /// Registry size above which the manager stops tracking visibility
    /// per element.
    #[serde(default = "default_max_tracked_elements")]
    pub max_tracked_elements: usize,

    #[serde(default)]
    pub geometry: GeometryConfig,
}

fn default_max_tracked_elements() -> usize {
    10_000
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            browser: Browser::default(),
            max_tracked_elements: default_max_tracked_elements(),
            geometry: GeometryConfig::default(),
        }
    }
}

impl ManagerConfig {
    pub fn with_max_tracked_elements(mut self, max: usize) -> Self {
        self.max_tracked_elements = max;
        self
    }

    pub fn with_browser(mut self, browser: Browser) -> Self {
        self.browser = browser;
        self
    }

    pub(crate) fn check(&self) -> Result<(), ManagerError> {
        if self.max_tracked_elements == 0 {
            return Err(ManagerError::InvalidConfig(
                "max_tracked_elements must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Config> for ManagerConfig {
    fn from(config: &Config) -> Self {
        Self {
            browser: config.engine.browser,
            max_tracked_elements: config.engine.max_tracked_elements,
            geometry: config.geometry.clone(),
        }
    }
}
