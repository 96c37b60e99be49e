//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const KNOWN_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_engine(config, &mut result);
        Self::validate_geometry(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        if config.engine.max_tracked_elements == 0 {
            result.add_error(ValidationError::new(
                "engine.max_tracked_elements",
                "max_tracked_elements must be greater than 0",
            ));
        }

        if config.engine.max_tracked_elements > 100_000 {
            result.add_warning(ValidationWarning::new(
                "engine.max_tracked_elements",
                "max_tracked_elements is very high (>100000), intersection tracking may slow pages down",
            ));
        }
    }

    fn validate_geometry(config: &Config, result: &mut ValidationResult) {
        let geometry = &config.geometry;
        let sizes = [
            ("geometry.min_rect_size", geometry.min_rect_size),
            ("geometry.min_text_size", geometry.min_text_size),
            ("geometry.box_min_height", geometry.box_min_height),
            ("geometry.max_clickable_event_area", geometry.max_clickable_event_area),
            ("geometry.min_frame_size", geometry.min_frame_size),
        ];
        for (path, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                result.add_error(ValidationError::new(
                    path,
                    format!("must be a positive number, got {}", value),
                ));
            }
        }

        if !geometry.min_icon_room.is_finite() || geometry.min_icon_room < 0.0 {
            result.add_error(ValidationError::new(
                "geometry.min_icon_room",
                "min_icon_room cannot be negative",
            ));
        }

        if geometry.min_text_size > geometry.box_min_height {
            result.add_warning(ValidationWarning::new(
                "geometry.min_text_size",
                "min_text_size exceeds box_min_height, text anchors will never be used",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.trim();
        if level.is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        } else if !level.contains('=') && !KNOWN_LEVELS.contains(&level.to_lowercase().as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    level, KNOWN_LEVELS
                ),
            ));
        }

        if let Some(ref dir) = config.logging.directory {
            if dir.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "logging.directory",
                    "Log directory cannot be an empty string",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
