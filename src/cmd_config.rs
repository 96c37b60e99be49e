//! check-config command.

use std::path::Path;

use hintkit_config::{Config, ConfigValidator};

/// Validate `config` (loaded from `path`) and print the findings.
pub(crate) fn handle_check_config(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    for error in &result.errors {
        println!("error:   {}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }

    result.into_result()?;
    println!("{}: OK", path.display());
    Ok(())
}
