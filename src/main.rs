//! hintkit - element tracking engine for keyboard-driven link hints
//!
//! Command line entry point. Replays page snapshots through the engine and
//! reports the hints it would show.

mod cli;
mod cmd_config;
mod cmd_scan;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hintkit_config::{Config, ConfigLoader, LoggingConfig};

use cli::{Cli, Commands};

/// Initialize tracing with console output and, when a log directory is
/// configured, daily rolling log files.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    // Console goes to stderr so that JSON output stays clean.
    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file = match &logging.directory {
        Some(directory) => {
            let log_dir = PathBuf::from(ConfigLoader::expand_path(directory));
            std::fs::create_dir_all(&log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("hintkit")
                .filename_suffix("log")
                .max_log_files(30)
                .build(&log_dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keeps the writer thread alive for the program duration.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Load the configuration. An explicitly given file must exist.
fn load_config(path: Option<&PathBuf>) -> Result<(PathBuf, Config), Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok((path.clone(), ConfigLoader::load(path)?)),
        None => {
            let path = ConfigLoader::default_path();
            let config = ConfigLoader::load_or_default(&path)?;
            Ok((path, config))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config_path, config) = load_config(cli.config.as_ref())?;

    init_tracing(&config.logging)?;
    debug!("Configuration: {}", config_path.display());

    match cli.command {
        Commands::Scan {
            page,
            types,
            selectable,
            slice_ms,
            format,
        } => cmd_scan::handle_scan(&config, &page, types, selectable, slice_ms, format).await,
        Commands::Stats { page, format } => cmd_scan::handle_stats(&config, &page, format).await,
        Commands::CheckConfig => cmd_config::handle_check_config(&config_path, &config),
    }
}
