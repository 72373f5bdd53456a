// ============================================================================
// splicer-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: console or file logging for the CLI
//
// Without --log-file the `log` facade goes to stderr through env_logger
// (RUST_LOG overrides the level). With --log-file it goes to a log4rs file
// appender set up by splicer-core, and job events are mirrored there by the
// core FileLoggingHandler.
//
// AI-ASSISTANT-INFO: Logger initialisation and log file naming

use crate::error::{CliErrorContext, CliResult};
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("splicer_{}.log", splicer_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("splicer_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[must_use]
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Resolves `--log-file`: an existing directory gets a timestamped file.
pub fn resolve_log_path(requested: &Path) -> PathBuf {
    if requested.is_dir() {
        requested.join(format!("splicer_{}.log", get_timestamp()))
    } else {
        requested.to_path_buf()
    }
}

/// Initialises logging and returns the log file path when one is used.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);

    let Some(requested) = log_file else {
        let default = if verbose { "debug" } else { "warn" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
            .format_timestamp(None)
            .format_target(false)
            .init();
        return Ok(None);
    };

    let path = resolve_log_path(requested);
    splicer_core::file_logging::setup_file_logging(&path, level)
        .map_err(|e| splicer_core::CoreError::OperationFailed(format!("{e:#}")))
        .cli_with_context(|| format!("Setting up log file {}", path.display()))?;
    log::info!("Splicer {} started", env!("CARGO_PKG_VERSION"));
    Ok(Some(path))
}
