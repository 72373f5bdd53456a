// ============================================================================
// splicer-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the core library
//
// KEY COMPONENTS:
// - CoreError: every failure the library can surface to a caller
// - CoreResult: result alias used throughout the crate
// - Helper constructors for process-related errors
// - OperationFailed: free-form context added by front ends
//
// Pass failures (non-zero exit) are NOT errors at this level: the executor
// reports them as an ExecutionOutcome. CoreError covers the things that stop
// a job from being built, launched or talked to.

use std::io;
use thiserror::Error;

/// Errors produced by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Communication with command '{0}' failed: {1}")]
    CommandIo(String, String),

    #[error("Required external command '{0}' was not found")]
    DependencyNotFound(String),

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job worker thread panicked")]
    WorkerPanicked,

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_io_error(cmd: impl Into<String>, message: impl Into<String>) -> CoreError {
    CoreError::CommandIo(cmd.into(), message.into())
}
