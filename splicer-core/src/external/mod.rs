// ============================================================================
// splicer-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Launching and talking to the transcoding engine
//
// KEY COMPONENTS:
// - ProcessSpawner: trait for launching one command vector as a process
// - EngineProcess: trait for a running process (merged output lines, exit
//   polling, graceful and forced termination)
// - SystemSpawner / SystemProcess: std::process implementation
// - check_dependency: verifies the engine can be started at all
//
// The executor only ever talks to the traits, so tests drive it with scripted
// processes instead of a real engine.
//
// AI-ASSISTANT-INFO: Process abstraction for the engine, no command building here

// ---- Internal crate imports ----
use crate::command::CommandVector;
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;

// ============================================================================
// SUBMODULES
// ============================================================================

/// std::process based spawner and merged line reader
pub mod process;

pub use process::{LineSplitter, SystemProcess, SystemSpawner};

// ============================================================================
// PROCESS ABSTRACTION
// ============================================================================

/// Exit status of a finished process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Exit code; `None` when the process was ended by a signal.
    pub code: Option<i32>,
}

impl ProcessStatus {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    #[must_use]
    pub fn signaled() -> Self {
        Self { code: None }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Result of one attempt to read merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A complete, trimmed, non-empty line.
    Line(String),
    /// Nothing arrived within the timeout.
    Idle,
    /// Both output streams are closed; no more lines will arrive.
    Closed,
}

/// Trait representing a running engine process.
pub trait EngineProcess {
    /// Waits up to `timeout` for the next line of merged stdout/stderr.
    fn read_line(&mut self, timeout: Duration) -> CoreResult<LineRead>;

    /// Returns the exit status if the process has exited.
    fn try_wait(&mut self) -> CoreResult<Option<ProcessStatus>>;

    /// Asks the process to stop (SIGTERM on Unix).
    fn terminate(&mut self) -> CoreResult<()>;

    /// Forcibly ends the process.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait representing something that can launch command vectors.
pub trait ProcessSpawner {
    type Process: EngineProcess;

    /// Launches `command` as a separate process with discrete argv tokens.
    fn spawn(&self, command: &CommandVector) -> CoreResult<Self::Process>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `program` can be started by running `<program> -version`.
///
/// Returns the first line the program printed (the engine's version banner)
/// when one is available.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the program does not exist
/// * `CoreError::CommandStart` - it exists but could not be started
/// * `CoreError::OperationFailed` - it started but `-version` did not succeed
pub fn check_dependency(program: &str) -> CoreResult<String> {
    let result = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match result {
        Ok(output) if !output.status.success() => {
            log::warn!("Dependency '{program}' exited with {} on -version.", output.status);
            Err(CoreError::OperationFailed(format!(
                "{program} -version exited with {}",
                output.status
            )))
        }
        Ok(output) => {
            let banner = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            log::debug!("Found dependency {program}: {banner}");
            Ok(banner)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{program}' not found.");
            Err(CoreError::DependencyNotFound(program.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{program}': {e}");
            Err(CoreError::CommandStart(program.to_string(), e))
        }
    }
}
