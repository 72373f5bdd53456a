//! Events emitted while a job runs, and the handler plumbing that renders them.
//!
//! The executor sends [`JobEvent`]s over a channel in occurrence order; the
//! last event of every run is [`JobEvent::Finished`]. Front ends drain the
//! channel and fan events out to [`EventHandler`]s through an
//! [`EventDispatcher`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::CommandVector;
use crate::jobs::JobKind;

pub mod json_handler;

pub use json_handler::JsonEventHandler;

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The pass exited with a non-zero code.
    ExitCode(i32),
    /// The pass was ended by a signal without being cancelled.
    Terminated,
    /// The pass could not be launched.
    Launch(String),
    /// Talking to the running pass failed.
    Io(String),
    /// The pass sequence could not be built.
    Build(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ExitCode(code) => write!(f, "exit code {code}"),
            FailureReason::Terminated => f.write_str("terminated by signal"),
            FailureReason::Launch(msg) => write!(f, "launch failed: {msg}"),
            FailureReason::Io(msg) => write!(f, "communication failed: {msg}"),
            FailureReason::Build(msg) => write!(f, "could not build commands: {msg}"),
        }
    }
}

/// Terminal result of one run. Reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Success {
        output: PathBuf,
    },
    Failure {
        /// 1-based pass number; `None` when no pass was reached.
        pass: Option<usize>,
        reason: FailureReason,
    },
    Cancelled,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionOutcome::Cancelled)
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionOutcome::Failure { .. })
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Success { output } => write!(f, "Finished: {}", output.display()),
            ExecutionOutcome::Failure {
                pass: Some(pass),
                reason,
            } => write!(f, "Failed at pass {pass}: {reason}"),
            ExecutionOutcome::Failure { pass: None, reason } => write!(f, "Failed: {reason}"),
            ExecutionOutcome::Cancelled => f.write_str("Cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    JobStarted {
        kind: JobKind,
        passes: usize,
    },
    PassStarted {
        pass: usize,
        total: usize,
    },
    Command {
        pass: usize,
        command: CommandVector,
    },
    Output {
        pass: usize,
        line: String,
    },
    /// Informational note (e.g. cancellation requested).
    Notice {
        message: String,
    },
    CleanedUp {
        path: PathBuf,
    },
    CleanupFailed {
        path: PathBuf,
        reason: String,
    },
    Finished(ExecutionOutcome),
}

impl JobEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Finished(_))
    }

    pub(crate) fn notice(message: impl Into<String>) -> Self {
        JobEvent::Notice {
            message: message.into(),
        }
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::JobStarted { kind, passes } => {
                let noun = if *passes == 1 { "pass" } else { "passes" };
                write!(f, "Starting {kind} job ({passes} {noun})")
            }
            JobEvent::PassStarted { pass, total } => write!(f, "Pass {pass} / {total}"),
            JobEvent::Command { command, .. } => write!(f, "{command}"),
            JobEvent::Output { line, .. } => f.write_str(line),
            JobEvent::Notice { message } => f.write_str(message),
            JobEvent::CleanedUp { path } => write!(f, "Removed {}", path.display()),
            JobEvent::CleanupFailed { path, reason } => {
                write!(f, "Could not remove {}: {reason}", path.display())
            }
            JobEvent::Finished(outcome) => write!(f, "{outcome}"),
        }
    }
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &JobEvent);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: &JobEvent) {
        for handler in &self.handlers {
            handler.handle(event);
        }
    }

    /// Drains `events` until the terminal event and returns its outcome.
    ///
    /// Returns `None` if the channel closed without a terminal event.
    pub fn drain(&self, events: &std::sync::mpsc::Receiver<JobEvent>) -> Option<ExecutionOutcome> {
        for event in events.iter() {
            self.emit(&event);
            if let JobEvent::Finished(outcome) = event {
                return Some(outcome);
            }
        }
        None
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl EventHandler for Recorder {
        fn handle(&self, event: &JobEvent) {
            self.0.lock().unwrap().push(event.to_string());
        }
    }

    #[test]
    fn test_display() {
        let ev = JobEvent::PassStarted { pass: 1, total: 2 };
        assert_eq!(ev.to_string(), "Pass 1 / 2");

        let ev = JobEvent::JobStarted {
            kind: JobKind::Transcode,
            passes: 1,
        };
        assert_eq!(ev.to_string(), "Starting transcode job (1 pass)");

        let ev = JobEvent::Finished(ExecutionOutcome::Failure {
            pass: Some(2),
            reason: FailureReason::ExitCode(1),
        });
        assert_eq!(ev.to_string(), "Failed at pass 2: exit code 1");
    }

    #[test]
    fn test_json_shape() {
        let ev = JobEvent::Finished(ExecutionOutcome::Success {
            output: PathBuf::from("out.mp4"),
        });
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["type"], "finished");
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["output"], "out.mp4");

        let ev = JobEvent::Command {
            pass: 1,
            command: CommandVector::from_tokens(["ffmpeg", "-i", "a b.mp4"]).unwrap(),
        };
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["command"][2], "a b.mp4");

        let ev = JobEvent::Finished(ExecutionOutcome::Cancelled);
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["outcome"], "cancelled");
    }

    #[test]
    fn test_dispatcher_drains_until_terminal() {
        let recorder = Arc::new(Recorder::default());
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_handler(recorder.clone());

        let (tx, rx) = mpsc::channel();
        tx.send(JobEvent::notice("hello")).unwrap();
        tx.send(JobEvent::Finished(ExecutionOutcome::Cancelled)).unwrap();
        tx.send(JobEvent::notice("ignored")).unwrap();

        let outcome = dispatcher.drain(&rx);
        assert_eq!(outcome, Some(ExecutionOutcome::Cancelled));
        assert_eq!(*recorder.0.lock().unwrap(), ["hello", "Cancelled"]);
    }
}
