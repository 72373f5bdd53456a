pub mod setup;

use crate::events::{EventHandler, JobEvent};
use log::{Level, info, log};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub use setup::setup_file_logging;

/// Level engine output is mirrored at; file logs record it by default.
pub const ENGINE_OUTPUT_LEVEL: Level = Level::Info;

/// Minimum spacing between logged engine progress lines.
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Mirrors engine output into the `log` facade for file logs.
///
/// Engine progress lines (`frame=...`, `size=...`) arrive several times per
/// second; only one per [`PROGRESS_LOG_INTERVAL`] is kept. Every other line
/// is logged as-is.
pub struct FileLoggingHandler {
    last_progress_log: Mutex<Option<Instant>>,
}

impl Default for FileLoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLoggingHandler {
    pub fn new() -> Self {
        Self {
            last_progress_log: Mutex::new(None),
        }
    }

    pub fn reset_progress_state(&self) {
        if let Ok(mut last) = self.last_progress_log.lock() {
            *last = None;
        }
    }

    fn should_log_progress(&self) -> bool {
        let Ok(mut last) = self.last_progress_log.lock() else {
            return true;
        };
        let now = Instant::now();
        let due = last.is_none_or(|t| now.duration_since(t) >= PROGRESS_LOG_INTERVAL);
        if due {
            *last = Some(now);
        }
        due
    }
}

fn is_progress_line(line: &str) -> bool {
    line.starts_with("frame=") || line.starts_with("size=")
}

impl EventHandler for FileLoggingHandler {
    fn handle(&self, event: &JobEvent) {
        // Launches, cleanup and outcomes are logged by the executor itself.
        match event {
            JobEvent::JobStarted { kind, passes } => {
                info!("Starting {kind} job with {passes} pass(es)");
            }
            JobEvent::PassStarted { .. } => self.reset_progress_state(),
            JobEvent::Output { pass, line } => {
                if !is_progress_line(line) || self.should_log_progress() {
                    log!(ENGINE_OUTPUT_LEVEL, "[pass {pass}] {line}");
                }
            }
            JobEvent::Command { .. }
            | JobEvent::Notice { .. }
            | JobEvent::CleanedUp { .. }
            | JobEvent::CleanupFailed { .. }
            | JobEvent::Finished(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines_are_throttled() {
        let handler = FileLoggingHandler::new();
        assert!(handler.should_log_progress());
        assert!(!handler.should_log_progress());

        handler.reset_progress_state();
        assert!(handler.should_log_progress());
    }

    #[test]
    fn test_progress_line_detection() {
        assert!(is_progress_line("frame=  120 fps= 30 q=28.0 size=1024kB"));
        assert!(is_progress_line("size=    512kB time=00:00:02.00"));
        assert!(!is_progress_line("Stream #0:0: Video: h264"));
    }
}
