//! JSON event handler for structured output
//!
//! Writes every [`JobEvent`] as one JSON object per line, stamped with a Unix
//! timestamp, for consumption by scripts and wrapping tools.

use super::{EventHandler, JobEvent};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs events as JSON lines
pub struct JsonEventHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventHandler {
    /// Create a new JSON handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JSON handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    /// Get current timestamp as seconds since Unix epoch
    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

impl Default for JsonEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for JsonEventHandler {
    fn handle(&self, event: &JobEvent) {
        let Ok(mut value) = serde_json::to_value(event) else {
            return;
        };
        if let Some(map) = value.as_object_mut() {
            map.insert("timestamp".to_string(), Self::get_timestamp().into());
        }
        self.write_json(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ExecutionOutcome;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_one_object_per_line() {
        let buf = SharedBuf::default();
        let handler = JsonEventHandler::with_writer(Box::new(buf.clone()));

        handler.handle(&JobEvent::Output {
            pass: 1,
            line: "frame=  10".to_string(),
        });
        handler.handle(&JobEvent::Finished(ExecutionOutcome::Cancelled));

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "output");
        assert_eq!(first["line"], "frame=  10");
        assert!(first["timestamp"].is_u64());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "finished");
        assert_eq!(second["outcome"], "cancelled");
    }
}
