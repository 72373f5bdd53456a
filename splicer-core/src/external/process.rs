// ============================================================================
// splicer-core/src/external/process.rs
// ============================================================================
//
// SYSTEM PROCESS: std::process implementation of the spawner traits
//
// KEY COMPONENTS:
// - SystemSpawner: launches a CommandVector with stdin closed and both output
//   pipes captured
// - SystemProcess: running child plus one reader thread per pipe; both
//   threads feed a single channel, so lines arrive merged in arrival order
// - LineSplitter: byte-level splitter that treats '\n' and '\r' as line ends
//   (the engine redraws its progress line with carriage returns)

use log::{debug, trace};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use super::{EngineProcess, LineRead, ProcessSpawner, ProcessStatus};
use crate::command::CommandVector;
use crate::error::{command_io_error, command_start_error, command_wait_error, CoreResult};

/// Process creation flag that keeps a console window from appearing.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Splits a byte stream into trimmed, non-empty text lines.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds bytes and returns every line they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' || byte == b'\r' {
                if let Some(line) = self.take_line() {
                    lines.push(line);
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Returns the unterminated tail, if any.
    pub fn finish(&mut self) -> Option<String> {
        self.take_line()
    }

    fn take_line(&mut self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        if line.is_empty() { None } else { Some(line) }
    }
}

fn pump<R: Read>(source: R, tx: Sender<String>, stream: &'static str) {
    let mut reader = BufReader::new(source);
    let mut splitter = LineSplitter::new();
    loop {
        let consumed = match reader.fill_buf() {
            Ok([]) => break,
            Ok(chunk) => {
                for line in splitter.push(chunk) {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
                chunk.len()
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("Stopped reading {stream}: {e}");
                break;
            }
        };
        reader.consume(consumed);
    }
    if let Some(line) = splitter.finish() {
        let _ = tx.send(line);
    }
    trace!("{stream} reader finished");
}

fn spawn_reader<R>(source: R, tx: Sender<String>, stream: &'static str) -> io::Result<()>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("splicer-{stream}"))
        .spawn(move || pump(source, tx, stream))
        .map(|_| ())
}

/// Spawner that launches real OS processes.
#[derive(Debug, Clone, Default)]
pub struct SystemSpawner;

impl SystemSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for SystemSpawner {
    type Process = SystemProcess;

    fn spawn(&self, command: &CommandVector) -> CoreResult<Self::Process> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error(command.program(), e))?;
        debug!("Spawned {} (pid {})", command.program(), child.id());

        let (tx, rx) = mpsc::channel();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let readers = stdout
            .map(|out| spawn_reader(out, tx.clone(), "stdout"))
            .transpose()
            .and_then(|_| stderr.map(|err| spawn_reader(err, tx, "stderr")).transpose());

        let mut process = SystemProcess {
            child,
            lines: rx,
            program: command.program().to_string(),
            exited: None,
        };
        if let Err(e) = readers {
            let _ = process.kill();
            return Err(command_start_error(command.program(), e));
        }
        Ok(process)
    }
}

/// A running engine process started by [`SystemSpawner`].
pub struct SystemProcess {
    child: Child,
    lines: Receiver<String>,
    program: String,
    exited: Option<ProcessStatus>,
}

impl SystemProcess {
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl EngineProcess for SystemProcess {
    fn read_line(&mut self, timeout: Duration) -> CoreResult<LineRead> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Ok(LineRead::Line(line)),
            Err(RecvTimeoutError::Timeout) => Ok(LineRead::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(LineRead::Closed),
        }
    }

    fn try_wait(&mut self) -> CoreResult<Option<ProcessStatus>> {
        if let Some(status) = self.exited {
            return Ok(Some(status));
        }
        let status = self
            .child
            .try_wait()
            .map_err(|e| command_wait_error(&self.program, e))?
            .map(ProcessStatus::from);
        self.exited = status;
        Ok(status)
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> CoreResult<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if self.exited.is_some() {
            return Ok(());
        }
        let pid = Pid::from_raw(self.child.id() as i32);
        match signal::kill(pid, Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(command_io_error(
                &self.program,
                format!("failed to send SIGTERM: {e}"),
            )),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> CoreResult<()> {
        self.kill()
    }

    fn kill(&mut self) -> CoreResult<()> {
        if self.exited.is_some() {
            return Ok(());
        }
        match self.child.kill() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(command_io_error(&self.program, format!("failed to kill: {e}"))),
        }
    }
}

impl Drop for SystemProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_newline_and_carriage_return() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"frame=1\rframe=2\r\nDone\n");
        assert_eq!(lines, ["frame=1", "frame=2", "Done"]);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_lines_span_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"Input #0, mov").is_empty());
        assert_eq!(splitter.push(b", mp4\nOut"), ["Input #0, mov, mp4"]);
        assert_eq!(splitter.finish().as_deref(), Some("Out"));
    }

    #[test]
    fn test_trims_and_skips_blank_lines() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"  Stream #0:0  \n\n   \r\n");
        assert_eq!(lines, ["Stream #0:0"]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push(b"caf\xe9\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("caf"));
    }
}
