// splicer-core/tests/common/mod.rs
//
// Scripted process spawner shared by the integration tests. Each spawn pops
// the next script; when the queue is empty the process exits 0 silently.

#![allow(dead_code)]

use splicer_core::error::command_io_error;
use splicer_core::{
    CommandVector, CoreError, CoreResult, EngineProcess, JobEvent, LineRead, ProcessSpawner,
    ProcessStatus,
};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behaviour of one scripted pass.
#[derive(Debug, Clone)]
pub enum Script {
    /// Print `lines`, then exit with `code`.
    Exit { lines: Vec<String>, code: i32 },
    /// Print `lines`, then run until terminated. With `ignore_terminate` the
    /// process only stops when killed.
    Hang {
        lines: Vec<String>,
        ignore_terminate: bool,
    },
    /// Launch fails.
    LaunchError(String),
    /// Print `lines`, then reading output fails.
    BrokenPipe { lines: Vec<String> },
}

impl Script {
    pub fn ok(lines: &[&str]) -> Self {
        Script::Exit {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            code: 0,
        }
    }

    pub fn fail(code: i32, lines: &[&str]) -> Self {
        Script::Exit {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            code,
        }
    }

    pub fn hang(lines: &[&str]) -> Self {
        Script::Hang {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            ignore_terminate: false,
        }
    }

    pub fn stubborn(lines: &[&str]) -> Self {
        Script::Hang {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            ignore_terminate: true,
        }
    }
}

/// Control calls the executor made on spawned processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Terminate(usize),
    Kill(usize),
}

#[derive(Clone, Default)]
pub struct MockSpawner {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    received_calls: Arc<Mutex<Vec<CommandVector>>>,
    actions: Arc<Mutex<Vec<Action>>>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        let spawner = Self::new();
        spawner.scripts.lock().unwrap().extend(scripts);
        spawner
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Command vectors that were actually launched, in order.
    pub fn received_calls(&self) -> Vec<CommandVector> {
        self.received_calls.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }
}

impl ProcessSpawner for MockSpawner {
    type Process = MockProcess;

    fn spawn(&self, command: &CommandVector) -> CoreResult<MockProcess> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::ok(&[]));

        if let Script::LaunchError(message) = &script {
            return Err(CoreError::CommandStart(
                command.program().to_string(),
                std::io::Error::new(std::io::ErrorKind::NotFound, message.clone()),
            ));
        }

        let mut calls = self.received_calls.lock().unwrap();
        calls.push(command.clone());
        let id = calls.len();

        let lines = match &script {
            Script::Exit { lines, .. }
            | Script::Hang { lines, .. }
            | Script::BrokenPipe { lines } => lines.iter().cloned().collect(),
            Script::LaunchError(_) => VecDeque::new(),
        };

        Ok(MockProcess {
            id,
            lines,
            script,
            terminated: false,
            killed: false,
            actions: Arc::clone(&self.actions),
        })
    }
}

pub struct MockProcess {
    id: usize,
    lines: VecDeque<String>,
    script: Script,
    terminated: bool,
    killed: bool,
    actions: Arc<Mutex<Vec<Action>>>,
}

impl MockProcess {
    fn stopped(&self) -> bool {
        match &self.script {
            Script::Hang {
                ignore_terminate, ..
            } => self.killed || (self.terminated && !ignore_terminate),
            _ => true,
        }
    }
}

impl EngineProcess for MockProcess {
    fn read_line(&mut self, timeout: Duration) -> CoreResult<LineRead> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(LineRead::Line(line));
        }
        match &self.script {
            Script::BrokenPipe { .. } => Err(command_io_error("mock", "pipe broke")),
            _ if self.stopped() => Ok(LineRead::Closed),
            _ => {
                std::thread::sleep(timeout.min(Duration::from_millis(5)));
                Ok(LineRead::Idle)
            }
        }
    }

    fn try_wait(&mut self) -> CoreResult<Option<ProcessStatus>> {
        Ok(match &self.script {
            Script::Exit { code, .. } => Some(ProcessStatus::from_code(*code)),
            Script::BrokenPipe { .. } => Some(ProcessStatus::from_code(0)),
            Script::LaunchError(_) => Some(ProcessStatus::from_code(1)),
            Script::Hang { .. } if self.killed => Some(ProcessStatus::signaled()),
            Script::Hang { .. } if self.stopped() => Some(ProcessStatus::from_code(255)),
            Script::Hang { .. } => None,
        })
    }

    fn terminate(&mut self) -> CoreResult<()> {
        self.terminated = true;
        self.actions.lock().unwrap().push(Action::Terminate(self.id));
        Ok(())
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.killed = true;
        self.actions.lock().unwrap().push(Action::Kill(self.id));
        Ok(())
    }
}

/// Collects every event currently in the channel up to and including the
/// terminal one.
pub fn collect_events(rx: &Receiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    for event in rx.iter() {
        let done = event.is_terminal();
        events.push(event);
        if done {
            break;
        }
    }
    events
}

/// Output lines in event order.
pub fn output_lines(events: &[JobEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Output { line, .. } => Some(line.clone()),
            _ => None,
        })
        .collect()
}
