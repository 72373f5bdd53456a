// ============================================================================
// splicer-core/src/executor.rs
// ============================================================================
//
// EXECUTOR: Sequential pass runner
//
// KEY COMPONENTS:
// - Executor: runs the passes of one Job strictly in order
// - ExecutorSettings: grace period and stop-flag polling interval
// - JobHandle: a run on a dedicated worker thread (events, cancel, join)
//
// RUN PROTOCOL:
// 1. Build the pass sequence (once). A build error ends the run as a failure
//    without a pass number.
// 2. For each pass: check the stop flag, announce the pass and its command,
//    launch it, forward every merged output line, wait for exit. A non-zero
//    exit ends the run; later passes are never launched.
// 3. On cancellation: stop reading output, ask the process to terminate,
//    wait up to the grace period, then kill it.
// 4. Clean up the job's transient artifacts exactly once.
// 5. Send the terminal Finished event. Nothing is sent after it.
//
// AI-ASSISTANT-INFO: Pass execution loop, cancellation and cleanup ordering

use log::{debug, error, info, trace, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::command::CommandVector;
use crate::config::{CoreConfig, DEFAULT_GRACE_PERIOD, DEFAULT_POLL_INTERVAL};
use crate::error::{CoreError, CoreResult};
use crate::events::{ExecutionOutcome, FailureReason, JobEvent};
use crate::external::{EngineProcess, LineRead, ProcessSpawner, SystemSpawner};
use crate::jobs::Job;

/// Timing knobs of the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Time a cancelled pass gets to exit after the termination request.
    pub grace_period: Duration,
    /// Stop-flag polling interval while waiting for output or exit.
    pub poll_interval: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&CoreConfig> for ExecutorSettings {
    fn from(config: &CoreConfig) -> Self {
        Self {
            grace_period: config.grace_period,
            poll_interval: config.poll_interval,
        }
    }
}

/// How a single pass ended.
enum PassEnd {
    Completed,
    Failed(FailureReason),
    Cancelled,
}

fn send(events: &Sender<JobEvent>, event: JobEvent) {
    // A caller that stopped listening does not stop the run.
    let _ = events.send(event);
}

/// Runs jobs one pass at a time through a [`ProcessSpawner`].
#[derive(Debug, Clone)]
pub struct Executor<S> {
    spawner: S,
    settings: ExecutorSettings,
}

impl Executor<SystemSpawner> {
    /// Executor that launches real engine processes.
    #[must_use]
    pub fn system(settings: ExecutorSettings) -> Self {
        Self::new(SystemSpawner::new(), settings)
    }
}

impl<S: ProcessSpawner> Executor<S> {
    pub fn new(spawner: S, settings: ExecutorSettings) -> Self {
        Self { spawner, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Runs `job` to completion on the current thread.
    ///
    /// Every event, including the terminal `Finished`, goes to `events`; the
    /// same outcome is also returned.
    pub fn run(
        &self,
        job: &mut Job,
        token: &CancellationToken,
        events: &Sender<JobEvent>,
    ) -> ExecutionOutcome {
        let outcome = self.run_passes(job, token, events);
        self.cleanup(job, events);

        match &outcome {
            ExecutionOutcome::Success { output } => info!("Job finished: {}", output.display()),
            ExecutionOutcome::Failure { .. } => warn!("Job failed: {outcome}"),
            ExecutionOutcome::Cancelled => info!("Job cancelled"),
        }
        send(events, JobEvent::Finished(outcome.clone()));
        outcome
    }

    /// Runs `job` on a new worker thread with a fresh cancellation token.
    pub fn spawn(self, job: Job) -> CoreResult<JobHandle>
    where
        S: Send + 'static,
    {
        self.spawn_with_token(job, CancellationToken::new())
    }

    /// Runs `job` on a new worker thread, observing `token`.
    pub fn spawn_with_token(self, mut job: Job, token: CancellationToken) -> CoreResult<JobHandle>
    where
        S: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker_token = token.clone();
        let worker = thread::Builder::new()
            .name(format!("splicer-{}", job.kind()))
            .spawn(move || self.run(&mut job, &worker_token, &tx))?;

        Ok(JobHandle {
            events: rx,
            token,
            worker,
        })
    }

    fn run_passes(
        &self,
        job: &mut Job,
        token: &CancellationToken,
        events: &Sender<JobEvent>,
    ) -> ExecutionOutcome {
        let output = job.output_path().to_path_buf();
        let kind = job.kind();

        let passes = match job.passes() {
            Ok(passes) => passes,
            Err(e) => {
                error!("Could not build {kind} job: {e}");
                return ExecutionOutcome::Failure {
                    pass: None,
                    reason: FailureReason::Build(e.to_string()),
                };
            }
        };

        let total = passes.len();
        send(events, JobEvent::JobStarted { kind, passes: total });

        for (idx, command) in passes.iter().enumerate() {
            let pass = idx + 1;
            if token.is_cancelled() {
                debug!("Stop flag set before pass {pass}; nothing launched");
                return ExecutionOutcome::Cancelled;
            }

            send(events, JobEvent::PassStarted { pass, total });
            send(
                events,
                JobEvent::Command {
                    pass,
                    command: command.clone(),
                },
            );
            info!("Pass {pass}/{total}: {command}");

            match self.run_pass(pass, command, token, events) {
                PassEnd::Completed => debug!("Pass {pass} completed"),
                PassEnd::Cancelled => return ExecutionOutcome::Cancelled,
                PassEnd::Failed(reason) => {
                    warn!("Pass {pass} failed: {reason}");
                    return ExecutionOutcome::Failure {
                        pass: Some(pass),
                        reason,
                    };
                }
            }
        }

        ExecutionOutcome::Success { output }
    }

    fn run_pass(
        &self,
        pass: usize,
        command: &CommandVector,
        token: &CancellationToken,
        events: &Sender<JobEvent>,
    ) -> PassEnd {
        let mut process = match self.spawner.spawn(command) {
            Ok(process) => process,
            Err(e) => {
                error!("Failed to launch pass {pass}: {e}");
                return PassEnd::Failed(FailureReason::Launch(e.to_string()));
            }
        };

        // Consume merged output until both streams close.
        loop {
            if token.is_cancelled() {
                self.stop(&mut process, pass, events);
                return PassEnd::Cancelled;
            }
            match process.read_line(self.settings.poll_interval) {
                Ok(LineRead::Line(line)) => {
                    trace!("[pass {pass}] {line}");
                    send(events, JobEvent::Output { pass, line });
                }
                Ok(LineRead::Idle) => {}
                Ok(LineRead::Closed) => break,
                Err(e) => return Self::abandon(&mut process, e),
            }
        }

        // Output is closed; wait for the exit status.
        loop {
            match process.try_wait() {
                Ok(Some(status)) if status.success() => return PassEnd::Completed,
                Ok(Some(_)) if token.is_cancelled() => return PassEnd::Cancelled,
                Ok(Some(status)) => {
                    return PassEnd::Failed(match status.code {
                        Some(code) => FailureReason::ExitCode(code),
                        None => FailureReason::Terminated,
                    });
                }
                Ok(None) if token.is_cancelled() => {
                    self.stop(&mut process, pass, events);
                    return PassEnd::Cancelled;
                }
                Ok(None) => thread::sleep(self.settings.poll_interval),
                Err(e) => return Self::abandon(&mut process, e),
            }
        }
    }

    fn abandon(process: &mut S::Process, err: CoreError) -> PassEnd {
        error!("Lost contact with running pass: {err}");
        if let Err(e) = process.kill() {
            warn!("Could not kill process after communication failure: {e}");
        }
        PassEnd::Failed(FailureReason::Io(err.to_string()))
    }

    /// Terminate, wait up to the grace period, then kill.
    fn stop(&self, process: &mut S::Process, pass: usize, events: &Sender<JobEvent>) {
        info!("Cancellation requested; stopping pass {pass}");
        send(
            events,
            JobEvent::notice(format!("Cancellation requested; stopping pass {pass}")),
        );

        if let Err(e) = process.terminate() {
            warn!("Graceful termination request failed: {e}");
        }

        let deadline = Instant::now() + self.settings.grace_period;
        loop {
            match process.try_wait() {
                Ok(Some(status)) => {
                    debug!("Pass {pass} exited after termination request ({status:?})");
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not poll cancelled process: {e}");
                    break;
                }
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(self.settings.poll_interval.min(deadline - now));
        }

        warn!(
            "Pass {pass} still running after {:?}; killing it",
            self.settings.grace_period
        );
        send(
            events,
            JobEvent::notice(format!("Pass {pass} did not stop in time; killed")),
        );
        if let Err(e) = process.kill() {
            warn!("Kill failed: {e}");
        }
    }

    fn cleanup(&self, job: &mut Job, events: &Sender<JobEvent>) {
        let report = job.cleanup();
        for path in report.removed {
            debug!("Cleaned up {}", path.display());
            send(events, JobEvent::CleanedUp { path });
        }
        for failure in report.failed {
            info!(
                "Could not remove transient file {}: {}",
                failure.path.display(),
                failure.reason
            );
            send(
                events,
                JobEvent::CleanupFailed {
                    path: failure.path,
                    reason: failure.reason,
                },
            );
        }
    }
}

/// A job running on its worker thread.
pub struct JobHandle {
    events: Receiver<JobEvent>,
    token: CancellationToken,
    worker: JoinHandle<ExecutionOutcome>,
}

impl JobHandle {
    /// Event stream of the run; ends after `Finished`.
    #[must_use]
    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Sets the stop flag.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Waits for the worker thread and returns the run's outcome.
    pub fn join(self) -> CoreResult<ExecutionOutcome> {
        self.worker.join().map_err(|_| CoreError::WorkerPanicked)
    }
}
