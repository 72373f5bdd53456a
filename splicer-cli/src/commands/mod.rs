//! Command implementations for the CLI.
//!
//! Each submodule turns one subcommand's arguments into a
//! [`JobDescriptor`] (or, for `check`, a dependency probe). Running the job is
//! shared: [`execute`] wires the event handlers, Ctrl-C and the executor.

pub mod check;
pub mod merge;
pub mod run;
pub mod transcode;

use crate::cli::GlobalArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::platform;
use crate::terminal::{self, OutputMode, TerminalHandler};

use log::{debug, info, warn};
use splicer_core::file_logging::FileLoggingHandler;
use splicer_core::{
    CancellationToken, CoreConfig, CoreConfigBuilder, EventDispatcher, ExecutionOutcome, Executor,
    ExecutorSettings, JobDescriptor, JsonEventHandler,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a command ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    Failed,
    Cancelled,
}

impl Completion {
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Completion::Done => 0,
            Completion::Failed => 1,
            Completion::Cancelled => 130,
        }
    }
}

impl From<&ExecutionOutcome> for Completion {
    fn from(outcome: &ExecutionOutcome) -> Self {
        match outcome {
            ExecutionOutcome::Success { .. } => Completion::Done,
            ExecutionOutcome::Failure { .. } => Completion::Failed,
            ExecutionOutcome::Cancelled => Completion::Cancelled,
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: CoreConfig,
    pub dry_run: bool,
    pub json: bool,
    pub mode: OutputMode,
    pub file_logging: bool,
}

impl RunContext {
    pub fn from_global(global: &GlobalArgs, file_logging: bool) -> CliResult<Self> {
        Ok(Self {
            config: build_config(global)?,
            dry_run: global.dry_run,
            json: global.json,
            mode: OutputMode::from_flags(global.quiet, global.verbose),
            file_logging,
        })
    }
}

/// Builds and validates the core configuration from the global options.
pub fn build_config(global: &GlobalArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new();
    if let Some(ffmpeg) = &global.ffmpeg {
        builder = builder.ffmpeg_path(ffmpeg.clone());
    }
    if let Some(dir) = &global.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    if let Some(secs) = global.grace_period {
        builder = builder.grace_period(Duration::from_secs(secs));
    }
    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Builds the job for `descriptor` and either lists its passes (dry run) or
/// runs it to completion.
pub fn execute(descriptor: JobDescriptor, ctx: &RunContext) -> CliResult<Completion> {
    if ctx.dry_run {
        return dry_run(descriptor, ctx);
    }

    for input in descriptor.inputs() {
        if !input.exists() {
            warn!("Input {} does not exist", input.display());
        }
    }

    let work_dir = ctx.config.work_dir();
    std::fs::create_dir_all(&work_dir)
        .cli_with_context(|| format!("Creating work directory {}", work_dir.display()))?;

    let job = descriptor.into_job(&ctx.config)?;
    info!("Running {} job -> {}", job.kind(), job.output_path().display());

    let token = CancellationToken::new();
    if !platform::install_interrupt_handler(&token)? {
        debug!("Ctrl-C will not cancel this job");
    }

    let mut dispatcher = EventDispatcher::new();
    if ctx.json {
        dispatcher.add_handler(Arc::new(JsonEventHandler::new()));
    } else {
        dispatcher.add_handler(Arc::new(TerminalHandler::new(ctx.mode)));
    }
    if ctx.file_logging {
        dispatcher.add_handler(Arc::new(FileLoggingHandler::new()));
    }

    let started = Instant::now();
    let handle = Executor::system(ExecutorSettings::from(&ctx.config))
        .spawn_with_token(job, token)?;
    if dispatcher.drain(handle.events()).is_none() {
        warn!("Event stream closed before the job finished");
    }
    let outcome = handle.join()?;

    if !ctx.json {
        terminal::print_summary(&outcome, started.elapsed());
    }
    Ok(Completion::from(&outcome))
}

fn dry_run(descriptor: JobDescriptor, ctx: &RunContext) -> CliResult<Completion> {
    let mut job = descriptor.into_job(&ctx.config)?;
    {
        let passes = job.passes()?;
        if ctx.json {
            let total = passes.len();
            for (index, command) in passes.iter().enumerate() {
                let line = serde_json::json!({
                    "type": "dry_run",
                    "pass": index + 1,
                    "total": total,
                    "command": command,
                });
                println!("{line}");
            }
        } else {
            terminal::print_dry_run(passes);
        }
    }

    let report = job.cleanup();
    for failure in &report.failed {
        warn!("Could not remove {}: {}", failure.path.display(), failure.reason);
    }
    Ok(Completion::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Completion::Done.exit_code(), 0);
        assert_eq!(Completion::Failed.exit_code(), 1);
        assert_eq!(Completion::Cancelled.exit_code(), 130);

        let failed = ExecutionOutcome::Failure {
            pass: Some(1),
            reason: splicer_core::FailureReason::ExitCode(1),
        };
        assert_eq!(Completion::from(&failed), Completion::Failed);
        assert_eq!(
            Completion::from(&ExecutionOutcome::Cancelled),
            Completion::Cancelled
        );
    }

    #[test]
    fn test_build_config_applies_overrides() {
        let global = GlobalArgs {
            ffmpeg: Some("/opt/ffmpeg/bin/ffmpeg".to_string()),
            temp_dir: Some(PathBuf::from("/var/tmp/splicer")),
            grace_period: Some(2),
            ..GlobalArgs::default()
        };
        let config = build_config(&global).unwrap();
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp/splicer")));
        assert_eq!(config.grace_period, Duration::from_secs(2));
    }

    #[test]
    fn test_dry_run_removes_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            temp_dir: Some(dir.path().to_path_buf()),
            dry_run: true,
            json: true,
            ..GlobalArgs::default()
        };
        let ctx = RunContext::from_global(&global, false).unwrap();
        let descriptor = JobDescriptor::ConcatCopy {
            inputs: vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
            output: PathBuf::from("out.mp4"),
        };

        assert_eq!(execute(descriptor, &ctx).unwrap(), Completion::Done);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
