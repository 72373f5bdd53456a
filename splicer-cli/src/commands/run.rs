//! Implementation of the 'run' subcommand: execute a JSON job descriptor.

use super::{Completion, RunContext, execute};
use crate::cli::RunArgs;
use crate::error::{CliErrorContext, CliResult};

use log::info;
use splicer_core::JobDescriptor;

pub fn run_job_file(args: RunArgs, ctx: &RunContext) -> CliResult<Completion> {
    let descriptor = JobDescriptor::from_json_file(&args.job_file)
        .cli_with_context(|| format!("Reading job file {}", args.job_file.display()))?;
    info!(
        "Loaded {} job from {}",
        descriptor.kind(),
        args.job_file.display()
    );
    execute(descriptor, ctx).cli_with_context(|| format!("Job {} failed", args.job_file.display()))
}
