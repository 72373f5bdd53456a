//! Implementation of the 'merge' subcommand.

use super::{Completion, RunContext, execute};
use crate::cli::{MergeArgs, MergeMode};
use crate::error::{CliErrorContext, CliResult};

use log::info;
use splicer_core::JobDescriptor;

#[must_use]
pub fn merge_descriptor(args: MergeArgs) -> JobDescriptor {
    let MergeArgs {
        inputs,
        output,
        mode,
    } = args;
    match mode {
        MergeMode::Copy => JobDescriptor::ConcatCopy { inputs, output },
        MergeMode::Normalize => JobDescriptor::ConcatNormalize { inputs, output },
    }
}

pub fn run_merge(args: MergeArgs, ctx: &RunContext) -> CliResult<Completion> {
    info!(
        "Merging {} file(s) into {} ({:?} mode)",
        args.inputs.len(),
        args.output.display(),
        args.mode
    );
    execute(merge_descriptor(args), ctx).cli_context("Merge failed")
}
