//! Implementation of the 'check' subcommand.

use super::{Completion, RunContext};
use crate::error::CliResult;
use crate::terminal;

use splicer_core::check_dependency;

pub fn run_check(ctx: &RunContext) -> CliResult<Completion> {
    let program = &ctx.config.ffmpeg_path;
    let banner = check_dependency(program)?;

    if ctx.json {
        let line = serde_json::json!({
            "type": "check",
            "program": program,
            "version": banner,
        });
        println!("{line}");
    } else if banner.is_empty() {
        terminal::print_success(&format!("{program} is available"));
    } else {
        terminal::print_success(&banner);
    }
    Ok(Completion::Done)
}
