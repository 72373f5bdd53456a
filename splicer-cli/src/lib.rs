// splicer-cli/src/lib.rs
//
// Library portion of the Splicer CLI application.
// Contains argument definitions and command logic so integration tests and
// the binary share them.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod platform;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, GlobalArgs, MergeArgs, RunArgs, TranscodeArgs};
pub use commands::{Completion, RunContext};
pub use error::{CliErrorContext, CliResult};

/// Runs one parsed command line and reports how it ended.
pub fn run(cli: Cli) -> CliResult<Completion> {
    let log_path = logging::init_logging(cli.global.verbose, cli.global.log_file.as_deref())?;
    if let Some(path) = &log_path {
        log::debug!("Logging to {}", path.display());
    }

    let ctx = RunContext::from_global(&cli.global, log_path.is_some())?;
    match cli.command {
        Commands::Merge(args) => commands::merge::run_merge(args, &ctx),
        Commands::Transcode(args) => commands::transcode::run_transcode(args, &ctx),
        Commands::Run(args) => commands::run::run_job_file(args, &ctx),
        Commands::Check => commands::check::run_check(&ctx),
    }
}
