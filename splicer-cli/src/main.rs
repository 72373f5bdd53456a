// ============================================================================
// splicer-cli/src/main.rs
// ============================================================================
//
// SPLICER CLI: Entry point
//
// Parses arguments, runs the selected command and turns the result into an
// exit code: 0 on success, 1 on failure, 130 when the job was cancelled.
//
// AI-ASSISTANT-INFO: Binary entry point for the splicer command

use clap::Parser;
use splicer_cli::{Cli, terminal};
use std::process;

fn main() {
    let cli = Cli::parse();

    let code = match splicer_cli::run(cli) {
        Ok(completion) => completion.exit_code(),
        Err(e) => {
            log::error!("{e}");
            terminal::print_error(&e.to_string());
            1
        }
    };

    process::exit(code);
}
