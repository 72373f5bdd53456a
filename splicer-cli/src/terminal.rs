// ============================================================================
// splicer-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Renders job events for a person watching the terminal. Normal mode echoes
// every ffmpeg line; quiet mode folds progress into a spinner; verbose mode
// also shows cleanup details.
//
// KEY COMPONENTS:
// - styling: symbols and section formatting
// - OutputMode: how much of the event stream to show
// - TerminalHandler: EventHandler that prints styled events
// - print_* helpers for dry runs, summaries and errors
//
// AI-ASSISTANT-INFO: Terminal UI components and styling for the CLI

use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use splicer_core::{EventHandler, ExecutionOutcome, JobEvent, PassSequence, format_elapsed};
use std::time::Duration;

// ============================================================================
// STYLING CONSTANTS
// ============================================================================

pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const PROCESSING_SYMBOL: &str = "»";
    pub const WARNING_SYMBOL: &str = "!";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const CANCEL_SYMBOL: &str = "■";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";

    pub const SPINNER_TEMPLATE: &str = "{spinner} {msg}";
    pub const SPINNER_TICK: std::time::Duration = std::time::Duration::from_millis(120);
}

// ============================================================================
// OUTPUT MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,
    Normal,
    Verbose,
}

impl OutputMode {
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => OutputMode::Quiet,
            (false, true) => OutputMode::Verbose,
            (false, false) => OutputMode::Normal,
        }
    }
}

fn is_progress_line(line: &str) -> bool {
    line.starts_with("frame=") || line.starts_with("size=")
}

fn section(title: &str) -> String {
    format!(
        "{}{}{}",
        styling::SECTION_PREFIX,
        title,
        styling::SECTION_SUFFIX
    )
}

// ============================================================================
// EVENT HANDLER
// ============================================================================

/// Prints job events to stdout with console styling.
pub struct TerminalHandler {
    mode: OutputMode,
    spinner: Option<ProgressBar>,
    term: Term,
}

impl TerminalHandler {
    pub fn new(mode: OutputMode) -> Self {
        let spinner = (mode == OutputMode::Quiet).then(|| {
            let style = ProgressStyle::with_template(styling::SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            let bar = ProgressBar::new_spinner().with_style(style);
            bar.enable_steady_tick(styling::SPINNER_TICK);
            bar
        });
        Self {
            mode,
            spinner,
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        match &self.spinner {
            Some(bar) => bar.println(text),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn status(&self, message: &str) {
        if let Some(bar) = &self.spinner {
            bar.set_message(message.to_string());
        }
    }

    fn finish_spinner(&self) {
        if let Some(bar) = &self.spinner {
            bar.finish_and_clear();
        }
    }
}

impl EventHandler for TerminalHandler {
    fn handle(&self, event: &JobEvent) {
        let bold = Style::new().bold();
        let dim = Style::new().dim();
        let cyan = Style::new().cyan();
        let yellow = Style::new().yellow();

        match event {
            JobEvent::JobStarted { .. } => {
                self.line(&cyan.bold().apply_to(section(&event.to_string())).to_string());
            }
            JobEvent::PassStarted { pass, total } => {
                self.status(&format!("Pass {pass} / {total}"));
                if self.mode != OutputMode::Quiet {
                    self.line(&format!(
                        "{} {}",
                        cyan.apply_to(styling::PROCESSING_SYMBOL),
                        bold.apply_to(event)
                    ));
                }
            }
            JobEvent::Command { command, .. } => {
                if self.mode != OutputMode::Quiet {
                    self.line(&format!("{}{}", styling::STATUS_INDENT, dim.apply_to(command)));
                }
            }
            JobEvent::Output { pass, line } => match self.mode {
                OutputMode::Quiet => {
                    if is_progress_line(line) {
                        self.status(&format!("Pass {pass}: {line}"));
                    }
                }
                OutputMode::Normal | OutputMode::Verbose => self.line(line),
            },
            JobEvent::Notice { message } => {
                self.line(&format!(
                    "{} {}",
                    yellow.apply_to(styling::WARNING_SYMBOL),
                    message
                ));
            }
            JobEvent::CleanedUp { .. } => {
                if self.mode == OutputMode::Verbose {
                    self.line(&dim.apply_to(event).to_string());
                }
            }
            JobEvent::CleanupFailed { .. } => {
                self.line(&format!(
                    "{} {}",
                    yellow.apply_to(styling::WARNING_SYMBOL),
                    event
                ));
            }
            JobEvent::Finished(_) => self.finish_spinner(),
        }
    }
}

// ============================================================================
// ONE-OFF OUTPUT
// ============================================================================

/// Prints a dry-run pass listing.
pub fn print_dry_run(passes: &PassSequence) {
    let term = Term::stdout();
    let bold = Style::new().bold();
    let _ = term.write_line(
        &Style::new()
            .cyan()
            .bold()
            .apply_to(section("Dry run"))
            .to_string(),
    );
    let total = passes.len();
    for (index, command) in passes.iter().enumerate() {
        let _ = term.write_line(&format!(
            "{} {}",
            bold.apply_to(format!("Pass {} / {total}:", index + 1)),
            command
        ));
    }
}

/// Prints the final one-line summary of a run.
pub fn print_summary(outcome: &ExecutionOutcome, elapsed: Duration) {
    let term = Term::stdout();
    let took = format_elapsed(elapsed);
    let text = match outcome {
        ExecutionOutcome::Success { .. } => format!(
            "{} {outcome} in {took}",
            Style::new().green().bold().apply_to(styling::SUCCESS_SYMBOL)
        ),
        ExecutionOutcome::Failure { .. } => format!(
            "{} {outcome} after {took}",
            Style::new().red().bold().apply_to(styling::ERROR_SYMBOL)
        ),
        ExecutionOutcome::Cancelled => format!(
            "{} Cancelled after {took}",
            Style::new().yellow().bold().apply_to(styling::CANCEL_SYMBOL)
        ),
    };
    let _ = term.write_line(&text);
}

pub fn print_success(message: &str) {
    let _ = Term::stdout().write_line(&format!(
        "{} {message}",
        Style::new().green().bold().apply_to(styling::SUCCESS_SYMBOL)
    ));
}

pub fn print_error(message: &str) {
    let _ = Term::stderr().write_line(&format!(
        "{} {}",
        Style::new().red().bold().apply_to(styling::ERROR_SYMBOL),
        Style::new().red().apply_to(format!("Error: {message}"))
    ));
}
