//! Fast merge: concat demuxer with stream copy.
//!
//! The inputs are listed in a transient text file that the engine reads with
//! `-f concat -safe 0`. Nothing is re-encoded, so the inputs must already share
//! codecs and parameters; no compatibility check is made.
//!
//! The engine resolves relative list entries against the list file's own
//! directory (the work directory), so every entry is written in absolute form.

use log::debug;
use std::path::{Path, PathBuf};

use super::{JobState, PassSequence, TransientArtifacts};
use crate::command::{CommandBuilder, CommandVector};
use crate::config::EngineSettings;
use crate::error::CoreResult;
use crate::temp_files::write_kept_temp_file;
use crate::utils::absolute_path;

/// Name prefix of generated list files.
pub const LIST_FILE_PREFIX: &str = "splicer-concat-";

/// Renders one list file line: `file '<path>'` with `/` separators and
/// embedded single quotes escaped as `'\''`.
#[must_use]
pub fn list_line(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let normalized = if std::path::MAIN_SEPARATOR == '/' {
        raw.into_owned()
    } else {
        raw.replace(std::path::MAIN_SEPARATOR, "/")
    };
    format!("file '{}'", normalized.replace('\'', "'\\''"))
}

/// Full list file contents, one line per input in input order.
#[must_use]
pub fn list_contents(inputs: &[PathBuf]) -> String {
    let mut contents = String::new();
    for input in inputs {
        contents.push_str(&list_line(input));
        contents.push('\n');
    }
    contents
}

#[derive(Debug, Clone)]
pub struct ConcatCopyJob {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    engine: EngineSettings,
    state: JobState,
}

impl ConcatCopyJob {
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>, engine: EngineSettings) -> Self {
        Self {
            inputs,
            output: output.into(),
            engine,
            state: JobState::default(),
        }
    }

    #[must_use]
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub(crate) fn state(&self) -> &JobState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    pub fn passes(&mut self) -> CoreResult<&PassSequence> {
        let (inputs, output, engine) = (&self.inputs, &self.output, &self.engine);
        self.state
            .passes_or_build(|artifacts| build_passes(inputs, output, engine, artifacts))
    }
}

fn build_passes(
    inputs: &[PathBuf],
    output: &Path,
    engine: &EngineSettings,
    artifacts: &mut TransientArtifacts,
) -> CoreResult<Vec<CommandVector>> {
    let entries: Vec<PathBuf> = inputs.iter().map(|input| absolute_path(input)).collect();
    let list = write_kept_temp_file(
        &engine.work_dir,
        LIST_FILE_PREFIX,
        "txt",
        &list_contents(&entries),
    )?;
    artifacts.track_file(&list);
    debug!("Wrote concat list {} ({} inputs)", list.display(), inputs.len());

    let command = CommandBuilder::new(engine)
        .option("-f", "concat")
        .option("-safe", "0")
        .input(&list)
        .option("-c", "copy")
        .output(output)
        .build();

    Ok(vec![command])
}
