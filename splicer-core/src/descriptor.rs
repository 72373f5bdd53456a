//! Caller-side job descriptions.
//!
//! A [`JobDescriptor`] is what a front end produces from user input: plain
//! data, serializable to and from JSON. All configuration checks happen here,
//! before a [`Job`] exists; the jobs themselves trust their parameters.
//!
//! ```json
//! { "kind": "transcode", "input": "in.mkv", "output": "out.mp4",
//!   "video": { "mode": "two-pass", "codec": "libx264", "bitrate": "5000k" },
//!   "audio": { "mode": "encode", "codec": "aac", "rate": { "average": "128k" } } }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::jobs::policy::{AudioPolicy, AudioRate, VideoPolicy, MAX_CRF};
use crate::jobs::{ConcatCopyJob, ConcatNormalizeJob, Job, JobKind, TranscodeJob};
use crate::utils::absolute_path;

/// Minimum number of inputs for a merge.
pub const MIN_MERGE_INPUTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum JobDescriptor {
    ConcatCopy {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    ConcatNormalize {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    Transcode {
        input: PathBuf,
        output: PathBuf,
        video: VideoPolicy,
        audio: AudioPolicy,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<String>,
    },
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty()
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidJob(message.into())
}

impl JobDescriptor {
    /// Reads a descriptor from a JSON file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn kind(&self) -> JobKind {
        match self {
            JobDescriptor::ConcatCopy { .. } => JobKind::ConcatCopy,
            JobDescriptor::ConcatNormalize { .. } => JobKind::ConcatNormalize,
            JobDescriptor::Transcode { .. } => JobKind::Transcode,
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        match self {
            JobDescriptor::ConcatCopy { output, .. }
            | JobDescriptor::ConcatNormalize { output, .. }
            | JobDescriptor::Transcode { output, .. } => output,
        }
    }

    #[must_use]
    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            JobDescriptor::ConcatCopy { inputs, .. }
            | JobDescriptor::ConcatNormalize { inputs, .. } => {
                inputs.iter().map(PathBuf::as_path).collect()
            }
            JobDescriptor::Transcode { input, .. } => vec![input.as_path()],
        }
    }

    /// Configuration checks a caller must pass before building a job.
    pub fn validate(&self) -> CoreResult<()> {
        if is_blank(self.output()) {
            return Err(invalid("output path must not be empty"));
        }

        match self {
            JobDescriptor::ConcatCopy { inputs, .. }
            | JobDescriptor::ConcatNormalize { inputs, .. } => {
                if inputs.len() < MIN_MERGE_INPUTS {
                    return Err(invalid(format!(
                        "a merge needs at least {MIN_MERGE_INPUTS} inputs, got {}",
                        inputs.len()
                    )));
                }
                if inputs.iter().any(|p| is_blank(p)) {
                    return Err(invalid("input paths must not be empty"));
                }
            }
            JobDescriptor::Transcode {
                input,
                video,
                audio,
                scale,
                ..
            } => {
                if is_blank(input) {
                    return Err(invalid("an input file is required"));
                }
                validate_video(video)?;
                validate_audio(audio)?;
                let has_scale = scale.as_deref().is_some_and(|s| !s.trim().is_empty());
                if has_scale && video.is_copy() {
                    return Err(invalid(
                        "scaling requires re-encoding; choose a video codec instead of copy",
                    ));
                }
            }
        }

        let output = absolute_path(self.output());
        if self.inputs().iter().any(|input| absolute_path(input) == output) {
            return Err(invalid(format!(
                "output {} is also an input",
                self.output().display()
            )));
        }
        Ok(())
    }

    /// Validates, then constructs the job.
    pub fn into_job(self, config: &CoreConfig) -> CoreResult<Job> {
        self.validate()?;
        let engine = config.engine_settings();
        debug!("Building {} job for {}", self.kind(), self.output().display());

        let job = match self {
            JobDescriptor::ConcatCopy { inputs, output } => {
                ConcatCopyJob::new(inputs, output, engine).into()
            }
            JobDescriptor::ConcatNormalize { inputs, output } => {
                ConcatNormalizeJob::new(inputs, output, config.normalize.clone(), engine).into()
            }
            JobDescriptor::Transcode {
                input,
                output,
                video,
                audio,
                scale,
            } => TranscodeJob::new(input, output, video, audio, engine)
                .with_scale(scale)
                .into(),
        };
        Ok(job)
    }
}

fn validate_video(video: &VideoPolicy) -> CoreResult<()> {
    if let VideoPolicy::ConstantQuality { crf, .. } = video {
        if *crf > MAX_CRF {
            return Err(invalid(format!("CRF must be between 0 and {MAX_CRF}, got {crf}")));
        }
    }
    Ok(())
}

fn validate_audio(audio: &AudioPolicy) -> CoreResult<()> {
    if let AudioPolicy::Encode {
        codec,
        rate: AudioRate::Quality(q),
    } = audio
    {
        let Some(max) = codec.max_quality() else {
            return Err(invalid(format!(
                "{codec} has no quality mode; use an average bitrate"
            )));
        };
        if *q > max {
            return Err(invalid(format!(
                "{codec} quality must be between 0 and {max}, got {q}"
            )));
        }
    }
    Ok(())
}
