// ============================================================================
// splicer-core/src/jobs/transcode.rs
// ============================================================================
//
// TRANSCODE JOB: Re-encode a single input under a video/audio policy
//
// Pass layout:
//
//   copy / constant quality (one pass)
//     <base> -i IN <video> <audio> [-vf scale=..] OUT
//
//   two-pass average bitrate
//     pass 1: <base> -i IN <video> [-vf ..] -pass 1 -an -f null <sink>
//     pass 2: <base> -i IN <video> <audio> [-vf ..] -pass 2 OUT
//
// Pass 1 has no output path, so its filter sits before the null sink.
//
// In two-pass mode <video> also carries `-passlogfile <stats>/ffmpeg2pass-log`,
// where <stats> is a directory created for this job alone inside the work
// directory. Concurrent jobs sharing a work directory never see each other's
// statistics, and cleanup removes <stats> as a whole. Both passes use
// byte-identical video flags.

use std::path::{Path, PathBuf};

use super::policy::{AudioPolicy, VideoPolicy};
use super::{Artifact, JobState, PassSequence, TransientArtifacts};
use crate::command::{null_sink, path_token, CommandBuilder, CommandVector};
use crate::config::EngineSettings;
use crate::error::{CoreError, CoreResult};
use crate::filters::VideoFilterChain;
use crate::temp_files::create_kept_temp_dir;

/// Name prefix of the engine's two-pass statistics files.
pub const PASS_LOG_PREFIX: &str = "ffmpeg2pass-log";

/// Name prefix of the per-job statistics directory.
pub const STATS_DIR_PREFIX: &str = "splicer-2pass-";

#[derive(Debug, Clone)]
pub struct TranscodeJob {
    input: PathBuf,
    output: PathBuf,
    video: VideoPolicy,
    audio: AudioPolicy,
    scale: Option<String>,
    engine: EngineSettings,
    state: JobState,
}

impl TranscodeJob {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        video: VideoPolicy,
        audio: AudioPolicy,
        engine: EngineSettings,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            video,
            audio,
            scale: None,
            engine,
            state: JobState::default(),
        }
    }

    /// Sets the resize expression; blank expressions mean no resize.
    #[must_use]
    pub fn with_scale(mut self, scale: Option<String>) -> Self {
        self.scale = scale.filter(|s| !s.trim().is_empty());
        self
    }

    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    #[must_use]
    pub fn video(&self) -> &VideoPolicy {
        &self.video
    }

    #[must_use]
    pub fn audio(&self) -> &AudioPolicy {
        &self.audio
    }

    #[must_use]
    pub fn scale(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    /// Path prefix the engine uses for two-pass statistics; known once the
    /// passes of a two-pass job have been built.
    #[must_use]
    pub fn pass_log_base(&self) -> Option<PathBuf> {
        self.state.artifacts().entries().iter().find_map(|artifact| match artifact {
            Artifact::Dir(dir) => Some(dir.join(PASS_LOG_PREFIX)),
            Artifact::File(_) => None,
        })
    }

    pub(crate) fn state(&self) -> &JobState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    pub fn passes(&mut self) -> CoreResult<&PassSequence> {
        let plan = Plan {
            input: &self.input,
            output: &self.output,
            video: &self.video,
            audio: &self.audio,
            scale: self.scale.as_deref(),
            engine: &self.engine,
        };
        self.state.passes_or_build(|artifacts| plan.build(artifacts))
    }
}

/// Borrowed view of a transcode used while building passes.
struct Plan<'a> {
    input: &'a Path,
    output: &'a Path,
    video: &'a VideoPolicy,
    audio: &'a AudioPolicy,
    scale: Option<&'a str>,
    engine: &'a EngineSettings,
}

impl Plan<'_> {
    fn build(&self, artifacts: &mut TransientArtifacts) -> CoreResult<Vec<CommandVector>> {
        if self.video.is_copy() && self.scale.is_some() {
            return Err(CoreError::InvalidJob(
                "a scale filter cannot be applied while copying the video stream".to_string(),
            ));
        }

        let filter = self
            .scale
            .and_then(|expr| VideoFilterChain::new().add_scale(expr).build());
        let audio = self.audio.flags()?;
        let mut video = self.video.flags();

        if !self.video.is_two_pass() {
            let single = with_filter(self.base(&video).args(audio), filter.as_deref());
            return Ok(vec![single.output(self.output).build()]);
        }

        let stats = create_kept_temp_dir(&self.engine.work_dir, STATS_DIR_PREFIX)?;
        artifacts.track_dir(&stats);
        video.push("-passlogfile".to_string());
        video.push(path_token(&stats.join(PASS_LOG_PREFIX)));

        let first = with_filter(self.base(&video), filter.as_deref())
            .option("-pass", "1")
            .arg("-an")
            .option("-f", "null")
            .arg(null_sink())
            .build();

        let second = with_filter(self.base(&video).args(audio), filter.as_deref())
            .option("-pass", "2")
            .output(self.output)
            .build();

        Ok(vec![first, second])
    }

    fn base(&self, video: &[String]) -> CommandBuilder {
        CommandBuilder::new(self.engine)
            .input(self.input)
            .args(video.iter().cloned())
    }
}

fn with_filter(builder: CommandBuilder, filter: Option<&str>) -> CommandBuilder {
    match filter {
        Some(chain) => builder.option("-vf", chain),
        None => builder,
    }
}
