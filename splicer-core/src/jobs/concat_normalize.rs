//! Re-encode merge: normalize every input, then concatenate in one filter graph.
//!
//! Inputs may differ in resolution, aspect ratio, sample rate or channel
//! layout. Each one is fitted into the target frame (letterboxed or
//! pillarboxed, never stretched), forced to the target sample aspect ratio and
//! resampled, so the concat filter sees identical streams.

use std::path::{Path, PathBuf};

use super::{JobState, PassSequence, TransientArtifacts};
use crate::command::{CommandBuilder, CommandVector};
use crate::config::{EngineSettings, NormalizeProfile};
use crate::error::CoreResult;
use crate::filters::{label, FilterGraph, FilterStep};

/// Builds the normalize-and-concat graph for `count` inputs.
///
/// Produces `2 * count + 1` steps: a video and an audio step per input, then
/// one concat step over `[v0][a0][v1][a1]...` yielding `[v][a]`.
#[must_use]
pub fn normalize_graph(count: usize, profile: &NormalizeProfile) -> FilterGraph {
    let (w, h) = (profile.width, profile.height);
    let mut graph = FilterGraph::new();
    let mut concat = FilterStep::new();

    for i in 0..count {
        graph.push(
            FilterStep::new()
                .input(format!("{i}:v"))
                .filter(format!("scale={w}:{h}:force_original_aspect_ratio=decrease"))
                .filter(format!("pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"))
                .filter(format!("setsar={}", profile.sar))
                .output(format!("v{i}")),
        );
        graph.push(
            FilterStep::new()
                .input(format!("{i}:a"))
                .filter(format!(
                    "aformat=sample_rates={}:channel_layouts={}",
                    profile.sample_rate, profile.channel_layout
                ))
                .output(format!("a{i}")),
        );
        concat = concat.input(format!("v{i}")).input(format!("a{i}"));
    }

    graph.push(
        concat
            .filter(format!("concat=n={count}:v=1:a=1"))
            .output("v")
            .output("a"),
    );
    graph
}

#[derive(Debug, Clone)]
pub struct ConcatNormalizeJob {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    profile: NormalizeProfile,
    engine: EngineSettings,
    state: JobState,
}

impl ConcatNormalizeJob {
    pub fn new(
        inputs: Vec<PathBuf>,
        output: impl Into<PathBuf>,
        profile: NormalizeProfile,
        engine: EngineSettings,
    ) -> Self {
        Self {
            inputs,
            output: output.into(),
            profile,
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

    #[must_use]
    pub fn profile(&self) -> &NormalizeProfile {
        &self.profile
    }

    pub(crate) fn state(&self) -> &JobState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    pub fn passes(&mut self) -> CoreResult<&PassSequence> {
        let (inputs, output, profile, engine) =
            (&self.inputs, &self.output, &self.profile, &self.engine);
        self.state
            .passes_or_build(|artifacts| build_passes(inputs, output, profile, engine, artifacts))
    }
}

fn build_passes(
    inputs: &[PathBuf],
    output: &Path,
    profile: &NormalizeProfile,
    engine: &EngineSettings,
    _artifacts: &mut TransientArtifacts,
) -> CoreResult<Vec<CommandVector>> {
    let mut builder = CommandBuilder::new(engine);
    for input in inputs {
        builder = builder.input(input);
    }

    let graph = normalize_graph(inputs.len(), profile);
    let command = builder
        .option("-filter_complex", graph.build())
        .option("-map", label("v"))
        .option("-map", label("a"))
        .option("-c:v", profile.video_codec.clone())
        .option("-preset", profile.preset.clone())
        .option("-crf", profile.crf.to_string())
        .option("-c:a", profile.audio_codec.clone())
        .option("-b:a", profile.audio_bitrate.clone())
        .output(output)
        .build();

    Ok(vec![command])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_input_graph() {
        let graph = normalize_graph(2, &NormalizeProfile::default());
        assert_eq!(
            graph.build(),
            "[0:v]scale=1920:1080:force_original_aspect_ratio=decrease,\
             pad=1920:1080:(ow-iw)/2:(oh-ih)/2,setsar=1[v0];\
             [0:a]aformat=sample_rates=44100:channel_layouts=stereo[a0];\
             [1:v]scale=1920:1080:force_original_aspect_ratio=decrease,\
             pad=1920:1080:(ow-iw)/2:(oh-ih)/2,setsar=1[v1];\
             [1:a]aformat=sample_rates=44100:channel_layouts=stereo[a1];\
             [v0][a0][v1][a1]concat=n=2:v=1:a=1[v][a]"
        );
    }

    #[test]
    fn test_concat_labels_interleave_for_any_count() {
        for n in 2..=8 {
            let graph = normalize_graph(n, &NormalizeProfile::default());
            assert_eq!(graph.step_count(), 2 * n + 1);

            let concat = graph.steps().last().unwrap();
            let expected: Vec<String> = (0..n)
                .flat_map(|i| [format!("v{i}"), format!("a{i}")])
                .collect();
            assert_eq!(concat.inputs(), expected.as_slice());
            assert_eq!(concat.outputs(), ["v", "a"]);
            assert!(concat.to_string().contains(&format!("concat=n={n}:v=1:a=1")));
        }
    }

    #[test]
    fn test_custom_profile() {
        let profile = NormalizeProfile {
            width: 1280,
            height: 720,
            sample_rate: 48_000,
            channel_layout: "mono".to_string(),
            ..Default::default()
        };
        let graph = normalize_graph(2, &profile).build();
        assert!(graph.contains("scale=1280:720:force_original_aspect_ratio=decrease"));
        assert!(graph.contains("pad=1280:720:(ow-iw)/2:(oh-ih)/2"));
        assert!(graph.contains("aformat=sample_rates=48000:channel_layouts=mono"));
    }

    #[test]
    fn test_command_layout() {
        let inputs = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mov")];
        let mut job = ConcatNormalizeJob::new(
            inputs,
            "merged.mp4",
            NormalizeProfile::default(),
            EngineSettings::default(),
        );
        let passes = job.passes().unwrap().clone();
        assert_eq!(passes.len(), 1);

        let cmd = &passes[0];
        assert!(cmd.contains_sequence(&["-i", "a.mp4", "-i", "b.mov", "-filter_complex"]));
        assert!(cmd.contains_sequence(&["-map", "[v]", "-map", "[a]"]));
        assert!(cmd.contains_sequence(&[
            "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-c:a", "aac", "-b:a", "128k",
            "merged.mp4"
        ]));
        assert!(job.state().artifacts().is_empty());
    }
}
