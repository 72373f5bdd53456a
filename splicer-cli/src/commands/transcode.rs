//! Implementation of the 'transcode' subcommand.
//!
//! Maps the flat command-line choices onto the core's video and audio
//! policies. Range and codec/mode compatibility checks are left to
//! [`JobDescriptor::validate`] so `run` and `transcode` reject the same things.

use super::{Completion, RunContext, execute};
use crate::cli::{AudioCodecArg, AudioMode, TranscodeArgs, VideoCodecArg, VideoMode};
use crate::error::{CliErrorContext, CliResult};

use log::info;
use splicer_core::{
    AudioCodec, AudioPolicy, AudioRate, Bitrate, JobDescriptor, VideoCodec, VideoPolicy,
};

pub fn video_policy(args: &TranscodeArgs) -> CliResult<VideoPolicy> {
    let codec = match args.video_codec {
        VideoCodecArg::Copy => return Ok(VideoPolicy::Copy),
        VideoCodecArg::Libx264 => VideoCodec::Libx264,
        VideoCodecArg::Libx265 => VideoCodec::Libx265,
    };
    Ok(match args.video_mode {
        VideoMode::Crf => VideoPolicy::ConstantQuality {
            codec,
            crf: args.crf,
            preset: args.preset,
        },
        VideoMode::TwoPass => VideoPolicy::TwoPass {
            codec,
            bitrate: Bitrate::new(args.bitrate.as_str()).cli_context("--bitrate")?,
            preset: args.preset,
        },
    })
}

pub fn audio_policy(args: &TranscodeArgs) -> CliResult<AudioPolicy> {
    let codec = match args.audio_codec {
        AudioCodecArg::Copy => return Ok(AudioPolicy::Copy),
        AudioCodecArg::Aac => AudioCodec::Aac,
        AudioCodecArg::Libmp3lame => AudioCodec::Libmp3lame,
    };
    let rate = match args.audio_mode {
        AudioMode::Abr => AudioRate::Average(
            Bitrate::new(args.audio_bitrate.as_str()).cli_context("--audio-bitrate")?,
        ),
        AudioMode::Vbr => AudioRate::Quality(args.audio_quality),
    };
    Ok(AudioPolicy::Encode { codec, rate })
}

pub fn transcode_descriptor(args: TranscodeArgs) -> CliResult<JobDescriptor> {
    let video = video_policy(&args)?;
    let audio = audio_policy(&args)?;
    Ok(JobDescriptor::Transcode {
        input: args.input,
        output: args.output,
        video,
        audio,
        scale: args.scale,
    })
}

pub fn run_transcode(args: TranscodeArgs, ctx: &RunContext) -> CliResult<Completion> {
    info!(
        "Transcoding {} -> {}",
        args.input.display(),
        args.output.display()
    );
    let descriptor = transcode_descriptor(args)?;
    execute(descriptor, ctx).cli_context("Transcode failed")
}
