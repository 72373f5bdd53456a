// ============================================================================
// splicer-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE INTERFACE: Argument Definitions
//
// Defines the command-line argument structures using clap.
//
// KEY COMPONENTS:
// - Cli: top-level parser with global options
// - Commands: merge, transcode, run, check
// - Value enums for the choices a user picks from
//
// AI-ASSISTANT-INFO: clap derive definitions for the splicer binary

use clap::{Args, Parser, Subcommand, ValueEnum};
use splicer_core::jobs::policy::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_CRF, DEFAULT_MP3_QUALITY, DEFAULT_VIDEO_BITRATE, MAX_CRF,
    MAX_MP3_QUALITY,
};
use splicer_core::{CoreError, Preset};
use std::path::PathBuf;

// ============================================================================
// TOP LEVEL
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Splicer: merge and transcode media with ffmpeg",
    long_about = "Builds ffmpeg command sequences for merging and transcoding, runs them one \
                  pass at a time, and cleans up temporary files afterwards."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// ffmpeg executable to run
    #[arg(long, global = true, value_name = "PATH", env = "SPLICER_FFMPEG")]
    pub ffmpeg: Option<String>,

    /// Directory for concat lists and two-pass statistics
    #[arg(long, global = true, value_name = "DIR", env = "SPLICER_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Seconds to wait for ffmpeg to exit after a cancel before killing it
    #[arg(long, global = true, value_name = "SECS")]
    pub grace_period: Option<u64>,

    /// Print the ffmpeg commands without running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Emit events as JSON lines on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Show a spinner instead of raw ffmpeg output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show commands, cleanup details and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write a log file (a directory gets a timestamped file inside it)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge two or more files into one
    Merge(MergeArgs),
    /// Re-encode one file with a chosen video and audio policy
    Transcode(TranscodeArgs),
    /// Run a job described in a JSON file
    Run(RunArgs),
    /// Check that ffmpeg can be started
    Check,
}

// ============================================================================
// MERGE
// ============================================================================

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Stream copy through the concat demuxer (inputs must share codecs)
    #[default]
    Copy,
    /// Re-encode every input to a common format first
    Normalize,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Files to merge, in order
    #[arg(required = true, num_args = 2.., value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Merged output file
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = MergeMode::Copy)]
    pub mode: MergeMode,
}

// ============================================================================
// TRANSCODE
// ============================================================================

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodecArg {
    Libx264,
    Libx265,
    Copy,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    /// Constant quality, one pass
    Crf,
    /// Average bitrate, two passes
    TwoPass,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodecArg {
    Aac,
    Libmp3lame,
    Copy,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Average bitrate (--audio-bitrate)
    Abr,
    /// Quality index (--audio-quality), libmp3lame only
    Vbr,
}

fn parse_preset(value: &str) -> Result<Preset, String> {
    value.parse().map_err(|e: CoreError| e.to_string())
}

#[derive(Args, Debug)]
pub struct TranscodeArgs {
    #[arg(short, long, value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = VideoCodecArg::Libx264)]
    pub video_codec: VideoCodecArg,

    #[arg(long, value_enum, default_value_t = VideoMode::Crf)]
    pub video_mode: VideoMode,

    /// CRF value for --video-mode crf
    #[arg(long, default_value_t = DEFAULT_CRF,
          value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_CRF)))]
    pub crf: u8,

    /// Target bitrate for --video-mode two-pass (e.g. 5000k)
    #[arg(long, default_value = DEFAULT_VIDEO_BITRATE)]
    pub bitrate: String,

    /// Encoder speed preset (ultrafast ... veryslow)
    #[arg(long, default_value = "medium", value_parser = parse_preset)]
    pub preset: Preset,

    #[arg(long, value_enum, default_value_t = AudioCodecArg::Aac)]
    pub audio_codec: AudioCodecArg,

    #[arg(long, value_enum, default_value_t = AudioMode::Abr)]
    pub audio_mode: AudioMode,

    #[arg(long, default_value = DEFAULT_AUDIO_BITRATE)]
    pub audio_bitrate: String,

    #[arg(long, default_value_t = DEFAULT_MP3_QUALITY,
          value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_MP3_QUALITY)))]
    pub audio_quality: u8,

    /// Scale expression passed to the scale filter (e.g. 1280:-2)
    #[arg(long, value_name = "EXPR")]
    pub scale: Option<String>,
}

// ============================================================================
// RUN
// ============================================================================

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON job descriptor
    #[arg(value_name = "JOB_FILE")]
    pub job_file: PathBuf,
}
