//! Configuration structures and constants for the splicer-core library.
//!
//! This module holds the settings that shape every command vector (engine
//! path, global flags, work directory for transient files), the fixed
//! normalization profile used by re-encode merges, and the timing knobs of the
//! executor.

mod builder;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Engine binary invoked for every pass.
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// How long a cancelled pass may take to exit after the graceful termination
/// request before it is killed.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// How often the executor re-checks the stop flag while waiting on output.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Target frame width for re-encode merges.
pub const DEFAULT_TARGET_WIDTH: u32 = 1920;

/// Target frame height for re-encode merges.
pub const DEFAULT_TARGET_HEIGHT: u32 = 1080;

/// Forced sample aspect ratio for re-encode merges.
pub const DEFAULT_TARGET_SAR: &str = "1";

/// Target audio sample rate (Hz) for re-encode merges.
pub const DEFAULT_TARGET_SAMPLE_RATE: u32 = 44_100;

/// Target channel layout for re-encode merges.
pub const DEFAULT_TARGET_CHANNEL_LAYOUT: &str = "stereo";

/// Output video codec for re-encode merges.
pub const DEFAULT_MERGE_VIDEO_CODEC: &str = "libx264";

/// Output speed preset for re-encode merges.
pub const DEFAULT_MERGE_PRESET: &str = "medium";

/// Output CRF for re-encode merges.
pub const DEFAULT_MERGE_CRF: u8 = 23;

/// Output audio codec for re-encode merges.
pub const DEFAULT_MERGE_AUDIO_CODEC: &str = "aac";

/// Output audio bitrate for re-encode merges.
pub const DEFAULT_MERGE_AUDIO_BITRATE: &str = "128k";

/// Stream-normalization targets and output encoding used by re-encode merges.
///
/// Every input is scaled to fit inside `width`x`height` (aspect preserved),
/// padded to exactly that frame, forced to `sar`, and its audio resampled to
/// `sample_rate` with `channel_layout` before concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeProfile {
    pub width: u32,
    pub height: u32,
    pub sar: String,
    pub sample_rate: u32,
    pub channel_layout: String,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for NormalizeProfile {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_WIDTH,
            height: DEFAULT_TARGET_HEIGHT,
            sar: DEFAULT_TARGET_SAR.to_string(),
            sample_rate: DEFAULT_TARGET_SAMPLE_RATE,
            channel_layout: DEFAULT_TARGET_CHANNEL_LAYOUT.to_string(),
            video_codec: DEFAULT_MERGE_VIDEO_CODEC.to_string(),
            preset: DEFAULT_MERGE_PRESET.to_string(),
            crf: DEFAULT_MERGE_CRF,
            audio_codec: DEFAULT_MERGE_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_MERGE_AUDIO_BITRATE.to_string(),
        }
    }
}

impl NormalizeProfile {
    pub fn validate(&self) -> CoreResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::Config(format!(
                "normalize target frame must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.sample_rate == 0 {
            return Err(CoreError::Config(
                "normalize sample rate must be non-zero".to_string(),
            ));
        }
        if self.channel_layout.trim().is_empty() {
            return Err(CoreError::Config(
                "normalize channel layout must not be empty".to_string(),
            ));
        }
        if self.sar.trim().is_empty() {
            return Err(CoreError::Config(
                "normalize sample aspect ratio must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings every job needs to assemble its command vectors.
///
/// Derived from [`CoreConfig::engine_settings`]; jobs never see the rest of
/// the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// First token of every command vector.
    pub program: String,
    /// Adds `-hide_banner`.
    pub hide_banner: bool,
    /// Adds `-y`.
    pub overwrite: bool,
    /// Where list files and two-pass statistics are written.
    pub work_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        CoreConfig::default().engine_settings()
    }
}

/// Main configuration structure for the splicer-core library.
///
/// Created by the front end (e.g. splicer-cli), validated, and then used to
/// derive [`EngineSettings`] for jobs and [`ExecutorSettings`](crate::executor::ExecutorSettings)
/// for the executor.
///
/// # Examples
///
/// ```rust
/// use splicer_core::config::CoreConfigBuilder;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path("/usr/local/bin/ffmpeg")
///     .grace_period(Duration::from_secs(10))
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Engine binary (name on PATH or absolute path)
    pub ffmpeg_path: String,

    /// Work directory for transient files (defaults to the system temp directory)
    pub temp_dir: Option<PathBuf>,

    /// Pass `-hide_banner` to every invocation
    pub hide_banner: bool,

    /// Pass `-y` so existing outputs are overwritten without prompting
    pub overwrite: bool,

    /// Time allowed for a cancelled pass to exit before it is killed
    pub grace_period: Duration,

    /// Stop-flag polling interval while waiting on output or exit
    pub poll_interval: Duration,

    /// Targets for re-encode merges
    pub normalize: NormalizeProfile,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            temp_dir: None,
            hide_banner: true,
            overwrite: true,
            grace_period: DEFAULT_GRACE_PERIOD,
            poll_interval: DEFAULT_POLL_INTERVAL,
            normalize: NormalizeProfile::default(),
        }
    }
}

impl CoreConfig {
    /// Checks the configuration for values that would produce unusable commands.
    pub fn validate(&self) -> CoreResult<()> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(CoreError::Config("ffmpeg path must not be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.temp_dir {
            if dir.as_os_str().is_empty() {
                return Err(CoreError::Config("temp directory must not be empty".to_string()));
            }
        }
        self.normalize.validate()
    }

    /// Directory for list files and two-pass statistics.
    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            program: self.ffmpeg_path.clone(),
            hide_banner: self.hide_banner,
            overwrite: self.overwrite,
            work_dir: self.work_dir(),
        }
    }
}
