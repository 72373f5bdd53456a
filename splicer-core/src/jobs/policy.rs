// ============================================================================
// splicer-core/src/jobs/policy.rs
// ============================================================================
//
// TRANSCODE POLICIES: Video and audio rate-control choices
//
// KEY COMPONENTS:
// - VideoPolicy: stream copy, constant quality (CRF) or two-pass average bitrate
// - AudioPolicy / AudioRate: stream copy or encode with codec-specific rate control
// - VideoCodec, AudioCodec, Preset: closed sets of supported values
// - Bitrate: validated engine bitrate string ("5000k", "2M", "128000")
//
// Each policy knows how to render its own engine flags. Range checks that
// belong to the caller (CRF bounds, quality bounds) live in the descriptor
// module; the checks here only refuse combinations that cannot be expressed
// as flags at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Highest CRF accepted by the x264/x265 encoders.
pub const MAX_CRF: u8 = 51;

/// Highest LAME VBR quality index (0 is best).
pub const MAX_MP3_QUALITY: u8 = 9;

/// Default CRF offered to callers.
pub const DEFAULT_CRF: u8 = 23;

/// Default video bitrate offered to callers for two-pass encodes.
pub const DEFAULT_VIDEO_BITRATE: &str = "5000k";

/// Default audio bitrate offered to callers.
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Default LAME quality index offered to callers.
pub const DEFAULT_MP3_QUALITY: u8 = 4;

// ---- Codecs ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    Libx264,
    Libx265,
}

impl VideoCodec {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VideoCodec::Libx264 => "libx264",
            VideoCodec::Libx265 => "libx265",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoCodec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "libx264" | "x264" | "h264" => Ok(VideoCodec::Libx264),
            "libx265" | "x265" | "hevc" => Ok(VideoCodec::Libx265),
            other => Err(CoreError::Parse(format!("unsupported video codec '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Libmp3lame,
}

impl AudioCodec {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Libmp3lame => "libmp3lame",
        }
    }

    /// Whether the codec has a perceptual quality (VBR) mode driven by `-q:a`.
    #[must_use]
    pub fn supports_quality(self) -> bool {
        matches!(self, AudioCodec::Libmp3lame)
    }

    /// Highest accepted quality index when quality mode is supported.
    #[must_use]
    pub fn max_quality(self) -> Option<u8> {
        match self {
            AudioCodec::Libmp3lame => Some(MAX_MP3_QUALITY),
            AudioCodec::Aac => None,
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioCodec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aac" => Ok(AudioCodec::Aac),
            "libmp3lame" | "mp3" | "lame" => Ok(AudioCodec::Libmp3lame),
            other => Err(CoreError::Parse(format!("unsupported audio codec '{other}'"))),
        }
    }
}

// ---- Preset ----

/// Encoder speed preset shared by x264 and x265.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl Preset {
    pub const ALL: [Preset; 9] = [
        Preset::Ultrafast,
        Preset::Superfast,
        Preset::Veryfast,
        Preset::Faster,
        Preset::Fast,
        Preset::Medium,
        Preset::Slow,
        Preset::Slower,
        Preset::Veryslow,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Ultrafast => "ultrafast",
            Preset::Superfast => "superfast",
            Preset::Veryfast => "veryfast",
            Preset::Faster => "faster",
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Slower => "slower",
            Preset::Veryslow => "veryslow",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| CoreError::Parse(format!("unknown preset '{s}'")))
    }
}

// ---- Bitrate ----

/// Engine bitrate value: digits with an optional `k`/`K`/`M` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bitrate(String);

impl Bitrate {
    pub fn new(value: impl Into<String>) -> CoreResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let digits = trimmed
            .strip_suffix(['k', 'K', 'M'])
            .unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::Parse(format!(
                "invalid bitrate '{value}' (expected e.g. 5000k, 2M or 128000)"
            )));
        }
        if digits.chars().all(|c| c == '0') {
            return Err(CoreError::Parse(format!("bitrate must be non-zero, got '{value}'")));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Bitrate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bitrate::new(s)
    }
}

impl TryFrom<String> for Bitrate {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Bitrate::new(value)
    }
}

impl From<Bitrate> for String {
    fn from(value: Bitrate) -> Self {
        value.0
    }
}

// ---- Video policy ----

/// How the video stream of a transcode is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum VideoPolicy {
    /// Stream copy, one pass.
    Copy,
    /// CRF encode, one pass.
    ConstantQuality {
        codec: VideoCodec,
        crf: u8,
        #[serde(default)]
        preset: Preset,
    },
    /// Average-bitrate encode in two passes.
    TwoPass {
        codec: VideoCodec,
        bitrate: Bitrate,
        #[serde(default)]
        preset: Preset,
    },
}

impl VideoPolicy {
    #[must_use]
    pub fn is_copy(&self) -> bool {
        matches!(self, VideoPolicy::Copy)
    }

    #[must_use]
    pub fn is_two_pass(&self) -> bool {
        matches!(self, VideoPolicy::TwoPass { .. })
    }

    /// Video flags without any pass-specific tokens.
    #[must_use]
    pub fn flags(&self) -> Vec<String> {
        match self {
            VideoPolicy::Copy => vec!["-c:v".into(), "copy".into()],
            VideoPolicy::ConstantQuality { codec, crf, preset } => vec![
                "-c:v".into(),
                codec.as_str().into(),
                "-crf".into(),
                crf.to_string(),
                "-preset".into(),
                preset.as_str().into(),
            ],
            VideoPolicy::TwoPass {
                codec,
                bitrate,
                preset,
            } => vec![
                "-c:v".into(),
                codec.as_str().into(),
                "-b:v".into(),
                bitrate.as_str().into(),
                "-preset".into(),
                preset.as_str().into(),
            ],
        }
    }
}

// ---- Audio policy ----

/// Rate control for an encoded audio stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioRate {
    /// Let the encoder pick.
    #[default]
    CodecDefault,
    /// Average bitrate (`-b:a`).
    Average(Bitrate),
    /// Perceptual quality index (`-q:a`); only for codecs that support it.
    Quality(u8),
}

/// How the audio stream of a transcode is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AudioPolicy {
    Copy,
    Encode {
        codec: AudioCodec,
        #[serde(default)]
        rate: AudioRate,
    },
}

impl AudioPolicy {
    /// Audio flags. Fails only when quality mode is requested for a codec
    /// without one.
    pub fn flags(&self) -> CoreResult<Vec<String>> {
        match self {
            AudioPolicy::Copy => Ok(vec!["-c:a".into(), "copy".into()]),
            AudioPolicy::Encode { codec, rate } => {
                let mut flags = vec!["-c:a".to_string(), codec.as_str().to_string()];
                match rate {
                    AudioRate::CodecDefault => {}
                    AudioRate::Average(bitrate) => {
                        flags.push("-b:a".into());
                        flags.push(bitrate.as_str().into());
                    }
                    AudioRate::Quality(q) => {
                        if !codec.supports_quality() {
                            return Err(CoreError::InvalidJob(format!(
                                "audio codec {codec} has no quality mode"
                            )));
                        }
                        flags.push("-q:a".into());
                        flags.push(q.to_string());
                    }
                }
                Ok(flags)
            }
        }
    }
}
