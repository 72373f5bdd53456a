// ============================================================================
// splicer-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig with the defaults from config/mod.rs.
// Validation stays on CoreConfig::validate so that configs assembled by hand
// and configs assembled here go through the same checks.

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::{CoreConfig, NormalizeProfile};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use splicer_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path("ffmpeg")
///     .temp_dir(PathBuf::from("/tmp/splicer"))
///     .hide_banner(false)
///     .build();
/// assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/splicer")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine binary.
    pub fn ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    /// Sets the work directory for transient files.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = Some(temp_dir);
        self
    }

    /// Sets whether `-hide_banner` is passed.
    pub fn hide_banner(mut self, hide: bool) -> Self {
        self.config.hide_banner = hide;
        self
    }

    /// Sets whether `-y` is passed.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Sets the grace period granted to a cancelled pass.
    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.config.grace_period = grace_period;
        self
    }

    /// Sets the stop-flag polling interval.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.config.poll_interval = poll_interval;
        self
    }

    /// Replaces the normalization profile used by re-encode merges.
    pub fn normalize(mut self, profile: NormalizeProfile) -> Self {
        self.config.normalize = profile;
        self
    }

    /// Builds the CoreConfig.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_config_defaults() {
        let built = CoreConfigBuilder::new().build();
        let default = CoreConfig::default();
        assert_eq!(built.ffmpeg_path, default.ffmpeg_path);
        assert_eq!(built.grace_period, default.grace_period);
        assert_eq!(built.poll_interval, default.poll_interval);
        assert_eq!(built.normalize, default.normalize);
    }

    #[test]
    fn test_builder_chaining() {
        let config = CoreConfigBuilder::new()
            .ffmpeg_path("/opt/ffmpeg/bin/ffmpeg")
            .hide_banner(false)
            .overwrite(false)
            .grace_period(Duration::from_secs(1))
            .poll_interval(Duration::from_millis(20))
            .build();

        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert!(!config.hide_banner);
        assert!(!config.overwrite);
        assert_eq!(config.grace_period, Duration::from_secs(1));
        assert_eq!(config.poll_interval, Duration::from_millis(20));
    }
}
