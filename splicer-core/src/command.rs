//! Command vectors and the builder that assembles them.
//!
//! A [`CommandVector`] is one engine invocation as discrete argv tokens. The
//! first token is always the engine program. Vectors are handed to the OS
//! as-is; the [`Display`](std::fmt::Display) rendering exists only for logs
//! and dry runs.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::EngineSettings;

/// Null sink used as the output of statistics-only passes.
#[must_use]
pub fn null_sink() -> &'static str {
    if cfg!(windows) { "NUL" } else { "/dev/null" }
}

/// Converts a path to an argv token.
pub(crate) fn path_token(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// One invocation of the external engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandVector(Vec<String>);

impl CommandVector {
    /// Wraps raw tokens. Returns `None` for an empty token list.
    pub fn from_tokens<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() { None } else { Some(Self(tokens)) }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Index of the first occurrence of `token`.
    #[must_use]
    pub fn position(&self, token: &str) -> Option<usize> {
        self.0.iter().position(|t| t == token)
    }

    /// True when `sequence` appears as consecutive tokens.
    #[must_use]
    pub fn contains_sequence(&self, sequence: &[&str]) -> bool {
        if sequence.is_empty() {
            return true;
        }
        self.0
            .windows(sequence.len())
            .any(|window| window.iter().zip(sequence).all(|(a, b)| a == b))
    }

    /// Number of times `token` occurs.
    #[must_use]
    pub fn count(&self, token: &str) -> usize {
        self.0.iter().filter(|t| *t == token).count()
    }

    /// Token following the first occurrence of `flag`.
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        let idx = self.position(flag)?;
        self.0.get(idx + 1).map(String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> &str {
        &self.0[self.0.len() - 1]
    }
}

fn display_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | ';' | '[' | ']' | '&' | '|'));
    if needs_quotes {
        format!("'{}'", token.replace('\'', "'\\''"))
    } else {
        token.to_string()
    }
}

impl fmt::Display for CommandVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|t| display_token(t)).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// Builder for engine command vectors.
///
/// Starts with the engine program followed by the global flags taken from
/// [`EngineSettings`], then appends tokens in call order.
///
/// ```rust
/// use splicer_core::command::CommandBuilder;
/// use splicer_core::config::EngineSettings;
///
/// let cmd = CommandBuilder::new(&EngineSettings::default())
///     .input("in.mp4")
///     .args(["-c", "copy"])
///     .output("out.mkv")
///     .build();
/// assert_eq!(cmd.program(), "ffmpeg");
/// assert!(cmd.contains_sequence(&["-i", "in.mp4", "-c", "copy", "out.mkv"]));
/// ```
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tokens: Vec<String>,
}

impl CommandBuilder {
    #[must_use]
    pub fn new(engine: &EngineSettings) -> Self {
        let mut tokens = vec![engine.program.clone()];
        if engine.hide_banner {
            tokens.push("-hide_banner".to_string());
        }
        if engine.overwrite {
            tokens.push("-y".to_string());
        }
        Self { tokens }
    }

    /// Adds `-i <path>`.
    #[must_use]
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.tokens.push("-i".to_string());
        self.tokens.push(path_token(path.as_ref()));
        self
    }

    #[must_use]
    pub fn arg(mut self, token: impl Into<String>) -> Self {
        self.tokens.push(token.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Adds a flag and its value.
    #[must_use]
    pub fn option(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Appends the output path as the final positional token.
    #[must_use]
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.tokens.push(path_token(path.as_ref()));
        self
    }

    #[must_use]
    pub fn build(self) -> CommandVector {
        CommandVector(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn engine(hide_banner: bool, overwrite: bool) -> EngineSettings {
        EngineSettings {
            program: "ffmpeg".to_string(),
            hide_banner,
            overwrite,
            work_dir: PathBuf::from("/tmp"),
        }
    }

    #[test]
    fn test_builder_global_flags() {
        let cmd = CommandBuilder::new(&engine(true, true)).build();
        assert_eq!(cmd.tokens(), ["ffmpeg", "-hide_banner", "-y"]);

        let cmd = CommandBuilder::new(&engine(false, false)).build();
        assert_eq!(cmd.tokens(), ["ffmpeg"]);
    }

    #[test]
    fn test_builder_preserves_order() {
        let cmd = CommandBuilder::new(&engine(false, true))
            .input("a.mp4")
            .option("-c:v", "libx264")
            .arg("-an")
            .output("b.mp4")
            .build();

        assert_eq!(
            cmd.tokens(),
            ["ffmpeg", "-y", "-i", "a.mp4", "-c:v", "libx264", "-an", "b.mp4"]
        );
        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(cmd.args()[0], "-y");
        assert_eq!(cmd.last(), "b.mp4");
    }

    #[test]
    fn test_queries() {
        let cmd = CommandVector::from_tokens(["ffmpeg", "-i", "a", "-i", "b", "-map", "[v]"])
            .unwrap();
        assert!(cmd.contains("-map"));
        assert!(!cmd.contains("-an"));
        assert_eq!(cmd.count("-i"), 2);
        assert_eq!(cmd.position("-map"), Some(5));
        assert_eq!(cmd.value_of("-map"), Some("[v]"));
        assert!(cmd.contains_sequence(&["-i", "b"]));
        assert!(!cmd.contains_sequence(&["-i", "c"]));
    }

    #[test]
    fn test_from_tokens_rejects_empty() {
        assert!(CommandVector::from_tokens(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_display_quotes_only_when_needed() {
        let cmd = CommandVector::from_tokens([
            "ffmpeg",
            "-i",
            "my clip.mp4",
            "-map",
            "[v]",
            "it's.mp4",
        ])
        .unwrap();
        assert_eq!(
            cmd.to_string(),
            "ffmpeg -i 'my clip.mp4' -map '[v]' 'it'\\''s.mp4'"
        );
    }

    #[test]
    fn test_null_sink_matches_platform() {
        if cfg!(windows) {
            assert_eq!(null_sink(), "NUL");
        } else {
            assert_eq!(null_sink(), "/dev/null");
        }
    }
}
