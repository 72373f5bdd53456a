// ============================================================================
// splicer-core/src/jobs/mod.rs
// ============================================================================
//
// JOBS: Translating merge/transcode intent into ordered command vectors
//
// KEY COMPONENTS:
// - Job: closed set of job variants (ConcatCopy, ConcatNormalize, Transcode)
// - PassSequence: the ordered, non-empty list of command vectors of one job
// - JobState: per-instance pass cache plus transient artifact bookkeeping
// - TransientArtifacts: files the job (or the engine on its behalf) creates
//
// A job builds its pass sequence at most once. Building may create files
// (the concat list) and registers every such file with the job's artifacts;
// the executor later calls cleanup exactly once after the last pass attempt.
//
// AI-ASSISTANT-INFO: Job variants and pass building, no process handling here

pub mod artifacts;
pub mod concat_copy;
pub mod concat_normalize;
pub mod policy;
pub mod transcode;

use serde::Serialize;
use std::fmt;
use std::ops::Index;
use std::path::Path;

use crate::command::CommandVector;
use crate::error::{CoreError, CoreResult};

pub use artifacts::{Artifact, CleanupFailure, CleanupReport, TransientArtifacts};
pub use concat_copy::ConcatCopyJob;
pub use concat_normalize::ConcatNormalizeJob;
pub use policy::{AudioCodec, AudioPolicy, AudioRate, Bitrate, Preset, VideoCodec, VideoPolicy};
pub use transcode::TranscodeJob;

/// Variant tag of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    ConcatCopy,
    ConcatNormalize,
    Transcode,
}

impl JobKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::ConcatCopy => "concat-copy",
            JobKind::ConcatNormalize => "concat-normalize",
            JobKind::Transcode => "transcode",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, non-empty sequence of command vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PassSequence(Vec<CommandVector>);

impl PassSequence {
    pub fn new(passes: Vec<CommandVector>) -> CoreResult<Self> {
        if passes.is_empty() {
            return Err(CoreError::InvalidJob(
                "a job must produce at least one pass".to_string(),
            ));
        }
        Ok(Self(passes))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandVector> {
        self.0.iter()
    }

    /// Pass by 1-based number.
    #[must_use]
    pub fn pass(&self, number: usize) -> Option<&CommandVector> {
        number.checked_sub(1).and_then(|idx| self.0.get(idx))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CommandVector] {
        &self.0
    }
}

impl Index<usize> for PassSequence {
    type Output = CommandVector;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a PassSequence {
    type Item = &'a CommandVector;
    type IntoIter = std::slice::Iter<'a, CommandVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Pass cache and artifacts shared by every job variant.
#[derive(Debug, Clone, Default)]
pub struct JobState {
    passes: Option<PassSequence>,
    artifacts: TransientArtifacts,
}

impl JobState {
    /// Returns the cached passes, building them with `build` on first use.
    ///
    /// A failed build caches nothing, but artifacts it registered before
    /// failing stay tracked so cleanup still finds them.
    pub fn passes_or_build<F>(&mut self, build: F) -> CoreResult<&PassSequence>
    where
        F: FnOnce(&mut TransientArtifacts) -> CoreResult<Vec<CommandVector>>,
    {
        let passes = match self.passes.take() {
            Some(passes) => passes,
            None => PassSequence::new(build(&mut self.artifacts)?)?,
        };
        Ok(self.passes.insert(passes))
    }

    #[must_use]
    pub fn built(&self) -> Option<&PassSequence> {
        self.passes.as_ref()
    }

    #[must_use]
    pub fn artifacts(&self) -> &TransientArtifacts {
        &self.artifacts
    }

    pub fn artifacts_mut(&mut self) -> &mut TransientArtifacts {
        &mut self.artifacts
    }
}

/// A unit of work: one merge or one transcode.
#[derive(Debug, Clone)]
pub enum Job {
    ConcatCopy(ConcatCopyJob),
    ConcatNormalize(ConcatNormalizeJob),
    Transcode(TranscodeJob),
}

impl Job {
    #[must_use]
    pub fn kind(&self) -> JobKind {
        match self {
            Job::ConcatCopy(_) => JobKind::ConcatCopy,
            Job::ConcatNormalize(_) => JobKind::ConcatNormalize,
            Job::Transcode(_) => JobKind::Transcode,
        }
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        match self {
            Job::ConcatCopy(job) => job.output_path(),
            Job::ConcatNormalize(job) => job.output_path(),
            Job::Transcode(job) => job.output_path(),
        }
    }

    /// Produces the pass sequence, building it on first call only.
    pub fn passes(&mut self) -> CoreResult<&PassSequence> {
        match self {
            Job::ConcatCopy(job) => job.passes(),
            Job::ConcatNormalize(job) => job.passes(),
            Job::Transcode(job) => job.passes(),
        }
    }

    /// Pass sequence if it has already been built.
    #[must_use]
    pub fn built_passes(&self) -> Option<&PassSequence> {
        self.state().built()
    }

    #[must_use]
    pub fn artifacts(&self) -> &TransientArtifacts {
        self.state().artifacts()
    }

    /// Removes the job's transient artifacts. Never fails; see [`CleanupReport`].
    pub fn cleanup(&mut self) -> CleanupReport {
        self.state_mut().artifacts_mut().cleanup()
    }

    fn state(&self) -> &JobState {
        match self {
            Job::ConcatCopy(job) => job.state(),
            Job::ConcatNormalize(job) => job.state(),
            Job::Transcode(job) => job.state(),
        }
    }

    fn state_mut(&mut self) -> &mut JobState {
        match self {
            Job::ConcatCopy(job) => job.state_mut(),
            Job::ConcatNormalize(job) => job.state_mut(),
            Job::Transcode(job) => job.state_mut(),
        }
    }
}

impl From<ConcatCopyJob> for Job {
    fn from(job: ConcatCopyJob) -> Self {
        Job::ConcatCopy(job)
    }
}

impl From<ConcatNormalizeJob> for Job {
    fn from(job: ConcatNormalizeJob) -> Self {
        Job::ConcatNormalize(job)
    }
}

impl From<TranscodeJob> for Job {
    fn from(job: TranscodeJob) -> Self {
        Job::Transcode(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineSettings, NormalizeProfile};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_pass_sequence_rejects_empty() {
        assert!(PassSequence::new(Vec::new()).is_err());
    }

    #[test]
    fn test_pass_lookup_is_one_based() {
        let a = CommandVector::from_tokens(["ffmpeg", "a"]).unwrap();
        let b = CommandVector::from_tokens(["ffmpeg", "b"]).unwrap();
        let seq = PassSequence::new(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(seq.pass(1), Some(&a));
        assert_eq!(seq.pass(2), Some(&b));
        assert_eq!(seq.pass(0), None);
        assert_eq!(seq.pass(3), None);
    }

    #[test]
    fn test_every_variant_starts_with_engine() {
        let dir = tempdir().unwrap();
        let engine = EngineSettings {
            program: "/opt/bin/ffmpeg".to_string(),
            hide_banner: true,
            overwrite: true,
            work_dir: dir.path().to_path_buf(),
        };
        let inputs = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        let mut jobs: Vec<Job> = vec![
            ConcatCopyJob::new(inputs.clone(), "o1.mp4", engine.clone()).into(),
            ConcatNormalizeJob::new(inputs, "o2.mp4", NormalizeProfile::default(), engine.clone())
                .into(),
            TranscodeJob::new("a.mp4", "o3.mp4", VideoPolicy::Copy, AudioPolicy::Copy, engine)
                .into(),
        ];

        for job in &mut jobs {
            assert!(job.built_passes().is_none());
            let passes = job.passes().unwrap();
            assert!(!passes.is_empty());
            for cmd in passes {
                assert_eq!(cmd.program(), "/opt/bin/ffmpeg");
            }
            assert!(job.built_passes().is_some());
        }
    }

    #[test]
    fn test_job_cleanup_removes_list_file() {
        let dir = tempdir().unwrap();
        let engine = EngineSettings {
            work_dir: dir.path().to_path_buf(),
            ..EngineSettings::default()
        };
        let mut job: Job = ConcatCopyJob::new(
            vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
            "out.mp4",
            engine,
        )
        .into();
        job.passes().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let report = job.cleanup();
        assert_eq!(report.removed.len(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(job.cleanup().removed.is_empty());
    }

    #[test]
    fn test_kind_and_output() {
        let job: Job = TranscodeJob::new(
            "in.mkv",
            "out.mp4",
            VideoPolicy::Copy,
            AudioPolicy::Copy,
            EngineSettings::default(),
        )
        .into();
        assert_eq!(job.kind(), JobKind::Transcode);
        assert_eq!(job.kind().to_string(), "transcode");
        assert_eq!(job.output_path(), Path::new("out.mp4"));
    }
}
