//! Bookkeeping for files a job leaves behind while its passes run.
//!
//! Two kinds of artifacts are tracked: exact files the job created itself
//! (the concat list) and private directories the job reserved for files the
//! engine creates on its behalf (two-pass statistics). A directory is removed
//! with everything in it, so nothing outside it is touched. Cleanup never fails;
//! missing files are skipped and other problems are reported back to the
//! caller in a [`CleanupReport`].

use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file or file family owned by a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    File(PathBuf),
    Dir(PathBuf),
}

impl Artifact {
    /// Human readable form for events and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Artifact::File(path) => path.display().to_string(),
            Artifact::Dir(path) => format!("{}/", path.display()),
        }
    }
}

/// One artifact that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, path: &Path, err: &io::Error) {
        self.failed.push(CleanupFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        });
    }
}

/// Transient artifact set of one job instance.
#[derive(Debug, Clone, Default)]
pub struct TransientArtifacts {
    entries: Vec<Artifact>,
}

impl TransientArtifacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_file(&mut self, path: impl Into<PathBuf>) {
        let artifact = Artifact::File(path.into());
        if !self.entries.contains(&artifact) {
            self.entries.push(artifact);
        }
    }

    /// Tracks a directory owned by the job; cleanup removes it recursively.
    pub fn track_dir(&mut self, dir: impl Into<PathBuf>) {
        let artifact = Artifact::Dir(dir.into());
        if !self.entries.contains(&artifact) {
            self.entries.push(artifact);
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Artifact] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every tracked artifact that still exists.
    ///
    /// Safe to call repeatedly: a second call finds nothing and reports an
    /// empty, clean result.
    pub fn cleanup(&self) -> CleanupReport {
        let mut report = CleanupReport::default();
        for entry in &self.entries {
            match entry {
                Artifact::File(path) => remove_file(path, &mut report),
                Artifact::Dir(dir) => remove_dir(dir, &mut report),
            }
        }
        report
    }
}

fn remove_file(path: &Path, report: &mut CleanupReport) {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed transient file {}", path.display());
            report.removed.push(path.to_path_buf());
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => report.fail(path, &e),
    }
}

fn remove_dir(dir: &Path, report: &mut CleanupReport) {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!("Removed transient directory {}", dir.display());
            report.removed.push(dir.to_path_buf());
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => report.fail(dir, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_removes_tracked_file() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("list.txt");
        File::create(&list).unwrap();

        let mut artifacts = TransientArtifacts::new();
        artifacts.track_file(&list);
        let report = artifacts.cleanup();

        assert!(!list.exists());
        assert_eq!(report.removed, vec![list]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_cleanup_with_missing_artifacts_succeeds() {
        let dir = tempdir().unwrap();
        let mut artifacts = TransientArtifacts::new();
        artifacts.track_file(dir.path().join("never-created.txt"));
        artifacts.track_dir(dir.path().join("no-such-dir"));

        let report = artifacts.cleanup();
        assert!(report.removed.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_dir_cleanup_leaves_siblings() {
        let dir = tempdir().unwrap();
        let stats = dir.path().join("splicer-2pass-a");
        let other = dir.path().join("splicer-2pass-b");
        for d in [&stats, &other] {
            fs::create_dir(d).unwrap();
            File::create(d.join("ffmpeg2pass-log-0.log")).unwrap();
        }
        File::create(dir.path().join("ffmpeg2pass-log-0.log")).unwrap();

        let mut artifacts = TransientArtifacts::new();
        artifacts.track_dir(&stats);
        let report = artifacts.cleanup();

        assert_eq!(report.removed, vec![stats.clone()]);
        assert!(!stats.exists());
        assert!(other.join("ffmpeg2pass-log-0.log").exists());
        assert!(dir.path().join("ffmpeg2pass-log-0.log").exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("list.txt");
        File::create(&file).unwrap();

        let mut artifacts = TransientArtifacts::new();
        artifacts.track_file(&file);
        assert_eq!(artifacts.cleanup().removed.len(), 1);

        let second = artifacts.cleanup();
        assert!(second.removed.is_empty());
        assert!(second.is_clean());
    }

    #[test]
    fn test_tracking_deduplicates() {
        let mut artifacts = TransientArtifacts::new();
        artifacts.track_file("/tmp/a.txt");
        artifacts.track_file("/tmp/a.txt");
        artifacts.track_dir("/tmp/d");
        artifacts.track_dir("/tmp/d");
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_describe() {
        let file = Artifact::File(PathBuf::from("list.txt"));
        assert_eq!(file.describe(), "list.txt");
        let dir = Artifact::Dir(PathBuf::from("work"));
        assert_eq!(dir.describe(), "work/");
    }
}
