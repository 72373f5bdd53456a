// splicer-core/tests/system_process_tests.rs
//
// Real processes through SystemSpawner. Unix only: relies on sh, echo and false.

#![cfg(unix)]

use splicer_core::jobs::{ConcatNormalizeJob, TranscodeJob};
use splicer_core::{
    AudioPolicy, CancellationToken, CommandVector, EngineProcess, EngineSettings,
    ExecutionOutcome, Executor, ExecutorSettings, FailureReason, Job, JobEvent, LineRead,
    NormalizeProfile, ProcessSpawner, ProcessStatus, SystemSpawner, VideoPolicy,
};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

const TIMEOUT: Duration = Duration::from_secs(10);

fn sh(script: &str) -> CommandVector {
    CommandVector::from_tokens(["sh", "-c", script]).unwrap()
}

fn read_all(process: &mut impl EngineProcess) -> Vec<String> {
    let deadline = Instant::now() + TIMEOUT;
    let mut lines = Vec::new();
    while Instant::now() < deadline {
        match process.read_line(Duration::from_millis(50)).unwrap() {
            LineRead::Line(line) => lines.push(line),
            LineRead::Idle => {}
            LineRead::Closed => return lines,
        }
    }
    panic!("output did not close in time; got {lines:?}");
}

fn wait_exit(process: &mut impl EngineProcess) -> ProcessStatus {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if let Some(status) = process.try_wait().unwrap() {
            return status;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("process did not exit in time");
}

#[test]
fn test_stdout_and_stderr_are_merged_and_split() {
    let mut process = SystemSpawner::new()
        .spawn(&sh("echo to-stdout; echo to-stderr 1>&2; printf 'frame=1\\rframe=2\\n\\n'"))
        .unwrap();

    let mut lines = read_all(&mut process);
    lines.sort();
    assert_eq!(lines, ["frame=1", "frame=2", "to-stderr", "to-stdout"]);
    assert!(wait_exit(&mut process).success());
}

#[test]
fn test_exit_code_is_reported() {
    let mut process = SystemSpawner::new().spawn(&sh("exit 3")).unwrap();
    read_all(&mut process);
    assert_eq!(wait_exit(&mut process).code, Some(3));
}

#[test]
fn test_terminate_stops_process() {
    let mut process = SystemSpawner::new().spawn(&sh("exec sleep 30")).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(process.try_wait().unwrap(), None);

    process.terminate().unwrap();
    let status = wait_exit(&mut process);
    assert!(!status.success());
    assert_eq!(status.code, None);

    // Signalling an exited process is not an error.
    process.terminate().unwrap();
    process.kill().unwrap();
}

#[test]
fn test_missing_program_is_launch_error() {
    let err = SystemSpawner::new()
        .spawn(&CommandVector::from_tokens(["splicer-no-such-engine", "-version"]).unwrap())
        .err()
        .unwrap();
    assert!(err.to_string().contains("splicer-no-such-engine"));
}

fn engine(program: &str, dir: &std::path::Path) -> EngineSettings {
    EngineSettings {
        program: program.to_string(),
        hide_banner: true,
        overwrite: true,
        work_dir: dir.to_path_buf(),
    }
}

fn run(job: &mut Job) -> (ExecutionOutcome, Vec<JobEvent>) {
    let executor = Executor::system(ExecutorSettings {
        grace_period: Duration::from_secs(1),
        poll_interval: Duration::from_millis(10),
    });
    let (tx, rx) = mpsc::channel();
    let outcome = executor.run(job, &CancellationToken::new(), &tx);
    drop(tx);
    (outcome, rx.iter().collect())
}

#[test]
fn test_executor_runs_real_process() {
    // `echo` stands in for the engine: it prints its argv and exits 0.
    let dir = tempdir().unwrap();
    let mut job: Job = ConcatNormalizeJob::new(
        vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
        "merged.mp4",
        NormalizeProfile::default(),
        engine("echo", dir.path()),
    )
    .into();

    let (outcome, events) = run(&mut job);

    assert_eq!(
        outcome,
        ExecutionOutcome::Success {
            output: PathBuf::from("merged.mp4")
        }
    );
    let echoed: Vec<&String> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Output { line, .. } => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(echoed.len(), 1);
    assert!(echoed[0].starts_with("-hide_banner -y -i a.mp4 -i b.mp4 -filter_complex"));
    assert!(echoed[0].ends_with("merged.mp4"));
}

#[test]
fn test_executor_reports_real_exit_code() {
    let dir = tempdir().unwrap();
    let mut job: Job = TranscodeJob::new(
        "in.mkv",
        "out.mkv",
        VideoPolicy::Copy,
        AudioPolicy::Copy,
        engine("false", dir.path()),
    )
    .into();

    let (outcome, events) = run(&mut job);

    assert_eq!(
        outcome,
        ExecutionOutcome::Failure {
            pass: Some(1),
            reason: FailureReason::ExitCode(1)
        }
    );
    assert!(events.last().unwrap().is_terminal());
}
