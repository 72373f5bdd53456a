//! Core library for building and running sequential ffmpeg jobs.
//!
//! A caller describes what it wants (merge several files, or re-encode one
//! under a chosen rate-control policy) as a [`JobDescriptor`]. The descriptor
//! is validated and turned into a [`Job`], which knows the ordered command
//! vectors ("passes") that achieve it and the transient files it leaves
//! behind. An [`Executor`] runs those passes one at a time, streams the
//! engine's output as [`JobEvent`]s, stops on the first failing pass or on
//! cancellation, and cleans up exactly once before reporting the outcome.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use splicer_core::{CoreConfig, Executor, ExecutorSettings, JobDescriptor, JobEvent};
//! use std::path::PathBuf;
//!
//! let config = CoreConfig::default();
//! config.validate().unwrap();
//!
//! let job = JobDescriptor::ConcatNormalize {
//!     inputs: vec![PathBuf::from("intro.mp4"), PathBuf::from("talk.mov")],
//!     output: PathBuf::from("merged.mp4"),
//! }
//! .into_job(&config)
//! .unwrap();
//!
//! let handle = Executor::system(ExecutorSettings::from(&config)).spawn(job).unwrap();
//! for event in handle.events() {
//!     println!("{event}");
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! let outcome = handle.join().unwrap();
//! assert!(outcome.is_success());
//! ```

pub mod cancel;
pub mod command;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod executor;
pub mod external;
pub mod file_logging;
pub mod filters;
pub mod jobs;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use command::{CommandBuilder, CommandVector, null_sink};
pub use config::{CoreConfig, CoreConfigBuilder, EngineSettings, NormalizeProfile};
pub use descriptor::JobDescriptor;
pub use error::{CoreError, CoreResult};
pub use events::{
    EventDispatcher, EventHandler, ExecutionOutcome, FailureReason, JobEvent, JsonEventHandler,
};
pub use executor::{Executor, ExecutorSettings, JobHandle};
pub use external::{
    EngineProcess, LineRead, ProcessSpawner, ProcessStatus, SystemSpawner, check_dependency,
};
pub use jobs::{
    AudioCodec, AudioPolicy, AudioRate, Bitrate, CleanupReport, Job, JobKind, PassSequence,
    Preset, TransientArtifacts, VideoCodec, VideoPolicy,
};
pub use utils::{format_duration, format_elapsed};
