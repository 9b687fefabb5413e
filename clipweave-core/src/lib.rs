//! Core library for stitching video clips together with transitions using
//! ffmpeg and ffprobe.
//!
//! This crate validates concatenation requests, resolves per-boundary
//! transition timing from probed clip durations, builds the ffmpeg
//! filtergraph (cross-fades, the whip pan blur composite, an optional
//! dedicated sound effect track) and runs the resulting command.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipweave_core::config::ConcatConfigBuilder;
//! use clipweave_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use clipweave_core::fetch::LocalFileFetcher;
//! use clipweave_core::{ConcatRequest, process_concatenate};
//! use std::path::PathBuf;
//!
//! let config = ConcatConfigBuilder::new()
//!     .output_dir(PathBuf::from("/srv/clipweave/out"))
//!     .sfx_asset(PathBuf::from("/srv/clipweave/assets/whoosh.wav"))
//!     .build();
//!
//! let request = ConcatRequest {
//!     clips: vec!["/clips/intro.mp4".into(), "/clips/main.mp4".into()],
//!     transition_type: Some("whip_pan".into()),
//!     transition_sfx_track_id: Some(1),
//!     ..Default::default()
//! };
//!
//! let outcome = process_concatenate(
//!     &SidecarSpawner,
//!     &CrateFfprobeExecutor::new(),
//!     &LocalFileFetcher::new(),
//!     &config,
//!     &request,
//! )
//! .unwrap();
//! println!("wrote {}", outcome.output_path.display());
//! ```

pub mod concat;
pub mod config;
pub mod error;
pub mod external;
pub mod fetch;
pub mod graph;
pub mod merge_tracks;
pub mod temp_files;
pub mod transitions;
pub mod utils;

// Re-exports for public API
pub use concat::{
    ConcatJob, ConcatOutcome, ConcatRequest, plan_concatenate, process_concatenate,
};
pub use config::{ConcatConfig, ConcatConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{AudioReport, AudioTrack, Clip, EngineCommand, check_dependency};
pub use fetch::{AssetFetcher, FetchedInputs, LocalFileFetcher};
pub use graph::SoundEffectStatus;
pub use merge_tracks::{MergeTracksOutcome, MergeTracksRequest, TrackGain, process_merge_tracks};
pub use temp_files::{create_temp_file, generate_job_id, resolve_job_id};
pub use transitions::{TransitionKind, TransitionPlan, build_plan};
pub use utils::format_duration;
