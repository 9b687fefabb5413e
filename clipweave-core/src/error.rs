// ============================================================================
// clipweave-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for clipweave-core
//
// This module defines the error types used throughout the clipweave-core
// library. The variants mirror the job lifecycle: request validation errors
// are detected before any external process starts, probe and graph errors
// abort the job during synthesis, and engine errors carry the captured
// stderr of the failed ffmpeg run.
//
// KEY COMPONENTS:
// - CoreError: Main error enum with variants for the different failure modes
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper functions for creating command-related errors

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by clipweave-core.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- Request validation (user errors) ----
    #[error("Unsupported transition_type '{requested}'. Choose one of: {valid}.")]
    UnsupportedTransition { requested: String, valid: String },

    #[error(
        "transition_sequence must include exactly {expected} entries (one per clip boundary), got {actual}"
    )]
    LengthMismatch { expected: usize, actual: usize },

    #[error(
        "transition_sequence entry {index} ('{entry}') must specify an actual transition type"
    )]
    InvalidSequenceEntry { index: usize, entry: String },

    #[error(
        "Transition duration {requested:.3}s is longer than one of the clips (previous tail {previous_tail:.3}s, next clip {next_clip:.3}s)"
    )]
    TransitionTooLong {
        requested: f64,
        previous_tail: f64,
        next_clip: f64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ---- Media probing ----
    #[error("Unable to probe media file {path}: {reason}")]
    ProbeFailure { path: PathBuf, reason: String },

    // ---- Graph synthesis ----
    #[error("Failed to merge SFX graph into main graph: {0}")]
    GraphMergeFailure(String),

    // ---- External process execution ----
    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{tool} failed ({status}): {stderr}")]
    EngineExecutionFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Output file {0} does not exist after the engine finished")]
    OutputMissing(PathBuf),

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    // ---- Environment ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for clipweave-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// True for errors caused by the request itself rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::UnsupportedTransition { .. }
                | CoreError::LengthMismatch { .. }
                | CoreError::InvalidSequenceEntry { .. }
                | CoreError::TransitionTooLong { .. }
                | CoreError::InvalidInput(_)
        )
    }
}

/// Creates a `CommandStart` error for a process that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Creates a `CommandWait` error for a process whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Creates an `EngineExecutionFailed` error carrying the captured stderr.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::EngineExecutionFailed {
        tool: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}
