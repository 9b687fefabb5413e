// ============================================================================
// clipweave-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates interactions with the external media engine. It
// provides traits and concrete implementations so the concatenation pipeline
// can run against the real binaries or against the mocks in tests.
//
// KEY COMPONENTS:
// - MediaProber (ffprobe_executor): clip duration/audio facts, audio reports
// - EngineCommand (ffmpeg_builder): flat ffmpeg token list synthesis
// - FfmpegSpawner / run_engine (ffmpeg_executor): synchronous execution
// - check_dependency: binary availability check before a job starts

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Synthesis of the ffmpeg argument list
pub mod ffmpeg_builder;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for probing media with ffprobe
pub mod ffprobe_executor;

/// Test doubles for the spawner and prober traits
#[cfg(all(unix, any(test, feature = "test-mocks")))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::EngineCommand;
pub use ffmpeg_executor::{
    EngineEventHandler, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_engine,
};
pub use ffprobe_executor::{AudioReport, AudioTrack, Clip, CrateFfprobeExecutor, MediaProber};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded.
///
/// # Returns
///
/// * `Ok(())` - The command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_is_reported() {
        match check_dependency("clipweave-definitely-not-installed") {
            Err(CoreError::DependencyNotFound(name)) => {
                assert_eq!(name, "clipweave-definitely-not-installed");
            }
            other => panic!("Expected DependencyNotFound, got {other:?}"),
        }
    }
}
