//! Configuration structures and constants for the clipweave-core library.
//!
//! This module provides the job-independent settings of the concatenation
//! engine: where outputs and temporary artifacts go, the whoosh sound asset,
//! the sample rate of generated audio, and the output encoders.

mod builder;
pub mod utils;

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;

pub use builder::ConcatConfigBuilder;

// Default constants

/// Sample rate of generated silence and of the SFX bus, in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Video encoder used when transitions force a re-encode.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Pixel format chosen for broad player compatibility.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Audio encoder for every mapped audio stream.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Environment variable overriding the output/storage directory.
pub const ENV_STORAGE_PATH: &str = "CLIPWEAVE_STORAGE_PATH";

/// Environment variable naming the whip pan sound asset.
pub const ENV_SFX_ASSET: &str = "CLIPWEAVE_SFX_ASSET";

/// Environment variable overriding the sample rate.
pub const ENV_SAMPLE_RATE: &str = "CLIPWEAVE_SAMPLE_RATE";

/// Environment variable controlling output overwrite.
pub const ENV_OVERWRITE: &str = "CLIPWEAVE_OVERWRITE";

/// Main configuration structure for the clipweave-core library.
///
/// Created by the consumer (e.g., clipweave-cli) and passed to
/// `process_concatenate`. All fields have defaults; the builder provides a
/// fluent way to override them.
///
/// # Examples
///
/// ```rust
/// use clipweave_core::config::ConcatConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConcatConfigBuilder::new()
///     .output_dir(PathBuf::from("/srv/clipweave/out"))
///     .sfx_asset(PathBuf::from("/srv/clipweave/assets/whoosh.wav"))
///     .sample_rate(44100)
///     .build();
/// assert_eq!(config.sample_rate, 44100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatConfig {
    /// Directory where final outputs are written
    pub output_dir: PathBuf,

    /// Optional directory for temporary files (defaults to `output_dir`)
    pub temp_dir: Option<PathBuf>,

    /// Whoosh sound played at whip pan boundaries. A missing file disables
    /// the sound effect without failing the job.
    pub sfx_asset: Option<PathBuf>,

    /// Sample rate of generated audio, in Hz
    pub sample_rate: u32,

    pub video_codec: String,
    pub pixel_format: String,
    pub audio_codec: String,

    /// Whether existing output files are overwritten
    pub overwrite: bool,
}

impl Default for ConcatConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            temp_dir: None,
            sfx_asset: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            overwrite: true,
        }
    }
}

impl ConcatConfig {
    /// Defaults with `CLIPWEAVE_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `CLIPWEAVE_*` environment overrides on top of `self`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.output_dir = utils::get_env_path(ENV_STORAGE_PATH, self.output_dir);
        self.sfx_asset = utils::get_env_opt_path(ENV_SFX_ASSET).or(self.sfx_asset);
        self.sample_rate = utils::get_env_u32(ENV_SAMPLE_RATE, self.sample_rate);
        self.overwrite = utils::get_env_bool(ENV_OVERWRITE, self.overwrite);
        self
    }

    /// Directory used for temporary artifacts.
    pub fn temp_base_dir(&self) -> &PathBuf {
        self.temp_dir.as_ref().unwrap_or(&self.output_dir)
    }

    /// Rejects settings no job could run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.sample_rate == 0 {
            return Err(CoreError::Config("sample_rate must be positive".to_string()));
        }
        for (name, value) in [
            ("video_codec", &self.video_codec),
            ("pixel_format", &self.pixel_format),
            ("audio_codec", &self.audio_codec),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{name} must not be empty")));
            }
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(CoreError::Config(format!(
                "output_dir {} is not a directory",
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConcatConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.video_codec, "libx264");
        assert_eq!(config.pixel_format, "yuv420p");
        assert_eq!(config.audio_codec, "aac");
        assert!(config.overwrite);
        assert_eq!(config.temp_base_dir(), &PathBuf::from("."));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ConcatConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = ConcatConfig {
            audio_codec: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();
        let config = ConcatConfig {
            output_dir: file,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
