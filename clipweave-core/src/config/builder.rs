// ============================================================================
// clipweave-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ConcatConfig
//
// This module implements the builder pattern for the ConcatConfig structure,
// providing a fluent API for creating ConcatConfig instances with defaults
// for every field that is not set explicitly.
//
// KEY COMPONENTS:
// - ConcatConfigBuilder: Builder struct for creating ConcatConfig instances

use std::path::PathBuf;

use super::ConcatConfig;

/// Builder for creating ConcatConfig instances.
///
/// # Examples
///
/// ```rust
/// use clipweave_core::config::ConcatConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConcatConfigBuilder::new()
///     .output_dir(PathBuf::from("/path/to/output"))
///     .temp_dir(PathBuf::from("/path/to/tmp"))
///     .video_codec("libx265")
///     .overwrite(false)
///     .build();
/// assert_eq!(config.video_codec, "libx265");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConcatConfigBuilder {
    config: ConcatConfig,
}

impl ConcatConfigBuilder {
    /// Creates a new ConcatConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one read from the environment.
    pub fn from_config(config: ConcatConfig) -> Self {
        Self { config }
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.config.output_dir = output_dir;
        self
    }

    /// Sets the temporary files directory.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = Some(temp_dir);
        self
    }

    /// Sets the whip pan sound asset.
    pub fn sfx_asset(mut self, sfx_asset: PathBuf) -> Self {
        self.config.sfx_asset = Some(sfx_asset);
        self
    }

    /// Sets the sample rate of generated audio.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    pub fn video_codec(mut self, codec: &str) -> Self {
        self.config.video_codec = codec.to_string();
        self
    }

    pub fn pixel_format(mut self, pixel_format: &str) -> Self {
        self.config.pixel_format = pixel_format.to_string();
        self
    }

    pub fn audio_codec(mut self, codec: &str) -> Self {
        self.config.audio_codec = codec.to_string();
        self
    }

    /// Sets whether existing outputs are overwritten (`-y`) or kept (`-n`).
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Builds the ConcatConfig instance.
    pub fn build(self) -> ConcatConfig {
        self.config
    }
}
