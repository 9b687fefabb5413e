//! FFprobe integration for clip probing and audio track reports
//!
//! This module wraps the `ffprobe` crate behind the [`MediaProber`] trait so
//! the concatenation pipeline can be exercised without a real ffprobe binary.
//! Conversions from the raw probe output are plain functions and are tested
//! directly.
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbe, FfProbeError, ffprobe};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A probed input clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub path: PathBuf,
    /// Duration in seconds, always > 0.
    pub duration: f64,
    pub has_audio: bool,
}

/// Facts about one audio stream of a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioTrack {
    /// Position among the audio streams (0-based).
    pub track_id: usize,
    /// Position among all streams of the container.
    pub stream_index: i64,
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<i64>,
    pub channel_layout: Option<String>,
    pub bit_rate: Option<u64>,
    pub duration: Option<f64>,
    pub language: Option<String>,
}

/// Audio oriented summary of a media file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioReport {
    pub path: PathBuf,
    pub format_name: String,
    pub duration: Option<f64>,
    pub size_bytes: Option<u64>,
    pub audio_tracks: Vec<AudioTrack>,
}

/// Trait for probing media files.
pub trait MediaProber {
    /// Probes duration and audio presence of a clip.
    fn probe_clip(&self, path: &Path) -> CoreResult<Clip>;

    /// Lists every audio track of a file.
    fn probe_audio_tracks(&self, path: &Path) -> CoreResult<AudioReport>;
}

/// Concrete implementation using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProber for CrateFfprobeExecutor {
    fn probe_clip(&self, path: &Path) -> CoreResult<Clip> {
        log::debug!("Running ffprobe (via crate) for clip facts on: {}", path.display());
        let metadata = ffprobe(path).map_err(|err| {
            log::error!("ffprobe failed for {}: {:?}", path.display(), err);
            probe_failure(path, map_ffprobe_error(err, "clip facts"))
        })?;
        clip_from_probe(path, &metadata)
    }

    fn probe_audio_tracks(&self, path: &Path) -> CoreResult<AudioReport> {
        log::debug!("Running ffprobe (via crate) for audio tracks on: {}", path.display());
        let metadata = ffprobe(path).map_err(|err| {
            log::error!("ffprobe failed for {}: {:?}", path.display(), err);
            probe_failure(path, map_ffprobe_error(err, "audio tracks"))
        })?;
        let size_bytes = std::fs::metadata(path).ok().map(|meta| meta.len());
        Ok(audio_report_from_probe(path, &metadata, size_bytes))
    }
}

/// Extracts a [`Clip`] from raw probe output.
pub fn clip_from_probe(path: &Path, metadata: &FfProbe) -> CoreResult<Clip> {
    let duration = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| CoreError::ProbeFailure {
            path: path.to_path_buf(),
            reason: "unable to determine duration".to_string(),
        })?;

    let has_audio = metadata
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(Clip {
        path: path.to_path_buf(),
        duration,
        has_audio,
    })
}

/// Extracts an [`AudioReport`] from raw probe output.
pub fn audio_report_from_probe(
    path: &Path,
    metadata: &FfProbe,
    size_bytes: Option<u64>,
) -> AudioReport {
    let audio_tracks = metadata
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("audio"))
        .enumerate()
        .map(|(track_id, s)| AudioTrack {
            track_id,
            stream_index: s.index,
            codec: s.codec_name.clone(),
            sample_rate: s.sample_rate.as_deref().and_then(|r| r.parse().ok()),
            channels: s.channels,
            channel_layout: s.channel_layout.clone(),
            bit_rate: s.bit_rate.as_deref().and_then(|b| b.parse().ok()),
            duration: s.duration.as_deref().and_then(|d| d.parse().ok()),
            language: s.tags.as_ref().and_then(|t| t.language.clone()),
        })
        .collect::<Vec<_>>();

    if audio_tracks.is_empty() {
        log::warn!("No audio streams found by ffprobe for {}", path.display());
    }

    AudioReport {
        path: path.to_path_buf(),
        format_name: metadata.format.format_name.clone(),
        duration: metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse().ok()),
        size_bytes,
        audio_tracks,
    }
}

fn probe_failure(path: &Path, err: CoreError) -> CoreError {
    CoreError::ProbeFailure {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::OperationFailed(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::OperationFailed(format!(
            "Unknown ffprobe error during {context}: {err:?}"
        )),
    }
}
