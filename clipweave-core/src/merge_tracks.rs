//! Audio track merging with loudness normalization.
//!
//! Mixes every audio track of one media file into a single track and runs
//! it through `loudnorm`. Video, when present, is copied untouched. The
//! graph is built on the same arena and engine command types as the
//! concatenation pipeline.

use crate::config::ConcatConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{EngineCommand, FfmpegSpawner, MediaProber, run_engine};
use crate::fetch::{AssetFetcher, fetch_all};
use crate::graph::{Filter, FilterGraph, GraphInput, GraphOutput, Label, MediaKind, Pad};
use crate::temp_files::resolve_job_id;
use crate::utils::format_decimal;

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET_LUFS: f64 = -14.0;
pub const MIN_TARGET_LUFS: f64 = -70.0;
pub const MAX_TARGET_LUFS: f64 = -5.0;

pub const DEFAULT_TRUE_PEAK: f64 = -1.0;
pub const MIN_TRUE_PEAK: f64 = -9.0;
pub const MAX_TRUE_PEAK: f64 = 0.0;

pub const DEFAULT_LOUDNESS_RANGE: f64 = 11.0;
pub const MIN_LOUDNESS_RANGE: f64 = 1.0;
pub const MAX_LOUDNESS_RANGE: f64 = 20.0;

pub const MIN_TRACK_GAIN_DB: f64 = -60.0;
pub const MAX_TRACK_GAIN_DB: f64 = 30.0;

/// Bit rate of the merged AAC track.
pub const MERGED_AUDIO_BITRATE: &str = "192k";

/// Label namespace of merge graphs.
const MERGE_NAMESPACE: &str = "m";

/// Gain applied to one audio track before mixing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGain {
    pub track_id: usize,
    #[serde(default)]
    pub gain_db: f64,
}

/// A merge request. Unset knobs use the loudness defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeTracksRequest {
    #[serde(alias = "file_url")]
    pub source: String,
    pub id: Option<String>,
    pub target_lufs: Option<f64>,
    pub true_peak: Option<f64>,
    pub loudness_range: Option<f64>,
    pub gain_adjustments: Vec<TrackGain>,
}

/// `loudnorm` targets after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessTarget {
    pub integrated_lufs: f64,
    pub true_peak: f64,
    pub loudness_range: f64,
}

impl Default for LoudnessTarget {
    fn default() -> Self {
        Self {
            integrated_lufs: DEFAULT_TARGET_LUFS,
            true_peak: DEFAULT_TRUE_PEAK,
            loudness_range: DEFAULT_LOUDNESS_RANGE,
        }
    }
}

impl MergeTracksRequest {
    /// Clamped loudness targets.
    pub fn loudness_target(&self) -> CoreResult<LoudnessTarget> {
        Ok(LoudnessTarget {
            integrated_lufs: clamp_knob(
                "target_lufs",
                self.target_lufs.unwrap_or(DEFAULT_TARGET_LUFS),
                MIN_TARGET_LUFS,
                MAX_TARGET_LUFS,
            )?,
            true_peak: clamp_knob(
                "true_peak",
                self.true_peak.unwrap_or(DEFAULT_TRUE_PEAK),
                MIN_TRUE_PEAK,
                MAX_TRUE_PEAK,
            )?,
            loudness_range: clamp_knob(
                "loudness_range",
                self.loudness_range.unwrap_or(DEFAULT_LOUDNESS_RANGE),
                MIN_LOUDNESS_RANGE,
                MAX_LOUDNESS_RANGE,
            )?,
        })
    }

    /// Clamped per-track gains; later entries for the same track win.
    pub fn track_gains(&self) -> CoreResult<HashMap<usize, f64>> {
        let mut gains = HashMap::new();
        for adjustment in &self.gain_adjustments {
            let gain = clamp_knob(
                "gain_db",
                adjustment.gain_db,
                MIN_TRACK_GAIN_DB,
                MAX_TRACK_GAIN_DB,
            )?;
            gains.insert(adjustment.track_id, gain);
        }
        Ok(gains)
    }
}

fn clamp_knob(name: &str, value: f64, min: f64, max: f64) -> CoreResult<f64> {
    if !value.is_finite() {
        return Err(CoreError::InvalidInput(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(value.clamp(min, max))
}

/// Result of a merge job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeTracksOutcome {
    pub job_id: String,
    pub output_path: PathBuf,
    pub tracks_merged: usize,
}

/// Builds the graph mixing `track_count` audio tracks of `input` into one
/// normalized stream.
pub fn build_merge_graph(
    input: &Path,
    track_count: usize,
    gains: &HashMap<usize, f64>,
    target: LoudnessTarget,
) -> CoreResult<(FilterGraph, GraphOutput)> {
    if track_count == 0 {
        return Err(CoreError::InvalidInput(format!(
            "no audio tracks found in {}",
            input.display()
        )));
    }

    let mut graph = FilterGraph::new(MERGE_NAMESPACE);
    let index = graph.add_input(GraphInput::file(input));

    let tracks: Vec<Pad> = (0..track_count)
        .map(|track| {
            let pad = Pad::audio_track(index, track);
            match gains.get(&track).copied().filter(|gain| *gain != 0.0) {
                Some(gain) => graph
                    .apply(
                        &[pad],
                        Filter::new("volume").positional(format!("{}dB", format_decimal(gain))),
                        MediaKind::Audio,
                    )
                    .into(),
                None => pad,
            }
        })
        .collect();

    let mixed: Pad = if tracks.len() == 1 {
        tracks[0].clone()
    } else {
        graph
            .apply(
                &tracks,
                Filter::new("amix")
                    .arg("inputs", track_count.to_string())
                    .arg("duration", "longest")
                    .arg("dropout_transition", "0"),
                MediaKind::Audio,
            )
            .into()
    };

    let audio = loudnorm(&mut graph, mixed, target);
    Ok((graph, GraphOutput::AudioOnly { audio }))
}

fn loudnorm(graph: &mut FilterGraph, input: Pad, target: LoudnessTarget) -> Label {
    graph.apply(
        &[input],
        Filter::new("loudnorm")
            .decimal("I", target.integrated_lufs)
            .decimal("TP", target.true_peak)
            .decimal("LRA", target.loudness_range)
            .arg("measured_I", "-23")
            .arg("measured_TP", "-1")
            .arg("measured_LRA", "11")
            .arg("linear", "true")
            .arg("print_format", "summary"),
        MediaKind::Audio,
    )
}

/// Merges every audio track of the requested file into one.
///
/// The fetched input is deleted on every exit path.
pub fn process_merge_tracks<S, P, F>(
    spawner: &S,
    prober: &P,
    fetcher: &F,
    config: &ConcatConfig,
    request: &MergeTracksRequest,
) -> CoreResult<MergeTracksOutcome>
where
    S: FfmpegSpawner,
    P: MediaProber,
    F: AssetFetcher,
{
    config.validate()?;
    let target = request.loudness_target()?;
    let gains = request.track_gains()?;
    let job_id = resolve_job_id(request.id.as_deref())?;

    let temp_dir = config.temp_base_dir();
    std::fs::create_dir_all(temp_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let inputs = fetch_all(fetcher, std::slice::from_ref(&request.source), temp_dir, &job_id)?;
    let input = inputs.paths().first().ok_or_else(|| {
        CoreError::OperationFailed("fetcher returned no path for the input".to_string())
    })?;

    let report = prober.probe_audio_tracks(input)?;
    let track_count = report.audio_tracks.len();
    let (graph, output) = build_merge_graph(input, track_count, &gains, target)?;

    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("mp4");
    let output_path = config
        .output_dir
        .join(format!("{job_id}_merged.{extension}"));
    let command = EngineCommand::for_audio_merge(&graph, &output, config, &output_path);

    info!("Merging {track_count} audio track(s) of {}", input.display());
    run_engine(spawner, &command)?;

    Ok(MergeTracksOutcome {
        job_id,
        output_path,
        tracks_merged: track_count,
    })
}
