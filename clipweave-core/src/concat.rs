// ============================================================================
// clipweave-core/src/concat.rs
// ============================================================================
//
// JOB ORCHESTRATION: Clip Concatenation Pipeline
//
// This module runs one concatenation job from request to output file. Every
// request knob is validated before any file is touched, inputs are fetched
// into job-unique temp paths owned by a cleanup guard, clips are probed in
// parallel, and the job then takes one of two paths: a stream-copy concat
// demuxer run when no boundary needs a transition, or a synthesized
// filtergraph run otherwise.
//
// KEY COMPONENTS:
// - ConcatRequest: JSON-compatible request payload
// - ConcatJob: the normalized request
// - ConcatOutcome: what the job produced
// - process_concatenate / plan_concatenate: execution and dry run

use crate::config::ConcatConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{Clip, EngineCommand, FfmpegSpawner, MediaProber, run_engine};
use crate::fetch::{AssetFetcher, fetch_all};
use crate::graph::{CompositorSettings, SoundEffectStatus, build_transition_graph};
use crate::temp_files::{create_temp_file, resolve_job_id};
use crate::transitions::{
    DEFAULT_TRANSITION_DURATION, DEFAULT_WHIP_PAN_SFX_GAIN_DB, TransitionKind, TransitionPlan,
    build_plan, normalize_duration, normalize_gain, normalize_track_id, normalize_type,
};
use crate::utils::format_duration;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// ============================================================================
// REQUEST
// ============================================================================

/// A concatenation request.
///
/// Field names follow the JSON payload of the HTTP service this library
/// backs. Clips may be given as plain strings or, under the `video_urls` key,
/// as `{"video_url": ...}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcatRequest {
    #[serde(alias = "video_urls", deserialize_with = "deserialize_clips")]
    pub clips: Vec<String>,
    pub id: Option<String>,
    pub transition_type: Option<String>,
    pub transition_duration: Option<f64>,
    pub transition_sequence: Option<Vec<String>>,
    pub whip_pan_sfx_gain_db: Option<f64>,
    pub transition_sfx_track_id: Option<i64>,
}

fn deserialize_clips<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ClipSource {
        Plain(String),
        Object { video_url: String },
    }

    Ok(Vec::<ClipSource>::deserialize(deserializer)?
        .into_iter()
        .map(|source| match source {
            ClipSource::Plain(url) | ClipSource::Object { video_url: url } => url,
        })
        .collect())
}

/// A request with every knob validated and clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatJob {
    pub job_id: String,
    pub sources: Vec<String>,
    pub plan: TransitionPlan,
    pub transition_duration: f64,
    pub sfx_gain_db: f64,
    pub sfx_track: Option<u8>,
}

impl ConcatRequest {
    /// Validates the request without touching any file.
    pub fn normalize(&self) -> CoreResult<ConcatJob> {
        if self.clips.is_empty() {
            return Err(CoreError::InvalidInput(
                "at least one clip is required".to_string(),
            ));
        }

        let default_kind = match self.transition_type.as_deref() {
            Some(requested) => normalize_type(requested)?,
            None => TransitionKind::None,
        };
        let transition_duration =
            normalize_duration(self.transition_duration.unwrap_or(DEFAULT_TRANSITION_DURATION))?;
        let sfx_gain_db =
            normalize_gain(self.whip_pan_sfx_gain_db.unwrap_or(DEFAULT_WHIP_PAN_SFX_GAIN_DB))?;
        let sfx_track = normalize_track_id(self.transition_sfx_track_id);

        // An empty sequence means "use the default transition".
        let sequence = self
            .transition_sequence
            .as_deref()
            .filter(|sequence| !sequence.is_empty());
        let plan = build_plan(self.clips.len(), default_kind, sequence)?;

        let job_id = resolve_job_id(self.id.as_deref())?;

        Ok(ConcatJob {
            job_id,
            sources: self.clips.clone(),
            plan,
            transition_duration,
            sfx_gain_db,
            sfx_track,
        })
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of a finished concatenation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcatOutcome {
    pub job_id: String,
    pub output_path: PathBuf,
    /// False when the clips were joined by stream copy.
    pub transitions_applied: bool,
    pub sound_effect: SoundEffectStatus,
    /// Track id of the dedicated SFX stream, when one was written.
    pub sfx_track: Option<u8>,
    /// Planned duration of the output, in seconds.
    pub duration: f64,
}

/// A synthesized engine command plus the artifacts it needs while running.
struct PreparedConcat {
    command: EngineCommand,
    outcome: ConcatOutcome,
    // Held so the concat list outlives the engine run.
    _concat_list: Option<NamedTempFile>,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs a concatenation job end to end.
///
/// Fetched inputs and the concat list are deleted on every exit path. No
/// step is retried.
pub fn process_concatenate<S, P, F>(
    spawner: &S,
    prober: &P,
    fetcher: &F,
    config: &ConcatConfig,
    request: &ConcatRequest,
) -> CoreResult<ConcatOutcome>
where
    S: FfmpegSpawner,
    P: MediaProber + Sync,
    F: AssetFetcher,
{
    config.validate()?;
    let job = request.normalize()?;
    info!(
        "Starting job {} with {} clip(s), plan: {}",
        job.job_id,
        job.sources.len(),
        describe_plan(&job.plan)
    );

    let temp_dir = config.temp_base_dir();
    std::fs::create_dir_all(temp_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let inputs = fetch_all(fetcher, &job.sources, temp_dir, &job.job_id)?;
    let clips = probe_clips(prober, inputs.paths())?;
    let prepared = prepare(&job, &clips, config)?;

    run_engine(spawner, &prepared.command)?;

    info!(
        "Job {} finished: {} ({})",
        job.job_id,
        prepared.outcome.output_path.display(),
        format_duration(prepared.outcome.duration)
    );
    Ok(prepared.outcome)
}

/// Resolves a job down to its engine command without running it.
///
/// Inputs are still fetched and probed since timing depends on clip
/// durations; they are deleted before returning.
pub fn plan_concatenate<P, F>(
    prober: &P,
    fetcher: &F,
    config: &ConcatConfig,
    request: &ConcatRequest,
) -> CoreResult<EngineCommand>
where
    P: MediaProber + Sync,
    F: AssetFetcher,
{
    config.validate()?;
    let job = request.normalize()?;

    let temp_dir = config.temp_base_dir();
    std::fs::create_dir_all(temp_dir)?;

    let inputs = fetch_all(fetcher, &job.sources, temp_dir, &job.job_id)?;
    let clips = probe_clips(prober, inputs.paths())?;
    Ok(prepare(&job, &clips, config)?.command)
}

/// Probes every clip in parallel, keeping input order.
pub fn probe_clips<P: MediaProber + Sync>(prober: &P, paths: &[PathBuf]) -> CoreResult<Vec<Clip>> {
    paths
        .par_iter()
        .map(|path| prober.probe_clip(path))
        .collect()
}

fn prepare(job: &ConcatJob, clips: &[Clip], config: &ConcatConfig) -> CoreResult<PreparedConcat> {
    let output_path = config.output_dir.join(format!("{}.mp4", job.job_id));

    if !job.plan.requires_transitions() {
        let list = write_concat_list(config.temp_base_dir(), &job.job_id, clips)?;
        let command = EngineCommand::for_concat_list(list.path(), config.overwrite, &output_path);
        return Ok(PreparedConcat {
            command,
            outcome: ConcatOutcome {
                job_id: job.job_id.clone(),
                output_path,
                transitions_applied: false,
                sound_effect: SoundEffectStatus::NotRequested,
                sfx_track: None,
                duration: clips.iter().map(|clip| clip.duration).sum(),
            },
            _concat_list: Some(list),
        });
    }

    let settings = CompositorSettings {
        transition_duration: job.transition_duration,
        sample_rate: config.sample_rate,
        sfx_asset: config.sfx_asset.clone(),
        sfx_gain_db: job.sfx_gain_db,
        sfx_track: job.sfx_track,
    };
    let built = build_transition_graph(clips, &job.plan, &settings)?;
    debug!(
        "Built graph with {} input(s), {} output stream(s)",
        built.graph.inputs().len(),
        built.output.stream_count()
    );
    let command =
        EngineCommand::for_transitions(&built.graph, &built.output, config, &output_path);
    let sfx_track = if built.output.stream_count() == 3 {
        job.sfx_track
    } else {
        None
    };

    Ok(PreparedConcat {
        command,
        outcome: ConcatOutcome {
            job_id: job.job_id.clone(),
            output_path,
            transitions_applied: true,
            sound_effect: built.sound_effect,
            sfx_track,
            duration: built.duration,
        },
        _concat_list: None,
    })
}

/// Writes a concat demuxer list naming every clip by absolute path.
fn write_concat_list(dir: &Path, job_id: &str, clips: &[Clip]) -> CoreResult<NamedTempFile> {
    let mut list = create_temp_file(dir, &format!("{job_id}_concat_list"), "txt")?;
    for clip in clips {
        let absolute = std::path::absolute(&clip.path)?;
        writeln!(list, "{}", concat_list_entry(&absolute))?;
    }
    list.flush()?;
    Ok(list)
}

/// One `file '<path>'` line with embedded single quotes escaped.
pub fn concat_list_entry(path: &Path) -> String {
    format!("file '{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

fn describe_plan(plan: &TransitionPlan) -> String {
    if plan.is_empty() {
        return "single clip".to_string();
    }
    plan.entries()
        .iter()
        .map(|kind| kind.key())
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// TESTS
// ============================================================================
