// clipweave-cli/src/commands/concat.rs
//
// Contains the logic for the 'concat' subcommand.

use crate::cli::ConcatArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::commands::print_json;
use clipweave_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use clipweave_core::{
    ConcatConfig, ConcatRequest, LocalFileFetcher, check_dependency, generate_job_id,
    plan_concatenate, process_concatenate,
};
use log::info;
use std::fs;

/// Runs the concat command.
pub fn run_concat(args: ConcatArgs) -> CliResult<()> {
    let mut request = build_request(&args)?;
    request.id.get_or_insert_with(generate_job_id);

    // Bad requests fail here, before any tool or input is touched.
    let job = request.normalize()?;
    info!("Job id: {}", job.job_id);

    let config = build_config(&args);
    check_dependency("ffprobe")?;

    let prober = CrateFfprobeExecutor::new();
    let fetcher = LocalFileFetcher::new();

    if args.dry_run {
        let command = plan_concatenate(&prober, &fetcher, &config, &request)?;
        println!("{command}");
        return Ok(());
    }

    check_dependency("ffmpeg")?;
    let outcome = process_concatenate(&SidecarSpawner, &prober, &fetcher, &config, &request)?;
    print_json(&outcome)
}

/// Builds the request from the optional JSON file, then applies flags.
pub fn build_request(args: &ConcatArgs) -> CliResult<ConcatRequest> {
    let mut request = match &args.request {
        Some(path) => {
            let text = fs::read_to_string(path)
                .cli_with_context(|| format!("Failed to read request file {}", path.display()))?;
            serde_json::from_str(&text).map_err(|e| {
                crate::cli_error!("Invalid request file {}: {e}", path.display())
            })?
        }
        None => ConcatRequest::default(),
    };

    if !args.clips.is_empty() {
        request.clips = args.clips.clone();
    }
    if let Some(kind) = &args.transition {
        request.transition_type = Some(kind.clone());
    }
    if let Some(duration) = args.duration {
        request.transition_duration = Some(duration);
    }
    if let Some(sequence) = &args.sequence {
        request.transition_sequence = Some(sequence.clone());
    }
    if let Some(gain) = args.sfx_gain_db {
        request.whip_pan_sfx_gain_db = Some(gain);
    }
    if let Some(track) = args.sfx_track_id {
        request.transition_sfx_track_id = Some(track);
    }
    if let Some(id) = &args.job_id {
        request.id = Some(id.clone());
    }
    Ok(request)
}

/// Environment configuration with command-line overrides.
pub fn build_config(args: &ConcatArgs) -> ConcatConfig {
    let env = ConcatConfig::from_env();
    ConcatConfig {
        output_dir: args.output_dir.clone(),
        temp_dir: args.temp_dir.clone().or(env.temp_dir.clone()),
        sfx_asset: args.sfx_asset.clone().or(env.sfx_asset.clone()),
        ..env
    }
}
