// clipweave-cli/src/commands/merge_tracks.rs
//
// Contains the logic for the 'merge-tracks' subcommand.

use crate::cli::MergeTracksArgs;
use crate::commands::print_json;
use crate::error::CliResult;
use clipweave_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use clipweave_core::{
    ConcatConfig, LocalFileFetcher, MergeTracksRequest, check_dependency, process_merge_tracks,
};

/// Runs the merge-tracks command.
pub fn run_merge_tracks(args: MergeTracksArgs) -> CliResult<()> {
    let request = build_request(&args);
    request.loudness_target()?;
    request.track_gains()?;

    let config = ConcatConfig {
        output_dir: args.output_dir.clone(),
        ..ConcatConfig::from_env()
    };

    check_dependency("ffprobe")?;
    check_dependency("ffmpeg")?;

    let outcome = process_merge_tracks(
        &SidecarSpawner,
        &CrateFfprobeExecutor::new(),
        &LocalFileFetcher::new(),
        &config,
        &request,
    )?;
    print_json(&outcome)
}

fn build_request(args: &MergeTracksArgs) -> MergeTracksRequest {
    MergeTracksRequest {
        source: args.file.clone(),
        id: args.job_id.clone(),
        target_lufs: args.target_lufs,
        true_peak: args.true_peak,
        loudness_range: args.lra,
        gain_adjustments: args.gains.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_request_from_flags() {
        let cli = Cli::parse_from([
            "clipweave",
            "merge-tracks",
            "talk.mkv",
            "-o",
            "out",
            "--lra",
            "40",
            "--gain",
            "1=-3",
        ]);
        let Commands::MergeTracks(args) = cli.command else {
            panic!("expected merge-tracks");
        };
        let request = build_request(&args);
        assert_eq!(request.source, "talk.mkv");
        // Knobs are clamped, not rejected.
        assert_eq!(request.loudness_target().unwrap().loudness_range, 20.0);
        assert_eq!(request.track_gains().unwrap().get(&1), Some(&-3.0));
    }
}
