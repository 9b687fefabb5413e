// clipweave-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use clipweave_core::TrackGain;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clipweave: stitch video clips with transitions",
    long_about = "Joins clips with cross-fades, whip pans and an optional dedicated sound effect track using ffmpeg via clipweave-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG still takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write logs to a timestamped file in this directory.
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Joins clips into one video, with optional transitions at every boundary
    Concat(ConcatArgs),
    /// Prints a JSON report of the audio tracks of a media file
    Probe(ProbeArgs),
    /// Mixes every audio track of a file into one loudness-normalized track
    MergeTracks(MergeTracksArgs),
}

#[derive(Args, Debug)]
pub struct ConcatArgs {
    /// Clips to join, in order (local paths or file:// URLs)
    #[arg(value_name = "CLIP")]
    pub clips: Vec<String>,

    /// Directory where the output file will be saved
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Optional: Directory for temporary files (defaults to OUTPUT_DIR)
    #[arg(long, value_name = "TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Optional: JSON request file; command-line values override its fields
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Transition used at every boundary (e.g. fade, whip_pan, none)
    #[arg(short, long, value_name = "TYPE")]
    pub transition: Option<String>,

    /// Requested transition duration in seconds (clamped to 0.2-5.0)
    #[arg(short, long, value_name = "SECONDS")]
    pub duration: Option<f64>,

    /// Comma-separated transition per boundary (overrides --transition)
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub sequence: Option<Vec<String>>,

    /// Whip pan sound effect gain in dB (clamped to -60..6)
    #[arg(long, value_name = "DB", allow_negative_numbers = true)]
    pub sfx_gain_db: Option<f64>,

    /// Write whip pan sound effects to a separate audio track (0-15)
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub sfx_track_id: Option<i64>,

    /// Whoosh sound asset for whip pan transitions.
    /// Can also be set via the CLIPWEAVE_SFX_ASSET environment variable.
    #[arg(long, value_name = "PATH")]
    pub sfx_asset: Option<PathBuf>,

    /// Optional: Job id used to name the output (generated when absent)
    #[arg(long, value_name = "ID")]
    pub job_id: Option<String>,

    /// Print the ffmpeg command instead of running it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct MergeTracksArgs {
    /// Media file whose audio tracks are merged
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Directory where the output file will be saved
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Target integrated loudness in LUFS (clamped to -70..-5)
    #[arg(long, value_name = "LUFS", allow_negative_numbers = true)]
    pub target_lufs: Option<f64>,

    /// Maximum true peak in dBTP (clamped to -9..0)
    #[arg(long, value_name = "DBTP", allow_negative_numbers = true)]
    pub true_peak: Option<f64>,

    /// Target loudness range in LU (clamped to 1..20)
    #[arg(long, value_name = "LU")]
    pub lra: Option<f64>,

    /// Per-track gain as TRACK=DB, e.g. --gain 1=-3 (repeatable)
    #[arg(long = "gain", value_name = "TRACK=DB", value_parser = parse_track_gain, allow_hyphen_values = true)]
    pub gains: Vec<TrackGain>,

    /// Optional: Job id used to name the output (generated when absent)
    #[arg(long, value_name = "ID")]
    pub job_id: Option<String>,
}

/// Parses a `TRACK=DB` gain adjustment.
pub fn parse_track_gain(value: &str) -> Result<TrackGain, String> {
    let (track, gain) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TRACK=DB, got '{value}'"))?;
    let track_id = track
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid track id '{track}': {e}"))?;
    let gain_db = gain
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid gain '{gain}': {e}"))?;
    Ok(TrackGain { track_id, gain_db })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_concat_args() {
        let cli = Cli::parse_from([
            "clipweave",
            "--verbose",
            "concat",
            "a.mp4",
            "b.mp4",
            "-o",
            "out",
            "--transition",
            "whip_pan",
            "--sfx-gain-db",
            "-3",
            "--sequence",
            "fade,whip_pan",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Concat(args) => {
                assert_eq!(args.clips, vec!["a.mp4", "b.mp4"]);
                assert_eq!(args.output_dir, PathBuf::from("out"));
                assert_eq!(args.transition.as_deref(), Some("whip_pan"));
                assert_eq!(args.sfx_gain_db, Some(-3.0));
                assert_eq!(
                    args.sequence,
                    Some(vec!["fade".to_string(), "whip_pan".to_string()])
                );
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_merge_tracks_gains() {
        let cli = Cli::parse_from([
            "clipweave",
            "merge-tracks",
            "talk.mkv",
            "-o",
            "out",
            "--gain",
            "0=2.5",
            "--gain",
            "1=-3",
            "--target-lufs",
            "-16",
        ]);
        match cli.command {
            Commands::MergeTracks(args) => {
                assert_eq!(args.target_lufs, Some(-16.0));
                assert_eq!(
                    args.gains,
                    vec![
                        TrackGain {
                            track_id: 0,
                            gain_db: 2.5
                        },
                        TrackGain {
                            track_id: 1,
                            gain_db: -3.0
                        },
                    ]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_track_gain_rejects_garbage() {
        assert!(parse_track_gain("loud").is_err());
        assert!(parse_track_gain("x=3").is_err());
        assert!(parse_track_gain("1=loud").is_err());
    }

    #[test]
    fn test_concat_requires_output() {
        assert!(Cli::try_parse_from(["clipweave", "concat", "a.mp4"]).is_err());
    }
}
