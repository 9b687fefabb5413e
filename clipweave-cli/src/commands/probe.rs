// clipweave-cli/src/commands/probe.rs
//
// Contains the logic for the 'probe' subcommand.

use crate::cli::ProbeArgs;
use crate::commands::print_json;
use crate::error::CliResult;
use clipweave_core::check_dependency;
use clipweave_core::external::{CrateFfprobeExecutor, MediaProber};

/// Prints the audio track report of one file.
pub fn run_probe(args: ProbeArgs) -> CliResult<()> {
    if !args.file.is_file() {
        return Err(crate::cli_error!(
            "Input file not found: {}",
            args.file.display()
        ));
    }
    check_dependency("ffprobe")?;

    let report = CrateFfprobeExecutor::new().probe_audio_tracks(&args.file)?;
    log::info!(
        "{}: {} audio track(s)",
        report.path.display(),
        report.audio_tracks.len()
    );
    print_json(&report)
}
