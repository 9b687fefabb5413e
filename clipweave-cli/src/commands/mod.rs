//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Joins clips with transitions.
pub mod concat;
/// Merges the audio tracks of one file.
pub mod merge_tracks;
/// Reports the audio tracks of one file.
pub mod probe;

pub use concat::run_concat;
pub use merge_tracks::run_merge_tracks;
pub use probe::run_probe;

use crate::error::CliResult;

/// Prints a serializable value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| crate::cli_error!("Failed to serialize result: {e}"))?;
    println!("{text}");
    Ok(())
}
