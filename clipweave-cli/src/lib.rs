// ============================================================================
// clipweave-cli/src/lib.rs
// ============================================================================
//
// CLIPWEAVE CLI LIBRARY: Command-Line Interface Components
//
// This file defines the library interface for the clipweave-cli crate,
// exposing the argument definitions, command implementations and logging
// setup so they can be tested without spawning the binary.
//
// KEY COMPONENTS:
// - CLI argument definitions (Cli, Commands, ConcatArgs, ...)
// - Command implementations (concat, probe, merge-tracks)
// - Logging setup (env_logger console, fern file output)

// ---- Public modules ----
pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// ---- Re-exports ----
pub use cli::{Cli, Commands, ConcatArgs, MergeTracksArgs, ProbeArgs};
pub use commands::{run_concat, run_merge_tracks, run_probe};
pub use error::{CliErrorContext, CliResult};
