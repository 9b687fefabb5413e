// clipweave-cli/src/main.rs
//
// Entry point for the clipweave command-line tool.
//
// Responsibilities include:
// - Parsing command-line arguments with clap.
// - Setting up logging to the console and, optionally, a log file.
// - Dispatching to the command implementations in `commands`.
// - Mapping failures to a non-zero exit code.

use clap::Parser;
use clipweave_cli::logging::init_logging;
use clipweave_cli::{Cli, Commands, run_concat, run_merge_tracks, run_probe};
use std::process;

fn main() {
    let cli = Cli::parse();

    match init_logging(cli.verbose, cli.log_dir.as_deref()) {
        Ok(Some(log_path)) => log::info!("Logging to {}", log_path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Concat(args) => run_concat(args),
        Commands::Probe(args) => run_probe(args),
        Commands::MergeTracks(args) => run_merge_tracks(args),
    };

    if let Err(e) = result {
        if e.is_user_error() {
            log::warn!("Rejected request: {e}");
        } else {
            log::error!("{e}");
        }
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
