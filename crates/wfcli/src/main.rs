//! `wfcli`: a thin local inspection tool for a persisted mutable-state
//! execution (spec.md §1 treats the RPC surface and queue processors as
//! external collaborators — this binary is a developer utility only, not a
//! server or queue processor).

mod commands;
mod exit_error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "wfcli", about = "Inspect persisted workflow mutable state", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of a persisted `WorkflowMutableState` JSON file.
    Inspect {
        /// Path to a JSON-encoded `WorkflowMutableState`.
        path: PathBuf,
    },
    /// Print the events in a persisted `WorkflowEvents` JSON batch.
    Events {
        /// Path to a JSON-encoded `WorkflowEvents` batch.
        path: PathBuf,
    },
    /// Check a persisted `WorkflowMutableState` against spec.md §8's
    /// quantified invariants.
    Validate {
        /// Path to a JSON-encoded `WorkflowMutableState`.
        path: PathBuf,
    },
}

fn run(cli: Cli) -> Result<(), ExitError> {
    match cli.command {
        Command::Inspect { path } => commands::inspect::run(&path),
        Command::Events { path } => commands::events::run(&path),
        Command::Validate { path } => commands::validate::run(&path),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code.clamp(0, 255) as u8)
        }
    }
}
