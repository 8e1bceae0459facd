//! Command-line interface for crossplay.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crossplay - collaborative crossword sessions
#[derive(Parser, Debug)]
#[command(name = "crossplay")]
#[command(about = "Collaborative crossword session engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a puzzle file and check that its clues match its grid
    Validate {
        /// Path to the puzzle JSON
        #[arg(short, long)]
        puzzle: PathBuf,
    },

    /// Play a scripted session against an in-memory store
    Play {
        /// Path to the puzzle JSON
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Path to a JSON array of actions
        #[arg(short, long)]
        script: PathBuf,

        /// Path to client config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
