//! Crossplay - Unified CLI
//!
//! Validates puzzle files and plays scripted sessions against an in-memory
//! store.

#![warn(missing_docs)]

mod cli;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use crossplay::{
    ClientConfig, MemoryStore, SessionClient, load_puzzle, load_script, render_active_clue,
    render_board, render_summary,
};
use crossplay_core::{Orientation, validate_puzzle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { puzzle } => {
            init_tracing(ClientConfig::default().log_filter());
            run_validate(puzzle)
        }
        Command::Play {
            puzzle,
            script,
            config,
        } => {
            let config = match config {
                Some(path) => ClientConfig::from_file(path)?,
                None => ClientConfig::default(),
            };
            init_tracing(config.log_filter());
            run_play(puzzle, script, config).await
        }
    }
}

/// Installs the fmt subscriber; `RUST_LOG` wins over the configured filter.
fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load and validate a puzzle file
#[instrument(skip(path), fields(path = %path.display()))]
fn run_validate(path: PathBuf) -> Result<()> {
    let puzzle = load_puzzle(&path)?;
    validate_puzzle(&puzzle)?;

    let (width, height) = puzzle.size();
    info!(puzzle_id = %puzzle.puzzle_id, "Puzzle is valid");
    println!(
        "{}: {}x{}, {} across, {} down, {} playable cells",
        puzzle.puzzle_id,
        width,
        height,
        puzzle.clues.for_orientation(Orientation::Horizontal).len(),
        puzzle.clues.for_orientation(Orientation::Vertical).len(),
        puzzle.playable_keys().count()
    );
    Ok(())
}

/// Play a scripted session and print the resulting board
#[instrument(skip(config), fields(participant_id = %config.participant_id()))]
async fn run_play(puzzle: PathBuf, script: PathBuf, config: ClientConfig) -> Result<()> {
    let puzzle = load_puzzle(&puzzle)?;
    let actions = load_script(&script)?;

    let store = Arc::new(MemoryStore::new());
    let participant = config.participant();
    let session_id = store.create_session(puzzle, participant.clone())?;
    let client =
        SessionClient::open(Arc::clone(&store), &session_id, participant, config.local_state())
            .await?;

    info!(count = actions.len(), "Playing script");
    for action in actions {
        let name = action.name();
        if let Err(e) = client.dispatch(action).await {
            warn!(action = name, error = %e, "Action failed");
        }
    }

    let state = client.sync().await?;
    let Some(session) = &state.session else {
        bail!("Session {} never loaded", session_id);
    };

    print!("{}", render_board(session, &state.local)?);
    if let Some(clue) = render_active_clue(session, &state.local) {
        println!("{clue}");
    }
    println!("{}", render_summary(session));

    client.close();
    Ok(())
}
