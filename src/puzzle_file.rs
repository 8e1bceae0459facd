//! Loading puzzles and action scripts from JSON files.

use crossplay_core::{Action, Puzzle};
use derive_more::{Display, Error};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Error reading a puzzle or script file.
#[derive(Debug, Clone, Display, Error)]
#[display("Puzzle file error: {} at {}:{}", message, file, line)]
pub struct PuzzleFileError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PuzzleFileError {
    /// Creates a new puzzle file error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

fn read(path: &Path) -> Result<String, PuzzleFileError> {
    std::fs::read_to_string(path)
        .map_err(|e| PuzzleFileError::new(format!("Failed to read {}: {}", path.display(), e)))
}

/// Loads a puzzle document.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_puzzle(path: impl AsRef<Path>) -> Result<Puzzle, PuzzleFileError> {
    let content = read(path.as_ref())?;
    let puzzle = Puzzle::from_json_str(&content)
        .map_err(|e| PuzzleFileError::new(format!("Failed to parse puzzle: {}", e)))?;
    info!(puzzle_id = %puzzle.puzzle_id, cells = puzzle.solutions.len(), "Puzzle loaded");
    Ok(puzzle)
}

/// Loads an action script: a JSON array of actions.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<Action>, PuzzleFileError> {
    let content = read(path.as_ref())?;
    let actions: Vec<Action> = serde_json::from_str(&content)
        .map_err(|e| PuzzleFileError::new(format!("Failed to parse script: {}", e)))?;
    debug!(count = actions.len(), "Script loaded");
    Ok(actions)
}
