//! Completion detection and answer verification.

use crate::types::{BoardState, Solution, SolutionState, Solutions};
use tracing::{debug, instrument};

/// Verifies one entry against its solution.
///
/// An entry is correct when it equals the single answer or any alternative of
/// a multi-answer cell. The verdict is binary: `Revealed` or `Wrong`.
pub fn check_cell(value: &str, solution: &Solution) -> SolutionState {
    if solution.accepts(value) {
        SolutionState::Revealed
    } else {
        SolutionState::Wrong
    }
}

/// Share of playable cells holding a letter, in percent.
///
/// A puzzle with no playable cells is 0% complete.
pub fn percentage_complete(board: &BoardState, solutions: &Solutions) -> f64 {
    let mut total = 0usize;
    let mut filled = 0usize;
    for (key, solution) in solutions {
        if !solution.is_playable() {
            continue;
        }
        total += 1;
        if board.get(key).is_some_and(|cell| cell.is_filled()) {
            filled += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    filled as f64 / total as f64 * 100.0
}

/// Whether every playable cell holds a letter.
pub fn is_puzzle_complete(board: &BoardState, solutions: &Solutions) -> bool {
    percentage_complete(board, solutions) >= 100.0
}

/// Whether every filled cell is correct. Empty cells are ignored.
#[instrument(skip_all)]
pub fn check_puzzle(board: &BoardState, solutions: &Solutions) -> bool {
    let wrong = board
        .iter()
        .filter(|(_, cell)| cell.is_filled())
        .find(|(key, cell)| {
            solutions
                .get(*key)
                .is_none_or(|solution| check_cell(cell.letter(), solution) == SolutionState::Wrong)
        });
    match wrong {
        Some((key, cell)) => {
            debug!(%key, letter = cell.letter(), "Incorrect entry");
            false
        }
        None => true,
    }
}
