//! Clue index: which clue owns a cell, and clue-to-clue traversal.
//!
//! Traversal treats both orientations as one ring: the last across clue is
//! followed by the first down clue and the last down clue by the first
//! across clue. Crossing either seam is reported as a puzzle loop.

use crate::error::CoreError;
use crate::geometry::CellKey;
use crate::types::{Clue, Orientation, Puzzle};
use tracing::instrument;

/// Result of stepping from one clue to the next or previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClueStep<'a> {
    /// The clue stepped to.
    pub clue: &'a Clue,
    /// Its orientation (flipped when the ring seam was crossed).
    pub orientation: Orientation,
    /// Whether the step wrapped across an orientation boundary.
    pub did_loop_puzzle: bool,
}

/// Finds the clue of `orientation` whose span contains `key`.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] for blocked cells and for cells no clue
/// of that orientation covers.
#[instrument(skip(puzzle), fields(puzzle_id = %puzzle.puzzle_id))]
pub fn clue_for_cell(
    key: CellKey,
    orientation: Orientation,
    puzzle: &Puzzle,
) -> Result<&Clue, CoreError> {
    let not_found = CoreError::NoClueFound { key, orientation };
    if !puzzle.is_playable(key) {
        return Err(not_found);
    }
    puzzle
        .clues
        .for_orientation(orientation)
        .iter()
        .find(|clue| clue.covers(key, orientation))
        .ok_or(not_found)
}

/// Grid number for `key` if it starts an across or down clue.
pub fn clue_number_for_cell(key: CellKey, puzzle: &Puzzle) -> Option<u32> {
    puzzle
        .clues
        .horizontal
        .iter()
        .chain(puzzle.clues.vertical.iter())
        .find(|clue| clue.start() == key)
        .map(|clue| clue.number)
}

/// Finds a clue by grid number within one orientation.
pub fn clue_by_number(puzzle: &Puzzle, orientation: Orientation, number: u32) -> Option<&Clue> {
    puzzle
        .clues
        .for_orientation(orientation)
        .iter()
        .find(|clue| clue.number == number)
}

/// Index of `clue` within its orientation's list.
pub fn clue_position(puzzle: &Puzzle, clue: &Clue, orientation: Orientation) -> Option<usize> {
    puzzle
        .clues
        .for_orientation(orientation)
        .iter()
        .position(|candidate| candidate.number == clue.number && candidate.start() == clue.start())
}

/// Steps to the next clue, wrapping to the first clue of the other orientation.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if `clue` is not part of the puzzle.
#[instrument(skip(puzzle, clue), fields(number = clue.number))]
pub fn next_clue<'a>(
    puzzle: &'a Puzzle,
    clue: &Clue,
    orientation: Orientation,
) -> Result<ClueStep<'a>, CoreError> {
    let list = puzzle.clues.for_orientation(orientation);
    let index = clue_position(puzzle, clue, orientation).ok_or(CoreError::NoClueFound {
        key: clue.start(),
        orientation,
    })?;

    if let Some(next) = list.get(index + 1) {
        return Ok(ClueStep {
            clue: next,
            orientation,
            did_loop_puzzle: false,
        });
    }

    // Past the end: enter the other orientation at its first clue.
    let other = orientation.flipped();
    let step = match puzzle.clues.for_orientation(other).first() {
        Some(first) => ClueStep {
            clue: first,
            orientation: other,
            did_loop_puzzle: true,
        },
        None => ClueStep {
            clue: &list[0],
            orientation,
            did_loop_puzzle: true,
        },
    };
    Ok(step)
}

/// Steps to the previous clue, wrapping to the last clue of the other orientation.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if `clue` is not part of the puzzle.
#[instrument(skip(puzzle, clue), fields(number = clue.number))]
pub fn previous_clue<'a>(
    puzzle: &'a Puzzle,
    clue: &Clue,
    orientation: Orientation,
) -> Result<ClueStep<'a>, CoreError> {
    let list = puzzle.clues.for_orientation(orientation);
    let index = clue_position(puzzle, clue, orientation).ok_or(CoreError::NoClueFound {
        key: clue.start(),
        orientation,
    })?;

    if index > 0 {
        return Ok(ClueStep {
            clue: &list[index - 1],
            orientation,
            did_loop_puzzle: false,
        });
    }

    let other = orientation.flipped();
    let step = match puzzle.clues.for_orientation(other).last() {
        Some(last) => ClueStep {
            clue: last,
            orientation: other,
            did_loop_puzzle: true,
        },
        None => ClueStep {
            clue: &list[list.len() - 1],
            orientation,
            did_loop_puzzle: true,
        },
    };
    Ok(step)
}
