//! Cursor navigation over the clue ring.
//!
//! All functions are pure lookups over a puzzle and board; the reducer
//! decides when to call them and writes the result into local state.

use crate::clues::{ClueStep, clue_for_cell, next_clue, previous_clue};
use crate::error::CoreError;
use crate::geometry::{CellKey, Direction, cell_keys_for_clue, step};
use crate::types::{BoardState, Clue, Orientation, Puzzle};
use tracing::{debug, instrument};

/// A cursor position: a cell and the direction typing proceeds in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Selected cell.
    pub key: CellKey,
    /// Typing direction.
    pub orientation: Orientation,
}

impl Cursor {
    /// Creates a cursor.
    pub fn new(key: CellKey, orientation: Orientation) -> Self {
        Self { key, orientation }
    }
}

fn is_empty(board: &BoardState, puzzle: &Puzzle, key: CellKey) -> bool {
    puzzle.is_playable(key) && board.get(&key).is_some_and(|cell| !cell.is_filled())
}

fn first_empty_in(board: &BoardState, puzzle: &Puzzle, cells: &[CellKey]) -> Option<CellKey> {
    cells
        .iter()
        .copied()
        .find(|key| is_empty(board, puzzle, *key))
}

fn clue_count(puzzle: &Puzzle) -> usize {
    puzzle.clues.horizontal.len() + puzzle.clues.vertical.len()
}

/// Orientation to use at `key`: `preferred` if a clue of that orientation
/// covers it, otherwise the other one, or `None` if neither does.
pub fn orientation_at(
    puzzle: &Puzzle,
    key: CellKey,
    preferred: Orientation,
) -> Option<Orientation> {
    [preferred, preferred.flipped()]
        .into_iter()
        .find(|orientation| clue_for_cell(key, *orientation, puzzle).is_ok())
}

/// The first empty playable cell in scan order, else the first playable cell.
///
/// # Errors
///
/// Returns [`CoreError::NoSelectableCellFound`] if nothing is playable.
#[instrument(skip_all)]
pub fn first_selectable_cell(
    puzzle: &Puzzle,
    board: &BoardState,
    preferred: Orientation,
) -> Result<Cursor, CoreError> {
    let key = puzzle
        .playable_keys()
        .find(|key| is_empty(board, puzzle, *key))
        .or_else(|| puzzle.playable_keys().next())
        .ok_or(CoreError::NoSelectableCellFound)?;
    let orientation = orientation_at(puzzle, key, preferred).ok_or(CoreError::NoClueFound {
        key,
        orientation: preferred,
    })?;
    Ok(Cursor::new(key, orientation))
}

/// Searches clues around the ring starting at `start` (inclusive) for a
/// clue with an empty cell and returns that cell.
fn first_empty_on_ring(
    puzzle: &Puzzle,
    board: &BoardState,
    start: ClueStep<'_>,
    forward: bool,
) -> Result<Option<Cursor>, CoreError> {
    let mut current = start;
    for _ in 0..clue_count(puzzle) {
        let cells = cell_keys_for_clue(current.clue, current.orientation);
        if let Some(key) = first_empty_in(board, puzzle, &cells) {
            return Ok(Some(Cursor::new(key, current.orientation)));
        }
        current = if forward {
            next_clue(puzzle, current.clue, current.orientation)?
        } else {
            previous_clue(puzzle, current.clue, current.orientation)?
        };
    }
    Ok(None)
}

fn first_cell(step: ClueStep<'_>) -> Cursor {
    Cursor::new(step.clue.start(), step.orientation)
}

fn position_in(cells: &[CellKey], key: CellKey) -> usize {
    cells.iter().position(|cell| *cell == key).unwrap_or_default()
}

/// The nearest empty cell after `cursor` in traversal order.
///
/// Searches the rest of the current clue, then every other clue around the
/// ring, then the start of the current clue. With no empty cell anywhere the
/// cursor moves to the start of the next clue.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if the cursor cell has no clue in its
/// orientation.
#[instrument(skip(puzzle, board))]
pub fn next_empty_cell(
    puzzle: &Puzzle,
    board: &BoardState,
    cursor: Cursor,
) -> Result<Cursor, CoreError> {
    let clue = clue_for_cell(cursor.key, cursor.orientation, puzzle)?;
    let cells = cell_keys_for_clue(clue, cursor.orientation);
    let position = position_in(&cells, cursor.key);

    if let Some(key) = first_empty_in(board, puzzle, &cells[position + 1..]) {
        return Ok(Cursor::new(key, cursor.orientation));
    }

    let next = next_clue(puzzle, clue, cursor.orientation)?;
    if let Some(found) = first_empty_on_ring(puzzle, board, next, true)? {
        return Ok(found);
    }

    debug!("No empty cell left, moving to next clue");
    Ok(first_cell(next))
}

/// Where the cursor goes after a letter is entered at `cursor`.
///
/// Stays within the clue while there is a following cell; at the end of the
/// clue it jumps to the next empty cell instead of crossing into whatever
/// clue happens to be adjacent.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if the cursor cell has no clue in its
/// orientation.
pub fn advance_after_entry(
    puzzle: &Puzzle,
    board: &BoardState,
    cursor: Cursor,
) -> Result<Cursor, CoreError> {
    let clue = clue_for_cell(cursor.key, cursor.orientation, puzzle)?;
    let cells = cell_keys_for_clue(clue, cursor.orientation);
    match cells.get(position_in(&cells, cursor.key) + 1) {
        Some(next) => Ok(Cursor::new(*next, cursor.orientation)),
        None => next_empty_cell(puzzle, board, cursor),
    }
}

/// The cell before `cursor`, stepping into the previous clue's last cell at
/// a clue start. Returns `None` at the start of the puzzle.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if the cursor cell has no clue in its
/// orientation.
pub fn retreat(puzzle: &Puzzle, cursor: Cursor) -> Result<Option<Cursor>, CoreError> {
    let clue = clue_for_cell(cursor.key, cursor.orientation, puzzle)?;
    let cells = cell_keys_for_clue(clue, cursor.orientation);
    let position = position_in(&cells, cursor.key);
    if position > 0 {
        return Ok(Some(Cursor::new(cells[position - 1], cursor.orientation)));
    }

    let previous = previous_clue(puzzle, clue, cursor.orientation)?;
    if previous.did_loop_puzzle {
        return Ok(None);
    }
    let last = last_cell(previous.clue, previous.orientation);
    Ok(Some(Cursor::new(last, previous.orientation)))
}

fn last_cell(clue: &Clue, orientation: Orientation) -> CellKey {
    cell_keys_for_clue(clue, orientation)
        .last()
        .copied()
        .unwrap_or_else(|| clue.start())
}

/// Target of NEXT_CLUE: the next clue's start, or its first empty cell, or the
/// next empty cell further around the ring.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if the cursor cell has no clue in its
/// orientation.
#[instrument(skip(puzzle, board))]
pub fn jump_to_next_clue(
    puzzle: &Puzzle,
    board: &BoardState,
    cursor: Cursor,
) -> Result<Cursor, CoreError> {
    let clue = clue_for_cell(cursor.key, cursor.orientation, puzzle)?;
    let next = next_clue(puzzle, clue, cursor.orientation)?;
    if is_empty(board, puzzle, next.clue.start()) {
        return Ok(first_cell(next));
    }
    Ok(first_empty_on_ring(puzzle, board, next, true)?.unwrap_or_else(|| first_cell(next)))
}

/// Target of PREVIOUS_CLUE, searching backwards around the ring.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if the cursor cell has no clue in its
/// orientation.
#[instrument(skip(puzzle, board))]
pub fn jump_to_previous_clue(
    puzzle: &Puzzle,
    board: &BoardState,
    cursor: Cursor,
) -> Result<Cursor, CoreError> {
    let clue = clue_for_cell(cursor.key, cursor.orientation, puzzle)?;
    let previous = previous_clue(puzzle, clue, cursor.orientation)?;
    if is_empty(board, puzzle, previous.clue.start()) {
        return Ok(first_cell(previous));
    }
    Ok(first_empty_on_ring(puzzle, board, previous, false)?
        .unwrap_or_else(|| first_cell(previous)))
}

/// The nearest playable cell from `key` in `direction`, skipping blocked
/// cells. `None` when the grid edge comes first.
pub fn nearest_playable(puzzle: &Puzzle, key: CellKey, direction: Direction) -> Option<CellKey> {
    let (width, height) = puzzle.size();
    let mut current = key;
    while let Some(next) = step(current, direction, width, height) {
        if puzzle.is_playable(next) {
            return Some(next);
        }
        current = next;
    }
    None
}
