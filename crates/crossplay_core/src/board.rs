//! Board state model: initialization, selection overlay and diffs.

use crate::clues::{clue_by_number, clue_for_cell, clue_number_for_cell};
use crate::error::CoreError;
use crate::geometry::{CellKey, cell_keys_for_clue};
use crate::types::{
    BoardState, CellSelectionState, CellState, CombinedBoardState, CombinedCellState, LocalState,
    Orientation, ParticipantId, Session, Solution, SolutionState, Solutions,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// New values of a cell that changed between two boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDiff {
    /// Letter in the newer board.
    pub new_letter: Option<String>,
    /// Solution state in the newer board.
    pub solution_state: SolutionState,
    /// Editor in the newer board.
    pub edited_by: Option<ParticipantId>,
    /// Version in the newer board.
    pub version: u64,
}

impl CellDiff {
    /// The cell this diff describes.
    pub fn to_cell(&self) -> CellState {
        CellState {
            current_letter: self.new_letter.clone(),
            solution_state: self.solution_state,
            last_edited_by: self.edited_by.clone(),
            version: self.version,
        }
    }
}

/// Builds a fresh board: empty playable cells, `None` letters for blocked ones.
#[instrument(skip(solutions), fields(cells = solutions.len()))]
pub fn board_state_from_solutions(solutions: &Solutions) -> BoardState {
    solutions
        .iter()
        .map(|(key, solution)| {
            let cell = if solution.is_playable() {
                CellState::empty()
            } else {
                CellState::blocked()
            };
            (*key, cell)
        })
        .collect()
}

/// Reinitializes every cell, advancing versions so the reset supersedes
/// anything written before it.
pub fn reset_board_state(board: &BoardState, solutions: &Solutions) -> BoardState {
    let mut fresh = board_state_from_solutions(solutions);
    for (key, cell) in fresh.iter_mut() {
        cell.version = board.get(key).map_or(0, |old| old.version) + 1;
    }
    fresh
}

/// Overlays the local selection onto the shared board.
///
/// Precedence per cell: selected cell, selected word, related clue,
/// unselectable, unselected.
///
/// # Errors
///
/// Returns [`CoreError::NoClueFound`] if the selected cell has no clue in the
/// local orientation.
#[instrument(skip(session, local), fields(session_id = %session.session_id))]
pub fn combined_board_state(
    session: &Session,
    local: &LocalState,
) -> Result<CombinedBoardState, CoreError> {
    let puzzle = &session.puzzle;
    let mut word = BTreeSet::new();
    let mut related = BTreeSet::new();

    if let Some(selected) = local.selected_cell_key {
        let clue = clue_for_cell(selected, local.orientation, puzzle)?;
        word.extend(cell_keys_for_clue(clue, local.orientation));

        if let Some(references) = &clue.related_clue_numbers {
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                for number in references.for_orientation(orientation) {
                    match clue_by_number(puzzle, orientation, *number) {
                        Some(other) => related.extend(cell_keys_for_clue(other, orientation)),
                        None => debug!(number, %orientation, "Related clue missing from puzzle"),
                    }
                }
            }
        }
    }

    let combined = session
        .board_state
        .iter()
        .map(|(key, cell)| {
            let playable = puzzle
                .solutions
                .get(key)
                .is_some_and(Solution::is_playable);
            let cell_selection_state = if local.selected_cell_key == Some(*key) {
                CellSelectionState::SelectedCell
            } else if word.contains(key) {
                CellSelectionState::SelectedWord
            } else if related.contains(key) {
                CellSelectionState::RelatedClueSelected
            } else if !playable {
                CellSelectionState::Unselectable
            } else {
                CellSelectionState::Unselected
            };
            let combined = CombinedCellState {
                cell: cell.clone(),
                cell_selection_state,
                special_cell_type: puzzle.special_cells.get(key).copied(),
                clue_number: clue_number_for_cell(*key, puzzle),
            };
            (*key, combined)
        })
        .collect();

    Ok(combined)
}

/// Cells of `new` whose letter, state, editor or version differ from `old`.
///
/// Cells missing from `old` count as changed; cells missing from `new` are
/// ignored.
pub fn board_state_difference(old: &BoardState, new: &BoardState) -> BTreeMap<CellKey, CellDiff> {
    new.iter()
        .filter(|(key, cell)| old.get(*key) != Some(*cell))
        .map(|(key, cell)| {
            let diff = CellDiff {
                new_letter: cell.current_letter.clone(),
                solution_state: cell.solution_state,
                edited_by: cell.last_edited_by.clone(),
                version: cell.version,
            };
            (*key, diff)
        })
        .collect()
}
