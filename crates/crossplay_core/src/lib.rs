//! Crossplay core - collaborative crossword session logic
//!
//! Everything here is synchronous and free of I/O. A client feeds
//! [`Action`]s into [`reduce`] and forwards the returned [`Effect`]s to its
//! persistence layer.
//!
//! # Architecture
//!
//! - **Geometry**: cell keys, grid size, clue spans
//! - **Clues**: which clue owns a cell, clue-to-clue traversal
//! - **Board**: fresh boards, selection overlay, snapshot diffs
//! - **Reducer**: the session state machine and cursor rules
//! - **Check**: completion and answer verification
//! - **Invariants**: load-time puzzle validation
//!
//! # Example
//!
//! ```no_run
//! use crossplay_core::{Action, SessionState, reduce};
//!
//! # fn example(session: crossplay_core::Session) -> Result<(), crossplay_core::CoreError> {
//! let state = SessionState::new("ann");
//! let loaded = reduce(state, Action::SetOriginalState(Box::new(session)))?;
//! let typed = reduce(loaded.state, Action::LetterPressed('c'))?;
//! for effect in typed.effects {
//!     println!("{effect:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod board;
mod check;
mod clues;
mod cursor;
mod error;
mod geometry;
mod invariants;
mod reducer;
mod types;

#[cfg(test)]
mod test_support;

// Crate-level exports - Actions and effects
pub use action::{Action, Effect, Scope, Transition};

// Crate-level exports - Board model
pub use board::{
    CellDiff, board_state_difference, board_state_from_solutions, combined_board_state,
    reset_board_state,
};

// Crate-level exports - Verification
pub use check::{check_cell, check_puzzle, is_puzzle_complete, percentage_complete};

// Crate-level exports - Clue index
pub use clues::{
    ClueStep, clue_by_number, clue_for_cell, clue_number_for_cell, clue_position, next_clue,
    previous_clue,
};

// Crate-level exports - Cursor navigation
pub use cursor::{
    Cursor, advance_after_entry, first_selectable_cell, jump_to_next_clue, jump_to_previous_clue,
    nearest_playable, next_empty_cell, orientation_at, retreat,
};

// Crate-level exports - Errors
pub use error::CoreError;

// Crate-level exports - Geometry
pub use geometry::{
    CellKey, Direction, cell_keys_for_clue, clue_in_bounds, coordinates_from_key,
    key_from_coordinates, size_from_keys, sorted_keys, step,
};

// Crate-level exports - Validation
pub use invariants::{
    CluesCoverPlayableCells, Invariant, InvariantSet, InvariantViolation, PlayableCellsCovered,
    PuzzleInvariants, SingleCluePerOrientation, validate_puzzle,
};

// Crate-level exports - Reducer
pub use reducer::{REVEAL_MOST_PROBABILITY, reduce, reduce_with_rng};

// Crate-level exports - Domain types
pub use types::{
    BoardState, CellField, CellSelectionState, CellState, Clue, Clues, CombinedBoardState,
    CombinedCellState, LocalState, Orientation, Participant, ParticipantId, Puzzle, RelatedClues,
    Session, SessionId, SessionState, SessionStatus, Solution, SolutionState, Solutions,
    SpecialCellType,
};
