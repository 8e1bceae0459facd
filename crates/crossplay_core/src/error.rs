//! Error taxonomy for session logic.

use crate::geometry::CellKey;
use crate::types::Orientation;

/// Errors raised by geometry lookups, puzzle validation and the reducer.
///
/// Structural errors (bad keys, inconsistent clue data) are not recoverable
/// inside a session; action-level no-ops never produce an error.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CoreError {
    /// A cell key string could not be parsed.
    #[display("Invalid cell key: {raw:?}")]
    InvalidKey {
        /// The text that failed to parse.
        raw: String,
    },

    /// No clue of the requested orientation covers the cell.
    #[display("No {orientation} clue found for cell {key}")]
    NoClueFound {
        /// Cell that was looked up.
        key: CellKey,
        /// Orientation that was searched.
        orientation: Orientation,
    },

    /// The action needs a loaded session.
    #[display("Action requires a loaded session")]
    SessionRequired,

    /// The puzzle has no playable cell to select.
    #[display("Puzzle has no selectable cell")]
    NoSelectableCellFound,

    /// The puzzle failed load-time validation.
    #[display("Invalid puzzle: {reason}")]
    InvalidPuzzle {
        /// Descriptions of every failed check, joined.
        reason: String,
    },
}

impl std::error::Error for CoreError {}
