//! Session actions and the persistence effects they request.
//!
//! Actions are domain events: they describe input, not how it is applied.
//! The reducer turns each one into a new state plus a list of [`Effect`]s
//! for the persistence collaborator to carry out.

use crate::geometry::CellKey;
use crate::types::{
    BoardState, CellField, CellState, Participant, Session, SessionState, SessionStatus,
};
use serde::{Deserialize, Serialize};

/// Which cells a check or reveal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Scope {
    /// The cursor cell.
    Square,
    /// The active clue.
    Word,
    /// Every cell.
    Puzzle,
}

/// Input to the session reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// A session was loaded for the first time.
    SetOriginalState(Box<Session>),
    /// A remote snapshot arrived.
    SetSharedState(Box<Session>),
    /// Ask the store to add a participant.
    JoinSessionParticipants(Participant),
    /// A letter key was pressed.
    LetterPressed(char),
    /// Backspace was pressed.
    Backspace,
    /// A grid cell was clicked.
    CellClicked(CellKey),
    /// Switch between across and down.
    ToggleOrientation,
    /// Arrow right.
    RightKey,
    /// Arrow left.
    LeftKey,
    /// Arrow up.
    UpKey,
    /// Arrow down.
    DownKey,
    /// Jump to the next clue.
    NextClue,
    /// Jump to the previous clue.
    PreviousClue,
    /// Toggle pencil mode.
    PencilClicked,
    /// Toggle rebus entry.
    RebusClicked,
    /// Toggle autocheck.
    AutocheckClicked,
    /// Check the cursor cell.
    CheckSquare,
    /// Check the active clue.
    CheckWord,
    /// Check the whole grid.
    CheckPuzzle,
    /// Reveal the cursor cell.
    RevealSquare,
    /// Reveal the active clue.
    RevealWord,
    /// Reveal the whole grid.
    RevealPuzzle,
    /// Reveal roughly 98% of cells at random. Debugging aid.
    RevealMostSquares,
    /// Clear the board and restart.
    ResetPuzzle,
}

impl Action {
    /// Wire name of the action, for logging.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// A write the reducer asks the persistence collaborator to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    /// Write one cell, removing the listed fields.
    UpdateCell {
        /// Cell to write.
        key: CellKey,
        /// New state.
        cell: CellState,
        /// Fields to delete from the stored cell.
        fields_to_delete: Vec<CellField>,
    },
    /// Replace the whole board.
    UpdateBoard {
        /// New board.
        board: BoardState,
    },
    /// Change the session status.
    UpdateSessionStatus {
        /// New status.
        status: SessionStatus,
    },
    /// Add a participant.
    AddParticipant {
        /// Who joins.
        participant: Participant,
    },
}

/// Outcome of reducing one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The next state.
    pub state: SessionState,
    /// Writes to hand to persistence, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    /// A transition with no side effects.
    pub fn local(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_web_puzzle, session_for};

    #[test]
    fn test_action_json_uses_wire_names() {
        let action: Action =
            serde_json::from_str(r#"{"type": "LETTER_PRESSED", "payload": "h"}"#).unwrap();
        assert_eq!(action, Action::LetterPressed('h'));

        let action: Action =
            serde_json::from_str(r#"{"type": "CELL_CLICKED", "payload": "2,1"}"#).unwrap();
        assert_eq!(action, Action::CellClicked(CellKey::new(2, 1)));

        let action: Action = serde_json::from_str(r#"{"type": "REVEAL_WORD"}"#).unwrap();
        assert_eq!(action, Action::RevealWord);
        assert_eq!(action.name(), "REVEAL_WORD");
    }

    #[test]
    fn test_action_name_matches_json_tag() {
        let session = Box::new(session_for(cat_web_puzzle()));
        let actions = [
            Action::SetOriginalState(session.clone()),
            Action::SetSharedState(session),
            Action::JoinSessionParticipants(Participant::new("bo".to_string(), "Bo".to_string())),
            Action::LetterPressed('q'),
            Action::Backspace,
            Action::CellClicked(CellKey::new(0, 0)),
            Action::ToggleOrientation,
            Action::RightKey,
            Action::LeftKey,
            Action::UpKey,
            Action::DownKey,
            Action::NextClue,
            Action::PreviousClue,
            Action::PencilClicked,
            Action::RebusClicked,
            Action::AutocheckClicked,
            Action::CheckSquare,
            Action::CheckWord,
            Action::CheckPuzzle,
            Action::RevealSquare,
            Action::RevealWord,
            Action::RevealPuzzle,
            Action::RevealMostSquares,
            Action::ResetPuzzle,
        ];
        for action in actions {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.name());
        }
        assert_eq!(Action::AutocheckClicked.name(), "AUTOCHECK_CLICKED");
    }

    #[test]
    fn test_effect_json_is_tagged() {
        let effect = Effect::UpdateSessionStatus {
            status: SessionStatus::Complete,
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["type"], "UPDATE_SESSION_STATUS");
        assert_eq!(json["status"], "COMPLETE");
    }
}
