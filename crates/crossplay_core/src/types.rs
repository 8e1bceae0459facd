//! Core domain types for crossword sessions.

use crate::geometry::CellKey;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a session.
pub type SessionId = String;

/// Unique identifier for a participant.
pub type ParticipantId = String;

/// Per-cell shared state, keyed in canonical scan order.
pub type BoardState = BTreeMap<CellKey, CellState>;

/// Accepted answers per cell.
pub type Solutions = BTreeMap<CellKey, Solution>;

/// Board overlaid with local selection, never persisted.
pub type CombinedBoardState = BTreeMap<CellKey, CombinedCellState>;

/// Direction a clue reads in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    /// Across.
    #[default]
    Horizontal,
    /// Down.
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Accepted answer for one cell.
///
/// In JSON a blocked cell is `null`, a single answer is a string and a
/// multi-answer (rebus) cell is a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Solution {
    /// One accepted answer (a letter, or a word segment).
    Single(String),
    /// Several accepted answers; the first is canonical.
    MultiAnswer(Vec<String>),
    /// Not playable.
    Blocked,
}

impl Solution {
    /// Returns true unless the cell is blocked.
    pub fn is_playable(&self) -> bool {
        match self {
            Solution::Single(_) => true,
            Solution::MultiAnswer(answers) => !answers.is_empty(),
            Solution::Blocked => false,
        }
    }

    /// The canonical answer: the only value, or the first alternative.
    pub fn first(&self) -> Option<&str> {
        match self {
            Solution::Single(answer) => Some(answer.as_str()),
            Solution::MultiAnswer(answers) => answers.first().map(String::as_str),
            Solution::Blocked => None,
        }
    }

    /// Whether `value` is an accepted answer (ASCII case-insensitive).
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Solution::Single(answer) => answer.eq_ignore_ascii_case(value),
            Solution::MultiAnswer(answers) => {
                answers.iter().any(|answer| answer.eq_ignore_ascii_case(value))
            }
            Solution::Blocked => false,
        }
    }
}

/// Verification status of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SolutionState {
    /// Unverified entry.
    #[default]
    None,
    /// Tentative entry.
    Pencil,
    /// Checked and incorrect.
    Wrong,
    /// Revealed, or checked and correct.
    Revealed,
}

/// Cell fields a persistence write may remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellField {
    /// The editor attribution.
    LastEditedBy,
}

/// Shared, persisted state of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellState {
    /// `None` for blocked cells, `Some("")` for empty playable cells.
    pub current_letter: Option<String>,
    /// Verification status.
    #[serde(default)]
    pub solution_state: SolutionState,
    /// Participant who last wrote the letter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<ParticipantId>,
    /// Write sequence number; higher wins when merging snapshots.
    #[serde(default)]
    pub version: u64,
}

impl CellState {
    /// Empty playable cell.
    pub fn empty() -> Self {
        Self {
            current_letter: Some(String::new()),
            solution_state: SolutionState::None,
            last_edited_by: None,
            version: 0,
        }
    }

    /// Blocked cell.
    pub fn blocked() -> Self {
        Self {
            current_letter: None,
            solution_state: SolutionState::None,
            last_edited_by: None,
            version: 0,
        }
    }

    /// Returns true if the cell holds a non-empty letter.
    pub fn is_filled(&self) -> bool {
        self.current_letter
            .as_deref()
            .is_some_and(|letter| !letter.is_empty())
    }

    /// The entered letter, empty for blank or blocked cells.
    pub fn letter(&self) -> &str {
        self.current_letter.as_deref().unwrap_or_default()
    }
}

/// Markup drawn on top of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpecialCellType {
    /// Circled cell.
    Circle,
    /// Shaded cell.
    Shaded,
}

/// Selection highlight of a cell for the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellSelectionState {
    /// The cursor cell.
    SelectedCell,
    /// In the active clue.
    SelectedWord,
    /// In a clue cross-referenced by the active clue.
    RelatedClueSelected,
    /// Blocked.
    Unselectable,
    /// Anything else.
    Unselected,
}

/// Cell state combined with derived local selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedCellState {
    /// The shared cell state.
    #[serde(flatten)]
    pub cell: CellState,
    /// Local selection highlight.
    pub cell_selection_state: CellSelectionState,
    /// Markup, if any.
    pub special_cell_type: Option<SpecialCellType>,
    /// Grid number when the cell starts a clue.
    pub clue_number: Option<u32>,
}

/// Cross-references from one clue to others, by clue number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelatedClues {
    /// Related across clues.
    #[serde(default)]
    pub horizontal: Vec<u32>,
    /// Related down clues.
    #[serde(default)]
    pub vertical: Vec<u32>,
}

impl RelatedClues {
    /// Related clue numbers for an orientation.
    pub fn for_orientation(&self, orientation: Orientation) -> &[u32] {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }
}

/// A clue: start cell, length and hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    /// Grid number.
    pub number: u32,
    /// Start column.
    pub x: u32,
    /// Start row.
    pub y: u32,
    /// Clue text.
    pub hint: String,
    /// Number of cells.
    pub length: u32,
    /// Cross-referenced clues.
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_clue_numbers: Option<RelatedClues>,
}

impl Clue {
    /// The start cell.
    pub fn start(&self) -> CellKey {
        CellKey::new(self.x, self.y)
    }

    /// Whether the clue's span in `orientation` contains `key`.
    pub fn covers(&self, key: CellKey, orientation: Orientation) -> bool {
        match orientation {
            Orientation::Horizontal => {
                key.y == self.y && key.x >= self.x && key.x - self.x < self.length
            }
            Orientation::Vertical => {
                key.x == self.x && key.y >= self.y && key.y - self.y < self.length
            }
        }
    }
}

/// Clues grouped by orientation, each list in index order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Clues {
    /// Across clues.
    #[serde(default)]
    pub horizontal: Vec<Clue>,
    /// Down clues.
    #[serde(default)]
    pub vertical: Vec<Clue>,
}

impl Clues {
    /// Clues of one orientation.
    pub fn for_orientation(&self, orientation: Orientation) -> &[Clue] {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }
}

/// An immutable puzzle as supplied by the puzzle provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    /// Provider identifier.
    #[serde(rename = "puzzleID")]
    pub puzzle_id: String,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Across and down clues.
    pub clues: Clues,
    /// Accepted answer per cell, blocked cells included.
    pub solutions: Solutions,
    /// Circles and shading.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub special_cells: BTreeMap<CellKey, SpecialCellType>,
    /// Publication weekday.
    pub day_of_week: Weekday,
    /// Whether any cell takes a multi-character answer.
    #[serde(default)]
    pub is_rebus: bool,
}

impl Puzzle {
    /// Parses a puzzle from JSON.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error for malformed documents.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns true if the cell exists and is not blocked.
    pub fn is_playable(&self, key: CellKey) -> bool {
        self.solutions
            .get(&key)
            .is_some_and(Solution::is_playable)
    }

    /// Playable cells in canonical scan order.
    pub fn playable_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.solutions
            .iter()
            .filter(|(_, solution)| solution.is_playable())
            .map(|(key, _)| *key)
    }

    /// Grid `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        crate::geometry::size_from_keys(self.solutions.keys())
    }
}

/// A participant in a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Participant ID.
    pub id: ParticipantId,
    /// Display name.
    pub display_name: String,
}

/// Gameplay status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Being solved.
    #[default]
    Started,
    /// Solved or explicitly ended.
    Complete,
}

/// A shared game instance, one per game against a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID.
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    /// The puzzle being solved.
    pub puzzle: Puzzle,
    /// Everyone who has joined.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Participant who created the session.
    #[serde(rename = "ownerID")]
    pub owner_id: ParticipantId,
    /// Creation time.
    pub start_time: DateTime<Utc>,
    /// Completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Shared board.
    pub board_state: BoardState,
    /// Gameplay status.
    #[serde(default)]
    pub session_status: SessionStatus,
}

impl Session {
    /// Returns true if the participant has joined.
    pub fn has_participant(&self, participant_id: &str) -> bool {
        self.participants
            .iter()
            .any(|participant| participant.id == participant_id)
    }
}

/// Client-local cursor and input modes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    /// Typing direction.
    pub orientation: Orientation,
    /// Cursor cell.
    pub selected_cell_key: Option<CellKey>,
    /// Entries are tentative.
    pub pencil_mode: bool,
    /// Letters append to the current cell.
    pub rebus: bool,
    /// Entries are verified as they are typed.
    pub autocheck: bool,
}

/// Everything one client knows: the local session copy plus local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Local copy of the shared session, once loaded.
    pub session: Option<Session>,
    /// Cursor and modes.
    pub local: LocalState,
    /// Status text shown while loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_message: Option<String>,
    /// The local participant.
    pub user_id: ParticipantId,
}

impl SessionState {
    /// Creates an empty state for a participant, waiting for a session.
    pub fn new(user_id: impl Into<ParticipantId>) -> Self {
        Self {
            session: None,
            local: LocalState::default(),
            loading_message: Some("Loading puzzle".to_string()),
            user_id: user_id.into(),
        }
    }

    /// Same as [`SessionState::new`] with initial local modes.
    pub fn with_local(user_id: impl Into<ParticipantId>, local: LocalState) -> Self {
        Self {
            local,
            ..Self::new(user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_json_shapes() {
        let solutions: Vec<Solution> =
            serde_json::from_str(r#"["A", ["STOP", "HALT"], null]"#).unwrap();
        assert_eq!(solutions[0], Solution::Single("A".to_string()));
        assert_eq!(
            solutions[1],
            Solution::MultiAnswer(vec!["STOP".to_string(), "HALT".to_string()])
        );
        assert_eq!(solutions[2], Solution::Blocked);
        assert_eq!(serde_json::to_string(&Solution::Blocked).unwrap(), "null");
    }

    #[test]
    fn test_multi_answer_accepts_any_alternative() {
        let solution = Solution::MultiAnswer(vec!["STOP".to_string(), "HALT".to_string()]);
        assert!(solution.accepts("HALT"));
        assert!(solution.accepts("stop"));
        assert!(!solution.accepts("ST"));
        assert_eq!(solution.first(), Some("STOP"));
        assert!(!Solution::Blocked.accepts(""));
    }

    #[test]
    fn test_cell_state_fill() {
        assert!(!CellState::empty().is_filled());
        assert!(!CellState::blocked().is_filled());
        let cell = CellState {
            current_letter: Some("Q".to_string()),
            ..CellState::empty()
        };
        assert!(cell.is_filled());
        assert_eq!(cell.letter(), "Q");
    }

    #[test]
    fn test_clue_covers_span() {
        let clue = Clue::new(4, 1, 0, "Hint".to_string(), 3);
        assert!(clue.covers(CellKey::new(3, 0), Orientation::Horizontal));
        assert!(!clue.covers(CellKey::new(4, 0), Orientation::Horizontal));
        assert!(!clue.covers(CellKey::new(1, 1), Orientation::Horizontal));
        assert!(clue.covers(CellKey::new(1, 2), Orientation::Vertical));
        let edge = Clue::new(9, u32::MAX - 1, 0, "Edge".to_string(), 5);
        assert!(edge.covers(CellKey::new(u32::MAX, 0), Orientation::Horizontal));
        assert!(!edge.covers(CellKey::new(0, 0), Orientation::Horizontal));
    }
}
