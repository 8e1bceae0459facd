//! Shared fixtures for unit tests.

use crate::board::board_state_from_solutions;
use crate::geometry::CellKey;
use crate::types::{BoardState, Participant, Puzzle, Session, SessionStatus};
use chrono::{TimeZone, Utc};

pub(crate) const USER: &str = "ann";

/// 3x3 mini: CAT / O#A / WEB.
pub(crate) fn cat_web_puzzle() -> Puzzle {
    Puzzle::from_json_str(include_str!("../puzzles/cat_web.json")).unwrap()
}

/// 5x5 grid whose only playable row spells HELLO.
pub(crate) fn hello_puzzle() -> Puzzle {
    Puzzle::from_json_str(include_str!("../puzzles/hello.json")).unwrap()
}

/// 3x2 grid with a STOP/HALT rebus cell at (1,0).
pub(crate) fn rebus_puzzle() -> Puzzle {
    Puzzle::from_json_str(include_str!("../puzzles/rebus.json")).unwrap()
}

pub(crate) fn session_for(puzzle: Puzzle) -> Session {
    Session {
        session_id: "session-1".to_string(),
        board_state: board_state_from_solutions(&puzzle.solutions),
        puzzle,
        participants: vec![Participant::new(USER.to_string(), "Ann".to_string())],
        owner_id: USER.to_string(),
        start_time: Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        end_time: None,
        session_status: SessionStatus::Started,
    }
}

pub(crate) fn fill(board: &mut BoardState, key: CellKey, letter: &str) {
    if let Some(cell) = board.get_mut(&key) {
        cell.current_letter = Some(letter.to_string());
    }
}
