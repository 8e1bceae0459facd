//! Plain-text rendering of a session for the terminal.

use crossplay_core::{
    CellKey, CellSelectionState, CoreError, LocalState, Orientation, Session, SolutionState,
    clue_for_cell, combined_board_state, percentage_complete,
};
use std::fmt::Write;
use tracing::instrument;

fn glyph(letter: &str, solution_state: SolutionState) -> String {
    let mut chars = letter.chars();
    let Some(first) = chars.next() else {
        return ".".to_string();
    };
    match (solution_state, chars.next().is_some()) {
        (_, true) => format!("{first}+"),
        (SolutionState::Wrong, false) => format!("{}!", first),
        (SolutionState::Pencil, false) => format!("{}?", first.to_ascii_lowercase()),
        _ => first.to_string(),
    }
}

/// Draws the grid, one row per line.
///
/// Blocked cells are `#`, empty cells `.`. The cursor cell is wrapped in
/// `[]` and the rest of the active clue in `()`. A `+` marks a multi-letter
/// rebus entry, `!` a wrong entry and a lowercase letter with `?` a pencil
/// entry.
#[instrument(skip_all, fields(session_id = %session.session_id))]
pub fn render_board(session: &Session, local: &LocalState) -> Result<String, CoreError> {
    let combined = combined_board_state(session, local)?;
    let mut out = String::new();
    let mut row = None;
    for (key, cell) in &combined {
        if row.is_some_and(|y| y != key.y) {
            out.push('\n');
        }
        row = Some(key.y);

        let text = match cell.cell_selection_state {
            CellSelectionState::Unselectable => "#".to_string(),
            _ => glyph(cell.cell.letter(), cell.cell.solution_state),
        };
        let rendered = match cell.cell_selection_state {
            CellSelectionState::SelectedCell => format!("[{text:^2}]"),
            CellSelectionState::SelectedWord => format!("({text:^2})"),
            _ => format!(" {text:^2} "),
        };
        out.push_str(&rendered);
    }
    out.push('\n');
    Ok(out)
}

/// One-line progress summary.
pub fn render_summary(session: &Session) -> String {
    let percent = percentage_complete(&session.board_state, &session.puzzle.solutions);
    let mut out = format!(
        "{} {:.1}% filled, {}",
        session.puzzle.title.as_deref().unwrap_or(&session.puzzle.puzzle_id),
        percent,
        session.session_status
    );
    let names: Vec<&str> = session
        .participants
        .iter()
        .map(|participant| participant.display_name.as_str())
        .collect();
    if !names.is_empty() {
        let _ = write!(out, ", solvers: {}", names.join(", "));
    }
    out
}

/// The active clue, e.g. `1 Across: Feline`.
pub fn render_active_clue(session: &Session, local: &LocalState) -> Option<String> {
    let key: CellKey = local.selected_cell_key?;
    let clue = clue_for_cell(key, local.orientation, &session.puzzle).ok()?;
    let direction = match local.orientation {
        Orientation::Horizontal => "Across",
        Orientation::Vertical => "Down",
    };
    Some(format!("{} {direction}: {}", clue.number, clue.hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crossplay_core::{Participant, Puzzle, SessionStatus, board_state_from_solutions};

    fn session() -> Session {
        let puzzle = Puzzle::from_json_str(include_str!("../puzzles/cat_web.json")).unwrap();
        Session {
            session_id: "s".to_string(),
            board_state: board_state_from_solutions(&puzzle.solutions),
            puzzle,
            participants: vec![Participant::new("ann".to_string(), "Ann".to_string())],
            owner_id: "ann".to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
            end_time: None,
            session_status: SessionStatus::Started,
        }
    }

    #[test]
    fn test_board_marks_cursor_word_and_blocks() {
        let mut session = session();
        if let Some(cell) = session.board_state.get_mut(&CellKey::new(1, 0)) {
            cell.current_letter = Some("A".to_string());
        }
        let local = LocalState {
            selected_cell_key: Some(CellKey::new(0, 0)),
            ..LocalState::default()
        };
        let board = render_board(&session, &local).unwrap();
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[. ](A )(. )");
        assert!(lines[1].contains('#'));
    }

    #[test]
    fn test_summary_and_active_clue() {
        let session = session();
        let local = LocalState {
            selected_cell_key: Some(CellKey::new(0, 1)),
            orientation: Orientation::Vertical,
            ..LocalState::default()
        };
        assert_eq!(
            render_active_clue(&session, &local).as_deref(),
            Some("1 Down: Dairy animal")
        );
        assert!(render_summary(&session).contains("0.0% filled, STARTED, solvers: Ann"));
    }
}
