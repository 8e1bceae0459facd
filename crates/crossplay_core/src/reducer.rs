//! The session state machine.
//!
//! [`reduce`] maps `(SessionState, Action)` to the next state plus the
//! persistence effects the caller must carry out. The reducer never performs
//! I/O; shared state only changes locally or through a later snapshot.

use crate::action::{Action, Effect, Scope, Transition};
use crate::board::{board_state_difference, reset_board_state};
use crate::check::{check_cell, check_puzzle, is_puzzle_complete};
use crate::clues::clue_for_cell;
use crate::cursor::{self, Cursor};
use crate::error::CoreError;
use crate::geometry::{CellKey, Direction, cell_keys_for_clue};
use crate::invariants::validate_puzzle;
use crate::types::{
    BoardState, CellField, CellState, LocalState, Participant, Puzzle, Session, SessionState,
    SessionStatus, SolutionState,
};
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

/// Chance that REVEAL_MOST_SQUARES reveals any given cell.
pub const REVEAL_MOST_PROBABILITY: f64 = 0.98;

/// Applies one action using the thread-local RNG.
///
/// # Errors
///
/// See [`reduce_with_rng`].
pub fn reduce(state: SessionState, action: Action) -> Result<Transition, CoreError> {
    reduce_with_rng(state, action, &mut rand::thread_rng())
}

/// Applies one action.
///
/// Action-level no-ops (clicking a blocked cell, typing into a completed
/// session) return the state unchanged with no effects.
///
/// # Errors
///
/// - [`CoreError::SessionRequired`] for gameplay actions before a session loaded.
/// - [`CoreError::InvalidPuzzle`] / [`CoreError::NoSelectableCellFound`] when a
///   loaded puzzle fails validation.
/// - [`CoreError::NoClueFound`] when clue data is inconsistent with the grid.
#[instrument(skip(state, action, rng), fields(action = action.name(), user_id = %state.user_id))]
pub fn reduce_with_rng<R: Rng + ?Sized>(
    mut state: SessionState,
    action: Action,
    rng: &mut R,
) -> Result<Transition, CoreError> {
    match action {
        Action::SetOriginalState(session) => set_original_state(state, *session),
        Action::SetSharedState(session) if state.session.is_none() => {
            debug!("No local session yet, loading snapshot as original state");
            set_original_state(state, *session)
        }
        Action::SetSharedState(session) => set_shared_state(state, *session),
        action => {
            let effects = {
                let SessionState {
                    session,
                    local,
                    user_id,
                    ..
                } = &mut state;
                let Some(session) = session.as_mut() else {
                    warn!("Action dispatched before a session was loaded");
                    return Err(CoreError::SessionRequired);
                };
                let mut reducer = Reducer {
                    session,
                    local,
                    user_id: user_id.as_str(),
                    effects: Vec::new(),
                };
                reducer.apply(action, rng)?;
                reducer.effects
            };
            Ok(Transition { state, effects })
        }
    }
}

#[instrument(skip_all, fields(session_id = %session.session_id))]
fn set_original_state(mut state: SessionState, session: Session) -> Result<Transition, CoreError> {
    validate_puzzle(&session.puzzle)?;
    let first = cursor::first_selectable_cell(
        &session.puzzle,
        &session.board_state,
        state.local.orientation,
    )?;

    state.local.selected_cell_key = Some(first.key);
    state.local.orientation = first.orientation;
    state.local.rebus = false;
    state.loading_message = None;
    info!(cell = %first.key, orientation = %first.orientation, "Session loaded");
    state.session = Some(session);
    Ok(Transition::local(state))
}

/// Folds a remote snapshot into the local session copy.
///
/// A remote cell replaces the local one only if its version is at least the
/// local version, so a snapshot taken before a local write cannot undo it.
/// The remote status is taken unless it contradicts the merged board: a
/// `Complete` snapshot over an unsolved board, or a `Started` snapshot over a
/// board this client already completed.
#[instrument(skip_all, fields(session_id = %snapshot.session_id))]
fn set_shared_state(mut state: SessionState, snapshot: Session) -> Result<Transition, CoreError> {
    let Some(local) = state.session.as_mut() else {
        return set_original_state(state, snapshot);
    };
    if local.session_id != snapshot.session_id {
        warn!(local = %local.session_id, "Ignoring snapshot for another session");
        return Ok(Transition::local(state));
    }

    let previous_status = local.session_status;
    let previous_end = local.end_time;

    let mut accepted = 0usize;
    let mut stale = 0usize;
    for (key, diff) in board_state_difference(&local.board_state, &snapshot.board_state) {
        let local_version = local.board_state.get(&key).map_or(0, |cell| cell.version);
        if diff.version >= local_version {
            local.board_state.insert(key, diff.to_cell());
            accepted += 1;
        } else {
            stale += 1;
        }
    }
    debug!(accepted, stale, "Merged snapshot");

    let Session {
        participants,
        owner_id,
        start_time,
        end_time,
        session_status,
        ..
    } = snapshot;
    local.participants = participants;
    local.owner_id = owner_id;
    local.start_time = start_time;
    local.end_time = end_time;
    local.session_status = session_status;

    // The status must agree with the merged board. A snapshot that predates
    // a local reset or a local completion cannot move the status back.
    let solved = is_solved(local);
    let stale_status = match local.session_status {
        SessionStatus::Complete => !solved,
        SessionStatus::Started => previous_status == SessionStatus::Complete && solved,
    };
    if stale_status && local.session_status != previous_status {
        debug!(
            remote = %local.session_status,
            local = %previous_status,
            "Keeping local status over stale snapshot"
        );
        local.session_status = previous_status;
        local.end_time = previous_end;
    }

    let mut effects = Vec::new();
    complete_if_solved(local, &mut effects);
    Ok(Transition { state, effects })
}

fn is_solved(session: &Session) -> bool {
    let solutions = &session.puzzle.solutions;
    is_puzzle_complete(&session.board_state, solutions)
        && check_puzzle(&session.board_state, solutions)
}

fn complete_if_solved(session: &mut Session, effects: &mut Vec<Effect>) {
    if session.session_status == SessionStatus::Complete || !is_solved(session) {
        return;
    }
    info!(session_id = %session.session_id, "Puzzle solved");
    session.session_status = SessionStatus::Complete;
    session.end_time = Some(Utc::now());
    effects.push(Effect::UpdateSessionStatus {
        status: SessionStatus::Complete,
    });
}

type Jump = fn(&Puzzle, &BoardState, Cursor) -> Result<Cursor, CoreError>;

/// Borrowed view of a loaded session while one action is applied.
struct Reducer<'a> {
    session: &'a mut Session,
    local: &'a mut LocalState,
    user_id: &'a str,
    effects: Vec<Effect>,
}

impl Reducer<'_> {
    fn apply<R: Rng + ?Sized>(&mut self, action: Action, rng: &mut R) -> Result<(), CoreError> {
        match action {
            Action::SetOriginalState(_) | Action::SetSharedState(_) => Ok(()),
            Action::JoinSessionParticipants(participant) => {
                self.join(participant);
                Ok(())
            }
            Action::LetterPressed(letter) => self.letter_pressed(letter),
            Action::Backspace => self.backspace(),
            Action::CellClicked(key) => self.cell_clicked(key),
            Action::ToggleOrientation => {
                self.toggle_orientation();
                Ok(())
            }
            Action::RightKey => self.arrow(Direction::Right),
            Action::LeftKey => self.arrow(Direction::Left),
            Action::UpKey => self.arrow(Direction::Up),
            Action::DownKey => self.arrow(Direction::Down),
            Action::NextClue => self.jump(cursor::jump_to_next_clue),
            Action::PreviousClue => self.jump(cursor::jump_to_previous_clue),
            Action::PencilClicked => {
                self.local.pencil_mode = !self.local.pencil_mode;
                Ok(())
            }
            Action::RebusClicked => self.rebus_clicked(),
            Action::AutocheckClicked => {
                self.local.autocheck = !self.local.autocheck;
                Ok(())
            }
            Action::CheckSquare => self.check(Scope::Square),
            Action::CheckWord => self.check(Scope::Word),
            Action::CheckPuzzle => self.check(Scope::Puzzle),
            Action::RevealSquare => self.reveal(Scope::Square),
            Action::RevealWord => self.reveal(Scope::Word),
            Action::RevealPuzzle => self.reveal(Scope::Puzzle),
            Action::RevealMostSquares => {
                self.reveal_most(rng);
                Ok(())
            }
            Action::ResetPuzzle => self.reset(),
        }
    }

    fn cursor(&self) -> Option<Cursor> {
        self.local
            .selected_cell_key
            .map(|key| Cursor::new(key, self.local.orientation))
    }

    fn move_to(&mut self, target: Cursor) {
        self.local.selected_cell_key = Some(target.key);
        self.local.orientation = target.orientation;
    }

    fn is_complete(&self) -> bool {
        self.session.session_status == SessionStatus::Complete
    }

    fn write_cell(&mut self, key: CellKey, cell: CellState, fields_to_delete: Vec<CellField>) {
        self.session.board_state.insert(key, cell.clone());
        self.effects.push(Effect::UpdateCell {
            key,
            cell,
            fields_to_delete,
        });
    }

    fn join(&mut self, participant: Participant) {
        if self.session.has_participant(&participant.id) {
            debug!(participant_id = %participant.id, "Already a participant");
            return;
        }
        info!(participant_id = %participant.id, "Joining session");
        self.effects.push(Effect::AddParticipant { participant });
    }

    fn letter_pressed(&mut self, letter: char) -> Result<(), CoreError> {
        if self.is_complete() {
            debug!("Session complete, ignoring letter");
            return Ok(());
        }
        if !letter.is_alphanumeric() {
            debug!(%letter, "Ignoring non-alphanumeric key");
            return Ok(());
        }
        let Some(at) = self.cursor() else {
            debug!("No cell selected");
            return Ok(());
        };
        let Some(solution) = self
            .session
            .puzzle
            .solutions
            .get(&at.key)
            .filter(|solution| solution.is_playable())
        else {
            debug!(cell = %at.key, "Selected cell has no solution");
            return Ok(());
        };

        let cell = self
            .session
            .board_state
            .get(&at.key)
            .cloned()
            .unwrap_or_else(CellState::empty);

        if cell.solution_state == SolutionState::Revealed {
            debug!(cell = %at.key, "Cell already revealed");
            if !self.local.rebus {
                let puzzle = &self.session.puzzle;
                let next = cursor::advance_after_entry(puzzle, &self.session.board_state, at)?;
                self.move_to(next);
            }
            return Ok(());
        }

        let typed: String = letter.to_uppercase().collect();
        let value = if self.local.rebus {
            format!("{}{typed}", cell.letter())
        } else {
            typed
        };
        let solution_state = if self.local.autocheck {
            check_cell(&value, solution)
        } else if self.local.pencil_mode {
            SolutionState::Pencil
        } else {
            SolutionState::None
        };
        let updated = CellState {
            current_letter: Some(value),
            solution_state,
            last_edited_by: Some(self.user_id.to_string()),
            version: cell.version + 1,
        };
        self.write_cell(at.key, updated, Vec::new());

        if !self.local.rebus {
            let next =
                cursor::advance_after_entry(&self.session.puzzle, &self.session.board_state, at)?;
            self.move_to(next);
        }
        complete_if_solved(self.session, &mut self.effects);
        Ok(())
    }

    fn backspace(&mut self) -> Result<(), CoreError> {
        if self.is_complete() {
            debug!("Session complete, ignoring backspace");
            return Ok(());
        }
        if self.local.rebus {
            self.local.rebus = false;
            debug!("Left rebus entry");
            return Ok(());
        }
        let Some(at) = self.cursor() else {
            return Ok(());
        };

        let previous = cursor::retreat(&self.session.puzzle, at)?;
        let filled = self
            .session
            .board_state
            .get(&at.key)
            .is_some_and(CellState::is_filled);

        if filled {
            self.clear_cell(at.key);
            if let Some(previous) = previous {
                self.move_to(previous);
            }
        } else if let Some(previous) = previous {
            self.move_to(previous);
            self.clear_cell(previous.key);
        } else {
            debug!("Backspace at start of puzzle");
        }
        Ok(())
    }

    fn clear_cell(&mut self, key: CellKey) {
        let Some(cell) = self.session.board_state.get(&key) else {
            return;
        };
        if cell.solution_state == SolutionState::Revealed {
            debug!(cell = %key, "Revealed cell is not cleared");
            return;
        }
        if !cell.is_filled() {
            return;
        }
        let cleared = CellState {
            version: cell.version + 1,
            ..CellState::empty()
        };
        self.write_cell(key, cleared, vec![CellField::LastEditedBy]);
    }

    fn cell_clicked(&mut self, key: CellKey) -> Result<(), CoreError> {
        self.local.rebus = false;
        if !self.session.puzzle.is_playable(key) {
            debug!(cell = %key, "Ignoring click on blocked cell");
            return Ok(());
        }
        if self.local.selected_cell_key == Some(key) {
            self.toggle_orientation();
            return Ok(());
        }
        let preferred = self.local.orientation;
        let orientation = cursor::orientation_at(&self.session.puzzle, key, preferred).ok_or(
            CoreError::NoClueFound {
                key,
                orientation: preferred,
            },
        )?;
        self.move_to(Cursor::new(key, orientation));
        Ok(())
    }

    /// Flips the orientation if the selected cell has a clue the other way.
    fn toggle_orientation(&mut self) -> bool {
        let flipped = self.local.orientation.flipped();
        if let Some(key) = self.local.selected_cell_key
            && clue_for_cell(key, flipped, &self.session.puzzle).is_err()
        {
            debug!(cell = %key, orientation = %flipped, "No clue to toggle to");
            return false;
        }
        self.local.orientation = flipped;
        true
    }

    fn arrow(&mut self, direction: Direction) -> Result<(), CoreError> {
        let Some(at) = self.cursor() else {
            return Ok(());
        };
        if direction.orientation() != at.orientation && self.toggle_orientation() {
            return Ok(());
        }
        let puzzle = &self.session.puzzle;
        let Some(key) = cursor::nearest_playable(puzzle, at.key, direction) else {
            debug!(?direction, "At grid edge");
            return Ok(());
        };
        let orientation = cursor::orientation_at(puzzle, key, self.local.orientation).ok_or(
            CoreError::NoClueFound {
                key,
                orientation: self.local.orientation,
            },
        )?;
        self.move_to(Cursor::new(key, orientation));
        Ok(())
    }

    fn jump(&mut self, target: Jump) -> Result<(), CoreError> {
        let Some(at) = self.cursor() else {
            return Ok(());
        };
        let next = target(&self.session.puzzle, &self.session.board_state, at)?;
        self.move_to(next);
        Ok(())
    }

    fn rebus_clicked(&mut self) -> Result<(), CoreError> {
        if !self.local.rebus {
            self.local.rebus = true;
            return Ok(());
        }
        self.local.rebus = false;
        if let Some(at) = self.cursor() {
            let next =
                cursor::next_empty_cell(&self.session.puzzle, &self.session.board_state, at)?;
            self.move_to(next);
        }
        Ok(())
    }

    fn scope_keys(&self, scope: Scope) -> Result<Vec<CellKey>, CoreError> {
        let puzzle = &self.session.puzzle;
        let keys = match (scope, self.cursor()) {
            (Scope::Puzzle, _) => puzzle.playable_keys().collect(),
            (Scope::Square, Some(at)) => vec![at.key],
            (Scope::Word, Some(at)) => {
                let clue = clue_for_cell(at.key, at.orientation, puzzle)?;
                cell_keys_for_clue(clue, at.orientation)
            }
            (_, None) => Vec::new(),
        };
        Ok(keys)
    }

    /// Emits one cell write for a single touched square, a board write otherwise.
    fn emit_scoped(&mut self, scope: Scope, touched: &[CellKey]) {
        match (scope, touched) {
            (_, []) => {}
            (Scope::Square, [key]) => {
                if let Some(cell) = self.session.board_state.get(key).cloned() {
                    self.effects.push(Effect::UpdateCell {
                        key: *key,
                        cell,
                        fields_to_delete: vec![CellField::LastEditedBy],
                    });
                }
            }
            _ => self.effects.push(Effect::UpdateBoard {
                board: self.session.board_state.clone(),
            }),
        }
    }

    fn check(&mut self, scope: Scope) -> Result<(), CoreError> {
        let keys = self.scope_keys(scope)?;
        let mut touched = Vec::new();
        for key in keys {
            let Some(solution) = self.session.puzzle.solutions.get(&key) else {
                continue;
            };
            let Some(cell) = self.session.board_state.get_mut(&key) else {
                continue;
            };
            if !cell.is_filled() || cell.solution_state == SolutionState::Revealed {
                continue;
            }
            cell.solution_state = check_cell(cell.letter(), solution);
            cell.last_edited_by = None;
            cell.version += 1;
            touched.push(key);
        }
        debug!(%scope, cells = touched.len(), "Checked cells");
        self.emit_scoped(scope, &touched);
        Ok(())
    }

    fn reveal_cell(&mut self, key: CellKey) -> bool {
        let Some(answer) = self
            .session
            .puzzle
            .solutions
            .get(&key)
            .and_then(|solution| solution.first())
        else {
            return false;
        };
        let Some(cell) = self.session.board_state.get_mut(&key) else {
            return false;
        };
        cell.current_letter = Some(answer.to_string());
        cell.solution_state = SolutionState::Revealed;
        cell.last_edited_by = None;
        cell.version += 1;
        true
    }

    fn reveal(&mut self, scope: Scope) -> Result<(), CoreError> {
        let touched: Vec<CellKey> = self
            .scope_keys(scope)?
            .into_iter()
            .filter(|key| self.reveal_cell(*key))
            .collect();
        debug!(%scope, cells = touched.len(), "Revealed cells");
        self.emit_scoped(scope, &touched);
        complete_if_solved(self.session, &mut self.effects);
        Ok(())
    }

    fn reveal_most<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let keys: Vec<CellKey> = self.session.puzzle.playable_keys().collect();
        let revealed = keys
            .into_iter()
            .filter(|_| rng.gen_bool(REVEAL_MOST_PROBABILITY))
            .filter(|key| self.reveal_cell(*key))
            .count();
        info!(revealed, "Revealed most squares");
        if revealed > 0 {
            self.effects.push(Effect::UpdateBoard {
                board: self.session.board_state.clone(),
            });
        }
        complete_if_solved(self.session, &mut self.effects);
    }

    fn reset(&mut self) -> Result<(), CoreError> {
        let session = &mut *self.session;
        session.board_state = reset_board_state(&session.board_state, &session.puzzle.solutions);
        session.session_status = SessionStatus::Started;
        session.end_time = None;
        self.local.rebus = false;

        let first = cursor::first_selectable_cell(
            &self.session.puzzle,
            &self.session.board_state,
            self.local.orientation,
        )?;
        self.move_to(first);
        info!(session_id = %self.session.session_id, "Puzzle reset");

        self.effects.push(Effect::UpdateBoard {
            board: self.session.board_state.clone(),
        });
        self.effects.push(Effect::UpdateSessionStatus {
            status: SessionStatus::Started,
        });
        Ok(())
    }
}
