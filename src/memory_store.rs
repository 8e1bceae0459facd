//! In-memory session store with snapshot broadcast.

use crate::persistence::{Persistence, PersistenceError};
use async_trait::async_trait;
use chrono::Utc;
use crossplay_core::{
    BoardState, CellField, CellKey, CellState, Participant, Puzzle, Session, SessionId,
    SessionStatus, board_state_from_solutions,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Holds every session in memory, one watch channel each.
///
/// Cell writes are last-writer-wins: the stored version becomes
/// `max(stored + 1, incoming)`, so whichever write reaches the store last
/// owns the cell. Board writes only replace cells whose incoming version is
/// at least the stored one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<SessionId, watch::Sender<Session>>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory session store");
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<SessionId, watch::Sender<Session>>>, PersistenceError> {
        self.sessions
            .lock()
            .map_err(|_| PersistenceError::new("Session store lock poisoned"))
    }

    /// Creates a session on `puzzle` owned by `owner`, with a fresh board.
    #[instrument(
        skip(self, puzzle, owner),
        fields(puzzle_id = %puzzle.puzzle_id, owner_id = %owner.id)
    )]
    pub fn create_session(
        &self,
        puzzle: Puzzle,
        owner: Participant,
    ) -> Result<SessionId, PersistenceError> {
        let number = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let session = Session {
            session_id: format!("session-{number}"),
            board_state: board_state_from_solutions(&puzzle.solutions),
            puzzle,
            owner_id: owner.id.clone(),
            participants: vec![owner],
            start_time: Utc::now(),
            end_time: None,
            session_status: SessionStatus::Started,
        };
        let id = session.session_id.clone();
        self.insert_session(session)?;
        Ok(id)
    }

    /// Stores a ready-made session.
    #[instrument(skip(self, session), fields(session_id = %session.session_id))]
    pub fn insert_session(&self, session: Session) -> Result<(), PersistenceError> {
        let mut sessions = self.lock()?;
        if sessions.contains_key(&session.session_id) {
            warn!("Session already exists");
            return Err(PersistenceError::new(format!(
                "Session already exists: {}",
                session.session_id
            )));
        }
        let id = session.session_id.clone();
        let (sender, _) = watch::channel(session);
        sessions.insert(id, sender);
        info!("Created session");
        Ok(())
    }

    /// The current snapshot of a session.
    #[instrument(skip(self))]
    pub fn snapshot(&self, session_id: &str) -> Result<Session, PersistenceError> {
        self.with_session(session_id, |sender| sender.borrow().clone())
    }

    /// IDs of every stored session.
    #[instrument(skip(self))]
    pub fn session_ids(&self) -> Result<Vec<SessionId>, PersistenceError> {
        let sessions = self.lock()?;
        let mut ids: Vec<_> = sessions.keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        Ok(ids)
    }

    fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&watch::Sender<Session>) -> T,
    ) -> Result<T, PersistenceError> {
        let sessions = self.lock()?;
        let sender = sessions.get(session_id).ok_or_else(|| {
            warn!(session_id, "Session not found");
            PersistenceError::new(format!("Session not found: {session_id}"))
        })?;
        Ok(f(sender))
    }

    /// Mutates a session and notifies watchers if `f` reports a change.
    fn modify(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut Session) -> Result<bool, PersistenceError>,
    ) -> Result<(), PersistenceError> {
        self.with_session(session_id, |sender| {
            let mut outcome = Ok(());
            sender.send_if_modified(|session| match f(session) {
                Ok(changed) => changed,
                Err(error) => {
                    outcome = Err(error);
                    false
                }
            });
            outcome
        })?
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    #[instrument(skip(self))]
    async fn watch_session(
        &self,
        session_id: &str,
    ) -> Result<watch::Receiver<Session>, PersistenceError> {
        self.with_session(session_id, |sender| sender.subscribe())
    }

    #[instrument(skip(self, board), fields(cells = board.len()))]
    async fn update_board_state(
        &self,
        session_id: &str,
        board: BoardState,
    ) -> Result<(), PersistenceError> {
        self.modify(session_id, |session| {
            let mut written = 0usize;
            let mut stale = 0usize;
            for (key, incoming) in board {
                match session.board_state.get(&key) {
                    None => {
                        return Err(PersistenceError::new(format!("Unknown cell: {key}")));
                    }
                    Some(stored) if *stored == incoming => {}
                    Some(stored) if incoming.version < stored.version => stale += 1,
                    Some(_) => {
                        session.board_state.insert(key, incoming);
                        written += 1;
                    }
                }
            }
            debug!(written, stale, "Board written");
            Ok(written > 0)
        })
    }

    #[instrument(skip(self, cell), fields(cell = %key))]
    async fn update_cell_state(
        &self,
        session_id: &str,
        key: CellKey,
        mut cell: CellState,
        fields_to_delete: Vec<CellField>,
    ) -> Result<(), PersistenceError> {
        self.modify(session_id, |session| {
            let stored = session
                .board_state
                .get(&key)
                .ok_or_else(|| PersistenceError::new(format!("Unknown cell: {key}")))?;
            if stored.version >= cell.version {
                debug!(
                    stored = stored.version,
                    incoming = cell.version,
                    "Concurrent cell write, last writer wins"
                );
            }
            cell.version = cell.version.max(stored.version + 1);
            for field in fields_to_delete {
                match field {
                    CellField::LastEditedBy => cell.last_edited_by = None,
                }
            }
            session.board_state.insert(key, cell);
            Ok(true)
        })
    }

    #[instrument(skip(self))]
    async fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<(), PersistenceError> {
        self.modify(session_id, |session| {
            if session.session_status == status {
                return Ok(false);
            }
            session.session_status = status;
            session.end_time = match status {
                SessionStatus::Complete => Some(Utc::now()),
                SessionStatus::Started => None,
            };
            info!(%status, "Session status changed");
            Ok(true)
        })
    }

    #[instrument(skip(self, participant), fields(participant_id = %participant.id))]
    async fn add_participant(
        &self,
        session_id: &str,
        participant: Participant,
    ) -> Result<(), PersistenceError> {
        self.modify(session_id, |session| {
            if session.has_participant(&participant.id) {
                debug!("Participant already joined");
                return Ok(false);
            }
            info!("Participant joined");
            session.participants.push(participant);
            Ok(true)
        })
    }
}
