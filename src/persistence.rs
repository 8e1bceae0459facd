//! Persistence contract for shared session state.

use async_trait::async_trait;
use crossplay_core::{
    BoardState, CellField, CellKey, CellState, Effect, Participant, Session, SessionStatus,
};
use derive_more::{Display, Error};
use tokio::sync::watch;
use tracing::instrument;

/// Persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Persistence error: {} at {}:{}", message, file, line)]
pub struct PersistenceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PersistenceError {
    /// Creates a new persistence error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Store of shared sessions.
///
/// Every write is addressed by session ID and must eventually be visible to
/// all watchers of that session as a new snapshot.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Subscribes to snapshots of a session. The receiver starts at the
    /// current snapshot.
    async fn watch_session(
        &self,
        session_id: &str,
    ) -> Result<watch::Receiver<Session>, PersistenceError>;

    /// Replaces the board.
    async fn update_board_state(
        &self,
        session_id: &str,
        board: BoardState,
    ) -> Result<(), PersistenceError>;

    /// Writes one cell, then removes `fields_to_delete` from it.
    async fn update_cell_state(
        &self,
        session_id: &str,
        key: CellKey,
        cell: CellState,
        fields_to_delete: Vec<CellField>,
    ) -> Result<(), PersistenceError>;

    /// Sets the gameplay status.
    async fn update_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<(), PersistenceError>;

    /// Adds a participant if not already present.
    async fn add_participant(
        &self,
        session_id: &str,
        participant: Participant,
    ) -> Result<(), PersistenceError>;
}

/// Carries out one reducer effect against a store.
#[instrument(skip(persistence, effect))]
pub async fn apply_effect<P>(
    persistence: &P,
    session_id: &str,
    effect: Effect,
) -> Result<(), PersistenceError>
where
    P: Persistence + ?Sized,
{
    match effect {
        Effect::UpdateCell {
            key,
            cell,
            fields_to_delete,
        } => {
            persistence
                .update_cell_state(session_id, key, cell, fields_to_delete)
                .await
        }
        Effect::UpdateBoard { board } => persistence.update_board_state(session_id, board).await,
        Effect::UpdateSessionStatus { status } => {
            persistence.update_session_status(session_id, status).await
        }
        Effect::AddParticipant { participant } => {
            persistence.add_participant(session_id, participant).await
        }
    }
}
