//! Session client: a local reducer kept in sync with a shared store.
//!
//! The client owns two background tasks. The watcher folds every snapshot
//! the store publishes into local state via `SET_SHARED_STATE`; the writer
//! applies reducer effects to the store in the order they were produced.
//! Writes are fire-and-forget: a failed write is logged and the optimistic
//! local state is kept.

use crate::persistence::{Persistence, PersistenceError, apply_effect};
use crossplay_core::{
    Action, CombinedBoardState, CoreError, Effect, LocalState, Participant, Session, SessionId,
    SessionState, combined_board_state, reduce,
};
use derive_more::{Display, Error, From};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Errors surfaced by [`SessionClient`].
#[derive(Debug, Clone, Display, Error, From)]
pub enum ClientError {
    /// The reducer rejected an action.
    #[display("Session error: {_0}")]
    Core(CoreError),
    /// The store could not be reached.
    #[display("{_0}")]
    Persistence(PersistenceError),
}

enum WriterCommand {
    Apply(Vec<Effect>),
    Flush(oneshot::Sender<()>),
}

/// One participant's live view of a shared session.
pub struct SessionClient {
    session_id: SessionId,
    state: Arc<Mutex<SessionState>>,
    snapshots: watch::Receiver<Session>,
    writer: mpsc::UnboundedSender<WriterCommand>,
    watcher_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Subscribes to a session, loads it and joins it as `participant`.
    #[instrument(skip(persistence, participant, local), fields(participant_id = %participant.id))]
    pub async fn open<P>(
        persistence: Arc<P>,
        session_id: &str,
        participant: Participant,
        local: LocalState,
    ) -> Result<Self, ClientError>
    where
        P: Persistence + ?Sized + 'static,
    {
        let mut snapshots = persistence.watch_session(session_id).await?;
        let snapshot = snapshots.borrow_and_update().clone();

        let state = SessionState::with_local(participant.id.clone(), local);
        let loaded = reduce(state, Action::SetOriginalState(Box::new(snapshot)))?;
        let state = Arc::new(Mutex::new(loaded.state));

        let (writer, commands) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(run_writer(persistence, session_id.to_string(), commands));
        let watcher_task = tokio::spawn(fold_snapshots(
            snapshots.clone(),
            Arc::clone(&state),
            writer.clone(),
        ));

        let client = Self {
            session_id: session_id.to_string(),
            state,
            snapshots,
            writer,
            watcher_task,
            writer_task,
        };
        client
            .dispatch(Action::JoinSessionParticipants(participant))
            .await?;
        info!(session_id, "Session client open");
        Ok(client)
    }

    /// The session this client is attached to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Reduces an action against local state and queues its effects.
    ///
    /// Returns the new local state. On error the local state is unchanged.
    #[instrument(skip(self, action), fields(session_id = %self.session_id, action = action.name()))]
    pub async fn dispatch(&self, action: Action) -> Result<SessionState, ClientError> {
        let mut state = self.state.lock().await;
        let transition = reduce(state.clone(), action).map_err(|e| {
            warn!(error = %e, "Action rejected");
            e
        })?;
        *state = transition.state;
        queue_effects(&self.writer, transition.effects);
        Ok(state.clone())
    }

    /// Current local state.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Local board with the selection overlay applied.
    pub async fn combined_board(&self) -> Result<Option<CombinedBoardState>, ClientError> {
        let state = self.state.lock().await;
        let Some(session) = &state.session else {
            return Ok(None);
        };
        Ok(Some(combined_board_state(session, &state.local)?))
    }

    /// Waits until every queued write has reached the store.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn flush(&self) -> Result<(), ClientError> {
        let (done, wait) = oneshot::channel();
        self.writer
            .send(WriterCommand::Flush(done))
            .map_err(|_| PersistenceError::new("Writer task stopped"))?;
        wait.await
            .map_err(|_| PersistenceError::new("Writer task stopped"))?;
        debug!("Writes flushed");
        Ok(())
    }

    /// Flushes writes, then folds the store's latest snapshot.
    ///
    /// Folding is idempotent, so racing the watcher task is harmless.
    pub async fn sync(&self) -> Result<SessionState, ClientError> {
        self.flush().await?;
        let latest = self.snapshots.borrow().clone();
        self.dispatch(Action::SetSharedState(Box::new(latest))).await
    }

    /// Stops watching the session. Queued writes that have not started are dropped.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn close(self) {
        info!("Closing session client");
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        self.watcher_task.abort();
        self.writer_task.abort();
    }
}

fn queue_effects(writer: &mpsc::UnboundedSender<WriterCommand>, effects: Vec<Effect>) {
    if effects.is_empty() {
        return;
    }
    if writer.send(WriterCommand::Apply(effects)).is_err() {
        warn!("Writer task stopped, dropping effects");
    }
}

async fn run_writer<P>(
    persistence: Arc<P>,
    session_id: SessionId,
    mut commands: mpsc::UnboundedReceiver<WriterCommand>,
) where
    P: Persistence + ?Sized,
{
    while let Some(command) = commands.recv().await {
        match command {
            WriterCommand::Apply(effects) => {
                for effect in effects {
                    if let Err(e) = apply_effect(persistence.as_ref(), &session_id, effect).await {
                        warn!(error = %e, "Persistence write failed, keeping local state");
                    }
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Writer stopped");
}

async fn fold_snapshots(
    mut snapshots: watch::Receiver<Session>,
    state: Arc<Mutex<SessionState>>,
    writer: mpsc::UnboundedSender<WriterCommand>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        let mut state = state.lock().await;
        match reduce(state.clone(), Action::SetSharedState(Box::new(snapshot))) {
            Ok(transition) => {
                *state = transition.state;
                queue_effects(&writer, transition.effects);
            }
            Err(e) => warn!(error = %e, "Failed to fold snapshot"),
        }
    }
    debug!("Session watch closed");
}
