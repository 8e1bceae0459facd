//! Tests for session clients sharing one in-memory store.

use async_trait::async_trait;
use crossplay::{MemoryStore, Persistence, PersistenceError, SessionClient};
use crossplay_core::{
    Action, BoardState, CellField, CellKey, CellSelectionState, CellState, LocalState, Participant,
    Puzzle, Session, SessionStatus,
};
use std::sync::Arc;
use tokio::sync::watch;

fn puzzle() -> Puzzle {
    Puzzle::from_json_str(include_str!("../puzzles/cat_web.json")).unwrap()
}

fn ann() -> Participant {
    Participant::new("ann".to_string(), "Ann".to_string())
}

fn bo() -> Participant {
    Participant::new("bo".to_string(), "Bo".to_string())
}

async fn open(store: &Arc<MemoryStore>, session_id: &str, who: Participant) -> SessionClient {
    SessionClient::open(Arc::clone(store), session_id, who, LocalState::default())
        .await
        .unwrap()
}

async fn board(client: &SessionClient) -> BoardState {
    client.state().await.session.unwrap().board_state
}

#[tokio::test]
async fn test_two_clients_converge_after_sync() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(puzzle(), ann()).unwrap();
    let first = open(&store, &id, ann()).await;
    let second = open(&store, &id, bo()).await;

    first.dispatch(Action::LetterPressed('c')).await.unwrap();
    second
        .dispatch(Action::CellClicked(CellKey::new(0, 2)))
        .await
        .unwrap();
    second.dispatch(Action::LetterPressed('w')).await.unwrap();

    first.flush().await.unwrap();
    second.flush().await.unwrap();
    first.sync().await.unwrap();
    second.sync().await.unwrap();

    let shared = store.snapshot(&id).unwrap().board_state;
    assert_eq!(board(&first).await, shared);
    assert_eq!(board(&second).await, shared);
    assert_eq!(shared[&CellKey::new(0, 0)].letter(), "C");
    assert_eq!(shared[&CellKey::new(0, 2)].last_edited_by.as_deref(), Some("bo"));

    // Cursors stay local.
    let first_state = first.state().await;
    let second_state = second.state().await;
    assert_ne!(
        first_state.local.selected_cell_key,
        second_state.local.selected_cell_key
    );
}

#[tokio::test]
async fn test_open_joins_session() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(puzzle(), ann()).unwrap();
    let client = open(&store, &id, bo()).await;
    assert_eq!(client.session_id(), id);

    let state = client.sync().await.unwrap();
    let session = state.session.unwrap();
    assert!(session.has_participant("bo"));
    assert_eq!(session.owner_id, "ann");
    assert!(store.snapshot(&id).unwrap().has_participant("bo"));

    // Joining twice does not duplicate the participant.
    client
        .dispatch(Action::JoinSessionParticipants(bo()))
        .await
        .unwrap();
    client.flush().await.unwrap();
    assert_eq!(store.snapshot(&id).unwrap().participants.len(), 2);
}

#[tokio::test]
async fn test_reveal_puzzle_completes_shared_session() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(puzzle(), ann()).unwrap();
    let client = open(&store, &id, ann()).await;

    let state = client.dispatch(Action::RevealPuzzle).await.unwrap();
    assert_eq!(
        state.session.unwrap().session_status,
        SessionStatus::Complete
    );
    client.flush().await.unwrap();

    let shared = store.snapshot(&id).unwrap();
    assert_eq!(shared.session_status, SessionStatus::Complete);
    assert!(shared.end_time.is_some());

    let state = client.sync().await.unwrap();
    assert_eq!(
        state.session.unwrap().session_status,
        SessionStatus::Complete
    );

    // Typing into a completed session changes nothing.
    let before = board(&client).await;
    client.dispatch(Action::LetterPressed('z')).await.unwrap();
    assert_eq!(board(&client).await, before);
}

#[tokio::test]
async fn test_same_cell_last_writer_wins() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(puzzle(), ann()).unwrap();
    let first = open(&store, &id, ann()).await;
    let second = open(&store, &id, bo()).await;
    let key = CellKey::new(0, 0);

    first.dispatch(Action::CellClicked(key)).await.unwrap();
    first.dispatch(Action::LetterPressed('x')).await.unwrap();
    first.flush().await.unwrap();

    second.dispatch(Action::CellClicked(key)).await.unwrap();
    second.dispatch(Action::LetterPressed('c')).await.unwrap();
    second.flush().await.unwrap();

    first.sync().await.unwrap();
    second.sync().await.unwrap();

    let shared = store.snapshot(&id).unwrap().board_state;
    assert_eq!(shared[&key].letter(), "C");
    assert_eq!(shared[&key].last_edited_by.as_deref(), Some("bo"));
    assert_eq!(board(&first).await[&key], shared[&key]);
    assert_eq!(board(&second).await[&key], shared[&key]);
}

#[tokio::test]
async fn test_combined_board_marks_selection() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(puzzle(), ann()).unwrap();
    let client = open(&store, &id, ann()).await;

    let combined = client.combined_board().await.unwrap().unwrap();
    let selected = combined
        .values()
        .filter(|cell| cell.cell_selection_state == CellSelectionState::SelectedCell)
        .count();
    assert_eq!(selected, 1);
}

/// Store that serves snapshots but rejects every write.
struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl Persistence for ReadOnlyStore {
    async fn watch_session(
        &self,
        session_id: &str,
    ) -> Result<watch::Receiver<Session>, PersistenceError> {
        self.inner.watch_session(session_id).await
    }

    async fn update_board_state(
        &self,
        _session_id: &str,
        _board: BoardState,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::new("read only"))
    }

    async fn update_cell_state(
        &self,
        _session_id: &str,
        _key: CellKey,
        _cell: CellState,
        _fields_to_delete: Vec<CellField>,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::new("read only"))
    }

    async fn update_session_status(
        &self,
        _session_id: &str,
        _status: SessionStatus,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::new("read only"))
    }

    async fn add_participant(
        &self,
        _session_id: &str,
        _participant: Participant,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::new("read only"))
    }
}

#[tokio::test]
async fn test_failed_writes_keep_local_state() {
    let inner = MemoryStore::new();
    let id = inner.create_session(puzzle(), ann()).unwrap();
    let store = Arc::new(ReadOnlyStore {
        inner: inner.clone(),
    });
    let client = SessionClient::open(store, &id, bo(), LocalState::default())
        .await
        .unwrap();

    let state = client.dispatch(Action::LetterPressed('c')).await.unwrap();
    client.flush().await.unwrap();

    let key = CellKey::new(0, 0);
    assert_eq!(state.session.unwrap().board_state[&key].letter(), "C");
    assert_eq!(board(&client).await[&key].letter(), "C");
    assert!(!inner.snapshot(&id).unwrap().board_state[&key].is_filled());
    assert!(!inner.snapshot(&id).unwrap().has_participant("bo"));
}

#[tokio::test]
async fn test_open_unknown_session_fails() {
    let store = Arc::new(MemoryStore::new());
    let result = SessionClient::open(store, "missing", ann(), LocalState::default()).await;
    assert!(result.is_err());
}
