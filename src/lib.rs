//! Crossplay library - collaborative crossword sessions
//!
//! Wires the pure session logic of [`crossplay_core`] to a shared store.
//!
//! # Architecture
//!
//! - **Persistence**: async contract for reading and writing shared sessions
//! - **Memory store**: in-process store that broadcasts snapshots
//! - **Client**: local reducer state kept in sync with the store
//! - **Config**: participant identity and initial input modes
//!
//! # Example
//!
//! ```no_run
//! use crossplay::{ClientConfig, MemoryStore, SessionClient};
//! use crossplay_core::{Action, Puzzle};
//! use std::sync::Arc;
//!
//! # async fn example(puzzle: Puzzle) -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let store = Arc::new(MemoryStore::new());
//! let session_id = store.create_session(puzzle, config.participant())?;
//!
//! let client =
//!     SessionClient::open(store, &session_id, config.participant(), config.local_state()).await?;
//! client.dispatch(Action::LetterPressed('c')).await?;
//! client.sync().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod display;
mod memory_store;
mod persistence;
mod puzzle_file;

// Crate-level exports - Client
pub use client::{ClientError, SessionClient};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError};

// Crate-level exports - Rendering
pub use display::{render_active_clue, render_board, render_summary};

// Crate-level exports - Storage
pub use memory_store::MemoryStore;
pub use persistence::{Persistence, PersistenceError, apply_effect};

// Crate-level exports - Files
pub use puzzle_file::{PuzzleFileError, load_puzzle, load_script};
