//! Storage abstraction for notes.
//!
//! The [`NoteStore`] trait defines the operations the notes API needs,
//! so handlers never touch a concrete backend. The only backend shipped
//! is [`memory::InMemoryNoteStore`]; notes do not survive a restart.
//!
//! Implementations must be `Send + Sync` to be shared across handlers.

pub mod memory;

use async_trait::async_trait;

use crate::models::{NewNote, Note, NoteUpdate};

/// Errors returned by a [`NoteStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("note not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract note storage.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list`](NoteStore::list) | All notes in insertion order |
/// | [`create`](NoteStore::create) | Append a new note |
/// | [`update`](NoteStore::update) | Apply an update to an existing note |
/// | [`delete`](NoteStore::delete) | Remove a note by id |
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Note>>;

    /// Creates a note from `draft` and returns the stored record.
    async fn create(&self, draft: NewNote) -> StoreResult<Note>;

    /// Updates the note with `id`, or fails with [`StoreError::NotFound`].
    async fn update(&self, id: &str, update: NoteUpdate) -> StoreResult<Note>;

    /// Removes the note with `id`, or fails with [`StoreError::NotFound`].
    async fn delete(&self, id: &str) -> StoreResult<()>;

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.list().await?.len())
    }
}
