//! In-memory [`NoteStore`] backed by a `Vec` behind `std::sync::RwLock`.
//!
//! The lock is never held across an `.await`, so every operation is
//! atomic with respect to the others. Lookups are linear; the store is
//! meant for a single user's notes.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::models::{NewNote, Note, NoteUpdate};

use super::{NoteStore, StoreError, StoreResult};

/// Insertion-ordered note list.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        let notes = self.notes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(notes.clone())
    }

    async fn create(&self, draft: NewNote) -> StoreResult<Note> {
        let note = Note::create(draft);
        let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
        notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: &str, update: NoteUpdate) -> StoreResult<Note> {
        let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        note.apply(update);
        Ok(note.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
        let pos = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        notes.remove(pos);
        Ok(())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.notes.read().unwrap_or_else(PoisonError::into_inner).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> NewNote {
        NewNote {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = InMemoryNoteStore::new();
        let a = store.create(draft("a", "1")).await.unwrap();
        let b = store.create(draft("b", "2")).await.unwrap();
        let c = store.create(draft("c", "3")).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_refreshes_timestamp() {
        let store = InMemoryNoteStore::new();
        let note = store.create(draft("old", "text")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = store
            .update(
                &note.id,
                NoteUpdate {
                    title: Some("new".into()),
                    content: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.title, "new");
        assert_eq!(updated.content, "text");
        assert!(updated.timestamp > note.timestamp);
        assert_eq!(store.list().await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = InMemoryNoteStore::new();
        let err = store
            .update("missing", NoteUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() {
        let store = InMemoryNoteStore::new();
        let keep = store.create(draft("keep", "")).await.unwrap();
        let gone = store.create(draft("gone", "")).await.unwrap();

        store.delete(&gone.id).await.unwrap();

        let notes = store.list().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, keep.id);
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_store_unchanged() {
        let store = InMemoryNoteStore::new();
        store.create(draft("a", "")).await.unwrap();

        assert!(matches!(
            store.delete("nope").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.len().await.unwrap(), 1);
    }
}
