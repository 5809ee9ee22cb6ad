//! The process-wide "current document" used as chat and question context.
//!
//! Each successful PDF upload replaces the whole value in one assignment;
//! readers clone out an [`Arc`] so a long completion call never holds the
//! lock.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Text extracted from the most recent upload.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub text: String,
    pub page_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl LoadedDocument {
    /// Number of characters (Unicode scalar values) in the text.
    ///
    /// Characters outside the Basic Multilingual Plane count once, not as
    /// two UTF-16 code units.
    pub fn characters(&self) -> usize {
        self.text.chars().count()
    }
}

/// Holder for the current document.
#[derive(Default)]
pub struct DocumentContext {
    current: RwLock<Option<Arc<LoadedDocument>>>,
}

impl DocumentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current document.
    pub fn replace(&self, text: String, page_count: usize) -> Arc<LoadedDocument> {
        let doc = Arc::new(LoadedDocument {
            text,
            page_count,
            uploaded_at: Utc::now(),
        });
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(doc.clone());
        doc
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The current document, if one with non-empty text is loaded.
    ///
    /// A PDF whose extraction produced no text counts as no document.
    pub fn current(&self) -> Option<Arc<LoadedDocument>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|doc| !doc.text.is_empty())
    }

    pub fn status(&self) -> DocumentStatus {
        match self.current() {
            Some(doc) => DocumentStatus {
                loaded: true,
                page_count: doc.page_count,
                characters: doc.characters(),
                uploaded_at: Some(crate::models::iso_millis::format(&doc.uploaded_at)),
            },
            None => DocumentStatus::default(),
        }
    }
}

/// Response body of `GET /document`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub loaded: bool,
    pub page_count: usize,
    pub characters: usize,
    pub uploaded_at: Option<String>,
}
