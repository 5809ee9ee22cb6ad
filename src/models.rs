//! Core data models: notes and their request schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single note as stored and returned by the notes API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Time of the last create or update.
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Title given to notes created without one.
pub const DEFAULT_TITLE: &str = "Untitled";

impl Note {
    /// Builds a fresh note with a new UUID and the current time.
    ///
    /// Absent or empty fields fall back to [`DEFAULT_TITLE`] and `""`.
    pub fn create(draft: NewNote) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: non_empty(draft.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            content: non_empty(draft.content).unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    /// Applies an update in place and refreshes the timestamp.
    ///
    /// Empty strings count as absent, so an update can never blank out a
    /// field that already has a value.
    pub fn apply(&mut self, update: NoteUpdate) {
        if let Some(title) = non_empty(update.title) {
            self.title = title;
        }
        if let Some(content) = non_empty(update.content) {
            self.content = content;
        }
        self.timestamp = Utc::now();
    }
}

/// Body of `POST /api/notes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `PUT /api/notes/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
