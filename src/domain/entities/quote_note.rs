//! # Quote Note
//!
//! Append-only audit record, one per lifecycle action.

use crate::domain::value_objects::{NoteType, QuoteId, QuoteNoteId, Timestamp};
use serde::{Deserialize, Serialize};

/// Author recorded on notes written by background jobs.
pub const SYSTEM_ACTOR: &str = "system";

/// An audit note attached to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteNote {
    id: QuoteNoteId,
    quote_id: QuoteId,
    note_type: NoteType,
    note_content: String,
    created_by: String,
    created_at: Timestamp,
}

impl QuoteNote {
    /// Creates a note stamped at `created_at`.
    #[must_use]
    pub fn new(
        quote_id: QuoteId,
        note_type: NoteType,
        note_content: impl Into<String>,
        created_by: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: QuoteNoteId::new_v4(),
            quote_id,
            note_type,
            note_content: note_content.into(),
            created_by: created_by.into(),
            created_at,
        }
    }

    /// The note the expiration scan appends to each quote it expires.
    #[must_use]
    pub fn system_expiration(quote_id: QuoteId, now: Timestamp) -> Self {
        Self::new(
            quote_id,
            NoteType::Expire,
            "Quote expired automatically after passing its expiration date",
            SYSTEM_ACTOR,
            now,
        )
    }

    /// Rebuilds a note from storage.
    #[must_use]
    pub fn from_parts(
        id: QuoteNoteId,
        quote_id: QuoteId,
        note_type: NoteType,
        note_content: String,
        created_by: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            quote_id,
            note_type,
            note_content,
            created_by,
            created_at,
        }
    }

    /// Returns the note ID.
    #[must_use]
    pub fn id(&self) -> QuoteNoteId {
        self.id
    }

    /// Returns the quote the note belongs to.
    #[must_use]
    pub fn quote_id(&self) -> QuoteId {
        self.quote_id
    }

    /// Returns the note type.
    #[must_use]
    pub fn note_type(&self) -> NoteType {
        self.note_type
    }

    /// Returns the note text.
    #[must_use]
    pub fn note_content(&self) -> &str {
        &self.note_content
    }

    /// Returns the author.
    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_expiration_note() {
        let quote_id = QuoteId::new_v4();
        let now = Timestamp::now();
        let note = QuoteNote::system_expiration(quote_id, now);
        assert_eq!(note.quote_id(), quote_id);
        assert_eq!(note.note_type(), NoteType::Expire);
        assert_eq!(note.created_by(), SYSTEM_ACTOR);
        assert_eq!(note.created_at(), now);
    }
}
