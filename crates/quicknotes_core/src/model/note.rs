//! Note domain record.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never changes afterwards.
//! - `text` may be empty or NULL at rest, but the column always exists.

use crate::model::values::{ColumnValue, ContentRow};
use serde::{Deserialize, Serialize};

/// Store-assigned row id.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// Public name of the primary key column.
pub const COLUMN_ID: &str = "id";
/// Public name of the note body column.
pub const COLUMN_TEXT: &str = "text";

/// One persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned, strictly increasing id.
    pub id: NoteId,
    /// Free-form body. `None` when the row holds NULL.
    pub text: Option<String>,
}

impl Note {
    /// Builds a note from a projected row.
    ///
    /// Returns `None` when the row does not carry an integer `id` or when
    /// `text` holds something other than text/NULL.
    pub fn from_row(row: &ContentRow) -> Option<Self> {
        let id = row.get(COLUMN_ID)?.as_i64()?;
        let text = match row.get(COLUMN_TEXT)? {
            ColumnValue::Null => None,
            ColumnValue::Text(value) => Some(value.clone()),
            _ => return None,
        };
        Some(Self { id, text })
    }

    /// Returns the body, treating NULL as empty.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, COLUMN_ID, COLUMN_TEXT};
    use crate::model::values::{ColumnValue, ContentRow};

    #[test]
    fn from_row_reads_id_and_text() {
        let row = ContentRow::from_entries(vec![
            (COLUMN_ID.to_string(), ColumnValue::Integer(7)),
            (COLUMN_TEXT.to_string(), ColumnValue::Text("milk".to_string())),
        ]);
        let note = Note::from_row(&row).expect("row should map to a note");
        assert_eq!(note.id, 7);
        assert_eq!(note.text.as_deref(), Some("milk"));
    }

    #[test]
    fn from_row_maps_null_text_to_none() {
        let row = ContentRow::from_entries(vec![
            (COLUMN_ID.to_string(), ColumnValue::Integer(1)),
            (COLUMN_TEXT.to_string(), ColumnValue::Null),
        ]);
        let note = Note::from_row(&row).expect("row should map to a note");
        assert_eq!(note.text, None);
        assert_eq!(note.text_or_empty(), "");
    }

    #[test]
    fn from_row_requires_id_column() {
        let row = ContentRow::from_entries(vec![(
            COLUMN_TEXT.to_string(),
            ColumnValue::Text("orphan".to_string()),
        )]);
        assert!(Note::from_row(&row).is_none());
    }
}
