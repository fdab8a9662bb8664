//! Note use-case service.
//!
//! # Invariants
//! - The note list is sorted by `id ASC` (creation order).
//! - Note text is stored exactly as given; no trimming or normalization.
//! - Edits and removals address one note through its item locator.

use crate::model::note::{Note, NoteId, COLUMN_ID, COLUMN_TEXT};
use crate::model::values::ContentValues;
use crate::provider::cursor::NoteCursor;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::locator::Locator;
use crate::provider::notes_provider::{ContentProvider, NotesProvider, QueryRequest};
use crate::repo::notes_table::Selection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Provider-layer failure.
    Provider(ProviderError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Provider(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for NoteServiceError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// Note service facade over a content provider.
pub struct NoteService<P: ContentProvider> {
    provider: P,
    collection: Locator,
}

impl NoteService<Arc<NotesProvider>> {
    /// Service bound to the provider's own notes collection.
    pub fn for_provider(provider: Arc<NotesProvider>) -> Self {
        let collection = provider.collection_locator().clone();
        Self::new(provider, collection)
    }
}

impl<P: ContentProvider> NoteService<P> {
    pub fn new(provider: P, collection: Locator) -> Self {
        Self {
            provider,
            collection,
        }
    }

    pub fn collection(&self) -> &Locator {
        &self.collection
    }

    /// Creates one note and returns it as stored.
    pub fn add_note(&self, text: impl Into<String>) -> Result<Note, NoteServiceError> {
        let values = ContentValues::new().with(COLUMN_TEXT, text.into());
        let created = self.provider.insert(&self.collection, &values)?;
        let id = created
            .parse_id()
            .ok_or(NoteServiceError::InconsistentState(
                "insert returned a locator without an id",
            ))?;
        self.get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Live list of every note, oldest first.
    pub fn list_notes(&self) -> ProviderResult<NoteCursor> {
        let request = QueryRequest::default()
            .with_projection([COLUMN_ID, COLUMN_TEXT])
            .with_sort_order(format!("{COLUMN_ID} ASC"));
        self.provider.query(&self.collection, &request)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> ProviderResult<Option<Note>> {
        let Some(item) = self.item(id) else {
            return Ok(None);
        };
        let request = QueryRequest::default().with_projection([COLUMN_ID, COLUMN_TEXT]);
        let cursor = self.provider.query(&item, &request)?;
        Ok(cursor.notes()?.into_iter().next())
    }

    /// Replaces the text of one note.
    pub fn edit_note(&self, id: NoteId, text: impl Into<String>) -> Result<Note, NoteServiceError> {
        let item = self.item(id).ok_or(NoteServiceError::NoteNotFound(id))?;
        let values = ContentValues::new().with(COLUMN_TEXT, text.into());
        let changed = self.provider.update(&item, &values, &Selection::all())?;
        if changed == 0 {
            return Err(NoteServiceError::NoteNotFound(id));
        }
        self.get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))
    }

    /// Removes one note.
    pub fn remove_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        let item = self.item(id).ok_or(NoteServiceError::NoteNotFound(id))?;
        let removed = self.provider.delete(&item, &Selection::all())?;
        if removed == 0 {
            return Err(NoteServiceError::NoteNotFound(id));
        }
        Ok(())
    }

    /// Store ids are never negative, so those have no item locator.
    fn item(&self, id: NoteId) -> Option<Locator> {
        (id >= 0).then(|| self.collection.with_appended_id(id))
    }
}
