//! Core of the QuickNotes note store.
//! Owns the notes table, the locator-addressed access layer over it and the
//! change notifications UI shells subscribe to.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod observer;
pub mod provider;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ProviderConfig};
pub use db::{DbError, DbResult, NoteStore};
pub use logging::{init_logging, logging_status, LogLevel};
pub use model::note::{Note, NoteId, COLUMN_ID, COLUMN_TEXT};
pub use model::values::{ColumnValue, ContentRow, ContentValues};
pub use observer::notifier::{ChangeNotifier, ChangeObserver, ChangeSubscription, ObserverId};
pub use provider::cursor::NoteCursor;
pub use provider::error::{InvalidRequest, ProviderError, ProviderResult};
pub use provider::locator::{Locator, LocatorParseError};
pub use provider::notes_provider::{
    ContentProvider, NotesProvider, QueryRequest, NOTES_DIR_TYPE, NOTE_ITEM_TYPE,
};
pub use repo::notes_table::Selection;
pub use service::note_service::{NoteService, NoteServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
