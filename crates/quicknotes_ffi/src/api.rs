//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the add/list/edit/remove note flows to Dart via FRB.
//! - Turn every core failure into a message the UI can show.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Note text is passed through untouched.

use log::warn;
use quicknotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Note, NoteService,
    NotesProvider, ProviderConfig,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

const DB_PATH_ENV: &str = "QUICKNOTES_DB_PATH";
static NOTES_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One note as shown in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    /// Note text; NULL at rest is returned as empty.
    pub text: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Notes sorted oldest first.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Single-note action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Affected note on success.
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

/// Adds a note from the text-entry flow.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_add(text: String) -> NoteActionResponse {
    match with_service(|service| service.add_note(text).map_err(|err| err.to_string())) {
        Ok(note) => NoteActionResponse::success("Note added.", Some(to_item(note))),
        Err(err) => action_failure("notes_add", err),
    }
}

/// Lists every note, oldest first.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    let listed = with_service(|service| {
        let cursor = service.list_notes().map_err(|err| err.to_string())?;
        cursor.notes().map_err(|err| err.to_string())
    });
    match listed {
        Ok(notes) => {
            let items = notes.into_iter().map(to_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("{} note(s).", items.len())
            };
            NotesListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=notes_list error={err}");
            NotesListResponse {
                ok: false,
                items: Vec::new(),
                message: format!("notes_list failed: {err}"),
            }
        }
    }
}

/// Replaces the text of one note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_edit(id: i64, text: String) -> NoteActionResponse {
    match with_service(|service| service.edit_note(id, text).map_err(|err| err.to_string())) {
        Ok(note) => NoteActionResponse::success("Note updated.", Some(to_item(note))),
        Err(err) => action_failure("notes_edit", err),
    }
}

/// Removes one note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_remove(id: i64) -> NoteActionResponse {
    match with_service(|service| service.remove_note(id).map_err(|err| err.to_string())) {
        Ok(()) => NoteActionResponse::success("Note removed.", None),
        Err(err) => action_failure("notes_remove", err),
    }
}

fn action_failure(op: &'static str, err: String) -> NoteActionResponse {
    warn!("event=ffi_call module=ffi status=error op={op} error={err}");
    NoteActionResponse::failure(format!("{op} failed: {err}"))
}

fn resolve_data_dir() -> PathBuf {
    NOTES_DATA_DIR
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir()
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&NoteService<Arc<NotesProvider>>) -> Result<T, String>,
) -> Result<T, String> {
    let data_dir = resolve_data_dir();
    std::fs::create_dir_all(&data_dir)
        .map_err(|err| format!("notes data dir create failed: {err}"))?;
    let provider = NotesProvider::open(ProviderConfig::default(), &data_dir)
        .map_err(|err| format!("notes DB open failed: {err}"))?;
    let service = NoteService::for_provider(Arc::new(provider));
    f(&service)
}

fn to_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id,
        text: note.text.unwrap_or_default(),
    }
}
