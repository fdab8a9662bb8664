//! Lazy, restartable query result with change tracking.
//!
//! # Invariants
//! - Creating a cursor runs no SQL; each read re-executes the query against
//!   the current table state.
//! - The cursor stays registered with the notifier until it is dropped.
//! - `is_dirty()` turns true on any change delivered after the last read.

use crate::db::NoteStore;
use crate::model::note::{Note, COLUMN_ID, COLUMN_TEXT};
use crate::model::values::{ColumnValue, ContentRow};
use crate::observer::notifier::{ChangeNotifier, ChangeObserver, ObserverId};
use crate::provider::error::{InvalidRequest, ProviderError, ProviderResult};
use crate::provider::locator::Locator;
use crate::repo::notes_table::{NotesTable, SelectPlan};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type ChangeListener = Arc<dyn Fn(&Locator) + Send + Sync>;

struct CursorObserver {
    dirty: AtomicBool,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl ChangeObserver for CursorObserver {
    fn on_change(&self, locator: &Locator) {
        self.dirty.store(true, Ordering::SeqCst);
        // Listeners may write through the provider and re-enter here.
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(locator);
        }
    }
}

/// Query result handed out by `ContentProvider::query`.
pub struct NoteCursor {
    store: Arc<NoteStore>,
    notifier: Arc<ChangeNotifier>,
    locator: Locator,
    plan: SelectPlan,
    observer: Arc<CursorObserver>,
    registration: ObserverId,
}

impl NoteCursor {
    pub(crate) fn new(
        store: Arc<NoteStore>,
        notifier: Arc<ChangeNotifier>,
        locator: Locator,
        plan: SelectPlan,
    ) -> Self {
        let observer = Arc::new(CursorObserver {
            dirty: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        });
        let registration = notifier.register(locator.clone(), true, &observer);
        Self {
            store,
            notifier,
            locator,
            plan,
            observer,
            registration,
        }
    }

    /// Locator this cursor watches.
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Public names of the projected columns, in output order.
    pub fn columns(&self) -> Vec<&str> {
        self.plan
            .columns
            .iter()
            .map(|column| column.alias.as_str())
            .collect()
    }

    /// Runs the query and returns every row.
    ///
    /// Clears the dirty flag before reading, so a change racing the read
    /// leaves the cursor dirty.
    pub fn rows(&self) -> ProviderResult<Vec<ContentRow>> {
        self.observer.dirty.store(false, Ordering::SeqCst);
        let conn = self.store.reader();
        let rows = NotesTable::new(&conn).select(&self.plan)?;
        Ok(rows)
    }

    /// Runs the query and returns the row count.
    pub fn count(&self) -> ProviderResult<usize> {
        Ok(self.rows()?.len())
    }

    /// Runs the query and maps rows to `Note`.
    ///
    /// Requires both `id` and `text` in the projection. A row whose `text`
    /// is neither text nor NULL fails the whole read.
    pub fn notes(&self) -> ProviderResult<Vec<Note>> {
        for required in [COLUMN_ID, COLUMN_TEXT] {
            if !self.columns().contains(&required) {
                return Err(InvalidRequest::MissingField(required).into());
            }
        }
        self.rows()?
            .iter()
            .map(|row| {
                Note::from_row(row).ok_or_else(|| ProviderError::MalformedRow {
                    id: row.get(COLUMN_ID).and_then(ColumnValue::as_i64),
                })
            })
            .collect()
    }

    /// True when a change arrived since the last read.
    pub fn is_dirty(&self) -> bool {
        self.observer.dirty.load(Ordering::SeqCst)
    }

    pub fn mark_clean(&self) {
        self.observer.dirty.store(false, Ordering::SeqCst);
    }

    /// Calls `listener` for every change delivered to this cursor.
    pub fn add_listener(&self, listener: impl Fn(&Locator) + Send + Sync + 'static) {
        self.observer
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }
}

impl Drop for NoteCursor {
    fn drop(&mut self) {
        self.notifier.unregister(self.registration);
    }
}
