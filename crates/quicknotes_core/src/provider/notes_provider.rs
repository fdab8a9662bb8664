//! Locator-addressed CRUD over the notes table.
//!
//! # Responsibility
//! - Resolve locators through the route table and reject unknown ones.
//! - Validate request columns against the projection map.
//! - Run table operations and broadcast change notifications.
//!
//! # Invariants
//! - Every rejection happens before the store is touched.
//! - Storage errors propagate unmodified as `ProviderError::Storage`.
//! - Notifications fire only after a mutation changed at least one row,
//!   and only after the store handle is released.
//! - Note text never reaches log output.

use crate::config::{ProviderConfig, NOTES_PATH};
use crate::db::NoteStore;
use crate::model::note::{NoteId, COLUMN_ID, COLUMN_TEXT};
use crate::model::values::ContentValues;
use crate::observer::notifier::ChangeNotifier;
use crate::provider::cursor::NoteCursor;
use crate::provider::error::{InvalidRequest, ProviderError, ProviderResult};
use crate::provider::locator::Locator;
use crate::provider::matcher::{RouteMatch, RouteScope, RouteTable, RouteTarget};
use crate::provider::projection::ProjectionMap;
use crate::repo::notes_table::{NotesTable, SelectPlan, Selection, NOTES_TABLE};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Type tag of the notes collection.
pub const NOTES_DIR_TYPE: &str = "vnd.android.cursor.dir/vnd.quicknotes.note";
/// Type tag of one note.
pub const NOTE_ITEM_TYPE: &str = "vnd.android.cursor.item/vnd.quicknotes.note";

/// Query options. `Default` selects every registered column of every row
/// in storage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// Public column names; `None` means every registered column.
    pub projection: Option<Vec<String>>,
    pub selection: Selection,
    /// Raw `ORDER BY` body over public column names.
    pub sort_order: Option<String>,
}

impl QueryRequest {
    pub fn with_projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_sort_order(mut self, sort_order: impl Into<String>) -> Self {
        self.sort_order = Some(sort_order.into());
        self
    }
}

/// Locator-addressed CRUD contract.
pub trait ContentProvider {
    /// Inserts one row; returns the locator of the new row.
    fn insert(&self, locator: &Locator, values: &ContentValues) -> ProviderResult<Locator>;
    /// Returns a lazy cursor over the matching rows.
    fn query(&self, locator: &Locator, request: &QueryRequest) -> ProviderResult<NoteCursor>;
    /// Applies `values` to matching rows; returns the affected count.
    fn update(
        &self,
        locator: &Locator,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize>;
    /// Removes matching rows; returns the removed count.
    fn delete(&self, locator: &Locator, selection: &Selection) -> ProviderResult<usize>;
    /// Returns the type tag of the addressed resource.
    fn get_type(&self, locator: &Locator) -> ProviderResult<&'static str>;
}

impl<P: ContentProvider + ?Sized> ContentProvider for Arc<P> {
    fn insert(&self, locator: &Locator, values: &ContentValues) -> ProviderResult<Locator> {
        (**self).insert(locator, values)
    }

    fn query(&self, locator: &Locator, request: &QueryRequest) -> ProviderResult<NoteCursor> {
        (**self).query(locator, request)
    }

    fn update(
        &self,
        locator: &Locator,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        (**self).update(locator, values, selection)
    }

    fn delete(&self, locator: &Locator, selection: &Selection) -> ProviderResult<usize> {
        (**self).delete(locator, selection)
    }

    fn get_type(&self, locator: &Locator) -> ProviderResult<&'static str> {
        (**self).get_type(locator)
    }
}

/// SQLite-backed notes provider.
pub struct NotesProvider {
    config: ProviderConfig,
    store: Arc<NoteStore>,
    notifier: Arc<ChangeNotifier>,
    routes: RouteTable,
    projection: ProjectionMap,
    collection: Locator,
}

impl NotesProvider {
    /// Builds a provider over an opened store.
    pub fn new(
        config: ProviderConfig,
        store: Arc<NoteStore>,
        notifier: Arc<ChangeNotifier>,
    ) -> ProviderResult<Self> {
        config.validate()?;
        let routes = RouteTable::new(config.scheme.as_str())
            .with_route(
                config.authority.as_str(),
                NOTES_PATH,
                RouteTarget {
                    name: NOTES_TABLE,
                    scope: RouteScope::Collection,
                    content_type: NOTES_DIR_TYPE,
                    supports_insert: true,
                },
            )
            .with_route(
                config.authority.as_str(),
                &format!("{NOTES_PATH}/#"),
                RouteTarget {
                    name: NOTES_TABLE,
                    scope: RouteScope::Item,
                    content_type: NOTE_ITEM_TYPE,
                    supports_insert: false,
                },
            );
        let projection = ProjectionMap::new()
            .with_read_only_column(COLUMN_ID, COLUMN_ID)
            .with_text_column(COLUMN_TEXT, COLUMN_TEXT);
        let collection = config.collection_locator();

        Ok(Self {
            config,
            store,
            notifier,
            routes,
            projection,
            collection,
        })
    }

    /// Opens `config.database_name` inside `data_dir` and builds a provider
    /// with a fresh notifier.
    pub fn open(config: ProviderConfig, data_dir: impl AsRef<Path>) -> ProviderResult<Self> {
        config.validate()?;
        let store = NoteStore::open(config.database_path(data_dir))?;
        Self::new(config, Arc::new(store), Arc::new(ChangeNotifier::new()))
    }

    /// In-memory provider, mostly for tests and previews.
    pub fn open_in_memory(config: ProviderConfig) -> ProviderResult<Self> {
        let store = NoteStore::open_in_memory()?;
        Self::new(config, Arc::new(store), Arc::new(ChangeNotifier::new()))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Locator of the whole notes collection.
    pub fn collection_locator(&self) -> &Locator {
        &self.collection
    }

    /// Locator of one note.
    pub fn note_locator(&self, id: NoteId) -> Locator {
        self.collection.with_appended_id(id)
    }

    /// Parses and resolves locator text in one step.
    pub fn parse_locator(&self, raw: &str) -> ProviderResult<Locator> {
        let locator = Locator::parse(raw)
            .map_err(|err| InvalidRequest::MalformedLocator(err.to_string()))?;
        self.resolve(&locator)?;
        Ok(locator)
    }

    fn resolve(&self, locator: &Locator) -> ProviderResult<RouteMatch<'_>> {
        self.routes
            .resolve(locator)
            .ok_or_else(|| InvalidRequest::UnknownLocator(locator.to_string()).into())
    }

    fn scoped_selection(matched: &RouteMatch<'_>, selection: &Selection) -> Selection {
        match (matched.target.scope, matched.id) {
            (RouteScope::Item, Some(id)) => {
                Selection::new(format!("{COLUMN_ID} = ?"), [id]).and(selection.clone())
            }
            _ => selection.clone(),
        }
    }

    fn log_rejection(operation: &'static str, locator: &Locator, err: &ProviderError) {
        warn!(
            "event=provider_{operation} module=provider status=error locator={} error_code={} error={}",
            locator,
            err.code(),
            err
        );
    }

    fn insert_inner(&self, locator: &Locator, values: &ContentValues) -> ProviderResult<Locator> {
        let matched = self.resolve(locator)?;
        if !matched.target.supports_insert {
            return Err(InvalidRequest::UnsupportedOperation {
                operation: "insert",
                locator: locator.to_string(),
            }
            .into());
        }
        if !values.contains_key(COLUMN_TEXT) {
            return Err(InvalidRequest::MissingField(COLUMN_TEXT).into());
        }
        let storage_values = self.projection.to_storage_values(values)?;

        let id = {
            let conn = self.store.writer();
            NotesTable::new(&conn).insert(&storage_values)?
        };
        self.notifier.notify_change(&self.collection);
        Ok(locator.with_appended_id(id))
    }

    fn query_inner(&self, locator: &Locator, request: &QueryRequest) -> ProviderResult<NoteCursor> {
        let matched = self.resolve(locator)?;
        let columns = self.projection.resolve(request.projection.as_deref())?;
        let plan = SelectPlan {
            columns,
            selection: Self::scoped_selection(&matched, &request.selection),
            order_by: request.sort_order.clone(),
        };
        Ok(NoteCursor::new(
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
            locator.clone(),
            plan,
        ))
    }

    fn update_inner(
        &self,
        locator: &Locator,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        let matched = self.resolve(locator)?;
        if values.is_empty() {
            return Err(InvalidRequest::EmptyValues.into());
        }
        let storage_values = self.projection.to_storage_values(values)?;
        let selection = Self::scoped_selection(&matched, selection);

        let changed = {
            let conn = self.store.writer();
            NotesTable::new(&conn).update(&storage_values, &selection)?
        };
        if changed > 0 {
            self.notifier.notify_change(locator);
        }
        Ok(changed)
    }

    fn delete_inner(&self, locator: &Locator, selection: &Selection) -> ProviderResult<usize> {
        let matched = self.resolve(locator)?;
        let selection = Self::scoped_selection(&matched, selection);

        let removed = {
            let conn = self.store.writer();
            NotesTable::new(&conn).delete(&selection)?
        };
        if removed > 0 {
            self.notifier.notify_change(locator);
        }
        Ok(removed)
    }
}

impl ContentProvider for NotesProvider {
    fn insert(&self, locator: &Locator, values: &ContentValues) -> ProviderResult<Locator> {
        let started_at = Instant::now();
        match self.insert_inner(locator, values) {
            Ok(created) => {
                info!(
                    "event=provider_insert module=provider status=ok locator={} created={} duration_ms={}",
                    locator,
                    created,
                    started_at.elapsed().as_millis()
                );
                Ok(created)
            }
            Err(err) => {
                Self::log_rejection("insert", locator, &err);
                Err(err)
            }
        }
    }

    fn query(&self, locator: &Locator, request: &QueryRequest) -> ProviderResult<NoteCursor> {
        match self.query_inner(locator, request) {
            Ok(cursor) => {
                info!(
                    "event=provider_query module=provider status=ok locator={} columns={}",
                    locator,
                    cursor.columns().join(",")
                );
                Ok(cursor)
            }
            Err(err) => {
                Self::log_rejection("query", locator, &err);
                Err(err)
            }
        }
    }

    fn update(
        &self,
        locator: &Locator,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        let started_at = Instant::now();
        match self.update_inner(locator, values, selection) {
            Ok(changed) => {
                info!(
                    "event=provider_update module=provider status=ok locator={} changed={} duration_ms={}",
                    locator,
                    changed,
                    started_at.elapsed().as_millis()
                );
                Ok(changed)
            }
            Err(err) => {
                Self::log_rejection("update", locator, &err);
                Err(err)
            }
        }
    }

    fn delete(&self, locator: &Locator, selection: &Selection) -> ProviderResult<usize> {
        let started_at = Instant::now();
        match self.delete_inner(locator, selection) {
            Ok(removed) => {
                info!(
                    "event=provider_delete module=provider status=ok locator={} removed={} duration_ms={}",
                    locator,
                    removed,
                    started_at.elapsed().as_millis()
                );
                Ok(removed)
            }
            Err(err) => {
                Self::log_rejection("delete", locator, &err);
                Err(err)
            }
        }
    }

    fn get_type(&self, locator: &Locator) -> ProviderResult<&'static str> {
        let matched = self.resolve(locator)?;
        Ok(matched.target.content_type)
    }
}
