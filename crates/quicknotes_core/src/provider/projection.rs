//! Projection map: the only columns a caller can read or write.
//!
//! # Invariants
//! - Unregistered table columns are never exposed, even when present.
//! - Read-only columns (the primary key) can be projected but not written.
//! - Text columns accept only text or NULL values.

use crate::model::values::{ColumnValue, ContentValues};
use crate::provider::error::InvalidRequest;
use crate::repo::notes_table::ProjectedColumn;

/// Value kinds a column accepts on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Any,
    Text,
}

impl ColumnKind {
    fn accepts(self, value: &ColumnValue) -> bool {
        match self {
            Self::Any => true,
            Self::Text => matches!(value, ColumnValue::Text(_) | ColumnValue::Null),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Any => "any value",
            Self::Text => "text or null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMapping {
    public: String,
    storage: String,
    writable: bool,
    kind: ColumnKind,
}

/// Public column name -> storage column, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionMap {
    columns: Vec<ColumnMapping>,
}

impl ProjectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a writable column.
    pub fn with_column(self, public: impl Into<String>, storage: impl Into<String>) -> Self {
        self.push(public.into(), storage.into(), true, ColumnKind::Any)
    }

    /// Registers a writable column holding text or NULL.
    pub fn with_text_column(self, public: impl Into<String>, storage: impl Into<String>) -> Self {
        self.push(public.into(), storage.into(), true, ColumnKind::Text)
    }

    /// Registers a column callers can read but never set.
    pub fn with_read_only_column(
        self,
        public: impl Into<String>,
        storage: impl Into<String>,
    ) -> Self {
        self.push(public.into(), storage.into(), false, ColumnKind::Any)
    }

    fn push(mut self, public: String, storage: String, writable: bool, kind: ColumnKind) -> Self {
        self.columns.push(ColumnMapping {
            public,
            storage,
            writable,
            kind,
        });
        self
    }

    pub fn contains(&self, public: &str) -> bool {
        self.find(public).is_some()
    }

    /// Public column names in registration order.
    pub fn public_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.public.as_str())
    }

    /// Resolves a requested column list; `None` selects every registered
    /// column.
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: Option<&[S]>,
    ) -> Result<Vec<ProjectedColumn>, InvalidRequest> {
        let Some(requested) = requested.filter(|requested| !requested.is_empty()) else {
            return Ok(self.columns.iter().map(Self::project).collect());
        };

        requested
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.find(name)
                    .map(Self::project)
                    .ok_or_else(|| InvalidRequest::UnknownColumn(name.to_string()))
            })
            .collect()
    }

    /// Validates write values and renames them to storage columns.
    pub fn to_storage_values(&self, values: &ContentValues) -> Result<ContentValues, InvalidRequest> {
        let mut storage = ContentValues::new();
        for (name, value) in values.iter() {
            let column = self
                .find(name)
                .ok_or_else(|| InvalidRequest::UnknownColumn(name.to_string()))?;
            if !column.writable {
                return Err(InvalidRequest::ReadOnlyField(name.to_string()));
            }
            if !column.kind.accepts(value) {
                return Err(InvalidRequest::TypeMismatch {
                    column: name.to_string(),
                    expected: column.kind.describe(),
                });
            }
            storage.put(column.storage.clone(), value.clone());
        }
        Ok(storage)
    }

    fn find(&self, public: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|column| column.public == public)
    }

    fn project(column: &ColumnMapping) -> ProjectedColumn {
        ProjectedColumn {
            storage: column.storage.clone(),
            alias: column.public.clone(),
        }
    }
}
