//! Provider error taxonomy.

use crate::config::ConfigError;
use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Request rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidRequest {
    /// Locator text could not be parsed.
    MalformedLocator(String),
    /// Locator matches no registered route.
    UnknownLocator(String),
    /// Route exists but does not accept this operation.
    UnsupportedOperation {
        operation: &'static str,
        locator: String,
    },
    /// Column is not registered in the projection map.
    UnknownColumn(String),
    /// Required field missing from the request values.
    MissingField(&'static str),
    /// Field is store-managed and cannot be written.
    ReadOnlyField(String),
    /// Value does not fit the column type.
    TypeMismatch {
        column: String,
        expected: &'static str,
    },
    /// Update carried no values.
    EmptyValues,
}

impl Display for InvalidRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLocator(details) => write!(f, "{details}"),
            Self::UnknownLocator(locator) => write!(f, "unknown locator: {locator}"),
            Self::UnsupportedOperation { operation, locator } => {
                write!(f, "{operation} is not supported on {locator}")
            }
            Self::UnknownColumn(column) => write!(f, "unknown column: `{column}`"),
            Self::MissingField(column) => write!(f, "missing required field: `{column}`"),
            Self::ReadOnlyField(column) => write!(f, "field is read-only: `{column}`"),
            Self::TypeMismatch { column, expected } => {
                write!(f, "field `{column}` expects {expected}")
            }
            Self::EmptyValues => write!(f, "no values to write"),
        }
    }
}

impl Error for InvalidRequest {}

/// Error returned by every provider operation.
#[derive(Debug)]
pub enum ProviderError {
    /// Caller error; never retried.
    InvalidRequest(InvalidRequest),
    /// Storage engine failure, propagated unmodified.
    Storage(DbError),
    /// Provider configuration rejected at construction.
    Config(ConfigError),
    /// Stored row does not map to a note (written outside the provider).
    MalformedRow { id: Option<i64> },
}

impl ProviderError {
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Stable short code for log lines and UI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Storage(_) => "storage_failure",
            Self::Config(_) => "invalid_config",
            Self::MalformedRow { .. } => "malformed_row",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(err) => write!(f, "invalid request: {err}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
            Self::Config(err) => write!(f, "invalid provider config: {err}"),
            Self::MalformedRow { id: Some(id) } => write!(f, "stored note {id} is malformed"),
            Self::MalformedRow { id: None } => write!(f, "stored note row has no id"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRequest(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::MalformedRow { .. } => None,
        }
    }
}

impl From<InvalidRequest> for ProviderError {
    fn from(value: InvalidRequest) -> Self {
        Self::InvalidRequest(value)
    }
}

impl From<DbError> for ProviderError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for ProviderError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

impl From<ConfigError> for ProviderError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
