//! Provider configuration.
//!
//! Built once by the embedding shell and passed by value into
//! `NotesProvider`; nothing here is process-global.

use crate::provider::locator::Locator;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEME: &str = "content";
pub const DEFAULT_AUTHORITY: &str = "org.quicknotes.provider";
pub const DEFAULT_DATABASE_NAME: &str = "quicknotes.db";
/// Path segment of the notes collection.
pub const NOTES_PATH: &str = "notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Locator scheme accepted by the route table.
    pub scheme: String,
    /// Locator authority owning the notes collection.
    pub authority: String,
    /// Database file name, resolved inside the caller's data directory.
    pub database_name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyScheme,
    EmptyAuthority,
    InvalidAuthority(String),
    EmptyDatabaseName,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyScheme => write!(f, "scheme cannot be empty"),
            Self::EmptyAuthority => write!(f, "authority cannot be empty"),
            Self::InvalidAuthority(value) => {
                write!(f, "authority `{value}` must not contain `/`, `?`, `#` or spaces")
            }
            Self::EmptyDatabaseName => write!(f, "database_name cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheme.trim().is_empty() {
            return Err(ConfigError::EmptyScheme);
        }
        if self.authority.trim().is_empty() {
            return Err(ConfigError::EmptyAuthority);
        }
        if self
            .authority
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '/' | '?' | '#'))
        {
            return Err(ConfigError::InvalidAuthority(self.authority.clone()));
        }
        if self.database_name.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseName);
        }
        Ok(())
    }

    /// Locator of the notes collection under this authority.
    pub fn collection_locator(&self) -> Locator {
        Locator::new(
            self.scheme.as_str(),
            self.authority.as_str(),
            [NOTES_PATH],
        )
    }

    /// Database file path inside `data_dir`.
    pub fn database_path(&self, data_dir: impl AsRef<Path>) -> PathBuf {
        data_dir.as_ref().join(&self.database_name)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ProviderConfig};

    #[test]
    fn default_config_is_valid() {
        let config = ProviderConfig::default();
        config.validate().unwrap();
        assert_eq!(
            config.collection_locator().to_string(),
            "content://org.quicknotes.provider/notes"
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"authority":"com.example.notes"}"#).unwrap();
        assert_eq!(config.authority, "com.example.notes");
        assert_eq!(config.scheme, "content");
        assert_eq!(config.database_name, "quicknotes.db");
    }

    #[test]
    fn authority_with_path_separator_is_rejected() {
        let config = ProviderConfig {
            authority: "a/b".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::InvalidAuthority("a/b".to_string())
        );
    }
}
