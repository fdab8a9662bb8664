//! Resource locator.
//!
//! Format: `<scheme>://<authority>/<segment>/<segment>...`
//!
//! Examples:
//! - `content://org.quicknotes.provider/notes`
//! - `content://org.quicknotes.provider/notes/42`

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Structured address of a logical resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    scheme: String,
    authority: String,
    segments: Vec<String>,
}

/// Locator text that does not follow `scheme://authority/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorParseError {
    pub input: String,
    pub reason: &'static str,
}

impl Display for LocatorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "malformed locator `{}`: {}", self.input, self.reason)
    }
}

impl Error for LocatorParseError {}

impl Locator {
    pub fn new<I, S>(scheme: impl Into<String>, authority: impl Into<String>, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the textual form. Empty path segments are ignored, so
    /// `content://a/notes/` and `content://a/notes` are the same locator.
    pub fn parse(raw: &str) -> Result<Self, LocatorParseError> {
        let fail = |reason| LocatorParseError {
            input: raw.to_string(),
            reason,
        };
        let trimmed = raw.trim();
        if trimmed.chars().any(char::is_whitespace) {
            return Err(fail("whitespace is not allowed"));
        }
        if trimmed.contains(['?', '#']) {
            return Err(fail("query and fragment parts are not supported"));
        }

        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| fail("missing `://` separator"))?;
        if scheme.is_empty() {
            return Err(fail("scheme is empty"));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        if authority.is_empty() {
            return Err(fail("authority is empty"));
        }

        Ok(Self::new(
            scheme,
            authority,
            path.split('/').filter(|segment| !segment.is_empty()),
        ))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns a child locator addressing one row below this one.
    pub fn with_appended_id(&self, id: NoteId) -> Locator {
        let mut child = self.clone();
        child.segments.push(id.to_string());
        child
    }

    /// Parses the last path segment as a row id.
    pub fn parse_id(&self) -> Option<NoteId> {
        self.segments.last()?.parse().ok()
    }

    /// True when `other` lies strictly below `self`.
    pub fn is_ancestor_of(&self, other: &Locator) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && self.segments.len() < other.segments.len()
            && other.segments.starts_with(&self.segments)
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Locator {
    type Err = LocatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Locator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Locator;

    #[test]
    fn parse_and_display_roundtrip() {
        let locator = Locator::parse("content://org.quicknotes.provider/notes/12").unwrap();
        assert_eq!(locator.scheme(), "content");
        assert_eq!(locator.authority(), "org.quicknotes.provider");
        assert_eq!(locator.segments(), ["notes", "12"]);
        assert_eq!(
            locator.to_string(),
            "content://org.quicknotes.provider/notes/12"
        );
        assert_eq!(locator.parse_id(), Some(12));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(
            Locator::parse("content://a/notes/").unwrap(),
            Locator::parse("content://a/notes").unwrap()
        );
    }

    #[test]
    fn parse_rejects_missing_parts() {
        for raw in ["notes", "://a/notes", "content:///notes", "content://a/no tes"] {
            assert!(Locator::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn appended_id_is_descendant() {
        let collection = Locator::parse("content://a/notes").unwrap();
        let item = collection.with_appended_id(5);
        assert_eq!(item.to_string(), "content://a/notes/5");
        assert!(collection.is_ancestor_of(&item));
        assert!(!item.is_ancestor_of(&collection));
        assert!(!collection.is_ancestor_of(&collection));
    }

    #[test]
    fn serde_uses_string_form() {
        let locator = Locator::parse("content://a/notes").unwrap();
        let json = serde_json::to_string(&locator).unwrap();
        assert_eq!(json, "\"content://a/notes\"");
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locator);
    }
}
