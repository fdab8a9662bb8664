//! Domain model for the notes collection.
//!
//! # Responsibility
//! - Define the `Note` record and the column names shared by every layer.
//! - Define the typed value containers that cross the provider boundary.
//!
//! # Invariants
//! - Every stored note is identified by a store-assigned `NoteId`.
//! - Ids are never reassigned or reused.

pub mod note;
pub mod values;
