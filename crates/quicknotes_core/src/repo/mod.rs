//! Table-level data access.
//!
//! # Responsibility
//! - Translate insert/select/update/delete requests into SQL over `notes`.
//! - Keep SQL text construction inside the persistence boundary.
//!
//! # Invariants
//! - Callers pass already-validated column names; identifiers are still
//!   quoted before reaching SQL.
//! - Caller selections are always parenthesized before being combined.

pub mod notes_table;
