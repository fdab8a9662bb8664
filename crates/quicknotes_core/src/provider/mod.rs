//! Note access layer.
//!
//! # Responsibility
//! - Expose locator-addressed insert/query/update/delete/get_type.
//! - Keep routing and projection tables as immutable per-provider state.
//! - Emit change notifications after successful mutations.
//!
//! # Invariants
//! - Unknown locators fail with `InvalidRequest` and never touch storage.
//! - Only registered columns are ever readable or writable.

pub mod cursor;
pub mod error;
pub mod locator;
pub mod matcher;
pub mod notes_provider;
pub mod projection;
