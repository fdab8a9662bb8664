//! Note use-case services.
//!
//! # Responsibility
//! - Turn provider calls into the add/list/edit/remove flows UI shells need.
//! - Keep CLI/FFI layers free of locator and selection plumbing.

pub mod note_service;
