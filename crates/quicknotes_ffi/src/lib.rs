//! Flutter-facing bridge for the notes core.

pub mod api;
