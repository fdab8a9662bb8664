//! Change notification registry keyed by locator.

pub mod notifier;
