//! Asset loading for the backdrop configuration.
//!
//! Resolves `backdrop.json` before the first mount, falling back to the
//! built-in defaults when the file cannot be loaded.

/// Backdrop config loading and the transition into the running state.
pub mod config_loader;
