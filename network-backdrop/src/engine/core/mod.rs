//! Core application setup and state management.
//!
//! Handles plugin registration, window configuration, the loading-to-running
//! transition and the mount/unmount lifecycle of the active backdrop.

/// Application and plugin setup for native and WASM targets.
pub mod app_setup;

/// Application state, the active backdrop resource and lifecycle systems.
pub mod app_state;

/// Platform-specific window configuration.
///
/// Configures canvas binding for web targets and vsync presentation.
pub mod window_config;
