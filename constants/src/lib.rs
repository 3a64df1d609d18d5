//! Shared defaults for the network backdrop.
//!
//! Values here seed `BackdropConfig::default()` in the engine crate and are
//! overridden by `backdrop.json` when one is present.

/// Colour classes and their default cumulative-probability bands.
pub mod class;

/// Point cloud extents, point count and proximity threshold.
pub mod cloud;

/// Camera, point and line render settings.
pub mod render_settings;
