use thiserror::Error;

use crate::engine::animation::SchedulerState;

/// Top-level error type for the backdrop engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No accelerated rendering context. Callers treat this as "no background".
    #[error("rendering unavailable: {0}")]
    RenderingUnavailable(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("scheduler cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: SchedulerState,
        to: SchedulerState,
    },

    #[error("engine instance already disposed")]
    Disposed,
}

/// Rejected configuration, raised before any surface is acquired.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("point count must be non-negative, got {0}")]
    NegativePointCount(i64),

    #[error("proximity threshold must be a finite non-negative distance, got {0}")]
    InvalidThreshold(f32),

    #[error("{axis} bounds are invalid: min {min} > max {max} or not finite")]
    InvalidBounds { axis: &'static str, min: f32, max: f32 },

    #[error("at least one colour band is required")]
    EmptyColourBands,

    #[error("colour band {index} threshold {above} is outside [0, 1)")]
    BandOutOfRange { index: usize, above: f32 },

    #[error("colour band thresholds must be strictly descending (band {index})")]
    BandsNotDescending { index: usize },

    #[error("last colour band must have threshold 0 to cover the rest of [0, 1)")]
    MissingCatchAll,

    #[error("{axis} rotation step must be a finite positive angle, got {step}")]
    InvalidRotationStep { axis: &'static str, step: f32 },

    #[error("point size must be positive, got {0}")]
    InvalidPointSize(f32),

    #[error("line opacity must be within [0, 1], got {0}")]
    InvalidLineOpacity(f32),

    #[error("camera settings are invalid: {0}")]
    InvalidCamera(String),
}
