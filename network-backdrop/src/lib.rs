//! Procedural network backdrop: a decorative point cloud joined by proximity
//! edges, slowly rotating behind the dashboard.

pub mod engine;
pub mod rpc;

pub use engine::config::BackdropConfig;
pub use engine::core::app_setup::{BackdropPlugin, create_app};
pub use engine::error::{ConfigurationError, EngineError};
pub use engine::lifecycle::BackdropEngine;
