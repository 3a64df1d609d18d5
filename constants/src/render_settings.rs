use bevy::color::Color;

/// Vertical field of view in degrees
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Camera sits on +Z looking at the origin
pub const CAMERA_DISTANCE: f32 = 100.0;

/// Diameter of a rendered point in logical pixels, independent of depth
pub const POINT_SIZE: f32 = 4.0;

pub const LINE_OPACITY: f32 = 0.15;
pub const LINE_COLOUR: [f32; 3] = [0.310, 0.275, 0.898];

pub const CLEAR_COLOUR: Color = Color::srgb(0.008, 0.024, 0.090);

/// DOM id prefix for canvases created by the canvas host
pub const SURFACE_ID_PREFIX: &str = "network-backdrop";

/// Default DOM container for the wasm build
pub const DEFAULT_CONTAINER_ID: &str = "backdrop";
