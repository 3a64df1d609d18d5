use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::window::WindowRef;
use constants::render_settings::CLEAR_COLOUR;

use crate::engine::config::{CameraSettings, CloudBounds};

/// Marker for the perspective camera that renders one backdrop scene
#[derive(Component)]
pub struct BackdropCamera;

/// Perspective camera on +Z looking at the origin, rendering into `window`.
///
/// Spawned inactive; the animation scheduler switches it on and off.
pub fn backdrop_camera(window: Entity, settings: &CameraSettings) -> impl Bundle {
    (
        Camera3d::default(),
        Camera {
            target: RenderTarget::Window(WindowRef::Entity(window)),
            clear_color: ClearColorConfig::Custom(CLEAR_COLOUR),
            is_active: false,
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, settings.distance).looking_at(Vec3::ZERO, Vec3::Y),
        BackdropCamera,
    )
}

/// Whether the far plane reaches past the whole cloud from the camera position.
pub fn covers_depth(settings: &CameraSettings, bounds: &CloudBounds) -> bool {
    let reach = settings.distance + bounds.size().length() * 0.5 + bounds.center().length();
    settings.far >= reach && settings.near < settings.distance - bounds.size().z * 0.5
}
