use bevy::prelude::*;
use bevy::window::{ExitCondition, PresentMode, WindowResolution};

use crate::engine::scene::surface::SurfaceElement;

/// Window plugin settings. Surfaces are spawned by the engine, so there is no
/// primary window and the app must not exit while none is open.
pub fn create_window_config() -> WindowPlugin {
    WindowPlugin {
        primary_window: None,
        exit_condition: ExitCondition::DontExit,
        ..default()
    }
}

/// Window backing one rendering surface, sized to the viewport with the
/// device pixel ratio applied.
pub fn surface_window(surface: &SurfaceElement) -> Window {
    let viewport = surface.viewport;
    let resolution = WindowResolution::new(viewport.width as f32, viewport.height as f32)
        .with_scale_factor_override(viewport.scale_factor);

    #[cfg(target_arch = "wasm32")]
    {
        Window {
            title: "Network Backdrop".into(),
            resolution,
            canvas: Some(surface.selector()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Network Backdrop".into(),
            resolution,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
