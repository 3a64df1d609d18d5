use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use constants::render_settings::DEFAULT_CONTAINER_ID;

use crate::engine::config::BackdropConfig;
use crate::engine::error::EngineError;
use crate::engine::lifecycle::BackdropEngine;
use crate::engine::scene::surface::{CanvasHost, NativeHost, SurfaceHost, Viewport};
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Where surfaces get mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    Native,
    Canvas { container_id: String },
}

impl HostKind {
    pub fn platform_default() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self::Canvas {
                container_id: DEFAULT_CONTAINER_ID.to_string(),
            }
        } else {
            Self::Native
        }
    }

    pub fn build(&self) -> Box<dyn SurfaceHost> {
        match self {
            Self::Native => Box::new(NativeHost::default()),
            Self::Canvas { container_id } => Box::new(CanvasHost::new(container_id.clone())),
        }
    }
}

/// Inputs for the next mount.
#[derive(Resource, Debug, Clone)]
pub struct BackdropSettings {
    pub config: BackdropConfig,
    pub host: HostKind,
}

impl Default for BackdropSettings {
    fn default() -> Self {
        Self {
            config: BackdropConfig::default(),
            host: HostKind::platform_default(),
        }
    }
}

/// Mount and unmount requests from the host page or the app itself.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropLifecycleEvent {
    Mount,
    Unmount,
}

/// The currently mounted backdrop, if any.
#[derive(Resource, Default)]
pub struct ActiveBackdrop {
    pub engine: Option<BackdropEngine>,
}

impl ActiveBackdrop {
    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }
}

/// Apply queued lifecycle requests in order. The reader state persists
/// between runs so each request is applied exactly once.
pub fn apply_lifecycle_events(
    world: &mut World,
    reader: &mut SystemState<EventReader<BackdropLifecycleEvent>>,
) {
    let requests: Vec<BackdropLifecycleEvent> = reader.get_mut(world).read().copied().collect();

    for request in requests {
        match request {
            BackdropLifecycleEvent::Mount => mount_backdrop(world),
            BackdropLifecycleEvent::Unmount => unmount_backdrop(world),
        }
    }
}

/// Mount a fresh engine unless one is already live. A missing render device
/// only skips the background.
pub fn mount_backdrop(world: &mut World) {
    if world
        .get_resource::<ActiveBackdrop>()
        .is_some_and(ActiveBackdrop::is_mounted)
    {
        warn!("Backdrop already mounted; ignoring mount request");
        return;
    }

    let settings = world
        .get_resource::<BackdropSettings>()
        .cloned()
        .unwrap_or_default();

    match BackdropEngine::mount(
        world,
        settings.host.build(),
        Viewport::current(),
        settings.config,
    ) {
        Ok(engine) => {
            notify_state(world, &engine);
            world.get_resource_or_init::<ActiveBackdrop>().engine = Some(engine);
        }
        Err(EngineError::RenderingUnavailable(reason)) => {
            warn!("Backdrop disabled, rendering unavailable: {reason}");
            if let Some(mut rpc) = world.get_resource_mut::<WebRpcInterface>() {
                rpc.send_notification(
                    "backdrop_unavailable",
                    serde_json::json!({ "reason": reason }),
                );
            }
        }
        Err(error) => {
            error!("Failed to mount backdrop: {error}");
        }
    }
}

/// Stop and dispose the active engine, if any.
pub fn unmount_backdrop(world: &mut World) {
    let Some(mut engine) = world
        .get_resource_mut::<ActiveBackdrop>()
        .and_then(|mut active| active.engine.take())
    else {
        return;
    };

    engine.dispose(world);
    notify_state(world, &engine);
}

/// Tear down on app exit so every shutdown path disposes exactly once.
pub fn dispose_on_exit(world: &mut World) {
    let exiting = world
        .get_resource::<Events<AppExit>>()
        .is_some_and(|events| !events.is_empty());
    if exiting {
        info!("App exiting, releasing backdrop");
        unmount_backdrop(world);
    }
}

/// Closing the backdrop window on desktop ends the app.
#[cfg(not(target_arch = "wasm32"))]
pub fn exit_on_surface_closed(
    mut closed: EventReader<bevy::window::WindowClosed>,
    active: Res<ActiveBackdrop>,
    mut exit: EventWriter<AppExit>,
) {
    let surface_window = active
        .engine
        .as_ref()
        .and_then(|engine| engine.scene())
        .map(|handle| handle.window);

    if closed
        .read()
        .any(|event| Some(event.window) == surface_window)
    {
        info!("Backdrop window closed");
        exit.write(AppExit::Success);
    }
}

fn notify_state(world: &mut World, engine: &BackdropEngine) {
    let status = engine.status(world);
    info!("Backdrop {:?}", status.lifecycle);
    if let Some(mut rpc) = world.get_resource_mut::<WebRpcInterface>() {
        rpc.send_notification(
            "backdrop_state",
            serde_json::to_value(&status).unwrap_or_default(),
        );
    }
}
