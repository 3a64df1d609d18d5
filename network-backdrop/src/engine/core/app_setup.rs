use bevy::asset::AssetMetaCheck;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::render::renderer::RenderDevice;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::animation::advance_backdrop_frames;
use crate::engine::config::BackdropConfig;
use crate::engine::core::app_state::{
    ActiveBackdrop, AppState, BackdropLifecycleEvent, BackdropSettings, apply_lifecycle_events,
    dispose_on_exit,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{ConfigLoader, resolve_config, start_loading};
use crate::engine::scene::billboard::PointBillboardMaterial;
use crate::engine::scene::renderer::{OrphanedScenes, release_orphaned_scenes};
use crate::engine::scene::surface::RenderSupport;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::app_state::exit_on_surface_closed;

const LOG_FILTER: &str = "wgpu=error,naga=warn,network_backdrop=info";

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(BackdropPlugin);

    app
}

/// Registers the backdrop config asset, lifecycle state and frame systems.
pub struct BackdropPlugin;

impl Plugin for BackdropPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            // Registers BackdropConfig as a loadable asset type from JSON files.
            .add_plugins(JsonAssetPlugin::<BackdropConfig>::new(&["json"]))
            .add_plugins(MaterialPlugin::<PointBillboardMaterial>::default())
            .add_plugins(WebRpcPlugin)
            .init_resource::<ConfigLoader>()
            .init_resource::<OrphanedScenes>()
            .init_resource::<BackdropSettings>()
            .init_resource::<ActiveBackdrop>()
            .add_event::<BackdropLifecycleEvent>();

        app.add_systems(Startup, start_loading)
            .add_systems(
                Update,
                resolve_config.run_if(in_state(AppState::Loading)),
            )
            .add_systems(
                Update,
                (apply_lifecycle_events, advance_backdrop_frames)
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(Last, (dispose_on_exit, release_orphaned_scenes).chain());

        #[cfg(not(target_arch = "wasm32"))]
        {
            app.add_systems(
                Update,
                exit_on_surface_closed
                    .after(apply_lifecycle_events)
                    .run_if(in_state(AppState::Running)),
            );
        }
    }

    fn finish(&self, app: &mut App) {
        let support = if app.world().contains_resource::<RenderDevice>() {
            RenderSupport::Available
        } else {
            RenderSupport::Unavailable("no render device was created".to_string())
        };
        info!("Render support: {support:?}");
        app.insert_resource(support);
    }
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = create_window_config();

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
