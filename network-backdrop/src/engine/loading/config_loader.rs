use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::config::BackdropConfig;
use crate::engine::core::app_state::{AppState, BackdropLifecycleEvent, BackdropSettings};

pub const CONFIG_PATH: &str = "backdrop.json";

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<BackdropConfig>>,
}

// Start the loading process
pub fn start_loading(mut config_loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    config_loader.handle = Some(asset_server.load(CONFIG_PATH));
}

// Adopt the loaded config, or the defaults if loading failed, then mount
pub fn resolve_config(
    config_loader: Res<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<BackdropConfig>>,
    mut settings: ResMut<BackdropSettings>,
    mut lifecycle: EventWriter<BackdropLifecycleEvent>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(ref handle) = config_loader.handle else {
        return;
    };

    if let Some(config) = configs.get(handle) {
        info!("Backdrop config loaded from {CONFIG_PATH}");
        settings.config = config.clone();
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle) {
        warn!("Failed to load {CONFIG_PATH}, using defaults: {error}");
        settings.config = BackdropConfig::default();
    } else {
        return;
    }

    lifecycle.write(BackdropLifecycleEvent::Mount);
    next_state.set(AppState::Running);
}
