use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_atmosphere::prelude::*;

use atrium::debug::DebugDumpPlugin;
use atrium::input::{InputSnapshot, TouchState, gather_input, touch_input};
use atrium::nav::loader as landmark_loader;
use atrium::nav::{
    GuidanceState, RegistryRebuild, animate_guidance_cues, spawn_guidance_cues, update_guidance,
};
use atrium::player::{camera_look, cursor_grab, player_update};
use atrium::scene::{
    ModelStatus, finish_collision_bake, interact_with_doors, rebuild_target_registry,
    retry_failed_load, spawn_campus_scene, start_collision_bake, watch_scene_load,
};
use atrium::settings::loader as settings_loader;
use atrium::ui::{
    MenuState, clear_target_selection, navigate_destinations_menu, render_collision_bounds,
    setup_debug_overlay, spawn_controls_hint, spawn_debug_overlay, spawn_destinations_menu,
    spawn_status_banner, toggle_collision_bounds, toggle_debug_overlay, toggle_destinations_menu,
    update_debug_overlay, update_destinations_menu, update_status_banner,
};

mod app;
use app::{setup, sync_atmosphere_settings, sync_vsync_settings, update_player_fill_light};

#[derive(Component)]
struct Sun;

#[derive(Component)]
struct Skylight;

#[derive(Component)]
struct PlayerFillLight;

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());
    let landmarks = landmark_loader::load_landmarks_from_dir(landmark_loader::LANDMARKS_DIR);
    let landmark_watcher = landmark_loader::setup_landmark_watcher(landmark_loader::LANDMARKS_DIR)
        .unwrap_or_else(|_| landmark_loader::LandmarkWatcher::stub());

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: format!("Atrium - {}", settings.scene.model_name),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoNoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(DebugDumpPlugin);

    if settings.atmosphere.enabled {
        app.add_plugins(AtmospherePlugin)
            .insert_resource(AtmosphereModel::default())
            .insert_resource(AtmosphereSettings {
                resolution: settings.atmosphere.resolution,
                dithering: settings.atmosphere.dithering,
                ..Default::default()
            });
    }

    app.insert_resource(InputSnapshot::default());
    app.insert_resource(TouchState::default());
    app.insert_resource(MenuState::default());
    app.insert_resource(ModelStatus::default());
    app.insert_resource(GuidanceState::default());
    app.insert_resource(RegistryRebuild::default());
    app.insert_resource(landmarks);
    app.insert_resource(landmark_watcher);

    app.insert_resource(settings.clone());
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, setup_debug_overlay);
    app.add_systems(Startup, spawn_debug_overlay);
    app.add_systems(Startup, setup);
    app.add_systems(Startup, spawn_campus_scene);
    app.add_systems(Startup, spawn_guidance_cues);
    app.add_systems(Startup, spawn_status_banner);
    app.add_systems(Startup, spawn_destinations_menu);
    app.add_systems(Startup, spawn_controls_hint);

    // One frame of play: menu first so it can swallow input, then the input
    // snapshot, then everything that consumes it.
    app.add_systems(
        Update,
        (
            toggle_destinations_menu,
            navigate_destinations_menu,
            touch_input,
            gather_input,
            camera_look,
            player_update,
            interact_with_doors,
            update_guidance,
            animate_guidance_cues,
        )
            .chain(),
    );

    app.add_systems(Update, cursor_grab);
    app.add_systems(Update, clear_target_selection);

    app.add_systems(Update, watch_scene_load);
    app.add_systems(Update, retry_failed_load);
    app.add_systems(Update, start_collision_bake);
    app.add_systems(Update, finish_collision_bake);
    app.add_systems(Update, rebuild_target_registry);

    app.add_systems(Update, update_status_banner);
    app.add_systems(Update, update_destinations_menu);
    app.add_systems(Update, toggle_debug_overlay);
    app.add_systems(Update, toggle_collision_bounds);
    app.add_systems(Update, update_debug_overlay);
    app.add_systems(Update, render_collision_bounds);

    if settings.atmosphere.enabled {
        app.add_systems(Update, sync_atmosphere_settings);
    }
    app.add_systems(Update, sync_vsync_settings);

    app.add_systems(Update, settings_loader::check_settings_changes);
    app.add_systems(Update, landmark_loader::check_landmark_changes);
    app.add_systems(Update, update_player_fill_light);

    app.run();
}
