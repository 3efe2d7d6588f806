//! Campus model loading and scene bookkeeping.
//!
//! The campus is one glTF scene. `spawn_campus_scene` kicks the load off,
//! `watch_scene_load` tracks it into ready or failed, and a failed load can
//! be retried from the keyboard. Once the scene has instanced, `collision`
//! bakes the walkable geometry off the main thread and publishes it together
//! with the destinations registry built from node names and landmarks.

pub mod collision;
pub mod doors;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

use crate::nav::{LandmarkSet, RegistryRebuild, TargetKind, TargetRegistry};
use crate::settings::Settings;

pub use collision::*;
pub use doors::*;

/// Handle and root entity of the campus model currently being shown.
#[derive(Resource)]
pub struct CampusScene {
    pub handle: Handle<Scene>,
    pub root: Entity,
}

/// Lifecycle of the campus model load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Loading,
    Ready,
    Failed,
}

/// Load state surfaced to the UI.
#[derive(Resource, Default)]
pub struct ModelStatus {
    pub phase: LoadPhase,
    pub error: Option<String>,
}

/// Start loading the campus model configured in the settings.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_campus_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<Settings>,
) {
    let path = settings.scene.model_path.clone();
    let handle: Handle<Scene> = asset_server.load(format!("{path}#Scene0"));
    let root = commands
        .spawn(SceneBundle {
            scene: handle.clone(),
            ..Default::default()
        })
        .id();
    commands.insert_resource(CampusScene { handle, root });
    println!("Loading campus model from {path}");
}

/// Track the model load into `Ready` or `Failed`.
#[allow(clippy::needless_pass_by_value)]
pub fn watch_scene_load(
    mut ready_events: EventReader<SceneInstanceReady>,
    scene: Option<Res<CampusScene>>,
    asset_server: Res<AssetServer>,
    mut status: ResMut<ModelStatus>,
) {
    let Some(scene) = scene else { return };
    if status.phase != LoadPhase::Loading {
        ready_events.clear();
        return;
    }

    for event in ready_events.read() {
        if event.parent == scene.root {
            status.phase = LoadPhase::Ready;
            status.error = None;
            info!("Campus model instanced, baking collision...");
        }
    }

    if status.phase == LoadPhase::Loading
        && let Some(LoadState::Failed(err)) = asset_server.get_load_state(&scene.handle)
    {
        status.phase = LoadPhase::Failed;
        status.error = Some(err.to_string());
        eprintln!("Failed to load campus model: {err}");
    }
}

/// Throw the failed model away and load it again when the retry key fires.
#[allow(clippy::needless_pass_by_value)]
pub fn retry_failed_load(
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut status: ResMut<ModelStatus>,
    scene: Option<Res<CampusScene>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    if status.phase != LoadPhase::Failed {
        return;
    }
    let retry = settings.controls.key("retry_load", KeyCode::KeyR);
    if !keyboard.just_pressed(retry) {
        return;
    }

    if let Some(scene) = scene.as_ref() {
        commands.entity(scene.root).despawn_recursive();
    }
    let path = settings.scene.model_path.clone();
    asset_server.reload(path.clone());
    let handle: Handle<Scene> = asset_server.load(format!("{path}#Scene0"));
    let root = commands
        .spawn(SceneBundle {
            scene: handle.clone(),
            ..Default::default()
        })
        .id();
    commands.insert_resource(CampusScene { handle, root });
    status.phase = LoadPhase::Loading;
    status.error = None;
    println!("Retrying campus model load from {path}");
}

/// Whether `entity` sits anywhere under `root` in the hierarchy.
#[must_use]
pub fn is_descendant(entity: Entity, root: Entity, parents: &Query<&Parent>) -> bool {
    let mut current = entity;
    while let Ok(parent) = parents.get(current) {
        let next = parent.get();
        if next == root {
            return true;
        }
        current = next;
    }
    false
}

/// Name of the nearest named ancestor, the entity itself included. Mesh
/// primitives usually hang off the node carrying the author's name.
#[must_use]
pub fn nearest_name(
    entity: Entity,
    names: &Query<&Name>,
    parents: &Query<&Parent>,
) -> Option<(Entity, String)> {
    let mut current = entity;
    loop {
        if let Ok(name) = names.get(current) {
            return Some((current, name.as_str().to_string()));
        }
        current = parents.get(current).ok()?.get();
    }
}

/// Build a fresh registry from landmark files and the scene's named nodes.
///
/// Landmarks go in first so they always answer to their label; model nodes
/// then claim whatever keys are left, in name order so listings are stable.
#[must_use]
pub fn collect_targets(
    root: Entity,
    named: &Query<(Entity, &Name)>,
    parents: &Query<&Parent>,
    landmarks: &LandmarkSet,
) -> TargetRegistry {
    let mut registry = TargetRegistry::default();

    for landmark in &landmarks.landmarks {
        registry.insert(
            &landmark.label,
            TargetKind::StaticPoint(Vec3::from_array(landmark.position)),
        );
    }

    let mut nodes: Vec<(Entity, &Name)> = named
        .iter()
        .filter(|(entity, _)| is_descendant(*entity, root, parents))
        .collect();
    nodes.sort_by(|a, b| a.1.as_str().cmp(b.1.as_str()));
    for (entity, name) in nodes {
        registry.insert(name.as_str(), TargetKind::MeshAnchor(entity));
    }

    registry
}

/// Rebuild the destinations registry when landmark files change. The
/// current selection survives by key where it still resolves.
#[allow(clippy::needless_pass_by_value)]
pub fn rebuild_target_registry(
    mut rebuild: ResMut<RegistryRebuild>,
    scene: Option<Res<CampusScene>>,
    registry: Option<ResMut<TargetRegistry>>,
    landmarks: Res<LandmarkSet>,
    named: Query<(Entity, &Name)>,
    parents: Query<&Parent>,
) {
    if !rebuild.0 {
        return;
    }
    let Some(scene) = scene else { return };
    let Some(mut registry) = registry else { return };
    rebuild.0 = false;

    let mut fresh = collect_targets(scene.root, &named, &parents, &landmarks);
    if let Some(key) = registry.selected_key() {
        fresh.select(key);
    }
    info!("Destinations rebuilt: {} entries", fresh.len());
    *registry = fresh;
}
