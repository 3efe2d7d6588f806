//! Debug utilities, including a system (F3 default) to dump diagnostics,
//! entity counts, player and navigation state to a timestamped text file in
//! './debug-dumps/'.
//!
//! This is a useful module for quickly capturing a snapshot of the viewer's
//! internal state and performance characteristics without needing to set up
//! an external profiler or attach a debugger.
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::pbr::StandardMaterial;
use bevy::prelude::*;
use bevy::render::mesh::Mesh;
use bevy::render::texture::Image;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::{Pid, ProcessExt, System, SystemExt};

use crate::nav::{GuidanceState, TargetRegistry};
use crate::player::Player;
use crate::player::ground::CollisionMesh;
use crate::scene::ModelStatus;
use crate::settings::Settings;

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

/// A internal helper function to convert kilobytes megabytes.
///
/// # Arguments
/// * `kb` - The size in kilobytes to convert to a human-readable megabyte string.
///
/// # Returns
/// A string representing the size in megabytes, formatted to two decimal places (e.g., "123.45 MB").
fn kb_to_mb(kb: u64) -> String {
    format!("{:.2} MB", (kb as f64) / 1024.0)
}

/// A Bevy system that listens for the dump key (default F3) and writes a
/// debug dump of diagnostics, entity counts, player, collision and
/// navigation state.
///
/// # Arguments
/// * `keys` - Bevy resource for keyboard input, used to detect when the dump key is pressed.
/// * `diagnostics` - Bevy resource that stores performance diagnostics like FPS and frame time.
/// * `query_entities` - A Bevy query that counts the total number of entities in the world.
/// * `meshes`, `materials`, `images` - Bevy asset resources counted in the dump.
/// * `world`, `registry`, `guidance`, `status` - viewer state included in the dump.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    diagnostics: Res<DiagnosticsStore>,
    query_entities: Query<Entity>,
    meshes: Res<Assets<Mesh>>,
    materials: Res<Assets<StandardMaterial>>,
    images: Res<Assets<Image>>,
    world: Option<Res<CollisionMesh>>,
    registry: Option<Res<TargetRegistry>>,
    guidance: Res<GuidanceState>,
    status: Res<ModelStatus>,
    player: Query<(&Transform, &Player)>,
) {
    if !keys.just_pressed(settings.controls.key("dump_debug", KeyCode::F3)) {
        return;
    }

    // timestamp & filename
    let now = SystemTime::now();
    let ts_secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let dt: DateTime<Utc> = DateTime::from(now);
    let human_ts = dt.format("%Y-%m-%d %H:%M:%S").to_string();
    let dir = "debug-dumps";
    let fname = format!("{}/debug-{}.txt", dir, ts_secs);

    // Bevy diagnostics (fps / frame_time)
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    // entity & asset counts
    let entity_count = query_entities.iter().count();
    let mesh_count = meshes.len();
    let material_count = materials.len();
    let image_count = images.len();

    // CPU / cores
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    // process / system memory (sysinfo)
    let mut sys = System::new_all();
    sys.refresh_all();
    let pid = std::process::id();
    let proc = sys.process(Pid::from(pid as usize));
    let proc_mem_kb = proc.map(|p| p.memory()).unwrap_or(0);
    let proc_virt_kb = proc.map(|p| p.virtual_memory()).unwrap_or(0);
    let total_mem_kb = sys.total_memory();
    let used_mem_kb = sys.used_memory();

    // build text
    let mut out = String::new();
    writeln!(out, "Debug dump: {}", ts_secs).ok();
    writeln!(out, "Timestamp: {} (epoch secs: {})", human_ts, ts_secs).ok();
    writeln!(out, "FPS: {:.1}, frame_time: {:.4} ms", fps, frame_time * 1000.0).ok();
    writeln!(out, "Entities: {}", entity_count).ok();
    writeln!(
        out,
        "Assets: meshes={} materials={} images={}",
        mesh_count, material_count, image_count
    )
    .ok();
    writeln!(out, "CPU cores (available): {}", cores).ok();
    writeln!(
        out,
        "Process memory: {} (virtual {})",
        kb_to_mb(proc_mem_kb),
        kb_to_mb(proc_virt_kb)
    )
    .ok();
    writeln!(
        out,
        "System memory: total={} used={}",
        kb_to_mb(total_mem_kb),
        kb_to_mb(used_mem_kb)
    )
    .ok();

    writeln!(out, "\nModel: {:?}", status.phase).ok();
    if let Some(error) = &status.error {
        writeln!(out, "Model error: {}", error).ok();
    }

    if let Ok((transform, state)) = player.get_single() {
        let pos = transform.translation;
        writeln!(
            out,
            "Player: pos=({:.2}, {:.2}, {:.2}) grounded={} vy={:.2} eye={:.2} last_safe_y={:.2}",
            pos.x,
            pos.y,
            pos.z,
            state.grounded,
            state.vertical_velocity,
            state.eye_height,
            state.last_safe_y
        )
        .ok();
    } else {
        writeln!(out, "Player: (not spawned)").ok();
    }

    match world.as_ref() {
        Some(world) => {
            writeln!(
                out,
                "Collision: {} surfaces, {} triangles",
                world.surfaces.len(),
                world.triangle_count()
            )
            .ok();
            if let Some((min, max)) = world.bounds() {
                writeln!(
                    out,
                    "Collision bounds: min=({:.1}, {:.1}, {:.1}) max=({:.1}, {:.1}, {:.1})",
                    min.x, min.y, min.z, max.x, max.y, max.z
                )
                .ok();
            }
        }
        None => {
            writeln!(out, "Collision: (not baked)").ok();
        }
    }

    match registry.as_ref() {
        Some(registry) => {
            writeln!(out, "\nDestinations ({}):", registry.len()).ok();
            for target in &registry.targets {
                let active = if registry.selected_key() == Some(target.key.as_str()) {
                    " [active]"
                } else {
                    ""
                };
                writeln!(out, "  {} ({}){}", target.label, target.key, active).ok();
            }
        }
        None => {
            writeln!(out, "\nDestinations: (not built)").ok();
        }
    }

    match guidance.target_position {
        Some(position) => {
            writeln!(
                out,
                "Guidance: bearing={:.3} rad distance={:.2} tier={:?} target=({:.1}, {:.1}, {:.1})",
                guidance.smoothed_bearing,
                guidance.distance,
                guidance.tier,
                position.x,
                position.y,
                position.z
            )
            .ok();
        }
        None => {
            writeln!(out, "Guidance: idle").ok();
        }
    }

    // ensure directory & write
    if let Err(e) = fs::create_dir_all(dir) {
        error!("debug dump: failed to create dir '{}': {}", dir, e);
        return;
    }
    if let Err(e) = fs::write(&fname, out) {
        error!("debug dump: failed to write {}: {}", fname, e);
    } else {
        info!("wrote debug dump: {}", fname);
    }
}
