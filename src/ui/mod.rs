//! User interface helpers: HUD, debug overlay and utilities.
//!
//! This module implements the loading/error banner, a simple debug overlay,
//! an optional collision-bounds renderer and the crosshair. The overlay
//! periodically displays FPS, player state and guidance information. The
//! destinations menu lives in `menu`.

pub mod menu;

use bevy::diagnostic::{Diagnostic, DiagnosticsStore};
use bevy::prelude::*;

use crate::nav::{GuidanceState, TargetRegistry};
use crate::player::Player;
use crate::player::ground::CollisionMesh;
use crate::scene::{LoadPhase, ModelStatus};
use crate::settings::Settings;

pub use menu::*;

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    /// Whether the overlay is currently visible.
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Resource, Default)]
pub struct CollisionBoundsVisible(pub bool);

/// Insert debug overlay resources into the `Commands` world.
///
/// # Arguments
/// * `commands` - `Commands` to insert resources (timer, state, bounds visibility)
pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(
        0.5,
        TimerMode::Repeating,
    )));
    commands.insert_resource(DebugOverlayState::default());
    commands.insert_resource(CollisionBoundsVisible::default());
}

/// Toggle the debug overlay visibility when the bound key is pressed.
///
/// # Arguments
/// * `state` - mutable `DebugOverlayState` resource
/// * `input` - keyboard input resource
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    if input.just_pressed(settings.controls.key("toggle_debug", KeyCode::F1)) {
        state.visible = !state.visible;
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn toggle_collision_bounds(
    mut bounds: ResMut<CollisionBoundsVisible>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    if input.just_pressed(settings.controls.key("toggle_bounds", KeyCode::F2)) {
        bounds.0 = !bounds.0;
    }
}

/// Everything the overlay refresh reads, grouped so the system stays at a
/// single parameter.
#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub world: Option<Res<'w, CollisionMesh>>,
    pub registry: Option<Res<'w, TargetRegistry>>,
    pub guidance: Res<'w, GuidanceState>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub query: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub player_query:
        Query<'w, 's, (&'static GlobalTransform, &'static Transform, &'static Player)>,
}

/// Constantly update the debug overlay text with debug information.
/// The overlay updates at a fixed interval to avoid the overhead
/// of querying diagnostics and world state every frame.
///
/// # Arguments
/// * `ctx` - system parameters grouped into a context struct for cleaner function signature
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }

    let Ok(mut text) = ctx.query.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&bevy::diagnostic::FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let frame_time = ctx
        .diagnostics
        .get(&bevy::diagnostic::FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let (surfaces, triangles) = ctx
        .world
        .as_ref()
        .map_or((0, 0), |w| (w.surfaces.len(), w.triangle_count()));

    // Get player position, direction and grounding
    let (pos_str, state_str) =
        if let Ok((global_transform, transform, player)) = ctx.player_query.get_single() {
            let pos = global_transform.translation();

            // Calculate compass direction from player's forward vector
            let forward = transform.forward();
            let angle = forward.x.atan2(forward.z).to_degrees();

            // Convert angle to compass direction
            let compass = if (-22.5..22.5).contains(&angle) {
                "E →"
            } else if (22.5..67.5).contains(&angle) {
                "SE ↘"
            } else if (67.5..112.5).contains(&angle) {
                "S ↓"
            } else if (112.5..157.5).contains(&angle) {
                "SW ↙"
            } else if !(-157.5..157.5).contains(&angle) {
                "W ←"
            } else if (-157.5..-112.5).contains(&angle) {
                "NW ↖"
            } else if (-112.5..-67.5).contains(&angle) {
                "N ↑"
            } else {
                "NE ↗"
            };

            let stance = if player.grounded { "grounded" } else { "airborne" };
            (
                format!("Pos: ({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z),
                format!(
                    "Direction: {compass} | {stance} | vy {:.2}",
                    player.vertical_velocity
                ),
            )
        } else {
            ("Pos: N/A".to_string(), "Direction: N/A".to_string())
        };

    let target_str = match ctx.registry.as_ref().and_then(|r| r.selected_target()) {
        Some(target) => format!(
            "Target: {} | {:.1} m | {:?}",
            target.label, ctx.guidance.distance, ctx.guidance.tier
        ),
        None => "Target: none".to_string(),
    };

    text.sections[0].value = format!(
        "FPS: {:.1}\nFrame Time: {:.2} ms\nSurfaces: {}\nTriangles: {}\n{}\n{}\n{}",
        fps,
        frame_time * 1000.0,
        surfaces,
        triangles,
        pos_str,
        state_str,
        target_str
    );
}

#[derive(Component)]
pub struct DebugOverlayText;

/// Spawn the (initially empty) debug overlay text element.
///
/// # Arguments
/// * `commands` - `Commands` for spawning the overlay UI element
/// * `asset_server` - asset server for loading the overlay font
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_debug_overlay(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_handle: Handle<Font> = asset_server.load("fonts/OpenSans.ttf");

    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font: font_handle,
                    font_size: 18.0,
                    color: Color::srgb(1.0, 1.0, 0.0),
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));
}

/// Render the collision surface bounds as wireframe boxes for debugging.
///
/// # Arguments
/// * `bounds` - `CollisionBoundsVisible` resource controlling whether boxes are shown
/// * `gizmos` - gizmo drawing context
/// * `world` - baked collision providing the surface bounds
#[allow(clippy::needless_pass_by_value)]
pub fn render_collision_bounds(
    bounds: Res<CollisionBoundsVisible>,
    mut gizmos: Gizmos,
    world: Option<Res<CollisionMesh>>,
) {
    if !bounds.0 {
        return;
    }
    let Some(world) = world else { return };

    const MAX_RENDER_SURFACES: usize = 512; // safety cap
    let green = Color::srgb(0.0, 1.0, 0.0);

    for surface in world.surfaces.iter().take(MAX_RENDER_SURFACES) {
        let (min, max) = surface.bounds();
        let center = (min + max) * 0.5;
        let size = (max - min).max(Vec3::splat(0.01));
        gizmos.cuboid(
            Transform::from_translation(center).with_scale(size),
            green,
        );
    }
}

/// Marks the centered loading/error banner text.
#[derive(Component)]
pub struct ModelStatusText;

/// Spawn the centered banner that reports model loading and failures.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_status_banner(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_handle: Handle<Font> = asset_server.load("fonts/OpenSans.ttf");

    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                top: Val::Px(140.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|p| {
            p.spawn((
                TextBundle {
                    text: Text::from_section(
                        "",
                        TextStyle {
                            font: font_handle,
                            font_size: 26.0,
                            color: Color::srgb(0.95, 0.95, 0.95),
                        },
                    ),
                    ..default()
                },
                ModelStatusText,
            ));
        });
}

/// Keep the banner in step with the model's load state.
#[allow(clippy::needless_pass_by_value)]
pub fn update_status_banner(
    status: Res<ModelStatus>,
    settings: Res<Settings>,
    mut query: Query<&mut Text, With<ModelStatusText>>,
) {
    if !status.is_changed() {
        return;
    }
    let Ok(mut text) = query.get_single_mut() else { return };

    let name = &settings.scene.model_name;
    text.sections[0].value = match status.phase {
        LoadPhase::Loading => format!("Loading {name}..."),
        LoadPhase::Ready => String::new(),
        LoadPhase::Failed => {
            let err = status.error.as_deref().unwrap_or("unknown error");
            let retry = settings
                .controls
                .keybinds
                .get("retry_load")
                .cloned()
                .unwrap_or_else(|| "R".to_string());
            format!("Could not load {name}: {err}\nPress {retry} to retry")
        }
    };
}

/// Spawn the static controls hint in the lower-left corner.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_controls_hint(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_handle: Handle<Font> = asset_server.load("fonts/OpenSans.ttf");

    commands.spawn(TextBundle {
        text: Text::from_section(
            "WASD move | Shift sprint | Space jump | E open door\nF destinations | B clear target | click to look",
            TextStyle {
                font: font_handle,
                font_size: 15.0,
                color: Color::srgba(1.0, 1.0, 1.0, 0.55),
            },
        ),
        style: Style {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            bottom: Val::Px(10.0),
            ..default()
        },
        ..default()
    });
}

/// Spawn a crosshair UI element centered on the screen.
///
/// # Arguments
/// * `commands` - mutable `Commands` used to spawn UI nodes
pub fn spawn_crosshair(commands: &mut Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|p| {
            p.spawn(NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Px(20.0),
                    height: Val::Px(2.0),
                    ..default()
                },
                background_color: Color::WHITE.into(),
                ..default()
            });
            p.spawn(NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Px(2.0),
                    height: Val::Px(20.0),
                    ..default()
                },
                background_color: Color::WHITE.into(),
                ..default()
            });
        });
}
