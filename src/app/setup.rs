//! Setup systems for initializing the scene the viewer walks through.
//!
//! This module spawns the fixed lighting rig, the player camera and the
//! always-on UI pieces. These systems run at `Startup`; the campus model
//! itself is loaded asynchronously by the scene systems.
use atrium::player::{Player, PlayerLook};
use atrium::settings::Settings;
use bevy::prelude::*;

/// Spawn lights, the player camera and the crosshair.
///
/// The camera starts at the configured fallback eye position. Once the campus
/// model finishes its collision bake the player is moved onto the model's
/// floor, so the fallback only matters while loading (and when loading
/// fails).
///
/// # Arguments
/// - `commands`: Commands used to spawn entities and insert resources.
/// - `settings`: Graphics and scene settings applied to the camera and lights.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(mut commands: Commands, settings: Res<Settings>) {
    let spawn = Vec3::from_array(settings.scene.spawn_fallback);

    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: 9000.0,
                shadows_enabled: settings.graphics.shadows,
                ..default()
            },
            // fixed late-morning sun angle
            transform: Transform::from_rotation(Quat::from_euler(
                EulerRot::YXZ,
                -0.9,
                -1.0,
                0.0,
            )),
            ..default()
        },
        crate::Sun,
    ));

    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                shadows_enabled: false,
                illuminance: 1200.0,
                color: Color::srgb(0.72, 0.78, 0.90),
                ..default()
            },
            transform: Transform::from_rotation(Quat::from_rotation_x(
                -std::f32::consts::FRAC_PI_2,
            )),
            ..default()
        },
        crate::Skylight,
    ));

    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(spawn),
            projection: Projection::Perspective(PerspectiveProjection {
                fov: settings.graphics.fov_degrees.to_radians(),
                ..default()
            }),
            ..default()
        },
        Player::standing(settings.movement.eye_height),
        PlayerLook::default(),
        bevy_atmosphere::prelude::AtmosphereCamera::default(),
    ));

    commands.spawn((
        PointLightBundle {
            point_light: PointLight {
                intensity: 4000.0,
                range: 60.0,
                color: Color::srgb(0.9, 0.92, 1.0),
                shadows_enabled: false,
                ..default()
            },
            transform: Transform::from_translation(spawn),
            ..default()
        },
        crate::PlayerFillLight,
    ));

    atrium::ui::spawn_crosshair(&mut commands);

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.7,
    });
}
