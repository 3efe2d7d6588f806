//! Player-related small systems.
//!
//! This module contains small per-player systems kept separate so the
//! main application file remains compact.
use bevy::prelude::*;

/// Follow the player camera with a small local fill light.
///
/// Walkthrough models often have unlit interiors; a dim point light riding
/// along with the camera keeps nearby walls readable without washing out the
/// sun. Silently no-ops while the player camera is not spawned.
///
/// # Arguments
/// - `camera_query`: Query for the player's `GlobalTransform` (camera).
/// - `lights`: Query for transforms tagged with `PlayerFillLight` to update.
#[allow(clippy::needless_pass_by_value)]
pub fn update_player_fill_light(
    camera_query: Query<&GlobalTransform, With<atrium::player::Player>>,
    mut lights: Query<&mut Transform, With<crate::PlayerFillLight>>,
) {
    if let Ok(cam) = camera_query.get_single() {
        let pos = cam.translation();
        for mut t in &mut lights.iter_mut() {
            t.translation = pos;
        }
    }
}
