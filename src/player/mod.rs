//! Player components and systems (camera, movement, grounding).
//!
//! The module provides the `Player` component and convenience re-exports for
//! the player-related systems.
pub mod camera;
pub mod controller;
pub mod ground;

use bevy::prelude::*;

pub use camera::*;
pub use controller::*;
pub use ground::*;

/// Component tracking player state used by the movement systems.
#[derive(Component)]
pub struct Player {
    /// Current vertical velocity in world units per second.
    pub vertical_velocity: f32,
    /// Whether the player is currently standing on a surface.
    pub grounded: bool,
    /// Camera height above the feet, eased between standing and crouching.
    pub eye_height: f32,
    /// Camera height of the most recent frame that had a floor under it.
    /// Used as the fallback when the probe leaves the model.
    pub last_safe_y: f32,
}

impl Player {
    /// A player standing still at the given eye height.
    #[must_use]
    pub fn standing(eye_height: f32) -> Self {
        Player {
            vertical_velocity: 0.0,
            grounded: true,
            eye_height,
            last_safe_y: eye_height,
        }
    }
}
