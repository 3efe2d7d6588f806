//! Camera control and cursor helpers.
//!
//! Provides look handling via `camera_look` and cursor grabbing via
//! `cursor_grab`. `camera_look` consumes the look delta gathered into the
//! frame's `InputSnapshot` and applies yaw/pitch to the player's transform.
//! `cursor_grab` toggles cursor lock/visibility in response to input.

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::input::InputSnapshot;
use crate::player::Player;
use crate::ui::MenuState;

// Centralized camera tuning constants — change these to adjust behavior used
// by both the live system and benchmarks.
const CAMERA_MAX_PITCH_DEG: f32 = 85.0;

/// Stores the player's look orientation (yaw and pitch) in radians.
///
/// - `yaw`: horizontal rotation around the Y axis.
/// - `pitch`: vertical rotation around the X axis and clamped to a safe range.
#[derive(Component, Default)]
pub struct PlayerLook {
    /// Horizontal angle (radians).
    pub yaw: f32,
    /// Vertical angle (radians).
    pub pitch: f32,
}

impl PlayerLook {
    /// Apply a raw look delta to this `PlayerLook` (updates yaw/pitch and clamps pitch).
    ///
    /// Public so benchmarks/systems can call the same logic.
    pub fn apply_delta(
        &mut self,
        delta: Vec2,
        settings: &crate::settings::Settings,
    ) {
        let max_pitch = CAMERA_MAX_PITCH_DEG.to_radians();
        let min_pitch = -max_pitch;

        self.yaw -= delta.x * (settings.controls.mouse_sensitivity / 10000.0);
        self.pitch -= delta.y * (settings.controls.mouse_sensitivity / 10000.0);
        self.pitch = self.pitch.clamp(min_pitch, max_pitch);
    }
}

/// Apply the gathered look delta to players with a `PlayerLook` component.
///
/// Device gating already happened while the snapshot was gathered, so a
/// non-zero delta here is always meant to turn the camera.
///
/// # Arguments
/// * `snapshot` - this frame's gathered input
/// * `query` - query for `(Transform, PlayerLook)` to update
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    snapshot: Res<InputSnapshot>,
    mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>,
    settings: Res<crate::settings::Settings>,
) {
    let delta = snapshot.look_delta;
    if delta == Vec2::ZERO {
        return;
    }

    for (mut transform, mut look) in &mut query {
        // update using shared helper (keeps system and benchmarks consistent)
        look.apply_delta(delta, &settings);

        // apply rotation: yaw around Y, pitch around X
        transform.rotation = Quat::from_euler(bevy::math::EulerRot::YXZ, look.yaw, look.pitch, 0.0);
    }
}

/// Toggle cursor grab and visibility.
///
/// A left-click locks the cursor for mouse look unless the destinations menu
/// is open, which needs the pointer. Escape releases the lock.
///
/// # Arguments
/// * `wq` - mutable window query to change cursor state
/// * `mb` - mouse button input to detect left-click for grabbing
/// * `kb` - keyboard input to detect Escape to release cursor
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut wq: Query<&mut Window, With<PrimaryWindow>>,
    mb: Res<ButtonInput<MouseButton>>,
    kb: Res<ButtonInput<KeyCode>>,
    menu: Res<MenuState>,
    settings: Res<crate::settings::Settings>,
) {
    let Ok(mut w) = wq.get_single_mut() else { return };
    if mb.just_pressed(MouseButton::Left) && !menu.open {
        w.cursor.grab_mode = CursorGrabMode::Locked;
        w.cursor.visible = false;
    }

    let pause_kc = settings
        .controls
        .keybinds
        .get("pause")
        .and_then(|s| crate::settings::Settings::keycode_from_str(s))
        .unwrap_or(KeyCode::Escape);

    if kb.just_pressed(pause_kc) {
        w.cursor.grab_mode = CursorGrabMode::None;
        w.cursor.visible = true;
    }
}
