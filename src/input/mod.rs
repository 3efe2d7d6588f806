//! Device-agnostic input gathering.
//!
//! Every frame `gather_input` folds keyboard, mouse and touch state into a
//! single `InputSnapshot` resource. Gameplay systems read the snapshot and
//! never touch device APIs, so keyboard and touch drive movement through the
//! same code path. While the destinations menu is open, or the pointer is
//! not locked on desktop, the corresponding devices contribute nothing and
//! the player stands still.

pub mod touch;

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::ui::MenuState;

pub use touch::{TouchState, joystick_axes, touch_input};

/// One frame of gathered player intent.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct InputSnapshot {
    /// Forward axis in `[-1, 1]`; positive walks toward the view direction.
    pub forward: f32,
    /// Strafe axis in `[-1, 1]`; positive strafes right.
    pub strafe: f32,
    pub sprint: bool,
    pub crouch: bool,
    /// True on the frame a jump was requested.
    pub jump: bool,
    /// True on the frame the interact key fired.
    pub interact: bool,
    /// Look delta accumulated this frame, in pixels.
    pub look_delta: Vec2,
}

/// Rebuild the `InputSnapshot` for this frame.
///
/// Keyboard and mouse only contribute while the cursor is locked; touch
/// works without a pointer lock. An open menu silences everything.
///
/// # Arguments
/// * `keyboard` - current keyboard state
/// * `motion_events` - mouse motion events for this update
/// * `windows` - primary window, used to check the pointer lock
/// * `menu` - destinations menu state; an open menu silences input
/// * `touch` - gathered touch state for this frame
/// * `settings` - keybinds and look tuning
/// * `snapshot` - the snapshot resource rebuilt in place
#[allow(clippy::needless_pass_by_value)]
pub fn gather_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    motion_events: Res<Events<MouseMotion>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    menu: Res<MenuState>,
    touch: Res<TouchState>,
    settings: Res<crate::settings::Settings>,
    mut snapshot: ResMut<InputSnapshot>,
) {
    *snapshot = InputSnapshot::default();

    if menu.open {
        return;
    }

    let cursor_locked = windows.get_single().map(|w| !w.cursor.visible).unwrap_or(false);

    if cursor_locked {
        let key = |name: &str, default: KeyCode| settings.controls.key(name, default);

        if keyboard.pressed(key("forward", KeyCode::KeyW)) {
            snapshot.forward += 1.0;
        }
        if keyboard.pressed(key("back", KeyCode::KeyS)) {
            snapshot.forward -= 1.0;
        }
        if keyboard.pressed(key("right", KeyCode::KeyD)) {
            snapshot.strafe += 1.0;
        }
        if keyboard.pressed(key("left", KeyCode::KeyA)) {
            snapshot.strafe -= 1.0;
        }
        snapshot.sprint = keyboard.pressed(key("sprint", KeyCode::ShiftLeft));
        snapshot.crouch = keyboard.pressed(key("crouch", KeyCode::ControlLeft));
        snapshot.jump = keyboard.just_pressed(key("jump", KeyCode::Space));
        snapshot.interact = keyboard.just_pressed(key("interact", KeyCode::KeyE));

        for ev in motion_events.iter_current_update_events() {
            let mut axis = ev.delta;
            if settings.controls.invert_x {
                axis.x = -axis.x;
            }
            if settings.controls.invert_y {
                axis.y = -axis.y;
            }
            snapshot.look_delta += axis;
        }
    }

    snapshot.forward += touch.axes.y;
    snapshot.strafe += touch.axes.x;
    snapshot.jump |= touch.jump;
    snapshot.look_delta += touch.look_delta * settings.controls.touch_look_sensitivity;

    snapshot.forward = snapshot.forward.clamp(-1.0, 1.0);
    snapshot.strafe = snapshot.strafe.clamp(-1.0, 1.0);
}
