//! Touch controls.
//!
//! The left half of the screen is a virtual joystick anchored where the
//! finger lands; the right half is a look surface. A tap in the upper
//! quarter of the right half jumps. Which role a finger plays is decided by
//! where it started, so a look drag that crosses the midline keeps looking.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::ui::MenuState;

/// Touch contribution to this frame's input, merged into the snapshot by
/// `gather_input`.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct TouchState {
    /// Virtual joystick axes, `x` strafe and `y` forward, both in `[-1, 1]`.
    pub axes: Vec2,
    /// Look drag since the last frame, in pixels.
    pub look_delta: Vec2,
    /// True on the frame a jump tap landed.
    pub jump: bool,
}

/// Map a joystick drag into movement axes.
///
/// The offset from the anchor is scaled by `radius` and clamped to the unit
/// disc. Screen space grows downward, so the vertical axis flips sign and
/// dragging up reads as forward.
#[must_use]
pub fn joystick_axes(anchor: Vec2, position: Vec2, radius: f32) -> Vec2 {
    if radius <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let mut offset = (position - anchor) / radius;
    if offset.length_squared() > 1.0 {
        offset = offset.normalize();
    }
    Vec2::new(offset.x, -offset.y)
}

/// Gather active touches into `TouchState`.
#[allow(clippy::needless_pass_by_value)]
pub fn touch_input(
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    menu: Res<MenuState>,
    settings: Res<crate::settings::Settings>,
    mut state: ResMut<TouchState>,
) {
    state.axes = Vec2::ZERO;
    state.look_delta = Vec2::ZERO;
    state.jump = false;

    if menu.open {
        return;
    }
    let Ok(window) = windows.get_single() else { return };
    let half_width = window.width() * 0.5;

    for touch in touches.iter() {
        if touch.start_position().x < half_width {
            state.axes = joystick_axes(
                touch.start_position(),
                touch.position(),
                settings.controls.joystick_radius,
            );
        } else {
            state.look_delta += touch.delta();
        }
    }

    for touch in touches.iter_just_pressed() {
        if touch.start_position().x >= half_width
            && touch.start_position().y < window.height() * 0.25
        {
            state.jump = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_finger_produces_no_axes() {
        let anchor = Vec2::new(100.0, 300.0);
        let axes = joystick_axes(anchor, anchor, 80.0);
        assert!(axes.length() < f32::EPSILON, "no drag, no movement");
    }

    #[test]
    fn dragging_up_walks_forward() {
        let anchor = Vec2::new(100.0, 300.0);
        let axes = joystick_axes(anchor, Vec2::new(100.0, 260.0), 80.0);
        assert!(axes.x.abs() < f32::EPSILON);
        assert!((axes.y - 0.5).abs() < 1e-6, "half-radius drag gives half speed");
    }

    #[test]
    fn drags_past_the_radius_clamp_to_full_deflection() {
        let anchor = Vec2::new(100.0, 300.0);
        let axes = joystick_axes(anchor, Vec2::new(420.0, 300.0), 80.0);
        assert!((axes - Vec2::new(1.0, 0.0)).length() < 1e-6);

        let diagonal = joystick_axes(anchor, Vec2::new(400.0, 600.0), 80.0);
        assert!(diagonal.length() <= 1.0 + 1e-6, "deflection stays on the unit disc");
    }

    #[test]
    fn degenerate_radius_is_ignored() {
        let anchor = Vec2::new(100.0, 300.0);
        let axes = joystick_axes(anchor, Vec2::new(150.0, 300.0), 0.0);
        assert_eq!(axes, Vec2::ZERO);
    }
}
