//! Player movement: walking, sprinting, jumping and grounding.
//!
//! The whole simulation for one frame lives in `controller_step`, a pure
//! function over explicit state. The `player_update` system is a thin wrapper
//! so gameplay, tests and benchmarks all exercise identical logic.
//!
//! Per frame the step builds a wish direction from the input snapshot,
//! integrates vertical velocity, then resolves the candidate position against
//! the ground probe in two phases: a floor more than a step above the camera
//! refuses the horizontal push (a wall), and the final column either snaps to
//! an acceptable floor or keeps falling.

use bevy::prelude::*;

use crate::input::InputSnapshot;
use crate::player::Player;
use crate::player::ground::CollisionMesh;
use crate::settings::Settings;

/// Longest timestep a single update may integrate. Frames that hitch beyond
/// this advance the simulation by one clamped step instead of exploding the
/// displacement.
pub const MAX_TIMESTEP: f32 = 1.0 / 15.0;

/// How fast the camera slides between standing and crouched eye heights,
/// world units per second.
const EYE_HEIGHT_RATE: f32 = 6.0;

/// Movement constants resolved out of `Settings` once per frame.
#[derive(Clone, Copy, Debug)]
pub struct MovementTuning {
    pub walk_speed: f32,
    pub sprint_multiplier: f32,
    pub crouch_multiplier: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub eye_height: f32,
    pub crouch_eye_height: f32,
    pub step_height: f32,
    pub probe_length: f32,
}

impl MovementTuning {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let m = &settings.movement;
        MovementTuning {
            walk_speed: m.walk_speed,
            sprint_multiplier: m.sprint_multiplier,
            crouch_multiplier: m.crouch_multiplier,
            jump_impulse: m.jump_impulse,
            gravity: m.gravity,
            max_fall_speed: m.max_fall_speed,
            eye_height: m.eye_height,
            crouch_eye_height: m.crouch_eye_height,
            step_height: m.step_height,
            probe_length: m.probe_length,
        }
    }
}

impl Default for MovementTuning {
    fn default() -> Self {
        MovementTuning::from_settings(&Settings::defaults())
    }
}

/// Advance the player one frame.
///
/// `transform` holds the camera (eye) position and orientation; `player`
/// carries vertical velocity, grounded state, current eye height and the
/// last height that had a floor under it. Movement is integrated first and
/// the grounding probe always runs on the already-integrated candidate.
pub fn controller_step(
    transform: &mut Transform,
    player: &mut Player,
    input: &InputSnapshot,
    world: &CollisionMesh,
    tuning: &MovementTuning,
    dt: f32,
) {
    let dt = dt.min(MAX_TIMESTEP);
    let start = transform.translation;
    let start_y = start.y;
    let was_grounded = player.grounded;

    // ease the eye toward the standing or crouched height
    let target_eye = if input.crouch { tuning.crouch_eye_height } else { tuning.eye_height };
    let max_shift = EYE_HEIGHT_RATE * dt;
    player.eye_height += (target_eye - player.eye_height).clamp(-max_shift, max_shift);

    // wish direction in the horizontal plane, relative to the camera heading
    let forward_raw = transform.forward();
    let fwd = Vec3::new(forward_raw.x, 0.0, forward_raw.z).normalize_or_zero();
    let right_raw = transform.right();
    let right = Vec3::new(right_raw.x, 0.0, right_raw.z).normalize_or_zero();
    let wish = (fwd * input.forward + right * input.strafe).normalize_or_zero();

    let mut speed = tuning.walk_speed;
    if input.crouch {
        speed *= tuning.crouch_multiplier;
    } else if input.sprint {
        speed *= tuning.sprint_multiplier;
    }

    // jump only takes effect when grounded at the start of the frame
    if input.jump && was_grounded {
        player.vertical_velocity = tuning.jump_impulse;
        player.grounded = false;
    }

    if !player.grounded {
        player.vertical_velocity -= tuning.gravity * dt;
        player.vertical_velocity = player.vertical_velocity.max(-tuning.max_fall_speed);
    }

    let mut candidate = start + wish * speed * dt;
    candidate.y += player.vertical_velocity * dt;

    // phase one: does the pushed-into column hold an acceptable floor? A
    // floor more than a step above the camera is a wall; keep the old column.
    let mut hit = probe_column(world, candidate, player.eye_height, tuning.probe_length);
    if let Some(found) = hit {
        let floor_y = found.point.y + player.eye_height;
        if floor_y - start_y > tuning.step_height {
            candidate.x = start.x;
            candidate.z = start.z;
            hit = probe_column(world, candidate, player.eye_height, tuning.probe_length);
        }
    }

    // phase two: resolve the vertical against the column we ended up in
    match hit {
        Some(found) => {
            let floor_y = found.point.y + player.eye_height;
            let rise = floor_y - start_y;
            // a grounded player follows the floor down across up to two step
            // heights in one frame; an airborne one lands geometrically
            let in_band = was_grounded && start_y - floor_y <= 2.0 * tuning.step_height;

            if rise > tuning.step_height {
                // the floor under this column rose beyond a step, no landing
                player.grounded = false;
            } else if in_band || candidate.y <= floor_y {
                if player.vertical_velocity > 0.0 && candidate.y > floor_y {
                    // rising through the band, e.g. the first frames of a jump
                    player.grounded = false;
                } else {
                    candidate.y = floor_y;
                    player.vertical_velocity = 0.0;
                    player.grounded = true;
                    player.last_safe_y = floor_y;
                }
            } else {
                // floor dropped away beyond the step-down band
                player.grounded = false;
            }
        }
        None => {
            // off the model entirely: hold the last height that had a floor
            let floor_y = player.last_safe_y;
            if candidate.y <= floor_y && player.vertical_velocity <= 0.0 {
                candidate.y = floor_y;
                player.vertical_velocity = 0.0;
                player.grounded = true;
            } else {
                player.grounded = false;
            }
        }
    }

    transform.translation = candidate;
}

/// Probe straight down through the column of a candidate camera position.
/// The ray is cast from eye level, so floors under the feet are found and
/// ceilings above the head are not.
fn probe_column(
    world: &CollisionMesh,
    candidate: Vec3,
    eye_height: f32,
    probe_length: f32,
) -> Option<crate::player::ground::GroundHit> {
    let feet = candidate - Vec3::Y * eye_height;
    world.probe(feet, eye_height, probe_length)
}

/// Per-frame movement system. Skips until the collision bake has published
/// geometry, so the player stays put while a model loads or after a failure.
#[allow(clippy::needless_pass_by_value)]
pub fn player_update(
    time: Res<Time>,
    settings: Res<Settings>,
    world: Option<Res<CollisionMesh>>,
    snapshot: Res<InputSnapshot>,
    mut query: Query<(&mut Transform, &mut Player), With<Camera3d>>,
) {
    let Some(world) = world else { return };
    let Ok((mut transform, mut player)) = query.get_single_mut() else { return };

    let tuning = MovementTuning::from_settings(&settings);
    controller_step(
        &mut transform,
        &mut player,
        &snapshot,
        &world,
        &tuning,
        time.delta_seconds(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ground::SolidSurface;

    fn rect_triangles(y: f32, min: Vec2, max: Vec2) -> Vec<[Vec3; 3]> {
        let a = Vec3::new(min.x, y, min.y);
        let b = Vec3::new(max.x, y, min.y);
        let c = Vec3::new(max.x, y, max.y);
        let d = Vec3::new(min.x, y, max.y);
        vec![[a, b, c], [a, c, d]]
    }

    fn flat_world(y: f32, half: f32) -> CollisionMesh {
        CollisionMesh::new(vec![SolidSurface::from_local(
            "Floor".to_string(),
            None,
            rect_triangles(y, Vec2::splat(-half), Vec2::splat(half)),
            Mat4::IDENTITY,
        )])
    }

    /// Two floor plates meeting at x = 0; the near plate (x < 0) sits at
    /// `near_y` and the far plate (x >= 0) at `far_y`.
    fn split_world(near_y: f32, far_y: f32) -> CollisionMesh {
        CollisionMesh::new(vec![
            SolidSurface::from_local(
                "Near".to_string(),
                None,
                rect_triangles(near_y, Vec2::new(-30.0, -30.0), Vec2::new(0.0, 30.0)),
                Mat4::IDENTITY,
            ),
            SolidSurface::from_local(
                "Far".to_string(),
                None,
                rect_triangles(far_y, Vec2::new(0.0, -30.0), Vec2::new(30.0, 30.0)),
                Mat4::IDENTITY,
            ),
        ])
    }

    fn standing_player(tuning: &MovementTuning, floor_y: f32) -> (Transform, Player) {
        let eye = tuning.eye_height;
        let transform = Transform::from_xyz(-5.0, floor_y + eye, 0.0).looking_to(Vec3::X, Vec3::Y);
        let mut player = Player::standing(eye);
        player.last_safe_y = floor_y + eye;
        (transform, player)
    }

    fn walk_frames(
        transform: &mut Transform,
        player: &mut Player,
        input: &InputSnapshot,
        world: &CollisionMesh,
        tuning: &MovementTuning,
        dt: f32,
        seconds: f32,
    ) -> bool {
        let mut saw_airborne = false;
        let mut t = 0.0;
        while t < seconds {
            controller_step(transform, player, input, world, tuning, dt);
            saw_airborne |= !player.grounded;
            t += dt;
        }
        saw_airborne
    }

    #[test]
    fn grounding_converges_from_any_height() {
        let tuning = MovementTuning::default();
        let world = flat_world(0.0, 50.0);
        let input = InputSnapshot::default();

        for start in [2.0_f32, 5.0, 20.0] {
            for dt in [1.0 / 144.0, 1.0 / 60.0, 1.0 / 30.0] {
                let mut transform = Transform::from_xyz(0.0, start, 0.0);
                let mut player = Player::standing(tuning.eye_height);
                player.grounded = false;

                walk_frames(&mut transform, &mut player, &input, &world, &tuning, dt, 8.0);

                assert!(player.grounded, "still airborne from {start} at dt {dt}");
                assert!(
                    (transform.translation.y - tuning.eye_height).abs() < 1e-3,
                    "expected to settle at eye height, y={}",
                    transform.translation.y
                );
                assert!(player.vertical_velocity.abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn small_steps_never_go_airborne() {
        let tuning = MovementTuning::default();
        let world = split_world(0.0, 0.3);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot { forward: 1.0, ..Default::default() };

        let saw_airborne =
            walk_frames(&mut transform, &mut player, &input, &world, &tuning, 1.0 / 60.0, 2.0);

        assert!(!saw_airborne, "stepping up 0.3 should stay grounded");
        assert!(
            (transform.translation.y - (0.3 + tuning.eye_height)).abs() < 1e-3,
            "expected to stand on the upper plate, y={}",
            transform.translation.y
        );
    }

    #[test]
    fn small_drops_never_go_airborne() {
        let tuning = MovementTuning::default();
        let world = split_world(0.0, -0.7);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot { forward: 1.0, ..Default::default() };

        let saw_airborne =
            walk_frames(&mut transform, &mut player, &input, &world, &tuning, 1.0 / 60.0, 2.0);

        assert!(!saw_airborne, "stepping down 0.7 should stay grounded");
        assert!((transform.translation.y - (-0.7 + tuning.eye_height)).abs() < 1e-3);
    }

    #[test]
    fn tall_riser_blocks_forward_progress() {
        let tuning = MovementTuning::default();
        let world = split_world(0.0, 1.2);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot { forward: 1.0, ..Default::default() };

        walk_frames(&mut transform, &mut player, &input, &world, &tuning, 1.0 / 60.0, 3.0);

        assert!(
            transform.translation.x < 0.11,
            "the riser should stop forward progress, x={}",
            transform.translation.x
        );
        assert!(
            (transform.translation.y - tuning.eye_height).abs() < 1e-3,
            "never climbed the riser, y={}",
            transform.translation.y
        );
        assert!(player.grounded, "still standing on the lower plate");
    }

    #[test]
    fn floor_rising_beyond_a_step_breaks_grounding() {
        let tuning = MovementTuning::default();
        let low = flat_world(0.0, 50.0);
        let high = flat_world(1.0, 50.0);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot::default();
        let dt = 1.0 / 60.0;

        controller_step(&mut transform, &mut player, &input, &low, &tuning, dt);
        assert!(player.grounded);

        // the floor under the probe jumps up by 1.0 > step_height
        controller_step(&mut transform, &mut player, &input, &high, &tuning, dt);
        assert!(!player.grounded, "an oversized rise must not snap the camera up");
        assert!(
            (transform.translation.y - tuning.eye_height).abs() < 1e-3,
            "camera stays put instead of teleporting, y={}",
            transform.translation.y
        );
    }

    #[test]
    fn big_drop_falls_then_lands() {
        let tuning = MovementTuning::default();
        let world = split_world(0.0, -2.0);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot { forward: 1.0, ..Default::default() };

        let saw_airborne =
            walk_frames(&mut transform, &mut player, &input, &world, &tuning, 1.0 / 60.0, 4.0);

        assert!(saw_airborne, "a 2.0 drop must go through the airborne state");
        assert!(player.grounded, "expected to land on the lower plate");
        assert!(
            (transform.translation.y - (-2.0 + tuning.eye_height)).abs() < 1e-3,
            "expected to land at the lower plate, y={}",
            transform.translation.y
        );
    }

    #[test]
    fn jump_only_works_from_the_ground() {
        let tuning = MovementTuning::default();
        let world = flat_world(0.0, 50.0);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let dt = 1.0 / 60.0;

        // settle one frame, then jump
        controller_step(&mut transform, &mut player, &InputSnapshot::default(), &world, &tuning, dt);
        assert!(player.grounded);

        let jump = InputSnapshot { jump: true, ..Default::default() };
        controller_step(&mut transform, &mut player, &jump, &world, &tuning, dt);
        assert!(!player.grounded);
        assert!(player.vertical_velocity > 0.0);

        // pressing jump again mid-flight must not add velocity
        let peak_velocity = player.vertical_velocity;
        controller_step(&mut transform, &mut player, &jump, &world, &tuning, dt);
        assert!(
            player.vertical_velocity < peak_velocity,
            "airborne jump presses are ignored"
        );

        // and the arc comes back down to the floor
        let mut t = 0.0;
        while t < 3.0 {
            controller_step(&mut transform, &mut player, &InputSnapshot::default(), &world, &tuning, dt);
            t += dt;
        }
        assert!(player.grounded);
        assert!((transform.translation.y - tuning.eye_height).abs() < 1e-3);
    }

    #[test]
    fn long_hitches_integrate_as_one_bounded_step() {
        let tuning = MovementTuning::default();
        let world = flat_world(0.0, 50.0);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let start_x = transform.translation.x;
        let input = InputSnapshot { forward: 1.0, ..Default::default() };

        controller_step(&mut transform, &mut player, &input, &world, &tuning, 0.5);

        let moved = transform.translation.x - start_x;
        let expected = tuning.walk_speed * MAX_TIMESTEP;
        assert!(
            (moved - expected).abs() < 1e-4,
            "a 0.5 s hitch should advance by the clamped step, moved {moved}"
        );
    }

    #[test]
    fn walking_off_the_model_holds_the_last_safe_height() {
        let tuning = MovementTuning::default();
        // narrow plate ending at x = 0, nothing beyond
        let world = CollisionMesh::new(vec![SolidSurface::from_local(
            "Plate".to_string(),
            None,
            rect_triangles(0.0, Vec2::new(-30.0, -30.0), Vec2::new(0.0, 30.0)),
            Mat4::IDENTITY,
        )]);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot { forward: 1.0, ..Default::default() };

        walk_frames(&mut transform, &mut player, &input, &world, &tuning, 1.0 / 60.0, 2.0);

        assert!(transform.translation.x > 0.5, "kept walking past the edge");
        assert!(player.grounded, "held at the fallback height");
        assert!(
            (transform.translation.y - tuning.eye_height).abs() < 1e-3,
            "fallback keeps the last safe height, y={}",
            transform.translation.y
        );
    }

    #[test]
    fn zeroed_snapshot_keeps_the_player_still() {
        let tuning = MovementTuning::default();
        let world = flat_world(0.0, 50.0);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let before = transform.translation;

        walk_frames(
            &mut transform,
            &mut player,
            &InputSnapshot::default(),
            &world,
            &tuning,
            1.0 / 60.0,
            1.0,
        );

        assert!((transform.translation - before).length() < 1e-5);
    }

    #[test]
    fn sprint_scales_ground_speed() {
        let tuning = MovementTuning::default();
        let world = flat_world(0.0, 200.0);
        let dt = 1.0 / 60.0;

        let (mut walk_tf, mut walk_player) = standing_player(&tuning, 0.0);
        let walk = InputSnapshot { forward: 1.0, ..Default::default() };
        walk_frames(&mut walk_tf, &mut walk_player, &walk, &world, &tuning, dt, 1.0);

        let (mut sprint_tf, mut sprint_player) = standing_player(&tuning, 0.0);
        let sprint = InputSnapshot { forward: 1.0, sprint: true, ..Default::default() };
        walk_frames(&mut sprint_tf, &mut sprint_player, &sprint, &world, &tuning, dt, 1.0);

        let walked = walk_tf.translation.x + 5.0;
        let sprinted = sprint_tf.translation.x + 5.0;
        assert!(
            (sprinted - walked * tuning.sprint_multiplier).abs() < 1e-2,
            "sprint should scale displacement, walked {walked} sprinted {sprinted}"
        );
    }

    #[test]
    fn crouch_lowers_the_eye_and_slows_movement() {
        let tuning = MovementTuning::default();
        let world = flat_world(0.0, 200.0);
        let (mut transform, mut player) = standing_player(&tuning, 0.0);
        let input = InputSnapshot { forward: 1.0, crouch: true, ..Default::default() };

        walk_frames(&mut transform, &mut player, &input, &world, &tuning, 1.0 / 60.0, 2.0);

        assert!(
            (player.eye_height - tuning.crouch_eye_height).abs() < 1e-3,
            "eye height settles at the crouch height"
        );
        assert!(
            (transform.translation.y - tuning.crouch_eye_height).abs() < 1e-3,
            "camera follows the lowered eye, y={}",
            transform.translation.y
        );
        let crouch_speed = tuning.walk_speed * tuning.crouch_multiplier;
        let expected_x = -5.0 + crouch_speed * 2.0;
        assert!(
            (transform.translation.x - expected_x).abs() < 0.2,
            "crouch walk covers less ground, x={}",
            transform.translation.x
        );
    }
}
