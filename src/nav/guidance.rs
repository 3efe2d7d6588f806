//! Guidance toward the selected navigation target.
//!
//! `update_guidance` turns the selection into a bearing in camera space, a
//! distance and a distance tier each frame. The bearing is smoothed along
//! the shortest arc so the on-screen arrow turns instead of snapping.
//! `animate_guidance_cues` drives the cue entities: an arrow orbiting the
//! camera, a spinning marker over the target and a beam so tall buildings
//! cannot hide it.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::prelude::*;

use crate::nav::{TargetRegistry, target_world_position};
use crate::player::Player;
use crate::settings::Settings;

const ARROW_ORBIT_RADIUS: f32 = 1.2;
const ARROW_DROP: f32 = -0.45;
const MARKER_HEIGHT: f32 = 1.8;
const MARKER_SPIN_RATE: f32 = 1.2;
const BEAM_HEIGHT: f32 = 40.0;
const BEAM_RADIUS: f32 = 0.12;
// squared horizontal distance under which a bearing is meaningless
const DEGENERATE_DISTANCE_SQ: f32 = 1e-4;

/// How close the player is to the target, for cue coloring and pulse rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceTier {
    Near,
    Mid,
    #[default]
    Far,
}

impl DistanceTier {
    /// Bucket a distance against the configured thresholds.
    #[must_use]
    pub fn classify(distance: f32, near: f32, mid: f32) -> Self {
        if distance < near {
            DistanceTier::Near
        } else if distance < mid {
            DistanceTier::Mid
        } else {
            DistanceTier::Far
        }
    }
}

/// Per-frame guidance readout consumed by the cue and overlay systems.
#[derive(Resource, Default)]
pub struct GuidanceState {
    /// Smoothed bearing to the target in radians, 0 straight ahead and
    /// positive to the right. Holds its last value while the target is
    /// degenerately close.
    pub smoothed_bearing: f32,
    pub distance: f32,
    /// World position of the active target, `None` when nothing is selected
    /// or the anchor is gone.
    pub target_position: Option<Vec3>,
    pub tier: DistanceTier,
}

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Signed shortest rotation taking `from` to `to`, in `(-PI, PI]`.
#[must_use]
pub fn shortest_angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Move `current` a fraction of the shortest arc toward `target`.
#[must_use]
pub fn smooth_bearing(current: f32, target: f32, factor: f32) -> f32 {
    normalize_angle(current + shortest_angle_diff(current, target) * factor)
}

/// Horizontal bearing from the camera to `target`, 0 straight ahead and
/// positive to the right. Returns `None` when the target sits on the
/// camera's vertical axis and no direction exists.
#[must_use]
pub fn bearing_to(camera: &Transform, target: Vec3) -> Option<f32> {
    let to = Vec2::new(
        target.x - camera.translation.x,
        target.z - camera.translation.z,
    );
    if to.length_squared() < DEGENERATE_DISTANCE_SQ {
        return None;
    }
    let forward_raw = camera.forward();
    let right_raw = camera.right();
    let forward = Vec2::new(forward_raw.x, forward_raw.z);
    let right = Vec2::new(right_raw.x, right_raw.z);
    Some(f32::atan2(right.dot(to), forward.dot(to)))
}

/// Refresh `GuidanceState` from the current selection and camera pose.
///
/// Runs with or without a registry; until the scene publishes one there is
/// simply nothing to guide to. A fresh selection snaps the bearing so the
/// arrow does not sweep in from a stale angle.
#[allow(clippy::needless_pass_by_value)]
pub fn update_guidance(
    settings: Res<Settings>,
    registry: Option<Res<TargetRegistry>>,
    transforms: Query<&GlobalTransform>,
    camera: Query<&Transform, (With<Camera3d>, With<Player>)>,
    mut guidance: ResMut<GuidanceState>,
) {
    let position = registry
        .as_ref()
        .and_then(|r| r.selected_target())
        .and_then(|target| target_world_position(target, &transforms));
    let Some(position) = position else {
        guidance.target_position = None;
        return;
    };
    let Ok(cam) = camera.get_single() else { return };

    let had_target = guidance.target_position.is_some();
    guidance.target_position = Some(position);
    guidance.distance = (position - cam.translation).length();
    guidance.tier = DistanceTier::classify(
        guidance.distance,
        settings.guidance.near_distance,
        settings.guidance.mid_distance,
    );

    if let Some(raw) = bearing_to(cam, position) {
        guidance.smoothed_bearing = if had_target {
            smooth_bearing(guidance.smoothed_bearing, raw, settings.guidance.smoothing_factor)
        } else {
            raw
        };
    }
}

/// Arrow cue floating in front of the camera.
#[derive(Component)]
pub struct GuidanceArrow;

/// Spinning ring hovering over the target.
#[derive(Component)]
pub struct TargetMarker;

/// Tall translucent beam rising from the target.
#[derive(Component)]
pub struct MarkerBeam;

/// Material handles for the cue entities, kept so tier changes can retint
/// them in place.
#[derive(Resource)]
pub struct GuidanceCueAssets {
    pub arrow: Handle<StandardMaterial>,
    pub marker: Handle<StandardMaterial>,
    pub beam: Handle<StandardMaterial>,
}

fn tier_rgb(tier: DistanceTier) -> (f32, f32, f32) {
    match tier {
        DistanceTier::Near => (0.3, 1.0, 0.5),
        DistanceTier::Mid => (0.0, 1.0, 0.8),
        DistanceTier::Far => (0.4, 0.75, 1.0),
    }
}

fn tier_pulse_rate(tier: DistanceTier) -> f32 {
    match tier {
        DistanceTier::Near => 6.0,
        DistanceTier::Mid => 3.0,
        DistanceTier::Far => 1.5,
    }
}

/// Spawn the three cue entities, hidden until a target is selected.
pub fn spawn_guidance_cues(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let (r, g, b) = tier_rgb(DistanceTier::Far);
    let arrow = materials.add(StandardMaterial {
        base_color: Color::srgb(r, g, b),
        unlit: true,
        ..Default::default()
    });
    let marker = materials.add(StandardMaterial {
        base_color: Color::srgb(r, g, b),
        unlit: true,
        ..Default::default()
    });
    let beam = materials.add(StandardMaterial {
        base_color: Color::srgba(r, g, b, 0.25),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..Default::default()
    });

    commands.spawn((
        GuidanceArrow,
        PbrBundle {
            mesh: meshes.add(Cone { radius: 0.12, height: 0.35 }),
            material: arrow.clone(),
            visibility: Visibility::Hidden,
            ..Default::default()
        },
    ));
    commands.spawn((
        TargetMarker,
        PbrBundle {
            mesh: meshes.add(Torus { minor_radius: 0.08, major_radius: 0.6 }),
            material: marker.clone(),
            visibility: Visibility::Hidden,
            ..Default::default()
        },
    ));
    commands.spawn((
        MarkerBeam,
        PbrBundle {
            mesh: meshes.add(Cylinder::new(BEAM_RADIUS, BEAM_HEIGHT)),
            material: beam.clone(),
            visibility: Visibility::Hidden,
            ..Default::default()
        },
    ));

    commands.insert_resource(GuidanceCueAssets { arrow, marker, beam });
}

/// Place, spin and tint the cue entities from this frame's guidance state.
#[allow(clippy::needless_pass_by_value)]
pub fn animate_guidance_cues(
    time: Res<Time>,
    guidance: Res<GuidanceState>,
    cues: Res<GuidanceCueAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut tier_cache: Local<Option<DistanceTier>>,
    camera: Query<
        &Transform,
        (
            With<Player>,
            Without<GuidanceArrow>,
            Without<TargetMarker>,
            Without<MarkerBeam>,
        ),
    >,
    mut arrows: Query<(&mut Transform, &mut Visibility), With<GuidanceArrow>>,
    mut markers: Query<
        (&mut Transform, &mut Visibility),
        (With<TargetMarker>, Without<GuidanceArrow>),
    >,
    mut beams: Query<
        (&mut Transform, &mut Visibility),
        (With<MarkerBeam>, Without<GuidanceArrow>, Without<TargetMarker>),
    >,
) {
    let Some(target) = guidance.target_position else {
        for (_, mut visibility) in &mut arrows {
            *visibility = Visibility::Hidden;
        }
        for (_, mut visibility) in &mut markers {
            *visibility = Visibility::Hidden;
        }
        for (_, mut visibility) in &mut beams {
            *visibility = Visibility::Hidden;
        }
        *tier_cache = None;
        return;
    };
    let Ok(cam) = camera.get_single() else { return };

    let t = time.elapsed_seconds();
    let bearing = guidance.smoothed_bearing;
    let pulse = 1.0 + 0.1 * (t * tier_pulse_rate(guidance.tier)).sin();

    for (mut transform, mut visibility) in &mut arrows {
        *visibility = Visibility::Visible;
        let local = Vec3::new(bearing.sin(), 0.0, -bearing.cos()) * ARROW_ORBIT_RADIUS
            + Vec3::new(0.0, ARROW_DROP, 0.0);
        transform.translation = cam.translation + cam.rotation * local;
        transform.rotation =
            cam.rotation * Quat::from_rotation_y(-bearing) * Quat::from_rotation_x(-FRAC_PI_2);
        transform.scale = Vec3::splat(pulse);
    }

    for (mut transform, mut visibility) in &mut markers {
        *visibility = Visibility::Visible;
        transform.translation = target + Vec3::Y * MARKER_HEIGHT;
        transform.rotation = Quat::from_rotation_y(t * MARKER_SPIN_RATE);
        transform.scale = Vec3::splat(pulse);
    }

    for (mut transform, mut visibility) in &mut beams {
        *visibility = Visibility::Visible;
        transform.translation = target + Vec3::Y * (BEAM_HEIGHT * 0.5);
    }

    // retint only when the tier actually changes, material writes re-upload
    if *tier_cache != Some(guidance.tier) {
        *tier_cache = Some(guidance.tier);
        let (r, g, b) = tier_rgb(guidance.tier);
        if let Some(material) = materials.get_mut(&cues.arrow) {
            material.base_color = Color::srgb(r, g, b);
        }
        if let Some(material) = materials.get_mut(&cues.marker) {
            material.base_color = Color::srgb(r, g, b);
        }
        if let Some(material) = materials.get_mut(&cues.beam) {
            material.base_color = Color::srgba(r, g, b, 0.25);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_wrap_into_the_signed_half_open_range() {
        assert!((normalize_angle(TAU + 0.1) - 0.1).abs() < 1e-6);
        assert!((normalize_angle(-TAU - 0.1) + 0.1).abs() < 1e-6);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(PI) - PI).abs() < 1e-6, "PI itself stays PI");
    }

    #[test]
    fn shortest_diff_crosses_the_seam() {
        let diff = shortest_angle_diff(3.0, -3.0);
        assert!(
            (diff - (TAU - 6.0)).abs() < 1e-6,
            "the short way from 3.0 to -3.0 goes through PI, got {diff}"
        );
        assert!(diff > 0.0);
    }

    #[test]
    fn smoothing_converges_without_overshoot() {
        let mut bearing = 0.0_f32;
        let target = 3.0_f32;
        let mut last_gap = shortest_angle_diff(bearing, target).abs();
        for _ in 0..500 {
            bearing = smooth_bearing(bearing, target, 0.08);
            let gap = shortest_angle_diff(bearing, target).abs();
            assert!(gap <= last_gap + 1e-6, "the gap must never grow");
            last_gap = gap;
        }
        assert!(last_gap < 1e-2, "still {last_gap} away after 500 steps");
    }

    #[test]
    fn smoothing_takes_the_short_way_across_the_seam() {
        let mut bearing = 3.1_f32;
        let target = -3.1_f32;
        for _ in 0..200 {
            let before = shortest_angle_diff(bearing, target).abs();
            bearing = smooth_bearing(bearing, target, 0.1);
            let after = shortest_angle_diff(bearing, target).abs();
            assert!(after <= before + 1e-6);
            assert!(
                bearing.abs() > 2.5,
                "crossing the seam must not swing through zero, bearing {bearing}"
            );
        }
        assert!(shortest_angle_diff(bearing, target).abs() < 1e-2);
    }

    #[test]
    fn tiers_bucket_on_strict_thresholds() {
        assert_eq!(DistanceTier::classify(2.99, 3.0, 8.0), DistanceTier::Near);
        assert_eq!(DistanceTier::classify(3.0, 3.0, 8.0), DistanceTier::Mid);
        assert_eq!(DistanceTier::classify(7.99, 3.0, 8.0), DistanceTier::Mid);
        assert_eq!(DistanceTier::classify(8.0, 3.0, 8.0), DistanceTier::Far);
    }

    #[test]
    fn bearings_read_clockwise_from_straight_ahead() {
        let camera = Transform::from_xyz(0.0, 1.6, 0.0);

        let ahead = bearing_to(&camera, Vec3::new(0.0, 0.0, -5.0));
        assert!(ahead.is_some_and(|b| b.abs() < 1e-6));

        let right = bearing_to(&camera, Vec3::new(5.0, 0.0, 0.0));
        assert!(right.is_some_and(|b| (b - FRAC_PI_2).abs() < 1e-6));

        let left = bearing_to(&camera, Vec3::new(-5.0, 0.0, 0.0));
        assert!(left.is_some_and(|b| (b + FRAC_PI_2).abs() < 1e-6));

        let behind = bearing_to(&camera, Vec3::new(0.0, 0.0, 5.0));
        assert!(behind.is_some_and(|b| (b.abs() - PI).abs() < 1e-6));
    }

    #[test]
    fn bearings_follow_the_camera_heading() {
        let camera = Transform::from_xyz(0.0, 1.6, 0.0).looking_to(Vec3::X, Vec3::Y);
        let ahead = bearing_to(&camera, Vec3::new(5.0, 0.0, 0.0));
        assert!(ahead.is_some_and(|b| b.abs() < 1e-6));
    }

    #[test]
    fn overlapping_target_has_no_bearing() {
        let camera = Transform::from_xyz(2.0, 1.6, -7.0);
        assert!(bearing_to(&camera, Vec3::new(2.0, 1.6, -7.0)).is_none());
        assert!(
            bearing_to(&camera, Vec3::new(2.0, 30.0, -7.0)).is_none(),
            "a target straight overhead has no horizontal direction"
        );
    }
}
