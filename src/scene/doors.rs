//! Door interaction.
//!
//! Any scene node whose name contains "door" can be opened once with the
//! interact input. The node swings about its own vertical axis and its
//! collision surfaces are re-baked in place, so the opening becomes walkable
//! immediately. Doors stay open.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::input::InputSnapshot;
use crate::player::Player;
use crate::player::ground::CollisionMesh;
use crate::settings::Settings;

/// Node-name fragment marking a door.
pub const DOOR_MARKER: &str = "door";

/// How far a door swings when opened.
pub const DOOR_OPEN_ANGLE: f32 = FRAC_PI_2;

/// Marks a door that has been opened.
#[derive(Component)]
pub struct Door {
    pub open: bool,
}

/// Whether a scene node's name marks it as a door.
#[must_use]
pub fn door_names_match(name: &str) -> bool {
    name.to_lowercase().contains(DOOR_MARKER)
}

/// Swing the nearest closed door open when the interact input fires.
///
/// The rotation happens about the node's own vertical axis, so the hinge is
/// wherever the model author put the node origin; mesh primitives are
/// assumed to sit at that origin too, which keeps the collision re-bake a
/// plain rotation. Until the collision bake has published, doors do not
/// respond.
#[allow(clippy::needless_pass_by_value)]
pub fn interact_with_doors(
    snapshot: Res<InputSnapshot>,
    settings: Res<Settings>,
    world: Option<ResMut<CollisionMesh>>,
    player: Query<&Transform, With<Player>>,
    candidates: Query<(Entity, &Name, &GlobalTransform), Without<Player>>,
    opened: Query<&Door>,
    mut transforms: Query<&mut Transform, (With<Name>, Without<Player>)>,
    mut commands: Commands,
) {
    if !snapshot.interact {
        return;
    }
    let Some(mut world) = world else { return };
    let Ok(cam) = player.get_single() else { return };
    let reach = settings.movement.interact_distance;

    let mut best: Option<(Entity, f32)> = None;
    for (entity, name, global) in &candidates {
        if !door_names_match(name.as_str()) {
            continue;
        }
        if opened.contains(entity) {
            continue;
        }
        let distance = global.translation().distance(cam.translation);
        if distance <= reach && best.is_none_or(|(_, d)| distance < d) {
            best = Some((entity, distance));
        }
    }
    let Some((entity, distance)) = best else { return };
    let Ok(mut door_transform) = transforms.get_mut(entity) else { return };

    door_transform.rotate_local_y(DOOR_OPEN_ANGLE);
    world.rebake_entity(entity, Mat4::from_rotation_y(DOOR_OPEN_ANGLE));
    commands.entity(entity).insert(Door { open: true });
    info!("Opened a door {distance:.1} away");
}
