//! Collision baking for the loaded campus model.
//!
//! Once the scene has instanced, the mesh data is snapshotted on the main
//! thread and handed to the compute pool, where every source mesh becomes a
//! `SolidSurface` of world-space triangles. The finished `CollisionMesh` and
//! the destinations registry built from the same scene go live in the same
//! frame, so movement and navigation never see half a model.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, VertexAttributeValues};
use bevy::tasks::{AsyncComputeTaskPool, Task};

use crate::nav::{LandmarkSet, TargetRegistry};
use crate::player::Player;
use crate::player::ground::{CollisionMesh, SolidSurface};
use crate::settings::Settings;

use super::{CampusScene, LoadPhase, ModelStatus, collect_targets, is_descendant, nearest_name};

/// Everything the bake needs from one mesh entity, snapshotted so the task
/// owns plain data.
pub struct MeshSource {
    pub name: String,
    /// Named node the mesh hangs off, used to re-bake when that node moves.
    pub entity: Option<Entity>,
    pub world_from_local: Mat4,
    pub positions: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
}

impl MeshSource {
    /// Expand the raw vertex data into local-space triangles. Indices out of
    /// range and triangles with non-finite vertices are dropped.
    #[must_use]
    pub fn local_triangles(&self) -> Vec<[Vec3; 3]> {
        let mut triangles = Vec::new();
        let mut push = |a: Vec3, b: Vec3, c: Vec3| {
            if a.is_finite() && b.is_finite() && c.is_finite() {
                triangles.push([a, b, c]);
            }
        };

        match &self.indices {
            Some(indices) => {
                for chunk in indices.chunks_exact(3) {
                    let fetch = |i: u32| self.positions.get(i as usize).copied();
                    if let (Some(a), Some(b), Some(c)) =
                        (fetch(chunk[0]), fetch(chunk[1]), fetch(chunk[2]))
                    {
                        push(Vec3::from_array(a), Vec3::from_array(b), Vec3::from_array(c));
                    }
                }
            }
            None => {
                for chunk in self.positions.chunks_exact(3) {
                    push(
                        Vec3::from_array(chunk[0]),
                        Vec3::from_array(chunk[1]),
                        Vec3::from_array(chunk[2]),
                    );
                }
            }
        }

        triangles
    }
}

/// Turn the snapshotted sources into baked surfaces. Runs on the compute
/// pool; the per-mesh transform work fans out across rayon workers.
#[must_use]
pub fn bake_surfaces(sources: Vec<MeshSource>) -> Vec<SolidSurface> {
    use rayon::prelude::*;

    sources
        .into_par_iter()
        .map(|source| {
            let triangles = source.local_triangles();
            SolidSurface::from_local(source.name, source.entity, triangles, source.world_from_local)
        })
        .filter(|surface| surface.triangle_count() > 0)
        .collect()
}

/// In-flight bake plus the registry that goes live with it.
#[derive(Resource)]
pub struct PendingCollision {
    pub task: Task<Vec<SolidSurface>>,
    pub registry: TargetRegistry,
}

/// Scene data the bake snapshot reads on the main thread.
#[derive(SystemParam)]
pub struct BakeSources<'w, 's> {
    pub meshes: Res<'w, Assets<Mesh>>,
    pub mesh_entities: Query<'w, 's, (Entity, &'static Handle<Mesh>, &'static GlobalTransform)>,
    pub named: Query<'w, 's, (Entity, &'static Name)>,
    pub names: Query<'w, 's, &'static Name>,
    pub parents: Query<'w, 's, &'static Parent>,
    pub landmarks: Res<'w, LandmarkSet>,
}

/// Kick the collision bake off once the scene is ready.
#[allow(clippy::needless_pass_by_value)]
pub fn start_collision_bake(
    status: Res<ModelStatus>,
    scene: Option<Res<CampusScene>>,
    existing: Option<Res<CollisionMesh>>,
    pending: Option<Res<PendingCollision>>,
    sources: BakeSources,
    mut commands: Commands,
) {
    if status.phase != LoadPhase::Ready || existing.is_some() || pending.is_some() {
        return;
    }
    let Some(scene) = scene else { return };

    let mut snapshot: Vec<MeshSource> = Vec::new();
    for (entity, handle, global) in &sources.mesh_entities {
        if !is_descendant(entity, scene.root, &sources.parents) {
            continue;
        }
        let Some(mesh) = sources.meshes.get(handle) else {
            continue;
        };
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            warn!("mesh without positions in the campus model, skipping");
            continue;
        };
        let indices = match mesh.indices() {
            Some(Indices::U32(indices)) => Some(indices.clone()),
            Some(Indices::U16(indices)) => Some(indices.iter().map(|&i| u32::from(i)).collect()),
            None => None,
        };
        let (anchor, name) = nearest_name(entity, &sources.names, &sources.parents)
            .map_or((None, "unnamed".to_string()), |(anchor, name)| (Some(anchor), name));

        snapshot.push(MeshSource {
            name,
            entity: anchor,
            world_from_local: global.compute_matrix(),
            positions: positions.clone(),
            indices,
        });
    }

    let registry = collect_targets(scene.root, &sources.named, &sources.parents, &sources.landmarks);

    info!("Baking collision from {} meshes", snapshot.len());
    let task = AsyncComputeTaskPool::get().spawn(async move { bake_surfaces(snapshot) });
    commands.insert_resource(PendingCollision { task, registry });
}

/// Publish a finished bake: collision, registry and the player's spawn spot
/// land in one frame.
#[allow(clippy::needless_pass_by_value)]
pub fn finish_collision_bake(
    pending: Option<ResMut<PendingCollision>>,
    settings: Res<Settings>,
    mut commands: Commands,
    mut player: Query<(&mut Transform, &mut Player), With<Camera3d>>,
) {
    let Some(mut pending) = pending else { return };
    if !pending.task.is_finished() {
        return;
    }

    let Ok(surfaces) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        futures::executor::block_on(&mut pending.task)
    })) else {
        warn!("collision bake panicked, dropping this bake");
        commands.remove_resource::<PendingCollision>();
        return;
    };

    let world = CollisionMesh::new(surfaces);
    info!(
        "Collision ready: {} surfaces, {} triangles",
        world.surfaces.len(),
        world.triangle_count()
    );

    if let Ok((mut transform, mut state)) = player.get_single_mut() {
        place_player(&world, &settings, &mut transform, &mut state);
    }

    commands.insert_resource(world);
    commands.insert_resource(pending.registry.clone());
    commands.remove_resource::<PendingCollision>();
}

/// Drop the player onto the floor at the model's footprint center, or at the
/// configured fallback when the probe finds nothing there.
fn place_player(
    world: &CollisionMesh,
    settings: &Settings,
    transform: &mut Transform,
    player: &mut Player,
) {
    let eye = settings.movement.eye_height;
    let fallback = Vec3::from_array(settings.scene.spawn_fallback);

    let spawn = match world.bounds() {
        Some((min, max)) => {
            let center_x = (min.x + max.x) * 0.5;
            let center_z = (min.z + max.z) * 0.5;
            let feet = Vec3::new(center_x, max.y + 1.0, center_z);
            let reach = (max.y - min.y) + eye + 2.0;
            match world.probe(feet, eye, reach) {
                Some(hit) => Vec3::new(center_x, hit.point.y + eye, center_z),
                None => fallback,
            }
        }
        None => fallback,
    };

    transform.translation = spawn;
    player.eye_height = eye;
    player.last_safe_y = spawn.y;
    player.grounded = true;
    player.vertical_velocity = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn indexed_meshes_expand_to_triangles() {
        let source = MeshSource {
            name: "Quad".to_string(),
            entity: None,
            world_from_local: Mat4::IDENTITY,
            positions: quad_positions(),
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
        };
        let triangles = source.local_triangles();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[0][1], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn unindexed_meshes_read_vertices_in_threes() {
        let source = MeshSource {
            name: "Soup".to_string(),
            entity: None,
            world_from_local: Mat4::IDENTITY,
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                // trailing vertex short of a full triangle
                [9.0, 9.0, 9.0],
            ],
            indices: None,
        };
        assert_eq!(source.local_triangles().len(), 1);
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        let source = MeshSource {
            name: "Broken".to_string(),
            entity: None,
            world_from_local: Mat4::IDENTITY,
            positions: quad_positions(),
            indices: Some(vec![0, 1, 99]),
        };
        assert!(source.local_triangles().is_empty());
    }

    #[test]
    fn non_finite_vertices_are_dropped() {
        let source = MeshSource {
            name: "NaN".to_string(),
            entity: None,
            world_from_local: Mat4::IDENTITY,
            positions: vec![
                [0.0, 0.0, 0.0],
                [f32::NAN, 0.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            indices: None,
        };
        assert!(source.local_triangles().is_empty());
    }

    #[test]
    fn baking_transforms_and_skips_empty_surfaces() {
        let lifted = MeshSource {
            name: "Deck".to_string(),
            entity: None,
            world_from_local: Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
            positions: quad_positions(),
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
        };
        let empty = MeshSource {
            name: "Empty".to_string(),
            entity: None,
            world_from_local: Mat4::IDENTITY,
            positions: Vec::new(),
            indices: None,
        };

        let surfaces = bake_surfaces(vec![lifted, empty]);
        assert_eq!(surfaces.len(), 1, "surfaces without triangles are dropped");
        let (min, max) = surfaces[0].bounds();
        assert!((min.y - 2.0).abs() < 1e-6 && (max.y - 2.0).abs() < 1e-6);
    }
}
