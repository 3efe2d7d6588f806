//! Ground probing against the walkable triangle soup.
//!
//! The campus model is baked into a set of `SolidSurface` groups (one per
//! source mesh) holding world-space triangles plus a bounding box for quick
//! rejection. `CollisionMesh::probe` casts a ray straight down from above a
//! candidate position and reports the nearest floor hit; the controller turns
//! that into step, land or fall decisions.

use bevy::prelude::*;

/// Determinant cutoff below which a triangle is treated as degenerate.
const RAY_EPSILON: f32 = 1e-7;

/// Margin added around surface bounds so probes on an exact edge still test
/// the triangles.
const BOUNDS_MARGIN: f32 = 0.05;

/// Result of a downward ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// World-space point where the ray met the floor.
    pub point: Vec3,
    /// Distance from the ray origin to the hit.
    pub distance: f32,
}

/// One source mesh worth of collision triangles.
///
/// Local-space triangles are kept alongside the baked world-space copies so a
/// surface can be re-baked when its node moves (doors swing once when
/// opened).
#[derive(Clone, Debug)]
pub struct SolidSurface {
    /// Name of the scene node this surface came from.
    pub name: String,
    /// Source entity, when the surface belongs to a live scene node.
    pub entity: Option<Entity>,
    local_triangles: Vec<[Vec3; 3]>,
    world_from_local: Mat4,
    triangles: Vec<[Vec3; 3]>,
    min: Vec3,
    max: Vec3,
}

impl SolidSurface {
    /// Bake a surface from local-space triangles and a world transform.
    #[must_use]
    pub fn from_local(
        name: String,
        entity: Option<Entity>,
        local_triangles: Vec<[Vec3; 3]>,
        world_from_local: Mat4,
    ) -> Self {
        let mut surface = SolidSurface {
            name,
            entity,
            local_triangles,
            world_from_local,
            triangles: Vec::new(),
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        };
        surface.rebake(world_from_local);
        surface
    }

    /// Re-transform the local triangles with a new world matrix and refresh
    /// the bounds. Used when a door node rotates after the initial bake.
    pub fn rebake(&mut self, world_from_local: Mat4) {
        self.world_from_local = world_from_local;
        self.triangles = self
            .local_triangles
            .iter()
            .map(|tri| {
                [
                    world_from_local.transform_point3(tri[0]),
                    world_from_local.transform_point3(tri[1]),
                    world_from_local.transform_point3(tri[2]),
                ]
            })
            .collect();

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for tri in &self.triangles {
            for v in tri {
                min = min.min(*v);
                max = max.max(*v);
            }
        }
        self.min = min;
        self.max = max;
    }

    /// Current world transform of the surface.
    #[must_use]
    pub fn world_from_local(&self) -> Mat4 {
        self.world_from_local
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// World-space bounds of the baked triangles.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// Whether a vertical ray through `(x, z)` can intersect this surface.
    fn column_overlaps(&self, x: f32, z: f32) -> bool {
        x >= self.min.x - BOUNDS_MARGIN
            && x <= self.max.x + BOUNDS_MARGIN
            && z >= self.min.z - BOUNDS_MARGIN
            && z <= self.max.z + BOUNDS_MARGIN
    }
}

/// Baked collision geometry for the loaded model.
///
/// Published as a resource once the background bake finishes; frame systems
/// that need it skip their work while it is absent.
#[derive(Resource, Default, Debug)]
pub struct CollisionMesh {
    pub surfaces: Vec<SolidSurface>,
}

impl CollisionMesh {
    #[must_use]
    pub fn new(surfaces: Vec<SolidSurface>) -> Self {
        CollisionMesh { surfaces }
    }

    /// Rebake every surface belonging to `entity` with `delta` applied in
    /// that node's local space, e.g. a door swinging about its hinge.
    pub fn rebake_entity(&mut self, entity: Entity, delta: Mat4) {
        for surface in &mut self.surfaces {
            if surface.entity == Some(entity) {
                let world_from_local = surface.world_from_local() * delta;
                surface.rebake(world_from_local);
            }
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(SolidSurface::triangle_count).sum()
    }

    /// Union of all surface bounds, or `None` for empty geometry. Used to
    /// place the player at the model footprint center after a load.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.surfaces.iter();
        let first = iter.next()?;
        let (mut min, mut max) = first.bounds();
        for surface in iter {
            let (smin, smax) = surface.bounds();
            min = min.min(smin);
            max = max.max(smax);
        }
        Some((min, max))
    }

    /// Cast a ray straight down from `eye_height` above the `candidate` foot
    /// position and return the nearest floor hit within `probe_length`.
    ///
    /// Casting from eye level means a step the feet are about to clip into is
    /// still seen from above, while geometry over the player's head stays out
    /// of reach of the ray. Returns `None` when no surface lies under the
    /// probe.
    #[must_use]
    pub fn probe(&self, candidate: Vec3, eye_height: f32, probe_length: f32) -> Option<GroundHit> {
        let origin = candidate + Vec3::Y * eye_height;
        let mut nearest: Option<f32> = None;

        for surface in &self.surfaces {
            if !surface.column_overlaps(origin.x, origin.z) {
                continue;
            }
            // Surfaces entirely above the origin or beyond the probe reach
            // cannot be hit by the downward ray.
            if surface.min.y > origin.y + BOUNDS_MARGIN {
                continue;
            }
            if surface.max.y < origin.y - probe_length {
                continue;
            }

            for tri in &surface.triangles {
                if let Some(t) = ray_triangle(origin, Vec3::NEG_Y, tri)
                    && t <= probe_length
                        && nearest.is_none_or(|best| t < best) {
                            nearest = Some(t);
                        }
            }
        }

        nearest.map(|distance| GroundHit {
            point: origin + Vec3::NEG_Y * distance,
            distance,
        })
    }
}

/// Moller-Trumbore ray/triangle intersection.
///
/// Both winding orders are accepted since exported floors are not guaranteed
/// a consistent facing. Returns the ray parameter `t` for hits in front of
/// the origin, `None` for misses and degenerate triangles.
#[must_use]
pub fn ray_triangle(origin: Vec3, dir: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];

    let h = dir.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - tri[0];
    let u = s.dot(h) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if t > RAY_EPSILON { Some(t) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quad(y: f32, half: f32) -> Vec<[Vec3; 3]> {
        let a = Vec3::new(-half, y, -half);
        let b = Vec3::new(half, y, -half);
        let c = Vec3::new(half, y, half);
        let d = Vec3::new(-half, y, half);
        vec![[a, b, c], [a, c, d]]
    }

    fn floor_mesh(y: f32, half: f32) -> CollisionMesh {
        CollisionMesh::new(vec![SolidSurface::from_local(
            "Floor".to_string(),
            None,
            flat_quad(y, half),
            Mat4::IDENTITY,
        )])
    }

    #[test]
    fn ray_hits_triangle_from_above() {
        let tri = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let t = ray_triangle(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, &tri);
        assert!(t.is_some());
        assert!((t.unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn ray_accepts_both_winding_orders() {
        let tri = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
        ];
        assert!(ray_triangle(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, &tri).is_some());
    }

    #[test]
    fn ray_misses_outside_triangle() {
        let tri = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        assert!(ray_triangle(Vec3::new(5.0, 2.0, 0.0), Vec3::NEG_Y, &tri).is_none());
    }

    #[test]
    fn degenerate_triangle_yields_no_hit() {
        let tri = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        assert!(ray_triangle(Vec3::new(0.5, 2.0, 0.0), Vec3::NEG_Y, &tri).is_none());
    }

    #[test]
    fn probe_reports_floor_point_and_distance() {
        let mesh = floor_mesh(0.0, 10.0);
        let hit = mesh.probe(Vec3::new(0.0, 1.6, 0.0), 1.6, 60.0);
        let hit = hit.expect("probe should find the floor");
        assert!(hit.point.y.abs() < 1e-5);
        assert!((hit.distance - 3.2).abs() < 1e-5);
    }

    #[test]
    fn probe_prefers_the_nearest_floor() {
        let mesh = CollisionMesh::new(vec![
            SolidSurface::from_local("Ground".to_string(), None, flat_quad(0.0, 10.0), Mat4::IDENTITY),
            SolidSurface::from_local("Mezzanine".to_string(), None, flat_quad(3.0, 10.0), Mat4::IDENTITY),
        ]);
        let hit = mesh.probe(Vec3::new(0.0, 5.0, 0.0), 1.6, 60.0).expect("hit");
        assert!((hit.point.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn probe_misses_off_the_model() {
        let mesh = floor_mesh(0.0, 10.0);
        assert!(mesh.probe(Vec3::new(50.0, 1.6, 0.0), 1.6, 60.0).is_none());
    }

    #[test]
    fn probe_respects_the_length_bound() {
        let mesh = floor_mesh(-100.0, 10.0);
        assert!(mesh.probe(Vec3::new(0.0, 1.6, 0.0), 1.6, 60.0).is_none());
        assert!(mesh.probe(Vec3::new(0.0, 1.6, 0.0), 1.6, 200.0).is_some());
    }

    #[test]
    fn rebake_moves_the_baked_triangles() {
        let mut surface =
            SolidSurface::from_local("Door".to_string(), None, flat_quad(0.0, 2.0), Mat4::IDENTITY);
        surface.rebake(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let mesh = CollisionMesh::new(vec![surface]);
        let hit = mesh.probe(Vec3::new(0.0, 3.0, 0.0), 1.6, 60.0).expect("hit");
        assert!((hit.point.y - 1.0).abs() < 1e-5);
    }
}
