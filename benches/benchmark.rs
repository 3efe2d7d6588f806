use criterion::{Criterion, black_box, criterion_group, criterion_main};

use bevy::math::{Mat4, Vec2, Vec3};
use bevy::prelude::Transform;

use atrium::input::InputSnapshot;
use atrium::nav::{normalize_angle, normalize_label, smooth_bearing};
use atrium::player::Player;
use atrium::player::camera::PlayerLook;
use atrium::player::controller::{MovementTuning, controller_step};
use atrium::player::ground::{CollisionMesh, SolidSurface};
use atrium::scene::{MeshSource, bake_surfaces};
use atrium::settings::Settings;

/// A flat floor of `tiles` x `tiles` unit quads at y = 0, one surface per
/// quad so the probe has to do real per-surface culling work.
fn tiled_floor(tiles: i32) -> CollisionMesh {
    let mut surfaces = Vec::new();
    for tx in -tiles..tiles {
        for tz in -tiles..tiles {
            let (x0, z0) = (tx as f32, tz as f32);
            let (x1, z1) = (x0 + 1.0, z0 + 1.0);
            let a = Vec3::new(x0, 0.0, z0);
            let b = Vec3::new(x1, 0.0, z0);
            let c = Vec3::new(x1, 0.0, z1);
            let d = Vec3::new(x0, 0.0, z1);
            surfaces.push(SolidSurface::from_local(
                format!("Tile_{tx}_{tz}"),
                None,
                vec![[a, b, c], [a, c, d]],
                Mat4::IDENTITY,
            ));
        }
    }
    CollisionMesh::new(surfaces)
}

/// Test out small camera movement deltas
fn bench_camera_look_clamp(c: &mut Criterion) {
    let settings = Settings::defaults();
    c.bench_function("camera_look_clamp", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            // simulate many small mouse moves
            for i in 0..1_000usize {
                let dx = ((i * 13) % 17) as f32 * 0.1;
                let dy = ((i * 7) % 23) as f32 * 0.2 - 5.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((look.yaw, look.pitch));
        })
    });
}

/// Test out large/extreme camera movement deltas
fn bench_camera_look_extreme(c: &mut Criterion) {
    let settings = Settings::defaults();
    c.bench_function("camera_look_extreme", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            // alternate very large movements to exercise clamps and signs
            for i in 0..1_000usize {
                let d = if (i & 1) == 0 { 1000.0 } else { -1000.0 };
                look.apply_delta(black_box(Vec2::new(d, -d)), &settings);
            }
            black_box((look.yaw, look.pitch));
        })
    });
}

/// Randomized camera movement deltas (deterministic LCG) to approximate variable input
fn bench_camera_look_random(c: &mut Criterion) {
    let settings = Settings::defaults();
    c.bench_function("camera_look_random", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            let mut state: u32 = 0x12345678;
            for _ in 0..1_000usize {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let dx = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let dy = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((look.yaw, look.pitch));
        })
    });
}

/// Benchmark simulating many movement steps over a tiled floor.
fn bench_controller_many_steps(c: &mut Criterion) {
    let world = tiled_floor(8);
    let tuning = MovementTuning::default();

    c.bench_function("controller_many_steps", |b| {
        b.iter(|| {
            let mut transform = Transform::from_xyz(0.5, tuning.eye_height, 0.5);
            let mut player = Player::standing(tuning.eye_height);
            let dt = 1.0f32 / 60.0f32;
            let mut state: u32 = 0x9e3779b9;

            for step in 0..5_000usize {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let input = InputSnapshot {
                    forward: (((state >> 16) & 0x7fff) as f32 / 32767.0) * 2.0 - 1.0,
                    strafe: (((state >> 4) & 0x7fff) as f32 / 32767.0) * 2.0 - 1.0,
                    sprint: state & 0x100 != 0,
                    jump: step % 240 == 0,
                    ..Default::default()
                };
                controller_step(&mut transform, &mut player, &input, &world, &tuning, dt);
            }

            black_box((transform, player));
        })
    });
}

/// Benchmark the downward ground probe over a grid of query columns.
fn bench_ground_probe_grid(c: &mut Criterion) {
    let world = tiled_floor(8);

    c.bench_function("ground_probe_grid", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for ix in 0..50 {
                for iz in 0..50 {
                    let x = -7.5 + (ix as f32) * 0.3;
                    let z = -7.5 + (iz as f32) * 0.3;
                    let candidate = Vec3::new(x, 1.6, z);
                    if world.probe(black_box(candidate), 1.6, 60.0).is_some() {
                        hits += 1;
                    }
                }
            }
            black_box(hits);
        })
    });
}

/// Benchmark baking a batch of source meshes into collision surfaces.
fn bench_collision_bake(c: &mut Criterion) {
    c.bench_function("collision_bake_64_meshes", |b| {
        b.iter(|| {
            let mut sources = Vec::new();
            for i in 0..64 {
                let mut positions = Vec::new();
                let mut indices = Vec::new();
                // an 8x8 grid of quads per mesh
                for gx in 0..9u32 {
                    for gz in 0..9u32 {
                        positions.push([gx as f32, 0.0, gz as f32]);
                    }
                }
                for gx in 0..8u32 {
                    for gz in 0..8u32 {
                        let base = gx * 9 + gz;
                        indices.extend_from_slice(&[
                            base, base + 9, base + 10,
                            base, base + 10, base + 1,
                        ]);
                    }
                }
                sources.push(MeshSource {
                    name: format!("Block_{i}"),
                    entity: None,
                    world_from_local: Mat4::from_translation(Vec3::new(
                        (i % 8) as f32 * 10.0,
                        0.0,
                        (i / 8) as f32 * 10.0,
                    )),
                    positions,
                    indices: Some(indices),
                });
            }
            black_box(bake_surfaces(sources));
        })
    });
}

/// Bearing smoothing microbenchmark across the angle seam.
fn bench_bearing_smoothing(c: &mut Criterion) {
    c.bench_function("bearing_smoothing", |b| {
        b.iter(|| {
            let mut bearing = 0.0f32;
            let mut state: u32 = 0xdeadbeef;
            for _ in 0..1_000usize {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let target = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 12.0 - 6.0;
                bearing = smooth_bearing(bearing, normalize_angle(target), 0.08);
            }
            black_box(bearing);
        })
    });
}

/// Benchmark label normalization over typical model node names.
fn bench_label_normalization(c: &mut Criterion) {
    let names = [
        "Class_1",
        "Class_2",
        "LectureHall.003",
        "Main Gate",
        "door_north_12",
        "Cafeteria",
        "STAIRS-EAST",
        "Library.001",
        "floor_slab_047",
        "Admin Block 2",
    ];

    c.bench_function("label_normalization", |b| {
        b.iter(|| {
            for _ in 0..100usize {
                for name in &names {
                    black_box(normalize_label(black_box(name)));
                }
            }
        })
    });
}

#[test]
fn __bench_smoke_test() {
    // make sure test harness runs this file
    assert!(true);
}

fn bench_dummy(c: &mut Criterion) { c.bench_function("dummy", |b| b.iter(|| { black_box(1 + 1); })); }

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(200);
    targets =
        bench_dummy,
        bench_camera_look_clamp,
        bench_camera_look_extreme,
        bench_camera_look_random,
        bench_controller_many_steps,
        bench_ground_probe_grid,
        bench_collision_bake,
        bench_bearing_smoothing,
        bench_label_normalization
}
criterion_main!(benches);
