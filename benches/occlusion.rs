use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glam::{IVec3, UVec2};
use urbanmegaphone::audibility::{
    check_audibility, process_groups, AudibilityState, BatchConfig, DestinationBuffers,
    OcclusionParams, RunCounters, SourceGroup, SquareCache, VoxelCache,
};
use urbanmegaphone::world::{BuildingTable, GroundMode, WorldModel};

const SIDE: u32 = 256;

/// Flat 256x256 city with a column of towers across the middle.
fn bench_world() -> WorldModel {
    let cells = (SIDE * SIDE) as usize;
    let mut ids = vec![-1i64; cells];
    for y in (0..SIDE).step_by(8) {
        ids[(128 * SIDE + y) as usize] = (y / 8) as i64;
    }
    let mut records = Vec::new();
    for _ in 0..SIDE / 8 {
        records.extend_from_slice(&[20, 0, 40]);
    }
    let table = BuildingTable::new(3, records).unwrap();
    WorldModel::new(UVec2::new(SIDE, SIDE), vec![0; cells], ids, table).unwrap()
}

fn params() -> OcclusionParams {
    OcclusionParams {
        step_length: 1.0,
        near_distance_threshold: 30.0,
        occlusion_enabled: true,
        ground_mode: GroundMode::PerColumn,
    }
}

fn bench_clear_path(c: &mut Criterion) {
    let world = bench_world();
    let p = params();
    // Long unobstructed diagonal above every roof.
    let src = IVec3::new(0, 1, 25);
    let dst = IVec3::new(250, 200, 25);

    c.bench_function("check_clear_path_250", |b| {
        b.iter(|| {
            check_audibility(
                &world,
                &p,
                black_box(dst),
                None,
                black_box(src),
                None,
                AudibilityState::Unknown,
            )
            .unwrap()
        });
    });
}

fn bench_occluded_path(c: &mut Criterion) {
    let world = bench_world();
    let p = params();
    // Street-level ray through the tower column; the march stops early.
    let src = IVec3::new(0, 0, 1);
    let dst = IVec3::new(255, 0, 1);

    c.bench_function("check_occluded_path_255", |b| {
        b.iter(|| {
            check_audibility(
                &world,
                &p,
                black_box(dst),
                None,
                black_box(src),
                None,
                AudibilityState::Unknown,
            )
            .unwrap()
        });
    });
}

fn bench_process_group(c: &mut Criterion) {
    let world = bench_world();
    let config = BatchConfig {
        occlusion: params(),
        standalone_source_height_offset: 1,
    };
    let groups = [SourceGroup {
        id: 0,
        cells: vec![UVec2::new(10, 10)],
    }];
    let exterior: Vec<UVec2> = (0..SIDE).map(|x| UVec2::new(x, 40)).collect();
    let buffers = [DestinationBuffers {
        interior: Vec::new(),
        exterior,
    }];

    c.bench_function("process_group_256_squares", |b| {
        b.iter(|| {
            let squares = SquareCache::new(world.bounds());
            let voxels = VoxelCache::from_world(&world).unwrap();
            let counters = RunCounters::new(1);
            process_groups(
                &world,
                &config,
                black_box(&groups),
                black_box(&buffers),
                &squares,
                &voxels,
                &counters,
            )
            .unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_clear_path,
    bench_occluded_path,
    bench_process_group
);
criterion_main!(benches);
