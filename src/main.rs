//! Urbanmegaphone demo - synthetic city audibility run
//!
//! Builds a small voxelized city, runs every megaphone against its
//! destination buffers and prints the counters report as JSON.

use glam::UVec2;

use urbanmegaphone::audibility::{
    process_groups, BatchConfig, DestinationBuffers, OcclusionParams, RunCounters, SourceGroup,
    SquareCache, VoxelCache,
};
use urbanmegaphone::core::{logging, Result};
use urbanmegaphone::world::{BuildingTable, GroundMode, WorldModel};

const BOUNDS: UVec2 = UVec2::new(32, 32);

/// Flat city on a gentle west-east slope with three buildings: a
/// residential tower, an office block and a residential row house.
fn build_world() -> Result<WorldModel> {
    let cells = (BOUNDS.x * BOUNDS.y) as usize;
    let mut ground = vec![0i16; cells];
    for x in 0..BOUNDS.x {
        for y in 0..BOUNDS.y {
            ground[(x * BOUNDS.y + y) as usize] = (x / 8) as i16;
        }
    }

    let mut ids = vec![-1i64; cells];
    let footprints: [(u32, u32, u32, u32, i64); 3] = [
        (10, 12, 10, 12, 0), // tower
        (20, 24, 8, 10, 1),  // offices
        (18, 21, 20, 22, 2), // row house
    ];
    for &(x0, x1, y0, y1, id) in &footprints {
        for x in x0..x1 {
            for y in y0..y1 {
                ids[(x * BOUNDS.y + y) as usize] = id;
            }
        }
    }

    // Records: floor count, base level, flats count, host-private field.
    let table = BuildingTable::new(
        4,
        vec![
            12, 1, 48, 0, // tower: 12 floors, residential
            4, 2, 0, 0, // offices: non-residential
            6, 2, 18, 0, // row house: 6 floors, residential
        ],
    )?;
    WorldModel::new(BOUNDS, ground, ids, table)
}

/// Footprint cells of one building, for interior buffers.
fn footprint(x0: u32, x1: u32, y0: u32, y1: u32) -> Vec<UVec2> {
    let mut cells = Vec::new();
    for x in x0..x1 {
        for y in y0..y1 {
            cells.push(UVec2::new(x, y));
        }
    }
    cells
}

/// A street row at fixed y, skipping building footprints.
fn street_row(world: &WorldModel, y: u32) -> Result<Vec<UVec2>> {
    let mut cells = Vec::new();
    for x in 0..BOUNDS.x {
        let cell = UVec2::new(x, y);
        if world.building_at(cell)?.is_none() {
            cells.push(cell);
        }
    }
    Ok(cells)
}

fn main() -> Result<()> {
    logging::init();

    let world = build_world()?;
    log::info!(
        "World ready: {}x{} cells, {} buildings",
        world.bounds().x,
        world.bounds().y,
        world.buildings().len()
    );

    let config = BatchConfig {
        occlusion: OcclusionParams {
            step_length: 1.0,
            near_distance_threshold: 12.0,
            occlusion_enabled: true,
            ground_mode: GroundMode::PerColumn,
        },
        standalone_source_height_offset: 2,
    };

    // Megaphone 0 stands in the street, megaphone 1 on the office block.
    let groups = vec![
        SourceGroup {
            id: 0,
            cells: vec![UVec2::new(4, 11)],
        },
        SourceGroup {
            id: 1,
            cells: vec![UVec2::new(21, 9), UVec2::new(23, 9)],
        },
    ];
    let buffers = vec![
        DestinationBuffers {
            interior: footprint(10, 12, 10, 12),
            exterior: street_row(&world, 11)?,
        },
        DestinationBuffers {
            interior: footprint(18, 21, 20, 22),
            exterior: street_row(&world, 15)?,
        },
    ];

    let squares = SquareCache::new(world.bounds());
    let voxels = VoxelCache::from_world(&world)?;
    let counters = RunCounters::new(groups.len());

    process_groups(
        &world, &config, &groups, &buffers, &squares, &voxels, &counters,
    )?;

    log::info!(
        "Run complete: {} audible squares, {} audible floor voxels",
        squares.audible_count(),
        voxels.audible_count()
    );
    println!("{}", counters.snapshot().to_json()?);
    Ok(())
}
