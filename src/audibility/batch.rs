//! Per-megaphone batch driver
//!
//! A megaphone is a source group: one id emitting from one or more
//! cells. Each group owns two destination buffers — interior cells
//! sampled per residential floor and exterior cells sampled once at
//! street level. Groups are independent of each other except through the
//! shared caches and counters, which makes them embarrassingly parallel.

use glam::{IVec3, UVec2};
use rayon::prelude::*;

use super::cache::{SquareCache, VoxelCache};
use super::counters::RunCounters;
use super::occlusion::{check_audibility, OcclusionParams};
use super::state::AudibilityState;
use crate::core::error::Error;
use crate::core::{BuildingId, Result};
use crate::world::WorldModel;

/// One megaphone: an id and the cells it emits from.
#[derive(Clone, Debug)]
pub struct SourceGroup {
    pub id: u32,
    pub cells: Vec<UVec2>,
}

/// Destination samples assigned to one megaphone.
#[derive(Clone, Debug, Default)]
pub struct DestinationBuffers {
    /// Cells of nearby residential buildings, tested once per floor.
    pub interior: Vec<UVec2>,
    /// Open street cells, tested once at ground level.
    pub exterior: Vec<UVec2>,
}

/// Run-wide configuration for the batch driver.
#[derive(Clone, Copy, Debug)]
pub struct BatchConfig {
    pub occlusion: OcclusionParams,
    /// Mounting height above ground for megaphones not placed on a
    /// building.
    pub standalone_source_height_offset: i32,
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        self.occlusion.validate()
    }
}

/// Applies the occlusion test across one megaphone's destination buffers,
/// merging results into the shared caches.
pub struct SourceBatchProcessor<'a> {
    world: &'a WorldModel,
    config: &'a BatchConfig,
    squares: &'a SquareCache,
    voxels: &'a VoxelCache,
    counters: &'a RunCounters,
}

impl<'a> SourceBatchProcessor<'a> {
    pub fn new(
        world: &'a WorldModel,
        config: &'a BatchConfig,
        squares: &'a SquareCache,
        voxels: &'a VoxelCache,
        counters: &'a RunCounters,
    ) -> Self {
        Self {
            world,
            config,
            squares,
            voxels,
            counters,
        }
    }

    /// Voxel a megaphone emits from at this cell, plus the building under
    /// it. A megaphone on a building sits at the building's lowest
    /// occupied level; a ground-based one at the configured mounting
    /// height above the terrain.
    fn source_voxel(&self, cell: UVec2) -> Result<(IVec3, Option<BuildingId>)> {
        let building = self.world.building_at(cell)?;
        let z = match building {
            None => {
                self.world.ground_at(cell)? as i32 + self.config.standalone_source_height_offset
            }
            Some(id) => {
                self.world
                    .first_building_voxel(cell, id, self.config.occlusion.ground_mode)?
            }
        };
        Ok((IVec3::new(cell.x as i32, cell.y as i32, z), building))
    }

    /// Test every floor of a residential destination cell. Returns the
    /// number of floors left audible.
    fn check_interior_cell(
        &self,
        cell: UVec2,
        src: IVec3,
        src_building: Option<BuildingId>,
    ) -> Result<u64> {
        let id = self
            .world
            .building_at(cell)?
            .ok_or(Error::MissingBuilding {
                x: cell.x,
                y: cell.y,
            })?;
        // Only residential buildings are sampled per floor.
        if !self.world.buildings().is_residential(id)? {
            return Ok(0);
        }
        let base = self
            .world
            .first_building_voxel(cell, id, self.config.occlusion.ground_mode)?;
        let mut audible = 0u64;
        for floor in 0..self.world.buildings().floor_count(id)? {
            let previous = self.voxels.get(cell, floor)?;
            let dst = IVec3::new(cell.x as i32, cell.y as i32, base + floor as i32);
            let result = check_audibility(
                self.world,
                &self.config.occlusion,
                dst,
                Some(id),
                src,
                src_building,
                previous,
            )?;
            self.voxels.merge_max(cell, floor, result)?;
            self.counters.record_voxel(result);
            if result.is_audible() {
                audible += 1;
            }
        }
        Ok(audible)
    }

    /// Test one street square. The cell is treated as open space even
    /// when a building footprint covers it.
    fn check_exterior_cell(
        &self,
        cell: UVec2,
        src: IVec3,
        src_building: Option<BuildingId>,
    ) -> Result<AudibilityState> {
        let z = self.world.ground_at(cell)? as i32;
        let previous = self.squares.get(cell)?;
        let dst = IVec3::new(cell.x as i32, cell.y as i32, z);
        let result = check_audibility(
            self.world,
            &self.config.occlusion,
            dst,
            None,
            src,
            src_building,
            previous,
        )?;
        self.squares.merge_max(cell, result)?;
        self.counters.record_square(result);
        Ok(result)
    }

    /// Run every source cell of the group against both destination
    /// buffers. Side effects are confined to cache entries for cells in
    /// this group's buffers and the shared counters.
    pub fn process_group(&self, group: &SourceGroup, buffers: &DestinationBuffers) -> Result<()> {
        log::info!("Start calculation for megaphone #{}", group.id);
        let mut audible_found = 0u64;
        for &source in &group.cells {
            let (src, src_building) = self.source_voxel(source)?;
            for &cell in &buffers.interior {
                audible_found += self.check_interior_cell(cell, src, src_building)?;
            }
            for &cell in &buffers.exterior {
                if self.check_exterior_cell(cell, src, src_building)?.is_audible() {
                    audible_found += 1;
                }
            }
            self.counters.add_group_total(
                group.id,
                (buffers.interior.len() + buffers.exterior.len()) as u64,
            );
        }
        log::info!(
            "Finish calculation for megaphone #{}: {} audible samples found",
            group.id,
            audible_found
        );
        Ok(())
    }
}

/// Process all groups, in parallel, against their destination buffers.
///
/// `buffers[i]` belongs to `groups[i]`. The caches merge atomically per
/// destination, so the converged result does not depend on group order
/// or interleaving; intermediate cache reads taken before every group
/// has finished may differ between runs because the far-source shortcut
/// inside the occlusion test trusts previously cached audible states.
pub fn process_groups(
    world: &WorldModel,
    config: &BatchConfig,
    groups: &[SourceGroup],
    buffers: &[DestinationBuffers],
    squares: &SquareCache,
    voxels: &VoxelCache,
    counters: &RunCounters,
) -> Result<()> {
    config.validate()?;
    if groups.len() != buffers.len() {
        return Err(Error::MalformedBuffers(format!(
            "{} groups but {} destination buffer sets",
            groups.len(),
            buffers.len()
        )));
    }
    let processor = SourceBatchProcessor::new(world, config, squares, voxels, counters);
    groups
        .par_iter()
        .zip(buffers.par_iter())
        .try_for_each(|(group, bufs)| processor.process_group(group, bufs))
}
