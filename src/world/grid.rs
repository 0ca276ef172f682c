//! World grids: ground elevation and building id per cell

use glam::UVec2;

use super::buildings::{BuildingTable, GroundMode};
use crate::core::error::Error;
use crate::core::{BuildingId, Result};

/// Static world grids plus the building attribute table.
///
/// Grids are flat row-major arrays (`x * bounds.y + y`), the layout the
/// host hands over. All accessors bounds-check; an out-of-range cell is
/// a caller contract violation, not a recoverable condition.
pub struct WorldModel {
    bounds: UVec2,
    ground: Vec<i16>,
    building_ids: Vec<i64>,
    buildings: BuildingTable,
}

impl WorldModel {
    /// Assemble a world from host arrays, validating that every per-cell
    /// array matches the grid dimensions.
    pub fn new(
        bounds: UVec2,
        ground: Vec<i16>,
        building_ids: Vec<i64>,
        buildings: BuildingTable,
    ) -> Result<Self> {
        let cells = bounds.x as usize * bounds.y as usize;
        if ground.len() != cells {
            return Err(Error::MalformedWorld(format!(
                "ground array holds {} cells, bounds {}x{} require {cells}",
                ground.len(),
                bounds.x,
                bounds.y
            )));
        }
        if building_ids.len() != cells {
            return Err(Error::MalformedWorld(format!(
                "building-id array holds {} cells, bounds {}x{} require {cells}",
                building_ids.len(),
                bounds.x,
                bounds.y
            )));
        }
        Ok(Self {
            bounds,
            ground,
            building_ids,
            buildings,
        })
    }

    pub fn bounds(&self) -> UVec2 {
        self.bounds
    }

    pub fn buildings(&self) -> &BuildingTable {
        &self.buildings
    }

    fn cell_index(&self, cell: UVec2) -> Result<usize> {
        if cell.x >= self.bounds.x || cell.y >= self.bounds.y {
            return Err(Error::CellOutOfBounds {
                x: cell.x as i64,
                y: cell.y as i64,
                bounds_x: self.bounds.x,
                bounds_y: self.bounds.y,
            });
        }
        Ok(cell.x as usize * self.bounds.y as usize + cell.y as usize)
    }

    /// Ground elevation of a cell. Elevations may be negative.
    pub fn ground_at(&self, cell: UVec2) -> Result<i16> {
        Ok(self.ground[self.cell_index(cell)?])
    }

    /// Building id at a cell, `None` where the grid holds the -1 sentinel.
    pub fn building_at(&self, cell: UVec2) -> Result<Option<BuildingId>> {
        let raw = self.building_ids[self.cell_index(cell)?];
        if raw < 0 {
            return Ok(None);
        }
        let id = BuildingId::try_from(raw).map_err(|_| {
            Error::MalformedWorld(format!(
                "building id {raw} at cell ({}, {}) out of range",
                cell.x, cell.y
            ))
        })?;
        Ok(Some(id))
    }

    /// Vertical coordinate of the first occupied voxel of a building
    /// footprint at this cell.
    ///
    /// [`GroundMode::SharedBase`] reads the building's base-level field,
    /// so every column of the footprint shares one elevation;
    /// [`GroundMode::PerColumn`] anchors each column to its own terrain
    /// elevation. Only call for cells that actually hold the building.
    pub fn first_building_voxel(
        &self,
        cell: UVec2,
        id: BuildingId,
        mode: GroundMode,
    ) -> Result<i32> {
        match mode {
            GroundMode::SharedBase => Ok(self.buildings.base_level(id)? as i32),
            GroundMode::PerColumn => Ok(self.ground_at(cell)? as i32),
        }
    }

    /// First vertical level above the building's roof at this cell.
    pub fn roof_level(&self, cell: UVec2, id: BuildingId, mode: GroundMode) -> Result<i32> {
        Ok(self.first_building_voxel(cell, id, mode)? + self.buildings.floor_count(id)? as i32)
    }
}
