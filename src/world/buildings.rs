//! Building attribute table and ground-mode policy

use crate::core::error::Error;
use crate::core::{BuildingId, Result};

/// Offset of the floor-count field inside one building record.
pub const FIELD_FLOOR_COUNT: usize = 0;
/// Offset of the shared base-level field inside one building record.
pub const FIELD_BASE_LEVEL: usize = 1;
/// Offset of the flats-count field inside one building record.
pub const FIELD_FLATS_COUNT: usize = 2;

/// Smallest record stride that still carries every field the engine reads.
pub const MIN_BUILDING_STRIDE: usize = 3;

/// Policy selecting how a building footprint is anchored to the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundMode {
    /// Each footprint column sits on its own local terrain elevation.
    PerColumn,
    /// Every column of a footprint shares the building's base level.
    SharedBase,
}

impl GroundMode {
    /// Decode the host's scalar: 0 is per-column, any positive value shared.
    pub fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            GroundMode::PerColumn
        } else {
            GroundMode::SharedBase
        }
    }
}

/// Fixed-stride building attribute records, indexed by building id.
///
/// The stride is configurable so hosts can append fields the engine does
/// not read; the leading three fields are fixed (floor count, base
/// level, flats count). A flats count above zero marks a residential
/// building whose floors are individually sampled.
#[derive(Clone, Debug)]
pub struct BuildingTable {
    stride: usize,
    records: Vec<u16>,
}

impl BuildingTable {
    /// Wrap a flat record array. The array length must be a whole number
    /// of records.
    pub fn new(stride: usize, records: Vec<u16>) -> Result<Self> {
        if stride < MIN_BUILDING_STRIDE {
            return Err(Error::MalformedWorld(format!(
                "building record stride {stride} below minimum {MIN_BUILDING_STRIDE}"
            )));
        }
        if records.len() % stride != 0 {
            return Err(Error::MalformedWorld(format!(
                "building table length {} is not a multiple of stride {stride}",
                records.len()
            )));
        }
        Ok(Self { stride, records })
    }

    /// Number of buildings in the table.
    pub fn len(&self) -> usize {
        self.records.len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn field(&self, id: BuildingId, offset: usize) -> Result<u16> {
        let base = id as usize * self.stride;
        self.records
            .get(base + offset)
            .copied()
            .ok_or(Error::UnknownBuilding(id))
    }

    /// Number of floors (occupied vertical levels) of the building.
    pub fn floor_count(&self, id: BuildingId) -> Result<u16> {
        self.field(id, FIELD_FLOOR_COUNT)
    }

    /// Shared base level of the building, used in [`GroundMode::SharedBase`].
    pub fn base_level(&self, id: BuildingId) -> Result<u16> {
        self.field(id, FIELD_BASE_LEVEL)
    }

    /// Number of flats. Above zero the building is residential and its
    /// floors are sampled individually.
    pub fn flats_count(&self, id: BuildingId) -> Result<u16> {
        self.field(id, FIELD_FLATS_COUNT)
    }

    pub fn is_residential(&self, id: BuildingId) -> Result<bool> {
        Ok(self.flats_count(id)? > 0)
    }
}
