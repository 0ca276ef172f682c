//! Concurrent destination-state caches with merge-to-maximum updates
//!
//! Source groups run in parallel and may race on shared destinations, so
//! every store is a compare-and-swap to the lattice maximum of the old
//! and proposed state. A completed check can therefore never erase a
//! better result written by another worker.

use std::sync::atomic::{AtomicI8, Ordering};

use glam::UVec2;

use super::state::AudibilityState;
use crate::core::error::Error;
use crate::core::Result;
use crate::world::WorldModel;

/// CAS loop keeping the slot at the lattice maximum of stored and
/// proposed. Returns the state left in the slot.
fn merge_slot(slot: &AtomicI8, proposed: AudibilityState) -> AudibilityState {
    let mut current = AudibilityState::from_raw(slot.load(Ordering::Acquire));
    loop {
        let merged = current.merge(proposed);
        if merged == current {
            return current;
        }
        match slot.compare_exchange_weak(
            current.raw(),
            merged.raw(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => return merged,
            Err(seen) => current = AudibilityState::from_raw(seen),
        }
    }
}

fn unknown_slots(count: usize) -> Vec<AtomicI8> {
    (0..count)
        .map(|_| AtomicI8::new(AudibilityState::Unknown.raw()))
        .collect()
}

/// Street-level audibility, one state per grid cell.
pub struct SquareCache {
    bounds: UVec2,
    states: Vec<AtomicI8>,
}

impl SquareCache {
    /// All cells start at [`AudibilityState::Unknown`].
    pub fn new(bounds: UVec2) -> Self {
        let cells = bounds.x as usize * bounds.y as usize;
        Self {
            bounds,
            states: unknown_slots(cells),
        }
    }

    fn index(&self, cell: UVec2) -> Result<usize> {
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

    pub fn get(&self, cell: UVec2) -> Result<AudibilityState> {
        Ok(AudibilityState::from_raw(
            self.states[self.index(cell)?].load(Ordering::Acquire),
        ))
    }

    /// Merge a computed state into the cell, keeping the higher-ranked of
    /// stored and proposed. Returns the state left in the cache.
    pub fn merge_max(&self, cell: UVec2, state: AudibilityState) -> Result<AudibilityState> {
        Ok(merge_slot(&self.states[self.index(cell)?], state))
    }

    /// Number of cells currently classified audible. Observational.
    pub fn audible_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| AudibilityState::from_raw(s.load(Ordering::Acquire)).is_audible())
            .count()
    }
}

/// Per-floor audibility for building cells.
///
/// A flat store of states plus a row-major index of per-cell base
/// offsets (`-1` = no slots); each footprint cell owns `floor_count`
/// consecutive slots.
pub struct VoxelCache {
    bounds: UVec2,
    index: Vec<i64>,
    states: Vec<AtomicI8>,
}

impl VoxelCache {
    /// Derive the index from the world: every cell holding a building
    /// with at least one floor gets one slot per floor.
    pub fn from_world(world: &WorldModel) -> Result<Self> {
        let bounds = world.bounds();
        let mut index = vec![-1i64; bounds.x as usize * bounds.y as usize];
        let mut next = 0usize;
        for x in 0..bounds.x {
            for y in 0..bounds.y {
                let cell = UVec2::new(x, y);
                if let Some(id) = world.building_at(cell)? {
                    let floors = world.buildings().floor_count(id)? as usize;
                    if floors > 0 {
                        index[x as usize * bounds.y as usize + y as usize] = next as i64;
                        next += floors;
                    }
                }
            }
        }
        Ok(Self {
            bounds,
            index,
            states: unknown_slots(next),
        })
    }

    /// Rebuild from the host's flat layout: the per-cell offset index and
    /// the total slot count.
    pub fn from_raw_parts(bounds: UVec2, index: Vec<i64>, slots: usize) -> Result<Self> {
        let cells = bounds.x as usize * bounds.y as usize;
        if index.len() != cells {
            return Err(Error::MalformedWorld(format!(
                "voxel index holds {} cells, bounds {}x{} require {cells}",
                index.len(),
                bounds.x,
                bounds.y
            )));
        }
        if let Some(&bad) = index.iter().find(|&&e| e != -1 && !(0..slots as i64).contains(&e)) {
            return Err(Error::MalformedWorld(format!(
                "voxel index entry {bad} outside state store of {slots} slots"
            )));
        }
        Ok(Self {
            bounds,
            index,
            states: unknown_slots(slots),
        })
    }

    /// Total number of per-floor slots.
    pub fn slot_count(&self) -> usize {
        self.states.len()
    }

    fn base_offset(&self, cell: UVec2) -> Result<usize> {
        if cell.x >= self.bounds.x || cell.y >= self.bounds.y {
            return Err(Error::CellOutOfBounds {
                x: cell.x as i64,
                y: cell.y as i64,
                bounds_x: self.bounds.x,
                bounds_y: self.bounds.y,
            });
        }
        let entry = self.index[cell.x as usize * self.bounds.y as usize + cell.y as usize];
        if entry < 0 {
            return Err(Error::MissingVoxelSlot {
                x: cell.x,
                y: cell.y,
            });
        }
        Ok(entry as usize)
    }

    fn slot(&self, cell: UVec2, floor: u16) -> Result<&AtomicI8> {
        let offset = self.base_offset(cell)? + floor as usize;
        self.states.get(offset).ok_or(Error::FloorOutOfRange {
            x: cell.x,
            y: cell.y,
            floor,
        })
    }

    pub fn get(&self, cell: UVec2, floor: u16) -> Result<AudibilityState> {
        Ok(AudibilityState::from_raw(
            self.slot(cell, floor)?.load(Ordering::Acquire),
        ))
    }

    /// Merge a computed state into one floor slot, keeping the
    /// higher-ranked of stored and proposed.
    pub fn merge_max(
        &self,
        cell: UVec2,
        floor: u16,
        state: AudibilityState,
    ) -> Result<AudibilityState> {
        Ok(merge_slot(self.slot(cell, floor)?, state))
    }

    /// Number of floor slots currently classified audible. Observational.
    pub fn audible_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| AudibilityState::from_raw(s.load(Ordering::Acquire)).is_audible())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::BuildingTable;
    use AudibilityState::*;

    #[test]
    fn square_cache_merges_to_maximum() {
        let cache = SquareCache::new(UVec2::new(4, 4));
        let cell = UVec2::new(1, 2);
        assert_eq!(cache.get(cell).unwrap(), Unknown);
        assert_eq!(cache.merge_max(cell, NotAudible).unwrap(), NotAudible);
        assert_eq!(cache.merge_max(cell, AudibleFar).unwrap(), AudibleFar);
        // A worse result never overwrites a better one.
        assert_eq!(cache.merge_max(cell, NotAudible).unwrap(), AudibleFar);
        assert_eq!(cache.merge_max(cell, AudibleNear).unwrap(), AudibleNear);
        assert_eq!(cache.audible_count(), 1);
    }

    #[test]
    fn square_cache_rejects_foreign_cells() {
        let cache = SquareCache::new(UVec2::new(4, 4));
        assert!(cache.get(UVec2::new(4, 0)).is_err());
    }

    #[test]
    fn voxel_cache_from_world_sizes_by_floor_count() {
        // Two footprint cells of a 5-floor building, one of a 2-floor one.
        let bounds = UVec2::new(3, 1);
        let ids = vec![0i64, 0, 1];
        let table = BuildingTable::new(3, vec![5, 0, 10, 2, 0, 0]).unwrap();
        let world = WorldModel::new(bounds, vec![0; 3], ids, table).unwrap();
        let cache = VoxelCache::from_world(&world).unwrap();
        assert_eq!(cache.slot_count(), 12);
        assert_eq!(cache.get(UVec2::new(2, 0), 1).unwrap(), Unknown);
        assert!(matches!(
            cache.get(UVec2::new(2, 0), 2),
            Err(Error::FloorOutOfRange { floor: 2, .. })
        ));
    }

    #[test]
    fn voxel_cache_merges_per_floor() {
        let bounds = UVec2::new(2, 1);
        let ids = vec![0i64, -1];
        let table = BuildingTable::new(3, vec![3, 0, 6]).unwrap();
        let world = WorldModel::new(bounds, vec![0; 2], ids, table).unwrap();
        let cache = VoxelCache::from_world(&world).unwrap();
        let cell = UVec2::new(0, 0);
        cache.merge_max(cell, 0, NotAudible).unwrap();
        cache.merge_max(cell, 2, AudibleNear).unwrap();
        assert_eq!(cache.get(cell, 0).unwrap(), NotAudible);
        assert_eq!(cache.get(cell, 1).unwrap(), Unknown);
        assert_eq!(cache.get(cell, 2).unwrap(), AudibleNear);
        assert!(matches!(
            cache.get(UVec2::new(1, 0), 0),
            Err(Error::MissingVoxelSlot { x: 1, y: 0 })
        ));
    }

    #[test]
    fn from_raw_parts_validates_offsets() {
        let bounds = UVec2::new(2, 1);
        assert!(VoxelCache::from_raw_parts(bounds, vec![0, 12], 4).is_err());
        assert!(VoxelCache::from_raw_parts(bounds, vec![0], 4).is_err());
        let ok = VoxelCache::from_raw_parts(bounds, vec![0, -1], 4).unwrap();
        assert_eq!(ok.slot_count(), 4);
    }

    #[test]
    fn concurrent_merges_stay_monotone() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(SquareCache::new(UVec2::new(1, 1)));
        let cell = UVec2::new(0, 0);
        let mut handles = Vec::new();
        for state in [NotAudible, AudibleFar, AudibleNear, NotAudible] {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    cache.merge_max(cell, state).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.get(cell).unwrap(), AudibleNear);
    }
}
