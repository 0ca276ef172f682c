//! Line-of-sight occlusion test between a source and a destination voxel

use glam::{IVec3, UVec2};

use super::state::AudibilityState;
use crate::core::error::Error;
use crate::core::{BuildingId, Result};
use crate::world::{GroundMode, WorldModel};

/// Geometry and policy parameters shared by every check of one run.
#[derive(Clone, Copy, Debug)]
pub struct OcclusionParams {
    /// March step along the segment, measured in voxels of the dominant
    /// axis. Larger steps are cheaper but may miss thin obstacles.
    pub step_length: f32,
    /// Distances at or below this classify as [`AudibilityState::AudibleNear`].
    pub near_distance_threshold: f32,
    /// When false, every check degenerates to the pure distance
    /// classification with no geometric test.
    pub occlusion_enabled: bool,
    /// How building footprints are anchored to the terrain.
    pub ground_mode: GroundMode,
}

impl OcclusionParams {
    /// Reject parameters that would produce a non-finite march step.
    pub fn validate(&self) -> Result<()> {
        if !(self.step_length > 0.0) {
            return Err(Error::InvalidStepLength(self.step_length));
        }
        Ok(())
    }
}

/// Check whether `dst` can hear a source at `src`, merging the outcome
/// with the destination's previously cached state.
///
/// The returned state never ranks below `previous` in the merge order:
/// an already audible destination keeps its classification when this
/// source turns out occluded or too far, and an `AudibleNear` cache
/// entry short-circuits the whole test. `dst_building` / `src_building`
/// are the building ids under the respective voxels, `None` for open
/// cells.
///
/// The geometric test marches the segment in `step_length`-voxel
/// increments along the dominant axis, so a sufficiently thin diagonal
/// gap between obstacles can be missed; that sampling trade-off is
/// intentional and bounds the cost to O(max_axis / step_length).
pub fn check_audibility(
    world: &WorldModel,
    params: &OcclusionParams,
    dst: IVec3,
    dst_building: Option<BuildingId>,
    src: IVec3,
    src_building: Option<BuildingId>,
    previous: AudibilityState,
) -> Result<AudibilityState> {
    // Best possible result is already cached; nothing to recompute.
    if previous == AudibilityState::AudibleNear {
        return Ok(previous);
    }

    let delta = dst - src;
    let distance = delta.as_vec3().length();
    let target = if distance <= params.near_distance_threshold {
        AudibilityState::AudibleNear
    } else {
        AudibilityState::AudibleFar
    };

    // A source beyond the near threshold cannot improve an already
    // audible destination, so the geometric test is skipped entirely.
    if target == AudibilityState::AudibleFar && previous.is_audible() {
        return Ok(previous);
    }

    // Coincident voxels are trivially audible.
    if distance == 0.0 {
        return Ok(AudibilityState::AudibleNear);
    }

    if !params.occlusion_enabled {
        return Ok(target);
    }

    // Source and destination inside the same building hear each other.
    if src_building.is_some() && src_building == dst_building {
        return Ok(target);
    }

    params.validate()?;

    // March the segment; distance > 0 guarantees max_axis >= 1.
    let max_axis = delta.abs().max_element();
    let step = params.step_length / max_axis as f32;
    let start = src.as_vec3();
    let span = delta.as_vec3();

    let mut t = 0.0f32;
    while t <= 1.0 {
        let probe = (start + span * t).round().as_ivec3();
        let cell = probe_cell(world, probe)?;
        match world.building_at(cell)? {
            // An extraneous building occludes unless the ray clears its roof.
            Some(id) if Some(id) != src_building && Some(id) != dst_building => {
                if probe.z < world.roof_level(cell, id, params.ground_mode)? {
                    return Ok(occluded(previous));
                }
            }
            // Open terrain; one voxel of tolerance smooths surface steps.
            None => {
                if probe.z < world.ground_at(cell)? as i32 - 1 {
                    return Ok(occluded(previous));
                }
            }
            Some(_) => {}
        }
        t += step;
    }

    Ok(target)
}

/// Grid cell under a marched voxel, rejecting coordinates the grid
/// cannot hold.
fn probe_cell(world: &WorldModel, probe: IVec3) -> Result<UVec2> {
    let bounds = world.bounds();
    if probe.x < 0 || probe.y < 0 || probe.x as u32 >= bounds.x || probe.y as u32 >= bounds.y {
        return Err(Error::CellOutOfBounds {
            x: probe.x as i64,
            y: probe.y as i64,
            bounds_x: bounds.x,
            bounds_y: bounds.y,
        });
    }
    Ok(UVec2::new(probe.x as u32, probe.y as u32))
}

/// Occlusion never downgrades a destination that was already audible.
fn occluded(previous: AudibilityState) -> AudibilityState {
    if previous.is_audible() {
        previous
    } else {
        AudibilityState::NotAudible
    }
}
