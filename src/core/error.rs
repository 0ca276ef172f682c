//! Error types for the audibility engine

use thiserror::Error;

/// Main error type for the engine
///
/// Every variant reflects a contract violation by the caller (malformed
/// world data or out-of-range coordinates), never a transient condition,
/// so there are no retry semantics anywhere in the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cell ({x}, {y}) outside world bounds {bounds_x}x{bounds_y}")]
    CellOutOfBounds {
        x: i64,
        y: i64,
        bounds_x: u32,
        bounds_y: u32,
    },

    #[error("building {0} outside the building table")]
    UnknownBuilding(u32),

    #[error("no building at cell ({x}, {y})")]
    MissingBuilding { x: u32, y: u32 },

    #[error("no voxel cache slots for cell ({x}, {y})")]
    MissingVoxelSlot { x: u32, y: u32 },

    #[error("floor {floor} outside the voxel cache for cell ({x}, {y})")]
    FloorOutOfRange { x: u32, y: u32, floor: u16 },

    #[error("step length must be positive, got {0}")]
    InvalidStepLength(f32),

    #[error("malformed world data: {0}")]
    MalformedWorld(String),

    #[error("malformed group buffers: {0}")]
    MalformedBuffers(String),

    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}
