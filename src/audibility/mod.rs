//! Audibility computation: cached states, occlusion test, batch driver

pub mod batch;
pub mod cache;
pub mod counters;
pub mod occlusion;
pub mod state;

pub use batch::{
    process_groups, BatchConfig, DestinationBuffers, SourceBatchProcessor, SourceGroup,
};
pub use cache::{SquareCache, VoxelCache};
pub use counters::{CountersSnapshot, RunCounters};
pub use occlusion::{check_audibility, OcclusionParams};
pub use state::AudibilityState;
