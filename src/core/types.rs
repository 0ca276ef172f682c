//! Core type aliases and re-exports

pub use glam::{IVec3, UVec2, Vec3};

/// Building identifier ("UIB" in the source data). The building-id grid
/// stores `-1` for cells without a building; resolved ids are always
/// non-negative.
pub type BuildingId = u32;

/// Standard Result type for the audibility engine
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
