//! Urbanmegaphone - 3D modeling of sound coverage among urban buildings and streets
//!
//! The world is a voxelized city: a ground heightmap, a building-id grid
//! and a fixed-stride building attribute table. Megaphones (source
//! groups) are tested against their assigned destination samples —
//! residential building floors and open street squares — with a
//! geometric line-of-sight ray march. Results are cached per destination
//! and merged monotonically across all sources over one run.

pub mod audibility;
pub mod core;
pub mod interop;
pub mod world;
