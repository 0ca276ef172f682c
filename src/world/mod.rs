//! Static world model: terrain heightmap, building footprints and attributes
//!
//! Read-only for the lifetime of a run; every audibility computation
//! borrows it immutably.

pub mod buildings;
pub mod grid;

pub use buildings::{BuildingTable, GroundMode};
pub use grid::WorldModel;
