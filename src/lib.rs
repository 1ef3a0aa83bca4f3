//! Droplet-based hydraulic erosion for procedural heightmaps
//!
//! Re-exports modules for use by binaries and tools.

pub mod erosion;
pub mod export;
pub mod heightmap;
pub mod seeds;
pub mod tilemap;
