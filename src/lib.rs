//! Flylands - procedural floating-island terrain
//!
//! Heightmaps are shaped into a top and bottom surface, rasterized into a
//! dense voxel field, and turned into a triangle mesh by isosurface
//! extraction. Single voxels can be dug out and the field remeshed.

pub mod core;
pub mod math;
pub mod terrain;
pub mod voxel;
pub mod mesh;
pub mod generation;
