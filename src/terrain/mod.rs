//! Procedural heightmap synthesis

pub mod noise_field;
pub use noise_field::{NoiseField, NoiseParams};

pub mod distance;
pub use distance::DistanceKind;

pub mod heightmap;
pub use heightmap::{generate_heightmap, Heightmap, FLOOR};

pub mod pipeline;
pub use pipeline::{HeightmapParams, HeightmapPipeline, IslandHeightmaps};
