//! Isosurface extraction: voxel field to triangle mesh

pub mod tables;
pub mod mesh;
pub mod polygonizer;
pub mod extractor;

pub use mesh::Mesh;
pub use polygonizer::{Cell, CellSink, MarchingCubes, MarchingTetrahedra, Polygonizer};
pub use extractor::{ExtractionMode, IsosurfaceExtractor, ISO_LEVEL};
