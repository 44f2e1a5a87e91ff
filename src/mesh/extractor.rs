//! Isosurface extraction over a whole voxel field.
//!
//! Cells are swept in X slabs on the rayon pool. Each slab builds its own
//! mesh and slabs are concatenated in X order, so the result matches a
//! sequential `x, y, z` sweep exactly.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::mesh::Mesh;
use super::polygonizer::{Cell, CellSink, MarchingCubes, MarchingTetrahedra, Polygonizer};
use crate::core::error::Error;
use crate::core::types::Vec3;
use crate::voxel::VoxelField;

/// Density separating empty (0) from solid (1)
pub const ISO_LEVEL: f32 = 0.5;

/// Cell triangulation strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    #[default]
    Cubes,
    Tetrahedron,
}

impl ExtractionMode {
    pub fn polygonizer(self) -> &'static dyn Polygonizer {
        match self {
            ExtractionMode::Cubes => &MarchingCubes,
            ExtractionMode::Tetrahedron => &MarchingTetrahedra,
        }
    }
}

impl std::str::FromStr for ExtractionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cubes" => Ok(ExtractionMode::Cubes),
            "tetrahedron" | "tetrahedra" => Ok(ExtractionMode::Tetrahedron),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown extraction mode '{}', expected cubes or tetrahedron",
                other
            ))),
        }
    }
}

/// Turns a voxel field into a recentered triangle mesh.
#[derive(Clone, Debug)]
pub struct IsosurfaceExtractor {
    mode: ExtractionMode,
    iso_level: f32,
    smooth_normals: bool,
}

impl Default for IsosurfaceExtractor {
    fn default() -> Self {
        Self::new(ExtractionMode::default())
    }
}

impl IsosurfaceExtractor {
    pub fn new(mode: ExtractionMode) -> Self {
        Self {
            mode,
            iso_level: ISO_LEVEL,
            smooth_normals: false,
        }
    }

    /// Sample per-vertex normals from the field gradient
    pub fn with_smooth_normals(mut self, smooth: bool) -> Self {
        self.smooth_normals = smooth;
        self
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn smooth_normals(&self) -> bool {
        self.smooth_normals
    }

    /// Extract the iso-surface of `field`.
    ///
    /// Fields with no surface (all empty, all solid, or thinner than two
    /// cells on an axis) give an empty mesh.
    pub fn extract(&self, field: &VoxelField) -> Mesh {
        let mut mesh = self.march(field);

        if self.smooth_normals && !mesh.positions.is_empty() {
            let normals = gradient_normals(field, &mesh.positions);
            mesh.set_normals(normals);
        }
        mesh.recenter();

        log::debug!(
            "Extracted {:?} mesh: {} vertices, {} triangles",
            self.mode,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        mesh
    }

    fn march(&self, field: &VoxelField) -> Mesh {
        let (width, height, depth) = field.dims();
        if width < 2 || height < 2 || depth < 2 {
            return Mesh::new();
        }

        let polygonizer = self.mode.polygonizer();
        let iso = self.iso_level;
        let slabs: Vec<Mesh> = (0..width - 1)
            .into_par_iter()
            .map(|x| {
                let mut slab = Mesh::new();
                for y in 0..height - 1 {
                    for z in 0..depth - 1 {
                        let cell = Cell::gather(field, x, y, z);
                        let mut sink = CellSink::new(&cell, iso, &mut slab);
                        polygonizer.polygonize(&cell, iso, &mut sink);
                    }
                }
                slab
            })
            .collect();

        let mut mesh = Mesh::new();
        for slab in slabs {
            mesh.append(slab);
        }
        mesh
    }
}

/// Field normal at each lattice-space position
fn gradient_normals(field: &VoxelField, positions: &[Vec3]) -> Vec<Vec3> {
    let (width, height, depth) = field.dims();
    let scale = Vec3::new(
        1.0 / (width as f32 - 1.0),
        1.0 / (height as f32 - 1.0),
        1.0 / (depth as f32 - 1.0),
    );
    positions
        .par_iter()
        .map(|p| {
            let uvw = *p * scale;
            field.normal(uvw.x, uvw.y, uvw.z)
        })
        .collect()
}
