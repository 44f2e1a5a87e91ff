//! Island generation pipeline: heightmaps -> voxel field -> mesh.
//!
//! The pipeline runs:
//! 1. Heightmap synthesis (base noise, then top and bottom surfaces)
//! 2. Voxel field construction between the two surfaces
//! 3. Isosurface extraction and recentering
//!
//! An [`Island`] keeps the field and its mesh together so edits can be
//! followed by a full remesh.

pub mod config;

pub use config::IslandConfig;

use std::time::Instant;

use crate::core::types::{Result, Vec3};
use crate::math::Aabb;
use crate::mesh::{IsosurfaceExtractor, Mesh};
use crate::terrain::HeightmapPipeline;
use crate::voxel::{build_voxel_field, editor, VoxelField};

/// A generated island: voxel field, its current mesh, and the settings used.
#[derive(Clone, Debug)]
pub struct Island {
    config: IslandConfig,
    field: VoxelField,
    mesh: Mesh,
}

impl Island {
    /// Wrap an existing field (e.g. a restored snapshot) and mesh it.
    pub fn from_field(config: IslandConfig, field: VoxelField) -> Self {
        let mesh = extractor_for(&config).extract(&field);
        Self { config, field, mesh }
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    pub fn field(&self) -> &VoxelField {
        &self.field
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Bounding box of the current mesh, `None` when it has no vertices
    pub fn bounds(&self) -> Option<Aabb> {
        self.mesh.bounds()
    }

    /// Clear the voxel under a mesh-space point and remesh if it changed.
    ///
    /// The point is carried back onto the lattice through the mesh's
    /// recentering offset. Returns whether anything was dug. An island
    /// without a mesh has no surface to aim at, so nothing happens.
    pub fn dig(&mut self, point: Vec3) -> bool {
        if self.mesh.is_empty() {
            return false;
        }
        if !editor::dig(&mut self.field, point, self.mesh.offset) {
            return false;
        }
        self.remesh();
        true
    }

    /// Re-extract the mesh from the current field.
    pub fn remesh(&mut self) {
        let start = Instant::now();
        self.mesh = extractor_for(&self.config).extract(&self.field);
        log::debug!(
            "Remeshed island: {} triangles in {:.1}ms",
            self.mesh.triangle_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
}

fn extractor_for(config: &IslandConfig) -> IsosurfaceExtractor {
    IsosurfaceExtractor::new(config.extraction_mode).with_smooth_normals(config.smooth_normals)
}

/// Runs the full pipeline for one configuration.
pub struct IslandGenerator;

impl IslandGenerator {
    pub fn generate(config: &IslandConfig) -> Result<Island> {
        config.validate()?;
        let start = Instant::now();

        let pipeline = HeightmapPipeline::new(config.heightmap.clone());
        let maps = pipeline.generate(config.width, config.depth)?;
        let field = build_voxel_field(&maps.top, &maps.bottom, config.height)?;
        let island = Island::from_field(config.clone(), field);

        log::info!(
            "Generated {}x{}x{} island (seed {}): {} vertices, {} triangles in {:.1}ms",
            config.width,
            config.height,
            config.depth,
            config.heightmap.seed,
            island.mesh.vertex_count(),
            island.mesh.triangle_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(island)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::mesh::ExtractionMode;
    use crate::voxel::Material;

    fn small_config() -> IslandConfig {
        IslandConfig {
            width: 16,
            height: 20,
            depth: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_default_island() {
        let island = IslandGenerator::generate(&small_config()).unwrap();
        assert_eq!(island.field().dims(), (16, 20, 16));
        assert!(island.field().solid_count() > 0);
        assert!(island.field().validate().is_ok());
        assert!(!island.mesh().is_empty());
        assert!(island.mesh().normals().is_none());

        let bounds = island.bounds().unwrap();
        assert!((bounds.min.x + bounds.max.x).abs() < 1e-4);
        assert!((bounds.min.z + bounds.max.z).abs() < 1e-4);
        assert!(bounds.max.y.abs() < 1e-4);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = IslandGenerator::generate(&small_config()).unwrap();
        let b = IslandGenerator::generate(&small_config()).unwrap();
        assert_eq!(a.field(), b.field());
        assert_eq!(a.mesh(), b.mesh());
    }

    #[test]
    fn test_generate_smooth_tetrahedra() {
        let config = IslandConfig {
            smooth_normals: true,
            extraction_mode: ExtractionMode::Tetrahedron,
            ..small_config()
        };
        let island = IslandGenerator::generate(&config).unwrap();
        let normals = island.mesh().normals().unwrap();
        assert_eq!(normals.len(), island.mesh().vertex_count());
        assert!(normals.iter().all(|n| n.is_finite()));
    }

    #[test]
    fn test_generate_rejects_invalid() {
        let config = IslandConfig { width: 0, ..small_config() };
        assert!(matches!(
            IslandGenerator::generate(&config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_dig_remeshes() {
        let mut island = IslandGenerator::generate(&small_config()).unwrap();
        let bounds = island.bounds().unwrap();
        let solid_before = island.field().solid_count();

        // walk down the centre column until something solid is hit
        let dug = (0..20).any(|i| {
            let t = (i as f32 + 0.5) / 20.0;
            let point = bounds.center().with_y(bounds.max.y - t * bounds.size().y);
            island.dig(point)
        });
        assert!(dug);
        assert_eq!(island.field().solid_count(), solid_before - 1);
    }

    #[test]
    fn test_default_island_is_watertight() {
        for mode in [ExtractionMode::Cubes, ExtractionMode::Tetrahedron] {
            let config = IslandConfig {
                extraction_mode: mode,
                ..Default::default()
            };
            let island = IslandGenerator::generate(&config).unwrap();
            let field = island.field();
            let (w, h, d) = field.dims();
            for x in 0..w {
                for y in 0..h {
                    for z in 0..d {
                        if x == 0 || y == 0 || z == 0 || x == w - 1 || y == h - 1 || z == d - 1 {
                            assert!(!field.material(x, y, z).is_solid(), "solid boundary voxel ({}, {}, {})", x, y, z);
                        }
                    }
                }
            }

            let mesh = island.mesh();
            assert!(!mesh.is_empty());
            assert_eq!(mesh.open_edges(), 0, "{:?} mesh has holes", mode);
            assert!(mesh.signed_volume() > 0.0);
        }
    }

    #[test]
    fn test_dig_at_highest_vertex() {
        let mut island = IslandGenerator::generate(&IslandConfig::default()).unwrap();
        let mesh = island.mesh();
        let (i, point) = mesh
            .positions
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.y.total_cmp(&b.1.y))
            .unwrap();
        // the highest crossing sits half a cell above the topmost solid voxel
        let cell = mesh.grid_coords[i].floor().as_uvec3();
        let (x, y, z) = (cell.x as usize, cell.y as usize, cell.z as usize);
        assert!(island.field().material(x, y, z).is_solid());
        let solid_before = island.field().solid_count();

        assert!(island.dig(point));
        assert_eq!(island.field().material(x, y, z), Material::Empty);
        assert_eq!(island.field().solid_count(), solid_before - 1);
    }

    #[test]
    fn test_dig_empty_island_is_noop() {
        let config = IslandConfig {
            width: 4,
            height: 4,
            depth: 4,
            ..Default::default()
        };
        let mut island = Island::from_field(config, VoxelField::new(4, 4, 4));
        assert!(island.mesh().is_empty());
        assert!(!island.dig(Vec3::ZERO));
    }
}
