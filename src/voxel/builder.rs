//! Rasterizes a top/bottom heightmap pair into a voxel field

use rayon::prelude::*;

use super::field::VoxelField;
use super::material::Material;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::terrain::Heightmap;

/// Fraction of the vertical grid kept free above and below the surfaces
pub const VERTICAL_MARGIN: f32 = 0.1;

/// Share of a column's solid thickness, measured from the bottom, below the grass crust
pub const GRASS_THRESHOLD: f32 = 0.95;

/// Maps heightmap values onto Y grid coordinates.
///
/// `[global_min, global_max]` is stretched over `[b1, b2]` with
/// `b1 = 0.1 * h` and `b2 = 0.9 * h`, so neither surface touches the
/// top or bottom of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightRemap {
    pub global_min: f32,
    pub global_max: f32,
    pub b1: f32,
    pub b2: f32,
}

impl HeightRemap {
    pub fn new(global_min: f32, global_max: f32, voxel_height: usize) -> Self {
        let h = voxel_height as f32;
        Self {
            global_min,
            global_max,
            b1: h * VERTICAL_MARGIN,
            b2: h - h * VERTICAL_MARGIN,
        }
    }

    /// Grid Y coordinate of a heightmap value. A flat range maps to `b1`.
    pub fn to_grid(&self, value: f32) -> f32 {
        let range = self.global_max - self.global_min;
        if range == 0.0 {
            return self.b1;
        }
        self.b1 + (value - self.global_min) * (self.b2 - self.b1) / range
    }
}

/// Material for layer `y` of a column spanning `[lower, upper]`
#[inline]
fn classify(y: f32, lower: f32, upper: f32) -> Material {
    if upper <= lower || y > upper || y < lower {
        Material::Empty
    } else if (y - lower) > (upper - lower) * GRASS_THRESHOLD {
        Material::Grass
    } else {
        Material::Dirt
    }
}

/// Fill a `width x voxel_height x depth` field between two surfaces.
///
/// Fails with [`Error::DimensionMismatch`] when the grids differ in size
/// and with [`Error::InvalidConfiguration`] for an empty grid or zero height.
pub fn build_voxel_field(top: &Heightmap, bottom: &Heightmap, voxel_height: usize) -> Result<VoxelField> {
    if top.dims() != bottom.dims() {
        return Err(Error::DimensionMismatch {
            top: top.dims(),
            bottom: bottom.dims(),
        });
    }
    let (width, depth) = top.dims();
    if width == 0 || depth == 0 || voxel_height == 0 {
        return Err(Error::InvalidConfiguration(format!(
            "voxel field must be non-empty, got {}x{}x{}",
            width, voxel_height, depth
        )));
    }

    let remap = HeightRemap::new(bottom.min(), top.max(), voxel_height);
    log::debug!(
        "Height remap [{:.3}, {:.3}] -> [{:.2}, {:.2}]",
        remap.global_min, remap.global_max, remap.b1, remap.b2
    );

    let mut field = VoxelField::new(width, voxel_height, depth);
    field
        .columns_mut()
        .enumerate()
        .for_each(|(column, (density, material))| {
            let (x, z) = (column / depth, column % depth);
            let upper = remap.to_grid(top.get(x, z));
            let lower = remap.to_grid(bottom.get(x, z));
            for y in 0..voxel_height {
                let m = classify(y as f32, lower, upper);
                density[y] = m.density();
                material[y] = m;
            }
        });

    log::info!(
        "Built {}x{}x{} voxel field, {} solid voxels",
        width, voxel_height, depth, field.solid_count()
    );
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_bounds() {
        let remap = HeightRemap::new(-1.0, 1.0, 50);
        assert_eq!(remap.b1, 5.0);
        assert_eq!(remap.b2, 45.0);
        assert_eq!(remap.to_grid(-1.0), 5.0);
        assert_eq!(remap.to_grid(1.0), 45.0);
        assert_eq!(remap.to_grid(0.0), 25.0);
    }

    #[test]
    fn test_remap_flat_range() {
        let remap = HeightRemap::new(0.0, 0.0, 20);
        assert_eq!(remap.to_grid(0.0), 2.0);
        assert_eq!(remap.to_grid(7.0), 2.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let top = Heightmap::new(4, 4);
        let bottom = Heightmap::new(4, 5);
        let err = build_voxel_field(&top, &bottom, 10).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { top: (4, 4), bottom: (4, 5) }));
    }

    #[test]
    fn test_zero_height_rejected() {
        let map = Heightmap::new(3, 3);
        assert!(matches!(
            build_voxel_field(&map, &map, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_flat_maps_build_empty_field() {
        let map = Heightmap::new(6, 6);
        let field = build_voxel_field(&map, &map, 12).unwrap();
        assert_eq!(field.dims(), (6, 12, 6));
        assert_eq!(field.solid_count(), 0);
    }

    #[test]
    fn test_single_column_layers() {
        // one raised column in the middle of a 3x3 map
        let mut top = Heightmap::new(3, 3);
        top.set(1, 1, 1.0);
        let mut bottom = Heightmap::new(3, 3);
        bottom.set(1, 1, -1.0);

        let field = build_voxel_field(&top, &bottom, 20).unwrap();
        // lower = 2, upper = 18 for the raised column
        assert_eq!(field.material(1, 1, 1), Material::Empty);
        assert_eq!(field.material(1, 2, 1), Material::Dirt);
        // crust starts above lower + 0.95 * 16
        assert_eq!(field.material(1, 17, 1), Material::Dirt);
        assert_eq!(field.material(1, 18, 1), Material::Grass);
        assert_eq!(field.material(1, 19, 1), Material::Empty);
        // flat neighbours sit at remap(0) = 10 on both sides: upper == lower
        for y in 0..20 {
            assert_eq!(field.material(0, y, 1), Material::Empty);
        }
    }

    #[test]
    fn test_density_material_invariant() {
        let top = Heightmap::from_fn(8, 8, |x, y| ((x * 3 + y) % 5) as f32 * 0.2);
        let bottom = Heightmap::from_fn(8, 8, |x, y| -(((x + y * 2) % 4) as f32) * 0.3);
        let field = build_voxel_field(&top, &bottom, 16).unwrap();
        for x in 0..8 {
            for y in 0..16 {
                for z in 0..8 {
                    let d = field.density(x, y, z);
                    let m = field.material(x, y, z);
                    assert_eq!(d == 0.0, m == Material::Empty);
                    if d != 0.0 {
                        assert!(Material::SOLID.contains(&m));
                    }
                }
            }
        }
        assert!(field.validate().is_ok());
        assert!(field.solid_count() > 0);
    }

    #[test]
    fn test_margins_stay_empty() {
        let top = Heightmap::from_fn(5, 5, |_, _| 1.0);
        let bottom = Heightmap::from_fn(5, 5, |_, _| -1.0);
        let field = build_voxel_field(&top, &bottom, 30).unwrap();
        // solid spans [3, 27]
        for x in 0..5 {
            for z in 0..5 {
                assert_eq!(field.material(x, 2, z), Material::Empty);
                assert_eq!(field.material(x, 3, z), Material::Dirt);
                assert_eq!(field.material(x, 27, z), Material::Grass);
                assert_eq!(field.material(x, 28, z), Material::Empty);
            }
        }
    }
}
