//! Material labels carried alongside voxel density

use serde::{Deserialize, Serialize};

/// What a voxel is made of. `Empty` is the only non-solid label.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Empty = 0,
    Dirt = 1,
    Grass = 2,
    Rock = 3,
    Sand = 4,
}

impl Material {
    pub const SOLID: [Material; 4] = [Material::Dirt, Material::Grass, Material::Rock, Material::Sand];

    #[inline]
    pub fn is_solid(self) -> bool {
        self != Material::Empty
    }

    /// Density paired with this label: 1 for solids, 0 for empty
    #[inline]
    pub fn density(self) -> f32 {
        if self.is_solid() { 1.0 } else { 0.0 }
    }

    /// RGBA8 color for the material lookup texture.
    /// Empty is transparent black.
    pub fn color(self) -> [u8; 4] {
        match self {
            Material::Empty => [0, 0, 0, 0],
            Material::Dirt => [165, 42, 42, 255],   // brown
            Material::Grass => [0, 255, 0, 255],    // green
            Material::Rock => [169, 169, 169, 255], // dark grey
            Material::Sand => [244, 164, 96, 255],  // sandy brown
        }
    }
}
