//! Island generation settings, loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::mesh::ExtractionMode;
use crate::terrain::HeightmapParams;

/// Everything needed to build one island.
///
/// Heightmap parameters are flattened into the same JSON object, so a
/// document reads `{"width": 40, "seed": 7, "steps": 4, ...}`. Missing keys
/// take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// Heightmap columns along X
    pub width: usize,
    /// Voxel layers along Y
    pub height: usize,
    /// Heightmap rows along Z
    pub depth: usize,
    #[serde(flatten)]
    pub heightmap: HeightmapParams,
    pub smooth_normals: bool,
    pub extraction_mode: ExtractionMode,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 50,
            depth: 30,
            heightmap: HeightmapParams::default(),
            smooth_normals: false,
            extraction_mode: ExtractionMode::Cubes,
        }
    }
}

impl IslandConfig {
    /// Check the settings before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "dimensions must be positive, got {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }

        let p = &self.heightmap;
        if p.steps == 0 {
            return Err(Error::InvalidConfiguration("steps must be at least 1".into()));
        }

        let floats = [
            ("frequency", p.frequency),
            ("vertical_offset", p.vertical_offset),
            ("vertical_scale", p.vertical_scale),
            ("shape_factor", p.shape_factor),
            ("shape_scale", p.shape_scale),
            ("erosion_factor", p.erosion_factor),
            ("stretch_factor", p.stretch_factor),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidConfiguration(format!("{} must be finite, got {}", name, value)));
        }
        if p.shape_scale <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "shape_scale must be positive, got {}",
                p.shape_scale
            )));
        }
        Ok(())
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: IslandConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded island config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
