//! Composition of the shaping operators into an island's top and bottom surfaces

use serde::{Deserialize, Serialize};

use super::distance::DistanceKind;
use super::heightmap::Heightmap;
use super::noise_field::NoiseField;
use crate::core::types::Result;

/// Parameters controlling heightmap synthesis and shaping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapParams {
    pub seed: u32,
    pub frequency: f32,       // Noise frequency over the [-1, 1] grid square
    pub vertical_offset: f32, // Added to raw noise before clamping at 0
    pub vertical_scale: f32,  // Final multiplier on the top surface
    pub shape_factor: f32,    // Radial blend factor
    pub shape_scale: f32,     // Radial falloff scale (larger = wider island)
    pub steps: u32,           // Terrace count per unit height
    pub erosion_factor: f32,  // Border erosion on top; doubled for the bottom
    pub stretch_factor: f32,  // Underside exaggeration
    pub distance: DistanceKind,
    pub ridged: bool,         // Fold the shaped top into ridges
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 55,
            frequency: 0.3,
            vertical_offset: 0.5,
            vertical_scale: 0.5,
            shape_factor: 0.5,
            shape_scale: 1.0,
            steps: 6,
            erosion_factor: 5.0,
            stretch_factor: 1.0,
            distance: DistanceKind::Manhattan,
            ridged: false,
        }
    }
}

/// Base noise grid plus the two surfaces derived from it
#[derive(Clone, Debug)]
pub struct IslandHeightmaps {
    pub base: Heightmap,
    pub top: Heightmap,
    pub bottom: Heightmap,
}

/// Builds top and bottom elevation grids from one base heightmap.
pub struct HeightmapPipeline {
    params: HeightmapParams,
    noise: NoiseField,
}

impl HeightmapPipeline {
    pub fn new(params: HeightmapParams) -> Self {
        let noise = NoiseField::with_seed(params.seed, params.frequency);
        Self { params, noise }
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }

    /// Sample the base heightmap for a `width x depth` grid
    pub fn base(&self, width: usize, depth: usize) -> Heightmap {
        Heightmap::generate(&self.noise, width, depth, self.params.vertical_offset)
    }

    /// shape -> [ridgify] -> erode -> stepify -> height scale -> floor border
    pub fn top(&self, base: &Heightmap) -> Result<Heightmap> {
        let p = &self.params;
        let mut top = base.shape(p.shape_factor, p.shape_scale, p.distance);
        if p.ridged {
            top = top.ridgify();
        }
        let top = top.erode(p.erosion_factor).stepify(p.steps)?;
        Ok(top.height_scale(p.vertical_scale).with_floor_border())
    }

    /// erode (twice as hard) -> invert and stretch -> floor border
    pub fn bottom(&self, base: &Heightmap) -> Heightmap {
        base.erode(self.params.erosion_factor * 2.0)
            .invert_and_stretch(self.params.stretch_factor)
            .with_floor_border()
    }

    /// Run the full chain
    pub fn generate(&self, width: usize, depth: usize) -> Result<IslandHeightmaps> {
        let base = self.base(width, depth);
        let top = self.top(&base)?;
        let bottom = self.bottom(&base);

        log::debug!(
            "Heightmaps {}x{}: top [{:.3}, {:.3}], bottom [{:.3}, {:.3}]",
            width, depth, top.min(), top.max(), bottom.min(), bottom.max()
        );

        Ok(IslandHeightmaps { base, top, bottom })
    }
}
