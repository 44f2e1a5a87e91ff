//! Seeded fractal noise source for heightmap synthesis

use noise::{Fbm, MultiFractal, NoiseFn, Simplex};

/// Parameters controlling the fractal noise
#[derive(Clone, Debug)]
pub struct NoiseParams {
    pub seed: u32,
    pub frequency: f32,
    pub octaves: u32,     // FBM octaves (detail levels)
    pub persistence: f32, // FBM persistence (0.5 typical)
    pub lacunarity: f32,  // FBM lacunarity (2.0 typical)
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 55,
            frequency: 0.3,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// 2D coherent noise: fractal Brownian motion over simplex noise.
///
/// Output lies roughly in [-1, 1] and is fully determined by the parameters.
pub struct NoiseField {
    params: NoiseParams,
    fbm: Fbm<Simplex>,
}

impl NoiseField {
    pub fn new(params: NoiseParams) -> Self {
        let fbm = Fbm::<Simplex>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_frequency(params.frequency as f64)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, fbm }
    }

    /// Noise field with default octave settings
    pub fn with_seed(seed: u32, frequency: f32) -> Self {
        Self::new(NoiseParams {
            seed,
            frequency,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Sample the field at (x, y)
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        self.fbm.get([x as f64, y as f64]) as f32
    }
}
