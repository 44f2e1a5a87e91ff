//! Elevation grids and the shaping operators that turn noise into an island.
//!
//! Every operator is pure: it reads `self` and returns a freshly allocated
//! grid. Operators clamp their output (`max(0, ..)` or `min(0, ..)`) so finite
//! input never produces NaN. Rows are processed in parallel; each output cell
//! depends only on the matching input cell.

use rayon::prelude::*;

use super::distance::DistanceKind;
use super::noise_field::NoiseField;
use crate::core::error::Error;
use crate::core::types::Result;

/// Value every border cell of a freshly generated heightmap is pinned to
pub const FLOOR: f32 = 0.0;

/// A `width x depth` grid of elevations, stored row-major (`y * width + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    width: usize,
    depth: usize,
    data: Vec<f32>,
}

impl Heightmap {
    /// Grid filled with [`FLOOR`]
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            data: vec![FLOOR; width * depth],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: usize, depth: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f32 + Sync,
    {
        let mut data = vec![FLOOR; width * depth];
        if width > 0 {
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, cell) in row.iter_mut().enumerate() {
                        *cell = f(x, y);
                    }
                });
        }
        Self { width, depth, data }
    }

    /// Sample fractal noise over the grid.
    ///
    /// Cells are sampled at `nx, ny` in [-1, 1), offset by `vertical_offset`
    /// and clamped at zero. Border cells are forced to [`FLOOR`].
    pub fn generate(noise: &NoiseField, width: usize, depth: usize, vertical_offset: f32) -> Self {
        Self::from_fn(width, depth, |x, y| {
            if x == 0 || y == 0 || x == width - 1 || y == depth - 1 {
                return FLOOR;
            }
            let nx = 2.0 * x as f32 / width as f32 - 1.0;
            let ny = 2.0 * y as f32 / depth as f32 - 1.0;
            (noise.sample(nx, ny) + vertical_offset).max(0.0)
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// (width, depth)
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Row-major cell values
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.depth
    }

    /// Smallest value in the grid (`+inf` for an empty grid)
    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest value in the grid (`-inf` for an empty grid)
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    fn map_cells<F>(&self, f: F) -> Heightmap
    where
        F: Fn(usize, usize, f32) -> f32 + Sync,
    {
        Heightmap::from_fn(self.width, self.depth, |x, y| f(x, y, self.get(x, y)))
    }

    /// Blend with a radial falloff so elevation tapers toward the edges.
    ///
    /// `value = max(0, (h + (1 - d)) * blend_factor)` where `d` is the
    /// distance of the cell from the grid centre, with coordinates divided
    /// by `shape_scale`.
    pub fn shape(&self, blend_factor: f32, shape_scale: f32, distance: DistanceKind) -> Heightmap {
        let (width, depth) = (self.width as f32, self.depth as f32);
        self.map_cells(|x, y, h| {
            let nx = (2.0 * x as f32 / width - 1.0) / shape_scale;
            let ny = (2.0 * y as f32 / depth - 1.0) / shape_scale;
            let d = distance.eval(nx, ny);
            ((h + (1.0 - d)) * blend_factor).max(0.0)
        })
    }

    /// Subtract `amount / ((min(x, w-x)+1) * (min(y, d-y)+1))`.
    ///
    /// Hits hardest at the border, which softens the seam against the
    /// zeroed edge cells.
    pub fn erode(&self, amount: f32) -> Heightmap {
        let (width, depth) = (self.width, self.depth);
        self.map_cells(|x, y, h| {
            let x_dist = (x.min(width - x) + 1) as f32;
            let y_dist = (y.min(depth - y) + 1) as f32;
            (h - amount / (x_dist * y_dist)).max(0.0)
        })
    }

    /// Quantize to the nearest multiple of `1 / steps` (terracing).
    pub fn stepify(&self, steps: u32) -> Result<Heightmap> {
        if steps == 0 {
            return Err(Error::InvalidConfiguration("steps must be at least 1".into()));
        }
        let steps = steps as f32;
        Ok(self.map_cells(|_, _, h| ((h * steps).round_ties_even() / steps).max(0.0)))
    }

    /// Fold values around 0.5, turning smooth hills into ridges.
    pub fn ridgify(&self) -> Heightmap {
        self.map_cells(|_, _, h| (2.0 * (0.5 - (0.5 - h).abs())).max(0.0))
    }

    pub fn height_scale(&self, factor: f32) -> Heightmap {
        self.map_cells(|_, _, h| (h * factor).max(0.0))
    }

    /// Copy with every border cell pinned back to [`FLOOR`].
    ///
    /// `shape` lifts the border and `erode` only partly undoes it on the far
    /// edges, so surface chains end with this pass.
    pub fn with_floor_border(&self) -> Heightmap {
        self.map_cells(|x, y, h| if self.is_border(x, y) { FLOOR } else { h })
    }

    /// Mirror below zero and stretch downward: `min(0, -h * stretch_factor)`.
    ///
    /// Used to derive the underside of an island from its top.
    pub fn invert_and_stretch(&self, stretch_factor: f32) -> Heightmap {
        self.map_cells(|_, _, h| (-h * stretch_factor).min(0.0))
    }
}

/// Sample a base heightmap from a freshly seeded noise field.
pub fn generate_heightmap(
    width: usize,
    depth: usize,
    frequency: f32,
    vertical_offset: f32,
    seed: u32,
) -> Heightmap {
    let noise = NoiseField::with_seed(seed, frequency);
    Heightmap::generate(&noise, width, depth, vertical_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, depth: usize) -> Heightmap {
        Heightmap::from_fn(width, depth, |x, y| (x + 2 * y) as f32 * 0.07)
    }

    fn assert_border_floor(map: &Heightmap) {
        for y in 0..map.depth() {
            for x in 0..map.width() {
                if map.is_border(x, y) {
                    assert_eq!(map.get(x, y), FLOOR, "border cell ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_generate_deterministic() {
        let a = generate_heightmap(10, 10, 0.3, 0.5, 55);
        let b = generate_heightmap(10, 10, 0.3, 0.5, 55);
        let bits_a: Vec<u32> = a.values().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = b.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_generate_border_and_range() {
        let map = generate_heightmap(12, 9, 0.3, 0.5, 55);
        assert_eq!(map.dims(), (12, 9));
        assert_border_floor(&map);
        assert!(map.values().iter().all(|v| v.is_finite() && *v >= 0.0));
        // offset 0.5 lifts the interior well above zero somewhere
        assert!(map.max() > 0.0);
    }

    #[test]
    fn test_border_preserving_operators() {
        let base = generate_heightmap(16, 16, 0.3, 0.5, 3);
        assert_border_floor(&base.erode(2.0));
        assert_border_floor(&base.stepify(4).unwrap());
        assert_border_floor(&base.ridgify());
        assert_border_floor(&base.height_scale(3.0));
        for v in base.invert_and_stretch(2.0).values() {
            assert!(*v <= 0.0);
        }
    }

    #[test]
    fn test_with_floor_border() {
        let shaped = Heightmap::new(20, 20).shape(1.0, 1.0, DistanceKind::Manhattan);
        // x = 19 sits at nx = 0.9, inside the falloff
        assert!(shaped.get(19, 10) > 0.0);
        assert!(shaped.erode(5.0).get(19, 10) > 0.0);

        let pinned = shaped.with_floor_border();
        assert_border_floor(&pinned);
        for y in 1..19 {
            for x in 1..19 {
                assert_eq!(pinned.get(x, y), shaped.get(x, y));
            }
        }
    }

    #[test]
    fn test_erode_zero_is_identity() {
        let map = ramp(7, 5);
        assert_eq!(map.erode(0.0), map);
    }

    #[test]
    fn test_erode_strongest_at_border() {
        let map = Heightmap::from_fn(9, 9, |_, _| 1.0);
        let eroded = map.erode(0.5);
        assert_eq!(eroded.get(0, 0), 0.5);
        assert!(eroded.get(4, 4) > eroded.get(0, 4));
        assert!(eroded.get(4, 4) > eroded.get(1, 1));
        assert!(eroded.values().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_stepify_quantizes() {
        let map = ramp(8, 6);
        for steps in [1u32, 3, 6, 10] {
            let stepped = map.stepify(steps).unwrap();
            let inv = 1.0 / steps as f32;
            for (orig, q) in map.values().iter().zip(stepped.values()) {
                assert!((orig - q).abs() <= inv + 1e-6);
                let k = q * steps as f32;
                assert!((k - k.round()).abs() < 1e-4, "{} is not a multiple of 1/{}", q, steps);
            }
        }
    }

    #[test]
    fn test_stepify_rejects_zero() {
        let map = ramp(3, 3);
        assert!(matches!(map.stepify(0), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_ridgify_folds_at_half() {
        let map = Heightmap::from_fn(3, 1, |x, _| [0.25, 0.5, 0.75][x]);
        let ridged = map.ridgify();
        assert_eq!(ridged.get(0, 0), 0.5);
        assert_eq!(ridged.get(1, 0), 1.0);
        assert_eq!(ridged.get(2, 0), 0.5);
    }

    #[test]
    fn test_height_scale_clamps() {
        let map = Heightmap::from_fn(2, 1, |x, _| [0.5, 2.0][x]);
        let scaled = map.height_scale(2.0);
        assert_eq!(scaled.values(), &[1.0, 4.0]);
        assert!(map.height_scale(-1.0).values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_invert_and_stretch() {
        let map = Heightmap::from_fn(3, 1, |x, _| [0.0, 0.5, 1.0][x]);
        let bottom = map.invert_and_stretch(2.0);
        assert_eq!(bottom.values(), &[0.0, -1.0, -2.0]);
    }

    #[test]
    fn test_shape_tapers_toward_edges() {
        let flat = Heightmap::new(20, 20);
        let shaped = flat.shape(1.0, 1.0, DistanceKind::Manhattan);
        // nx = ny = 0 at (10, 10)
        assert_eq!(shaped.get(10, 10), 1.0);
        assert!(shaped.get(10, 10) > shaped.get(3, 10));
        assert!(shaped.get(3, 10) > shaped.get(0, 0));
        assert!(shaped.values().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_shape_blend_factor() {
        let map = Heightmap::from_fn(5, 5, |_, _| 0.5);
        let half = map.shape(0.5, 1.0, DistanceKind::Manhattan);
        let full = map.shape(1.0, 1.0, DistanceKind::Manhattan);
        for (h, f) in half.values().iter().zip(full.values()) {
            assert!((h * 2.0 - f).abs() < 1e-6);
        }
    }

    #[test]
    fn test_operators_do_not_alias() {
        let map = ramp(4, 4);
        let before = map.clone();
        let _ = map.ridgify().erode(1.0).height_scale(2.0);
        assert_eq!(map, before);
    }

    #[test]
    fn test_min_max() {
        let map = Heightmap::from_fn(3, 2, |x, y| x as f32 - y as f32);
        assert_eq!(map.min(), -1.0);
        assert_eq!(map.max(), 2.0);
    }
}
