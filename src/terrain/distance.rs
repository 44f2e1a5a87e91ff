//! Radial distance metrics used to give heightmaps an island silhouette.
//!
//! All metrics take coordinates centred on the grid middle, where the
//! grid edge sits at roughly |x| = 1 or |y| = 1.

use serde::{Deserialize, Serialize};

/// Selectable distance metric for [`Heightmap::shape`](super::Heightmap::shape)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceKind {
    #[default]
    Manhattan,
    Euclidean2,
    SquareBump,
    Hyperboloid,
}

impl DistanceKind {
    /// Distance of (x, y) from the origin under this metric
    #[inline]
    pub fn eval(self, x: f32, y: f32) -> f32 {
        match self {
            DistanceKind::Manhattan => manhattan(x, y),
            DistanceKind::Euclidean2 => euclidean2(x, y),
            DistanceKind::SquareBump => square_bump(x, y),
            DistanceKind::Hyperboloid => hyperboloid(x, y),
        }
    }
}

#[inline]
pub fn manhattan(x: f32, y: f32) -> f32 {
    (x.abs() + y.abs()) / 2.0
}

/// Squared euclidean distance, capped at 1
#[inline]
pub fn euclidean2(x: f32, y: f32) -> f32 {
    ((x * x + y * y) / std::f32::consts::SQRT_2).min(1.0)
}

#[inline]
pub fn square_bump(x: f32, y: f32) -> f32 {
    1.0 - (1.0 - x * x) * (1.0 - y * y)
}

#[inline]
pub fn hyperboloid(x: f32, y: f32) -> f32 {
    (x * x + y * y + 0.2 * 0.2).sqrt()
}
