//! Dense voxel field: density plus a parallel material grid.
//!
//! Storage is column-major with Y fastest: `index = (x * depth + z) * height + y`,
//! so each (x, z) column is one contiguous run of `height` cells.
//!
//! Integer sampling clamps coordinates into the grid, so derivative
//! stencils at the border read a repeated neighbour instead of going out
//! of range. Normalized sampling maps [0, 1] onto `[0, dim - 1]`.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::material::Material;
use crate::core::error::Error;
use crate::core::types::{Result, UVec3, Vec3};

/// Step (in normalized units) of the central difference used by [`VoxelField::gradient`]
pub const GRADIENT_STEP: f32 = 0.005;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VoxelFieldSnapshot")]
pub struct VoxelField {
    width: usize,
    height: usize,
    depth: usize,
    density: Vec<f32>,
    material: Vec<Material>,
    /// Negate normals so they point away from solid material
    flip_normals: bool,
}

/// Serialized form of a [`VoxelField`], checked by [`VoxelField::from_parts`]
/// before it becomes a field.
#[derive(Deserialize)]
struct VoxelFieldSnapshot {
    width: usize,
    height: usize,
    depth: usize,
    density: Vec<f32>,
    material: Vec<Material>,
    flip_normals: bool,
}

impl TryFrom<VoxelFieldSnapshot> for VoxelField {
    type Error = Error;

    fn try_from(snapshot: VoxelFieldSnapshot) -> Result<Self> {
        let mut field = VoxelField::from_parts(
            snapshot.width,
            snapshot.height,
            snapshot.depth,
            snapshot.density,
            snapshot.material,
        )?;
        field.flip_normals = snapshot.flip_normals;
        Ok(field)
    }
}

impl VoxelField {
    /// All-empty field
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        let len = width * height * depth;
        Self {
            width,
            height,
            depth,
            density: vec![0.0; len],
            material: vec![Material::Empty; len],
            flip_normals: true,
        }
    }

    /// Rebuild a field from raw arrays, e.g. a persisted snapshot.
    ///
    /// Both arrays must hold `width * height * depth` cells in column order,
    /// and every non-zero density must pair with a solid material.
    pub fn from_parts(
        width: usize,
        height: usize,
        depth: usize,
        density: Vec<f32>,
        material: Vec<Material>,
    ) -> Result<Self> {
        let field = Self {
            width,
            height,
            depth,
            density,
            material,
            flip_normals: true,
        };
        field.validate()?;
        Ok(field)
    }

    /// Check array sizes and the density/material pairing.
    pub fn validate(&self) -> Result<()> {
        let len = self.width * self.height * self.depth;
        if self.density.len() != len || self.material.len() != len {
            return Err(Error::InvalidConfiguration(format!(
                "voxel arrays hold {} densities and {} materials, expected {}",
                self.density.len(), self.material.len(), len
            )));
        }
        if let Some(i) = self
            .density
            .iter()
            .zip(&self.material)
            .position(|(d, m)| (*d != 0.0) != m.is_solid() || !d.is_finite())
        {
            return Err(Error::InvalidConfiguration(format!(
                "voxel {} has density {} with material {:?}",
                i, self.density[i], self.material[i]
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// (width, height, depth)
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn flip_normals(&self) -> bool {
        self.flip_normals
    }

    pub fn set_flip_normals(&mut self, flip: bool) {
        self.flip_normals = flip;
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        (x * self.depth + z) * self.height + y
    }

    /// Raw density at (x, y, z)
    pub fn density(&self, x: usize, y: usize, z: usize) -> f32 {
        self.density[self.index(x, y, z)]
    }

    pub fn material(&self, x: usize, y: usize, z: usize) -> Material {
        self.material[self.index(x, y, z)]
    }

    /// Assign a material; density follows it (1 for solids, 0 for empty).
    pub fn set(&mut self, x: usize, y: usize, z: usize, material: Material) {
        let i = self.index(x, y, z);
        self.density[i] = material.density();
        self.material[i] = material;
    }

    /// Make a voxel empty
    pub fn clear(&mut self, x: usize, y: usize, z: usize) {
        self.set(x, y, z, Material::Empty);
    }

    /// Densities in column order
    pub fn densities(&self) -> &[f32] {
        &self.density
    }

    /// Materials in column order
    pub fn materials(&self) -> &[Material] {
        &self.material
    }

    /// Mutable views of one (x, z) column per item, density and material together.
    pub(crate) fn columns_mut(&mut self) -> impl rayon::iter::IndexedParallelIterator<Item = (&mut [f32], &mut [Material])> {
        use rayon::prelude::*;
        let height = self.height.max(1);
        self.density
            .par_chunks_mut(height)
            .zip(self.material.par_chunks_mut(height))
    }

    pub fn solid_count(&self) -> usize {
        self.material.iter().filter(|m| m.is_solid()).count()
    }

    /// Density at integer coordinates, each clamped into `[0, dim - 1]`.
    pub fn sample_at(&self, x: i32, y: i32, z: i32) -> f32 {
        if self.density.is_empty() {
            return 0.0;
        }
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        let z = z.clamp(0, self.depth as i32 - 1) as usize;
        self.density(x, y, z)
    }

    /// Trilinear density at normalized coordinates in [0, 1].
    pub fn sample(&self, u: f32, v: f32, w: f32) -> f32 {
        let x = u * (self.width as f32 - 1.0);
        let y = v * (self.height as f32 - 1.0);
        let z = w * (self.depth as f32 - 1.0);

        let xi = x.floor() as i32;
        let yi = y.floor() as i32;
        let zi = z.floor() as i32;

        let v000 = self.sample_at(xi, yi, zi);
        let v100 = self.sample_at(xi + 1, yi, zi);
        let v010 = self.sample_at(xi, yi + 1, zi);
        let v110 = self.sample_at(xi + 1, yi + 1, zi);

        let v001 = self.sample_at(xi, yi, zi + 1);
        let v101 = self.sample_at(xi + 1, yi, zi + 1);
        let v011 = self.sample_at(xi, yi + 1, zi + 1);
        let v111 = self.sample_at(xi + 1, yi + 1, zi + 1);

        let tx = (x - xi as f32).clamp(0.0, 1.0);
        let ty = (y - yi as f32).clamp(0.0, 1.0);
        let tz = (z - zi as f32).clamp(0.0, 1.0);

        let v0 = bilerp(v000, v100, v010, v110, tx, ty);
        let v1 = bilerp(v001, v101, v011, v111, tx, ty);
        lerp(v0, v1, tz)
    }

    /// Central difference at integer coordinates. Zero in constant regions.
    pub fn gradient_at(&self, x: i32, y: i32, z: i32) -> Vec3 {
        let dx = self.sample_at(x + 1, y, z) - self.sample_at(x - 1, y, z);
        let dy = self.sample_at(x, y + 1, z) - self.sample_at(x, y - 1, z);
        let dz = self.sample_at(x, y, z + 1) - self.sample_at(x, y, z - 1);
        Vec3::new(dx, dy, dz) * 0.5
    }

    /// Central difference over the trilinear sampler, step [`GRADIENT_STEP`].
    pub fn gradient(&self, u: f32, v: f32, w: f32) -> Vec3 {
        const HH: f32 = GRADIENT_STEP * 0.5;
        const IH: f32 = 1.0 / GRADIENT_STEP;

        let dx = self.sample(u + HH, v, w) - self.sample(u - HH, v, w);
        let dy = self.sample(u, v + HH, w) - self.sample(u, v - HH, w);
        let dz = self.sample(u, v, w + HH) - self.sample(u, v, w - HH);
        Vec3::new(dx, dy, dz) * IH
    }

    /// Unit normal at integer coordinates; zero where the gradient vanishes.
    pub fn normal_at(&self, x: i32, y: i32, z: i32) -> Vec3 {
        self.orient(self.gradient_at(x, y, z).normalize_or_zero())
    }

    /// Unit normal at normalized coordinates; zero where the gradient vanishes.
    pub fn normal(&self, u: f32, v: f32, w: f32) -> Vec3 {
        self.orient(self.gradient(u, v, w).normalize_or_zero())
    }

    #[inline]
    fn orient(&self, n: Vec3) -> Vec3 {
        if self.flip_normals { -n } else { n }
    }

    /// Truncate normalized coordinates to the lattice.
    ///
    /// Inputs outside [0, 1] saturate to the nearest edge cell.
    pub fn grid_coords(&self, u: f32, v: f32, w: f32) -> UVec3 {
        self.lattice_coords(Vec3::new(
            u * (self.width as f32 - 1.0),
            v * (self.height as f32 - 1.0),
            w * (self.depth as f32 - 1.0),
        ))
    }

    /// Truncate a continuous lattice position to the cell containing it,
    /// saturating at the grid edges.
    pub fn lattice_coords(&self, p: Vec3) -> UVec3 {
        let (x, y, z) = (p.x as u32, p.y as u32, p.z as u32);
        UVec3::new(
            x.min(self.width.saturating_sub(1) as u32),
            y.min(self.height.saturating_sub(1) as u32),
            z.min(self.depth.saturating_sub(1) as u32),
        )
    }

    /// Material lookup texture: one `width x height` image per Z slice.
    pub fn terrain_sampler(&self) -> Vec<RgbaImage> {
        (0..self.depth)
            .map(|z| {
                RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
                    Rgba(self.material(x as usize, y as usize, z).color())
                })
            })
            .collect()
    }
}

#[inline]
fn lerp(v0: f32, v1: f32, t: f32) -> f32 {
    v0 + (v1 - v0) * t
}

#[inline]
fn bilerp(v00: f32, v10: f32, v01: f32, v11: f32, tx: f32, ty: f32) -> f32 {
    lerp(lerp(v00, v10, tx), lerp(v01, v11, tx), ty)
}
