//! Indexed triangle mesh produced by isosurface extraction

use std::collections::HashMap;

use crate::core::types::{Vec3, Vec4};
use crate::math::Aabb;

/// Scale applied to grid coordinates for the color channel
pub const COLOR_SCALE: f32 = 0.1;

/// Triangle list with per-vertex channels.
///
/// `positions`, `grid_coords` and `colors` always have the same length.
/// `normals` is either absent or holds exactly one normal per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Three indices per triangle, counter-clockwise seen from outside
    pub indices: Vec<u32>,
    normals: Option<Vec<Vec3>>,
    /// Interpolated lattice position of each vertex before recentering
    pub grid_coords: Vec<Vec3>,
    /// `grid_coords * 0.1` with alpha 1, read as vertex color by shaders
    pub colors: Vec<Vec4>,
    /// Translation applied by [`Mesh::recenter`]
    pub offset: Vec3,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex at lattice position `p`, returning its index.
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(p);
        self.grid_coords.push(p);
        self.colors.push((p * COLOR_SCALE).extend(1.0));
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    /// Attach per-vertex normals.
    ///
    /// A list whose length differs from the vertex count is discarded and
    /// the mesh is left without normals. Returns whether they were kept.
    pub fn set_normals(&mut self, normals: Vec<Vec3>) -> bool {
        if normals.len() == self.positions.len() {
            self.normals = Some(normals);
            true
        } else {
            self.normals = None;
            false
        }
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: Mesh) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.grid_coords.extend(other.grid_coords);
        self.colors.extend(other.colors);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
        self.normals = None;
    }

    /// Bounding box of the positions, `None` for a mesh without vertices
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    /// Bounds in field lattice space, undoing [`Mesh::recenter`]
    pub fn lattice_bounds(&self) -> Option<Aabb> {
        self.bounds().map(|b| b.translated(-self.offset))
    }

    /// Iterate triangles as vertex position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Signed enclosed volume; positive when faces wind outward.
    pub fn signed_volume(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| a.dot(b.cross(c)) / 6.0)
            .sum()
    }

    /// Count directed edges that lack exactly one opposite twin.
    ///
    /// Vertices at the same position are welded first, since neighbouring
    /// cells emit their own copies of a shared crossing. Zero means the
    /// surface is closed and consistently wound.
    pub fn open_edges(&self) -> usize {
        let mut ids: HashMap<[u32; 3], usize> = HashMap::new();
        let welded: Vec<usize> = self
            .positions
            .iter()
            .map(|p| {
                let next = ids.len();
                *ids.entry(p.to_array().map(f32::to_bits)).or_insert(next)
            })
            .collect();

        let mut directed: HashMap<(usize, usize), u32> = HashMap::new();
        for t in self.indices.chunks_exact(3) {
            let [a, b, c] = [welded[t[0] as usize], welded[t[1] as usize], welded[t[2] as usize]];
            for edge in [(a, b), (b, c), (c, a)] {
                *directed.entry(edge).or_default() += 1;
            }
        }
        directed
            .iter()
            .filter(|&(&(a, b), &count)| count != 1 || directed.get(&(b, a)) != Some(&1))
            .count()
    }

    /// Move the pivot to the top-centre of the bounding box.
    ///
    /// After this X and Z are symmetric about zero and the highest vertex
    /// sits at Y = 0. The translation is stored in `offset`.
    pub fn recenter(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let center = bounds.center();
        let shift = Vec3::new(-center.x, -bounds.max.y, -center.z);
        for p in &mut self.positions {
            *p += shift;
        }
        self.offset += shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit right tetrahedron, faces wound outward
    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        let o = mesh.push_vertex(Vec3::ZERO);
        let x = mesh.push_vertex(Vec3::X);
        let y = mesh.push_vertex(Vec3::Y);
        let z = mesh.push_vertex(Vec3::Z);
        mesh.push_triangle(o, y, x);
        mesh.push_triangle(o, x, z);
        mesh.push_triangle(o, z, y);
        mesh.push_triangle(x, y, z);
        mesh
    }

    #[test]
    fn test_vertex_channels() {
        let mut mesh = Mesh::new();
        let i = mesh.push_vertex(Vec3::new(10.0, 20.0, 5.0));
        assert_eq!(i, 0);
        assert_eq!(mesh.grid_coords[0], Vec3::new(10.0, 20.0, 5.0));
        assert_eq!(mesh.colors[0], Vec4::new(1.0, 2.0, 0.5, 1.0));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_signed_volume() {
        let mesh = tetrahedron();
        assert_eq!(mesh.triangle_count(), 4);
        assert!((mesh.signed_volume() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_open_edges() {
        let mut mesh = tetrahedron();
        assert_eq!(mesh.open_edges(), 0);

        // a duplicate of vertex 0 still welds onto the same corner
        let o = mesh.push_vertex(Vec3::ZERO);
        mesh.indices[0] = o;
        assert_eq!(mesh.open_edges(), 0);

        mesh.indices.truncate(9);
        assert_eq!(mesh.open_edges(), 3);
    }

    #[test]
    fn test_normals_length_checked() {
        let mut mesh = tetrahedron();
        assert!(!mesh.set_normals(vec![Vec3::Y; 3]));
        assert!(mesh.normals().is_none());
        assert!(mesh.set_normals(vec![Vec3::Y; 4]));
        assert_eq!(mesh.normals().map(|n| n.len()), Some(4));
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut a = tetrahedron();
        let b = tetrahedron();
        a.append(b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangle_count(), 8);
        assert!(a.indices[12..].iter().all(|i| *i >= 4));
        assert!((a.signed_volume() - 2.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_recenter() {
        let mut mesh = Mesh::new();
        mesh.push_vertex(Vec3::new(0.5, 0.5, 1.0));
        mesh.push_vertex(Vec3::new(3.5, 2.5, 3.0));
        mesh.recenter();

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.5, -2.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.5, 0.0, 1.0));
        assert_eq!(mesh.offset, Vec3::new(-2.0, -2.5, -2.0));
        // grid coordinates are left untouched
        assert_eq!(mesh.grid_coords[1], Vec3::new(3.5, 2.5, 3.0));
        let lattice = mesh.lattice_bounds().unwrap();
        assert_eq!(lattice.min, Vec3::new(0.5, 0.5, 1.0));
        assert_eq!(lattice.max, Vec3::new(3.5, 2.5, 3.0));
    }

    #[test]
    fn test_recenter_empty() {
        let mut mesh = Mesh::new();
        mesh.recenter();
        assert_eq!(mesh.offset, Vec3::ZERO);
        assert!(mesh.bounds().is_none());
    }
}
