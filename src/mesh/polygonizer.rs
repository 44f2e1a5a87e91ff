//! Per-cell triangulation strategies.
//!
//! A [`Cell`] holds the eight corner densities of one lattice cube. A
//! [`Polygonizer`] turns it into triangles by naming, for every triangle
//! vertex, the pair of cell corners whose connecting edge the surface
//! crosses. [`CellSink`] interpolates those crossings and shares a vertex
//! between triangles that name the same corner pair.

use super::mesh::Mesh;
use super::tables::{
    CORNERS, EDGE_CORNERS, EDGE_TABLE, TETRA_EDGE_CORNERS, TETRA_EDGE_TABLE, TETRA_TRIANGLE_TABLE,
    TETRAHEDRA, TRIANGLE_TABLE,
};
use crate::core::types::{UVec3, Vec3};
use crate::voxel::VoxelField;

/// Densities at the eight corners of the cube whose lowest corner is `origin`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub origin: UVec3,
    pub density: [f32; 8],
}

impl Cell {
    /// Read the cube at `(x, y, z)`. The caller keeps `x + 1` etc. in range.
    pub fn gather(field: &VoxelField, x: usize, y: usize, z: usize) -> Self {
        let density = CORNERS.map(|[dx, dy, dz]| {
            field.density(x + dx as usize, y + dy as usize, z + dz as usize)
        });
        Self {
            origin: UVec3::new(x as u32, y as u32, z as u32),
            density,
        }
    }

    pub fn corner(&self, i: usize) -> Vec3 {
        (self.origin + UVec3::from_array(CORNERS[i])).as_vec3()
    }

    /// Point on edge `a-b` where the density crosses `iso`.
    ///
    /// Equal densities put the point at the midpoint.
    pub fn crossing(&self, a: usize, b: usize, iso: f32) -> Vec3 {
        let (da, db) = (self.density[a], self.density[b]);
        let t = if db == da { 0.5 } else { (iso - da) / (db - da) };
        self.corner(a).lerp(self.corner(b), t)
    }

    /// Case index over `corners`, bit `i` set when `corners[i]` is outside
    pub fn case_index(&self, corners: &[usize], iso: f32) -> usize {
        corners
            .iter()
            .enumerate()
            .filter(|(_, c)| self.density[**c] <= iso)
            .fold(0, |case, (i, _)| case | 1 << i)
    }
}

const NO_VERTEX: u32 = u32::MAX;

/// Collects one cell's triangles into a mesh.
pub struct CellSink<'a> {
    cell: &'a Cell,
    iso: f32,
    mesh: &'a mut Mesh,
    vertices: [u32; 64],
}

impl<'a> CellSink<'a> {
    pub fn new(cell: &'a Cell, iso: f32, mesh: &'a mut Mesh) -> Self {
        Self {
            cell,
            iso,
            mesh,
            vertices: [NO_VERTEX; 64],
        }
    }

    fn vertex(&mut self, [a, b]: [usize; 2]) -> u32 {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let slot = lo * 8 + hi;
        if self.vertices[slot] == NO_VERTEX {
            let p = self.cell.crossing(lo, hi, self.iso);
            self.vertices[slot] = self.mesh.push_vertex(p);
        }
        self.vertices[slot]
    }

    /// Emit a triangle whose vertices lie on the three given corner-pair edges
    pub fn triangle(&mut self, edges: [[usize; 2]; 3]) {
        let [a, b, c] = edges.map(|e| self.vertex(e));
        self.mesh.push_triangle(a, b, c);
    }
}

/// Triangulation strategy for a single cell
pub trait Polygonizer: Send + Sync {
    fn polygonize(&self, cell: &Cell, iso: f32, sink: &mut CellSink<'_>);
}

/// Direct 256-case cube lookup
#[derive(Clone, Copy, Debug, Default)]
pub struct MarchingCubes;

const CUBE_CORNERS: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

impl Polygonizer for MarchingCubes {
    fn polygonize(&self, cell: &Cell, iso: f32, sink: &mut CellSink<'_>) {
        let case = cell.case_index(&CUBE_CORNERS, iso);
        if EDGE_TABLE[case] == 0 {
            return;
        }
        for tri in TRIANGLE_TABLE[case].chunks_exact(3).take_while(|t| t[0] >= 0) {
            sink.triangle([
                EDGE_CORNERS[tri[0] as usize],
                EDGE_CORNERS[tri[1] as usize],
                EDGE_CORNERS[tri[2] as usize],
            ]);
        }
    }
}

/// Splits each cube into six tetrahedra and triangulates those.
///
/// Produces more triangles than [`MarchingCubes`] but has no ambiguous cases.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarchingTetrahedra;

impl Polygonizer for MarchingTetrahedra {
    fn polygonize(&self, cell: &Cell, iso: f32, sink: &mut CellSink<'_>) {
        for tet in &TETRAHEDRA {
            let case = cell.case_index(tet, iso);
            if TETRA_EDGE_TABLE[case] == 0 {
                continue;
            }
            let edge = |e: i8| {
                let [a, b] = TETRA_EDGE_CORNERS[e as usize];
                [tet[a], tet[b]]
            };
            for tri in TETRA_TRIANGLE_TABLE[case].chunks_exact(3).take_while(|t| t[0] >= 0) {
                sink.triangle([edge(tri[0]), edge(tri[1]), edge(tri[2])]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Material;

    fn cell(density: [f32; 8]) -> Cell {
        Cell {
            origin: UVec3::new(2, 3, 4),
            density,
        }
    }

    fn run(polygonizer: &dyn Polygonizer, cell: &Cell) -> Mesh {
        let mut mesh = Mesh::new();
        let mut sink = CellSink::new(cell, 0.5, &mut mesh);
        polygonizer.polygonize(cell, 0.5, &mut sink);
        mesh
    }

    #[test]
    fn test_gather_corner_order() {
        let mut field = VoxelField::new(3, 3, 3);
        field.set(2, 2, 1, Material::Rock);
        let cell = Cell::gather(&field, 1, 1, 1);
        assert_eq!(cell.density, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(cell.corner(6), Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_crossing() {
        let c = cell([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(c.crossing(0, 1, 0.5), Vec3::new(2.5, 3.0, 4.0));
        let c = cell([0.0, 0.8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let p = c.crossing(0, 1, 0.5);
        assert!((p.x - 2.625).abs() < 1e-6);
        // flat edge falls back to the midpoint
        assert_eq!(c.crossing(2, 3, 0.5), Vec3::new(2.5, 4.0, 4.0));
    }

    #[test]
    fn test_case_index() {
        let c = cell([1.0, 0.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0]);
        // corners 1 and 3 are outside, 0.5 counts as outside
        assert_eq!(c.case_index(&CUBE_CORNERS, 0.5), 0b0000_1010);
        assert_eq!(c.case_index(&[3, 0], 0.5), 0b01);
    }

    #[test]
    fn test_uniform_cells_emit_nothing() {
        for value in [0.0, 1.0] {
            let c = cell([value; 8]);
            assert!(run(&MarchingCubes, &c).is_empty());
            assert!(run(&MarchingTetrahedra, &c).is_empty());
        }
    }

    #[test]
    fn test_single_corner_cube() {
        let mut density = [0.0; 8];
        density[0] = 1.0;
        let mesh = run(&MarchingCubes, &cell(density));
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        let [a, b, c] = mesh.triangles().next().unwrap();
        // the triangle faces away from the solid corner at the origin
        let normal = (b - a).cross(c - a);
        assert!(normal.dot(Vec3::ONE) > 0.0);
    }

    #[test]
    fn test_shared_edges_share_vertices() {
        // half-solid cell: two triangles across a quad
        let mesh = run(&MarchingCubes, &cell([1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]));
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);

        let mesh = run(&MarchingTetrahedra, &cell([1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]));
        assert!(mesh.triangle_count() >= 2);
        // vertices are unique per corner pair
        for (i, a) in mesh.positions.iter().enumerate() {
            for b in &mesh.positions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
