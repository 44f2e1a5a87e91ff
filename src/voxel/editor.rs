//! Point edits on a voxel field.
//!
//! An edit clears one voxel and reports whether the mesh is stale; the
//! caller re-extracts the whole field. Taking `&mut VoxelField` keeps an
//! edit from overlapping an extraction, which borrows the field shared.

use super::field::VoxelField;
use crate::core::types::{UVec3, Vec3};

/// Resolve a mesh-space point to the voxel under it.
///
/// `offset` is the translation recentering applied to the mesh built from
/// this field. Subtracting it puts the point back on the lattice, where it
/// is truncated to a cell; points outside the grid saturate to the edge.
pub fn locate(field: &VoxelField, point: Vec3, offset: Vec3) -> UVec3 {
    field.lattice_coords(point - offset)
}

/// Clear a single voxel. Returns `true` if it was solid.
pub fn dig_cell(field: &mut VoxelField, cell: UVec3) -> bool {
    let (x, y, z) = (cell.x as usize, cell.y as usize, cell.z as usize);
    if !field.material(x, y, z).is_solid() {
        return false;
    }
    field.clear(x, y, z);
    log::debug!("Dug voxel ({}, {}, {})", x, y, z);
    true
}

/// Clear the voxel under `point`.
///
/// Returns whether the field changed and needs a remesh. Empty targets
/// and fields with no cells are silent no-ops.
pub fn dig(field: &mut VoxelField, point: Vec3, offset: Vec3) -> bool {
    if field.densities().is_empty() {
        return false;
    }
    let cell = locate(field, point, offset);
    dig_cell(field, cell)
}
