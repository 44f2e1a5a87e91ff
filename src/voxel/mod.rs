//! Voxel data structures and operations

pub mod material;
pub mod field;
pub mod builder;
pub mod editor;

pub use material::Material;
pub use field::VoxelField;
pub use builder::{build_voxel_field, HeightRemap};
pub use editor::dig;
