//! Sampling domain geometry.
//!
//! Provides the continuous mesh extent, the tile grid layout that maps tiles
//! onto mosaic pixels, and the minimal scene/mesh model a bake starts from.

mod extent;
mod grid;
mod mesh;

pub use extent::MeshExtent;
pub use grid::{GridError, TileCursor, TileGridConfig};
pub use mesh::{parse_obj_vertices, Mesh, MeshError, ObjectKind, SceneObject};
