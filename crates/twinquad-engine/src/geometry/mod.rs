//! Vertex formats and the two built-in meshes.

mod mesh;
mod vertex;

pub use mesh::{cube_vertices, expected_shape, Mesh, QUAD_VERTICES};
pub use vertex::{MeshVertex, Vertex2, Vertex3, VertexLayout};
