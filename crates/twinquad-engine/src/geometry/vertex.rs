use bytemuck::{Pod, Zeroable};

/// Flat-mode vertex: 2D position + texcoord.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex2 {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// Cube-mode vertex: 3D position + texcoord.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex3 {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// How the bytes of one vertex split into attributes.
///
/// Attribute 0 is the position (`position_components` floats at offset 0),
/// attribute 1 the texcoord (two floats at `tex_coord_offset`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    pub stride: usize,
    pub position_components: usize,
    pub tex_coord_offset: usize,
}

impl VertexLayout {
    pub const POSITION_2D: Self = Self::for_position(2);
    pub const POSITION_3D: Self = Self::for_position(3);

    const fn for_position(components: usize) -> Self {
        let float = std::mem::size_of::<f32>();
        Self {
            stride: (components + 2) * float,
            position_components: components,
            tex_coord_offset: components * float,
        }
    }
}

/// Vertex types a `Mesh` can be built from.
pub trait MeshVertex: Pod {
    const LAYOUT: VertexLayout;
}

impl MeshVertex for Vertex2 {
    const LAYOUT: VertexLayout = VertexLayout::POSITION_2D;
}

impl MeshVertex for Vertex3 {
    const LAYOUT: VertexLayout = VertexLayout::POSITION_3D;
}
