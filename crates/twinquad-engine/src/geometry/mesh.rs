use crate::config::RenderMode;
use crate::error::{RenderError, RenderResult};

use super::vertex::{MeshVertex, Vertex2, Vertex3, VertexLayout};

/// Immutable vertex list ready for upload, drawn as a non-indexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh {
    bytes: Vec<u8>,
    vertex_count: usize,
    layout: VertexLayout,
}

const UPPER_LEFT: [f32; 2] = [-1.0, 1.0];
const UPPER_RIGHT: [f32; 2] = [1.0, 1.0];
const LOWER_LEFT: [f32; 2] = [-1.0, -1.0];
const LOWER_RIGHT: [f32; 2] = [1.0, -1.0];

/// Two counter-clockwise triangles covering `[-1, 1]^2`.
///
/// Texcoord (0, 0) sits on the lower-left corner.
pub const QUAD_VERTICES: [Vertex2; 6] = [
    Vertex2 { position: LOWER_LEFT, tex_coord: [0.0, 0.0] },
    Vertex2 { position: LOWER_RIGHT, tex_coord: [1.0, 0.0] },
    Vertex2 { position: UPPER_RIGHT, tex_coord: [1.0, 1.0] },
    Vertex2 { position: UPPER_RIGHT, tex_coord: [1.0, 1.0] },
    Vertex2 { position: UPPER_LEFT, tex_coord: [0.0, 1.0] },
    Vertex2 { position: LOWER_LEFT, tex_coord: [0.0, 0.0] },
];

const H: f32 = 0.5;

/// Builds one face from its corners as seen from outside, CCW from lower-left.
const fn face(ll: [f32; 3], lr: [f32; 3], ur: [f32; 3], ul: [f32; 3]) -> [Vertex3; 6] {
    [
        Vertex3 { position: ll, tex_coord: [0.0, 0.0] },
        Vertex3 { position: lr, tex_coord: [1.0, 0.0] },
        Vertex3 { position: ur, tex_coord: [1.0, 1.0] },
        Vertex3 { position: ur, tex_coord: [1.0, 1.0] },
        Vertex3 { position: ul, tex_coord: [0.0, 1.0] },
        Vertex3 { position: ll, tex_coord: [0.0, 0.0] },
    ]
}

const FRONT: [Vertex3; 6] = face([-H, -H, H], [H, -H, H], [H, H, H], [-H, H, H]);
const RIGHT: [Vertex3; 6] = face([H, -H, H], [H, -H, -H], [H, H, -H], [H, H, H]);
const TOP: [Vertex3; 6] = face([-H, H, H], [H, H, H], [H, H, -H], [-H, H, -H]);

/// Unit cube centred on the origin: front (+Z), right (+X) and top (+Y)
/// faces, two triangles each, the full texture on every face.
pub fn cube_vertices() -> Vec<Vertex3> {
    [FRONT, RIGHT, TOP].concat()
}

/// Vertex count and layout a mode draws.
pub fn expected_shape(mode: RenderMode) -> (usize, VertexLayout) {
    match mode {
        RenderMode::Flat => (QUAD_VERTICES.len(), VertexLayout::POSITION_2D),
        RenderMode::Cube => (18, VertexLayout::POSITION_3D),
    }
}

impl Mesh {
    pub fn from_vertices<V: MeshVertex>(vertices: &[V]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(vertices).to_vec(),
            vertex_count: vertices.len(),
            layout: V::LAYOUT,
        }
    }

    pub fn quad() -> Self {
        Self::from_vertices(&QUAD_VERTICES)
    }

    pub fn cube() -> Self {
        Self::from_vertices(&cube_vertices())
    }

    /// The mesh a mode draws.
    pub fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Flat => Self::quad(),
            RenderMode::Cube => Self::cube(),
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Rejects a mesh whose count or stride differs from what `mode` draws.
    pub fn validate_for(&self, mode: RenderMode) -> RenderResult<()> {
        let (expected_vertices, expected_layout) = expected_shape(mode);
        if self.vertex_count != expected_vertices || self.layout != expected_layout {
            return Err(RenderError::GeometryMismatch {
                mode,
                expected_vertices,
                expected_stride: expected_layout.stride,
                vertices: self.vertex_count,
                stride: self.layout.stride,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn quad_has_six_vertices_of_stride_16() {
        let mesh = Mesh::quad();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.layout().stride, 16);
        assert_eq!(mesh.bytes().len(), 6 * 16);
        assert!(mesh.validate_for(RenderMode::Flat).is_ok());
    }

    #[test]
    fn cube_has_eighteen_vertices_of_stride_20() {
        let mesh = Mesh::cube();
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.layout().stride, 20);
        assert_eq!(mesh.bytes().len(), 18 * 20);
        assert!(mesh.validate_for(RenderMode::Cube).is_ok());
    }

    #[test]
    fn mismatched_mode_is_rejected() {
        let err = Mesh::quad().validate_for(RenderMode::Cube).unwrap_err();
        assert!(matches!(
            err,
            RenderError::GeometryMismatch {
                expected_vertices: 18,
                expected_stride: 20,
                vertices: 6,
                stride: 16,
                ..
            }
        ));
        assert!(Mesh::cube().validate_for(RenderMode::Flat).is_err());
    }

    #[test]
    fn right_count_wrong_stride_is_rejected() {
        let six_3d: Vec<Vertex3> = cube_vertices().into_iter().take(6).collect();
        let mesh = Mesh::from_vertices(&six_3d);
        assert!(mesh.validate_for(RenderMode::Flat).is_err());
    }

    #[test]
    fn quad_triangles_are_counter_clockwise() {
        for tri in QUAD_VERTICES.chunks(3) {
            let [a, b, c] = [tri[0].position, tri[1].position, tri[2].position];
            let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(area > 0.0);
        }
    }

    #[test]
    fn quad_texcoords_follow_corners() {
        for v in QUAD_VERTICES {
            let expected = [(v.position[0] + 1.0) / 2.0, (v.position[1] + 1.0) / 2.0];
            assert_eq!(v.tex_coord, expected);
        }
    }

    #[test]
    fn cube_faces_wind_outward() {
        for tri in cube_vertices().chunks(3) {
            let [a, b, c] = [tri[0].position, tri[1].position, tri[2].position];
            let normal = cross(sub(b, a), sub(c, a));
            let centroid = [
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ];
            assert!(dot(normal, centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }
}
