use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

/// 4x4 `f32` matrix in row-major storage, row-vector convention.
///
/// Points transform as `v' = v * M`, translation lives in the last row, and
/// `A * B` applies `A` first. The byte layout is what both shader programs read:
/// GLSL receives it untransposed (so it sees the column-major transpose and
/// multiplies `M * v`), HLSL declares it `row_major` and multiplies `mul(v, M)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub rows: [[f32; 4]; 4],
}

/// Bounds of an orthographic view volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoBounds {
    /// Symmetric box `[-half_width, half_width] x [-half_height, half_height]`.
    pub fn symmetric(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near,
            far,
        }
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    /// Right-handed rotation around +X by `angle` radians.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation around +Y by `angle` radians.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Orthographic projection mapping view depth to clip z in `[-1, 1]` (OpenGL).
    pub fn ortho_gl(b: OrthoBounds) -> Self {
        let (sx, sy, tx, ty) = ortho_xy(&b);
        let depth = b.far - b.near;
        Self::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, -2.0 / depth, 0.0],
            [tx, ty, -(b.far + b.near) / depth, 1.0],
        ])
    }

    /// Orthographic projection mapping view depth to clip z in `[0, 1]` (Direct3D).
    pub fn ortho_d3d(b: OrthoBounds) -> Self {
        let (sx, sy, tx, ty) = ortho_xy(&b);
        let depth = b.far - b.near;
        Self::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, -1.0 / depth, 0.0],
            [tx, ty, -b.near / depth, 1.0],
        ])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.rows[row][col]
    }

    /// Transforms a homogeneous row vector: `v * self`.
    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (c, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|k| v[k] * self.rows[k][c]).sum();
        }
        out
    }

    /// Flattened row-major elements, the order uploaded to the GPU.
    pub fn to_array(&self) -> [f32; 16] {
        bytemuck::cast(self.rows)
    }
}

fn ortho_xy(b: &OrthoBounds) -> (f32, f32, f32, f32) {
    let width = b.right - b.left;
    let height = b.top - b.bottom;
    (
        2.0 / width,
        2.0 / height,
        -(b.right + b.left) / width,
        -(b.top + b.bottom) / height,
    )
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.rows[r][k] * rhs.rows[k][c]).sum();
            }
        }
        Mat4 { rows: out }
    }
}
