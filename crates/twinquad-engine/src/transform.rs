//! Per-frame view and projection matrices.
//!
//! Both backends receive the same view matrix each frame. In cube mode they
//! also receive a projection, built with the depth formula their clip space
//! expects.

use crate::backend::DepthConvention;
use crate::config::RenderMode;
use crate::math::{Mat4, OrthoBounds};

/// Uniform scale applied to the flat quad.
pub const QUAD_SCALE: f32 = 0.6;

/// Fixed tilt around X so the top face of the cube is visible, radians.
pub const CUBE_TILT: f32 = 0.45;

/// Radius of the cube's orbit on the X/Z plane, view units.
pub const ORBIT_RADIUS: f32 = 0.5;

/// View-space depth of the orbit centre, halfway into the view volume.
pub const CUBE_DEPTH: f32 = -50.0;

/// Half extent of the orthographic volume along Y.
pub const ORTHO_HALF_HEIGHT: f32 = 2.0;
pub const ORTHO_NEAR: f32 = 0.0;
pub const ORTHO_FAR: f32 = 100.0;

/// Aspect correction factor for a client area: `height / width`.
///
/// Multiplying X by this keeps a unit square square on screen.
pub fn aspect_correction(width: u32, height: u32) -> f32 {
    height.max(1) as f32 / width.max(1) as f32
}

/// Flat mode view: `diag(aspect * 0.6, 0.6, 1, 1)`, independent of time.
pub fn quad_view(aspect: f32) -> Mat4 {
    Mat4::scale(aspect * QUAD_SCALE, QUAD_SCALE, 1.0)
}

/// Y rotation angle of the cube at elapsed time `t`.
#[inline]
pub fn cube_rotation_angle(t: f32) -> f32 {
    -t
}

/// Cube mode view: `tilt * rotation * translation`, grouped left to right.
pub fn cube_view(t: f32) -> Mat4 {
    let tilt = Mat4::rotation_x(CUBE_TILT);
    let rotation = Mat4::rotation_y(cube_rotation_angle(t));
    let (s, c) = t.sin_cos();
    let translation = Mat4::translation(ORBIT_RADIUS * s, 0.0, CUBE_DEPTH + ORBIT_RADIUS * c);
    (tilt * rotation) * translation
}

/// Orthographic bounds for a client area with the given aspect correction.
///
/// The vertical extent is fixed; the horizontal one widens for wide windows.
pub fn cube_bounds(aspect: f32) -> OrthoBounds {
    let half_width = ORTHO_HALF_HEIGHT / aspect.max(f32::EPSILON);
    OrthoBounds::symmetric(half_width, ORTHO_HALF_HEIGHT, ORTHO_NEAR, ORTHO_FAR)
}

/// Projection for the given clip-space depth convention.
pub fn projection(convention: DepthConvention, bounds: OrthoBounds) -> Mat4 {
    match convention {
        DepthConvention::NegativeOneToOne => Mat4::ortho_gl(bounds),
        DepthConvention::ZeroToOne => Mat4::ortho_d3d(bounds),
    }
}

/// Matrices pushed to a backend's program for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformUniforms {
    pub view: Mat4,
    /// Present only in cube mode.
    pub projection: Option<Mat4>,
}

impl TransformUniforms {
    /// Computes this frame's matrices for one backend.
    pub fn compute(
        mode: RenderMode,
        aspect: f32,
        elapsed: f32,
        convention: DepthConvention,
    ) -> Self {
        match mode {
            RenderMode::Flat => Self {
                view: quad_view(aspect),
                projection: None,
            },
            RenderMode::Cube => Self {
                view: cube_view(elapsed),
                projection: Some(projection(convention, cube_bounds(aspect))),
            },
        }
    }

    /// Projection, or identity when the mode has none.
    pub fn projection_or_identity(&self) -> Mat4 {
        self.projection.unwrap_or(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SceneClock;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quad_view_is_diagonal_for_any_aspect() {
        for a in [0.25f32, 0.5, 0.5625, 1.0, 2.0, 3.7] {
            let m = quad_view(a);
            for r in 0..4 {
                for c in 0..4 {
                    if r != c {
                        assert_eq!(m.get(r, c), 0.0, "aspect {a}, ({r}, {c})");
                    }
                }
            }
            assert_abs_diff_eq!(m.get(0, 0), a * 0.6);
            assert_abs_diff_eq!(m.get(1, 1), 0.6);
            assert_eq!(m.get(2, 2), 1.0);
            assert_eq!(m.get(3, 3), 1.0);
        }
    }

    #[test]
    fn tall_window_gives_wider_x_scale() {
        // Height:width of 2:1 is an aspect correction of 2.
        let aspect = aspect_correction(400, 800);
        assert_eq!(aspect, 2.0);

        for convention in [DepthConvention::NegativeOneToOne, DepthConvention::ZeroToOne] {
            let u = TransformUniforms::compute(RenderMode::Flat, aspect, 12.0, convention);
            assert_abs_diff_eq!(u.view.get(0, 0), 1.2, epsilon = 1e-6);
            assert_abs_diff_eq!(u.view.get(1, 1), 0.6, epsilon = 1e-6);
            assert!(u.projection.is_none());
        }
    }

    #[test]
    fn flat_view_ignores_time() {
        let a = TransformUniforms::compute(RenderMode::Flat, 0.75, 0.0, DepthConvention::ZeroToOne);
        let b = TransformUniforms::compute(RenderMode::Flat, 0.75, 9.5, DepthConvention::ZeroToOne);
        assert_eq!(a, b);
    }

    #[test]
    fn aspect_correction_tolerates_zero_size() {
        assert_eq!(aspect_correction(0, 0), 1.0);
    }

    #[test]
    fn cube_view_composes_tilt_rotation_translation_in_order() {
        let t = 0.8f32;
        let expected = Mat4::rotation_x(CUBE_TILT)
            * Mat4::rotation_y(-t)
            * Mat4::translation(ORBIT_RADIUS * t.sin(), 0.0, CUBE_DEPTH + ORBIT_RADIUS * t.cos());
        let got = cube_view(t);
        for (x, y) in got.to_array().iter().zip(expected.to_array().iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-6);
        }

        let reordered = Mat4::rotation_y(-t)
            * Mat4::rotation_x(CUBE_TILT)
            * Mat4::translation(ORBIT_RADIUS * t.sin(), 0.0, CUBE_DEPTH + ORBIT_RADIUS * t.cos());
        assert_ne!(got, reordered);
    }

    #[test]
    fn cube_orbits_on_xz_plane() {
        // The cube centre follows the translation row only.
        let centre = |t: f32| cube_view(t).transform([0.0, 0.0, 0.0, 1.0]);
        let a = centre(0.0);
        let b = centre(std::f32::consts::FRAC_PI_2);
        assert_abs_diff_eq!(a[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(a[2], CUBE_DEPTH + ORBIT_RADIUS, epsilon = 1e-5);
        assert_abs_diff_eq!(b[0], ORBIT_RADIUS, epsilon = 1e-6);
        assert_abs_diff_eq!(b[2], CUBE_DEPTH, epsilon = 1e-5);
        assert_eq!(a[1], 0.0);
        assert_eq!(b[1], 0.0);
    }

    #[test]
    fn hundred_fixed_steps_rotate_by_minus_one_radian() {
        let mut clock = SceneClock::fixed(0.01);
        let mut last = None;
        for _ in 0..100 {
            last = Some(clock.tick());
        }
        let ft = last.unwrap();
        assert_eq!(ft.frame_index, 99);
        assert_abs_diff_eq!(ft.elapsed, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(cube_rotation_angle(ft.elapsed), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn cube_projection_follows_backend_convention() {
        let gl = TransformUniforms::compute(RenderMode::Cube, 1.0, 0.0, DepthConvention::NegativeOneToOne);
        let d3d = TransformUniforms::compute(RenderMode::Cube, 1.0, 0.0, DepthConvention::ZeroToOne);
        assert_eq!(gl.view, d3d.view);

        let gl_p = gl.projection.unwrap();
        let d3d_p = d3d.projection.unwrap();
        assert_abs_diff_eq!(gl_p.get(2, 2), -2.0 / 100.0);
        assert_abs_diff_eq!(d3d_p.get(2, 2), -1.0 / 100.0);
        assert_eq!(gl_p.get(0, 0), d3d_p.get(0, 0));
    }

    #[test]
    fn cube_stays_inside_both_clip_volumes() {
        let corner = [0.5, 0.5, 0.5, 1.0];
        for t in [0.0f32, 1.0, 2.5, 4.0] {
            for (convention, lo) in [
                (DepthConvention::NegativeOneToOne, -1.0),
                (DepthConvention::ZeroToOne, 0.0),
            ] {
                let u = TransformUniforms::compute(RenderMode::Cube, 1.0, t, convention);
                let clip = (u.view * u.projection.unwrap()).transform(corner);
                assert!(clip[2] > lo && clip[2] < 1.0, "t={t} z={}", clip[2]);
                assert!(clip[0].abs() < 1.0 && clip[1].abs() < 1.0);
            }
        }
    }

    #[test]
    fn wide_window_widens_horizontal_bounds() {
        let b = cube_bounds(aspect_correction(1600, 800));
        assert_eq!(b.right, 4.0);
        assert_eq!(b.top, 2.0);
        assert_eq!(b.near, 0.0);
        assert_eq!(b.far, 100.0);
    }

    #[test]
    fn flat_mode_projection_falls_back_to_identity() {
        let u = TransformUniforms::compute(RenderMode::Flat, 1.0, 0.0, DepthConvention::ZeroToOne);
        assert_eq!(u.projection_or_identity(), Mat4::IDENTITY);
    }
}
