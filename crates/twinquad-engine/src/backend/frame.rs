use crate::config::RenderMode;
use crate::error::RenderResult;
use crate::geometry::Mesh;
use crate::shader::ShaderSources;
use crate::texture::{SamplerDesc, TextureImage};
use crate::transform::{aspect_correction, TransformUniforms};

use super::RenderBackend;

/// Lifecycle of one backend.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BackendState {
    /// Created; program, geometry or texture may still be missing.
    #[default]
    Initializing,
    /// Fully set up; frames are drawn.
    Rendering,
    /// GPU objects released. Terminal.
    ShutDown,
}

impl BackendState {
    #[inline]
    pub fn is_rendering(self) -> bool {
        self == BackendState::Rendering
    }

    /// `Initializing -> Rendering`. Returns whether the transition happened.
    pub fn begin_rendering(&mut self) -> bool {
        if *self == BackendState::Initializing {
            *self = BackendState::Rendering;
            true
        } else {
            false
        }
    }

    pub fn shut_down(&mut self) {
        *self = BackendState::ShutDown;
    }
}

/// One-time setup: program, then geometry, then texture.
pub fn prepare(
    backend: &mut dyn RenderBackend,
    sources: &ShaderSources,
    mesh: &Mesh,
    image: &TextureImage,
) -> RenderResult<()> {
    backend.build_program(sources)?;
    backend.upload_geometry(mesh)?;
    backend.upload_texture(image, SamplerDesc::PIXEL_EXACT)?;
    log::debug!("{} setup complete", backend.kind());
    Ok(())
}

/// One loop iteration for one backend: transform update, draw, present.
///
/// Does nothing unless `state` is `Rendering`.
pub fn run_frame(
    backend: &mut dyn RenderBackend,
    state: BackendState,
    mode: RenderMode,
    elapsed: f32,
) -> RenderResult<()> {
    if !state.is_rendering() {
        return Ok(());
    }

    let (width, height) = backend.client_size();
    let uniforms = TransformUniforms::compute(
        mode,
        aspect_correction(width, height),
        elapsed,
        backend.depth_convention(),
    );

    backend.update_transform(&uniforms)?;
    backend.render_frame()?;
    backend.present()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, DepthConvention};
    use crate::error::RenderError;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        last_uniforms: Option<TransformUniforms>,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn record(&mut self, call: &'static str) -> RenderResult<()> {
            self.calls.push(call);
            if self.fail_on == Some(call) {
                return Err(RenderError::device(BackendKind::OpenGl, call));
            }
            Ok(())
        }
    }

    impl RenderBackend for Recorder {
        fn kind(&self) -> BackendKind {
            BackendKind::OpenGl
        }

        fn depth_convention(&self) -> DepthConvention {
            DepthConvention::NegativeOneToOne
        }

        fn client_size(&self) -> (u32, u32) {
            (400, 800)
        }

        fn build_program(&mut self, _: &ShaderSources) -> RenderResult<()> {
            self.record("build_program")
        }

        fn upload_geometry(&mut self, _: &Mesh) -> RenderResult<()> {
            self.record("upload_geometry")
        }

        fn upload_texture(&mut self, _: &TextureImage, sampler: SamplerDesc) -> RenderResult<()> {
            assert_eq!(sampler, SamplerDesc::PIXEL_EXACT);
            self.record("upload_texture")
        }

        fn update_transform(&mut self, uniforms: &TransformUniforms) -> RenderResult<()> {
            self.last_uniforms = Some(*uniforms);
            self.record("update_transform")
        }

        fn render_frame(&mut self) -> RenderResult<()> {
            self.record("render_frame")
        }

        fn present(&mut self) -> RenderResult<()> {
            self.record("present")
        }

        fn shutdown(&mut self) {
            self.calls.push("shutdown");
        }
    }

    fn sources() -> ShaderSources {
        let file = crate::shader::ShaderSource {
            path: "quad.hlsl".into(),
            text: String::new(),
        };
        ShaderSources::Hlsl { source: file }
    }

    fn image() -> TextureImage {
        TextureImage::from_rgba8(1, 1, vec![255; 4]).unwrap()
    }

    #[test]
    fn state_moves_forward_only() {
        let mut state = BackendState::default();
        assert_eq!(state, BackendState::Initializing);
        assert!(state.begin_rendering());
        assert!(state.is_rendering());
        assert!(!state.begin_rendering());

        state.shut_down();
        assert!(!state.begin_rendering());
        assert_eq!(state, BackendState::ShutDown);
    }

    #[test]
    fn prepare_runs_setup_in_order() {
        let mut backend = Recorder::default();
        prepare(&mut backend, &sources(), &Mesh::quad(), &image()).unwrap();
        assert_eq!(backend.calls, ["build_program", "upload_geometry", "upload_texture"]);
    }

    #[test]
    fn prepare_stops_at_first_failure() {
        let mut backend = Recorder {
            fail_on: Some("upload_geometry"),
            ..Recorder::default()
        };
        assert!(prepare(&mut backend, &sources(), &Mesh::quad(), &image()).is_err());
        assert_eq!(backend.calls, ["build_program", "upload_geometry"]);
    }

    #[test]
    fn frame_updates_draws_then_presents() {
        let mut backend = Recorder::default();
        run_frame(&mut backend, BackendState::Rendering, RenderMode::Flat, 3.0).unwrap();
        assert_eq!(backend.calls, ["update_transform", "render_frame", "present"]);

        // 400x800 client area: height:width of 2:1.
        let view = backend.last_uniforms.unwrap().view;
        assert!((view.get(0, 0) - 1.2).abs() < 1e-6);
        assert!((view.get(1, 1) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn frames_are_skipped_outside_rendering() {
        let mut backend = Recorder::default();
        for state in [BackendState::Initializing, BackendState::ShutDown] {
            run_frame(&mut backend, state, RenderMode::Cube, 1.0).unwrap();
        }
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn cube_frame_carries_projection() {
        let mut backend = Recorder::default();
        run_frame(&mut backend, BackendState::Rendering, RenderMode::Cube, 1.0).unwrap();
        assert!(backend.last_uniforms.unwrap().projection.is_some());
    }
}
