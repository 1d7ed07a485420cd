use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::backend::{
    create_backend, prepare, run_frame, BackendKind, BackendOptions, BackendState, RenderBackend,
};
use crate::config::{BackendSelection, DemoConfig};
use crate::error::{RenderError, RenderResult};
use crate::geometry::Mesh;
use crate::shader::ShaderSources;
use crate::texture::TextureImage;
use crate::time::{FrameTime, SceneClock};

/// Entry point for the demo loop.
pub struct Runtime;

impl Runtime {
    /// Opens one window per selected backend and renders until any window is
    /// closed. Setup or frame failures end the loop and come back as `Err`.
    pub fn run(config: DemoConfig) -> Result<()> {
        anyhow::ensure!(
            config.fixed_step_is_valid(),
            "fixed time step must be finite and above zero, got {:?}",
            config.fixed_time_step
        );

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// One backend and the window it draws into.
struct BackendSlot {
    // Declared before `window` so the GPU objects go first.
    backend: Box<dyn RenderBackend>,
    window: Window,
    state: BackendState,
}

impl BackendSlot {
    fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    fn shutdown(&mut self) {
        if self.state != BackendState::ShutDown {
            self.backend.shutdown();
            self.state.shut_down();
        }
    }
}

struct AppState {
    config: DemoConfig,
    clock: SceneClock,
    slots: Vec<BackendSlot>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

/// Backends to open for a selection on this platform.
///
/// Unsupported backends are skipped with a warning while at least one
/// remains; otherwise the first unsupported one is the error.
fn resolve_backends(selection: BackendSelection) -> RenderResult<Vec<BackendKind>> {
    let (supported, unsupported): (Vec<BackendKind>, Vec<BackendKind>) =
        selection.kinds().iter().copied().partition(|k| k.is_supported());

    if let Some(&first) = unsupported.first() {
        if supported.is_empty() {
            return Err(RenderError::BackendUnavailable(first));
        }
        for kind in &unsupported {
            log::warn!("{kind} is not available on this platform; skipping its window");
        }
    }
    Ok(supported)
}

fn window_attributes(config: &DemoConfig, kind: BackendKind, slot: usize) -> WindowAttributes {
    let mut attributes = Window::default_attributes()
        .with_title(config.window_title(kind))
        .with_inner_size(config.window_size)
        .with_resizable(false)
        .with_maximized(config.maximized);

    if let Some(position) = config.window_position(slot) {
        attributes = attributes.with_position(position);
    }
    attributes
}

impl AppState {
    fn new(config: DemoConfig) -> Self {
        let clock = SceneClock::from_step(config.fixed_time_step);
        Self {
            config,
            clock,
            slots: Vec::new(),
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.failure = Some(error);
        self.request_exit(event_loop);
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown_all();
        self.exit_requested = true;
        event_loop.exit();
    }

    fn shutdown_all(&mut self) {
        for slot in &mut self.slots {
            slot.shutdown();
        }
    }

    /// Creates every window and backend, then runs their one-time setup.
    ///
    /// The texture is decoded once and dropped after the last upload.
    fn create_slots(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let kinds = resolve_backends(self.config.backends)?;
        let mode = self.config.mode;
        let options = BackendOptions {
            mode,
            clear_color: self.config.clear_color,
        };

        log::info!("starting {:?} mode with {:?}", mode, kinds);

        let texture_path = self.config.texture_path();
        let image = TextureImage::load(&texture_path).context("failed to load texture")?;
        log::info!(
            "texture {} ({}x{}, {} channels)",
            texture_path.display(),
            image.width(),
            image.height(),
            image.channels()
        );

        let mesh = Mesh::for_mode(mode);
        let shader_dir = self.config.shader_dir();

        for (index, &kind) in kinds.iter().enumerate() {
            let attributes = window_attributes(&self.config, kind, index);
            let (window, backend) = create_backend(event_loop, kind, attributes, options)
                .with_context(|| format!("failed to initialize {kind} backend"))?;

            let mut slot = BackendSlot {
                backend,
                window,
                state: BackendState::Initializing,
            };

            let sources = ShaderSources::load(&shader_dir, kind, mode)
                .with_context(|| format!("failed to load {kind} shaders"))?;
            prepare(slot.backend.as_mut(), &sources, &mesh, &image)
                .with_context(|| format!("{kind} setup failed"))?;

            slot.state.begin_rendering();
            slot.window.request_redraw();
            self.slots.push(slot);
        }

        drop(image);
        Ok(())
    }

    /// Renders every backend once, in slot order, with the same scene time.
    fn render_all(&mut self, time: FrameTime) -> Result<()> {
        let mode = self.config.mode;
        for slot in &mut self.slots {
            let kind = slot.kind();
            run_frame(slot.backend.as_mut(), slot.state, mode, time.elapsed)
                .with_context(|| format!("{kind} frame {} failed", time.frame_index))?;
        }
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.slots.is_empty() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_slots(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        self.clock.reset();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Poll);

        let time = self.clock.tick();
        if let Err(e) = self.render_all(time) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                let closed = self
                    .slots
                    .iter()
                    .find(|s| s.window.id() == window_id)
                    .map(BackendSlot::kind);
                if let Some(kind) = closed {
                    log::info!("{kind} window closed; shutting down");
                }
                self.request_exit(event_loop);
            }
            WindowEvent::Resized(size) => {
                // Surfaces keep their startup size.
                log::trace!("ignoring resize of {window_id:?} to {}x{}", size.width, size.height);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown_all();
        self.slots.clear();
    }
}
