use std::ffi::CString;
use std::num::NonZeroU32;

use glow::HasContext;
use glutin::config::{ColorBufferType, Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface as _, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::config::RenderMode;
use crate::error::{RenderError, RenderResult};

use super::format::{ConfigTraits, PixelFormatRequest};

const REQUIRED_VERSION: (u32, u32) = (3, 3);

/// A current OpenGL 3.3 core context bound to one window surface.
pub struct GlSurface {
    gl: glow::Context,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    size: (u32, u32),
}

fn traits_of(config: &Config) -> ConfigTraits {
    let (red, green, blue) = match config.color_buffer_type() {
        Some(ColorBufferType::Rgb { r_size, g_size, b_size }) => (r_size, g_size, b_size),
        _ => (0, 0, 0),
    };
    ConfigTraits {
        red,
        green,
        blue,
        alpha: config.alpha_size(),
        depth: config.depth_size(),
        stencil: config.stencil_size(),
        samples: config.num_samples(),
        hardware_accelerated: config.hardware_accelerated(),
    }
}

impl GlSurface {
    /// Creates the window, negotiates a pixel format and makes a 3.3 core
    /// context current on it.
    ///
    /// On WGL, glutin resolves the ARB format and context extensions through a
    /// throwaway window before creating the real one.
    pub fn create(
        event_loop: &ActiveEventLoop,
        attributes: WindowAttributes,
        mode: RenderMode,
    ) -> RenderResult<(Window, Self)> {
        let request = PixelFormatRequest::for_mode(mode);
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(request.alpha_bits)
            .with_depth_size(request.depth_bits)
            .with_stencil_size(request.stencil_bits)
            .with_single_buffering(false)
            .with_transparency(false);

        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, |configs| {
                let mut configs: Vec<Config> = configs.collect();
                let offered: Vec<ConfigTraits> = configs.iter().map(traits_of).collect();
                // glutin never calls the picker with an empty list.
                configs.swap_remove(request.choose(&offered))
            })
            .map_err(|e| RenderError::surface(format!("pixel format negotiation failed: {e}")))?;

        let window = window.ok_or_else(|| RenderError::Window("no window was created".into()))?;

        let traits = traits_of(&config);
        if request.score(&traits).is_none() {
            return Err(RenderError::surface(format!(
                "no pixel format satisfies {request:?} (best offered: {traits:?})"
            )));
        }
        log::debug!("pixel format: {traits:?}");

        let raw_handle = window
            .window_handle()
            .map_err(|e| RenderError::Window(e.to_string()))?
            .as_raw();

        let (major, minor) = REQUIRED_VERSION;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major as u8, minor as u8))))
            .with_debug(cfg!(debug_assertions))
            .build(Some(raw_handle));

        let display = config.display();
        let not_current = unsafe { display.create_context(&config, &context_attributes) }
            .map_err(|e| RenderError::surface(format!("OpenGL {major}.{minor} core context: {e}")))?;

        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::default())
            .map_err(|e| RenderError::surface(e.to_string()))?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(|e| RenderError::surface(format!("window surface: {e}")))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|e| RenderError::surface(format!("make current: {e}")))?;

        vsync_enabled(surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)));

        let mut gl = unsafe {
            glow::Context::from_loader_function(|symbol| {
                CString::new(symbol).map_or(std::ptr::null(), |s| display.get_proc_address(&s))
            })
        };

        let version = gl.version();
        if (version.major, version.minor) < REQUIRED_VERSION {
            return Err(RenderError::EntryPoint(format!(
                "OpenGL {major}.{minor} core (driver reports {}.{})",
                version.major, version.minor
            )));
        }

        unsafe {
            log::info!(
                "OpenGL {} on {}",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );

            if gl.supports_debug() {
                gl.enable(glow::DEBUG_OUTPUT);
                gl.debug_message_callback(forward_debug_message);
            }
        }

        let inner = window.inner_size();
        let size = (inner.width.max(1), inner.height.max(1));

        Ok((
            window,
            Self {
                gl,
                surface,
                context,
                size,
            },
        ))
    }

    #[inline]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Client area at creation, physical pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn swap_buffers(&self) -> RenderResult<()> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| RenderError::surface(format!("swap buffers: {e}")))
    }
}

/// Swap control is optional: without it frames still present, just unsynced.
fn vsync_enabled(result: glutin::error::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("OpenGL swap interval unavailable, presenting without vsync: {e}");
            false
        }
    }
}

fn forward_debug_message(_source: u32, _kind: u32, id: u32, severity: u32, message: &str) {
    let level = match severity {
        glow::DEBUG_SEVERITY_HIGH => log::Level::Error,
        glow::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
        glow::DEBUG_SEVERITY_LOW => log::Level::Info,
        _ => log::Level::Debug,
    };
    log::log!(target: "twinquad::gl", level, "[{id:#x}] {message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use glutin::error::ErrorKind;

    #[test]
    fn missing_swap_control_is_not_fatal() {
        assert!(vsync_enabled(Ok(())));
        assert!(!vsync_enabled(Err(ErrorKind::NotSupported("swap control").into())));
    }
}
