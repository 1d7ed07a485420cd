//! Startup configuration.
//!
//! Everything here is resolved once before the event loop starts and is
//! read-only afterwards. The values replace what used to be compile-time
//! switches (render mode, backend choice).

use std::path::{Path, PathBuf};

use winit::dpi::{LogicalPosition, LogicalSize};

use crate::backend::BackendKind;

/// What gets drawn.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RenderMode {
    /// Flat textured quad, fixed aspect-corrected scale, no depth.
    #[default]
    Flat,
    /// Rotating, orbiting textured cube with orthographic projection and depth.
    Cube,
}

impl RenderMode {
    #[inline]
    pub fn uses_depth(self) -> bool {
        matches!(self, RenderMode::Cube)
    }

    /// File stem shared by every shader of this mode.
    pub fn shader_stem(self) -> &'static str {
        match self {
            RenderMode::Flat => "quad",
            RenderMode::Cube => "cube",
        }
    }
}

/// Which backends get a window.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BackendSelection {
    /// One window per backend, rendered in lockstep.
    #[default]
    Both,
    OpenGl,
    Direct3d,
}

impl BackendSelection {
    /// Backends in the order they render within one loop iteration.
    pub fn kinds(self) -> &'static [BackendKind] {
        match self {
            BackendSelection::Both => &[BackendKind::OpenGl, BackendKind::Direct3d11],
            BackendSelection::OpenGl => &[BackendKind::OpenGl],
            BackendSelection::Direct3d => &[BackendKind::Direct3d11],
        }
    }
}

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Window title prefix; the backend name is appended per window.
    pub title: String,
    pub window_size: LogicalSize<f64>,
    /// Maximize each window instead of placing them side by side.
    pub maximized: bool,
    pub mode: RenderMode,
    pub backends: BackendSelection,
    /// Directory holding `shaders/` and the default texture.
    pub asset_root: PathBuf,
    /// Texture file, relative to `asset_root` unless absolute.
    pub texture: PathBuf,
    /// Advance scene time by exactly this many seconds per iteration.
    ///
    /// `None` uses wall-clock time.
    pub fixed_time_step: Option<f32>,
    pub clear_color: [f32; 4],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Texture Demo".to_string(),
            window_size: LogicalSize::new(800.0, 600.0),
            maximized: false,
            mode: RenderMode::Flat,
            backends: BackendSelection::Both,
            asset_root: PathBuf::from("assets"),
            texture: PathBuf::from("Texture.png"),
            fixed_time_step: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Gap between side-by-side windows, logical px.
const WINDOW_GAP: f64 = 16.0;
const WINDOW_ORIGIN: f64 = 32.0;

impl DemoConfig {
    /// Resolved texture path.
    pub fn texture_path(&self) -> PathBuf {
        resolve(&self.asset_root, &self.texture)
    }

    /// A fixed step, when set, must be finite and above zero.
    pub fn fixed_step_is_valid(&self) -> bool {
        self.fixed_time_step.is_none_or(|step| step.is_finite() && step > 0.0)
    }

    pub fn shader_dir(&self) -> PathBuf {
        self.asset_root.join("shaders")
    }

    pub fn window_title(&self, kind: BackendKind) -> String {
        format!("{} - {}", self.title, kind)
    }

    /// Initial position for the `slot`-th window, or `None` when maximized.
    pub fn window_position(&self, slot: usize) -> Option<LogicalPosition<f64>> {
        if self.maximized {
            return None;
        }
        let x = WINDOW_ORIGIN + slot as f64 * (self.window_size.width + WINDOW_GAP);
        Some(LogicalPosition::new(x, WINDOW_ORIGIN))
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
