use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use twinquad_engine::logging::{init_logging, LoggingConfig};
use twinquad_engine::{BackendSelection, DemoConfig, RenderMode, Runtime};
use winit::dpi::LogicalSize;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    /// Flat textured quad.
    Flat,
    /// Rotating textured cube.
    Cube,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BackendArg {
    Both,
    Opengl,
    Direct3d,
}

/// Renders the same textured quad through OpenGL and Direct3D 11.
#[derive(Parser, Debug)]
#[command(name = "twinquad", version)]
struct Cli {
    /// What to draw.
    #[arg(long, value_enum, default_value_t = ModeArg::Flat)]
    mode: ModeArg,

    /// Which backends get a window.
    #[arg(long, value_enum, default_value_t = BackendArg::Both)]
    backend: BackendArg,

    /// Directory holding `shaders/` and the default texture.
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))]
    assets: PathBuf,

    /// Texture file, relative to the asset directory unless absolute.
    #[arg(long, default_value = "Texture.png")]
    texture: PathBuf,

    /// Window client width, logical px.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Window client height, logical px.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Maximize each window instead of placing them side by side.
    #[arg(long, default_value_t = false)]
    maximized: bool,

    /// Advance scene time by exactly this many seconds per frame.
    #[arg(long, value_parser = parse_step)]
    fixed_step: Option<f32>,

    /// Log filter (env_logger syntax). Falls back to RUST_LOG, then "info".
    #[arg(long)]
    log: Option<String>,
}

/// A fixed time step must be a finite number of seconds above zero.
fn parse_step(s: &str) -> Result<f32, String> {
    let step: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if step.is_finite() && step > 0.0 {
        Ok(step)
    } else {
        Err(format!("step must be a finite number of seconds above zero, got `{s}`"))
    }
}

impl Cli {
    fn demo_config(&self) -> DemoConfig {
        DemoConfig {
            window_size: LogicalSize::new(self.width, self.height),
            maximized: self.maximized,
            mode: match self.mode {
                ModeArg::Flat => RenderMode::Flat,
                ModeArg::Cube => RenderMode::Cube,
            },
            backends: match self.backend {
                BackendArg::Both => BackendSelection::Both,
                BackendArg::Opengl => BackendSelection::OpenGl,
                BackendArg::Direct3d => BackendSelection::Direct3d,
            },
            asset_root: self.assets.clone(),
            texture: self.texture.clone(),
            fixed_time_step: self.fixed_step,
            ..DemoConfig::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    if let Err(e) = Runtime::run(cli.demo_config()) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_render_flat_quad_in_both_backends() {
        let cli = Cli::try_parse_from(["twinquad"]).unwrap();
        let cfg = cli.demo_config();
        assert_eq!(cfg.mode, RenderMode::Flat);
        assert_eq!(cfg.backends, BackendSelection::Both);
        assert_eq!(cfg.texture, PathBuf::from("Texture.png"));
        assert!(cfg.asset_root.ends_with("assets"));
        assert!(cfg.fixed_time_step.is_none());
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "twinquad",
            "--mode",
            "cube",
            "--backend",
            "opengl",
            "--assets",
            "data",
            "--width",
            "640",
            "--height",
            "480",
            "--fixed-step",
            "0.01",
            "--maximized",
        ])
        .unwrap();
        let cfg = cli.demo_config();
        assert_eq!(cfg.mode, RenderMode::Cube);
        assert_eq!(cfg.backends, BackendSelection::OpenGl);
        assert_eq!(cfg.asset_root, PathBuf::from("data"));
        assert_eq!(cfg.window_size, LogicalSize::new(640.0, 480.0));
        assert_eq!(cfg.fixed_time_step, Some(0.01));
        assert!(cfg.maximized);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["twinquad", "--mode", "sphere"]).is_err());
    }

    #[test]
    fn shipped_assets_cover_every_backend_and_mode() {
        use twinquad_engine::shader::ShaderSources;
        use twinquad_engine::texture::TextureImage;
        use twinquad_engine::BackendKind;

        let cfg = Cli::try_parse_from(["twinquad"]).unwrap().demo_config();
        for kind in [BackendKind::OpenGl, BackendKind::Direct3d11] {
            for mode in [RenderMode::Flat, RenderMode::Cube] {
                let sources = ShaderSources::load(&cfg.shader_dir(), kind, mode).unwrap();
                assert!(sources.files().iter().all(|f| !f.text.is_empty()));
            }
        }

        let image = TextureImage::load(cfg.texture_path()).unwrap();
        assert_eq!((image.width(), image.height()), (256, 256));
    }

    #[test]
    fn fixed_step_must_be_positive_and_finite() {
        for bad in ["-1", "0", "NaN", "inf", "fast"] {
            let arg = format!("--fixed-step={bad}");
            assert!(Cli::try_parse_from(["twinquad", arg.as_str()]).is_err(), "accepted {bad}");
        }
        let cli = Cli::try_parse_from(["twinquad", "--fixed-step", "0.5"]).unwrap();
        assert_eq!(cli.fixed_step, Some(0.5));
    }

    #[test]
    fn direct3d_backend_flag() {
        let cli = Cli::try_parse_from(["twinquad", "--backend", "direct3d"]).unwrap();
        assert_eq!(cli.demo_config().backends, BackendSelection::Direct3d);
    }
}
