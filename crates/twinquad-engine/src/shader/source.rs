use std::path::{Path, PathBuf};

use crate::backend::BackendKind;
use crate::config::RenderMode;
use crate::error::{RenderError, RenderResult};

/// One shader file read into memory.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub text: String,
}

impl ShaderSource {
    pub fn read(path: impl Into<PathBuf>) -> RenderResult<Self> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Self { path, text }),
            Err(source) => Err(RenderError::ShaderSource { path, source }),
        }
    }
}

/// Source text for one backend's program.
#[derive(Debug, Clone)]
pub enum ShaderSources {
    /// Separate GLSL files per stage.
    Glsl {
        vertex: ShaderSource,
        fragment: ShaderSource,
    },
    /// One HLSL file holding both entry points, `vertex_shader` (vs_5_0)
    /// and `pixel_shader` (ps_5_0).
    Hlsl { source: ShaderSource },
}

fn glsl_paths(shader_dir: &Path, mode: RenderMode) -> [PathBuf; 2] {
    let dir = shader_dir.join("gl");
    let stem = mode.shader_stem();
    [
        dir.join(format!("{stem}.vert.glsl")),
        dir.join(format!("{stem}.frag.glsl")),
    ]
}

fn hlsl_path(shader_dir: &Path, mode: RenderMode) -> PathBuf {
    shader_dir.join("d3d11").join(format!("{}.hlsl", mode.shader_stem()))
}

impl ShaderSources {
    /// Reads every file the backend needs. Fails on the first unreadable one.
    pub fn load(shader_dir: &Path, kind: BackendKind, mode: RenderMode) -> RenderResult<Self> {
        let sources = match kind {
            BackendKind::OpenGl => {
                let [vertex, fragment] = glsl_paths(shader_dir, mode);
                ShaderSources::Glsl {
                    vertex: ShaderSource::read(vertex)?,
                    fragment: ShaderSource::read(fragment)?,
                }
            }
            BackendKind::Direct3d11 => ShaderSources::Hlsl {
                source: ShaderSource::read(hlsl_path(shader_dir, mode))?,
            },
        };

        for s in sources.files() {
            log::debug!("read shader {} ({} bytes)", s.path.display(), s.text.len());
        }
        Ok(sources)
    }

    pub fn files(&self) -> Vec<&ShaderSource> {
        match self {
            ShaderSources::Glsl { vertex, fragment } => vec![vertex, fragment],
            ShaderSources::Hlsl { source } => vec![source],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, text: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn paths_follow_backend_and_mode() {
        let root = Path::new("assets/shaders");
        assert_eq!(
            glsl_paths(root, RenderMode::Flat),
            [root.join("gl/quad.vert.glsl"), root.join("gl/quad.frag.glsl")]
        );
        assert_eq!(hlsl_path(root, RenderMode::Cube), root.join("d3d11/cube.hlsl"));
    }

    #[test]
    fn glsl_pair_is_loaded_in_stage_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gl/cube.vert.glsl", "// vertex");
        write(dir.path(), "gl/cube.frag.glsl", "// fragment");

        let sources = ShaderSources::load(dir.path(), BackendKind::OpenGl, RenderMode::Cube).unwrap();
        match sources {
            ShaderSources::Glsl { vertex, fragment } => {
                assert_eq!(vertex.text, "// vertex");
                assert_eq!(fragment.text, "// fragment");
            }
            other => panic!("expected GLSL, got {other:?}"),
        }
    }

    #[test]
    fn hlsl_is_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "d3d11/quad.hlsl", "float4 pixel_shader() : SV_TARGET { return 0; }");

        let sources = ShaderSources::load(dir.path(), BackendKind::Direct3d11, RenderMode::Flat).unwrap();
        assert_eq!(sources.files().len(), 1);
        assert!(sources.files()[0].text.contains("pixel_shader"));
    }

    #[test]
    fn missing_fragment_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gl/quad.vert.glsl", "// vertex");

        let err = ShaderSources::load(dir.path(), BackendKind::OpenGl, RenderMode::Flat).unwrap_err();
        match err {
            RenderError::ShaderSource { path, source } => {
                assert!(path.ends_with("gl/quad.frag.glsl"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
