use glow::HasContext;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::backend::{BackendKind, BackendOptions, DepthConvention, RenderBackend};
use crate::error::{RenderError, RenderResult, ShaderStage};
use crate::geometry::Mesh;
use crate::shader::ShaderSources;
use crate::texture::{AddressMode, Filter, SamplerDesc, TextureImage};
use crate::transform::TransformUniforms;

use super::surface::GlSurface;

const VIEW_UNIFORM: &str = "u_ViewMatrix";
const PROJECTION_UNIFORM: &str = "u_ProjectionMatrix";
const TEXTURE_UNIFORM: &str = "u_Texture";

struct GlProgram {
    program: glow::Program,
    view: Option<glow::UniformLocation>,
    projection: Option<glow::UniformLocation>,
}

struct GlGeometry {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

/// OpenGL 3.3 core backend.
pub struct GlBackend {
    options: BackendOptions,
    program: Option<GlProgram>,
    geometry: Option<GlGeometry>,
    texture: Option<glow::Texture>,
    // Dropped last: every object above belongs to this context.
    surface: GlSurface,
}

fn gl_err(message: String) -> RenderError {
    RenderError::device(BackendKind::OpenGl, message)
}

fn not_ready(what: &'static str) -> RenderError {
    RenderError::NotReady {
        backend: BackendKind::OpenGl,
        what,
    }
}

fn compile_stage(gl: &glow::Context, stage: ShaderStage, source: &str) -> RenderResult<glow::Shader> {
    let kind = match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    };

    unsafe {
        let shader = gl.create_shader(kind).map_err(gl_err)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile { stage, log });
        }
        Ok(shader)
    }
}

fn filter(f: Filter) -> i32 {
    match f {
        Filter::Nearest => glow::NEAREST as i32,
        Filter::Linear => glow::LINEAR as i32,
    }
}

fn wrap(a: AddressMode) -> i32 {
    match a {
        AddressMode::ClampToEdge => glow::CLAMP_TO_EDGE as i32,
        AddressMode::Repeat => glow::REPEAT as i32,
    }
}

impl GlBackend {
    /// Creates the GL window and context.
    pub fn new(
        event_loop: &ActiveEventLoop,
        attributes: WindowAttributes,
        options: BackendOptions,
    ) -> RenderResult<(Window, Self)> {
        let (window, surface) = GlSurface::create(event_loop, attributes, options.mode)?;
        let (w, h) = surface.size();
        log::info!("OpenGL backend ready: {:?} mode, {w}x{h}", options.mode);

        Ok((
            window,
            Self {
                options,
                program: None,
                geometry: None,
                texture: None,
                surface,
            },
        ))
    }

    fn gl(&self) -> &glow::Context {
        self.surface.gl()
    }
}

impl RenderBackend for GlBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenGl
    }

    fn depth_convention(&self) -> DepthConvention {
        DepthConvention::NegativeOneToOne
    }

    fn client_size(&self) -> (u32, u32) {
        self.surface.size()
    }

    fn build_program(&mut self, sources: &ShaderSources) -> RenderResult<()> {
        let ShaderSources::Glsl { vertex, fragment } = sources else {
            return Err(gl_err("expected GLSL sources".into()));
        };

        let gl = self.gl();
        let program = unsafe {
            let vs = compile_stage(gl, ShaderStage::Vertex, &vertex.text)?;
            let fs = match compile_stage(gl, ShaderStage::Fragment, &fragment.text) {
                Ok(fs) => fs,
                Err(e) => {
                    gl.delete_shader(vs);
                    return Err(e);
                }
            };

            let program = gl.create_program().map_err(gl_err)?;
            gl.attach_shader(program, vs);
            gl.attach_shader(program, fs);
            gl.link_program(program);

            gl.detach_shader(program, vs);
            gl.detach_shader(program, fs);
            gl.delete_shader(vs);
            gl.delete_shader(fs);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(RenderError::ProgramLink { log });
            }

            gl.use_program(Some(program));
            if let Some(sampler) = gl.get_uniform_location(program, TEXTURE_UNIFORM) {
                gl.uniform_1_i32(Some(&sampler), 0);
            }

            GlProgram {
                program,
                view: gl.get_uniform_location(program, VIEW_UNIFORM),
                projection: gl.get_uniform_location(program, PROJECTION_UNIFORM),
            }
        };

        if program.view.is_none() {
            log::warn!("OpenGL program has no active `{VIEW_UNIFORM}` uniform");
        }
        if self.options.mode.uses_depth() && program.projection.is_none() {
            log::warn!("OpenGL program has no active `{PROJECTION_UNIFORM}` uniform");
        }

        log::debug!("OpenGL program linked from {}", vertex.path.display());
        self.program = Some(program);
        Ok(())
    }

    fn upload_geometry(&mut self, mesh: &Mesh) -> RenderResult<()> {
        mesh.validate_for(self.options.mode)?;
        let layout = mesh.layout();
        let stride = layout.stride as i32;

        let gl = self.gl();
        let geometry = unsafe {
            let vao = gl.create_vertex_array().map_err(gl_err)?;
            let vbo = gl.create_buffer().map_err(gl_err)?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, mesh.bytes(), glow::STATIC_DRAW);

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                layout.position_components as i32,
                glow::FLOAT,
                false,
                stride,
                0,
            );
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                2,
                glow::FLOAT,
                false,
                stride,
                layout.tex_coord_offset as i32,
            );

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            GlGeometry {
                vao,
                vbo,
                vertex_count: mesh.vertex_count() as i32,
            }
        };

        log::debug!(
            "OpenGL vertex buffer: {} vertices, stride {}",
            geometry.vertex_count,
            layout.stride
        );
        self.geometry = Some(geometry);
        Ok(())
    }

    fn upload_texture(&mut self, image: &TextureImage, sampler: SamplerDesc) -> RenderResult<()> {
        let gl = self.gl();
        let texture = unsafe {
            let texture = gl.create_texture().map_err(gl_err)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                image.width() as i32,
                image.height() as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(image.pixels()),
            );

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter(sampler.min_filter));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter(sampler.mag_filter));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap(sampler.address));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap(sampler.address));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAX_LEVEL, 0);
            if sampler.mipmaps {
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAX_LEVEL, 1000);
                gl.generate_mipmap(glow::TEXTURE_2D);
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        log::debug!("OpenGL texture: {}x{} RGBA8", image.width(), image.height());
        self.texture = Some(texture);
        Ok(())
    }

    fn update_transform(&mut self, uniforms: &TransformUniforms) -> RenderResult<()> {
        let program = self.program.as_ref().ok_or_else(|| not_ready("program"))?;
        let gl = self.surface.gl();

        // Row-major storage read as column-major: GLSL sees the transpose, so
        // `P * V * v` in the shader equals `v * V * P` here.
        unsafe {
            gl.use_program(Some(program.program));
            gl.uniform_matrix_4_f32_slice(program.view.as_ref(), false, &uniforms.view.to_array());
            if let Some(projection) = uniforms.projection {
                gl.uniform_matrix_4_f32_slice(
                    program.projection.as_ref(),
                    false,
                    &projection.to_array(),
                );
            }
        }
        Ok(())
    }

    fn render_frame(&mut self) -> RenderResult<()> {
        let program = self.program.as_ref().ok_or_else(|| not_ready("program"))?;
        let geometry = self.geometry.as_ref().ok_or_else(|| not_ready("vertex buffer"))?;
        let texture = self.texture.ok_or_else(|| not_ready("texture"))?;

        let gl = self.surface.gl();
        let (w, h) = self.surface.size();
        let [r, g, b, a] = self.options.clear_color;
        let depth = self.options.mode.uses_depth();

        unsafe {
            gl.viewport(0, 0, w as i32, h as i32);
            gl.clear_color(r, g, b, a);
            if depth {
                gl.clear_depth_f32(1.0);
                gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                gl.enable(glow::DEPTH_TEST);
                gl.depth_func(glow::LESS);
            } else {
                gl.clear(glow::COLOR_BUFFER_BIT);
                gl.disable(glow::DEPTH_TEST);
            }

            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);

            gl.use_program(Some(program.program));
            gl.bind_vertex_array(Some(geometry.vao));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            gl.draw_arrays(glow::TRIANGLES, 0, geometry.vertex_count);
        }
        Ok(())
    }

    fn present(&mut self) -> RenderResult<()> {
        self.surface.swap_buffers()
    }

    fn shutdown(&mut self) {
        let program = self.program.take();
        let geometry = self.geometry.take();
        let texture = self.texture.take();
        if program.is_none() && geometry.is_none() && texture.is_none() {
            return;
        }
        let gl = self.surface.gl();

        unsafe {
            if let Some(p) = program {
                gl.delete_program(p.program);
            }
            if let Some(g) = geometry {
                gl.delete_vertex_array(g.vao);
                gl.delete_buffer(g.vbo);
            }
            if let Some(t) = texture {
                gl.delete_texture(t);
            }
        }
        log::debug!("OpenGL resources released");
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
