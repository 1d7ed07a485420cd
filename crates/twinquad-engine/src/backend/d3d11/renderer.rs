use std::ffi::c_void;

use windows::core::{s, PCSTR};
use windows::Win32::Foundation::{BOOL, FALSE, TRUE};
use windows::Win32::Graphics::Direct3D::Fxc::{D3DCompile, D3DCOMPILE_ENABLE_STRICTNESS};
use windows::Win32::Graphics::Direct3D::{ID3DBlob, D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST};
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use winit::window::Window;

use crate::backend::{BackendKind, BackendOptions, DepthConvention, RenderBackend};
use crate::error::{RenderError, RenderResult, ShaderStage};
use crate::geometry::{expected_shape, Mesh};
use crate::shader::{ShaderSource, ShaderSources};
use crate::texture::{AddressMode, Filter, SamplerDesc, TextureImage};
use crate::transform::TransformUniforms;

use super::constants::Constants;
use super::device::{created, d3d_err, D3d11Device};

struct D3dProgram {
    vertex: ID3D11VertexShader,
    pixel: ID3D11PixelShader,
    layout: ID3D11InputLayout,
}

struct D3dGeometry {
    buffer: ID3D11Buffer,
    stride: u32,
    vertex_count: u32,
}

struct D3dTexture {
    view: ID3D11ShaderResourceView,
    sampler: ID3D11SamplerState,
}

/// Direct3D 11 backend.
pub struct D3d11Backend {
    options: BackendOptions,
    program: Option<D3dProgram>,
    geometry: Option<D3dGeometry>,
    texture: Option<D3dTexture>,
    constants: Option<ID3D11Buffer>,
    rasterizer: Option<ID3D11RasterizerState>,
    depth_state: Option<ID3D11DepthStencilState>,
    device: D3d11Device,
}

fn not_ready(what: &'static str) -> RenderError {
    RenderError::NotReady {
        backend: BackendKind::Direct3d11,
        what,
    }
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

/// Compiles one entry point. Compiler diagnostics come back as the error log.
fn compile_stage(
    source: &ShaderSource,
    stage: ShaderStage,
    entry: PCSTR,
    profile: PCSTR,
) -> RenderResult<ID3DBlob> {
    let mut blob = None;
    let mut errors = None;

    let result = unsafe {
        D3DCompile(
            source.text.as_ptr() as *const c_void,
            source.text.len(),
            None,
            None,
            None,
            entry,
            profile,
            D3DCOMPILE_ENABLE_STRICTNESS,
            0,
            &mut blob,
            Some(&mut errors),
        )
    };

    if let Err(e) = result {
        let log = match &errors {
            Some(errors) => String::from_utf8_lossy(blob_bytes(errors)).into_owned(),
            None => e.to_string(),
        };
        return Err(RenderError::ShaderCompile { stage, log });
    }

    blob.ok_or_else(|| RenderError::ShaderCompile {
        stage,
        log: "compiler produced no bytecode".into(),
    })
}

fn d3d_filter(sampler: &SamplerDesc) -> D3D11_FILTER {
    match (sampler.min_filter, sampler.mag_filter) {
        (Filter::Nearest, Filter::Nearest) => D3D11_FILTER_MIN_MAG_MIP_POINT,
        (Filter::Nearest, Filter::Linear) => D3D11_FILTER_MIN_POINT_MAG_LINEAR_MIP_POINT,
        (Filter::Linear, Filter::Nearest) => D3D11_FILTER_MIN_LINEAR_MAG_MIP_POINT,
        (Filter::Linear, Filter::Linear) => D3D11_FILTER_MIN_MAG_LINEAR_MIP_POINT,
    }
}

fn d3d_address(address: AddressMode) -> D3D11_TEXTURE_ADDRESS_MODE {
    match address {
        AddressMode::ClampToEdge => D3D11_TEXTURE_ADDRESS_CLAMP,
        AddressMode::Repeat => D3D11_TEXTURE_ADDRESS_WRAP,
    }
}

impl D3d11Backend {
    /// Creates device, swap chain and the fixed pipeline state for `window`.
    pub fn new(window: &Window, options: BackendOptions) -> RenderResult<Self> {
        let device = D3d11Device::create(window, options.mode)?;
        let (w, h) = device.size();

        let mut backend = Self {
            options,
            program: None,
            geometry: None,
            texture: None,
            constants: None,
            rasterizer: None,
            depth_state: None,
            device,
        };
        backend.create_fixed_state()?;

        log::info!("Direct3D 11 backend ready: {:?} mode, {w}x{h}", options.mode);
        Ok(backend)
    }

    /// Constant buffer, rasterizer and depth-stencil state. None of them
    /// change after startup.
    fn create_fixed_state(&mut self) -> RenderResult<()> {
        let device = &self.device.device;

        let constants_desc = D3D11_BUFFER_DESC {
            ByteWidth: std::mem::size_of::<Constants>() as u32,
            Usage: D3D11_USAGE_DYNAMIC,
            BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
            CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
            MiscFlags: 0,
            StructureByteStride: 0,
        };

        let rasterizer_desc = D3D11_RASTERIZER_DESC {
            FillMode: D3D11_FILL_SOLID,
            CullMode: D3D11_CULL_BACK,
            FrontCounterClockwise: TRUE,
            DepthBias: 0,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: 0.0,
            DepthClipEnable: TRUE,
            ScissorEnable: FALSE,
            MultisampleEnable: FALSE,
            AntialiasedLineEnable: FALSE,
        };

        let depth_desc = D3D11_DEPTH_STENCIL_DESC {
            DepthEnable: BOOL::from(self.options.mode.uses_depth()),
            DepthWriteMask: D3D11_DEPTH_WRITE_MASK_ALL,
            DepthFunc: D3D11_COMPARISON_LESS,
            StencilEnable: FALSE,
            StencilReadMask: D3D11_DEFAULT_STENCIL_READ_MASK as u8,
            StencilWriteMask: D3D11_DEFAULT_STENCIL_WRITE_MASK as u8,
            FrontFace: D3D11_DEPTH_STENCILOP_DESC::default(),
            BackFace: D3D11_DEPTH_STENCILOP_DESC::default(),
        };

        unsafe {
            let mut constants = None;
            device
                .CreateBuffer(&constants_desc, None, Some(&mut constants))
                .map_err(|e| d3d_err("CreateBuffer (constants)", e))?;

            let mut rasterizer = None;
            device
                .CreateRasterizerState(&rasterizer_desc, Some(&mut rasterizer))
                .map_err(|e| d3d_err("CreateRasterizerState", e))?;

            let mut depth_state = None;
            device
                .CreateDepthStencilState(&depth_desc, Some(&mut depth_state))
                .map_err(|e| d3d_err("CreateDepthStencilState", e))?;

            self.constants = Some(created(constants, "CreateBuffer (constants)")?);
            self.rasterizer = Some(created(rasterizer, "CreateRasterizerState")?);
            self.depth_state = Some(created(depth_state, "CreateDepthStencilState")?);
        }
        Ok(())
    }
}

impl RenderBackend for D3d11Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::Direct3d11
    }

    fn depth_convention(&self) -> DepthConvention {
        DepthConvention::ZeroToOne
    }

    fn client_size(&self) -> (u32, u32) {
        self.device.size()
    }

    fn build_program(&mut self, sources: &ShaderSources) -> RenderResult<()> {
        let ShaderSources::Hlsl { source } = sources else {
            return Err(RenderError::device(BackendKind::Direct3d11, "expected HLSL sources"));
        };

        let (_, layout) = expected_shape(self.options.mode);
        let position_format = if layout.position_components == 3 {
            DXGI_FORMAT_R32G32B32_FLOAT
        } else {
            DXGI_FORMAT_R32G32_FLOAT
        };
        let elements = [
            D3D11_INPUT_ELEMENT_DESC {
                SemanticName: s!("POS"),
                SemanticIndex: 0,
                Format: position_format,
                InputSlot: 0,
                AlignedByteOffset: 0,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            },
            D3D11_INPUT_ELEMENT_DESC {
                SemanticName: s!("TEX"),
                SemanticIndex: 0,
                Format: DXGI_FORMAT_R32G32_FLOAT,
                InputSlot: 0,
                AlignedByteOffset: layout.tex_coord_offset as u32,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            },
        ];

        let device = &self.device.device;
        let program = unsafe {
            let vs_blob = compile_stage(source, ShaderStage::Vertex, s!("vertex_shader"), s!("vs_5_0"))?;
            let ps_blob = compile_stage(source, ShaderStage::Fragment, s!("pixel_shader"), s!("ps_5_0"))?;
            let vs_bytes = blob_bytes(&vs_blob);

            let mut vertex = None;
            device
                .CreateVertexShader(vs_bytes, None, Some(&mut vertex))
                .map_err(|e| d3d_err("CreateVertexShader", e))?;
            let mut pixel = None;
            device
                .CreatePixelShader(blob_bytes(&ps_blob), None, Some(&mut pixel))
                .map_err(|e| d3d_err("CreatePixelShader", e))?;

            // Signature mismatches between the layout and the shader input
            // surface here, the D3D counterpart of a link failure.
            let mut input_layout = None;
            device
                .CreateInputLayout(&elements, vs_bytes, Some(&mut input_layout))
                .map_err(|e| RenderError::ProgramLink {
                    log: format!("CreateInputLayout: {e}"),
                })?;

            D3dProgram {
                vertex: created(vertex, "CreateVertexShader")?,
                pixel: created(pixel, "CreatePixelShader")?,
                layout: created(input_layout, "CreateInputLayout")?,
            }
        };

        log::debug!("Direct3D program built from {}", source.path.display());
        self.program = Some(program);
        Ok(())
    }

    fn upload_geometry(&mut self, mesh: &Mesh) -> RenderResult<()> {
        mesh.validate_for(self.options.mode)?;
        let bytes = mesh.bytes();

        let desc = D3D11_BUFFER_DESC {
            ByteWidth: bytes.len() as u32,
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        let init = D3D11_SUBRESOURCE_DATA {
            pSysMem: bytes.as_ptr() as *const c_void,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        };

        let buffer = unsafe {
            let mut buffer = None;
            self.device
                .device
                .CreateBuffer(&desc, Some(&init), Some(&mut buffer))
                .map_err(|e| d3d_err("CreateBuffer (vertices)", e))?;
            created(buffer, "CreateBuffer (vertices)")?
        };

        log::debug!(
            "Direct3D vertex buffer: {} vertices, stride {}",
            mesh.vertex_count(),
            mesh.layout().stride
        );
        self.geometry = Some(D3dGeometry {
            buffer,
            stride: mesh.layout().stride as u32,
            vertex_count: mesh.vertex_count() as u32,
        });
        Ok(())
    }

    fn upload_texture(&mut self, image: &TextureImage, sampler: SamplerDesc) -> RenderResult<()> {
        let texture_desc = D3D11_TEXTURE2D_DESC {
            Width: image.width(),
            Height: image.height(),
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };
        let init = D3D11_SUBRESOURCE_DATA {
            pSysMem: image.pixels().as_ptr() as *const c_void,
            SysMemPitch: image.row_pitch(),
            SysMemSlicePitch: 0,
        };

        let address = d3d_address(sampler.address);
        let sampler_desc = D3D11_SAMPLER_DESC {
            Filter: d3d_filter(&sampler),
            AddressU: address,
            AddressV: address,
            AddressW: address,
            MipLODBias: 0.0,
            MaxAnisotropy: 1,
            ComparisonFunc: D3D11_COMPARISON_NEVER,
            BorderColor: [0.0; 4],
            MinLOD: 0.0,
            MaxLOD: if sampler.mipmaps { D3D11_FLOAT32_MAX } else { 0.0 },
        };

        let device = &self.device.device;
        let texture = unsafe {
            let mut texture = None;
            device
                .CreateTexture2D(&texture_desc, Some(&init), Some(&mut texture))
                .map_err(|e| d3d_err("CreateTexture2D", e))?;
            let texture = created(texture, "CreateTexture2D")?;

            let mut view = None;
            device
                .CreateShaderResourceView(&texture, None, Some(&mut view))
                .map_err(|e| d3d_err("CreateShaderResourceView", e))?;

            let mut sampler_state = None;
            device
                .CreateSamplerState(&sampler_desc, Some(&mut sampler_state))
                .map_err(|e| d3d_err("CreateSamplerState", e))?;

            D3dTexture {
                view: created(view, "CreateShaderResourceView")?,
                sampler: created(sampler_state, "CreateSamplerState")?,
            }
        };

        log::debug!("Direct3D texture: {}x{} RGBA8", image.width(), image.height());
        self.texture = Some(texture);
        Ok(())
    }

    fn update_transform(&mut self, uniforms: &TransformUniforms) -> RenderResult<()> {
        let buffer = self.constants.as_ref().ok_or_else(|| not_ready("constant buffer"))?;
        let constants = Constants::from_uniforms(uniforms);
        let bytes = constants.as_bytes();
        let context = &self.device.context;

        unsafe {
            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            context
                .Map(buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .map_err(|e| d3d_err("Map (constants)", e))?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData as *mut u8, bytes.len());
            context.Unmap(buffer, 0);
        }
        Ok(())
    }

    fn render_frame(&mut self) -> RenderResult<()> {
        let program = self.program.as_ref().ok_or_else(|| not_ready("program"))?;
        let geometry = self.geometry.as_ref().ok_or_else(|| not_ready("vertex buffer"))?;
        let texture = self.texture.as_ref().ok_or_else(|| not_ready("texture"))?;
        let constants = self.constants.as_ref().ok_or_else(|| not_ready("constant buffer"))?;
        let rasterizer = self.rasterizer.as_ref().ok_or_else(|| not_ready("rasterizer state"))?;
        let depth_state = self.depth_state.as_ref().ok_or_else(|| not_ready("depth state"))?;

        let ctx = &self.device.context;
        let rtv = self.device.render_target();
        let (w, h) = self.device.size();
        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: w as f32,
            Height: h as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        let offset = 0u32;

        unsafe {
            // Flip-model swap chains unbind the target on present.
            let targets = [Some(rtv.clone())];
            match self.device.depth_target() {
                Some(dsv) => {
                    ctx.OMSetRenderTargets(Some(&targets), dsv);
                    ctx.ClearDepthStencilView(dsv, D3D11_CLEAR_DEPTH.0 as u32, 1.0, 0);
                }
                None => ctx.OMSetRenderTargets(Some(&targets), None),
            }
            ctx.ClearRenderTargetView(rtv, &self.options.clear_color);
            ctx.RSSetViewports(Some(&[viewport]));
            ctx.RSSetState(rasterizer);
            ctx.OMSetDepthStencilState(depth_state, 0);

            ctx.IASetInputLayout(&program.layout);
            ctx.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            ctx.IASetVertexBuffers(
                0,
                1,
                Some(&Some(geometry.buffer.clone())),
                Some(&geometry.stride),
                Some(&offset),
            );

            ctx.VSSetShader(&program.vertex, None);
            ctx.VSSetConstantBuffers(0, Some(&[Some(constants.clone())]));
            ctx.PSSetShader(&program.pixel, None);
            ctx.PSSetShaderResources(0, Some(&[Some(texture.view.clone())]));
            ctx.PSSetSamplers(0, Some(&[Some(texture.sampler.clone())]));

            ctx.Draw(geometry.vertex_count, 0);
        }
        Ok(())
    }

    fn present(&mut self) -> RenderResult<()> {
        self.device.present()
    }

    fn shutdown(&mut self) {
        let had_resources = self.program.is_some() || self.geometry.is_some() || self.texture.is_some();

        unsafe {
            self.device.context.ClearState();
            self.device.context.Flush();
        }
        self.program = None;
        self.geometry = None;
        self.texture = None;
        self.constants = None;
        self.rasterizer = None;
        self.depth_state = None;

        if had_resources {
            log::debug!("Direct3D resources released");
        }
    }
}

impl Drop for D3d11Backend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
