use std::ffi::c_void;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{HMODULE, HWND, TRUE};
use windows::Win32::Graphics::Direct3D::{D3D_DRIVER_TYPE_HARDWARE, D3D_FEATURE_LEVEL};
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::{
    IDXGISwapChain, DXGI_PRESENT, DXGI_SWAP_CHAIN_DESC, DXGI_SWAP_EFFECT_FLIP_DISCARD,
    DXGI_USAGE_RENDER_TARGET_OUTPUT,
};
use winit::window::Window;

use crate::backend::BackendKind;
use crate::config::RenderMode;
use crate::error::{RenderError, RenderResult};

use super::constants::feature_level_name;

pub(super) const BACK_BUFFER_COUNT: u32 = 2;

pub(super) fn d3d_err(what: &str, e: windows::core::Error) -> RenderError {
    RenderError::device(BackendKind::Direct3d11, format!("{what}: {e}"))
}

/// Unwraps a COM out-parameter that a successful call left empty.
pub(super) fn created<T>(value: Option<T>, what: &str) -> RenderResult<T> {
    value.ok_or_else(|| RenderError::device(BackendKind::Direct3d11, format!("{what} returned no object")))
}

/// Device, immediate context and swap chain for one window.
pub struct D3d11Device {
    pub device: ID3D11Device,
    pub context: ID3D11DeviceContext,
    swap_chain: IDXGISwapChain,
    render_target: ID3D11RenderTargetView,
    depth_target: Option<ID3D11DepthStencilView>,
    size: (u32, u32),
}

fn hwnd_of(window: &Window) -> RenderResult<HWND> {
    let handle = window
        .window_handle()
        .map_err(|e| RenderError::Window(e.to_string()))?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Ok(HWND(h.hwnd.get() as *mut c_void)),
        other => Err(RenderError::Window(format!("expected a Win32 window, got {other:?}"))),
    }
}

impl D3d11Device {
    /// Hardware device plus a two-buffer flip-discard BGRA8 swap chain sized
    /// to the client area. Cube mode adds a D24S8 depth buffer.
    pub fn create(window: &Window, mode: RenderMode) -> RenderResult<Self> {
        let hwnd = hwnd_of(window)?;
        let inner = window.inner_size();
        let size = (inner.width.max(1), inner.height.max(1));

        let desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: size.0,
                Height: size.1,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: 0,
                    Denominator: 1,
                },
                Format: DXGI_FORMAT_B8G8R8A8_UNORM,
                ScanlineOrdering: DXGI_MODE_SCANLINE_ORDER_UNSPECIFIED,
                Scaling: DXGI_MODE_SCALING_UNSPECIFIED,
            },
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: BACK_BUFFER_COUNT,
            OutputWindow: hwnd,
            Windowed: TRUE,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            Flags: 0,
        };

        let mut swap_chain = None;
        let mut device = None;
        let mut context = None;
        let mut feature_level = D3D_FEATURE_LEVEL::default();

        unsafe {
            D3D11CreateDeviceAndSwapChain(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                HMODULE::default(),
                D3D11_CREATE_DEVICE_FLAG(0),
                None,
                D3D11_SDK_VERSION,
                Some(&desc),
                Some(&mut swap_chain),
                Some(&mut device),
                Some(&mut feature_level),
                Some(&mut context),
            )
        }
        .map_err(|e| d3d_err("D3D11CreateDeviceAndSwapChain", e))?;

        let swap_chain = created(swap_chain, "D3D11CreateDeviceAndSwapChain (swap chain)")?;
        let device: ID3D11Device = created(device, "D3D11CreateDeviceAndSwapChain (device)")?;
        let context = created(context, "D3D11CreateDeviceAndSwapChain (context)")?;

        log::info!(
            "Direct3D 11 device, feature level {}",
            feature_level_name(feature_level.0)
        );

        let render_target = unsafe {
            let back_buffer: ID3D11Texture2D = swap_chain
                .GetBuffer(0)
                .map_err(|e| d3d_err("IDXGISwapChain::GetBuffer", e))?;
            let mut rtv = None;
            device
                .CreateRenderTargetView(&back_buffer, None, Some(&mut rtv))
                .map_err(|e| d3d_err("CreateRenderTargetView", e))?;
            created(rtv, "CreateRenderTargetView")?
        };

        let depth_target = if mode.uses_depth() {
            Some(create_depth_target(&device, size)?)
        } else {
            None
        };

        Ok(Self {
            device,
            context,
            swap_chain,
            render_target,
            depth_target,
            size,
        })
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub fn render_target(&self) -> &ID3D11RenderTargetView {
        &self.render_target
    }

    #[inline]
    pub fn depth_target(&self) -> Option<&ID3D11DepthStencilView> {
        self.depth_target.as_ref()
    }

    /// Presents with a sync interval of one.
    pub fn present(&self) -> RenderResult<()> {
        unsafe { self.swap_chain.Present(1, DXGI_PRESENT(0)) }
            .ok()
            .map_err(|e| d3d_err("IDXGISwapChain::Present", e))
    }
}

fn create_depth_target(device: &ID3D11Device, (width, height): (u32, u32)) -> RenderResult<ID3D11DepthStencilView> {
    let desc = D3D11_TEXTURE2D_DESC {
        Width: width,
        Height: height,
        MipLevels: 1,
        ArraySize: 1,
        Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
    };

    unsafe {
        let mut texture = None;
        device
            .CreateTexture2D(&desc, None, Some(&mut texture))
            .map_err(|e| d3d_err("CreateTexture2D (depth)", e))?;
        let texture = created(texture, "CreateTexture2D (depth)")?;

        let mut dsv = None;
        device
            .CreateDepthStencilView(&texture, None, Some(&mut dsv))
            .map_err(|e| d3d_err("CreateDepthStencilView", e))?;
        log::debug!("Direct3D depth buffer: {width}x{height} D24S8");
        created(dsv, "CreateDepthStencilView")
    }
}
