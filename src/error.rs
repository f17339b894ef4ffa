//! Error types for tunnelfx.

use std::fmt;

/// Errors that can occur while bringing up the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the tunnel effect.
#[derive(Debug)]
pub enum TunnelError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for TunnelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            TunnelError::Window(e) => write!(f, "Failed to create window: {}", e),
            TunnelError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for TunnelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TunnelError::EventLoop(e) => Some(e),
            TunnelError::Window(e) => Some(e),
            TunnelError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for TunnelError {
    fn from(e: winit::error::EventLoopError) -> Self {
        TunnelError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for TunnelError {
    fn from(e: winit::error::OsError) -> Self {
        TunnelError::Window(e)
    }
}

impl From<GpuError> for TunnelError {
    fn from(e: GpuError) -> Self {
        TunnelError::Gpu(e)
    }
}
