use tracing::{debug, warn};

use crate::error::{BackdropError, DrawError, Result};
use crate::platform::{GraphicsBackend, GraphicsContext, ShaderSources};
use crate::uniforms::UniformBlock;

use super::pipeline::{WgpuMesh, WgpuProgram};

/// Acquires [`WgpuContext`]s for a window-like target.
///
/// The target is cloned for every acquisition, so hand in something cheap to
/// clone such as `Arc<winit::window::Window>`.
pub struct WgpuBackend<W> {
    target: W,
    power_preference: wgpu::PowerPreference,
}

impl<W> WgpuBackend<W>
where
    W: wgpu::WindowHandle + Clone + 'static,
{
    pub fn new(target: W) -> Self {
        Self {
            target,
            power_preference: wgpu::PowerPreference::LowPower,
        }
    }

    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }
}

impl<W> GraphicsBackend for WgpuBackend<W>
where
    W: wgpu::WindowHandle + Clone + 'static,
{
    type Context = WgpuContext;

    fn acquire_context(&mut self, width: u32, height: u32) -> Result<WgpuContext> {
        WgpuContext::new(self.target.clone(), width, height, self.power_preference)
    }
}

pub struct WgpuContext {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    max_dimension: u32,
    blend: Option<wgpu::BlendState>,
    clear: wgpu::Color,
    lost: bool,
}

impl WgpuContext {
    fn new<W>(
        target: W,
        width: u32,
        height: u32,
        power_preference: wgpu::PowerPreference,
    ) -> Result<Self>
    where
        W: wgpu::WindowHandle + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(target)
            .map_err(|err| BackdropError::ContextCreation(format!("surface: {err}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| BackdropError::ContextCreation(format!("adapter: {err}")))?;

        let info = adapter.get_info();
        let limits = adapter.limits();
        debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("threadline device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| BackdropError::ContextCreation(format!("device: {err}")))?;

        let caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = caps.formats.first() else {
            return Err(BackdropError::ContextCreation(
                "surface reports no supported formats".into(),
            ));
        };
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or(first_format);

        // Colour leaves the shader premultiplied (rgb * coverage, coverage).
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| caps.alpha_modes.contains(mode))
        .unwrap_or_else(|| {
            warn!("surface cannot composite with alpha; backdrop will be opaque");
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        });

        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            caps.present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        };

        let max_dimension = limits.max_texture_dimension_2d;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.clamp(1, max_dimension),
            height: height.clamp(1, max_dimension),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        debug!(?format, ?alpha_mode, ?present_mode, "configured backdrop surface");

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            max_dimension,
            blend: None,
            clear: wgpu::Color::BLACK,
            lost: false,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl GraphicsContext for WgpuContext {
    type Program = WgpuProgram;
    type Mesh = WgpuMesh;

    fn configure_blending(&mut self) {
        self.clear = wgpu::Color::TRANSPARENT;
        self.blend = Some(wgpu::BlendState::ALPHA_BLENDING);
    }

    fn compile_program(&mut self, sources: ShaderSources<'_>) -> Result<WgpuProgram> {
        WgpuProgram::new(&self.device, self.config.format, self.blend, sources)
    }

    fn create_fullscreen_triangle(&mut self) -> Result<WgpuMesh> {
        WgpuMesh::fullscreen_triangle(&self.device)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.lost {
            return;
        }
        self.config.width = width.min(self.max_dimension);
        self.config.height = height.min(self.max_dimension);
        self.reconfigure();
    }

    fn max_surface_dimension(&self) -> Option<u32> {
        Some(self.max_dimension)
    }

    fn draw(
        &mut self,
        program: &WgpuProgram,
        mesh: &WgpuMesh,
        uniforms: &UniformBlock,
    ) -> std::result::Result<(), DrawError> {
        if self.lost {
            return Err(DrawError::Fatal("context has been lost".into()));
        }

        program.write_uniforms(&self.queue, uniforms);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                return Err(DrawError::Transient("surface outdated; reconfigured".into()));
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(DrawError::Fatal("surface out of memory".into()));
            }
            Err(other) => {
                return Err(DrawError::Transient(format!("surface error: {other}")));
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("threadline frame"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("threadline pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            program.bind(&mut render_pass);
            mesh.draw(&mut render_pass);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn lose_context(&mut self) -> bool {
        if !self.lost {
            self.device.destroy();
            self.lost = true;
        }
        true
    }
}
