use crate::constants::{CLEAR_COLOR, POWER_PREFERENCE};
use field_core::{Backend, DrawError, FieldUniforms};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use web_sys as web;

mod pipeline;
use pipeline::{create_field_pipeline, FieldPipeline};

// ===================== WebGPU backend for the field renderer =====================

struct GpuInner {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    field: FieldPipeline,
    device_lost: Arc<AtomicBool>,
}

/// WebGPU surface, device and field pipeline bound to one canvas.
/// Empty once released.
pub struct GpuField {
    inner: Option<GpuInner>,
}

impl GpuField {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: POWER_PREFERENCE,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: Some("field_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        {
            let flag = device_lost.clone();
            device.set_device_lost_callback(move |reason, message| {
                log::warn!("[gpu] device lost ({:?}): {}", reason, message);
                flag.store(true, Ordering::Release);
            });
        }

        let caps = surface.get_capabilities(&adapter);
        // Raw shader output, no sRGB encode on store
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Shader compile and pipeline validation errors surface here instead of
        // as uncaptured device errors on the first draw.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let field = create_field_pipeline(&device, format);
        if let Some(err) = device.pop_error_scope().await {
            field.destroy();
            device.destroy();
            anyhow::bail!("field pipeline rejected: {}", err);
        }

        log::info!(
            "[gpu] ready {}x{} format={:?} alpha={:?}",
            width,
            height,
            format,
            alpha_mode
        );
        Ok(Self {
            inner: Some(GpuInner {
                surface,
                device,
                queue,
                config,
                field,
                device_lost,
            }),
        })
    }
}

impl Backend for GpuField {
    fn resize(&mut self, width: u32, height: u32) {
        let Some(g) = self.inner.as_mut() else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        if width != g.config.width || height != g.config.height {
            g.config.width = width;
            g.config.height = height;
            g.surface.configure(&g.device, &g.config);
        }
    }

    fn draw(&mut self, uniforms: &FieldUniforms) -> Result<(), DrawError> {
        let Some(g) = self.inner.as_mut() else {
            return Err(DrawError::ContextLost("backend released".into()));
        };
        if g.device_lost.load(Ordering::Acquire) {
            return Err(DrawError::ContextLost("device lost".into()));
        }
        let frame = match g.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated) => {
                g.surface.configure(&g.device, &g.config);
                return Err(DrawError::Skipped("surface outdated".into()));
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return Err(DrawError::Skipped("surface timeout".into()));
            }
            Err(e) => return Err(DrawError::ContextLost(format!("{:?}", e))),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        g.queue
            .write_buffer(&g.field.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let mut encoder = g
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("field_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("field_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&g.field.pipeline);
            rpass.set_bind_group(0, &g.field.bind_group, &[]);
            rpass.set_vertex_buffer(0, g.field.quad_vb.slice(..));
            rpass.draw(0..4, 0..1);
        }
        g.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(g) = self.inner.take() {
            g.field.destroy();
            drop(g.surface);
            g.device.destroy();
            log::info!("[gpu] released");
        }
    }
}
