use crate::client::game_frame::GameFrame;
use crate::client::pixel_buffer::PixelBuffer;
use crate::client::streaming_surface::{PixelTarget, StreamingSurface};
use crate::client_app::InitError;
use crate::shared::Rect;
use crate::window::Window;
use nalgebra_glm::{scaling, translation, Mat4, Vec3};
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use wgpu::util::DeviceExt;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graphics device is out of memory")]
    OutOfMemory,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles covering `dst`, sampling the `clip` region of a `tex_w` by `tex_h` texture.
fn push_quad(vertices: &mut Vec<Vertex>, dst: Rect, clip: Rect, tex_w: u32, tex_h: u32) {
    let (x0, y0) = (dst.left() as f32, dst.top() as f32);
    let (x1, y1) = (dst.right() as f32, dst.bottom() as f32);
    let (tw, th) = (tex_w as f32, tex_h as f32);
    let (u0, v0) = (clip.left() as f32 / tw, clip.top() as f32 / th);
    let (u1, v1) = (clip.right() as f32 / tw, clip.bottom() as f32 / th);

    #[rustfmt::skip]
    vertices.extend_from_slice(&[
        Vertex { pos: [x0, y0], uv: [u0, v0] },
        Vertex { pos: [x1, y0], uv: [u1, v0] },
        Vertex { pos: [x1, y1], uv: [u1, v1] },
        Vertex { pos: [x0, y0], uv: [u0, v0] },
        Vertex { pos: [x1, y1], uv: [u1, v1] },
        Vertex { pos: [x0, y1], uv: [u0, v1] },
    ]);
}

/// Pixel space, origin top left, to clip space.
fn view_matrix(viewport_w: f32, viewport_h: f32) -> Mat4 {
    let view = Mat4::identity();
    let view = view * scaling(&Vec3::new(2. / viewport_w, -2. / viewport_h, 1.));
    view * translation(&Vec3::new(-viewport_w / 2., -viewport_h / 2., 0.))
}

/// A sampled RGBA texture and the bind group that exposes it to the sprite shader.
pub struct SpriteTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl SpriteTexture {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        (width, height): (u32, u32),
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            texture,
            bind_group,
            width,
            height,
        }
    }

    fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        pixels: &PixelBuffer,
        label: &str,
    ) -> Self {
        let sprite = Self::new(device, layout, sampler, (pixels.width(), pixels.height()), label);
        sprite.upload(queue, pixels.bytes(), pixels.pitch());
        sprite
    }

    fn upload(&self, queue: &wgpu::Queue, pixels: &[u8], pitch: u32) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(pitch),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Streaming target: committed staging bytes go straight into a sprite texture.
pub struct GpuPixelTarget {
    queue: Arc<wgpu::Queue>,
    sprite: SpriteTexture,
}

impl PixelTarget for GpuPixelTarget {
    fn write_pixels(&mut self, pixels: &[u8], pitch: u32, width: u32, height: u32) {
        debug_assert_eq!((width, height), (self.sprite.width, self.sprite.height));
        self.sprite.upload(&self.queue, pixels, pitch);
    }
}

/// Decoded images the renderer turns into textures at startup.
pub struct RenderAssets {
    pub tile_sheet: Option<PixelBuffer>,
    pub actor_sprite: Option<PixelBuffer>,
    pub stream_size: Option<(u32, u32)>,
}

pub struct GameRenderStateWgpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,

    // Sprite pipeline.
    pipeline: wgpu::RenderPipeline,
    view_buffer: wgpu::Buffer,
    view_bind_group: wgpu::BindGroup,

    // Textures.
    tile_sheet: Option<SpriteTexture>,
    actor_sprite: Option<SpriteTexture>,
    stream: Option<StreamingSurface<GpuPixelTarget>>,
}

impl GameRenderStateWgpu {
    pub fn new(window: &Window, vsync: bool, assets: RenderAssets) -> Result<Self, InitError> {
        let (width, height) = window.size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(Arc::clone(&window.window))?;

        let adapter = futures::executor::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            },
        ))
        .ok_or(InitError::NoAdapter)?;
        info!(adapter = ?adapter.get_info().name, backend = ?adapter.get_info().backend, "graphics adapter");

        let (device, queue) = futures::executor::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))?;
        let queue = Arc::new(queue);

        // Sprite textures are sRGB, so the surface has to be too or colors come out dark.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(InitError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Bind group layouts.
        let view_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("view"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(64),
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let view_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("view"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("view"),
            layout: &view_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_buffer.as_entire_binding(),
            }],
        });

        // Pipeline.
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite"),
            bind_group_layouts: &[&view_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // Textures.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nearest"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let sprite = |pixels: &PixelBuffer, label| {
            SpriteTexture::from_pixels(&device, &queue, &texture_layout, &sampler, pixels, label)
        };
        let tile_sheet = assets.tile_sheet.as_ref().map(|pixels| sprite(pixels, "tile sheet"));
        let actor_sprite = assets.actor_sprite.as_ref().map(|pixels| sprite(pixels, "actor"));
        let stream = assets.stream_size.map(|(w, h)| {
            let target = GpuPixelTarget {
                queue: Arc::clone(&queue),
                sprite: SpriteTexture::new(&device, &texture_layout, &sampler, (w, h), "stream"),
            };
            StreamingSurface::new(w, h, target)
        });

        debug!(
            format = ?config.format,
            present_mode = ?config.present_mode,
            width = config.width,
            height = config.height,
            "surface configured"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,

            pipeline,
            view_buffer,
            view_bind_group,

            tile_sheet,
            actor_sprite,
            stream,
        })
    }

    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 > 0 && new_size.1 > 0 {
            self.config.width = new_size.0;
            self.config.height = new_size.1;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Clear, tiles, stream, actor, present.
    pub fn render(&mut self, game_frame: GameFrame) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out acquiring the next frame, skipping it");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
        };

        // View mat4.
        let view = view_matrix(game_frame.viewport.w as f32, game_frame.viewport.h as f32);
        self.queue
            .write_buffer(&self.view_buffer, 0, bytemuck::cast_slice(view.as_slice()));

        // Batches, in draw order.
        let mut vertices = Vec::with_capacity(6 * (game_frame.tiles.len() + 2));
        let mut batches: Vec<(Range<u32>, &wgpu::BindGroup)> = Vec::with_capacity(3);
        let mut batch = |vertices: &mut Vec<Vertex>, start: usize, bind_group| {
            if vertices.len() > start {
                batches.push((start as u32..vertices.len() as u32, bind_group));
            }
        };

        if let Some(sheet) = &self.tile_sheet {
            let start = vertices.len();
            for tile in &game_frame.tiles {
                push_quad(&mut vertices, tile.dst, tile.clip(), sheet.width, sheet.height);
            }
            batch(&mut vertices, start, &sheet.bind_group);
        }

        if let (Some(surface), Some(sprite)) = (&mut self.stream, game_frame.stream) {
            match surface.stream_frame(sprite.pixels) {
                Ok(()) => {}
                Err(err) => error!(%err, "failed to stream frame"),
            }
        }
        if let (Some(surface), Some(sprite)) = (&self.stream, game_frame.stream) {
            match surface.texture() {
                Ok(target) => {
                    let start = vertices.len();
                    let clip = Rect::new(0, 0, target.sprite.width as i32, target.sprite.height as i32);
                    push_quad(&mut vertices, sprite.dst, clip, target.sprite.width, target.sprite.height);
                    batch(&mut vertices, start, &target.sprite.bind_group);
                }
                Err(err) => error!(%err, "stream texture unavailable"),
            }
        }

        if let (Some(actor), Some(dst)) = (&self.actor_sprite, game_frame.actor) {
            let start = vertices.len();
            let clip = Rect::new(0, 0, actor.width as i32, actor.height as i32);
            push_quad(&mut vertices, dst, clip, actor.width, actor.height);
            batch(&mut vertices, start, &actor.bind_group);
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprites"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !vertices.is_empty() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.view_bind_group, &[]);
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                for (range, bind_group) in batches {
                    render_pass.set_bind_group(1, bind_group, &[]);
                    render_pass.draw(range, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra_glm::Vec4;

    fn assert_clip(view: &Mat4, (x, y): (f32, f32), (cx, cy): (f32, f32)) {
        let p = view * Vec4::new(x, y, 0., 1.);
        assert!((p.x - cx).abs() < 1e-5 && (p.y - cy).abs() < 1e-5, "{p:?}");
        assert_eq!(p.w, 1.);
    }

    #[test]
    fn view_maps_pixels_to_clip_space() {
        let view = view_matrix(640., 480.);
        assert_clip(&view, (0., 0.), (-1., 1.));
        assert_clip(&view, (640., 480.), (1., -1.));
        assert_clip(&view, (320., 240.), (0., 0.));
        assert_clip(&view, (640., 0.), (1., 1.));
    }

    #[test]
    fn quad_covers_destination_and_clip() {
        let mut vertices = Vec::new();
        push_quad(
            &mut vertices,
            Rect::new(10, 20, 80, 80),
            Rect::new(80, 160, 80, 80),
            320,
            240,
        );
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].pos, [10., 20.]);
        assert_eq!(vertices[2].pos, [90., 100.]);
        assert_eq!(vertices[0].uv, [0.25, 160. / 240.]);
        assert_eq!(vertices[2].uv, [0.5, 1.]);
    }
}
