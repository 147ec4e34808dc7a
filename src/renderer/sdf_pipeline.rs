//! SDF-based WebGPU render pipeline
//!
//! Draws the recorded scene in a single fullscreen fragment pass using
//! signed distance fields. Text commands are skipped here and handled by
//! the DOM text layer.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::util::DeviceExt;

use super::Viewport;
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::scene::{Color, DrawCommand, DrawList};

/// Maximum number of shapes per frame
const MAX_SHAPES: usize = 64;
/// Divider line width in playfield pixels
const LINE_WIDTH: f32 = 2.0;

const SHAPE_RECT: u32 = 0;
const SHAPE_ELLIPSE: u32 = 1;
const SHAPE_LINE: u32 = 2;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],    // offset 0
    offset: [f32; 2],        // offset 8
    scale: f32,              // offset 16
    time: f32,               // offset 20
    shape_count: u32,        // offset 24
    _pad: u32,               // offset 28
    clear_color: [f32; 4],   // offset 32 (16-byte aligned for WGSL vec4)
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct ShapeData {
    kind: u32,
    thickness: f32,
    _pad: [f32; 2],
    a: [f32; 4],
    color: [f32; 4],
}

fn rgba(color: Color) -> [f32; 4] {
    [color.r, color.g, color.b, 1.0]
}

/// Flatten drawable commands into the shape buffer layout.
/// Extra shapes beyond `MAX_SHAPES` are dropped.
fn pack_shapes(list: &DrawList) -> Vec<ShapeData> {
    list.commands
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::Rect { rect, color } => Some(ShapeData {
                kind: SHAPE_RECT,
                thickness: 0.0,
                _pad: [0.0; 2],
                a: [rect.pos.x, rect.pos.y, rect.size.x, rect.size.y],
                color: rgba(*color),
            }),
            DrawCommand::Ellipse { rect, color } => Some(ShapeData {
                kind: SHAPE_ELLIPSE,
                thickness: 0.0,
                _pad: [0.0; 2],
                a: [rect.pos.x, rect.pos.y, rect.size.x, rect.size.y],
                color: rgba(*color),
            }),
            DrawCommand::Line { from, to, color } => Some(ShapeData {
                kind: SHAPE_LINE,
                thickness: LINE_WIDTH,
                _pad: [0.0; 2],
                a: [from.x, from.y, to.x, to.y],
                color: rgba(*color),
            }),
            DrawCommand::Fill(_) | DrawCommand::Text { .. } => None,
        })
        .take(MAX_SHAPES)
        .collect()
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    shapes_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let viewport = Viewport::fit(
            Vec2::new(width as f32, height as f32),
            Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
        );
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                offset: viewport.offset.to_array(),
                scale: viewport.scale,
                time: 0.0,
                shape_count: 0,
                _pad: 0,
                clear_color: rgba(Color::BLACK),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shapes_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shapes"),
            size: (std::mem::size_of::<ShapeData>() * MAX_SHAPES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: shapes_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!("SDF pipeline ready ({}x{})", width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            shapes_buffer,
            bind_group,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size, after a lost or outdated frame
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Where the playfield lands on the surface, in device pixels
    pub fn viewport(&self) -> Viewport {
        Viewport::fit(
            Vec2::new(self.size.0 as f32, self.size.1 as f32),
            Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
        )
    }

    /// Upload the scene's shapes and draw one frame
    pub fn render(&mut self, scene: &DrawList, time: f64) -> Result<(), wgpu::SurfaceError> {
        // time is ms since page load from requestAnimationFrame, convert to seconds
        let elapsed = (time / 1000.0) as f32;

        let shapes = pack_shapes(scene);
        let viewport = self.viewport();

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            offset: viewport.offset.to_array(),
            scale: viewport.scale,
            time: elapsed,
            shape_count: shapes.len() as u32,
            _pad: 0,
            clear_color: rgba(scene.clear_color()),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        if !shapes.is_empty() {
            self.queue
                .write_buffer(&self.shapes_buffer, 0, bytemuck::cast_slice(&shapes));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Canvas, render};
    use crate::sim::{GameState, Rect};

    #[test]
    fn test_gpu_struct_sizes() {
        // WGSL layout: Globals is 48 bytes, Shape is 48 bytes
        assert_eq!(std::mem::size_of::<Globals>(), 48);
        assert_eq!(std::mem::size_of::<ShapeData>(), 48);
    }

    #[test]
    fn test_pack_skips_fill_and_text() {
        let state = GameState::new(5);
        let mut list = DrawList::new();
        render(&state, &mut list);

        let shapes = pack_shapes(&list);
        // Two paddles, the ball and the divider
        assert_eq!(shapes.len(), 4);
        assert_eq!(shapes[0].kind, SHAPE_RECT);
        assert_eq!(shapes[1].kind, SHAPE_RECT);
        assert_eq!(shapes[2].kind, SHAPE_ELLIPSE);
        assert_eq!(shapes[3].kind, SHAPE_LINE);
        assert_eq!(shapes[3].a, [400.0, 0.0, 400.0, 600.0]);
        assert_eq!(shapes[3].thickness, LINE_WIDTH);
    }

    #[test]
    fn test_pack_caps_shape_count() {
        let mut list = DrawList::new();
        for i in 0..(MAX_SHAPES + 10) {
            list.draw_rect(Rect::new(i as f32, 0.0, 1.0, 1.0), Color::WHITE);
        }
        assert_eq!(pack_shapes(&list).len(), MAX_SHAPES);
    }

    #[test]
    fn test_rect_packing_uses_top_left_and_size() {
        let mut list = DrawList::new();
        list.draw_rect(Rect::new(10.0, 250.0, 10.0, 100.0), Color::rgb(1.0, 0.0, 0.0));
        let shapes = pack_shapes(&list);
        assert_eq!(shapes[0].a, [10.0, 250.0, 10.0, 100.0]);
        assert_eq!(shapes[0].color, [1.0, 0.0, 0.0, 1.0]);
    }
}
