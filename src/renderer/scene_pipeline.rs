//! WebGPU render pipeline
//!
//! Ray-casts the scene's boxes in the fragment shader. The scene is uploaded
//! as two uniform buffers (globals + block array) every frame.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::scene::Scene;

/// Maximum number of blocks drawn (the topmost ones)
pub const MAX_BLOCKS: usize = 64;

/// Directional light intensity and ambient term
const LIGHT_INTENSITY: f32 = 1.0;
const AMBIENT: f32 = 0.5;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    inv_view_proj: [[f32; 4]; 4], // offset 0
    eye: [f32; 4],                // offset 64
    resolution: [f32; 2],         // offset 80
    block_count: u32,             // offset 88
    block_depth: f32,             // offset 92
    block_height: f32,            // offset 96
    light_intensity: f32,         // offset 100
    ambient: f32,                 // offset 104
    _pad0: f32,                   // pad to 112 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BlockData {
    center_size: [f32; 4], // x, y, width, unused
    color: [f32; 4],
}

/// Build the block upload: the last `MAX_BLOCKS` scene blocks, padded with zeros
fn block_data(scene: &Scene) -> (Vec<BlockData>, u32) {
    let blocks = scene.blocks();
    let visible = &blocks[blocks.len().saturating_sub(MAX_BLOCKS)..];

    let mut data = vec![BlockData::zeroed(); MAX_BLOCKS];
    for (slot, block) in data.iter_mut().zip(visible) {
        *slot = BlockData {
            center_size: [block.x, block.y, block.width(), 0.0],
            color: [block.color[0], block.color[1], block.color[2], 1.0],
        };
    }
    (data, visible.len() as u32)
}

// ============================================================================
// SCENE RENDER STATE
// ============================================================================

pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    blocks_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("stack-tower-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let blocks_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blocks"),
            size: (std::mem::size_of::<BlockData>() * MAX_BLOCKS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: blocks_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
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

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            blocks_buffer,
            bind_group,
            size: (width, height),
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload the scene and draw one frame
    pub fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let (blocks_data, block_count) = block_data(scene);

        let globals = Globals {
            inv_view_proj: scene.camera.view_proj().inverse().to_cols_array_2d(),
            eye: scene.camera.eye.extend(1.0).to_array(),
            resolution: [self.size.0 as f32, self.size.1 as f32],
            block_count,
            block_depth: scene.block_depth,
            block_height: scene.block_height,
            light_intensity: LIGHT_INTENSITY,
            ambient: AMBIENT,
            _pad0: 0.0,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue
            .write_buffer(&self.blocks_buffer, 0, bytemuck::cast_slice(&blocks_data));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
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
    use crate::present::Renderer;

    #[test]
    fn test_gpu_struct_sizes() {
        // Uniform structs must be 16-byte multiples and match the WGSL layout
        assert_eq!(std::mem::size_of::<Globals>(), 112);
        assert_eq!(std::mem::size_of::<BlockData>(), 32);
    }

    #[test]
    fn test_block_data_keeps_topmost() {
        let mut scene = Scene::new(1, 1.0, 1.0, 5.0);
        for id in 0..(MAX_BLOCKS as u32 + 10) {
            scene.create_block(id, id as f32, 5.0);
        }
        let (data, count) = block_data(&scene);
        assert_eq!(count, MAX_BLOCKS as u32);
        assert_eq!(data.len(), MAX_BLOCKS);
        // First uploaded block is layer 10
        assert_eq!(data[0].center_size[1], 10.0);
        assert_eq!(data[MAX_BLOCKS - 1].center_size[1], (MAX_BLOCKS + 9) as f32);
    }

    #[test]
    fn test_block_data_pads_with_zeros() {
        let mut scene = Scene::new(1, 1.0, 1.0, 5.0);
        scene.create_block(1, 0.0, 5.0);
        scene.set_scale(1, 0.5);
        let (data, count) = block_data(&scene);
        assert_eq!(count, 1);
        assert_eq!(data[0].center_size[2], 2.5);
        assert_eq!(data[1].center_size, [0.0; 4]);
    }
}
