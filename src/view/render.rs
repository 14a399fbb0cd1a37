use bytemuck::{Pod, Zeroable};
use wgpu::*;

use crate::config::DemoVariant;
use crate::model::{Body, Scene};
use crate::utils::{create_cube_mesh, create_plane_mesh, MeshBuffer, Vertex, XorShift64};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const CLEAR_COLOR: Color = Color { r: 0.2, g: 0.2, b: 0.3, a: 1.0 };
const WAVE_SEGMENTS: u32 = 32;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub time: f32,
    pub _pad: [f32; 3],
}

/// Per-box instance data: model matrix columns and RGBA color
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [VertexAttribute; 5] = vertex_attr_array![
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
    ];

    pub fn from_body(body: &Body) -> Self {
        Self {
            model: body.model_matrix().to_cols_array_2d(),
            color: body.color.to_rgba(1.0),
        }
    }

    fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

struct PipelineSpec<'a> {
    label: &'a str,
    shader: &'a ShaderModule,
    buffers: &'a [VertexBufferLayout<'a>],
    blend: BlendState,
    front_face: FrontFace,
    cull_mode: Option<Face>,
    depth_write: bool,
}

fn create_pipeline(device: &Device, layout: &PipelineLayout, format: TextureFormat, spec: PipelineSpec) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: VertexState {
            module: spec.shader,
            entry_point: Some("vs_main"),
            buffers: spec.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: spec.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(spec.blend), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: spec.front_face,
            cull_mode: spec.cull_mode,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// GPU resources and per-frame draw for both demo variants, plus the egui overlay
pub struct RenderState {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    variant: DemoVariant,

    frame_buffer: Buffer,
    frame_bind_group: BindGroup,
    depth_view: TextureView,

    body_pipeline: RenderPipeline,
    wave_pipeline: RenderPipeline,
    cube_mesh: MeshBuffer,
    plane_mesh: MeshBuffer,
    instance_buffer: Buffer,
    instance_capacity: usize,
    instance_count: u32,

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    egui_textures: Option<egui::TexturesDelta>,
    egui_dpr: f32,
}

impl RenderState {
    pub fn new(device: &Device, format: TextureFormat, width: u32, height: u32, scene: &Scene, seed: u64) -> Self {
        let frame_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("frame_buffer"),
            size: std::mem::size_of::<FrameUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let body_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("body_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/body.wgsl").into()),
        });
        let wave_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("wave_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/wave.wgsl").into()),
        });

        // Left-handed view flips apparent winding
        let body_pipeline = create_pipeline(device, &pipeline_layout, format, PipelineSpec {
            label: "body_pipeline",
            shader: &body_shader,
            buffers: &[Vertex::layout(), InstanceRaw::layout()],
            blend: BlendState::REPLACE,
            front_face: FrontFace::Cw,
            cull_mode: Some(Face::Back),
            depth_write: true,
        });
        let wave_pipeline = create_pipeline(device, &pipeline_layout, format, PipelineSpec {
            label: "wave_pipeline",
            shader: &wave_shader,
            buffers: &[Vertex::layout()],
            blend: BlendState::ALPHA_BLENDING,
            front_face: FrontFace::Cw,
            cull_mode: None,
            depth_write: false,
        });

        let mut rng = XorShift64::new(seed ^ 0xA5A5_A5A5);
        let cube_mesh = create_cube_mesh().upload(device);
        let plane_mesh = create_plane_mesh(1.0, WAVE_SEGMENTS, &mut rng).upload(device);

        // Ground plus every dynamic body; the count never changes during a run
        let instance_capacity = scene.bodies.len() + 1;
        let instance_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("instance_buffer"),
            size: (instance_capacity * std::mem::size_of::<InstanceRaw>()) as BufferAddress,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (_, depth_view) = create_depth_texture(device, width, height);
        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            width,
            height,
            variant: scene.variant,
            frame_buffer,
            frame_bind_group,
            depth_view,
            body_pipeline,
            wave_pipeline,
            cube_mesh,
            plane_mesh,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            egui_renderer,
            egui_primitives: None,
            egui_textures: None,
            egui_dpr: 1.0,
        }
    }

    /// Recreate size-dependent targets. The surface itself is reconfigured by the caller.
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        let (_, depth_view) = create_depth_texture(device, self.width, self.height);
        self.depth_view = depth_view;
    }

    /// Upload this frame's camera, time and body colors
    pub fn prepare(&mut self, queue: &Queue, scene: &Scene) {
        let uniform = FrameUniform {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            time: scene.elapsed,
            _pad: [0.0; 3],
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        if self.variant == DemoVariant::Boxes {
            let instances: Vec<InstanceRaw> = std::iter::once(&scene.ground)
                .chain(scene.bodies.iter())
                .take(self.instance_capacity)
                .map(InstanceRaw::from_body)
                .collect();
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
            self.instance_count = instances.len() as u32;
        }
    }

    /// Hand over tessellated UI for the next draw
    pub fn set_ui(&mut self, primitives: Vec<egui::ClippedPrimitive>, textures: egui::TexturesDelta, dpr: f32) {
        self.egui_primitives = Some(primitives);
        self.egui_textures = Some(textures);
        self.egui_dpr = dpr;
    }

    pub fn draw_frame(&mut self, device: &Device, queue: &Queue, surface: &Surface) -> Result<(), SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, &self.frame_bind_group, &[]);

            match self.variant {
                DemoVariant::Boxes => {
                    rp.set_pipeline(&self.body_pipeline);
                    rp.set_vertex_buffer(0, self.cube_mesh.vertex_buffer.slice(..));
                    rp.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    rp.set_index_buffer(self.cube_mesh.index_buffer.slice(..), IndexFormat::Uint32);
                    rp.draw_indexed(0..self.cube_mesh.index_count, 0, 0..self.instance_count);
                }
                DemoVariant::WavePlane => {
                    rp.set_pipeline(&self.wave_pipeline);
                    rp.set_vertex_buffer(0, self.plane_mesh.vertex_buffer.slice(..));
                    rp.set_index_buffer(self.plane_mesh.index_buffer.slice(..), IndexFormat::Uint32);
                    rp.draw_indexed(0..self.plane_mesh.index_count, 0, 0..1);
                }
            }
        }

        if let (Some(primitives), Some(textures)) = (self.egui_primitives.take(), self.egui_textures.take()) {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: self.egui_dpr,
            };

            for (id, image_delta) in &textures.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &primitives, &screen_descriptor);

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
            }

            for id in &textures.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
