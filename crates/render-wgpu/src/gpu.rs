use crate::geometry::{self, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use shapestage_common::{ShapeDescriptor, ShapeKind};
use shapestage_kernel::{LightRig, Scene};
use shapestage_render::RenderView;
use std::collections::{BTreeMap, BTreeSet};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, lights: &LightRig) -> Self {
        let (light_dir, light_color) = match lights.directional() {
            Some(light) => {
                let toward = -light.direction().as_vec3();
                (
                    [toward.x, toward.y, toward.z, light.intensity as f32],
                    light.color.to_linear_rgba(),
                )
            }
            None => ([0.0, 0.0, 1.0, 0.0], [0.0; 4]),
        };
        let [r, g, b, _] = lights.ambient.color.to_linear_rgba();
        let k = lights.ambient.intensity as f32;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir,
            light_color,
            ambient: [r * k, g * k, b * k, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Geometry identity: shapes with equal kind and args share one mesh.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MeshKey {
    kind: ShapeKind,
    args: Vec<u64>,
}

impl MeshKey {
    pub(crate) fn of(descriptor: &ShapeDescriptor) -> Self {
        Self {
            kind: descriptor.kind,
            args: descriptor.args().iter().map(|a| a.to_bits()).collect(),
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    /// Line-list indices, built the first time a wireframe material needs them.
    edges: Option<(wgpu::Buffer, u32)>,
    indices: Vec<u32>,
}

struct Draw {
    key: MeshKey,
    wireframe: bool,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    solid_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshKey, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

fn shape_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_state()),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shape_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shape_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHAPE_SHADER.into()),
        });
        let solid_pipeline = shape_pipeline(
            device,
            &pipeline_layout,
            &shape_shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            "solid_pipeline",
        );
        let wireframe_pipeline = shape_pipeline(
            device,
            &pipeline_layout,
            &shape_shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            "wireframe_pipeline",
        );

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let max_instances = 1_024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            solid_pipeline,
            wireframe_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: BTreeMap::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Number of tessellated meshes currently resident.
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn ensure_mesh(&mut self, device: &wgpu::Device, descriptor: &ShapeDescriptor, wireframe: bool) -> MeshKey {
        let key = MeshKey::of(descriptor);
        let mesh = self.meshes.entry(key.clone()).or_insert_with(|| {
            let data = geometry::tessellate(descriptor);
            tracing::debug!(
                kind = %descriptor.kind,
                triangles = data.triangle_count(),
                "mesh tessellated"
            );
            GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("shape_vertex_buffer"),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("shape_index_buffer"),
                    contents: bytemuck::cast_slice(&data.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: data.indices.len() as u32,
                edges: None,
                indices: data.indices,
            }
        });
        if wireframe && mesh.edges.is_none() {
            let edges = geometry::wireframe_edges(&mesh.indices);
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_edge_buffer"),
                contents: bytemuck::cast_slice(&edges),
                usage: wgpu::BufferUsages::INDEX,
            });
            mesh.edges = Some((buffer, edges.len() as u32));
        }
        key
    }

    /// Render one frame: every mounted shape in its resolved color, then the light helper.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
        aspect: f32,
        scene: &Scene,
    ) {
        let lights = scene.lights();
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(view.view_projection(aspect), lights)),
        );

        let mut instances: Vec<InstanceData> = Vec::new();
        let mut draws: Vec<Draw> = Vec::new();
        for shape in scene.shapes().values() {
            if instances.len() >= self.max_instances as usize {
                break;
            }
            let Some(transform) = shape.transform() else {
                continue;
            };
            let wireframe = shape.material().wireframe;
            let key = self.ensure_mesh(device, shape.descriptor(), wireframe);
            let cols = transform.model_matrix(shape.parent_offset()).to_cols_array_2d();
            instances.push(InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: shape.resolved_color().to_linear_rgba(),
            });
            draws.push(Draw { key, wireframe });
        }

        // drop meshes whose args no longer match any shape (e.g. an old knot radius)
        let live: BTreeSet<&MeshKey> = draws.iter().map(|d| &d.key).collect();
        self.meshes.retain(|k, _| live.contains(k));

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let helper_vertices: Vec<LineVertex> = lights
            .helper()
            .map(|h| {
                let color = h.color.to_linear_rgba();
                geometry::helper_lines(h.position().as_vec3(), h.target().as_vec3(), h.scale as f32)
                    .into_iter()
                    .map(|p| LineVertex {
                        position: p.to_array(),
                        color,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let helper_buffer = (!helper_vertices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("helper_vertex_buffer"),
                contents: bytemuck::cast_slice(&helper_vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.key) else {
                    continue;
                };
                let instance = i as u32..i as u32 + 1;
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                match (&mesh.edges, draw.wireframe) {
                    (Some((edges, count)), true) => {
                        pass.set_pipeline(&self.wireframe_pipeline);
                        pass.set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..*count, 0, instance);
                    }
                    _ => {
                        pass.set_pipeline(&self.solid_pipeline);
                        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..mesh.index_count, 0, instance);
                    }
                }
            }

            if let Some(buffer) = &helper_buffer {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..helper_vertices.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
