// Rendering system using wgpu

mod camera;
#[cfg(test)]
mod headless;
mod mesh;
mod scene;
mod shadow;
mod vertex;

pub use camera::{Camera, CameraUniform};
#[cfg(test)]
pub use headless::HeadlessBackend;
pub use mesh::MeshData;
pub use scene::{MeshKind, ProxyId, ProxyNode, Scene};
pub use shadow::{planar_shadow_matrix, SHADOW_COLOR};
pub use vertex::{InstanceRaw, Vertex};

use anyhow::Result;
use glam::Vec3;
use log::{info, warn};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Initial instance buffer capacity, in instances
const INITIAL_INSTANCE_CAPACITY: usize = 64;

/// What a render call did with the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Drawn and handed to the display
    Presented,
    /// Nothing drawn; the surface was being rebuilt
    Skipped,
}

/// What the simulation needs from whatever puts pixels on screen
pub trait RenderBackend {
    /// Match the output surface to a new window size
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame of the scene from the camera's point of view
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<FrameOutcome>;

    /// Ask the platform to run another frame when the display is ready
    fn request_frame(&self);
}

/// Index range of one mesh inside the shared vertex/index buffers
struct MeshRange {
    kind: MeshKind,
    base_vertex: i32,
    first_index: u32,
    index_count: u32,
}

/// Instances of one mesh to draw in one batch
struct Batch {
    mesh: usize,
    instances: std::ops::Range<u32>,
    shadow: bool,
}

/// Main renderer responsible for initializing wgpu and drawing the scene
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    meshes: Vec<MeshRange>,
    instance_buffer: wgpu::Buffer,
    instances: Vec<InstanceRaw>,
    batches: Vec<Batch>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    /// Direction the light travels in
    light_dir: Vec3,
}

impl Renderer {
    /// Create a new renderer for the given window
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        info!("Using GPU: {}", adapter.get_info().name);

        // Request device and queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        // Camera uniform, rewritten every frame
        let light_dir = Vec3::new(-5.0, -5.0, -5.0).normalize();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new(&Camera::default(), light_dir)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            PipelineKind::Lit,
        );
        let shadow_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            PipelineKind::Shadow,
        );

        // All unit meshes share one vertex buffer and one index buffer
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut meshes = Vec::new();
        for kind in MeshKind::ALL {
            let data = MeshData::for_kind(kind);
            meshes.push(MeshRange {
                kind,
                base_vertex: vertices.len() as i32,
                first_index: indices.len() as u32,
                index_count: data.indices.len() as u32,
            });
            vertices.extend(data.vertices);
            indices.extend(data.indices);
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);

        info!(
            "Renderer initialized with {}x{} resolution",
            config.width, config.height
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            mesh_pipeline,
            shadow_pipeline,
            vertex_buffer,
            index_buffer,
            meshes,
            instance_buffer,
            instances: Vec::new(),
            batches: Vec::new(),
            camera_buffer,
            camera_bind_group,
            light_dir,
        })
    }

    /// Rebuild the per-frame instance list: lit nodes grouped by mesh, then the
    /// flattened shadow of every caster on every receiver
    fn prepare_instances(&mut self, scene: &Scene) {
        self.instances.clear();
        self.batches.clear();

        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            let start = self.instances.len() as u32;
            self.instances.extend(
                scene
                    .iter()
                    .filter(|(_, node)| node.mesh == mesh.kind)
                    .map(|(_, node)| InstanceRaw::new(node.transform_matrix(), node.color)),
            );
            let end = self.instances.len() as u32;
            if end > start {
                self.batches.push(Batch {
                    mesh: mesh_index,
                    instances: start..end,
                    shadow: false,
                });
            }
        }

        let projections: Vec<_> = scene
            .iter()
            .filter(|(_, node)| node.receive_shadow)
            .filter_map(|(_, node)| {
                planar_shadow_matrix(self.light_dir, node.position.y)
                    .map(|matrix| (node.position.y, matrix))
            })
            .collect();

        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            let start = self.instances.len() as u32;
            for (height, projection) in &projections {
                self.instances.extend(
                    scene
                        .iter()
                        .filter(|(_, node)| {
                            node.cast_shadow && node.mesh == mesh.kind && node.position.y > *height
                        })
                        .map(|(_, node)| {
                            InstanceRaw::new(*projection * node.transform_matrix(), SHADOW_COLOR)
                        }),
                );
            }
            let end = self.instances.len() as u32;
            if end > start {
                self.batches.push(Batch {
                    mesh: mesh_index,
                    instances: start..end,
                    shadow: true,
                });
            }
        }

        if self.instances.is_empty() {
            return;
        }

        let needed = (self.instances.len() * std::mem::size_of::<InstanceRaw>()) as u64;
        if needed > self.instance_buffer.size() {
            self.instance_buffer =
                create_instance_buffer(&self.device, self.instances.len().next_power_of_two());
        }
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
    }
}

impl RenderBackend for Renderer {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
            info!("Renderer resized to {}x{}", width, height);
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<FrameOutcome> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::new(camera, self.light_dir)]),
        );
        self.prepare_instances(scene);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            // Lit batches come first, shadows blend over the receivers afterwards
            for batch in &self.batches {
                let pipeline = if batch.shadow {
                    &self.shadow_pipeline
                } else {
                    &self.mesh_pipeline
                };
                let mesh = &self.meshes[batch.mesh];
                render_pass.set_pipeline(pipeline);
                render_pass.draw_indexed(
                    mesh.first_index..mesh.first_index + mesh.index_count,
                    mesh.base_vertex,
                    batch.instances.clone(),
                );
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(FrameOutcome::Presented)
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PipelineKind {
    Lit,
    Shadow,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    let (label, fragment_entry, blend, depth_write, cull_mode) = match kind {
        PipelineKind::Lit => (
            "Mesh Render Pipeline",
            "fs_main",
            wgpu::BlendState::REPLACE,
            true,
            Some(wgpu::Face::Back),
        ),
        // Flattened geometry has no meaningful facing
        PipelineKind::Shadow => (
            "Shadow Render Pipeline",
            "fs_shadow",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
            None,
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[Vertex::desc(), InstanceRaw::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
