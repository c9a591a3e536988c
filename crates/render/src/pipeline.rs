//! GPU rendering pipeline using wgpu.

use anyhow::{Context, Result};
use barscape_scene::{LineVertex, MeshInstance, MeshKind, PointLight, SceneContext, Shading};
use bytemuck::Zeroable;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::Camera;
use crate::color::{clear_color, linear_rgba};
use crate::mesh::{unit_cube, unit_disk, unit_sphere, MeshBuffers, MeshVertex};

/// Most point lights the scene uniform carries.
pub const MAX_LIGHTS: usize = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const DISK_SEGMENTS: u32 = 64;
const SPHERE_SLICES: u32 = 16;
const SPHERE_STACKS: u32 = 12;

/// Off-screen colour target used instead of a window surface.
pub struct HeadlessTarget {
    /// Texture rendered into; `COPY_SRC` so it can be read back.
    pub texture: wgpu::Texture,
}

impl HeadlessTarget {
    fn new(device: &wgpu::Device, size: (u32, u32), format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Headless Color Target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Self { texture }
    }
}

/// GPU rendering context.
pub struct RenderContext {
    /// Window surface the renderer presents into (windowed mode).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Off-screen target (headless mode).
    pub headless: Option<HeadlessTarget>,
    /// Logical GPU device used for issuing commands.
    pub device: wgpu::Device,
    /// Command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Colour target configuration. In headless mode only `format`, `width`
    /// and `height` are meaningful.
    pub config: wgpu::SurfaceConfiguration,
    /// Current backbuffer dimensions in pixels (width, height).
    pub size: (u32, u32),
}

impl RenderContext {
    /// Create a new render context presenting into `window`.
    pub async fn new(window: std::sync::Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find suitable GPU adapter")?;

        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            width = config.width,
            height = config.height,
            format = ?surface_format,
            "GPU rendering context initialized"
        );

        Ok(Self {
            surface: Some(surface),
            headless: None,
            device,
            queue,
            size: (config.width, config.height),
            config,
        })
    }

    /// Create a render context that draws into an off-screen texture.
    pub async fn new_headless(size: (u32, u32), format: wgpu::TextureFormat) -> Result<Self> {
        let size = (size.0.max(1), size.1.max(1));
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find a GPU adapter for headless rendering")?;

        let (device, queue) = request_device(&adapter).await?;
        let headless = HeadlessTarget::new(&device, size, format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format,
            width: size.0,
            height: size.1,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        tracing::info!(
            width = size.0,
            height = size.1,
            format = ?format,
            "headless rendering context initialized"
        );

        Ok(Self {
            surface: None,
            headless: Some(headless),
            device,
            queue,
            config,
            size,
        })
    }

    /// Resize the colour target. Zero-sized requests (minimised window) are ignored.
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 == 0 || new_size.1 == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.0;
        self.config.height = new_size.1;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
        if self.headless.is_some() {
            self.headless = Some(HeadlessTarget::new(
                &self.device,
                new_size,
                self.config.format,
            ));
        }
    }

    /// Re-apply the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }
}

async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
    let device = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("barscape device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        )
        .await
        .context("Failed to create GPU device")?;
    Ok(device)
}

/// Per-instance data for the mesh pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Model matrix, column-major.
    pub model: [[f32; 4]; 4],
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// x = 1.0 for Lambert shading, 0.0 for unlit.
    pub params: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    /// Convert a scene instance into GPU layout.
    pub fn from_instance(instance: &MeshInstance) -> Self {
        let lit = match instance.shading {
            Shading::Lambert => 1.0,
            Shading::Unlit => 0.0,
        };
        Self {
            model: instance.transform.to_cols_array_2d(),
            color: linear_rgba(instance.color),
            params: [lit, 0.0, 0.0, 0.0],
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Point light in GPU layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz = position, w = range.
    pub position: [f32; 4],
    /// rgb = linear colour, a = intensity.
    pub color: [f32; 4],
}

impl LightUniform {
    fn from_light(light: &PointLight) -> Self {
        let [r, g, b, _] = linear_rgba(light.color);
        Self {
            position: light.position.extend(light.range).to_array(),
            color: [r, g, b, light.intensity],
        }
    }
}

/// Uniform shared by the mesh and line pipelines.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    /// View-projection matrix
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space
    pub camera_pos: [f32; 4],
    /// x = number of valid entries in `lights`
    pub light_count: [u32; 4],
    /// Point lights; entries past `light_count` are ignored
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl SceneUniform {
    /// Build the uniform for the current camera and the scene's lights.
    pub fn new(camera: &Camera, lights: &[PointLight]) -> Self {
        if lights.len() > MAX_LIGHTS {
            tracing::warn!(
                lights = lights.len(),
                max = MAX_LIGHTS,
                "scene has more point lights than the shader supports; extras ignored"
            );
        }
        let mut packed = [LightUniform::zeroed(); MAX_LIGHTS];
        for (slot, light) in packed.iter_mut().zip(lights) {
            *slot = LightUniform::from_light(light);
        }
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_count: [lights.len().min(MAX_LIGHTS) as u32, 0, 0, 0],
            lights: packed,
        }
    }
}

/// Line vertex in GPU layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertexRaw {
    /// World-space position.
    pub position: [f32; 3],
    /// Linear RGBA colour.
    pub color: [f32; 4],
}

impl LineVertexRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    fn from_vertex(vertex: &LineVertex) -> Self {
        Self {
            position: vertex.position.to_array(),
            color: linear_rgba(vertex.color),
        }
    }
}

/// GPU buffers for one unit mesh plus the instances drawn with it.
struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

impl MeshBatch {
    fn new(device: &wgpu::Device, mesh: &MeshBuffers, instances: &[InstanceRaw]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Instance Buffer"),
            contents: bytemuck::cast_slice(instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            instance_buffer,
            instance_count: instances.len() as u32,
        }
    }
}

struct LineBatch {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Draws a [`SceneContext`]: instanced meshes, then axis lines, sharing one depth buffer.
pub struct ScenePipeline {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    batches: Vec<MeshBatch>,
    lines: Option<LineBatch>,
    lights: Vec<PointLight>,
    clear: wgpu::Color,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl ScenePipeline {
    /// Upload the scene and build both render pipelines.
    pub fn new(ctx: &RenderContext, scene: &SceneContext) -> Result<Self> {
        let device = &ctx.device;

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
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

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
        });

        let mesh_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
        };

        let mesh_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &mesh_shader,
            "Mesh Render Pipeline",
            &[mesh_vertex_layout, InstanceRaw::layout()],
            wgpu::PrimitiveTopology::TriangleList,
            ctx.config.format,
        );

        let line_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertexRaw>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &LineVertexRaw::ATTRIBS,
        };

        let line_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &line_shader,
            "Line Render Pipeline",
            &[line_vertex_layout],
            wgpu::PrimitiveTopology::LineList,
            ctx.config.format,
        );

        let instances = scene.mesh_instances();
        let mut batches = Vec::new();
        for kind in [MeshKind::Cube, MeshKind::Sphere, MeshKind::Disk] {
            let raw: Vec<InstanceRaw> = instances
                .iter()
                .filter(|instance| instance.mesh == kind)
                .map(InstanceRaw::from_instance)
                .collect();
            if raw.is_empty() {
                continue;
            }
            let mesh = match kind {
                MeshKind::Cube => unit_cube(),
                MeshKind::Sphere => unit_sphere(SPHERE_SLICES, SPHERE_STACKS),
                MeshKind::Disk => unit_disk(DISK_SEGMENTS),
            };
            batches.push(MeshBatch::new(device, &mesh, &raw));
        }

        let line_vertices: Vec<LineVertexRaw> = scene
            .line_vertices()
            .iter()
            .map(LineVertexRaw::from_vertex)
            .collect();
        let lines = (!line_vertices.is_empty()).then(|| LineBatch {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Line Vertex Buffer"),
                contents: bytemuck::cast_slice(&line_vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            vertex_count: line_vertices.len() as u32,
        });

        let (depth_texture, depth_view) = create_depth_texture(device, ctx.size);

        tracing::debug!(
            batches = batches.len(),
            instances = instances.len(),
            line_vertices = line_vertices.len(),
            "scene uploaded to GPU"
        );

        Ok(Self {
            mesh_pipeline,
            line_pipeline,
            scene_buffer,
            scene_bind_group,
            batches,
            lines,
            lights: scene.lights().to_vec(),
            clear: clear_color(scene.background()),
            depth_texture,
            depth_view,
        })
    }

    /// Write the camera (and lights) into the scene uniform.
    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        let uniform = SceneUniform::new(camera, &self.lights);
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Resize depth texture. Same-size and zero-size requests keep the current one.
    pub fn resize(&mut self, device: &wgpu::Device, new_size: (u32, u32)) {
        if new_size.0 == 0 || new_size.1 == 0 || self.depth_size() == new_size {
            return;
        }
        let (texture, view) = create_depth_texture(device, new_size);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    /// Record the scene into `view`, clearing colour and depth first.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear),
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
            ..Default::default()
        });

        pass.set_bind_group(0, &self.scene_bind_group, &[]);

        pass.set_pipeline(&self.mesh_pipeline);
        for batch in &self.batches {
            pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
            pass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..batch.index_count, 0, 0..batch.instance_count);
        }

        if let Some(lines) = &self.lines {
            pass.set_pipeline(&self.line_pipeline);
            pass.set_vertex_buffer(0, lines.vertex_buffer.slice(..));
            pass.draw(0..lines.vertex_count, 0..1);
        }
    }

    fn depth_size(&self) -> (u32, u32) {
        let size = self.depth_texture.size();
        (size.width, size.height)
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Degenerate bars with negative extents flip their winding.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
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

fn create_depth_texture(
    device: &wgpu::Device,
    size: (u32, u32),
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
