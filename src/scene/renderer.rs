//! Mockup renderer
//!
//! Draws the mug scene into an offscreen texture that the UI displays. The
//! print band samples a GPU copy of the print surface raster; the copy keeps
//! a stable identity for the renderer's lifetime and is refreshed whenever
//! the raster's dirty flag is set.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::camera::OrbitCamera;
use super::lighting::LightRig;
use super::mesh::MockupVertex;
use super::model::{Material, PartKind, SceneModel, Shading, Side};
use crate::compositor::PrintSurfaceRaster;
use crate::settings::HexColor;
use crate::shaders::{MOCKUP_SHADER, SHADOW_SHADER};

/// Color format of the offscreen render target
pub const RENDER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const PRINT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const SHADOW_BIAS: f32 = 0.0015;

/// Per-frame uniform data (camera, lights, shadow projection)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    light_dirs: [[f32; 4]; 3],
    light_colors: [[f32; 4]; 3],
    params: [f32; 4],
}

impl FrameUniforms {
    pub fn new(camera: &OrbitCamera, lights: &LightRig, light_view_proj: Mat4, shadow_map_size: u32) -> Self {
        let ambient = lights.ambient_color.to_linear();
        let mut light_dirs = [[0.0; 4]; 3];
        let mut light_colors = [[0.0; 4]; 3];

        for (i, light) in lights.directional.iter().enumerate() {
            let dir = light.direction_to_light();
            let color = light.color.to_linear();
            light_dirs[i] = [dir.x, dir.y, dir.z, light.intensity];
            light_colors[i] = [color[0], color[1], color[2], if light.casts_shadow { 1.0 } else { 0.0 }];
        }

        let eye = camera.eye_position();
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            light_view_proj: light_view_proj.to_cols_array_2d(),
            camera_pos: [eye.x, eye.y, eye.z, 1.0],
            ambient: [
                ambient[0] * lights.ambient_intensity,
                ambient[1] * lights.ambient_intensity,
                ambient[2] * lights.ambient_intensity,
                1.0,
            ],
            light_dirs,
            light_colors,
            params: [
                lights.exposure,
                1.0 / shadow_map_size.max(1) as f32,
                SHADOW_BIAS,
                0.0,
            ],
        }
    }
}

/// Per-part material uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    base_color: [f32; 4],
    params: [f32; 4],
    flags: [f32; 4],
}

impl MaterialUniforms {
    pub fn from_material(material: &Material) -> Self {
        let color = material.color.to_linear();
        let (opacity, use_texture, shadow_only) = match material.shading {
            Shading::Opaque => (1.0, 0.0, 0.0),
            Shading::PrintTexture => (1.0, 1.0, 0.0),
            Shading::ShadowCatcher { opacity } => (opacity, 0.0, 1.0),
        };
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        Self {
            base_color: [color[0], color[1], color[2], opacity],
            params: [
                material.roughness,
                material.metalness,
                use_texture,
                flag(material.receives_shadow),
            ],
            flags: [shadow_only, flag(material.side == Side::Double), 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShadowUniforms {
    light_view_proj: [[f32; 4]; 4],
}

/// Which pipeline draws a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineKind {
    OpaqueFront,
    OpaqueDouble,
    Print,
    ShadowCatcher,
}

impl PipelineKind {
    fn for_material(material: &Material) -> Self {
        match (material.shading, material.side) {
            (Shading::PrintTexture, _) => PipelineKind::Print,
            (Shading::ShadowCatcher { .. }, _) => PipelineKind::ShadowCatcher,
            (Shading::Opaque, Side::Front) => PipelineKind::OpaqueFront,
            (Shading::Opaque, Side::Double) => PipelineKind::OpaqueDouble,
        }
    }
}

/// GPU buffers for one scene part
struct GpuPart {
    kind: PartKind,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    material: MaterialUniforms,
    pipeline: PipelineKind,
    casts_shadow: bool,
    uses_print_texture: bool,
}

struct Pipelines {
    opaque_front: wgpu::RenderPipeline,
    opaque_double: wgpu::RenderPipeline,
    print: wgpu::RenderPipeline,
    shadow_catcher: wgpu::RenderPipeline,
    shadow_depth: wgpu::RenderPipeline,
}

impl Pipelines {
    fn get(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        match kind {
            PipelineKind::OpaqueFront => &self.opaque_front,
            PipelineKind::OpaqueDouble => &self.opaque_double,
            PipelineKind::Print => &self.print,
            PipelineKind::ShadowCatcher => &self.shadow_catcher,
        }
    }
}

/// GPU renderer for the mug mockup
pub struct MockupRenderer {
    pipelines: Pipelines,
    material_layout: wgpu::BindGroupLayout,

    // Frame uniforms + shadow map binding
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    // Key light shadow map
    shadow_buffer: wgpu::Buffer,
    shadow_bind_group: wgpu::BindGroup,
    shadow_texture: wgpu::Texture,
    shadow_view: wgpu::TextureView,
    shadow_map_size: u32,

    // Print texture (stable for the renderer's lifetime unless the raster size changes)
    print_texture: wgpu::Texture,
    print_view: wgpu::TextureView,
    print_size: (u32, u32),
    surface_sampler: wgpu::Sampler,

    // Bound for parts that do not sample the print texture
    white_texture: wgpu::Texture,
    white_view: wgpu::TextureView,

    parts: Vec<GpuPart>,

    // Render target (panel's own texture)
    render_texture: Option<wgpu::Texture>,
    render_view: Option<wgpu::TextureView>,
    depth_texture: Option<wgpu::Texture>,
    depth_view: Option<wgpu::TextureView>,
    render_width: u32,
    render_height: u32,

    clear_color: wgpu::Color,
    disposed: bool,
}

impl MockupRenderer {
    /// Create the renderer and upload the scene geometry
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneModel,
        raster_size: (u32, u32),
        shadow_map_size: u32,
        background: HexColor,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mockup Shader"),
            source: wgpu::ShaderSource::Wgsl(MOCKUP_SHADER.into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mockup Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER.into()),
        });

        // Group 0: [0] frame uniforms, [1] shadow map, [2] comparison sampler
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mockup Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        // Group 1: [0] material uniforms, [1] surface texture, [2] sampler
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mockup Material Bind Group Layout"),
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mockup Shadow Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mockup Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let shadow_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mockup Shadow Pipeline Layout"),
            bind_group_layouts: &[&shadow_layout],
            push_constant_ranges: &[],
        });

        let surface_pipeline = |label: &str, cull_mode, blend, depth_write, depth_compare, bias| {
            Self::create_surface_pipeline(
                device,
                &pipeline_layout,
                &shader,
                label,
                cull_mode,
                blend,
                depth_write,
                depth_compare,
                bias,
            )
        };

        let pipelines = Pipelines {
            opaque_front: surface_pipeline(
                "Mockup Opaque Pipeline",
                Some(wgpu::Face::Back),
                Some(wgpu::BlendState::REPLACE),
                true,
                wgpu::CompareFunction::Less,
                wgpu::DepthBiasState::default(),
            ),
            opaque_double: surface_pipeline(
                "Mockup Double-Sided Pipeline",
                None,
                Some(wgpu::BlendState::REPLACE),
                true,
                wgpu::CompareFunction::Less,
                wgpu::DepthBiasState::default(),
            ),
            // Pulled toward the camera so it never fights with the body
            print: surface_pipeline(
                "Mockup Print Pipeline",
                Some(wgpu::Face::Back),
                Some(wgpu::BlendState::ALPHA_BLENDING),
                true,
                wgpu::CompareFunction::LessEqual,
                wgpu::DepthBiasState {
                    constant: -2,
                    slope_scale: -1.0,
                    clamp: 0.0,
                },
            ),
            shadow_catcher: surface_pipeline(
                "Mockup Shadow Catcher Pipeline",
                None,
                Some(wgpu::BlendState::ALPHA_BLENDING),
                false,
                wgpu::CompareFunction::Less,
                wgpu::DepthBiasState::default(),
            ),
            shadow_depth: device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Mockup Shadow Depth Pipeline"),
                layout: Some(&shadow_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shadow_shader,
                    entry_point: Some("vs_shadow"),
                    buffers: &[MockupVertex::buffer_layout()],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            }),
        };

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mockup Frame Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shadow_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mockup Shadow Buffer"),
            size: std::mem::size_of::<ShadowUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mockup Shadow Bind Group"),
            layout: &shadow_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_buffer.as_entire_binding(),
            }],
        });

        // Shadow map (depth texture + comparison sampler)
        let shadow_map_size = shadow_map_size.max(1);
        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mockup Shadow Map"),
            size: wgpu::Extent3d {
                width: shadow_map_size,
                height: shadow_map_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Mockup Shadow Map View"),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mockup Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mockup Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let surface_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mockup Surface Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let (print_texture, print_view) = Self::create_print_texture(device, raster_size.0, raster_size.1);
        let print_size = (raster_size.0.max(1), raster_size.1.max(1));

        let white_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mockup White Texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PRINT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &white_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let white_view = white_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let background = background.to_linear();

        let mut renderer = Self {
            pipelines,
            material_layout,
            frame_buffer,
            frame_bind_group,
            shadow_buffer,
            shadow_bind_group,
            shadow_texture,
            shadow_view,
            shadow_map_size,
            print_texture,
            print_view,
            print_size,
            surface_sampler,
            white_texture,
            white_view,
            parts: Vec::new(),
            render_texture: None,
            render_view: None,
            depth_texture: None,
            depth_view: None,
            render_width: 0,
            render_height: 0,
            clear_color: wgpu::Color {
                r: background[0] as f64,
                g: background[1] as f64,
                b: background[2] as f64,
                a: 1.0,
            },
            disposed: false,
        };
        renderer.upload_scene(device, scene);

        log::info!(
            "Mockup renderer ready: {} parts, {}x{} print texture, {} shadow map",
            renderer.parts.len(),
            renderer.print_size.0,
            renderer.print_size.1,
            renderer.shadow_map_size
        );

        renderer
    }

    #[allow(clippy::too_many_arguments)]
    fn create_surface_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        label: &str,
        cull_mode: Option<wgpu::Face>,
        blend: Option<wgpu::BlendState>,
        depth_write: bool,
        depth_compare: wgpu::CompareFunction,
        bias: wgpu::DepthBiasState,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[MockupVertex::buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: RENDER_FORMAT,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_write,
                depth_compare,
                stencil: wgpu::StencilState::default(),
                bias,
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_print_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mockup Print Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PRINT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_material_bind_group(
        &self,
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        uses_print_texture: bool,
    ) -> wgpu::BindGroup {
        let view = if uses_print_texture {
            &self.print_view
        } else {
            &self.white_view
        };
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mockup Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.surface_sampler),
                },
            ],
        })
    }

    fn upload_scene(&mut self, device: &wgpu::Device, scene: &SceneModel) {
        let mut parts = Vec::with_capacity(scene.parts().len());

        for part in scene.parts() {
            if part.mesh.index_count() == 0 {
                continue;
            }
            let label = part.kind.label();

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&part.mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&part.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            let material = MaterialUniforms::from_material(&part.material);
            let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&material),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

            let uses_print_texture = part.material.shading == Shading::PrintTexture;
            let material_bind_group = self.create_material_bind_group(device, &material_buffer, uses_print_texture);

            parts.push(GpuPart {
                kind: part.kind,
                vertex_buffer,
                index_buffer,
                index_count: part.mesh.index_count() as u32,
                material_buffer,
                material_bind_group,
                material,
                pipeline: PipelineKind::for_material(&part.material),
                casts_shadow: part.material.casts_shadow,
                uses_print_texture,
            });
        }

        // Opaque parts first, blended parts after, each group in scene order
        parts.sort_by_key(|p| p.pipeline == PipelineKind::Print || p.pipeline == PipelineKind::ShadowCatcher);
        self.parts = parts;
    }

    /// Rewrite material uniforms that changed (surface color edits)
    fn sync_materials(&mut self, queue: &wgpu::Queue, scene: &SceneModel) {
        for gpu_part in &mut self.parts {
            let Some(part) = scene.part(gpu_part.kind) else {
                continue;
            };
            let material = MaterialUniforms::from_material(&part.material);
            if material != gpu_part.material {
                queue.write_buffer(&gpu_part.material_buffer, 0, bytemuck::bytes_of(&material));
                gpu_part.material = material;
            }
        }
    }

    /// Copy the raster into the print texture if it changed since the last upload
    fn sync_print_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, raster: &mut PrintSurfaceRaster) {
        if !raster.take_dirty() {
            return;
        }

        let (width, height) = (raster.width(), raster.height());
        if (width, height) != self.print_size {
            log::warn!(
                "Print raster changed size {:?} -> {:?}; recreating print texture",
                self.print_size,
                (width, height)
            );
            self.print_texture.destroy();
            let (texture, view) = Self::create_print_texture(device, width, height);
            self.print_texture = texture;
            self.print_view = view;
            self.print_size = (width, height);

            let rebuilt: Vec<(usize, wgpu::BindGroup)> = self
                .parts
                .iter()
                .enumerate()
                .filter(|(_, p)| p.uses_print_texture)
                .map(|(i, p)| (i, self.create_material_bind_group(device, &p.material_buffer, true)))
                .collect();
            for (i, bind_group) in rebuilt {
                self.parts[i].material_bind_group = bind_group;
            }
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.print_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            raster.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        log::trace!("Uploaded print texture (generation {})", raster.generation());
    }

    /// Ensure render target exists with correct size; returns true when recreated
    pub fn ensure_render_target(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);

        if self.disposed || (self.render_width == width && self.render_height == height) {
            return false;
        }

        // Color target
        let render_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mockup Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: RENDER_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        // Depth target
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mockup Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        if let Some(old) = self.render_texture.take() {
            old.destroy();
        }
        if let Some(old) = self.depth_texture.take() {
            old.destroy();
        }

        self.render_view = Some(render_texture.create_view(&Default::default()));
        self.depth_view = Some(depth_texture.create_view(&Default::default()));
        self.render_texture = Some(render_texture);
        self.depth_texture = Some(depth_texture);
        self.render_width = width;
        self.render_height = height;
        true
    }

    /// Render one frame of the scene into the internal texture
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &OrbitCamera,
        scene: &SceneModel,
        raster: &mut PrintSurfaceRaster,
    ) {
        if self.disposed {
            return;
        }

        self.sync_print_texture(device, queue, raster);
        self.sync_materials(queue, scene);

        let (center, radius) = scene.shadow_bounds();
        let light_view_proj = scene
            .lights()
            .shadow_view_projection(center, radius)
            .unwrap_or(Mat4::IDENTITY);

        let frame = FrameUniforms::new(camera, scene.lights(), light_view_proj, self.shadow_map_size);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        let shadow = ShadowUniforms {
            light_view_proj: light_view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.shadow_buffer, 0, bytemuck::bytes_of(&shadow));

        // Shadow pass from the key light
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mockup Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            shadow_pass.set_pipeline(&self.pipelines.shadow_depth);
            shadow_pass.set_bind_group(0, &self.shadow_bind_group, &[]);
            for part in self.parts.iter().filter(|p| p.casts_shadow) {
                shadow_pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
                shadow_pass.set_index_buffer(part.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                shadow_pass.draw_indexed(0..part.index_count, 0, 0..1);
            }
        }

        let (Some(render_view), Some(depth_view)) = (&self.render_view, &self.depth_view) else {
            return; // No render target
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mockup Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: render_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for part in &self.parts {
            render_pass.set_pipeline(self.pipelines.get(part.pipeline));
            render_pass.set_bind_group(1, &part.material_bind_group, &[]);
            render_pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
            render_pass.set_index_buffer(part.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..part.index_count, 0, 0..1);
        }
    }

    /// Get rendered texture view for egui display
    pub fn texture_view(&self) -> Option<&wgpu::TextureView> {
        self.render_view.as_ref()
    }

    /// Get render target dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }

    pub fn aspect(&self) -> f32 {
        self.render_width.max(1) as f32 / self.render_height.max(1) as f32
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every GPU buffer and texture; later calls to `render` are no-ops
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for part in self.parts.drain(..) {
            part.vertex_buffer.destroy();
            part.index_buffer.destroy();
            part.material_buffer.destroy();
        }
        self.frame_buffer.destroy();
        self.shadow_buffer.destroy();
        self.shadow_texture.destroy();
        self.print_texture.destroy();
        self.white_texture.destroy();

        self.render_view = None;
        self.depth_view = None;
        if let Some(texture) = self.render_texture.take() {
            texture.destroy();
        }
        if let Some(texture) = self.depth_texture.take() {
            texture.destroy();
        }
        self.render_width = 0;
        self.render_height = 0;

        log::info!("Mockup renderer disposed");
    }
}

impl Drop for MockupRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 272);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48);
        assert_eq!(std::mem::size_of::<ShadowUniforms>(), 64);
    }

    #[test]
    fn test_frame_uniforms_lights() {
        let camera = OrbitCamera::new();
        let lights = LightRig::studio();
        let frame = FrameUniforms::new(&camera, &lights, Mat4::IDENTITY, 2048);

        // Key light casts, fill and rim do not.
        assert_eq!(frame.light_colors[0][3], 1.0);
        assert_eq!(frame.light_colors[1][3], 0.0);
        assert_eq!(frame.light_colors[2][3], 0.0);
        assert_eq!(frame.light_dirs[1][3], 0.4);
        assert!((frame.ambient[0] - 0.6).abs() < 1e-6);
        assert!((frame.params[1] - 1.0 / 2048.0).abs() < 1e-9);
    }

    #[test]
    fn test_material_uniforms() {
        let scene = SceneModel::default();

        let print = scene.part(PartKind::PrintBand).unwrap();
        let uniforms = MaterialUniforms::from_material(&print.material);
        assert_eq!(uniforms.params[2], 1.0);
        assert_eq!(uniforms.flags[0], 0.0);

        let floor = scene.part(PartKind::Floor).unwrap();
        let uniforms = MaterialUniforms::from_material(&floor.material);
        assert_eq!(uniforms.flags[0], 1.0);
        assert!((uniforms.base_color[3] - 0.1).abs() < 1e-6);
        assert_eq!(PipelineKind::for_material(&floor.material), PipelineKind::ShadowCatcher);

        let body = scene.part(PartKind::Body).unwrap();
        assert_eq!(PipelineKind::for_material(&body.material), PipelineKind::OpaqueFront);
        let uniforms = MaterialUniforms::from_material(&body.material);
        assert!((uniforms.params[0] - 0.15).abs() < 1e-6);
    }
}
