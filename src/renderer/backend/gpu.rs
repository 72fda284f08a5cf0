//! wgpu Backend
//!
//! Executes command buffers on a host-provided `wgpu::Device`.
//!
//! The backend owns every texture it hands out and translates commands into
//! render passes:
//!
//! | Command | GPU work |
//! |---------|----------|
//! | `SetRenderTargets` | Remembers the targets for following commands (also across buffers) |
//! | `ClearRenderTarget` | Empty render pass with `LoadOp::Clear` on the bound targets |
//! | `Draw` (run) | One render pass per run of consecutive draws, geometry via [`SceneDrawer`] |
//! | `Blit` | Full-screen triangle with the resolve program |
//! | `DrawSkybox` / `DrawGizmos` | Render pass on the camera target, content via [`SceneDrawer`] |
//!
//! Each executed buffer becomes one `wgpu::CommandBuffer`; `submit` hands
//! all pending buffers to the queue in execution order.
//!
//! Resolve programs are WGSL files embedded from `src/renderer/shaders`,
//! addressed by their path without extension (`"deferred/lightpass"`).

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use log::{debug, trace, warn};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::errors::{LumenError, Result};
use crate::renderer::backend::{ProgramId, ProgramLibrary, RenderBackend, TextureDesc, TextureId};
use crate::renderer::command::{ClearFlags, Command, CommandBuffer, GizmoSubset, RenderTarget};
use crate::renderer::draw_list::DrawItem;
use crate::renderer::frame::FrameContext;
use crate::renderer::globals::{FrameGlobals, GlobalValue, names};

#[derive(RustEmbed)]
#[folder = "src/renderer/shaders"]
struct ShaderAssets;

/// Host hook that records geometry into the pipeline's render passes.
///
/// The pipeline decides *when* and *into what* geometry is drawn; the host's
/// material system decides *how*. Implementations set their own pipelines
/// and bind groups on the pass.
pub trait SceneDrawer {
    /// Records one G-buffer draw. The four color attachments and depth are
    /// bound in role order.
    fn draw(&mut self, pass: &mut wgpu::RenderPass<'_>, item: &DrawItem, frame: &FrameContext);

    /// Records the skybox into the camera target.
    fn draw_skybox(&mut self, _pass: &mut wgpu::RenderPass<'_>, _frame: &FrameContext) {}

    /// Records one group of editor gizmos into the camera target.
    fn draw_gizmos(
        &mut self,
        _pass: &mut wgpu::RenderPass<'_>,
        _subset: GizmoSubset,
        _frame: &FrameContext,
    ) {
    }

    fn wants_gizmos(&self) -> bool {
        false
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view_projection: Mat4,
    inverse_view_projection: Mat4,
    camera_position: Vec4,
}

struct GpuTexture {
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    dimension: wgpu::TextureViewDimension,
    width: u32,
    height: u32,
    // Keeps the allocation alive for as long as the id is valid.
    _texture: wgpu::Texture,
}

struct CameraTarget {
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

#[derive(Default)]
struct BoundTargets {
    colors: SmallVec<[TextureId; 4]>,
    depth: Option<TextureId>,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,

    textures: SlotMap<TextureId, GpuTexture>,
    camera_target: Option<CameraTarget>,
    bound: BoundTargets,

    programs: FxHashMap<String, ProgramId>,
    modules: Vec<wgpu::ShaderModule>,
    pipelines: FxHashMap<(ProgramId, wgpu::TextureFormat), wgpu::RenderPipeline>,

    resolve_layout: wgpu::BindGroupLayout,
    resolve_pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    frame_uniforms: wgpu::Buffer,
    fallback_2d: wgpu::TextureView,
    fallback_cube: wgpu::TextureView,

    drawer: Option<Box<dyn SceneDrawer>>,
    pending: Vec<wgpu::CommandBuffer>,
}

impl WgpuBackend {
    /// Creates the backend on an existing device and compiles the embedded
    /// resolve programs.
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let resolve_layout = create_resolve_layout(&device);

        let resolve_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Deferred Resolve Pipeline Layout"),
            bind_group_layouts: &[Some(&resolve_layout)],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Deferred Resolve Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let frame_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Deferred Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let fallback_2d = create_fallback(&device, "Black Fallback 2D", 1, wgpu::TextureViewDimension::D2);
        let fallback_cube =
            create_fallback(&device, "Black Fallback Cube", 6, wgpu::TextureViewDimension::Cube);

        let mut backend = Self {
            device,
            queue,
            textures: SlotMap::with_key(),
            camera_target: None,
            bound: BoundTargets::default(),
            programs: FxHashMap::default(),
            modules: Vec::new(),
            pipelines: FxHashMap::default(),
            resolve_layout,
            resolve_pipeline_layout,
            sampler,
            frame_uniforms,
            fallback_2d,
            fallback_cube,
            drawer: None,
            pending: Vec::new(),
        };

        for file in ShaderAssets::iter() {
            let Some(name) = file.strip_suffix(".wgsl") else {
                continue;
            };
            let Some(source) = ShaderAssets::get(&file)
                .and_then(|asset| String::from_utf8(asset.data.into_owned()).ok())
            else {
                warn!("Embedded shader '{file}' is not valid UTF-8, skipped");
                continue;
            };
            backend.register_program(name, &source);
        }

        backend
    }

    /// Requests a default adapter and device without a surface.
    pub fn headless() -> Result<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::default();

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| LumenError::AdapterRequestFailed(e.to_string()))?;

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("Lumen Headless Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                })
                .await?;

            Ok::<_, LumenError>(Self::new(device, queue))
        })
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Compiles a resolve program from WGSL source. The shader must follow
    /// the resolve binding layout and expose `vs_main` / `fs_main`.
    ///
    /// Registering an existing name replaces its program.
    pub fn register_program(&mut self, name: &str, wgsl: &str) -> ProgramId {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(wgsl)),
        });

        if let Some(&id) = self.programs.get(name) {
            self.modules[id.0 as usize] = module;
            self.pipelines.retain(|(program, _), _| *program != id);
            return id;
        }

        let id = ProgramId(self.modules.len() as u32);
        self.modules.push(module);
        self.programs.insert(name.to_owned(), id);
        debug!("Registered program '{name}' as {id:?}");
        id
    }

    /// Takes ownership of a host texture, e.g. an IBL cubemap.
    pub fn import_texture(
        &mut self,
        texture: wgpu::Texture,
        dimension: wgpu::TextureViewDimension,
    ) -> TextureId {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(dimension),
            ..Default::default()
        });
        self.textures.insert(GpuTexture {
            view,
            format: texture.format(),
            dimension,
            width: texture.width(),
            height: texture.height(),
            _texture: texture,
        })
    }

    /// Sets the view that [`RenderTarget::CameraTarget`] resolves to, usually
    /// the current swap-chain image.
    pub fn set_camera_target(
        &mut self,
        view: wgpu::TextureView,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) {
        self.camera_target = Some(CameraTarget {
            view,
            format,
            width,
            height,
        });
    }

    pub fn set_drawer(&mut self, drawer: Box<dyn SceneDrawer>) {
        self.drawer = Some(drawer);
    }

    fn target_format(&self, target: RenderTarget) -> Result<wgpu::TextureFormat> {
        match target {
            RenderTarget::CameraTarget => self
                .camera_target
                .as_ref()
                .map(|t| t.format)
                .ok_or_else(|| LumenError::Backend("no camera target set".to_owned())),
            RenderTarget::Texture(id) => self
                .textures
                .get(id)
                .map(|t| t.format)
                .ok_or(LumenError::UnknownTexture(id)),
        }
    }

    fn ensure_resolve_pipeline(&mut self, program: ProgramId, format: wgpu::TextureFormat) -> Result<()> {
        if self.pipelines.contains_key(&(program, format)) {
            return Ok(());
        }

        let module = self
            .modules
            .get(program.0 as usize)
            .ok_or_else(|| LumenError::Backend(format!("unknown program {program:?}")))?;

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Deferred Resolve Pipeline"),
            layout: Some(&self.resolve_pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        trace!("Created resolve pipeline for {program:?} / {format:?}");
        self.pipelines.insert((program, format), pipeline);
        Ok(())
    }

    fn resolve_bind_group(&self, globals: &FrameGlobals<'_>) -> Result<wgpu::BindGroup> {
        let view = |key: &str, dimension: wgpu::TextureViewDimension| {
            global_view(&self.textures, globals, key, dimension, |dim| match dim {
                wgpu::TextureViewDimension::Cube => Some(&self.fallback_cube),
                wgpu::TextureViewDimension::D2 => Some(&self.fallback_2d),
                _ => None,
            })
        };

        let depth = view(names::GDEPTH, wgpu::TextureViewDimension::D2)?;
        let gt0 = view(names::GBUFFER[0], wgpu::TextureViewDimension::D2)?;
        let gt1 = view(names::GBUFFER[1], wgpu::TextureViewDimension::D2)?;
        let gt2 = view(names::GBUFFER[2], wgpu::TextureViewDimension::D2)?;
        let gt3 = view(names::GBUFFER[3], wgpu::TextureViewDimension::D2)?;
        let diffuse = view(names::DIFFUSE_IBL, wgpu::TextureViewDimension::Cube)?;
        let specular = view(names::SPECULAR_IBL, wgpu::TextureViewDimension::Cube)?;
        let brdf = view(names::BRDF_LUT, wgpu::TextureViewDimension::D2)?;

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Deferred Resolve BindGroup"),
            layout: &self.resolve_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.frame_uniforms.as_entire_binding(),
                },
                texture_entry(1, depth),
                texture_entry(2, gt0),
                texture_entry(3, gt1),
                texture_entry(4, gt2),
                texture_entry(5, gt3),
                texture_entry(6, diffuse),
                texture_entry(7, specular),
                texture_entry(8, brdf),
                wgpu::BindGroupEntry {
                    binding: 9,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }

    fn write_frame_uniforms(&self, globals: &FrameGlobals<'_>) -> Result<()> {
        let matrix = |key: &str| {
            globals
                .matrix(key)
                .ok_or_else(|| LumenError::Backend(format!("global '{key}' is not a matrix")))
        };

        let uniforms = FrameUniforms {
            view_projection: matrix(names::VIEW_PROJECTION)?,
            inverse_view_projection: matrix(names::INVERSE_VIEW_PROJECTION)?,
            camera_position: globals.frame().camera_position.extend(1.0),
        };
        self.queue
            .write_buffer(&self.frame_uniforms, 0, bytemuck::bytes_of(&uniforms));
        Ok(())
    }
}

impl ProgramLibrary for WgpuBackend {
    fn find_program(&self, name: &str) -> Option<ProgramId> {
        self.programs.get(name).copied()
    }
}

impl RenderBackend for WgpuBackend {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        let max = self.device.limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(LumenError::Backend(format!(
                "texture '{}' extent {}x{} outside 1..={max}",
                desc.label, desc.width, desc.height
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: desc.usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(self.textures.insert(GpuTexture {
            view,
            format: desc.format,
            dimension: wgpu::TextureViewDimension::D2,
            width: desc.width,
            height: desc.height,
            _texture: texture,
        }))
    }

    fn release_texture(&mut self, id: TextureId) {
        self.textures.remove(id);
    }

    fn execute(&mut self, buffer: &CommandBuffer, globals: &FrameGlobals<'_>) -> Result<()> {
        let commands = buffer.commands();

        // Pipelines are created up front so encoding below only borrows.
        for command in commands {
            if let Command::Blit {
                target, program, ..
            } = command
            {
                let format = self.target_format(*target)?;
                self.ensure_resolve_pipeline(*program, format)?;
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(buffer.name()),
            });
        let frame = globals.frame();

        let mut i = 0;
        while i < commands.len() {
            match &commands[i] {
                Command::SetRenderTargets { colors, depth } => {
                    for id in colors.iter().chain(depth.iter()) {
                        if !self.textures.contains_key(*id) {
                            return Err(LumenError::UnknownTexture(*id));
                        }
                    }
                    self.bound = BoundTargets {
                        colors: colors.clone(),
                        depth: *depth,
                    };
                }
                Command::ClearRenderTarget {
                    flags,
                    color,
                    depth,
                } => {
                    let color_load = if flags.contains(ClearFlags::COLOR) {
                        wgpu::LoadOp::Clear(*color)
                    } else {
                        wgpu::LoadOp::Load
                    };
                    let depth_load = if flags.contains(ClearFlags::DEPTH) {
                        wgpu::LoadOp::Clear(*depth)
                    } else {
                        wgpu::LoadOp::Load
                    };
                    let colors = color_attachments(&self.textures, &self.bound, color_load)?;
                    let depth = depth_attachment(&self.textures, &self.bound, depth_load)?;
                    // Load ops do the work; the pass itself records nothing.
                    let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Clear Targets"),
                        color_attachments: &colors,
                        depth_stencil_attachment: depth,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                        multiview_mask: None,
                    });
                }
                Command::Draw(_) => {
                    let end = commands[i..]
                        .iter()
                        .position(|c| !matches!(c, Command::Draw(_)))
                        .map_or(commands.len(), |n| i + n);

                    if self.bound.colors.is_empty() && self.bound.depth.is_none() {
                        return Err(LumenError::Backend(
                            "draw recorded without bound render targets".to_owned(),
                        ));
                    }

                    let colors = color_attachments(&self.textures, &self.bound, wgpu::LoadOp::Load)?;
                    let depth = depth_attachment(&self.textures, &self.bound, wgpu::LoadOp::Load)?;
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some(buffer.name()),
                        color_attachments: &colors,
                        depth_stencil_attachment: depth,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                        multiview_mask: None,
                    });

                    match self.drawer.as_mut() {
                        Some(drawer) => {
                            for command in &commands[i..end] {
                                if let Command::Draw(item) = command {
                                    drawer.draw(&mut pass, item, frame);
                                }
                            }
                        }
                        None => trace!("No scene drawer set, {} draws skipped", end - i),
                    }

                    i = end;
                    continue;
                }
                Command::Blit {
                    source,
                    target,
                    program,
                } => {
                    if !self.textures.contains_key(*source) {
                        return Err(LumenError::UnknownTexture(*source));
                    }

                    let (view, format) = match target {
                        RenderTarget::CameraTarget => {
                            let camera = self
                                .camera_target
                                .as_ref()
                                .ok_or_else(|| LumenError::Backend("no camera target set".to_owned()))?;
                            (&camera.view, camera.format)
                        }
                        RenderTarget::Texture(id) => {
                            let texture = self.textures.get(*id).ok_or(LumenError::UnknownTexture(*id))?;
                            (&texture.view, texture.format)
                        }
                    };

                    let bind_group = self.resolve_bind_group(globals)?;
                    self.write_frame_uniforms(globals)?;
                    let pipeline = self
                        .pipelines
                        .get(&(*program, format))
                        .ok_or_else(|| LumenError::Backend(format!("no pipeline for {program:?}")))?;

                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Deferred Resolve"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        ..Default::default()
                    });
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, &bind_group, &[]);
                    pass.draw(0..3, 0..1);
                }
                Command::DrawSkybox | Command::DrawGizmos(_) => {
                    let camera = self
                        .camera_target
                        .as_ref()
                        .ok_or_else(|| LumenError::Backend("no camera target set".to_owned()))?;

                    // Depth-test against the G-buffer when it matches the output size.
                    let depth = match globals.get(names::GDEPTH) {
                        Some(GlobalValue::Texture(id)) => self
                            .textures
                            .get(id)
                            .filter(|t| t.width == camera.width && t.height == camera.height),
                        _ => None,
                    };

                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Auxiliary Draws"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &camera.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: depth.map(|d| wgpu::RenderPassDepthStencilAttachment {
                            view: &d.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        }),
                        timestamp_writes: None,
                        occlusion_query_set: None,
                        multiview_mask: None,
                    });

                    if let Some(drawer) = self.drawer.as_mut() {
                        match &commands[i] {
                            Command::DrawGizmos(subset) => drawer.draw_gizmos(&mut pass, *subset, frame),
                            _ => drawer.draw_skybox(&mut pass, frame),
                        }
                    }
                }
            }
            i += 1;
        }

        self.pending.push(encoder.finish());
        Ok(())
    }

    fn submit(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        trace!("Submitting {} command buffers", self.pending.len());
        self.queue.submit(self.pending.drain(..));
        Ok(())
    }

    fn should_render_gizmos(&self) -> bool {
        self.drawer.as_ref().is_some_and(|d| d.wants_gizmos())
    }
}

fn color_attachments<'t>(
    textures: &'t SlotMap<TextureId, GpuTexture>,
    bound: &BoundTargets,
    load: wgpu::LoadOp<wgpu::Color>,
) -> Result<SmallVec<[Option<wgpu::RenderPassColorAttachment<'t>>; 4]>> {
    bound
        .colors
        .iter()
        .map(|id| {
            let texture = textures.get(*id).ok_or(LumenError::UnknownTexture(*id))?;
            Ok(Some(wgpu::RenderPassColorAttachment {
                view: &texture.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            }))
        })
        .collect()
}

fn depth_attachment<'t>(
    textures: &'t SlotMap<TextureId, GpuTexture>,
    bound: &BoundTargets,
    load: wgpu::LoadOp<f32>,
) -> Result<Option<wgpu::RenderPassDepthStencilAttachment<'t>>> {
    let Some(id) = bound.depth else {
        return Ok(None);
    };
    let texture = textures.get(id).ok_or(LumenError::UnknownTexture(id))?;
    Ok(Some(wgpu::RenderPassDepthStencilAttachment {
        view: &texture.view,
        depth_ops: Some(wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }))
}

/// Resolves a texture global to a view, substituting the black fallback for
/// unbound keys.
fn global_view<'t>(
    textures: &'t SlotMap<TextureId, GpuTexture>,
    globals: &FrameGlobals<'_>,
    key: &str,
    dimension: wgpu::TextureViewDimension,
    fallback: impl Fn(wgpu::TextureViewDimension) -> Option<&'t wgpu::TextureView>,
) -> Result<&'t wgpu::TextureView> {
    match globals.get(key) {
        Some(GlobalValue::Texture(id)) => {
            let texture = textures.get(id).ok_or(LumenError::UnknownTexture(id))?;
            if texture.dimension != dimension {
                return Err(LumenError::Backend(format!(
                    "global '{key}' is a {:?} texture, expected {dimension:?}",
                    texture.dimension
                )));
            }
            Ok(&texture.view)
        }
        Some(GlobalValue::Unbound) => fallback(dimension)
            .ok_or_else(|| LumenError::Backend(format!("no fallback for unbound '{key}'"))),
        Some(GlobalValue::Matrix(_)) | None => Err(LumenError::Backend(format!(
            "global '{key}' is not a published texture"
        ))),
    }
}

fn texture_entry(binding: u32, view: &wgpu::TextureView) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

fn create_resolve_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding: u32,
                   sample_type: wgpu::TextureSampleType,
                   view_dimension: wgpu::TextureViewDimension| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension,
            multisampled: false,
        },
        count: None,
    };

    let unfilterable = wgpu::TextureSampleType::Float { filterable: false };
    let filterable = wgpu::TextureSampleType::Float { filterable: true };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Deferred Resolve Layout"),
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
            texture(1, wgpu::TextureSampleType::Depth, wgpu::TextureViewDimension::D2),
            // G-buffer: Rgba32Float is not filterable, all roles use textureLoad.
            texture(2, unfilterable, wgpu::TextureViewDimension::D2),
            texture(3, unfilterable, wgpu::TextureViewDimension::D2),
            texture(4, unfilterable, wgpu::TextureViewDimension::D2),
            texture(5, unfilterable, wgpu::TextureViewDimension::D2),
            texture(6, filterable, wgpu::TextureViewDimension::Cube),
            texture(7, filterable, wgpu::TextureViewDimension::Cube),
            texture(8, filterable, wgpu::TextureViewDimension::D2),
            wgpu::BindGroupLayoutEntry {
                binding: 9,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// 1x1 black texture with `layers` array layers.
fn create_fallback(
    device: &wgpu::Device,
    label: &'static str,
    layers: u32,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::TextureView {
    // Freshly created textures are zero-initialized.
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(dimension),
        ..Default::default()
    })
}
