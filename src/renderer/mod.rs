//! Deferred Renderer
//!
//! - [`attachments`]: G-buffer allocation and the role → format table
//! - [`globals`]: per-frame global bindings (publish, then seal)
//! - [`cull`] / [`draw_list`]: visibility and draw ordering
//! - [`command`]: command buffers and scoped recording
//! - [`passes`]: G-buffer, lighting and auxiliary passes
//! - [`pipeline`]: the frame orchestrator
//! - [`backend`]: GPU seams (`wgpu` and a headless recorder)

pub mod attachments;
pub mod backend;
pub mod command;
pub mod cull;
pub mod draw_list;
pub mod frame;
pub mod globals;
pub mod passes;
pub mod pipeline;
pub mod settings;

pub use attachments::{Attachment, AttachmentSet, DEPTH_FORMAT, GBufferRole};
pub use backend::{
    BackendEvent, ProgramId, ProgramLibrary, RecordingBackend, RenderBackend, SceneDrawer,
    TextureDesc, TextureId, WgpuBackend,
};
pub use command::{
    ClearFlags, Command, CommandBuffer, CommandPool, CommandScope, GizmoSubset, RenderTarget,
};
pub use cull::{Culler, VisibilityHandle, VisibilitySet, VisibleObject};
pub use draw_list::{DrawFilter, DrawItem, RenderKey, SortCriteria};
pub use frame::FrameContext;
pub use globals::{FrameGlobals, GlobalBindings, GlobalValue, GlobalsPublisher};
pub use pipeline::{DeferredPipeline, FrameReport, FrameStage, RenderPipeline};
pub use settings::PipelineSettings;
