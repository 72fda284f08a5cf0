//! Frame Passes
//!
//! The three passes a deferred frame is made of, run in this order:
//!
//! - [`GBufferPass`]: clears the attachment set and draws opaque geometry into it
//! - [`LightingPass`]: full-screen resolve from the G-buffer into the output
//! - [`AuxiliaryPass`]: skybox and editor gizmos on top of the lit image
//!
//! Every pass records into a scoped command buffer from the shared
//! [`CommandPool`] and reads globals only through the sealed [`FrameGlobals`].

pub mod auxiliary;
pub mod gbuffer;
pub mod lighting;

pub use auxiliary::AuxiliaryPass;
pub use gbuffer::{GBufferPass, GBufferStats};
pub use lighting::LightingPass;

use crate::errors::Result;
use crate::renderer::attachments::AttachmentSet;
use crate::renderer::backend::RenderBackend;
use crate::renderer::command::CommandPool;
use crate::renderer::globals::FrameGlobals;
use crate::renderer::settings::PipelineSettings;
use crate::scene::{Camera, Scene};

/// Everything a pass may touch while executing.
pub struct PassContext<'a> {
    pub backend: &'a mut dyn RenderBackend,
    pub globals: FrameGlobals<'a>,
    pub pool: &'a mut CommandPool,
    pub settings: &'a PipelineSettings,
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub attachments: &'a AttachmentSet,
}

impl PassContext<'_> {
    /// Submits the work executed so far if per-pass submission is enabled.
    pub fn submit_pass(&mut self) -> Result<()> {
        if self.settings.submit_per_pass {
            self.backend.submit()?;
        }
        Ok(())
    }
}

/// A single pass of the deferred frame.
pub trait FramePass {
    /// Name used for command buffers and logging.
    fn name(&self) -> &'static str;

    /// Records and executes the pass.
    fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<()>;
}
