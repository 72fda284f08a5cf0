//! Lighting Pass
//!
//! Single full-screen resolve: samples the G-buffer, depth and IBL maps
//! through the frame globals and writes lit color into the output target.
//!
//! The resolve program is looked up by logical name each frame. A missing
//! program fails the pass before anything is recorded.

use log::trace;

use crate::errors::{LumenError, Result};
use crate::renderer::attachments::GBufferRole;
use crate::renderer::command::RenderTarget;
use crate::renderer::passes::{FramePass, PassContext};

pub struct LightingPass {
    program: String,
    target: RenderTarget,
}

impl LightingPass {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            target: RenderTarget::CameraTarget,
        }
    }

    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> RenderTarget {
        self.target
    }

    /// Redirects the resolve output. Defaults to the camera target.
    pub fn set_target(&mut self, target: RenderTarget) {
        self.target = target;
    }
}

impl FramePass for LightingPass {
    fn name(&self) -> &'static str {
        "lightPass"
    }

    fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<()> {
        let program = ctx
            .backend
            .find_program(&self.program)
            .ok_or_else(|| LumenError::ProgramNotFound(self.program.clone()))?;

        // The resolve samples every attachment; writing into one of them
        // would be a read/write hazard.
        if let RenderTarget::Texture(id) = self.target
            && ctx.attachments.contains(id)
        {
            return Err(LumenError::Backend(format!(
                "lighting resolve cannot target G-buffer attachment {id:?}"
            )));
        }

        let source = ctx.attachments.color(GBufferRole::Albedo).binding;

        let mut cmd = ctx.pool.scope(self.name());
        cmd.blit(source, self.target, program);
        cmd.flush(&mut *ctx.backend, &ctx.globals)?;
        drop(cmd);

        ctx.submit_pass()?;

        trace!("Lighting pass resolved with program '{}'", self.program);
        Ok(())
    }
}
