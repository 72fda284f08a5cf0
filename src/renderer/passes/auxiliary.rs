//! Auxiliary Draws
//!
//! Skybox and editor gizmos, drawn after the lighting resolve into the
//! camera target. Gizmos are drawn only when enabled in the settings and
//! requested by the backend, in two groups around where image effects
//! would run.

use log::trace;

use crate::errors::Result;
use crate::renderer::command::GizmoSubset;
use crate::renderer::passes::{FramePass, PassContext};

#[derive(Debug, Default)]
pub struct AuxiliaryPass;

impl AuxiliaryPass {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FramePass for AuxiliaryPass {
    fn name(&self) -> &'static str {
        "auxiliary"
    }

    fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<()> {
        let draw_gizmos = ctx.settings.draw_gizmos && ctx.backend.should_render_gizmos();

        let mut cmd = ctx.pool.scope(self.name());
        if ctx.settings.draw_skybox {
            cmd.draw_skybox();
        }
        if draw_gizmos {
            cmd.draw_gizmos(GizmoSubset::PreImageEffects);
            cmd.draw_gizmos(GizmoSubset::PostImageEffects);
        }

        if cmd.is_empty() {
            return Ok(());
        }

        trace!("Auxiliary pass: {} commands", cmd.len());
        cmd.flush(&mut *ctx.backend, &ctx.globals)
    }
}
