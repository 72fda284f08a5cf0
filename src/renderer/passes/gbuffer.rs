//! G-Buffer Pass
//!
//! Writes opaque scene geometry into the attachment set.
//!
//! Per frame, in this exact order:
//!
//! 1. Acquire the `"gbuffer"` command buffer and bind the four color
//!    attachments plus depth as render targets.
//! 2. Clear color to transparent black and depth to `1.0`, on exactly that set.
//! 3. Execute the clear immediately and reset the buffer.
//! 4. Cull the scene against the camera.
//! 5. Select and sort the visible objects tagged for this pass.
//! 6. Record the draws, execute, submit.
//!
//! An empty culling result still binds and clears, so the lighting resolve
//! always reads a well-defined G-buffer.

use log::trace;

use crate::errors::Result;
use crate::renderer::command::ClearFlags;
use crate::renderer::cull::{Culler, VisibilitySet};
use crate::renderer::draw_list::{self, DrawFilter, DrawItem, SortCriteria};
use crate::renderer::passes::{FramePass, PassContext};
use crate::scene::PassTag;

/// Depth clear value (far plane).
pub const DEPTH_CLEAR: f32 = 1.0;

/// Counts from the last execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GBufferStats {
    pub visible: usize,
    pub drawn: usize,
}

pub struct GBufferPass {
    culler: Culler,
    filter: DrawFilter,
    sort: SortCriteria,
    visibility: VisibilitySet,
    draws: Vec<DrawItem>,
    stats: GBufferStats,
}

impl GBufferPass {
    #[must_use]
    pub fn new(tag: PassTag, sort: SortCriteria) -> Self {
        Self {
            culler: Culler::new(),
            filter: DrawFilter::opaque(tag),
            sort,
            visibility: VisibilitySet::with_capacity(256),
            draws: Vec::with_capacity(256),
            stats: GBufferStats::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> GBufferStats {
        self.stats
    }

    /// Draws recorded by the last execution, in submission order.
    #[inline]
    #[must_use]
    pub fn draws(&self) -> &[DrawItem] {
        &self.draws
    }

    #[inline]
    #[must_use]
    pub fn visibility(&self) -> &VisibilitySet {
        &self.visibility
    }
}

impl FramePass for GBufferPass {
    fn name(&self) -> &'static str {
        "gbuffer"
    }

    fn execute(&mut self, ctx: &mut PassContext<'_>) -> Result<()> {
        self.stats = GBufferStats::default();

        let mut cmd = ctx.pool.scope(self.name());

        let colors = ctx.attachments.color_bindings();
        cmd.set_render_targets(&colors, Some(ctx.attachments.depth().binding));
        cmd.clear_render_target(ClearFlags::ALL, wgpu::Color::TRANSPARENT, DEPTH_CLEAR);
        cmd.flush(&mut *ctx.backend, &ctx.globals)?;

        self.culler.cull(ctx.camera, ctx.scene, &mut self.visibility);
        draw_list::select(
            ctx.scene,
            &self.visibility,
            &self.filter,
            self.sort,
            &mut self.draws,
        );

        for item in &self.draws {
            cmd.draw(*item);
        }
        cmd.flush(&mut *ctx.backend, &ctx.globals)?;
        drop(cmd);

        ctx.submit_pass()?;

        self.stats = GBufferStats {
            visible: self.visibility.len(),
            drawn: self.draws.len(),
        };
        trace!(
            "G-buffer pass: {} visible, {} drawn",
            self.stats.visible, self.stats.drawn
        );
        Ok(())
    }
}
