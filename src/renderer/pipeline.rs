//! Deferred Frame Orchestrator
//!
//! [`DeferredPipeline`] renders one frame per call, walking a fixed sequence
//! of stages:
//!
//! ```text
//! Setup ─► PublishGlobals ─► GBufferPass ─► LightPass ─► AuxDraws ─► Submit
//! ```
//!
//! - **Setup**: derive the [`FrameContext`] from the first camera.
//! - **PublishGlobals**: bind depth, G-buffer, IBL maps and matrices, then
//!   seal the table. Nothing is published after this point.
//! - **GBufferPass / LightPass / AuxDraws**: see [`passes`](crate::renderer::passes).
//! - **Submit**: final submission; always reached once globals are
//!   published, even when a pass failed. A failed G-buffer pass skips the
//!   lighting resolve.
//!
//! The attachment set is allocated when the pipeline is created and lives
//! until [`resize`](DeferredPipeline::resize) or
//! [`release`](DeferredPipeline::release).

use log::{debug, error, trace, warn};
use smallvec::SmallVec;

use crate::errors::{LumenError, Result};
use crate::renderer::attachments::AttachmentSet;
use crate::renderer::backend::RenderBackend;
use crate::renderer::command::{CommandPool, RenderTarget};
use crate::renderer::frame::FrameContext;
use crate::renderer::globals::{FrameGlobals, GlobalBindings, names};
use crate::renderer::passes::{
    AuxiliaryPass, FramePass, GBufferPass, GBufferStats, LightingPass, PassContext,
};
use crate::renderer::settings::PipelineSettings;
use crate::scene::{Camera, EnvironmentMaps, PassTag, Scene};

/// Anything that can render a scene for a list of cameras.
pub trait RenderPipeline {
    fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        scene: &Scene,
        cameras: &[Camera],
    ) -> Result<FrameReport>;
}

/// Frame stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStage {
    Setup,
    PublishGlobals,
    GBufferPass,
    LightPass,
    AuxDraws,
    Submit,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Stages that completed, in order.
    pub stages: SmallVec<[FrameStage; 6]>,
    /// Objects that passed culling.
    pub visible: usize,
    /// Draws recorded into the G-buffer.
    pub drawn: usize,
}

impl FrameReport {
    fn new(frame_index: u64) -> Self {
        Self {
            frame_index,
            stages: SmallVec::new(),
            visible: 0,
            drawn: 0,
        }
    }

    #[must_use]
    pub fn completed(&self, stage: FrameStage) -> bool {
        self.stages.contains(&stage)
    }
}

/// Deferred rendering pipeline: G-buffer, lighting resolve, auxiliary draws.
pub struct DeferredPipeline {
    settings: PipelineSettings,
    attachments: AttachmentSet,
    environment: EnvironmentMaps,
    globals: GlobalBindings,
    pool: CommandPool,

    gbuffer: GBufferPass,
    lighting: LightingPass,
    auxiliary: AuxiliaryPass,

    frame_index: u64,
    last_report: Option<FrameReport>,
    warned_missing_ibl: bool,
    warned_extra_cameras: bool,
}

impl DeferredPipeline {
    /// Creates the pipeline and allocates its attachment set at the
    /// configured resolution.
    pub fn new(backend: &mut dyn RenderBackend, settings: PipelineSettings) -> Result<Self> {
        let attachments = AttachmentSet::initialize(backend, settings.width, settings.height)?;

        let gbuffer = GBufferPass::new(PassTag::new(settings.gbuffer_pass_tag.clone()), settings.sort);
        let lighting = LightingPass::new(settings.lighting_program.clone());

        Ok(Self {
            settings,
            attachments,
            environment: EnvironmentMaps::default(),
            globals: GlobalBindings::new(),
            pool: CommandPool::new(),
            gbuffer,
            lighting,
            auxiliary: AuxiliaryPass::new(),
            frame_index: 0,
            last_report: None,
            warned_missing_ibl: false,
            warned_extra_cameras: false,
        })
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    #[inline]
    #[must_use]
    pub fn environment(&self) -> &EnvironmentMaps {
        &self.environment
    }

    /// Sets the IBL maps used from the next frame on.
    pub fn set_environment(&mut self, environment: EnvironmentMaps) {
        self.environment = environment;
        self.warned_missing_ibl = false;
    }

    /// Redirects the lighting resolve. Defaults to the camera target.
    pub fn set_output(&mut self, target: RenderTarget) {
        self.lighting.set_target(target);
    }

    /// Index of the next frame to be rendered.
    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Report of the most recent frame, including frames where a pass
    /// failed.
    #[inline]
    #[must_use]
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Stats of the most recent G-buffer pass.
    #[inline]
    #[must_use]
    pub fn gbuffer_stats(&self) -> GBufferStats {
        self.gbuffer.stats()
    }

    /// Reallocates the attachment set for a new output resolution.
    ///
    /// The new set is allocated before the old one is released, so a failed
    /// resize leaves the pipeline usable at its previous size.
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, width: u32, height: u32) -> Result<()> {
        if self.attachments.extent() == (width, height) {
            return Ok(());
        }

        let fresh = AttachmentSet::initialize(backend, width, height)?;
        let old = std::mem::replace(&mut self.attachments, fresh);
        old.release(backend);

        self.settings.width = width;
        self.settings.height = height;
        debug!("Pipeline resized to {width}x{height}");
        Ok(())
    }

    /// Returns all attachments to the backend.
    pub fn release(self, backend: &mut dyn RenderBackend) {
        self.attachments.release(backend);
    }
}

/// Binds every global the frame reads and seals the table.
fn publish_frame_globals<'a>(
    globals: &'a mut GlobalBindings,
    attachments: &AttachmentSet,
    environment: &EnvironmentMaps,
    frame: FrameContext,
) -> FrameGlobals<'a> {
    let mut publisher = globals.begin_frame(frame);

    publisher.publish_texture(names::GDEPTH, attachments.depth().binding);
    for (key, attachment) in names::GBUFFER.iter().zip(attachments.colors()) {
        publisher.publish_texture(*key, attachment.binding);
    }

    publisher.publish_optional_texture(names::DIFFUSE_IBL, environment.diffuse);
    publisher.publish_optional_texture(names::SPECULAR_IBL, environment.specular);
    publisher.publish_optional_texture(names::BRDF_LUT, environment.brdf_lut);

    publisher.publish_matrix(names::VIEW_PROJECTION, frame.view_projection);
    publisher.publish_matrix(names::INVERSE_VIEW_PROJECTION, frame.inverse_view_projection);

    publisher.seal()
}

impl RenderPipeline for DeferredPipeline {
    fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        scene: &Scene,
        cameras: &[Camera],
    ) -> Result<FrameReport> {
        let Some(camera) = cameras.first() else {
            return Err(LumenError::NoCamera);
        };
        if cameras.len() > 1 && !self.warned_extra_cameras {
            warn!(
                "{} cameras given, only '{}' is rendered",
                cameras.len(),
                camera.name
            );
            self.warned_extra_cameras = true;
        }

        let frame_index = self.frame_index;
        let mut report = FrameReport::new(frame_index);

        // Setup
        let frame = FrameContext::from_camera(camera, frame_index);
        report.stages.push(FrameStage::Setup);
        trace!("Frame {frame_index}: setup for camera '{}'", camera.name);

        // PublishGlobals
        if !self.environment.is_complete() && !self.warned_missing_ibl {
            warn!(
                "Environment maps incomplete (diffuse: {}, specular: {}, brdf: {}), unset maps contribute no lighting",
                self.environment.diffuse.is_some(),
                self.environment.specular.is_some(),
                self.environment.brdf_lut.is_some()
            );
            self.warned_missing_ibl = true;
        }
        let globals = publish_frame_globals(
            &mut self.globals,
            &self.attachments,
            &self.environment,
            frame,
        );
        report.stages.push(FrameStage::PublishGlobals);
        trace!("Frame {frame_index}: {} globals published", globals.len());

        self.frame_index += 1;

        let mut ctx = PassContext {
            backend,
            globals,
            pool: &mut self.pool,
            settings: &self.settings,
            scene,
            camera,
            attachments: &self.attachments,
        };

        // Once the frame has started it always reaches the final submit;
        // pass failures are reported after it.
        let gbuffer = self.gbuffer.execute(&mut ctx);
        match &gbuffer {
            Ok(()) => {
                let stats = self.gbuffer.stats();
                report.visible = stats.visible;
                report.drawn = stats.drawn;
                report.stages.push(FrameStage::GBufferPass);
            }
            Err(err) => error!("Frame {frame_index}: G-buffer pass failed: {err}"),
        }

        // Nothing valid to resolve without a complete G-buffer.
        let lighting = if gbuffer.is_ok() {
            self.lighting.execute(&mut ctx)
        } else {
            Ok(())
        };
        match &lighting {
            Ok(()) if gbuffer.is_ok() => report.stages.push(FrameStage::LightPass),
            Ok(()) => {}
            Err(err) => error!("Frame {frame_index}: lighting pass failed: {err}"),
        }

        let auxiliary = self.auxiliary.execute(&mut ctx);
        match &auxiliary {
            Ok(()) => report.stages.push(FrameStage::AuxDraws),
            Err(err) => error!("Frame {frame_index}: auxiliary draws failed: {err}"),
        }

        let submit = ctx.backend.submit();
        if submit.is_ok() {
            report.stages.push(FrameStage::Submit);
        }

        debug!(
            "Frame {frame_index}: {} visible, {} drawn, stages {:?}",
            report.visible, report.drawn, report.stages
        );
        self.last_report = Some(report.clone());

        gbuffer?;
        lighting?;
        auxiliary?;
        submit?;
        Ok(report)
    }
}
