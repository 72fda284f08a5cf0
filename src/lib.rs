#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Lumen: a deferred frame pipeline.
//!
//! Each frame allocates nothing new: a persistent G-buffer is cleared and
//! filled with opaque geometry, then a full-screen pass resolves lighting
//! from it plus image-based lighting maps.
//!
//! ```rust,ignore
//! use lumen::prelude::*;
//!
//! let mut backend = WgpuBackend::headless()?;
//! let mut pipeline = DeferredPipeline::new(&mut backend, PipelineSettings::default())?;
//! let report = pipeline.render(&mut backend, &scene, &[camera])?;
//! ```

pub mod errors;
pub mod renderer;
pub mod scene;

pub use errors::{LumenError, Result};
pub use renderer::{DeferredPipeline, PipelineSettings, RenderPipeline};
pub use scene::{Camera, EnvironmentMaps, Scene, SceneObject};

pub mod prelude {
    pub use crate::errors::{LumenError, Result};
    pub use crate::renderer::{
        DeferredPipeline, FrameReport, FrameStage, GBufferRole, PipelineSettings,
        RecordingBackend, RenderBackend, RenderPipeline, SortCriteria, WgpuBackend,
    };
    pub use crate::scene::{
        BoundingSphere, Camera, EnvironmentMaps, GeometryId, PassTag, Scene, SceneObject,
    };
}
