//! Pipeline Settings
//!
//! Static configuration of a [`DeferredPipeline`](crate::renderer::DeferredPipeline).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lumen::renderer::{PipelineSettings, SortCriteria};
//!
//! let settings = PipelineSettings {
//!     width: 1920,
//!     height: 1080,
//!     sort: SortCriteria::FrontToBack,
//!     ..Default::default()
//! };
//!
//! // Or from a JSON file; missing fields keep their defaults.
//! let settings = PipelineSettings::from_json_file("pipeline.json")?;
//! ```
//!
//! Clear values are not configurable: color targets clear to transparent
//! black and depth clears to `1.0`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::renderer::draw_list::SortCriteria;

/// Default logical name of the lighting resolve program.
pub const DEFAULT_LIGHTING_PROGRAM: &str = "deferred/lightpass";

/// Configuration for the deferred pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Initial output width in pixels.
    pub width: u32,
    /// Initial output height in pixels.
    pub height: u32,

    /// Pass tag geometry must carry to be drawn into the G-buffer.
    ///
    /// Default: `"gbuffer"`
    pub gbuffer_pass_tag: String,

    /// Logical name of the full-screen lighting resolve program.
    ///
    /// Default: `"deferred/lightpass"`
    pub lighting_program: String,

    /// Draw ordering for the G-buffer pass.
    pub sort: SortCriteria,

    /// Draw the skybox after the lighting resolve.
    pub draw_skybox: bool,

    /// Draw editor gizmos. Only honored when the backend also asks for them.
    pub draw_gizmos: bool,

    /// Submit after each pass in addition to the final end-of-frame submit.
    ///
    /// Turning this off batches the whole frame into one submission.
    pub submit_per_pass: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            gbuffer_pass_tag: "gbuffer".to_owned(),
            lighting_program: DEFAULT_LIGHTING_PROGRAM.to_owned(),
            sort: SortCriteria::default(),
            draw_skybox: true,
            draw_gizmos: true,
            submit_per_pass: true,
        }
    }
}

impl PipelineSettings {
    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
