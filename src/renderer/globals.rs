//! Global Shader State
//!
//! Per-frame key/value bindings (textures and matrices) visible to every draw
//! issued in that frame.
//!
//! Instead of a hidden process-wide table, the state is an explicit object
//! owned by the pipeline and handed to passes by reference. Its lifecycle is
//! split into two borrow phases:
//!
//! ```text
//! GlobalBindings::begin_frame ──► GlobalsPublisher (write) ──seal──► FrameGlobals (read)
//! ```
//!
//! Passes and backends only accept [`FrameGlobals`], which can only be obtained
//! by sealing the publisher. A pass therefore cannot read a key before it was
//! published, and nothing can publish while a pass is reading.

use std::borrow::Cow;

use glam::Mat4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::renderer::backend::TextureId;
use crate::renderer::frame::FrameContext;

/// Binding names shared with the shader/material layer.
///
/// Renaming any of these requires the matching change in the shaders.
pub mod names {
    /// G-buffer depth attachment.
    pub const GDEPTH: &str = "_gdepth";
    /// G-buffer color attachments, indexed by role (0–3).
    pub const GBUFFER: [&str; 4] = ["_GT0", "_GT1", "_GT2", "_GT3"];
    /// Diffuse irradiance cubemap.
    pub const DIFFUSE_IBL: &str = "_diffuseIBL";
    /// Prefiltered specular cubemap.
    pub const SPECULAR_IBL: &str = "_specularIBL";
    /// BRDF integration lookup table.
    pub const BRDF_LUT: &str = "_brdfLut";
    /// View-projection matrix.
    pub const VIEW_PROJECTION: &str = "_vpMat";
    /// Inverse view-projection matrix.
    pub const INVERSE_VIEW_PROJECTION: &str = "_vpMatInv";
}

/// A value bound to a global name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlobalValue {
    Texture(TextureId),
    Matrix(Mat4),
    /// Explicitly unset resource. Shaders sample it as zero contribution.
    Unbound,
}

/// The global binding table owned by the pipeline.
pub struct GlobalBindings {
    entries: FxHashMap<Cow<'static, str>, GlobalValue>,
    frame: FrameContext,
    publish_count: usize,
}

impl Default for GlobalBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalBindings {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(16, Default::default()),
            frame: FrameContext::default(),
            publish_count: 0,
        }
    }

    /// Starts the publish phase of a new frame.
    ///
    /// All keys from the previous frame are dropped; every frame must
    /// republish what it needs.
    pub fn begin_frame(&mut self, frame: FrameContext) -> GlobalsPublisher<'_> {
        self.entries.clear();
        self.publish_count = 0;
        self.frame = frame;
        GlobalsPublisher { bindings: self }
    }
}

/// Write access to the global table for the current frame.
pub struct GlobalsPublisher<'a> {
    bindings: &'a mut GlobalBindings,
}

impl<'a> GlobalsPublisher<'a> {
    /// Binds `value` to `key`, replacing any earlier value for the same key.
    pub fn publish(&mut self, key: impl Into<Cow<'static, str>>, value: GlobalValue) {
        self.bindings.entries.insert(key.into(), value);
        self.bindings.publish_count += 1;
    }

    #[inline]
    pub fn publish_texture(&mut self, key: impl Into<Cow<'static, str>>, texture: TextureId) {
        self.publish(key, GlobalValue::Texture(texture));
    }

    /// Publishes `texture` or, when absent, [`GlobalValue::Unbound`].
    #[inline]
    pub fn publish_optional_texture(
        &mut self,
        key: impl Into<Cow<'static, str>>,
        texture: Option<TextureId>,
    ) {
        self.publish(key, texture.map_or(GlobalValue::Unbound, GlobalValue::Texture));
    }

    #[inline]
    pub fn publish_matrix(&mut self, key: impl Into<Cow<'static, str>>, matrix: Mat4) {
        self.publish(key, GlobalValue::Matrix(matrix));
    }

    /// Ends the publish phase. The returned view is read-only for the rest
    /// of the frame.
    #[must_use]
    pub fn seal(self) -> FrameGlobals<'a> {
        FrameGlobals {
            bindings: self.bindings,
        }
    }
}

/// Read-only view of the globals published for the current frame.
#[derive(Clone, Copy)]
pub struct FrameGlobals<'a> {
    bindings: &'a GlobalBindings,
}

impl FrameGlobals<'_> {
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<GlobalValue> {
        self.bindings.entries.get(key).copied()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.bindings.entries.contains_key(key)
    }

    /// Returns the texture bound to `key`; `None` if the key is missing,
    /// unbound or holds a matrix.
    #[must_use]
    pub fn texture(&self, key: &str) -> Option<TextureId> {
        match self.get(key) {
            Some(GlobalValue::Texture(id)) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn matrix(&self, key: &str) -> Option<Mat4> {
        match self.get(key) {
            Some(GlobalValue::Matrix(m)) => Some(m),
            _ => None,
        }
    }

    /// Keys from `keys` that were not published this frame.
    #[must_use]
    pub fn missing<'k>(&self, keys: &[&'k str]) -> SmallVec<[&'k str; 4]> {
        keys.iter()
            .copied()
            .filter(|key| !self.contains(key))
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn frame(&self) -> &FrameContext {
        &self.bindings.frame
    }

    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.bindings.frame.frame_index
    }

    /// Number of distinct keys bound this frame.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.entries.is_empty()
    }

    /// Total number of publish calls this frame, including overwrites.
    #[inline]
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.bindings.publish_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, GlobalValue)> + '_ {
        self.bindings
            .entries
            .iter()
            .map(|(key, value)| (key.as_ref(), *value))
    }
}
