//! G-Buffer Attachment Set
//!
//! Owns the depth target and the four color targets the geometry pass writes
//! into, allocated once per output resolution.
//!
//! # Layout
//!
//! | Role | Binding | Format | Contents |
//! |------|---------|--------|----------|
//! | depth | `_gdepth` | `Depth32Float` | scene depth |
//! | 0 [`Albedo`](GBufferRole::Albedo) | `_GT0` | `Rgba8Unorm` | base color / occlusion |
//! | 1 [`Normal`](GBufferRole::Normal) | `_GT1` | `Rgb10a2Unorm` | packed world normal |
//! | 2 [`Material`](GBufferRole::Material) | `_GT2` | `Rgba16Float` | material parameters |
//! | 3 [`Data`](GBufferRole::Data) | `_GT3` | `Rgba32Float` | high-precision data |
//!
//! The role → format table is fixed. Shaders written against it depend on the
//! precision of each slot.

use log::{debug, warn};

use crate::errors::{LumenError, Result};
use crate::renderer::backend::{RenderBackend, TextureDesc, TextureId};

/// Depth attachment format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const ATTACHMENT_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING);

/// Semantic slot of a G-buffer color attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GBufferRole {
    Albedo = 0,
    Normal = 1,
    Material = 2,
    Data = 3,
}

impl GBufferRole {
    /// All roles in binding order.
    pub const ALL: [Self; 4] = [Self::Albedo, Self::Normal, Self::Material, Self::Data];

    const FORMATS: [wgpu::TextureFormat; 4] = [
        wgpu::TextureFormat::Rgba8Unorm,
        wgpu::TextureFormat::Rgb10a2Unorm,
        wgpu::TextureFormat::Rgba16Float,
        wgpu::TextureFormat::Rgba32Float,
    ];

    const LABELS: [&'static str; 4] = ["GBuffer GT0", "GBuffer GT1", "GBuffer GT2", "GBuffer GT3"];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    #[must_use]
    pub const fn format(self) -> wgpu::TextureFormat {
        Self::FORMATS[self.index()]
    }

    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// One allocated render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Used both to bind the target and to publish it as a global.
    pub binding: TextureId,
    pub label: &'static str,
}

/// Depth plus four color attachments of identical extent.
#[derive(Debug, PartialEq, Eq)]
pub struct AttachmentSet {
    depth: Attachment,
    colors: [Attachment; 4],
    width: u32,
    height: u32,
}

impl AttachmentSet {
    /// Allocates the full set at `width` x `height`.
    ///
    /// Either every attachment is allocated or none is: on failure the
    /// textures created so far are released before the error is returned.
    pub fn initialize(backend: &mut dyn RenderBackend, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LumenError::InvalidExtent { width, height });
        }

        let mut allocated: Vec<Attachment> = Vec::with_capacity(5);

        let requests = std::iter::once(("GBuffer Depth", DEPTH_FORMAT))
            .chain(GBufferRole::ALL.iter().map(|role| (role.label(), role.format())));

        for (label, format) in requests {
            let desc = TextureDesc {
                label,
                width,
                height,
                format,
                usage: ATTACHMENT_USAGE,
            };

            match backend.create_texture(&desc) {
                Ok(binding) => allocated.push(Attachment {
                    format,
                    width,
                    height,
                    binding,
                    label,
                }),
                Err(err) => {
                    warn!(
                        "Attachment '{label}' allocation failed, rolling back {} textures",
                        allocated.len()
                    );
                    for attachment in &allocated {
                        backend.release_texture(attachment.binding);
                    }
                    return Err(LumenError::AttachmentAllocation {
                        label,
                        width,
                        height,
                        format,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let depth = allocated[0];
        let colors = [allocated[1], allocated[2], allocated[3], allocated[4]];

        debug!("G-buffer allocated at {width}x{height}");

        Ok(Self {
            depth,
            colors,
            width,
            height,
        })
    }

    /// Returns every texture to the backend.
    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.release_texture(self.depth.binding);
        for color in &self.colors {
            backend.release_texture(color.binding);
        }
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> &Attachment {
        &self.depth
    }

    /// Color attachments ordered by role.
    #[inline]
    #[must_use]
    pub fn colors(&self) -> &[Attachment; 4] {
        &self.colors
    }

    #[inline]
    #[must_use]
    pub fn color(&self, role: GBufferRole) -> &Attachment {
        &self.colors[role.index()]
    }

    /// Binding ids of the color attachments, ordered by role.
    #[must_use]
    pub fn color_bindings(&self) -> [TextureId; 4] {
        self.colors.map(|c| c.binding)
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether `id` is one of this set's attachments.
    #[must_use]
    pub fn contains(&self, id: TextureId) -> bool {
        self.depth.binding == id || self.colors.iter().any(|c| c.binding == id)
    }
}
