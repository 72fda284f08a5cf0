//! Draw Command Buffers
//!
//! A [`CommandBuffer`] is an ordered, named list of [`Command`]s built by a
//! pass and handed to the backend in one piece.
//!
//! Buffers are recycled through a [`CommandPool`] and only ever borrowed via
//! a [`CommandScope`]:
//!
//! ```text
//! pool.scope("gbuffer") ──► record ──► flush (execute + reset) ──► ... ──► drop (release)
//! ```
//!
//! The scope returns its buffer to the pool when dropped, so the buffer is
//! released on every exit path of a pass, including early `?` returns.

use bitflags::bitflags;
use log::debug;
use smallvec::SmallVec;

use crate::errors::Result;
use crate::renderer::backend::{ProgramId, RenderBackend, TextureId};
use crate::renderer::draw_list::DrawItem;
use crate::renderer::globals::{FrameGlobals, names};

bitflags! {
    /// Which aspects of the bound targets a clear touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

/// Destination of a command that writes color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Texture(TextureId),
    /// The camera's final output (swap-chain image or host target).
    CameraTarget,
}

/// Gizmo groups drawn around image effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoSubset {
    PreImageEffects,
    PostImageEffects,
}

/// Globals consumed by the full-screen lighting resolve.
pub const RESOLVE_READS: [&str; 10] = [
    names::GDEPTH,
    names::GBUFFER[0],
    names::GBUFFER[1],
    names::GBUFFER[2],
    names::GBUFFER[3],
    names::DIFFUSE_IBL,
    names::SPECULAR_IBL,
    names::BRDF_LUT,
    names::VIEW_PROJECTION,
    names::INVERSE_VIEW_PROJECTION,
];

const DRAW_READS: [&str; 1] = [names::VIEW_PROJECTION];

const SKYBOX_READS: [&str; 2] = [names::VIEW_PROJECTION, names::INVERSE_VIEW_PROJECTION];

/// A single recorded GPU command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Binds up to four color targets plus an optional depth target.
    SetRenderTargets {
        colors: SmallVec<[TextureId; 4]>,
        depth: Option<TextureId>,
    },
    /// Clears the currently bound targets.
    ClearRenderTarget {
        flags: ClearFlags,
        color: wgpu::Color,
        depth: f32,
    },
    /// Draws one item into the currently bound targets.
    Draw(DrawItem),
    /// Full-screen pass sampling `source` (and the frame globals) into `target`.
    Blit {
        source: TextureId,
        target: RenderTarget,
        program: ProgramId,
    },
    DrawSkybox,
    DrawGizmos(GizmoSubset),
}

impl Command {
    /// Global keys this command reads while executing.
    #[must_use]
    pub fn reads(&self) -> &'static [&'static str] {
        match self {
            Self::Draw(_) => &DRAW_READS,
            Self::Blit { .. } => &RESOLVE_READS,
            Self::DrawSkybox => &SKYBOX_READS,
            Self::SetRenderTargets { .. } | Self::ClearRenderTarget { .. } | Self::DrawGizmos(_) => {
                &[]
            }
        }
    }
}

/// Ordered, named list of commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBuffer {
    name: &'static str,
    commands: Vec<Command>,
}

impl CommandBuffer {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            commands: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops all recorded commands, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn set_render_targets(&mut self, colors: &[TextureId], depth: Option<TextureId>) {
        self.push(Command::SetRenderTargets {
            colors: SmallVec::from_slice(colors),
            depth,
        });
    }

    pub fn clear_render_target(&mut self, flags: ClearFlags, color: wgpu::Color, depth: f32) {
        self.push(Command::ClearRenderTarget {
            flags,
            color,
            depth,
        });
    }

    pub fn draw(&mut self, item: DrawItem) {
        self.push(Command::Draw(item));
    }

    pub fn blit(&mut self, source: TextureId, target: RenderTarget, program: ProgramId) {
        self.push(Command::Blit {
            source,
            target,
            program,
        });
    }

    pub fn draw_skybox(&mut self) {
        self.push(Command::DrawSkybox);
    }

    pub fn draw_gizmos(&mut self, subset: GizmoSubset) {
        self.push(Command::DrawGizmos(subset));
    }
}

/// Recycles command buffers across passes and frames.
#[derive(Debug, Default)]
pub struct CommandPool {
    free: Vec<CommandBuffer>,
}

impl CommandPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows a cleared buffer named `name` for the lifetime of the scope.
    pub fn scope(&mut self, name: &'static str) -> CommandScope<'_> {
        let mut buffer = self.free.pop().unwrap_or_default();
        buffer.name = name;
        CommandScope { pool: self, buffer }
    }

    fn release(&mut self, mut buffer: CommandBuffer) {
        buffer.clear();
        self.free.push(buffer);
    }

    /// Number of buffers waiting for reuse.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

/// Scoped command recording.
///
/// Dereferences to the underlying [`CommandBuffer`]. Commands that were never
/// flushed are discarded when the scope ends.
pub struct CommandScope<'p> {
    pool: &'p mut CommandPool,
    buffer: CommandBuffer,
}

impl CommandScope<'_> {
    /// Executes everything recorded so far, then resets the buffer for reuse.
    ///
    /// The buffer is reset even if the backend reports an error.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend, globals: &FrameGlobals<'_>) -> Result<()> {
        let result = backend.execute(&self.buffer, globals);
        self.buffer.clear();
        result
    }
}

impl std::ops::Deref for CommandScope<'_> {
    type Target = CommandBuffer;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl std::ops::DerefMut for CommandScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for CommandScope<'_> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            debug!(
                "Command buffer '{}' released with {} unflushed commands",
                self.buffer.name,
                self.buffer.len()
            );
        }
        let buffer = std::mem::take(&mut self.buffer);
        self.pool.release(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_returns_buffer_on_drop() {
        let mut pool = CommandPool::new();
        {
            let mut scope = pool.scope("test");
            scope.draw_skybox();
            assert_eq!(scope.name(), "test");
            assert_eq!(scope.len(), 1);
        }
        assert_eq!(pool.available(), 1);

        let scope = pool.scope("again");
        assert!(scope.is_empty(), "recycled buffers must start empty");
        assert_eq!(scope.name(), "again");
    }

    #[test]
    fn scope_released_on_early_return() {
        fn record(pool: &mut CommandPool, fail: bool) -> std::result::Result<(), &'static str> {
            let mut scope = pool.scope("failing");
            scope.draw_skybox();
            if fail {
                return Err("bail");
            }
            scope.draw_gizmos(GizmoSubset::PreImageEffects);
            Ok(())
        }

        let mut pool = CommandPool::new();
        assert!(record(&mut pool, true).is_err());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn resolve_reads_every_gbuffer_key() {
        for key in names::GBUFFER {
            assert!(RESOLVE_READS.contains(&key));
        }
        assert!(RESOLVE_READS.contains(&names::GDEPTH));
    }
}
