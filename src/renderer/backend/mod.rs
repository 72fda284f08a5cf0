//! Backend Seams
//!
//! The pipeline never talks to a GPU API directly. Everything that touches
//! real GPU objects goes through [`RenderBackend`], and shader programs are
//! located through [`ProgramLibrary`]. Two implementations ship with the
//! crate:
//!
//! | Backend | Purpose |
//! |---------|---------|
//! | [`WgpuBackend`] | Real GPU execution on a host-provided `wgpu::Device` |
//! | [`RecordingBackend`] | Headless recorder used by tests and dry runs |
//!
//! # Contract
//!
//! - `execute` consumes one named command buffer. Commands inside a buffer run
//!   in order, buffers run in the order they are executed.
//! - `submit` flushes everything executed so far to the device. Ordering
//!   between submissions is the backend's submission-order guarantee.
//! - `execute` only ever receives a sealed [`FrameGlobals`]; globals cannot be
//!   changed while commands are being consumed.

pub mod gpu;
pub mod recording;

pub use gpu::{SceneDrawer, WgpuBackend};
pub use recording::{BackendEvent, RecordingBackend};

use crate::errors::Result;
use crate::renderer::command::CommandBuffer;
use crate::renderer::globals::FrameGlobals;

slotmap::new_key_type! {
    /// Backend-owned texture handle.
    ///
    /// Doubles as the *binding identifier* of an attachment: the same id is
    /// used to bind the texture as a render target and to publish it as a
    /// shader-readable global.
    pub struct TextureId;
}

/// Handle to a shader program resolved through a [`ProgramLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Description of a 2D texture requested from the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

/// Shader program lookup by logical name (e.g. `"deferred/lightpass"`).
pub trait ProgramLibrary {
    fn find_program(&self, name: &str) -> Option<ProgramId>;
}

/// GPU command submission backend.
pub trait RenderBackend: ProgramLibrary {
    /// Allocates a 2D texture. Failure is reported, never panicked.
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId>;

    /// Releases a texture previously returned by [`create_texture`](Self::create_texture).
    /// Unknown ids are ignored.
    fn release_texture(&mut self, id: TextureId);

    /// Executes one command buffer against the sealed frame globals.
    fn execute(&mut self, commands: &CommandBuffer, globals: &FrameGlobals<'_>) -> Result<()>;

    /// Submits all executed work to the device.
    fn submit(&mut self) -> Result<()>;

    /// Whether editor gizmos should be drawn this frame.
    fn should_render_gizmos(&self) -> bool {
        false
    }
}
