//! Recording Backend
//!
//! A headless [`RenderBackend`] that performs no GPU work. Every call is
//! appended to an event log that tests and dry runs can inspect.
//!
//! Execution is validated the way a real backend would fail:
//! - every texture referenced by a command must be alive
//! - every global a command reads must have been published this frame
//! - blit programs must have been registered

use log::trace;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{LumenError, Result};
use crate::renderer::backend::{ProgramId, ProgramLibrary, RenderBackend, TextureDesc, TextureId};
use crate::renderer::command::{Command, CommandBuffer, RenderTarget};
use crate::renderer::globals::{FrameGlobals, GlobalValue};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    TextureCreated {
        id: TextureId,
        desc: TextureDesc,
    },
    TextureReleased(TextureId),
    Executed {
        name: &'static str,
        frame_index: u64,
        commands: Vec<Command>,
    },
    Submitted,
}

#[derive(Default)]
pub struct RecordingBackend {
    textures: SlotMap<TextureId, TextureDesc>,
    programs: FxHashMap<String, ProgramId>,
    events: Vec<BackendEvent>,
    allocation_budget: Option<usize>,
    render_gizmos: bool,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already knows the given program names.
    #[must_use]
    pub fn with_programs(names: &[&str]) -> Self {
        let mut backend = Self::new();
        for name in names {
            backend.register_program(*name);
        }
        backend
    }

    /// Registers a program and returns its id. Re-registering a name keeps
    /// the existing id.
    pub fn register_program(&mut self, name: impl Into<String>) -> ProgramId {
        let next = ProgramId(self.programs.len() as u32);
        *self.programs.entry(name.into()).or_insert(next)
    }

    /// Makes texture creation fail once `count` more textures were created.
    pub fn fail_allocation_after(&mut self, count: usize) {
        self.allocation_budget = Some(count);
    }

    pub fn clear_allocation_failure(&mut self) {
        self.allocation_budget = None;
    }

    pub fn set_render_gizmos(&mut self, enabled: bool) {
        self.render_gizmos = enabled;
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of currently alive textures.
    #[inline]
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&TextureDesc> {
        self.textures.get(id)
    }

    /// Executed command buffers, in execution order.
    pub fn executed(&self) -> impl Iterator<Item = (&'static str, &[Command])> + '_ {
        self.events.iter().filter_map(|event| match event {
            BackendEvent::Executed { name, commands, .. } => Some((*name, commands.as_slice())),
            _ => None,
        })
    }

    /// Number of `submit` calls recorded.
    #[must_use]
    pub fn submit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BackendEvent::Submitted))
            .count()
    }

    /// Adds a texture that was not allocated through the pipeline, e.g. an
    /// environment map.
    pub fn insert_texture(&mut self, desc: TextureDesc) -> TextureId {
        self.textures.insert(desc)
    }

    fn check_texture(&self, id: TextureId) -> Result<()> {
        if self.textures.contains_key(id) {
            Ok(())
        } else {
            Err(LumenError::UnknownTexture(id))
        }
    }

    fn validate(&self, command: &Command, globals: &FrameGlobals<'_>) -> Result<()> {
        let missing = globals.missing(command.reads());
        if !missing.is_empty() {
            return Err(LumenError::Backend(format!(
                "{command:?} reads unpublished globals {missing:?}"
            )));
        }

        for key in command.reads() {
            if let Some(GlobalValue::Texture(id)) = globals.get(key) {
                self.check_texture(id)?;
            }
        }

        match command {
            Command::SetRenderTargets { colors, depth } => {
                for id in colors.iter().chain(depth.iter()) {
                    self.check_texture(*id)?;
                }
            }
            Command::Blit {
                source,
                target,
                program,
            } => {
                self.check_texture(*source)?;
                if let RenderTarget::Texture(id) = target {
                    self.check_texture(*id)?;
                }
                if !self.programs.values().any(|p| p == program) {
                    return Err(LumenError::Backend(format!(
                        "unknown program {program:?}"
                    )));
                }
            }
            Command::ClearRenderTarget { .. }
            | Command::Draw(_)
            | Command::DrawSkybox
            | Command::DrawGizmos(_) => {}
        }
        Ok(())
    }
}

impl ProgramLibrary for RecordingBackend {
    fn find_program(&self, name: &str) -> Option<ProgramId> {
        self.programs.get(name).copied()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        if let Some(budget) = self.allocation_budget.as_mut() {
            if *budget == 0 {
                return Err(LumenError::Backend(format!(
                    "out of memory allocating '{}'",
                    desc.label
                )));
            }
            *budget -= 1;
        }

        let id = self.textures.insert(desc.clone());
        self.events.push(BackendEvent::TextureCreated {
            id,
            desc: desc.clone(),
        });
        Ok(id)
    }

    fn release_texture(&mut self, id: TextureId) {
        if self.textures.remove(id).is_some() {
            self.events.push(BackendEvent::TextureReleased(id));
        }
    }

    fn execute(&mut self, commands: &CommandBuffer, globals: &FrameGlobals<'_>) -> Result<()> {
        for command in commands.commands() {
            self.validate(command, globals)?;
        }

        trace!(
            "Recorded '{}' ({} commands) for frame {}",
            commands.name(),
            commands.len(),
            globals.frame_index()
        );
        self.events.push(BackendEvent::Executed {
            name: commands.name(),
            frame_index: globals.frame_index(),
            commands: commands.commands().to_vec(),
        });
        Ok(())
    }

    fn submit(&mut self) -> Result<()> {
        self.events.push(BackendEvent::Submitted);
        Ok(())
    }

    fn should_render_gizmos(&self) -> bool {
        self.render_gizmos
    }
}
