//! Error Types
//!
//! This module defines the error types used throughout the pipeline.
//!
//! # Overview
//!
//! The main error type [`LumenError`] follows the pipeline's failure taxonomy:
//! - **Fatal initialization failures**: the attachment set cannot be allocated,
//!   so no pipeline is produced at all.
//! - **Fatal per-frame failures**: the lighting resolve program cannot be
//!   located; the frame is reported as failed.
//! - Backend and configuration errors surfaced from collaborators.
//!
//! Empty culling results and empty draw selections are *not* errors; they
//! produce an ambient-only frame.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, LumenError>`.

use thiserror::Error;

use crate::renderer::backend::TextureId;

/// The main error type for the deferred pipeline.
#[derive(Error, Debug)]
pub enum LumenError {
    // ========================================================================
    // Initialization Errors
    // ========================================================================
    /// A G-buffer attachment could not be allocated by the backend.
    #[error("Failed to allocate attachment '{label}' ({width}x{height}, {format:?}): {reason}")]
    AttachmentAllocation {
        /// Debug label of the attachment
        label: &'static str,
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
        /// Requested pixel format
        format: wgpu::TextureFormat,
        /// Backend-provided failure description
        reason: String,
    },

    /// The requested output resolution has a zero dimension.
    #[error("Invalid attachment extent: {width}x{height}")]
    InvalidExtent {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Per-Frame Errors
    // ========================================================================
    /// The lighting resolve program could not be located by its logical name.
    #[error("Shader program not found: {0}")]
    ProgramNotFound(String),

    /// A frame was requested without any camera.
    #[error("No camera provided for frame")]
    NoCamera,

    /// The backend was handed a texture it does not own.
    #[error("Unknown texture: {0:?}")]
    UnknownTexture(TextureId),

    /// The backend failed to execute or submit recorded commands.
    #[error("Backend error: {0}")]
    Backend(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error while loading pipeline settings.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// File I/O error while loading pipeline settings.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LumenError {
    /// Returns `true` for failures that prevent the pipeline from starting.
    #[must_use]
    pub fn is_initialization_failure(&self) -> bool {
        matches!(
            self,
            Self::AttachmentAllocation { .. }
                | Self::InvalidExtent { .. }
                | Self::AdapterRequestFailed(_)
                | Self::DeviceCreateFailed(_)
        )
    }
}

/// Alias for `Result<T, LumenError>`.
pub type Result<T> = std::result::Result<T, LumenError>;
