//! Frame Context
//!
//! Camera-derived matrices for one frame. Built once during SETUP and
//! immutable afterwards; passes see it through the sealed frame globals.

use glam::{Mat4, Vec3};

use crate::scene::Camera;

/// Per-frame camera state.
///
/// Matrix convention: column vectors, `view_projection = projection * view`,
/// clip-space depth in `0..1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub inverse_view_projection: Mat4,
    pub camera_position: Vec3,
    pub frame_index: u64,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            inverse_view_projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            frame_index: 0,
        }
    }
}

impl FrameContext {
    #[must_use]
    pub fn from_camera(camera: &Camera, frame_index: u64) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let view_projection = projection * view;

        // Valid orthographic cameras can have a determinant far below
        // f32::EPSILON, so only a singular or non-finite result falls back.
        let determinant = view_projection.determinant();
        let inverse_view_projection = Some(view_projection)
            .filter(|m| m.is_finite() && determinant.is_finite() && determinant != 0.0)
            .as_ref()
            .map(Mat4::inverse)
            .filter(Mat4::is_finite)
            .unwrap_or(Mat4::IDENTITY);

        Self {
            view,
            projection,
            view_projection,
            inverse_view_projection,
            camera_position: camera.position(),
            frame_index,
        }
    }
}
