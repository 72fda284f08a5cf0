//! Culling & Visibility
//!
//! Computes the set of scene objects potentially visible to a camera.
//!
//! # Determinism
//! Objects are visited in scene order and tested against the camera frustum
//! with world-space bounding spheres. The same camera and scene always yield
//! the same set in the same order.
//!
//! # Degenerate cameras
//! A camera without usable culling parameters (zero depth range, zero aspect,
//! non-finite transform, ...) yields an **empty** set instead of an error, so
//! downstream passes degrade to "nothing drawn".

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use log::debug;

use crate::scene::{Camera, ObjectKey, Scene};

static NEXT_VISIBILITY_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one culling result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VisibilityHandle(u64);

impl VisibilityHandle {
    /// The handle of a set that has not been filled yet.
    pub const NONE: Self = Self(0);

    fn next() -> Self {
        Self(NEXT_VISIBILITY_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// An object that passed culling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleObject {
    pub key: ObjectKey,
    /// Squared distance from the camera to the world bounds center.
    pub distance_sq: f32,
}

/// The culling result for one camera.
///
/// Lives only within the G-buffer pass. The pipeline keeps one instance and
/// refills it every frame so the object list is not reallocated.
#[derive(Debug, Default)]
pub struct VisibilitySet {
    handle: VisibilityHandle,
    camera_position: Vec3,
    objects: Vec<VisibleObject>,
}

impl VisibilitySet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handle: VisibilityHandle::NONE,
            camera_position: Vec3::ZERO,
            objects: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.handle = VisibilityHandle::NONE;
        self.camera_position = Vec3::ZERO;
        self.objects.clear();
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> VisibilityHandle {
        self.handle
    }

    #[inline]
    #[must_use]
    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    #[inline]
    #[must_use]
    pub fn objects(&self) -> &[VisibleObject] {
        &self.objects
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Frustum culler.
#[derive(Debug, Default, Clone, Copy)]
pub struct Culler;

impl Culler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fills `out` with the objects of `scene` visible from `camera`.
    ///
    /// `out` always receives a fresh handle, even when the result is empty.
    pub fn cull(&self, camera: &Camera, scene: &Scene, out: &mut VisibilitySet) {
        out.clear();
        out.handle = VisibilityHandle::next();

        let Some(params) = camera.culling_parameters() else {
            debug!(
                "Camera '{}' has degenerate culling parameters, nothing is visible",
                camera.name
            );
            return;
        };

        out.camera_position = params.position;

        for (key, object) in scene.iter() {
            if !object.visible {
                continue;
            }

            let bounds = object.world_bounds();
            if !params.frustum.intersects_sphere(bounds.center, bounds.radius) {
                continue;
            }

            out.objects.push(VisibleObject {
                key,
                distance_sq: bounds.center.distance_squared(params.position),
            });
        }
    }
}
