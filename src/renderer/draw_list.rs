//! Draw Filter / Sort Policy
//!
//! Turns a [`VisibilitySet`] into the ordered list of draws for one pass.
//!
//! # Filtering
//! An object qualifies when it carries the pass tag (plain string match) and
//! sits in the requested render queue.
//!
//! # Sorting
//! Every criterion produces a *total* order: ties are broken by the object's
//! position in the visibility set, i.e. scene order. Sorting is therefore
//! deterministic across frames and can use an unstable, allocation-free sort.

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::renderer::cull::VisibilitySet;
use crate::scene::{GeometryId, ObjectKey, PassTag, RenderQueue, Scene};

/// Draw sort key (Geometry bucket + Depth).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderKey(u64);

impl RenderKey {
    /// Groups by geometry to minimize buffer rebinds, then front-to-back
    /// inside a group for early-z.
    #[must_use]
    pub fn common_opaque(geometry: GeometryId, distance_sq: f32) -> Self {
        // Fold the high half in so ids differing only above bit 32 still
        // land in different buckets (modulo xor collisions).
        let folded = (geometry.0 ^ (geometry.0 >> 32)) & 0xFFFF_FFFF;
        Self((folded << 32) | u64::from(depth_bits(distance_sq)))
    }

    #[must_use]
    pub fn front_to_back(distance_sq: f32) -> Self {
        Self(u64::from(depth_bits(distance_sq)))
    }

    #[must_use]
    pub fn back_to_front(distance_sq: f32) -> Self {
        Self(u64::from(u32::MAX - depth_bits(distance_sq)))
    }

    #[inline]
    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }
}

/// Non-negative floats keep their ordering when compared as raw bits.
#[inline]
fn depth_bits(distance_sq: f32) -> u32 {
    if distance_sq.is_sign_negative() || distance_sq.is_nan() {
        0
    } else {
        distance_sq.to_bits()
    }
}

/// Ordering policy for a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriteria {
    /// Geometry grouping, then front-to-back.
    #[default]
    CommonOpaque,
    FrontToBack,
    BackToFront,
    /// Scene order.
    Unsorted,
}

impl SortCriteria {
    #[must_use]
    pub fn key(self, geometry: GeometryId, distance_sq: f32) -> RenderKey {
        match self {
            Self::CommonOpaque => RenderKey::common_opaque(geometry, distance_sq),
            Self::FrontToBack => RenderKey::front_to_back(distance_sq),
            Self::BackToFront => RenderKey::back_to_front(distance_sq),
            Self::Unsorted => RenderKey::default(),
        }
    }
}

/// Which objects a pass draws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawFilter {
    pub pass: PassTag,
    pub queue: RenderQueue,
}

impl DrawFilter {
    #[must_use]
    pub fn opaque(pass: PassTag) -> Self {
        Self {
            pass,
            queue: RenderQueue::Opaque,
        }
    }

    #[must_use]
    pub fn accepts(&self, object: &crate::scene::SceneObject) -> bool {
        object.queue == self.queue && object.in_pass(&self.pass)
    }
}

/// One draw, ready to be recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub object: ObjectKey,
    pub geometry: GeometryId,
    pub world_matrix: Mat4,
    pub distance_sq: f32,
    pub sort_key: RenderKey,
    /// Position in the visibility set, used as the final tie-breaker.
    pub order: u32,
}

/// Selects and orders the draws for `filter` out of `visibility`.
///
/// `out` is cleared first and reused; objects that disappeared from the
/// scene since culling are skipped.
pub fn select(
    scene: &Scene,
    visibility: &VisibilitySet,
    filter: &DrawFilter,
    sort: SortCriteria,
    out: &mut Vec<DrawItem>,
) {
    out.clear();

    for (order, visible) in visibility.objects().iter().enumerate() {
        let Some(object) = scene.get(visible.key) else {
            continue;
        };
        if !filter.accepts(object) {
            continue;
        }

        out.push(DrawItem {
            object: visible.key,
            geometry: object.geometry,
            world_matrix: object.world_matrix,
            distance_sq: visible.distance_sq,
            sort_key: sort.key(object.geometry, visible.distance_sq),
            order: order as u32,
        });
    }

    out.sort_unstable_by_key(|item| (item.sort_key, item.order));
}
