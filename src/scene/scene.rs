//! Scene
//!
//! A flat, render-facing view of the host's scene graph. The host owns
//! hierarchy, transforms and assets; it mirrors what the deferred pipeline
//! needs into [`SceneObject`]s: a world matrix, bounds, the geometry handle
//! its material system understands, and the passes the object opts into.
//!
//! Objects are stored in a [`SlotMap`], whose iteration order is stable for a
//! given sequence of insertions and removals. Culling and sorting rely on that
//! for frame-to-frame determinism.

use std::borrow::Cow;

use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use smallvec::SmallVec;

slotmap::new_key_type! {
    /// Stable handle to a [`SceneObject`].
    pub struct ObjectKey;
}

/// Host-side geometry handle, opaque to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GeometryId(pub u64);

/// Pass membership tag.
///
/// Geometry opts into a pass by carrying its tag. Matching is a plain string
/// comparison, not a layer mask.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PassTag(Cow<'static, str>);

impl PassTag {
    /// Tag for the G-buffer pass.
    pub const GBUFFER: Self = Self(Cow::Borrowed("gbuffer"));

    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for PassTag {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for PassTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render queue an object belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RenderQueue {
    #[default]
    Opaque,
    Transparent,
}

/// Local-space bounding sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[must_use]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Transforms the sphere to world space. Non-uniform scale grows the
    /// radius by the largest axis scale.
    #[must_use]
    pub fn transformed(&self, world: &Mat4) -> Self {
        let center = world.transform_point3(self.center);
        let scale = world
            .x_axis
            .truncate()
            .length()
            .max(world.y_axis.truncate().length())
            .max(world.z_axis.truncate().length());
        Self {
            center,
            radius: self.radius * scale,
        }
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

/// A renderable object.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: Cow<'static, str>,
    pub geometry: GeometryId,
    pub world_matrix: Mat4,
    pub bounds: BoundingSphere,
    pub passes: SmallVec<[PassTag; 2]>,
    pub queue: RenderQueue,
    pub visible: bool,
}

impl SceneObject {
    /// Creates a visible, opaque object that takes part in the G-buffer pass.
    #[must_use]
    pub fn new(geometry: GeometryId, bounds: BoundingSphere) -> Self {
        let mut passes = SmallVec::new();
        passes.push(PassTag::GBUFFER);
        Self {
            name: Cow::Borrowed("Object"),
            geometry,
            world_matrix: Mat4::IDENTITY,
            bounds,
            passes,
            queue: RenderQueue::Opaque,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    #[must_use]
    pub fn with_queue(mut self, queue: RenderQueue) -> Self {
        self.queue = queue;
        self
    }

    /// Replaces the pass membership list.
    #[must_use]
    pub fn with_passes<I>(mut self, passes: I) -> Self
    where
        I: IntoIterator<Item = PassTag>,
    {
        self.passes = passes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn in_pass(&self, tag: &PassTag) -> bool {
        self.passes.iter().any(|p| p == tag)
    }

    #[inline]
    #[must_use]
    pub fn world_bounds(&self) -> BoundingSphere {
        self.bounds.transformed(&self.world_matrix)
    }
}

/// Render-facing scene.
#[derive(Default)]
pub struct Scene {
    objects: SlotMap<ObjectKey, SceneObject>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectKey {
        self.objects.insert(object)
    }

    pub fn remove(&mut self, key: ObjectKey) -> Option<SceneObject> {
        self.objects.remove(key)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> {
        self.objects.iter()
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
