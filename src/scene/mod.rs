//! Scene-side inputs of the pipeline
//!
//! - [`Camera`]: view / projection source and culling parameters
//! - [`Scene`]: render-facing objects with pass membership
//! - [`EnvironmentMaps`]: IBL configuration

pub mod camera;
pub mod environment;
#[allow(clippy::module_inception)]
pub mod scene;

pub use camera::{Camera, CullingParameters, Frustum, Projection};
pub use environment::EnvironmentMaps;
pub use scene::{
    BoundingSphere, GeometryId, ObjectKey, PassTag, RenderQueue, Scene, SceneObject,
};
