use std::borrow::Cow;

use glam::{Affine3A, Mat4, Vec3, Vec4};

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        aspect: f32,
    },
    Orthographic {
        /// Half of the visible height in world units.
        half_height: f32,
        aspect: f32,
    },
}

/// A camera as handed over by the host's camera management.
///
/// The pipeline only reads it: view/projection matrices and the frustum are
/// derived on demand, once per frame.
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: Cow<'static, str>,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
    /// Camera-to-world transform. The camera looks down its local -Z.
    pub world_transform: Affine3A,
}

/// Parameters extracted from a camera for culling.
///
/// Only produced for non-degenerate cameras, see [`Camera::culling_parameters`].
#[derive(Debug, Clone, Copy)]
pub struct CullingParameters {
    pub frustum: Frustum,
    pub position: Vec3,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            name: Cow::Borrowed("Camera"),
            projection: Projection::Perspective {
                fov_y: fov_degrees.to_radians(),
                aspect,
            },
            near,
            far,
            world_transform: Affine3A::IDENTITY,
        }
    }

    #[must_use]
    pub fn new_orthographic(half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            name: Cow::Borrowed("Camera"),
            projection: Projection::Orthographic {
                half_height,
                aspect,
            },
            near,
            far,
            world_transform: Affine3A::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_transform(mut self, world_transform: Affine3A) -> Self {
        self.world_transform = world_transform;
        self
    }

    /// Places the camera at `eye` looking towards `target`.
    #[must_use]
    pub fn look_at(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        // look_at_rh yields world-to-view; the camera stores view-to-world.
        let view = Mat4::look_at_rh(eye, target, up);
        self.world_transform = Affine3A::from_mat4(view.inverse());
        self
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_transform.translation.into()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from(self.world_transform).inverse()
    }

    /// Projection with wgpu clip-space conventions (depth in `0..1`).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y, aspect } => {
                Mat4::perspective_rh(fov_y, aspect, self.near, self.far)
            }
            Projection::Orthographic {
                half_height,
                aspect,
            } => {
                let w = half_height * aspect;
                let h = half_height;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        }
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns `true` when the camera cannot produce a usable frustum
    /// (zero or inverted depth range, zero aspect/extent, non-finite values).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let range_ok = self.near.is_finite()
            && self.far.is_finite()
            && self.far > self.near;

        let projection_ok = match self.projection {
            Projection::Perspective { fov_y, aspect } => {
                self.near > 0.0
                    && fov_y.is_finite()
                    && fov_y > 0.0
                    && fov_y < std::f32::consts::PI
                    && aspect.is_finite()
                    && aspect > 0.0
            }
            Projection::Orthographic {
                half_height,
                aspect,
            } => half_height.is_finite() && half_height > 0.0 && aspect.is_finite() && aspect > 0.0,
        };

        !(range_ok && projection_ok && self.world_transform.is_finite())
    }

    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.view_projection_matrix())
    }

    /// Culling parameters, or `None` for a degenerate camera.
    #[must_use]
    pub fn culling_parameters(&self) -> Option<CullingParameters> {
        if self.is_degenerate() {
            return None;
        }
        Some(CullingParameters {
            frustum: self.frustum(),
            position: self.position(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    /// Extracts the six planes from a view-projection matrix
    /// (Gribb-Hartmann, `0..1` clip depth).
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // Left
            rows[3] - rows[0], // Right
            rows[3] + rows[1], // Bottom
            rows[3] - rows[1], // Top
            rows[2],           // Near
            rows[3] - rows[2], // Far
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > f32::EPSILON {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[inline]
    #[must_use]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }
}
