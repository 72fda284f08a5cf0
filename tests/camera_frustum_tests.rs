//! Camera and Frustum Tests
//!
//! Tests for:
//! - Perspective/Orthographic projection matrix generation (0..1 depth)
//! - View matrix / world transform relationship
//! - Frame context matrix derivation
//! - Frustum plane extraction (Gribb-Hartmann)
//! - Frustum-sphere intersection
//! - Degenerate camera detection

use glam::{Affine3A, Mat4, Vec3, Vec4};

use lumen::renderer::FrameContext;
use lumen::scene::camera::{Camera, Frustum, Projection};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn assert_mat_approx(a: Mat4, b: Mat4, what: &str) {
    for i in 0..4 {
        for j in 0..4 {
            assert!(
                approx(a.col(i)[j], b.col(i)[j]),
                "{what} differs at [{i}][{j}]: {} vs {}",
                a.col(i)[j],
                b.col(i)[j]
            );
        }
    }
}

// ============================================================================
// Projection Matrix Tests
// ============================================================================

#[test]
fn perspective_near_maps_to_0() {
    let cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);

    let near_point = cam.projection_matrix() * Vec4::new(0.0, 0.0, -0.1, 1.0);
    let ndc_z = near_point.z / near_point.w;
    assert!(approx(ndc_z, 0.0), "Near plane should map to NDC z=0.0, got {ndc_z}");
}

#[test]
fn perspective_far_maps_to_1() {
    let cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);

    let far_point = cam.projection_matrix() * Vec4::new(0.0, 0.0, -100.0, 1.0);
    let ndc_z = far_point.z / far_point.w;
    assert!(approx(ndc_z, 1.0), "Far plane should map to NDC z=1.0, got {ndc_z}");
}

#[test]
fn perspective_aspect_ratio_affects_x_scale() {
    let wide = Camera::new_perspective(60.0, 2.0, 0.1, 100.0);
    let square = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);

    assert_ne!(
        wide.projection_matrix().x_axis.x,
        square.projection_matrix().x_axis.x,
        "Different aspect ratios should produce different X scaling"
    );
}

#[test]
fn orthographic_keeps_w_at_one() {
    let cam = Camera::new_orthographic(5.0, 1.0, 0.1, 50.0);
    let p = cam.projection_matrix() * Vec4::new(3.0, -2.0, -10.0, 1.0);
    assert!(approx(p.w, 1.0));
    assert!(matches!(cam.projection, Projection::Orthographic { .. }));
}

// ============================================================================
// View / Frame Context Tests
// ============================================================================

#[test]
fn view_matrix_is_inverse_of_world() {
    let world = Affine3A::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0).with_transform(world);

    assert_mat_approx(Mat4::from(world) * cam.view_matrix(), Mat4::IDENTITY, "World * View");
}

#[test]
fn look_at_places_camera_at_eye() {
    let cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0).look_at(
        Vec3::new(0.0, 5.0, 10.0),
        Vec3::ZERO,
        Vec3::Y,
    );

    let position = cam.position();
    assert!(approx(position.x, 0.0));
    assert!(approx(position.y, 5.0));
    assert!(approx(position.z, 10.0));

    // The target ends up on the view axis.
    let target_view = cam.view_matrix().transform_point3(Vec3::ZERO);
    assert!(approx(target_view.x, 0.0));
    assert!(approx(target_view.y, 0.0));
    assert!(target_view.z < 0.0);
}

#[test]
fn frame_context_matrix_order_is_projection_times_view() {
    let cam = Camera::new_perspective(45.0, 1.5, 0.1, 100.0).look_at(
        Vec3::new(3.0, 2.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
    );
    let frame = FrameContext::from_camera(&cam, 7);

    assert_eq!(frame.frame_index, 7);
    assert_mat_approx(
        frame.view_projection,
        cam.projection_matrix() * cam.view_matrix(),
        "view_projection",
    );
    assert_mat_approx(
        frame.view_projection * frame.inverse_view_projection,
        Mat4::IDENTITY,
        "vp * vp_inv",
    );
}

fn assert_inverse_round_trip(cam: &Camera, what: &str) {
    let frame = FrameContext::from_camera(cam, 0);
    assert_ne!(frame.inverse_view_projection, Mat4::IDENTITY, "{what}: inverse fell back to identity");

    let product = frame.inverse_view_projection * frame.view_projection;
    for i in 0..4 {
        for j in 0..4 {
            let expected = if i == j { 1.0 } else { 0.0 };
            let actual = product.col(i)[j];
            assert!(
                (actual - expected).abs() < 1e-3,
                "{what}: vp_inv * vp differs at [{i}][{j}]: {actual}"
            );
        }
    }
}

#[test]
fn frame_context_inverse_round_trips_perspective() {
    let cam = Camera::new_perspective(60.0, 16.0 / 9.0, 0.1, 1000.0).look_at(
        Vec3::new(0.0, 50.0, 200.0),
        Vec3::ZERO,
        Vec3::Y,
    );
    assert_inverse_round_trip(&cam, "perspective");
}

#[test]
fn frame_context_inverse_round_trips_large_orthographic() {
    // Determinant of this view-projection is around 1e-8.
    let cam = Camera::new_orthographic(100.0, 16.0 / 9.0, 0.1, 1000.0).look_at(
        Vec3::new(0.0, 50.0, 200.0),
        Vec3::ZERO,
        Vec3::Y,
    );
    assert!(!cam.is_degenerate());
    assert!(cam.view_projection_matrix().determinant().abs() < f32::EPSILON);
    assert_inverse_round_trip(&cam, "orthographic");
}

#[test]
fn frame_context_of_degenerate_camera_is_finite() {
    let cam = Camera::new_perspective(60.0, 1.0, 1.0, 1.0);
    let frame = FrameContext::from_camera(&cam, 0);
    assert!(frame.inverse_view_projection.is_finite());
}

// ============================================================================
// Frustum Extraction and Intersection Tests
// ============================================================================

fn make_test_frustum() -> Frustum {
    // Standard perspective camera at origin looking down -Z
    let proj = Mat4::perspective_rh(60.0_f32.to_radians(), 1.0, 0.1, 100.0);
    Frustum::from_matrix(proj)
}

#[test]
fn frustum_planes_are_normalized() {
    let frustum = make_test_frustum();
    for plane in frustum.planes() {
        assert!(approx(plane.truncate().length(), 1.0));
    }
}

#[test]
fn frustum_sphere_inside() {
    let frustum = make_test_frustum();
    assert!(
        frustum.intersects_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0),
        "Sphere at center should be inside frustum"
    );
}

#[test]
fn frustum_sphere_outside_left() {
    let frustum = make_test_frustum();
    assert!(
        !frustum.intersects_sphere(Vec3::new(-1000.0, 0.0, -5.0), 1.0),
        "Sphere far to the left should be outside"
    );
}

#[test]
fn frustum_sphere_outside_behind() {
    let frustum = make_test_frustum();
    assert!(
        !frustum.intersects_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0),
        "Sphere behind camera should be outside"
    );
}

#[test]
fn frustum_sphere_beyond_far_plane() {
    let frustum = make_test_frustum();
    assert!(
        !frustum.intersects_sphere(Vec3::new(0.0, 0.0, -500.0), 1.0),
        "Sphere past the far plane should be outside"
    );
}

#[test]
fn frustum_sphere_straddling_boundary() {
    let frustum = make_test_frustum();
    assert!(
        frustum.intersects_sphere(Vec3::new(0.0, 0.0, -5.0), 100.0),
        "Large sphere should intersect"
    );
}

// ============================================================================
// Degenerate Camera Tests
// ============================================================================

#[test]
fn regular_camera_has_culling_parameters() {
    let cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);
    assert!(!cam.is_degenerate());
    assert!(cam.culling_parameters().is_some());
}

#[test]
fn zero_depth_range_is_degenerate() {
    let cam = Camera::new_perspective(60.0, 1.0, 1.0, 1.0);
    assert!(cam.is_degenerate());
    assert!(cam.culling_parameters().is_none());
}

#[test]
fn zero_aspect_is_degenerate() {
    let cam = Camera::new_perspective(60.0, 0.0, 0.1, 100.0);
    assert!(cam.is_degenerate());
}

#[test]
fn zero_near_perspective_is_degenerate() {
    let cam = Camera::new_perspective(60.0, 1.0, 0.0, 100.0);
    assert!(cam.is_degenerate());

    // Orthographic projections may start at zero.
    let ortho = Camera::new_orthographic(5.0, 1.0, 0.0, 100.0);
    assert!(!ortho.is_degenerate());
}

#[test]
fn negative_near_orthographic_is_valid() {
    let ortho = Camera::new_orthographic(5.0, 1.0, -10.0, 10.0);
    assert!(!ortho.is_degenerate());
    assert!(ortho.culling_parameters().is_some());

    let perspective = Camera::new_perspective(60.0, 1.0, -0.1, 100.0);
    assert!(perspective.is_degenerate());
}

#[test]
fn non_finite_transform_is_degenerate() {
    let cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0)
        .with_transform(Affine3A::from_translation(Vec3::new(f32::NAN, 0.0, 0.0)));
    assert!(cam.is_degenerate());
}
