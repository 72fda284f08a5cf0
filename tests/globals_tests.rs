//! Global Shader State Tests
//!
//! Tests for:
//! - Publish then seal, read back through the sealed view
//! - No persistence of keys across frames
//! - Unbound optional textures
//! - Missing-key validation

use glam::Mat4;

use lumen::renderer::globals::names;
use lumen::renderer::{
    FrameContext, GlobalBindings, GlobalValue, RecordingBackend, TextureDesc, TextureId,
};

fn texture(backend: &mut RecordingBackend, label: &'static str) -> TextureId {
    backend.insert_texture(TextureDesc {
        label,
        width: 4,
        height: 4,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING,
    })
}

fn frame(index: u64) -> FrameContext {
    FrameContext {
        frame_index: index,
        ..FrameContext::default()
    }
}

#[test]
fn published_values_are_readable_after_seal() {
    let mut backend = RecordingBackend::new();
    let depth = texture(&mut backend, "depth");
    let vp = Mat4::from_scale(glam::Vec3::splat(2.0));

    let mut bindings = GlobalBindings::new();
    let mut publisher = bindings.begin_frame(frame(3));
    publisher.publish_texture(names::GDEPTH, depth);
    publisher.publish_matrix(names::VIEW_PROJECTION, vp);
    let globals = publisher.seal();

    assert_eq!(globals.frame_index(), 3);
    assert_eq!(globals.texture(names::GDEPTH), Some(depth));
    assert_eq!(globals.matrix(names::VIEW_PROJECTION), Some(vp));
    assert_eq!(globals.len(), 2);
}

#[test]
fn typed_getters_reject_mismatched_values() {
    let mut backend = RecordingBackend::new();
    let depth = texture(&mut backend, "depth");

    let mut bindings = GlobalBindings::new();
    let mut publisher = bindings.begin_frame(frame(0));
    publisher.publish_texture(names::GDEPTH, depth);
    publisher.publish_matrix(names::VIEW_PROJECTION, Mat4::IDENTITY);
    let globals = publisher.seal();

    assert_eq!(globals.matrix(names::GDEPTH), None);
    assert_eq!(globals.texture(names::VIEW_PROJECTION), None);
    assert_eq!(globals.texture("_unknown"), None);
}

#[test]
fn keys_do_not_survive_into_next_frame() {
    let mut backend = RecordingBackend::new();
    let brdf = texture(&mut backend, "brdf");

    let mut bindings = GlobalBindings::new();
    {
        let mut publisher = bindings.begin_frame(frame(0));
        publisher.publish_texture(names::BRDF_LUT, brdf);
        assert!(publisher.seal().contains(names::BRDF_LUT));
    }

    let globals = bindings.begin_frame(frame(1)).seal();
    assert!(!globals.contains(names::BRDF_LUT));
    assert!(globals.is_empty());
    assert_eq!(globals.publish_count(), 0);
}

#[test]
fn optional_texture_publishes_unbound() {
    let mut bindings = GlobalBindings::new();
    let mut publisher = bindings.begin_frame(frame(0));
    publisher.publish_optional_texture(names::DIFFUSE_IBL, None);
    let globals = publisher.seal();

    assert!(globals.contains(names::DIFFUSE_IBL));
    assert_eq!(globals.get(names::DIFFUSE_IBL), Some(GlobalValue::Unbound));
    assert_eq!(globals.texture(names::DIFFUSE_IBL), None);
}

#[test]
fn overwrites_keep_last_value() {
    let mut backend = RecordingBackend::new();
    let a = texture(&mut backend, "a");
    let b = texture(&mut backend, "b");

    let mut bindings = GlobalBindings::new();
    let mut publisher = bindings.begin_frame(frame(0));
    publisher.publish_texture(names::GBUFFER[0], a);
    publisher.publish_texture(names::GBUFFER[0], b);
    let globals = publisher.seal();

    assert_eq!(globals.texture(names::GBUFFER[0]), Some(b));
    assert_eq!(globals.len(), 1);
    assert_eq!(globals.publish_count(), 2);
}

#[test]
fn missing_lists_unpublished_keys() {
    let mut bindings = GlobalBindings::new();
    let mut publisher = bindings.begin_frame(frame(0));
    publisher.publish_matrix(names::VIEW_PROJECTION, Mat4::IDENTITY);
    let globals = publisher.seal();

    let missing = globals.missing(&[names::VIEW_PROJECTION, names::INVERSE_VIEW_PROJECTION]);
    assert_eq!(missing.as_slice(), &[names::INVERSE_VIEW_PROJECTION]);
}

#[test]
fn binding_names_match_shader_contract() {
    assert_eq!(names::GDEPTH, "_gdepth");
    assert_eq!(names::GBUFFER, ["_GT0", "_GT1", "_GT2", "_GT3"]);
    assert_eq!(names::DIFFUSE_IBL, "_diffuseIBL");
    assert_eq!(names::SPECULAR_IBL, "_specularIBL");
    assert_eq!(names::BRDF_LUT, "_brdfLut");
    assert_eq!(names::VIEW_PROJECTION, "_vpMat");
    assert_eq!(names::INVERSE_VIEW_PROJECTION, "_vpMatInv");
}
