//! Attachment Set Tests
//!
//! Tests for:
//! - Fixed role → format mapping
//! - Allocation of depth + four color targets with a shared extent
//! - Zero-extent rejection
//! - Rollback when the backend fails mid-allocation
//! - Release and re-initialization

use lumen::errors::LumenError;
use lumen::renderer::{
    AttachmentSet, BackendEvent, DEPTH_FORMAT, GBufferRole, RecordingBackend,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Role Table
// ============================================================================

#[test]
fn role_formats_are_fixed() {
    assert_eq!(GBufferRole::Albedo.format(), wgpu::TextureFormat::Rgba8Unorm);
    assert_eq!(GBufferRole::Normal.format(), wgpu::TextureFormat::Rgb10a2Unorm);
    assert_eq!(GBufferRole::Material.format(), wgpu::TextureFormat::Rgba16Float);
    assert_eq!(GBufferRole::Data.format(), wgpu::TextureFormat::Rgba32Float);
    assert_eq!(DEPTH_FORMAT, wgpu::TextureFormat::Depth32Float);
}

#[test]
fn roles_are_ordered_by_index() {
    for (i, role) in GBufferRole::ALL.iter().enumerate() {
        assert_eq!(role.index(), i);
    }
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn initialize_allocates_five_targets() {
    init_logger();
    let mut backend = RecordingBackend::new();
    let set = AttachmentSet::initialize(&mut backend, 640, 480).unwrap();

    assert_eq!(backend.live_textures(), 5);
    assert_eq!(set.extent(), (640, 480));

    assert_eq!(set.depth().format, DEPTH_FORMAT);
    for role in GBufferRole::ALL {
        let color = set.color(role);
        assert_eq!(color.format, role.format(), "{role:?}");
        assert_eq!((color.width, color.height), (640, 480), "{role:?}");
    }
    assert_eq!((set.depth().width, set.depth().height), (640, 480));
}

#[test]
fn attachments_are_renderable_and_sampleable() {
    let mut backend = RecordingBackend::new();
    let set = AttachmentSet::initialize(&mut backend, 64, 64).unwrap();

    let expected = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    for binding in std::iter::once(set.depth().binding).chain(set.color_bindings()) {
        let desc = backend.texture(binding).expect("texture must be alive");
        assert!(desc.usage.contains(expected), "{}", desc.label);
    }
}

#[test]
fn bindings_are_distinct() {
    let mut backend = RecordingBackend::new();
    let set = AttachmentSet::initialize(&mut backend, 64, 64).unwrap();

    let mut ids: Vec<_> = set.color_bindings().to_vec();
    ids.push(set.depth().binding);
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
        assert!(set.contains(*a));
    }
}

#[test]
fn zero_extent_is_rejected() {
    let mut backend = RecordingBackend::new();

    let err = AttachmentSet::initialize(&mut backend, 0, 720).unwrap_err();
    assert!(matches!(err, LumenError::InvalidExtent { width: 0, height: 720 }));
    assert!(err.is_initialization_failure());

    assert!(AttachmentSet::initialize(&mut backend, 1280, 0).is_err());
    assert_eq!(backend.live_textures(), 0);
    assert!(backend.events().is_empty());
}

#[test]
fn allocation_failure_rolls_back() {
    init_logger();
    let mut backend = RecordingBackend::new();
    // Depth and GT0 succeed, GT1 fails.
    backend.fail_allocation_after(2);

    let err = AttachmentSet::initialize(&mut backend, 1280, 720).unwrap_err();
    match &err {
        LumenError::AttachmentAllocation {
            label,
            width,
            height,
            format,
            ..
        } => {
            assert_eq!(*label, GBufferRole::Normal.label());
            assert_eq!((*width, *height), (1280, 720));
            assert_eq!(*format, GBufferRole::Normal.format());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_initialization_failure());

    // No partial set survives.
    assert_eq!(backend.live_textures(), 0);
    let released = backend
        .events()
        .iter()
        .filter(|e| matches!(e, BackendEvent::TextureReleased(_)))
        .count();
    assert_eq!(released, 2);
}

#[test]
fn release_returns_every_texture() {
    let mut backend = RecordingBackend::new();
    let set = AttachmentSet::initialize(&mut backend, 32, 32).unwrap();
    set.release(&mut backend);
    assert_eq!(backend.live_textures(), 0);
}

#[test]
fn reinitialize_after_release() {
    let mut backend = RecordingBackend::new();
    let first = AttachmentSet::initialize(&mut backend, 32, 32).unwrap();
    first.release(&mut backend);

    let second = AttachmentSet::initialize(&mut backend, 128, 64).unwrap();
    assert_eq!(second.extent(), (128, 64));
    assert_eq!(backend.live_textures(), 5);
}
