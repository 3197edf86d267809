use image::ImageFormat;
use std::sync::Arc;

use crate::config::ImageLimits;
use crate::error::ServiceError;
use crate::images::{KeyLayout, TemporaryStager, VariantDeriver};
use crate::test_utils::mock_object_storage::MockObjectStorage;
use crate::test_utils::test_images::encode_test_image;
use crate::test_utils::test_logging::init_test_logging;

fn layout() -> KeyLayout {
    KeyLayout::new("res", "temp", "images").unwrap()
}

fn setup() -> (Arc<MockObjectStorage>, TemporaryStager<MockObjectStorage>) {
    init_test_logging();
    let storage = Arc::new(MockObjectStorage::new());
    let stager = TemporaryStager::new(storage.clone(), layout());
    (storage, stager)
}

fn derive(width: u32, height: u32, format: ImageFormat) -> crate::images::DerivedImage {
    VariantDeriver::new(ImageLimits::default())
        .derive(encode_test_image(width, height, format))
        .unwrap()
}

#[tokio::test]
async fn test_stage_jpeg_writes_three_objects() {
    let (storage, stager) = setup();
    let derived = derive(612, 408, ImageFormat::Jpeg);
    let original_bytes = derived.orig.content.clone();

    let variants = stager.stage("owner-1", derived).await.unwrap();

    for variant in variants.iter() {
        assert!(variant.key.starts_with("/res/temp/owner-1/"));
        assert!(variant.key.ends_with(&format!("{}.{}", variant.id, variant.ext)));
        assert!(variant.width > 0 && variant.height > 0);
    }
    assert_eq!(variants.orig.ext, "jpeg");
    assert_eq!(variants.prvw.ext, "webp");
    assert_eq!((variants.thmb.width, variants.thmb.height), (200, 133));

    assert_eq!(storage.keys().len(), 3);
    let orig = storage
        .object(variants.orig.key.trim_start_matches('/'))
        .unwrap();
    assert_eq!(orig.content_type, "image/jpeg");
    assert_eq!(orig.content, original_bytes);
    let thmb = storage
        .object(variants.thmb.key.trim_start_matches('/'))
        .unwrap();
    assert_eq!(thmb.content_type, "image/webp");
}

#[tokio::test]
async fn test_stage_webp_shares_preview_object() {
    let (storage, stager) = setup();

    let variants = stager
        .stage("owner-1", derive(750, 750, ImageFormat::WebP))
        .await
        .unwrap();

    assert_eq!(variants.prvw, variants.orig);
    assert_eq!((variants.orig.width, variants.orig.height), (750, 750));
    assert_eq!((variants.thmb.width, variants.thmb.height), (200, 200));
    assert_eq!(storage.keys().len(), 2);
}

#[tokio::test]
async fn test_stage_reports_storage_failure() {
    let (storage, stager) = setup();
    storage.set_fail_puts(true);

    let result = stager
        .stage("owner-1", derive(64, 32, ImageFormat::Png))
        .await;

    assert!(matches!(result, Err(ServiceError::StorageWrite(_))));
    assert!(storage.keys().is_empty());
}
