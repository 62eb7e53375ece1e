use diagramkit_core::{
    DiagnosticEvent, EditorEvent, ElementError, ElementEvent, ElementId, ElementKind, Error,
    ImageError,
};
use diagramkit_editor::element::{ImageElement, ImagePatch, ImageProps};
use diagramkit_editor::image_loader::{DecodedImage, ImageLoader, MemoryImageLoader};
use diagramkit_editor::scene::{RetainedScene, SceneGraph};

use crate::support::{png, recording_context};

fn loader_with(images: &[(&str, u32, u32)]) -> MemoryImageLoader {
    let loader = MemoryImageLoader::new();
    for (src, width, height) in images {
        loader.insert(*src, png(*width, *height));
    }
    loader
}

#[tokio::test]
async fn test_loaded_image_gets_a_body() {
    let loader = loader_with(&[("pump.png", 40, 30)]);
    let mut scene = RetainedScene::new();
    let (ctx, events) = recording_context();

    let image = ImageElement::create(
        &mut scene,
        ctx,
        &loader,
        ElementId::new(),
        ImageProps::new("pump.png"),
    )
    .await;

    assert!(image.is_loaded());
    assert_eq!(
        image.natural_size(),
        Some(DecodedImage {
            width: 40,
            height: 30
        })
    );
    assert_eq!(image.dimensions(), Some((40.0, 30.0)));
    assert_eq!(scene.len(), 1);
    assert!(events
        .lock()
        .iter()
        .any(|e| matches!(e, EditorEvent::Element(ElementEvent::Loaded { .. }))));
}

#[tokio::test]
async fn test_invalid_source_adds_nothing() {
    let loader = MemoryImageLoader::new();
    let mut scene = RetainedScene::new();
    let (ctx, events) = recording_context();

    let image = ImageElement::create(
        &mut scene,
        ctx,
        &loader,
        ElementId::new(),
        ImageProps::new("missing.png"),
    )
    .await;

    assert!(!image.is_loaded());
    assert!(scene.is_empty());
    assert!(image.owned_primitives().is_empty());
    assert!(matches!(image.last_error(), Some(ImageError::Load { .. })));
    assert!(events.lock().iter().any(|e| matches!(
        e,
        EditorEvent::Diagnostic(DiagnosticEvent::ImageLoadFailed { .. })
    )));
}

#[tokio::test]
async fn test_undecodable_bytes_are_a_decode_error() {
    let loader = MemoryImageLoader::new();
    loader.insert("broken.png", b"not an image".to_vec());
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();

    let image = ImageElement::create(
        &mut scene,
        ctx,
        &loader,
        ElementId::new(),
        ImageProps::new("broken.png"),
    )
    .await;

    assert!(!image.is_loaded());
    assert!(matches!(image.last_error(), Some(ImageError::Decode { .. })));
}

#[tokio::test]
async fn test_latest_request_wins() {
    let loader = loader_with(&[("a.png", 10, 10), ("b.png", 20, 20)]);
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image = ImageElement::pending(ctx, ElementId::new(), ImageProps::new("a.png"));

    let first = image.begin_load(&mut scene);
    let second = image
        .update(&mut scene, ImagePatch::src("b.png"))
        .expect("update")
        .expect("ticket");
    assert!(second.generation() > first.generation());

    // The newer load completes first; the older one must not replace it.
    let b = loader.load(second.src()).await;
    assert!(image.finish_load(&mut scene, &second, b));
    let a = loader.load(first.src()).await;
    assert!(!image.finish_load(&mut scene, &first, a));

    assert_eq!(image.natural_size().map(|s| s.width), Some(20));
    assert_eq!(scene.len(), 1);
}

#[tokio::test]
async fn test_destroy_invalidates_pending_loads() {
    let loader = loader_with(&[("a.png", 10, 10)]);
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image = ImageElement::pending(ctx, ElementId::new(), ImageProps::new("a.png"));

    let ticket = image.begin_load(&mut scene);
    image.destroy(&mut scene);
    let result = loader.load(ticket.src()).await;

    assert!(!image.finish_load(&mut scene, &ticket, result));
    assert!(scene.is_empty());
}

#[tokio::test]
async fn test_update_without_new_source_moves_body() {
    let loader = loader_with(&[("a.png", 10, 10)]);
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image =
        ImageElement::create(&mut scene, ctx, &loader, ElementId::new(), ImageProps::new("a.png"))
            .await;

    let ticket = image
        .update(
            &mut scene,
            ImagePatch {
                left: Some(5.0),
                opacity: Some(3.0),
                flip_x: Some(true),
                ..Default::default()
            },
        )
        .expect("update");

    assert!(ticket.is_none());
    let body = scene.primitive(image.body().expect("body")).expect("body");
    assert_eq!(body.placement.left, 5.0);
    assert!(body.placement.flip_x);
    assert_eq!(body.style.opacity, 1.0);
}

#[tokio::test]
async fn test_empty_source_in_update_keeps_the_image() {
    let loader = loader_with(&[("a.png", 10, 10)]);
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image =
        ImageElement::create(&mut scene, ctx, &loader, ElementId::new(), ImageProps::new("a.png"))
            .await;
    let body = image.body().expect("body");

    let ticket = image
        .update(
            &mut scene,
            ImagePatch {
                src: Some(String::new()),
                top: Some(12.0),
                ..Default::default()
            },
        )
        .expect("update");

    assert!(ticket.is_none());
    assert!(image.is_loaded());
    assert_eq!(image.props().src, "a.png");
    assert_eq!(image.body(), Some(body));
    assert_eq!(scene.primitive(body).expect("body").placement.top, 12.0);
}

#[tokio::test]
async fn test_reset_size() {
    let loader = loader_with(&[("a.png", 10, 8)]);
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image =
        ImageElement::create(&mut scene, ctx, &loader, ElementId::new(), ImageProps::new("a.png"))
            .await;
    scene.scale_by(image.body().expect("body"), 3.0, 2.0);
    image.sync_from_body(&scene);
    assert_eq!(image.dimensions(), Some((30.0, 16.0)));

    image.reset_size(&mut scene).expect("reset");
    assert_eq!(image.dimensions(), Some((10.0, 8.0)));
}

#[tokio::test]
async fn test_reset_size_needs_a_loaded_image() {
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image = ImageElement::pending(ctx, ElementId::new(), ImageProps::new("a.png"));
    assert!(matches!(
        image.reset_size(&mut scene),
        Err(Error::Element(ElementError::NotLoaded { .. }))
    ));
}

#[tokio::test]
async fn test_images_have_no_edit_mode() {
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut image = ImageElement::pending(ctx, ElementId::new(), ImageProps::new("a.png"));
    assert!(matches!(
        image.set_edit_mode(&mut scene, true),
        Err(Error::Element(ElementError::Unsupported {
            kind: ElementKind::Image,
            ..
        }))
    ));
    assert!(image.set_edit_mode(&mut scene, false).is_ok());
}

#[tokio::test]
async fn test_file_loader_resolves_relative_sources() {
    use diagramkit_editor::image_loader::FileImageLoader;

    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("valve.png"), png(6, 4)).expect("write");
    let loader = FileImageLoader::with_base_dir(dir.path());

    let decoded = loader.load("valve.png").await.expect("load");
    assert_eq!((decoded.width, decoded.height), (6, 4));
}
