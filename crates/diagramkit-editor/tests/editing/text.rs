use diagramkit_core::{
    EditingEvent, EditorEvent, ElementError, ElementEvent, ElementId, ElementKind, Error,
};
use diagramkit_editor::element::{Element, TextElement, TextPatch, TextProps};
use diagramkit_editor::geometry::Point;
use diagramkit_editor::scene::{FontWeight, PrimitiveShape, RetainedScene, SceneGraph, TextContent};

use crate::support::{recording_context, Recorded};

fn default_text() -> (RetainedScene, TextElement, Recorded) {
    let mut scene = RetainedScene::new();
    let (ctx, events) = recording_context();
    let text = TextElement::create(&mut scene, ctx, ElementId::new(), TextProps::default())
        .expect("create");
    (scene, text, events)
}

fn content(scene: &RetainedScene, text: &TextElement) -> TextContent {
    match scene.primitive(text.body().expect("body")).map(|p| &p.shape) {
        Some(PrimitiveShape::Text(content)) => content.clone(),
        other => panic!("text body is {:?}", other),
    }
}

#[test]
fn test_default_text() {
    let (scene, text, _) = default_text();
    assert_eq!(text.text(), "Double click to edit");
    let body = scene.primitive(text.body().expect("body")).expect("body");
    assert_eq!(body.origin(), Point::new(200.0, 200.0));
    assert!(!content(&scene, &text).editing);
}

#[test]
fn test_editing_selects_all_text() {
    let (mut scene, mut text, _) = default_text();
    text.set_edit_mode(&mut scene, true).expect("edit");

    let content = content(&scene, &text);
    assert!(text.is_editing());
    assert!(content.editing);
    assert_eq!(content.selection, Some((0, "Double click to edit".len())));
}

#[test]
fn test_leaving_edit_mode_commits_typed_text() {
    let (mut scene, mut text, events) = default_text();
    text.set_edit_mode(&mut scene, true).expect("edit");
    text.on_text_changed(&mut scene, "Pump 3");
    events.lock().clear();

    text.set_edit_mode(&mut scene, false).expect("leave");

    assert_eq!(text.text(), "Pump 3");
    assert!(!content(&scene, &text).editing);
    let recorded = events.lock();
    assert!(recorded.iter().any(|e| matches!(
        e,
        EditorEvent::Editing(EditingEvent::ModeChanged { enabled: false, .. })
    )));
    assert!(recorded
        .iter()
        .any(|e| matches!(e, EditorEvent::Element(ElementEvent::Updated { .. }))));
}

#[test]
fn test_update_restyles_and_moves() {
    let (mut scene, mut text, _) = default_text();
    text.update(
        &mut scene,
        TextPatch {
            text: Some("Tank A".to_string()),
            font_size: Some(32.0),
            font_weight: Some(FontWeight::Bold),
            font_color: Some("#ff0000".to_string()),
            left: Some(10.0),
            ..Default::default()
        },
    )
    .expect("update");

    let body = scene.primitive(text.body().expect("body")).expect("body");
    assert_eq!(body.origin(), Point::new(10.0, 200.0));
    assert_eq!(body.style.fill.as_deref(), Some("#ff0000"));
    let content = content(&scene, &text);
    assert_eq!(content.text, "Tank A");
    assert_eq!(content.font_size, 32.0);
    assert_eq!(content.font_weight, FontWeight::Bold);
}

#[test]
fn test_sync_from_body_follows_drags() {
    let (mut scene, mut text, _) = default_text();
    scene.translate(text.body().expect("body"), 15.0, -5.0);
    text.sync_from_body(&scene);
    assert_eq!(text.props().left, 215.0);
    assert_eq!(text.props().top, 195.0);
}

#[test]
fn test_set_text_replaces_content() {
    let (mut scene, mut text, _) = default_text();
    text.set_text(&mut scene, "Valve").expect("set");
    assert_eq!(text.text(), "Valve");
    assert_eq!(content(&scene, &text).text, "Valve");
}

#[test]
fn test_text_has_no_nodes() {
    let (mut scene, text, _) = default_text();
    let mut element = Element::from(text);
    assert!(matches!(
        element.add_node_at_edge(&mut scene, 0),
        Err(Error::Element(ElementError::Unsupported {
            kind: ElementKind::Text,
            ..
        }))
    ));
    assert_eq!(element.points(), None);
}

#[test]
fn test_destroyed_text_rejects_updates() {
    let (mut scene, mut text, _) = default_text();
    text.destroy(&mut scene);
    assert!(scene.is_empty());
    assert!(matches!(
        text.update(&mut scene, TextPatch::default()),
        Err(Error::Element(ElementError::Destroyed { .. }))
    ));
    assert!(scene.is_empty());
}
