use diagramkit_core::{
    EditError, EditingEvent, EditorEvent, ElementError, ElementEvent, ElementId, ElementKind, Error,
};
use diagramkit_editor::element::{PolygonElement, PolygonPatch, PolygonProps};
use diagramkit_editor::geometry::{bounding_box, midpoint, Point, ShapePreset};
use diagramkit_editor::scene::{Interactivity, PrimitiveShape, RetainedScene, SceneGraph};
use diagramkit_editor::transform::Affine;
use diagramkit_settings::AppearanceSettings;

use crate::support::{assert_points_eq, recording_context, Recorded};

fn default_polygon() -> (RetainedScene, PolygonElement, Recorded) {
    polygon_with(PolygonProps::default())
}

fn polygon_with(props: PolygonProps) -> (RetainedScene, PolygonElement, Recorded) {
    let mut scene = RetainedScene::new();
    let (ctx, events) = recording_context();
    let polygon = PolygonElement::create(&mut scene, ctx, ElementId::new(), props).expect("create");
    (scene, polygon, events)
}

fn triangle() -> PolygonProps {
    PolygonProps {
        points: vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, 80.0),
        ],
        ..PolygonProps::default()
    }
}

fn edge_line(scene: &RetainedScene, polygon: &PolygonElement, edge: usize) -> (Point, Point) {
    let line = polygon.edge_markers()[edge].line;
    match scene.primitive(line).map(|p| &p.shape) {
        Some(PrimitiveShape::Line { from, to }) => (*from, *to),
        other => panic!("edge {} guide is {:?}", edge, other),
    }
}

#[test]
fn test_default_polygon_points() {
    let (_, polygon, _) = default_polygon();
    assert_eq!(
        polygon.points(),
        &[
            Point::new(200.0, 150.0),
            Point::new(400.0, 150.0),
            Point::new(400.0, 350.0),
            Point::new(200.0, 350.0),
        ]
    );
    assert!(!polygon.is_edit_mode());
    assert_eq!(polygon.edge_count(), 4);
}

#[test]
fn test_creating_with_too_few_points_fails() {
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let props = PolygonProps {
        points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        ..PolygonProps::default()
    };
    let result = PolygonElement::create(&mut scene, ctx, ElementId::new(), props);
    assert!(matches!(
        result,
        Err(Error::Edit(EditError::MinimumPoints { minimum: 3, .. }))
    ));
    assert!(scene.is_empty());
}

#[test]
fn test_add_node_at_first_edge() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");

    let index = polygon.add_node_at_edge(&mut scene, 0).expect("add");

    assert_eq!(index, 1);
    assert_eq!(polygon.points().len(), 5);
    assert_eq!(polygon.points()[1], Point::new(300.0, 150.0));
    assert_eq!(polygon.selected_node(), Some(1));
    assert_eq!(polygon.nodes().len(), 5);
    assert_eq!(polygon.edge_markers().len(), 5);
}

#[test]
fn test_add_node_at_closing_edge_uses_midpoint_of_last_and_first() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    let before = polygon.points().to_vec();

    let index = polygon.add_node_at_edge(&mut scene, 3).expect("add");

    assert_eq!(index, 4);
    assert_eq!(polygon.points()[4], midpoint(before[3], before[0]));
    assert_eq!(&polygon.points()[..4], &before[..]);
}

#[test]
fn test_drag_node_moves_only_that_node() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    let before = polygon.points().to_vec();

    polygon.select_node(&mut scene, 0).expect("select");
    polygon
        .drag_node(&mut scene, 0, Point::new(250.0, 160.0))
        .expect("drag");

    assert_eq!(polygon.points()[0], Point::new(250.0, 160.0));
    assert_eq!(&polygon.points()[1..], &before[1..]);
    assert_eq!(polygon.edge_count(), 4);
    assert_eq!(
        edge_line(&scene, &polygon, 0),
        (Point::new(250.0, 160.0), before[1])
    );
    assert_eq!(
        edge_line(&scene, &polygon, 3),
        (before[3], Point::new(250.0, 160.0))
    );
    assert_eq!(edge_line(&scene, &polygon, 1), (before[1], before[2]));
    assert_eq!(edge_line(&scene, &polygon, 2), (before[2], before[3]));

    let node = scene.primitive(polygon.nodes()[0]).expect("node");
    assert_eq!(node.origin(), Point::new(250.0, 160.0));
    let body = scene.primitive(polygon.body().expect("body")).expect("body");
    assert_points_eq(&body.world_vertices(), polygon.points());
}

#[test]
fn test_drag_node_moves_adjacent_edge_handles() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    polygon
        .drag_node(&mut scene, 2, Point::new(500.0, 400.0))
        .expect("drag");

    let points = polygon.points().to_vec();
    for edge in [1, 2] {
        let handle = scene
            .primitive(polygon.edge_markers()[edge].handle)
            .expect("handle");
        let (a, b) = (points[edge], points[(edge + 1) % 4]);
        assert_eq!(handle.origin(), midpoint(a, b));
    }
}

#[test]
fn test_delete_at_minimum_is_rejected() {
    let (mut scene, mut polygon, _) = polygon_with(triangle());
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    polygon.select_node(&mut scene, 1).expect("select");
    let before = polygon.points().to_vec();

    let result = polygon.delete_selected_node(&mut scene);

    assert!(matches!(
        result,
        Err(Error::Edit(EditError::MinimumPoints {
            kind: ElementKind::Polygon,
            minimum: 3
        }))
    ));
    assert_eq!(polygon.points(), &before[..]);
    assert_eq!(polygon.nodes().len(), 3);
}

#[test]
fn test_delete_without_selection_is_rejected() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    assert!(matches!(
        polygon.delete_selected_node(&mut scene),
        Err(Error::Edit(EditError::NoNodeSelected))
    ));
    assert_eq!(polygon.points().len(), 4);
}

#[test]
fn test_delete_selected_node_clears_selection() {
    let (mut scene, mut polygon, events) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    polygon.select_node(&mut scene, 2).expect("select");
    let before = polygon.points().to_vec();

    polygon.delete_selected_node(&mut scene).expect("delete");

    assert_eq!(polygon.points(), &[before[0], before[1], before[3]]);
    assert_eq!(polygon.selected_node(), None);
    assert_eq!(polygon.nodes().len(), 3);
    assert!(events.lock().iter().any(|e| matches!(
        e,
        EditorEvent::Editing(EditingEvent::NodesChanged { count: 3, .. })
    )));
}

#[test]
fn test_structural_operations_require_edit_mode() {
    let (mut scene, mut polygon, _) = default_polygon();
    assert!(matches!(
        polygon.add_node_at_edge(&mut scene, 0),
        Err(Error::Element(ElementError::NotInEditMode { .. }))
    ));
    assert!(matches!(
        polygon.drag_node(&mut scene, 0, Point::new(0.0, 0.0)),
        Err(Error::Element(ElementError::NotInEditMode { .. }))
    ));
    assert_eq!(polygon.points().len(), 4);
}

#[test]
fn test_out_of_range_indices_are_rejected() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    assert!(matches!(
        polygon.add_node_at_edge(&mut scene, 4),
        Err(Error::Edit(EditError::EdgeOutOfRange { index: 4, edges: 4 }))
    ));
    assert!(matches!(
        polygon.select_node(&mut scene, 9),
        Err(Error::Edit(EditError::NodeOutOfRange { index: 9, nodes: 4 }))
    ));
}

#[test]
fn test_edge_drag_translates_both_endpoints_rigidly() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    let before = polygon.points().to_vec();

    polygon.begin_edge_drag(&mut scene, 1).expect("begin");
    let start = midpoint(before[1], before[2]);
    polygon
        .drag_edge(&mut scene, 1, start + Point::new(10.0, 5.0))
        .expect("drag");
    polygon
        .drag_edge(&mut scene, 1, start + Point::new(15.0, -10.0))
        .expect("drag");
    polygon.end_drag().expect("end");

    let after = polygon.points();
    assert_eq!(after[1], before[1] + Point::new(15.0, -10.0));
    assert_eq!(after[2], before[2] + Point::new(15.0, -10.0));
    assert_eq!(after[0], before[0]);
    assert_eq!(after[3], before[3]);
}

#[test]
fn test_inserting_a_node_restarts_the_edge_drag() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");

    polygon.begin_edge_drag(&mut scene, 0).expect("begin");
    polygon.add_node_at_edge(&mut scene, 0).expect("add");
    let before = polygon.points().to_vec();
    assert_eq!(before[1], Point::new(300.0, 150.0));

    let handle = midpoint(before[0], before[1]);
    polygon
        .drag_edge(&mut scene, 0, handle + Point::new(0.0, 10.0))
        .expect("drag");

    let after = polygon.points();
    assert_eq!(after[0], Point::new(200.0, 160.0));
    assert_eq!(after[1], Point::new(300.0, 160.0));
    assert_eq!(&after[2..], &before[2..]);
}

#[test]
fn test_closing_edge_drag_moves_last_and_first() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    let before = polygon.points().to_vec();

    let start = midpoint(before[3], before[0]);
    polygon
        .drag_edge(&mut scene, 3, start + Point::new(-20.0, 0.0))
        .expect("drag");

    let after = polygon.points();
    assert_eq!(after[3], before[3] + Point::new(-20.0, 0.0));
    assert_eq!(after[0], before[0] + Point::new(-20.0, 0.0));
    assert_eq!(&after[1..3], &before[1..3]);
}

#[test]
fn test_mode_exclusivity() {
    let (mut scene, mut polygon, _) = default_polygon();

    let body = polygon.body().expect("body");
    assert_eq!(
        scene.primitive(body).map(|p| p.interactivity),
        Some(Interactivity::INTERACTIVE)
    );
    assert!(polygon.nodes().is_empty());
    assert!(polygon.edge_markers().is_empty());
    assert_eq!(scene.len(), 1);

    polygon.set_edit_mode(&mut scene, true).expect("edit");
    let body = polygon.body().expect("body");
    assert_eq!(
        scene.primitive(body).map(|p| p.interactivity),
        Some(Interactivity::INERT)
    );
    assert_eq!(polygon.nodes().len(), 4);
    for node in polygon.nodes() {
        assert!(scene
            .primitive(*node)
            .is_some_and(|p| p.interactivity.is_interactive()));
    }
    assert_eq!(scene.len(), 1 + 4 + 4 * 2);

    polygon.set_edit_mode(&mut scene, false).expect("leave");
    let body = polygon.body().expect("body");
    assert_eq!(
        scene.primitive(body).map(|p| p.interactivity),
        Some(Interactivity::INTERACTIVE)
    );
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.active_primitives(), vec![body]);
}

#[test]
fn test_markers_stack_above_body() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");

    let body = scene.z_index(polygon.body().expect("body")).expect("z");
    let lowest_edge = polygon
        .edge_markers()
        .iter()
        .filter_map(|m| scene.z_index(m.line))
        .min()
        .expect("edges");
    let lowest_node = polygon
        .nodes()
        .iter()
        .filter_map(|n| scene.z_index(*n))
        .min()
        .expect("nodes");
    let highest_handle = polygon
        .edge_markers()
        .iter()
        .filter_map(|m| scene.z_index(m.handle))
        .max()
        .expect("handles");
    assert!(body < lowest_edge);
    assert!(highest_handle < lowest_node);
}

#[test]
fn test_entering_edit_mode_captures_transformed_points() {
    let original = PolygonProps::default().points;
    let (mut scene, mut polygon, _) = default_polygon();
    let body = polygon.body().expect("body");

    scene.translate(body, 10.0, 5.0);
    scene.scale_by(body, 2.0, 2.0);

    // Translation and scale pivot on the body's origin, the box's top-left.
    let origin = bounding_box(&original).expect("bounds").min();
    let scaled: Vec<Point> = original
        .iter()
        .map(|p| {
            Affine::translation(origin.x + 10.0, origin.y + 5.0)
                .multiply(&Affine::scaling(2.0, 2.0))
                .transform_point(*p - origin)
        })
        .collect();
    let center = bounding_box(&scaled).expect("bounds").center();
    let rotation = Affine::rotation_about(30.0, center);
    let expected: Vec<Point> = scaled.iter().map(|p| rotation.transform_point(*p)).collect();

    scene.rotate_by(body, 30.0);
    assert_points_eq(&polygon.current_points(&scene), &expected);

    polygon.set_edit_mode(&mut scene, true).expect("edit");
    assert_points_eq(polygon.points(), &expected);
    for (node, point) in polygon.nodes().iter().zip(&expected) {
        let origin = scene.primitive(*node).expect("node").origin();
        assert!(origin.approx_eq(point, 1e-6));
    }

    polygon.set_edit_mode(&mut scene, false).expect("leave");
    let body = scene.primitive(polygon.body().expect("body")).expect("body");
    assert_points_eq(&body.world_vertices(), &expected);
}

#[test]
fn test_capture_handles_reflection() {
    let (mut scene, mut polygon, _) = polygon_with(triangle());
    let body = polygon.body().expect("body");
    scene.scale_by(body, 1.0, -1.0);

    polygon.set_edit_mode(&mut scene, true).expect("edit");
    assert_points_eq(
        polygon.points(),
        &[
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, -80.0),
        ],
    );
}

#[test]
fn test_style_update_keeps_geometry() {
    let (mut scene, mut polygon, events) = default_polygon();
    let body = polygon.body().expect("body");
    scene.translate(body, 50.0, 0.0);

    polygon
        .update(
            &mut scene,
            PolygonPatch {
                fill_color: Some("#123456".to_string()),
                has_border: Some(false),
                ..Default::default()
            },
        )
        .expect("update");

    let primitive = scene.primitive(polygon.body().expect("body")).expect("body");
    assert_eq!(primitive.style.fill.as_deref(), Some("#123456"));
    assert_eq!(primitive.style.stroke, None);
    assert_eq!(primitive.style.stroke_width, 0.0);
    assert_eq!(primitive.origin(), Point::new(250.0, 150.0));
    assert!(events
        .lock()
        .iter()
        .any(|e| matches!(e, EditorEvent::Element(ElementEvent::Updated { .. }))));
}

#[test]
fn test_transparent_fill_drops_the_fill() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon
        .update(
            &mut scene,
            PolygonPatch {
                transparent_fill: Some(true),
                ..Default::default()
            },
        )
        .expect("update");
    let primitive = scene.primitive(polygon.body().expect("body")).expect("body");
    assert_eq!(primitive.style.fill, None);
}

#[test]
fn test_preset_regenerates_points_within_live_bounds() {
    let (mut scene, mut polygon, _) = default_polygon();
    let body = polygon.body().expect("body");
    scene.translate(body, 100.0, 0.0);

    polygon
        .update(
            &mut scene,
            PolygonPatch {
                shape_type: Some(ShapePreset::Hexagon),
                ..Default::default()
            },
        )
        .expect("update");

    assert_eq!(polygon.points().len(), 6);
    assert_eq!(polygon.props().shape_type, ShapePreset::Hexagon);
    let center = bounding_box(polygon.points()).expect("bounds").center();
    assert!(center.approx_eq(&Point::new(400.0, 250.0), 1e-6));
}

#[test]
fn test_rejected_point_update_leaves_polygon_unchanged() {
    let (mut scene, mut polygon, _) = default_polygon();
    let before = polygon.props().clone();

    let result = polygon.update(
        &mut scene,
        PolygonPatch {
            points: Some(vec![Point::new(0.0, 0.0)]),
            fill_color: Some("#000000".to_string()),
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(Error::Edit(EditError::MinimumPoints { .. }))));
    assert_eq!(polygon.props(), &before);
}

#[test]
fn test_point_update_in_edit_mode_rebuilds_markers() {
    let (mut scene, mut polygon, _) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    polygon
        .update(
            &mut scene,
            PolygonPatch {
                points: Some(triangle().points),
                ..Default::default()
            },
        )
        .expect("update");
    assert_eq!(polygon.nodes().len(), 3);
    assert_eq!(polygon.edge_markers().len(), 3);
}

#[test]
fn test_selected_node_is_recolored() {
    let (mut scene, mut polygon, events) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    polygon.select_node(&mut scene, 1).expect("select");

    let colors = AppearanceSettings::default().polygon_nodes;
    let fill = |i: usize| {
        scene
            .primitive(polygon.nodes()[i])
            .and_then(|p| p.style.fill.clone())
    };
    assert_eq!(fill(1), Some(colors.selected.clone()));
    assert_eq!(fill(0), Some(colors.interior.clone()));
    assert!(events.lock().iter().any(|e| matches!(
        e,
        EditorEvent::Editing(EditingEvent::NodeSelected { index: Some(1), .. })
    )));
}

#[test]
fn test_destroy_removes_everything_and_reports() {
    let (mut scene, mut polygon, events) = default_polygon();
    polygon.set_edit_mode(&mut scene, true).expect("edit");

    polygon.destroy(&mut scene);

    assert!(scene.is_empty());
    assert!(polygon.base().is_destroyed());
    assert!(polygon.owned_primitives().is_empty());
    assert!(events
        .lock()
        .iter()
        .any(|e| matches!(e, EditorEvent::Element(ElementEvent::Deleted { .. }))));

    assert!(matches!(
        polygon.set_edit_mode(&mut scene, true),
        Err(Error::Element(ElementError::Destroyed { .. }))
    ));
    assert!(matches!(
        polygon.add_node_at_edge(&mut scene, 0),
        Err(Error::Element(ElementError::Destroyed { .. }))
    ));
    assert!(scene.is_empty());

    let deletions = events
        .lock()
        .iter()
        .filter(|e| matches!(e, EditorEvent::Element(ElementEvent::Deleted { .. })))
        .count();
    polygon.destroy(&mut scene);
    let again = events
        .lock()
        .iter()
        .filter(|e| matches!(e, EditorEvent::Element(ElementEvent::Deleted { .. })))
        .count();
    assert_eq!(deletions, again);
}

#[test]
fn test_bring_to_front_keeps_nodes_on_top() {
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut polygon =
        PolygonElement::create(&mut scene, ctx.clone(), ElementId::new(), PolygonProps::default())
            .expect("create");
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    let other = PolygonElement::create(&mut scene, ctx, ElementId::new(), triangle())
        .expect("create");

    polygon.bring_to_front(&mut scene).expect("front");

    let other_z = scene.z_index(other.body().expect("body")).expect("z");
    let body_z = scene.z_index(polygon.body().expect("body")).expect("z");
    let top_node = scene.z_index(*polygon.nodes().last().expect("node")).expect("z");
    assert!(other_z < body_z);
    assert_eq!(top_node, scene.len() - 1);
}
