use diagramkit_core::{EditError, ElementId, Error};
use diagramkit_editor::element::{PolygonElement, PolygonProps, PolylineElement, PolylineProps};
use diagramkit_editor::geometry::{midpoint, Point};
use diagramkit_editor::scene::RetainedScene;
use proptest::prelude::*;

use crate::support::recording_context;

#[derive(Debug, Clone)]
enum NodeOp {
    AddAtEdge(usize),
    Append(Point),
    Delete(usize),
}

fn point() -> impl Strategy<Value = Point> {
    (-500i32..500, -500i32..500).prop_map(|(x, y)| Point::new(x as f64, y as f64))
}

fn points(min: usize) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(point(), min..min + 6)
}

fn node_op() -> impl Strategy<Value = NodeOp> {
    prop_oneof![
        (0usize..16).prop_map(NodeOp::AddAtEdge),
        point().prop_map(NodeOp::Append),
        (0usize..16).prop_map(NodeOp::Delete),
    ]
}

fn editing_polygon(points: Vec<Point>) -> (RetainedScene, PolygonElement) {
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut polygon = PolygonElement::create(
        &mut scene,
        ctx,
        ElementId::new(),
        PolygonProps {
            points,
            ..PolygonProps::default()
        },
    )
    .expect("create");
    polygon.set_edit_mode(&mut scene, true).expect("edit");
    (scene, polygon)
}

fn editing_polyline(points: Vec<Point>) -> (RetainedScene, PolylineElement) {
    let mut scene = RetainedScene::new();
    let (ctx, _) = recording_context();
    let mut polyline = PolylineElement::create(
        &mut scene,
        ctx,
        ElementId::new(),
        PolylineProps {
            points,
            ..PolylineProps::default()
        },
    )
    .expect("create");
    polyline.set_edit_mode(&mut scene, true).expect("edit");
    (scene, polyline)
}

proptest! {
    #[test]
    fn polygon_never_drops_below_three_points(
        initial in points(3),
        ops in prop::collection::vec(node_op(), 0..24),
    ) {
        let (mut scene, mut polygon) = editing_polygon(initial);
        for op in ops {
            let before = polygon.points().to_vec();
            match op {
                NodeOp::AddAtEdge(edge) => {
                    let edge = edge % polygon.edge_count();
                    polygon.add_node_at_edge(&mut scene, edge).expect("add");
                }
                NodeOp::Append(p) => {
                    polygon.add_node_at_position(&mut scene, p).expect("append");
                }
                NodeOp::Delete(index) => {
                    polygon.select_node(&mut scene, index % before.len()).expect("select");
                    let result = polygon.delete_selected_node(&mut scene);
                    if before.len() == 3 {
                        let rejected = matches!(
                            result,
                            Err(Error::Edit(EditError::MinimumPoints { minimum: 3, .. }))
                        );
                        prop_assert!(rejected);
                        prop_assert_eq!(polygon.points(), &before[..]);
                    } else {
                        prop_assert!(result.is_ok());
                        prop_assert_eq!(polygon.points().len(), before.len() - 1);
                    }
                }
            }
            prop_assert!(polygon.points().len() >= 3);
            prop_assert_eq!(polygon.nodes().len(), polygon.points().len());
            prop_assert_eq!(polygon.edge_markers().len(), polygon.points().len());
        }
    }

    #[test]
    fn polyline_never_drops_below_two_points(
        initial in points(2),
        ops in prop::collection::vec(node_op(), 0..24),
    ) {
        let (mut scene, mut polyline) = editing_polyline(initial);
        for op in ops {
            let before = polyline.points().len();
            match op {
                NodeOp::AddAtEdge(edge) => {
                    let edge = edge % polyline.edge_count();
                    polyline.add_node_at_edge(&mut scene, edge).expect("add");
                }
                NodeOp::Append(p) => {
                    polyline.add_node_at_position(&mut scene, p).expect("append");
                }
                NodeOp::Delete(index) => {
                    polyline.select_node(&mut scene, index % before).expect("select");
                    let result = polyline.delete_selected_node(&mut scene);
                    prop_assert_eq!(result.is_ok(), before > 2);
                }
            }
            prop_assert!(polyline.points().len() >= 2);
            prop_assert_eq!(polyline.edge_markers().len(), polyline.points().len() - 1);
        }
    }

    #[test]
    fn add_node_at_edge_inserts_the_midpoint(initial in points(3), edge in 0usize..16) {
        let (mut scene, mut polygon) = editing_polygon(initial);
        let before = polygon.points().to_vec();
        let n = before.len();
        let edge = edge % n;

        let index = polygon.add_node_at_edge(&mut scene, edge).expect("add");

        let after = polygon.points();
        prop_assert_eq!(index, edge + 1);
        prop_assert_eq!(after.len(), n + 1);
        prop_assert_eq!(after[index], midpoint(before[edge], before[(edge + 1) % n]));
        prop_assert_eq!(&after[..index], &before[..index]);
        prop_assert_eq!(&after[index + 1..], &before[index..]);
    }

    #[test]
    fn drag_node_moves_only_that_node(initial in points(3), index in 0usize..16, to in point()) {
        let (mut scene, mut polygon) = editing_polygon(initial);
        let before = polygon.points().to_vec();
        let index = index % before.len();

        polygon.drag_node(&mut scene, index, to).expect("drag");

        for (i, (now, was)) in polygon.points().iter().zip(&before).enumerate() {
            if i == index {
                prop_assert_eq!(*now, to);
            } else {
                prop_assert_eq!(now, was);
            }
        }
    }

    #[test]
    fn drag_edge_translates_both_endpoints(
        initial in points(2),
        edge in 0usize..16,
        delta in point(),
    ) {
        let (mut scene, mut polyline) = editing_polyline(initial);
        let before = polyline.points().to_vec();
        let edge = edge % polyline.edge_count();
        let handle = midpoint(before[edge], before[edge + 1]);

        polyline.drag_edge(&mut scene, edge, handle + delta).expect("drag");

        for (i, (now, was)) in polyline.points().iter().zip(&before).enumerate() {
            if i == edge || i == edge + 1 {
                prop_assert!(now.approx_eq(&(*was + delta), 1e-9));
            } else {
                prop_assert_eq!(now, was);
            }
        }
    }
}
