use diagramkit_editor::geometry::{Bounds, Point};
use diagramkit_editor::scene::{
    Interactivity, Primitive, PrimitiveId, PrimitiveShape, RetainedScene, SceneGraph,
};

fn square(x: f64, y: f64, side: f64) -> Primitive {
    Primitive::polygon(&[
        Point::new(x, y),
        Point::new(x + side, y),
        Point::new(x + side, y + side),
        Point::new(x, y + side),
    ])
    .expect("square")
}

#[test]
fn test_polygon_is_placed_at_its_top_left_corner() {
    let p = square(100.0, 50.0, 20.0);
    assert_eq!(p.origin(), Point::new(100.0, 50.0));
    assert_eq!(p.path_offset, Point::new(100.0, 50.0));
    assert_eq!(
        p.world_vertices(),
        vec![
            Point::new(100.0, 50.0),
            Point::new(120.0, 50.0),
            Point::new(120.0, 70.0),
            Point::new(100.0, 70.0),
        ]
    );
}

#[test]
fn test_gestures_change_world_geometry() {
    let mut scene = RetainedScene::new();
    let id = scene.add_primitive(square(0.0, 0.0, 10.0));

    assert!(scene.translate(id, 5.0, 5.0));
    assert!(scene.scale_by(id, 2.0, 2.0));
    let bounds = scene
        .primitive(id)
        .and_then(Primitive::world_bounds)
        .expect("bounds");
    assert_eq!(bounds, Bounds::new(5.0, 5.0, 25.0, 25.0));

    assert!(scene.rotate_by(id, 90.0));
    let rotated = scene
        .primitive(id)
        .and_then(Primitive::world_bounds)
        .expect("bounds");
    assert!((rotated.center().x - 15.0).abs() < 1e-9);
    assert!((rotated.center().y - 15.0).abs() < 1e-9);
}

#[test]
fn test_replace_keeps_stacking_slot() {
    let mut scene = RetainedScene::new();
    let a = scene.add_primitive(square(0.0, 0.0, 10.0));
    let b = scene.add_primitive(square(20.0, 0.0, 10.0));
    scene.set_active(&[a]);

    let replaced = scene.replace_primitive(a, square(0.0, 0.0, 5.0));
    assert_ne!(replaced, a);
    assert!(!scene.contains(a));
    assert_eq!(scene.primitive_ids(), vec![replaced, b]);
    assert_eq!(scene.active_primitives(), vec![replaced]);
}

#[test]
fn test_restore_reuses_the_old_handle() {
    let mut scene = RetainedScene::new();
    let a = scene.add_primitive(square(0.0, 0.0, 10.0));
    let removed = scene.remove_primitive(a).expect("removed");
    assert!(scene.is_empty());

    scene.restore_primitive(a, removed);
    assert!(scene.contains(a));
    let b = scene.add_primitive(square(0.0, 0.0, 1.0));
    assert_ne!(a, b);
}

#[test]
fn test_z_order_commands() {
    let mut scene = RetainedScene::new();
    let a = scene.add_primitive(square(0.0, 0.0, 10.0));
    let b = scene.add_primitive(square(0.0, 0.0, 10.0));
    let c = scene.add_primitive(square(0.0, 0.0, 10.0));

    scene.send_to_back(c);
    assert_eq!(scene.primitive_ids(), vec![c, a, b]);
    scene.bring_to_front(a);
    assert_eq!(scene.z_index(a), Some(2));
}

#[test]
fn test_hit_test_skips_inert_primitives() {
    let mut scene = RetainedScene::new();
    let below = scene.add_primitive(square(0.0, 0.0, 10.0));
    let above =
        scene.add_primitive(square(0.0, 0.0, 10.0).with_interactivity(Interactivity::INERT));

    assert_eq!(scene.hit_test(Point::new(5.0, 5.0)), Some(below));
    assert_ne!(scene.hit_test(Point::new(5.0, 5.0)), Some(above));
    assert_eq!(scene.hit_test(Point::new(50.0, 50.0)), None);
}

#[test]
fn test_inert_primitives_cannot_become_active() {
    let mut scene = RetainedScene::new();
    let a = scene.add_primitive(square(0.0, 0.0, 10.0));
    let b = scene.add_primitive(square(0.0, 0.0, 10.0).with_interactivity(Interactivity::INERT));
    scene.set_active(&[a, b]);
    assert_eq!(scene.active_primitives(), vec![a]);
    scene.clear_active();
    assert!(scene.active_primitives().is_empty());
}

#[test]
fn test_open_path_hits_near_its_segments_only() {
    let mut scene = RetainedScene::new();
    let path = Primitive::open_path(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)])
        .expect("path");
    let id = scene.add_primitive(path);
    assert_eq!(scene.hit_test(Point::new(50.0, 1.0)), Some(id));
    assert_eq!(scene.hit_test(Point::new(50.0, 30.0)), None);
}

#[test]
fn test_group_members_are_hit_through_the_group() {
    let mut scene = RetainedScene::new();
    let member = square(0.0, 0.0, 10.0);
    let group = Primitive::group(
        vec![(PrimitiveId::from_raw(99), member)],
        Point::new(100.0, 100.0),
    );
    let id = scene.add_primitive(group);

    assert_eq!(scene.hit_test(Point::new(105.0, 105.0)), Some(id));
    assert_eq!(scene.hit_test(Point::new(5.0, 5.0)), None);
    let bounds = scene
        .primitive(id)
        .and_then(Primitive::world_bounds)
        .expect("bounds");
    assert_eq!(bounds, Bounds::new(100.0, 100.0, 110.0, 110.0));
    assert!(matches!(
        scene.primitive(id).map(|p| &p.shape),
        Some(PrimitiveShape::Group { .. })
    ));
}

fn two_square_group(scene: &mut RetainedScene) -> (PrimitiveId, PrimitiveId, PrimitiveId) {
    let (left, right) = (PrimitiveId::from_raw(98), PrimitiveId::from_raw(99));
    let group = Primitive::group(
        vec![(left, square(0.0, 0.0, 10.0)), (right, square(20.0, 0.0, 10.0))],
        Point::new(100.0, 100.0),
    );
    (scene.add_primitive(group), left, right)
}

#[test]
fn test_world_primitive_resolves_group_members() {
    let mut scene = RetainedScene::new();
    let (_, left, _) = two_square_group(&mut scene);

    assert!(scene.primitive(left).is_none());
    let resolved = scene.world_primitive(left).expect("member");
    assert_eq!(resolved.world_vertices()[0], Point::new(100.0, 100.0));
    assert_eq!(resolved.world_vertices()[2], Point::new(110.0, 110.0));
}

#[test]
fn test_detach_lifts_member_above_its_group() {
    let mut scene = RetainedScene::new();
    let (group, left, right) = two_square_group(&mut scene);

    assert!(scene.detach_from_group(left));
    assert!(!scene.detach_from_group(left));
    assert_eq!(scene.primitive_ids(), vec![group, left]);
    let lifted = scene.primitive(left).expect("lifted");
    assert_eq!(lifted.world_vertices()[0], Point::new(100.0, 100.0));

    let remaining = scene.primitive(group).and_then(Primitive::world_bounds);
    assert_eq!(remaining, Some(Bounds::new(120.0, 100.0, 130.0, 110.0)));
    assert!(scene.world_primitive(right).is_some());
}

#[test]
fn test_removing_the_last_member_removes_the_group() {
    let mut scene = RetainedScene::new();
    let (group, left, right) = two_square_group(&mut scene);
    scene.set_active(&[group]);

    assert!(scene.remove_primitive(left).is_some());
    assert!(scene.contains(group));
    assert!(scene.remove_primitive(right).is_some());

    assert!(scene.is_empty());
    assert!(scene.active_primitives().is_empty());
}

#[test]
fn test_replacing_a_member_takes_it_out_of_the_group() {
    let mut scene = RetainedScene::new();
    let (group, left, _) = two_square_group(&mut scene);

    let replacement = scene.replace_primitive(left, square(0.0, 0.0, 5.0));

    assert_eq!(scene.primitive_ids(), vec![group, replacement]);
    assert!(scene.world_primitive(left).is_none());
    let bounds = scene.primitive(group).and_then(Primitive::world_bounds);
    assert_eq!(bounds, Some(Bounds::new(120.0, 100.0, 130.0, 110.0)));
}

#[test]
fn test_members_of_nested_groups_can_be_removed() {
    let mut scene = RetainedScene::new();
    let inner_member = PrimitiveId::from_raw(97);
    let inner = Primitive::group(
        vec![(inner_member, square(0.0, 0.0, 10.0))],
        Point::new(10.0, 0.0),
    );
    let outer = scene.add_primitive(Primitive::group(
        vec![(PrimitiveId::from_raw(96), inner)],
        Point::new(100.0, 100.0),
    ));

    let resolved = scene.world_primitive(inner_member).expect("nested member");
    assert_eq!(resolved.world_vertices()[0], Point::new(110.0, 100.0));

    assert!(scene.remove_primitive(inner_member).is_some());
    assert!(scene.world_primitive(inner_member).is_none());
    assert!(!scene.contains(outer));
    assert!(scene.is_empty());
}

#[test]
fn test_render_requests_are_counted() {
    let mut scene = RetainedScene::new();
    scene.request_render();
    scene.request_render();
    assert_eq!(scene.render_requests(), 2);
}
