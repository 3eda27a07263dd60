mod common;

use common::*;
use imageproc::point::Point;

#[test]
fn axis_aligned_rectangle_is_labeled_by_position() {
    let ordered = order_points([
        Point::new(120.0, 80.0),
        Point::new(0.0, 0.0),
        Point::new(0.0, 80.0),
        Point::new(120.0, 0.0),
    ]);
    assert_eq!(ordered.top_left, Point::new(0.0, 0.0));
    assert_eq!(ordered.top_right, Point::new(120.0, 0.0));
    assert_eq!(ordered.bottom_right, Point::new(120.0, 80.0));
    assert_eq!(ordered.bottom_left, Point::new(0.0, 80.0));
}

#[test]
fn ordering_ignores_input_order() {
    let page = rotated_rect((200.0, 300.0), 200.0, 300.0, 15.0);
    let expected = order_points(page);

    let all = permutations(page);
    assert_eq!(all.len(), 24);
    for perm in all {
        assert_eq!(order_points(perm), expected);
    }
}

#[test]
fn tilted_page_roles_match_geometry() {
    let page = rotated_rect((200.0, 300.0), 200.0, 300.0, 15.0);
    let ordered = order_points(page);

    // A small clockwise tilt keeps every corner in its own role
    assert_eq!(ordered.to_array(), page);
    assert!(ordered.top_left.y < ordered.bottom_left.y);
    assert!(ordered.top_left.x < ordered.top_right.x);
}

#[test]
fn labels_are_a_permutation_of_the_input() {
    let points = [
        Point::new(12.0, 7.0),
        Point::new(180.0, 20.0),
        Point::new(170.0, 240.0),
        Point::new(5.0, 210.0),
    ];
    let ordered = order_points(points).to_array();
    for p in points {
        assert_eq!(ordered.iter().filter(|q| **q == p).count(), 1);
    }
}
