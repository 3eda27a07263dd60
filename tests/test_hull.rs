mod common;

use common::*;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use pageflat::detection::corners::find_quad;
use pageflat::detection::hull::stabilize;

/// Rectangle outline (20,20)-(140,100) with a gap in the top edge.
fn broken_outline() -> GrayImage {
    let mut img = GrayImage::new(160, 120);
    let white = Luma([255u8]);
    draw_line_segment_mut(&mut img, (20.0, 20.0), (70.0, 20.0), white);
    draw_line_segment_mut(&mut img, (80.0, 20.0), (140.0, 20.0), white);
    draw_line_segment_mut(&mut img, (140.0, 20.0), (140.0, 100.0), white);
    draw_line_segment_mut(&mut img, (140.0, 100.0), (20.0, 100.0), white);
    draw_line_segment_mut(&mut img, (20.0, 100.0), (20.0, 20.0), white);
    img
}

#[test]
fn output_is_binary_and_same_size() {
    let out = stabilize(&broken_outline(), 3);
    assert_eq!(out.dimensions(), (160, 120));
    assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
}

#[test]
fn empty_edges_stay_empty() {
    let out = stabilize(&GrayImage::new(40, 30), 3);
    assert_eq!(out.dimensions(), (40, 30));
    assert!(out.pixels().all(|p| p[0] == 0));
}

#[test]
fn gap_in_outline_is_closed() {
    let out = stabilize(&broken_outline(), 3);

    // The hull bridges the gap on the top edge
    for x in 70..=80 {
        assert_eq!(out.get_pixel(x, 20)[0], 255, "x = {}", x);
    }

    let quad = find_quad(&out, 0.02, 4)
        .found()
        .copied()
        .expect("stabilized outline should give a quad");
    let ordered = order_points(quad.scaled(1.0));
    let expected = [(20.0, 20.0), (140.0, 20.0), (140.0, 100.0), (20.0, 100.0)];
    for (got, want) in ordered.to_tuples().iter().zip(expected) {
        assert!(
            (got.0 - want.0).abs() <= 2.0 && (got.1 - want.1).abs() <= 2.0,
            "got {:?}, expected {:?}",
            got,
            want
        );
    }
}
