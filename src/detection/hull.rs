use image::{GrayImage, Luma};
use imageproc::drawing::{BresenhamLineIter, draw_filled_rect_mut};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::debug;

use crate::detection::contours::find_outlines;
use crate::detection::preprocessing::{blank_canvas, erode_once};

const STROKE: Luma<u8> = Luma([255u8]);

/// Redraw every outline in `edges` as its convex hull, then erode once.
///
/// Hulls are stroked `thickness` pixels wide onto a blank canvas the size of
/// `edges`, so fragments of one physical edge merge into a single closed loop.
/// The erosion pulls the oversized strokes back toward the real boundary.
/// The result only ever holds 0 and 255.
pub fn stabilize(edges: &GrayImage, thickness: u32) -> GrayImage {
    let (width, height) = edges.dimensions();
    let mut canvas = blank_canvas(width, height);

    let outlines = find_outlines(edges);
    for curve in &outlines {
        let hull = if curve.len() < 3 {
            curve.clone()
        } else {
            convex_hull(curve.as_slice())
        };
        draw_closed_stroke(&mut canvas, &hull, thickness);
    }
    debug!(hulls = outlines.len(), thickness, "hulls rasterized");

    erode_once(&canvas)
}

/// Stroke the closed polygon `points` with a square pen `thickness` wide.
fn draw_closed_stroke(canvas: &mut GrayImage, points: &[Point<i32>], thickness: u32) {
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        stamp(canvas, a.x, a.y, thickness);
        for (x, y) in BresenhamLineIter::new((a.x as f32, a.y as f32), (b.x as f32, b.y as f32)) {
            stamp(canvas, x, y, thickness);
        }
    }
}

fn stamp(canvas: &mut GrayImage, x: i32, y: i32, thickness: u32) {
    let half = (thickness as i32 - 1) / 2;
    draw_filled_rect_mut(
        canvas,
        Rect::at(x - half, y - half).of_size(thickness, thickness),
        STROKE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_of_width_three_covers_neighbours() {
        let mut canvas = GrayImage::new(20, 20);
        draw_closed_stroke(&mut canvas, &[Point::new(5, 10), Point::new(14, 10)], 3);
        for x in 5..=14 {
            for y in 9..=11 {
                assert_eq!(canvas.get_pixel(x, y)[0], 255, "({}, {})", x, y);
            }
            assert_eq!(canvas.get_pixel(x, 8)[0], 0);
            assert_eq!(canvas.get_pixel(x, 12)[0], 0);
        }
    }

    #[test]
    fn single_point_hull_is_stamped() {
        let mut canvas = GrayImage::new(10, 10);
        draw_closed_stroke(&mut canvas, &[Point::new(0, 0)], 3);
        assert_eq!(canvas.get_pixel(0, 0)[0], 255);
        assert_eq!(canvas.get_pixel(1, 1)[0], 255);
        assert_eq!(canvas.get_pixel(2, 2)[0], 0);
    }
}
