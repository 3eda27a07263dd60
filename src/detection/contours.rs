use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::arc_length;
use imageproc::point::Point;

use crate::models::Curve;

/// Trace every closed boundary in a binary or edge image (non-zero = foreground).
///
/// Outer borders and hole borders are both returned, as a flat list. The
/// border-following hierarchy (parent links, border type) is dropped.
pub fn find_outlines(binary: &GrayImage) -> Vec<Curve> {
    find_contours::<i32>(binary)
        .into_iter()
        .map(|contour| contour.points)
        .filter(|points| !points.is_empty())
        .collect()
}

/// Length of the closed curve, including the segment back to the first point.
pub fn perimeter(curve: &[Point<i32>]) -> f64 {
    if curve.len() < 2 {
        return 0.0;
    }
    arc_length(curve, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::geometry::contour_area;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn empty_image_has_no_outlines() {
        let img = GrayImage::new(20, 20);
        assert!(find_outlines(&img).is_empty());
    }

    #[test]
    fn filled_rectangle_gives_one_outline() {
        let mut img = GrayImage::new(40, 40);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(20, 10), Luma([255u8]));
        let outlines = find_outlines(&img);
        assert_eq!(outlines.len(), 1);

        // Border pixels run from (10,10) to (29,19): roughly a 19 x 9 polygon.
        let area = contour_area(&outlines[0]);
        assert!((165.0..=171.0).contains(&area), "area was {}", area);
        let length = perimeter(&outlines[0]);
        assert!((52.0..=56.0).contains(&length), "perimeter was {}", length);
    }

    #[test]
    fn single_point_has_zero_perimeter() {
        assert_eq!(perimeter(&[Point::new(3, 3)]), 0.0);
    }
}
