use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use tempfile::NamedTempFile;

pub const BACKGROUND: u8 = 30;
pub const PAPER: u8 = 230;

/// Corners of a `width` x `height` rectangle centred on `center` and rotated
/// by `degrees` (clockwise on screen), in tl, tr, br, bl order before rotation.
pub fn rotated_rect(center: (f32, f32), width: f32, height: f32, degrees: f32) -> [Point<f32>; 4] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (hw, hh) = (width / 2.0, height / 2.0);
    [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(dx, dy)| {
        Point::new(
            center.0 + dx * cos - dy * sin,
            center.1 + dx * sin + dy * cos,
        )
    })
}

/// A bright quadrilateral "page" on a dark background.
pub fn synthetic_document(width: u32, height: u32, page: [Point<f32>; 4]) -> DynamicImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));
    let polygon: Vec<Point<i32>> = page
        .iter()
        .map(|p| Point::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    draw_polygon_mut(&mut img, &polygon, Luma([PAPER]));
    DynamicImage::ImageLuma8(img)
}

/// The 400x600 test photo: a 200x300 page rotated by 15 degrees around (200, 300).
pub fn tilted_page() -> (DynamicImage, [Point<f32>; 4]) {
    let page = rotated_rect((200.0, 300.0), 200.0, 300.0, 15.0);
    (synthetic_document(400, 600, page), page)
}

/// Smooth diagonal ramp `(x + y) / 2`, saturating at 255.
pub fn gradient(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| Luma([((x + y) / 2).min(255) as u8]))
}

/// Writes `img` to a temporary PNG file.
/// The file will be automatically cleaned up when dropped.
pub fn save_temp_png(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

pub fn distance(a: Point<f32>, b: Point<f32>) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// All 24 orderings of four points.
pub fn permutations(points: [Point<f32>; 4]) -> Vec<[Point<f32>; 4]> {
    let mut out = Vec::new();
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let idx = [a, b, c, d];
                    let mut seen = [false; 4];
                    idx.iter().for_each(|&i| seen[i] = true);
                    if seen.iter().all(|&s| s) {
                        out.push(idx.map(|i| points[i]));
                    }
                }
            }
        }
    }
    out
}
