use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use pageflat::{DocumentScanner, ScanConfig};

fn main() -> anyhow::Result<()> {
    println!("Drawing a tilted page on a dark background...\n");

    // 220x300 page rotated by 12 degrees around the middle of a 480x640 frame
    let (sin, cos) = 12f32.to_radians().sin_cos();
    let page: Vec<Point<i32>> = [(-110.0, -150.0), (110.0, -150.0), (110.0, 150.0), (-110.0, 150.0)]
        .iter()
        .map(|&(dx, dy): &(f32, f32)| {
            Point::new(
                (240.0 + dx * cos - dy * sin).round() as i32,
                (320.0 + dx * sin + dy * cos).round() as i32,
            )
        })
        .collect();

    let mut canvas = GrayImage::from_pixel(480, 640, Luma([40u8]));
    draw_polygon_mut(&mut canvas, &page, Luma([225u8]));
    // A few dark "text lines" so the bilevel output has something to show
    for row in 0..8 {
        let y = 220 + row * 25;
        draw_line_segment_mut(
            &mut canvas,
            (180.0, y as f32),
            (300.0, y as f32 + 25.0),
            Luma([60u8]),
        );
    }
    let img = DynamicImage::ImageLuma8(canvas);
    img.save("synthetic_input.png")?;

    let scanner = DocumentScanner::new(ScanConfig::default())?.with_verbose(true);
    let result = scanner.scan(&img)?;

    println!("\n✓ Document found!");
    println!("  Drawn corners:    {:?}", page);
    println!("  Detected (tl, tr, br, bl): {:?}", result.corners.to_tuples());
    println!(
        "  Flattened size:   {}x{}",
        result.rectified.width(),
        result.rectified.height()
    );

    result.rectified.save("synthetic_corrected.png")?;
    result.bilevel.save("synthetic_thresholded.png")?;
    println!("\nSaved synthetic_input.png, synthetic_corrected.png, synthetic_thresholded.png");

    Ok(())
}
