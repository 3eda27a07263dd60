mod common;

use common::*;
use pageflat::Binarize;

#[test]
fn tilted_page_is_found_and_flattened() -> anyhow::Result<()> {
    let (img, page) = tilted_page();
    let scanner = DocumentScanner::new(ScanConfig::default())?;
    let result = scanner.scan(&img)?;

    assert!((result.scale - 1.2).abs() < 1e-6);

    let expected = order_points(page);
    for (got, want) in result.corners.to_array().iter().zip(expected.to_array()) {
        assert!(
            distance(*got, want) <= 6.0,
            "corner {:?} too far from {:?}",
            got,
            want
        );
    }

    let (w, h) = result.rectified.dimensions();
    assert!(w.abs_diff(200) <= 12, "width {}", w);
    assert!(h.abs_diff(300) <= 12, "height {}", h);
    assert_eq!(result.bilevel.dimensions(), (w, h));

    // The middle of the flattened page is paper
    assert!(result.rectified.get_pixel(w / 2, h / 2)[0] > 200);
    assert_eq!(result.bilevel.get_pixel(w / 2, h / 2)[0], 255);
    assert!(result.bilevel.pixels().all(|p| p[0] == 0 || p[0] == 255));
    Ok(())
}

#[test]
fn corner_roles_hold_across_rotations() -> anyhow::Result<()> {
    let scanner = DocumentScanner::new(ScanConfig::default())?;

    for degrees in [-25.0f32, 5.0, 30.0] {
        let page = rotated_rect((200.0, 300.0), 200.0, 300.0, degrees);
        let img = synthetic_document(400, 600, page);
        let result = scanner.scan(&img)?;

        let (w, h) = result.rectified.dimensions();
        assert!(w.abs_diff(200) <= 12, "{} deg: width {}", degrees, w);
        assert!(h.abs_diff(300) <= 12, "{} deg: height {}", degrees, h);

        // However the drawn corners are listed, they label to the detected roles
        for perm in permutations(page) {
            let expected = order_points(perm);
            for (got, want) in result.corners.to_array().iter().zip(expected.to_array()) {
                assert!(
                    distance(*got, want) <= 6.0,
                    "{} deg: corner {:?} too far from {:?}",
                    degrees,
                    got,
                    want
                );
            }
        }
    }
    Ok(())
}

#[test]
fn detection_alone_matches_full_scan() -> anyhow::Result<()> {
    let (img, _) = tilted_page();
    let scanner = DocumentScanner::new(ScanConfig::default())?;

    let detection = scanner.find_quad(&img)?;
    let result = scanner.scan(&img)?;
    assert_eq!(detection.corners, result.corners);
    assert_eq!(detection.quad, result.quad);
    Ok(())
}

#[test]
fn inverted_output_darkens_the_page() -> anyhow::Result<()> {
    let (img, _) = tilted_page();
    let config = ScanConfig::default().with_binarize(Binarize::inverted());
    let result = DocumentScanner::new(config)?.scan(&img)?;

    let (w, h) = result.bilevel.dimensions();
    assert_eq!(result.bilevel.get_pixel(w / 2, h / 2)[0], 0);
    Ok(())
}

#[test]
fn page_loaded_from_disk_scans_like_in_memory() -> anyhow::Result<()> {
    let (img, _) = tilted_page();
    let file = save_temp_png(&img);
    let loaded = image::open(file.path())?;

    let scanner = DocumentScanner::new(ScanConfig::default())?;
    let from_disk = scanner.scan(&loaded)?;
    let in_memory = scanner.scan(&img)?;
    assert_eq!(from_disk.corners, in_memory.corners);
    assert_eq!(from_disk.rectified, in_memory.rectified);
    Ok(())
}

#[test]
fn invalid_config_is_refused_up_front() {
    let config = ScanConfig::default().with_blur_kernel(6);
    assert!(matches!(
        DocumentScanner::new(config),
        Err(ScanError::InvalidConfig(_))
    ));
}
