use image::ImageReader;
use pageflat::{DocumentScanner, Preset, ScanConfig};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "image.png".to_string());
    let preset = match args.next().as_deref() {
        Some("classic") => Preset::Classic,
        Some("high-contrast") => Preset::HighContrast,
        _ => Preset::Stabilized,
    };

    let img = ImageReader::open(&input)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    println!("Scanning {} with the {:?} preset in debug mode...\n", input, preset);

    let debug_dir = PathBuf::from("debug_output");

    // Remove directory if it exists (for testing)
    if debug_dir.exists() {
        std::fs::remove_dir_all(&debug_dir)?;
    }

    let scanner = DocumentScanner::new(ScanConfig::preset(preset))?
        .with_verbose(true)
        .with_debug(debug_dir.clone())?;

    let stages = scanner.edge_pipeline().step_names().len();
    let edges = scanner.edge_map(&img)?;
    println!("Raster stages: {}", stages);
    println!("  working size: {}x{}", edges.image.width(), edges.image.height());
    println!("  scale back:   {:.3}", edges.scale);
    for (key, value) in &edges.metadata {
        println!("  {}: {:?}", key, value);
    }

    match scanner.scan(&img) {
        Ok(result) => {
            println!("\n✓ Document found at {:?}", result.corners.to_tuples());
            println!(
                "  Flattened size: {}x{}",
                result.rectified.width(),
                result.rectified.height()
            );
        }
        Err(e) => println!("\n✗ {}", e),
    }

    println!("\nDebug outputs saved to: {}/", debug_dir.display());
    println!("\nDirectory structure:");
    println!("  00_input/          - Original input image");
    println!("  01_.. to {:02}_..    - One directory per raster stage", stages);
    println!("  then quad_overlay/, rectified/, bilevel/ when a document is found");

    Ok(())
}
