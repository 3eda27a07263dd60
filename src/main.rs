use anyhow::Context;
use clap::{Parser, ValueEnum};
use image::ImageReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pageflat::{Binarize, DocumentScanner, Preset, ScanConfig, ScanError};

const CORRECTED_NAME: &str = "corrected.png";
const THRESHOLDED_NAME: &str = "thresholded.png";
const THRESHOLDED_INVERTED_NAME: &str = "thresholded_inverted.png";

#[derive(Parser)]
#[command(name = "pageflat")]
#[command(about = "Find a photographed document and flatten it into a scan")]
struct Cli {
    /// Path to the image to be corrected
    #[arg(short = 'i', long = "image", value_name = "IMAGE")]
    image_path: PathBuf,

    /// Write an inverted bilevel image (white text on black)
    #[arg(short = 'I', long)]
    inverted: bool,

    /// Parameter preset
    #[arg(long, value_enum, default_value_t = PresetArg::Stabilized)]
    preset: PresetArg,

    /// JSON config file; overrides the preset
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Blur kernel size (odd)
    #[arg(long)]
    blur_kernel: Option<u32>,

    /// Canny thresholds as LOW HIGH
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    canny: Option<Vec<f32>>,

    /// Skip the convex-hull stabilization pass
    #[arg(long)]
    no_hull: bool,

    /// Binarization cutoff (0-255)
    #[arg(long)]
    cutoff: Option<u8>,

    /// Directory the output images are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Save every intermediate stage to this directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Classic,
    Stabilized,
    HighContrast,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Classic => Preset::Classic,
            PresetArg::Stabilized => Preset::Stabilized,
            PresetArg::HighContrast => Preset::HighContrast,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// 2 = unreadable input, 3 = no document, 4 = degenerate geometry, 1 = anything else
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ScanError>() {
        Some(ScanError::Input { .. } | ScanError::EmptyImage { .. }) => 2,
        Some(ScanError::NoQuadrilateralFound { .. }) => 3,
        Some(ScanError::DegenerateGeometry(_)) => 4,
        _ => 1,
    }
}

fn build_config(args: &Cli) -> anyhow::Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::preset(args.preset.into()),
    };

    if let Some(kernel) = args.blur_kernel {
        config = config.with_blur_kernel(kernel);
    }
    if let Some(canny) = &args.canny {
        config = config.with_canny(canny[0], canny[1]);
    }
    if args.no_hull {
        config = config.with_hull_stabilization(false);
    }

    let mut binarize = if args.inverted {
        Binarize::inverted()
    } else {
        Binarize::normal()
    };
    if let Some(cutoff) = args.cutoff {
        binarize.cutoff = cutoff;
    }
    config = config.with_binarize(binarize);

    config.validate()?;
    Ok(config)
}

fn load_image(path: &Path) -> Result<image::DynamicImage, ScanError> {
    let to_input_error = |source: image::ImageError| ScanError::Input {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(|e| to_input_error(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| to_input_error(image::ImageError::IoError(e)))?
        .decode()
        .map_err(to_input_error)
}

fn save_gray(img: &image::GrayImage, path: &Path) -> Result<(), ScanError> {
    img.save(path).map_err(|source| ScanError::Output {
        path: path.to_path_buf(),
        source,
    })
}

fn run(args: Cli) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    tracing::info!(path = %args.image_path.display(), "loading image");
    let img = load_image(&args.image_path)?;
    tracing::info!(width = img.width(), height = img.height(), "image loaded");

    let mut scanner = DocumentScanner::new(config)?.with_verbose(args.verbose);
    if let Some(debug_dir) = &args.debug_out {
        scanner = scanner
            .with_debug(debug_dir)
            .with_context(|| format!("cannot use debug directory {}", debug_dir.display()))?;
    }

    let result = scanner.scan(&img)?;

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("cannot create output directory {}", args.output_dir.display())
    })?;
    let corrected_path = args.output_dir.join(CORRECTED_NAME);
    let bilevel_path = args.output_dir.join(if args.inverted {
        THRESHOLDED_INVERTED_NAME
    } else {
        THRESHOLDED_NAME
    });
    save_gray(&result.rectified, &corrected_path)?;
    save_gray(&result.bilevel, &bilevel_path)?;

    println!("\n=== Document Scan Results ===");
    println!(
        "Corners (tl, tr, br, bl): {:?}",
        result.corners.to_tuples()
    );
    println!(
        "Output size: {}x{}",
        result.rectified.width(),
        result.rectified.height()
    );
    println!("Wrote {}", corrected_path.display());
    println!("Wrote {}", bilevel_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageflat::DegenerateReason;

    #[test]
    fn scan_errors_map_to_distinct_exit_codes() {
        let missing = anyhow::Error::from(ScanError::NoQuadrilateralFound { candidates: 4 });
        assert_eq!(exit_code(&missing), 3);

        let degenerate =
            anyhow::Error::from(ScanError::DegenerateGeometry(DegenerateReason::CollinearCorners));
        assert_eq!(exit_code(&degenerate), 4);

        let empty = anyhow::Error::from(ScanError::EmptyImage { width: 0, height: 3 });
        assert_eq!(exit_code(&empty), 2);

        let wrapped = anyhow::Error::from(ScanError::NoQuadrilateralFound { candidates: 0 })
            .context("while scanning page.jpg");
        assert_eq!(exit_code(&wrapped), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn unreadable_file_is_an_input_error() {
        let err = load_image(Path::new("/nonexistent/page.png")).unwrap_err();
        assert!(matches!(err, ScanError::Input { .. }));
    }

    #[test]
    fn inverted_flag_picks_inverted_cutoff() {
        let args = Cli::parse_from(["pageflat", "-i", "page.png", "-I", "--no-hull"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.binarize, Binarize::inverted());
        assert!(!config.stabilize_hulls);

        let args = Cli::parse_from(["pageflat", "-i", "page.png", "--cutoff", "120"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.binarize.cutoff, 120);
        assert!(!config.binarize.invert);
    }
}
