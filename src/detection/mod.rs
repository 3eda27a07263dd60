pub mod preprocessing;
pub mod contours;
pub mod hull;
pub mod corners;
pub mod ordering;
pub mod steps;

use std::path::PathBuf;

use image::{DynamicImage, GenericImageView, Rgba};
use imageproc::drawing::draw_line_segment_mut;
use tracing::{info, instrument, warn};

use crate::binarize::binarize;
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::models::{CandidateQuad, OrderedCorners, QuadSearch, ScanResult};
use crate::pipeline::{Pipeline, PipelineContext, PipelineData};
use crate::rectify::rectify;

/// A located document, before rectification.
#[derive(Debug, Clone)]
pub struct Detection {
    pub quad: CandidateQuad,
    /// original = working * scale
    pub scale: f32,
    /// Corners at original resolution.
    pub corners: OrderedCorners,
}

/// Main scan orchestrator: edge map, corner search, ordering, rectification, binarization
pub struct DocumentScanner {
    config: ScanConfig,
    context: PipelineContext,
}

impl DocumentScanner {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context: PipelineContext::default(),
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Dump every stage into `output_dir` (must be empty or missing)
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        self.context.enable_debug(output_dir)?;
        Ok(self)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The raster part of the scan (preprocessing plus optional hull stabilization)
    pub fn edge_pipeline(&self) -> Pipeline {
        build_edge_pipeline(&self.config).with_context(self.context.clone())
    }

    /// Stop after the raster stages; the image is the binary map the corner search reads
    pub fn edge_map(&self, img: &DynamicImage) -> Result<PipelineData> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ScanError::EmptyImage { width, height });
        }
        self.edge_pipeline().run(img.clone())
    }

    /// Locate the document's corners without rectifying it
    #[instrument(skip_all, fields(width = img.width(), height = img.height()))]
    pub fn find_quad(&self, img: &DynamicImage) -> Result<Detection> {
        let data = self.edge_map(img)?;
        let binary = data.image.to_luma8();

        let quad = match corners::find_quad(
            &binary,
            self.config.approx_tolerance,
            self.config.candidate_cap,
        ) {
            QuadSearch::Found(quad) => quad,
            QuadSearch::NotFound { candidates } => {
                warn!(candidates, "no candidate simplified to four corners");
                return Err(ScanError::NoQuadrilateralFound { candidates });
            }
        };

        let corners = ordering::order_points(quad.scaled(data.scale));
        info!(
            rank = quad.rank,
            scale = data.scale,
            top_left = ?corners.top_left,
            bottom_right = ?corners.bottom_right,
            "document corners found"
        );

        Ok(Detection {
            quad,
            scale: data.scale,
            corners,
        })
    }

    /// Run the whole scan on one image
    pub fn scan(&self, img: &DynamicImage) -> Result<ScanResult> {
        let detection = self.find_quad(img)?;

        let rectified = rectify(img, &detection.corners, self.config.interpolation.into())?;
        let gray = rectified.image.to_luma8();
        let bilevel = binarize(&gray, &self.config.binarize);

        if let Some(debug_config) = &self.context.debug {
            let next = self.edge_pipeline().step_names().len() + 1;
            let overlay = draw_quad_overlay(img, &detection.corners);
            debug_config.save(&format!("{:02}_quad_overlay", next), "01.png", &overlay)?;
            debug_config.save(
                &format!("{:02}_rectified", next + 1),
                "01.png",
                &DynamicImage::ImageLuma8(gray.clone()),
            )?;
            debug_config.save(
                &format!("{:02}_bilevel", next + 2),
                "01.png",
                &DynamicImage::ImageLuma8(bilevel.clone()),
            )?;
        }

        Ok(ScanResult {
            corners: detection.corners,
            quad: detection.quad,
            scale: detection.scale,
            rectified: gray,
            bilevel,
        })
    }
}

/// Build the raster pipeline for `config`
pub fn build_edge_pipeline(config: &ScanConfig) -> Pipeline {
    use crate::detection::steps::*;

    let mut pipeline = Pipeline::new();
    if let Some(adjust) = config.brightness {
        pipeline = pipeline.add_step_boxed(Box::new(BrightnessContrastStep { adjust }));
    }
    pipeline = pipeline
        .add_step_boxed(Box::new(ResizeStep {
            height: config.working_height,
        }))
        .add_step_boxed(Box::new(GrayscaleStep))
        .add_step_boxed(Box::new(BlurStep {
            kernel: config.blur_kernel,
        }))
        .add_step_boxed(Box::new(EdgeDetectionStep {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
        }));
    if config.dilate_edges {
        pipeline = pipeline.add_step_boxed(Box::new(DilateStep));
    }
    if config.stabilize_hulls {
        pipeline = pipeline.add_step_boxed(Box::new(HullStabilizeStep {
            thickness: config.hull_thickness,
        }));
    }
    pipeline
}

fn draw_quad_overlay(img: &DynamicImage, corners: &OrderedCorners) -> DynamicImage {
    let mut canvas = img.to_rgba8();
    let points = corners.to_tuples();
    for i in 0..4 {
        draw_line_segment_mut(
            &mut canvas,
            points[i],
            points[(i + 1) % 4],
            Rgba([255, 0, 0, 255]),
        );
    }
    DynamicImage::ImageRgba8(canvas)
}
