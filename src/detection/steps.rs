use crate::config::BrightnessContrast;
use crate::detection::{hull, preprocessing};
use crate::error::Result;
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use image::DynamicImage;

/// Linear brightness/contrast boost on the color image
pub struct BrightnessContrastStep {
    pub adjust: BrightnessContrast,
}

impl PipelineStep for BrightnessContrastStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let adjusted = preprocessing::adjust_brightness_contrast(&data.image, self.adjust);
        Ok(data.with_image(adjusted))
    }

    fn name(&self) -> &str {
        "Brightness Contrast"
    }
}

/// Shrink (or grow) to the working height and record the scale factor
pub struct ResizeStep {
    pub height: u32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let (resized, scale) = preprocessing::resize_to_height(&data.image, self.height);
        let mut data = data
            .with_image(resized)
            .with_metadata("resize_scale", MetadataValue::Float(scale));
        data.scale *= scale;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        Ok(data.with_image(DynamicImage::ImageLuma8(gray)))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Gaussian blur with a square odd kernel
pub struct BlurStep {
    pub kernel: u32,
}

impl PipelineStep for BlurStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let blurred = preprocessing::apply_blur(&gray, self.kernel);
        Ok(data.with_image(DynamicImage::ImageLuma8(blurred)))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);
        let edge_pixels = preprocessing::count_foreground(&edges) as i64;
        Ok(data
            .with_image(DynamicImage::ImageLuma8(edges))
            .with_metadata("edge_pixels", MetadataValue::Int(edge_pixels)))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Thicken edges with one 3x3 dilation to close pinholes
pub struct DilateStep;

impl PipelineStep for DilateStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let dilated = preprocessing::dilate_once(&gray);
        Ok(data.with_image(DynamicImage::ImageLuma8(dilated)))
    }

    fn name(&self) -> &str {
        "Dilate"
    }
}

/// Replace outlines by their convex hulls and erode once
pub struct HullStabilizeStep {
    pub thickness: u32,
}

impl PipelineStep for HullStabilizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let edges = data.image.to_luma8();
        let stabilized = hull::stabilize(&edges, self.thickness);
        Ok(data
            .with_image(DynamicImage::ImageLuma8(stabilized))
            .with_metadata("hull_stabilized", MetadataValue::Bool(true)))
    }

    fn name(&self) -> &str {
        "Hull Stabilization"
    }
}
