use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};

use crate::config::{BrightnessContrast, kernel_to_sigma};

/// `clip(input * mult + add, 0, 255)` on every channel; alpha is left alone.
pub fn adjust_brightness_contrast(img: &DynamicImage, adjust: BrightnessContrast) -> DynamicImage {
    let map = |v: u8| (v as f32 * adjust.mult + adjust.add).round().clamp(0.0, 255.0) as u8;

    let mut rgba = img.to_rgba8();
    for pixel in rgba.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = map(*channel);
        }
    }
    DynamicImage::ImageRgba8(rgba)
}

/// Resize so the height is `height`, keeping the aspect ratio.
/// Returns the resized image and `original_height / height`.
pub fn resize_to_height(img: &DynamicImage, height: u32) -> (DynamicImage, f32) {
    let (w, h) = img.dimensions();
    let scale = h as f32 / height as f32;
    let width = ((w as f64 * height as f64 / h as f64) as u32).max(1);

    // Triangle is the closest built-in to area averaging when shrinking
    let resized = img.resize_exact(width, height, FilterType::Triangle);
    (resized, scale)
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Gaussian blur sized like a square `kernel` x `kernel` filter
pub fn apply_blur(img: &GrayImage, kernel: u32) -> GrayImage {
    gaussian_blur_f32(img, kernel_to_sigma(kernel))
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// One pass of 3x3 dilation
pub fn dilate_once(img: &GrayImage) -> GrayImage {
    dilate(img, Norm::LInf, 1)
}

/// One pass of 3x3 erosion
pub fn erode_once(img: &GrayImage) -> GrayImage {
    erode(img, Norm::LInf, 1)
}

/// All-background canvas matching `(width, height)`
pub fn blank_canvas(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([0u8]))
}

/// Number of non-zero pixels
pub fn count_foreground(img: &GrayImage) -> usize {
    img.pixels().filter(|p| p[0] != 0).count()
}
