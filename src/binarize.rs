use image::{GrayImage, Luma};

use crate::config::Binarize;

/// Fixed-cutoff threshold. Pixels brighter than `cutoff` become white, the
/// rest black; `invert` swaps the two.
pub fn binarize(gray: &GrayImage, policy: &Binarize) -> GrayImage {
    let (on, off) = if policy.invert { (0u8, 255u8) } else { (255u8, 0u8) };
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > policy.cutoff {
            Luma([on])
        } else {
            Luma([off])
        }
    })
}
