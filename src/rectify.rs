//! Perspective rectification: size the output, solve the homography, resample.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::point::Point;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use tracing::{debug, info, instrument};

use crate::error::{DegenerateReason, Result, ScanError};
use crate::models::OrderedCorners;

/// Twice the triangle area (px²) under which three corners count as collinear.
const COLLINEAR_EPS: f32 = 1.0;
const SINGULAR_EPS: f64 = 1e-12;

/// Output dimensions of the flattened document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    /// Destination corners in `[tl, tr, br, bl]` order.
    pub fn corners(&self) -> [Point<f32>; 4] {
        let right = self.width as f32 - 1.0;
        let bottom = self.height as f32 - 1.0;
        [
            Point::new(0.0, 0.0),
            Point::new(right, 0.0),
            Point::new(right, bottom),
            Point::new(0.0, bottom),
        ]
    }
}

/// Longer of the two horizontal edges by the longer of the two vertical
/// edges, each truncated to whole pixels.
pub fn target_size(corners: &OrderedCorners) -> TargetSize {
    let top = distance(corners.top_left, corners.top_right) as u32;
    let bottom = distance(corners.bottom_left, corners.bottom_right) as u32;
    let left = distance(corners.top_left, corners.bottom_left) as u32;
    let right = distance(corners.top_right, corners.bottom_right) as u32;
    TargetSize {
        width: top.max(bottom),
        height: left.max(right),
    }
}

fn distance(a: Point<f32>, b: Point<f32>) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// 3x3 projective transform, normalised so the bottom-right entry is 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Exact solve from four correspondences `src[i] -> dst[i]`.
    pub fn from_corners(src: [Point<f32>; 4], dst: [Point<f32>; 4]) -> Result<Self> {
        if has_collinear_triple(&src) || has_collinear_triple(&dst) {
            return Err(ScanError::DegenerateGeometry(DegenerateReason::CollinearCorners));
        }

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for i in 0..4 {
            let (x, y) = (src[i].x as f64, src[i].y as f64);
            let (u, v) = (dst[i].x as f64, dst[i].y as f64);

            a[(i, 0)] = x;
            a[(i, 1)] = y;
            a[(i, 2)] = 1.0;
            a[(i, 6)] = -u * x;
            a[(i, 7)] = -u * y;
            b[i] = u;

            a[(i + 4, 3)] = x;
            a[(i + 4, 4)] = y;
            a[(i + 4, 5)] = 1.0;
            a[(i + 4, 6)] = -v * x;
            a[(i + 4, 7)] = -v * y;
            b[i + 4] = v;
        }

        let h = a
            .lu()
            .solve(&b)
            .ok_or(ScanError::DegenerateGeometry(DegenerateReason::SingularHomography))?;

        let matrix = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        let det = matrix.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPS {
            return Err(ScanError::DegenerateGeometry(DegenerateReason::SingularHomography));
        }
        Ok(Self { matrix })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Map a point; `None` if it lands on the line at infinity.
    pub fn apply(&self, p: Point<f32>) -> Option<Point<f32>> {
        let v = self.matrix * Vector3::new(p.x as f64, p.y as f64, 1.0);
        if v.z.abs() < SINGULAR_EPS {
            return None;
        }
        Some(Point::new((v.x / v.z) as f32, (v.y / v.z) as f32))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|m| Self { matrix: m / m[(2, 2)] })
    }

    fn to_projection(self) -> Option<Projection> {
        let m = self.matrix;
        Projection::from_matrix([
            m[(0, 0)] as f32,
            m[(0, 1)] as f32,
            m[(0, 2)] as f32,
            m[(1, 0)] as f32,
            m[(1, 1)] as f32,
            m[(1, 2)] as f32,
            m[(2, 0)] as f32,
            m[(2, 1)] as f32,
            m[(2, 2)] as f32,
        ])
    }
}

fn has_collinear_triple(points: &[Point<f32>; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[i, j, k]| {
        let (a, b, c) = (points[i], points[j], points[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        cross.abs() < COLLINEAR_EPS
    })
}

/// A flattened document plus the transform that produced it.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub image: DynamicImage,
    pub size: TargetSize,
    pub homography: Homography,
}

/// Flatten the region bounded by `corners` (original resolution) into an
/// axis-aligned `target_size(corners)` image.
///
/// Every output pixel is sampled from `source` through the inverse
/// homography; samples outside the source are black. Grayscale sources stay
/// grayscale, everything else is resampled as RGBA.
#[instrument(skip(source, interpolation), fields(src_w = source.width(), src_h = source.height()))]
pub fn rectify(
    source: &DynamicImage,
    corners: &OrderedCorners,
    interpolation: Interpolation,
) -> Result<Rectified> {
    let size = target_size(corners);
    debug!(width = size.width, height = size.height, "target size");
    if size.width == 0 || size.height == 0 {
        return Err(ScanError::DegenerateGeometry(DegenerateReason::ZeroDimension {
            width: size.width,
            height: size.height,
        }));
    }

    let homography = Homography::from_corners(corners.to_array(), size.corners())?;
    let projection = homography
        .to_projection()
        .ok_or(ScanError::DegenerateGeometry(DegenerateReason::SingularHomography))?;

    let image = match source {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(size.width, size.height);
            warp_into(gray, &projection, interpolation, Luma([0u8]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        other => {
            let rgba = other.to_rgba8();
            let mut out = RgbaImage::new(size.width, size.height);
            warp_into(&rgba, &projection, interpolation, Rgba([0, 0, 0, 255]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
    };

    info!(width = size.width, height = size.height, "document rectified");
    Ok(Rectified {
        image,
        size,
        homography,
    })
}
