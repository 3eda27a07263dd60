use image::GrayImage;
use imageproc::point::Point;

/// Closed boundary traced from a binary image, in pixel coordinates.
pub type Curve = Vec<Point<i32>>;

/// Four unordered corners accepted by the corner search, at working resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateQuad {
    pub points: [Point<i32>; 4],
    /// Position of the source curve in the area ranking (0 = largest).
    pub rank: usize,
}

impl CandidateQuad {
    /// Map the corners back to original resolution (`original = working * factor`).
    pub fn scaled(&self, factor: f32) -> [Point<f32>; 4] {
        self.points
            .map(|p| Point::new(p.x as f32 * factor, p.y as f32 * factor))
    }
}

/// Outcome of the ranked corner search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuadSearch {
    Found(CandidateQuad),
    /// No candidate simplified to exactly four vertices.
    NotFound { candidates: usize },
}

impl QuadSearch {
    pub fn found(&self) -> Option<&CandidateQuad> {
        match self {
            Self::Found(quad) => Some(quad),
            Self::NotFound { .. } => None,
        }
    }
}

/// Semantic corner roles, in the order used everywhere a corner array appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

/// Four corners labeled by role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedCorners {
    pub top_left: Point<f32>,
    pub top_right: Point<f32>,
    pub bottom_right: Point<f32>,
    pub bottom_left: Point<f32>,
}

impl OrderedCorners {
    pub fn get(&self, corner: Corner) -> Point<f32> {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    /// Corners as `[tl, tr, br, bl]`.
    pub fn to_array(&self) -> [Point<f32>; 4] {
        Corner::ALL.map(|c| self.get(c))
    }

    pub fn to_tuples(&self) -> [(f32, f32); 4] {
        self.to_array().map(|p| (p.x, p.y))
    }
}

/// Everything a successful scan produces.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Corners at original resolution.
    pub corners: OrderedCorners,
    /// The quad as found at working resolution.
    pub quad: CandidateQuad,
    pub scale: f32,
    /// Flattened document, single channel.
    pub rectified: GrayImage,
    /// Thresholded version of `rectified`.
    pub bilevel: GrayImage,
}
