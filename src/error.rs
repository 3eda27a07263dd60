use std::path::PathBuf;

use thiserror::Error;

/// Why a quadrilateral could not be turned into a homography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// The target rectangle would have a zero side.
    ZeroDimension { width: u32, height: u32 },
    /// Three of the four corners lie on one line.
    CollinearCorners,
    /// The 4-point system has no unique solution.
    SingularHomography,
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension { width, height } => {
                write!(f, "target rectangle is {}x{}", width, height)
            }
            Self::CollinearCorners => write!(f, "three corners are collinear"),
            Self::SingularHomography => write!(f, "homography is singular"),
        }
    }
}

/// Everything that can stop a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to load image {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("input image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("no document found: none of the {candidates} largest outlines simplified to 4 corners")]
    NoQuadrilateralFound { candidates: usize },

    #[error("cannot rectify document: {0}")]
    DegenerateGeometry(DegenerateReason),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
