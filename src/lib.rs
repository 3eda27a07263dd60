pub mod binarize;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rectify;

pub use config::{Binarize, BrightnessContrast, Preset, Resampling, ScanConfig};
pub use detection::{Detection, DocumentScanner, build_edge_pipeline};
pub use error::{DegenerateReason, Result, ScanError};
pub use models::{CandidateQuad, Corner, Curve, OrderedCorners, QuadSearch, ScanResult};
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use rectify::{Homography, Rectified, TargetSize, rectify, target_size};
