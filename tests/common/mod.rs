mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from pageflat for tests
pub use pageflat::{
    DocumentScanner, OrderedCorners, Preset, ScanConfig, ScanError, detection::ordering::order_points,
};
