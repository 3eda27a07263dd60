use std::path::Path;

use imageproc::geometric_transformations::Interpolation;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Cutoff used for normal (dark text on white) bilevel output.
pub const NORMAL_CUTOFF: u8 = 135;
/// Cutoff used when the bilevel output is inverted.
pub const INVERTED_CUTOFF: u8 = 150;

/// Linear pre-adjustment: `clip(input * mult + add, 0, 255)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrightnessContrast {
    pub mult: f32,
    pub add: f32,
}

/// Bilevel output policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binarize {
    pub cutoff: u8,
    pub invert: bool,
}

impl Binarize {
    pub fn normal() -> Self {
        Self {
            cutoff: NORMAL_CUTOFF,
            invert: false,
        }
    }

    pub fn inverted() -> Self {
        Self {
            cutoff: INVERTED_CUTOFF,
            invert: true,
        }
    }
}

impl Default for Binarize {
    fn default() -> Self {
        Self::normal()
    }
}

/// Resampling filter used by the rectifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    Nearest,
    #[default]
    Bilinear,
}

impl From<Resampling> for Interpolation {
    fn from(value: Resampling) -> Self {
        match value {
            Resampling::Nearest => Interpolation::Nearest,
            Resampling::Bilinear => Interpolation::Bilinear,
        }
    }
}

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Plain Canny edges straight into corner search.
    Classic,
    /// Dilated edges plus convex-hull stabilization.
    #[default]
    Stabilized,
    /// Stabilized, with a strong contrast boost and heavier smoothing for dim photos.
    HighContrast,
}

/// All tunables of a scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub brightness: Option<BrightnessContrast>,
    pub working_height: u32,
    pub blur_kernel: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub dilate_edges: bool,
    pub stabilize_hulls: bool,
    pub hull_thickness: u32,
    pub approx_tolerance: f64,
    pub candidate_cap: usize,
    pub interpolation: Resampling,
    pub binarize: Binarize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl ScanConfig {
    pub fn preset(preset: Preset) -> Self {
        let stabilized = Self {
            brightness: None,
            working_height: 500,
            blur_kernel: 5,
            canny_low: 60.0,
            canny_high: 200.0,
            dilate_edges: true,
            stabilize_hulls: true,
            hull_thickness: 3,
            approx_tolerance: 0.02,
            candidate_cap: 4,
            interpolation: Resampling::Bilinear,
            binarize: Binarize::normal(),
        };

        match preset {
            Preset::Stabilized => stabilized,
            Preset::Classic => Self {
                dilate_edges: false,
                stabilize_hulls: false,
                ..stabilized
            },
            Preset::HighContrast => Self {
                brightness: Some(BrightnessContrast {
                    mult: 1.56,
                    add: -60.0,
                }),
                blur_kernel: 11,
                canny_low: 53.0,
                canny_high: 245.0,
                ..stabilized
            },
        }
    }

    /// Load a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ScanError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_brightness(mut self, mult: f32, add: f32) -> Self {
        self.brightness = Some(BrightnessContrast { mult, add });
        self
    }

    pub fn with_blur_kernel(mut self, kernel: u32) -> Self {
        self.blur_kernel = kernel;
        self
    }

    pub fn with_canny(mut self, low: f32, high: f32) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    pub fn with_hull_stabilization(mut self, enabled: bool) -> Self {
        self.stabilize_hulls = enabled;
        self
    }

    pub fn with_binarize(mut self, binarize: Binarize) -> Self {
        self.binarize = binarize;
        self
    }

    /// Gaussian sigma equivalent to a square kernel of `blur_kernel` pixels.
    pub fn blur_sigma(&self) -> f32 {
        kernel_to_sigma(self.blur_kernel)
    }

    /// Reject values that would make a stage panic or produce nonsense.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(ScanError::InvalidConfig(msg)) };

        if self.working_height == 0 {
            return invalid("working_height must be positive".into());
        }
        if self.blur_kernel < 3 || self.blur_kernel % 2 == 0 {
            return invalid(format!(
                "blur_kernel must be odd and at least 3, got {}",
                self.blur_kernel
            ));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return invalid(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low, self.canny_high
            ));
        }
        if self.hull_thickness == 0 {
            return invalid("hull_thickness must be positive".into());
        }
        if !(self.approx_tolerance > 0.0 && self.approx_tolerance < 1.0) {
            return invalid(format!(
                "approx_tolerance must be in (0, 1), got {}",
                self.approx_tolerance
            ));
        }
        if self.candidate_cap == 0 {
            return invalid("candidate_cap must be at least 1".into());
        }
        if let Some(adjust) = self.brightness {
            if !adjust.mult.is_finite() || !adjust.add.is_finite() {
                return invalid("brightness mult/add must be finite".into());
            }
        }
        Ok(())
    }
}

/// Same rule OpenCV uses when a Gaussian blur is given a kernel size and no sigma.
pub(crate) fn kernel_to_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
