use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, ScanError};

/// Data that flows through the raster pipeline
#[derive(Clone)]
pub struct PipelineData {
    /// The current stage's image (color, grayscale or binary)
    pub image: DynamicImage,

    /// The untouched input, shared across stages
    pub original: Arc<DynamicImage>,

    /// original = working * scale. Stays 1.0 until a step resizes.
    pub scale: f32,

    /// Per-stage measurements (e.g. "edge_pixels", "hull_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f32),
    Int(i64),
}

impl PipelineData {
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            scale: 1.0,
            metadata: HashMap::new(),
        }
    }

    /// Replace the image, keeping lineage and metadata. Each step hands back a fresh buffer.
    pub fn with_image(self, image: DynamicImage) -> Self {
        Self { image, ..self }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Where stage images are dumped
#[derive(Clone, Debug)]
pub struct DebugConfig {
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Save `image` as `<output_dir>/<dir_name>/<file_name>`.
    pub fn save(&self, dir_name: &str, file_name: &str, image: &DynamicImage) -> Result<PathBuf> {
        let dir = self.output_dir.join(dir_name);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        image.save(&path).map_err(|source| ScanError::Output {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "saved debug image");
        Ok(path)
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Enable stage dumps. The directory must be empty or not exist yet.
    pub fn enable_debug(&mut self, output_dir: impl Into<PathBuf>) -> Result<()> {
        let output_dir = output_dir.into();
        prepare_debug_dir(&output_dir)?;
        self.debug = Some(DebugConfig { output_dir });
        Ok(())
    }
}

fn prepare_debug_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        if std::fs::read_dir(output_dir)?.next().is_some() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("debug directory is not empty: {}", output_dir.display()),
            )
            .into());
        }
    } else {
        std::fs::create_dir_all(output_dir)?;
    }
    Ok(())
}

/// A raster stage: one image in, one freshly allocated image out
pub trait PipelineStep: Send + Sync {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        self.context.enable_debug(output_dir)?;
        Ok(self)
    }

    /// Share an already prepared context (e.g. the scanner's debug directory)
    pub fn with_context(mut self, context: PipelineContext) -> Self {
        self.context = context;
        self
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run every step on `input`
    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for inspecting intermediate stages)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<PipelineData> {
        if let Some(debug_config) = &self.context.debug {
            debug_config.save("00_input", "01.png", &input)?;
        }

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let step_name = step.name();
            if self.context.verbose {
                info!(step = step_name, index = step_idx + 1, "running step");
            } else {
                debug!(step = step_name, index = step_idx + 1, "running step");
            }

            data = step.process(data, &self.context)?;

            if let Some(debug_config) = &self.context.debug {
                let step_dir_name = format!(
                    "{:02}_{}",
                    step_idx + 1,
                    step_name.to_lowercase().replace(' ', "_")
                );
                debug_config.save(&step_dir_name, "01.png", &data.image)?;
            }
        }

        info!(
            steps = num_steps.min(self.steps.len()),
            width = data.image.width(),
            height = data.image.height(),
            scale = data.scale,
            "raster pipeline finished"
        );

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
