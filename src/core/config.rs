// imgpipe/src/core/config.rs
use super::{FormatTag, ImageToolError, Result};
use crate::codecs::{PsLevel, DEFAULT_RESOLUTION};
use std::path::PathBuf;

/// Largest accepted smoothing radius.
pub const MAX_RADIUS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhanceParams {
    pub radius: u32,
    pub fraction: f32,
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            radius: 1,
            fraction: 0.5,
        }
    }
}

impl EnhanceParams {
    pub fn validate(self) -> Result<Self> {
        if self.radius < 1 || self.radius > MAX_RADIUS {
            return Err(ImageToolError::InvalidParameter(format!(
                "Smoothing radius must be between 1 and {}",
                MAX_RADIUS
            )));
        }
        if !self.fraction.is_finite() {
            return Err(ImageToolError::InvalidParameter(
                "Fraction must be a finite number".to_string(),
            ));
        }
        if self.fraction <= 0.0 || self.fraction >= 1.0 {
            log::warn!(
                "Fraction {} is outside the typical range 0.2 - 0.7",
                self.fraction
            );
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemapParams {
    pub gamma: f32,
    pub min: i32,
    pub max: i32,
}

impl Default for RemapParams {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            min: 0,
            max: 255,
        }
    }
}

impl RemapParams {
    pub fn validate(mut self) -> Result<Self> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            log::warn!("Gamma must be > 0.0; using 1.0");
            self.gamma = 1.0;
        } else if self.gamma > 10.0 || self.gamma < 0.1 {
            log::warn!("Gamma {} will give extreme results", self.gamma);
        }
        if self.min >= self.max {
            return Err(ImageToolError::InvalidParameter(format!(
                "Min value {} must be less than max value {}",
                self.min, self.max
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostScriptParams {
    pub level: PsLevel,
    pub resolution: u32,
}

impl Default for PostScriptParams {
    fn default() -> Self {
        Self {
            level: PsLevel::Two,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl PostScriptParams {
    pub fn validate(self) -> Result<Self> {
        if self.resolution == 0 {
            return Err(ImageToolError::InvalidParameter(
                "Resolution must be at least 1 pixel per inch".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Viewer launched by the preview tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewer {
    /// Platform default opener.
    #[default]
    System,
    /// Program given by the user, invoked with the image path.
    Command(String),
    /// Write the preview file without opening it.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewParams {
    pub max_width: u32,
    pub max_height: u32,
    pub viewer: Viewer,
}

impl Default for PreviewParams {
    fn default() -> Self {
        Self {
            max_width: 1000,
            max_height: 800,
            viewer: Viewer::System,
        }
    }
}

impl PreviewParams {
    pub fn validate(self) -> Result<Self> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ImageToolError::InvalidParameter(
                "Preview bounds must be non-zero".to_string(),
            ));
        }
        Ok(self)
    }
}

/// What a run does between reading and writing.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Re-encode into `target`, unless the source already is `target`.
    Convert { target: FormatTag },
    Enhance(EnhanceParams),
    Remap(RemapParams),
    ExportPostScript(PostScriptParams),
    Preview(PreviewParams),
}

impl Task {
    /// Label used for log and error output.
    pub fn name(&self) -> &'static str {
        match self {
            Task::Convert { .. } => "convert",
            Task::Enhance(_) => "enhance",
            Task::Remap(_) => "gamma",
            Task::ExportPostScript(_) => "postscript",
            Task::Preview(_) => "preview",
        }
    }
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub task: Task,
}

impl PipelineRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, task: Task) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            task,
        }
    }

    /// Check and normalize every parameter. Touches no files.
    pub fn validate(self) -> Result<Self> {
        if self.input.as_os_str().is_empty() {
            return Err(ImageToolError::InvalidParameter(
                "Input path is empty".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ImageToolError::InvalidParameter(
                "Output path is empty".to_string(),
            ));
        }

        let task = match self.task {
            Task::Convert { target } => {
                if target.image_format().is_none() {
                    return Err(ImageToolError::UnsupportedFormat(format!(
                        "Cannot convert to {}",
                        target
                    )));
                }
                Task::Convert { target }
            }
            Task::Enhance(params) => Task::Enhance(params.validate()?),
            Task::Remap(params) => Task::Remap(params.validate()?),
            Task::ExportPostScript(params) => Task::ExportPostScript(params.validate()?),
            Task::Preview(params) => Task::Preview(params.validate()?),
        };

        Ok(Self { task, ..self })
    }
}
