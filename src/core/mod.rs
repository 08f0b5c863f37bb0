// imgpipe/src/core/mod.rs
pub mod config;
pub mod format;
pub mod handle;
pub mod pipeline;
pub mod report;

use std::fmt;
use thiserror::Error;

pub use config::{
    EnhanceParams, PipelineRequest, PostScriptParams, PreviewParams, RemapParams, Task, Viewer,
};
pub use format::FormatTag;
pub use handle::{HandleTracker, ImageHandle};
pub use pipeline::{Outcome, Pipeline};
pub use report::Reporter;

#[derive(Error, Debug)]
pub enum ImageToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("function not present ({format} {operation})")]
    NotPresent {
        format: FormatTag,
        operation: &'static str,
    },

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, ImageToolError>;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Usage,
    Read,
    Transform,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Usage => "usage",
            Stage::Read => "read",
            Stage::Transform => "transform",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// A failure as seen by the driver: which stage and operation failed, and why.
#[derive(Error, Debug)]
#[error("{operation}: {source}")]
pub struct ErrorRecord {
    pub stage: Stage,
    pub operation: &'static str,
    #[source]
    pub source: ImageToolError,
}

impl ErrorRecord {
    pub fn new(stage: Stage, operation: &'static str, source: ImageToolError) -> Self {
        Self {
            stage,
            operation,
            source,
        }
    }

    pub fn usage(operation: &'static str, source: ImageToolError) -> Self {
        Self::new(Stage::Usage, operation, source)
    }

    pub fn read(operation: &'static str, source: ImageToolError) -> Self {
        Self::new(Stage::Read, operation, source)
    }

    pub fn transform(operation: &'static str, source: ImageToolError) -> Self {
        Self::new(Stage::Transform, operation, source)
    }

    pub fn write(operation: &'static str, source: ImageToolError) -> Self {
        Self::new(Stage::Write, operation, source)
    }

    /// True when the failure came from a codec that was left out of the build.
    pub fn is_not_present(&self) -> bool {
        matches!(self.source, ImageToolError::NotPresent { .. })
    }
}
