pub mod cli;
pub mod codecs;
pub mod core;
pub mod processors;
pub mod utils;

pub use codecs::{
    Capability, Codec, CodecOp, CodecRegistry, NotPresent, PostScriptCodec, PsLevel, RasterCodec,
};
pub use crate::core::{
    EnhanceParams, ErrorRecord, FormatTag, HandleTracker, ImageHandle, ImageToolError, Outcome,
    Pipeline, PipelineRequest, PostScriptParams, PreviewParams, RemapParams, Reporter, Result,
    Stage, Task, Viewer,
};
pub use processors::{Enhance, Loader, Remap, ResizeAlgorithm, ScaleToFit, Sink, Transform};

pub mod prelude {
    pub use crate::{
        CodecRegistry, FormatTag, ImageHandle, Pipeline, PipelineRequest, Task, Transform,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
