// imgpipe/src/processors/mod.rs
mod enhance;
mod loader;
mod planes;
mod remap;
mod resizer;
mod sink;

use crate::core::{ImageHandle, Result};

pub use enhance::Enhance;
pub use loader::Loader;
pub use remap::{gamma_curve, Remap, TransferCurve};
pub use resizer::{ResizeAlgorithm, ScaleToFit};
pub use sink::{EncodeSink, PreviewSink, Sink};

/// A pixel operation from one handle to a new one.
pub trait Transform {
    fn name(&self) -> &'static str;

    fn apply(&self, source: &ImageHandle) -> Result<ImageHandle>;
}
