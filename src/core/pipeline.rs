// imgpipe/src/core/pipeline.rs
use super::format::sniff_file;
use super::{
    ErrorRecord, FormatTag, HandleTracker, ImageToolError, PipelineRequest, Reporter, Task,
};
use crate::codecs::{CodecRegistry, PostScriptCodec};
use crate::processors::{
    EncodeSink, Enhance, Loader, PreviewSink, Remap, ScaleToFit, Sink, Transform,
};
use std::path::Path;
use std::sync::Arc;

/// Terminal states of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Converted,
    /// Source already had the target format; nothing was written.
    Skipped,
}

/// Read, optionally transform, then write one image.
///
/// Every handle acquired during [`Pipeline::run`] is owned by a local binding
/// and released when it goes out of scope, on success and on every early
/// return.
pub struct Pipeline {
    reporter: Reporter,
    registry: CodecRegistry,
    loader: Loader,
    skip_if: Option<FormatTag>,
    transform: Option<Box<dyn Transform>>,
    sink: Box<dyn Sink>,
    tracker: HandleTracker,
}

impl Pipeline {
    /// Assemble the stages for a validated request.
    pub fn from_request(request: &PipelineRequest, registry: &CodecRegistry) -> Self {
        let mut skip_if = None;
        let mut transform: Option<Box<dyn Transform>> = None;

        let sink: Box<dyn Sink> = match &request.task {
            Task::Convert { target } => {
                skip_if = Some(*target);
                Box::new(EncodeSink::new(registry.resolve(*target)))
            }
            Task::Enhance(params) => {
                transform = Some(Box::new(Enhance::new(*params)));
                Box::new(EncodeSink::new(
                    registry.resolve(output_format(request)),
                ))
            }
            Task::Remap(params) => {
                transform = Some(Box::new(Remap::new(*params)));
                Box::new(EncodeSink::new(
                    registry.resolve(output_format(request)),
                ))
            }
            Task::ExportPostScript(params) => {
                let codec = PostScriptCodec::new(params.level).with_resolution(params.resolution);
                Box::new(EncodeSink::new(Arc::new(codec)))
            }
            Task::Preview(params) => {
                transform = Some(Box::new(ScaleToFit::new(params.max_width, params.max_height)));
                Box::new(PreviewSink::new(
                    registry.resolve(FormatTag::Png),
                    params.viewer.clone(),
                ))
            }
        };

        Self {
            reporter: Reporter::new(request.task.name()),
            registry: registry.clone(),
            loader: Loader::new(),
            skip_if,
            transform,
            sink,
            tracker: HandleTracker::new(),
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn tracker(&self) -> &HandleTracker {
        &self.tracker
    }

    pub fn run(&self, input: &Path, output: &Path) -> Result<Outcome, ErrorRecord> {
        if let Some(target) = self.skip_if {
            let found = sniff_file(input)
                .map_err(|e| ErrorRecord::read("sniff", ImageToolError::from(e)))?;
            if found == target {
                log::info!(
                    "{} is already {}; no conversion took place",
                    input.display(),
                    target
                );
                return Ok(Outcome::Skipped);
            }
        }

        let source = self
            .loader
            .load(input, &self.registry, &self.tracker)
            .map_err(|e| ErrorRecord::read("read", e))?;

        let result = match &self.transform {
            Some(transform) => {
                let transformed = transform
                    .apply(&source)
                    .map_err(|e| ErrorRecord::transform(transform.name(), e))?;
                drop(source);
                transformed
            }
            None => source,
        };

        self.sink
            .write(&result, output)
            .map_err(|e| ErrorRecord::write(self.sink.name(), e))?;

        log::debug!(
            "{} finished with {} handle(s) acquired",
            self.reporter.component(),
            self.tracker.acquired()
        );
        Ok(Outcome::Converted)
    }
}

/// Output format for tools that keep the image raster: the destination's
/// extension, then the source's, then PNG.
fn output_format(request: &PipelineRequest) -> FormatTag {
    FormatTag::from_path(&request.output)
        .or_else(|| FormatTag::from_path(&request.input))
        .unwrap_or(FormatTag::Png)
}
