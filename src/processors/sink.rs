// imgpipe/src/processors/sink.rs
use crate::codecs::Codec;
use crate::core::config::Viewer;
use crate::core::{ImageHandle, ImageToolError, Result};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

/// Write stage of a pipeline.
pub trait Sink {
    fn name(&self) -> &'static str;

    fn write(&self, image: &ImageHandle, dest: &Path) -> Result<()>;
}

/// Encodes through a codec and writes the file in one step, so a failed
/// encode never leaves a partial destination behind.
pub struct EncodeSink {
    codec: Arc<dyn Codec>,
}

impl EncodeSink {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self { codec }
    }
}

impl Sink for EncodeSink {
    fn name(&self) -> &'static str {
        "write"
    }

    fn write(&self, image: &ImageHandle, dest: &Path) -> Result<()> {
        log::debug!(
            "Saving image to {} as {}",
            dest.display(),
            self.codec.format()
        );

        let bytes = self.codec.write_mem(image.image())?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(dest, &bytes)?;

        log::info!("Saved image: {} ({} bytes)", dest.display(), bytes.len());
        Ok(())
    }
}

/// Writes the image and hands it to an external viewer.
pub struct PreviewSink {
    encoder: EncodeSink,
    viewer: Viewer,
}

impl PreviewSink {
    pub fn new(codec: Arc<dyn Codec>, viewer: Viewer) -> Self {
        Self {
            encoder: EncodeSink::new(codec),
            viewer,
        }
    }

    fn viewer_command(&self, path: &Path) -> Option<Command> {
        let mut command = match &self.viewer {
            Viewer::Disabled => return None,
            Viewer::Command(program) => Command::new(program),
            Viewer::System if cfg!(target_os = "macos") => Command::new("open"),
            Viewer::System if cfg!(target_os = "windows") => {
                let mut command = Command::new("cmd");
                command.args(["/C", "start", ""]);
                command
            }
            Viewer::System => Command::new("xdg-open"),
        };
        command.arg(path);
        Some(command)
    }
}

impl Sink for PreviewSink {
    fn name(&self) -> &'static str {
        "display"
    }

    fn write(&self, image: &ImageHandle, dest: &Path) -> Result<()> {
        self.encoder.write(image, dest)?;

        if let Some(mut command) = self.viewer_command(dest) {
            log::debug!("Launching viewer: {:?}", command);
            command.spawn().map_err(|e| {
                ImageToolError::ProcessingError(format!("Failed to launch viewer: {}", e))
            })?;
        }
        Ok(())
    }
}
