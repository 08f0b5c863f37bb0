// imgpipe/src/processors/loader.rs
use crate::codecs::CodecRegistry;
use crate::core::format::sniff;
use crate::core::{FormatTag, HandleTracker, ImageHandle, ImageToolError, Result};
use image::{DynamicImage, GenericImageView};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

/// Read stage: sniff, pick the codec from the registry, decode.
#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn load(
        &self,
        path: &Path,
        registry: &CodecRegistry,
        tracker: &HandleTracker,
    ) -> Result<ImageHandle> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;

        let mut reader = BufReader::new(File::open(path)?);
        let format = sniff(&mut reader)?;
        reader.seek(SeekFrom::Start(0))?;

        if format == FormatTag::Unknown {
            return Err(ImageToolError::UnsupportedFormat(format!(
                "Unrecognized image data in {}",
                path.display()
            )));
        }

        let image = registry.resolve(format).read_stream(&mut reader)?;
        self.check_dimensions(&image)?;

        log::info!(
            "Loaded image: {}x{} pixels, format: {}, color: {:?}",
            image.width(),
            image.height(),
            format,
            image.color()
        );

        Ok(ImageHandle::acquire(image, tracker))
    }

    pub fn load_from_bytes(
        &self,
        data: &[u8],
        registry: &CodecRegistry,
        tracker: &HandleTracker,
    ) -> Result<ImageHandle> {
        let format = FormatTag::detect(data);
        if format == FormatTag::Unknown {
            return Err(ImageToolError::UnsupportedFormat(
                "Unrecognized image data in buffer".to_string(),
            ));
        }

        let image = registry.resolve(format).read_mem(data)?;
        self.check_dimensions(&image)?;

        Ok(ImageHandle::acquire(image, tracker))
    }

    fn check_dimensions(&self, image: &DynamicImage) -> Result<()> {
        if let Some((max_w, max_h)) = self.max_dimensions {
            let (width, height) = image.dimensions();
            if width > max_w || height > max_h {
                return Err(ImageToolError::MemoryLimitExceeded(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }
        Ok(())
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ImageToolError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(ImageToolError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
