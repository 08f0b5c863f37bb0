// imgpipe/src/processors/resizer.rs
use super::Transform;
use crate::core::{ImageHandle, Result};
use image::imageops::FilterType;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos3,
}

impl ResizeAlgorithm {
    fn filter_type(self) -> FilterType {
        match self {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Downscale into a bounding box, keeping the aspect ratio. Images that
/// already fit are copied unchanged; nothing is ever enlarged.
pub struct ScaleToFit {
    max_width: u32,
    max_height: u32,
    algorithm: ResizeAlgorithm,
}

impl ScaleToFit {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            algorithm: ResizeAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: ResizeAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Target size for an image of `width` x `height`.
    pub fn fitted_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width && height <= self.max_height {
            return (width, height);
        }

        let ratio_w = self.max_width as f64 / width as f64;
        let ratio_h = self.max_height as f64 / height as f64;
        let ratio = ratio_w.min(ratio_h);

        let new_w = (width as f64 * ratio).round() as u32;
        let new_h = (height as f64 * ratio).round() as u32;

        (
            new_w.clamp(1, self.max_width.max(1)),
            new_h.clamp(1, self.max_height.max(1)),
        )
    }
}

impl Transform for ScaleToFit {
    fn name(&self) -> &'static str {
        "scale_to_fit"
    }

    fn apply(&self, source: &ImageHandle) -> Result<ImageHandle> {
        let (width, height) = source.dimensions();
        let (new_w, new_h) = self.fitted_dimensions(width, height);

        if (new_w, new_h) == (width, height) {
            log::debug!("Image fits in {}x{}, skipping resize", self.max_width, self.max_height);
            return Ok(source.derive(source.image().clone()));
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            width,
            height,
            new_w,
            new_h
        );

        let resized = source
            .image()
            .resize_exact(new_w, new_h, self.algorithm.filter_type());
        Ok(source.derive(resized))
    }
}
