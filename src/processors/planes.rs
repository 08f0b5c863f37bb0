// imgpipe/src/processors/planes.rs
use crate::core::{ImageToolError, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// An image split into 8-bit planes: one for gray or three for RGB, plus
/// an untouched alpha plane when present.
pub(crate) struct Planes {
    width: u32,
    height: u32,
    color: Vec<GrayImage>,
    alpha: Option<GrayImage>,
}

fn plane(raw: &[u8], width: u32, height: u32, channels: usize, index: usize) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let offset = (y as usize * width as usize + x as usize) * channels + index;
        Luma([raw[offset]])
    })
}

impl Planes {
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let color = image.color();

        let (raw, channels, color_planes) = match (color.has_color(), color.has_alpha()) {
            (false, false) => (image.to_luma8().into_raw(), 1, 1),
            (false, true) => (image.to_luma_alpha8().into_raw(), 2, 1),
            (true, false) => (image.to_rgb8().into_raw(), 3, 3),
            (true, true) => (image.to_rgba8().into_raw(), 4, 3),
        };

        let color = (0..color_planes)
            .map(|i| plane(&raw, width, height, channels, i))
            .collect();
        let alpha = (channels > color_planes)
            .then(|| plane(&raw, width, height, channels, channels - 1));

        Self {
            width,
            height,
            color,
            alpha,
        }
    }

    /// Apply `f` to every color plane; alpha is left alone.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(&GrayImage) -> GrayImage,
    {
        Self {
            color: self.color.iter().map(f).collect(),
            ..self
        }
    }

    pub fn into_image(self) -> Result<DynamicImage> {
        let planes: Vec<&GrayImage> = self.color.iter().chain(self.alpha.iter()).collect();
        let channels = planes.len();
        let pixels = self.width as usize * self.height as usize;

        let mut raw = Vec::with_capacity(pixels * channels);
        for i in 0..pixels {
            for p in &planes {
                raw.push(p.as_raw()[i]);
            }
        }

        let (w, h) = (self.width, self.height);
        let mismatch = || ImageToolError::ProcessingError("Plane size mismatch".to_string());
        let image = match channels {
            1 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, raw).ok_or_else(mismatch)?),
            2 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(w, h, raw).ok_or_else(mismatch)?),
            3 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, raw).ok_or_else(mismatch)?),
            4 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, raw).ok_or_else(mismatch)?),
            n => {
                return Err(ImageToolError::ProcessingError(format!(
                    "Unsupported channel count {}",
                    n
                )))
            }
        };
        Ok(image)
    }
}
