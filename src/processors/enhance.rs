// imgpipe/src/processors/enhance.rs
use super::planes::Planes;
use super::Transform;
use crate::core::{EnhanceParams, ImageHandle, Result};
use image::{GrayImage, Luma};
use imageproc::filter::box_filter;

/// Unsharp masking: `out = src + fraction * (src - blur)` where `blur` is a
/// box average over a `(2 * radius + 1)` square window.
pub struct Enhance {
    params: EnhanceParams,
}

impl Enhance {
    pub fn new(params: EnhanceParams) -> Self {
        Self { params }
    }
}

fn unsharp_plane(plane: &GrayImage, radius: u32, fraction: f32) -> GrayImage {
    let blurred = box_filter(plane, radius, radius);
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        let src = plane.get_pixel(x, y)[0] as f32;
        let blur = blurred.get_pixel(x, y)[0] as f32;
        let value = src + fraction * (src - blur);
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

impl Transform for Enhance {
    fn name(&self) -> &'static str {
        "enhance"
    }

    fn apply(&self, source: &ImageHandle) -> Result<ImageHandle> {
        let EnhanceParams { radius, fraction } = self.params;

        if fraction <= 0.0 {
            log::debug!("Fraction {} leaves the image unchanged", fraction);
            return Ok(source.derive(source.image().clone()));
        }

        log::debug!(
            "Unsharp masking {}x{} with a {}x{} window, fraction {}",
            source.width(),
            source.height(),
            2 * radius + 1,
            2 * radius + 1,
            fraction
        );

        let image = Planes::from_image(source.image())
            .map(|plane| unsharp_plane(plane, radius, fraction))
            .into_image()?;

        Ok(source.derive(image))
    }
}
