// imgpipe/src/processors/remap.rs
use super::planes::Planes;
use super::Transform;
use crate::core::{ImageHandle, RemapParams, Result};
use image::{GrayImage, Luma};

pub type TransferCurve = [u8; 256];

/// Gamma transfer curve: inputs below `min` map to 0, above `max` to 255,
/// and `255 * ((v - min) / (max - min)) ^ (1 / gamma)` in between.
pub fn gamma_curve(gamma: f32, min: i32, max: i32) -> TransferCurve {
    let inv_gamma = 1.0 / f64::from(gamma);
    let (min, max) = (f64::from(min), f64::from(max));
    let range = max - min;
    let mut curve = [0u8; 256];

    for (i, entry) in curve.iter_mut().enumerate() {
        let v = i as f64;
        *entry = if v < min {
            0
        } else if v > max {
            255
        } else {
            let x = (v - min) / range;
            (255.0 * x.powf(inv_gamma) + 0.5).clamp(0.0, 255.0) as u8
        };
    }

    curve
}

pub struct Remap {
    params: RemapParams,
}

impl Remap {
    pub fn new(params: RemapParams) -> Self {
        Self { params }
    }
}

impl Transform for Remap {
    fn name(&self) -> &'static str {
        "gamma"
    }

    fn apply(&self, source: &ImageHandle) -> Result<ImageHandle> {
        let RemapParams { gamma, min, max } = self.params;
        log::debug!("Gamma remap: gamma {}, range {}..{}", gamma, min, max);

        let curve = gamma_curve(gamma, min, max);
        let image = Planes::from_image(source.image())
            .map(|plane| {
                GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
                    Luma([curve[plane.get_pixel(x, y)[0] as usize]])
                })
            })
            .into_image()?;

        Ok(source.derive(image))
    }
}
