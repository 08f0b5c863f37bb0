// imgpipe/src/codecs/raster.rs
use super::{Capability, Codec, CodecOp, ReadSeek, WriteSeek};
use crate::core::{FormatTag, ImageToolError, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Raster codec backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    format: FormatTag,
    image_format: ImageFormat,
    quality: u8,
}

impl RasterCodec {
    /// `None` when the tag is not a raster format.
    pub fn new(format: FormatTag) -> Option<Self> {
        let image_format = format.image_format()?;
        Some(Self {
            format,
            image_format,
            quality: DEFAULT_JPEG_QUALITY,
        })
    }

    /// JPEG quality; ignored by lossless formats.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    fn encode(&self, image: &DynamicImage, writer: &mut dyn WriteSeek) -> Result<()> {
        log::debug!(
            "Encoding {}x{} as {}",
            image.width(),
            image.height(),
            self.format
        );

        match self.format {
            #[cfg(feature = "jpeg")]
            FormatTag::Jpeg => {
                use image::codecs::jpeg::JpegEncoder;
                // JPEG has no alpha channel
                let rgb = match image {
                    DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
                    _ if !image.color().has_color() => DynamicImage::ImageLuma8(image.to_luma8()),
                    _ => DynamicImage::ImageRgb8(image.to_rgb8()),
                };
                let encoder = JpegEncoder::new_with_quality(writer, self.quality);
                rgb.write_with_encoder(encoder)?;
            }
            _ => {
                let mut writer = writer;
                image.write_to(&mut writer, self.image_format)?;
            }
        }

        Ok(())
    }
}

impl Codec for RasterCodec {
    fn format(&self) -> FormatTag {
        self.format
    }

    fn capability(&self, _op: CodecOp) -> Capability {
        Capability::Available
    }

    fn read_stream(&self, reader: &mut dyn ReadSeek) -> Result<DynamicImage> {
        let image = ImageReader::with_format(reader, self.image_format)
            .decode()
            .map_err(|e| {
                ImageToolError::ProcessingError(format!("Failed to decode {}: {}", self.format, e))
            })?;
        Ok(image)
    }

    fn read_mem(&self, data: &[u8]) -> Result<DynamicImage> {
        if data.is_empty() {
            return Err(ImageToolError::InvalidParameter(
                "Empty input buffer".to_string(),
            ));
        }
        let mut cursor = Cursor::new(data);
        self.read_stream(&mut cursor)
    }

    fn write_stream(&self, image: &DynamicImage, writer: &mut dyn WriteSeek) -> Result<()> {
        self.encode(image, writer)
    }

    fn write_mem(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.encode(image, &mut buffer)?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn checker() -> DynamicImage {
        let img = RgbImage::from_fn(8, 6, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([250, 10, 10])
            } else {
                Rgb([10, 10, 250])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn non_raster_tags_have_no_codec() {
        assert!(RasterCodec::new(FormatTag::PostScript).is_none());
        assert!(RasterCodec::new(FormatTag::Unknown).is_none());
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_memory_output_sniffs_as_png() {
        let codec = RasterCodec::new(FormatTag::Png).unwrap();
        let bytes = codec.write_mem(&checker()).unwrap();
        assert_eq!(FormatTag::detect(&bytes), FormatTag::Png);

        let decoded = codec.read_mem(&bytes).unwrap();
        assert_eq!(decoded.to_rgb8(), checker().to_rgb8());
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_stream_output_decodes_back() {
        let codec = RasterCodec::new(FormatTag::Png).unwrap();
        let mut writer = Cursor::new(Vec::new());
        codec.write_stream(&checker(), &mut writer).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(FormatTag::detect(&bytes), FormatTag::Png);

        let mut reader = Cursor::new(bytes);
        let decoded = codec.read_stream(&mut reader).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
        assert_eq!(decoded.to_rgb8(), checker().to_rgb8());
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn jpeg_drops_alpha_before_encoding() {
        let codec = RasterCodec::new(FormatTag::Jpeg).unwrap().with_quality(90);
        let rgba = DynamicImage::ImageRgba8(checker().to_rgba8());
        let bytes = codec.write_mem(&rgba).unwrap();
        assert_eq!(FormatTag::detect(&bytes), FormatTag::Jpeg);
        assert_eq!(codec.read_mem(&bytes).unwrap().color(), image::ColorType::Rgb8);
    }

    #[cfg(feature = "bmp")]
    #[test]
    fn garbage_fails_to_decode() {
        let codec = RasterCodec::new(FormatTag::Bmp).unwrap();
        assert!(codec.read_mem(b"BMnot really a bitmap").is_err());
        assert!(codec.read_mem(&[]).is_err());
    }
}
