// imgpipe/src/codecs/postscript.rs
// One page holding the image at a given resolution. Level 1 uses hex-encoded
// samples with `image`/`colorimage`, level 2 an image dictionary fed through
// ASCII85, level 3 adds Flate compression.

use super::{Capability, Codec, CodecOp, NotPresent, ReadSeek, WriteSeek};
use crate::core::{FormatTag, ImageToolError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;
use std::fmt;
use std::io::Write;

/// Pixels per inch used when none is given.
pub const DEFAULT_RESOLUTION: u32 = 300;

const HEX_LINE: usize = 64;
const A85_LINE: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PsLevel {
    One,
    #[default]
    Two,
    Three,
}

impl PsLevel {
    /// Out-of-range levels fall back to level 2.
    pub fn from_requested(level: u32) -> Self {
        match level {
            1 => PsLevel::One,
            2 => PsLevel::Two,
            3 => PsLevel::Three,
            other => {
                log::warn!("Invalid PostScript level {}; using level 2", other);
                PsLevel::Two
            }
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PsLevel::One => 1,
            PsLevel::Two => 2,
            PsLevel::Three => 3,
        }
    }
}

impl fmt::Display for PsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone)]
pub struct PostScriptCodec {
    level: PsLevel,
    resolution: u32,
}

struct Samples {
    width: u32,
    height: u32,
    components: u8,
    data: Vec<u8>,
}

impl Samples {
    fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        if image.color().has_color() {
            Self {
                width,
                height,
                components: 3,
                data: image.to_rgb8().into_raw(),
            }
        } else {
            Self {
                width,
                height,
                components: 1,
                data: image.to_luma8().into_raw(),
            }
        }
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * self.components as usize
    }

    fn color_space(&self) -> &'static str {
        if self.components == 3 {
            "/DeviceRGB"
        } else {
            "/DeviceGray"
        }
    }
}

impl PostScriptCodec {
    pub fn new(level: PsLevel) -> Self {
        Self {
            level,
            resolution: DEFAULT_RESOLUTION,
        }
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    pub fn level(&self) -> PsLevel {
        self.level
    }

    fn render(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let samples = Samples::from_image(image);
        if samples.width == 0 || samples.height == 0 {
            return Err(ImageToolError::InvalidParameter(
                "Cannot export an empty image".to_string(),
            ));
        }

        let scale = 72.0 / self.resolution as f64;
        let width_pt = samples.width as f64 * scale;
        let height_pt = samples.height as f64 * scale;

        let mut out = Vec::with_capacity(samples.data.len() * 2 + 1024);
        writeln!(out, "%!PS-Adobe-3.0")?;
        writeln!(out, "%%Creator: imgpipe")?;
        writeln!(
            out,
            "%%BoundingBox: 0 0 {} {}",
            width_pt.ceil() as u64,
            height_pt.ceil() as u64
        )?;
        writeln!(out, "%%LanguageLevel: {}", self.level)?;
        writeln!(out, "%%Pages: 1")?;
        writeln!(out, "%%EndComments")?;
        writeln!(out, "%%Page: 1 1")?;
        writeln!(out, "gsave")?;
        writeln!(out, "{:.4} {:.4} scale", width_pt, height_pt)?;

        match self.level {
            PsLevel::One => self.level_one(&mut out, &samples)?,
            PsLevel::Two | PsLevel::Three => self.dictionary_image(&mut out, &samples)?,
        }

        writeln!(out, "grestore")?;
        writeln!(out, "showpage")?;
        writeln!(out, "%%Trailer")?;
        writeln!(out, "%%EOF")?;
        Ok(out)
    }

    fn level_one(&self, out: &mut Vec<u8>, samples: &Samples) -> Result<()> {
        let (w, h) = (samples.width, samples.height);
        writeln!(out, "/bpl {} string def", samples.row_bytes())?;
        let matrix = format!("[{} 0 0 -{} 0 {}]", w, h, h);
        if samples.components == 3 {
            writeln!(
                out,
                "{} {} 8 {} {{currentfile bpl readhexstring pop}} false 3 colorimage",
                w, h, matrix
            )?;
        } else {
            writeln!(
                out,
                "{} {} 8 {} {{currentfile bpl readhexstring pop}} image",
                w, h, matrix
            )?;
        }
        write_hex(out, &samples.data)?;
        Ok(())
    }

    fn dictionary_image(&self, out: &mut Vec<u8>, samples: &Samples) -> Result<()> {
        let (w, h) = (samples.width, samples.height);
        let decode = if samples.components == 3 {
            "[0 1 0 1 0 1]"
        } else {
            "[0 1]"
        };

        writeln!(out, "{} setcolorspace", samples.color_space())?;
        writeln!(out, "<<")?;
        writeln!(out, "  /ImageType 1")?;
        writeln!(out, "  /Width {}", w)?;
        writeln!(out, "  /Height {}", h)?;
        writeln!(out, "  /BitsPerComponent 8")?;
        writeln!(out, "  /Decode {}", decode)?;
        writeln!(out, "  /ImageMatrix [{} 0 0 -{} 0 {}]", w, h, h)?;

        if self.level == PsLevel::Three {
            writeln!(
                out,
                "  /DataSource currentfile /ASCII85Decode filter /FlateDecode filter"
            )?;
            writeln!(out, ">> image")?;
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&samples.data)?;
            write_ascii85(out, &encoder.finish()?)?;
        } else {
            writeln!(out, "  /DataSource currentfile /ASCII85Decode filter")?;
            writeln!(out, ">> image")?;
            write_ascii85(out, &samples.data)?;
        }
        Ok(())
    }
}

impl Default for PostScriptCodec {
    fn default() -> Self {
        Self::new(PsLevel::default())
    }
}

fn write_hex(out: &mut Vec<u8>, data: &[u8]) -> std::io::Result<()> {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    for chunk in data.chunks(HEX_LINE / 2) {
        for &byte in chunk {
            out.push(DIGITS[(byte >> 4) as usize]);
            out.push(DIGITS[(byte & 0x0f) as usize]);
        }
        out.push(b'\n');
    }
    Ok(())
}

fn push_wrapped(out: &mut Vec<u8>, column: &mut usize, bytes: &[u8]) {
    for &b in bytes {
        out.push(b);
        *column += 1;
        if *column == A85_LINE {
            out.push(b'\n');
            *column = 0;
        }
    }
}

fn write_ascii85(out: &mut Vec<u8>, data: &[u8]) -> std::io::Result<()> {
    let mut column = 0;

    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(word);

        if chunk.len() == 4 && value == 0 {
            push_wrapped(out, &mut column, b"z");
            continue;
        }

        let mut encoded = [0u8; 5];
        for slot in encoded.iter_mut().rev() {
            *slot = (value % 85) as u8 + b'!';
            value /= 85;
        }
        push_wrapped(out, &mut column, &encoded[..chunk.len() + 1]);
    }

    out.extend_from_slice(b"~>\n");
    Ok(())
}

impl Codec for PostScriptCodec {
    fn format(&self) -> FormatTag {
        FormatTag::PostScript
    }

    fn capability(&self, op: CodecOp) -> Capability {
        if op.is_read() {
            Capability::Unavailable
        } else {
            Capability::Available
        }
    }

    fn read_stream(&self, reader: &mut dyn ReadSeek) -> Result<DynamicImage> {
        NotPresent::new(FormatTag::PostScript).read_stream(reader)
    }

    fn read_mem(&self, data: &[u8]) -> Result<DynamicImage> {
        NotPresent::new(FormatTag::PostScript).read_mem(data)
    }

    fn write_stream(&self, image: &DynamicImage, writer: &mut dyn WriteSeek) -> Result<()> {
        let page = self.render(image)?;
        writer.write_all(&page)?;
        writer.flush()?;
        Ok(())
    }

    fn write_mem(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        log::debug!(
            "Rendering {}x{} as PostScript level {}",
            image.width(),
            image.height(),
            self.level
        );
        self.render(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gradient() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(5, 3, |x, y| Luma([(x * 40 + y) as u8])))
    }

    fn render(level: u32) -> String {
        let codec = PostScriptCodec::new(PsLevel::from_requested(level));
        String::from_utf8(codec.write_mem(&gradient()).unwrap()).unwrap()
    }

    #[test]
    fn out_of_range_levels_match_level_two() {
        let level_two = render(2);
        assert_eq!(render(0), level_two);
        assert_eq!(render(5), level_two);
        assert!(level_two.contains("%%LanguageLevel: 2"));
    }

    #[test]
    fn output_sniffs_as_postscript() {
        for level in 1..=3 {
            let page = render(level);
            assert_eq!(FormatTag::detect(page.as_bytes()), FormatTag::PostScript);
            assert!(page.trim_end().ends_with("%%EOF"));
        }
    }

    #[test]
    fn level_one_uses_hex_samples() {
        let page = render(1);
        assert!(page.contains("readhexstring"));
        // first row: 0, 40, 80, 120, 160 followed by second row starting at 1
        assert!(page.contains("00285078a001"));
    }

    #[test]
    fn level_three_is_flate_compressed() {
        let page = render(3);
        assert!(page.contains("/FlateDecode"));
        assert!(!render(2).contains("/FlateDecode"));
    }

    #[test]
    fn color_images_use_rgb() {
        let codec = PostScriptCodec::new(PsLevel::One);
        let page = codec.write_mem(&DynamicImage::new_rgba8(2, 2)).unwrap();
        let page = String::from_utf8(page).unwrap();
        assert!(page.contains("false 3 colorimage"));
    }

    #[test]
    fn bounding_box_follows_resolution() {
        let codec = PostScriptCodec::new(PsLevel::Two).with_resolution(72);
        let page = codec.write_mem(&gradient()).unwrap();
        let page = String::from_utf8(page).unwrap();
        assert!(page.contains("%%BoundingBox: 0 0 5 3"));
    }

    #[test]
    fn ascii85_known_vector() {
        let mut out = Vec::new();
        write_ascii85(&mut out, b"Man ").unwrap();
        assert_eq!(out, b"9jqo^~>\n");

        let mut out = Vec::new();
        write_ascii85(&mut out, &[0, 0, 0, 0, 0xff]).unwrap();
        assert_eq!(out, b"zrr~>\n");
    }

    #[test]
    fn cannot_read_postscript() {
        let codec = PostScriptCodec::default();
        assert_eq!(codec.capability(CodecOp::ReadMem), Capability::Unavailable);
        assert_eq!(codec.capability(CodecOp::WriteMem), Capability::Available);
        assert!(matches!(
            codec.read_mem(b"%!PS"),
            Err(ImageToolError::NotPresent { .. })
        ));
    }
}
