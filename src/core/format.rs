// imgpipe/src/core/format.rs
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Largest header region the sniffer will consume.
pub const HEADER_LEN: usize = 16;

/// Container type of an encoded byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Bmp,
    Jpeg,
    Png,
    Gif,
    Tiff,
    WebP,
    Pnm,
    PostScript,
    Unknown,
}

impl FormatTag {
    /// Every tag except `Unknown`.
    pub const KNOWN: [FormatTag; 8] = [
        FormatTag::Bmp,
        FormatTag::Jpeg,
        FormatTag::Png,
        FormatTag::Gif,
        FormatTag::Tiff,
        FormatTag::WebP,
        FormatTag::Pnm,
        FormatTag::PostScript,
    ];

    /// Classify a header by its magic bytes. Unrecognized or short input
    /// yields `Unknown`.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(b"BM") && data.len() >= 14 {
            return FormatTag::Bmp;
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return FormatTag::Jpeg;
        }
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return FormatTag::Png;
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return FormatTag::Gif;
        }
        if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            return FormatTag::Tiff;
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return FormatTag::WebP;
        }
        if data.len() >= 3
            && data[0] == b'P'
            && (b'1'..=b'7').contains(&data[1])
            && data[2].is_ascii_whitespace()
        {
            return FormatTag::Pnm;
        }
        if data.starts_with(b"%!") {
            return FormatTag::PostScript;
        }

        FormatTag::Unknown
    }

    /// Canonical file extension, used for default output names.
    pub fn extension(self) -> &'static str {
        match self {
            FormatTag::Bmp => "bmp",
            FormatTag::Jpeg => "jpg",
            FormatTag::Png => "png",
            FormatTag::Gif => "gif",
            FormatTag::Tiff => "tif",
            FormatTag::WebP => "webp",
            FormatTag::Pnm => "pnm",
            FormatTag::PostScript => "ps",
            FormatTag::Unknown => "dat",
        }
    }

    /// The `image` crate format backing this tag, if it is a raster format.
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            FormatTag::Bmp => Some(image::ImageFormat::Bmp),
            FormatTag::Jpeg => Some(image::ImageFormat::Jpeg),
            FormatTag::Png => Some(image::ImageFormat::Png),
            FormatTag::Gif => Some(image::ImageFormat::Gif),
            FormatTag::Tiff => Some(image::ImageFormat::Tiff),
            FormatTag::WebP => Some(image::ImageFormat::WebP),
            FormatTag::Pnm => Some(image::ImageFormat::Pnm),
            FormatTag::PostScript | FormatTag::Unknown => None,
        }
    }

    /// Guess a tag from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatTag::Bmp => "BMP",
            FormatTag::Jpeg => "JPEG",
            FormatTag::Png => "PNG",
            FormatTag::Gif => "GIF",
            FormatTag::Tiff => "TIFF",
            FormatTag::WebP => "WebP",
            FormatTag::Pnm => "PNM",
            FormatTag::PostScript => "PostScript",
            FormatTag::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for FormatTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bmp" => Ok(FormatTag::Bmp),
            "jpg" | "jpeg" => Ok(FormatTag::Jpeg),
            "png" => Ok(FormatTag::Png),
            "gif" => Ok(FormatTag::Gif),
            "tif" | "tiff" => Ok(FormatTag::Tiff),
            "webp" => Ok(FormatTag::WebP),
            "pnm" | "pbm" | "pgm" | "ppm" => Ok(FormatTag::Pnm),
            "ps" | "postscript" => Ok(FormatTag::PostScript),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

/// Read at most `HEADER_LEN` bytes from `reader` and classify them.
///
/// Only I/O errors are returned; anything unrecognized is `Unknown`.
pub fn sniff<R: Read>(reader: R) -> io::Result<FormatTag> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    reader.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    Ok(FormatTag::detect(&header))
}

pub fn sniff_file(path: &Path) -> io::Result<FormatTag> {
    let file = File::open(path)?;
    let tag = sniff(file)?;
    log::debug!("Sniffed {} as {}", path.display(), tag);
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_headers() {
        let cases: [(&[u8], FormatTag); 9] = [
            (b"BM\x36\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00", FormatTag::Bmp),
            (&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10], FormatTag::Jpeg),
            (b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0d", FormatTag::Png),
            (b"GIF89a\x01\x00\x01\x00", FormatTag::Gif),
            (b"II*\x00\x08\x00\x00\x00", FormatTag::Tiff),
            (b"MM\x00*\x00\x00\x00\x08", FormatTag::Tiff),
            (b"RIFF\x24\x00\x00\x00WEBPVP8 ", FormatTag::WebP),
            (b"P6\n4 4\n255\n", FormatTag::Pnm),
            (b"%!PS-Adobe-3.0\n", FormatTag::PostScript),
        ];
        for (header, expected) in cases {
            assert_eq!(FormatTag::detect(header), expected);
        }
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(FormatTag::detect(b""), FormatTag::Unknown);
        assert_eq!(FormatTag::detect(&[0xFF, 0xD8]), FormatTag::Unknown);
        assert_eq!(FormatTag::detect(b"BM"), FormatTag::Unknown);
        assert_eq!(FormatTag::detect(b"P9 not a pnm"), FormatTag::Unknown);
        assert_eq!(FormatTag::detect(b"hello, world"), FormatTag::Unknown);

        // pseudo-random bytes that avoid every magic prefix
        let mut state = 0x2545_f491_u32;
        for _ in 0..200 {
            let mut buf = [0u8; HEADER_LEN];
            for b in buf.iter_mut() {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                *b = (state & 0x3f) as u8 + 0x80;
            }
            assert_eq!(FormatTag::detect(&buf), FormatTag::Unknown);
        }
    }

    #[test]
    fn sniff_reads_bounded_header() {
        let mut data = b"GIF87a".to_vec();
        data.extend(std::iter::repeat(0u8).take(1024));
        let mut cursor = std::io::Cursor::new(data);
        assert_eq!(sniff(&mut cursor).unwrap(), FormatTag::Gif);
        assert_eq!(cursor.position(), HEADER_LEN as u64);
    }

    #[test]
    fn parses_cli_names() {
        assert_eq!("JPG".parse::<FormatTag>(), Ok(FormatTag::Jpeg));
        assert_eq!("tiff".parse::<FormatTag>(), Ok(FormatTag::Tiff));
        assert!("xcf".parse::<FormatTag>().is_err());
    }

    #[test]
    fn tag_from_extension() {
        assert_eq!(FormatTag::from_path(Path::new("a/b.JPEG")), Some(FormatTag::Jpeg));
        assert_eq!(FormatTag::from_path(Path::new("page.ps")), Some(FormatTag::PostScript));
        assert_eq!(FormatTag::from_path(Path::new("noext")), None);
    }
}
