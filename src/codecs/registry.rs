// imgpipe/src/codecs/registry.rs
use super::{Capability, Codec, CodecOp, NotPresent, PostScriptCodec, RasterCodec};
use crate::core::FormatTag;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps every format tag to a codec strategy object.
///
/// Compile-time features decide which raster codecs are *available*; a
/// format whose feature is off is served by [`NotPresent`]. The registry is
/// assembled once at startup and read-only afterwards.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<FormatTag, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Registry of everything compiled into this build.
    pub fn new() -> Self {
        let mut codecs: HashMap<FormatTag, Arc<dyn Codec>> = HashMap::new();

        for format in FormatTag::KNOWN {
            let codec: Arc<dyn Codec> = match format {
                FormatTag::PostScript => Arc::new(PostScriptCodec::default()),
                _ if compiled_in(format) => match RasterCodec::new(format) {
                    Some(codec) => Arc::new(codec),
                    None => Arc::new(NotPresent::new(format)),
                },
                _ => Arc::new(NotPresent::new(format)),
            };
            codecs.insert(format, codec);
        }

        Self { codecs }
    }

    /// Replace a format's codec with the not-present stub.
    pub fn with_disabled(mut self, format: FormatTag) -> Self {
        log::debug!("Disabling {} codec", format);
        self.codecs.insert(format, Arc::new(NotPresent::new(format)));
        self
    }

    /// Codec serving `format`. Never fails: missing entries and `Unknown`
    /// resolve to the stub.
    pub fn resolve(&self, format: FormatTag) -> Arc<dyn Codec> {
        self.codecs
            .get(&format)
            .cloned()
            .unwrap_or_else(|| Arc::new(NotPresent::new(format)))
    }

    pub fn capability(&self, format: FormatTag, op: CodecOp) -> Capability {
        self.resolve(format).capability(op)
    }

    /// Formats that can be decoded with this registry.
    pub fn readable_formats(&self) -> Vec<FormatTag> {
        FormatTag::KNOWN
            .into_iter()
            .filter(|&f| self.capability(f, CodecOp::ReadStream) == Capability::Available)
            .collect()
    }

    /// Formats that can be encoded with this registry.
    pub fn writable_formats(&self) -> Vec<FormatTag> {
        FormatTag::KNOWN
            .into_iter()
            .filter(|&f| self.capability(f, CodecOp::WriteStream) == Capability::Available)
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn compiled_in(format: FormatTag) -> bool {
    match format {
        FormatTag::Bmp => cfg!(feature = "bmp"),
        FormatTag::Jpeg => cfg!(feature = "jpeg"),
        FormatTag::Png => cfg!(feature = "png"),
        FormatTag::Gif => cfg!(feature = "gif"),
        FormatTag::Tiff => cfg!(feature = "tiff"),
        FormatTag::WebP => cfg!(feature = "webp"),
        FormatTag::Pnm => cfg!(feature = "pnm"),
        FormatTag::PostScript | FormatTag::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    #[test]
    fn unknown_resolves_to_stub() {
        let registry = CodecRegistry::new();
        for op in CodecOp::ALL {
            assert_eq!(
                registry.capability(FormatTag::Unknown, op),
                Capability::Unavailable
            );
        }
        assert!(registry.resolve(FormatTag::Unknown).read_mem(b"x").is_err());
    }

    #[test]
    fn postscript_is_write_only() {
        let registry = CodecRegistry::new();
        assert!(registry.writable_formats().contains(&FormatTag::PostScript));
        assert!(!registry.readable_formats().contains(&FormatTag::PostScript));
    }

    #[cfg(feature = "png")]
    #[test]
    fn disabled_codec_keeps_its_call_surface() {
        let registry = CodecRegistry::new();
        assert_eq!(
            registry.capability(FormatTag::Png, CodecOp::WriteMem),
            Capability::Available
        );

        let registry = registry.with_disabled(FormatTag::Png);
        assert_eq!(
            registry.capability(FormatTag::Png, CodecOp::WriteMem),
            Capability::Unavailable
        );
        let codec = registry.resolve(FormatTag::Png);
        assert_eq!(codec.format(), FormatTag::Png);
        assert!(codec.write_mem(&DynamicImage::new_luma8(1, 1)).is_err());
    }

    #[cfg(not(feature = "webp"))]
    #[test]
    fn excluded_feature_resolves_to_stub() {
        let registry = CodecRegistry::new();
        assert_eq!(
            registry.capability(FormatTag::WebP, CodecOp::ReadMem),
            Capability::Unavailable
        );
    }
}
