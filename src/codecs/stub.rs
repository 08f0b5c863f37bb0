// imgpipe/src/codecs/stub.rs
use super::{Capability, Codec, CodecOp, ReadSeek, WriteSeek};
use crate::core::{FormatTag, ImageToolError, Result};
use image::DynamicImage;

/// Stand-in for a codec that was left out of the build.
///
/// Every entry point fails with [`ImageToolError::NotPresent`] naming itself.
/// Readers are not consumed, writers are not written to.
#[derive(Debug, Clone, Copy)]
pub struct NotPresent {
    format: FormatTag,
}

impl NotPresent {
    pub fn new(format: FormatTag) -> Self {
        Self { format }
    }

    fn fail<T>(&self, op: CodecOp) -> Result<T> {
        log::debug!("{} {} called on a codec that is not present", self.format, op);
        Err(ImageToolError::NotPresent {
            format: self.format,
            operation: op.name(),
        })
    }
}

impl Codec for NotPresent {
    fn format(&self) -> FormatTag {
        self.format
    }

    fn capability(&self, _op: CodecOp) -> Capability {
        Capability::Unavailable
    }

    fn read_stream(&self, _reader: &mut dyn ReadSeek) -> Result<DynamicImage> {
        self.fail(CodecOp::ReadStream)
    }

    fn read_mem(&self, _data: &[u8]) -> Result<DynamicImage> {
        self.fail(CodecOp::ReadMem)
    }

    fn write_stream(&self, _image: &DynamicImage, _writer: &mut dyn WriteSeek) -> Result<()> {
        self.fail(CodecOp::WriteStream)
    }

    fn write_mem(&self, _image: &DynamicImage) -> Result<Vec<u8>> {
        self.fail(CodecOp::WriteMem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn assert_not_present<T: std::fmt::Debug>(result: Result<T>, expected_op: &str) {
        match result {
            Err(ImageToolError::NotPresent { format, operation }) => {
                assert_eq!(format, FormatTag::WebP);
                assert_eq!(operation, expected_op);
            }
            other => panic!("expected NotPresent, got {:?}", other),
        }
    }

    #[test]
    fn every_entry_point_fails_uniformly() {
        let stub = NotPresent::new(FormatTag::WebP);
        let image = DynamicImage::new_rgb8(2, 2);

        let mut reader = Cursor::new(b"RIFF\0\0\0\0WEBP".to_vec());
        assert_not_present(stub.read_stream(&mut reader), "read_stream");
        assert_eq!(reader.position(), 0);

        assert_not_present(stub.read_mem(&[]), "read_mem");

        let mut sink = Cursor::new(Vec::new());
        assert_not_present(stub.write_stream(&image, &mut sink), "write_stream");
        assert!(sink.get_ref().is_empty());

        assert_not_present(stub.write_mem(&image), "write_mem");
    }

    #[test]
    fn reports_unavailable_for_all_ops() {
        let stub = NotPresent::new(FormatTag::Jpeg);
        for op in CodecOp::ALL {
            assert_eq!(stub.capability(op), Capability::Unavailable);
        }
    }

    #[test]
    fn message_names_the_operation() {
        let err = NotPresent::new(FormatTag::Tiff)
            .read_mem(b"II*\0")
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("function not present"));
        assert!(text.contains("read_mem"));
    }
}
