// imgpipe/src/codecs/mod.rs
mod postscript;
mod raster;
mod registry;
mod stub;

use crate::core::{FormatTag, Result};
use image::DynamicImage;
use std::fmt;
use std::io::{BufRead, Seek, Write};

pub use postscript::{PostScriptCodec, PsLevel, DEFAULT_RESOLUTION};
pub use raster::{RasterCodec, DEFAULT_JPEG_QUALITY};
pub use registry::CodecRegistry;
pub use stub::NotPresent;

pub trait ReadSeek: BufRead + Seek {}
impl<T: BufRead + Seek> ReadSeek for T {}

pub trait WriteSeek: Write + Seek {}
impl<T: Write + Seek> WriteSeek for T {}

/// The four entry points every codec exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOp {
    ReadStream,
    ReadMem,
    WriteStream,
    WriteMem,
}

impl CodecOp {
    pub const ALL: [CodecOp; 4] = [
        CodecOp::ReadStream,
        CodecOp::ReadMem,
        CodecOp::WriteStream,
        CodecOp::WriteMem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CodecOp::ReadStream => "read_stream",
            CodecOp::ReadMem => "read_mem",
            CodecOp::WriteStream => "write_stream",
            CodecOp::WriteMem => "write_mem",
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, CodecOp::ReadStream | CodecOp::ReadMem)
    }
}

impl fmt::Display for CodecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable,
}

/// Fixed call surface for one format.
///
/// Whether or not the real implementation was compiled in, callers use the
/// same four methods and check the returned `Result`.
pub trait Codec: Send + Sync {
    fn format(&self) -> FormatTag;

    fn capability(&self, op: CodecOp) -> Capability;

    fn read_stream(&self, reader: &mut dyn ReadSeek) -> Result<DynamicImage>;

    fn read_mem(&self, data: &[u8]) -> Result<DynamicImage>;

    fn write_stream(&self, image: &DynamicImage, writer: &mut dyn WriteSeek) -> Result<()>;

    fn write_mem(&self, image: &DynamicImage) -> Result<Vec<u8>>;
}
