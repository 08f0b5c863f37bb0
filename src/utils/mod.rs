// imgpipe/src/utils/mod.rs
use crate::core::FormatTag;
use std::path::{Path, PathBuf};

/// Default destination for a conversion: the input path with the target's
/// extension. An input that already carries that extension gets a
/// `_converted` suffix so it is never overwritten.
pub fn default_output_path(input: &Path, target: FormatTag) -> PathBuf {
    let candidate = input.with_extension(target.extension());
    if candidate != input {
        return candidate;
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    input.with_file_name(format!("{}_converted.{}", stem, target.extension()))
}

/// PNG path in the system temp directory for the preview tool. The name
/// depends only on the input's stem, so repeated previews of one image
/// overwrite the same file instead of piling up.
pub fn preview_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    std::env::temp_dir().join(format!("{}_imgpipe_preview.png", stem))
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.ln() / base.ln()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("/data/scan.jpg"), FormatTag::Png),
            PathBuf::from("/data/scan.png")
        );
        assert_eq!(
            default_output_path(Path::new("scan.png"), FormatTag::Png),
            PathBuf::from("scan_converted.png")
        );
    }

    #[test]
    fn preview_lands_in_temp_dir() {
        let path = preview_path(Path::new("holiday/beach.jpg"));
        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }

    #[test]
    fn preview_path_is_stable_per_input() {
        let first = preview_path(Path::new("holiday/beach.jpg"));
        let again = preview_path(Path::new("holiday/beach.jpg"));
        assert_eq!(first, again);
        assert_eq!(
            first.file_name().and_then(|n| n.to_str()),
            Some("beach_imgpipe_preview.png")
        );
        assert_ne!(first, preview_path(Path::new("holiday/dunes.jpg")));
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(2048), "2.00 KB");
    }
}
