//! Pure Rust codec backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate decoders, then [`PixelBuffer::from_dynamic`] |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Orientation, metadata copy | custom [`exif`](super::exif) module |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::exif::{self, ExifError, ExifField};
use super::orientation::Orientation;
use super::params::{OutputFormat, Quality};
use super::pixel::PixelBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a file and sniff its format from the content, not the extension.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
}

fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = match img {
                DynamicImage::ImageRgb8(_) => img.clone(),
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            let encoder = JpegEncoder::new_with_quality(&mut out, quality.value() as u8);
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut out)),
        OutputFormat::WebP => img.write_with_encoder(WebPEncoder::new_lossless(&mut out)),
    };
    result.map_err(|e| BackendError::Encode(format!("{} encode failed: {}", format.name(), e)))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {}", e)))?;
        Ok(Dimensions { width, height })
    }

    fn read_orientation(&self, path: &Path) -> Result<Orientation, BackendError> {
        let bytes = std::fs::read(path)?;
        match exif::read_orientation(&bytes) {
            Ok(orientation) => Ok(orientation),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no orientation, assuming normal");
                Ok(Orientation::Normal)
            }
        }
    }

    fn read_metadata(&self, path: &Path) -> Result<Vec<ExifField>, ExifError> {
        let bytes = std::fs::read(path).map_err(|e| ExifError::Unreadable(e.to_string()))?;
        exif::read_fields(&bytes)
    }

    fn decode(&self, path: &Path, subsample: u32) -> Result<PixelBuffer, BackendError> {
        let img = load_image(path)?;
        PixelBuffer::from_dynamic(&img, subsample)
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let img = buffer
            .to_dynamic()
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        encode_image(&img, format, quality)
    }

    fn copy_metadata(&self, source: &Path, encoded: &[u8]) -> Result<Vec<u8>, ExifError> {
        let bytes = std::fs::read(source).map_err(|e| ExifError::Unreadable(e.to_string()))?;
        exif::copy_exif(&bytes, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::exif::tests::{jpeg_with_app1, sample_tiff};
    use crate::imaging::pixel::{PixelLayout, pack, unpack};
    use image::{ImageEncoder, RgbImage, RgbaImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = RustBackend::new().decode(&path, 1);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_with_subsample_reduces() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 203, 100);

        let buf = RustBackend::new().decode(&path, 4).unwrap();
        assert_eq!(buf.dimensions(), (51, 25));
        assert_eq!(buf.layout(), PixelLayout::Rgb);
    }

    #[test]
    fn decode_png_keeps_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("alpha.png");
        RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();

        let buf = RustBackend::new().decode(&path, 1).unwrap();
        assert_eq!(buf.layout(), PixelLayout::Argb);
        assert_eq!(unpack(buf.get(2, 1)), [40, 10, 20, 30]);
    }

    // =========================================================================
    // Orientation and metadata
    // =========================================================================

    #[test]
    fn orientation_of_plain_jpeg_is_normal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 10, 10);

        let o = RustBackend::new().read_orientation(&path).unwrap();
        assert_eq!(o, Orientation::Normal);
    }

    #[test]
    fn orientation_read_from_app1() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rotated.jpg");
        std::fs::write(&path, jpeg_with_app1(&sample_tiff())).unwrap();

        let o = RustBackend::new().read_orientation(&path).unwrap();
        assert_eq!(o, Orientation::Rotate90);
    }

    #[test]
    fn read_metadata_lists_allowlisted_tags() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tagged.jpg");
        std::fs::write(&path, jpeg_with_app1(&sample_tiff())).unwrap();

        let fields = RustBackend::new().read_metadata(&path).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Make", "ExposureTime"]);
    }

    #[test]
    fn copy_metadata_from_missing_source_fails() {
        let result =
            RustBackend::new().copy_metadata(Path::new("/nonexistent.jpg"), &[0xFF, 0xD8]);
        assert!(matches!(result, Err(ExifError::Unreadable(_))));
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    fn checker() -> PixelBuffer {
        PixelBuffer::from_fn(16, 8, PixelLayout::Argb, |x, y| {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            pack(200, v, v, v)
        })
        .unwrap()
    }

    #[test]
    fn encode_each_format_decodes_back() {
        let backend = RustBackend::new();
        for (format, expected) in [
            (OutputFormat::Jpeg, image::ImageFormat::Jpeg),
            (OutputFormat::Png, image::ImageFormat::Png),
            (OutputFormat::WebP, image::ImageFormat::WebP),
        ] {
            let bytes = backend.encode(&checker(), format, Quality::new(90)).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected);
            let img = image::load_from_memory(&bytes).unwrap();
            assert_eq!((img.width(), img.height()), (16, 8));
        }
    }

    #[test]
    fn lossless_formats_keep_pixels() {
        let backend = RustBackend::new();
        for format in [OutputFormat::Png, OutputFormat::WebP] {
            let bytes = backend.encode(&checker(), format, Quality::default()).unwrap();
            let img = image::load_from_memory(&bytes).unwrap();
            let back = PixelBuffer::from_dynamic(&img, 1).unwrap();
            assert_eq!(back, checker(), "{}", format.name());
        }
    }

    #[test]
    fn jpeg_encode_then_copy_metadata() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        std::fs::write(&source, jpeg_with_app1(&sample_tiff())).unwrap();

        let backend = RustBackend::new();
        let encoded = backend
            .encode(&checker(), OutputFormat::Jpeg, Quality::default())
            .unwrap();
        let with_exif = backend.copy_metadata(&source, &encoded).unwrap();

        assert_eq!(exif::read_orientation(&with_exif).unwrap(), Orientation::Normal);
        let img = image::load_from_memory(&with_exif).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
    }
}
