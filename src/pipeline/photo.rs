//! Portrait handling: resolve, decode, square and encode one photo.
//!
//! Every failure here is row-local and comes back as a [`CardIssue`]; the
//! renderer turns it into a degraded outcome and still commits the page.

use crate::config::{PhotoEncoding, PhotoFit};
use crate::error::CardIssue;
use crate::pipeline::encode::{self, EncodedImage};
use crate::pipeline::template::to_opaque_rgb;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recognised photo extensions, compared case-insensitively.
pub const PHOTO_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Whether `path` ends in one of [`PHOTO_EXTENSIONS`].
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PHOTO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Resolve a roster `photo_path` against the photo directory and check it
/// is a file with a recognised extension.
pub fn locate(photo_dir: &Path, photo_path: &str) -> Result<PathBuf, CardIssue> {
    let path = photo_dir.join(photo_path);
    if !path.is_file() {
        return Err(CardIssue::PhotoNotFound { path });
    }
    if !has_supported_extension(&path) {
        return Err(CardIssue::UnsupportedPhotoType { path });
    }
    Ok(path)
}

/// Decode the photo at `path`, square it to `pixels`, and encode it.
pub fn load(
    path: &Path,
    pixels: u32,
    fit: PhotoFit,
    encoding: PhotoEncoding,
) -> Result<EncodedImage, CardIssue> {
    let processing = |detail: String| CardIssue::PhotoProcessing {
        path: path.to_path_buf(),
        detail,
    };

    let decoded = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| processing(e.to_string()))?
        .decode()
        .map_err(|e| processing(e.to_string()))?;

    debug!(
        "Decoded photo {} → {}x{}",
        path.display(),
        decoded.width(),
        decoded.height()
    );

    let squared = square(to_opaque_rgb(decoded), pixels, fit);
    encode::encode_photo(&squared, encoding).map_err(|e| processing(e.to_string()))
}

/// Resize an RGB image to `pixels` × `pixels`.
pub(crate) fn square(rgb: RgbImage, pixels: u32, fit: PhotoFit) -> RgbImage {
    match fit {
        PhotoFit::Stretch => imageops::resize(&rgb, pixels, pixels, FilterType::Lanczos3),
        PhotoFit::Crop => DynamicImage::ImageRgb8(rgb)
            .resize_to_fill(pixels, pixels, FilterType::Lanczos3)
            .into_rgb8(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("a/b.PNG")));
        assert!(has_supported_extension(Path::new("b.Jpeg")));
        assert!(has_supported_extension(Path::new("b.jpg")));
        assert!(!has_supported_extension(Path::new("b.gif")));
        assert!(!has_supported_extension(Path::new("noext")));
    }

    #[test]
    fn locate_reports_missing_then_unsupported() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("face.gif"), b"GIF89a").expect("write");

        assert!(matches!(
            locate(dir.path(), "ghost.png"),
            Err(CardIssue::PhotoNotFound { .. })
        ));
        assert!(matches!(
            locate(dir.path(), "face.gif"),
            Err(CardIssue::UnsupportedPhotoType { .. })
        ));
    }

    #[test]
    fn load_squares_and_encodes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("face.png");
        RgbImage::from_pixel(60, 90, Rgb([200, 150, 100]))
            .save(&path)
            .expect("save png");

        let photo = load(&path, 32, PhotoFit::Crop, PhotoEncoding::Lossless).expect("load");
        assert_eq!((photo.width, photo.height), (32, 32));
    }

    #[test]
    fn corrupt_photo_is_processing_issue() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"\xFF\xD8\xFF\xE0 truncated").expect("write");
        let err = load(&path, 32, PhotoFit::Stretch, PhotoEncoding::default()).unwrap_err();
        assert!(matches!(err, CardIssue::PhotoProcessing { .. }), "got: {err}");
    }

    #[test]
    fn stretch_and_crop_both_yield_square() {
        let rgb = RgbImage::from_pixel(50, 20, Rgb([0, 0, 0]));
        assert_eq!(square(rgb.clone(), 16, PhotoFit::Stretch).dimensions(), (16, 16));
        assert_eq!(square(rgb, 16, PhotoFit::Crop).dimensions(), (16, 16));
    }
}
