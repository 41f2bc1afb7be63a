//! Image encoding: opaque RGB pixels → an in-memory buffer a PDF can embed.
//!
//! PDF image XObjects accept two encodings we care about without any
//! re-decoding on our side:
//!
//! * **FlateDecode** — zlib-compressed raw RGB samples. Lossless; used for the
//!   template and for photos when [`PhotoEncoding::Lossless`] is configured.
//! * **DCTDecode** — a baseline JPEG file, embedded byte-for-byte. Much smaller
//!   for photographic content; the default for photos.
//!
//! Buffers never touch the file system and are dropped with the card that
//! owns them.

use crate::config::PhotoEncoding;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage};
use std::io::Write;
use tracing::debug;

/// Stream filter needed to decode an [`EncodedImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// zlib-compressed 8-bit RGB samples.
    Flate,
    /// JPEG bitstream.
    Dct,
}

/// An RGB raster ready to embed as a PDF image XObject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub filter: ImageFilter,
    pub data: Vec<u8>,
}

/// Encode with zlib, preserving every sample.
pub fn encode_lossless(img: &RgbImage) -> Result<EncodedImage, ImageError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(img.as_raw()).map_err(ImageError::IoError)?;
    let data = encoder.finish().map_err(ImageError::IoError)?;

    debug!(
        "Flate-encoded {}x{} image → {} bytes",
        img.width(),
        img.height(),
        data.len()
    );

    Ok(EncodedImage {
        width: img.width(),
        height: img.height(),
        filter: ImageFilter::Flate,
        data,
    })
}

/// Encode as a baseline JPEG at `quality` (1–100).
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<EncodedImage, ImageError> {
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgb8,
    )?;

    debug!(
        "JPEG-encoded {}x{} image at q{} → {} bytes",
        img.width(),
        img.height(),
        quality,
        data.len()
    );

    Ok(EncodedImage {
        width: img.width(),
        height: img.height(),
        filter: ImageFilter::Dct,
        data,
    })
}

/// Encode a photo according to the configured storage format.
pub fn encode_photo(img: &RgbImage, encoding: PhotoEncoding) -> Result<EncodedImage, ImageError> {
    match encoding {
        PhotoEncoding::Jpeg { quality } => encode_jpeg(img, quality),
        PhotoEncoding::Lossless => encode_lossless(img),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use image::Rgb;
    use std::io::Read;

    #[test]
    fn lossless_round_trips_samples() {
        let img = RgbImage::from_fn(7, 5, |x, y| Rgb([x as u8 * 30, y as u8 * 40, 200]));
        let encoded = encode_lossless(&img).expect("encode");
        assert_eq!(encoded.filter, ImageFilter::Flate);
        assert_eq!((encoded.width, encoded.height), (7, 5));

        let mut raw = Vec::new();
        ZlibDecoder::new(encoded.data.as_slice())
            .read_to_end(&mut raw)
            .expect("valid zlib");
        assert_eq!(raw, img.into_raw());
    }

    #[test]
    fn jpeg_has_soi_marker() {
        let img = RgbImage::from_pixel(16, 16, Rgb([10, 120, 250]));
        let encoded = encode_jpeg(&img, 90).expect("encode");
        assert_eq!(encoded.filter, ImageFilter::Dct);
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn encode_photo_dispatches_on_config() {
        let img = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
        let jpeg = encode_photo(&img, PhotoEncoding::Jpeg { quality: 80 }).expect("jpeg");
        let flate = encode_photo(&img, PhotoEncoding::Lossless).expect("flate");
        assert_eq!(jpeg.filter, ImageFilter::Dct);
        assert_eq!(flate.filter, ImageFilter::Flate);
    }
}
