//! Template preparation: load the background artwork once per run.
//!
//! The artwork is decoded, flattened to opaque RGB, resized to exactly the
//! card's pixel resolution at the print DPI, and Flate-encoded in memory. The
//! resulting [`Template`] is immutable; the PDF backend embeds it a single
//! time and every page references the same image object.
//!
//! Any failure here is fatal: without a background there is nothing to print.

use crate::error::IdCardError;
use crate::pipeline::encode::{self, EncodedImage};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The normalised background image for a run.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    dpi: u32,
    image: EncodedImage,
}

impl Template {
    /// Source file the template was prepared from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel dimensions after normalisation.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    /// Print resolution the pixel dimensions were derived from.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// The encoded pixel buffer.
    pub fn image(&self) -> &EncodedImage {
        &self.image
    }
}

/// Load and normalise the template at `path` to `target` pixels.
///
/// # Errors
/// - [`IdCardError::TemplateNotFound`] when `path` is not a file
/// - [`IdCardError::TemplateDecode`] for I/O or decode failures
/// - [`IdCardError::TemplateEncode`] if compression fails
pub fn prepare(path: &Path, target: (u32, u32), dpi: u32) -> Result<Template, IdCardError> {
    if !path.is_file() {
        return Err(IdCardError::TemplateNotFound {
            path: path.to_path_buf(),
        });
    }

    let decoded = image::open(path).map_err(|e| IdCardError::TemplateDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(
        "Decoded template {} → {}x{} {:?}",
        path.display(),
        decoded.width(),
        decoded.height(),
        decoded.color()
    );

    let normalised = normalise(decoded, target);
    let image = encode::encode_lossless(&normalised).map_err(|e| IdCardError::TemplateEncode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    info!(
        "Template ready: {}x{} px at {} DPI ({} bytes)",
        image.width,
        image.height,
        dpi,
        image.data.len()
    );

    Ok(Template {
        path: path.to_path_buf(),
        dpi,
        image,
    })
}

/// Flatten to opaque RGB and resize to `target` if the size differs.
pub(crate) fn normalise(img: DynamicImage, target: (u32, u32)) -> RgbImage {
    let rgb = to_opaque_rgb(img);
    if rgb.dimensions() == target {
        return rgb;
    }
    debug!(
        "Resizing {}x{} → {}x{} (Lanczos3)",
        rgb.width(),
        rgb.height(),
        target.0,
        target.1
    );
    imageops::resize(&rgb, target.0, target.1, FilterType::Lanczos3)
}

/// Convert any colour type to 8-bit RGB, compositing alpha over white.
pub(crate) fn to_opaque_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }
    let rgba = img.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
