//! Configuration types for ID-card generation.
//!
//! All run behaviour is controlled through [`CardConfig`], built via its
//! [`CardConfigBuilder`]. Every physical measurement is in **inches**; the
//! renderer converts to PDF points (1/72 in) and the image stages convert to
//! pixels at [`CardConfig::dpi`].
//!
//! Card layout coordinates are measured from the card's **bottom-left**
//! corner, matching PDF's coordinate system, so a layout designed for a
//! card-sized page works unchanged when the card is placed on a letter sheet.

use crate::error::IdCardError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Largest page side PDF viewers accept (14 400 pt).
pub const MAX_PAGE_INCHES: f32 = 200.0;

/// Configuration for one ID-card generation run.
///
/// # Example
/// ```rust
/// use idcard_forge::{CardConfig, PhotoEncoding};
///
/// let config = CardConfig::builder()
///     .template_path("assets/template.png")
///     .records_path("staff.csv")
///     .photo_dir("photos")
///     .output_path("out/badges.pdf")
///     .dpi(300)
///     .photo_encoding(PhotoEncoding::Jpeg { quality: 90 })
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CardConfig {
    /// Background artwork drawn full-bleed on every card.
    pub template_path: PathBuf,

    /// Roster CSV with `name`, `title`, `photo_path` columns.
    pub records_path: PathBuf,

    /// Base directory that each row's `photo_path` is resolved against.
    pub photo_dir: PathBuf,

    /// Destination PDF.
    pub output_path: PathBuf,

    /// Physical card size. Default: CR80 (3.375 × 2.125 in).
    pub card_size: CardSize,

    /// Print resolution used to normalise the template. Range: 72–1200. Default: 300.
    pub dpi: u32,

    /// Page size of the output document. Default: [`PageFormat::Card`].
    pub page_format: PageFormat,

    /// Photo box, text baselines and font sizes.
    pub layout: CardLayout,

    /// Side length in pixels of the square photo after resizing. Default: 300.
    pub photo_pixels: u32,

    /// How a non-square photo is fitted to the square. Default: [`PhotoFit::Stretch`].
    pub photo_fit: PhotoFit,

    /// How photos are stored in the PDF. Default: JPEG quality 95.
    pub photo_encoding: PhotoEncoding,

    /// Per-run progress reporter. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("ute_id_template.png"),
            records_path: PathBuf::from("employees.csv"),
            photo_dir: PathBuf::from("photos"),
            output_path: PathBuf::from("employee_ids.pdf"),
            card_size: CardSize::default(),
            dpi: 300,
            page_format: PageFormat::default(),
            layout: CardLayout::default(),
            photo_pixels: 300,
            photo_fit: PhotoFit::default(),
            photo_encoding: PhotoEncoding::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardConfig")
            .field("template_path", &self.template_path)
            .field("records_path", &self.records_path)
            .field("photo_dir", &self.photo_dir)
            .field("output_path", &self.output_path)
            .field("card_size", &self.card_size)
            .field("dpi", &self.dpi)
            .field("page_format", &self.page_format)
            .field("layout", &self.layout)
            .field("photo_pixels", &self.photo_pixels)
            .field("photo_fit", &self.photo_fit)
            .field("photo_encoding", &self.photo_encoding)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn CardProgressCallback>"),
            )
            .finish()
    }
}

impl CardConfig {
    /// Create a new builder for `CardConfig`.
    pub fn builder() -> CardConfigBuilder {
        CardConfigBuilder {
            config: Self::default(),
        }
    }

    /// Template target resolution in pixels: the card size at [`Self::dpi`].
    pub fn template_pixels(&self) -> (u32, u32) {
        self.card_size.pixels(self.dpi)
    }

    /// Check every constraint the builder enforces.
    ///
    /// Called by [`CardConfigBuilder::build`] and again by
    /// [`crate::generate`] because the fields are public.
    pub fn validate(&self) -> Result<(), IdCardError> {
        if !(72..=1200).contains(&self.dpi) {
            return Err(IdCardError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                self.dpi
            )));
        }
        let in_range =
            |inches: f32| inches.is_finite() && inches > 0.0 && inches <= MAX_PAGE_INCHES;
        if !(in_range(self.card_size.width) && in_range(self.card_size.height)) {
            return Err(IdCardError::InvalidConfig(format!(
                "Card size must be within (0, {MAX_PAGE_INCHES}] in on each side, got {} × {} in",
                self.card_size.width, self.card_size.height
            )));
        }
        if !(16..=4096).contains(&self.photo_pixels) {
            return Err(IdCardError::InvalidConfig(format!(
                "Photo resolution must be 16–4096 px, got {}",
                self.photo_pixels
            )));
        }
        if let PhotoEncoding::Jpeg { quality } = self.photo_encoding {
            if !(1..=100).contains(&quality) {
                return Err(IdCardError::InvalidConfig(format!(
                    "JPEG quality must be 1–100, got {quality}"
                )));
            }
        }
        let (page_w, page_h) = self.page_format.page_size(self.card_size);
        if self.card_size.width > page_w || self.card_size.height > page_h {
            return Err(IdCardError::InvalidConfig(format!(
                "Card {} × {} in does not fit on a {:?} page",
                self.card_size.width, self.card_size.height, self.page_format
            )));
        }
        self.layout.validate(self.card_size)
    }
}

/// Builder for [`CardConfig`].
#[derive(Debug)]
pub struct CardConfigBuilder {
    config: CardConfig,
}

impl CardConfigBuilder {
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = path.into();
        self
    }

    pub fn records_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.records_path = path.into();
        self
    }

    pub fn photo_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.photo_dir = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn card_size(mut self, size: CardSize) -> Self {
        self.config.card_size = size;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn page_format(mut self, format: PageFormat) -> Self {
        self.config.page_format = format;
        self
    }

    pub fn layout(mut self, layout: CardLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn photo_pixels(mut self, px: u32) -> Self {
        self.config.photo_pixels = px;
        self
    }

    pub fn photo_fit(mut self, fit: PhotoFit) -> Self {
        self.config.photo_fit = fit;
        self
    }

    pub fn photo_encoding(mut self, encoding: PhotoEncoding) -> Self {
        self.config.photo_encoding = encoding;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CardConfig, IdCardError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────

/// Physical card dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: f32,
    pub height: f32,
}

impl CardSize {
    /// ISO/IEC 7810 ID-1 (CR80), the credit-card format.
    pub const CR80: CardSize = CardSize {
        width: 3.375,
        height: 2.125,
    };

    /// Pixel resolution of this size at `dpi`, rounded to the nearest pixel.
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let px = |inches: f32| ((inches * dpi as f32).round() as u32).max(1);
        (px(self.width), px(self.height))
    }
}

impl Default for CardSize {
    fn default() -> Self {
        Self::CR80
    }
}

/// A point on the card, in inches from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned box on the card, in inches. `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fixed placement of the photo and the two text lines.
///
/// Loadable from JSON; omitted fields keep their defaults:
/// ```json
/// { "photo_box": { "x": 0.3, "y": 0.3, "width": 1.1, "height": 1.1 },
///   "name_font_size": 11 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardLayout {
    pub photo_box: Region,
    pub name_position: Position,
    pub title_position: Position,
    /// Font size of the name line, in points.
    pub name_font_size: f32,
    /// Font size of the title line, in points.
    pub title_font_size: f32,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            photo_box: Region {
                x: 0.37,
                y: 0.33,
                width: 1.0,
                height: 1.0,
            },
            name_position: Position { x: 1.7, y: 1.05 },
            title_position: Position { x: 1.7, y: 0.6 },
            name_font_size: 10.0,
            title_font_size: 8.0,
        }
    }
}

impl CardLayout {
    /// Load a layout from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, IdCardError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| IdCardError::InvalidLayout {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| IdCardError::InvalidLayout {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Ensure the photo box and both baselines lie on the card.
    pub fn validate(&self, card: CardSize) -> Result<(), IdCardError> {
        let b = &self.photo_box;
        if !(b.width > 0.0 && b.height > 0.0) {
            return Err(IdCardError::InvalidConfig(format!(
                "Photo box must have a positive size, got {} × {} in",
                b.width, b.height
            )));
        }
        if b.x < 0.0 || b.y < 0.0 || b.x + b.width > card.width || b.y + b.height > card.height {
            return Err(IdCardError::InvalidConfig(format!(
                "Photo box {b:?} extends outside the {} × {} in card",
                card.width, card.height
            )));
        }
        for (label, p) in [("name", self.name_position), ("title", self.title_position)] {
            if p.x < 0.0 || p.y < 0.0 || p.x > card.width || p.y > card.height {
                return Err(IdCardError::InvalidConfig(format!(
                    "The {label} position ({}, {}) lies outside the card",
                    p.x, p.y
                )));
            }
        }
        for (label, size) in [("name", self.name_font_size), ("title", self.title_font_size)] {
            if !(size > 0.0 && size <= 144.0) {
                return Err(IdCardError::InvalidConfig(format!(
                    "The {label} font size must be in (0, 144] pt, got {size}"
                )));
            }
        }
        Ok(())
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Page size of the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFormat {
    /// Page is exactly the card; one trimmed card per page. (default)
    #[default]
    Card,
    /// US letter (8.5 × 11 in) with the card at the top-left corner.
    Letter,
}

impl PageFormat {
    /// Page size in inches for a card of the given size.
    pub fn page_size(&self, card: CardSize) -> (f32, f32) {
        match self {
            PageFormat::Card => (card.width, card.height),
            PageFormat::Letter => (8.5, 11.0),
        }
    }

    /// Bottom-left corner of the card on the page, in inches.
    pub fn card_origin(&self, card: CardSize) -> (f32, f32) {
        match self {
            PageFormat::Card => (0.0, 0.0),
            PageFormat::Letter => (0.0, 11.0 - card.height),
        }
    }
}

/// How a photo is fitted to the square photo resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoFit {
    /// Scale both axes independently to the square. (default)
    #[default]
    Stretch,
    /// Scale to cover the square, then centre-crop the overflow.
    Crop,
}

/// Storage format for photos embedded in the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoEncoding {
    /// Lossy JPEG at the given quality (1–100).
    Jpeg { quality: u8 },
    /// Lossless Flate-compressed RGB.
    Lossless,
}

impl Default for PhotoEncoding {
    fn default() -> Self {
        PhotoEncoding::Jpeg { quality: 95 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        CardConfig::builder().build().expect("defaults validate");
    }

    #[test]
    fn cr80_at_300_dpi() {
        assert_eq!(CardSize::CR80.pixels(300), (1013, 638));
        assert_eq!(CardSize::CR80.pixels(72), (243, 153));
    }

    #[test]
    fn dpi_out_of_range_rejected() {
        let err = CardConfig::builder().dpi(50).build().unwrap_err();
        assert!(err.to_string().contains("DPI"), "got: {err}");
    }

    #[test]
    fn infinite_card_size_rejected() {
        let err = CardConfig::builder()
            .card_size(CardSize {
                width: f32::INFINITY,
                height: f32::INFINITY,
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Card size"), "got: {err}");
    }

    #[test]
    fn oversized_and_nan_card_sizes_rejected() {
        for (width, height) in [(500.0, 2.125), (3.375, 201.0), (f32::NAN, 2.0), (0.0, 2.0)] {
            let result = CardConfig::builder()
                .card_size(CardSize { width, height })
                .build();
            assert!(result.is_err(), "{width} × {height} should be rejected");
        }
    }

    #[test]
    fn largest_card_side_is_accepted() {
        CardConfig::builder()
            .card_size(CardSize {
                width: MAX_PAGE_INCHES,
                height: 2.125,
            })
            .build()
            .expect("200 in is a legal page side");
    }

    #[test]
    fn jpeg_quality_zero_rejected() {
        let err = CardConfig::builder()
            .photo_encoding(PhotoEncoding::Jpeg { quality: 0 })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("JPEG quality"), "got: {err}");
    }

    #[test]
    fn photo_box_outside_card_rejected() {
        let mut layout = CardLayout::default();
        layout.photo_box.x = 3.0;
        let err = CardConfig::builder().layout(layout).build().unwrap_err();
        assert!(err.to_string().contains("outside"), "got: {err}");
    }

    #[test]
    fn oversized_card_rejected_on_letter() {
        let err = CardConfig::builder()
            .card_size(CardSize {
                width: 9.0,
                height: 2.0,
            })
            .page_format(PageFormat::Letter)
            .layout(CardLayout::default())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("does not fit"), "got: {err}");
    }

    #[test]
    fn letter_origin_is_top_left() {
        let (x, y) = PageFormat::Letter.card_origin(CardSize::CR80);
        assert_eq!(x, 0.0);
        assert!((y - 8.875).abs() < 1e-6);
        assert_eq!(PageFormat::Card.card_origin(CardSize::CR80), (0.0, 0.0));
    }

    #[test]
    fn partial_layout_json_keeps_defaults() {
        let layout: CardLayout =
            serde_json::from_str(r#"{ "name_font_size": 12 }"#).expect("parse");
        assert_eq!(layout.name_font_size, 12.0);
        assert_eq!(layout.title_font_size, 8.0);
        assert_eq!(layout.photo_box, CardLayout::default().photo_box);
    }

    #[test]
    fn layout_file_errors_are_reported() {
        let err = CardLayout::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, IdCardError::InvalidLayout { .. }));
    }
}
