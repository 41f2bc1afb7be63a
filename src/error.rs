//! Error types for the idcard-forge library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`IdCardError`] — **Fatal**: the run cannot proceed at all (no usable
//!   template, unreadable roster, missing schema columns, unwritable output).
//!   Returned as `Err(IdCardError)` from [`crate::generate`].
//!
//! * [`CardIssue`] — **Non-fatal**: a single roster row could not be rendered
//!   cleanly (blank field, missing photo, undecodable photo, unencodable text)
//!   but every other card is fine. Stored inside
//!   [`crate::output::RenderOutcome`] so callers can inspect exactly which
//!   rows degraded instead of losing the whole batch to one bad photo.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the idcard-forge library.
///
/// Row-level failures use [`CardIssue`] and are recorded in
/// [`crate::output::RunSummary::outcomes`] rather than propagated here.
#[derive(Debug, Error)]
pub enum IdCardError {
    // ── Template errors ───────────────────────────────────────────────────
    /// The background template image does not exist.
    #[error("Template image not found: '{path}'\nCheck the path exists and is readable.")]
    TemplateNotFound { path: PathBuf },

    /// The template exists but could not be read or decoded as a raster image.
    #[error("Template image '{path}' could not be decoded: {detail}")]
    TemplateDecode { path: PathBuf, detail: String },

    /// The normalised template could not be re-encoded for embedding.
    #[error("Template image '{path}' could not be encoded: {detail}")]
    TemplateEncode { path: PathBuf, detail: String },

    // ── Roster errors ─────────────────────────────────────────────────────
    /// The roster CSV does not exist.
    #[error("Roster file not found: '{path}'")]
    RecordsNotFound { path: PathBuf },

    /// The roster could not be read or parsed as CSV.
    #[error("Failed to read roster '{path}': {source}")]
    RecordsRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The roster header lacks one or more required columns.
    #[error("Roster '{path}' is missing required column(s): {}\nFound columns: {}", missing.join(", "), found.join(", "))]
    MissingColumns {
        path: PathBuf,
        missing: Vec<String>,
        found: Vec<String>,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The destination could not be prepared for writing.
    #[error("Cannot open output '{path}' for writing: {source}")]
    OutputOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or renaming the finished PDF failed.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A layout file could not be loaded.
    #[error("Invalid layout file '{path}': {detail}")]
    InvalidLayout { path: PathBuf, detail: String },
}

/// A non-fatal problem with a single card.
///
/// Stored in [`crate::output::RenderOutcome`]. The run continues regardless.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardIssue {
    /// One or more required fields were blank after trimming.
    #[error("required field(s) empty: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// The resolved photo path does not exist.
    #[error("photo not found: '{}'", path.display())]
    PhotoNotFound { path: PathBuf },

    /// The photo path has an extension other than png/jpg/jpeg.
    #[error("unsupported photo type: '{}'", path.display())]
    UnsupportedPhotoType { path: PathBuf },

    /// The photo was found but could not be decoded, resized, or encoded.
    #[error("photo '{}' could not be processed: {detail}", path.display())]
    PhotoProcessing { path: PathBuf, detail: String },

    /// A text field could not be drawn.
    #[error("{field} text could not be drawn: {detail}")]
    TextDrawing { field: String, detail: String },
}
