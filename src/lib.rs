//! # idcard-forge
//!
//! Render printable employee ID cards from a CSV roster and a directory of
//! passport photos into a single multi-page PDF, one card per page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! template.png   employees.csv   photos/
//!      │               │            │
//!      ├─ 1. Template  decode, flatten to RGB, resize to card px @ DPI
//!      ├─ 2. Roster    parse CSV, map name/title/photo_path columns
//!      ├─ 3. Render    per row: background → photo → name → title → page
//!      └─ 4. Output    atomic PDF write + per-row outcome summary
//! ```
//!
//! A row with a blank required field is skipped (no page). A row whose photo
//! is missing or broken still gets a page, just without the photo. Only a bad
//! template, an unreadable roster, or an unwritable destination abort the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use idcard_forge::{generate, CardConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CardConfig::builder()
//!         .template_path("template.png")
//!         .records_path("employees.csv")
//!         .photo_dir("photos")
//!         .output_path("employee_ids.pdf")
//!         .build()?;
//!     let summary = generate(&config)?;
//!     eprintln!(
//!         "{} pages: {} clean / {} degraded / {} skipped",
//!         summary.pages, summary.clean, summary.degraded, summary.skipped
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `idcards` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CardConfig, CardConfigBuilder, CardLayout, CardSize, PageFormat, PhotoEncoding, PhotoFit,
    Position, Region,
};
pub use document::{CardCanvas, FontStyle, PageRect, PdfCardDocument, TextError};
pub use error::{CardIssue, IdCardError};
pub use generate::{generate, generate_with};
pub use output::{CardReport, RenderOutcome, RunSummary};
pub use pipeline::encode::EncodedImage;
pub use pipeline::records::EmployeeRecord;
pub use pipeline::template::Template;
pub use progress::{CardProgressCallback, NoopProgressCallback, ProgressCallback};
