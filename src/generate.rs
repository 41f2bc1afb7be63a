//! Run driver: template → roster → one page per valid row → PDF on disk.
//!
//! [`generate`] owns the output document for the whole run. It reserves the
//! destination first, so an unwritable path fails before any image work,
//! then prepares the template and reads the roster. Either of those failing
//! aborts the run with no file written. Once the loop starts nothing short of
//! a write failure can stop it; the document is finalised exactly once.

use crate::config::{CardConfig, POINTS_PER_INCH};
use crate::document::{CardCanvas, OutputFile, PdfCardDocument};
use crate::error::IdCardError;
use crate::output::{CardReport, RunSummary};
use crate::pipeline::{records, render, template};
use std::time::Instant;
use tracing::{debug, info};

/// Generate the ID-card PDF described by `config`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunSummary)` whenever the PDF was written, even if rows were skipped
/// or degraded (check `summary.outcomes`).
///
/// # Errors
/// Returns `Err(IdCardError)` only for fatal errors:
/// - Invalid configuration
/// - Output destination cannot be created or written
/// - Template missing or undecodable
/// - Roster missing, unreadable, or lacking a required column
pub fn generate(config: &CardConfig) -> Result<RunSummary, IdCardError> {
    config.validate()?;
    let output = OutputFile::open(&config.output_path)?;

    let (page_w, page_h) = config.page_format.page_size(config.card_size);
    let mut document = PdfCardDocument::new(page_w * POINTS_PER_INCH, page_h * POINTS_PER_INCH);

    let summary = generate_with(config, &mut document)?;

    output.commit(&document.into_bytes())?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&summary);
    }
    Ok(summary)
}

/// Run the pipeline against any [`CardCanvas`] without writing a file.
///
/// [`generate`] calls this with a [`PdfCardDocument`]; tests and alternative
/// backends can pass their own canvas.
pub fn generate_with<C: CardCanvas + ?Sized>(
    config: &CardConfig,
    canvas: &mut C,
) -> Result<RunSummary, IdCardError> {
    let start = Instant::now();
    info!(
        "Generating ID cards: roster {}, template {}",
        config.records_path.display(),
        config.template_path.display()
    );

    // ── Step 1: Template ─────────────────────────────────────────────────
    let template = template::prepare(
        &config.template_path,
        config.template_pixels(),
        config.dpi,
    )?;

    // ── Step 2: Roster ───────────────────────────────────────────────────
    let rows = records::read_records(&config.records_path)?;
    let total = rows.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── Step 3: One card per row, in roster order ────────────────────────
    let pages_before = canvas.page_count();
    let (mut clean, mut degraded, mut skipped) = (0usize, 0usize, 0usize);
    let mut outcomes = Vec::new();

    for record in &rows {
        if record.is_valid() {
            if let Some(ref cb) = config.progress_callback {
                cb.on_card_start(record.row, total, &record.name);
            }
        }

        let outcome = render::render_card(canvas, &template, record, config);
        debug!("Row {}: {}", record.row, outcome.label());

        if let Some(ref cb) = config.progress_callback {
            if outcome.is_skipped() {
                cb.on_card_skipped(record.row, total, &outcome);
            } else {
                cb.on_card_complete(record.row, total, &outcome);
            }
        }

        if outcome.is_success() {
            clean += 1;
            continue;
        }
        if outcome.is_skipped() {
            skipped += 1;
        } else {
            degraded += 1;
        }
        outcomes.push(CardReport {
            row: record.row,
            line: record.line,
            name: record.name.clone(),
            outcome,
        });
    }

    let pages = canvas.page_count() - pages_before;
    debug_assert_eq!(pages, clean + degraded);

    let summary = RunSummary {
        output_path: config.output_path.clone(),
        pages,
        clean,
        degraded,
        skipped,
        outcomes,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Rendered {} cards ({} clean, {} degraded, {} skipped) in {}ms",
        summary.pages, clean, degraded, skipped, summary.duration_ms
    );
    Ok(summary)
}
