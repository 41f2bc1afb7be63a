//! Progress-callback trait for per-card generation events.
//!
//! Inject an [`Arc<dyn CardProgressCallback>`] via
//! [`crate::config::CardConfigBuilder::progress_callback`] to receive events
//! as the pipeline works through the roster. The callback belongs to one run;
//! nothing is registered process-wide, so several runs (or tests) can execute
//! side by side without seeing each other's events.
//!
//! # Example
//!
//! ```rust
//! use idcard_forge::{CardConfig, CardProgressCallback, RenderOutcome};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl CardProgressCallback for CountingCallback {
//!     fn on_card_complete(&self, row: usize, total_rows: usize, outcome: &RenderOutcome) {
//!         let done = self.pages.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("row {row}/{total_rows}: {} ({done} pages)", outcome.label());
//!     }
//! }
//!
//! let config = CardConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { pages: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{RenderOutcome, RunSummary};
use std::sync::Arc;

/// Called by the generation pipeline as it processes each roster row.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Rows are processed sequentially in roster order.
pub trait CardProgressCallback: Send + Sync {
    /// Called once after the roster is read, before any card is drawn.
    ///
    /// # Arguments
    /// * `total_rows` — data rows in the roster, valid or not
    fn on_run_start(&self, total_rows: usize) {
        let _ = total_rows;
    }

    /// Called before a valid row is drawn.
    ///
    /// # Arguments
    /// * `row`  — 1-indexed data row
    /// * `name` — trimmed name from the row
    fn on_card_start(&self, row: usize, total_rows: usize, name: &str) {
        let _ = (row, total_rows, name);
    }

    /// Called after a page has been committed, clean or degraded.
    fn on_card_complete(&self, row: usize, total_rows: usize, outcome: &RenderOutcome) {
        let _ = (row, total_rows, outcome);
    }

    /// Called when a row is skipped because a required field is blank.
    fn on_card_skipped(&self, row: usize, total_rows: usize, outcome: &RenderOutcome) {
        let _ = (row, total_rows, outcome);
    }

    /// Called once after the document has been written.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CardProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CardConfig`].
pub type ProgressCallback = Arc<dyn CardProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CardIssue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: AtomicUsize,
    }

    impl CardProgressCallback for TrackingCallback {
        fn on_run_start(&self, total_rows: usize) {
            self.started_total.store(total_rows, Ordering::SeqCst);
        }

        fn on_card_start(&self, _row: usize, _total_rows: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_card_complete(&self, _row: usize, _total_rows: usize, _outcome: &RenderOutcome) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_card_skipped(&self, _row: usize, _total_rows: usize, _outcome: &RenderOutcome) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_card_start(1, 3, "Ada");
        cb.on_card_complete(1, 3, &RenderOutcome::Success);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let skipped = RenderOutcome::SkippedInvalidRecord {
            issue: CardIssue::MissingFields {
                fields: vec!["title".into()],
            },
        };

        tracker.on_run_start(2);
        tracker.on_card_start(1, 2, "Ada");
        tracker.on_card_complete(1, 2, &RenderOutcome::Success);
        tracker.on_card_skipped(2, 2, &skipped);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_card_start(1, 10, "Grace");
    }
}
