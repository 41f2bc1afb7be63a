//! Result types returned by a generation run.

use crate::error::CardIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Page drawn with background, photo and both text lines.
    Success,
    /// A required field was blank; no page was emitted.
    SkippedInvalidRecord { issue: CardIssue },
    /// Page drawn without a photo because none was found at the resolved path
    /// or its extension is not a recognised raster type.
    DegradedMissingPhoto { issue: CardIssue },
    /// Page drawn without a photo because decoding, resizing or encoding failed.
    DegradedPhotoError { issue: CardIssue },
    /// Page committed although a text line could not be drawn.
    DegradedTextError { issue: CardIssue },
}

impl RenderOutcome {
    /// Rank used to pick the single worst outcome of a card.
    pub fn severity(&self) -> u8 {
        match self {
            RenderOutcome::Success => 0,
            RenderOutcome::DegradedMissingPhoto { .. } => 1,
            RenderOutcome::DegradedPhotoError { .. } => 2,
            RenderOutcome::DegradedTextError { .. } => 3,
            RenderOutcome::SkippedInvalidRecord { .. } => 4,
        }
    }

    /// Keep whichever of `self` and `other` is more severe.
    ///
    /// Ties keep `self`, so the first problem seen wins.
    pub fn worst(self, other: RenderOutcome) -> RenderOutcome {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RenderOutcome::SkippedInvalidRecord { .. })
    }

    /// A page was committed but is missing a photo or text line.
    pub fn is_degraded(&self) -> bool {
        !self.is_success() && !self.is_skipped()
    }

    /// Whether this outcome consumed a page of the output document.
    pub fn emitted_page(&self) -> bool {
        !self.is_skipped()
    }

    /// The underlying issue, if any.
    pub fn issue(&self) -> Option<&CardIssue> {
        match self {
            RenderOutcome::Success => None,
            RenderOutcome::SkippedInvalidRecord { issue }
            | RenderOutcome::DegradedMissingPhoto { issue }
            | RenderOutcome::DegradedPhotoError { issue }
            | RenderOutcome::DegradedTextError { issue } => Some(issue),
        }
    }

    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            RenderOutcome::Success => "success",
            RenderOutcome::SkippedInvalidRecord { .. } => "skipped_invalid_record",
            RenderOutcome::DegradedMissingPhoto { .. } => "degraded_missing_photo",
            RenderOutcome::DegradedPhotoError { .. } => "degraded_photo_error",
            RenderOutcome::DegradedTextError { .. } => "degraded_text_error",
        }
    }
}

/// One entry of the outcome log: a row that was skipped or degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardReport {
    /// 1-indexed data row (the header is row 0).
    pub row: usize,
    /// Line in the roster file where the row starts.
    pub line: u64,
    /// Trimmed `name` field; may be empty for skipped rows.
    pub name: String,
    pub outcome: RenderOutcome,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Where the PDF was written.
    pub output_path: PathBuf,
    /// Pages in the output document (`clean + degraded`).
    pub pages: usize,
    /// Rows rendered without any issue.
    pub clean: usize,
    /// Rows rendered with a missing photo or text line.
    pub degraded: usize,
    /// Rows with a blank required field; no page emitted.
    pub skipped: usize,
    /// Every skipped or degraded row, in roster order.
    pub outcomes: Vec<CardReport>,
    /// Wall-clock time for the whole run.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Rows read from the roster.
    pub fn total_rows(&self) -> usize {
        self.clean + self.degraded + self.skipped
    }

    /// True when every row produced a clean card.
    pub fn is_clean(&self) -> bool {
        self.degraded == 0 && self.skipped == 0
    }
}
