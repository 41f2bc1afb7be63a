//! Card rendering: composite one roster row onto one page.
//!
//! The renderer is the boundary where row-local failures stop. A missing or
//! broken photo, or a line of text the font cannot encode, is logged,
//! converted into a [`RenderOutcome`], and the page is committed anyway.
//! Only a blank required field prevents a page from being emitted.

use crate::config::{CardConfig, Position, Region, POINTS_PER_INCH};
use crate::document::{CardCanvas, FontStyle, PageRect};
use crate::error::CardIssue;
use crate::output::RenderOutcome;
use crate::pipeline::photo;
use crate::pipeline::records::EmployeeRecord;
use crate::pipeline::template::Template;
use tracing::{debug, warn};

/// Card placement on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFrame {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

impl CardFrame {
    /// Where the card sits on the page for `config`'s page format.
    pub fn for_config(config: &CardConfig) -> Self {
        let (x, y) = config.page_format.card_origin(config.card_size);
        Self {
            origin_x: x * POINTS_PER_INCH,
            origin_y: y * POINTS_PER_INCH,
            width: config.card_size.width * POINTS_PER_INCH,
            height: config.card_size.height * POINTS_PER_INCH,
        }
    }

    /// The whole card.
    pub fn card_rect(&self) -> PageRect {
        PageRect {
            x: self.origin_x,
            y: self.origin_y,
            width: self.width,
            height: self.height,
        }
    }

    /// A card-relative region, in inches, mapped to page points.
    pub fn region(&self, r: Region) -> PageRect {
        PageRect {
            x: self.origin_x + r.x * POINTS_PER_INCH,
            y: self.origin_y + r.y * POINTS_PER_INCH,
            width: r.width * POINTS_PER_INCH,
            height: r.height * POINTS_PER_INCH,
        }
    }

    /// A card-relative point, in inches, mapped to page points.
    pub fn point(&self, p: Position) -> (f32, f32) {
        (
            self.origin_x + p.x * POINTS_PER_INCH,
            self.origin_y + p.y * POINTS_PER_INCH,
        )
    }
}

/// Draw one card for `record`, returning the worst thing that happened.
///
/// Never fails: every problem is reported through the returned outcome.
/// Exactly one page is committed unless the outcome is
/// [`RenderOutcome::SkippedInvalidRecord`].
pub fn render_card<C: CardCanvas + ?Sized>(
    canvas: &mut C,
    template: &Template,
    record: &EmployeeRecord,
    config: &CardConfig,
) -> RenderOutcome {
    // Step 1: validity
    let missing = record.missing_fields();
    if !missing.is_empty() {
        warn!(
            "Row {} (line {}): skipping, empty field(s): {}",
            record.row,
            record.line,
            missing.join(", ")
        );
        return RenderOutcome::SkippedInvalidRecord {
            issue: CardIssue::MissingFields { fields: missing },
        };
    }

    let frame = CardFrame::for_config(config);
    let mut outcome = RenderOutcome::Success;

    // Step 2: background
    canvas.draw_background(template, frame.card_rect());

    // Step 3: photo
    match photo::locate(&config.photo_dir, &record.photo_path) {
        Err(issue) => {
            warn!("Row {} ({}): {}", record.row, record.name, issue);
            outcome = outcome.worst(RenderOutcome::DegradedMissingPhoto { issue });
        }
        Ok(path) => match photo::load(
            &path,
            config.photo_pixels,
            config.photo_fit,
            config.photo_encoding,
        ) {
            Ok(image) => {
                debug!(
                    "Row {}: placing {} ({} bytes)",
                    record.row,
                    path.display(),
                    image.data.len()
                );
                canvas.draw_image(&image, frame.region(config.layout.photo_box));
            }
            Err(issue) => {
                warn!("Row {} ({}): {}", record.row, record.name, issue);
                outcome = outcome.worst(RenderOutcome::DegradedPhotoError { issue });
            }
        },
    }

    // Step 4: text
    let layout = &config.layout;
    let lines = [
        (
            "name",
            record.name.as_str(),
            layout.name_position,
            FontStyle::Bold,
            layout.name_font_size,
        ),
        (
            "title",
            record.title.as_str(),
            layout.title_position,
            FontStyle::Regular,
            layout.title_font_size,
        ),
    ];
    for (field, text, position, style, size) in lines {
        let (x, y) = frame.point(position);
        if let Err(e) = canvas.draw_text(text, x, y, style, size) {
            let issue = CardIssue::TextDrawing {
                field: field.to_string(),
                detail: e.to_string(),
            };
            warn!("Row {} ({}): {}", record.row, record.name, issue);
            outcome = outcome.worst(RenderOutcome::DegradedTextError { issue });
        }
    }

    // Step 5: commit, whatever happened above
    canvas.show_page();
    outcome
}
