//! CLI binary for idcard-forge.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `CardConfig` and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use idcard_forge::{
    generate, CardConfig, CardLayout, CardProgressCallback, CardSize, PageFormat, PhotoEncoding,
    PhotoFit, ProgressCallback, RenderOutcome, RunSummary,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over roster rows plus one log line for
/// every row that did not render cleanly.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>4}/{len} rows  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl CardProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_rows: usize) {
        self.bar.set_length(total_rows as u64);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn on_card_start(&self, _row: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_card_complete(&self, row: usize, total: usize, outcome: &RenderOutcome) {
        if let Some(issue) = outcome.issue() {
            self.bar.println(format!(
                "  {} Row {:>4}/{:<4}  {}",
                yellow("⚠"),
                row,
                total,
                issue
            ));
        }
        self.bar.inc(1);
    }

    fn on_card_skipped(&self, row: usize, total: usize, outcome: &RenderOutcome) {
        if let Some(issue) = outcome.issue() {
            self.bar.println(format!(
                "  {} Row {:>4}/{:<4}  skipped: {}",
                red("✗"),
                row,
                total,
                issue
            ));
        }
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Defaults: ute_id_template.png + employees.csv + photos/ → employee_ids.pdf
  idcards

  # Explicit inputs and output
  idcards --template art/front.png --records staff.csv --photos portraits -o out/badges.pdf

  # Cards on letter paper (top-left corner), lossless photos
  idcards --page-format letter --lossless

  # Custom placement from a JSON layout file, machine-readable summary
  idcards --layout layout.json --json > summary.json

ROSTER FORMAT:
  Comma-separated, header row required. Columns (any order, extras ignored):
    name, title, photo_path
  photo_path is relative to --photos and must end in .png, .jpg or .jpeg.

LAYOUT FILE (inches from the card's bottom-left corner, fonts in points):
  { "photo_box": { "x": 0.37, "y": 0.33, "width": 1.0, "height": 1.0 },
    "name_position": { "x": 1.7, "y": 1.05 },
    "title_position": { "x": 1.7, "y": 0.6 },
    "name_font_size": 10, "title_font_size": 8 }

EXIT STATUS:
  0 when the PDF was written (even if some rows were skipped or degraded),
  1 on a fatal error (bad template, unreadable roster, missing column,
  unwritable output).
"#;

/// Render employee ID cards from a CSV roster into a printable PDF.
#[derive(Parser, Debug)]
#[command(
    name = "idcards",
    version,
    about = "Render employee ID cards from a CSV roster into a printable PDF",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Background template image (PNG or JPEG).
    #[arg(long, env = "IDCARDS_TEMPLATE", default_value = "ute_id_template.png")]
    template: PathBuf,

    /// Roster CSV with name, title, photo_path columns.
    #[arg(long, env = "IDCARDS_RECORDS", default_value = "employees.csv")]
    records: PathBuf,

    /// Directory that photo_path values are relative to.
    #[arg(long, env = "IDCARDS_PHOTOS", default_value = "photos")]
    photos: PathBuf,

    /// Output PDF path.
    #[arg(short, long, env = "IDCARDS_OUTPUT", default_value = "employee_ids.pdf")]
    output: PathBuf,

    /// Print resolution for the template (72–1200).
    #[arg(long, env = "IDCARDS_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// Card width in inches.
    #[arg(long, env = "IDCARDS_CARD_WIDTH", default_value_t = CardSize::CR80.width)]
    card_width: f32,

    /// Card height in inches.
    #[arg(long, env = "IDCARDS_CARD_HEIGHT", default_value_t = CardSize::CR80.height)]
    card_height: f32,

    /// Page size: card (one trimmed card per page) or letter.
    #[arg(long, env = "IDCARDS_PAGE_FORMAT", value_enum, default_value = "card")]
    page_format: PageFormatArg,

    /// JSON file overriding the photo box, text positions and font sizes.
    #[arg(long, env = "IDCARDS_LAYOUT")]
    layout: Option<PathBuf>,

    /// Square photo resolution in pixels.
    #[arg(long, env = "IDCARDS_PHOTO_PIXELS", default_value_t = 300)]
    photo_pixels: u32,

    /// How non-square photos are fitted: stretch or crop.
    #[arg(long, env = "IDCARDS_PHOTO_FIT", value_enum, default_value = "stretch")]
    photo_fit: PhotoFitArg,

    /// JPEG quality for embedded photos (1–100).
    #[arg(long, env = "IDCARDS_JPEG_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Embed photos losslessly instead of as JPEG. Takes precedence over --jpeg-quality.
    #[arg(long, env = "IDCARDS_LOSSLESS")]
    lossless: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long, env = "IDCARDS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IDCARDS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IDCARDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IDCARDS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PageFormatArg {
    Card,
    Letter,
}

impl From<PageFormatArg> for PageFormat {
    fn from(v: PageFormatArg) -> Self {
        match v {
            PageFormatArg::Card => PageFormat::Card,
            PageFormatArg::Letter => PageFormat::Letter,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PhotoFitArg {
    Stretch,
    Crop,
}

impl From<PhotoFitArg> for PhotoFit {
    fn from(v: PhotoFitArg) -> Self {
        match v {
            PhotoFitArg::Stretch => PhotoFit::Stretch,
            PhotoFitArg::Crop => PhotoFit::Crop,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Row warnings are printed by the progress bar, so keep library logs at
    // ERROR while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn CardProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = generate(&config).context("ID card generation failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&summary, !show_progress);
    }

    Ok(())
}

/// Map CLI args to `CardConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CardConfig> {
    let layout = match cli.layout {
        Some(ref path) => CardLayout::from_json_file(path)
            .with_context(|| format!("Failed to load layout from {:?}", path))?,
        None => CardLayout::default(),
    };

    let encoding = if cli.lossless {
        PhotoEncoding::Lossless
    } else {
        PhotoEncoding::Jpeg {
            quality: cli.jpeg_quality,
        }
    };

    let mut builder = CardConfig::builder()
        .template_path(&cli.template)
        .records_path(&cli.records)
        .photo_dir(&cli.photos)
        .output_path(&cli.output)
        .dpi(cli.dpi)
        .card_size(CardSize {
            width: cli.card_width,
            height: cli.card_height,
        })
        .page_format(cli.page_format.clone().into())
        .layout(layout)
        .photo_pixels(cli.photo_pixels)
        .photo_fit(cli.photo_fit.clone().into())
        .photo_encoding(encoding);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Human-readable end-of-run report on stderr.
fn print_summary(summary: &RunSummary, list_issues: bool) {
    let mark = if summary.is_clean() {
        green("✔")
    } else {
        yellow("⚠")
    };
    eprintln!(
        "{}  {} pages  →  {}  {}",
        mark,
        bold(&summary.pages.to_string()),
        bold(&summary.output_path.display().to_string()),
        dim(&format!("{}ms", summary.duration_ms)),
    );
    eprintln!(
        "   {} clean  /  {} degraded  /  {} skipped",
        green(&summary.clean.to_string()),
        yellow(&summary.degraded.to_string()),
        red(&summary.skipped.to_string()),
    );

    // The progress bar already printed each issue as it happened.
    if list_issues {
        for report in &summary.outcomes {
            if let Some(issue) = report.outcome.issue() {
                eprintln!(
                    "   row {:>4} (line {})  {:<24} {}",
                    report.row,
                    report.line,
                    report.outcome.label(),
                    issue
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lossless_wins_over_jpeg_quality() {
        let cli = Cli::try_parse_from(["idcards", "--jpeg-quality", "80", "--lossless"])
            .expect("both flags are accepted together");
        let config = build_config(&cli, None).expect("config");
        assert_eq!(config.photo_encoding, PhotoEncoding::Lossless);
    }

    #[test]
    fn jpeg_quality_is_used_without_lossless() {
        let cli = Cli::try_parse_from(["idcards", "--jpeg-quality", "80"]).expect("parse");
        let config = build_config(&cli, None).expect("config");
        assert_eq!(config.photo_encoding, PhotoEncoding::Jpeg { quality: 80 });
    }

    #[test]
    fn infinite_card_size_is_rejected_before_running() {
        let cli = Cli::try_parse_from(["idcards", "--card-width", "inf", "--card-height", "inf"])
            .expect("clap accepts any f32");
        let err = build_config(&cli, None).unwrap_err();
        assert!(format!("{err:#}").contains("Card size"), "got: {err:#}");
    }

    #[test]
    fn page_format_and_fit_map_to_library_enums() {
        let cli = Cli::try_parse_from(["idcards", "--page-format", "letter", "--photo-fit", "crop"])
            .expect("parse");
        let config = build_config(&cli, None).expect("config");
        assert_eq!(config.page_format, PageFormat::Letter);
        assert_eq!(config.photo_fit, PhotoFit::Crop);
    }
}
