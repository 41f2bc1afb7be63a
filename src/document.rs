//! Output document: the drawing surface cards are composited onto.
//!
//! [`CardCanvas`] is the small set of primitives the renderer needs: place an
//! image in a rectangle, draw a string at a baseline, start a new page. All
//! coordinates are PDF points (1/72 in) from the page's bottom-left corner.
//!
//! [`PdfCardDocument`] implements it with `pdf-writer`. Text uses the
//! base-14 Helvetica faces with WinAnsi encoding, so no font files are
//! needed; strings with characters outside WinAnsi are rejected with a
//! [`TextError`] rather than printed as garbage.
//!
//! [`OutputFile`] reserves the destination up front and writes the finished
//! bytes atomically (temp file in the same directory, then rename), so a run
//! that aborts never leaves a truncated PDF behind.

use crate::error::IdCardError;
use crate::pipeline::encode::{EncodedImage, ImageFilter};
use crate::pipeline::template::Template;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Font face for a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// A rectangle on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Why a string could not be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// The character has no glyph in the font's encoding.
    #[error("character {ch:?} (U+{code:04X}) cannot be encoded for the PDF font", code = *ch as u32)]
    Unencodable { ch: char },
}

/// Drawing primitives used by the card renderer.
pub trait CardCanvas {
    /// Draw the run's template into `area`.
    fn draw_background(&mut self, template: &Template, area: PageRect);

    /// Draw an encoded image scaled into `area`.
    fn draw_image(&mut self, image: &EncodedImage, area: PageRect);

    /// Draw `text` with its baseline starting at (`x`, `y`).
    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: FontStyle,
        size: f32,
    ) -> Result<(), TextError>;

    /// Commit the current page and start a fresh one.
    fn show_page(&mut self);

    /// Pages committed so far.
    fn page_count(&self) -> usize;
}

// ── pdf-writer backend ───────────────────────────────────────────────────

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");
const BACKGROUND: &str = "Bg";

/// A multi-page PDF assembled in memory.
pub struct PdfCardDocument {
    pdf: Pdf,
    page_width: f32,
    page_height: f32,
    next_id: i32,
    catalog_id: Ref,
    page_tree_id: Ref,
    font_regular_id: Ref,
    font_bold_id: Ref,
    /// Template XObjects keyed by source path and size. Each is written on
    /// first use and shared by every page that draws it.
    backgrounds: Vec<(PathBuf, (u32, u32), Ref)>,
    pages: Vec<Ref>,
    content: Content,
    /// XObjects referenced by the page being drawn.
    page_images: Vec<(String, Ref)>,
    dirty: bool,
}

impl PdfCardDocument {
    /// Start an empty document whose pages are `page_width` × `page_height` points.
    pub fn new(page_width: f32, page_height: f32) -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_regular_id = Ref::new(3);
        let font_bold_id = Ref::new(4);

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.type1_font(font_regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(font_bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            page_width,
            page_height,
            next_id: 5,
            catalog_id,
            page_tree_id,
            font_regular_id,
            font_bold_id,
            backgrounds: Vec::new(),
            pages: Vec::new(),
            content: Content::new(),
            page_images: Vec::new(),
            dirty: false,
        }
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn write_xobject(&mut self, image: &EncodedImage) -> Ref {
        let id = self.alloc();
        let mut xobject = self.pdf.image_xobject(id, &image.data);
        xobject.filter(match image.filter {
            ImageFilter::Flate => Filter::FlateDecode,
            ImageFilter::Dct => Filter::DctDecode,
        });
        xobject.width(image.width as i32);
        xobject.height(image.height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
        id
    }

    fn place(&mut self, name: &str, area: PageRect) {
        self.content.save_state();
        self.content
            .transform([area.width, 0.0, 0.0, area.height, area.x, area.y]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
        self.dirty = true;
    }

    /// Serialise the document. A page with pending content is committed first.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.dirty {
            self.show_page();
        }
        let count = self.pages.len() as i32;
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.pages.iter().copied())
            .count(count);
        debug!(
            "Serialising PDF: {} pages, catalog {:?}",
            count, self.catalog_id
        );
        self.pdf.finish()
    }
}

impl CardCanvas for PdfCardDocument {
    fn draw_background(&mut self, template: &Template, area: PageRect) {
        let key = (template.path(), template.dimensions());
        let cached = self
            .backgrounds
            .iter()
            .position(|(path, dims, _)| (path.as_path(), *dims) == key);
        let (index, id) = match cached {
            Some(index) => (index, self.backgrounds[index].2),
            None => {
                let id = self.write_xobject(template.image());
                self.backgrounds
                    .push((template.path().to_path_buf(), template.dimensions(), id));
                (self.backgrounds.len() - 1, id)
            }
        };
        let name = format!("{BACKGROUND}{index}");
        if !self.page_images.iter().any(|(n, _)| *n == name) {
            self.page_images.push((name.clone(), id));
        }
        self.place(&name, area);
    }

    fn draw_image(&mut self, image: &EncodedImage, area: PageRect) {
        let id = self.write_xobject(image);
        let name = format!("Im{}", self.page_images.len());
        self.page_images.push((name.clone(), id));
        self.place(&name, area);
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: FontStyle,
        size: f32,
    ) -> Result<(), TextError> {
        let encoded = encode_win_ansi(text)?;
        let font = match style {
            FontStyle::Regular => FONT_REGULAR,
            FontStyle::Bold => FONT_BOLD,
        };
        self.content.begin_text();
        self.content.set_font(font, size);
        self.content.next_line(x, y);
        self.content.show(Str(&encoded));
        self.content.end_text();
        self.dirty = true;
        Ok(())
    }

    fn show_page(&mut self) {
        let page_id = self.alloc();
        let content_id = self.alloc();
        let content = std::mem::replace(&mut self.content, Content::new()).finish();
        self.pdf.stream(content_id, &content);

        let images = std::mem::take(&mut self.page_images);
        let mut page = self.pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height));
        page.parent(self.page_tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        resources
            .fonts()
            .pair(FONT_REGULAR, self.font_regular_id)
            .pair(FONT_BOLD, self.font_bold_id);
        if !images.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, id) in &images {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
        }
        resources.finish();
        page.finish();

        self.pages.push(page_id);
        self.dirty = false;
        debug!("Committed page {} ({} images)", self.pages.len(), images.len());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Encode `text` as WinAnsi (Windows-1252) bytes.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, TextError> {
    text.chars()
        .map(|ch| win_ansi_byte(ch).ok_or(TextError::Unencodable { ch }))
        .collect()
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

// ── Destination file ─────────────────────────────────────────────────────

/// The destination PDF, reserved before rendering and written atomically.
///
/// Dropping an `OutputFile` without calling [`OutputFile::commit`] removes
/// the temporary file and leaves any existing destination untouched.
pub struct OutputFile {
    path: PathBuf,
    tmp: NamedTempFile,
}

impl OutputFile {
    /// Create parent directories and a temporary file beside `path`.
    pub fn open(path: &Path) -> Result<Self, IdCardError> {
        let open_err = |source: std::io::Error| IdCardError::OutputOpenFailed {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(open_err)?;
        let tmp = tempfile::Builder::new()
            .prefix(".idcards-")
            .suffix(".pdf.tmp")
            .tempfile_in(&parent)
            .map_err(open_err)?;
        debug!("Reserved output {} via {}", path.display(), tmp.path().display());
        Ok(Self {
            path: path.to_path_buf(),
            tmp,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `bytes` and move them into place.
    pub fn commit(mut self, bytes: &[u8]) -> Result<(), IdCardError> {
        let write_err = |source: std::io::Error| IdCardError::OutputWriteFailed {
            path: self.path.clone(),
            source,
        };
        self.tmp.write_all(bytes).map_err(write_err)?;
        self.tmp.as_file().sync_all().map_err(write_err)?;
        self.tmp
            .persist(&self.path)
            .map_err(|e| IdCardError::OutputWriteFailed {
                path: self.path.clone(),
                source: e.error,
            })?;
        info!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_pages(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        text.matches("/Type /Page").count() - text.matches("/Type /Pages").count()
    }

    #[test]
    fn win_ansi_maps_latin1_and_specials() {
        assert_eq!(encode_win_ansi("Zoë €5").unwrap(), b"Zo\xEB \x805".to_vec());
        assert_eq!(encode_win_ansi("“Ops”").unwrap(), b"\x93Ops\x94".to_vec());
    }

    #[test]
    fn win_ansi_rejects_cjk_and_controls() {
        assert_eq!(
            encode_win_ansi("王").unwrap_err(),
            TextError::Unencodable { ch: '王' }
        );
        assert!(encode_win_ansi("a\tb").is_err());
    }

    #[test]
    fn empty_document_is_valid_pdf() {
        let doc = PdfCardDocument::new(243.0, 153.0);
        assert_eq!(doc.page_count(), 0);
        let bytes = doc.into_bytes();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(count_pages(&bytes), 0);
    }

    #[test]
    fn pages_and_text_are_written() {
        let mut doc = PdfCardDocument::new(243.0, 153.0);
        doc.draw_text("Ada", 10.0, 20.0, FontStyle::Bold, 10.0)
            .expect("draw");
        doc.show_page();
        doc.draw_text("Grace", 10.0, 20.0, FontStyle::Regular, 8.0)
            .expect("draw");
        doc.show_page();
        assert_eq!(doc.page_count(), 2);

        let bytes = doc.into_bytes();
        assert_eq!(count_pages(&bytes), 2);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Helvetica-Bold"));
        assert!(text.contains("(Ada) Tj"), "content streams are uncompressed");
    }

    #[test]
    fn unencodable_text_draws_nothing() {
        let mut doc = PdfCardDocument::new(100.0, 100.0);
        assert!(doc
            .draw_text("日本", 0.0, 0.0, FontStyle::Regular, 8.0)
            .is_err());
        assert!(!doc.dirty);
    }

    fn solid_template(dir: &Path, name: &str, colour: [u8; 3]) -> Template {
        let path = dir.join(name);
        image::RgbImage::from_pixel(20, 10, image::Rgb(colour))
            .save(&path)
            .expect("save template");
        crate::pipeline::template::prepare(&path, (20, 10), 72).expect("prepare")
    }

    fn count_images(pdf: &[u8]) -> usize {
        String::from_utf8_lossy(pdf)
            .matches("/Subtype /Image")
            .count()
    }

    #[test]
    fn same_template_is_embedded_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let template = solid_template(dir.path(), "front.png", [10, 20, 30]);
        let area = PageRect {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 10.0,
        };

        let mut doc = PdfCardDocument::new(20.0, 10.0);
        for _ in 0..3 {
            doc.draw_background(&template, area);
            doc.show_page();
        }
        assert_eq!(count_images(&doc.into_bytes()), 1);
    }

    #[test]
    fn different_templates_get_their_own_background() {
        let dir = tempfile::tempdir().expect("tempdir");
        let front = solid_template(dir.path(), "front.png", [10, 20, 30]);
        let back = solid_template(dir.path(), "back.png", [200, 0, 0]);
        let area = PageRect {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 10.0,
        };

        let mut doc = PdfCardDocument::new(20.0, 10.0);
        doc.draw_background(&front, area);
        doc.show_page();
        doc.draw_background(&back, area);
        doc.show_page();
        doc.draw_background(&front, area);
        doc.show_page();

        assert_eq!(doc.backgrounds.len(), 2);
        assert_eq!(count_images(&doc.into_bytes()), 2);
    }

    #[test]
    fn output_file_commits_atomically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/out/cards.pdf");
        let out = OutputFile::open(&path).expect("open");
        assert!(!path.exists(), "nothing written before commit");
        out.commit(b"%PDF-1.7 test").expect("commit");
        assert_eq!(std::fs::read(&path).expect("read"), b"%PDF-1.7 test");
    }

    #[test]
    fn dropped_output_file_leaves_no_trace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cards.pdf");
        drop(OutputFile::open(&path).expect("open"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).expect("ls").count(), 0);
    }
}
