//! PDF preview of a document, rendered with `genpdf`.
//!
//! The preview lays out the same blocks as the `.docx` output with the same resolved styles, so a
//! paper can be proofread without a word processor.  It is not a converter: nothing is read back
//! from a saved file.  Fonts are discovered through [`crate::fonts`].

use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use genpdf::{Margins, Mm, Size};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::fonts::{self, FontConfig};
use crate::model::Document;
use crate::output::write_atomically;

mod convert;
mod decorator;
pub mod elements;

const FOOTER_HEIGHT_MM: f64 = 10.0;
const MM_PER_POINT: f64 = 25.4 / 72.0;

pub(crate) fn mm(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn points_to_mm(points: f32) -> f64 {
    f64::from(points) * MM_PER_POINT
}

/// Settings for a preview render.
pub struct PdfOptions {
    fonts: FontConfig,
    page_numbers: bool,
    #[cfg(feature = "bookmarks")]
    bookmarks: bool,
    #[cfg(feature = "hyphenation")]
    hyphenator: Option<hyphenation::Standard>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            fonts: FontConfig::default(),
            page_numbers: true,
            #[cfg(feature = "bookmarks")]
            bookmarks: true,
            #[cfg(feature = "hyphenation")]
            hyphenator: None,
        }
    }
}

impl PdfOptions {
    /// Creates options with default fonts, page numbers and (when enabled) bookmarks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the font configuration.
    pub fn with_fonts(mut self, fonts: FontConfig) -> Self {
        self.fonts = fonts;
        self
    }

    /// Returns the font configuration.
    pub fn fonts(&self) -> &FontConfig {
        &self.fonts
    }

    /// Enables or disables page numbers in the footer.
    pub fn with_page_numbers(mut self, page_numbers: bool) -> Self {
        self.page_numbers = page_numbers;
        self
    }

    /// Enables or disables the heading outline.
    #[cfg(feature = "bookmarks")]
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Enables hyphenation using the provided dictionary.
    #[cfg(feature = "hyphenation")]
    pub fn with_hyphenator(mut self, hyphenator: hyphenation::Standard) -> Self {
        self.hyphenator = Some(hyphenator);
        self
    }
}

/// A heading and the page it was placed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingPage {
    /// Heading level; 0 is the title.
    pub level: u8,
    /// Heading text.
    pub text: String,
    /// 1-based page number, `None` if the heading was never laid out.
    pub page: Option<usize>,
}

/// A rendered preview.
#[derive(Clone, Debug)]
pub struct PdfOutput {
    /// The PDF file contents.
    pub bytes: Vec<u8>,
    /// Headings in document order with their pages.
    pub headings: Vec<HeadingPage>,
    /// Number of pages laid out.
    pub pages: usize,
}

/// Renders `document` to PDF.
///
/// Fails with [`Error::MissingDependency`] when the body font family cannot be found even after
/// searching the system font directories.
pub fn render(document: &Document, options: PdfOptions) -> Result<PdfOutput> {
    let loaded = fonts::load_fonts(options.fonts())?;
    let mut pdf = genpdf::Document::new(loaded.body);
    let monospace = loaded.monospace.map(|family| pdf.add_font_family(family));

    let page = document.page();
    let paper = page.paper();
    pdf.set_paper_size(Size::new(
        mm(points_to_mm(paper.width)),
        mm(points_to_mm(paper.height)),
    ));
    if let Some(title) = &document.metadata().title {
        pdf.set_title(title.clone());
    }
    pdf.set_minimal_conformance();
    pdf.set_font_size(convert::font_size(document.default_style().size));

    let margins = page.margins();
    let pages = Rc::new(Cell::new(0));
    let mut decorator = decorator::PreviewDecorator::new(
        Margins::trbl(
            mm(points_to_mm(margins.top)),
            mm(points_to_mm(margins.right)),
            mm(points_to_mm(margins.bottom)),
            mm(points_to_mm(margins.left)),
        ),
        Rc::clone(&pages),
    );
    if options.page_numbers {
        decorator = decorator.with_page_numbers(mm(FOOTER_HEIGHT_MM));
    }
    pdf.set_page_decorator(decorator);

    #[cfg(feature = "hyphenation")]
    if let Some(hyphenator) = options.hyphenator {
        pdf.set_hyphenator(hyphenator);
    }

    let mut converter = convert::Converter::new(document, monospace, Rc::clone(&pages));
    for block in document.blocks() {
        converter.push_block(&mut pdf, block)?;
    }

    let mut bytes = Vec::new();
    pdf.render(&mut bytes)?;
    let headings = converter.into_headings();
    let page_count = pages.get();
    debug!(
        "rendered {} blocks to {} PDF pages ({} bytes)",
        document.len(),
        page_count,
        bytes.len()
    );

    #[cfg(feature = "bookmarks")]
    let bytes = if options.bookmarks {
        crate::bookmarks::apply_heading_bookmarks(&bytes, &headings)?
    } else {
        bytes
    };

    Ok(PdfOutput {
        bytes,
        headings,
        pages: page_count,
    })
}

/// Renders `document` and writes it to `path` atomically, returning the number of bytes written.
pub fn save(document: &Document, options: PdfOptions, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let output = render(document, options)?;

    let bytes = write_atomically(path, |file| {
        file.write_all(&output.bytes)
            .map_err(|source| Error::io(path, source))
    })?;

    info!(
        "wrote {} ({} pages, {} bytes)",
        path.display(),
        output.pages,
        bytes
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_convert_to_millimetres() {
        assert!((points_to_mm(72.0) - 25.4).abs() < 1e-9);
        assert!((points_to_mm(612.0) - 215.9).abs() < 1e-6);
    }

    #[test]
    fn default_options_number_pages() {
        let options = PdfOptions::new();
        assert!(options.page_numbers);
        assert_eq!(options.fonts(), &FontConfig::default());
    }
}
