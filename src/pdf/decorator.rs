//! Page decoration for the PDF preview: margins, page counting and page-number footers.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::elements::Paragraph;
use genpdf::error::{Error, ErrorKind};
use genpdf::style;
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, Position};

/// Shared, 1-based number of the page currently being laid out.
pub(crate) type PageCounter = Rc<Cell<usize>>;

pub(crate) struct PreviewDecorator {
    pages: PageCounter,
    margins: Margins,
    footer_height: Option<Mm>,
}

impl PreviewDecorator {
    pub(crate) fn new(margins: Margins, pages: PageCounter) -> Self {
        Self {
            pages,
            margins,
            footer_height: None,
        }
    }

    /// Reserves `height` at the bottom of every page for a centered page number.
    pub(crate) fn with_page_numbers(mut self, height: Mm) -> Self {
        self.footer_height = Some(height);
        self
    }
}

impl PageDecorator for PreviewDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.pages.get() + 1;
        self.pages.set(page);

        area.add_margins(self.margins);

        if let Some(height) = self.footer_height {
            let available = area.size().height;
            if height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - height));
            let mut footer = Paragraph::new(page.to_string()).aligned(Alignment::Center);
            let result = footer.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Page number does not fit into the reserved footer",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - height);
        }

        Ok(area)
    }
}
