//! Custom `genpdf` elements used by the preview.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Size};

use super::decorator::PageCounter;

/// Wraps an element and records the page on which it first produced output.
pub(crate) struct Anchored<E> {
    inner: E,
    pages: PageCounter,
    page: Rc<Cell<Option<usize>>>,
}

impl<E> Anchored<E> {
    pub(crate) fn new(inner: E, pages: PageCounter) -> Self {
        Self {
            inner,
            pages,
            page: Rc::new(Cell::new(None)),
        }
    }

    /// Handle that reads the recorded page after rendering.
    pub(crate) fn page_slot(&self) -> Rc<Cell<Option<usize>>> {
        Rc::clone(&self.page)
    }
}

impl<E: Element> Element for Anchored<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        // an element that did not fit is retried on the next page
        if self.page.get().is_none() && result.size.height > Mm::default() {
            self.page.set(Some(self.pages.get()));
        }
        Ok(result)
    }
}

/// Lines of text printed verbatim: no wrapping, whitespace preserved.
///
/// Lines wider than the area overflow to the right instead of wrapping, so ASCII-art keeps its
/// shape.  When the page fills up, rendering resumes with the next line on the following page.
pub struct PreformattedText {
    lines: Vec<String>,
    style: Style,
    alignment: Alignment,
    next_line: usize,
}

impl PreformattedText {
    /// Creates the element from raw text, splitting it into lines.
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(|line| line.replace('\t', "    ")).collect(),
            style: Style::new(),
            alignment: Alignment::Left,
            next_line: 0,
        }
    }

    /// Sets the text style and returns the updated element.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the alignment of the block and returns the updated element.
    ///
    /// All lines share the offset of the widest line, so columns stay aligned.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

impl Element for PreformattedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        let line_height = style.line_height(&context.font_cache);

        let mut block_width = Mm::default();
        for line in &self.lines {
            let width = StyledString::new(line.clone(), style).width(&context.font_cache);
            if width > block_width {
                block_width = width;
            }
        }

        let available_width = area.size().width;
        let x_offset = if block_width >= available_width {
            Mm::default()
        } else {
            match self.alignment {
                Alignment::Left => Mm::default(),
                Alignment::Center => (available_width - block_width) / 2.0,
                Alignment::Right => available_width - block_width,
            }
        };

        let mut result = RenderResult::default();
        while let Some(line) = self.lines.get(self.next_line) {
            if line_height > area.size().height {
                result.has_more = true;
                return Ok(result);
            }

            if !line.trim_end().is_empty() {
                match area.text_section(&context.font_cache, Position::new(x_offset, 0), style) {
                    Some(mut section) => section.print_str(line.trim_end(), style)?,
                    None => {
                        result.has_more = true;
                        return Ok(result);
                    }
                }
            }

            area.add_offset(Position::new(0, line_height));
            result.size = result
                .size
                .stack_vertical(Size::new(block_width, line_height));
            self.next_line += 1;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preformatted_text_keeps_lines_and_expands_tabs() {
        let text = PreformattedText::new("+--+\n|\tx|\n+--+");
        assert_eq!(text.line_count(), 3);
        assert_eq!(text.lines[1], "|    x|");
    }

    #[test]
    fn anchored_starts_without_page() {
        let pages: PageCounter = Rc::new(Cell::new(3));
        let anchored = Anchored::new(PreformattedText::new("x"), pages);
        assert_eq!(anchored.page_slot().get(), None);
    }
}
