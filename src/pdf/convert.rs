//! Maps document blocks onto `genpdf` elements.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::elements::{Break, FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::fonts::{Font, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Element, Margins};

use super::decorator::PageCounter;
use super::elements::{Anchored, PreformattedText};
use super::{mm, points_to_mm, HeadingPage};
use crate::error::Result;
use crate::model::{self, Block, Document, Heading};
use crate::style::{EffectiveStyle, HorizontalAlignment, Indent, Rgb, Role, Spacing};
use crate::table::Table;

const CELL_PADDING_MM: f64 = 1.0;
const TABLE_SPACING_MM: f64 = 3.0;
const REFERENCE_INDENT_PT: f32 = 18.0;

struct HeadingAnchor {
    level: u8,
    text: String,
    page: Rc<Cell<Option<usize>>>,
}

/// Converts blocks one at a time, remembering where headings were placed.
pub(crate) struct Converter<'a> {
    document: &'a Document,
    monospace: Option<FontFamily<Font>>,
    pages: PageCounter,
    headings: Vec<HeadingAnchor>,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(
        document: &'a Document,
        monospace: Option<FontFamily<Font>>,
        pages: PageCounter,
    ) -> Self {
        Self {
            document,
            monospace,
            pages,
            headings: Vec::new(),
        }
    }

    /// Appends the element(s) for `block` to `pdf`.
    pub(crate) fn push_block(&mut self, pdf: &mut genpdf::Document, block: &Block) -> Result<()> {
        let document = self.document;
        let block_style = document.block_style(block);
        let effective = document.resolve_layers([&block_style]);
        let theme = document.theme();

        match block {
            Block::Heading(heading) => self.push_heading(pdf, heading, &effective),
            Block::Paragraph(paragraph) => {
                if paragraph.is_empty() {
                    pdf.push(Break::new(1));
                    return Ok(());
                }
                let mut element = Paragraph::default();
                for span in paragraph.spans() {
                    if span.text().is_empty() {
                        continue;
                    }
                    let run = document.resolve_layers([&block_style, span.style()]);
                    element.push(StyledString::new(flatten(span.text()), self.style(&run)));
                }
                element.set_alignment(alignment(effective.alignment));
                let spacing = paragraph
                    .spacing()
                    .unwrap_or_else(|| theme.spacing_for(Role::Body));
                pdf.push(element.padded(margins(spacing, paragraph.indent())));
            }
            Block::Table(table) => self.push_table(pdf, table)?,
            Block::Diagram(diagram) => {
                let element = PreformattedText::new(diagram.text())
                    .with_style(self.style(&effective))
                    .with_alignment(alignment(effective.alignment));
                pdf.push(element.padded(margins(
                    theme.spacing_for(Role::Diagram),
                    Indent::default(),
                )));
            }
            Block::Equation(equation) => {
                let text = match equation.label() {
                    Some(label) => format!("{}    {}", equation.text(), label),
                    None => equation.text().to_owned(),
                };
                let element = self
                    .paragraph(&text, &effective)
                    .padded(margins(theme.spacing_for(Role::Equation), Indent::default()));
                pdf.push(element);
            }
            Block::Caption(text) => {
                let element = self
                    .paragraph(text, &effective)
                    .padded(margins(theme.spacing_for(Role::Caption), Indent::default()));
                pdf.push(element);
            }
            Block::Reference(reference) => {
                let text = format!("{}{}", reference.marker(), reference.text());
                let element = self.paragraph(&text, &effective).padded(margins(
                    theme.spacing_for(Role::Reference),
                    Indent::left(REFERENCE_INDENT_PT),
                ));
                pdf.push(element);
            }
            Block::PageBreak => pdf.push(PageBreak::new()),
        }
        Ok(())
    }

    /// Pages the headings landed on, in document order.
    pub(crate) fn into_headings(self) -> Vec<HeadingPage> {
        self.headings
            .into_iter()
            .map(|anchor| HeadingPage {
                level: anchor.level,
                text: anchor.text,
                page: anchor.page.get(),
            })
            .collect()
    }

    fn push_heading(
        &mut self,
        pdf: &mut genpdf::Document,
        heading: &Heading,
        effective: &EffectiveStyle,
    ) {
        let spacing = self.document.theme().spacing_for(heading.role());
        let paragraph = self
            .paragraph(heading.text(), effective)
            .padded(margins(spacing, Indent::default()));
        let element = Anchored::new(paragraph, Rc::clone(&self.pages));
        self.headings.push(HeadingAnchor {
            level: heading.level().min(model::MAX_HEADING_LEVEL),
            text: heading.text().to_owned(),
            page: element.page_slot(),
        });
        pdf.push(element);
    }

    fn push_table(&self, pdf: &mut genpdf::Document, table: &Table) -> Result<()> {
        let mut layout = TableLayout::new(vec![1; table.column_count()]);
        if table.is_bordered() {
            layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        }
        let padding = Margins::trbl(
            mm(CELL_PADDING_MM),
            mm(CELL_PADDING_MM),
            mm(CELL_PADDING_MM),
            mm(CELL_PADDING_MM),
        );
        for (row_index, cells) in table.rows().iter().enumerate() {
            let mut row = layout.row();
            for (column, cell) in cells.iter().enumerate() {
                let style = self
                    .document
                    .resolve_layers([&table.cell_style(row_index, column)]);
                row.push_element(self.paragraph(cell.text(), &style).padded(padding));
            }
            row.push()?;
        }
        pdf.push(layout.padded(Margins::trbl(
            mm(TABLE_SPACING_MM),
            0,
            mm(TABLE_SPACING_MM),
            0,
        )));
        Ok(())
    }

    fn paragraph(&self, text: &str, effective: &EffectiveStyle) -> Paragraph {
        Paragraph::new(StyledString::new(flatten(text), self.style(effective)))
            .aligned(alignment(effective.alignment))
    }

    fn style(&self, effective: &EffectiveStyle) -> Style {
        let mut style = Style::new().with_font_size(font_size(effective.size));
        if effective.bold {
            style = style.bold();
        }
        if effective.italic {
            style = style.italic();
        }
        if let Some(Rgb(r, g, b)) = effective.color {
            style = style.with_color(Color::Rgb(r, g, b));
        }
        if is_monospace(&effective.font_family) {
            if let Some(family) = self.monospace {
                style = style.with_font_family(family);
            }
        }
        style
    }
}

/// `genpdf` has no justified alignment; justified text is set flush left.
fn alignment(alignment: HorizontalAlignment) -> Alignment {
    match alignment {
        HorizontalAlignment::Left | HorizontalAlignment::Justified => Alignment::Left,
        HorizontalAlignment::Center => Alignment::Center,
        HorizontalAlignment::Right => Alignment::Right,
    }
}

fn margins(spacing: Spacing, indent: Indent) -> Margins {
    Margins::trbl(
        mm(points_to_mm(spacing.before)),
        0,
        mm(points_to_mm(spacing.after)),
        mm(points_to_mm(indent.left.max(0.0))),
    )
}

pub(super) fn font_size(points: f32) -> u8 {
    points.round().clamp(1.0, f32::from(u8::MAX)) as u8
}

fn is_monospace(family: &str) -> bool {
    let family = family.to_ascii_lowercase();
    ["mono", "courier", "consolas", "menlo"]
        .iter()
        .any(|needle| family.contains(needle))
}

// paragraphs wrap on their own; hard breaks and tabs would print as missing glyphs
fn flatten(text: &str) -> String {
    text.replace(['\n', '\t'], " ")
}
