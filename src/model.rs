//! Data structures describing the logical content of a document.
//!
//! A [`Document`] is an ordered list of [`Block`]s plus page geometry, a default text style and a
//! [`Theme`].  Blocks are only ever appended; their order is the reading order of the saved file.
//! Nothing in this module touches the filesystem except [`Document::save`], which delegates to
//! [`crate::docx`].

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::richtext::{self, MarkupError, Span};
use crate::style::{resolve, EffectiveStyle, HorizontalAlignment, Indent, Role, Spacing, Style, Theme};
use crate::table::{Cell, MalformedTableError, Table};

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;
/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;
/// Deepest heading level a word processor distinguishes.
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Converts inches to points.
pub fn inches(value: f32) -> f32 {
    value * POINTS_PER_INCH
}

/// Converts millimetres to points.
pub fn millimetres(value: f32) -> f32 {
    value / MM_PER_INCH * POINTS_PER_INCH
}

/// Physical paper size in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaperSize {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
}

impl PaperSize {
    /// US Letter, 8.5 × 11 in.
    pub const LETTER: PaperSize = PaperSize {
        width: 612.0,
        height: 792.0,
    };
    /// ISO A4, 210 × 297 mm.
    pub const A4: PaperSize = PaperSize {
        width: 595.28,
        height: 841.89,
    };

    /// Creates a paper size from a width and height in points.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Page margins in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageMargins {
    /// Top margin.
    pub top: f32,
    /// Right margin.
    pub right: f32,
    /// Bottom margin.
    pub bottom: f32,
    /// Left margin.
    pub left: f32,
}

impl PageMargins {
    /// Creates margins from top, right, bottom and left values in points.
    pub fn trbl(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same margin on every side, in points.
    pub fn uniform(value: f32) -> Self {
        Self::trbl(value, value, value, value)
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::uniform(inches(1.0))
    }
}

/// Page geometry shared by every page of the document.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageConfig {
    paper: PaperSize,
    margins: PageMargins,
}

impl PageConfig {
    /// Creates a page configuration.
    pub fn new(paper: PaperSize, margins: PageMargins) -> Self {
        Self { paper, margins }
    }

    /// Returns the paper size.
    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    /// Returns the margins.
    pub fn margins(&self) -> PageMargins {
        self.margins
    }

    /// Width available for text between the left and right margins, in points.
    pub fn text_width(&self) -> f32 {
        (self.paper.width - self.margins.left - self.margins.right).max(0.0)
    }
}

/// A heading.  Level 0 is the document title; levels 1 and up are section headings.
#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
    level: u8,
    text: String,
}

impl Heading {
    /// Creates a heading of the given level.
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Returns the level as requested by the caller.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns the heading text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true for the document title.
    pub fn is_title(&self) -> bool {
        self.level == 0
    }

    /// Theme role of the heading.
    pub fn role(&self) -> Role {
        if self.is_title() {
            Role::Title
        } else {
            Role::Heading(self.level)
        }
    }
}

/// Rich text paragraph carrying inline styling, alignment and layout metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    spans: Vec<Span>,
    style: Style,
    indent: Indent,
    spacing: Option<Spacing>,
}

impl Paragraph {
    /// Creates a paragraph holding a single unstyled span.
    pub fn new(text: impl Into<String>) -> Self {
        Self::from_spans(vec![Span::new(text)])
    }

    /// Creates a paragraph from the provided spans.
    pub fn from_spans(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    /// Creates a paragraph from inline markup, see [`richtext::parse_markup`].
    ///
    /// Literal `[`, `]`, `{`, `}` and `*` must be escaped with a backslash.
    pub fn markup(input: &str) -> std::result::Result<Self, MarkupError> {
        richtext::parse_markup(input).map(Self::from_spans)
    }

    /// Creates an empty paragraph, used as vertical spacing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a bulleted, left-indented list item.
    pub fn bullet(text: impl Into<String>) -> Self {
        Self::from_spans(vec![Span::new("• ").bold(), Span::new(text)]).indented(Indent::left(18.0))
    }

    /// Creates a paragraph whose leading label is bold, e.g. `Keywords: …`.
    pub fn labeled(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::from_spans(vec![Span::new(label).bold(), Span::new(text)])
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the paragraph-level overrides.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Returns the configured alignment override, if any.
    pub fn alignment(&self) -> Option<HorizontalAlignment> {
        self.style.alignment()
    }

    /// Returns the indentation.
    pub fn indent(&self) -> Indent {
        self.indent
    }

    /// Returns the spacing override, if any.
    pub fn spacing(&self) -> Option<Spacing> {
        self.spacing
    }

    /// Returns the concatenated text of all spans.
    pub fn text(&self) -> String {
        richtext::plain_text(&self.spans)
    }

    /// Returns true when the paragraph holds no text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.text().is_empty())
    }

    /// Appends a span and returns the updated paragraph.
    pub fn with_span(mut self, span: impl Into<Span>) -> Self {
        self.spans.push(span.into());
        self
    }

    /// Sets the alignment and returns the updated paragraph.
    pub fn aligned(mut self, alignment: HorizontalAlignment) -> Self {
        self.style = self.style.aligned(alignment);
        self
    }

    /// Layers `style` over the current overrides and returns the updated paragraph.
    pub fn styled(mut self, style: Style) -> Self {
        self.style.apply(&style);
        self
    }

    /// Sets the indentation and returns the updated paragraph.
    pub fn indented(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the spacing and returns the updated paragraph.
    pub fn spaced(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }
}

impl From<&str> for Paragraph {
    fn from(text: &str) -> Self {
        Paragraph::new(text)
    }
}

impl From<String> for Paragraph {
    fn from(text: String) -> Self {
        Paragraph::new(text)
    }
}

impl From<Vec<Span>> for Paragraph {
    fn from(spans: Vec<Span>) -> Self {
        Paragraph::from_spans(spans)
    }
}

/// Raw monospace text such as an ASCII-art diagram.
///
/// Whitespace is preserved verbatim; `\r\n` and `\r` line endings are stored as `\n`.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagram {
    text: String,
    style: Style,
}

impl Diagram {
    /// Creates a diagram from raw text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text: richtext::normalize_line_breaks(&text).into_owned(),
            style: Style::new(),
        }
    }

    /// Returns the raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the lines of the diagram; a trailing newline yields a final empty line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Returns the diagram-level overrides.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Layers `style` over the current overrides and returns the updated diagram.
    pub fn styled(mut self, style: Style) -> Self {
        self.style.apply(&style);
        self
    }
}

/// An equation written as plain text or Unicode, optionally numbered.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    text: String,
    label: Option<String>,
}

impl Equation {
    /// Creates an equation with an optional label such as `(3)`.
    pub fn new(text: impl Into<String>, label: Option<String>) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    /// Returns the formula text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Formula and label as a single line of text.
    pub fn display_text(&self) -> String {
        match &self.label {
            Some(label) => format!("{}\t{}", self.text, label),
            None => self.text.clone(),
        }
    }
}

/// A numbered bibliography entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    index: usize,
    text: String,
}

impl Reference {
    /// Creates a reference entry.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Returns the reference number.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the citation text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number label printed before the citation.
    pub fn marker(&self) -> String {
        format!("{}. ", self.index)
    }
}

/// Individual content blocks that make up a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Title or section heading.
    Heading(Heading),
    /// Styled paragraph content.
    Paragraph(Paragraph),
    /// Rectangular table.
    Table(Table),
    /// Preformatted monospace text.
    Diagram(Diagram),
    /// Plain-text equation.
    Equation(Equation),
    /// Figure or table caption.
    Caption(String),
    /// Bibliography entry.
    Reference(Reference),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    /// Returns the kind of the block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading(heading) if heading.is_title() => BlockKind::Title,
            Block::Heading(_) => BlockKind::Heading,
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::Table(_) => BlockKind::Table,
            Block::Diagram(_) => BlockKind::Diagram,
            Block::Equation(_) => BlockKind::Equation,
            Block::Caption(_) => BlockKind::Caption,
            Block::Reference(_) => BlockKind::Reference,
            Block::PageBreak => BlockKind::PageBreak,
        }
    }

    /// Theme role used to style the block; tables and page breaks have none.
    pub fn role(&self) -> Option<Role> {
        match self {
            Block::Heading(heading) => Some(heading.role()),
            Block::Paragraph(_) => Some(Role::Body),
            Block::Diagram(_) => Some(Role::Diagram),
            Block::Equation(_) => Some(Role::Equation),
            Block::Caption(_) => Some(Role::Caption),
            Block::Reference(_) => Some(Role::Reference),
            Block::Table(_) | Block::PageBreak => None,
        }
    }

    /// Plain text of the block in reading order, with line breaks normalized to `\n`.
    pub fn plain_text(&self) -> String {
        let text = match self {
            Block::Heading(heading) => heading.text().to_owned(),
            Block::Paragraph(paragraph) => paragraph.text(),
            Block::Table(table) => table.plain_text(),
            Block::Diagram(diagram) => diagram.text().to_owned(),
            Block::Equation(equation) => equation.display_text(),
            Block::Caption(text) => text.clone(),
            Block::Reference(reference) => format!("{}{}", reference.marker(), reference.text()),
            Block::PageBreak => String::new(),
        };
        richtext::normalize_line_breaks(&text).into_owned()
    }
}

/// Discriminant of a [`Block`], also recovered when a saved file is read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Heading level 0.
    Title,
    /// Heading level 1 or deeper.
    Heading,
    /// Body paragraph.
    Paragraph,
    /// Table.
    Table,
    /// Preformatted diagram.
    Diagram,
    /// Equation.
    Equation,
    /// Caption.
    Caption,
    /// Reference entry.
    Reference,
    /// Page break.
    PageBreak,
}

/// Optional document properties written to the package metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
}

/// Block counts of a document, printed as the generation manifest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Title and section headings.
    pub headings: usize,
    /// Body paragraphs, including spacers.
    pub paragraphs: usize,
    /// Tables.
    pub tables: usize,
    /// Table rows, headers included.
    pub table_rows: usize,
    /// Diagrams.
    pub diagrams: usize,
    /// Equations.
    pub equations: usize,
    /// Captions.
    pub captions: usize,
    /// References.
    pub references: usize,
    /// Explicit page breaks.
    pub page_breaks: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  headings:    {}", self.headings)?;
        writeln!(f, "  paragraphs:  {}", self.paragraphs)?;
        writeln!(f, "  tables:      {} ({} rows)", self.tables, self.table_rows)?;
        writeln!(f, "  diagrams:    {}", self.diagrams)?;
        writeln!(f, "  equations:   {}", self.equations)?;
        writeln!(f, "  captions:    {}", self.captions)?;
        writeln!(f, "  references:  {}", self.references)?;
        write!(f, "  page breaks: {}", self.page_breaks)
    }
}

/// An in-memory document: ordered blocks plus page-level configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    page: PageConfig,
    default_style: EffectiveStyle,
    theme: Theme,
    metadata: Metadata,
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

impl Document {
    /// Creates an empty document with the given page configuration and default styling.
    pub fn new(page: PageConfig) -> Self {
        Self::with_parts(page, EffectiveStyle::default(), Theme::default(), Metadata::default())
    }

    /// Unsupported values of `default_style` are replaced by [`EffectiveStyle::default`].
    pub(crate) fn with_parts(
        page: PageConfig,
        default_style: EffectiveStyle,
        theme: Theme,
        metadata: Metadata,
    ) -> Self {
        Self {
            page,
            default_style: default_style.sanitized(&EffectiveStyle::default()),
            theme,
            metadata,
            blocks: Vec::new(),
        }
    }

    /// Returns the page configuration.
    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    /// Returns the default text style.
    pub fn default_style(&self) -> &EffectiveStyle {
        &self.default_style
    }

    /// Returns the theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the blocks in reading order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true when no block has been appended.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Appends the document title (a level-0 heading).
    pub fn append_title(&mut self, text: impl Into<String>) -> &mut Self {
        self.append_heading(0, text)
    }

    /// Appends a heading.
    pub fn append_heading(&mut self, level: u8, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Heading(Heading::new(level, text)));
        self
    }

    /// Appends a paragraph; plain strings, span vectors and [`Paragraph`] values are accepted.
    pub fn append_paragraph(&mut self, paragraph: impl Into<Paragraph>) -> &mut Self {
        self.blocks.push(Block::Paragraph(paragraph.into()));
        self
    }

    /// Appends an empty paragraph used as vertical spacing.
    pub fn append_spacer(&mut self) -> &mut Self {
        self.append_paragraph(Paragraph::empty())
    }

    /// Validates `rows` (row 0 is the header) and appends them as a table.
    ///
    /// On error the document is left unchanged.  The returned reference allows further region
    /// styling through [`Table::apply_style`].
    pub fn append_table<R, C>(
        &mut self,
        rows: R,
        header_style: Style,
        body_style: Style,
    ) -> std::result::Result<&mut Table, MalformedTableError>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let table = Table::from_rows(rows)?
            .with_header_style(header_style)
            .with_body_style(body_style);
        Ok(self.push_table(table))
    }

    /// Appends an already validated table.
    pub fn push_table(&mut self, table: Table) -> &mut Table {
        self.blocks.push(Block::Table(table));
        match self.blocks.last_mut() {
            Some(Block::Table(table)) => table,
            _ => unreachable!("a table was pushed just above"),
        }
    }

    /// Appends preformatted diagram text.
    pub fn append_diagram(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Diagram(Diagram::new(text)));
        self
    }

    /// Appends a diagram with explicit overrides.
    pub fn push_diagram(&mut self, diagram: Diagram) -> &mut Self {
        self.blocks.push(Block::Diagram(diagram));
        self
    }

    /// Appends an equation with an optional label such as `(1)`.
    pub fn append_equation(&mut self, text: impl Into<String>, label: Option<&str>) -> &mut Self {
        self.blocks.push(Block::Equation(Equation::new(
            text,
            label.map(str::to_owned),
        )));
        self
    }

    /// Appends a caption line.
    pub fn append_caption(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Caption(text.into()));
        self
    }

    /// Appends a bibliography entry.
    pub fn append_reference(&mut self, index: usize, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Reference(Reference::new(index, text)));
        self
    }

    /// Appends bibliography entries numbered from 1.
    pub fn append_references<I, S>(&mut self, references: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (index, text) in references.into_iter().enumerate() {
            self.append_reference(index + 1, text);
        }
        self
    }

    /// Appends an explicit page break.
    pub fn append_page_break(&mut self) -> &mut Self {
        self.blocks.push(Block::PageBreak);
        self
    }

    /// Stacks `layers` (lowest first) and resolves them against the document default.
    ///
    /// Unsupported values degrade to the default with a warning.
    pub fn resolve_layers<'a, I>(&self, layers: I) -> EffectiveStyle
    where
        I: IntoIterator<Item = &'a Style>,
    {
        let stacked = layers
            .into_iter()
            .fold(Style::new(), |acc, layer| layer.merged_over(&acc));
        resolve(&stacked, &self.default_style).sanitized(&self.default_style)
    }

    /// Paragraph-level style of `block`: its theme role style with the block's own overrides.
    pub fn block_style(&self, block: &Block) -> Style {
        let base = block
            .role()
            .map(|role| self.theme.style_for(role).clone())
            .unwrap_or_default();
        match block {
            Block::Paragraph(paragraph) => paragraph.style().merged_over(&base),
            Block::Diagram(diagram) => diagram.style().merged_over(&base),
            _ => base,
        }
    }

    /// Counts blocks per kind.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for block in &self.blocks {
            match block {
                Block::Heading(_) => summary.headings += 1,
                Block::Paragraph(_) => summary.paragraphs += 1,
                Block::Table(table) => {
                    summary.tables += 1;
                    summary.table_rows += table.row_count();
                }
                Block::Diagram(_) => summary.diagrams += 1,
                Block::Equation(_) => summary.equations += 1,
                Block::Caption(_) => summary.captions += 1,
                Block::Reference(_) => summary.references += 1,
                Block::PageBreak => summary.page_breaks += 1,
            }
        }
        summary
    }

    /// Serializes the document to an in-memory `.docx` package.
    pub fn to_docx_bytes(&self) -> Result<Vec<u8>> {
        crate::docx::to_bytes(self)
    }

    /// Saves the document as a `.docx` file and returns the number of bytes written.
    ///
    /// The package is written to a temporary file next to `path` and renamed into place, so a
    /// failed save never leaves a partial file behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<u64> {
        crate::docx::save(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_preserve_order() {
        let mut doc = Document::default();
        doc.append_title("Paper")
            .append_heading(1, "1 Introduction")
            .append_paragraph("text")
            .append_diagram("+--+\n|  |\n+--+")
            .append_reference(1, "Someone: Something (2020)");
        let kinds: Vec<_> = doc.blocks().iter().map(Block::kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Title,
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::Diagram,
                BlockKind::Reference
            ]
        );
    }

    #[test]
    fn failed_table_append_leaves_document_unchanged() {
        let mut doc = Document::default();
        doc.append_paragraph("before");
        let before = doc.clone();
        let err = doc
            .append_table(
                vec![vec!["a", "b", "c"], vec!["x", "y"]],
                Style::new().bold(),
                Style::new(),
            )
            .unwrap_err();
        assert!(matches!(err, MalformedTableError::RowLength { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn append_table_returns_styleable_table() {
        let mut doc = Document::default();
        let table = doc
            .append_table(vec![vec!["A", "B"], vec!["x", "y"]], Style::new(), Style::new())
            .expect("valid table");
        table.apply_style(crate::table::Region::Body, &Style::new().with_size(7.0));
        let Some(Block::Table(table)) = doc.blocks().last() else {
            panic!("table expected");
        };
        assert_eq!(table.cell(1, 0).and_then(|c| c.style().size()), Some(7.0));
    }

    #[test]
    fn references_are_numbered_from_one() {
        let mut doc = Document::default();
        doc.append_references(["First", "Second"]);
        let markers: Vec<_> = doc
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Block::Reference(reference) => Some(reference.marker()),
                _ => None,
            })
            .collect();
        assert_eq!(markers, vec!["1. ", "2. "]);
    }

    #[test]
    fn block_style_layers_theme_and_overrides() {
        let mut doc = Document::default();
        doc.append_heading(1, "Results").append_paragraph(
            Paragraph::new("centered").aligned(HorizontalAlignment::Center),
        );
        let heading = doc.resolve_layers([&doc.block_style(&doc.blocks()[0])]);
        assert!(heading.bold);
        assert_eq!(heading.size, 12.0);

        let paragraph = doc.resolve_layers([&doc.block_style(&doc.blocks()[1])]);
        assert_eq!(paragraph.alignment, HorizontalAlignment::Center);
        assert_eq!(paragraph.size, doc.default_style().size);
    }

    #[test]
    fn summary_counts_blocks() {
        let mut doc = Document::default();
        doc.append_heading(1, "A")
            .append_paragraph("p")
            .append_page_break()
            .append_equation("E = mc²", Some("(1)"))
            .append_caption("Table 1. Results");
        doc.append_table(vec![vec!["A"], vec!["x"], vec!["y"]], Style::new(), Style::new())
            .expect("valid table");
        let summary = doc.summary();
        assert_eq!(summary.headings, 1);
        assert_eq!(summary.paragraphs, 1);
        assert_eq!(summary.page_breaks, 1);
        assert_eq!(summary.equations, 1);
        assert_eq!(summary.captions, 1);
        assert_eq!(summary.tables, 1);
        assert_eq!(summary.table_rows, 3);
    }

    #[test]
    fn paragraph_helpers() {
        let bullet = Paragraph::bullet("item");
        assert_eq!(bullet.text(), "• item");
        assert_eq!(bullet.indent(), Indent::left(18.0));
        assert!(bullet.spans()[0].is_bold());

        let keywords = Paragraph::labeled("Keywords: ", "fusion");
        assert_eq!(keywords.text(), "Keywords: fusion");
        assert!(Paragraph::empty().is_empty());
    }

    #[test]
    fn diagram_line_endings_are_normalized() {
        let diagram = Diagram::new("+--+\r\n|  |\r+--+\n");
        assert_eq!(diagram.text(), "+--+\n|  |\n+--+\n");
        assert_eq!(diagram.lines().collect::<Vec<_>>(), ["+--+", "|  |", "+--+", ""]);
        assert_eq!(
            Block::Paragraph(Paragraph::new("a\r\nb")).plain_text(),
            "a\nb"
        );
    }

    #[test]
    fn unsupported_default_style_is_replaced() {
        let doc = Document::with_parts(
            PageConfig::default(),
            EffectiveStyle::new("", 0.0),
            Theme::default(),
            Metadata::default(),
        );
        assert_eq!(doc.default_style(), &EffectiveStyle::default());
    }

    #[test]
    fn page_text_width_subtracts_margins() {
        let page = PageConfig::new(PaperSize::LETTER, PageMargins::uniform(inches(1.0)));
        assert_eq!(page.text_width(), 612.0 - 144.0);
        assert!((millimetres(25.4) - 72.0).abs() < 1e-4);
    }
}
