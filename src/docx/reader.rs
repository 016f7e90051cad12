//! Reading saved packages back.
//!
//! Only what is needed to check a saved file is recovered: the block sequence with each
//! paragraph's style id and text, and tables as rows of cell text.  Formatting is not read.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use super::parts::DOCUMENT_PART;
use super::xml::{unescape, Tags};
use super::{
    STYLE_CAPTION, STYLE_DIAGRAM, STYLE_EQUATION, STYLE_HEADING_PREFIX, STYLE_REFERENCE,
    STYLE_TITLE,
};
use crate::error::{Error, Result};
use crate::model::BlockKind;

/// A block recovered from `word/document.xml`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractedBlock {
    /// A paragraph with its style id (`None` for body text) and text.
    Paragraph {
        /// Paragraph style id, e.g. `Heading1`.
        style: Option<String>,
        /// Text with breaks as `\n` and tabs as `\t`.
        text: String,
    },
    /// A table as rows of cell text.
    Table {
        /// Rows, header first.
        rows: Vec<Vec<String>>,
    },
    /// A paragraph holding nothing but a page break.
    PageBreak,
}

impl ExtractedBlock {
    /// Block kind implied by the paragraph style.
    pub fn kind(&self) -> BlockKind {
        match self {
            ExtractedBlock::Table { .. } => BlockKind::Table,
            ExtractedBlock::PageBreak => BlockKind::PageBreak,
            ExtractedBlock::Paragraph { style: None, .. } => BlockKind::Paragraph,
            ExtractedBlock::Paragraph {
                style: Some(style), ..
            } => match style.as_str() {
                STYLE_TITLE => BlockKind::Title,
                STYLE_CAPTION => BlockKind::Caption,
                STYLE_DIAGRAM => BlockKind::Diagram,
                STYLE_EQUATION => BlockKind::Equation,
                STYLE_REFERENCE => BlockKind::Reference,
                other if other.starts_with(STYLE_HEADING_PREFIX) => BlockKind::Heading,
                _ => BlockKind::Paragraph,
            },
        }
    }

    /// Plain text of the block; table cells are tab-separated, rows newline-separated.
    pub fn text(&self) -> String {
        match self {
            ExtractedBlock::Paragraph { text, .. } => text.clone(),
            ExtractedBlock::Table { rows } => rows
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            ExtractedBlock::PageBreak => String::new(),
        }
    }
}

fn parse_error(path: &Path, err: ZipError) -> Error {
    match err {
        ZipError::Io(source) => Error::io(path, source),
        other => Error::Parse(format!("{}: {}", path.display(), other)),
    }
}

fn document_xml<R: Read + Seek>(reader: R, path: &Path) -> Result<String> {
    let mut archive = ZipArchive::new(reader).map_err(|err| parse_error(path, err))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|err| parse_error(path, err))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|source| Error::io(path, source))?;
    Ok(xml)
}

/// Reads the block sequence of a saved document.
pub fn read_blocks(path: impl AsRef<Path>) -> Result<Vec<ExtractedBlock>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::io(path, source))?;
    parse_document(&document_xml(file, path)?)
}

/// Reads the block sequence of an in-memory package.
pub fn read_blocks_from_bytes(bytes: &[u8]) -> Result<Vec<ExtractedBlock>> {
    parse_document(&document_xml(Cursor::new(bytes), Path::new("<memory>"))?)
}

/// Extracts the text of a saved document, one block per line.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let blocks = read_blocks(path)?;
    Ok(blocks
        .iter()
        .map(ExtractedBlock::text)
        .collect::<Vec<_>>()
        .join("\n"))
}

#[derive(Default)]
struct ParagraphState {
    style: Option<String>,
    text: String,
    page_break: bool,
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Option<String>,
}

fn parse_document(xml: &str) -> Result<Vec<ExtractedBlock>> {
    let mut blocks = Vec::new();
    let mut tables: Vec<TableState> = Vec::new();
    let mut paragraph: Option<ParagraphState> = None;
    let mut in_properties = false;
    let mut in_text = false;

    for item in Tags::new(xml) {
        let (text, tag) = item?;
        if in_text {
            if let Some(paragraph) = paragraph.as_mut() {
                paragraph.text.push_str(&unescape(text)?);
            }
        }

        match (tag.name, tag.closing, tag.self_closing) {
            ("w:p", false, false) => paragraph = Some(ParagraphState::default()),
            ("w:p", false, true) => {
                finish_paragraph(ParagraphState::default(), &mut tables, &mut blocks)
            }
            ("w:p", true, _) => {
                if let Some(done) = paragraph.take() {
                    finish_paragraph(done, &mut tables, &mut blocks);
                }
            }
            ("w:pPr", closing, false) => in_properties = !closing,
            ("w:pStyle", false, _) => {
                if let (Some(paragraph), Some(value)) = (paragraph.as_mut(), tag.attr("w:val")) {
                    paragraph.style = Some(unescape(value)?.into_owned());
                }
            }
            ("w:t", closing, false) => in_text = !closing,
            ("w:tab", false, true) if !in_properties => {
                if let Some(paragraph) = paragraph.as_mut() {
                    paragraph.text.push('\t');
                }
            }
            ("w:br", false, true) => {
                if let Some(paragraph) = paragraph.as_mut() {
                    if tag.attr("w:type") == Some("page") {
                        paragraph.page_break = true;
                    } else {
                        paragraph.text.push('\n');
                    }
                }
            }
            ("w:tbl", false, false) => tables.push(TableState::default()),
            ("w:tbl", true, _) => {
                if let Some(table) = tables.pop() {
                    let block = ExtractedBlock::Table { rows: table.rows };
                    match tables.last_mut().and_then(|outer| outer.cell.as_mut()) {
                        // nested tables are flattened into the enclosing cell's text
                        Some(cell) => push_line(cell, &block.text()),
                        None => blocks.push(block),
                    }
                }
            }
            ("w:tr", false, false) => {
                if let Some(table) = tables.last_mut() {
                    table.row.clear();
                }
            }
            ("w:tr", true, _) => {
                if let Some(table) = tables.last_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            ("w:tc", false, false) => {
                if let Some(table) = tables.last_mut() {
                    table.cell = Some(String::new());
                }
            }
            ("w:tc", true, _) => {
                if let Some(table) = tables.last_mut() {
                    let cell = table.cell.take().unwrap_or_default();
                    table.row.push(cell);
                }
            }
            _ => {}
        }
    }

    if !tables.is_empty() || paragraph.is_some() {
        return Err(Error::Parse("document body ends inside an open element".into()));
    }
    Ok(blocks)
}

fn push_line(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(line);
}

fn finish_paragraph(
    paragraph: ParagraphState,
    tables: &mut [TableState],
    blocks: &mut Vec<ExtractedBlock>,
) {
    if let Some(cell) = tables.last_mut().and_then(|table| table.cell.as_mut()) {
        push_line(cell, &paragraph.text);
        return;
    }
    if paragraph.page_break && paragraph.text.is_empty() {
        blocks.push(ExtractedBlock::PageBreak);
    } else {
        blocks.push(ExtractedBlock::Paragraph {
            style: paragraph.style,
            text: paragraph.text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::style::Style;

    #[test]
    fn reads_paragraph_styles_and_text() {
        let xml = r#"<w:document><w:body>
            <w:p><w:pPr><w:pStyle w:val="Heading1"/><w:tabs><w:tab w:val="center" w:pos="10"/></w:tabs></w:pPr>
            <w:r><w:t xml:space="preserve">1 Intro &amp; Scope</w:t></w:r></w:p>
            <w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>
            <w:p><w:r><w:br w:type="page"/></w:r></w:p>
            <w:p/>
            </w:body></w:document>"#;
        let blocks = parse_document(xml).expect("parses");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].kind(), BlockKind::Heading);
        assert_eq!(blocks[0].text(), "1 Intro & Scope");
        assert_eq!(blocks[1].text(), "a\tb\nc");
        assert_eq!(blocks[2], ExtractedBlock::PageBreak);
        assert_eq!(blocks[3].kind(), BlockKind::Paragraph);
    }

    #[test]
    fn reads_table_cells_in_order() {
        let xml = "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>\
                   <w:tr><w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>y</w:t></w:r></w:p></w:tc></w:tr></w:tbl>";
        let blocks = parse_document(xml).expect("parses");
        assert_eq!(
            blocks,
            vec![ExtractedBlock::Table {
                rows: vec![
                    vec!["A".to_owned(), String::new()],
                    vec!["x".to_owned(), "y".to_owned()]
                ]
            }]
        );
    }

    #[test]
    fn unterminated_body_is_a_parse_error() {
        assert!(matches!(
            parse_document("<w:p><w:r><w:t>x</w:t>"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        assert!(matches!(
            read_blocks_from_bytes(b"not a zip archive"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn round_trips_written_package() {
        let mut doc = Document::default();
        doc.append_title("Paper")
            .append_heading(2, "2.1 Method")
            .append_equation("y = f(x)", Some("(1)"))
            .append_caption("Table 1. Scores");
        doc.append_table(vec![vec!["A", "B"], vec!["x", "y"]], Style::new(), Style::new())
            .expect("valid table");
        doc.append_reference(1, "Someone (2020)");

        let bytes = crate::docx::to_bytes(&doc).expect("serializes");
        let blocks = read_blocks_from_bytes(&bytes).expect("reads back");
        let kinds: Vec<_> = blocks.iter().map(ExtractedBlock::kind).collect();
        let expected: Vec<_> = doc.blocks().iter().map(|block| block.kind()).collect();
        assert_eq!(kinds, expected);
        assert_eq!(blocks[2].text(), "\ty = f(x)\t(1)");
        assert_eq!(blocks[5].text(), "1. Someone (2020)");
    }
}
