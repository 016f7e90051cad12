//! `word/document.xml`: the block sequence in reading order.

use log::warn;

use super::xml::XmlWriter;
use super::{style_id, twips, STYLE_TABLE_GRID};
use crate::model::{Block, Document, Equation, Heading, PageConfig, Paragraph, MAX_HEADING_LEVEL};
use crate::richtext::normalize_line_breaks;
use crate::style::{EffectiveStyle, HorizontalAlignment, Indent, Role, Spacing, Style};
use crate::table::Table;

pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const R_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Paragraph properties gathered before a paragraph is opened.
#[derive(Default)]
struct ParagraphProps<'a> {
    style_id: Option<String>,
    keep_next: bool,
    tabs: &'a [(&'a str, i64)],
    spacing: Option<Spacing>,
    indent: Indent,
    alignment: Option<HorizontalAlignment>,
}

pub(crate) fn document_xml(doc: &Document) -> String {
    let mut w = XmlWriter::new();
    w.open("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)]);
    w.open("w:body", &[]);
    for block in doc.blocks() {
        write_block(&mut w, doc, block);
    }
    write_section(&mut w, doc.page());
    w.close("w:body");
    w.close("w:document");
    w.finish()
}

fn write_block(w: &mut XmlWriter, doc: &Document, block: &Block) {
    let block_style = doc.block_style(block);
    match block {
        Block::Heading(heading) => write_heading(w, doc, heading, &block_style),
        Block::Paragraph(paragraph) => write_paragraph(w, doc, paragraph, &block_style),
        Block::Table(table) => write_table(w, doc, table),
        Block::Diagram(diagram) => {
            let effective = doc.resolve_layers([&block_style]);
            let props = ParagraphProps {
                style_id: style_id(Role::Diagram),
                spacing: Some(doc.theme().spacing_for(Role::Diagram)),
                alignment: Some(effective.alignment),
                ..ParagraphProps::default()
            };
            open_paragraph(w, &props);
            // one run, lines separated by breaks, so the block stays a single paragraph
            write_run(w, diagram.text(), &effective);
            w.close("w:p");
        }
        Block::Equation(equation) => write_equation(w, doc, equation, &block_style),
        Block::Caption(text) => {
            let effective = doc.resolve_layers([&block_style]);
            let props = ParagraphProps {
                style_id: style_id(Role::Caption),
                spacing: Some(doc.theme().spacing_for(Role::Caption)),
                alignment: Some(effective.alignment),
                ..ParagraphProps::default()
            };
            open_paragraph(w, &props);
            write_run(w, text, &effective);
            w.close("w:p");
        }
        Block::Reference(reference) => {
            let effective = doc.resolve_layers([&block_style]);
            let props = ParagraphProps {
                style_id: style_id(Role::Reference),
                spacing: Some(doc.theme().spacing_for(Role::Reference)),
                indent: Indent::hanging(18.0),
                alignment: Some(effective.alignment),
                ..ParagraphProps::default()
            };
            open_paragraph(w, &props);
            write_run(w, &reference.marker(), &effective);
            write_run(w, reference.text(), &effective);
            w.close("w:p");
        }
        Block::PageBreak => {
            w.open("w:p", &[]);
            w.open("w:r", &[]);
            w.empty("w:br", &[("w:type", "page")]);
            w.close("w:r");
            w.close("w:p");
        }
    }
}

fn write_heading(w: &mut XmlWriter, doc: &Document, heading: &Heading, block_style: &Style) {
    let role = if heading.level() > MAX_HEADING_LEVEL {
        warn!(
            "heading level {} is deeper than {}; clamping",
            heading.level(),
            MAX_HEADING_LEVEL
        );
        Role::Heading(MAX_HEADING_LEVEL)
    } else {
        heading.role()
    };
    let effective = doc.resolve_layers([block_style]);
    let props = ParagraphProps {
        style_id: style_id(role),
        keep_next: !heading.is_title(),
        spacing: Some(doc.theme().spacing_for(role)),
        alignment: Some(effective.alignment),
        ..ParagraphProps::default()
    };
    open_paragraph(w, &props);
    write_run(w, heading.text(), &effective);
    w.close("w:p");
}

fn write_paragraph(w: &mut XmlWriter, doc: &Document, paragraph: &Paragraph, block_style: &Style) {
    let effective = doc.resolve_layers([block_style]);
    let props = ParagraphProps {
        spacing: Some(
            paragraph
                .spacing()
                .unwrap_or_else(|| doc.theme().spacing_for(Role::Body)),
        ),
        indent: paragraph.indent(),
        alignment: Some(effective.alignment),
        ..ParagraphProps::default()
    };
    open_paragraph(w, &props);
    for span in paragraph.spans() {
        if span.text().is_empty() {
            continue;
        }
        let run_style = doc.resolve_layers([block_style, span.style()]);
        write_run(w, span.text(), &run_style);
    }
    w.close("w:p");
}

fn write_equation(w: &mut XmlWriter, doc: &Document, equation: &Equation, block_style: &Style) {
    let effective = doc.resolve_layers([block_style]);
    let spacing = Some(doc.theme().spacing_for(Role::Equation));
    match equation.label() {
        Some(label) => {
            // centered formula with the label flush right, via a center and a right tab stop
            let width = twips(doc.page().text_width());
            let tabs = [("center", width / 2), ("right", width)];
            let props = ParagraphProps {
                style_id: style_id(Role::Equation),
                tabs: &tabs,
                spacing,
                alignment: Some(HorizontalAlignment::Left),
                ..ParagraphProps::default()
            };
            open_paragraph(w, &props);
            write_run(w, &format!("\t{}\t{}", equation.text(), label), &effective);
            w.close("w:p");
        }
        None => {
            let props = ParagraphProps {
                style_id: style_id(Role::Equation),
                spacing,
                alignment: Some(effective.alignment),
                ..ParagraphProps::default()
            };
            open_paragraph(w, &props);
            write_run(w, equation.text(), &effective);
            w.close("w:p");
        }
    }
}

fn write_table(w: &mut XmlWriter, doc: &Document, table: &Table) {
    let columns = table.column_count().max(1);
    let column_width = twips(doc.page().text_width()) / columns as i64;
    let column_width = column_width.to_string();

    w.open("w:tbl", &[]);
    w.open("w:tblPr", &[]);
    if table.is_bordered() {
        w.empty("w:tblStyle", &[("w:val", STYLE_TABLE_GRID)]);
    }
    w.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")]);
    if table.is_bordered() {
        w.open("w:tblBorders", &[]);
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            w.empty(
                edge,
                &[
                    ("w:val", "single"),
                    ("w:sz", "4"),
                    ("w:space", "0"),
                    ("w:color", "000000"),
                ],
            );
        }
        w.close("w:tblBorders");
    }
    w.empty("w:tblLayout", &[("w:type", "fixed")]);
    w.close("w:tblPr");

    w.open("w:tblGrid", &[]);
    for _ in 0..columns {
        w.empty("w:gridCol", &[("w:w", column_width.as_str())]);
    }
    w.close("w:tblGrid");

    for (row, cells) in table.rows().iter().enumerate() {
        w.open("w:tr", &[]);
        if row == 0 {
            w.open("w:trPr", &[]);
            w.empty("w:tblHeader", &[]);
            w.close("w:trPr");
        }
        for (column, cell) in cells.iter().enumerate() {
            let effective = doc.resolve_layers([&table.cell_style(row, column)]);
            w.open("w:tc", &[]);
            w.open("w:tcPr", &[]);
            w.empty("w:tcW", &[("w:w", column_width.as_str()), ("w:type", "dxa")]);
            w.close("w:tcPr");
            let props = ParagraphProps {
                spacing: Some(Spacing::default()),
                alignment: Some(effective.alignment),
                ..ParagraphProps::default()
            };
            open_paragraph(w, &props);
            if !cell.text().is_empty() {
                write_run(w, cell.text(), &effective);
            }
            w.close("w:p");
            w.close("w:tc");
        }
        w.close("w:tr");
    }
    w.close("w:tbl");
}

pub(crate) fn jc_value(alignment: HorizontalAlignment) -> &'static str {
    match alignment {
        HorizontalAlignment::Left => "left",
        HorizontalAlignment::Center => "center",
        HorizontalAlignment::Right => "right",
        HorizontalAlignment::Justified => "both",
    }
}

fn open_paragraph(w: &mut XmlWriter, props: &ParagraphProps<'_>) {
    w.open("w:p", &[]);
    w.open("w:pPr", &[]);
    if let Some(id) = &props.style_id {
        w.empty("w:pStyle", &[("w:val", id.as_str())]);
    }
    if props.keep_next {
        w.empty("w:keepNext", &[]);
    }
    if !props.tabs.is_empty() {
        w.open("w:tabs", &[]);
        for (kind, position) in props.tabs {
            w.empty("w:tab", &[("w:val", *kind), ("w:pos", position.to_string().as_str())]);
        }
        w.close("w:tabs");
    }
    if let Some(spacing) = props.spacing {
        w.empty(
            "w:spacing",
            &[
                ("w:before", twips(spacing.before).to_string().as_str()),
                ("w:after", twips(spacing.after).to_string().as_str()),
            ],
        );
    }
    write_indent(w, props.indent);
    if let Some(alignment) = props.alignment {
        w.empty("w:jc", &[("w:val", jc_value(alignment))]);
    }
    w.close("w:pPr");
}

fn write_indent(w: &mut XmlWriter, indent: Indent) {
    if indent.is_zero() {
        return;
    }
    let left = twips(indent.left).to_string();
    let first = twips(indent.first_line.abs()).to_string();
    if indent.first_line < 0.0 {
        w.empty("w:ind", &[("w:left", left.as_str()), ("w:hanging", first.as_str())]);
    } else if indent.first_line > 0.0 {
        w.empty("w:ind", &[("w:left", left.as_str()), ("w:firstLine", first.as_str())]);
    } else {
        w.empty("w:ind", &[("w:left", left.as_str())]);
    }
}

/// Writes run properties for a resolved style.
pub(crate) fn write_run_properties(w: &mut XmlWriter, style: &EffectiveStyle) {
    let family = style.font_family.as_str();
    let half_points = style.half_points().to_string();
    w.open("w:rPr", &[]);
    w.empty(
        "w:rFonts",
        &[
            ("w:ascii", family),
            ("w:hAnsi", family),
            ("w:eastAsia", family),
            ("w:cs", family),
        ],
    );
    if style.bold {
        w.empty("w:b", &[]);
    }
    if style.italic {
        w.empty("w:i", &[]);
    }
    if let Some(color) = style.color {
        w.empty("w:color", &[("w:val", color.hex().as_str())]);
    }
    w.empty("w:sz", &[("w:val", half_points.as_str())]);
    w.empty("w:szCs", &[("w:val", half_points.as_str())]);
    w.close("w:rPr");
}

/// Writes one run; `\n`, `\r\n` and `\r` become line breaks and tabs become tab characters.
fn write_run(w: &mut XmlWriter, text: &str, style: &EffectiveStyle) {
    w.open("w:r", &[]);
    write_run_properties(w, style);
    for (line_index, line) in normalize_line_breaks(text).split('\n').enumerate() {
        if line_index > 0 {
            w.empty("w:br", &[]);
        }
        for (piece_index, piece) in line.split('\t').enumerate() {
            if piece_index > 0 {
                w.empty("w:tab", &[]);
            }
            if !piece.is_empty() {
                w.open("w:t", &[("xml:space", "preserve")]);
                w.text(piece);
                w.close("w:t");
            }
        }
    }
    w.close("w:r");
}

fn write_section(w: &mut XmlWriter, page: &PageConfig) {
    let paper = page.paper();
    let margins = page.margins();
    w.open("w:sectPr", &[]);
    w.empty(
        "w:pgSz",
        &[
            ("w:w", twips(paper.width).to_string().as_str()),
            ("w:h", twips(paper.height).to_string().as_str()),
        ],
    );
    w.empty(
        "w:pgMar",
        &[
            ("w:top", twips(margins.top).to_string().as_str()),
            ("w:right", twips(margins.right).to_string().as_str()),
            ("w:bottom", twips(margins.bottom).to_string().as_str()),
            ("w:left", twips(margins.left).to_string().as_str()),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    );
    w.close("w:sectPr");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageMargins, PaperSize};
    use crate::style::Rgb;
    use crate::richtext::Span;

    fn render(doc: &Document) -> String {
        document_xml(doc)
    }

    #[test]
    fn heading_uses_heading_style_and_resolved_run() {
        let mut doc = Document::default();
        doc.append_heading(1, "1 Introduction");
        let xml = render(&doc);
        assert!(xml.contains("<w:pStyle w:val=\"Heading1\"/>"));
        assert!(xml.contains("<w:keepNext/>"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("<w:sz w:val=\"24\"/>"));
        assert!(xml.contains(">1 Introduction</w:t>"));
    }

    #[test]
    fn deep_headings_are_clamped() {
        let mut doc = Document::default();
        doc.append_heading(14, "Deep");
        assert!(render(&doc).contains("<w:pStyle w:val=\"Heading9\"/>"));
    }

    #[test]
    fn spans_keep_their_own_formatting() {
        let mut doc = Document::default();
        doc.append_paragraph(vec![
            Span::new("Keywords: ").bold(),
            Span::new("fusion").colored(Rgb(0x24, 0x5C, 0xA0)),
        ]);
        let xml = render(&doc);
        let bold_run = xml.find("<w:b/>").expect("bold run");
        let label = xml.find("Keywords: ").expect("label text");
        assert!(bold_run < label);
        assert!(xml.contains("<w:color w:val=\"245CA0\"/>"));
    }

    #[test]
    fn diagram_lines_are_breaks_in_one_paragraph() {
        let mut doc = Document::default();
        doc.append_diagram("+--+\n|  |\n+--+");
        let xml = render(&doc);
        assert_eq!(xml.matches("<w:p>").count(), 1);
        assert_eq!(xml.matches("<w:br/>").count(), 2);
        assert!(xml.contains("<w:t xml:space=\"preserve\">|  |</w:t>"));
        assert!(xml.contains("w:ascii=\"Courier New\""));
    }

    #[test]
    fn carriage_returns_become_breaks() {
        let mut doc = Document::default();
        doc.append_paragraph("one\r\ntwo\rthree");
        let xml = render(&doc);
        assert_eq!(xml.matches("<w:br/>").count(), 2);
        assert!(!xml.contains("one\r") && !xml.contains("two\r"));
        assert!(xml.contains(">three</w:t>"));
    }

    #[test]
    fn trailing_diagram_newline_is_kept() {
        let mut doc = Document::default();
        doc.append_diagram("+--+\n+--+\n");
        let xml = render(&doc);
        assert_eq!(xml.matches("<w:br/>").count(), 2);
        assert!(xml.contains("<w:br/></w:r>"));
    }

    #[test]
    fn labelled_equation_uses_tab_stops() {
        let mut doc = Document::default();
        doc.append_equation("E = mc²", Some("(1)"));
        let xml = render(&doc);
        assert!(xml.contains("<w:tab w:val=\"center\" w:pos=\"4680\"/>"));
        assert!(xml.contains("<w:tab w:val=\"right\" w:pos=\"9360\"/>"));
        assert!(xml.contains(">(1)</w:t>"));
    }

    #[test]
    fn table_has_grid_header_row_and_borders() {
        let mut doc = Document::default();
        doc.append_table(
            vec![vec!["A", "B"], vec!["x", "y"]],
            Style::new().bold(),
            Style::new(),
        )
        .expect("valid table");
        let xml = render(&doc);
        assert_eq!(xml.matches("<w:gridCol w:w=\"4680\"/>").count(), 2);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert!(xml.contains("<w:tblHeader/>"));
        assert!(xml.contains("<w:insideV w:val=\"single\""));
    }

    #[test]
    fn borderless_table_omits_borders() {
        let mut doc = Document::default();
        let table = Table::from_rows(vec![vec!["A"]])
            .expect("valid")
            .with_borders(false);
        doc.push_table(table);
        let xml = render(&doc);
        assert!(!xml.contains("w:tblBorders"));
        assert!(!xml.contains("TableGrid"));
    }

    #[test]
    fn section_carries_page_geometry() {
        let page = PageConfig::new(PaperSize::A4, PageMargins::trbl(36.0, 54.0, 36.0, 54.0));
        let xml = render(&Document::new(page));
        assert!(xml.contains("<w:pgSz w:w=\"11906\" w:h=\"16838\"/>"));
        assert!(xml.contains("w:top=\"720\" w:right=\"1080\""));
    }

    #[test]
    fn page_break_and_reference_indent() {
        let mut doc = Document::default();
        doc.append_page_break().append_reference(3, "Someone (2020)");
        let xml = render(&doc);
        assert!(xml.contains("<w:br w:type=\"page\"/>"));
        assert!(xml.contains("<w:ind w:left=\"360\" w:hanging=\"360\"/>"));
        assert!(xml.contains(">3. </w:t>"));
    }
}
