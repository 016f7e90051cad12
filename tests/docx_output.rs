use std::fs;
use std::io::{Cursor, Read};

use paper_builder::docx::{self, ExtractedBlock};
use paper_builder::samples::{self, PaperVariant};
use paper_builder::{
    BlockKind, Document, DocumentBuilder, EffectiveStyle, Error, MalformedTableError, Style,
};
use sha2::{Digest, Sha256};

fn file_hash(path: &std::path::Path) -> [u8; 32] {
    Sha256::digest(fs::read(path).expect("read saved file")).into()
}

fn package_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid package");
    let mut content = String::new();
    archive
        .by_name(name)
        .expect("part present")
        .read_to_string(&mut content)
        .expect("utf-8 part");
    content
}

fn paragraph_texts(doc: &Document) -> Vec<String> {
    docx::read_blocks_from_bytes(&doc.to_docx_bytes().unwrap())
        .unwrap()
        .iter()
        .map(ExtractedBlock::text)
        .collect()
}

#[test]
fn heading_and_paragraph_are_saved_and_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");

    let mut doc = Document::default();
    doc.append_heading(1, "1 Introduction")
        .append_paragraph("text");
    let written = doc.save(&path).unwrap();

    let metadata = fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
    assert_eq!(metadata.len(), written);

    let text = docx::extract_text(&path).unwrap();
    assert!(text.contains("Introduction"));
    assert!(text.contains("text"));
}

#[test]
fn two_by_two_table_keeps_its_cells() {
    let mut doc = Document::default();
    let table = doc
        .append_table(
            vec![vec!["A", "B"], vec!["x", "y"]],
            Style::new().bold(),
            Style::new(),
        )
        .unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 2);
    assert_eq!(table.cell(1, 0).map(|cell| cell.text()), Some("x"));

    let blocks = docx::read_blocks_from_bytes(&doc.to_docx_bytes().unwrap()).unwrap();
    assert_eq!(
        blocks,
        vec![ExtractedBlock::Table {
            rows: vec![
                vec!["A".to_owned(), "B".to_owned()],
                vec!["x".to_owned(), "y".to_owned()],
            ],
        }]
    );
}

#[test]
fn short_row_is_rejected_and_document_is_unchanged() {
    let mut doc = Document::default();
    doc.append_heading(1, "Results");
    let before = doc.clone();

    let err = doc
        .append_table(
            vec![vec!["A", "B", "C"], vec!["x", "y"]],
            Style::new(),
            Style::new(),
        )
        .unwrap_err();
    assert_eq!(
        err,
        MalformedTableError::RowLength {
            row: 1,
            expected: 3,
            found: 2,
        }
    );
    assert_eq!(doc, before);
}

#[test]
fn save_into_missing_directory_fails_without_creating_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.docx");

    let mut doc = Document::default();
    doc.append_paragraph("text");
    let err = doc.save(&path).unwrap_err();

    assert!(matches!(err, Error::Io { .. }), "unexpected error: {err}");
    assert!(!path.exists());
    assert!(!dir.path().join("missing").exists());
}

#[test]
fn reopened_file_preserves_block_order_and_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("complete.docx");
    let doc = samples::build(PaperVariant::Complete).unwrap();
    doc.save(&path).unwrap();

    let blocks = docx::read_blocks(&path).unwrap();
    assert_eq!(blocks.len(), doc.len());
    for (extracted, block) in blocks.iter().zip(doc.blocks()) {
        assert_eq!(extracted.kind(), block.kind());
        // equations are laid out behind a center tab stop
        assert_eq!(
            extracted.text().trim_start_matches('\t'),
            block.plain_text(),
            "text of {:?} block",
            block.kind()
        );
    }
}

#[test]
fn saving_twice_gives_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.docx");
    let second = dir.path().join("second.docx");

    let doc = samples::build(PaperVariant::Enhanced).unwrap();
    doc.save(&first).unwrap();
    doc.save(&second).unwrap();

    assert_eq!(file_hash(&first), file_hash(&second));
}

#[test]
fn saving_over_an_existing_file_replaces_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.docx");
    fs::write(&path, b"stale").unwrap();

    let doc = samples::build(PaperVariant::Draft).unwrap();
    let written = doc.save(&path).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), written);
    assert_eq!(fs::read(&path).unwrap(), doc.to_docx_bytes().unwrap());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

#[test]
fn header_only_table_is_a_single_row_table() {
    let mut doc = Document::default();
    let table = doc
        .append_table(vec![vec!["A", "B"]], Style::new(), Style::new())
        .unwrap();
    assert_eq!(table.row_count(), 1);
    assert!(table.body().is_empty());

    let blocks = docx::read_blocks_from_bytes(&doc.to_docx_bytes().unwrap()).unwrap();
    assert!(matches!(&blocks[..], [ExtractedBlock::Table { rows }] if rows.len() == 1));
}

#[test]
fn table_without_rows_is_rejected() {
    let mut doc = Document::default();
    let rows: Vec<Vec<&str>> = Vec::new();
    let err = doc
        .append_table(rows, Style::new(), Style::new())
        .unwrap_err();
    assert_eq!(err, MalformedTableError::Empty);
    assert!(doc.is_empty());
}

#[test]
fn every_variant_saves() {
    let dir = tempfile::tempdir().unwrap();
    for variant in PaperVariant::ALL {
        let path = dir.path().join(variant.file_name());
        let doc = samples::build(variant).unwrap();
        let written = doc.save(&path).unwrap();
        assert!(written > 0, "{variant} produced an empty file");

        let kinds: Vec<_> = docx::read_blocks(&path)
            .unwrap()
            .iter()
            .map(ExtractedBlock::kind)
            .collect();
        assert_eq!(kinds.first(), Some(&BlockKind::Title));
        assert_eq!(kinds.last(), Some(&BlockKind::Reference));
    }
}

#[test]
fn garbage_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.docx");
    fs::write(&path, b"definitely not a zip archive").unwrap();

    assert!(matches!(docx::read_blocks(&path), Err(Error::Parse(_))));
}

#[test]
fn unusable_default_style_is_saved_with_the_builtin_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallback.docx");

    let mut doc = DocumentBuilder::new()
        .with_default_style(EffectiveStyle::new("", 0.0))
        .build();
    doc.append_paragraph("text");
    doc.save(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    let body = package_part(&bytes, "word/document.xml");
    assert!(body.contains("w:ascii=\"Times New Roman\""));
    assert!(body.contains("<w:sz w:val=\"22\"/>"));
    assert!(!body.contains("w:ascii=\"\""));
    assert!(!body.contains("<w:sz w:val=\"0\"/>"));

    let styles = package_part(&bytes, "word/styles.xml");
    assert!(styles.contains("Times New Roman"));
    assert!(!styles.contains("<w:sz w:val=\"0\"/>"));
}

#[test]
fn windows_line_endings_become_line_breaks() {
    let mut doc = Document::default();
    doc.append_paragraph("a\r\nb").append_paragraph("c\rd");

    let bytes = doc.to_docx_bytes().unwrap();
    let body = package_part(&bytes, "word/document.xml");
    assert!(!body.contains("a\r") && !body.contains("c\r"));
    assert_eq!(body.matches("<w:br/>").count(), 2);
    assert_eq!(paragraph_texts(&doc), ["a\nb", "c\nd"]);
}

#[test]
fn diagram_trailing_newline_survives_a_save() {
    let mut doc = Document::default();
    doc.append_diagram("+--+\n|  |\n+--+\n");

    assert_eq!(paragraph_texts(&doc), ["+--+\n|  |\n+--+\n"]);
    assert_eq!(doc.blocks()[0].plain_text(), "+--+\n|  |\n+--+\n");
}
