use paper_builder::fonts::{self, FontConfig};
use paper_builder::pdf::{self, PdfOptions, PdfOutput};
use paper_builder::samples::{self, PaperVariant};
use paper_builder::Document;
use sha2::{Digest, Sha256};

const SKIP_NOTE: &str = "fonts missing. Copy LiberationSerif/LiberationMono into assets/fonts.";

fn fonts_present() -> bool {
    fonts::fonts_available(&FontConfig::default())
}

fn render(document: &Document) -> PdfOutput {
    pdf::render(document, PdfOptions::new()).expect("render preview")
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_between(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while let Some(found) = data[offset..]
            .windows(start.len())
            .position(|window| window == start)
        {
            let from = offset + found + start.len();
            let Some(length) = data[from..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[from..from + length] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = from + length + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_between(&mut normalized, b"/CreationDate(", b")");
    scrub_between(&mut normalized, b"/ModDate(", b")");
    scrub_between(&mut normalized, b"/ID[", b"]");
    scrub_between(&mut normalized, b"/Producer(", b")");
    for tag in [
        "xmp:CreateDate",
        "xmp:ModifyDate",
        "xmp:MetadataDate",
        "xmpMM:DocumentID",
        "xmpMM:InstanceID",
        "xmpMM:VersionID",
    ] {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        scrub_between(&mut normalized, open.as_bytes(), close.as_bytes());
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn renders_non_empty_output() {
    if !fonts_present() {
        eprintln!("Skipping renders_non_empty_output: {SKIP_NOTE}");
        return;
    }
    let doc = samples::build(PaperVariant::Complete).unwrap();
    let output = render(&doc);
    assert!(output.bytes.starts_with(b"%PDF"));
    assert!(output.pages >= 3, "complete sample has two page breaks");
}

#[test]
fn rendering_is_deterministic() {
    if !fonts_present() {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_NOTE}");
        return;
    }
    let doc = samples::build(PaperVariant::Enhanced).unwrap();
    let first = render(&doc);
    let second = render(&doc);

    assert_eq!(
        normalized_hash(&first.bytes),
        normalized_hash(&second.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn headings_record_their_pages() {
    if !fonts_present() {
        eprintln!("Skipping headings_record_their_pages: {SKIP_NOTE}");
        return;
    }
    let mut doc = Document::default();
    doc.append_title("Paper")
        .append_heading(1, "1 Introduction")
        .append_paragraph("text")
        .append_page_break()
        .append_heading(1, "2 Method");

    let output = render(&doc);
    let pages: Vec<_> = output
        .headings
        .iter()
        .map(|heading| (heading.level, heading.text.as_str(), heading.page))
        .collect();
    assert_eq!(
        pages,
        vec![
            (0, "Paper", Some(1)),
            (1, "1 Introduction", Some(1)),
            (1, "2 Method", Some(2)),
        ]
    );
    assert_eq!(output.pages, 2);
}

#[test]
fn save_writes_the_rendered_bytes() {
    if !fonts_present() {
        eprintln!("Skipping save_writes_the_rendered_bytes: {SKIP_NOTE}");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.pdf");
    let doc = samples::build(PaperVariant::Draft).unwrap();

    let written = pdf::save(&doc, PdfOptions::new(), &path).unwrap();
    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(written, on_disk.len() as u64);
    assert!(on_disk.starts_with(b"%PDF"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

#[test]
fn missing_body_family_is_a_missing_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let options = PdfOptions::new().with_fonts(
        FontConfig::new()
            .with_directory(dir.path())
            .with_body_family("NoSuchFamilyForPreview"),
    );
    let err = pdf::render(&Document::default(), options).unwrap_err();
    assert!(err.is_missing_dependency(), "unexpected error: {err}");
}
