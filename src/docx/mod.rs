//! Word-processing (`.docx`) serialization.
//!
//! A document is written as an OOXML package: a zip archive holding a fixed set of XML parts.
//! Every run carries its fully resolved formatting, so the file renders the same regardless of
//! the reader's own defaults.  The archive is deterministic: parts are written in a fixed order
//! with a fixed timestamp and permissions, and no part contains dates or generated identifiers,
//! so saving the same document twice yields identical bytes.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use log::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{Document, MAX_HEADING_LEVEL};
use crate::output::write_atomically;
use crate::style::Role;

mod body;
mod parts;
pub mod reader;
mod xml;

pub use reader::{extract_text, read_blocks, read_blocks_from_bytes, ExtractedBlock};

pub(crate) const STYLE_TITLE: &str = "Title";
pub(crate) const STYLE_HEADING_PREFIX: &str = "Heading";
pub(crate) const STYLE_CAPTION: &str = "Caption";
pub(crate) const STYLE_DIAGRAM: &str = "Diagram";
pub(crate) const STYLE_EQUATION: &str = "Equation";
pub(crate) const STYLE_REFERENCE: &str = "Reference";
pub(crate) const STYLE_TABLE_GRID: &str = "TableGrid";

/// Twentieths of a point, the length unit of most WordprocessingML attributes.
pub(crate) fn twips(points: f32) -> i64 {
    (points * 20.0).round() as i64
}

/// Paragraph style id for `role`; body text uses the implicit `Normal` style.
pub(crate) fn style_id(role: Role) -> Option<String> {
    match role {
        Role::Title => Some(STYLE_TITLE.to_owned()),
        Role::Heading(level) => Some(format!(
            "{}{}",
            STYLE_HEADING_PREFIX,
            level.clamp(1, MAX_HEADING_LEVEL)
        )),
        Role::Body => None,
        Role::Caption => Some(STYLE_CAPTION.to_owned()),
        Role::Diagram => Some(STYLE_DIAGRAM.to_owned()),
        Role::Equation => Some(STYLE_EQUATION.to_owned()),
        Role::Reference => Some(STYLE_REFERENCE.to_owned()),
    }
}

fn file_options() -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

fn write_package<W: Write + Seek>(document: &Document, writer: W, target: &Path) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    for (name, content) in parts::package_parts(document) {
        zip.start_file(name, file_options())
            .map_err(|err| Error::from_zip(target, err))?;
        zip.write_all(content.as_bytes())
            .map_err(|source| Error::io(target, source))?;
    }
    zip.finish().map_err(|err| Error::from_zip(target, err))
}

/// Writes the document package to `writer` and hands the writer back.
pub fn write<W: Write + Seek>(document: &Document, writer: W) -> Result<W> {
    write_package(document, writer, Path::new("<writer>"))
}

/// Serializes the document package into memory.
pub fn to_bytes(document: &Document) -> Result<Vec<u8>> {
    let cursor = write_package(document, Cursor::new(Vec::new()), Path::new("<memory>"))?;
    Ok(cursor.into_inner())
}

/// Saves the document package to `path`, returning the number of bytes written.
///
/// The package is assembled in a temporary file inside the destination directory and renamed
/// over `path` once complete.  When the directory is missing or unwritable, [`Error::Io`] is
/// returned and nothing is created.
pub fn save(document: &Document, path: &Path) -> Result<u64> {
    let bytes = write_atomically(path, |file| write_package(document, file, path).map(drop))?;
    debug!(
        "saved {} blocks to {} ({} bytes)",
        document.len(),
        path.display(),
        bytes
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twips_round_points() {
        assert_eq!(twips(72.0), 1440);
        assert_eq!(twips(0.3), 6);
        assert_eq!(twips(595.28), 11906);
    }

    #[test]
    fn style_ids_clamp_heading_levels() {
        assert_eq!(style_id(Role::Heading(1)).as_deref(), Some("Heading1"));
        assert_eq!(style_id(Role::Heading(12)).as_deref(), Some("Heading9"));
        assert_eq!(style_id(Role::Title).as_deref(), Some("Title"));
        assert_eq!(style_id(Role::Body), None);
    }

    #[test]
    fn package_is_a_zip_archive() {
        let bytes = to_bytes(&Document::default()).expect("serializes");
        assert_eq!(&bytes[..2], b"PK");
    }
}
