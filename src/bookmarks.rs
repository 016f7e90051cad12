//! PDF outline entries for headings, built on top of `lopdf`.

use std::collections::BTreeMap;

use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::pdf::HeadingPage;

/// Deepest heading level that receives an outline entry.
pub const MAX_OUTLINE_LEVEL: u8 = 2;

/// Errors that can occur while embedding bookmarks into a rendered preview.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("failed to process PDF bytes: {0}")]
    Pdf(#[from] lopdf::Error),
    /// A required catalog entry was missing from the document trailer.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A heading refers to a page that does not exist in the rendered document.
    #[error("heading {heading_index} refers to missing page {page_number}")]
    MissingPage {
        /// Index of the heading among all headings of the document.
        heading_index: usize,
        /// The requested (1-based) page number.
        page_number: usize,
    },
}

/// Adds a flat outline with one `/Dest [page /Fit]` entry per heading of level
/// [`MAX_OUTLINE_LEVEL`] or less.  Headings without a page are skipped, and the input is returned
/// unchanged when no heading qualifies.
pub fn apply_heading_bookmarks(
    pdf_bytes: &[u8],
    headings: &[HeadingPage],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let targets = outline_targets(headings, &document.get_pages())?;
    if targets.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let root = document.new_object_id();
    let ids: Vec<ObjectId> = targets.iter().map(|_| document.new_object_id()).collect();
    for (position, (page, title)) in targets.iter().enumerate() {
        let item = outline_item(root, *page, title, &ids, position);
        document.objects.insert(ids[position], Object::Dictionary(item));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name(b"Outlines".to_vec()));
    outlines.set("Count", Object::Integer(ids.len() as i64));
    outlines.set("First", Object::Reference(ids[0]));
    outlines.set("Last", Object::Reference(ids[ids.len() - 1]));
    document.objects.insert(root, Object::Dictionary(outlines));
    attach_to_catalog(&mut document, root)?;

    debug!("added {} outline entries", ids.len());
    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|err| BookmarkError::Pdf(err.into()))?;
    Ok(buffer)
}

/// Page object and title of every heading that gets an entry.
fn outline_targets<'a>(
    headings: &'a [HeadingPage],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<(ObjectId, &'a str)>, BookmarkError> {
    headings
        .iter()
        .enumerate()
        .filter(|(_, heading)| heading.level <= MAX_OUTLINE_LEVEL)
        .filter_map(|(index, heading)| heading.page.map(|page| (index, page, heading)))
        .map(|(heading_index, page_number, heading)| {
            u32::try_from(page_number)
                .ok()
                .and_then(|number| pages.get(&number).copied())
                .map(|page| (page, heading.text.as_str()))
                .ok_or(BookmarkError::MissingPage {
                    heading_index,
                    page_number,
                })
        })
        .collect()
}

fn outline_item(
    root: ObjectId,
    page: ObjectId,
    title: &str,
    siblings: &[ObjectId],
    position: usize,
) -> Dictionary {
    let mut item = Dictionary::new();
    item.set("Title", Object::string_literal(title));
    item.set("Parent", Object::Reference(root));
    item.set(
        "Dest",
        Object::Array(vec![Object::Reference(page), Object::Name(b"Fit".to_vec())]),
    );
    if let Some(previous) = position.checked_sub(1).map(|index| siblings[index]) {
        item.set("Prev", Object::Reference(previous));
    }
    if let Some(next) = siblings.get(position + 1) {
        item.set("Next", Object::Reference(*next));
    }
    item
}

fn attach_to_catalog(document: &mut Document, outlines: ObjectId) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;
    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
    Ok(())
}
