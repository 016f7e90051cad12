//! Core entry point for the paper_builder crate.
//!
//! Papers are assembled block by block into a [`Document`] and saved as `.docx`; the same
//! document can be previewed as PDF through [`pdf`].

pub mod builder;
pub mod capability;
pub mod docx;
pub mod error;
pub mod fonts;
pub mod model;
mod output;
pub mod pdf;
pub mod richtext;
pub mod samples;
pub mod style;
pub mod table;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::DocumentBuilder;
pub use error::{Error, Result};
pub use model::{Block, BlockKind, Document, PageConfig, Paragraph};
pub use richtext::Span;
pub use style::{EffectiveStyle, HorizontalAlignment, Style};
pub use table::{MalformedTableError, Region, Table};
