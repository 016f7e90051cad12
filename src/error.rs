//! Error types for the paper_builder crate.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::richtext::MarkupError;
use crate::table::MalformedTableError;

/// Result type alias for paper_builder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, saving or previewing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// A table's rows do not match the header's column count.
    #[error(transparent)]
    MalformedTable(#[from] MalformedTableError),

    /// Inline markup could not be parsed.
    #[error("invalid markup: {0}")]
    Markup(#[from] MarkupError),

    /// The destination (or source) file could not be written or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document package could not be assembled.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A reopened file is not a readable document package.
    #[error("parse error: {0}")]
    Parse(String),

    /// A required capability is still unavailable after the remediation attempt.
    #[error("required capability `{capability}` is unavailable: {reason}")]
    MissingDependency {
        /// Name of the capability that was probed.
        capability: String,
        /// Human-readable reason reported by the last probe.
        reason: String,
    },

    /// Rendering the PDF preview failed.
    #[error("PDF rendering error: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// Embedding the heading outline into the PDF preview failed.
    #[cfg(feature = "bookmarks")]
    #[error(transparent)]
    Bookmark(#[from] crate::bookmarks::BookmarkError),
}

impl Error {
    /// Wraps an I/O error together with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a [`Error::MissingDependency`] for the named capability.
    pub fn missing(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MissingDependency {
            capability: capability.into(),
            reason: reason.into(),
        }
    }

    /// Converts a zip error raised while writing `path`.
    pub(crate) fn from_zip(path: impl AsRef<Path>, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => Error::io(path, source),
            other => Error::Serialization(other.to_string()),
        }
    }

    /// Returns true for errors that a capability remediation may fix.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Error::MissingDependency { .. })
    }
}
