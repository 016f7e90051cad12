//! Document construction helpers.

use crate::model::{Document, Metadata, PageConfig, PageMargins, PaperSize};
use crate::style::{EffectiveStyle, Theme};

/// Builder for [`Document`] instances pre-configured with the crate defaults.
///
/// ```
/// use paper_builder::builder::DocumentBuilder;
/// use paper_builder::model::{inches, PageMargins, PaperSize};
/// use paper_builder::style::EffectiveStyle;
///
/// let doc = DocumentBuilder::new()
///     .with_paper_size(PaperSize::A4)
///     .with_margins(PageMargins::uniform(inches(1.0)))
///     .with_default_style(EffectiveStyle::new("Times New Roman", 10.0))
///     .with_title("Draft")
///     .build();
/// assert!(doc.is_empty());
/// assert_eq!(doc.page().paper(), PaperSize::A4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DocumentBuilder {
    paper_size: Option<PaperSize>,
    margins: Option<PageMargins>,
    default_style: Option<EffectiveStyle>,
    theme: Option<Theme>,
    metadata: Metadata,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size used for the document.
    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = Some(paper_size);
        self
    }

    /// Sets the page margins.
    pub fn with_margins(mut self, margins: PageMargins) -> Self {
        self.margins = Some(margins);
        self
    }

    /// Sets the style every block inherits from.
    pub fn with_default_style(mut self, style: EffectiveStyle) -> Self {
        self.default_style = Some(style);
        self
    }

    /// Sets the per-role base styles.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Sets the title stored in the document properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Sets the author stored in the document properties.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    /// Builds an empty document.
    pub fn build(self) -> Document {
        let page = PageConfig::new(
            self.paper_size.unwrap_or_default(),
            self.margins.unwrap_or_default(),
        );
        Document::with_parts(
            page,
            self.default_style.unwrap_or_default(),
            self.theme.unwrap_or_default(),
            self.metadata,
        )
    }
}
