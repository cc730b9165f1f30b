//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// An outline entry pointing at a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBookmark {
    /// Target page (1-indexed).
    pub page: u32,
    /// Title shown in the viewer's navigation pane.
    pub title: String,
}

impl PageBookmark {
    pub fn new(page: u32, title: impl Into<String>) -> Self {
        Self {
            page,
            title: title.into(),
        }
    }
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes. Fails if the document cannot be read or has
    /// no pages.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text for every page, in page order.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Serialize the loaded document with the given outline entries added.
    fn write_with_bookmarks(&self, bookmarks: &[PageBookmark]) -> Result<Vec<u8>>;
}
