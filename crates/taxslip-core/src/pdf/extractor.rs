//! PDF page text extraction and bookmarking using lopdf and pdf-extract.

use lopdf::{Bookmark, Document, Object};
use tracing::{debug, warn};

use super::{PageBookmark, PdfProcessor, Result};
use crate::error::PdfError;

/// Outline entry color (black).
const BOOKMARK_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Per-page text via lopdf's content stream decoder.
    fn lopdf_page_texts(&self, doc: &Document) -> Vec<String> {
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        page_numbers
            .into_iter()
            .map(|page| match doc.extract_text(&[page]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to extract text from page {}: {}", page, e);
                    String::new()
                }
            })
            .collect()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        let doc = self.document()?;
        let texts = self.lopdf_page_texts(doc);

        if texts.iter().any(|t| !t.trim().is_empty()) {
            return Ok(texts);
        }

        // lopdf found nothing; pdf-extract handles more font encodings.
        debug!("No page text from lopdf, retrying with pdf-extract");
        match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
            Ok(pages) if pages.len() == texts.len() => Ok(pages),
            Ok(pages) => {
                warn!(
                    "pdf-extract returned {} pages, document has {}",
                    pages.len(),
                    texts.len()
                );
                Ok(texts)
            }
            Err(e) => {
                warn!("pdf-extract failed: {}", e);
                Ok(texts)
            }
        }
    }

    fn write_with_bookmarks(&self, bookmarks: &[PageBookmark]) -> Result<Vec<u8>> {
        let mut doc = self.document()?.clone();
        let pages = doc.get_pages();

        for bookmark in bookmarks {
            let page_id = *pages
                .get(&bookmark.page)
                .ok_or(PdfError::InvalidPage(bookmark.page))?;
            doc.add_bookmark(
                Bookmark::new(bookmark.title.clone(), BOOKMARK_COLOR, 0, page_id),
                None,
            );
        }

        if let Some(outline_id) = doc.build_outline() {
            let root_id = doc
                .trailer
                .get(b"Root")
                .and_then(Object::as_reference)
                .map_err(|e| PdfError::Write(e.to_string()))?;

            match doc.get_object_mut(root_id) {
                Ok(Object::Dictionary(catalog)) => {
                    catalog.set("Outlines", Object::Reference(outline_id));
                    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
                }
                _ => return Err(PdfError::Write("document catalog not found".to_string())),
            }
        }

        debug!("Writing PDF with {} bookmarks", bookmarks.len());

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(output)
    }
}
