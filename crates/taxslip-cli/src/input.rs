//! Loading page text from input documents.

use std::fs;
use std::path::Path;

use tracing::debug;

use taxslip_core::{PdfExtractor, PdfProcessor};

/// Page separator in plain-text inputs.
const FORM_FEED: char = '\u{000C}';

/// Supported input file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Text,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Some(InputKind::Pdf),
            "txt" | "text" => Some(InputKind::Text),
            _ => None,
        }
    }
}

/// A document split into pages of text.
pub struct LoadedDocument {
    pub kind: InputKind,
    pub pages: Vec<String>,
    /// The parsed PDF, kept for re-emission with bookmarks.
    pub pdf: Option<PdfExtractor>,
}

/// Split plain text into pages on form feeds.
pub fn split_pages(text: &str) -> Vec<String> {
    text.split(FORM_FEED).map(str::to_string).collect()
}

/// Read `path` and recover its page texts.
pub fn load_document(path: &Path) -> anyhow::Result<LoadedDocument> {
    let kind = InputKind::from_path(path)
        .ok_or_else(|| anyhow::anyhow!("Unsupported file format: {}", path.display()))?;

    match kind {
        InputKind::Pdf => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;

            let pages = extractor.extract_page_texts()?;
            debug!("PDF {} has {} pages", path.display(), pages.len());

            Ok(LoadedDocument {
                kind,
                pages,
                pdf: Some(extractor),
            })
        }
        InputKind::Text => {
            let text = fs::read_to_string(path)?;
            let pages = split_pages(&text);
            debug!("Text file {} has {} pages", path.display(), pages.len());

            Ok(LoadedDocument {
                kind,
                pages,
                pdf: None,
            })
        }
    }
}
