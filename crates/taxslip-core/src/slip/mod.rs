//! Tax slip classification and field extraction.

mod engine;
pub mod registry;
pub mod rules;

pub use engine::SlipEngine;
pub use registry::{PatternRegistry, PatternRule, PatternSpec, DEFAULT_PATTERNS};

use crate::models::{ExtractionResult, PageRecord};

/// Trait for page-level slip extraction.
pub trait SlipExtractor {
    /// Classify one page of text and extract its fields.
    fn process(&self, text: &str) -> ExtractionResult;

    /// Process a document's pages in order. Pages are numbered from 1.
    fn process_pages<I, S>(&self, pages: I) -> Vec<PageRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        Self: Sized,
    {
        pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageRecord {
                page: i as u32 + 1,
                result: self.process(text.as_ref()),
            })
            .collect()
    }
}
