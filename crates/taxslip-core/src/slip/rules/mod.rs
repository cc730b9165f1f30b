//! Rule-based field extractors for Canadian tax slips.

pub mod classifier;
pub mod names;
pub mod patterns;
pub mod sin;

pub use classifier::{classify, ClassificationRule, CLASSIFICATION_RULES};
pub use names::{extract_issuer_name, extract_taxpayer_name, CandidateField, ISSUER_NAME, TAXPAYER_NAME};
pub use sin::{extract_sin, format_sin, validate_sin, SinExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched field value with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Extracted value.
    pub value: String,
    /// Index of the candidate pattern that produced the value.
    pub candidate: usize,
    /// Byte span of the value in the source text.
    pub position: (usize, usize),
}

impl FieldMatch {
    pub fn new(value: impl Into<String>, candidate: usize, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            candidate,
            position: (start, end),
        }
    }
}
