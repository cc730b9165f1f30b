//! SIN (Canadian Social Insurance Number) extraction and validation.
//!
//! Separators between digit groups are tolerated when matching, but the
//! value is returned exactly as it appears in the text.

use super::patterns::SIN_PATTERN;
use super::{FieldExtractor, FieldMatch};

/// SIN field extractor.
pub struct SinExtractor {
    validate: bool,
}

impl SinExtractor {
    /// Create a new SIN extractor. Checksum validation is off by default.
    pub fn new() -> Self {
        Self { validate: false }
    }

    /// Set whether to require a valid Luhn checksum.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for SinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SinExtractor {
    fn candidates<'t>(&self, text: &'t str) -> impl Iterator<Item = FieldMatch> + 't {
        let validate = self.validate;
        SIN_PATTERN
            .find_iter(text)
            .filter(move |m| !joined_by_hyphen(&text[..m.start()], &text[m.end()..]))
            .filter(move |m| !validate || validate_sin(m.as_str()))
            .map(|m| FieldMatch::new(m.as_str(), 0, m.start(), m.end()))
    }
}

impl FieldExtractor for SinExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.candidates(text).next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.candidates(text).collect()
    }
}

/// True if the match continues a hyphenated number on either side, as in
/// `123-456-789-01` or `01-123-456-789`.
fn joined_by_hyphen(before: &str, after: &str) -> bool {
    let is_separator = |c: char| c == '-' || c.is_whitespace();

    let tail = before.trim_end_matches(is_separator);
    let leading = &before[tail.len()..];
    if leading.contains('-') && tail.ends_with(|c: char| c.is_ascii_digit()) {
        return true;
    }

    let head = after.trim_start_matches(is_separator);
    let trailing = &after[..after.len() - head.len()];
    trailing.contains('-') && head.starts_with(|c: char| c.is_ascii_digit())
}

/// Extract the first SIN from text, verbatim.
pub fn extract_sin(text: &str) -> Option<String> {
    SinExtractor::new().extract(text).map(|m| m.value)
}

/// Validate a SIN using the Luhn algorithm.
///
/// Separators are ignored; exactly nine digits are required.
pub fn validate_sin(sin: &str) -> bool {
    let digits: Vec<u32> = sin.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 9 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Format a SIN as `XXX XXX XXX`. Returns the input unchanged if it does
/// not contain exactly nine digits.
pub fn format_sin(sin: &str) -> String {
    let digits: String = sin.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 9 {
        return sin.to_string();
    }

    format!("{} {} {}", &digits[0..3], &digits[3..6], &digits[6..9])
}
