//! Issuer and taxpayer name extraction.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::patterns::*;
use super::{FieldExtractor, FieldMatch};

/// A field resolved from an ordered list of candidate patterns.
///
/// Each candidate captures the value in group 1. Candidates are tried in
/// declared order; a capture that is empty after trimming does not count.
pub struct CandidateField {
    /// Field name, used in trace output.
    pub name: &'static str,
    /// Candidate patterns in priority order.
    pub candidates: Vec<&'static Regex>,
}

impl CandidateField {
    fn captures<'t>(&self, index: usize, text: &'t str) -> impl Iterator<Item = FieldMatch> + 't {
        let pattern: &'static Regex = self.candidates[index];
        pattern.captures_iter(text).filter_map(move |caps| {
            let group = caps.get(1)?;
            let trimmed = group.as_str().trim();
            if trimmed.is_empty() {
                return None;
            }
            let offset = group.as_str().find(trimmed).unwrap_or(0);
            let start = group.start() + offset;
            Some(FieldMatch::new(trimmed, index, start, start + trimmed.len()))
        })
    }
}

impl FieldExtractor for CandidateField {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let found = (0..self.candidates.len()).find_map(|i| self.captures(i, text).next());
        if let Some(m) = &found {
            trace!("{} matched candidate {}: {:?}", self.name, m.candidate, m.value);
        }
        found
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        (0..self.candidates.len())
            .flat_map(|i| self.captures(i, text))
            .collect()
    }
}

lazy_static! {
    /// Issuer name: labelled issuer line, then company name line, then a
    /// "From:"/"By:" line naming an incorporated entity.
    pub static ref ISSUER_NAME: CandidateField = CandidateField {
        name: "issuer_name",
        candidates: vec![&ISSUER_LABELED, &ISSUER_NAME_LINE, &ISSUER_FROM_ENTITY],
    };

    /// Taxpayer name: labelled recipient line, then "Surname, First Name:",
    /// then an addressee line.
    pub static ref TAXPAYER_NAME: CandidateField = CandidateField {
        name: "taxpayer_name",
        candidates: vec![&TAXPAYER_LABELED, &TAXPAYER_SURNAME_FIRST, &TAXPAYER_ADDRESSEE],
    };
}

/// Extract the issuer name from text.
pub fn extract_issuer_name(text: &str) -> Option<String> {
    ISSUER_NAME.extract(text).map(|m| m.value)
}

/// Extract the taxpayer name from text.
pub fn extract_taxpayer_name(text: &str) -> Option<String> {
    TAXPAYER_NAME.extract(text).map(|m| m.value)
}
