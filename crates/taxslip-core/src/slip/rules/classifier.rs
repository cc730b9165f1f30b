//! Slip type classification.
//!
//! Rules are evaluated in declared order and the first match decides the
//! label. A page mentioning both "T4" and "T4A Statement of Pension" is a
//! `T4`, because the T4 rule is declared first. Reordering this list changes
//! output for real documents.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::patterns::*;
use crate::models::SlipType;

/// An ordered (label, pattern) classification rule.
pub struct ClassificationRule {
    /// Label assigned when the rule matches.
    pub slip_type: SlipType,
    /// Case-insensitive pattern searched anywhere in the page.
    pub pattern: &'static Regex,
}

impl ClassificationRule {
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

lazy_static! {
    /// Built-in classification rules in evaluation order.
    pub static ref CLASSIFICATION_RULES: Vec<ClassificationRule> = vec![
        ClassificationRule { slip_type: SlipType::T4, pattern: &SLIP_T4 },
        ClassificationRule { slip_type: SlipType::T4A, pattern: &SLIP_T4A },
        ClassificationRule { slip_type: SlipType::T5, pattern: &SLIP_T5 },
        ClassificationRule { slip_type: SlipType::T3, pattern: &SLIP_T3 },
        ClassificationRule { slip_type: SlipType::T5008, pattern: &SLIP_T5008 },
        ClassificationRule { slip_type: SlipType::T1135, pattern: &SLIP_T1135 },
        ClassificationRule { slip_type: SlipType::CapitalGains, pattern: &SLIP_CAPITAL_GAINS },
        ClassificationRule { slip_type: SlipType::Summary, pattern: &SLIP_SUMMARY },
    ];
}

/// Classify page text, returning [`SlipType::Unrecognized`] if no rule matches.
pub fn classify(text: &str) -> SlipType {
    for rule in CLASSIFICATION_RULES.iter() {
        if rule.matches(text) {
            trace!("Classification rule {} matched", rule.slip_type);
            return rule.slip_type;
        }
    }
    SlipType::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_order_is_declared_order() {
        let order: Vec<SlipType> = CLASSIFICATION_RULES.iter().map(|r| r.slip_type).collect();
        assert_eq!(
            order,
            vec![
                SlipType::T4,
                SlipType::T4A,
                SlipType::T5,
                SlipType::T3,
                SlipType::T5008,
                SlipType::T1135,
                SlipType::CapitalGains,
                SlipType::Summary,
            ]
        );
    }

    #[test]
    fn test_classify_each_slip() {
        assert_eq!(classify("T4 Statement of Remuneration Paid"), SlipType::T4);
        assert_eq!(classify("T5 Statement of Investment Income"), SlipType::T5);
        assert_eq!(classify("T3 Statement of Trust Income Allocations"), SlipType::T3);
        assert_eq!(
            classify("T1135 Foreign Income Verification Statement"),
            SlipType::T1135
        );
        assert_eq!(classify("Realized Gain Summary 2023"), SlipType::CapitalGains);
        assert_eq!(classify("Summary of 2023 Returns"), SlipType::Summary);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("t5 statement of investment income"), SlipType::T5);
        assert_eq!(classify("CAPITAL GAINS STATEMENT"), SlipType::CapitalGains);
    }

    #[test]
    fn test_first_match_wins() {
        // Both the T4 and T4A rules match; T4 is declared first.
        assert_eq!(classify("T4A Statement of Pension"), SlipType::T4);
        // Both the capital gains and summary rules match.
        assert_eq!(
            classify("Capital Gains Summary\nT1 Summary"),
            SlipType::CapitalGains
        );
    }

    #[test]
    fn test_t5008_without_t4_token() {
        // The T5 rule needs its own title; T5008 falls through to its rule.
        assert_eq!(
            classify("T5008 Statement of Securities Transactions"),
            SlipType::T5008
        );
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify("Grocery receipt, thank you for shopping"), SlipType::Unrecognized);
        assert_eq!(classify(""), SlipType::Unrecognized);
    }

    #[test]
    fn test_summary_does_not_span_lines() {
        assert_eq!(classify("Summary of\nReturns"), SlipType::Unrecognized);
    }
}
