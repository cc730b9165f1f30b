//! Extraction result models for Canadian tax slips.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used in navigation labels when no issuer was found.
pub const UNKNOWN_ISSUER: &str = "Unknown Issuer";

/// Record type assigned to a page by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlipType {
    /// Statement of Remuneration Paid.
    T4,
    /// Statement of Pension, Retirement, Annuity and Other Income.
    T4A,
    /// Statement of Investment Income.
    T5,
    /// Statement of Trust Income Allocations and Designations.
    T3,
    /// Statement of Securities Transactions.
    T5008,
    /// Foreign Income Verification Statement.
    T1135,
    /// Capital gains / realized gain summary or statement.
    #[serde(rename = "Capital Gains")]
    CapitalGains,
    /// Tax return summary page.
    Summary,
    /// No classification rule matched.
    #[default]
    Unrecognized,
}

impl SlipType {
    /// Human-readable label, as printed in navigation entries.
    pub fn label(&self) -> &'static str {
        match self {
            SlipType::T4 => "T4",
            SlipType::T4A => "T4A",
            SlipType::T5 => "T5",
            SlipType::T3 => "T3",
            SlipType::T5008 => "T5008",
            SlipType::T1135 => "T1135",
            SlipType::CapitalGains => "Capital Gains",
            SlipType::Summary => "Summary",
            SlipType::Unrecognized => "Unrecognized",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SlipType::Unrecognized)
    }
}

impl fmt::Display for SlipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The engine's fixed set of built-in fields.
///
/// `None` means the field was not detected on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFields {
    /// Social Insurance Number, verbatim as it appears on the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sin: Option<String>,

    /// Slip type, present only when the page was recognized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slip_type: Option<SlipType>,

    /// Issuer (employer, payer, institution) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,

    /// Taxpayer (recipient, employee) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxpayer_name: Option<String>,
}

impl CanonicalFields {
    /// Returns true when no canonical field was detected.
    pub fn is_empty(&self) -> bool {
        self.sin.is_none()
            && self.slip_type.is_none()
            && self.issuer_name.is_none()
            && self.taxpayer_name.is_none()
    }
}

/// Result of processing a single page of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Classification label.
    pub classification: SlipType,

    /// Built-in fields.
    pub fields: CanonicalFields,

    /// Caller-registered fields that matched. Missing keys were not found.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
}

impl ExtractionResult {
    pub fn is_recognized(&self) -> bool {
        self.classification.is_recognized()
    }

    /// Issuer name, or `placeholder` when none was detected.
    pub fn issuer_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.fields.issuer_name.as_deref().unwrap_or(placeholder)
    }

    /// Navigation label in the form `"{label} - {issuer}"`.
    pub fn navigation_label(&self, placeholder: &str) -> String {
        format!("{} - {}", self.classification, self.issuer_or(placeholder))
    }
}

/// Extraction result tagged with its 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed).
    pub page: u32,

    #[serde(flatten)]
    pub result: ExtractionResult,
}
