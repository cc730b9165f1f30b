//! Configuration structures for slip extraction.

use serde::{Deserialize, Serialize};

use super::slip::UNKNOWN_ISSUER;
use crate::error::{Result, TaxslipError};

/// Default upper bound on the text a custom pattern is run against.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1 << 20;

/// Default compiled program size limit for custom patterns.
pub const DEFAULT_PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Seed the pattern registry with the default custom fields.
    pub seed_default_patterns: bool,

    /// Require SIN candidates to pass the Luhn checksum.
    pub validate_sin: bool,

    /// Longest page text (in bytes) custom patterns are evaluated against.
    pub max_input_bytes: usize,

    /// Compiled size limit for custom pattern expressions.
    pub pattern_size_limit: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            seed_default_patterns: true,
            validate_sin: false,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            pattern_size_limit: DEFAULT_PATTERN_SIZE_LIMIT,
        }
    }
}

impl ExtractionConfig {
    /// Check that the limits leave room for matching anything at all.
    pub fn validate(&self) -> Result<()> {
        if self.max_input_bytes == 0 {
            return Err(TaxslipError::Config(
                "extraction.max_input_bytes must be greater than zero".to_string(),
            ));
        }
        if self.pattern_size_limit == 0 {
            return Err(TaxslipError::Config(
                "extraction.pattern_size_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output configuration for document re-emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Text used in navigation labels when no issuer was found.
    pub unknown_issuer: String,

    /// Add bookmarks for unrecognized pages too.
    pub bookmark_unrecognized: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            unknown_issuer: UNKNOWN_ISSUER.to_string(),
            bookmark_unrecognized: true,
        }
    }
}
