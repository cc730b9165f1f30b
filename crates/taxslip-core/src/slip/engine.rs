//! Slip extraction engine combining built-in rules and custom patterns.

use std::collections::BTreeMap;

use tracing::debug;

use super::registry::PatternRegistry;
use super::rules::{classify, FieldExtractor, SinExtractor, ISSUER_NAME, TAXPAYER_NAME};
use super::SlipExtractor;
use crate::models::{CanonicalFields, ExtractionConfig, ExtractionResult, SlipType};

/// Extraction engine for one processing session.
///
/// Owns its pattern registry; sessions that need isolation should each
/// build their own engine (or clone a registry into one).
pub struct SlipEngine {
    registry: PatternRegistry,
    sin: SinExtractor,
}

impl SlipEngine {
    /// Create an engine with default settings and the default custom patterns.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create an engine from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            registry: PatternRegistry::from_config(config),
            sin: SinExtractor::new().with_validation(config.validate_sin),
        }
    }

    /// Replace the pattern registry.
    pub fn with_registry(mut self, registry: PatternRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set SIN checksum validation.
    pub fn with_sin_validation(mut self, validate: bool) -> Self {
        self.sin = SinExtractor::new().with_validation(validate);
        self
    }

    /// The session's custom pattern registry.
    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Classify page text against the built-in rules.
    pub fn classify(&self, text: &str) -> SlipType {
        if text.trim().is_empty() {
            return SlipType::Unrecognized;
        }
        classify(text)
    }

    /// Extract the built-in fields. Each field resolves independently.
    pub fn extract_canonical_fields(&self, text: &str) -> CanonicalFields {
        if text.trim().is_empty() {
            return CanonicalFields::default();
        }

        let slip_type = Some(self.classify(text)).filter(SlipType::is_recognized);

        CanonicalFields {
            sin: self.sin.extract(text).map(|m| m.value),
            slip_type,
            issuer_name: ISSUER_NAME.extract(text).map(|m| m.value),
            taxpayer_name: TAXPAYER_NAME.extract(text).map(|m| m.value),
        }
    }

    /// Extract caller-registered fields.
    pub fn extract_custom_fields(&self, text: &str) -> BTreeMap<String, String> {
        if text.trim().is_empty() {
            return BTreeMap::new();
        }
        self.registry.extract_all(text)
    }
}

impl Default for SlipEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SlipExtractor for SlipEngine {
    fn process(&self, text: &str) -> ExtractionResult {
        let classification = self.classify(text);
        let fields = self.extract_canonical_fields(text);
        let custom_fields = self.extract_custom_fields(text);

        debug!(
            "Page classified as {} ({} chars, {} custom fields)",
            classification,
            text.len(),
            custom_fields.len()
        );

        ExtractionResult {
            classification,
            fields,
            custom_fields,
        }
    }
}
