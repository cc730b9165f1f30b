//! Runtime registry of caller-defined field patterns.
//!
//! Every rule is compiled when it is added, so the registry never holds an
//! expression that fails to parse. Rules are independent of each other: the
//! result of [`PatternRegistry::extract_all`] does not depend on the order in
//! which rules were added.
//!
//! Matching uses the `regex` crate, which runs in time linear in the input
//! and never backtracks. Compiled programs are capped in size at add time,
//! and rules are not evaluated against text longer than the configured input
//! bound, so a caller-supplied pattern cannot stall a page.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::PatternError;
use crate::models::config::{ExtractionConfig, DEFAULT_MAX_INPUT_BYTES, DEFAULT_PATTERN_SIZE_LIMIT};

/// Patterns seeded by [`PatternRegistry::with_defaults`].
pub const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("amount", r"\$\s*[\d,]+\.?\d*"),
    ("date", r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}"),
    ("account_number", r"Account\s*#?\s*:\s*(\d+)"),
    ("box_number", r"Box\s*(\d+)"),
    ("box_amount", r"Box\s*\d+\s*:\s*(\$?\s*[\d,]+\.?\d*)"),
];

/// A validated, compiled custom field pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    expression: String,
    group: Option<usize>,
    regex: Regex,
}

/// Serializable description of a [`PatternRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub name: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
}

impl PatternRule {
    /// Compile a rule with the default size limit.
    ///
    /// `group` overrides which capture group is returned. Without it, group 1
    /// is used when the expression has capture groups, otherwise the whole
    /// match.
    pub fn compile(
        name: impl Into<String>,
        expression: impl Into<String>,
        group: Option<usize>,
    ) -> Result<Self, PatternError> {
        Self::compile_with_limit(name, expression, group, DEFAULT_PATTERN_SIZE_LIMIT)
    }

    /// Compile a rule, rejecting programs larger than `size_limit` bytes.
    pub fn compile_with_limit(
        name: impl Into<String>,
        expression: impl Into<String>,
        group: Option<usize>,
        size_limit: usize,
    ) -> Result<Self, PatternError> {
        let name = name.into();
        let expression = expression.into();

        if name.trim().is_empty() {
            return Err(PatternError::EmptyName);
        }

        let regex = RegexBuilder::new(&expression)
            .size_limit(size_limit)
            .build()
            .map_err(|e| match e {
                regex::Error::CompiledTooBig(limit) => PatternError::TooLarge {
                    name: name.clone(),
                    limit,
                },
                other => PatternError::InvalidExpression {
                    name: name.clone(),
                    reason: other.to_string(),
                },
            })?;

        // captures_len counts the implicit whole-match group.
        let available = regex.captures_len() - 1;
        if let Some(requested) = group {
            if requested > available {
                return Err(PatternError::MissingGroup {
                    name,
                    requested,
                    available,
                });
            }
        }

        Ok(Self {
            name,
            expression,
            group,
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Explicit group override, if any.
    pub fn group(&self) -> Option<usize> {
        self.group
    }

    /// The capture group this rule returns.
    pub fn effective_group(&self) -> usize {
        match self.group {
            Some(group) => group,
            None if self.regex.captures_len() > 1 => 1,
            None => 0,
        }
    }

    /// Apply the rule to `text`. Only the first match is considered; an
    /// empty or non-participating group counts as no match.
    pub fn extract(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let value = caps.get(self.effective_group())?.as_str();
        if value.is_empty() {
            return None;
        }
        Some(value.to_string())
    }

    pub fn spec(&self) -> PatternSpec {
        PatternSpec {
            name: self.name.clone(),
            expression: self.expression.clone(),
            group: self.group,
        }
    }
}

/// Registry of custom field patterns keyed by field name.
///
/// Writers take an exclusive lock; concurrent readers share it, so an
/// in-flight extraction never observes a half-inserted rule.
pub struct PatternRegistry {
    rules: RwLock<HashMap<String, PatternRule>>,
    size_limit: usize,
    max_input_bytes: usize,
}

impl PatternRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
            size_limit: DEFAULT_PATTERN_SIZE_LIMIT,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    /// Create a registry seeded with [`DEFAULT_PATTERNS`].
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.seed_defaults();
        registry
    }

    /// Create a registry using the limits (and seeding choice) in `config`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let registry = Self::new()
            .with_size_limit(config.pattern_size_limit)
            .with_max_input_bytes(config.max_input_bytes);
        if config.seed_default_patterns {
            registry.seed_defaults();
        }
        registry
    }

    /// Set the compiled size limit for rules added from now on.
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Set the longest text rules are evaluated against.
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }

    fn seed_defaults(&self) {
        for (name, expression) in DEFAULT_PATTERNS {
            if let Err(e) = self.add(*name, *expression) {
                warn!("Default pattern {} rejected: {}", name, e);
            }
        }
    }

    /// Compile and register `expression` under `name`, replacing any rule
    /// with the same name. On error the registry is left unchanged.
    pub fn add(&self, name: impl Into<String>, expression: impl Into<String>) -> Result<(), PatternError> {
        self.add_with_group(name, expression, None)
    }

    /// Like [`add`](Self::add), with an explicit capture group.
    pub fn add_with_group(
        &self,
        name: impl Into<String>,
        expression: impl Into<String>,
        group: Option<usize>,
    ) -> Result<(), PatternError> {
        let rule = PatternRule::compile_with_limit(name, expression, group, self.size_limit)?;
        self.insert(rule);
        Ok(())
    }

    /// Register an already compiled rule. Returns the rule it replaced.
    pub fn insert(&self, rule: PatternRule) -> Option<PatternRule> {
        debug!("Registering pattern {}: {}", rule.name, rule.expression);
        self.rules.write().insert(rule.name.clone(), rule)
    }

    /// Remove a rule. Returns `None` if no rule had that name.
    pub fn remove(&self, name: &str) -> Option<PatternRule> {
        let removed = self.rules.write().remove(name);
        if removed.is_some() {
            debug!("Removed pattern {}", name);
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<PatternRule> {
        self.rules.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Registered field names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered rules, sorted by name.
    pub fn rules(&self) -> Vec<PatternRule> {
        let mut rules: Vec<PatternRule> = self.rules.read().values().cloned().collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        rules
    }

    pub fn clear(&self) {
        self.rules.write().clear();
    }

    fn within_input_bound(&self, text: &str) -> bool {
        if text.len() > self.max_input_bytes {
            warn!(
                "Skipping custom patterns: text is {} bytes, limit is {}",
                text.len(),
                self.max_input_bytes
            );
            return false;
        }
        true
    }

    /// Extract a single named field. `None` if the name is unknown, the text
    /// exceeds the input bound, or the pattern does not match.
    pub fn extract_field(&self, text: &str, name: &str) -> Option<String> {
        if !self.within_input_bound(text) {
            return None;
        }
        self.rules.read().get(name)?.extract(text)
    }

    /// Apply every rule to `text`. Only matching fields appear in the map.
    pub fn extract_all(&self, text: &str) -> BTreeMap<String, String> {
        if !self.within_input_bound(text) {
            return BTreeMap::new();
        }

        let rules = self.rules.read();
        rules
            .values()
            .filter_map(|rule| {
                let value = rule.extract(text)?;
                trace!("Custom field {} matched: {}", rule.name, value);
                Some((rule.name.clone(), value))
            })
            .collect()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PatternRegistry {
    /// Snapshot the registry into an independent instance.
    fn clone(&self) -> Self {
        Self {
            rules: RwLock::new(self.rules.read().clone()),
            size_limit: self.size_limit,
            max_input_bytes: self.max_input_bytes,
        }
    }
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("names", &self.names())
            .field("size_limit", &self.size_limit)
            .field("max_input_bytes", &self.max_input_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_and_extract() {
        let registry = PatternRegistry::new();
        registry.add("amount", r"\$\s*[\d,]+\.?\d*").unwrap();

        assert_eq!(
            registry.extract_field("Total: $1,250.00", "amount"),
            Some("$1,250.00".to_string())
        );
    }

    #[test]
    fn test_remove_then_absent() {
        let registry = PatternRegistry::new();
        registry.add("box", r"Box\s*(\d+)").unwrap();
        assert_eq!(registry.extract_field("Box 14", "box"), Some("14".to_string()));

        assert!(registry.remove("box").is_some());
        assert_eq!(registry.extract_field("Box 14", "box"), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = PatternRegistry::with_defaults();
        let before = registry.len();

        assert!(registry.remove("date").is_some());
        assert!(registry.remove("date").is_none());
        assert_eq!(registry.len(), before - 1);
        assert!(!registry.contains("date"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let registry = PatternRegistry::with_defaults();
        let before = registry.len();

        let err = registry.add("x", "[unterminated").unwrap_err();
        assert!(matches!(err, PatternError::InvalidExpression { .. }));
        assert_eq!(registry.len(), before);
        assert!(!registry.contains("x"));
    }

    #[test]
    fn test_invalid_pattern_keeps_previous_rule() {
        let registry = PatternRegistry::new();
        registry.add("code", r"Code (\w+)").unwrap();
        assert!(registry.add("code", "(").is_err());
        assert_eq!(registry.get("code").unwrap().expression(), r"Code (\w+)");
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = PatternRegistry::new();
        assert_eq!(registry.add("  ", r"\d+"), Err(PatternError::EmptyName));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let registry = PatternRegistry::new();
        registry.add("n", r"\d+").unwrap();
        registry.add("n", r"[a-z]+").unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.extract_field("abc 123", "n"), Some("abc".to_string()));
    }

    #[test]
    fn test_first_group_preferred() {
        let registry = PatternRegistry::new();
        registry.add("pair", r"(\d+)-(\d+)").unwrap();
        assert_eq!(registry.extract_field("10-20", "pair"), Some("10".to_string()));
    }

    #[test]
    fn test_explicit_group_override() {
        let registry = PatternRegistry::new();
        registry.add_with_group("second", r"(\d+)-(\d+)", Some(2)).unwrap();
        registry.add_with_group("whole", r"(\d+)-(\d+)", Some(0)).unwrap();

        assert_eq!(registry.extract_field("10-20", "second"), Some("20".to_string()));
        assert_eq!(registry.extract_field("10-20", "whole"), Some("10-20".to_string()));
    }

    #[test]
    fn test_missing_group_rejected() {
        let err = PatternRule::compile("g", r"(\d+)", Some(2)).unwrap_err();
        assert_eq!(
            err,
            PatternError::MissingGroup {
                name: "g".to_string(),
                requested: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn test_non_participating_group_is_absent() {
        let registry = PatternRegistry::new();
        registry.add("opt", r"Ref(?:: (\d+))?").unwrap();
        assert_eq!(registry.extract_field("Ref", "opt"), None);
        assert_eq!(registry.extract_field("Ref: 42", "opt"), Some("42".to_string()));
    }

    #[test]
    fn test_only_first_match_considered() {
        let registry = PatternRegistry::new();
        registry.add("box", r"Box\s*(\d+)").unwrap();
        assert_eq!(
            registry.extract_field("Box 14 and Box 22", "box"),
            Some("14".to_string())
        );
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let registry = PatternRegistry::with_defaults();
        assert_eq!(registry.extract_field("Total: $5", "missing"), None);
    }

    #[test]
    fn test_extract_all_defaults() {
        let registry = PatternRegistry::with_defaults();
        let text = "Account #: 99887\nBox 14: $52,000.00\nDate 12/31/2023";
        let fields = registry.extract_all(text);

        assert_eq!(fields.get("account_number").map(String::as_str), Some("99887"));
        assert_eq!(fields.get("box_number").map(String::as_str), Some("14"));
        assert_eq!(fields.get("box_amount").map(String::as_str), Some("$52,000.00"));
        assert_eq!(fields.get("amount").map(String::as_str), Some("$52,000.00"));
        assert_eq!(fields.get("date").map(String::as_str), Some("12/31/2023"));
    }

    #[test]
    fn test_extract_all_omits_misses() {
        let registry = PatternRegistry::with_defaults();
        let fields = registry.extract_all("no matches at all");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_extract_all_independent_of_insertion_order() {
        let a = PatternRegistry::new();
        a.add("x", r"x(\d)").unwrap();
        a.add("y", r"y(\d)").unwrap();

        let b = PatternRegistry::new();
        b.add("y", r"y(\d)").unwrap();
        b.add("x", r"x(\d)").unwrap();

        let text = "x1 y2";
        assert_eq!(a.extract_all(text), b.extract_all(text));
    }

    #[test]
    fn test_compiled_size_limit() {
        let registry = PatternRegistry::new().with_size_limit(1024);
        let err = registry.add("huge", r"\w{1000}").unwrap_err();
        assert!(matches!(err, PatternError::TooLarge { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_input_bound_reports_absent() {
        let registry = PatternRegistry::new().with_max_input_bytes(16);
        registry.add("digits", r"\d+").unwrap();

        let long_text = format!("{}123", "a".repeat(32));
        assert_eq!(registry.extract_field(&long_text, "digits"), None);
        assert!(registry.extract_all(&long_text).is_empty());
        assert_eq!(registry.extract_field("abc 123", "digits"), Some("123".to_string()));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = PatternRegistry::with_defaults();
        let session = original.clone();
        session.remove("amount");

        assert!(original.contains("amount"));
        assert!(!session.contains("amount"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = PatternRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["account_number", "amount", "box_amount", "box_number", "date"]
        );
    }

    #[test]
    fn test_spec_roundtrip_fields() {
        let rule = PatternRule::compile("second", r"(\d+)-(\d+)", Some(2)).unwrap();
        let spec = rule.spec();
        assert_eq!(spec.name, "second");
        assert_eq!(spec.group, Some(2));
        assert_eq!(rule.effective_group(), 2);
    }
}
