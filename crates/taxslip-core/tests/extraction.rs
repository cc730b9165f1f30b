//! End-to-end extraction behaviour over realistic page text.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use taxslip_core::models::UNKNOWN_ISSUER;
use taxslip_core::slip::rules::ISSUER_NAME;
use taxslip_core::slip::rules::FieldExtractor;
use taxslip_core::{PatternError, SlipEngine, SlipExtractor, SlipType};

#[test]
fn t4_page_with_employer() {
    let engine = SlipEngine::new();
    let text = "CANADA REVENUE AGENCY\nT4 Statement of Remuneration Paid\nEmployer: Acme Corp Ltd\n";

    assert_eq!(engine.classify(text), SlipType::T4);
    let fields = engine.extract_canonical_fields(text);
    assert_eq!(fields.issuer_name.as_deref(), Some("Acme Corp Ltd"));

    let result = engine.process(text);
    assert_eq!(result.navigation_label(UNKNOWN_ISSUER), "T4 - Acme Corp Ltd");
}

#[test]
fn sin_is_returned_verbatim() {
    let engine = SlipEngine::new();
    let fields = engine.extract_canonical_fields("Box 12 SIN: 123 456 789");
    assert_eq!(fields.sin.as_deref(), Some("123 456 789"));
}

#[test]
fn no_markers_means_unrecognized_and_absent() {
    let engine = SlipEngine::new();
    let text = "Lorem ipsum dolor sit amet";

    assert_eq!(engine.classify(text), SlipType::Unrecognized);
    assert!(engine.extract_canonical_fields(text).is_empty());
}

#[test]
fn empty_text_never_fails() {
    let engine = SlipEngine::new();
    assert!(engine.extract_canonical_fields("").is_empty());
    assert_eq!(engine.classify(""), SlipType::Unrecognized);
    assert!(engine.extract_custom_fields("").is_empty());
}

#[test]
fn custom_amount_field() {
    let engine = SlipEngine::new();
    engine.registry().clear();
    engine.registry().add("amount", r"\$\s*[\d,]+\.?\d*").unwrap();

    let fields = engine.extract_custom_fields("Total: $1,250.00");
    assert_eq!(fields.get("amount").map(String::as_str), Some("$1,250.00"));
}

#[test]
fn issuer_resolves_to_first_declared_candidate() {
    let text = "Business Name: Maple Leaf Holdings\nEmployer: Northern Lights Inc";
    let found = ISSUER_NAME.extract(text).unwrap();
    assert_eq!(found.value, "Northern Lights Inc");

    let all = ISSUER_NAME.extract_all(text);
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].value, "Maple Leaf Holdings");
}

#[test]
fn repeated_calls_are_deterministic() {
    let engine = SlipEngine::new();
    let text = "T4A Statement of Pension\nPayer: Sun Life\nRecipient Name: John Smith\n046 454 286";

    let first = engine.process(text);
    for _ in 0..10 {
        assert_eq!(engine.process(text), first);
    }
}

#[test]
fn registry_rejection_leaves_count_unchanged() {
    let engine = SlipEngine::new();
    let before = engine.registry().len();

    let err = engine.registry().add("x", "[unterminated").unwrap_err();
    assert!(matches!(err, PatternError::InvalidExpression { .. }));
    assert_eq!(engine.registry().len(), before);
}

#[test]
fn document_pages_partition_by_label() {
    let engine = SlipEngine::new();
    let pages = [
        "T5 Statement of Investment Income\nIssuer: Big Bank",
        "Page intentionally left blank",
        "Tax Return Summary",
    ];

    let records = engine.process_pages(pages);
    let (recognized, unrecognized): (Vec<_>, Vec<_>) =
        records.iter().partition(|r| r.result.is_recognized());

    assert_eq!(recognized.len(), 2);
    assert_eq!(unrecognized.len(), 1);
    assert_eq!(unrecognized[0].page, 2);
    assert_eq!(
        recognized[0].result.navigation_label(UNKNOWN_ISSUER),
        "T5 - Big Bank"
    );
    assert_eq!(
        recognized[1].result.navigation_label(UNKNOWN_ISSUER),
        "Summary - Unknown Issuer"
    );
}

#[tokio::test]
async fn readers_and_writers_share_one_engine() {
    let engine = Arc::new(SlipEngine::new());
    let text = "T4 Statement of Remuneration Paid\nEmployer: Acme Corp Ltd\nRef: R-77";

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::task::spawn_blocking(move || {
            if i % 2 == 0 {
                engine
                    .registry()
                    .add(format!("ref_{}", i), r"Ref:\s*(\S+)")
                    .unwrap();
            }
            let result = engine.process(text);
            assert_eq!(result.classification, SlipType::T4);
            // A rule is either fully present or absent, never partial.
            for (name, value) in &result.custom_fields {
                if name.starts_with("ref_") {
                    assert_eq!(value, "R-77");
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let result = engine.process(text);
    let refs = result
        .custom_fields
        .keys()
        .filter(|k| k.starts_with("ref_"))
        .count();
    assert_eq!(refs, 4);
}
