// Property-based tests for evidence text normalization

use common::config::EvidenceConfig;
use common::evidence::{clean_ocr_text, normalize_soc_explanation};
use proptest::prelude::*;

fn labels() -> EvidenceConfig {
    EvidenceConfig {
        master_framework_name: "MasterFW".to_string(),
        secondary_report_name: "SOC2".to_string(),
    }
}

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
}

fn arb_sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_word(), 1..6).prop_map(|words| words.join(" "))
}

proptest! {
    /// Each placeholder label is replaced exactly once by its configured name
    #[test]
    fn property_framework_labels_replaced_once(
        before in arb_sentence(),
        between in arb_sentence(),
        after in arb_sentence(),
    ) {
        let raw = format!("{} Framework A {} Framework B {}.", before, between, after);
        let result = normalize_soc_explanation(&raw, &labels());

        prop_assert_eq!(result.matches("MasterFW").count(), 1);
        prop_assert_eq!(result.matches("SOC2").count(), 1);
        prop_assert!(!result.contains("Framework A"));
        prop_assert!(!result.contains("Framework B"));
    }

    /// Criteria references vanish without leaving doubled spaces or stray commas
    #[test]
    fn property_criteria_references_stripped_cleanly(
        first in arb_sentence(),
        second in arb_sentence(),
        third in arb_sentence(),
        major in 1u8..10,
        minor in 1u8..10,
    ) {
        let raw = format!(
            "{} (CC{}.{}) {}, TSC CC{}, {}.",
            first, major, minor, second, major, third
        );
        let result = normalize_soc_explanation(&raw, &labels());

        prop_assert!(!result.chars().any(|c| c.is_ascii_digit()), "{}", result);
        prop_assert!(!result.contains("  "), "{}", result);
        prop_assert!(!result.contains(",,"), "{}", result);
        prop_assert!(!result.contains(", ,"), "{}", result);
        prop_assert!(!result.contains(" ,"), "{}", result);
        prop_assert!(!result.contains("()"), "{}", result);
        prop_assert!(result.ends_with('.'));
    }

    /// Normalized output never carries surrounding whitespace
    #[test]
    fn property_normalized_output_is_trimmed(raw in "[ a-zA-Z,.:\n]{0,80}") {
        let result = normalize_soc_explanation(&raw, &labels());
        prop_assert_eq!(result.trim(), result.as_str());
    }

    /// Cleaned OCR text has no scan artifacts, doubled spaces, or outer whitespace
    #[test]
    fn property_ocr_output_is_clean(raw in "[a-zA-Z@ .\t\n]{0,80}") {
        let result = clean_ocr_text(&raw);
        prop_assert!(!result.contains('@'));
        prop_assert!(!result.contains("  "));
        prop_assert_eq!(result.trim(), result.as_str());
    }
}

#[test]
fn test_ocr_breaks_around_noted_and_no_deviations() {
    assert_eq!(
        clean_ocr_text("Policy was noted. No deviations observed"),
        "Policy was noted.\n\nNo deviations observed"
    );
}

#[test]
fn test_ocr_removes_scan_artifacts() {
    assert_eq!(
        clean_ocr_text("  Access @reviews   were   performed  "),
        "Access reviews were performed"
    );
}

#[test]
fn test_soc_explanation_full_pipeline() {
    let raw = "Framework A requires multi , factor login (CC6.1).  Framework B tested it , TSC CC6.6 ,and \
               found no issues.Â Gaps Identified: none.";
    let result = normalize_soc_explanation(raw, &labels());

    assert_eq!(
        result,
        "MasterFW requires multi-factor login. SOC2 tested it,and found no issues.\n\n**Gaps Identified:** none."
    );
}

#[test]
fn test_header_after_sentence_starts_paragraph() {
    let result = normalize_soc_explanation("Intro. Summary: fine.", &labels());
    assert_eq!(result, "Intro.\n\n**Summary:** fine.");
}
