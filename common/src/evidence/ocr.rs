// OCR cleanup for structured evidence field values

use crate::evidence::apply_rules;
use regex::Regex;
use tracing::instrument;

lazy_static::lazy_static! {
    static ref OCR_RULES: Vec<(Regex, &'static str)> = vec![
        // stray single letters between words, e.g. "access x reviews"
        (Regex::new(r"(?i)(\s)[a-z]\s([a-z])").expect("Invalid regex pattern"), "${1}${2}"),
        (Regex::new(r"\s+").expect("Invalid regex pattern"), " "),
        (Regex::new(r"\.\s+([A-Z])").expect("Invalid regex pattern"), ".\n\n${1}"),
        // lost space after a period; a following lowercase letter keeps "U.S.A" inline
        (Regex::new(r"\.([A-Z][a-z])").expect("Invalid regex pattern"), ".\n\n${1}"),
        (Regex::new(r"(?i)\b(noted\.)\s*").expect("Invalid regex pattern"), "${1}\n\n"),
        (Regex::new(r"(?i)\s*\b(no deviations)").expect("Invalid regex pattern"), "\n\n${1}"),
    ];
}

/// Clean OCR noise out of an evidence field value and recover paragraph breaks.
///
/// Empty input is returned unchanged.
#[instrument(skip_all, fields(input_len = raw.len()))]
pub fn clean_ocr_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.replace('@', "");
    let text = apply_rules(text, &OCR_RULES);
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_passes_through() {
        assert_eq!(clean_ocr_text(""), "");
    }

    #[test]
    fn test_breaks_around_noted_and_no_deviations() {
        assert_eq!(
            clean_ocr_text("Policy was noted. No deviations observed"),
            "Policy was noted.\n\nNo deviations observed"
        );
    }

    #[test]
    fn test_no_deviations_break_is_case_insensitive() {
        assert_eq!(
            clean_ocr_text("Sample of 25 tested; no deviations were found"),
            "Sample of 25 tested;\n\nno deviations were found"
        );
    }

    #[test]
    fn test_at_signs_and_stray_letters_removed() {
        assert_eq!(
            clean_ocr_text("Quarterly @access x reviews   were\tperformed"),
            "Quarterly access reviews were performed"
        );
    }

    #[test]
    fn test_sentence_boundaries_become_paragraphs() {
        assert_eq!(
            clean_ocr_text("  Inspected the ticket. Confirmed approval.  "),
            "Inspected the ticket.\n\nConfirmed approval."
        );
    }

    #[test]
    fn test_period_without_space_is_kept_inline() {
        assert_eq!(clean_ocr_text("Hosted in the U.S.A region"), "Hosted in the U.S.A region");
    }

    #[test]
    fn test_sentence_break_without_space() {
        assert_eq!(
            clean_ocr_text("Inspected the ticket.Confirmed approval."),
            "Inspected the ticket.\n\nConfirmed approval."
        );
    }

    #[test]
    fn test_abbreviations_stay_inline() {
        assert_eq!(
            clean_ocr_text("Hosted in the U.S.A region"),
            "Hosted in the U.S.A region"
        );
    }
}
