// Evidence text cleanup for SOC-report-derived assessments
// Both transforms are single-shot: re-applying them compounds paragraph breaks and emphasis

pub mod normalizer;
pub mod ocr;

pub use normalizer::normalize_soc_explanation;
pub use ocr::clean_ocr_text;

use regex::Regex;

/// Apply an ordered list of regex rewrites, each pass seeing the previous output
pub(crate) fn apply_rules<R: AsRef<str>>(text: String, rules: &[(Regex, R)]) -> String {
    rules.iter().fold(text, |acc, (pattern, replacement)| {
        pattern.replace_all(&acc, replacement.as_ref()).into_owned()
    })
}
