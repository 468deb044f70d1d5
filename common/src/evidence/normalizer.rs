// SOC explanation normalizer
// Turns extracted SOC report narrative into Markdown-ready paragraphs

use crate::config::EvidenceConfig;
use crate::evidence::apply_rules;
use regex::{NoExpand, Regex};
use tracing::instrument;

/// Compound terms that OCR tends to split with stray punctuation or spacing
const COMPOUND_TERMS: &[&[&str]] = &[
    &["real", "time"],
    &["third", "party"],
    &["multi", "factor"],
    &["role", "based"],
    &["end", "to", "end"],
    &["least", "privilege"],
    &["on", "premises"],
    &["follow", "up"],
    &["sign", "off"],
    &["day", "to", "day"],
    &["non", "compliance"],
    &["pre", "production"],
];

/// Mis-decoded UTF-8 sequences, longest first so prefixes don't win
const ENCODING_ARTIFACTS: &[(&str, &str)] = &[
    ("â€\u{9d}", "\u{201d}"),
    ("â€œ", "\u{201c}"),
    ("â€™", "\u{2019}"),
    ("â€˜", "\u{2018}"),
    ("â€“", "\u{2013}"),
    ("â€”", "\u{2014}"),
    ("â€¦", "\u{2026}"),
    ("â„¢", "\u{2122}"),
    ("Â®", "\u{ae}"),
    ("Â©", "\u{a9}"),
    ("Â ", " "),
    ("Â", ""),
];

const SECTION_HEADERS: &[&str] = &[
    "gaps identified",
    "analyst notes",
    "exceptions noted",
    "control assessment",
    "evidence reviewed",
    "recommendations?",
    "conclusion",
    "summary",
];

lazy_static::lazy_static! {
    static ref COMPOUND_RULES: Vec<(Regex, String)> = COMPOUND_TERMS
        .iter()
        .map(|parts| {
            let pattern = parts
                .iter()
                .map(|part| format!("({})", part))
                .collect::<Vec<_>>()
                .join(r"[^\p{L}]+");
            let replacement = (1..=parts.len())
                .map(|group| format!("${{{}}}", group))
                .collect::<Vec<_>>()
                .join("-");
            (
                Regex::new(&format!(r"(?i)\b{}\b", pattern)).expect("Invalid regex pattern"),
                replacement,
            )
        })
        .collect();

    static ref FRAMEWORK_A: Regex = Regex::new(r"\bFramework A\b").expect("Invalid regex pattern");
    static ref FRAMEWORK_B: Regex = Regex::new(r"\bFramework B\b").expect("Invalid regex pattern");

    static ref CRITERIA_REFERENCE: Regex =
        Regex::new(r"(?i)\b(?:TSC\s+)?CC\d+(?:\.\d+)?\b").expect("Invalid regex pattern");

    static ref CLEANUP_RULES: Vec<(Regex, &'static str)> = vec![
        // brackets emptied by reference stripping, possibly holding leftover separators
        (Regex::new(r"\(\s*(?:[,;]\s*)*\)").expect("Invalid regex pattern"), ""),
        (Regex::new(r"\[\s*(?:[,;]\s*)*\]").expect("Invalid regex pattern"), ""),
        (Regex::new(r",(?:\s*,)+").expect("Invalid regex pattern"), ","),
        (Regex::new(r",(\s*[.;:!?])").expect("Invalid regex pattern"), "$1"),
        (Regex::new(r"(?m)^[ \t]*,[ \t]*").expect("Invalid regex pattern"), ""),
        (Regex::new(r"[ \t]+([,.;:!?)\]])").expect("Invalid regex pattern"), "$1"),
        (Regex::new(r"[ \t]{2,}").expect("Invalid regex pattern"), " "),
        (Regex::new(r"(?m)^[ \t]+").expect("Invalid regex pattern"), ""),
        (Regex::new(r"(?m)[ \t]+$").expect("Invalid regex pattern"), ""),
    ];

    static ref SECTION_HEADER: Regex = Regex::new(&format!(
        r"(?i)\s*\b((?:{}):)[ \t]*",
        SECTION_HEADERS.join("|")
    ))
    .expect("Invalid regex pattern");

    // emphasized header left at the end of its line
    static ref TRAILING_SPACE: Regex = Regex::new(r"(?m)[ \t]+$").expect("Invalid regex pattern");
}

/// Normalize a SOC-derived control explanation for display.
///
/// Passes run in order: compound-word repair, encoding artifact repair,
/// framework label substitution, trust-criteria reference stripping,
/// punctuation cleanup, section-header emphasis. Empty input is returned as is.
#[instrument(skip_all, fields(input_len = raw.len()))]
pub fn normalize_soc_explanation(raw: &str, labels: &EvidenceConfig) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = apply_rules(raw.to_string(), &COMPOUND_RULES);

    let text = ENCODING_ARTIFACTS
        .iter()
        .fold(text, |acc, (broken, fixed)| acc.replace(*broken, fixed));

    let text = substitute_framework_labels(text, labels);

    let text = CRITERIA_REFERENCE.replace_all(&text, "").into_owned();
    let text = apply_rules(text, &CLEANUP_RULES);

    let text = SECTION_HEADER.replace_all(&text, "\n\n**${1}** ");
    let text = TRAILING_SPACE.replace_all(&text, "");
    let text = text.trim().to_string();

    tracing::debug!(output_len = text.len(), "Normalized SOC explanation");
    text
}

fn substitute_framework_labels(text: String, labels: &EvidenceConfig) -> String {
    let mut text = text;
    if !labels.master_framework_name.is_empty() {
        text = FRAMEWORK_A
            .replace_all(&text, NoExpand(labels.master_framework_name.as_str()))
            .into_owned();
    }
    if !labels.secondary_report_name.is_empty() {
        text = FRAMEWORK_B
            .replace_all(&text, NoExpand(labels.secondary_report_name.as_str()))
            .into_owned();
    }
    text
}
