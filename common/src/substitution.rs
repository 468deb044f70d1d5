// Narrative template substitution for automation pass/fail text
// Templates use ${name} placeholders; every placeholder must resolve

use crate::errors::SubstitutionError;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashSet};
use tracing::instrument;

/// NarrativeSubstitutor fills `${name}` placeholders in automation narratives
pub struct NarrativeSubstitutor {
    placeholder_regex: Regex,
}

impl NarrativeSubstitutor {
    pub fn new() -> Result<Self, SubstitutionError> {
        let placeholder_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| SubstitutionError::RegexError(e.to_string()))?;

        Ok(Self { placeholder_regex })
    }

    /// Substitute placeholders in a narrative template.
    ///
    /// # Errors
    /// Returns `SubstitutionError::UndefinedVariable` listing every placeholder
    /// with no value, in order of first appearance.
    #[instrument(skip(self, variables), fields(template_len = template.len(), var_count = variables.len()))]
    pub fn substitute(
        &self,
        template: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<String, SubstitutionError> {
        let mut undefined_vars: Vec<String> = Vec::new();

        let result = self
            .placeholder_regex
            .replace_all(template, |caps: &Captures| {
                let name = &caps[1];
                match variables.get(name) {
                    Some(value) => value.clone(),
                    None => {
                        if !undefined_vars.iter().any(|v| v == name) {
                            undefined_vars.push(name.to_string());
                        }
                        caps[0].to_string()
                    }
                }
            })
            .into_owned();

        if !undefined_vars.is_empty() {
            tracing::warn!(
                undefined_variables = ?undefined_vars,
                "Undefined variables in narrative template"
            );
            return Err(SubstitutionError::UndefinedVariable {
                variables: undefined_vars,
                template: template.to_string(),
            });
        }

        Ok(result)
    }

    /// Unique placeholder names in order of first appearance
    pub fn extract_variables(&self, template: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.placeholder_regex
            .captures_iter(template)
            .map(|cap| cap[1].to_string())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Check every placeholder in `template` names one of `known`, without rendering
    pub fn check_variables(&self, template: &str, known: &[&str]) -> Result<(), SubstitutionError> {
        let undefined: Vec<String> = self
            .extract_variables(template)
            .into_iter()
            .filter(|name| !known.contains(&name.as_str()))
            .collect();

        if undefined.is_empty() {
            Ok(())
        } else {
            Err(SubstitutionError::UndefinedVariable {
                variables: undefined,
                template: template.to_string(),
            })
        }
    }
}

impl Default for NarrativeSubstitutor {
    fn default() -> Self {
        Self::new().expect("Failed to create NarrativeSubstitutor")
    }
}
