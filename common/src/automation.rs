// Automation evaluation
// An in-scope application passes when the automation query returns a row with its application_id

use crate::db::{validate_application_id, QueryRunner};
use crate::errors::EvaluationError;
use crate::models::{Application, AssessmentOutcome, Automation, QueryPreview};
use crate::query_builder::APPLICATION_ID_COLUMN;
use crate::substitution::NarrativeSubstitutor;
use crate::telemetry;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::instrument;

/// Collect the `application_id` values of a result, stringified.
///
/// Numeric ids compare equal to their decimal text. Nulls and nested values
/// are skipped.
pub fn passing_application_ids(preview: &QueryPreview) -> HashSet<String> {
    preview
        .rows
        .iter()
        .filter_map(|row| match row.get(APPLICATION_ID_COLUMN) {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
        .collect()
}

/// Variables available to pass/fail narrative templates
pub const NARRATIVE_VARIABLES: &[&str] = &[
    "application_id",
    "application_name",
    "application_category",
    "control_id",
    "automation_name",
];

fn narrative_variables(automation: &Automation, application: &Application) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    variables.insert("application_id".to_string(), application.id.clone());
    variables.insert("application_name".to_string(), application.name.clone());
    variables.insert(
        "application_category".to_string(),
        application.category.clone().unwrap_or_default(),
    );
    variables.insert("control_id".to_string(), automation.control_id.clone());
    variables.insert("automation_name".to_string(), automation.name.clone());
    variables
}

/// AutomationEvaluator runs automations and assesses applications against their control
pub struct AutomationEvaluator {
    runner: Arc<dyn QueryRunner>,
    substitutor: NarrativeSubstitutor,
    row_limit: u32,
}

impl AutomationEvaluator {
    /// `row_limit` bounds the rows read; a larger result is rejected rather than
    /// silently failing the applications past the limit
    pub fn new(runner: Arc<dyn QueryRunner>, row_limit: u32) -> Self {
        Self {
            runner,
            substitutor: NarrativeSubstitutor::default(),
            row_limit,
        }
    }

    /// Assess every in-scope application, in catalog order
    #[instrument(skip(self, automation, applications), fields(automation = %automation.name, control = %automation.control_id))]
    pub async fn evaluate(
        &self,
        automation: &Automation,
        applications: &[Application],
    ) -> Result<Vec<AssessmentOutcome>, EvaluationError> {
        let result = self.evaluate_inner(automation, applications).await;
        match &result {
            Ok(outcomes) => {
                telemetry::record_automation_evaluation("success");
                tracing::info!(
                    assessed = outcomes.len(),
                    passed = outcomes.iter().filter(|o| o.passed).count(),
                    "Automation evaluated"
                );
            }
            Err(e) => {
                telemetry::record_automation_evaluation("failure");
                tracing::warn!(error = %e, "Automation evaluation failed");
            }
        }
        result
    }

    async fn evaluate_inner(
        &self,
        automation: &Automation,
        applications: &[Application],
    ) -> Result<Vec<AssessmentOutcome>, EvaluationError> {
        if automation.sql.trim().is_empty() {
            return Err(EvaluationError::MissingSql(automation.name.clone()));
        }

        // Unknown placeholders are rejected before the query runs
        for template in [&automation.pass_template, &automation.fail_template] {
            self.substitutor
                .check_variables(template, NARRATIVE_VARIABLES)?;
        }

        let preview = self.runner.run(&automation.sql, self.row_limit).await?;
        validate_application_id(&preview)?;
        if preview.truncated {
            return Err(EvaluationError::TooManyRows(self.row_limit));
        }

        let passing = passing_application_ids(&preview);

        applications
            .iter()
            .filter(|application| automation.scope.includes(application))
            .map(|application| -> Result<AssessmentOutcome, EvaluationError> {
                let passed = passing.contains(&application.id);
                let template = if passed {
                    &automation.pass_template
                } else {
                    &automation.fail_template
                };
                let narrative = self
                    .substitutor
                    .substitute(template, &narrative_variables(automation, application))?;

                Ok(AssessmentOutcome {
                    application_id: application.id.clone(),
                    control_id: automation.control_id.clone(),
                    passed,
                    narrative,
                })
            })
            .collect()
    }
}
