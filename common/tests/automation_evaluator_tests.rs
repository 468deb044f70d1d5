// Tests for automation evaluation against a mocked query runner

use async_trait::async_trait;
use common::automation::AutomationEvaluator;
use common::db::QueryRunner;
use common::errors::{EvaluationError, PreviewError, SubstitutionError};
use common::models::{ApplicabilityScope, Application, Automation, QueryPreview};
use mockall::mock;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

mock! {
    pub Runner {}

    #[async_trait]
    impl QueryRunner for Runner {
        async fn run(&self, sql: &str, row_limit: u32) -> Result<QueryPreview, PreviewError>;
    }
}

const EVALUATION_LIMIT: u32 = 500;

fn application(id: &str, name: &str, category: &str) -> Application {
    Application {
        id: id.to_string(),
        name: name.to_string(),
        category: Some(category.to_string()),
    }
}

fn catalog() -> Vec<Application> {
    vec![
        application("app-1", "Payroll", "finance"),
        application("app-2", "Ledger", "finance"),
        application("app-3", "Recruiting", "hr"),
    ]
}

fn automation(scope: ApplicabilityScope) -> Automation {
    Automation {
        id: Uuid::new_v4(),
        name: "MFA enforced".to_string(),
        description: None,
        control_id: "AC-2".to_string(),
        scope,
        sql: "SELECT a.id AS application_id FROM applications a WHERE a.mfa;".to_string(),
        pass_template: "${application_name} enforces MFA for ${control_id}.".to_string(),
        fail_template: "${application_name} does not enforce MFA.".to_string(),
    }
}

fn preview(columns: &[&str], ids: &[Value]) -> QueryPreview {
    let rows: Vec<Map<String, Value>> = ids
        .iter()
        .map(|id| {
            let mut row = Map::new();
            row.insert("application_id".to_string(), id.clone());
            row
        })
        .collect();
    QueryPreview {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        row_count: rows.len(),
        rows,
        truncated: false,
    }
}

fn evaluator_returning(result: QueryPreview) -> AutomationEvaluator {
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(|sql, limit| sql.contains("FROM applications a") && *limit == EVALUATION_LIMIT)
        .times(1)
        .returning(move |_, _| Ok(result.clone()));
    AutomationEvaluator::new(Arc::new(runner), EVALUATION_LIMIT)
}

#[tokio::test]
async fn test_applications_in_result_pass_and_others_fail() {
    let evaluator = evaluator_returning(preview(&["application_id"], &[json!("app-1")]));

    let outcomes = evaluator
        .evaluate(&automation(ApplicabilityScope::AllApplications), &catalog())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].passed);
    assert_eq!(outcomes[0].narrative, "Payroll enforces MFA for AC-2.");
    assert!(!outcomes[1].passed);
    assert_eq!(outcomes[1].narrative, "Ledger does not enforce MFA.");
    assert!(!outcomes[2].passed);
    assert!(outcomes.iter().all(|o| o.control_id == "AC-2"));
}

#[tokio::test]
async fn test_scope_limits_assessed_applications() {
    let evaluator = evaluator_returning(preview(
        &["application_id"],
        &[json!("app-2"), json!("app-3")],
    ));

    let outcomes = evaluator
        .evaluate(
            &automation(ApplicabilityScope::Category("Finance".to_string())),
            &catalog(),
        )
        .await
        .unwrap();

    let ids: Vec<&str> = outcomes.iter().map(|o| o.application_id.as_str()).collect();
    assert_eq!(ids, vec!["app-1", "app-2"]);
    assert!(!outcomes[0].passed);
    assert!(outcomes[1].passed);
}

#[tokio::test]
async fn test_numeric_application_ids_match_catalog_text() {
    let evaluator = evaluator_returning(preview(&["application_id"], &[json!(42)]));
    let applications = vec![application("42", "Billing", "finance")];

    let outcomes = evaluator
        .evaluate(&automation(ApplicabilityScope::AllApplications), &applications)
        .await
        .unwrap();

    assert!(outcomes[0].passed);
}

#[tokio::test]
async fn test_missing_application_id_column_is_rejected() {
    let evaluator = evaluator_returning(preview(&["id", "name"], &[]));

    let result = evaluator
        .evaluate(&automation(ApplicabilityScope::AllApplications), &catalog())
        .await;

    match result {
        Err(EvaluationError::Preview(PreviewError::MissingApplicationId { columns })) => {
            assert_eq!(columns, vec!["id".to_string(), "name".to_string()]);
        }
        other => panic!("expected missing application_id, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_result_is_rejected() {
    let mut truncated = preview(&["application_id"], &[json!("app-1")]);
    truncated.truncated = true;
    let evaluator = evaluator_returning(truncated);

    let result = evaluator
        .evaluate(&automation(ApplicabilityScope::AllApplications), &catalog())
        .await;

    assert!(matches!(
        result,
        Err(EvaluationError::TooManyRows(EVALUATION_LIMIT))
    ));
}

#[tokio::test]
async fn test_empty_sql_never_reaches_the_database() {
    let mut runner = MockRunner::new();
    runner.expect_run().times(0);
    let evaluator = AutomationEvaluator::new(Arc::new(runner), EVALUATION_LIMIT);

    let mut rule = automation(ApplicabilityScope::AllApplications);
    rule.sql = "   ".to_string();

    let result = evaluator.evaluate(&rule, &catalog()).await;
    assert!(matches!(result, Err(EvaluationError::MissingSql(name)) if name == "MFA enforced"));
}

#[tokio::test]
async fn test_query_failure_propagates() {
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .returning(|_, _| Err(PreviewError::Timeout(15)));
    let evaluator = AutomationEvaluator::new(Arc::new(runner), EVALUATION_LIMIT);

    let result = evaluator
        .evaluate(&automation(ApplicabilityScope::AllApplications), &catalog())
        .await;

    assert!(matches!(
        result,
        Err(EvaluationError::Preview(PreviewError::Timeout(15)))
    ));
}

#[tokio::test]
async fn test_unknown_narrative_variable_rejected_before_query() {
    let mut runner = MockRunner::new();
    runner.expect_run().times(0);
    let evaluator = AutomationEvaluator::new(Arc::new(runner), EVALUATION_LIMIT);

    let mut rule = automation(ApplicabilityScope::AllApplications);
    rule.fail_template = "${application_name} missing ${owner}".to_string();

    let result = evaluator.evaluate(&rule, &catalog()).await;
    match result {
        Err(EvaluationError::Narrative(SubstitutionError::UndefinedVariable { variables, .. })) => {
            assert_eq!(variables, vec!["owner".to_string()]);
        }
        other => panic!("expected undefined variable, got {:?}", other),
    }
}
