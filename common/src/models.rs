use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Models
// ============================================================================

/// Application whose compliance is assessed against controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================================================
// Automation Models
// ============================================================================

/// Which applications an automation assesses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ApplicabilityScope {
    AllApplications,
    Category(String),
    Applications(Vec<String>),
}

impl ApplicabilityScope {
    pub fn includes(&self, application: &Application) -> bool {
        match self {
            ApplicabilityScope::AllApplications => true,
            ApplicabilityScope::Category(category) => application
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category)),
            ApplicabilityScope::Applications(ids) => ids.iter().any(|id| *id == application.id),
        }
    }
}

/// Rule pairing a control with SQL whose rows name the passing applications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub control_id: String,
    pub scope: ApplicabilityScope,
    pub sql: String,
    pub pass_template: String,
    pub fail_template: String,
}

// ============================================================================
// Query Results
// ============================================================================

/// Rows returned by a read-only automation query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPreview {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub row_count: usize,
    /// More rows existed than the configured limit
    pub truncated: bool,
}

impl QueryPreview {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Result of assessing one application against an automation's control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub application_id: String,
    pub control_id: String,
    pub passed: bool,
    pub narrative: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, category: Option<&str>) -> Application {
        Application {
            id: id.to_string(),
            name: format!("App {}", id),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_scope_all_includes_everything() {
        assert!(ApplicabilityScope::AllApplications.includes(&app("1", None)));
    }

    #[test]
    fn test_scope_category_ignores_case() {
        let scope = ApplicabilityScope::Category("Finance".to_string());
        assert!(scope.includes(&app("1", Some("finance"))));
        assert!(!scope.includes(&app("2", Some("hr"))));
        assert!(!scope.includes(&app("3", None)));
    }

    #[test]
    fn test_scope_explicit_list() {
        let scope = ApplicabilityScope::Applications(vec!["7".to_string()]);
        assert!(scope.includes(&app("7", None)));
        assert!(!scope.includes(&app("8", None)));
    }

    #[test]
    fn test_scope_serialization() {
        let scope: ApplicabilityScope =
            serde_json::from_value(serde_json::json!({"type": "category", "value": "hr"})).unwrap();
        assert_eq!(scope, ApplicabilityScope::Category("hr".to_string()));

        let all: ApplicabilityScope =
            serde_json::from_value(serde_json::json!({"type": "all_applications"})).unwrap();
        assert_eq!(all, ApplicabilityScope::AllApplications);
    }
}
