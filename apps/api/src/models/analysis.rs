//! Analysis aggregate — the record a submission creates and the pipeline
//! mutates through its lifecycle (processing → completed | failed).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Submission length bounds enforced at the HTTP boundary.
pub const MIN_DESCRIPTION_LEN: usize = 10;
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// A project submission: the free-text description plus optional structured
/// hints. Immutable once accepted; hints are threaded into every stage prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl ProjectSubmission {
    /// Hint fields as a JSON object, omitting unset hints. Empty object when
    /// no hints were supplied.
    pub fn hints_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (key, value) in [
            ("company_size", &self.company_size),
            ("budget_range", &self.budget_range),
            ("timeline_preference", &self.timeline_preference),
            ("industry", &self.industry),
        ] {
            if let Some(v) = value {
                map.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        Value::Object(map)
    }
}

/// Lifecycle status of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// The stored analysis aggregate. Created on submission, updated only by the
/// pipeline coordinator, returned verbatim to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub analysis_id: Uuid,
    pub input_description: String,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    // Full per-stage outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimation_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_analysis: Option<Value>,

    // Flat convenience fields lifted out of the stage outputs for clients
    // that only want the headline numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_composition: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_breakdown: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risks_and_dependencies: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    /// Fresh record for a just-accepted submission.
    pub fn new(analysis_id: Uuid, description: &str) -> Self {
        let now = Utc::now();
        Self {
            analysis_id,
            input_description: description.to_string(),
            status: AnalysisStatus::Processing,
            created_at: now,
            updated_at: now,
            completed_at: None,
            intake_analysis: None,
            technical_analysis: None,
            estimation_analysis: None,
            summary_analysis: None,
            executive_summary: None,
            tech_stack: None,
            team_composition: None,
            timeline_breakdown: None,
            cost_estimate: None,
            risks_and_dependencies: None,
            overall_confidence: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_deserializes_with_only_description() {
        let json = r#"{"description": "A marketplace for vintage synthesizers"}"#;
        let sub: ProjectSubmission = serde_json::from_str(json).unwrap();
        assert!(sub.company_size.is_none());
        assert_eq!(sub.hints_json(), serde_json::json!({}));
    }

    #[test]
    fn test_hints_json_includes_only_set_fields() {
        let sub = ProjectSubmission {
            description: "d".repeat(20),
            company_size: Some("startup".to_string()),
            budget_range: None,
            timeline_preference: Some("3 months".to_string()),
            industry: None,
        };
        let hints = sub.hints_json();
        assert_eq!(hints["company_size"], "startup");
        assert_eq!(hints["timeline_preference"], "3 months");
        assert!(hints.get("budget_range").is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AnalysisStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&AnalysisStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_new_record_starts_processing_with_no_results() {
        let id = Uuid::new_v4();
        let record = AnalysisRecord::new(id, "Build an inventory tracker");
        assert_eq!(record.status, AnalysisStatus::Processing);
        assert_eq!(record.analysis_id, id);
        assert!(record.intake_analysis.is_none());
        assert!(record.completed_at.is_none());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_record_serialization_omits_unset_fields() {
        let record = AnalysisRecord::new(Uuid::new_v4(), "Ten chars!!");
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("error").is_none());
        assert!(value.get("summary_analysis").is_none());
        assert_eq!(value["status"], "processing");
    }
}
