//! Reference data records — the read-only historical snapshot the pipeline
//! calibrates against. Loaded once at startup; never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Technology stack of a historical project, one technology per category.
/// Categories the snapshot does not record are simply `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechStack {
    pub frontend: Option<String>,
    pub backend: Option<String>,
    pub database: Option<String>,
}

impl TechStack {
    /// Non-empty technology names, deduplicated.
    pub fn names(&self) -> BTreeSet<String> {
        [&self.frontend, &self.backend, &self.database]
            .into_iter()
            .flatten()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// A completed (or in-flight) past project from the reference snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalProject {
    pub project_name: String,
    pub project_code: String,
    pub project_type: String,
    /// 1–10 complexity score assigned post-delivery.
    pub complexity_score: i32,
    pub estimated_duration_weeks: Option<f64>,
    pub actual_duration_weeks: f64,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub team_size: i32,
    #[serde(default)]
    pub tech_stack: TechStack,
    pub on_time_delivery: bool,
    pub within_budget: bool,
    /// Client satisfaction 1–5.
    pub client_satisfaction: Option<f64>,
    /// Internal quality score 1–5.
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub lessons_learned: String,
    pub status: String,
}

/// One skill row for an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSkill {
    pub skill_name: String,
    /// Proficiency 1–5.
    pub proficiency_level: i32,
    pub years_experience: f64,
    #[serde(default)]
    pub is_primary_skill: bool,
    #[serde(default)]
    pub certified: bool,
}

/// A roster employee with the skill rows joined in at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub title: String,
    pub seniority_level: String,
    pub hourly_rate: f64,
    /// 0–100.
    pub availability_percentage: f64,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub skills: Vec<EmployeeSkill>,
}
