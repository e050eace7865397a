//! Reference-data snapshot loader.
//!
//! The snapshot is a single JSON document with three flat tables —
//! `projects`, `employees`, `employee_skills` — joined here by employee id.
//! A missing or unset path is not an error: the service starts with an empty
//! index and matching/calibration degrade to their neutral defaults.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::history::index::HistoricalDataIndex;
use crate::models::reference::{Employee, EmployeeSkill, HistoricalProject};

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    projects: Vec<HistoricalProject>,
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    employee_skills: Vec<SkillRow>,
}

/// One row of the flat skills table, keyed to its employee.
#[derive(Debug, Deserialize)]
struct SkillRow {
    employee_id: String,
    #[serde(flatten)]
    skill: EmployeeSkill,
}

/// Loads and joins the snapshot at `path`.
pub fn load_snapshot(path: &Path) -> Result<HistoricalDataIndex> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reference data from {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse reference data at {}", path.display()))?;

    let mut skills_by_employee: HashMap<String, Vec<EmployeeSkill>> = HashMap::new();
    for row in snapshot.employee_skills {
        skills_by_employee
            .entry(row.employee_id)
            .or_default()
            .push(row.skill);
    }

    let employees: Vec<Employee> = snapshot
        .employees
        .into_iter()
        .map(|mut emp| {
            if let Some(skills) = skills_by_employee.remove(&emp.employee_id) {
                emp.skills = skills;
            }
            emp
        })
        .collect();

    info!(
        "Loaded reference snapshot: {} projects, {} employees",
        snapshot.projects.len(),
        employees.len()
    );

    Ok(HistoricalDataIndex::new(snapshot.projects, employees))
}

/// Loads the snapshot if a path was configured; otherwise (or on load
/// failure) returns an empty index so the pipeline still runs, uncalibrated.
pub fn load_or_empty(path: Option<&str>) -> HistoricalDataIndex {
    match path {
        Some(p) => match load_snapshot(Path::new(p)) {
            Ok(index) => index,
            Err(e) => {
                warn!("Reference data unavailable, continuing without it: {e:#}");
                HistoricalDataIndex::empty()
            }
        },
        None => {
            info!("REFERENCE_DATA_PATH not set; historical calibration disabled");
            HistoricalDataIndex::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "projects": [
            {
                "project_name": "Storefront Revamp",
                "project_code": "PRJ-001",
                "project_type": "web_app",
                "complexity_score": 6,
                "estimated_duration_weeks": 10,
                "actual_duration_weeks": 12,
                "estimated_cost": 90000,
                "actual_cost": 110000,
                "team_size": 5,
                "tech_stack": {"frontend": "React", "backend": "FastAPI", "database": "PostgreSQL"},
                "on_time_delivery": false,
                "within_budget": false,
                "client_satisfaction": 3.8,
                "quality_score": 4.1,
                "lessons_learned": "Integrations took longer than planned",
                "status": "completed"
            }
        ],
        "employees": [
            {
                "employee_id": "EMP001",
                "name": "Dana Reyes",
                "title": "Senior Backend Developer",
                "seniority_level": "Senior",
                "hourly_rate": 95,
                "availability_percentage": 80,
                "is_active": true
            },
            {
                "employee_id": "EMP002",
                "name": "Kim Olsen",
                "title": "QA Engineer",
                "seniority_level": "Mid",
                "hourly_rate": 65,
                "availability_percentage": 100,
                "is_active": true
            }
        ],
        "employee_skills": [
            {"employee_id": "EMP001", "skill_name": "Python", "proficiency_level": 5, "years_experience": 8, "is_primary_skill": true, "certified": true},
            {"employee_id": "EMP001", "skill_name": "FastAPI", "proficiency_level": 4, "years_experience": 4},
            {"employee_id": "EMP002", "skill_name": "Cypress", "proficiency_level": 4, "years_experience": 3}
        ]
    }"#;

    #[test]
    fn test_load_snapshot_joins_skills_to_employees() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let index = load_snapshot(file.path()).unwrap();
        assert_eq!(index.project_count(), 1);
        assert_eq!(index.employee_count(), 2);

        let roster = index.available_employees();
        let dana = roster.iter().find(|e| e.employee_id == "EMP001").unwrap();
        assert_eq!(dana.skills.len(), 2);
        assert!(dana.skills.iter().any(|s| s.skill_name == "Python" && s.certified));
    }

    #[test]
    fn test_load_snapshot_missing_file_errors() {
        assert!(load_snapshot(Path::new("/nonexistent/snapshot.json")).is_err());
    }

    #[test]
    fn test_load_or_empty_without_path_gives_empty_index() {
        let index = load_or_empty(None);
        assert_eq!(index.project_count(), 0);
        assert_eq!(index.employee_count(), 0);
    }

    #[test]
    fn test_load_or_empty_swallows_bad_path() {
        let index = load_or_empty(Some("/nonexistent/snapshot.json"));
        assert_eq!(index.project_count(), 0);
    }

    #[test]
    fn test_load_snapshot_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(load_snapshot(file.path()).is_err());
    }
}
