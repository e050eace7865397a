//! Historical calibration — assembles the reference-data section of the
//! estimation prompt from the intake and technical stage outputs.
//!
//! Stage outputs are open JSON and may be degraded or partially populated;
//! every extraction here falls back to a neutral default instead of failing.

use serde_json::{json, Map, Value};

use crate::history::HistoricalDataIndex;

/// Complexity assumed when the intake stage gave no usable indicators.
const DEFAULT_COMPLEXITY: i32 = 5;

/// Base confidence in the historical dataset before any evidence.
const BASE_DATA_CONFIDENCE: f64 = 0.5;

/// Builds the historical-data context for the estimation stage.
pub fn build_historical_context(
    index: &HistoricalDataIndex,
    intake: &Value,
    technical: &Value,
) -> Value {
    let project_type = intake
        .get("project_type")
        .and_then(Value::as_str)
        .unwrap_or("web_app");
    let complexity = estimate_complexity_score(intake);
    let tech_stack = extract_tech_stack(technical);

    let similar = index.similar_projects(project_type, complexity, &tech_stack);
    let cost = index.cost_estimates(project_type, complexity);
    let team = index.team_performance_metrics(&tech_stack);
    let risks = index.risk_indicators(project_type, complexity);
    let tech_stats = index.technology_usage_stats();
    let rates = employee_rates_by_seniority(index);

    let confidence = data_confidence(
        similar.len(),
        cost.as_ref().map(|c| c.sample_size).unwrap_or(0),
    );

    json!({
        "similar_projects": similar,
        "historical_cost_data": cost,
        "team_performance_metrics": team,
        "risk_indicators": risks,
        "technology_usage_stats": tech_stats,
        "available_employee_rates": rates,
        "data_confidence": confidence,
    })
}

/// Derives a 1–10 complexity score from the intake stage's
/// `complexity_indicators`: low = 2, medium = 5, high = 8, averaged over the
/// indicators that carry a recognizable level. Defaults to medium.
pub fn estimate_complexity_score(intake: &Value) -> i32 {
    let indicators = match intake.get("complexity_indicators").and_then(Value::as_object) {
        Some(map) => map,
        None => return DEFAULT_COMPLEXITY,
    };

    let scores: Vec<i32> = indicators
        .values()
        .filter_map(Value::as_str)
        .filter_map(|level| {
            let level = level.trim().to_lowercase();
            if level.starts_with("low") {
                Some(2)
            } else if level.starts_with("medium") {
                Some(5)
            } else if level.starts_with("high") {
                Some(8)
            } else {
                None
            }
        })
        .collect();

    if scores.is_empty() {
        DEFAULT_COMPLEXITY
    } else {
        scores.iter().sum::<i32>() / scores.len() as i32
    }
}

/// Primary technology of each recommended stack category, for similarity
/// lookups. Categories may be objects with a `primary` field or bare strings.
pub fn extract_tech_stack(technical: &Value) -> Vec<String> {
    let stack = match technical
        .get("recommended_tech_stack")
        .and_then(Value::as_object)
    {
        Some(map) => map,
        None => return Vec::new(),
    };

    stack
        .values()
        .filter_map(|details| match details {
            Value::Object(obj) => obj.get("primary").and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .map(str::to_string)
        .collect()
}

/// Skills the employee matcher should consider, harvested from the technical
/// stage: stack primaries, UI frameworks, state management choices, and any
/// third-party APIs the project must integrate.
pub fn extract_required_skills(technical: &Value) -> Vec<String> {
    let mut skills = Vec::new();

    if let Some(stack) = technical
        .get("recommended_tech_stack")
        .and_then(Value::as_object)
    {
        for details in stack.values() {
            match details {
                Value::Object(obj) => {
                    for field in ["primary", "ui_framework", "state_management"] {
                        if let Some(value) = obj.get(field).and_then(Value::as_str) {
                            skills.push(value.to_string());
                        }
                    }
                }
                Value::String(s) => skills.push(s.clone()),
                _ => {}
            }
        }
    }

    if let Some(apis) = technical
        .get("integration_requirements")
        .and_then(|v| v.get("third_party_apis"))
        .and_then(Value::as_array)
    {
        skills.extend(apis.iter().filter_map(Value::as_str).map(str::to_string));
    }

    skills
}

/// Roster hourly rates grouped by seniority level, so the estimation prompt
/// can quote real rates instead of inventing them.
fn employee_rates_by_seniority(index: &HistoricalDataIndex) -> Value {
    let mut by_seniority: Map<String, Value> = Map::new();

    for emp in index.available_employees() {
        let entry = by_seniority
            .entry(emp.seniority_level.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(json!({
                "name": emp.name,
                "title": emp.title,
                "rate": emp.hourly_rate,
                "availability": emp.availability_percentage,
            }));
        }
    }

    Value::Object(by_seniority)
}

/// Confidence in the historical evidence: 0.5 base, +0.1 per similar project
/// (capped at +0.3), +0.05 per cost sample (capped at +0.2), clamped to 1.0.
fn data_confidence(similar_count: usize, cost_sample_size: usize) -> f64 {
    let mut confidence = BASE_DATA_CONFIDENCE;
    confidence += (similar_count as f64 * 0.1).min(0.3);
    if cost_sample_size > 0 {
        confidence += (cost_sample_size as f64 * 0.05).min(0.2);
    }
    confidence.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::{Employee, HistoricalProject, TechStack};

    #[test]
    fn test_complexity_score_averages_recognized_levels() {
        let intake = json!({
            "complexity_indicators": {
                "data_complexity": "low - flat relational data",
                "integration_complexity": "high - five external services",
                "user_interface_complexity": "medium - standard dashboard",
                "overall_complexity_summary": "A mixed-complexity build."
            }
        });
        // (2 + 8 + 5) / 3 = 5; the prose summary is skipped.
        assert_eq!(estimate_complexity_score(&intake), 5);
    }

    #[test]
    fn test_complexity_score_defaults_without_indicators() {
        assert_eq!(estimate_complexity_score(&json!({})), DEFAULT_COMPLEXITY);
        let degraded = json!({"error": "Failed to parse agent response"});
        assert_eq!(estimate_complexity_score(&degraded), DEFAULT_COMPLEXITY);
    }

    #[test]
    fn test_extract_tech_stack_reads_primaries_and_strings() {
        let technical = json!({
            "recommended_tech_stack": {
                "frontend": {"primary": "React 18", "ui_framework": "Tailwind"},
                "backend": {"primary": "FastAPI"},
                "database": "PostgreSQL 15+"
            }
        });
        let stack = extract_tech_stack(&technical);
        assert!(stack.contains(&"React 18".to_string()));
        assert!(stack.contains(&"FastAPI".to_string()));
        assert!(stack.contains(&"PostgreSQL 15+".to_string()));
        assert!(!stack.contains(&"Tailwind".to_string()));
    }

    #[test]
    fn test_extract_required_skills_includes_frameworks_and_apis() {
        let technical = json!({
            "recommended_tech_stack": {
                "frontend": {
                    "primary": "React 18",
                    "ui_framework": "Material-UI",
                    "state_management": "Zustand"
                }
            },
            "integration_requirements": {
                "third_party_apis": ["Stripe", "Twilio"]
            }
        });
        let skills = extract_required_skills(&technical);
        assert_eq!(
            skills,
            vec!["React 18", "Material-UI", "Zustand", "Stripe", "Twilio"]
        );
    }

    #[test]
    fn test_extract_required_skills_tolerates_degraded_input() {
        let degraded = json!({"error": "x", "raw_response": "not json"});
        assert!(extract_required_skills(&degraded).is_empty());
        assert!(extract_tech_stack(&degraded).is_empty());
    }

    #[test]
    fn test_data_confidence_caps() {
        assert_eq!(data_confidence(0, 0), 0.5);
        assert!((data_confidence(2, 0) - 0.7).abs() < 1e-9);
        // Similar-project bonus saturates at +0.3, cost bonus at +0.2.
        assert!((data_confidence(10, 10) - 1.0).abs() < 1e-9);
        assert!((data_confidence(1, 2) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_build_historical_context_shape_with_empty_index() {
        let index = HistoricalDataIndex::empty();
        let context = build_historical_context(&index, &json!({}), &json!({}));
        assert!(context["similar_projects"].as_array().unwrap().is_empty());
        assert!(context["historical_cost_data"].is_null());
        assert_eq!(context["data_confidence"], 0.5);
        assert_eq!(
            context["available_employee_rates"],
            Value::Object(Map::new())
        );
    }

    #[test]
    fn test_build_historical_context_groups_rates_by_seniority() {
        let employees = vec![
            Employee {
                employee_id: "E1".to_string(),
                name: "Dana".to_string(),
                email: None,
                title: "Backend Developer".to_string(),
                seniority_level: "Senior".to_string(),
                hourly_rate: 95.0,
                availability_percentage: 80.0,
                department: None,
                location: None,
                is_active: true,
                skills: vec![],
            },
            Employee {
                employee_id: "E2".to_string(),
                name: "Kim".to_string(),
                email: None,
                title: "QA Engineer".to_string(),
                seniority_level: "Senior".to_string(),
                hourly_rate: 70.0,
                availability_percentage: 100.0,
                department: None,
                location: None,
                is_active: true,
                skills: vec![],
            },
        ];
        let index = HistoricalDataIndex::new(Vec::<HistoricalProject>::new(), employees);
        let context = build_historical_context(&index, &json!({}), &json!({}));
        let senior = context["available_employee_rates"]["Senior"]
            .as_array()
            .unwrap();
        assert_eq!(senior.len(), 2);
        assert_eq!(senior[0]["rate"], 95.0);
    }

    #[test]
    fn test_build_historical_context_uses_intake_type() {
        let project = HistoricalProject {
            project_name: "Shop".to_string(),
            project_code: "P1".to_string(),
            project_type: "mobile_app".to_string(),
            complexity_score: 5,
            estimated_duration_weeks: Some(8.0),
            actual_duration_weeks: 8.0,
            estimated_cost: Some(50_000.0),
            actual_cost: Some(50_000.0),
            team_size: 3,
            tech_stack: TechStack {
                frontend: Some("Flutter".to_string()),
                backend: Some("FastAPI".to_string()),
                database: Some("PostgreSQL".to_string()),
            },
            on_time_delivery: true,
            within_budget: true,
            client_satisfaction: Some(4.5),
            quality_score: Some(4.5),
            lessons_learned: String::new(),
            status: "completed".to_string(),
        };
        let index = HistoricalDataIndex::new(vec![project], vec![]);

        let intake = json!({"project_type": "mobile_app"});
        let technical = json!({
            "recommended_tech_stack": {
                "mobile": {"primary": "Flutter"},
                "backend": {"primary": "FastAPI"}
            }
        });
        let context = build_historical_context(&index, &intake, &technical);
        assert_eq!(context["similar_projects"].as_array().unwrap().len(), 1);
        assert_eq!(context["historical_cost_data"]["sample_size"], 1);
        assert!(context["data_confidence"].as_f64().unwrap() > 0.5);
    }
}
