//! Historical Data Index — query layer over the reference snapshot.
//!
//! Immutable after construction and shared by all concurrent analyses. Every
//! query degrades to an empty/neutral default when no snapshot was loaded, so
//! callers never have to special-case a missing dataset.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::reference::{Employee, HistoricalProject};

/// Complexity window for "similar" projects. Tunable, not derived.
const COMPLEXITY_WINDOW: i32 = 2;
/// Minimum tech-stack Jaccard similarity for a project to count as similar.
const SIMILARITY_THRESHOLD: f64 = 0.2;
/// Cap on similar-project and risk-indicator result lists.
const RESULT_LIMIT: usize = 5;

/// Cost statistics over the filtered set of comparable completed projects.
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimates {
    pub avg_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    pub avg_duration_weeks: f64,
    pub avg_team_size: f64,
    pub cost_per_week: f64,
    pub cost_per_team_member: f64,
    pub sample_size: usize,
}

/// Global roster statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMetrics {
    pub available_employees: usize,
    pub avg_hourly_rate: f64,
    pub avg_availability: f64,
    pub total_employees: usize,
}

/// A comparable past project plus its computed tech-stack similarity.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarProject {
    pub project_name: String,
    pub project_code: String,
    pub complexity_score: i32,
    pub actual_duration_weeks: f64,
    pub actual_cost: Option<f64>,
    pub team_size: i32,
    pub tech_stack: Value,
    pub on_time_delivery: bool,
    pub within_budget: bool,
    pub client_satisfaction: Option<f64>,
    pub lessons_learned: String,
    pub tech_similarity: f64,
}

/// A troubled past project of the same type, with formatted issue statements.
#[derive(Debug, Clone, Serialize)]
pub struct RiskIndicator {
    pub project_name: String,
    pub issues: Vec<String>,
    pub lessons_learned: String,
}

pub struct HistoricalDataIndex {
    projects: Vec<HistoricalProject>,
    employees: Vec<Employee>,
}

impl HistoricalDataIndex {
    pub fn new(projects: Vec<HistoricalProject>, employees: Vec<Employee>) -> Self {
        Self {
            projects,
            employees,
        }
    }

    /// An index with no reference data; all queries return neutral defaults.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    /// Completed projects of the same type within the complexity window,
    /// ranked by tech-stack Jaccard similarity, above the threshold, top 5.
    pub fn similar_projects(
        &self,
        project_type: &str,
        complexity_score: i32,
        tech_stack: &[String],
    ) -> Vec<SimilarProject> {
        let target: BTreeSet<String> = tech_stack
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();

        let mut results: Vec<SimilarProject> = self
            .projects
            .iter()
            .filter(|p| {
                p.project_type == project_type
                    && p.status == "completed"
                    && (p.complexity_score - complexity_score).abs() <= COMPLEXITY_WINDOW
            })
            .filter_map(|p| {
                let similarity = jaccard_similarity(&target, &p.tech_stack.names());
                if similarity > SIMILARITY_THRESHOLD {
                    Some(SimilarProject {
                        project_name: p.project_name.clone(),
                        project_code: p.project_code.clone(),
                        complexity_score: p.complexity_score,
                        actual_duration_weeks: p.actual_duration_weeks,
                        actual_cost: p.actual_cost,
                        team_size: p.team_size,
                        tech_stack: json!({
                            "frontend": p.tech_stack.frontend,
                            "backend": p.tech_stack.backend,
                            "database": p.tech_stack.database,
                        }),
                        on_time_delivery: p.on_time_delivery,
                        within_budget: p.within_budget,
                        client_satisfaction: p.client_satisfaction,
                        lessons_learned: p.lessons_learned.clone(),
                        tech_similarity: similarity,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps snapshot order among equal similarities.
        results.sort_by(|a, b| {
            b.tech_similarity
                .partial_cmp(&a.tech_similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(RESULT_LIMIT);
        results
    }

    /// Cost statistics over completed same-type projects in the complexity
    /// window that recorded an actual cost. `None` when no sample exists.
    pub fn cost_estimates(
        &self,
        project_type: &str,
        complexity_score: i32,
    ) -> Option<CostEstimates> {
        let sample: Vec<&HistoricalProject> = self
            .projects
            .iter()
            .filter(|p| {
                p.project_type == project_type
                    && p.status == "completed"
                    && (p.complexity_score - complexity_score).abs() <= COMPLEXITY_WINDOW
                    && p.actual_cost.is_some()
            })
            .collect();

        if sample.is_empty() {
            return None;
        }

        let n = sample.len() as f64;
        let costs: Vec<f64> = sample.iter().filter_map(|p| p.actual_cost).collect();
        let avg_cost = costs.iter().sum::<f64>() / n;
        let avg_duration = sample.iter().map(|p| p.actual_duration_weeks).sum::<f64>() / n;
        let avg_team_size = sample.iter().map(|p| p.team_size as f64).sum::<f64>() / n;

        Some(CostEstimates {
            avg_cost,
            min_cost: costs.iter().cloned().fold(f64::INFINITY, f64::min),
            max_cost: costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            avg_duration_weeks: avg_duration,
            avg_team_size,
            cost_per_week: if avg_duration > 0.0 {
                avg_cost / avg_duration
            } else {
                0.0
            },
            cost_per_team_member: if avg_team_size > 0.0 {
                avg_cost / avg_team_size
            } else {
                0.0
            },
            sample_size: sample.len(),
        })
    }

    /// Global active-roster statistics. The `tech_stack` argument is accepted
    /// but currently unused: the snapshot's skill data is not consulted here,
    /// matching the upstream contract. `None` on an empty roster.
    pub fn team_performance_metrics(&self, _tech_stack: &[String]) -> Option<TeamMetrics> {
        if self.employees.is_empty() {
            return None;
        }

        let n = self.employees.len() as f64;
        Some(TeamMetrics {
            available_employees: self.employees.iter().filter(|e| e.is_active).count(),
            avg_hourly_rate: self.employees.iter().map(|e| e.hourly_rate).sum::<f64>() / n,
            avg_availability: self
                .employees
                .iter()
                .map(|e| e.availability_percentage)
                .sum::<f64>()
                / n,
            total_employees: self.employees.len(),
        })
    }

    /// Same-type projects at or above `complexity_score - 1` that missed a
    /// delivery target. Unlike the similarity queries this scans regardless
    /// of project status.
    pub fn risk_indicators(
        &self,
        project_type: &str,
        complexity_score: i32,
    ) -> Vec<RiskIndicator> {
        let mut indicators: Vec<RiskIndicator> = self
            .projects
            .iter()
            .filter(|p| {
                p.project_type == project_type
                    && p.complexity_score >= complexity_score - 1
                    && (!p.on_time_delivery
                        || !p.within_budget
                        || p.client_satisfaction.map(|s| s < 4.0).unwrap_or(false))
            })
            .map(|p| {
                let mut issues = Vec::new();

                if !p.on_time_delivery {
                    issues.push(format!(
                        "Timeline overrun by {:.1}%",
                        overrun_percentage(p.estimated_duration_weeks, p.actual_duration_weeks)
                    ));
                }
                if !p.within_budget {
                    let actual = p.actual_cost.unwrap_or(0.0);
                    issues.push(format!(
                        "Budget overrun by {:.1}%",
                        overrun_percentage(p.estimated_cost, actual)
                    ));
                }
                if let Some(satisfaction) = p.client_satisfaction {
                    if satisfaction < 4.0 {
                        issues.push(format!("Low client satisfaction: {satisfaction}/5.0"));
                    }
                }

                RiskIndicator {
                    project_name: p.project_name.clone(),
                    issues,
                    lessons_learned: p.lessons_learned.clone(),
                }
            })
            .collect();

        indicators.truncate(RESULT_LIMIT);
        indicators
    }

    /// Technology usage counts across the frontend/backend/database fields.
    pub fn technology_usage_stats(&self) -> Value {
        let total = self.projects.len();
        let mut usage: std::collections::BTreeMap<String, usize> = Default::default();

        for project in &self.projects {
            for tech in [
                &project.tech_stack.frontend,
                &project.tech_stack.backend,
                &project.tech_stack.database,
            ]
            .into_iter()
            .flatten()
            {
                if !tech.trim().is_empty() {
                    *usage.entry(tech.clone()).or_insert(0) += 1;
                }
            }
        }

        let stats: serde_json::Map<String, Value> = usage
            .into_iter()
            .map(|(tech, count)| {
                (
                    tech,
                    json!({
                        "count": count,
                        "usage_percentage": if total > 0 {
                            count as f64 / total as f64 * 100.0
                        } else {
                            0.0
                        },
                    }),
                )
            })
            .collect();

        json!({
            "total_projects_analyzed": total,
            "technology_stats": stats,
        })
    }

    /// Active roster employees, skills included.
    pub fn available_employees(&self) -> Vec<Employee> {
        self.employees
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect()
    }
}

/// Intersection over union of two technology-name sets. 0.0 when the union
/// is empty.
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Percentage overrun of actual vs estimated; 0.0 when no usable estimate.
fn overrun_percentage(estimated: Option<f64>, actual: f64) -> f64 {
    match estimated {
        Some(est) if est > 0.0 => (actual - est) / est * 100.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::{EmployeeSkill, TechStack};

    fn project(
        name: &str,
        project_type: &str,
        complexity: i32,
        stack: (&str, &str, &str),
        status: &str,
    ) -> HistoricalProject {
        HistoricalProject {
            project_name: name.to_string(),
            project_code: format!("PRJ-{name}"),
            project_type: project_type.to_string(),
            complexity_score: complexity,
            estimated_duration_weeks: Some(10.0),
            actual_duration_weeks: 12.0,
            estimated_cost: Some(100_000.0),
            actual_cost: Some(120_000.0),
            team_size: 4,
            tech_stack: TechStack {
                frontend: Some(stack.0.to_string()),
                backend: Some(stack.1.to_string()),
                database: Some(stack.2.to_string()),
            },
            on_time_delivery: true,
            within_budget: true,
            client_satisfaction: Some(4.5),
            quality_score: Some(4.0),
            lessons_learned: "Scope early".to_string(),
            status: status.to_string(),
        }
    }

    fn employee(id: &str, rate: f64, availability: f64, active: bool) -> Employee {
        Employee {
            employee_id: id.to_string(),
            name: format!("Employee {id}"),
            email: None,
            title: "Developer".to_string(),
            seniority_level: "Mid".to_string(),
            hourly_rate: rate,
            availability_percentage: availability,
            department: None,
            location: None,
            is_active: active,
            skills: vec![EmployeeSkill {
                skill_name: "Python".to_string(),
                proficiency_level: 4,
                years_experience: 5.0,
                is_primary_skill: true,
                certified: false,
            }],
        }
    }

    #[test]
    fn test_jaccard_identical_stacks_is_one() {
        let a: BTreeSet<String> = ["React", "FastAPI"].iter().map(|s| s.to_string()).collect();
        assert_eq!(jaccard_similarity(&a, &a.clone()), 1.0);
    }

    #[test]
    fn test_jaccard_disjoint_stacks_is_zero() {
        let a: BTreeSet<String> = ["React"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["Vue"].iter().map(|s| s.to_string()).collect();
        assert_eq!(jaccard_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_jaccard_empty_union_is_zero() {
        let empty = BTreeSet::new();
        assert_eq!(jaccard_similarity(&empty, &empty.clone()), 0.0);
    }

    #[test]
    fn test_similar_projects_ranks_identical_stack_first() {
        let index = HistoricalDataIndex::new(
            vec![
                project("exact", "web_app", 5, ("React", "FastAPI", "PostgreSQL"), "completed"),
                project("partial", "web_app", 5, ("React", "Django", "MySQL"), "completed"),
            ],
            vec![],
        );

        let target = vec![
            "React".to_string(),
            "FastAPI".to_string(),
            "PostgreSQL".to_string(),
        ];
        let results = index.similar_projects("web_app", 5, &target);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].project_name, "exact");
        assert_eq!(results[0].tech_similarity, 1.0);
        assert!(results[1].tech_similarity < 1.0);
    }

    #[test]
    fn test_similar_projects_excludes_disjoint_stack() {
        let index = HistoricalDataIndex::new(
            vec![project(
                "other",
                "web_app",
                5,
                ("Flutter", "Spring", "Oracle"),
                "completed",
            )],
            vec![],
        );
        let target = vec!["React".to_string(), "FastAPI".to_string()];
        assert!(index.similar_projects("web_app", 5, &target).is_empty());
    }

    #[test]
    fn test_similar_projects_filters_type_status_and_complexity() {
        let stack = ("React", "FastAPI", "PostgreSQL");
        let index = HistoricalDataIndex::new(
            vec![
                project("wrong-type", "mobile_app", 5, stack, "completed"),
                project("in-flight", "web_app", 5, stack, "active"),
                project("too-complex", "web_app", 9, stack, "completed"),
                project("match", "web_app", 6, stack, "completed"),
            ],
            vec![],
        );
        let target = vec!["React".to_string(), "FastAPI".to_string(), "PostgreSQL".to_string()];
        let results = index.similar_projects("web_app", 5, &target);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].project_name, "match");
    }

    #[test]
    fn test_similar_projects_caps_at_five() {
        let stack = ("React", "FastAPI", "PostgreSQL");
        let projects = (0..8)
            .map(|i| project(&format!("p{i}"), "web_app", 5, stack, "completed"))
            .collect();
        let index = HistoricalDataIndex::new(projects, vec![]);
        let target = vec!["React".to_string(), "FastAPI".to_string(), "PostgreSQL".to_string()];
        assert_eq!(index.similar_projects("web_app", 5, &target).len(), 5);
    }

    #[test]
    fn test_cost_estimates_statistics() {
        let mut cheap = project("cheap", "web_app", 5, ("React", "FastAPI", "PostgreSQL"), "completed");
        cheap.actual_cost = Some(80_000.0);
        cheap.actual_duration_weeks = 8.0;
        cheap.team_size = 2;
        let mut dear = project("dear", "web_app", 6, ("Vue", "Django", "MySQL"), "completed");
        dear.actual_cost = Some(120_000.0);
        dear.actual_duration_weeks = 12.0;
        dear.team_size = 6;

        let index = HistoricalDataIndex::new(vec![cheap, dear], vec![]);
        let stats = index.cost_estimates("web_app", 5).unwrap();
        assert_eq!(stats.sample_size, 2);
        assert_eq!(stats.avg_cost, 100_000.0);
        assert_eq!(stats.min_cost, 80_000.0);
        assert_eq!(stats.max_cost, 120_000.0);
        assert_eq!(stats.avg_duration_weeks, 10.0);
        assert_eq!(stats.cost_per_week, 10_000.0);
        assert_eq!(stats.cost_per_team_member, 25_000.0);
    }

    #[test]
    fn test_cost_estimates_skips_projects_without_cost() {
        let mut uncosted = project("uncosted", "web_app", 5, ("React", "FastAPI", "PostgreSQL"), "completed");
        uncosted.actual_cost = None;
        let index = HistoricalDataIndex::new(vec![uncosted], vec![]);
        assert!(index.cost_estimates("web_app", 5).is_none());
    }

    #[test]
    fn test_team_metrics_ignore_tech_stack_argument() {
        let index = HistoricalDataIndex::new(
            vec![],
            vec![
                employee("E1", 100.0, 80.0, true),
                employee("E2", 60.0, 40.0, false),
            ],
        );

        let with_stack = index
            .team_performance_metrics(&["React".to_string()])
            .unwrap();
        let without_stack = index.team_performance_metrics(&[]).unwrap();

        assert_eq!(with_stack.available_employees, without_stack.available_employees);
        assert_eq!(with_stack.avg_hourly_rate, 80.0);
        assert_eq!(with_stack.avg_availability, 60.0);
        assert_eq!(with_stack.available_employees, 1);
        assert_eq!(with_stack.total_employees, 2);
    }

    #[test]
    fn test_risk_indicators_formats_issue_statements() {
        let mut troubled = project("troubled", "web_app", 6, ("React", "FastAPI", "PostgreSQL"), "completed");
        troubled.on_time_delivery = false;
        troubled.within_budget = false;
        troubled.client_satisfaction = Some(3.5);
        troubled.estimated_duration_weeks = Some(10.0);
        troubled.actual_duration_weeks = 15.0;
        troubled.estimated_cost = Some(100_000.0);
        troubled.actual_cost = Some(150_000.0);

        let index = HistoricalDataIndex::new(vec![troubled], vec![]);
        let risks = index.risk_indicators("web_app", 5);
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].issues[0], "Timeline overrun by 50.0%");
        assert_eq!(risks[0].issues[1], "Budget overrun by 50.0%");
        assert_eq!(risks[0].issues[2], "Low client satisfaction: 3.5/5.0");
    }

    #[test]
    fn test_risk_indicators_scan_non_completed_projects() {
        let mut abandoned = project("abandoned", "web_app", 6, ("React", "FastAPI", "PostgreSQL"), "cancelled");
        abandoned.within_budget = false;
        let index = HistoricalDataIndex::new(vec![abandoned], vec![]);
        assert_eq!(index.risk_indicators("web_app", 5).len(), 1);
    }

    #[test]
    fn test_risk_indicators_exclude_healthy_and_low_complexity() {
        let healthy = project("healthy", "web_app", 6, ("React", "FastAPI", "PostgreSQL"), "completed");
        let mut simple_troubled = project("simple", "web_app", 2, ("React", "FastAPI", "PostgreSQL"), "completed");
        simple_troubled.on_time_delivery = false;
        let index = HistoricalDataIndex::new(vec![healthy, simple_troubled], vec![]);
        assert!(index.risk_indicators("web_app", 5).is_empty());
    }

    #[test]
    fn test_risk_overrun_zero_when_estimate_missing() {
        let mut no_estimate = project("no-est", "web_app", 6, ("React", "FastAPI", "PostgreSQL"), "completed");
        no_estimate.on_time_delivery = false;
        no_estimate.estimated_duration_weeks = None;
        let index = HistoricalDataIndex::new(vec![no_estimate], vec![]);
        let risks = index.risk_indicators("web_app", 5);
        assert_eq!(risks[0].issues[0], "Timeline overrun by 0.0%");
    }

    #[test]
    fn test_technology_usage_stats_counts_and_percentages() {
        let index = HistoricalDataIndex::new(
            vec![
                project("a", "web_app", 5, ("React", "FastAPI", "PostgreSQL"), "completed"),
                project("b", "web_app", 5, ("React", "Django", "PostgreSQL"), "completed"),
            ],
            vec![],
        );
        let stats = index.technology_usage_stats();
        assert_eq!(stats["total_projects_analyzed"], 2);
        assert_eq!(stats["technology_stats"]["React"]["count"], 2);
        assert_eq!(stats["technology_stats"]["React"]["usage_percentage"], 100.0);
        assert_eq!(stats["technology_stats"]["Django"]["count"], 1);
    }

    #[test]
    fn test_available_employees_filters_inactive() {
        let index = HistoricalDataIndex::new(
            vec![],
            vec![
                employee("E1", 100.0, 80.0, true),
                employee("E2", 60.0, 40.0, false),
            ],
        );
        let roster = index.available_employees();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].employee_id, "E1");
        assert_eq!(roster[0].skills.len(), 1);
    }

    #[test]
    fn test_empty_index_returns_neutral_defaults() {
        let index = HistoricalDataIndex::empty();
        assert!(index.similar_projects("web_app", 5, &[]).is_empty());
        assert!(index.cost_estimates("web_app", 5).is_none());
        assert!(index.team_performance_metrics(&[]).is_none());
        assert!(index.risk_indicators("web_app", 5).is_empty());
        assert!(index.available_employees().is_empty());
        assert_eq!(index.technology_usage_stats()["total_projects_analyzed"], 0);
    }
}
