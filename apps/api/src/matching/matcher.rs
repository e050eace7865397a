//! Employee Matcher — ranks roster employees against the estimation stage's
//! recommended roles and attaches the top candidates to each role.
//!
//! Matching is best-effort enrichment: an empty roster returns the
//! composition unchanged, and the pipeline coordinator treats any enrichment
//! failure as non-fatal.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::history::HistoricalDataIndex;
use crate::matching::role_skills::{role_relevant_skills, seniority_rank};
use crate::models::reference::Employee;

/// Candidates attached per role.
const TOP_CANDIDATES: usize = 3;
/// Points for a role-title word appearing in the employee title.
const TITLE_POINTS: f64 = 15.0;
/// Points for an exact / adjacent seniority match.
const SENIORITY_EXACT_POINTS: f64 = 20.0;
const SENIORITY_ADJACENT_POINTS: f64 = 10.0;
/// Per-skill contribution ceiling.
const SKILL_POINT_CAP: f64 = 10.0;
const SCORE_CAP: f64 = 100.0;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Employee enrichment failed: {0}")]
    Enrichment(String),
}

/// A skill that contributed to an employee's match score.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingSkill {
    pub skill: String,
    pub proficiency: i32,
    pub years: f64,
}

/// One ranked candidate for a role.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedEmployee {
    pub employee_id: String,
    pub name: String,
    pub title: String,
    pub seniority_level: String,
    pub hourly_rate: f64,
    pub availability: String,
    pub location: Option<String>,
    /// 0–100, two-decimal precision.
    pub match_score: f64,
    pub matching_skills: Vec<MatchingSkill>,
    pub total_skills: usize,
    /// Integer truncation of `match_score`.
    pub match_percentage: i64,
}

/// Seam for the coordinator: the concrete matcher never fails, but the trait
/// lets tests inject an enrichment failure to exercise isolation.
pub trait RoleMatcher: Send + Sync {
    fn enrich(
        &self,
        team_composition: Vec<Value>,
        required_skills: &[String],
    ) -> Result<Vec<Value>, MatchError>;
}

pub struct EmployeeMatcher {
    history: Arc<HistoricalDataIndex>,
}

impl EmployeeMatcher {
    pub fn new(history: Arc<HistoricalDataIndex>) -> Self {
        Self { history }
    }
}

impl RoleMatcher for EmployeeMatcher {
    /// Attaches `recommended_employees` (best-first, top 3) to every role in
    /// the composition. With no roster data the composition passes through
    /// untouched.
    fn enrich(
        &self,
        team_composition: Vec<Value>,
        required_skills: &[String],
    ) -> Result<Vec<Value>, MatchError> {
        let roster = self.history.available_employees();
        if roster.is_empty() {
            return Ok(team_composition);
        }

        let enriched = team_composition
            .into_iter()
            .map(|mut role| {
                let role_title = role
                    .get("role")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let seniority = role
                    .get("seniority")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();

                let role_skills = role_relevant_skills(&role_title, required_skills);
                let candidates = rank_candidates(&roster, &role_title, &seniority, &role_skills);

                if let Some(obj) = role.as_object_mut() {
                    obj.insert(
                        "recommended_employees".to_string(),
                        json!(candidates.into_iter().take(TOP_CANDIDATES).collect::<Vec<_>>()),
                    );
                }
                role
            })
            .collect();

        Ok(enriched)
    }
}

/// Scores every roster employee against the role, drops zero scores, and
/// returns the rest ordered best-first. The sort is stable, so equal scores
/// keep roster order and the ranking is deterministic.
fn rank_candidates(
    roster: &[Employee],
    role_title: &str,
    seniority: &str,
    role_skills: &[String],
) -> Vec<MatchedEmployee> {
    let mut matches: Vec<MatchedEmployee> = roster
        .iter()
        .filter_map(|emp| {
            let (score, matching_skills) = match_score(emp, role_title, seniority, role_skills);
            if score > 0.0 {
                Some(MatchedEmployee {
                    employee_id: emp.employee_id.clone(),
                    name: emp.name.clone(),
                    title: emp.title.clone(),
                    seniority_level: emp.seniority_level.clone(),
                    hourly_rate: emp.hourly_rate,
                    availability: format!("{}%", emp.availability_percentage),
                    location: emp.location.clone(),
                    match_score: score,
                    matching_skills,
                    total_skills: emp.skills.len(),
                    match_percentage: score.trunc() as i64,
                })
            } else {
                None
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}

/// Weighted score in [0, 100] with the skills that contributed.
fn match_score(
    employee: &Employee,
    role_title: &str,
    seniority: &str,
    role_skills: &[String],
) -> (f64, Vec<MatchingSkill>) {
    let mut score = 0.0;
    let mut matching_skills = Vec::new();

    let employee_title = employee.title.to_lowercase();
    let role_lower = role_title.to_lowercase();

    // Title overlap: one award no matter how many words hit.
    for word in role_lower.split_whitespace() {
        if word.len() > 3 && employee_title.contains(word) {
            score += TITLE_POINTS;
            break;
        }
    }

    // Seniority: exact label match beats rank adjacency.
    let employee_seniority = employee.seniority_level.to_lowercase();
    if seniority.to_lowercase() == employee_seniority {
        score += SENIORITY_EXACT_POINTS;
    } else if (seniority_rank(seniority) - seniority_rank(&employee.seniority_level)).abs() <= 1 {
        score += SENIORITY_ADJACENT_POINTS;
    }

    // Skills: each employee skill counts once, against the first required
    // skill it fuzzy-matches, weighted by proficiency.
    for emp_skill in &employee.skills {
        let skill_name = emp_skill.skill_name.to_lowercase();
        for required in role_skills {
            let required_lower = required.to_lowercase();
            if required_lower.contains(&skill_name) || skill_name.contains(&required_lower) {
                score += (emp_skill.proficiency_level as f64 * 2.0).min(SKILL_POINT_CAP);
                matching_skills.push(MatchingSkill {
                    skill: emp_skill.skill_name.clone(),
                    proficiency: emp_skill.proficiency_level,
                    years: emp_skill.years_experience,
                });
                break;
            }
        }
    }

    score = score.min(SCORE_CAP);
    // Two-decimal precision on the reported score.
    ((score * 100.0).round() / 100.0, matching_skills)
}
