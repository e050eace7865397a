//! Static role-category → skill-keyword table and seniority ranks.
//!
//! A role title belongs to every category whose name appears as a substring
//! of the lowercased title ("Full Stack Developer" hits `full stack`; a
//! "Backend Architect" hits both `backend` and `architect`).

/// Skill keywords associated with each role category.
pub const ROLE_SKILL_MAP: &[(&str, &[&str])] = &[
    (
        "frontend",
        &[
            "react",
            "vue",
            "angular",
            "typescript",
            "javascript",
            "html",
            "css",
            "next.js",
            "tailwind",
        ],
    ),
    (
        "backend",
        &[
            "python", "node.js", "java", "c#", "go", "django", "flask", "fastapi", "spring",
            "express",
        ],
    ),
    (
        "full stack",
        &[
            "react",
            "python",
            "node.js",
            "typescript",
            "javascript",
            "django",
            "flask",
            "express",
        ],
    ),
    (
        "mobile",
        &["react native", "flutter", "swift", "kotlin", "ios", "android"],
    ),
    (
        "devops",
        &[
            "docker",
            "kubernetes",
            "aws",
            "azure",
            "gcp",
            "ci/cd",
            "terraform",
            "jenkins",
        ],
    ),
    (
        "data",
        &["python", "sql", "pandas", "numpy", "spark", "hadoop", "tableau"],
    ),
    (
        "ai",
        &[
            "python",
            "tensorflow",
            "pytorch",
            "scikit-learn",
            "nlp",
            "computer vision",
        ],
    ),
    (
        "ml",
        &[
            "python",
            "tensorflow",
            "pytorch",
            "scikit-learn",
            "machine learning",
        ],
    ),
    (
        "qa",
        &["selenium", "cypress", "jest", "pytest", "testing", "automation"],
    ),
    (
        "designer",
        &["figma", "sketch", "adobe xd", "ui/ux", "design"],
    ),
    (
        "product",
        &["agile", "scrum", "product management", "jira"],
    ),
    (
        "architect",
        &["system design", "architecture", "microservices", "scalability"],
    ),
];

/// Numeric rank for a seniority label. Unrecognized labels rank as Mid.
pub fn seniority_rank(level: &str) -> i32 {
    match level.to_lowercase().as_str() {
        "junior" => 1,
        "mid" | "mid-level" => 2,
        "senior" => 3,
        "lead" => 4,
        "principal" | "staff" => 5,
        _ => 2,
    }
}

/// Keywords relevant to `role_title`: the union of every matching category's
/// keyword list, plus any externally supplied skill that fuzzy-matches
/// (substring either direction) one of those keywords.
pub fn role_relevant_skills(role_title: &str, required_skills: &[String]) -> Vec<String> {
    let role_lower = role_title.to_lowercase();
    let mut relevant: Vec<String> = Vec::new();

    for (category, keywords) in ROLE_SKILL_MAP {
        if role_lower.contains(category) {
            for kw in *keywords {
                if !relevant.iter().any(|r| r == kw) {
                    relevant.push((*kw).to_string());
                }
            }
        }
    }

    for skill in required_skills {
        let skill_lower = skill.to_lowercase();
        let matches = relevant
            .iter()
            .any(|kw| kw.contains(&skill_lower) || skill_lower.contains(kw.as_str()));
        if matches && !relevant.iter().any(|r| r == skill) {
            relevant.push(skill.clone());
        }
    }

    relevant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_ranks_are_ordered() {
        assert!(seniority_rank("Junior") < seniority_rank("Mid"));
        assert!(seniority_rank("Mid") < seniority_rank("Senior"));
        assert!(seniority_rank("Senior") < seniority_rank("Lead"));
        assert_eq!(seniority_rank("Principal"), seniority_rank("Staff"));
        assert_eq!(seniority_rank("mid-level"), 2);
    }

    #[test]
    fn test_unknown_seniority_defaults_to_mid() {
        assert_eq!(seniority_rank("Wizard"), 2);
    }

    #[test]
    fn test_frontend_role_pulls_frontend_keywords() {
        let skills = role_relevant_skills("Frontend Developer", &[]);
        assert!(skills.iter().any(|s| s == "react"));
        assert!(skills.iter().any(|s| s == "typescript"));
        assert!(!skills.iter().any(|s| s == "docker"));
    }

    #[test]
    fn test_role_can_match_multiple_categories() {
        let skills = role_relevant_skills("Backend Architect", &[]);
        assert!(skills.iter().any(|s| s == "fastapi"));
        assert!(skills.iter().any(|s| s == "microservices"));
    }

    #[test]
    fn test_required_skill_joined_by_fuzzy_match() {
        let required = vec!["FastAPI".to_string(), "Figma".to_string()];
        let skills = role_relevant_skills("Backend Developer", &required);
        // "fastapi" keyword already present; the supplied form is appended once.
        assert!(skills.iter().any(|s| s == "FastAPI"));
        // "Figma" matches no backend keyword and is not joined.
        assert!(!skills.iter().any(|s| s == "Figma"));
    }

    #[test]
    fn test_unmatched_role_title_yields_only_external_matches() {
        assert!(role_relevant_skills("Scrum Master", &[]).is_empty());
    }
}
