pub mod matcher;
pub mod role_skills;

pub use matcher::{EmployeeMatcher, MatchError, RoleMatcher};
