//! Reference data read by the importers (departments, semesters, role names)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An academic department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub dept_id: i64,
    pub dept_name: String,
}

/// A teaching semester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub semester_id: i64,
    pub semester_code: String,
    pub semester_name: String,
}

/// The fixed set of role names accepted on import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Admin,
    Staff,
    HeadDept,
    Lecturer,
    Student,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ADMIN",
            RoleName::Staff => "STAFF",
            RoleName::HeadDept => "HEAD_DEPT",
            RoleName::Lecturer => "LECTURER",
            RoleName::Student => "STUDENT",
        }
    }

    pub fn all() -> &'static [RoleName] {
        &[
            RoleName::Admin,
            RoleName::Staff,
            RoleName::HeadDept,
            RoleName::Lecturer,
            RoleName::Student,
        ]
    }

    /// Comma separated list for messages ("ADMIN, STAFF, ...")
    pub fn allowed_list() -> String {
        Self::all()
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Lecturers and students must belong to a department
    pub fn requires_department(&self) -> bool {
        matches!(self, RoleName::Lecturer | RoleName::Student)
    }

    /// Roles allowed to run bulk imports
    pub fn can_import(&self) -> bool {
        matches!(self, RoleName::Admin | RoleName::Staff)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(RoleName::Admin),
            "STAFF" => Ok(RoleName::Staff),
            "HEAD_DEPT" => Ok(RoleName::HeadDept),
            "LECTURER" => Ok(RoleName::Lecturer),
            "STUDENT" => Ok(RoleName::Student),
            other => Err(format!(
                "Invalid role '{}'. Allowed: {}",
                other,
                Self::allowed_list()
            )),
        }
    }
}
