//! Entity kinds handled by the importer and the identifiers it hands out

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity types that can be bulk imported (one per batch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Subjects (course catalog entries)
    Subjects,
    /// Academic classes (a subject taught in a semester by a lecturer)
    Classes,
    /// User accounts
    Users,
}

impl EntityKind {
    /// Get the string representation used on the command line and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Subjects => "subjects",
            EntityKind::Classes => "classes",
            EntityKind::Users => "users",
        }
    }

    /// Get all importable kinds
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Subjects, EntityKind::Classes, EntityKind::Users]
    }

    /// Singular noun for messages ("Subject created successfully")
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Subjects => "Subject",
            EntityKind::Classes => "Class",
            EntityKind::Users => "User",
        }
    }

    /// Column holding the natural key of a row
    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::Subjects => "subject_code",
            EntityKind::Classes => "class_code",
            EntityKind::Users => "email",
        }
    }

    /// Human label for the natural key ("Subject code 'IT101' ...")
    pub fn key_label(&self) -> &'static str {
        match self {
            EntityKind::Subjects => "Subject code",
            EntityKind::Classes => "Class code",
            EntityKind::Users => "Email",
        }
    }

    /// Columns that must be present in the header row
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Subjects => &["subject_code", "subject_name", "credits", "dept_name"],
            EntityKind::Classes => &["class_code", "semester_code", "subject_code", "lecturer_email"],
            EntityKind::Users => &["email", "full_name", "role_name"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subjects" | "subject" => Ok(EntityKind::Subjects),
            "classes" | "class" => Ok(EntityKind::Classes),
            "users" | "user" => Ok(EntityKind::Users),
            _ => Err(IdParseError::InvalidKind(s.to_string())),
        }
    }
}

/// User identifier (ULID), generated when the user is staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Ulid);

impl UserId {
    /// Create a fresh identifier
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a UserId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(UserId)
            .map_err(|e| IdParseError::InvalidUlid(s.to_string(), e.to_string()))
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a newly created entity, as reported on a successful row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedId {
    /// Numeric primary key (subjects, classes)
    Numeric(i64),
    /// User identifier
    User(UserId),
}

impl fmt::Display for CreatedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatedId::Numeric(id) => write!(f, "{}", id),
            CreatedId::User(id) => write!(f, "{}", id),
        }
    }
}

/// Errors that can occur when parsing kinds and identifiers
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity type: '{0}' (valid: subjects, classes, users)")]
    InvalidKind(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
