//! Entity type definitions
//!
//! The import engine creates three kinds of entities:
//! - [`Subject`] - a course catalog entry owned by a department
//! - [`AcademicClass`] - a subject taught in a semester by a lecturer
//! - [`User`] - an account with a role and, for some roles, a department
//!
//! Reference data it only reads lives in [`reference`].

pub mod class;
pub mod reference;
pub mod subject;
pub mod user;

pub use class::AcademicClass;
pub use reference::{Department, RoleName, Semester};
pub use subject::Subject;
pub use user::User;

use serde::Serialize;

use crate::core::identity::CreatedId;

/// Common trait for entities created by an import
pub trait Entity: Serialize {
    /// The natural key used for duplicate detection (code or email)
    fn natural_key(&self) -> &str;

    /// The identifier assigned when the entity was staged
    fn created_id(&self) -> CreatedId;
}

/// A staged entity waiting for the batch commit
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NewEntity {
    Subject(Subject),
    Class(AcademicClass),
    User(User),
}

impl NewEntity {
    pub fn natural_key(&self) -> &str {
        match self {
            NewEntity::Subject(s) => s.natural_key(),
            NewEntity::Class(c) => c.natural_key(),
            NewEntity::User(u) => u.natural_key(),
        }
    }

    pub fn created_id(&self) -> CreatedId {
        match self {
            NewEntity::Subject(s) => s.created_id(),
            NewEntity::Class(c) => c.created_id(),
            NewEntity::User(u) => u.created_id(),
        }
    }
}

impl From<Subject> for NewEntity {
    fn from(subject: Subject) -> Self {
        NewEntity::Subject(subject)
    }
}

impl From<AcademicClass> for NewEntity {
    fn from(class: AcademicClass) -> Self {
        NewEntity::Class(class)
    }
}

impl From<User> for NewEntity {
    fn from(user: User) -> Self {
        NewEntity::User(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::UserId;

    #[test]
    fn test_staged_entity_exposes_key_and_id() {
        let subject: NewEntity = Subject {
            subject_id: 7,
            subject_code: "IT101".to_string(),
            subject_name: "Intro".to_string(),
            credits: 3,
            dept_id: 1,
        }
        .into();
        assert_eq!(subject.natural_key(), "IT101");
        assert_eq!(subject.created_id(), CreatedId::Numeric(7));

        let lecturer = UserId::new();
        let class: NewEntity = AcademicClass {
            class_id: 2,
            class_code: "SE1801".to_string(),
            semester_id: 1,
            subject_id: 7,
            lecturer_id: lecturer,
        }
        .into();
        assert!(matches!(class, NewEntity::Class(_)));
        assert_eq!(class.natural_key(), "SE1801");
    }
}
