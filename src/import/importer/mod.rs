//! Row importers, one per entity kind
//!
//! Every kind runs the same skeleton ([`import_row`]): validate the row's
//! fields, reject duplicates of its natural key, resolve foreign references
//! through the [`ReferenceCache`], then construct the staged entity and claim
//! its key. The variants only supply the per-kind pieces.

mod class;
mod subject;
mod user;

pub use class::ClassImporter;
pub use subject::SubjectImporter;
pub use user::UserImporter;

use thiserror::Error;

use crate::core::identity::EntityKind;
use crate::core::password::PasswordError;
use crate::entities::{NewEntity, RoleName};

use super::cache::{KeyOrigin, ReferenceCache};
use super::parser::RowRecord;

/// Longest accepted code (subject, class, semester)
pub const MAX_CODE_LEN: usize = 50;

/// Longest accepted name or email
pub const MAX_NAME_LEN: usize = 255;

/// Longest accepted phone number
pub const MAX_PHONE_LEN: usize = 20;

/// Per-kind steps plugged into the shared skeleton
pub trait RowImporter {
    const KIND: EntityKind;

    /// Validated, trimmed field values of one row
    type Fields;

    /// Foreign ids the row refers to
    type Resolved;

    fn validate(&self, row: &RowRecord) -> Result<Self::Fields, RowError>;

    fn natural_key<'a>(&self, fields: &'a Self::Fields) -> &'a str;

    fn resolve(&self, fields: &Self::Fields, cache: &ReferenceCache) -> Result<Self::Resolved, RowError>;

    /// Build the staged entity (may reserve a provisional id from the cache)
    fn construct(
        &self,
        fields: Self::Fields,
        resolved: Self::Resolved,
        cache: &mut ReferenceCache,
    ) -> Result<NewEntity, RowError>;
}

/// What happened to a row that did not fail
#[derive(Debug)]
pub enum RowDisposition {
    Created(NewEntity),
    Duplicate(String),
}

/// Run one row through the shared skeleton
pub fn import_row<I: RowImporter>(
    importer: &I,
    row: &RowRecord,
    cache: &mut ReferenceCache,
) -> Result<RowDisposition, RowError> {
    let fields = importer.validate(row)?;

    let key = importer.natural_key(&fields).to_string();
    if let Some(origin) = cache.key_origin(&key) {
        return Ok(RowDisposition::Duplicate(duplicate_reason(I::KIND, &key, origin)));
    }

    let resolved = importer.resolve(&fields, cache)?;
    let entity = importer.construct(fields, resolved, cache)?;
    cache.record_key(&key, row.number);

    Ok(RowDisposition::Created(entity))
}

fn duplicate_reason(kind: EntityKind, key: &str, origin: KeyOrigin) -> String {
    match origin {
        KeyOrigin::Store => format!("{} '{}' already exists in database", kind.key_label(), key),
        KeyOrigin::Row(line) => format!(
            "{} '{}' already appears on line {} of this file",
            kind.key_label(),
            key,
            line
        ),
    }
}

/// The importer selected for a batch
#[derive(Debug, Clone, Copy)]
pub enum Importer {
    Subject(SubjectImporter),
    Class(ClassImporter),
    User(UserImporter),
}

impl Importer {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Subjects => Importer::Subject(SubjectImporter),
            EntityKind::Classes => Importer::Class(ClassImporter),
            EntityKind::Users => Importer::User(UserImporter),
        }
    }

    pub fn import_row(
        &self,
        row: &RowRecord,
        cache: &mut ReferenceCache,
    ) -> Result<RowDisposition, RowError> {
        match self {
            Importer::Subject(i) => import_row(i, row, cache),
            Importer::Class(i) => import_row(i, row, cache),
            Importer::User(i) => import_row(i, row, cache),
        }
    }
}

/// Reasons a single row cannot be imported
#[derive(Debug, Error)]
pub enum RowError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid credits value: {0}")]
    InvalidCredits(String),

    #[error("Invalid {0} format")]
    InvalidEmail(&'static str),

    #[error("{0}")]
    InvalidRole(String),

    #[error("Department is required for {0} role")]
    DepartmentRequired(RoleName),

    #[error("Department '{0}' not found in database")]
    DepartmentNotFound(String),

    #[error("Role '{0}' not found in database")]
    RoleNotFound(String),

    #[error("Semester with code '{0}' not found")]
    SemesterNotFound(String),

    #[error("Subject with code '{0}' not found")]
    SubjectNotFound(String),

    #[error("Lecturer with email '{0}' not found or not a lecturer")]
    LecturerNotFound(String),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Trimmed value of a column that must not be blank
fn required<'a>(row: &'a RowRecord, column: &'static str) -> Result<&'a str, RowError> {
    let value = row.get(column).trim();
    if value.is_empty() {
        return Err(RowError::Required(column));
    }
    Ok(value)
}

/// Trimmed value of a column, `None` when blank or absent
fn optional<'a>(row: &'a RowRecord, column: &str) -> Option<&'a str> {
    Some(row.get(column).trim()).filter(|v| !v.is_empty())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), RowError> {
    if value.chars().count() > max {
        return Err(RowError::TooLong { field, max });
    }
    Ok(())
}

fn check_email(field: &'static str, value: &str) -> Result<(), RowError> {
    if !value.contains('@') {
        return Err(RowError::InvalidEmail(field));
    }
    check_length(field, value, MAX_NAME_LEN)
}
