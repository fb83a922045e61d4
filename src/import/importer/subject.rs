//! Subject rows: code, name, credits and owning department

use crate::core::identity::EntityKind;
use crate::entities::subject::{MAX_CREDITS, MIN_CREDITS};
use crate::entities::{NewEntity, Subject};
use crate::import::cache::ReferenceCache;
use crate::import::parser::RowRecord;

use super::{check_length, required, RowError, RowImporter, MAX_CODE_LEN, MAX_NAME_LEN};

#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectImporter;

#[derive(Debug)]
pub struct SubjectFields {
    code: String,
    name: String,
    credits: i64,
    dept_name: String,
}

impl RowImporter for SubjectImporter {
    const KIND: EntityKind = EntityKind::Subjects;
    type Fields = SubjectFields;
    type Resolved = i64;

    fn validate(&self, row: &RowRecord) -> Result<SubjectFields, RowError> {
        let code = required(row, "subject_code")?;
        let name = required(row, "subject_name")?;
        let credits = required(row, "credits")?;
        let dept_name = required(row, "dept_name")?;

        check_length("subject_code", code, MAX_CODE_LEN)?;
        check_length("subject_name", name, MAX_NAME_LEN)?;
        check_length("dept_name", dept_name, MAX_NAME_LEN)?;

        Ok(SubjectFields {
            code: code.to_string(),
            name: name.to_string(),
            credits: parse_credits(credits)?,
            dept_name: dept_name.to_string(),
        })
    }

    fn natural_key<'a>(&self, fields: &'a SubjectFields) -> &'a str {
        &fields.code
    }

    fn resolve(&self, fields: &SubjectFields, cache: &ReferenceCache) -> Result<i64, RowError> {
        cache
            .department(&fields.dept_name)
            .ok_or_else(|| RowError::DepartmentNotFound(fields.dept_name.clone()))
    }

    fn construct(
        &self,
        fields: SubjectFields,
        dept_id: i64,
        cache: &mut ReferenceCache,
    ) -> Result<NewEntity, RowError> {
        Ok(Subject {
            subject_id: cache.allocate_id(),
            subject_code: fields.code,
            subject_name: fields.name,
            credits: fields.credits,
            dept_id,
        }
        .into())
    }
}

fn parse_credits(raw: &str) -> Result<i64, RowError> {
    let credits: i64 = raw
        .parse()
        .map_err(|_| RowError::InvalidCredits(format!("'{}' is not a whole number", raw)))?;

    if !(MIN_CREDITS..=MAX_CREDITS).contains(&credits) {
        return Err(RowError::InvalidCredits(format!(
            "credits must be between {} and {}, got {}",
            MIN_CREDITS, MAX_CREDITS, credits
        )));
    }
    Ok(credits)
}
