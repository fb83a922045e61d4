//! Class rows: a subject taught in a semester by a lecturer

use crate::core::identity::{EntityKind, UserId};
use crate::entities::{AcademicClass, NewEntity};
use crate::import::cache::ReferenceCache;
use crate::import::parser::RowRecord;

use super::{check_email, check_length, required, RowError, RowImporter, MAX_CODE_LEN};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassImporter;

#[derive(Debug)]
pub struct ClassFields {
    class_code: String,
    semester_code: String,
    subject_code: String,
    lecturer_email: String,
}

#[derive(Debug)]
pub struct ClassRefs {
    semester_id: i64,
    subject_id: i64,
    lecturer_id: UserId,
}

impl RowImporter for ClassImporter {
    const KIND: EntityKind = EntityKind::Classes;
    type Fields = ClassFields;
    type Resolved = ClassRefs;

    fn validate(&self, row: &RowRecord) -> Result<ClassFields, RowError> {
        let class_code = required(row, "class_code")?;
        let semester_code = required(row, "semester_code")?;
        let subject_code = required(row, "subject_code")?;
        let lecturer_email = required(row, "lecturer_email")?;

        check_length("class_code", class_code, MAX_CODE_LEN)?;
        check_length("semester_code", semester_code, MAX_CODE_LEN)?;
        check_length("subject_code", subject_code, MAX_CODE_LEN)?;
        check_email("lecturer_email", lecturer_email)?;

        Ok(ClassFields {
            class_code: class_code.to_string(),
            semester_code: semester_code.to_string(),
            subject_code: subject_code.to_string(),
            lecturer_email: lecturer_email.to_string(),
        })
    }

    fn natural_key<'a>(&self, fields: &'a ClassFields) -> &'a str {
        &fields.class_code
    }

    fn resolve(&self, fields: &ClassFields, cache: &ReferenceCache) -> Result<ClassRefs, RowError> {
        let semester_id = cache
            .semester(&fields.semester_code)
            .ok_or_else(|| RowError::SemesterNotFound(fields.semester_code.clone()))?;
        let subject_id = cache
            .subject(&fields.subject_code)
            .ok_or_else(|| RowError::SubjectNotFound(fields.subject_code.clone()))?;
        let lecturer_id = cache
            .lecturer(&fields.lecturer_email)
            .ok_or_else(|| RowError::LecturerNotFound(fields.lecturer_email.clone()))?;

        Ok(ClassRefs {
            semester_id,
            subject_id,
            lecturer_id,
        })
    }

    fn construct(
        &self,
        fields: ClassFields,
        refs: ClassRefs,
        cache: &mut ReferenceCache,
    ) -> Result<NewEntity, RowError> {
        Ok(AcademicClass {
            class_id: cache.allocate_id(),
            class_code: fields.class_code,
            semester_id: refs.semester_id,
            subject_id: refs.subject_id,
            lecturer_id: refs.lecturer_id,
        }
        .into())
    }
}
