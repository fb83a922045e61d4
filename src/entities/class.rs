//! Academic class entity type

use serde::{Deserialize, Serialize};

use crate::core::identity::{CreatedId, UserId};
use crate::entities::Entity;

/// A subject taught in one semester by one lecturer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicClass {
    pub class_id: i64,
    pub class_code: String,
    pub semester_id: i64,
    pub subject_id: i64,
    pub lecturer_id: UserId,
}

impl Entity for AcademicClass {
    fn natural_key(&self) -> &str {
        &self.class_code
    }

    fn created_id(&self) -> CreatedId {
        CreatedId::Numeric(self.class_id)
    }
}
