//! Subject entity type

use serde::{Deserialize, Serialize};

use crate::core::identity::CreatedId;
use crate::entities::Entity;

/// Lowest accepted credit value
pub const MIN_CREDITS: i64 = 1;

/// Highest accepted credit value
pub const MAX_CREDITS: i64 = 10;

/// A course catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: i64,
    pub subject_code: String,
    pub subject_name: String,
    pub credits: i64,
    pub dept_id: i64,
}

impl Entity for Subject {
    fn natural_key(&self) -> &str {
        &self.subject_code
    }

    fn created_id(&self) -> CreatedId {
        CreatedId::Numeric(self.subject_id)
    }
}
