//! User account entity type

use serde::{Deserialize, Serialize};

use crate::core::identity::{CreatedId, UserId};
use crate::entities::Entity;

/// A user account
///
/// `password_hash` is an Argon2id PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_active: bool,
}

impl Entity for User {
    fn natural_key(&self) -> &str {
        &self.email
    }

    fn created_id(&self) -> CreatedId {
        CreatedId::User(self.user_id)
    }
}
