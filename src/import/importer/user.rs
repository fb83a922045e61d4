//! User rows: account with role, optional department and phone

use crate::core::identity::{EntityKind, UserId};
use crate::core::password::{default_password, hash_password};
use crate::entities::{NewEntity, RoleName, User};
use crate::import::cache::ReferenceCache;
use crate::import::parser::RowRecord;

use super::{
    check_email, check_length, optional, required, RowError, RowImporter, MAX_NAME_LEN,
    MAX_PHONE_LEN,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct UserImporter;

#[derive(Debug)]
pub struct UserFields {
    email: String,
    full_name: String,
    role: RoleName,
    dept_name: Option<String>,
    phone: Option<String>,
}

#[derive(Debug)]
pub struct UserRefs {
    role_id: i64,
    dept_id: Option<i64>,
}

impl RowImporter for UserImporter {
    const KIND: EntityKind = EntityKind::Users;
    type Fields = UserFields;
    type Resolved = UserRefs;

    fn validate(&self, row: &RowRecord) -> Result<UserFields, RowError> {
        let email = required(row, "email")?;
        let full_name = required(row, "full_name")?;
        let role_name = required(row, "role_name")?;
        let dept_name = optional(row, "dept_name");
        let phone = optional(row, "phone");

        check_email("email", email)?;
        check_length("full_name", full_name, MAX_NAME_LEN)?;
        let role: RoleName = role_name.parse().map_err(RowError::InvalidRole)?;

        if role.requires_department() && dept_name.is_none() {
            return Err(RowError::DepartmentRequired(role));
        }
        if let Some(dept) = dept_name {
            check_length("dept_name", dept, MAX_NAME_LEN)?;
        }
        if let Some(phone) = phone {
            check_length("phone", phone, MAX_PHONE_LEN)?;
        }

        Ok(UserFields {
            email: email.to_string(),
            full_name: full_name.to_string(),
            role,
            dept_name: dept_name.map(String::from),
            phone: phone.map(String::from),
        })
    }

    fn natural_key<'a>(&self, fields: &'a UserFields) -> &'a str {
        &fields.email
    }

    fn resolve(&self, fields: &UserFields, cache: &ReferenceCache) -> Result<UserRefs, RowError> {
        let role_id = cache
            .role(fields.role.as_str())
            .ok_or_else(|| RowError::RoleNotFound(fields.role.to_string()))?;

        let dept_id = match &fields.dept_name {
            Some(name) => Some(
                cache
                    .department(name)
                    .ok_or_else(|| RowError::DepartmentNotFound(name.clone()))?,
            ),
            None => None,
        };

        Ok(UserRefs { role_id, dept_id })
    }

    fn construct(
        &self,
        fields: UserFields,
        refs: UserRefs,
        _cache: &mut ReferenceCache,
    ) -> Result<NewEntity, RowError> {
        let password_hash = hash_password(&default_password(&fields.email))?;

        Ok(User {
            user_id: UserId::new(),
            email: fields.email,
            full_name: fields.full_name,
            password_hash,
            role_id: refs.role_id,
            dept_id: refs.dept_id,
            phone: fields.phone,
            is_active: true,
        }
        .into())
    }
}
