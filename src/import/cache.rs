//! Batch-scoped reference cache
//!
//! Built once per import from a handful of store reads, then consulted for
//! every row. Natural keys of rows that succeed are added as the batch runs,
//! so later rows see earlier rows as duplicates before anything is committed.

use std::collections::HashMap;

use crate::core::identity::{EntityKind, UserId};
use crate::core::store::ImportStore;
use crate::entities::RoleName;

use super::ImportError;

/// Where a known natural key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Already persisted before the batch started
    Store,
    /// Staged by an earlier row of this batch
    Row(usize),
}

/// Lookup tables for one import run
#[derive(Debug, Default)]
pub struct ReferenceCache {
    departments: HashMap<String, i64>,
    semesters: HashMap<String, i64>,
    subjects: HashMap<String, i64>,
    roles: HashMap<String, i64>,
    lecturers: HashMap<String, UserId>,
    keys: HashMap<String, KeyOrigin>,
    next_id: i64,
}

impl ReferenceCache {
    /// Prefetch what an import of `kind` needs
    pub fn build<S: ImportStore + ?Sized>(store: &S, kind: EntityKind) -> Result<Self, ImportError> {
        let mut cache = ReferenceCache::default();

        match kind {
            EntityKind::Subjects => {
                cache.departments = store.department_ids()?;
                let subjects = store.subject_ids()?;
                cache.keys = subjects.into_keys().map(|k| (k, KeyOrigin::Store)).collect();
                cache.next_id = store.next_subject_id()?;
            }
            EntityKind::Classes => {
                let roles = store.role_ids()?;
                let lecturer_role = roles.get(RoleName::Lecturer.as_str()).copied().ok_or_else(|| {
                    ImportError::Configuration("LECTURER role not found in database".to_string())
                })?;

                cache.semesters = store.semester_ids()?;
                cache.subjects = store.subject_ids()?;
                cache.lecturers = store.user_ids_with_role(lecturer_role)?;
                cache.keys = store
                    .class_codes()?
                    .into_iter()
                    .map(|k| (k, KeyOrigin::Store))
                    .collect();
                cache.next_id = store.next_class_id()?;
            }
            EntityKind::Users => {
                cache.roles = store.role_ids()?;
                if cache.roles.is_empty() {
                    return Err(ImportError::Configuration(
                        "no roles found in database".to_string(),
                    ));
                }
                cache.departments = store.department_ids()?;
                cache.keys = store
                    .user_emails()?
                    .into_iter()
                    .map(|k| (k, KeyOrigin::Store))
                    .collect();
            }
        }

        tracing::debug!(
            kind = %kind,
            existing_keys = cache.keys.len(),
            departments = cache.departments.len(),
            semesters = cache.semesters.len(),
            subjects = cache.subjects.len(),
            lecturers = cache.lecturers.len(),
            "reference cache built"
        );

        Ok(cache)
    }

    pub fn department(&self, name: &str) -> Option<i64> {
        self.departments.get(name).copied()
    }

    pub fn semester(&self, code: &str) -> Option<i64> {
        self.semesters.get(code).copied()
    }

    pub fn subject(&self, code: &str) -> Option<i64> {
        self.subjects.get(code).copied()
    }

    pub fn role(&self, name: &str) -> Option<i64> {
        self.roles.get(name).copied()
    }

    /// Users holding the LECTURER role, by email
    pub fn lecturer(&self, email: &str) -> Option<UserId> {
        self.lecturers.get(email).copied()
    }

    /// Whether a natural key is taken, and by whom
    pub fn key_origin(&self, key: &str) -> Option<KeyOrigin> {
        self.keys.get(key).copied()
    }

    /// Claim a natural key for a staged row
    pub fn record_key(&mut self, key: &str, row: usize) {
        self.keys.insert(key.to_string(), KeyOrigin::Row(row));
    }

    /// Reserve the next provisional numeric id
    pub fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::SqliteStore;

    #[test]
    fn test_class_cache_requires_lecturer_role() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = ReferenceCache::build(&store, EntityKind::Classes).unwrap_err();
        assert!(matches!(err, ImportError::Configuration(ref m) if m.contains("LECTURER")));
    }

    #[test]
    fn test_user_cache_requires_roles() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = ReferenceCache::build(&store, EntityKind::Users).unwrap_err();
        assert!(matches!(err, ImportError::Configuration(_)));
    }

    #[test]
    fn test_subject_cache_works_on_empty_store() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.add_department("Mathematics").unwrap();

        let mut cache = ReferenceCache::build(&store, EntityKind::Subjects).unwrap();
        assert!(cache.department("Mathematics").is_some());
        assert!(cache.department("mathematics").is_none());
        assert_eq!(cache.allocate_id(), 1);
        assert_eq!(cache.allocate_id(), 2);
    }

    #[test]
    fn test_recorded_keys_remember_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut cache = ReferenceCache::build(&store, EntityKind::Subjects).unwrap();

        assert_eq!(cache.key_origin("IT101"), None);
        cache.record_key("IT101", 4);
        assert_eq!(cache.key_origin("IT101"), Some(KeyOrigin::Row(4)));
    }
}
