//! Lookup loaders, the batch commit and import-log queries

use std::collections::{HashMap, HashSet};

use rusqlite::{params, OptionalExtension, Row};

use super::{
    now_timestamp, parse_datetime, ImportLogEntry, ImportLogSink, ImportStore, NewImportLog, SqliteStore,
    StoreError, UserSummary,
};
use crate::core::identity::UserId;
use crate::entities::{Department, NewEntity, RoleName, Semester};

impl SqliteStore {
    fn load_map<V>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        value: impl Fn(&Row<'_>) -> rusqlite::Result<V>,
    ) -> Result<HashMap<String, V>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| Ok((row.get::<_, String>(0)?, value(row)?)))?;

        let mut map = HashMap::new();
        for row in rows {
            let (key, val) = row?;
            map.insert(key, val);
        }
        Ok(map)
    }

    fn load_set(&self, sql: &str) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut set = HashSet::new();
        for row in rows {
            set.insert(row?);
        }
        Ok(set)
    }

    // =====================================================================
    // Seeding helpers
    // =====================================================================

    /// Insert the five catalog roles (no-op for the ones already present)
    pub fn seed_roles(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        for role in RoleName::all() {
            tx.execute(
                "INSERT OR IGNORE INTO roles (role_name) VALUES (?1)",
                params![role.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Add a department, returning its id
    pub fn add_department(&mut self, name: &str) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO departments (dept_name) VALUES (?1)",
            params![name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Add a semester, returning its id
    pub fn add_semester(&mut self, code: &str, name: &str) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO semesters (semester_code, semester_name) VALUES (?1, ?2)",
            params![code, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT dept_id, dept_name FROM departments ORDER BY dept_name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                dept_id: row.get(0)?,
                dept_name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_semesters(&self) -> Result<Vec<Semester>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT semester_id, semester_code, semester_name FROM semesters ORDER BY semester_code",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Semester {
                semester_id: row.get(0)?,
                semester_code: row.get(1)?,
                semester_name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Look up an account by exact email
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserSummary>, StoreError> {
        let found = self
            .conn
            .query_row(
                r#"SELECT u.user_id, u.email, u.full_name, r.role_name, u.dept_id, u.is_active
                   FROM users u
                   JOIN roles r ON r.role_id = u.role_id
                   WHERE u.email = ?1"#,
                params![email],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                        row.get::<_, bool>(5)?,
                    ))
                },
            )
            .optional()?;

        found
            .map(|(id, email, full_name, role_name, dept_id, is_active)| {
                Ok(UserSummary {
                    user_id: parse_user_id(&id)?,
                    email,
                    full_name,
                    role_name,
                    dept_id,
                    is_active,
                })
            })
            .transpose()
    }

    // =====================================================================
    // Import logs
    // =====================================================================

    /// Logs written by one operator, newest first
    pub fn list_import_logs(&self, user: &UserId) -> Result<Vec<ImportLogEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT log_id, user_id, import_type, total_rows, successful, failed, skipped,
                      details, imported_ids, source_file, file_hash, created_at
               FROM import_logs
               WHERE user_id = ?1
               ORDER BY created_at DESC, log_id DESC"#,
        )?;
        let rows = stmt.query_map(params![user.to_string()], read_log_row)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(finish_log_row(row?)?);
        }
        Ok(logs)
    }

    pub fn get_import_log(&self, log_id: i64) -> Result<Option<ImportLogEntry>, StoreError> {
        let row = self
            .conn
            .query_row(
                r#"SELECT log_id, user_id, import_type, total_rows, successful, failed, skipped,
                          details, imported_ids, source_file, file_hash, created_at
                   FROM import_logs WHERE log_id = ?1"#,
                params![log_id],
                read_log_row,
            )
            .optional()?;

        row.map(finish_log_row).transpose()
    }

    /// Delete a log; only its owner may do so
    pub fn delete_import_log(&mut self, log_id: i64, user: &UserId) -> Result<(), StoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM import_logs WHERE log_id = ?1 AND user_id = ?2",
            params![log_id, user.to_string()],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("import log {}", log_id)));
        }
        Ok(())
    }
}

/// Raw log row, JSON columns still as text
type LogRow = (ImportLogEntry, String, String, String);

fn read_log_row(row: &Row<'_>) -> rusqlite::Result<LogRow> {
    Ok((
        ImportLogEntry {
            log_id: row.get(0)?,
            user_id: row.get(1)?,
            import_type: row.get(2)?,
            total_rows: row.get(3)?,
            successful: row.get(4)?,
            failed: row.get(5)?,
            skipped: row.get(6)?,
            details: serde_json::Value::Null,
            imported_ids: serde_json::Value::Null,
            source_file: row.get(9)?,
            file_hash: row.get(10)?,
            created_at: Default::default(),
        },
        row.get(7)?,
        row.get(8)?,
        row.get(11)?,
    ))
}

fn finish_log_row((mut entry, details, ids, created): LogRow) -> Result<ImportLogEntry, StoreError> {
    entry.details = serde_json::from_str(&details)?;
    entry.imported_ids = serde_json::from_str(&ids)?;
    entry.created_at = parse_datetime(&created)?;
    Ok(entry)
}

fn parse_user_id(s: &str) -> Result<UserId, StoreError> {
    UserId::parse(s).map_err(|e| StoreError::InvalidData(e.to_string()))
}

impl ImportStore for SqliteStore {
    fn department_ids(&self) -> Result<HashMap<String, i64>, StoreError> {
        self.load_map("SELECT dept_name, dept_id FROM departments", [], |row| row.get(1))
    }

    fn semester_ids(&self) -> Result<HashMap<String, i64>, StoreError> {
        self.load_map(
            "SELECT semester_code, semester_id FROM semesters",
            [],
            |row| row.get(1),
        )
    }

    fn subject_ids(&self) -> Result<HashMap<String, i64>, StoreError> {
        self.load_map("SELECT subject_code, subject_id FROM subjects", [], |row| row.get(1))
    }

    fn class_codes(&self) -> Result<HashSet<String>, StoreError> {
        self.load_set("SELECT class_code FROM academic_classes")
    }

    fn role_ids(&self) -> Result<HashMap<String, i64>, StoreError> {
        self.load_map("SELECT role_name, role_id FROM roles", [], |row| row.get(1))
    }

    fn user_ids_with_role(&self, role_id: i64) -> Result<HashMap<String, UserId>, StoreError> {
        let raw = self.load_map(
            "SELECT email, user_id FROM users WHERE role_id = ?1",
            params![role_id],
            |row| row.get::<_, String>(1),
        )?;

        raw.into_iter()
            .map(|(email, id)| Ok((email, parse_user_id(&id)?)))
            .collect()
    }

    fn user_emails(&self) -> Result<HashSet<String>, StoreError> {
        self.load_set("SELECT email FROM users")
    }

    fn next_subject_id(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(MAX(subject_id), 0) + 1 FROM subjects",
            [],
            |row| row.get(0),
        )?)
    }

    fn next_class_id(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(MAX(class_id), 0) + 1 FROM academic_classes",
            [],
            |row| row.get(0),
        )?)
    }

    fn commit(&mut self, staged: &[NewEntity]) -> Result<usize, StoreError> {
        let now = now_timestamp();
        // Rolls back on drop unless committed
        let tx = self.conn.transaction()?;

        for entity in staged {
            match entity {
                NewEntity::Subject(s) => {
                    tx.execute(
                        r#"INSERT INTO subjects (subject_id, subject_code, subject_name, credits, dept_id, created_at)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                        params![s.subject_id, s.subject_code, s.subject_name, s.credits, s.dept_id, now],
                    )?;
                }
                NewEntity::Class(c) => {
                    tx.execute(
                        r#"INSERT INTO academic_classes (class_id, class_code, semester_id, subject_id, lecturer_id, created_at)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                        params![
                            c.class_id,
                            c.class_code,
                            c.semester_id,
                            c.subject_id,
                            c.lecturer_id.to_string(),
                            now
                        ],
                    )?;
                }
                NewEntity::User(u) => {
                    tx.execute(
                        r#"INSERT INTO users (user_id, email, full_name, password_hash, role_id, dept_id, phone, is_active, created_at)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                        params![
                            u.user_id.to_string(),
                            u.email,
                            u.full_name,
                            u.password_hash,
                            u.role_id,
                            u.dept_id,
                            u.phone,
                            u.is_active,
                            now
                        ],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(staged.len())
    }
}

impl ImportLogSink for SqliteStore {
    fn record_import_log(&mut self, log: &NewImportLog) -> Result<i64, StoreError> {
        let details = serde_json::to_string(&log.details)?;
        let imported_ids = serde_json::to_string(&log.imported_ids)?;

        self.conn.execute(
            r#"INSERT INTO import_logs (user_id, import_type, total_rows, successful, failed, skipped,
                                        details, imported_ids, source_file, file_hash, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                log.user_id.to_string(),
                log.import_type.as_str(),
                log.total_rows as i64,
                log.successful as i64,
                log.failed as i64,
                log.skipped as i64,
                details,
                imported_ids,
                log.source_file,
                log.file_hash,
                now_timestamp(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}
