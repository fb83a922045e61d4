//! Database schema initialization

use rusqlite::params;

use super::{SqliteStore, StoreError, SCHEMA_VERSION};

impl SqliteStore {
    /// Create tables on first open, refuse stores written by another schema version
    pub(super) fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);",
        )?;

        let found: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

        match found {
            None => self.init_schema(),
            Some(v) if v == SCHEMA_VERSION => Ok(()),
            Some(v) => Err(StoreError::SchemaVersion {
                found: v,
                expected: SCHEMA_VERSION,
            }),
        }
    }

    fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS departments (
                dept_id INTEGER PRIMARY KEY,
                dept_name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS semesters (
                semester_id INTEGER PRIMARY KEY,
                semester_code TEXT NOT NULL UNIQUE,
                semester_name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS roles (
                role_id INTEGER PRIMARY KEY,
                role_name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS subjects (
                subject_id INTEGER PRIMARY KEY,
                subject_code TEXT NOT NULL UNIQUE,
                subject_name TEXT NOT NULL,
                credits INTEGER NOT NULL CHECK (credits BETWEEN 1 AND 10),
                dept_id INTEGER NOT NULL REFERENCES departments(dept_id),
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_subjects_dept ON subjects(dept_id);

            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role_id INTEGER NOT NULL REFERENCES roles(role_id),
                dept_id INTEGER REFERENCES departments(dept_id),
                phone TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_role ON users(role_id);

            CREATE TABLE IF NOT EXISTS academic_classes (
                class_id INTEGER PRIMARY KEY,
                class_code TEXT NOT NULL UNIQUE,
                semester_id INTEGER NOT NULL REFERENCES semesters(semester_id),
                subject_id INTEGER NOT NULL REFERENCES subjects(subject_id),
                lecturer_id TEXT NOT NULL REFERENCES users(user_id),
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS import_logs (
                log_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                import_type TEXT NOT NULL,
                total_rows INTEGER NOT NULL,
                successful INTEGER NOT NULL,
                failed INTEGER NOT NULL,
                skipped INTEGER NOT NULL,
                details TEXT NOT NULL,
                imported_ids TEXT NOT NULL,
                source_file TEXT,
                file_hash TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_import_logs_user ON import_logs(user_id, created_at);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
