//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Import configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Email of the account that runs imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Path to the SQLite store (relative paths resolve against the workspace root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Whether committed batches write an import log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_logs: Option<bool>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration for a known workspace (or none), merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/csimport/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Workspace config (.csimport/config.yaml)
        if let Some(project) = project {
            if let Some(local) = Self::read_file(&project.workspace_dir().join("config.yaml")) {
                config.merge(local);
            }
        }

        // 3. Environment variables
        if let Ok(operator) = std::env::var("CSIMPORT_OPERATOR") {
            config.operator = Some(operator);
        }
        if let Ok(database) = std::env::var("CSIMPORT_DB") {
            config.database = Some(database);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(parsed) => Some(parsed.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "csimport")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.operator.is_some() {
            self.operator = other.operator;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.record_logs.is_some() {
            self.record_logs = other.record_logs;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the configured operator email, if any
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Whether import logs are written (defaults to true)
    pub fn record_logs(&self) -> bool {
        self.record_logs.unwrap_or(true)
    }

    /// Resolve the store path for a workspace
    pub fn database_path(&self, project: &Project) -> PathBuf {
        match self.database.as_deref() {
            Some(db) if Path::new(db).is_absolute() => PathBuf::from(db),
            Some(db) => project.root().join(db),
            None => project.default_database(),
        }
    }

    /// Persist the operator into the workspace config file
    pub fn save_operator(project: &Project, email: &str) -> std::io::Result<()> {
        let path = project.workspace_dir().join("config.yaml");
        let mut local = Self::read_file(&path).unwrap_or_default();
        local.operator = Some(email.to_string());

        let yaml = serde_yml::to_string(&local)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, format!("# CollabSphere import workspace configuration\n{}", yaml))
    }
}
