//! Core module - identity, configuration, workspace and store

pub mod config;
pub mod identity;
pub mod password;
pub mod project;
pub mod store;

pub use config::Config;
pub use identity::{CreatedId, EntityKind, IdParseError, UserId};
pub use password::PasswordError;
pub use project::{Project, ProjectError};
pub use store::{ImportLogSink, ImportStore, SqliteStore, StoreError};
