//! Command implementations

pub mod import;
pub mod init;
pub mod logs;
pub mod reference;
pub mod template;
