//! csimport: CollabSphere bulk import engine
//!
//! Loads administrator-supplied spreadsheets (subjects, academic classes,
//! user accounts) into the relational store, one entity type per batch, with
//! a per-row audit trail and a single transactional commit.

pub mod cli;
pub mod core;
pub mod entities;
pub mod import;
