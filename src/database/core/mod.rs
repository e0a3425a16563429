//! Core database infrastructure
//!
//! This module provides the foundational database components used by the repositories:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `ScriptShape`: Statement-level summary of a SQL script
//! - `SchemaManager`: Schema initialization and version checks
//! - `SchemaStatus`: Schema state enumeration

mod connection;
mod schema;

pub use connection::{DatabaseConn, ScriptShape};
pub use schema::{SchemaDefinitions, SchemaManager, SchemaStatus, QA_TABLES, SCHEMA_VERSION};
