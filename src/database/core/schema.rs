//! Database schema management
//!
//! The data-access layer assumes the five Q&A tables already exist. This
//! module creates them when a fresh database (or an in-memory test store)
//! is opened, and tracks the schema version in `qadb_meta`.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::info;

/// Current schema version
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

/// Tables every initialized database must contain
pub const QA_TABLES: &[&str] = &[
    "users",
    "questions",
    "replies",
    "question_follows",
    "question_likes",
];

/// Schema definitions for all tables in the Q&A database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// SQL for creating the meta table (tracks schema version)
    pub const META_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS qadb_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
    "#;

    pub const USERS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            fname TEXT NOT NULL,
            lname TEXT NOT NULL
        );
    "#;

    pub const QUESTIONS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            author_id INTEGER NOT NULL
        );
    "#;

    pub const REPLIES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS replies (
            id INTEGER PRIMARY KEY,
            question_id INTEGER NOT NULL,
            parent_reply_id INTEGER,
            author_id INTEGER NOT NULL,
            body TEXT NOT NULL
        );
    "#;

    pub const QUESTION_FOLLOWS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS question_follows (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            question_id INTEGER NOT NULL
        );
    "#;

    pub const QUESTION_LIKES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS question_likes (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            question_id INTEGER NOT NULL
        );
    "#;

    /// Indexes on every foreign-key column
    pub const INDEXES: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_users_name ON users(fname, lname)",
        "CREATE INDEX IF NOT EXISTS idx_questions_author ON questions(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_replies_question ON replies(question_id)",
        "CREATE INDEX IF NOT EXISTS idx_replies_parent ON replies(parent_reply_id)",
        "CREATE INDEX IF NOT EXISTS idx_replies_author ON replies(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_question_follows_user ON question_follows(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_question_follows_question ON question_follows(question_id)",
        "CREATE INDEX IF NOT EXISTS idx_question_likes_user ON question_likes(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_question_likes_question ON question_likes(question_id)",
    ];

    /// Table DDL paired with the table name, in creation order
    pub fn tables() -> [(&'static str, &'static str); 5] {
        [
            ("users", Self::USERS_TABLE),
            ("questions", Self::QUESTIONS_TABLE),
            ("replies", Self::REPLIES_TABLE),
            ("question_follows", Self::QUESTION_FOLLOWS_TABLE),
            ("question_likes", Self::QUESTION_LIKES_TABLE),
        ]
    }
}

/// Schema manager for the Q&A database
///
/// Handles schema initialization and version checking.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Initialize the database schema
    ///
    /// Creates all tables and indexes if they don't exist and records the
    /// schema version. Existing rows are left untouched.
    pub fn initialize(&self) -> Result<()> {
        self.conn
            .execute(SchemaDefinitions::META_TABLE, [])
            .map_err(|e| anyhow!("Failed to create meta table: {}", e))?;

        self.set_meta("schema_version", &SCHEMA_VERSION.to_string())?;

        for (name, sql) in SchemaDefinitions::tables() {
            self.conn
                .execute(sql, [])
                .map_err(|e| anyhow!("Failed to create {} table: {}", name, e))?;
        }

        for index_sql in SchemaDefinitions::INDEXES {
            self.conn
                .execute(index_sql, [])
                .map_err(|e| anyhow!("Failed to create index: {}", e))?;
        }

        info!("Q&A schema v{} initialized", SCHEMA_VERSION);
        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        if !self.table_exists("qadb_meta")? {
            // A database seeded externally (e.g. from an import script) has
            // the Q&A tables but no meta table.
            if self.verify_integrity()? {
                return Ok(SchemaStatus::Unversioned);
            }
            return Ok(SchemaStatus::NotInitialized);
        }

        let current_version = self.get_schema_version()?;

        if current_version == SCHEMA_VERSION {
            if self.verify_integrity()? {
                Ok(SchemaStatus::Current)
            } else {
                Ok(SchemaStatus::Corrupted)
            }
        } else if current_version < SCHEMA_VERSION {
            Ok(SchemaStatus::NeedsMigration {
                from: current_version,
                to: SCHEMA_VERSION,
            })
        } else {
            Ok(SchemaStatus::Incompatible {
                database_version: current_version,
                required_version: SCHEMA_VERSION,
            })
        }
    }

    fn get_schema_version(&self) -> Result<u32> {
        let version = self.get_meta("schema_version")?.unwrap_or_else(|| "0".to_string());

        version
            .parse()
            .map_err(|e| anyhow!("Invalid schema version: {}", e))
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let exists: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(exists > 0)
    }

    /// Verify schema integrity by checking the Q&A tables exist
    fn verify_integrity(&self) -> Result<bool> {
        for table in QA_TABLES {
            if !self.table_exists(table)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO qadb_meta (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))",
                [key, value],
            )
            .map_err(|e| anyhow!("Failed to set meta value: {}", e))?;
        Ok(())
    }

    /// Get a metadata value
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let result: Result<String, _> = self.conn.query_row(
            "SELECT value FROM qadb_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get meta value: {}", e)),
        }
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Q&A tables exist but were created outside of qadb (no meta table)
    Unversioned,

    /// Schema is current and valid
    Current,

    /// Schema was written by an older version
    NeedsMigration { from: u32, to: u32 },

    /// Database is from a newer version (incompatible)
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// Schema is corrupted (missing tables)
    Corrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_not_initialized() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = SchemaManager::new(&conn);

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }

    #[test]
    fn test_schema_initialize() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
        assert_eq!(manager.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_initialize_keeps_rows() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = SchemaManager::new(&conn);
        manager.initialize().unwrap();
        conn.execute(
            "INSERT INTO users (id, fname, lname) VALUES (1, 'Ada', 'Lovelace')",
            [],
        )
        .unwrap();

        manager.initialize().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unversioned_schema() {
        let conn = Connection::open_in_memory().unwrap();
        for (_, sql) in SchemaDefinitions::tables() {
            conn.execute(sql, []).unwrap();
        }
        let manager = SchemaManager::new(&conn);

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Unversioned);
    }

    #[test]
    fn test_corrupted_schema() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = SchemaManager::new(&conn);
        manager.initialize().unwrap();
        conn.execute("DROP TABLE replies", []).unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Corrupted);
    }

    #[test]
    fn test_newer_schema_is_incompatible() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = SchemaManager::new(&conn);
        manager.initialize().unwrap();
        manager
            .set_meta("schema_version", &(SCHEMA_VERSION + 1).to_string())
            .unwrap();

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::Incompatible {
                database_version: SCHEMA_VERSION + 1,
                required_version: SCHEMA_VERSION,
            }
        );
    }

    #[test]
    fn test_meta_operations() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        manager.set_meta("test_key", "test_value").unwrap();
        let value = manager.get_meta("test_key").unwrap();
        assert_eq!(value, Some("test_value".to_string()));

        let missing = manager.get_meta("nonexistent").unwrap();
        assert_eq!(missing, None);
    }
}
