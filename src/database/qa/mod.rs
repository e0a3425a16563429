//! Q&A database storage
//!
//! Read-only repositories over the five Q&A tables:
//! - `users`
//! - `questions`
//! - `replies` (self-referential reply tree)
//! - `question_follows` (user ↔ question)
//! - `question_likes` (user ↔ question)

mod question_follows;
mod question_likes;
mod questions;
mod replies;
mod users;

pub use question_follows::{QuestionFollow, QuestionFollowRepository};
pub use question_likes::{QuestionLike, QuestionLikeRepository};
pub use questions::{Question, QuestionRank, QuestionRepository};
#[cfg(feature = "display")]
pub use replies::ReplyRow;
pub use replies::{Reply, ReplyRepository};
pub use users::{User, UserRepository};

use crate::database::core::{DatabaseConn, SchemaManager, SchemaStatus, ScriptShape, QA_TABLES};
use anyhow::{anyhow, Result};
use rusqlite::{Connection, OptionalExtension, Params, Row};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Default database file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "qadb.sqlite3";

/// Main Q&A database handle (SQLite backend)
///
/// `QaDatabase` owns the single connection every repository borrows. It
/// handles schema initialization on open and hands out repositories.
pub struct QaDatabase {
    db: DatabaseConn,
}

impl QaDatabase {
    /// Open the Q&A database at the specified path
    ///
    /// A fresh file gets the Q&A schema. Databases created outside qadb
    /// are used as-is. A database written by a newer schema version is
    /// rejected rather than reset, since it holds the only copy of the data.
    pub fn open(path: &str) -> Result<Self> {
        let db = DatabaseConn::open_path(path)?;
        Self::prepare_schema(&db)?;
        Ok(Self { db })
    }

    /// Open the Q&A database from a data directory
    ///
    /// Uses the standard database file path: `{data_dir}/qadb.sqlite3`
    pub fn open_in_dir(data_dir: &str) -> Result<Self> {
        let path = format!("{}/{}", data_dir.trim_end_matches('/'), DEFAULT_DB_FILE);
        Self::open(&path)
    }

    /// Create an in-memory Q&A database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let db = DatabaseConn::open_in_memory()?;
        SchemaManager::new(&db.conn).initialize()?;
        Ok(Self { db })
    }

    fn prepare_schema(db: &DatabaseConn) -> Result<()> {
        let schema = SchemaManager::new(&db.conn);

        match schema.check_status()? {
            SchemaStatus::Current => {
                debug!("Q&A database schema is current");
            }
            SchemaStatus::Unversioned => {
                info!("Q&A tables found without version metadata, using as-is");
            }
            SchemaStatus::NotInitialized => {
                info!("Initializing Q&A database schema");
                schema.initialize()?;
            }
            SchemaStatus::NeedsMigration { from, to } => {
                // Table creation is idempotent; existing rows are kept.
                info!("Upgrading Q&A database schema from v{} to v{}", from, to);
                schema.initialize()?;
            }
            SchemaStatus::Corrupted => {
                info!("Q&A database is missing tables, recreating them");
                schema.initialize()?;
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => {
                return Err(anyhow!(
                    "Database schema v{} is newer than supported v{}",
                    database_version,
                    required_version
                ));
            }
        }
        Ok(())
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.db.conn)
    }

    pub fn questions(&self) -> QuestionRepository<'_> {
        QuestionRepository::new(&self.db.conn)
    }

    pub fn replies(&self) -> ReplyRepository<'_> {
        ReplyRepository::new(&self.db.conn)
    }

    pub fn follows(&self) -> QuestionFollowRepository<'_> {
        QuestionFollowRepository::new(&self.db.conn)
    }

    pub fn likes(&self) -> QuestionLikeRepository<'_> {
        QuestionLikeRepository::new(&self.db.conn)
    }

    /// Get the underlying database connection
    ///
    /// Relationship accessors on records (e.g. [`User::authored_questions`])
    /// take this connection.
    pub fn connection(&self) -> &Connection {
        &self.db.conn
    }

    /// Open the database at `path` and load a SQL script into it
    ///
    /// A script that creates tables (a schema-bearing seed or a
    /// `sqlite3 .dump`) runs before the schema check, so its own `CREATE
    /// TABLE` statements build the tables. An INSERT-only fixture runs after
    /// the Q&A schema is in place.
    pub fn open_with_script<P: AsRef<Path>>(path: &str, script: P) -> Result<Self> {
        let sql = read_script(script.as_ref())?;
        let db = Self::load_script(DatabaseConn::open_path(path)?, &sql)?;
        info!("Imported SQL file {}", script.as_ref().display());
        Ok(db)
    }

    /// Create an in-memory database loaded from a SQL script
    ///
    /// Same ordering rules as [`QaDatabase::open_with_script`].
    pub fn open_in_memory_with_sql(sql: &str) -> Result<Self> {
        Self::load_script(DatabaseConn::open_in_memory()?, sql)
    }

    fn load_script(db: DatabaseConn, sql: &str) -> Result<Self> {
        if ScriptShape::of(sql).creates_tables {
            db.run_script(sql)
                .map_err(|e| anyhow!("Failed to import SQL: {}", e))?;
            Self::prepare_schema(&db)?;
        } else {
            Self::prepare_schema(&db)?;
            db.run_script(sql)
                .map_err(|e| anyhow!("Failed to import SQL: {}", e))?;
        }
        Ok(Self { db })
    }

    /// Load rows from a SQL script file into this database
    ///
    /// The script runs as one unit; on failure nothing is kept. The Q&A
    /// tables already exist here, so plain `CREATE TABLE` statements for
    /// them fail; use [`QaDatabase::open_with_script`] for scripts that
    /// carry their own schema.
    pub fn import_sql_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.import_sql(&read_script(path)?)?;
        info!("Imported SQL file {}", path.display());
        Ok(())
    }

    /// Load rows from a SQL script string
    ///
    /// Scripts with their own `BEGIN ... COMMIT` run as written.
    pub fn import_sql(&self, sql: &str) -> Result<()> {
        self.db
            .run_script(sql)
            .map_err(|e| anyhow!("Failed to import SQL: {}", e))
    }

    /// Row counts for each Q&A table
    pub fn table_counts(&self) -> Result<Vec<TableCount>> {
        QA_TABLES
            .iter()
            .map(|table| -> Result<TableCount> {
                Ok(TableCount {
                    table: table.to_string(),
                    rows: self.db.table_count(table)?,
                })
            })
            .collect()
    }

    /// Current schema status
    pub fn schema_status(&self) -> Result<SchemaStatus> {
        SchemaManager::new(&self.db.conn).check_status()
    }
}

/// Number of rows in one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

fn read_script(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read SQL file {}: {}", path.display(), e))
}

/// Run a multi-row query and decode every row; an empty result is `Ok(vec![])`
pub(crate) fn query_records<T, P, F>(
    conn: &Connection,
    what: &str,
    sql: &str,
    params: P,
    decode: F,
) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    debug!("querying {}", what);
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| anyhow!("Failed to prepare {} query: {}", what, e))?;
    let rows = stmt
        .query_map(params, decode)
        .map_err(|e| anyhow!("Failed to query {}: {}", what, e))?;
    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(|e| anyhow!("Failed to read {} rows: {}", what, e))
}

/// Run a single-row query; zero matching rows is `Ok(None)`, not an error
pub(crate) fn query_optional<T, P, F>(
    conn: &Connection,
    what: &str,
    sql: &str,
    params: P,
    decode: F,
) -> Result<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    debug!("querying {}", what);
    conn.query_row(sql, params, decode)
        .optional()
        .map_err(|e| anyhow!("Failed to query {}: {}", what, e))
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::seeded_db;

    #[test]
    fn test_open_in_memory() {
        let db = QaDatabase::open_in_memory().unwrap();
        assert_eq!(db.schema_status().unwrap(), SchemaStatus::Current);
        assert!(db.users().all().unwrap().is_empty());
    }

    #[test]
    fn test_table_counts_match_all() {
        let db = seeded_db();
        let counts = db.table_counts().unwrap();
        let rows = |name: &str| {
            counts
                .iter()
                .find(|c| c.table == name)
                .map(|c| c.rows as usize)
                .unwrap()
        };

        assert_eq!(rows("users"), db.users().all().unwrap().len());
        assert_eq!(rows("questions"), db.questions().all().unwrap().len());
        assert_eq!(rows("replies"), db.replies().all().unwrap().len());
        assert_eq!(rows("question_follows"), db.follows().all().unwrap().len());
        assert_eq!(rows("question_likes"), db.likes().all().unwrap().len());
    }

    #[test]
    fn test_import_is_atomic() {
        let db = QaDatabase::open_in_memory().unwrap();
        let result = db.import_sql(
            "INSERT INTO users (id, fname, lname) VALUES (1, 'Ada', 'Lovelace');
             INSERT INTO no_such_table VALUES (1);",
        );
        assert!(result.is_err());
        assert!(db.users().all().unwrap().is_empty());
    }

    #[test]
    fn test_import_dump_with_own_transaction() {
        let db = QaDatabase::open_in_memory().unwrap();
        db.import_sql(
            "PRAGMA foreign_keys=OFF;
             BEGIN TRANSACTION;
             INSERT INTO users VALUES(1,'Ada','Lovelace');
             INSERT INTO users VALUES(2,'Alan','Turing');
             COMMIT;",
        )
        .unwrap();
        assert_eq!(db.users().all().unwrap().len(), 2);
    }

    #[test]
    fn test_open_with_dump_builds_its_own_tables() {
        let dump = "PRAGMA foreign_keys=OFF;
BEGIN TRANSACTION;
CREATE TABLE users (id INTEGER PRIMARY KEY, fname TEXT NOT NULL, lname TEXT NOT NULL);
INSERT INTO users VALUES(1,'Ada','Lovelace');
CREATE TABLE questions (id INTEGER PRIMARY KEY, title TEXT NOT NULL, body TEXT NOT NULL, author_id INTEGER NOT NULL);
INSERT INTO questions VALUES(1,'Engines','Can an engine compose music?',1);
CREATE TABLE replies (id INTEGER PRIMARY KEY, question_id INTEGER NOT NULL, parent_reply_id INTEGER, author_id INTEGER NOT NULL, body TEXT NOT NULL);
CREATE TABLE question_follows (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, question_id INTEGER NOT NULL);
CREATE TABLE question_likes (user_id INTEGER NOT NULL, question_id INTEGER NOT NULL);
INSERT INTO question_likes VALUES(1,1);
COMMIT;";
        let db = QaDatabase::open_in_memory_with_sql(dump).unwrap();
        assert_eq!(db.schema_status().unwrap(), SchemaStatus::Unversioned);
        assert_eq!(db.questions().all().unwrap().len(), 1);
        assert_eq!(db.likes().likers_for_question_id(1).unwrap(), vec!["Ada"]);
    }

    #[test]
    fn test_open_with_ddl_seed_script() {
        let seed = "CREATE TABLE users (id INTEGER PRIMARY KEY, fname TEXT NOT NULL, lname TEXT NOT NULL);
                    INSERT INTO users (id, fname, lname) VALUES (1, 'Ada', 'Lovelace');";

        // plain CREATE TABLE collides with the tables of an open database
        assert!(QaDatabase::open_in_memory().unwrap().import_sql(seed).is_err());

        let db = QaDatabase::open_in_memory_with_sql(seed).unwrap();
        assert_eq!(db.users().find_by_id(1).unwrap().unwrap().fname, "Ada");
        // tables the script left out are created afterwards
        assert!(db.questions().all().unwrap().is_empty());
        assert_eq!(db.schema_status().unwrap(), SchemaStatus::Current);
    }

    #[test]
    fn test_open_with_insert_only_script() {
        let db = QaDatabase::open_in_memory_with_sql(test_support::SEED_SQL).unwrap();
        assert_eq!(db.schema_status().unwrap(), SchemaStatus::Current);
        assert_eq!(db.users().all().unwrap().len(), 4);
    }

    #[test]
    fn test_query_error_propagates() {
        let db = QaDatabase::open_in_memory().unwrap();
        db.connection().execute("DROP TABLE users", []).unwrap();
        assert!(db.users().find_by_id(1).is_err());
        assert!(db.users().all().is_err());
    }

    #[test]
    fn test_open_file_reopens_with_data() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        {
            let db = QaDatabase::open_in_dir(dir_str).unwrap();
            db.import_sql(test_support::SEED_SQL).unwrap();
        }
        let db = QaDatabase::open_in_dir(dir_str).unwrap();
        assert_eq!(db.users().all().unwrap().len(), 4);
        assert!(dir.path().join(DEFAULT_DB_FILE).exists());
    }
}
