//! Database connection management
//!
//! This module provides the single SQLite connection handle that every
//! repository borrows.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::debug;

/// Core database connection wrapper
///
/// `DatabaseConn` owns one SQLite connection, either file-backed or
/// in-memory, configured the same way in both cases. Repositories never
/// open their own connections; they borrow `conn` from here.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| anyhow!("Failed to open database at '{}': {}", p, e))?,
            None => Connection::open_in_memory()
                .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?,
        };

        let db = DatabaseConn { conn };
        db.configure(path.is_some())?;
        debug!("opened database {}", path.unwrap_or(":memory:"));
        Ok(db)
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    fn configure(&self, file_backed: bool) -> Result<()> {
        if file_backed {
            let _: String = self
                .conn
                .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
                .map_err(|e| anyhow!("Failed to set journal mode: {}", e))?;
        }

        self.conn
            .execute("PRAGMA temp_store=MEMORY", [])
            .map_err(|e| anyhow!("Failed to set temp store: {}", e))?;

        self.conn
            .execute("PRAGMA foreign_keys=ON", [])
            .map_err(|e| anyhow!("Failed to enable foreign keys: {}", e))?;

        Ok(())
    }

    /// Run a SQL script as one unit
    ///
    /// Scripts without transaction statements are wrapped in a transaction.
    /// Scripts that open their own (e.g. `sqlite3 .dump` output) run as
    /// written; if one fails or leaves its transaction open, that
    /// transaction is rolled back.
    pub fn run_script(&self, sql: &str) -> Result<()> {
        if !ScriptShape::of(sql).manages_transaction {
            let tx = self
                .conn
                .unchecked_transaction()
                .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;
            tx.execute_batch(sql)
                .map_err(|e| anyhow!("Failed to execute SQL script: {}", e))?;
            return tx
                .commit()
                .map_err(|e| anyhow!("Failed to commit SQL script: {}", e));
        }

        let result = self.conn.execute_batch(sql);
        if !self.conn.is_autocommit() {
            self.conn
                .execute_batch("ROLLBACK")
                .map_err(|e| anyhow!("Failed to roll back SQL script: {}", e))?;
            result.map_err(|e| anyhow!("Failed to execute SQL script: {}", e))?;
            return Err(anyhow!("SQL script left its transaction open, rolled back"));
        }
        result.map_err(|e| anyhow!("Failed to execute SQL script: {}", e))
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }
}

/// What a SQL script does, judged by the leading keywords of its statements
///
/// Statements are split on `;` after dropping `--` comments, which is
/// enough for fixtures and dumps but not a SQL parser.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptShape {
    /// Contains `BEGIN`, `COMMIT`, `END` or `ROLLBACK` statements
    pub manages_transaction: bool,
    /// Contains `CREATE TABLE` statements
    pub creates_tables: bool,
}

impl ScriptShape {
    pub fn of(sql: &str) -> Self {
        let stripped: String = sql
            .lines()
            .map(|line| line.split("--").next().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n");

        let mut shape = ScriptShape::default();
        let mut in_trigger = false;
        for statement in stripped.split(';') {
            let words: Vec<String> = statement
                .split_whitespace()
                .take(4)
                .map(|w| w.to_ascii_uppercase())
                .collect();
            let Some(first) = words.first() else {
                continue;
            };
            match first.as_str() {
                // trigger bodies hold their own `BEGIN ... END;`
                "CREATE" if words.iter().any(|w| w == "TRIGGER") => in_trigger = true,
                "END" if in_trigger => in_trigger = false,
                "CREATE" if words.iter().any(|w| w == "TABLE") => shape.creates_tables = true,
                "BEGIN" | "COMMIT" | "END" | "ROLLBACK" if !in_trigger => {
                    shape.manages_transaction = true
                }
                _ => {}
            }
        }
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_run_script_commits() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.run_script(
            "CREATE TABLE t (id INTEGER PRIMARY KEY);
             INSERT INTO t (id) VALUES (1), (2);",
        )
        .unwrap();
        assert_eq!(db.table_count("t").unwrap(), 2);
    }

    #[test]
    fn test_run_script_with_own_transaction() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.run_script(
            "PRAGMA foreign_keys=OFF;
             BEGIN TRANSACTION;
             CREATE TABLE t (id INTEGER PRIMARY KEY);
             INSERT INTO t VALUES(1);
             COMMIT;",
        )
        .unwrap();
        assert_eq!(db.table_count("t").unwrap(), 1);
        assert!(db.conn.is_autocommit());
    }

    #[test]
    fn test_failed_script_with_own_transaction_rolls_back() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.run_script("CREATE TABLE t (id INTEGER PRIMARY KEY);")
            .unwrap();

        let result = db.run_script(
            "BEGIN TRANSACTION;
             INSERT INTO t VALUES(1);
             INSERT INTO missing VALUES(2);
             COMMIT;",
        );
        assert!(result.is_err());
        assert!(db.conn.is_autocommit());
        assert_eq!(db.table_count("t").unwrap(), 0);
    }

    #[test]
    fn test_unterminated_transaction_is_rolled_back() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.run_script("CREATE TABLE t (id INTEGER PRIMARY KEY);")
            .unwrap();

        assert!(db.run_script("BEGIN; INSERT INTO t VALUES(1);").is_err());
        assert!(db.conn.is_autocommit());
        assert_eq!(db.table_count("t").unwrap(), 0);
    }

    #[test]
    fn test_script_shape() {
        let dump = "PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\nCREATE TABLE users (id INTEGER PRIMARY KEY);\nCOMMIT;";
        assert_eq!(
            ScriptShape::of(dump),
            ScriptShape {
                manages_transaction: true,
                creates_tables: true
            }
        );

        let inserts = "-- BEGIN here is only a comment\nINSERT INTO users VALUES (1, 'Ada', 'Lovelace');";
        assert_eq!(ScriptShape::of(inserts), ScriptShape::default());

        let trigger = "CREATE TRIGGER t AFTER INSERT ON users BEGIN SELECT 1; END;";
        assert!(!ScriptShape::of(trigger).manages_transaction);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conn.sqlite3");
        let db = DatabaseConn::open_path(path.to_str().unwrap()).unwrap();
        db.run_script("CREATE TABLE t (id INTEGER PRIMARY KEY);")
            .unwrap();
        assert!(path.exists());
    }
}
