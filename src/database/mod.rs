//! Database module
//!
//! This module provides all database functionality for qadb, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connection, schema management)
//! - **qa**: Repositories for users, questions, replies, follows and likes
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/                 # Foundation
//! │   ├── connection        # SQLite DatabaseConn wrapper
//! │   └── schema            # Table definitions and version checks
//! │
//! └── qa/                   # Data access
//!     ├── users
//!     ├── questions
//!     ├── replies
//!     ├── question_follows
//!     └── question_likes
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use qadb::database::QaDatabase;
//!
//! let db = QaDatabase::open("students.db")?;
//!
//! if let Some(ada) = db.users().find_by_name("Ada", "Lovelace")? {
//!     for question in ada.authored_questions(db.connection())? {
//!         println!("{}: {}", question.id, question.title);
//!     }
//! }
//!
//! let top = db.questions().most_followed(3)?;
//! ```

pub mod core;
pub mod qa;

pub use self::core::{
    DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, ScriptShape, QA_TABLES,
    SCHEMA_VERSION,
};

pub use qa::{
    QaDatabase, Question, QuestionFollow, QuestionFollowRepository, QuestionLike,
    QuestionLikeRepository, QuestionRank, QuestionRepository, Reply, ReplyRepository, TableCount,
    User, UserRepository, DEFAULT_DB_FILE,
};

#[cfg(feature = "display")]
pub use qa::ReplyRow;

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
