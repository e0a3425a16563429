#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! qadb - data access for a question-and-answer SQLite database
//!
//! qadb wraps the `users`, `questions`, `replies`, `question_follows` and
//! `question_likes` tables in typed, read-only repositories. Every lookup is
//! one parameterized query against a single connection owned by
//! [`QaDatabase`]; rows are decoded by column name into plain records.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Repositories, schema bootstrap, configuration | `rusqlite`, `config` |
//! | `display` | Table rendering of records | `tabled` |
//! | `cli` | The `qadb` binary | `clap`, `tracing-subscriber` |
//!
//! # Lookups
//!
//! Single-row lookups return `Ok(None)` when nothing matches, multi-row
//! lookups return an empty `Vec`, and only query failures are errors.
//!
//! ```rust,ignore
//! use qadb::QaDatabase;
//!
//! let db = QaDatabase::open("students.db")?;
//!
//! match db.users().find_by_id(1)? {
//!     Some(user) => println!("{} {}", user.fname, user.lname),
//!     None => println!("no such user"),
//! }
//!
//! let question = db.questions().find_by_id(5)?;
//! if let Some(q) = question {
//!     for reply in q.replies(db.connection())? {
//!         let children = reply.child_replies(db.connection())?;
//!         println!("reply {} has {} direct answers", reply.id, children.len());
//!     }
//! }
//! ```

pub mod config;
pub mod database;
pub mod utils;

pub use config::QaConfig;

pub use database::{
    DatabaseConn, QaDatabase, Question, QuestionFollow, QuestionFollowRepository, QuestionLike,
    QuestionLikeRepository, QuestionRank, QuestionRepository, Reply, ReplyRepository,
    SchemaManager, SchemaStatus, TableCount, User, UserRepository, SCHEMA_VERSION,
};

pub use utils::OutputFormat;
