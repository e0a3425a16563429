//! Reply repository
//!
//! Replies hang off a question and optionally off another reply, forming a
//! tree. Accessors here walk one level of that tree at a time.

use anyhow::Result;
use rusqlite::{Connection, Row};
use serde::Serialize;

use super::{query_optional, query_records, Question, QuestionRepository, User, UserRepository};

const REPLY_COLUMNS: &str = "id, question_id, parent_reply_id, author_id, body";

/// A row of the `replies` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub id: i64,
    pub question_id: i64,
    pub parent_reply_id: Option<i64>,
    pub author_id: i64,
    pub body: String,
}

/// Table row for [`Reply`], with the optional parent rendered as text
#[cfg(feature = "display")]
#[derive(Debug, Clone, tabled::Tabled)]
pub struct ReplyRow {
    pub id: i64,
    pub question_id: i64,
    pub parent_reply_id: String,
    pub author_id: i64,
    pub body: String,
}

#[cfg(feature = "display")]
impl From<&Reply> for ReplyRow {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id,
            question_id: reply.question_id,
            parent_reply_id: reply
                .parent_reply_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            author_id: reply.author_id,
            body: reply.body.clone(),
        }
    }
}

impl Reply {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            question_id: row.get("question_id")?,
            parent_reply_id: row.get("parent_reply_id")?,
            author_id: row.get("author_id")?,
            body: row.get("body")?,
        })
    }

    pub fn author(&self, conn: &Connection) -> Result<Option<User>> {
        UserRepository::new(conn).find_by_id(self.author_id)
    }

    pub fn question(&self, conn: &Connection) -> Result<Option<Question>> {
        QuestionRepository::new(conn).find_by_id(self.question_id)
    }

    /// The reply this one answers; `None` for top-level replies
    pub fn parent_reply(&self, conn: &Connection) -> Result<Option<Reply>> {
        match self.parent_reply_id {
            Some(parent_id) => ReplyRepository::new(conn).find_by_id(parent_id),
            None => Ok(None),
        }
    }

    /// Direct answers to this reply (one level, not recursive)
    pub fn child_replies(&self, conn: &Connection) -> Result<Vec<Reply>> {
        ReplyRepository::new(conn).find_by_parent_id(self.id)
    }
}

/// Repository for `replies`
pub struct ReplyRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ReplyRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn all(&self) -> Result<Vec<Reply>> {
        query_records(
            self.conn,
            "replies",
            &format!("SELECT {REPLY_COLUMNS} FROM replies ORDER BY id"),
            [],
            Reply::from_row,
        )
    }

    /// Replies written by `author_id`
    pub fn find_by_user_id(&self, author_id: i64) -> Result<Vec<Reply>> {
        query_records(
            self.conn,
            "replies by author",
            &format!("SELECT {REPLY_COLUMNS} FROM replies WHERE author_id = ?1 ORDER BY id"),
            [author_id],
            Reply::from_row,
        )
    }

    /// Every reply on a question, top-level and nested
    pub fn find_by_question_id(&self, question_id: i64) -> Result<Vec<Reply>> {
        query_records(
            self.conn,
            "replies by question",
            &format!("SELECT {REPLY_COLUMNS} FROM replies WHERE question_id = ?1 ORDER BY id"),
            [question_id],
            Reply::from_row,
        )
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Reply>> {
        query_optional(
            self.conn,
            "reply by id",
            &format!("SELECT {REPLY_COLUMNS} FROM replies WHERE id = ?1"),
            [id],
            Reply::from_row,
        )
    }

    /// Replies whose parent is `parent_reply_id`
    pub fn find_by_parent_id(&self, parent_reply_id: i64) -> Result<Vec<Reply>> {
        query_records(
            self.conn,
            "child replies",
            &format!(
                "SELECT {REPLY_COLUMNS} FROM replies WHERE parent_reply_id = ?1 ORDER BY id"
            ),
            [parent_reply_id],
            Reply::from_row,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::qa::test_support::seeded_db;

    fn ids(replies: &[Reply]) -> Vec<i64> {
        replies.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_all_replies() {
        let db = seeded_db();
        let replies = db.replies().all().unwrap();
        assert_eq!(ids(&replies), vec![10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(
            replies[4],
            Reply {
                id: 14,
                question_id: 1,
                parent_reply_id: Some(13),
                author_id: 2,
                body: "Only if music is computable.".to_string(),
            }
        );
        assert_eq!(replies[0].parent_reply_id, None);
    }

    #[test]
    fn test_find_by_question_id() {
        let db = seeded_db();
        let replies = db.replies().find_by_question_id(5).unwrap();
        assert_eq!(ids(&replies), vec![10, 11, 12]);
        assert!(replies.iter().all(|r| r.parent_reply_id.is_none()));

        assert!(db.replies().find_by_question_id(3).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_user_id() {
        let db = seeded_db();
        assert_eq!(ids(&db.replies().find_by_user_id(3).unwrap()), vec![12, 15, 16]);
        assert!(db.replies().find_by_user_id(4).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let db = seeded_db();
        let reply = db.replies().find_by_id(16).unwrap().unwrap();
        assert_eq!(reply.parent_reply_id, Some(14));
        assert!(db.replies().find_by_id(1).unwrap().is_none());
    }

    #[test]
    fn test_child_replies_without_children() {
        let db = seeded_db();
        let reply = db.replies().find_by_id(10).unwrap().unwrap();
        let children = reply.child_replies(db.connection()).unwrap();
        assert!(children.is_empty());
    }

    #[test]
    fn test_child_replies_one_level() {
        let db = seeded_db();
        let root = db.replies().find_by_id(13).unwrap().unwrap();
        // 16 answers 14, so it is a grandchild of 13 and not listed
        assert_eq!(ids(&root.child_replies(db.connection()).unwrap()), vec![14, 15]);
    }

    #[test]
    fn test_parent_reply() {
        let db = seeded_db();
        let conn = db.connection();
        let nested = db.replies().find_by_id(16).unwrap().unwrap();
        let parent = nested.parent_reply(conn).unwrap().unwrap();
        assert_eq!(parent.id, 14);
        let grandparent = parent.parent_reply(conn).unwrap().unwrap();
        assert_eq!(grandparent.id, 13);
        assert!(grandparent.parent_reply(conn).unwrap().is_none());
    }

    #[test]
    fn test_author_and_question() {
        let db = seeded_db();
        let conn = db.connection();
        let reply = db.replies().find_by_id(11).unwrap().unwrap();
        assert_eq!(reply.author(conn).unwrap().unwrap().fname, "Alan");
        assert_eq!(reply.question(conn).unwrap().unwrap().title, "Notes");
    }

    #[cfg(feature = "display")]
    #[test]
    fn test_reply_row_renders_missing_parent() {
        let db = seeded_db();
        let replies = db.replies().all().unwrap();
        assert_eq!(ReplyRow::from(&replies[0]).parent_reply_id, "");
        assert_eq!(ReplyRow::from(&replies[4]).parent_reply_id, "13");
    }

    #[test]
    fn test_reply_json_keeps_column_order_and_null_parent() {
        let db = seeded_db();
        let reply = db.replies().find_by_id(10).unwrap().unwrap();
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.starts_with(
            "{\"id\":10,\"question_id\":5,\"parent_reply_id\":null,\"author_id\":1,"
        ));
    }
}
