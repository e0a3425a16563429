//! Question repository
//!
//! Lookups over the `questions` table. Rankings by follows and likes are
//! delegated to the follow and like repositories.

use anyhow::Result;
use rusqlite::{Connection, Row};
use serde::Serialize;

use super::{query_optional, query_records};
use super::{QuestionFollowRepository, QuestionLikeRepository, Reply, ReplyRepository, User};

/// A row of the `questions` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: i64,
}

/// A question together with how many follows or likes it has
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct QuestionRank {
    pub id: i64,
    pub title: String,
    pub count: u64,
}

impl QuestionRank {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            count: row.get("count")?,
        })
    }
}

impl Question {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            author_id: row.get("author_id")?,
        })
    }

    /// First names of the users who liked this question
    pub fn likers(&self, conn: &Connection) -> Result<Vec<String>> {
        QuestionLikeRepository::new(conn).likers_for_question_id(self.id)
    }

    pub fn num_likes(&self, conn: &Connection) -> Result<u64> {
        QuestionLikeRepository::new(conn).num_likes_for_question_id(self.id)
    }

    /// Users following this question
    pub fn followers(&self, conn: &Connection) -> Result<Vec<User>> {
        QuestionFollowRepository::new(conn).followers_for_question_id(self.id)
    }

    /// The user who asked this question, if that user still exists
    pub fn author(&self, conn: &Connection) -> Result<Option<User>> {
        super::UserRepository::new(conn).find_by_id(self.author_id)
    }

    /// Every reply on this question, at any depth of the reply tree
    pub fn replies(&self, conn: &Connection) -> Result<Vec<Reply>> {
        ReplyRepository::new(conn).find_by_question_id(self.id)
    }
}

/// Repository for `questions`
pub struct QuestionRepository<'a> {
    conn: &'a Connection,
}

impl<'a> QuestionRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every question, ordered by id
    pub fn all(&self) -> Result<Vec<Question>> {
        query_records(
            self.conn,
            "questions",
            "SELECT id, title, body, author_id FROM questions ORDER BY id",
            [],
            Question::from_row,
        )
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Question>> {
        query_optional(
            self.conn,
            "question by id",
            "SELECT id, title, body, author_id FROM questions WHERE id = ?1",
            [id],
            Question::from_row,
        )
    }

    /// Questions written by `author_id`, empty if the user asked nothing
    pub fn find_by_author_id(&self, author_id: i64) -> Result<Vec<Question>> {
        query_records(
            self.conn,
            "questions by author",
            "SELECT id, title, body, author_id FROM questions
             WHERE author_id = ?1
             ORDER BY id",
            [author_id],
            Question::from_row,
        )
    }

    /// The `n` questions with the most followers
    pub fn most_followed(&self, n: usize) -> Result<Vec<QuestionRank>> {
        QuestionFollowRepository::new(self.conn).most_followed_questions(n)
    }

    /// The `n` questions with the most likes
    pub fn most_liked(&self, n: usize) -> Result<Vec<QuestionRank>> {
        QuestionLikeRepository::new(self.conn).most_liked_questions(n)
    }
}
