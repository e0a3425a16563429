//! User repository
//!
//! Lookups over the `users` table, plus the relationship accessors that walk
//! from a user to the questions and replies they authored, followed or liked.

use anyhow::Result;
use rusqlite::{Connection, Row};
use serde::Serialize;

use super::{query_optional, query_records};
use super::{
    Question, QuestionFollowRepository, QuestionLikeRepository, QuestionRepository, Reply,
    ReplyRepository,
};

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct User {
    pub id: i64,
    pub fname: String,
    pub lname: String,
}

impl User {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            fname: row.get("fname")?,
            lname: row.get("lname")?,
        })
    }

    /// Questions authored by this user that have been liked
    ///
    /// See [`QuestionLikeRepository::liked_questions_for_user_id`].
    pub fn liked_questions(&self, conn: &Connection) -> Result<Vec<Question>> {
        QuestionLikeRepository::new(conn).liked_questions_for_user_id(self.id)
    }

    /// Questions this user follows
    pub fn followed_questions(&self, conn: &Connection) -> Result<Vec<Question>> {
        QuestionFollowRepository::new(conn).followed_questions_for_user_id(self.id)
    }

    /// Questions this user wrote
    pub fn authored_questions(&self, conn: &Connection) -> Result<Vec<Question>> {
        QuestionRepository::new(conn).find_by_author_id(self.id)
    }

    /// Replies this user wrote
    pub fn authored_replies(&self, conn: &Connection) -> Result<Vec<Reply>> {
        ReplyRepository::new(conn).find_by_user_id(self.id)
    }
}

/// Repository for `users`
pub struct UserRepository<'a> {
    conn: &'a Connection,
}

impl<'a> UserRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every user, ordered by id
    pub fn all(&self) -> Result<Vec<User>> {
        query_records(
            self.conn,
            "users",
            "SELECT id, fname, lname FROM users ORDER BY id",
            [],
            User::from_row,
        )
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        query_optional(
            self.conn,
            "user by id",
            "SELECT id, fname, lname FROM users WHERE id = ?1",
            [id],
            User::from_row,
        )
    }

    /// First user (lowest id) whose first and last names match exactly
    pub fn find_by_name(&self, fname: &str, lname: &str) -> Result<Option<User>> {
        query_optional(
            self.conn,
            "user by name",
            "SELECT id, fname, lname FROM users
             WHERE fname = ?1 AND lname = ?2
             ORDER BY id
             LIMIT 1",
            [fname, lname],
            User::from_row,
        )
    }
}
