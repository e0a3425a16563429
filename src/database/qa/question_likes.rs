//! Question like repository
//!
//! `question_likes` joins users to the questions they approved of. Like rows
//! are rarely needed on their own, so most lookups here return users,
//! questions or counts.

use anyhow::{anyhow, Result};
use rusqlite::{Connection, Row};
use serde::Serialize;
use tracing::debug;

use super::{query_records, Question, QuestionRank};

/// A row of the `question_likes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct QuestionLike {
    pub user_id: i64,
    pub question_id: i64,
}

impl QuestionLike {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            question_id: row.get("question_id")?,
        })
    }
}

/// Repository for `question_likes`
pub struct QuestionLikeRepository<'a> {
    conn: &'a Connection,
}

impl<'a> QuestionLikeRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every like, in insertion order
    pub fn all(&self) -> Result<Vec<QuestionLike>> {
        query_records(
            self.conn,
            "question likes",
            "SELECT user_id, question_id FROM question_likes ORDER BY rowid",
            [],
            QuestionLike::from_row,
        )
    }

    /// First names of the users who liked the question
    pub fn likers_for_question_id(&self, question_id: i64) -> Result<Vec<String>> {
        query_records(
            self.conn,
            "question likers",
            "SELECT users.fname AS liker
             FROM question_likes
             JOIN users ON question_likes.user_id = users.id
             WHERE question_likes.question_id = ?1
             ORDER BY question_likes.rowid",
            [question_id],
            |row| row.get("liker"),
        )
    }

    pub fn num_likes_for_question_id(&self, question_id: i64) -> Result<u64> {
        debug!("counting likes for question {}", question_id);
        self.conn
            .query_row(
                "SELECT COUNT(user_id) AS number_of_likes
                 FROM question_likes
                 WHERE question_id = ?1",
                [question_id],
                |row| row.get("number_of_likes"),
            )
            .map_err(|e| anyhow!("Failed to count likes for question {}: {}", question_id, e))
    }

    /// Questions authored by `user_id` that have at least one like
    ///
    /// Note that this keys on the question's author, not on who left the
    /// like. Each question appears once regardless of how many likes it has.
    pub fn liked_questions_for_user_id(&self, user_id: i64) -> Result<Vec<Question>> {
        query_records(
            self.conn,
            "liked questions",
            "SELECT DISTINCT questions.id AS id, questions.title AS title,
                    questions.body AS body, questions.author_id AS author_id
             FROM questions
             JOIN question_likes ON questions.id = question_likes.question_id
             WHERE questions.author_id = ?1
             ORDER BY questions.id",
            [user_id],
            Question::from_row,
        )
    }

    /// Up to `n` questions ordered by like count, highest first
    ///
    /// Unliked questions are kept with a count of zero; ties are ordered by
    /// question id.
    pub fn most_liked_questions(&self, n: usize) -> Result<Vec<QuestionRank>> {
        query_records(
            self.conn,
            "most liked questions",
            "SELECT questions.id AS id, questions.title AS title,
                    COUNT(question_likes.user_id) AS count
             FROM questions
             LEFT JOIN question_likes ON questions.id = question_likes.question_id
             GROUP BY questions.id
             ORDER BY count DESC, questions.id ASC
             LIMIT ?1",
            [n as i64],
            QuestionRank::from_row,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::qa::test_support::seeded_db;

    #[test]
    fn test_all_likes() {
        let db = seeded_db();
        let likes = db.likes().all().unwrap();
        assert_eq!(likes.len(), 4);
        assert_eq!(
            likes[3],
            QuestionLike {
                user_id: 4,
                question_id: 3,
            }
        );
    }

    #[test]
    fn test_likers_for_question_id() {
        let db = seeded_db();
        assert_eq!(
            db.likes().likers_for_question_id(1).unwrap(),
            vec!["Alan".to_string(), "Edsger".to_string()]
        );
        assert!(db.likes().likers_for_question_id(5).unwrap().is_empty());
    }

    #[test]
    fn test_num_likes_for_question_id() {
        let db = seeded_db();
        assert_eq!(db.likes().num_likes_for_question_id(1).unwrap(), 2);
        assert_eq!(db.likes().num_likes_for_question_id(3).unwrap(), 1);
        assert_eq!(db.likes().num_likes_for_question_id(4).unwrap(), 0);
        assert_eq!(db.likes().num_likes_for_question_id(404).unwrap(), 0);
    }

    #[test]
    fn test_liked_questions_keys_on_author() {
        let db = seeded_db();
        // Alan liked question 1 but did not write it; his own question 2 was liked.
        let ids: Vec<i64> = db
            .likes()
            .liked_questions_for_user_id(2)
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_liked_questions_are_distinct() {
        let db = seeded_db();
        // question 1 has two likes but is reported once
        let questions = db.likes().liked_questions_for_user_id(1).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 1);
    }

    #[test]
    fn test_most_liked_questions() {
        let db = seeded_db();
        let ranked: Vec<(i64, u64)> = db
            .likes()
            .most_liked_questions(10)
            .unwrap()
            .iter()
            .map(|r| (r.id, r.count))
            .collect();
        assert_eq!(ranked, vec![(1, 2), (2, 1), (3, 1), (4, 0), (5, 0)]);

        let top = db.likes().most_liked_questions(1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Engines");
    }
}
