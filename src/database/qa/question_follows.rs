//! Question follow repository
//!
//! `question_follows` joins users to the questions they subscribe to.

use anyhow::Result;
use rusqlite::{Connection, Row};
use serde::Serialize;

use super::{query_optional, query_records, Question, QuestionRank, User};

/// A row of the `question_follows` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct QuestionFollow {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
}

impl QuestionFollow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            question_id: row.get("question_id")?,
        })
    }
}

/// Repository for `question_follows`
pub struct QuestionFollowRepository<'a> {
    conn: &'a Connection,
}

impl<'a> QuestionFollowRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn all(&self) -> Result<Vec<QuestionFollow>> {
        query_records(
            self.conn,
            "question follows",
            "SELECT id, user_id, question_id FROM question_follows ORDER BY id",
            [],
            QuestionFollow::from_row,
        )
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<QuestionFollow>> {
        query_optional(
            self.conn,
            "question follow by id",
            "SELECT id, user_id, question_id FROM question_follows WHERE id = ?1",
            [id],
            QuestionFollow::from_row,
        )
    }

    /// Up to `n` questions ordered by follower count, highest first
    ///
    /// Questions nobody follows are kept with a count of zero and sort
    /// last. Equal counts are ordered by question id.
    pub fn most_followed_questions(&self, n: usize) -> Result<Vec<QuestionRank>> {
        query_records(
            self.conn,
            "most followed questions",
            "SELECT questions.id AS id, questions.title AS title,
                    COUNT(question_follows.id) AS count
             FROM questions
             LEFT JOIN question_follows ON questions.id = question_follows.question_id
             GROUP BY questions.id
             ORDER BY count DESC, questions.id ASC
             LIMIT ?1",
            [n as i64],
            QuestionRank::from_row,
        )
    }

    /// Users following the question
    pub fn followers_for_question_id(&self, question_id: i64) -> Result<Vec<User>> {
        query_records(
            self.conn,
            "question followers",
            "SELECT users.id AS id, users.fname AS fname, users.lname AS lname
             FROM users
             JOIN question_follows ON users.id = question_follows.user_id
             WHERE question_follows.question_id = ?1
             ORDER BY users.id",
            [question_id],
            User::from_row,
        )
    }

    /// Questions the user follows
    pub fn followed_questions_for_user_id(&self, user_id: i64) -> Result<Vec<Question>> {
        query_records(
            self.conn,
            "followed questions",
            "SELECT questions.id AS id, questions.title AS title,
                    questions.body AS body, questions.author_id AS author_id
             FROM questions
             JOIN question_follows ON questions.id = question_follows.question_id
             WHERE question_follows.user_id = ?1
             ORDER BY questions.id",
            [user_id],
            Question::from_row,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::qa::test_support::seeded_db;

    #[test]
    fn test_all_follows() {
        let db = seeded_db();
        let follows = db.follows().all().unwrap();
        assert_eq!(follows.len(), 6);
        assert_eq!(
            follows[2],
            QuestionFollow {
                id: 3,
                user_id: 1,
                question_id: 2,
            }
        );
    }

    #[test]
    fn test_find_by_id() {
        let db = seeded_db();
        let follow = db.follows().find_by_id(5).unwrap().unwrap();
        assert_eq!(follow.user_id, 2);
        assert_eq!(follow.question_id, 3);
        assert!(db.follows().find_by_id(100).unwrap().is_none());
    }

    #[test]
    fn test_most_followed_limit_and_order() {
        let db = seeded_db();
        let top = db.follows().most_followed_questions(3).unwrap();
        let ranked: Vec<(i64, u64)> = top.iter().map(|r| (r.id, r.count)).collect();
        assert_eq!(ranked, vec![(1, 3), (2, 2), (3, 1)]);
        assert_eq!(top[0].title, "Engines");
    }

    #[test]
    fn test_most_followed_includes_unfollowed() {
        let db = seeded_db();
        let top = db.follows().most_followed_questions(10).unwrap();
        assert_eq!(top.len(), 5);
        let ranked: Vec<(i64, u64)> = top.iter().map(|r| (r.id, r.count)).collect();
        assert_eq!(ranked, vec![(1, 3), (2, 2), (3, 1), (4, 0), (5, 0)]);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_most_followed_zero() {
        let db = seeded_db();
        assert!(db.follows().most_followed_questions(0).unwrap().is_empty());
    }

    #[test]
    fn test_followers_for_question_id() {
        let db = seeded_db();
        let followers = db.follows().followers_for_question_id(2).unwrap();
        let names: Vec<&str> = followers.iter().map(|u| u.fname.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Edsger"]);
        assert!(db.follows().followers_for_question_id(5).unwrap().is_empty());
    }

    #[test]
    fn test_followed_questions_for_user_id() {
        let db = seeded_db();
        let questions = db.follows().followed_questions_for_user_id(2).unwrap();
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 3]);
        // row carries the question's own id, not the follow's
        assert_eq!(questions[1].title, "Goto");
        assert!(db
            .follows()
            .followed_questions_for_user_id(4)
            .unwrap()
            .is_empty());
    }
}
