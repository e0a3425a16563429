use anyhow::Result;
use clap::Subcommand;
use qadb::database::ReplyRow;
use qadb::{OutputFormat, QaDatabase};
use serde::Serialize;
use tabled::Tabled;

use super::{print_found, print_records, print_rows, require};

/// Question subcommands
#[derive(Subcommand)]
pub enum QuestionCommands {
    /// List every question
    List,

    /// Show a question by id
    Get {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Questions written by a user
    ByAuthor {
        #[clap(value_name = "AUTHOR_ID")]
        author_id: i64,
    },

    /// Replies on a question
    Replies {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Users following a question
    Followers {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Users who liked a question, with the like count
    Likers {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// The user who asked a question
    Author {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Questions with the most followers
    MostFollowed {
        #[clap(default_value = "10")]
        n: usize,
    },

    /// Questions with the most likes
    MostLiked {
        #[clap(default_value = "10")]
        n: usize,
    },
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct Liker {
    liker: String,
}

pub fn run(db: &QaDatabase, commands: QuestionCommands, format: OutputFormat) -> Result<()> {
    let conn = db.connection();
    match commands {
        QuestionCommands::List => print_records(&db.questions().all()?, format),
        QuestionCommands::Get { id } => print_found(
            db.questions().find_by_id(id)?,
            &format!("Question {}", id),
            format,
        ),
        QuestionCommands::ByAuthor { author_id } => {
            print_records(&db.questions().find_by_author_id(author_id)?, format)
        }
        QuestionCommands::Replies { id } => {
            let question = require(db.questions().find_by_id(id)?, &format!("Question {}", id))?;
            let replies = question.replies(conn)?;
            let rows = replies.iter().map(ReplyRow::from).collect();
            print_rows(&replies, rows, format)
        }
        QuestionCommands::Followers { id } => {
            let question = require(db.questions().find_by_id(id)?, &format!("Question {}", id))?;
            print_records(&question.followers(conn)?, format)
        }
        QuestionCommands::Likers { id } => {
            let question = require(db.questions().find_by_id(id)?, &format!("Question {}", id))?;
            let likers: Vec<Liker> = question
                .likers(conn)?
                .into_iter()
                .map(|liker| Liker { liker })
                .collect();
            if !format.is_json() {
                println!("{} like(s)", question.num_likes(conn)?);
            }
            print_records(&likers, format)
        }
        QuestionCommands::Author { id } => {
            let question = require(db.questions().find_by_id(id)?, &format!("Question {}", id))?;
            print_found(
                question.author(conn)?,
                &format!("Author {} of question {}", question.author_id, id),
                format,
            )
        }
        QuestionCommands::MostFollowed { n } => {
            print_records(&db.questions().most_followed(n)?, format)
        }
        QuestionCommands::MostLiked { n } => print_records(&db.questions().most_liked(n)?, format),
    }
}
