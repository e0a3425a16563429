use anyhow::{anyhow, Result};
use clap::Subcommand;
use qadb::database::{Reply, ReplyRow};
use qadb::{OutputFormat, QaDatabase};

use super::{print_found, print_records, print_rows, require};

/// Reply subcommands
#[derive(Subcommand)]
pub enum ReplyCommands {
    /// List every reply
    List,

    /// Show a reply by id
    Get {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Replies written by a user
    ByUser {
        #[clap(value_name = "USER_ID")]
        user_id: i64,
    },

    /// Replies on a question
    ByQuestion {
        #[clap(value_name = "QUESTION_ID")]
        question_id: i64,
    },

    /// Direct answers to a reply
    Children {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// The reply a reply answers
    Parent {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// The author of a reply
    Author {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// The question a reply belongs to
    Question {
        #[clap(value_name = "ID")]
        id: i64,
    },
}

fn print_replies(replies: &[Reply], format: OutputFormat) -> Result<()> {
    let rows = replies.iter().map(ReplyRow::from).collect();
    print_rows(replies, rows, format)
}

pub fn run(db: &QaDatabase, commands: ReplyCommands, format: OutputFormat) -> Result<()> {
    let conn = db.connection();
    let find = |id: i64| -> Result<Reply> {
        require(db.replies().find_by_id(id)?, &format!("Reply {}", id))
    };

    match commands {
        ReplyCommands::List => print_replies(&db.replies().all()?, format),
        ReplyCommands::Get { id } => print_replies(&[find(id)?], format),
        ReplyCommands::ByUser { user_id } => {
            print_replies(&db.replies().find_by_user_id(user_id)?, format)
        }
        ReplyCommands::ByQuestion { question_id } => {
            print_replies(&db.replies().find_by_question_id(question_id)?, format)
        }
        ReplyCommands::Children { id } => print_replies(&find(id)?.child_replies(conn)?, format),
        ReplyCommands::Parent { id } => {
            let reply = find(id)?;
            match reply.parent_reply(conn)? {
                Some(parent) => print_replies(&[parent], format),
                None => match reply.parent_reply_id {
                    Some(parent_id) => Err(anyhow!("Parent reply {} not found", parent_id)),
                    None => Err(anyhow!("Reply {} is a top-level reply", id)),
                },
            }
        }
        ReplyCommands::Author { id } => {
            let reply = find(id)?;
            print_found(
                reply.author(conn)?,
                &format!("Author {} of reply {}", reply.author_id, id),
                format,
            )
        }
        ReplyCommands::Question { id } => {
            let reply = find(id)?;
            match reply.question(conn)? {
                Some(question) => print_records(&[question], format),
                None => Err(anyhow!("Question {} not found", reply.question_id)),
            }
        }
    }
}
