use anyhow::Result;
use clap::Subcommand;
use qadb::database::ReplyRow;
use qadb::{OutputFormat, QaDatabase};

use super::{print_found, print_records, print_rows, require};

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// List every user
    List,

    /// Show a user by id
    Get {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Find a user by exact first and last name
    Find {
        fname: String,
        lname: String,
    },

    /// Questions the user authored
    Questions {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Replies the user authored
    Replies {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Questions the user follows
    Followed {
        #[clap(value_name = "ID")]
        id: i64,
    },

    /// Questions the user authored that received likes
    Liked {
        #[clap(value_name = "ID")]
        id: i64,
    },
}

pub fn run(db: &QaDatabase, commands: UserCommands, format: OutputFormat) -> Result<()> {
    let conn = db.connection();
    match commands {
        UserCommands::List => print_records(&db.users().all()?, format),
        UserCommands::Get { id } => {
            print_found(db.users().find_by_id(id)?, &format!("User {}", id), format)
        }
        UserCommands::Find { fname, lname } => print_found(
            db.users().find_by_name(&fname, &lname)?,
            &format!("User '{} {}'", fname, lname),
            format,
        ),
        UserCommands::Questions { id } => {
            let user = require(db.users().find_by_id(id)?, &format!("User {}", id))?;
            print_records(&user.authored_questions(conn)?, format)
        }
        UserCommands::Replies { id } => {
            let user = require(db.users().find_by_id(id)?, &format!("User {}", id))?;
            let replies = user.authored_replies(conn)?;
            let rows = replies.iter().map(ReplyRow::from).collect();
            print_rows(&replies, rows, format)
        }
        UserCommands::Followed { id } => {
            let user = require(db.users().find_by_id(id)?, &format!("User {}", id))?;
            print_records(&user.followed_questions(conn)?, format)
        }
        UserCommands::Liked { id } => {
            let user = require(db.users().find_by_id(id)?, &format!("User {}", id))?;
            print_records(&user.liked_questions(conn)?, format)
        }
    }
}
