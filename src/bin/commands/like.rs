use anyhow::Result;
use clap::Subcommand;
use qadb::{OutputFormat, QaDatabase};
use serde::Serialize;
use tabled::Tabled;

use super::print_records;

/// Like subcommands
#[derive(Subcommand)]
pub enum LikeCommands {
    /// List every like
    List,

    /// Count the likes on a question
    Count {
        #[clap(value_name = "QUESTION_ID")]
        question_id: i64,
    },
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct LikeCount {
    question_id: i64,
    likes: u64,
}

pub fn run(db: &QaDatabase, commands: LikeCommands, format: OutputFormat) -> Result<()> {
    match commands {
        LikeCommands::List => print_records(&db.likes().all()?, format),
        LikeCommands::Count { question_id } => {
            let likes = db.likes().num_likes_for_question_id(question_id)?;
            print_records(&[LikeCount { question_id, likes }], format)
        }
    }
}
