use anyhow::Result;
use clap::Subcommand;
use qadb::{OutputFormat, QaDatabase};

use super::{print_found, print_records};

/// Follow subcommands
#[derive(Subcommand)]
pub enum FollowCommands {
    /// List every follow
    List,

    /// Show a follow by id
    Get {
        #[clap(value_name = "ID")]
        id: i64,
    },
}

pub fn run(db: &QaDatabase, commands: FollowCommands, format: OutputFormat) -> Result<()> {
    match commands {
        FollowCommands::List => print_records(&db.follows().all()?, format),
        FollowCommands::Get { id } => {
            print_found(db.follows().find_by_id(id)?, &format!("Follow {}", id), format)
        }
    }
}
