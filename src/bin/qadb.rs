use clap::{Parser, Subcommand};
use qadb::{OutputFormat, QaConfig};
use tracing::Level;

mod commands;

use commands::database::DatabaseArgs;
use commands::follow::FollowCommands;
use commands::like::LikeCommands;
use commands::question::QuestionCommands;
use commands::reply::ReplyCommands;
use commands::user::UserCommands;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.qadb/qadb.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Database file to read, overrides the configured path
    #[clap(long, global = true)]
    db: Option<String>,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up users and what they wrote, follow and like
    User {
        #[clap(subcommand)]
        commands: UserCommands,
    },

    /// Look up questions, their replies, followers and likers
    Question {
        #[clap(subcommand)]
        commands: QuestionCommands,
    },

    /// Look up replies and walk the reply tree
    Reply {
        #[clap(subcommand)]
        commands: ReplyCommands,
    },

    /// Look up question follows
    Follow {
        #[clap(subcommand)]
        commands: FollowCommands,
    },

    /// Look up question likes
    Like {
        #[clap(subcommand)]
        commands: LikeCommands,
    },

    /// Show database status or import a SQL script
    Database(DatabaseArgs),

    /// Show the effective configuration
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level INFO or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match QaConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &config) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &QaConfig) -> anyhow::Result<()> {
    let Cli {
        db,
        format,
        command,
        ..
    } = cli;

    if let Commands::Config = command {
        println!("{}", config.summary());
        return Ok(());
    }

    let db_path = db.unwrap_or_else(|| config.sqlite_path());

    match command {
        Commands::User { commands } => {
            commands::user::run(&commands::open_database(&db_path)?, commands, format)
        }
        Commands::Question { commands } => {
            commands::question::run(&commands::open_database(&db_path)?, commands, format)
        }
        Commands::Reply { commands } => {
            commands::reply::run(&commands::open_database(&db_path)?, commands, format)
        }
        Commands::Follow { commands } => {
            commands::follow::run(&commands::open_database(&db_path)?, commands, format)
        }
        Commands::Like { commands } => {
            commands::like::run(&commands::open_database(&db_path)?, commands, format)
        }
        Commands::Database(args) => commands::database::run(&db_path, args, format),
        Commands::Config => Ok(()),
    }
}
