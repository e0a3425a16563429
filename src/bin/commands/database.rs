use anyhow::Result;
use clap::{Args, Subcommand};
use qadb::database::SCHEMA_VERSION;
use qadb::{OutputFormat, QaDatabase};
use serde::Serialize;
use std::path::PathBuf;

use super::{ensure_parent_dir, open_database, print_records};

/// Arguments for the Database command
#[derive(Args)]
pub struct DatabaseArgs {
    #[clap(subcommand)]
    pub command: Option<DatabaseCommands>,
}

/// Database subcommands
#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// Show schema status and row counts (default when no subcommand)
    Status,

    /// Load a SQL script (INSERT fixture or `sqlite3 .dump`), e.g. fixtures/qa_seed.sql
    Import {
        #[clap(value_name = "SQL_FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct DatabaseStatus {
    path: String,
    schema_version: u32,
    schema_status: String,
    tables: Vec<qadb::TableCount>,
}

pub fn run(db_path: &str, args: DatabaseArgs, output_format: OutputFormat) -> Result<()> {
    match args.command {
        None | Some(DatabaseCommands::Status) => {
            let db = open_database(db_path)?;
            run_status(&db, db_path, output_format)
        }
        Some(DatabaseCommands::Import { file }) => {
            ensure_parent_dir(db_path)?;
            let db = QaDatabase::open_with_script(db_path, &file)?;
            if !output_format.is_json() {
                println!("Imported {}", file.display());
            }
            run_status(&db, db_path, output_format)
        }
    }
}

fn run_status(db: &QaDatabase, db_path: &str, output_format: OutputFormat) -> Result<()> {
    let status = DatabaseStatus {
        path: db_path.to_string(),
        schema_version: SCHEMA_VERSION,
        schema_status: format!("{:?}", db.schema_status()?),
        tables: db.table_counts()?,
    };

    match output_format {
        OutputFormat::Json | OutputFormat::JsonLine => {
            println!("{}", serde_json::to_string(&status)?)
        }
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&status)?),
        _ => {
            println!("Database:       {}", status.path);
            println!(
                "Schema:         {} (v{})",
                status.schema_status, status.schema_version
            );
            print_records(&status.tables, output_format)?;
        }
    }
    Ok(())
}
