pub mod database;
pub mod follow;
pub mod like;
pub mod question;
pub mod reply;
pub mod user;

use anyhow::{anyhow, Result};
use qadb::utils::format_records;
use qadb::{OutputFormat, QaDatabase};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;
use tracing::debug;

/// Create the database's parent directory if needed
pub(crate) fn ensure_parent_dir(db_path: &str) -> Result<()> {
    match Path::new(db_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            qadb::database::ensure_data_dir(&parent.to_string_lossy())
        }
        _ => Ok(()),
    }
}

/// Open the database every lookup command reads from
pub(crate) fn open_database(db_path: &str) -> Result<QaDatabase> {
    ensure_parent_dir(db_path)?;
    debug!("using database {}", db_path);
    QaDatabase::open(db_path)
}

/// Print records whose table form is the record itself
pub(crate) fn print_records<T>(records: &[T], format: OutputFormat) -> Result<()>
where
    T: Serialize + Tabled + Clone,
{
    print_rows(records, records.to_vec(), format)
}

/// Print records with a separate table representation
///
/// Empty results print a header-only table, a PSV header or `[]`.
pub(crate) fn print_rows<T, R>(records: &[T], rows: Vec<R>, format: OutputFormat) -> Result<()>
where
    T: Serialize,
    R: Tabled,
{
    let output = format_records(records, rows, format)?;
    // JSON Lines has no lines to print for an empty result
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Print a single lookup result, or fail when nothing matched
pub(crate) fn print_found<T>(record: Option<T>, what: &str, format: OutputFormat) -> Result<()>
where
    T: Serialize + Tabled + Clone,
{
    match record {
        Some(r) => print_records(std::slice::from_ref(&r), format),
        None => Err(anyhow!("{} not found", what)),
    }
}

/// Fetch a record that a relationship lookup starts from
pub(crate) fn require<T>(record: Option<T>, what: &str) -> Result<T> {
    record.ok_or_else(|| anyhow!("{} not found", what))
}
