use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;

use crate::database::DEFAULT_DB_FILE;

pub struct QaConfig {
    /// Path to the directory to hold qadb's data
    pub data_dir: String,

    /// Explicit database file; defaults to `{data_dir}/qadb.sqlite3`
    pub database_path: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### qadb configuration file

### directory for data used by qadb
# data_dir = "~/.qadb"

### database file to read, overrides the default {data_dir}/qadb.sqlite3
# database_path = "/path/to/students.db"
"#;

fn home_dir_string() -> Result<String> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    home.to_str()
        .map(|s| s.to_owned())
        .ok_or_else(|| anyhow!("Could not convert home directory path to string"))
}

impl Default for QaConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.qadb", home_dir),
            database_path: None,
        }
    }
}

impl QaConfig {
    /// Function to create and initialize a new configuration
    ///
    /// Without an explicit path, `$HOME/.qadb/qadb.toml` is used and created
    /// from a commented template when missing. Environment variables with
    /// the `QADB_` prefix override file settings.
    pub fn new(path: &Option<String>) -> Result<QaConfig> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                let qadb_dir = format!("{}/.qadb", home_dir_string()?);
                std::fs::create_dir_all(qadb_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create qadb directory: {}", e))?;
                let p = format!("{}/qadb.toml", qadb_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // E.g., `QADB_DATABASE_PATH=./students.db qadb user list`
        builder = builder.add_source(config::Environment::with_prefix("QADB"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    fn from_map(config: &HashMap<String, String>) -> Result<QaConfig> {
        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p)?,
            None => {
                let dir = format!("{}/.qadb", home_dir_string()?);
                std::fs::create_dir_all(dir.as_str())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                dir
            }
        };

        let database_path = match config.get("database_path") {
            Some(p) if !p.trim().is_empty() => Some(expand_home(p)?),
            _ => None,
        };

        Ok(QaConfig {
            data_dir,
            database_path,
        })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        match &self.database_path {
            Some(p) => p.clone(),
            None => format!("{}/{}", self.data_dir.trim_end_matches('/'), DEFAULT_DB_FILE),
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let lines = [
            format!("Config File:        {}", Self::config_file_path()),
            format!("Data Directory:     {}", self.data_dir),
            format!("SQLite Path:        {}", self.sqlite_path()),
        ];
        lines.join("\n")
    }

    /// Get the default config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.qadb/qadb.toml", home_dir)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> Result<String> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(format!("{}/{}", home_dir_string()?, rest)),
        None if path == "~" => home_dir_string(),
        None => Ok(path.to_string()),
    }
}
