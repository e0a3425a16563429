//! Output formatting shared by every command
//!
//! Records are serialized with serde for the JSON variants and PSV, and
//! rendered with `tabled` for the table variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified output format for all qadb commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Render records as pipe-separated values, header taken from the field names
pub fn to_psv<T: Serialize>(records: &[T]) -> anyhow::Result<String> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    for (i, record) in records.iter().enumerate() {
        let value = serde_json::to_value(record)?;
        let object = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("Expected a JSON object per record"))?;
        if i == 0 {
            lines.push(object.keys().cloned().collect::<Vec<_>>().join("|"));
        }
        let fields: Vec<String> = object
            .values()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        lines.push(fields.join("|"));
    }
    Ok(lines.join("\n"))
}

/// Render `records` in the requested format
///
/// `rows` supplies the table representation, which may differ from the
/// serialized record (e.g. optional columns rendered as text). An empty
/// slice still renders the column headers (or `[]` for JSON).
#[cfg(feature = "display")]
pub fn format_records<T, R>(
    records: &[T],
    rows: Vec<R>,
    format: OutputFormat,
) -> anyhow::Result<String>
where
    T: Serialize,
    R: tabled::Tabled,
{
    use tabled::settings::Style;
    use tabled::Table;

    let output = match format {
        OutputFormat::Table => Table::new(rows).with(Style::rounded()).to_string(),
        OutputFormat::Markdown => Table::new(rows).with(Style::markdown()).to_string(),
        OutputFormat::Json => serde_json::to_string(records)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(records)?,
        OutputFormat::JsonLine => records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
        OutputFormat::Psv if records.is_empty() => R::headers().join("|"),
        OutputFormat::Psv => to_psv(records)?,
    };
    Ok(output)
}
