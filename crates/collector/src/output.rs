use crate::error::{CollectorError, Result};
use pairs_protocol::{ChatRecord, OutputRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Line layout of the emitted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `{id, source, input, output, intent, cluster}`
    #[default]
    Records,
    /// `{"messages": [user, assistant]}`
    Chat,
}

impl FromStr for OutputFormat {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "records" | "jsonl" => Ok(Self::Records),
            "chat" => Ok(Self::Chat),
            other => Err(CollectorError::invalid_config(format!(
                "unknown output format '{other}' (expected records or chat)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Records => f.write_str("records"),
            Self::Chat => f.write_str("chat"),
        }
    }
}

/// Writes one JSON object per line; non-ASCII text is left unescaped.
pub fn write_records<W: Write>(
    writer: &mut W,
    records: &[OutputRecord],
    format: OutputFormat,
) -> Result<()> {
    for record in records {
        match format {
            OutputFormat::Records => serde_json::to_writer(&mut *writer, record)?,
            OutputFormat::Chat => serde_json::to_writer(&mut *writer, &ChatRecord::from(record))?,
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
