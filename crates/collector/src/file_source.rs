//! JSON / JSONL file sources.
//!
//! Records are normalized from the common instruction dataset layouts:
//!
//! - `messages: [{role, content}]` (chat transcripts)
//! - `conversations: [{from|role, value|content}]` (ShareGPT style)
//! - `instruction` + `output|response` (+ `input|context` as context)
//! - `question` + `response` (+ `system_prompt` as context)
//! - `user_input` + `target_prompt`
//! - `prompt` + `completion`

use crate::error::{CollectorError, Result};
use crate::source::{PairIter, PairSource, RawPair};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const INSTRUCTION_KEYS: &[&str] = &["instruction", "question", "user_input", "prompt"];
const RESPONSE_KEYS: &[&str] = &["output", "response", "target_prompt", "completion"];
const CONTEXT_KEYS: &[&str] = &["input", "context", "system_prompt"];

const USER_ROLES: &[&str] = &["user", "human"];
const MESSAGE_REPLY_ROLES: &[&str] = &["assistant", "system"];
const CONVERSATION_REPLY_ROLES: &[&str] = &["gpt", "assistant", "chatgpt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    JsonLines,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A dataset file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    name: String,
    path: PathBuf,
    format: FileFormat,
}

impl FileSource {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format = FileFormat::from_path(&path).ok_or_else(|| {
            CollectorError::invalid_source(format!(
                "{} is not a .json or .jsonl file",
                path.display()
            ))
        })?;
        Ok(Self {
            name: name.into(),
            path,
            format,
        })
    }

    /// Source named after the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                CollectorError::invalid_source(format!("cannot name source {}", path.display()))
            })?;
        Self::new(name, path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn json_records(&self) -> Result<Vec<Value>> {
        let bytes = std::fs::read(&self.path)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        match value {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                _ => Ok(vec![Value::Object(map)]),
            },
            _ => Err(CollectorError::invalid_source(format!(
                "{}: expected an array or an object",
                self.path.display()
            ))),
        }
    }
}

impl PairSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn pairs(&self, max_take: usize) -> Result<PairIter<'_>> {
        match self.format {
            FileFormat::Json => {
                let records = self.json_records()?;
                Ok(Box::new(
                    records
                        .into_iter()
                        .flat_map(|record| normalize_record(&record))
                        .take(max_take),
                ))
            }
            FileFormat::JsonLines => {
                let reader = BufReader::new(File::open(&self.path)?);
                let path = self.path.clone();
                let lines = reader.split(b'\n').enumerate().map_while(move |(idx, line)| {
                    line.map_err(|err| {
                        log::warn!("{}: read failed at line {}: {err}", path.display(), idx + 1)
                    })
                    .ok()
                    .map(|line| (idx, line))
                });
                let path = self.path.clone();
                Ok(Box::new(
                    lines
                        .filter_map(move |(idx, line)| parse_line(&path, idx, &line))
                        .flat_map(|record| normalize_record(&record))
                        .take(max_take),
                ))
            }
        }
    }
}

fn parse_line(path: &Path, idx: usize, line: &[u8]) -> Option<Value> {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line,
        Err(err) => {
            log::debug!("{}: skipping line {}: {err}", path.display(), idx + 1);
            return None;
        }
    };
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{}: skipping line {}: {err}", path.display(), idx + 1);
            None
        }
    }
}

/// Every pair one dataset record contributes, in record order.
#[must_use]
pub fn normalize_record(record: &Value) -> Vec<RawPair> {
    if let Some(messages) = record.get("messages").and_then(Value::as_array) {
        return turn_pairs(messages, MESSAGE_REPLY_ROLES);
    }
    if let Some(turns) = record.get("conversations").and_then(Value::as_array) {
        return turn_pairs(turns, CONVERSATION_REPLY_ROLES);
    }

    let instruction = first_text(record, INSTRUCTION_KEYS).unwrap_or_default();
    let context = first_text(record, CONTEXT_KEYS);
    let Some(response) = first_text(record, RESPONSE_KEYS) else {
        return Vec::new();
    };
    if instruction.is_empty() && context.is_none() {
        return Vec::new();
    }
    vec![RawPair {
        instruction,
        context,
        response,
    }]
}

fn turn_pairs(turns: &[Value], reply_roles: &[&str]) -> Vec<RawPair> {
    turns
        .windows(2)
        .filter_map(|window| {
            let (ask, reply) = (&window[0], &window[1]);
            let ask_role = turn_role(ask)?;
            let reply_role = turn_role(reply)?;
            if !USER_ROLES.contains(&ask_role.as_str())
                || !reply_roles.contains(&reply_role.as_str())
            {
                return None;
            }
            let instruction = first_text(ask, &["content", "value"])?;
            let response = first_text(reply, &["content", "value"])?;
            Some(RawPair::new(instruction, response))
        })
        .collect()
}

fn turn_role(turn: &Value) -> Option<String> {
    first_text(turn, &["role", "from"]).map(|role| role.to_ascii_lowercase())
}

/// First key holding a non-blank string, trimmed.
fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
