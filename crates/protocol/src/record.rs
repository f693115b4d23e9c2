use crate::intent::Intent;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Marker placed between an instruction and its optional context in `input`.
pub const CONTEXT_MARKER: &str = "\n\n[CONTEXT]\n";

/// One normalized instruction/response pair, as collected from a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstructionPair {
    pub source: String,
    pub instruction: String,
    pub context: Option<String>,
    pub response: String,
}

impl InstructionPair {
    pub fn new(
        source: impl Into<String>,
        instruction: impl Into<String>,
        context: Option<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            instruction: instruction.into(),
            context,
            response: response.into(),
        }
    }

    /// Text the intent rules are matched against.
    #[must_use]
    pub fn intent_text(&self) -> String {
        format!(
            "{} {}",
            self.instruction,
            self.context.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// Text the clustering stage vectorizes.
    #[must_use]
    pub fn cluster_text(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.instruction,
            self.context.as_deref().unwrap_or_default(),
            self.response
        )
        .trim()
        .to_string()
    }

    /// Model-facing input: the instruction, followed by the context block if any.
    #[must_use]
    pub fn model_input(&self) -> String {
        match &self.context {
            Some(context) => format!("{}{CONTEXT_MARKER}{}", self.instruction, context),
            None => self.instruction.clone(),
        }
    }
}

/// A pair after intent tagging and clustering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedPair {
    #[serde(flatten)]
    pub pair: InstructionPair,
    pub intent: Intent,
    pub cluster: usize,
}

/// One line of the emitted dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputRecord {
    /// `source::position_in_output`
    pub id: String,
    pub source: String,
    pub input: String,
    pub output: String,
    pub intent: Intent,
    pub cluster: usize,
}

impl OutputRecord {
    #[must_use]
    pub fn from_annotated(position: usize, annotated: &AnnotatedPair) -> Self {
        Self {
            id: format!("{}::{position}", annotated.pair.source),
            source: annotated.pair.source.clone(),
            input: annotated.pair.model_input(),
            output: annotated.pair.response.clone(),
            intent: annotated.intent,
            cluster: annotated.cluster,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Chat fine-tuning line: `{"messages":[user, assistant]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatRecord {
    pub messages: Vec<ChatMessage>,
}

impl From<&OutputRecord> for ChatRecord {
    fn from(record: &OutputRecord) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: ChatRole::User,
                    content: record.input.clone(),
                },
                ChatMessage {
                    role: ChatRole::Assistant,
                    content: record.output.clone(),
                },
            ],
        }
    }
}

/// Lenient view of a dataset line for the inspection commands.
///
/// Datasets produced by other tools may miss fields or carry intent labels
/// outside [`Intent`], so everything here has a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "unknown_label")]
    pub source: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    #[serde(default = "unknown_label")]
    pub intent: String,
    #[serde(default = "unassigned_cluster")]
    pub cluster: i64,
}

fn unknown_label() -> String {
    "unknown".to_string()
}

const fn unassigned_cluster() -> i64 {
    -1
}
