use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse topical label of an instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Code,
    Math,
    Reasoning,
    Qa,
    Creative,
    Roleplay,
    Writing,
    Data,
    Assistant,
    #[default]
    Other,
}

impl Intent {
    pub const ALL: [Intent; 10] = [
        Intent::Code,
        Intent::Math,
        Intent::Reasoning,
        Intent::Qa,
        Intent::Creative,
        Intent::Roleplay,
        Intent::Writing,
        Intent::Data,
        Intent::Assistant,
        Intent::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Intent::Code => "code",
            Intent::Math => "math",
            Intent::Reasoning => "reasoning",
            Intent::Qa => "qa",
            Intent::Creative => "creative",
            Intent::Roleplay => "roleplay",
            Intent::Writing => "writing",
            Intent::Data => "data",
            Intent::Assistant => "assistant",
            Intent::Other => "other",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown intent '{needle}'"))
    }
}
