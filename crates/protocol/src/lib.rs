use anyhow::Result;
use serde::Serialize;

mod intent;
mod record;

pub use intent::Intent;
pub use record::{
    AnnotatedPair, ChatMessage, ChatRecord, ChatRole, DatasetRecord, InstructionPair,
    OutputRecord, CONTEXT_MARKER,
};

pub const OUTPUT_SCHEMA_VERSION: u32 = 1;

/// One JSON object per line, UTF-8, non-ASCII left unescaped.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// JSON Schema of one emitted dataset line.
pub fn output_record_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(OutputRecord);
    serde_json::to_value(schema).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_output_field() {
        let schema = output_record_schema().unwrap();
        let properties = schema["properties"].as_object().expect("properties");
        for key in ["id", "source", "input", "output", "intent", "cluster"] {
            assert!(properties.contains_key(key), "missing {key}");
        }
    }
}
