use anyhow::{Context as AnyhowContext, Result};
use pairs_protocol::DatasetRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads an emitted JSONL dataset; blank lines are ignored.
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetRecord>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open dataset {}", path.display()))?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: DatasetRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("{}: invalid record on line {}", path.display(), idx + 1))?;
        records.push(record);
    }
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn skips_blank_lines_and_reports_bad_ones() {
        let temp = tempdir().unwrap();
        let good = temp.path().join("good.jsonl");
        fs::write(&good, "{\"source\":\"a\",\"cluster\":0}\n\n{\"input\":\"x\"}\n").unwrap();
        let records = load_dataset(&good).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source, "unknown");
        assert_eq!(records[1].cluster, -1);

        let bad = temp.path().join("bad.jsonl");
        fs::write(&bad, "{}\nnope\n").unwrap();
        let err = load_dataset(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
