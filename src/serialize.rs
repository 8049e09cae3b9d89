use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read and decode one JSON document. A corrupt or unreadable file is a
/// hard error for the caller; history must never silently vanish.
pub fn parse_json_file(path: &Path) -> Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to decode JSON from {}", path.display()))
}

/// Compact single-line encoding, matching what the daemon writes.
pub fn dump_json(value: &Value) -> Result<String> {
    serde_json::to_string(value).context("failed to encode JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn round_trips_a_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mapping": {{}}}}"#).unwrap();
        let value = parse_json_file(file.path()).unwrap();
        assert_eq!(value, json!({"mapping": {}}));
        assert_eq!(dump_json(&value).unwrap(), r#"{"mapping":{}}"#);
    }

    #[test]
    fn corrupt_documents_fail_loudly() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = parse_json_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to decode JSON"));
    }
}
