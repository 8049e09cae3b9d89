use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use log::debug;
use serde_json::{Map, Value};

use crate::history::{is_merged_document, MAPPING_KEY};
use crate::serialize::parse_json_file;

/// One loaded input to the merger, decoupled from the filesystem so the
/// merge itself is a pure function over documents, an explicit clock, and a
/// threshold.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Identifier the document keeps in the merged mapping: the base
    /// filename for raw per-instance files.
    pub name: String,
    /// Where the document came from; reported back as consumed.
    pub path: PathBuf,
    pub modified: SystemTime,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct MergeResult {
    /// `{"mapping": {...}}` with source identifiers sorted.
    pub merged: Value,
    /// Every source folded into the result. Raw files skipped for
    /// freshness are never listed, so a caller archiving consumed files
    /// cannot archive one the live daemon may still be writing.
    pub consumed: Vec<PathBuf>,
}

/// Union raw and merged documents into one merged store.
///
/// Already-merged inputs are always folded in, later inputs winning per
/// identifier. A raw input is folded in under its own name only once its
/// file has been quiet for `mtime_seconds_since`; a fresh mtime means the
/// daemon may still be appending to it.
///
/// A source that is not a JSON object, or a merged store whose mapping is
/// not one, fails the whole merge. Consumers archive consumed files after
/// writing the result, so folding a corrupt store in as empty would lose
/// its history.
pub fn merge_documents(
    sources: Vec<SourceDocument>,
    mtime_seconds_since: f64,
    now: SystemTime,
) -> Result<MergeResult> {
    let mut merged_sources = Vec::new();
    let mut raw_sources = Vec::new();
    for source in sources {
        if is_merged_document(&source.data) {
            merged_sources.push(source);
        } else if source.data.is_object() {
            raw_sources.push(source);
        } else {
            bail!("document {} is not a JSON object", source.path.display());
        }
    }

    // serde_json's default map keeps keys sorted, which makes the output
    // deterministic.
    let mut mapping: Map<String, Value> = Map::new();
    let mut consumed = Vec::new();

    for source in merged_sources {
        let inner = match source.data.get(MAPPING_KEY).and_then(Value::as_object) {
            Some(inner) => inner.clone(),
            None => bail!("mapping in {} is not a JSON object", source.path.display()),
        };
        for (name, stream) in inner {
            mapping.insert(name, stream);
        }
        consumed.push(source.path);
    }

    for source in raw_sources {
        let age_secs = now
            .duration_since(source.modified)
            .map(|age| age.as_secs_f64())
            .unwrap_or(0.0);
        if age_secs < mtime_seconds_since {
            debug!(
                "[merge] {} was modified {age_secs:.0}s ago, skipping as possibly live",
                source.path.display()
            );
            continue;
        }
        mapping.insert(source.name, source.data);
        consumed.push(source.path);
    }

    let mut document = Map::new();
    document.insert(MAPPING_KEY.to_string(), Value::Object(mapping));
    Ok(MergeResult {
        merged: Value::Object(document),
        consumed,
    })
}

/// Load `files` and merge them against the current time and their real
/// modification times. Any unreadable or corrupt file fails the whole
/// merge.
pub fn merge_files<P: AsRef<Path>>(files: &[P], mtime_seconds_since: f64) -> Result<MergeResult> {
    let now = SystemTime::now();
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        let path = file.as_ref();
        let data = parse_json_file(path)?;
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("failed to stat {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(SourceDocument {
            name,
            path: path.to_path_buf(),
            modified,
            data,
        });
    }
    merge_documents(sources, mtime_seconds_since, now)
}
