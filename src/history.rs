use std::path::Path;

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use crate::filter::RelevanceFilter;
use crate::models::session::Session;
use crate::reconstruct::builder::RawSession;
use crate::reconstruct::{dedup_sessions, reconstruct_stream, ReconstructConfig};
use crate::serialize::parse_json_file;

/// Top-level key marking a document as a previously-merged store.
pub const MAPPING_KEY: &str = "mapping";

pub fn is_merged_document(doc: &Value) -> bool {
    doc.as_object().map_or(false, |obj| obj.contains_key(MAPPING_KEY))
}

/// Parse one loaded document into its final session set.
///
/// A merged store fans out into one independent stream per original source
/// file; anything else is a single stream identified by `source`.
pub fn parse_document(doc: &Value, source: &str, config: &ReconstructConfig) -> Result<Vec<Session>> {
    let Some(obj) = doc.as_object() else {
        bail!("document {source} is not a JSON object");
    };

    let mut sessions = Vec::new();
    match obj.get(MAPPING_KEY) {
        Some(mapping) => {
            let Some(mapping) = mapping.as_object() else {
                bail!("mapping in {source} is not a JSON object");
            };
            for (name, inner) in mapping {
                let Some(inner) = inner.as_object() else {
                    bail!("stream {name} in {source} is not a JSON object");
                };
                sessions.extend(parse_stream(inner, name, config)?);
            }
        }
        None => sessions.extend(parse_stream(obj, source, config)?),
    }
    Ok(sessions)
}

/// Run one stream through reconstruction, extraction and deduplication.
fn parse_stream(
    events: &Map<String, Value>,
    source: &str,
    config: &ReconstructConfig,
) -> Result<Vec<Session>> {
    let raw = reconstruct_stream(events, source, config)?;
    let extracted: Vec<Session> = raw.into_iter().filter_map(RawSession::extract).collect();
    Ok(dedup_sessions(extracted))
}

pub fn parse_file(path: &Path, config: &ReconstructConfig) -> Result<Vec<Session>> {
    let doc = parse_json_file(path)?;
    parse_document(&doc, &path.to_string_lossy(), config)
}

/// Every session from every file, unfiltered.
pub fn all_sessions<P: AsRef<Path>>(files: &[P], config: &ReconstructConfig) -> Result<Vec<Session>> {
    let mut sessions = Vec::new();
    for file in files {
        sessions.extend(parse_file(file.as_ref(), config)?);
    }
    Ok(sessions)
}

/// Sessions passing the relevance filter: the listening history proper.
pub fn history<P: AsRef<Path>>(
    files: &[P],
    config: &ReconstructConfig,
    filter: &dyn RelevanceFilter,
) -> Result<Vec<Session>> {
    let sessions = all_sessions(files, config)?;
    Ok(sessions
        .into_iter()
        .filter(|session| filter.is_relevant(session))
        .collect())
}
