// crates/adapt/src/dataset.rs

//! NDJSON dataset exports: one JSON document per line.

use serde_json::Value as Json;
use std::path::Path;
use tracing::debug;

use crate::Error;

const DRAFT_PREFIX: &str = "drafts.";

/// Read and parse an NDJSON export.
pub async fn load_dataset(path: &Path) -> Result<Vec<Json>, Error> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_dataset(&text)
}

/// Parse NDJSON text.
///
/// Blank lines are ignored. Every document must be an object with string
/// `_id` and `_type`; drafts are dropped. Errors carry the 1-based line.
pub fn parse_dataset(text: &str) -> Result<Vec<Json>, Error> {
    let mut docs = Vec::new();
    let mut drafts = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let doc = parse_line(line).map_err(|e| Error::at_line(idx + 1, e))?;
        if is_draft(&doc) {
            drafts += 1;
            continue;
        }
        docs.push(doc);
    }

    debug!(documents = docs.len(), drafts, "dataset parsed");
    Ok(docs)
}

fn parse_line(line: &str) -> Result<Json, Error> {
    let doc: Json = serde_json::from_str(line)?;

    if !doc.is_object() {
        return Err(Error::document("expected a JSON object"));
    }
    for key in ["_id", "_type"] {
        match doc.get(key).and_then(Json::as_str) {
            Some(s) if !s.is_empty() => {}
            _ => return Err(Error::document(format!("missing string {key}"))),
        }
    }
    Ok(doc)
}

fn is_draft(doc: &Json) -> bool {
    doc.get("_id")
        .and_then(Json::as_str)
        .is_some_and(|id| id.starts_with(DRAFT_PREFIX))
}
