// crates/serve/src/store.rs

//! Content-store port.
//!
//! The resolver never talks to storage directly. Whatever holds the documents
//! (an in-memory dataset, a remote headless CMS) implements [`ContentStore`]
//! and is handed to the resolver at startup.
//!
//! Contract:
//!   - `Cardinality::One` answers a document or `null` on miss
//!   - `Cardinality::Many` answers an array, `[]` on miss
//!   - transport problems are `Err`, never an empty answer

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Error Type
// -----------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn transport(msg: impl Into<String>) -> Self {
        StoreError::Transport(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        StoreError::Query(msg.into())
    }
}

// -----------------------------------------------------------------------------
// Query
// -----------------------------------------------------------------------------

/// Named values bound into `$name` placeholders of a query filter.
pub type Params = BTreeMap<String, Json>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    One,
    Many,
}

/// A parameterized document query.
///
/// `filter` is a Mongo-style JSON filter. A string value of the exact form
/// `"$name"` is a placeholder for `params["name"]`. `expand` lists dotted
/// paths whose `{ "_ref": id }` values are replaced by the referenced
/// document before sorting. `sort` entries are `(path, 1 | -1)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub filter: Json,
    pub expand: Vec<String>,
    pub sort: Vec<(String, i8)>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub cardinality: Cardinality,
}

impl Query {
    pub fn one(filter: Json) -> Self {
        Self::new(filter, Cardinality::One)
    }

    pub fn many(filter: Json) -> Self {
        Self::new(filter, Cardinality::Many)
    }

    fn new(filter: Json, cardinality: Cardinality) -> Self {
        Self {
            filter,
            expand: Vec::new(),
            sort: Vec::new(),
            limit: None,
            skip: None,
            cardinality,
        }
    }

    pub fn expand<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn sort_by(mut self, path: impl Into<String>, dir: i8) -> Self {
        self.sort.push((path.into(), dir));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// The `_type` the filter pins, if it pins exactly one.
    pub fn document_type(&self) -> Option<&str> {
        self.filter.get("_type").and_then(Json::as_str)
    }
}

/// Build a [`Params`] map from `(name, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Json>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// -----------------------------------------------------------------------------
// Port
// -----------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Execute `query` with `params` bound.
    async fn fetch(&self, query: &Query, params: &Params) -> Result<Json, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_options() {
        let q = Query::many(json!({ "_type": "post" }))
            .expand(["author", "categories"])
            .sort_by("title", 1)
            .skip(2)
            .limit(12);

        assert_eq!(q.cardinality, Cardinality::Many);
        assert_eq!(q.expand, vec!["author".to_string(), "categories".to_string()]);
        assert_eq!(q.sort, vec![("title".to_string(), 1)]);
        assert_eq!(q.skip, Some(2));
        assert_eq!(q.limit, Some(12));
        assert_eq!(q.document_type(), Some("post"));
    }

    #[test]
    fn document_type_absent_when_not_pinned() {
        let q = Query::one(json!({ "_type": { "$in": ["post", "video"] } }));
        assert_eq!(q.document_type(), None);
    }

    #[test]
    fn params_helper_converts_values() {
        let p = params([("slug", json!("crime-news")), ("limit", json!(12))]);
        assert_eq!(p.get("slug"), Some(&json!("crime-news")));
        assert_eq!(p.len(), 2);
    }
}
