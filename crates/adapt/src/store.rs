// crates/adapt/src/store.rs

//! In-memory [`ContentStore`] over a loaded document set.

use async_trait::async_trait;
use serde_json::Value as Json;
use serve::{ContentStore, Params, Query, StoreError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::{dataset, mql, Error};

/// Simple in-memory store of JSON documents indexed by `_id`.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    docs: Vec<Json>,
    by_id: HashMap<String, usize>,
}

impl MemoryContentStore {
    /// Build a store from documents that each carry a string `_id`.
    ///
    /// A later document with an `_id` already seen replaces the earlier one.
    pub fn from_documents(docs: impl IntoIterator<Item = Json>) -> Result<Self, Error> {
        let mut store = Self::default();
        for doc in docs {
            store.insert(doc)?;
        }
        Ok(store)
    }

    /// Load an NDJSON export from disk.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let docs = dataset::load_dataset(path.as_ref()).await?;
        let store = Self::from_documents(docs)?;
        debug!(documents = store.len(), "dataset loaded");
        Ok(store)
    }

    pub fn insert(&mut self, doc: Json) -> Result<(), Error> {
        let id = doc
            .get("_id")
            .and_then(Json::as_str)
            .ok_or_else(|| Error::document("missing string _id"))?
            .to_string();

        match self.by_id.get(&id) {
            Some(&idx) => {
                warn!(%id, "duplicate document id, keeping the later one");
                self.docs[idx] = doc;
            }
            None => {
                self.by_id.insert(id, self.docs.len());
                self.docs.push(doc);
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Json> {
        self.by_id.get(id).and_then(|&idx| self.docs.get(idx))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Synchronous query entry point shared by the trait impl and the CLI.
    pub fn query(&self, query: &Query, params: &Params) -> Result<Json, Error> {
        mql::execute(&self.docs, |id| self.get(id), query, params)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn fetch(&self, query: &Query, params: &Params) -> Result<Json, StoreError> {
        self.query(query, params).map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serve::store::params;
    use std::io::Write;

    fn docs() -> Vec<Json> {
        vec![
            json!({ "_id": "cat-1", "_type": "category", "title": "Crime", "slug": { "current": "crime-news" } }),
            json!({ "_id": "p1", "_type": "post", "title": "A", "categories": [{ "_ref": "cat-1" }] }),
        ]
    }

    #[test]
    fn from_documents_indexes_by_id() {
        let store = MemoryContentStore::from_documents(docs()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("p1").unwrap()["title"], "A");
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn documents_need_an_id() {
        let err = MemoryContentStore::from_documents([json!({ "_type": "post" })]).unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[test]
    fn duplicate_id_replaces_in_place() {
        let mut all = docs();
        all.push(json!({ "_id": "p1", "_type": "post", "title": "B" }));
        let store = MemoryContentStore::from_documents(all).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("p1").unwrap()["title"], "B");
    }

    #[tokio::test]
    async fn fetch_runs_query_through_the_port() {
        let store = MemoryContentStore::from_documents(docs()).unwrap();
        let q = Query::many(json!({ "_type": "post", "$references": "$cat" })).expand(["categories"]);

        let res = store.fetch(&q, &params([("cat", "cat-1")])).await.unwrap();
        assert_eq!(res[0]["categories"][0]["title"], "Crime");
    }

    #[tokio::test]
    async fn bad_query_maps_to_query_error() {
        let store = MemoryContentStore::from_documents(docs()).unwrap();
        let q = Query::one(json!({ "slug.current": "$slug" }));

        let err = store.fetch(&q, &Params::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn load_reads_ndjson_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for doc in docs() {
            writeln!(file, "{doc}").unwrap();
        }

        let store = MemoryContentStore::load(file.path()).await.unwrap();
        assert_eq!(store.len(), 2);
    }
}
