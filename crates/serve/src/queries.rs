// crates/serve/src/queries.rs

//! The four content-store reads behind slug resolution.
//!
//! Each helper answers a [`Lookup`] so callers can tell a miss from a failed
//! read. Collections drop documents that do not decode and keep the rest.

use domain::{Article, Category, SortKey};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as Json};
use tracing::warn;

use crate::store::{params, ContentStore, Query, StoreError};

/// Listing size for a category page.
pub const PAGE_SIZE: usize = 12;

/// Reference fields of a `post` that are dereferenced on read.
pub const ARTICLE_REFS: [&str; 5] = [
    "author",
    "categories",
    "tags",
    "series.series",
    "relatedArticles",
];

/// Result of a single read.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    Missing,
    Failed(StoreError),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Lookup::Failed(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

pub fn all_categories_query() -> Query {
    Query::many(json!({ "_type": "category" })).sort_by("title", 1)
}

pub fn article_by_slug_query() -> Query {
    Query::one(json!({ "_type": "post", "slug.current": "$slug" })).expand(ARTICLE_REFS)
}

pub fn category_by_slug_query() -> Query {
    Query::one(json!({ "_type": "category", "slug.current": "$slug" }))
}

pub fn category_posts_query(key: SortKey) -> Query {
    Query::many(json!({ "_type": "post", "$references": "$categoryId" }))
        .expand(ARTICLE_REFS)
        .sort_by(key.field.path(), key.direction.signum())
        .limit(PAGE_SIZE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Fetch helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Single-document answer: `null` is a miss.
fn decode_one<T: DeserializeOwned>(res: Result<Json, StoreError>) -> Lookup<T> {
    match res {
        Ok(Json::Null) => Lookup::Missing,
        Ok(v) => match serde_json::from_value(v) {
            Ok(doc) => Lookup::Found(doc),
            Err(e) => Lookup::Failed(e.into()),
        },
        Err(e) => Lookup::Failed(e),
    }
}

/// Collection answer: `null` and `[]` are both an empty (found) list.
///
/// Elements are decoded one by one; an undecodable document is logged and
/// skipped.
fn decode_many<T: DeserializeOwned>(res: Result<Json, StoreError>) -> Lookup<Vec<T>> {
    match res {
        Ok(Json::Null) => Lookup::Found(Vec::new()),
        Ok(Json::Array(items)) => {
            let docs = items
                .into_iter()
                .filter_map(|item| {
                    let id = item.get("_id").and_then(Json::as_str).map(str::to_owned);
                    match serde_json::from_value(item) {
                        Ok(doc) => Some(doc),
                        Err(e) => {
                            warn!(id = id.as_deref().unwrap_or("?"), "skipping document: {}", e);
                            None
                        }
                    }
                })
                .collect();
            Lookup::Found(docs)
        }
        Ok(other) => Lookup::Failed(StoreError::query(format!(
            "expected an array, got {}",
            json_kind(&other)
        ))),
        Err(e) => Lookup::Failed(e),
    }
}

fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[tracing::instrument(skip_all)]
pub async fn fetch_all_categories<S: ContentStore + ?Sized>(store: &S) -> Lookup<Vec<Category>> {
    let res = store
        .fetch(&all_categories_query(), &Default::default())
        .await;
    decode_many(res)
}

#[tracing::instrument(skip(store))]
pub async fn fetch_article<S: ContentStore + ?Sized>(store: &S, slug: &str) -> Lookup<Article> {
    let res = store
        .fetch(&article_by_slug_query(), &params([("slug", slug)]))
        .await;
    decode_one(res)
}

#[tracing::instrument(skip(store))]
pub async fn fetch_category<S: ContentStore + ?Sized>(store: &S, slug: &str) -> Lookup<Category> {
    let res = store
        .fetch(&category_by_slug_query(), &params([("slug", slug)]))
        .await;
    decode_one(res)
}

#[tracing::instrument(skip(store))]
pub async fn fetch_category_posts<S: ContentStore + ?Sized>(
    store: &S,
    category_id: &str,
    key: SortKey,
) -> Lookup<Vec<Article>> {
    let res = store
        .fetch(
            &category_posts_query(key),
            &params([("categoryId", category_id)]),
        )
        .await;
    decode_many(res)
}
