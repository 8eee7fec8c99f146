// crates/domain/src/content.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Slug
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,

    #[error("slug contains a path separator: {0}")]
    PathSeparator(String),
}

/// URL path identifier for one document.
///
/// Stored the way the content store keeps it (`{ "current": "..." }`).
/// Article and category slugs share one namespace. Decoding applies the
/// same checks as [`Slug::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Slug {
    current: String,
}

impl Slug {
    pub fn new(raw: impl Into<String>) -> Result<Self, SlugError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SlugError::Empty);
        }
        if trimmed.contains('/') {
            return Err(SlugError::PathSeparator(raw));
        }
        Ok(Self {
            current: trimmed.to_owned(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> &str {
        &self.current
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.current)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Stored {
            current: String,
        }

        let stored = Stored::deserialize(deserializer)?;
        Slug::new(stored.current).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for Slug {
    type Error = SlugError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Slug::new(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Taxonomy
// ─────────────────────────────────────────────────────────────────────────────

/// Navigation entry and resolvable page target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
}

// ─────────────────────────────────────────────────────────────────────────────
// People & media
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Articles
// ─────────────────────────────────────────────────────────────────────────────

/// The series an article belongs to, once dereferenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMembership {
    pub series: SeriesRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<u32>,
    #[serde(default)]
    pub is_finale: bool,
    #[serde(default)]
    pub is_prequel: bool,
}

/// Short form used for related-article links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<Image>,
}

/// A `post` document with its references dereferenced.
///
/// `body` keeps the rich-text blocks as they come from the store; each block
/// carries its own `_type` and is rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    pub published_at: DateTime<Utc>,
    #[serde(
        rename = "_updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Json>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breaking_news: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<SeriesMembership>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_articles: Vec<ArticleSummary>,
}

impl Article {
    /// Last-modified timestamp, falling back to the publish date.
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.published_at)
    }

    /// First paragraph of plain text in the body, if any.
    pub fn excerpt(&self) -> Option<String> {
        self.body.iter().find_map(block_text)
    }
}

/// Concatenate the span texts of a portable-text `block`.
fn block_text(block: &Json) -> Option<String> {
    if block.get("_type").and_then(Json::as_str) != Some("block") {
        return None;
    }
    let text: String = block
        .get("children")?
        .as_array()?
        .iter()
        .filter_map(|span| span.get("text").and_then(Json::as_str))
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Stores return `null` for projected fields that were never set.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
