// crates/domain/src/outcome.rs

use serde::{Deserialize, Serialize};

use crate::content::{Article, Category};

/// One of the four content-store reads made while resolving a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupStage {
    Categories,
    Article,
    Category,
    CategoryPosts,
}

impl std::fmt::Display for LookupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LookupStage::Categories => "categories",
            LookupStage::Article => "article",
            LookupStage::Category => "category",
            LookupStage::CategoryPosts => "categoryPosts",
        };
        f.write_str(name)
    }
}

/// Why a slug resolved to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NotFoundCause {
    /// Every lookup answered and none matched.
    Missing,

    /// At least one article/category lookup could not be answered, so the
    /// slug may exist.
    LookupFailed { stages: Vec<LookupStage> },
}

/// What a slug refers to, with the data needed to render that page.
///
/// `categories` is the navigation taxonomy and is present on every variant;
/// it is empty when the taxonomy could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
pub enum Resolution {
    Article {
        article: Box<Article>,
        categories: Vec<Category>,
    },
    Category {
        category: Category,
        posts: Vec<Article>,
        categories: Vec<Category>,
    },
    NotFound {
        categories: Vec<Category>,
        cause: NotFoundCause,
    },
}

impl Resolution {
    pub fn tag(&self) -> &'static str {
        match self {
            Resolution::Article { .. } => "article",
            Resolution::Category { .. } => "category",
            Resolution::NotFound { .. } => "notFound",
        }
    }

    pub fn categories(&self) -> &[Category] {
        match self {
            Resolution::Article { categories, .. }
            | Resolution::Category { categories, .. }
            | Resolution::NotFound { categories, .. } => categories,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound { .. })
    }

    pub fn article(&self) -> Option<&Article> {
        match self {
            Resolution::Article { article, .. } => Some(article),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&Category> {
        match self {
            Resolution::Category { category, .. } => Some(category),
            _ => None,
        }
    }
}
