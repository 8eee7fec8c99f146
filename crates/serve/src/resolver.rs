// crates/serve/src/resolver.rs

//! Storage-agnostic slug resolution.
//!
//! A slug names an article, a category, or nothing. Resolution runs in three
//! stages against an injected [`ContentStore`]:
//!
//!   1. primary: navigation taxonomy and article-by-slug, concurrently
//!   2. category: category-by-slug, only when no article matched
//!   3. posts: the category's listing, only when a category matched
//!
//! Articles take precedence: stage 2 never starts before stage 1 has answered
//! and never starts at all once an article is found.
//!
//! Resolution is total. Failed reads degrade (empty navigation, empty
//! listing, fall-through to the next stage) and are logged; a not-found
//! outcome records whether it is a real miss or the result of failed reads.

use domain::{
    map_sort, Article, Category, LookupPolicy, LookupStage, NotFoundCause, Resolution, Slug,
    SortKey,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::queries::{
    fetch_all_categories, fetch_article, fetch_category, fetch_category_posts, Lookup,
};
use crate::store::ContentStore;

// -----------------------------------------------------------------------------
// Stages
// -----------------------------------------------------------------------------

/// Output of stage 1.
#[derive(Debug)]
pub struct Primary {
    pub categories: Vec<Category>,
    pub article: Lookup<Article>,
}

/// Stage 1: taxonomy and article lookups race each other; both are awaited.
/// A failed taxonomy read becomes an empty list.
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn primary_stage<S: ContentStore + ?Sized>(store: &S, slug: &Slug) -> Primary {
    let (categories, article) = futures::join!(
        fetch_all_categories(store),
        fetch_article(store, slug.as_str())
    );

    let categories = match categories {
        Lookup::Found(list) => list,
        Lookup::Missing => Vec::new(),
        Lookup::Failed(err) => {
            warn!(stage = %LookupStage::Categories, "navigation unavailable: {err}");
            Vec::new()
        }
    };

    Primary {
        categories,
        article,
    }
}

/// Stage 2: category-by-slug.
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn category_stage<S: ContentStore + ?Sized>(store: &S, slug: &Slug) -> Lookup<Category> {
    fetch_category(store, slug.as_str()).await
}

/// Stage 3: the category's listing. Failure or absence is an empty listing.
#[tracing::instrument(skip_all, fields(category = %category.id))]
pub async fn posts_stage<S: ContentStore + ?Sized>(
    store: &S,
    category: &Category,
    key: SortKey,
) -> Vec<Article> {
    match fetch_category_posts(store, &category.id, key).await {
        Lookup::Found(posts) => posts,
        Lookup::Missing => Vec::new(),
        Lookup::Failed(err) => {
            warn!(stage = %LookupStage::CategoryPosts, "listing unavailable: {err}");
            Vec::new()
        }
    }
}

// -----------------------------------------------------------------------------
// Pipeline
// -----------------------------------------------------------------------------

/// Resolve `slug` with the default [`LookupPolicy`].
pub async fn resolve<S: ContentStore + ?Sized>(
    store: &S,
    slug: &Slug,
    sort: Option<&str>,
) -> Resolution {
    resolve_with(store, LookupPolicy::default(), slug, sort).await
}

#[tracing::instrument(skip(store, slug), fields(slug = %slug))]
pub async fn resolve_with<S: ContentStore + ?Sized>(
    store: &S,
    policy: LookupPolicy,
    slug: &Slug,
    sort: Option<&str>,
) -> Resolution {
    let mut failed = Vec::new();

    // ------------------------------------------------------------
    // Stage 1: taxonomy + article
    // ------------------------------------------------------------
    let Primary {
        categories,
        article,
    } = primary_stage(store, slug).await;

    match article {
        Lookup::Found(article) => {
            debug!("resolved to article {}", article.id);
            return Resolution::Article {
                article: Box::new(article),
                categories,
            };
        }
        Lookup::Missing => {}
        Lookup::Failed(err) => {
            warn!(stage = %LookupStage::Article, "article lookup failed: {err}");
            failed.push(LookupStage::Article);
            if policy == LookupPolicy::Halt {
                return not_found(categories, failed);
            }
        }
    }

    // ------------------------------------------------------------
    // Stage 2: category
    // ------------------------------------------------------------
    match category_stage(store, slug).await {
        Lookup::Found(category) => {
            // ------------------------------------------------------------
            // Stage 3: category listing
            // ------------------------------------------------------------
            let key = map_sort(sort);
            let posts = posts_stage(store, &category, key).await;
            debug!(
                "resolved to category {} with {} posts",
                category.id,
                posts.len()
            );
            Resolution::Category {
                category,
                posts,
                categories,
            }
        }
        Lookup::Missing => not_found(categories, failed),
        Lookup::Failed(err) => {
            warn!(stage = %LookupStage::Category, "category lookup failed: {err}");
            failed.push(LookupStage::Category);
            not_found(categories, failed)
        }
    }
}

fn not_found(categories: Vec<Category>, failed: Vec<LookupStage>) -> Resolution {
    let cause = if failed.is_empty() {
        NotFoundCause::Missing
    } else {
        NotFoundCause::LookupFailed { stages: failed }
    };
    debug!(?cause, "slug did not resolve");
    Resolution::NotFound { categories, cause }
}

// -----------------------------------------------------------------------------
// Resolver handle
// -----------------------------------------------------------------------------

/// Shareable resolver bound to one store and policy.
pub struct Resolver<S: ?Sized> {
    store: Arc<S>,
    policy: LookupPolicy,
}

impl<S: ?Sized> Clone for Resolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: ContentStore + ?Sized> Resolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            policy: LookupPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn resolve(&self, slug: &Slug, sort: Option<&str>) -> Resolution {
        resolve_with(self.store.as_ref(), self.policy, slug, sort).await
    }
}
