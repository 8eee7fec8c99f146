// End-to-end slug resolution over the fixture dataset.

use adapt::MemoryContentStore;
use domain::{LookupPolicy, NotFoundCause, Resolution, Slug};
use serve::{resolve, Resolver, PAGE_SIZE};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dataset.ndjson")
}

async fn store() -> MemoryContentStore {
    MemoryContentStore::load(fixture())
        .await
        .expect("fixture dataset loads")
}

fn slug(s: &str) -> Slug {
    Slug::new(s).unwrap()
}

fn titles(res: &Resolution) -> Vec<String> {
    match res {
        Resolution::Category { posts, .. } => posts.iter().map(|p| p.title.clone()).collect(),
        other => panic!("expected a category outcome, got {}", other.tag()),
    }
}

#[tokio::test]
async fn article_slug_resolves_to_dereferenced_article() {
    let store = store().await;
    let res = resolve(&store, &slug("tommy-robinson-verdict"), None).await;

    assert_eq!(res.tag(), "article");
    let article = res.article().expect("article outcome");
    assert_eq!(article.slug.current(), "tommy-robinson-verdict");
    assert_eq!(article.author.as_ref().unwrap().name, "Jane Reporter");
    assert_eq!(article.categories[0].title, "Crime");
    assert_eq!(article.tags[0].title, "Courts");
    assert_eq!(article.series.as_ref().unwrap().series.title, "The Trial");
    assert_eq!(article.related_articles[0].slug.as_str(), "appeal-hearing-set");
    assert!(article.breaking_news);

    let nav: Vec<&str> = res.categories().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(nav, vec!["Crime", "Elections", "Politics", "Sport"]);
}

#[tokio::test]
async fn category_slug_lists_posts_sorted_by_title() {
    let store = store().await;
    let res = resolve(&store, &slug("crime-news"), Some("title_asc")).await;

    assert_eq!(res.tag(), "category");
    assert_eq!(res.category().unwrap().title, "Crime");

    let listed = titles(&res);
    assert_eq!(listed.len(), PAGE_SIZE);
    let mut sorted = listed.clone();
    sorted.sort();
    assert_eq!(listed, sorted);
    assert_eq!(listed[0], "Appeal hearing set for spring");
    assert!(!listed.iter().any(|t| t.starts_with("Youth") || t.starts_with("Zero")));
}

#[tokio::test]
async fn default_listing_is_newest_first_without_drafts() {
    let store = store().await;
    let res = resolve(&store, &slug("crime-news"), None).await;

    let listed = titles(&res);
    assert_eq!(listed[0], "Tommy Robinson verdict delivered");
    assert_eq!(listed[1], "Zero tolerance policy criticised");
    assert!(!listed.iter().any(|t| t.starts_with("DRAFT")));

    if let Resolution::Category { posts, .. } = &res {
        assert!(posts
            .windows(2)
            .all(|w| w[0].published_at >= w[1].published_at));
    }
}

#[tokio::test]
async fn unknown_sort_value_falls_back_to_newest_first() {
    let store = store().await;
    let fallback = titles(&resolve(&store, &slug("crime-news"), Some("popularity")).await);
    let default = titles(&resolve(&store, &slug("crime-news"), None).await);
    assert_eq!(fallback, default);
}

#[tokio::test]
async fn author_sort_uses_dereferenced_names() {
    let store = store().await;
    let res = resolve(&store, &slug("crime-news"), Some("author_asc")).await;

    if let Resolution::Category { posts, .. } = &res {
        let names: Vec<&str> = posts
            .iter()
            .map(|p| p.author.as_ref().unwrap().name.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "Amir Khan");
    } else {
        panic!("expected a category outcome");
    }
}

#[tokio::test]
async fn unknown_slug_is_not_found_with_full_taxonomy() {
    let store = store().await;
    let res = resolve(&store, &slug("does-not-exist-anywhere"), None).await;

    assert_eq!(res.tag(), "notFound");
    assert_eq!(res.categories().len(), 4);
    assert!(matches!(
        res,
        Resolution::NotFound {
            cause: NotFoundCause::Missing,
            ..
        }
    ));
}

#[tokio::test]
async fn article_wins_when_slug_is_shared_with_a_category() {
    let store = store().await;
    let res = resolve(&store, &slug("elections"), Some("title_asc")).await;

    assert_eq!(res.tag(), "article");
    assert_eq!(res.article().unwrap().title, "Elections: what to expect");
}

#[tokio::test]
async fn draft_only_slug_is_not_found() {
    let store = store().await;
    let res = resolve(&store, &slug("draft-only-verdict"), None).await;
    assert_eq!(res.tag(), "notFound");
}

#[tokio::test]
async fn shared_resolver_serves_concurrent_requests() {
    let resolver = Resolver::new(Arc::new(store().await)).with_policy(LookupPolicy::Halt);

    let (verdict, sport, nowhere) = (
        slug("tommy-robinson-verdict"),
        slug("sport"),
        slug("nowhere"),
    );

    let (a, b, c) = tokio::join!(
        resolver.resolve(&verdict, None),
        resolver.resolve(&sport, None),
        resolver.resolve(&nowhere, None),
    );

    assert_eq!(a.tag(), "article");
    assert_eq!(b.tag(), "category");
    assert_eq!(titles(&b), vec!["Cup final preview".to_string()]);
    assert_eq!(c.tag(), "notFound");
}
