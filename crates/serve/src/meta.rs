// crates/serve/src/meta.rs

//! Page metadata for a resolved slug: title, description, canonical URL,
//! robots directive and schema.org JSON-LD.

use domain::{setting::SiteSettings, Article, Category, Resolution};
use serde::Serialize;
use serde_json::{json, Value as Json};

/// Longest description emitted; longer excerpts are cut at a word boundary.
const DESCRIPTION_MAX: usize = 160;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    pub robots: &'static str,
    pub json_ld: Vec<Json>,
}

#[tracing::instrument(skip_all, fields(tag = resolution.tag()))]
pub fn page_meta(site: &SiteSettings, resolution: &Resolution) -> PageMeta {
    match resolution {
        Resolution::Article { article, .. } => article_meta(site, article),
        Resolution::Category {
            category, posts, ..
        } => category_meta(site, category, posts),
        Resolution::NotFound { .. } => PageMeta {
            title: format!("Page not found | {}", site.name),
            description: None,
            canonical_url: None,
            robots: "noindex, nofollow",
            json_ld: Vec::new(),
        },
    }
}

fn article_meta(site: &SiteSettings, article: &Article) -> PageMeta {
    let url = site.url_for(article.slug.as_str());
    let description = article.excerpt().map(|text| truncate_words(&text, DESCRIPTION_MAX));

    let mut news = json!({
        "@context": "https://schema.org",
        "@type": "NewsArticle",
        "headline": article.title,
        "url": url,
        "mainEntityOfPage": { "@type": "WebPage", "@id": url },
        "datePublished": article.published_at.to_rfc3339(),
        "dateModified": article.modified_at().to_rfc3339(),
        "publisher": { "@type": "Organization", "name": site.name, "url": site.url_for("") },
    });

    if let Some(author) = &article.author {
        let mut person = json!({ "@type": "Person", "name": author.name });
        if let Some(slug) = &author.slug {
            person["url"] = json!(site.url_for(&format!("author/{}", slug.as_str())));
        }
        news["author"] = person;
    }
    if let Some(image) = &article.hero_image {
        news["image"] = json!([image.url]);
    }
    if let Some(section) = article.categories.first() {
        news["articleSection"] = json!(section.title);
    }
    if !article.tags.is_empty() {
        let keywords: Vec<&str> = article.tags.iter().map(|t| t.title.as_str()).collect();
        news["keywords"] = json!(keywords.join(", "));
    }
    if let Some(desc) = &description {
        news["description"] = json!(desc);
    }

    let mut crumbs = vec![(site.name.as_str(), site.url_for(""))];
    if let Some(section) = article.categories.first() {
        crumbs.push((section.title.as_str(), site.url_for(section.slug.as_str())));
    }
    crumbs.push((article.title.as_str(), url.clone()));

    PageMeta {
        title: format!("{} | {}", article.title, site.name),
        description,
        canonical_url: Some(url),
        robots: "index, follow",
        json_ld: vec![news, breadcrumbs(&crumbs)],
    }
}

fn category_meta(site: &SiteSettings, category: &Category, posts: &[Article]) -> PageMeta {
    let url = site.url_for(category.slug.as_str());

    let items: Vec<Json> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "url": site.url_for(post.slug.as_str()),
                "name": post.title,
            })
        })
        .collect();

    let mut page = json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": category.title,
        "url": url,
        "mainEntity": { "@type": "ItemList", "itemListElement": items },
    });
    if let Some(desc) = &category.description {
        page["description"] = json!(desc);
    }

    let crumbs = [
        (site.name.as_str(), site.url_for("")),
        (category.title.as_str(), url.clone()),
    ];

    PageMeta {
        title: format!("{} | {}", category.title, site.name),
        description: category
            .description
            .as_deref()
            .map(|d| truncate_words(d, DESCRIPTION_MAX)),
        canonical_url: Some(url),
        robots: "index, follow",
        json_ld: vec![page, breadcrumbs(&crumbs)],
    }
}

fn breadcrumbs(crumbs: &[(&str, String)]) -> Json {
    let items: Vec<Json> = crumbs
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            json!({ "@type": "ListItem", "position": i + 1, "name": name, "item": url })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}

/// Cut `text` to at most `max` chars on a word boundary, adding an ellipsis.
fn truncate_words(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}
