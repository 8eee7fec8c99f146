// crates/edge/src/router.rs

use axum::{
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use domain::{setting::SiteSettings, NotFoundCause, Resolution, Slug};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;
use serve::{
    meta::{page_meta, PageMeta},
    queries::fetch_all_categories,
    ContentStore, Lookup, Resolver,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared per-request state.
#[derive(Clone)]
pub struct AppState {
    resolver: Resolver<dyn ContentStore>,
    site: Arc<SiteSettings>,
}

impl AppState {
    pub fn new(resolver: Resolver<dyn ContentStore>, site: SiteSettings) -> Self {
        Self {
            resolver,
            site: Arc::new(site),
        }
    }
}

/// Response body for a slug page.
#[derive(Debug, Serialize)]
pub struct Page {
    pub resolution: Resolution,
    pub meta: PageMeta,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router construction
// ─────────────────────────────────────────────────────────────────────────────

/// Static routes win over `/{slug}`, so `healthz` and `categories` are
/// reserved slugs.
pub fn build_app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/categories", get(categories))
        .route("/{slug}", get(resolve_slug))
        .with_state(state)
}

/// HTTP status for a resolved page.
pub fn status_for(resolution: &Resolution) -> StatusCode {
    match resolution {
        Resolution::Article { .. } | Resolution::Category { .. } => StatusCode::OK,
        Resolution::NotFound {
            cause: NotFoundCause::Missing,
            ..
        } => StatusCode::NOT_FOUND,
        Resolution::NotFound {
            cause: NotFoundCause::LookupFailed { .. },
            ..
        } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// The `sort` parameter of a raw query string, if present.
pub fn sort_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "sort")
        .map(|(_, v)| v.into_owned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn healthz() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn categories(State(state): State<AppState>) -> Response {
    match fetch_all_categories(state.resolver.store()).await {
        Lookup::Found(categories) => Json(categories).into_response(),
        Lookup::Missing => Json(json!([])).into_response(),
        Lookup::Failed(err) => {
            warn!("taxonomy read failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "taxonomy unavailable" })),
            )
                .into_response()
        }
    }
}

async fn resolve_slug(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let slug = match Slug::new(raw.as_str()) {
        Ok(slug) => slug,
        Err(err) => {
            debug!(%raw, "rejected slug: {}", err);
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    let sort = query.as_deref().and_then(sort_param);
    let resolution = state.resolver.resolve(&slug, sort.as_deref()).await;
    let meta = page_meta(&state.site, &resolution);

    debug!(%slug, tag = resolution.tag(), "slug resolved");
    (status_for(&resolution), Json(Page { resolution, meta })).into_response()
}
