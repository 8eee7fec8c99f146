use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};
use url::{Host, Url};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds to
    pub ip: IpAddr,

    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

/// What the resolver does when an article or category lookup fails
/// (as opposed to answering "no such document").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Keep going: a failed article lookup still tries the category.
    #[default]
    FallThrough,

    /// Stop at the first failed lookup and report it.
    Halt,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentSettings {
    /// NDJSON dataset export, relative to the site directory.
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,

    #[serde(default)]
    pub policy: LookupPolicy,
}

fn default_dataset() -> PathBuf {
    PathBuf::from("./dataset.ndjson")
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            policy: LookupPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    pub base_url: String,
    pub name: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".into(),
            name: "newsdesk".into(),
        }
    }
}

/// Longest site name that still fits a `"{title} | {name}"` page title.
const SITE_NAME_MAX: usize = 60;

impl SiteSettings {
    /// Absolute URL for a site-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Checks the values that end up in canonical links and page titles.
    pub fn validate(&self) -> Result<(), String> {
        canonical_base(&self.base_url)?;
        title_suffix(&self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub content: ContentSettings,
    #[serde(default)]
    pub site: SiteSettings,
}

impl Settings {
    #[tracing::instrument(skip_all)]
    pub fn validate(&self) -> Result<(), String> {
        self.site.validate()
    }
}

/// `url_for` appends page paths to the base, so it has to be a bare
/// http(s) origin (plus optional path) that is safe to publish.
fn canonical_base(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("site.base_url {raw:?}: {e}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "site.base_url {raw:?}: canonical links need http or https"
        ));
    }

    let routable = match url.host() {
        Some(Host::Domain(name)) => name == "localhost" || name.contains('.'),
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        None => false,
    };
    if !routable {
        return Err(format!("site.base_url {raw:?}: host is not routable"));
    }

    // Credentials would be copied into every canonical link and JSON-LD block.
    if !url.username().is_empty() || url.password().is_some() {
        return Err(format!("site.base_url {raw:?}: credentials are not allowed"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!(
            "site.base_url {raw:?}: page paths cannot follow a query or fragment"
        ));
    }

    Ok(url)
}

/// The site name is the suffix of every `<title>` and the JSON-LD publisher.
fn title_suffix(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("site.name is empty".into());
    }
    if name.chars().any(char::is_control) {
        return Err("site.name contains control characters".into());
    }
    if name.chars().count() > SITE_NAME_MAX {
        return Err(format!("site.name is longer than {SITE_NAME_MAX} characters"));
    }
    Ok(())
}
