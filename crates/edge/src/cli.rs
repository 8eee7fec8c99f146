// crates/edge/src/cli.rs

use crate::{
    router::{build_app_router, AppState, Page},
    Error,
};
use adapt::MemoryContentStore;
use axum::Router;
use chrono::{DateTime, Utc};
use clap::{builder::ValueHint, Args, Parser, Subcommand};
use domain::{Settings, Slug};
use serve::{meta::page_meta, ContentStore, Resolver};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub type Result<T> = std::result::Result<T, Error>;

/// Newsdesk CLI: edge layer
#[tokio::main(flavor = "multi_thread")]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(start) => do_start(start).await,
        Commands::Resolve(resolve) => do_resolve(resolve).await,
    };

    result.map_or_else(
        |e| {
            error!("newsdesk failed: {}", e);
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

fn elapsed_ms(then: DateTime<Utc>) -> i64 {
    Utc::now().timestamp_millis() - then.timestamp_millis()
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> Result<()> {
    // parse settings file -> does the settings file exist?  If yes, parse it
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start.site.dir)?;
    info!("Settings parsed in {} milliseconds", elapsed_ms(then));

    // load the dataset export into the content store
    let then = Utc::now();
    let process = process.load_content().await?;
    info!("Content loaded in {} milliseconds", elapsed_ms(then));

    // register routes
    let then = Utc::now();
    let process = process.register_routes();
    info!("Routes registered in {} milliseconds", elapsed_ms(then));

    // bind the listener
    let then = Utc::now();
    let process = process.start_server().await?;
    info!("Server started in {} milliseconds", elapsed_ms(then));

    process.serve_until_shutdown().await
}

#[tracing::instrument(skip_all)]
async fn do_resolve(cmd: ResolveCmd) -> Result<()> {
    let slug = Slug::new(cmd.slug).map_err(|e| Error::Config(format!("invalid slug: {e}")))?;

    let process = StartProcess::<CommandIssued>::parse_settings_file(cmd.site.dir)?
        .load_content()
        .await?;
    let page = process.resolve_once(&slug, cmd.sort.as_deref()).await;

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "newsdesk", version, about = "Newsdesk slug resolution service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the site in the specified directory over HTTP
    Start(StartCmd),

    /// Resolve one slug and print the outcome as JSON
    Resolve(ResolveCmd),
}

#[derive(Args, Debug)]
pub struct SiteDir {
    /// Site directory holding settings.toml (or set NEWSDESK_DIR)
    ///
    /// Must exist and be a directory.
    #[arg(
        value_name = "DIR",
        env = "NEWSDESK_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct StartCmd {
    #[command(flatten)]
    pub site: SiteDir,
}

#[derive(Args, Debug)]
pub struct ResolveCmd {
    #[command(flatten)]
    pub site: SiteDir,

    /// Slug to resolve
    #[arg(value_name = "SLUG")]
    pub slug: String,

    /// Listing order for category pages (e.g. title_asc)
    #[arg(long)]
    pub sort: Option<String>,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

/// Load and validate `<dir>/settings.toml`.
#[tracing::instrument(skip_all)]
pub fn read_settings(dir: &Path) -> Result<Settings> {
    let path = dir.join("settings.toml");

    if !path.exists() {
        return Err(Error::Config(format!(
            "settings.toml not found at {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|err| Error::Config(format!("Failed reading {}: {}", path.display(), err)))?;

    let settings: Settings = toml::from_str(&text).map_err(|err| {
        Error::Config(format!(
            "Invalid settings.toml at {}: {}",
            path.display(),
            err
        ))
    })?;

    settings
        .validate()
        .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))?;

    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    dir: PathBuf,
    settings: Settings,
}

struct ContentLoaded {
    settings: Settings,
    resolver: Resolver<dyn ContentStore>,
}

struct RouterCreated {
    settings: Settings,
    router: Router,
}

struct ServerStarted {
    listener: TcpListener,
    router: Router,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for ContentLoaded {}
impl ProcessState for RouterCreated {}
impl ProcessState for ServerStarted {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(dir: PathBuf) -> Result<StartProcess<SettingsLoaded>> {
        let settings = read_settings(&dir)?;
        Ok(StartProcess {
            state: SettingsLoaded { dir, settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    async fn load_content(self) -> Result<StartProcess<ContentLoaded>> {
        let path = self.state.dir.join(&self.state.settings.content.dataset);

        let store = MemoryContentStore::load(&path)
            .await
            .map_err(|source| Error::Dataset {
                path: path.clone(),
                source,
            })?;
        debug!("Document count: {}", store.len());

        let store: Arc<dyn ContentStore> = Arc::new(store);
        let resolver = Resolver::new(store).with_policy(self.state.settings.content.policy);

        Ok(StartProcess {
            state: ContentLoaded {
                settings: self.state.settings,
                resolver,
            },
        })
    }
}

impl StartProcess<ContentLoaded> {
    #[tracing::instrument(skip_all)]
    fn register_routes(self) -> StartProcess<RouterCreated> {
        let state = AppState::new(self.state.resolver, self.state.settings.site.clone());
        StartProcess {
            state: RouterCreated {
                settings: self.state.settings,
                router: build_app_router(state),
            },
        }
    }

    async fn resolve_once(&self, slug: &Slug, sort: Option<&str>) -> Page {
        let resolution = self.state.resolver.resolve(slug, sort).await;
        let meta = page_meta(&self.state.settings.site, &resolution);
        Page { resolution, meta }
    }
}

impl StartProcess<RouterCreated> {
    #[tracing::instrument(skip_all)]
    async fn start_server(self) -> Result<StartProcess<ServerStarted>> {
        let server = &self.state.settings.server;
        let addr = SocketAddr::new(server.ip, server.port);

        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        Ok(StartProcess {
            state: ServerStarted {
                listener,
                router: self.state.router,
            },
        })
    }
}

impl StartProcess<ServerStarted> {
    #[tracing::instrument(skip_all)]
    async fn serve_until_shutdown(self) -> Result<()> {
        axum::serve(self.state.listener, self.state.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            // no handler: run until killed
            error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::LookupPolicy;
    use std::fs;
    use tempfile::tempdir;

    const DATASET: &str = concat!(
        r#"{"_id":"cat-1","_type":"category","title":"Crime","slug":{"current":"crime-news"}}"#,
        "\n",
        r#"{"_id":"p1","_type":"post","title":"Verdict","slug":{"current":"verdict"},"publishedAt":"2024-04-20T09:00:00Z","categories":[{"_ref":"cat-1"}]}"#,
        "\n"
    );

    fn site_dir(settings: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.toml"), settings).unwrap();
        dir
    }

    #[test]
    fn dir_must_exist_checks_kind() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(dir_must_exist(dir.path().to_str().unwrap()).is_ok());
        assert!(dir_must_exist(file.to_str().unwrap())
            .unwrap_err()
            .starts_with("Not a directory"));
        assert!(dir_must_exist("/definitely/not/here")
            .unwrap_err()
            .starts_with("Not found"));
    }

    #[test]
    fn cli_parses_resolve_command() {
        let dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "newsdesk",
            "resolve",
            dir.path().to_str().unwrap(),
            "crime-news",
            "--sort",
            "title_asc",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve(cmd) => {
                assert_eq!(cmd.site.dir, dir.path());
                assert_eq!(cmd.slug, "crime-news");
                assert_eq!(cmd.sort.as_deref(), Some("title_asc"));
            }
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn read_settings_requires_the_file() {
        let dir = tempdir().unwrap();
        let err = read_settings(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("not found")));
    }

    #[test]
    fn read_settings_rejects_bad_toml_and_bad_values() {
        let dir = site_dir("[server\nport = 1");
        assert!(matches!(read_settings(dir.path()), Err(Error::Config(_))));

        let dir = site_dir("[site]\nbase_url = \"ftp://example.news\"\nname = \"x\"\n");
        let err = read_settings(dir.path()).unwrap_err();
        assert!(err.to_string().contains("canonical links need http or https"));
    }

    #[test]
    fn read_settings_applies_defaults() {
        let dir = site_dir("[content]\npolicy = \"halt\"\n");
        let settings = read_settings(dir.path()).unwrap();
        assert_eq!(settings.content.policy, LookupPolicy::Halt);
        assert_eq!(settings.server.port, 8080);
    }

    #[tokio::test]
    async fn load_content_resolves_against_the_dataset() {
        let dir = site_dir("[content]\ndataset = \"export.ndjson\"\n");
        fs::write(dir.path().join("export.ndjson"), DATASET).unwrap();

        let process = StartProcess::<CommandIssued>::parse_settings_file(dir.path().to_path_buf())
            .unwrap()
            .load_content()
            .await
            .unwrap();
        assert_eq!(process.state.resolver.policy(), LookupPolicy::FallThrough);

        let page = process
            .resolve_once(&Slug::new("crime-news").unwrap(), Some("title_asc"))
            .await;
        assert_eq!(page.resolution.tag(), "category");
        assert_eq!(page.meta.title, "Crime | newsdesk");
    }

    #[tokio::test]
    async fn missing_dataset_is_reported_with_its_path() {
        let dir = site_dir("");
        let err = StartProcess::<CommandIssued>::parse_settings_file(dir.path().to_path_buf())
            .unwrap()
            .load_content()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::Dataset { ref path, .. } if path.ends_with("dataset.ndjson")));
    }
}
