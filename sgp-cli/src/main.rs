//! SGP CLI - Command-line driver for the portal session and layout layer
//!
//! Drives the same session accessor and layout composer the portal pages use,
//! against a file-backed store, so sessions can be inspected and pages
//! composed outside a browser.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sgp_core::{init_logging, performance, PortalConfig, PortalResult, Role, Session};
use sgp_layout::{ActivePage, CompositionOutcome, LayoutComposer, PageDocument, SidebarStateStore};
use sgp_session::{
    FetchRequest, FileStore, KeyValueStore, Method, RecordingNavigator, ReqwestTransport,
    SessionAccessor, SessionRepository, StoredSessionRepository,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "sgp")]
#[command(about = "Session and layout tooling for the SGP Costura portal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session storage file (overrides the configured location)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show who is signed in
    Whoami,

    /// End the session and go to the login page
    Logout,

    /// Landing page for a role, or for the signed-in user
    Landing {
        /// Role name (admin, supervisor, operator)
        role: Option<String>,
    },

    /// Wrap an HTML body fragment with the portal layout
    Render {
        /// File holding the page body
        #[arg(long)]
        body: PathBuf,

        /// Navigation id of the page, e.g. monitor
        #[arg(long, conflicts_with = "path")]
        page: Option<String>,

        /// Location of the page, e.g. /telas/page_01/page_01.html
        #[arg(long)]
        path: Option<String>,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Flip the stored sidebar collapse state
    Toggle,

    /// Call the backend with the stored bearer token
    Fetch {
        /// Absolute URL or path relative to the API base URL
        url: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Extra header as Name:Value (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store a session the way the login page does
    Set {
        #[arg(long)]
        token: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        role: String,
    },

    /// Print the stored session as JSON
    Show,

    /// Remove the stored session without redirecting
    Clear,
}

/// Everything a command needs, wired over one store
struct Portal {
    config: PortalConfig,
    store: Arc<dyn KeyValueStore>,
    navigator: RecordingNavigator,
    accessor: Arc<SessionAccessor>,
}

impl Portal {
    fn open(config: PortalConfig, store_path: Option<PathBuf>) -> PortalResult<Self> {
        let store = match store_path.or_else(|| config.storage.path.clone()) {
            Some(path) => FileStore::new(path),
            None => FileStore::default_location()?,
        };
        info!(path = %store.path().display(), "Using session storage");

        let store: Arc<dyn KeyValueStore> = Arc::new(store);
        let navigator = RecordingNavigator::new();
        let accessor = SessionAccessor::new(
            Arc::new(StoredSessionRepository::new(store.clone())),
            Arc::new(navigator.clone()),
            Arc::new(ReqwestTransport::new(&config.api)?),
            config.routes.clone(),
            config.api.base_url.clone(),
        );

        Ok(Self {
            config,
            store,
            navigator,
            accessor: Arc::new(accessor),
        })
    }

    fn composer(&self) -> LayoutComposer {
        LayoutComposer::new(
            self.accessor.clone(),
            SidebarStateStore::new(self.store.clone()),
            self.config.layout.clone(),
        )
    }

    /// Lines reporting every redirect requested so far, in order
    async fn redirect_report(&self) -> Vec<String> {
        self.navigator
            .redirects()
            .await
            .into_iter()
            .map(|target| format!("redirect: {}", target))
            .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (mut config, source) = load_config(cli.config.as_deref())?;
    config.apply_env_overrides();
    if cli.verbose {
        config.logging = config.logging.clone().with_verbose();
    }

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    match &source {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => debug!("No configuration file found, using defaults"),
    }
    config.validate()?;

    let portal = Portal::open(config, cli.store)?;
    let result = run(cli.command, &portal).await;

    for line in portal.redirect_report().await {
        println!("{}", line);
    }
    result
}

fn load_config(path: Option<&Path>) -> PortalResult<(PortalConfig, Option<PathBuf>)> {
    if let Some(path) = path {
        return Ok((PortalConfig::from_file(path)?, Some(path.to_path_buf())));
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("sgp").join("config.toml")),
        Some(PathBuf::from("sgp.toml")),
    ];
    for path in default_paths.into_iter().flatten() {
        if path.exists() {
            return Ok((PortalConfig::from_file(&path)?, Some(path)));
        }
    }

    Ok((PortalConfig::default(), None))
}

async fn run(command: Commands, portal: &Portal) -> anyhow::Result<()> {
    let accessor = &portal.accessor;

    match command {
        Commands::Session { action } => handle_session(action, portal).await?,
        Commands::Whoami => {
            if !accessor.is_authenticated().await {
                println!("Not signed in");
                return Ok(());
            }
            let user = accessor.current_user().await;
            println!("{} ({})", user.display_name(), user.role_label());
            println!("landing: {}", accessor.default_page().await);
        }
        Commands::Logout => {
            accessor.logout().await?;
            println!("Signed out");
        }
        Commands::Landing { role } => match role {
            Some(role) => {
                let role = Role::parse(&role);
                println!("{}", accessor.default_page_for_role(Some(&role)));
            }
            None => println!("{}", accessor.default_page().await),
        },
        Commands::Render {
            body,
            page,
            path,
            title,
            out,
        } => handle_render(portal, &body, active_page(page, path), title, out).await?,
        Commands::Toggle => {
            let sidebar_state = SidebarStateStore::new(portal.store.clone());
            let state = sidebar_state.load().await.toggled();
            sidebar_state.save(state).await?;
            println!(
                "Sidebar {}",
                if state.collapsed { "collapsed" } else { "expanded" }
            );
        }
        Commands::Fetch {
            url,
            method,
            headers,
            data,
        } => handle_fetch(portal, url, &method, &headers, data).await?,
    }

    Ok(())
}

async fn handle_session(action: SessionAction, portal: &Portal) -> anyhow::Result<()> {
    let repository = portal.accessor.repository();

    match action {
        SessionAction::Set {
            token,
            username,
            role,
        } => {
            let role = Role::parse(&role);
            if !role.is_known() {
                warn!(role = %role, "Storing a role the portal does not know");
            }
            repository.write(&Session::new(token, username, role)).await?;
            println!("Session stored");
        }
        SessionAction::Show => {
            let session = portal.accessor.current_user().await;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        SessionAction::Clear => {
            repository.clear().await?;
            println!("Session cleared");
        }
    }

    Ok(())
}

async fn handle_render(
    portal: &Portal,
    body: &Path,
    active: ActivePage,
    title: Option<String>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let fragment = tokio::fs::read_to_string(body)
        .await
        .with_context(|| format!("Failed to read page body {}", body.display()))?;

    let mut page = PageDocument::from_body_html(&fragment);
    if let Some(title) = title {
        page = page.with_title(&title);
    }

    let composer = portal.composer();
    let outcome =
        performance::measure_async("render_page", composer.compose(&mut page, &active)).await?;

    match outcome {
        CompositionOutcome::Redirected => bail!("Not signed in; the page was not composed"),
        CompositionOutcome::Composed {
            visible, active, ..
        } => {
            debug!(?visible, ?active, "Page composed");
            let html = page.to_html();
            match out {
                Some(path) => {
                    tokio::fs::write(&path, html)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", html),
            }
        }
    }

    Ok(())
}

async fn handle_fetch(
    portal: &Portal,
    url: String,
    method: &str,
    headers: &[String],
    data: Option<String>,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", method))?;

    let mut request = FetchRequest::new(method, url);
    for header in headers {
        let (name, value) = parse_header(header)?;
        request = request.header(name, value)?;
    }
    if let Some(data) = data {
        let payload: serde_json::Value =
            serde_json::from_str(&data).context("Request body must be valid JSON")?;
        request = request
            .with_body(serde_json::to_vec(&payload)?)
            .header("Content-Type", "application/json")?;
    }

    let response = portal.accessor.auth_fetch(request).await?;
    println!("{}", response.status);
    match response.json::<serde_json::Value>() {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", response.text()),
    }

    if !response.is_success() {
        bail!("Request failed with status {}", response.status);
    }
    Ok(())
}

fn parse_header(header: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = header
        .split_once(':')
        .with_context(|| format!("Header '{}' is not in Name:Value form", header))?;
    Ok((name.trim(), value.trim()))
}

fn active_page(page: Option<String>, path: Option<String>) -> ActivePage {
    match (page, path) {
        (Some(id), _) => ActivePage::nav_id(id),
        (None, Some(path)) => ActivePage::from_path(&path),
        (None, None) => ActivePage::Unlisted,
    }
}
