use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use folio_server::config::AppConfig;
use folio_server::database::init_catalog_db;
use folio_server::orchestrator::Orchestrator;
use folio_server::publish::CommandGitClient;
use folio_server::repo::{RepoManager, SiteStore};
use folio_server::state::AppState;
use folio_server::workspace::Workspace;
use folio_server::{build_router, preview};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    info!(env = %config.app.env, "Folio starting");

    let workspace = Arc::new(Workspace::from_config(&config.app, &config.ssg));
    workspace
        .init()
        .await
        .context("Failed to initialize workspace")?;

    let catalog = init_catalog_db(&workspace.catalog_db)
        .await
        .context("Failed to open site catalog")?;
    let repos = Arc::new(RepoManager::new(
        workspace.clone(),
        config.ssg.repo_cache_size,
    ));
    let sites = Orchestrator::new(SiteStore::new(catalog), repos.clone(), workspace.clone());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let preview_addr: Option<SocketAddr> = match config.server.preview_port {
        0 => None,
        port => Some(
            format!("{}:{}", config.server.host, port)
                .parse()
                .context("Invalid preview address")?,
        ),
    };

    let state = AppState::new(
        config,
        workspace.clone(),
        sites,
        repos,
        Arc::new(CommandGitClient::new()),
    );

    if let Some(preview_addr) = preview_addr {
        let listener = tokio::net::TcpListener::bind(preview_addr)
            .await
            .context("Failed to bind preview listener")?;
        info!("Preview server running at http://{}", preview_addr);
        let app = preview::router(workspace);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Preview server stopped");
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server listener")?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
