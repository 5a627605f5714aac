use std::sync::Arc;

use crate::config::AppConfig;
use crate::orchestrator::Orchestrator;
use crate::publish::{GitClient, Publisher};
use crate::repo::RepoManager;
use crate::workspace::Workspace;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub workspace: Arc<Workspace>,
    pub sites: Orchestrator,
    pub repos: Arc<RepoManager>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        workspace: Arc<Workspace>,
        sites: Orchestrator,
        repos: Arc<RepoManager>,
        git: Arc<dyn GitClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            workspace,
            sites,
            repos,
            publisher: Publisher::new(git),
        }
    }
}
