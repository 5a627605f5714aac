use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::database::open_site_db;
use crate::error::{Result, SsgError};
use crate::repo::SiteRepo;
use crate::workspace::Workspace;

/// Per-site repositories cached by slug.
///
/// Every acquire re-checks that the database file is still on disk; a cached
/// repository whose file vanished is evicted and the site reported missing.
pub struct RepoManager {
    workspace: Arc<Workspace>,
    cache: Mutex<LruCache<String, SiteRepo>>,
}

impl RepoManager {
    pub fn new(workspace: Arc<Workspace>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            workspace,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn acquire(&self, slug: &str) -> Result<SiteRepo> {
        let db_file = self.workspace.site_paths(slug).db_file;
        let mut cache = self.cache.lock().await;

        if !tokio::fs::try_exists(&db_file).await? {
            if cache.pop(slug).is_some() {
                debug!(slug, "Evicted repository for missing database");
            }
            return Err(SsgError::NotFound(format!("Site '{slug}' not found")));
        }

        if let Some(repo) = cache.get(slug) {
            return Ok(repo.clone());
        }

        let repo = SiteRepo::new(slug, open_site_db(&db_file).await?);
        cache.put(slug.to_string(), repo.clone());
        debug!(slug, "Opened site repository");
        Ok(repo)
    }

    /// Drop a cached repository, e.g. after the site was deleted.
    pub async fn evict(&self, slug: &str) {
        self.cache.lock().await.pop(slug);
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::init_site_db;

    async fn manager(capacity: usize) -> (tempfile::TempDir, Arc<Workspace>, RepoManager) {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::from_defaults().unwrap();
        cfg.ssg.workspace_path = Some(tmp.path().to_path_buf());
        let ws = Arc::new(Workspace::from_config(&cfg.app, &cfg.ssg));
        let mgr = RepoManager::new(ws.clone(), capacity);
        (tmp, ws, mgr)
    }

    async fn make_site_db(ws: &Workspace, slug: &str) {
        let paths = ws.site_paths(slug);
        tokio::fs::create_dir_all(&paths.db_dir).await.unwrap();
        init_site_db(&paths.db_file).await.unwrap().close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_database_is_not_found() {
        let (_tmp, _ws, mgr) = manager(4).await;
        assert!(matches!(
            mgr.acquire("ghost").await,
            Err(SsgError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cached_repo_is_evicted_when_file_disappears() {
        let (_tmp, ws, mgr) = manager(4).await;
        make_site_db(&ws, "blog").await;

        let repo = mgr.acquire("blog").await.unwrap();
        assert_eq!(repo.slug(), "blog");
        assert_eq!(mgr.cached_count().await, 1);
        drop(repo);

        tokio::fs::remove_dir_all(ws.site_paths("blog").db_dir).await.unwrap();
        assert!(mgr.acquire("blog").await.is_err());
        assert_eq!(mgr.cached_count().await, 0);
    }

    #[tokio::test]
    async fn capacity_bounds_the_cache() {
        let (_tmp, ws, mgr) = manager(1).await;
        make_site_db(&ws, "a").await;
        make_site_db(&ws, "b").await;
        mgr.acquire("a").await.unwrap();
        mgr.acquire("b").await.unwrap();
        assert_eq!(mgr.cached_count().await, 1);
    }
}
