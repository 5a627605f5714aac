//! Site lifecycle: create with rollback, list with orphan pruning, lookup and delete.

use std::path::PathBuf;
use std::sync::Arc;

use folio_common::{SiteMode, slug};
use sea_orm::TransactionTrait;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cancel::checkpoint;
use crate::database::init_site_db;
use crate::entity::catalog::site;
use crate::error::{Result, SsgError};
use crate::repo::catalog::delete_site;
use crate::repo::{NewSite, RepoManager, SiteRepo, SiteStore};
use crate::seed;
use crate::workspace::Workspace;

/// Request to create a site.
#[derive(Debug, Clone)]
pub struct CreateSite {
    pub name: String,
    pub slug: String,
    pub mode: String,
    pub created_by: Uuid,
    /// Administrator password; generated when absent.
    pub admin_password: Option<String>,
}

#[derive(Debug)]
pub struct CreatedSite {
    pub site: site::Model,
    pub generated_password: Option<String>,
}

#[derive(Clone)]
pub struct Orchestrator {
    store: SiteStore,
    repos: Arc<RepoManager>,
    workspace: Arc<Workspace>,
}

impl Orchestrator {
    pub fn new(store: SiteStore, repos: Arc<RepoManager>, workspace: Arc<Workspace>) -> Self {
        Self {
            store,
            repos,
            workspace,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    #[instrument(skip(self, req, cancel), fields(slug = %req.slug))]
    pub async fn create(&self, req: CreateSite, cancel: &CancellationToken) -> Result<CreatedSite> {
        let mode: SiteMode = req.mode.parse()?;
        if req.name.trim().is_empty() {
            return Err(SsgError::Validation("Site name must not be blank".into()));
        }
        if !slug::is_valid(&req.slug) {
            return Err(SsgError::Validation(format!(
                "Invalid slug '{}': use lower-case letters, digits and single hyphens",
                req.slug
            )));
        }
        checkpoint(cancel)?;

        if self.store.find_by_slug(&req.slug).await?.is_some() {
            return Err(SsgError::Conflict(format!(
                "Site '{}' already exists",
                req.slug
            )));
        }

        let site = self
            .store
            .insert(&NewSite {
                name: req.name.clone(),
                slug: req.slug.clone(),
                mode,
                created_by: req.created_by,
            })
            .await?;
        info!(site_id = %site.id, "Site metadata stored");

        let mut created_dirs = Vec::new();
        match self.provision(&site, &req, cancel, &mut created_dirs).await {
            Ok(generated_password) => {
                info!(site_id = %site.id, "Site created");
                Ok(CreatedSite {
                    site,
                    generated_password,
                })
            }
            Err(err) => {
                warn!(error = %err, "Site creation failed, rolling back");
                self.rollback(&site, &created_dirs).await;
                Err(err)
            }
        }
    }

    /// Directories, database, schema and seed data for a freshly inserted site.
    async fn provision(
        &self,
        site: &site::Model,
        req: &CreateSite,
        cancel: &CancellationToken,
        created_dirs: &mut Vec<PathBuf>,
    ) -> Result<Option<String>> {
        let paths = self.workspace.site_paths(&site.slug);

        for top in [&paths.root, &paths.db_dir] {
            if !tokio::fs::try_exists(top).await? {
                created_dirs.push(top.clone());
            }
        }
        for dir in paths.directories() {
            checkpoint(cancel)?;
            tokio::fs::create_dir_all(dir).await?;
        }
        info!("Site directories created");

        checkpoint(cancel)?;
        let db = init_site_db(&paths.db_file).await?;
        let repo = SiteRepo::new(site.slug.clone(), db);
        info!(db = %paths.db_file.display(), "Site database migrated");

        let seeded = async {
            checkpoint(cancel)?;
            let auth = seed::seed_auth(&repo, req.admin_password.as_deref(), req.created_by).await?;
            checkpoint(cancel)?;
            seed::seed_content(&repo, auth.admin.id, req.created_by).await?;
            Ok::<_, SsgError>(auth.generated_password)
        }
        .await;

        // Release the file before any rollback removes it.
        repo.close().await?;
        seeded
    }

    async fn rollback(&self, site: &site::Model, created_dirs: &[PathBuf]) {
        if let Err(e) = self.store.delete(site.id).await {
            warn!(error = %e, "Failed to delete site metadata during rollback");
        }
        self.repos.evict(&site.slug).await;
        for dir in created_dirs {
            if let Err(e) = tokio::fs::remove_dir_all(dir).await
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!(dir = %dir.display(), error = %e, "Failed to remove directory during rollback");
            }
        }
    }

    fn db_exists(&self, slug: &str) -> bool {
        self.workspace.site_paths(slug).db_file.is_file()
    }

    /// Sites whose database file exists, sorted by name. Orphan rows are pruned.
    #[instrument(skip(self))]
    pub async fn list(&self, active_only: bool) -> Result<Vec<site::Model>> {
        let rows = self.store.list(active_only).await?;
        let mut sites = Vec::with_capacity(rows.len());
        for row in rows {
            if self.db_exists(&row.slug) {
                sites.push(row);
                continue;
            }
            warn!(slug = %row.slug, "Pruning site without database file");
            let txn = self.store.connection().begin().await?;
            delete_site(&txn, row.id).await?;
            txn.commit().await?;
            self.repos.evict(&row.slug).await;
        }
        Ok(sites)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<site::Model> {
        match self.store.find_by_slug(slug).await? {
            Some(site) if self.db_exists(&site.slug) => Ok(site),
            _ => Err(SsgError::NotFound(format!("Site '{slug}' not found"))),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<site::Model> {
        match self.store.find_by_id(id).await? {
            Some(site) if self.db_exists(&site.slug) => Ok(site),
            _ => Err(SsgError::NotFound(format!("Site {id} not found"))),
        }
    }

    /// Remove the metadata row only; the on-disk tree is kept for recovery.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<site::Model> {
        let site = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| SsgError::NotFound(format!("Site {id} not found")))?;
        self.store.delete(id).await?;
        self.repos.evict(&site.slug).await;
        info!(slug = %site.slug, "Site metadata deleted, files kept");
        Ok(site)
    }
}

/// Insert a bare catalog row, bypassing provisioning. Used to stage orphan rows in tests.
#[cfg(test)]
pub(crate) async fn insert_row_only(store: &SiteStore, slug: &str) -> site::Model {
    crate::repo::catalog::insert_site(
        store.connection(),
        &NewSite {
            name: slug.to_string(),
            slug: slug.to_string(),
            mode: SiteMode::Blog,
            created_by: Uuid::nil(),
        },
    )
    .await
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::init_catalog_db;

    async fn orchestrator() -> (tempfile::TempDir, Orchestrator) {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::from_defaults().unwrap();
        cfg.ssg.workspace_path = Some(tmp.path().to_path_buf());
        let ws = Arc::new(Workspace::from_config(&cfg.app, &cfg.ssg));
        ws.init().await.unwrap();
        let store = SiteStore::new(init_catalog_db(&ws.catalog_db).await.unwrap());
        let repos = Arc::new(RepoManager::new(ws.clone(), 4));
        (tmp, Orchestrator::new(store, repos, ws))
    }

    fn request(name: &str, slug: &str, mode: &str) -> CreateSite {
        CreateSite {
            name: name.into(),
            slug: slug.into(),
            mode: mode.into(),
            created_by: Uuid::nil(),
            admin_password: Some("secret".into()),
        }
    }

    #[tokio::test]
    async fn create_builds_tree_and_database() {
        let (_tmp, orch) = orchestrator().await;
        let created = orch
            .create(request("My Blog", "my-blog", "blog"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(created.site.mode, "blog");
        assert!(created.generated_password.is_none());

        let paths = orch.workspace().site_paths("my-blog");
        for dir in paths.directories() {
            assert!(dir.is_dir(), "missing {}", dir.display());
        }
        assert!(paths.db_file.is_file());
        assert_eq!(orch.get_by_slug("my-blog").await.unwrap().id, created.site.id);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_any_write() {
        let (_tmp, orch) = orchestrator().await;
        let token = CancellationToken::new();
        for req in [
            request("X", "x", "magazine"),
            request("X", "Not Valid", "blog"),
            request("  ", "x", "blog"),
        ] {
            assert!(matches!(
                orch.create(req, &token).await,
                Err(SsgError::Validation(_))
            ));
        }
        assert!(orch.list(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let (_tmp, orch) = orchestrator().await;
        let token = CancellationToken::new();
        orch.create(request("A", "dup", "structured"), &token).await.unwrap();
        assert!(matches!(
            orch.create(request("B", "dup", "blog"), &token).await,
            Err(SsgError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn cancelled_create_leaves_nothing_behind() {
        let (_tmp, orch) = orchestrator().await;
        let token = CancellationToken::new();
        token.cancel();
        // Validation passes, then the first checkpoint fires.
        let err = orch.create(request("Gone", "gone", "blog"), &token).await.unwrap_err();
        assert!(matches!(err, SsgError::Cancelled));
        assert!(orch.store.find_by_slug("gone").await.unwrap().is_none());
        assert!(!orch.workspace().site_paths("gone").root.exists());
    }

    #[tokio::test]
    async fn failed_provisioning_removes_metadata_and_tree() {
        let (_tmp, orch) = orchestrator().await;
        // A file where the database directory should be makes provisioning fail.
        let paths = orch.workspace().site_paths("broken");
        tokio::fs::create_dir_all(paths.db_dir.parent().unwrap()).await.unwrap();
        tokio::fs::write(&paths.db_dir, b"not a directory").await.unwrap();

        let err = orch
            .create(request("Broken", "broken", "blog"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SsgError::Io(_)));
        assert!(orch.store.find_by_slug("broken").await.unwrap().is_none());
        assert!(!paths.root.exists());
    }

    #[tokio::test]
    async fn list_prunes_orphans_and_lookups_hide_them() {
        let (_tmp, orch) = orchestrator().await;
        let token = CancellationToken::new();
        orch.create(request("Zed", "zed", "blog"), &token).await.unwrap();
        orch.create(request("Alpha", "alpha", "blog"), &token).await.unwrap();
        let orphan = insert_row_only(&orch.store, "orphan").await;

        assert!(matches!(
            orch.get_by_id(orphan.id).await,
            Err(SsgError::NotFound(_))
        ));

        let names: Vec<String> = orch.list(false).await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Alpha", "Zed"]);
        assert!(orch.store.find_by_id(orphan.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_keeps_files() {
        let (_tmp, orch) = orchestrator().await;
        let created = orch
            .create(request("Keep", "keep", "structured"), &CancellationToken::new())
            .await
            .unwrap();
        orch.delete(created.site.id).await.unwrap();

        assert!(orch.workspace().site_paths("keep").db_file.is_file());
        assert!(matches!(orch.get_by_slug("keep").await, Err(SsgError::NotFound(_))));
        assert!(matches!(orch.delete(created.site.id).await, Err(SsgError::NotFound(_))));
    }
}
