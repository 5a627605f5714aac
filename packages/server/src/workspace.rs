//! Resolution of the on-disk workspace from configuration.

use std::path::{Path, PathBuf};

use folio_common::paths::{DocsLayout, SitePaths};
use tracing::info;

use crate::config::{AppSection, SsgConfig};

const DEV_ROOT: &str = "./_workspace";
const APP_DIR: &str = "folio";
const CATALOG_FILE: &str = "catalog.db";

/// Absolute-or-relative locations every component works from.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub sites_base: PathBuf,
    pub db_base: PathBuf,
    pub catalog_db: PathBuf,
    pub layout_file: Option<PathBuf>,
    pub static_assets: PathBuf,
    pub docs: DocsLayout,
}

impl Workspace {
    pub fn from_config(app: &AppSection, ssg: &SsgConfig) -> Self {
        let root = ssg.workspace_path.clone().unwrap_or_else(|| default_root(app));
        let sites_base = ssg
            .sites_base_path
            .clone()
            .unwrap_or_else(|| root.join("sites"));
        let db_base = ssg.db_base_path.clone().unwrap_or_else(|| root.join("db"));
        let catalog_db = ssg
            .catalog_db_path
            .clone()
            .unwrap_or_else(|| root.join("catalog").join(CATALOG_FILE));
        let static_assets = ssg
            .static_assets_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/static"));

        Self {
            root,
            sites_base,
            db_base,
            catalog_db,
            layout_file: ssg.layout_path.clone(),
            static_assets,
            docs: DocsLayout {
                docs: ssg.docs_path.clone(),
                markdown: ssg.markdown_path.clone(),
                html: ssg.html_path.clone(),
                images: ssg.images_path.clone(),
                ..DocsLayout::default()
            },
        }
    }

    pub fn site_paths(&self, slug: &str) -> SitePaths {
        SitePaths::resolve(&self.sites_base, &self.db_base, slug, &self.docs)
    }

    /// Create the workspace directories if they do not exist yet.
    pub async fn init(&self) -> std::io::Result<()> {
        let catalog_dir = self.catalog_db.parent().unwrap_or(Path::new("."));
        for dir in [
            self.root.as_path(),
            self.sites_base.as_path(),
            self.db_base.as_path(),
            catalog_dir,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }
        info!(root = %self.root.display(), "Workspace ready");
        Ok(())
    }
}

fn default_root(app: &AppSection) -> PathBuf {
    if app.is_prod() {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(DEV_ROOT))
    } else {
        PathBuf::from(DEV_ROOT)
    }
}
