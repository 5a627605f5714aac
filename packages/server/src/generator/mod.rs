//! Markdown and HTML generation for one site.

pub mod assets;
pub mod html;
pub mod markdown;
pub mod templates;

use std::path::PathBuf;

use folio_common::SiteMode;
use folio_common::paths::SitePaths;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::config::SsgConfig;
use crate::entity::catalog::site;
use crate::error::Result;
use crate::params::ParamResolver;
use crate::repo::SiteRepo;
use crate::workspace::Workspace;

/// Everything a generation run needs about one site.
pub struct SiteBuild<'a> {
    pub repo: &'a SiteRepo,
    pub mode: SiteMode,
    pub paths: SitePaths,
    pub params: ParamResolver<'a>,
    pub layout_file: Option<PathBuf>,
    pub static_assets: PathBuf,
}

impl<'a> SiteBuild<'a> {
    pub async fn load(
        workspace: &Workspace,
        config: &'a SsgConfig,
        site: &site::Model,
        repo: &'a SiteRepo,
    ) -> Result<Self> {
        Ok(Self {
            repo,
            mode: site.mode.parse()?,
            paths: workspace.site_paths(&site.slug),
            params: ParamResolver::load(repo, config).await?,
            layout_file: workspace.layout_file.clone(),
            static_assets: workspace.static_assets.clone(),
        })
    }
}

/// An item that could not be generated. The run carries on without it.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ItemFailure {
    pub item: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct GenerateReport {
    /// Content pages written.
    pub pages: usize,
    /// Index pages written, counting every pagination page.
    pub index_pages: usize,
    /// Static and image files copied.
    pub assets: usize,
    pub failures: Vec<ItemFailure>,
}

impl GenerateReport {
    pub(crate) fn fail(&mut self, item: impl Into<String>, error: impl std::fmt::Display) {
        let item = item.into();
        let error = error.to_string();
        warn!(item = %item, error = %error, "Skipping item");
        self.failures.push(ItemFailure { item, error });
    }
}
