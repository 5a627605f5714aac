use folio_common::frontmatter::{Frontmatter, render_document};
use folio_common::{ContentItem, paths};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::{GenerateReport, SiteBuild};
use crate::cancel::checkpoint;
use crate::error::Result;

/// Write one `.md` file with ordered frontmatter per content item.
#[instrument(skip_all, fields(slug = build.repo.slug()))]
pub async fn generate(build: &SiteBuild<'_>, cancel: &CancellationToken) -> Result<GenerateReport> {
    info!("Starting markdown generation");
    let contents = build.repo.all_content_with_meta().await?;

    let mut report = GenerateReport::default();
    for item in &contents {
        checkpoint(cancel)?;
        match write_item(build, item).await {
            Ok(()) => report.pages += 1,
            Err(e) => report.fail(item.slug(), e),
        }
    }

    info!(
        written = report.pages,
        failed = report.failures.len(),
        "Markdown generation finished"
    );
    Ok(report)
}

async fn write_item(build: &SiteBuild<'_>, item: &ContentItem) -> Result<()> {
    let permalink = paths::content_url(item, build.mode);
    let document = render_document(&Frontmatter::from_content(item, &permalink), &item.body)?;

    let path = paths::markdown_file_path(&build.paths.markdown, item);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, document).await?;
    debug!(path = %path.display(), "Generated markdown file");
    Ok(())
}
