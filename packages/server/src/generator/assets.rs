use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cancel::checkpoint;
use crate::error::Result;

/// Regular files under `root`, relative to it, in a stable order.
pub fn relative_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

/// Copy every file under `src` into `dst`, keeping relative paths.
///
/// A missing source tree copies nothing. Returns the number of files copied.
pub async fn copy_tree(src: &Path, dst: &Path, cancel: &CancellationToken) -> Result<usize> {
    if !tokio::fs::try_exists(src).await? {
        info!(src = %src.display(), "No asset tree to copy");
        return Ok(0);
    }

    let files = relative_files(src);
    for rel in &files {
        checkpoint(cancel)?;
        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(src.join(rel), &target).await?;
    }
    debug!(src = %src.display(), dst = %dst.display(), count = files.len(), "Copied asset tree");
    Ok(files.len())
}
