//! Mirrors a generated site into a git branch.

pub mod git;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::info;
use utoipa::ToSchema;

use crate::cancel::checkpoint;
use crate::error::{Result, SsgError};
use crate::generator::assets::copy_tree;
use crate::utils::filename::escapes_root;

pub use git::{CommandGitClient, CommitAuthor, GitClient};

const ASKPASS_SCRIPT: &str = "git-askpass.sh";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    /// Token handed to git through an askpass helper.
    Token,
    /// Whatever the ambient SSH agent provides.
    Ssh,
}

impl FromStr for AuthMethod {
    type Err = SsgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "ssh" => Ok(Self::Ssh),
            other => Err(SsgError::Validation(format!("unknown auth method '{other}'"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PublishConfig {
    pub repo_url: String,
    pub branch: String,
    /// Empty publishes to the repository root.
    pub pages_subdir: String,
    pub auth_method: AuthMethod,
    pub auth_token: String,
    pub commit_user_name: String,
    pub commit_user_email: String,
    pub commit_message: String,
}

impl PublishConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repo_url.trim().is_empty() {
            return Err(SsgError::Validation("repo URL cannot be empty".into()));
        }
        if self.branch.trim().is_empty() {
            return Err(SsgError::Validation("publish branch cannot be empty".into()));
        }
        if escapes_root(Path::new(&self.pages_subdir)) {
            return Err(SsgError::Validation(format!(
                "pages subdirectory '{}' leaves the repository",
                self.pages_subdir
            )));
        }
        Ok(())
    }

    fn author(&self) -> CommitAuthor {
        CommitAuthor {
            name: self.commit_user_name.clone(),
            email: self.commit_user_email.clone(),
            message: self.commit_message.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PublishOptions {
    /// Skip the commit and push when mirroring changed nothing.
    pub skip_if_unchanged: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PublishOutcome {
    /// `{repo_url}/commit/{hash}`, absent when an unchanged publish was skipped.
    pub commit_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanReport {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub summary: String,
}

impl PlanReport {
    /// Partition `git status --porcelain` lines by their index status.
    pub fn from_porcelain(status: &str) -> Self {
        let mut report = Self::default();
        for line in status.lines() {
            if line.len() < 4 {
                continue;
            }
            let (code, path) = line.split_at(3);
            let path = unquote(path.trim());
            match code.trim_end() {
                "A" | "??" => report.added.push(path),
                "M" | "MM" | "AM" | "T" => report.modified.push(path),
                "D" => report.removed.push(path),
                _ => {}
            }
        }
        report.summary = format!(
            "Added: {}, Modified: {}, Removed: {}",
            report.added.len(),
            report.modified.len(),
            report.removed.len()
        );
        report
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

/// Undo git's C-style path quoting: surrounding quotes, backslash escapes and
/// octal-escaped UTF-8 bytes.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// A clone with the generated site mirrored in and staged. Dropping it removes
/// the scratch tree.
struct Staged {
    _scratch: TempDir,
    repo: PathBuf,
    env: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct Publisher {
    git: Arc<dyn GitClient>,
}

impl Publisher {
    pub fn new(git: Arc<dyn GitClient>) -> Self {
        Self { git }
    }

    /// Mirror `source` into the configured branch, commit, and push.
    pub async fn publish(
        &self,
        cfg: &PublishConfig,
        source: &Path,
        opts: PublishOptions,
        cancel: &CancellationToken,
    ) -> Result<PublishOutcome> {
        info!(repo = %cfg.repo_url, branch = %cfg.branch, "Starting publish");
        let staged = self.stage(cfg, source, cancel).await?;

        if opts.skip_if_unchanged {
            let status = step(cancel, "status", self.git.status(&staged.repo, &staged.env)).await?;
            if PlanReport::from_porcelain(&status).is_empty() {
                info!(repo = %cfg.repo_url, "Nothing changed, skipping commit");
                return Ok(PublishOutcome { commit_url: None });
            }
        }

        let hash = step(
            cancel,
            "commit",
            self.git
                .commit(&staged.repo, &cfg.author(), !opts.skip_if_unchanged, &staged.env),
        )
        .await?;
        info!(hash = %hash, "Changes committed");

        step(cancel, "push", self.git.push(&staged.repo, &cfg.branch, &staged.env)).await?;

        let commit_url = format!("{}/commit/{}", cfg.repo_url.trim_end_matches('/'), hash);
        info!(commit_url = %commit_url, "Publish completed");
        Ok(PublishOutcome {
            commit_url: Some(commit_url),
        })
    }

    /// Stage `source` exactly as [`Publisher::publish`] would and report the
    /// resulting changes. Never commits or pushes.
    pub async fn plan(
        &self,
        cfg: &PublishConfig,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<PlanReport> {
        info!(repo = %cfg.repo_url, branch = %cfg.branch, "Starting plan");
        let staged = self.stage(cfg, source, cancel).await?;
        let status = step(cancel, "status", self.git.status(&staged.repo, &staged.env)).await?;
        let report = PlanReport::from_porcelain(&status);
        info!(summary = %report.summary, "Plan completed");
        Ok(report)
    }

    async fn stage(
        &self,
        cfg: &PublishConfig,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<Staged> {
        cfg.validate()?;
        if !tokio::fs::try_exists(source).await? {
            return Err(SsgError::Validation(
                "site has no generated HTML to publish".into(),
            ));
        }
        checkpoint(cancel)?;

        let scratch = tempfile::Builder::new()
            .prefix("folio-publish-")
            .tempdir()?;
        let repo = scratch.path().join("repo");
        let env = match cfg.auth_method {
            AuthMethod::Token => {
                let script = write_askpass(scratch.path(), &cfg.auth_token).await?;
                vec![("GIT_ASKPASS".to_string(), script.to_string_lossy().into_owned())]
            }
            AuthMethod::Ssh => Vec::new(),
        };

        step(cancel, "clone", self.git.clone_repo(&cfg.repo_url, &repo, &env)).await?;
        step(cancel, "checkout", self.git.checkout(&repo, &cfg.branch, &env)).await?;

        let target = clean_target(&repo, &cfg.pages_subdir).await?;
        let copied = copy_tree(source, &target, cancel).await?;
        info!(files = copied, target = %target.display(), "Mirrored generated site");

        step(cancel, "add", self.git.add_all(&repo, &env)).await?;

        Ok(Staged {
            _scratch: scratch,
            repo,
            env,
        })
    }
}

/// Run one git step unless the token fires first. Dropping the step future
/// kills the child process.
async fn step<T>(
    cancel: &CancellationToken,
    name: &'static str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    checkpoint(cancel)?;
    info!(step = name, "Publish step");
    tokio::select! {
        _ = cancel.cancelled() => Err(SsgError::Cancelled),
        res = fut => res,
    }
}

async fn write_askpass(dir: &Path, token: &str) -> Result<PathBuf> {
    let path = dir.join(ASKPASS_SCRIPT);
    let quoted = token.replace('\'', r"'\''");
    tokio::fs::write(&path, format!("#!/bin/sh\necho '{quoted}'\n")).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700)).await?;
    }
    Ok(path)
}

/// Empty the publish target inside the clone. At the repository root every
/// top-level entry but `.git` goes.
async fn clean_target(repo: &Path, pages_subdir: &str) -> Result<PathBuf> {
    let subdir = pages_subdir.trim_matches('/');
    if subdir.is_empty() {
        let mut entries = tokio::fs::read_dir(repo).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name() == ".git" {
                continue;
            }
            if entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(entry.path()).await?;
            } else {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        return Ok(repo.to_path_buf());
    }

    let target = repo.join(subdir);
    if tokio::fs::try_exists(&target).await? {
        tokio::fs::remove_dir_all(&target).await?;
    }
    tokio::fs::create_dir_all(&target).await?;
    Ok(target)
}
