use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SsgError};

/// Extra environment for a git invocation, e.g. `GIT_ASKPASS`.
pub type GitEnv = [(String, String)];

#[derive(Clone, Debug)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Porcelain operations the publisher drives. Object-safe so it can live in
/// `Arc<dyn GitClient>`.
#[async_trait]
pub trait GitClient: Send + Sync {
    async fn clone_repo(&self, url: &str, dest: &Path, env: &GitEnv) -> Result<()>;

    /// Switch to an existing branch. Never creates one.
    async fn checkout(&self, repo: &Path, branch: &str, env: &GitEnv) -> Result<()>;

    async fn add_all(&self, repo: &Path, env: &GitEnv) -> Result<()>;

    /// Commit the index and return the new HEAD hash.
    async fn commit(
        &self,
        repo: &Path,
        author: &CommitAuthor,
        allow_empty: bool,
        env: &GitEnv,
    ) -> Result<String>;

    /// `git status --porcelain` output with rename detection off.
    async fn status(&self, repo: &Path, env: &GitEnv) -> Result<String>;

    async fn push(&self, repo: &Path, branch: &str, env: &GitEnv) -> Result<()>;
}

/// Runs the `git` binary found on `PATH`.
#[derive(Clone, Debug, Default)]
pub struct CommandGitClient;

impl CommandGitClient {
    pub fn new() -> Self {
        Self
    }

    async fn run(
        &self,
        step: &'static str,
        dir: Option<&Path>,
        args: &[&str],
        env: &GitEnv,
    ) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        debug!(step, ?args, "Running git");
        let output = cmd.output().await.map_err(|e| SsgError::Git {
            step,
            detail: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(SsgError::Git {
                step,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl GitClient for CommandGitClient {
    async fn clone_repo(&self, url: &str, dest: &Path, env: &GitEnv) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run("clone", None, &["clone", "--quiet", url, &dest], env)
            .await
            .map(drop)
    }

    async fn checkout(&self, repo: &Path, branch: &str, env: &GitEnv) -> Result<()> {
        self.run("checkout", Some(repo), &["checkout", "--quiet", branch], env)
            .await
            .map(drop)
    }

    async fn add_all(&self, repo: &Path, env: &GitEnv) -> Result<()> {
        self.run("add", Some(repo), &["add", "--all", "."], env)
            .await
            .map(drop)
    }

    async fn commit(
        &self,
        repo: &Path,
        author: &CommitAuthor,
        allow_empty: bool,
        env: &GitEnv,
    ) -> Result<String> {
        let name = format!("user.name={}", author.name);
        let email = format!("user.email={}", author.email);
        let mut args: Vec<&str> = vec![
            "-c",
            name.as_str(),
            "-c",
            email.as_str(),
            "commit",
            "--quiet",
            "-m",
            author.message.as_str(),
        ];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.run("commit", Some(repo), &args, env).await?;

        let head = self
            .run("rev-parse", Some(repo), &["rev-parse", "HEAD"], env)
            .await?;
        Ok(head.trim().to_string())
    }

    async fn status(&self, repo: &Path, env: &GitEnv) -> Result<String> {
        self.run(
            "status",
            Some(repo),
            &[
                "-c",
                "core.quotePath=false",
                "status",
                "--porcelain",
                "--no-renames",
                "--untracked-files=all",
            ],
            env,
        )
        .await
    }

    async fn push(&self, repo: &Path, branch: &str, env: &GitEnv) -> Result<()> {
        self.run("push", Some(repo), &["push", "--quiet", "origin", branch], env)
            .await
            .map(drop)
    }
}
