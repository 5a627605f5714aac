use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    /// `dev` or `prod`; selects the default workspace root.
    pub env: String,
}

impl AppSection {
    pub fn is_prod(&self) -> bool {
        self.env.eq_ignore_ascii_case("prod")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Listener for `{slug}.localhost` previews. `0` disables it.
    pub preview_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub google_enabled: bool,
    pub google_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PublishSettings {
    pub repo_url: String,
    pub branch: String,
    pub pages_subdir: String,
    pub auth_method: String,
    pub auth_token: String,
    pub commit_user_name: String,
    pub commit_user_email: String,
    pub commit_message: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SsgConfig {
    pub workspace_path: Option<PathBuf>,
    pub sites_base_path: Option<PathBuf>,
    pub db_base_path: Option<PathBuf>,
    pub catalog_db_path: Option<PathBuf>,
    pub docs_path: String,
    pub markdown_path: String,
    pub html_path: String,
    pub images_path: String,
    /// Site-wide layout template file; the bundled layout is used when unset or missing.
    pub layout_path: Option<PathBuf>,
    pub static_assets_path: Option<PathBuf>,
    pub header_style: String,
    pub blocks_max_items: usize,
    pub index_max_items: usize,
    pub search: SearchConfig,
    pub publish: PublishSettings,
    pub repo_cache_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSection,
    pub server: ServerConfig,
    pub ssg: SsgConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Self::defaults()?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FOLIO__SSG__HEADER_STYLE)
            .add_source(Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Built-in defaults only, without file or environment sources.
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "dev")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.preview_port", 8081)?
            .set_default("ssg.docs_path", "documents")?
            .set_default("ssg.markdown_path", "markdown")?
            .set_default("ssg.html_path", "html")?
            .set_default("ssg.images_path", "images")?
            .set_default("ssg.header_style", "boxed")?
            .set_default("ssg.blocks_max_items", 5)?
            .set_default("ssg.index_max_items", 9)?
            .set_default("ssg.search.google_enabled", false)?
            .set_default("ssg.search.google_id", "")?
            .set_default("ssg.publish.repo_url", "")?
            .set_default("ssg.publish.branch", "gh-pages")?
            .set_default("ssg.publish.pages_subdir", "")?
            .set_default("ssg.publish.auth_method", "token")?
            .set_default("ssg.publish.auth_token", "")?
            .set_default("ssg.publish.commit_user_name", "folio")?
            .set_default("ssg.publish.commit_user_email", "folio@localhost")?
            .set_default("ssg.publish.commit_message", "Publish site")?
            .set_default("ssg.repo_cache_size", 16)
    }
}
