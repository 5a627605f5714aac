//! Per-site parameters: well-known keys, config fallback and system-param rules.

use std::collections::HashMap;
use std::str::FromStr;

use folio_common::HeaderStyle;
use sea_orm::ConnectionTrait;
use tracing::warn;
use uuid::Uuid;

use crate::config::SsgConfig;
use crate::entity::site::param;
use crate::error::{Result, SsgError};
use crate::publish::{AuthMethod, PublishConfig};
use crate::repo::SiteRepo;
use crate::repo::site::ParamInput;

pub mod keys {
    pub const HEADER_STYLE: &str = "ssg.header.style";
    pub const BLOCKS_MAX_ITEMS: &str = "ssg.blocks.maxitems";
    pub const INDEX_MAX_ITEMS: &str = "ssg.index.maxitems";
    pub const SEARCH_GOOGLE_ENABLED: &str = "ssg.search.google.enabled";
    pub const SEARCH_GOOGLE_ID: &str = "ssg.search.google.id";
    pub const PUBLISH_REPO_URL: &str = "ssg.publish.repo.url";
    pub const PUBLISH_BRANCH: &str = "ssg.publish.branch";
    pub const PUBLISH_PAGES_SUBDIR: &str = "ssg.publish.pages.subdir";
    pub const PUBLISH_AUTH_METHOD: &str = "ssg.publish.auth.method";
    pub const PUBLISH_AUTH_TOKEN: &str = "ssg.publish.auth.token";
    pub const PUBLISH_COMMIT_USER_NAME: &str = "ssg.publish.commit.user.name";
    pub const PUBLISH_COMMIT_USER_EMAIL: &str = "ssg.publish.commit.user.email";
    pub const PUBLISH_COMMIT_MESSAGE: &str = "ssg.publish.commit.message";
}

/// Search box configuration handed to templates.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SearchSettings {
    pub provider: String,
    pub id: String,
    pub enabled: bool,
}

/// Effective settings for one site: a non-empty param value wins over configuration.
pub struct ParamResolver<'a> {
    values: HashMap<String, String>,
    config: &'a SsgConfig,
}

impl<'a> ParamResolver<'a> {
    pub async fn load<C: ConnectionTrait>(repo: &SiteRepo<C>, config: &'a SsgConfig) -> Result<Self> {
        let values = repo
            .list_params()
            .await?
            .into_iter()
            .filter(|p| !p.value.trim().is_empty())
            .map(|p| (p.ref_key, p.value.trim().to_string()))
            .collect();
        Ok(Self { values, config })
    }

    #[cfg(test)]
    fn from_pairs(pairs: &[(&str, &str)], config: &'a SsgConfig) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            config,
        }
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn string(&self, key: &str, fallback: &str) -> String {
        self.param(key).unwrap_or(fallback).to_string()
    }

    fn parsed<T: FromStr>(&self, key: &str, fallback: T) -> T {
        match self.param(key) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(key, value = raw, "Ignoring unparsable param value");
                fallback
            }),
            None => fallback,
        }
    }

    pub fn header_style(&self) -> HeaderStyle {
        let fallback = self.config.header_style.parse().unwrap_or_default();
        self.parsed(keys::HEADER_STYLE, fallback)
    }

    pub fn blocks_max_items(&self) -> usize {
        self.parsed(keys::BLOCKS_MAX_ITEMS, self.config.blocks_max_items)
    }

    pub fn index_max_items(&self) -> usize {
        self.parsed(keys::INDEX_MAX_ITEMS, self.config.index_max_items)
            .max(1)
    }

    pub fn search(&self) -> SearchSettings {
        let enabled = self.parsed(keys::SEARCH_GOOGLE_ENABLED, self.config.search.google_enabled);
        SearchSettings {
            provider: "google".to_string(),
            id: self.string(keys::SEARCH_GOOGLE_ID, &self.config.search.google_id),
            enabled,
        }
    }

    pub fn publish_config(&self) -> PublishConfig {
        let p = &self.config.publish;
        let method = self.string(keys::PUBLISH_AUTH_METHOD, &p.auth_method);
        PublishConfig {
            repo_url: self.string(keys::PUBLISH_REPO_URL, &p.repo_url),
            branch: self.string(keys::PUBLISH_BRANCH, &p.branch),
            pages_subdir: self.string(keys::PUBLISH_PAGES_SUBDIR, &p.pages_subdir),
            auth_method: method.parse().unwrap_or(AuthMethod::Token),
            auth_token: self.string(keys::PUBLISH_AUTH_TOKEN, &p.auth_token),
            commit_user_name: self.string(keys::PUBLISH_COMMIT_USER_NAME, &p.commit_user_name),
            commit_user_email: self.string(keys::PUBLISH_COMMIT_USER_EMAIL, &p.commit_user_email),
            commit_message: self.string(keys::PUBLISH_COMMIT_MESSAGE, &p.commit_message),
        }
    }
}

/// Reference keys are dotted lower-case identifiers such as `ssg.header.style`.
pub fn is_valid_ref_key(key: &str) -> bool {
    !key.is_empty()
        && key.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        })
}

fn validate(input: &ParamInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(SsgError::Validation("Param name must not be blank".into()));
    }
    if !is_valid_ref_key(&input.ref_key) {
        return Err(SsgError::Validation(format!(
            "Invalid ref key '{}': use dotted lower-case identifiers",
            input.ref_key
        )));
    }
    Ok(())
}

/// A system param only accepts changes to its value.
pub fn check_update(existing: &param::Model, input: &ParamInput) -> Result<()> {
    if !existing.system {
        return Ok(());
    }
    let changed = [
        ("name", existing.name != input.name),
        ("ref key", existing.ref_key != input.ref_key),
        ("description", existing.description != input.description),
    ];
    match changed.iter().find(|(_, changed)| *changed) {
        Some((field, _)) => Err(SsgError::Conflict(format!(
            "Cannot change {field} of system param '{}'",
            existing.ref_key
        ))),
        None => Ok(()),
    }
}

pub fn check_delete(existing: &param::Model) -> Result<()> {
    if existing.system {
        return Err(SsgError::Forbidden(format!(
            "Cannot delete system param '{}'",
            existing.ref_key
        )));
    }
    Ok(())
}

/// User-created params are never system params.
pub async fn create_param<C: ConnectionTrait>(
    repo: &SiteRepo<C>,
    input: ParamInput,
    actor: Uuid,
) -> Result<param::Model> {
    validate(&input)?;
    let input = ParamInput {
        system: false,
        ..input
    };
    repo.create_param(&input, actor).await
}

pub async fn update_param<C: ConnectionTrait>(
    repo: &SiteRepo<C>,
    id: Uuid,
    input: ParamInput,
    actor: Uuid,
) -> Result<param::Model> {
    validate(&input)?;
    let existing = repo.param(id).await?;
    check_update(&existing, &input)?;
    repo.update_param(existing, &input, actor).await
}

pub async fn delete_param<C: ConnectionTrait>(repo: &SiteRepo<C>, id: Uuid) -> Result<()> {
    let existing = repo.param(id).await?;
    check_delete(&existing)?;
    repo.delete_param(id).await
}
