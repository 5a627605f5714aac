use std::collections::HashMap;

use chrono::{DateTime, Utc};
use folio_common::{ContentKind, MetaInfo};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::entity::site::user;
use crate::error::{Result, SsgError};
use crate::repo::SiteRepo;
use crate::repo::site::{ContentInput, LayoutInput, ParamInput, SectionInput, UserInput};
use crate::utils::hash;

/// Content seed applied to every new site.
const DEFAULT_SITE_SEED: &str = include_str!("../seed/default_site.json");

pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    layouts: Vec<LayoutSeed>,
    #[serde(default)]
    sections: Vec<SectionSeed>,
    #[serde(default)]
    contents: Vec<ContentSeed>,
    #[serde(default)]
    metas: Vec<MetaSeed>,
    #[serde(default)]
    tags: Vec<TagSeed>,
    #[serde(default)]
    content_tags: Vec<ContentTagSeed>,
    #[serde(default)]
    params: Vec<ParamSeed>,
}

#[derive(Debug, Deserialize)]
struct LayoutSeed {
    #[serde(rename = "ref")]
    reference: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct SectionSeed {
    #[serde(rename = "ref")]
    reference: String,
    name: String,
    #[serde(default)]
    description: String,
    path: String,
    layout_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentSeed {
    #[serde(rename = "ref")]
    reference: String,
    section_ref: String,
    kind: String,
    heading: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    series: String,
    #[serde(default)]
    series_order: i32,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaSeed {
    content_ref: String,
    description: String,
    keywords: String,
    robots: String,
    canonical_url: String,
    sitemap: String,
    table_of_contents: bool,
    share: bool,
    comments: bool,
}

#[derive(Debug, Deserialize)]
struct TagSeed {
    #[serde(rename = "ref")]
    reference: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ContentTagSeed {
    content_ref: String,
    tag_ref: String,
}

#[derive(Debug, Deserialize)]
struct ParamSeed {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    value: String,
    ref_key: String,
    #[serde(default)]
    system: bool,
}

/// Outcome of seeding the administrator account.
pub struct AuthSeed {
    pub admin: user::Model,
    /// Set when no password was supplied and one was generated.
    pub generated_password: Option<String>,
}

/// Create the site's administrator account.
pub async fn seed_auth(repo: &SiteRepo, password: Option<&str>, actor: Uuid) -> Result<AuthSeed> {
    let generated_password = match password {
        Some(p) if !p.is_empty() => None,
        _ => Some(hash::generate_password()),
    };
    let plain = generated_password
        .as_deref()
        .or(password)
        .unwrap_or_default();
    let password_hash = hash::hash_password(plain)
        .map_err(|e| SsgError::Validation(format!("Password hash error: {e}")))?;

    let tx = repo.begin_tx().await?;
    let admin = tx
        .create_user(
            &UserInput {
                username: ADMIN_USERNAME.to_string(),
                email: format!("{ADMIN_USERNAME}@localhost"),
                name: "Administrator".to_string(),
                password_hash,
            },
            actor,
        )
        .await?;
    tx.commit().await?;

    info!(slug = repo.slug(), "Seeded administrator account");
    Ok(AuthSeed {
        admin,
        generated_password,
    })
}

/// Seed the bundled default content.
pub async fn seed_content(repo: &SiteRepo, author: Uuid, actor: Uuid) -> Result<()> {
    seed_content_from(repo, DEFAULT_SITE_SEED, author, actor).await
}

fn resolve(refs: &HashMap<String, Uuid>, kind: &str, reference: &str) -> Result<Uuid> {
    refs.get(reference)
        .copied()
        .ok_or_else(|| SsgError::Validation(format!("Seed references unknown {kind} '{reference}'")))
}

/// Apply a JSON seed document; each entity group commits in its own transaction.
async fn seed_content_from(repo: &SiteRepo, document: &str, author: Uuid, actor: Uuid) -> Result<()> {
    let seed: SeedFile = serde_json::from_str(document)
        .map_err(|e| SsgError::Validation(format!("Invalid seed document: {e}")))?;

    let mut layouts = HashMap::new();
    let tx = repo.begin_tx().await?;
    for l in &seed.layouts {
        let model = tx
            .create_layout(
                &LayoutInput {
                    name: l.name.clone(),
                    description: l.description.clone(),
                    code: l.code.clone(),
                },
                actor,
            )
            .await?;
        layouts.insert(l.reference.clone(), model.id);
    }
    tx.commit().await?;

    let mut sections = HashMap::new();
    let tx = repo.begin_tx().await?;
    for s in &seed.sections {
        let layout_id = match &s.layout_ref {
            Some(r) => Some(resolve(&layouts, "layout", r)?),
            None => None,
        };
        let model = tx
            .create_section(
                &SectionInput {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    path: s.path.clone(),
                    layout_id,
                },
                actor,
            )
            .await?;
        sections.insert(s.reference.clone(), model.id);
    }
    tx.commit().await?;

    let metas: HashMap<&str, &MetaSeed> = seed
        .metas
        .iter()
        .map(|m| (m.content_ref.as_str(), m))
        .collect();
    let mut contents = HashMap::new();
    let tx = repo.begin_tx().await?;
    for c in &seed.contents {
        let kind: ContentKind = c.kind.parse()?;
        let meta = metas
            .get(c.reference.as_str())
            .map(|m| MetaInfo {
                description: m.description.clone(),
                keywords: m.keywords.clone(),
                robots: m.robots.clone(),
                canonical_url: m.canonical_url.clone(),
                sitemap: m.sitemap.clone(),
                table_of_contents: m.table_of_contents,
                share: m.share,
                comments: m.comments,
            })
            .unwrap_or_default();
        let input = ContentInput {
            user_id: author,
            section_id: resolve(&sections, "section", &c.section_ref)?,
            kind,
            heading: c.heading.clone(),
            summary: c.summary.clone(),
            body: c.body.clone(),
            draft: c.draft,
            featured: c.featured,
            series: c.series.clone(),
            series_order: c.series_order,
            published_at: c.published_at,
        };
        let model = tx.insert_content(&input, &meta, actor).await?;
        contents.insert(c.reference.clone(), model.id);
    }
    tx.commit().await?;

    let mut tags = HashMap::new();
    let tx = repo.begin_tx().await?;
    for t in &seed.tags {
        let model = tx.find_or_create_tag(&t.name, actor).await?;
        tags.insert(t.reference.clone(), model.id);
    }
    for link in &seed.content_tags {
        tx.add_tag(
            resolve(&contents, "content", &link.content_ref)?,
            resolve(&tags, "tag", &link.tag_ref)?,
        )
        .await?;
    }
    tx.commit().await?;

    let tx = repo.begin_tx().await?;
    for p in &seed.params {
        tx.create_param(
            &ParamInput {
                name: p.name.clone(),
                description: p.description.clone(),
                value: p.value.clone(),
                ref_key: p.ref_key.clone(),
                system: p.system,
            },
            actor,
        )
        .await?;
    }
    tx.commit().await?;

    info!(
        slug = repo.slug(),
        layouts = layouts.len(),
        sections = sections.len(),
        contents = contents.len(),
        tags = tags.len(),
        params = seed.params.len(),
        "Seeded site content"
    );
    Ok(())
}
