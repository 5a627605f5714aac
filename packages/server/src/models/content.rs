use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use folio_common::{ContentItem, MetaInfo};

use super::shared::Pagination;
use crate::entity::site::{content, tag};

#[derive(Deserialize, IntoParams)]
pub struct ContentSearchQuery {
    /// Matched case-insensitively against heading and body.
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ContentSummary {
    pub id: Uuid,
    pub short_id: String,
    pub section_id: Uuid,
    #[schema(example = "article")]
    pub kind: String,
    pub heading: String,
    pub summary: String,
    pub draft: bool,
    pub featured: bool,
    pub series: String,
    pub series_order: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<content::Model> for ContentSummary {
    fn from(m: content::Model) -> Self {
        Self {
            id: m.id,
            short_id: m.short_id,
            section_id: m.section_id,
            kind: m.kind,
            heading: m.heading,
            summary: m.summary,
            draft: m.draft,
            featured: m.featured,
            series: m.series,
            series_order: m.series_order,
            published_at: m.published_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ContentListEnvelope {
    pub contents: Vec<ContentSummary>,
    pub pagination: Pagination,
}

#[derive(Deserialize, ToSchema)]
pub struct AddTagRequest {
    /// Created when no tag with this name exists yet.
    #[schema(example = "Rust")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TagEnvelope {
    pub tag: TagResponse,
}

#[derive(Serialize, ToSchema)]
pub struct TagListEnvelope {
    pub tags: Vec<TagResponse>,
}

/// SEO sidecar fields; every field defaults to empty or off.
#[derive(Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct MetaPayload {
    pub description: String,
    pub keywords: String,
    #[schema(example = "index, follow")]
    pub robots: String,
    pub canonical_url: String,
    pub sitemap: String,
    pub table_of_contents: bool,
    pub share: bool,
    pub comments: bool,
}

impl From<MetaPayload> for MetaInfo {
    fn from(m: MetaPayload) -> Self {
        Self {
            description: m.description,
            keywords: m.keywords,
            robots: m.robots,
            canonical_url: m.canonical_url,
            sitemap: m.sitemap,
            table_of_contents: m.table_of_contents,
            share: m.share,
            comments: m.comments,
        }
    }
}

impl From<MetaInfo> for MetaPayload {
    fn from(m: MetaInfo) -> Self {
        Self {
            description: m.description,
            keywords: m.keywords,
            robots: m.robots,
            canonical_url: m.canonical_url,
            sitemap: m.sitemap,
            table_of_contents: m.table_of_contents,
            share: m.share,
            comments: m.comments,
        }
    }
}

/// Body for creating or replacing a content item and its meta.
#[derive(Deserialize, ToSchema)]
pub struct ContentRequest {
    /// Author. Defaults to the site administrator.
    pub user_id: Option<Uuid>,
    pub section_id: Uuid,
    /// One of `article`, `blog`, `series`, `page`.
    #[schema(example = "article")]
    pub kind: String,
    #[schema(example = "Hello, world")]
    pub heading: String,
    #[serde(default)]
    pub summary: String,
    /// Markdown source.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub featured: bool,
    /// Required when `kind` is `series`.
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub series_order: i32,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: MetaPayload,
}

#[derive(Serialize, ToSchema)]
pub struct ContentDetail {
    pub id: Uuid,
    pub short_id: String,
    pub user_id: Uuid,
    pub section_id: Uuid,
    pub section_path: String,
    #[schema(example = "article")]
    pub kind: String,
    pub heading: String,
    pub summary: String,
    pub body: String,
    pub draft: bool,
    pub featured: bool,
    pub series: String,
    pub series_order: i32,
    pub published_at: Option<DateTime<Utc>>,
    /// `{normalized-heading}-{short_id}`, the generated file name.
    pub slug: String,
    pub meta: MetaPayload,
    pub tags: Vec<TagResponse>,
    pub header_image_url: String,
    pub thumbnail_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentItem> for ContentDetail {
    fn from(c: ContentItem) -> Self {
        Self {
            slug: c.slug(),
            id: c.id,
            short_id: c.short_id,
            user_id: c.user_id,
            section_id: c.section_id,
            section_path: c.section_path,
            kind: c.kind.as_str().to_string(),
            heading: c.heading,
            summary: c.summary,
            body: c.body,
            draft: c.draft,
            featured: c.featured,
            series: c.series,
            series_order: c.series_order,
            published_at: c.published_at,
            meta: c.meta.into(),
            tags: c
                .tags
                .into_iter()
                .map(|t| TagResponse {
                    slug: folio_common::slug::normalize(&t.name),
                    id: t.id,
                    name: t.name,
                })
                .collect(),
            header_image_url: c.header_image_url,
            thumbnail_url: c.thumbnail_url,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ContentEnvelope {
    pub content: ContentDetail,
}
