use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::catalog::site;

#[derive(Deserialize, ToSchema)]
pub struct CreateSiteRequest {
    #[schema(example = "Field Notes")]
    pub name: String,
    /// Kebab-case, `[a-z0-9-]` only.
    #[schema(example = "field-notes")]
    pub slug: String,
    /// `structured` (default) or `blog`.
    #[schema(example = "structured")]
    pub mode: Option<String>,
    /// Password for the seeded `admin` user. Generated when absent.
    pub admin_password: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct SiteListQuery {
    /// Only list active sites.
    pub active_only: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct SiteResponse {
    pub id: Uuid,
    pub short_id: String,
    pub name: String,
    pub slug: String,
    pub mode: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<site::Model> for SiteResponse {
    fn from(m: site::Model) -> Self {
        Self {
            id: m.id,
            short_id: m.short_id,
            name: m.name,
            slug: m.slug,
            mode: m.mode,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SiteEnvelope {
    pub site: SiteResponse,
}

#[derive(Serialize, ToSchema)]
pub struct CreatedSiteEnvelope {
    pub site: SiteResponse,
    /// Present only when the admin password was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SiteListEnvelope {
    pub sites: Vec<SiteResponse>,
}
