use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::site::{layout, section};
use crate::repo::{LayoutInput, SectionInput};

#[derive(Deserialize, ToSchema)]
pub struct SectionRequest {
    #[schema(example = "Tech")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Normalized to a leading and trailing slash, e.g. `tech` becomes `/tech/`.
    #[schema(example = "/tech/")]
    pub path: String,
    pub layout_id: Option<Uuid>,
}

impl From<SectionRequest> for SectionInput {
    fn from(r: SectionRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            path: r.path,
            layout_id: r.layout_id,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SectionResponse {
    pub id: Uuid,
    pub short_id: String,
    pub name: String,
    pub description: String,
    pub path: String,
    pub layout_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<section::Model> for SectionResponse {
    fn from(m: section::Model) -> Self {
        Self {
            id: m.id,
            short_id: m.short_id,
            name: m.name,
            description: m.description,
            path: m.path,
            layout_id: m.layout_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SectionEnvelope {
    pub section: SectionResponse,
}

#[derive(Serialize, ToSchema)]
pub struct SectionListEnvelope {
    pub sections: Vec<SectionResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct LayoutRequest {
    #[schema(example = "default")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Template body. Empty falls back to the built-in layout.
    #[serde(default)]
    pub code: String,
}

impl From<LayoutRequest> for LayoutInput {
    fn from(r: LayoutRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            description: r.description,
            code: r.code,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LayoutResponse {
    pub id: Uuid,
    pub short_id: String,
    pub name: String,
    pub description: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<layout::Model> for LayoutResponse {
    fn from(m: layout::Model) -> Self {
        Self {
            id: m.id,
            short_id: m.short_id,
            name: m.name,
            description: m.description,
            code: m.code,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LayoutEnvelope {
    pub layout: LayoutResponse,
}

#[derive(Serialize, ToSchema)]
pub struct LayoutListEnvelope {
    pub layouts: Vec<LayoutResponse>,
}
