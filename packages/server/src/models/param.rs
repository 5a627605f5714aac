use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::site::param;
use crate::repo::ParamInput;

#[derive(Deserialize, ToSchema)]
pub struct ParamRequest {
    #[schema(example = "Header style")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(example = "plain")]
    pub value: String,
    /// Dotted lower-case key, e.g. `ssg.header.style`.
    #[schema(example = "ssg.header.style")]
    pub ref_key: String,
}

impl From<ParamRequest> for ParamInput {
    fn from(r: ParamRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            description: r.description,
            value: r.value,
            ref_key: r.ref_key.trim().to_string(),
            system: false,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ParamResponse {
    pub id: Uuid,
    pub short_id: String,
    pub name: String,
    pub description: String,
    pub value: String,
    pub ref_key: String,
    /// System params accept value changes only and cannot be deleted.
    pub system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<param::Model> for ParamResponse {
    fn from(m: param::Model) -> Self {
        Self {
            id: m.id,
            short_id: m.short_id,
            name: m.name,
            description: m.description,
            value: m.value,
            ref_key: m.ref_key,
            system: m.system,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ParamEnvelope {
    pub param: ParamResponse,
}

#[derive(Serialize, ToSchema)]
pub struct ParamListEnvelope {
    pub params: Vec<ParamResponse>,
}
