use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::site::SiteResponse;
use crate::entity::site::section;

#[derive(Serialize, ToSchema)]
pub struct SectionSummary {
    pub id: Uuid,
    pub name: String,
    pub path: String,
}

impl From<section::Model> for SectionSummary {
    fn from(m: section::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            path: m.path,
        }
    }
}

/// What the editing screens need to render for the bound site.
#[derive(Serialize, ToSchema)]
pub struct CurrentPage {
    pub site: SiteResponse,
    pub sections: Vec<SectionSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct CurrentPageEnvelope {
    pub page: CurrentPage,
}
