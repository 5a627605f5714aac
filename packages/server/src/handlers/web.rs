use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::site::CurrentSite;
use crate::models::site::SiteListEnvelope;
use crate::models::web::*;
use crate::state::AppState;

/// Site picker. Exempt from binding so a stale cookie can always be replaced.
#[instrument(skip(state))]
pub async fn sites_page(State(state): State<AppState>) -> Result<Json<SiteListEnvelope>, AppError> {
    let sites = state.sites.list(true).await?;
    Ok(Json(SiteListEnvelope {
        sites: sites.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn current_page(
    CurrentSite(site): CurrentSite,
) -> Result<Json<CurrentPageEnvelope>, AppError> {
    let sections = site.repo.list_sections().await?;
    Ok(Json(CurrentPageEnvelope {
        page: CurrentPage {
            site: site.site.into(),
            sections: sections.into_iter().map(Into::into).collect(),
        },
    }))
}
