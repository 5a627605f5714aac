use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::cancel::request_token;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::site::*;
use crate::orchestrator::CreateSite;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Sites",
    operation_id = "createSite",
    summary = "Create a site",
    description = "Registers the site, creates its directory tree and database, and seeds an \
        administrator plus default content. Any failure removes everything created so far.",
    request_body = CreateSiteRequest,
    responses(
        (status = 201, description = "Site created", body = CreatedSiteEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Slug already taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(slug = %payload.slug))]
pub async fn create_site(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSiteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (cancel, _guard) = request_token();
    let created = state
        .sites
        .create(
            CreateSite {
                name: payload.name.trim().to_string(),
                slug: payload.slug.trim().to_string(),
                mode: payload.mode.unwrap_or_else(|| "structured".into()),
                created_by: Uuid::nil(),
                admin_password: payload.admin_password,
            },
            &cancel,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedSiteEnvelope {
            site: created.site.into(),
            generated_password: created.generated_password,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Sites",
    operation_id = "listSites",
    summary = "List sites",
    description = "Lists sites sorted by name. Rows whose database file has disappeared are \
        pruned from the catalog and left out.",
    params(SiteListQuery),
    responses(
        (status = 200, description = "Sites", body = SiteListEnvelope),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_sites(
    State(state): State<AppState>,
    Query(query): Query<SiteListQuery>,
) -> Result<Json<SiteListEnvelope>, AppError> {
    let sites = state.sites.list(query.active_only.unwrap_or(false)).await?;
    Ok(Json(SiteListEnvelope {
        sites: sites.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/{site}",
    tag = "Sites",
    operation_id = "getSite",
    summary = "Get a site by slug",
    params(("site" = String, Path, description = "Site slug")),
    responses(
        (status = 200, description = "Site", body = SiteEnvelope),
        (status = 404, description = "Site not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_site(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> Result<Json<SiteEnvelope>, AppError> {
    let site = state.sites.get_by_slug(&site).await?;
    Ok(Json(SiteEnvelope { site: site.into() }))
}

#[utoipa::path(
    delete,
    path = "/{site}",
    tag = "Sites",
    operation_id = "deleteSite",
    summary = "Delete a site",
    description = "Removes the catalog row only. The site's files and database stay on disk.",
    params(("site" = Uuid, Path, description = "Site ID")),
    responses(
        (status = 204, description = "Site deleted"),
        (status = 404, description = "Site not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_site(
    State(state): State<AppState>,
    Path(site): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sites.delete(site).await?;
    Ok(StatusCode::NO_CONTENT)
}
