use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::site::CurrentSite;
use crate::models::section::*;

#[utoipa::path(
    get,
    path = "/sections",
    tag = "Sections",
    operation_id = "listSections",
    summary = "List sections",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses((status = 200, description = "Sections by path", body = SectionListEnvelope)),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_sections(
    CurrentSite(site): CurrentSite,
) -> Result<Json<SectionListEnvelope>, AppError> {
    let sections = site.repo.list_sections().await?;
    Ok(Json(SectionListEnvelope {
        sections: sections.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/sections",
    tag = "Sections",
    operation_id = "createSection",
    summary = "Create a section",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    request_body = SectionRequest,
    responses(
        (status = 201, description = "Section created", body = SectionEnvelope),
        (status = 400, description = "Blank name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Path already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug(), path = %payload.path))]
pub async fn create_section(
    CurrentSite(site): CurrentSite,
    AppJson(payload): AppJson<SectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(layout_id) = payload.layout_id {
        site.repo.layout(layout_id).await?;
    }
    let section = site.repo.create_section(&payload.into(), Uuid::nil()).await?;
    info!(path = %section.path, "Created section");
    Ok((StatusCode::CREATED, Json(SectionEnvelope { section: section.into() })))
}

#[utoipa::path(
    get,
    path = "/sections/{id}",
    tag = "Sections",
    operation_id = "getSection",
    summary = "Get a section",
    params(
        ("id" = Uuid, Path, description = "Section ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Section", body = SectionEnvelope),
        (status = 404, description = "Section not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn get_section(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<SectionEnvelope>, AppError> {
    let section = site.repo.section(id).await?;
    Ok(Json(SectionEnvelope { section: section.into() }))
}

#[utoipa::path(
    put,
    path = "/sections/{id}",
    tag = "Sections",
    operation_id = "updateSection",
    summary = "Update a section",
    description = "The root section keeps its name and `/` path.",
    params(
        ("id" = Uuid, Path, description = "Section ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body = SectionRequest,
    responses(
        (status = 200, description = "Section updated", body = SectionEnvelope),
        (status = 400, description = "Blank name or root rename (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Section or layout not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Path already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug()))]
pub async fn update_section(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SectionRequest>,
) -> Result<Json<SectionEnvelope>, AppError> {
    let section = site
        .repo
        .update_section(id, &payload.into(), Uuid::nil())
        .await?;
    Ok(Json(SectionEnvelope { section: section.into() }))
}

#[utoipa::path(
    delete,
    path = "/sections/{id}",
    tag = "Sections",
    operation_id = "deleteSection",
    summary = "Delete a section",
    params(
        ("id" = Uuid, Path, description = "Section ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Section deleted"),
        (status = 404, description = "Section not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Root section or section with content (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn delete_section(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let tx = site.repo.begin_tx().await?;
    tx.delete_section(id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/layouts",
    tag = "Sections",
    operation_id = "listLayouts",
    summary = "List layouts",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses((status = 200, description = "Layouts by name", body = LayoutListEnvelope)),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_layouts(
    CurrentSite(site): CurrentSite,
) -> Result<Json<LayoutListEnvelope>, AppError> {
    let layouts = site.repo.list_layouts().await?;
    Ok(Json(LayoutListEnvelope {
        layouts: layouts.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/layouts",
    tag = "Sections",
    operation_id = "createLayout",
    summary = "Create a layout",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    request_body = LayoutRequest,
    responses(
        (status = 201, description = "Layout created", body = LayoutEnvelope),
        (status = 400, description = "Blank name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug(), name = %payload.name))]
pub async fn create_layout(
    CurrentSite(site): CurrentSite,
    AppJson(payload): AppJson<LayoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let layout = site.repo.create_layout(&payload.into(), Uuid::nil()).await?;
    Ok((StatusCode::CREATED, Json(LayoutEnvelope { layout: layout.into() })))
}

#[utoipa::path(
    get,
    path = "/layouts/{id}",
    tag = "Sections",
    operation_id = "getLayout",
    summary = "Get a layout",
    params(
        ("id" = Uuid, Path, description = "Layout ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Layout", body = LayoutEnvelope),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn get_layout(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<LayoutEnvelope>, AppError> {
    let layout = site.repo.layout(id).await?;
    Ok(Json(LayoutEnvelope { layout: layout.into() }))
}

#[utoipa::path(
    put,
    path = "/layouts/{id}",
    tag = "Sections",
    operation_id = "updateLayout",
    summary = "Update a layout",
    params(
        ("id" = Uuid, Path, description = "Layout ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body = LayoutRequest,
    responses(
        (status = 200, description = "Layout updated", body = LayoutEnvelope),
        (status = 400, description = "Blank name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug()))]
pub async fn update_layout(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<LayoutRequest>,
) -> Result<Json<LayoutEnvelope>, AppError> {
    let layout = site
        .repo
        .update_layout(id, &payload.into(), Uuid::nil())
        .await?;
    Ok(Json(LayoutEnvelope { layout: layout.into() }))
}

#[utoipa::path(
    delete,
    path = "/layouts/{id}",
    tag = "Sections",
    operation_id = "deleteLayout",
    summary = "Delete a layout",
    description = "Sections using it fall back to the built-in layout.",
    params(
        ("id" = Uuid, Path, description = "Layout ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Layout deleted"),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn delete_layout(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let tx = site.repo.begin_tx().await?;
    tx.delete_layout(id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
