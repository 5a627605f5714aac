use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::site::CurrentSite;
use crate::models::param::*;
use crate::params;

#[utoipa::path(
    get,
    path = "/params",
    tag = "Params",
    operation_id = "listParams",
    summary = "List params",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses(
        (status = 200, description = "Params", body = ParamListEnvelope),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_params(
    CurrentSite(site): CurrentSite,
) -> Result<Json<ParamListEnvelope>, AppError> {
    let params = site.repo.list_params().await?;
    Ok(Json(ParamListEnvelope {
        params: params.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/params",
    tag = "Params",
    operation_id = "createParam",
    summary = "Create a param",
    description = "Params created here are never system params.",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    request_body = ParamRequest,
    responses(
        (status = 201, description = "Param created", body = ParamEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Ref key already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug(), ref_key = %payload.ref_key))]
pub async fn create_param(
    CurrentSite(site): CurrentSite,
    AppJson(payload): AppJson<ParamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let param = params::create_param(&site.repo, payload.into(), Uuid::nil()).await?;
    Ok((StatusCode::CREATED, Json(ParamEnvelope { param: param.into() })))
}

#[utoipa::path(
    get,
    path = "/params/{id}",
    tag = "Params",
    operation_id = "getParam",
    summary = "Get a param",
    params(
        ("id" = Uuid, Path, description = "Param ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Param", body = ParamEnvelope),
        (status = 404, description = "Param not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn get_param(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<ParamEnvelope>, AppError> {
    let param = site.repo.param(id).await?;
    Ok(Json(ParamEnvelope { param: param.into() }))
}

#[utoipa::path(
    put,
    path = "/params/{id}",
    tag = "Params",
    operation_id = "updateParam",
    summary = "Update a param",
    description = "For system params only `value` may change; changing the name, ref key or \
        description is rejected with 409.",
    params(
        ("id" = Uuid, Path, description = "Param ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body = ParamRequest,
    responses(
        (status = 200, description = "Param updated", body = ParamEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Param not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "System param mutation (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug()))]
pub async fn update_param(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ParamRequest>,
) -> Result<Json<ParamEnvelope>, AppError> {
    let param = params::update_param(&site.repo, id, payload.into(), Uuid::nil()).await?;
    Ok(Json(ParamEnvelope { param: param.into() }))
}

#[utoipa::path(
    delete,
    path = "/params/{id}",
    tag = "Params",
    operation_id = "deleteParam",
    summary = "Delete a param",
    params(
        ("id" = Uuid, Path, description = "Param ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Param deleted"),
        (status = 403, description = "System params cannot be deleted (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Param not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn delete_param(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    params::delete_param(&site.repo, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
