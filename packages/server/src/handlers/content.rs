use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use folio_common::ContentKind;

use crate::error::{AppError, ErrorBody, SsgError};
use crate::extractors::json::AppJson;
use crate::extractors::site::CurrentSite;
use crate::models::content::*;
use crate::models::shared::Pagination;
use crate::repo::{ContentInput, SiteRepo};
use crate::seed::ADMIN_USERNAME;

#[utoipa::path(
    get,
    path = "/contents",
    tag = "Contents",
    operation_id = "searchContents",
    summary = "Search content",
    description = "Paginated, newest first. `q` matches heading or body, ignoring case; \
        `%` and `_` are matched literally.",
    params(
        ContentSearchQuery,
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Matching content", body = ContentListEnvelope),
        (status = 400, description = "Missing site header (BAD_REQUEST)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, query), fields(site = %site.slug()))]
pub async fn search_contents(
    CurrentSite(site): CurrentSite,
    Query(query): Query<ContentSearchQuery>,
) -> Result<Json<ContentListEnvelope>, AppError> {
    let (page, per_page) = Pagination::clamp(query.page, query.per_page);
    let offset = (page - 1) * per_page;
    let (items, total) = site
        .repo
        .search_contents(offset, per_page, query.q.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(ContentListEnvelope {
        contents: items.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Resolve the request into repository input; the author defaults to the administrator.
async fn content_input(repo: &SiteRepo, req: &ContentRequest) -> Result<ContentInput, AppError> {
    let kind: ContentKind = req.kind.parse().map_err(SsgError::from)?;
    let user_id = match req.user_id {
        Some(id) => id,
        None => repo
            .user_by_username(ADMIN_USERNAME)
            .await?
            .map(|u| u.id)
            .unwrap_or_default(),
    };
    Ok(ContentInput {
        user_id,
        section_id: req.section_id,
        kind,
        heading: req.heading.clone(),
        summary: req.summary.clone(),
        body: req.body.clone(),
        draft: req.draft,
        featured: req.featured,
        series: req.series.clone(),
        series_order: req.series_order,
        published_at: req.published_at,
    })
}

#[utoipa::path(
    post,
    path = "/contents",
    tag = "Contents",
    operation_id = "createContent",
    summary = "Create a content item",
    description = "Writes the content row and its meta row in one transaction.",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    request_body = ContentRequest,
    responses(
        (status = 201, description = "Content created", body = ContentEnvelope),
        (status = 400, description = "Invalid kind, blank heading or unnamed series (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Section not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug(), heading = %payload.heading))]
pub async fn create_content(
    CurrentSite(site): CurrentSite,
    AppJson(payload): AppJson<ContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = content_input(&site.repo, &payload).await?;
    let model = site
        .repo
        .create_content(&input, &payload.meta.into(), Uuid::nil())
        .await?;
    let item = site.repo.content_item(model.id).await?;
    Ok((StatusCode::CREATED, Json(ContentEnvelope { content: item.into() })))
}

#[utoipa::path(
    get,
    path = "/contents/{id}",
    tag = "Contents",
    operation_id = "getContent",
    summary = "Get a content item",
    description = "Includes meta, tags and resolved image URLs.",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Content", body = ContentEnvelope),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn get_content(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentEnvelope>, AppError> {
    let item = site.repo.content_item(id).await?;
    Ok(Json(ContentEnvelope { content: item.into() }))
}

#[utoipa::path(
    put,
    path = "/contents/{id}",
    tag = "Contents",
    operation_id = "updateContent",
    summary = "Replace a content item",
    description = "Content and meta are replaced together.",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Content updated", body = ContentEnvelope),
        (status = 400, description = "Invalid body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content or section not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug()))]
pub async fn update_content(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ContentRequest>,
) -> Result<Json<ContentEnvelope>, AppError> {
    let input = content_input(&site.repo, &payload).await?;
    site.repo
        .update_content(id, &input, &payload.meta.into(), Uuid::nil())
        .await?;
    let item = site.repo.content_item(id).await?;
    Ok(Json(ContentEnvelope { content: item.into() }))
}

#[utoipa::path(
    delete,
    path = "/contents/{id}",
    tag = "Contents",
    operation_id = "deleteContent",
    summary = "Delete a content item",
    description = "Removes its meta, tag links and image links. Image files stay on disk.",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Content deleted"),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn delete_content(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    site.repo.delete_content(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/contents/{id}/tags",
    tag = "Contents",
    operation_id = "listContentTags",
    summary = "List a content item's tags",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Tags", body = TagListEnvelope),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_content_tags(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<TagListEnvelope>, AppError> {
    site.repo.content(id).await?;
    let tags = site.repo.tags_for_content(id).await?;
    Ok(Json(TagListEnvelope {
        tags: tags.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/contents/{id}/tags",
    tag = "Contents",
    operation_id = "addContentTag",
    summary = "Tag a content item",
    description = "Links the tag with the given name, creating the tag first if needed. \
        Adding a tag twice is a no-op.",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body = AddTagRequest,
    responses(
        (status = 201, description = "Tag linked", body = TagEnvelope),
        (status = 400, description = "Blank tag name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug(), tag = %payload.name))]
pub async fn add_content_tag(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AddTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    site.repo.content(id).await?;
    let tag = site.repo.find_or_create_tag(&payload.name, Uuid::nil()).await?;
    site.repo.add_tag(id, tag.id).await?;
    Ok((StatusCode::CREATED, Json(TagEnvelope { tag: tag.into() })))
}

#[utoipa::path(
    delete,
    path = "/contents/{id}/tags/{tag_id}",
    tag = "Contents",
    operation_id = "removeContentTag",
    summary = "Untag a content item",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("tag_id" = Uuid, Path, description = "Tag ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Tag unlinked"),
        (status = 404, description = "Content is not tagged with it (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn remove_content_tag(
    CurrentSite(site): CurrentSite,
    Path((id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !site.repo.remove_tag(id, tag_id).await? {
        return Err(AppError::NotFound(format!(
            "Content {id} is not tagged with {tag_id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/tags",
    tag = "Contents",
    operation_id = "listTags",
    summary = "List tags",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses((status = 200, description = "Tags by name", body = TagListEnvelope)),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_tags(CurrentSite(site): CurrentSite) -> Result<Json<TagListEnvelope>, AppError> {
    let tags = site.repo.list_tags().await?;
    Ok(Json(TagListEnvelope {
        tags: tags.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/tags/{id}",
    tag = "Contents",
    operation_id = "deleteTag",
    summary = "Delete a tag",
    description = "Also unlinks it from every content item.",
    params(
        ("id" = Uuid, Path, description = "Tag ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn delete_tag(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    site.repo.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
