use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use folio_common::ImagePurpose;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::site::CurrentSite;
use crate::images::{ImageManager, ImageUpload};
use crate::models::image::*;
use crate::state::AppState;

pub fn image_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(32 * 1024 * 1024) // 32 MB
}

/// Multipart form shared by content and section uploads.
struct UploadForm {
    purpose: Option<String>,
    upload: ImageUpload,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut purpose = None;
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut upload = ImageUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
            file = Some((file_name, data.to_vec()));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
        match name.as_str() {
            "purpose" => purpose = Some(text),
            "title" => upload.title = text,
            "alt_text" => upload.alt_text = text,
            "caption" => upload.caption = text,
            "long_description" => upload.long_description = text,
            "decorative" => upload.decorative = matches!(text.trim(), "true" | "1" | "on"),
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }
    upload.file_name = file_name;
    upload.data = data;
    Ok(UploadForm { purpose, upload })
}

fn parse_purpose(raw: Option<&str>, default: ImagePurpose) -> Result<ImagePurpose, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(p) => p
            .parse()
            .map_err(|e: folio_common::ModelError| AppError::Validation(e.to_string())),
        None => Ok(default),
    }
}

#[utoipa::path(
    post,
    path = "/contents/{id}/images",
    tag = "Images",
    operation_id = "uploadContentImage",
    summary = "Upload an image for a content item",
    description = "Multipart fields: `file` (required), `purpose` (`content`, `header` or \
        `thumbnail`; default `content`), `title`, `alt_text`, `caption`, `long_description`, \
        `decorative`. A new header or thumbnail replaces the previous file.",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body(content_type = "multipart/form-data", description = "Image file and metadata"),
    responses(
        (status = 201, description = "Image stored", body = AttachedImageEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site, multipart), fields(site = %site.slug()))]
pub async fn upload_content_image(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let purpose = parse_purpose(form.purpose.as_deref(), ImagePurpose::Content)?;
    if purpose.is_section_purpose() {
        return Err(AppError::Validation(format!(
            "Purpose '{purpose}' applies to sections, not content"
        )));
    }

    let images_root = state.workspace.site_paths(site.slug()).images;
    let manager = ImageManager::new(&site.repo, &images_root);
    let attached = manager
        .upload_for_content(id, purpose, form.upload, Uuid::nil())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AttachedImageEnvelope {
            image: attached.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/contents/{id}/images",
    tag = "Images",
    operation_id = "listContentImages",
    summary = "List a content item's active images",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Images ordered by position", body = AttachedImageListEnvelope),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_content_images(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<AttachedImageListEnvelope>, AppError> {
    site.repo.content(id).await?;
    let images = site.repo.content_images(id).await?;
    Ok(Json(AttachedImageListEnvelope {
        images: images.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/contents/{id}/images/{image_rel_id}",
    tag = "Images",
    operation_id = "deleteContentImage",
    summary = "Detach an image from a content item",
    description = "Deletes the relation and the file. A file that is already gone is ignored.",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("image_rel_id" = Uuid, Path, description = "Content image relation ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Relation not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site), fields(site = %site.slug()))]
pub async fn delete_content_image(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
    Path((id, image_rel_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let images_root = state.workspace.site_paths(site.slug()).images;
    ImageManager::new(&site.repo, &images_root)
        .delete_for_content(id, image_rel_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/sections/{id}/images",
    tag = "Images",
    operation_id = "uploadSectionImage",
    summary = "Upload a section header or blog header",
    description = "Multipart fields as for content uploads; `purpose` is `section_header` \
        (default) or `blog_header`. The previous image for the purpose is replaced.",
    params(
        ("id" = Uuid, Path, description = "Section ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body(content_type = "multipart/form-data", description = "Image file and metadata"),
    responses(
        (status = 201, description = "Image stored", body = AttachedImageEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Section not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site, multipart), fields(site = %site.slug()))]
pub async fn upload_section_image(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let purpose = parse_purpose(form.purpose.as_deref(), ImagePurpose::SectionHeader)?;
    if !purpose.is_section_purpose() {
        return Err(AppError::Validation(format!(
            "Purpose '{purpose}' applies to content, not sections"
        )));
    }

    let images_root = state.workspace.site_paths(site.slug()).images;
    let manager = ImageManager::new(&site.repo, &images_root);
    let attached = manager
        .upload_for_section(id, purpose, form.upload, Uuid::nil())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AttachedImageEnvelope {
            image: attached.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/sections/{id}/images",
    tag = "Images",
    operation_id = "listSectionImages",
    summary = "List a section's active images",
    params(
        ("id" = Uuid, Path, description = "Section ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Images", body = AttachedImageListEnvelope),
        (status = 404, description = "Section not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_section_images(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<AttachedImageListEnvelope>, AppError> {
    site.repo.section(id).await?;
    let images = site.repo.section_images(id).await?;
    Ok(Json(AttachedImageListEnvelope {
        images: images.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/sections/{id}/images/{image_rel_id}",
    tag = "Images",
    operation_id = "deleteSectionImage",
    summary = "Detach an image from a section",
    params(
        ("id" = Uuid, Path, description = "Section ID"),
        ("image_rel_id" = Uuid, Path, description = "Section image relation ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Relation not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site), fields(site = %site.slug()))]
pub async fn delete_section_image(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
    Path((id, image_rel_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let images_root = state.workspace.site_paths(site.slug()).images;
    ImageManager::new(&site.repo, &images_root)
        .delete_for_section(id, image_rel_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/images/{id}/variants",
    tag = "Images",
    operation_id = "listImageVariants",
    summary = "List an image's variants",
    params(
        ("id" = Uuid, Path, description = "Image ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 200, description = "Variants", body = VariantListEnvelope),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn list_variants(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
) -> Result<Json<VariantListEnvelope>, AppError> {
    site.repo.image(id).await?;
    let variants = site.repo.list_variants(id).await?;
    Ok(Json(VariantListEnvelope {
        variants: variants.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/images/{id}/variants",
    tag = "Images",
    operation_id = "createImageVariant",
    summary = "Record an image variant",
    description = "Stores the variant metadata as given. No rendition is produced.",
    params(
        ("id" = Uuid, Path, description = "Image ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    request_body = VariantRequest,
    responses(
        (status = 201, description = "Variant created", body = VariantEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site, payload), fields(site = %site.slug()))]
pub async fn create_variant(
    CurrentSite(site): CurrentSite,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<VariantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let variant = site
        .repo
        .create_variant(id, &payload.into(), Uuid::nil())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(VariantEnvelope {
            variant: variant.into(),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/images/{id}/variants/{variant_id}",
    tag = "Images",
    operation_id = "deleteImageVariant",
    summary = "Delete an image variant",
    params(
        ("id" = Uuid, Path, description = "Image ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID"),
        ("X-Site-Slug" = String, Header, description = "Site slug"),
    ),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(site), fields(site = %site.slug()))]
pub async fn delete_variant(
    CurrentSite(site): CurrentSite,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !site.repo.delete_variant(id, variant_id).await? {
        return Err(AppError::NotFound(format!("Variant {variant_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
