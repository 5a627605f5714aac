use folio_common::paths;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::site::{content_image, image, image_variant, section_image};
use crate::repo::VariantInput;

#[derive(Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub file_name: String,
    /// Relative to the site's images root.
    pub file_path: String,
    /// Where the image is served from in generated HTML.
    #[schema(example = "/static/images/blog/header_1700000000.png")]
    pub url: String,
    pub file_hash: String,
    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub alt_text: String,
    pub caption: String,
    pub long_description: String,
    pub decorative: bool,
}

impl From<image::Model> for ImageResponse {
    fn from(m: image::Model) -> Self {
        Self {
            id: m.id,
            url: paths::image_url(&m.file_path),
            file_name: m.file_name,
            file_path: m.file_path,
            file_hash: m.file_hash,
            mime: m.mime,
            size: m.size,
            width: m.width,
            height: m.height,
            title: m.title,
            alt_text: m.alt_text,
            caption: m.caption,
            long_description: m.long_description,
            decorative: m.decorative,
        }
    }
}

/// An image attached to content or a section. `id` is the relation's ID.
#[derive(Serialize, ToSchema)]
pub struct AttachedImage {
    pub id: Uuid,
    #[schema(example = "header")]
    pub purpose: String,
    pub position: i32,
    pub image: ImageResponse,
}

impl From<(content_image::Model, image::Model)> for AttachedImage {
    fn from((rel, img): (content_image::Model, image::Model)) -> Self {
        Self {
            id: rel.id,
            purpose: rel.purpose,
            position: rel.position,
            image: img.into(),
        }
    }
}

impl From<(section_image::Model, image::Model)> for AttachedImage {
    fn from((rel, img): (section_image::Model, image::Model)) -> Self {
        Self {
            id: rel.id,
            purpose: rel.purpose,
            position: rel.position,
            image: img.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AttachedImageEnvelope {
    pub image: AttachedImage,
}

#[derive(Serialize, ToSchema)]
pub struct AttachedImageListEnvelope {
    pub images: Vec<AttachedImage>,
}

#[derive(Deserialize, ToSchema)]
pub struct VariantRequest {
    #[schema(example = "thumb")]
    pub kind: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub mime: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub blob_ref: String,
}

impl From<VariantRequest> for VariantInput {
    fn from(r: VariantRequest) -> Self {
        Self {
            kind: r.kind,
            width: r.width,
            height: r.height,
            mime: r.mime,
            size: r.size,
            blob_ref: r.blob_ref,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct VariantResponse {
    pub id: Uuid,
    pub image_id: Uuid,
    pub kind: String,
    pub width: i32,
    pub height: i32,
    pub mime: String,
    pub size: i64,
    pub blob_ref: String,
}

impl From<image_variant::Model> for VariantResponse {
    fn from(m: image_variant::Model) -> Self {
        Self {
            id: m.id,
            image_id: m.image_id,
            kind: m.kind,
            width: m.width,
            height: m.height,
            mime: m.mime,
            size: m.size,
            blob_ref: m.blob_ref,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct VariantEnvelope {
    pub variant: VariantResponse,
}

#[derive(Serialize, ToSchema)]
pub struct VariantListEnvelope {
    pub variants: Vec<VariantResponse>,
}
