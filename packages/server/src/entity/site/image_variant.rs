use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A rendition of an image. Rows are created explicitly; nothing synthesizes them.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image_variant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub short_id: String,

    #[sea_orm(indexed)]
    pub image_id: Uuid,
    #[sea_orm(belongs_to, from = "image_id", to = "id", on_delete = "Cascade")]
    pub image: HasOne<super::image::Entity>,

    /// `original`, `web`, `thumb`, ...
    pub kind: String,

    pub width: i32,
    pub height: i32,
    pub mime: String,
    pub size: i64,

    /// Opaque reference to the stored rendition.
    pub blob_ref: String,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
