use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "section_image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub section_id: Uuid,
    #[sea_orm(belongs_to, from = "section_id", to = "id", on_delete = "Cascade")]
    pub section: HasOne<super::section::Entity>,

    pub image_id: Uuid,
    #[sea_orm(belongs_to, from = "image_id", to = "id", on_delete = "Cascade")]
    pub image: HasOne<super::image::Entity>,

    /// `header` or `blog_header`.
    pub purpose: String,

    #[sea_orm(default_value = 0)]
    pub position: i32,

    #[sea_orm(default_value = true)]
    pub active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
