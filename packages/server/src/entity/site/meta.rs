use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SEO sidecar; exactly one row per content, written in the same transaction.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub short_id: String,

    #[sea_orm(unique)]
    pub content_id: Uuid,
    #[sea_orm(belongs_to, from = "content_id", to = "id", on_delete = "Cascade")]
    pub content: HasOne<super::content::Entity>,

    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub keywords: String,
    pub robots: String,
    pub canonical_url: String,
    pub sitemap: String,

    #[sea_orm(default_value = false)]
    pub table_of_contents: bool,
    #[sea_orm(default_value = false)]
    pub share: bool,
    #[sea_orm(default_value = false)]
    pub comments: bool,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
