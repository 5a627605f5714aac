use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub short_id: String,

    pub user_id: Uuid,

    #[sea_orm(indexed)]
    pub section_id: Uuid,
    #[sea_orm(belongs_to, from = "section_id", to = "id")]
    pub section: HasOne<super::section::Entity>,

    /// `article`, `blog`, `series` or `page`.
    #[sea_orm(indexed)]
    pub kind: String,

    pub heading: String,

    #[sea_orm(column_type = "Text")]
    pub summary: String,

    /// Markdown source.
    #[sea_orm(column_type = "Text")]
    pub body: String,

    #[sea_orm(default_value = false)]
    pub draft: bool,

    #[sea_orm(default_value = false)]
    pub featured: bool,

    pub series: String,

    #[sea_orm(default_value = 0)]
    pub series_order: i32,

    pub published_at: Option<DateTimeUtc>,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
