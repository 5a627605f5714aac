use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An uploaded image. Purpose lives on the relation rows, not here.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub short_id: String,

    pub file_name: String,

    /// Relative to the site's images root.
    pub file_path: String,

    /// SHA-256, lowercase hex.
    #[sea_orm(indexed)]
    pub file_hash: String,

    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub alt_text: String,
    #[sea_orm(column_type = "Text")]
    pub long_description: String,
    #[sea_orm(column_type = "Text")]
    pub caption: String,
    #[sea_orm(default_value = false)]
    pub decorative: bool,
    pub described_by_id: String,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
