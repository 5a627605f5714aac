use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A tenant registered in the global catalog.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub short_id: String,

    pub name: String,

    /// Kebab-case, `[a-z0-9-]` only.
    #[sea_orm(unique)]
    pub slug: String,

    /// `structured` or `blog`.
    pub mode: String,

    #[sea_orm(default_value = true)]
    pub active: bool,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
