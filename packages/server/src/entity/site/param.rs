use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Runtime-tunable value. System params only allow their `value` to change.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "param")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub short_id: String,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// Dotted lower-case key, e.g. `ssg.header.style`.
    #[sea_orm(unique)]
    pub ref_key: String,

    #[sea_orm(default_value = false)]
    pub system: bool,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
