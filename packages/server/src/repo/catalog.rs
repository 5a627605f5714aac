use chrono::Utc;
use folio_common::SiteMode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::entity::catalog::site;
use crate::error::{Result, SsgError};

/// Fields required to register a site.
#[derive(Debug, Clone)]
pub struct NewSite {
    pub name: String,
    pub slug: String,
    pub mode: SiteMode,
    pub created_by: Uuid,
}

/// CRUD over the global site catalog.
#[derive(Clone)]
pub struct SiteStore {
    db: DatabaseConnection,
}

impl SiteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn insert(&self, new: &NewSite) -> Result<site::Model> {
        insert_site(&self.db, new).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<site::Model>> {
        Ok(site::Entity::find()
            .filter(site::Column::Slug.eq(slug))
            .one(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<site::Model>> {
        Ok(site::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// All rows sorted by name ascending.
    pub async fn list(&self, active_only: bool) -> Result<Vec<site::Model>> {
        let mut select = site::Entity::find();
        if active_only {
            select = select.filter(site::Column::Active.eq(true));
        }
        Ok(select
            .order_by_asc(site::Column::Name)
            .order_by_asc(site::Column::Slug)
            .all(&self.db)
            .await?)
    }

    /// Remove the metadata row. Returns whether a row existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        delete_site(&self.db, id).await
    }
}

pub(crate) async fn insert_site<C: ConnectionTrait>(conn: &C, new: &NewSite) -> Result<site::Model> {
    let now = Utc::now();
    let model = site::ActiveModel {
        id: Set(Uuid::now_v7()),
        short_id: Set(folio_common::slug::short_id()),
        name: Set(new.name.trim().to_string()),
        slug: Set(new.slug.clone()),
        mode: Set(new.mode.as_str().to_string()),
        active: Set(true),
        created_by: Set(new.created_by),
        updated_by: Set(new.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(conn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            SsgError::Conflict(format!("Site '{}' already exists", new.slug))
        }
        _ => SsgError::from(e),
    })
}

pub(crate) async fn delete_site<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool> {
    let res = site::Entity::delete_by_id(id).exec(conn).await?;
    Ok(res.rows_affected > 0)
}
