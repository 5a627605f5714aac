use std::collections::HashMap;

use chrono::{DateTime, Utc};
use folio_common::model::ROOT_SECTION_NAME;
use folio_common::{ContentItem, ContentKind, MetaInfo, SectionRef, TagRef, paths, slug};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, OnConflict, Query as SeaQuery};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::site::{
    content, content_image, content_tag, image, image_variant, layout, meta, param, section,
    section_image, tag, user,
};
use crate::error::{Result, SsgError};

#[derive(Debug, Clone)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutInput {
    pub name: String,
    pub description: String,
    pub code: String,
}

impl LayoutInput {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SsgError::Validation("Layout name must not be blank".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionInput {
    pub name: String,
    pub description: String,
    pub path: String,
    pub layout_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ContentInput {
    pub user_id: Uuid,
    pub section_id: Uuid,
    pub kind: ContentKind,
    pub heading: String,
    pub summary: String,
    pub body: String,
    pub draft: bool,
    pub featured: bool,
    pub series: String,
    pub series_order: i32,
    pub published_at: Option<DateTime<Utc>>,
}

impl ContentInput {
    fn validate(&self) -> Result<()> {
        if self.heading.trim().is_empty() {
            return Err(SsgError::Validation("Heading must not be blank".into()));
        }
        if self.kind == ContentKind::Series && self.series.trim().is_empty() {
            return Err(SsgError::Validation(
                "Series content requires a series name".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParamInput {
    pub name: String,
    pub description: String,
    pub value: String,
    pub ref_key: String,
    pub system: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ImageInput {
    pub file_name: String,
    pub file_path: String,
    pub file_hash: String,
    pub mime: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub alt_text: String,
    pub long_description: String,
    pub caption: String,
    pub decorative: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VariantInput {
    pub kind: String,
    pub width: i32,
    pub height: i32,
    pub mime: String,
    pub size: i64,
    pub blob_ref: String,
}

/// Data access for one site's database.
///
/// `C` is either the pooled connection or an open transaction; every query
/// method works on both, so callers compose multi-row writes by running them
/// on the repository returned from [`SiteRepo::begin_tx`].
#[derive(Clone)]
pub struct SiteRepo<C = DatabaseConnection> {
    slug: String,
    conn: C,
}

impl<C> SiteRepo<C> {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }
}

impl SiteRepo<DatabaseConnection> {
    pub fn new(slug: impl Into<String>, conn: DatabaseConnection) -> Self {
        Self {
            slug: slug.into(),
            conn,
        }
    }

    pub async fn begin_tx(&self) -> Result<SiteRepo<DatabaseTransaction>> {
        Ok(SiteRepo {
            slug: self.slug.clone(),
            conn: self.conn.begin().await?,
        })
    }

    pub async fn close(self) -> Result<()> {
        Ok(self.conn.close().await?)
    }

    /// Content plus its meta row, in one transaction.
    pub async fn create_content(
        &self,
        input: &ContentInput,
        meta: &MetaInfo,
        actor: Uuid,
    ) -> Result<content::Model> {
        let tx = self.begin_tx().await?;
        let model = tx.insert_content(input, meta, actor).await?;
        tx.commit().await?;
        Ok(model)
    }

    pub async fn update_content(
        &self,
        id: Uuid,
        input: &ContentInput,
        meta: &MetaInfo,
        actor: Uuid,
    ) -> Result<content::Model> {
        let tx = self.begin_tx().await?;
        let model = tx.replace_content(id, input, meta, actor).await?;
        tx.commit().await?;
        Ok(model)
    }

    pub async fn delete_content(&self, id: Uuid) -> Result<()> {
        let tx = self.begin_tx().await?;
        tx.remove_content(id).await?;
        tx.commit().await
    }
}

impl SiteRepo<DatabaseTransaction> {
    pub async fn commit(self) -> Result<()> {
        Ok(self.conn.commit().await?)
    }

    pub async fn rollback(self) -> Result<()> {
        Ok(self.conn.rollback().await?)
    }
}

fn not_found(what: &str, id: Uuid) -> SsgError {
    SsgError::NotFound(format!("{what} {id} not found"))
}

fn unique_conflict(err: DbErr, message: impl FnOnce() -> String) -> SsgError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => SsgError::Conflict(message()),
        _ => SsgError::from(err),
    }
}

impl<C: ConnectionTrait> SiteRepo<C> {
    // Users

    pub async fn create_user(&self, input: &UserInput, actor: Uuid) -> Result<user::Model> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            username: Set(input.username.clone()),
            email: Set(input.email.clone()),
            name: Set(input.name.clone()),
            password_hash: Set(input.password_hash.clone()),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&self.conn).await.map_err(|e| {
            unique_conflict(e, || format!("User '{}' already exists", input.username))
        })
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.conn)
            .await?)
    }

    // Layouts

    pub async fn create_layout(&self, input: &LayoutInput, actor: Uuid) -> Result<layout::Model> {
        input.validate()?;
        let now = Utc::now();
        let model = layout::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            code: Set(input.code.clone()),
            header_image_id: Set(None),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model
            .insert(&self.conn)
            .await
            .map_err(|e| unique_conflict(e, || format!("Layout '{}' already exists", input.name)))
    }

    pub async fn list_layouts(&self) -> Result<Vec<layout::Model>> {
        Ok(layout::Entity::find()
            .order_by_asc(layout::Column::Name)
            .all(&self.conn)
            .await?)
    }

    pub async fn layout(&self, id: Uuid) -> Result<layout::Model> {
        layout::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Layout", id))
    }

    pub async fn update_layout(
        &self,
        id: Uuid,
        input: &LayoutInput,
        actor: Uuid,
    ) -> Result<layout::Model> {
        input.validate()?;
        let mut active: layout::ActiveModel = self.layout(id).await?.into();
        active.name = Set(input.name.clone());
        active.description = Set(input.description.clone());
        active.code = Set(input.code.clone());
        active.updated_by = Set(actor);
        active.updated_at = Set(Utc::now());
        active
            .update(&self.conn)
            .await
            .map_err(|e| unique_conflict(e, || format!("Layout '{}' already exists", input.name)))
    }

    /// Sections pointing at the layout fall back to no layout.
    pub async fn delete_layout(&self, id: Uuid) -> Result<()> {
        self.layout(id).await?;
        section::Entity::update_many()
            .col_expr(section::Column::LayoutId, Expr::value(Option::<Uuid>::None))
            .filter(section::Column::LayoutId.eq(id))
            .exec(&self.conn)
            .await?;
        layout::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    // Sections

    pub async fn create_section(&self, input: &SectionInput, actor: Uuid) -> Result<section::Model> {
        if input.name.trim().is_empty() {
            return Err(SsgError::Validation("Section name must not be blank".into()));
        }
        let path = paths::section_path(&input.path);
        let now = Utc::now();
        let model = section::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.clone()),
            path: Set(path.clone()),
            layout_id: Set(input.layout_id),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model
            .insert(&self.conn)
            .await
            .map_err(|e| unique_conflict(e, || format!("Section path '{path}' already exists")))
    }

    pub async fn section(&self, id: Uuid) -> Result<section::Model> {
        section::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Section", id))
    }

    pub async fn update_section(
        &self,
        id: Uuid,
        input: &SectionInput,
        actor: Uuid,
    ) -> Result<section::Model> {
        if input.name.trim().is_empty() {
            return Err(SsgError::Validation("Section name must not be blank".into()));
        }
        let existing = self.section(id).await?;
        if let Some(layout_id) = input.layout_id {
            self.layout(layout_id).await?;
        }
        let path = paths::section_path(&input.path);
        let renames_root = input.name.trim() != ROOT_SECTION_NAME || path != "/";
        if existing.name == ROOT_SECTION_NAME && renames_root {
            return Err(SsgError::Validation(
                "The root section keeps its name and path".into(),
            ));
        }

        let mut active: section::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.description = Set(input.description.clone());
        active.path = Set(path.clone());
        active.layout_id = Set(input.layout_id);
        active.updated_by = Set(actor);
        active.updated_at = Set(Utc::now());
        active
            .update(&self.conn)
            .await
            .map_err(|e| unique_conflict(e, || format!("Section path '{path}' already exists")))
    }

    /// Refuses the root section and sections that still hold content.
    pub async fn delete_section(&self, id: Uuid) -> Result<()> {
        let existing = self.section(id).await?;
        if existing.name == ROOT_SECTION_NAME {
            return Err(SsgError::Conflict("The root section cannot be deleted".into()));
        }
        let used = content::Entity::find()
            .filter(content::Column::SectionId.eq(id))
            .count(&self.conn)
            .await?;
        if used > 0 {
            return Err(SsgError::Conflict(format!(
                "Section '{}' still holds {used} content item(s)",
                existing.name
            )));
        }
        section_image::Entity::delete_many()
            .filter(section_image::Column::SectionId.eq(id))
            .exec(&self.conn)
            .await?;
        section::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn list_sections(&self) -> Result<Vec<section::Model>> {
        Ok(section::Entity::find()
            .order_by_asc(section::Column::Path)
            .all(&self.conn)
            .await?)
    }

    /// Sections with their active header and blog-header image URLs.
    pub async fn section_refs(&self) -> Result<Vec<SectionRef>> {
        let sections = self.list_sections().await?;
        let images = section_image::Entity::find()
            .filter(section_image::Column::Active.eq(true))
            .order_by_asc(section_image::Column::Position)
            .find_also_related(image::Entity)
            .all(&self.conn)
            .await?;

        let mut urls: HashMap<(Uuid, String), String> = HashMap::new();
        for (rel, img) in images {
            if let Some(img) = img {
                urls.entry((rel.section_id, rel.purpose))
                    .or_insert_with(|| paths::image_url(&img.file_path));
            }
        }

        Ok(sections
            .into_iter()
            .map(|s| {
                let url = |purpose: &str| {
                    urls.get(&(s.id, purpose.to_string()))
                        .cloned()
                        .unwrap_or_default()
                };
                SectionRef {
                    header_image_url: url("header"),
                    blog_header_image_url: url("blog_header"),
                    id: s.id,
                    name: s.name,
                    description: s.description,
                    path: s.path,
                }
            })
            .collect())
    }

    pub async fn root_section(&self) -> Result<Option<section::Model>> {
        Ok(section::Entity::find()
            .filter(section::Column::Name.eq(ROOT_SECTION_NAME))
            .one(&self.conn)
            .await?)
    }

    // Contents

    pub async fn insert_content(
        &self,
        input: &ContentInput,
        meta: &MetaInfo,
        actor: Uuid,
    ) -> Result<content::Model> {
        input.validate()?;
        self.section(input.section_id).await?;

        let now = Utc::now();
        let model = content::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            user_id: Set(input.user_id),
            section_id: Set(input.section_id),
            kind: Set(input.kind.as_str().to_string()),
            heading: Set(input.heading.trim().to_string()),
            summary: Set(input.summary.clone()),
            body: Set(input.body.clone()),
            draft: Set(input.draft),
            featured: Set(input.featured),
            series: Set(input.series.trim().to_string()),
            series_order: Set(input.series_order),
            published_at: Set(input.published_at),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await?;

        meta_active_model(model.id, meta, actor, now)
            .insert(&self.conn)
            .await?;

        Ok(model)
    }

    pub async fn replace_content(
        &self,
        id: Uuid,
        input: &ContentInput,
        meta: &MetaInfo,
        actor: Uuid,
    ) -> Result<content::Model> {
        input.validate()?;
        let existing = self.content(id).await?;
        self.section(input.section_id).await?;

        let now = Utc::now();
        let mut active: content::ActiveModel = existing.into();
        active.user_id = Set(input.user_id);
        active.section_id = Set(input.section_id);
        active.kind = Set(input.kind.as_str().to_string());
        active.heading = Set(input.heading.trim().to_string());
        active.summary = Set(input.summary.clone());
        active.body = Set(input.body.clone());
        active.draft = Set(input.draft);
        active.featured = Set(input.featured);
        active.series = Set(input.series.trim().to_string());
        active.series_order = Set(input.series_order);
        active.published_at = Set(input.published_at);
        active.updated_by = Set(actor);
        active.updated_at = Set(now);
        let model = active.update(&self.conn).await?;

        meta::Entity::delete_many()
            .filter(meta::Column::ContentId.eq(id))
            .exec(&self.conn)
            .await?;
        meta_active_model(id, meta, actor, now)
            .insert(&self.conn)
            .await?;

        Ok(model)
    }

    pub async fn remove_content(&self, id: Uuid) -> Result<()> {
        self.content(id).await?;
        meta::Entity::delete_many()
            .filter(meta::Column::ContentId.eq(id))
            .exec(&self.conn)
            .await?;
        content_tag::Entity::delete_many()
            .filter(content_tag::Column::ContentId.eq(id))
            .exec(&self.conn)
            .await?;
        content_image::Entity::delete_many()
            .filter(content_image::Column::ContentId.eq(id))
            .exec(&self.conn)
            .await?;
        content::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn meta_for_content(&self, content_id: Uuid) -> Result<meta::Model> {
        meta::Entity::find()
            .filter(meta::Column::ContentId.eq(content_id))
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Meta for content", content_id))
    }

    pub async fn content(&self, id: Uuid) -> Result<content::Model> {
        content::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Content", id))
    }

    /// One assembled content item, read through the same join as the full sweep.
    pub async fn content_item(&self, id: Uuid) -> Result<ContentItem> {
        self.joined_contents(Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found("Content", id))
    }

    /// Every content item with section, meta, tags and image URLs, in insertion order.
    pub async fn all_content_with_meta(&self) -> Result<Vec<ContentItem>> {
        self.joined_contents(None).await
    }

    async fn joined_contents(&self, only: Option<Uuid>) -> Result<Vec<ContentItem>> {
        let mut sql = String::from(JOINED_CONTENT_SQL);
        let mut values: Vec<Value> = vec![true.into()];
        if let Some(id) = only {
            sql.push_str(" WHERE c.id = ?");
            values.push(id.into());
        }
        sql.push_str(" ORDER BY c.rowid, ct.rowid, ci.position, ci.rowid");

        let rows = ContentRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            sql,
            values,
        ))
        .all(&self.conn)
        .await?;

        assemble(rows)
    }

    /// Case-insensitive search over heading and body with a total for the same predicate.
    pub async fn search_contents(
        &self,
        offset: u64,
        limit: u64,
        query: &str,
    ) -> Result<(Vec<content::Model>, u64)> {
        let mut select = content::Entity::find();

        let term = escape_like(query.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(content::Column::Heading)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(content::Column::Body)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }

        let total = select.clone().paginate(&self.conn, Ord::max(limit, 1)).num_items().await?;
        let items = select
            .order_by_desc(content::Column::CreatedAt)
            .order_by_asc(content::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok((items, total))
    }

    // Tags

    pub async fn find_or_create_tag(&self, name: &str, actor: Uuid) -> Result<tag::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SsgError::Validation("Tag name must not be blank".into()));
        }
        if let Some(existing) = tag::Entity::find()
            .filter(tag::Column::Name.eq(name))
            .one(&self.conn)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = tag::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            name: Set(name.to_string()),
            slug: Set(slug::normalize(name)),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model
            .insert(&self.conn)
            .await
            .map_err(|e| unique_conflict(e, || format!("Tag '{name}' already exists")))
    }

    pub async fn list_tags(&self) -> Result<Vec<tag::Model>> {
        Ok(tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(&self.conn)
            .await?)
    }

    pub async fn tag(&self, id: Uuid) -> Result<tag::Model> {
        tag::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Tag", id))
    }

    /// Drops the tag and every content link to it.
    pub async fn delete_tag(&self, id: Uuid) -> Result<()> {
        self.tag(id).await?;
        content_tag::Entity::delete_many()
            .filter(content_tag::Column::TagId.eq(id))
            .exec(&self.conn)
            .await?;
        tag::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    /// Link a tag to content. Linking twice is a no-op.
    pub async fn add_tag(&self, content_id: Uuid, tag_id: Uuid) -> Result<()> {
        let link = content_tag::ActiveModel {
            content_id: Set(content_id),
            tag_id: Set(tag_id),
            created_at: Set(Utc::now()),
        };
        let result = content_tag::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([content_tag::Column::ContentId, content_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove_tag(&self, content_id: Uuid, tag_id: Uuid) -> Result<bool> {
        let res = content_tag::Entity::delete_many()
            .filter(content_tag::Column::ContentId.eq(content_id))
            .filter(content_tag::Column::TagId.eq(tag_id))
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn tags_for_content(&self, content_id: Uuid) -> Result<Vec<tag::Model>> {
        Ok(tag::Entity::find()
            .filter(
                tag::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(content_tag::Column::TagId)
                        .from(content_tag::Entity)
                        .and_where(content_tag::Column::ContentId.eq(content_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(tag::Column::Name)
            .all(&self.conn)
            .await?)
    }

    // Params

    pub async fn list_params(&self) -> Result<Vec<param::Model>> {
        Ok(param::Entity::find()
            .order_by_asc(param::Column::RefKey)
            .all(&self.conn)
            .await?)
    }

    pub async fn param(&self, id: Uuid) -> Result<param::Model> {
        param::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Param", id))
    }

    pub async fn param_by_ref(&self, ref_key: &str) -> Result<Option<param::Model>> {
        Ok(param::Entity::find()
            .filter(param::Column::RefKey.eq(ref_key))
            .one(&self.conn)
            .await?)
    }

    pub async fn create_param(&self, input: &ParamInput, actor: Uuid) -> Result<param::Model> {
        let now = Utc::now();
        let model = param::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            value: Set(input.value.clone()),
            ref_key: Set(input.ref_key.clone()),
            system: Set(input.system),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&self.conn).await.map_err(|e| {
            unique_conflict(e, || format!("Param '{}' already exists", input.ref_key))
        })
    }

    /// Overwrite the editable columns. The system flag is never changed here.
    pub async fn update_param(
        &self,
        existing: param::Model,
        input: &ParamInput,
        actor: Uuid,
    ) -> Result<param::Model> {
        let ref_key = input.ref_key.clone();
        let mut active: param::ActiveModel = existing.into();
        active.name = Set(input.name.clone());
        active.description = Set(input.description.clone());
        active.value = Set(input.value.clone());
        active.ref_key = Set(input.ref_key.clone());
        active.updated_by = Set(actor);
        active.updated_at = Set(Utc::now());
        active
            .update(&self.conn)
            .await
            .map_err(|e| unique_conflict(e, || format!("Param '{ref_key}' already exists")))
    }

    pub async fn delete_param(&self, id: Uuid) -> Result<()> {
        param::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    // Images

    pub async fn insert_image(&self, input: &ImageInput, actor: Uuid) -> Result<image::Model> {
        let now = Utc::now();
        let model = image::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            file_name: Set(input.file_name.clone()),
            file_path: Set(input.file_path.clone()),
            file_hash: Set(input.file_hash.clone()),
            mime: Set(input.mime.clone()),
            size: Set(input.size),
            width: Set(input.width),
            height: Set(input.height),
            title: Set(input.title.clone()),
            alt_text: Set(input.alt_text.clone()),
            long_description: Set(input.long_description.clone()),
            caption: Set(input.caption.clone()),
            decorative: Set(input.decorative),
            described_by_id: Set(String::new()),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.conn).await?)
    }

    pub async fn image(&self, id: Uuid) -> Result<image::Model> {
        image::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Image", id))
    }

    /// Deactivate every active relation of `purpose` for a content item.
    pub async fn deactivate_content_images(&self, content_id: Uuid, purpose: &str) -> Result<u64> {
        let res = content_image::Entity::update_many()
            .col_expr(content_image::Column::Active, Expr::value(false))
            .col_expr(content_image::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(content_image::Column::ContentId.eq(content_id))
            .filter(content_image::Column::Purpose.eq(purpose))
            .filter(content_image::Column::Active.eq(true))
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn next_content_image_position(&self, content_id: Uuid) -> Result<i32> {
        let count = content_image::Entity::find()
            .filter(content_image::Column::ContentId.eq(content_id))
            .count(&self.conn)
            .await?;
        i32::try_from(count).map_err(|_| SsgError::Validation("Too many images".into()))
    }

    pub async fn insert_content_image(
        &self,
        content_id: Uuid,
        image_id: Uuid,
        purpose: &str,
        position: i32,
    ) -> Result<content_image::Model> {
        let now = Utc::now();
        let model = content_image::ActiveModel {
            id: Set(Uuid::now_v7()),
            content_id: Set(content_id),
            image_id: Set(image_id),
            purpose: Set(purpose.to_string()),
            position: Set(position),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.conn).await?)
    }

    pub async fn deactivate_section_images(&self, section_id: Uuid, purpose: &str) -> Result<u64> {
        let res = section_image::Entity::update_many()
            .col_expr(section_image::Column::Active, Expr::value(false))
            .col_expr(section_image::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(section_image::Column::SectionId.eq(section_id))
            .filter(section_image::Column::Purpose.eq(purpose))
            .filter(section_image::Column::Active.eq(true))
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn insert_section_image(
        &self,
        section_id: Uuid,
        image_id: Uuid,
        purpose: &str,
    ) -> Result<section_image::Model> {
        let now = Utc::now();
        let model = section_image::ActiveModel {
            id: Set(Uuid::now_v7()),
            section_id: Set(section_id),
            image_id: Set(image_id),
            purpose: Set(purpose.to_string()),
            position: Set(0),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.conn).await?)
    }

    /// Active image relations of a content item, ordered by position.
    pub async fn content_images(
        &self,
        content_id: Uuid,
    ) -> Result<Vec<(content_image::Model, image::Model)>> {
        let rows = content_image::Entity::find()
            .filter(content_image::Column::ContentId.eq(content_id))
            .filter(content_image::Column::Active.eq(true))
            .order_by_asc(content_image::Column::Position)
            .find_also_related(image::Entity)
            .all(&self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(rel, img)| img.map(|img| (rel, img)))
            .collect())
    }

    pub async fn section_images(
        &self,
        section_id: Uuid,
    ) -> Result<Vec<(section_image::Model, image::Model)>> {
        let rows = section_image::Entity::find()
            .filter(section_image::Column::SectionId.eq(section_id))
            .filter(section_image::Column::Active.eq(true))
            .order_by_asc(section_image::Column::Purpose)
            .find_also_related(image::Entity)
            .all(&self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(rel, img)| img.map(|img| (rel, img)))
            .collect())
    }

    /// Remove a content image relation and return the image it pointed at.
    pub async fn delete_content_image(
        &self,
        content_id: Uuid,
        relation_id: Uuid,
    ) -> Result<image::Model> {
        let rel = content_image::Entity::find_by_id(relation_id)
            .filter(content_image::Column::ContentId.eq(content_id))
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Content image", relation_id))?;
        let img = self.image(rel.image_id).await?;
        content_image::Entity::delete_by_id(relation_id)
            .exec(&self.conn)
            .await?;
        Ok(img)
    }

    pub async fn delete_section_image(
        &self,
        section_id: Uuid,
        relation_id: Uuid,
    ) -> Result<image::Model> {
        let rel = section_image::Entity::find_by_id(relation_id)
            .filter(section_image::Column::SectionId.eq(section_id))
            .one(&self.conn)
            .await?
            .ok_or_else(|| not_found("Section image", relation_id))?;
        let img = self.image(rel.image_id).await?;
        section_image::Entity::delete_by_id(relation_id)
            .exec(&self.conn)
            .await?;
        Ok(img)
    }

    // Image variants

    pub async fn create_variant(
        &self,
        image_id: Uuid,
        input: &VariantInput,
        actor: Uuid,
    ) -> Result<image_variant::Model> {
        self.image(image_id).await?;
        if input.kind.trim().is_empty() {
            return Err(SsgError::Validation("Variant kind must not be blank".into()));
        }
        let now = Utc::now();
        let model = image_variant::ActiveModel {
            id: Set(Uuid::now_v7()),
            short_id: Set(slug::short_id()),
            image_id: Set(image_id),
            kind: Set(input.kind.trim().to_string()),
            width: Set(input.width),
            height: Set(input.height),
            mime: Set(input.mime.clone()),
            size: Set(input.size),
            blob_ref: Set(input.blob_ref.clone()),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.conn).await?)
    }

    pub async fn list_variants(&self, image_id: Uuid) -> Result<Vec<image_variant::Model>> {
        Ok(image_variant::Entity::find()
            .filter(image_variant::Column::ImageId.eq(image_id))
            .order_by_asc(image_variant::Column::CreatedAt)
            .all(&self.conn)
            .await?)
    }

    pub async fn delete_variant(&self, image_id: Uuid, id: Uuid) -> Result<bool> {
        let res = image_variant::Entity::delete_many()
            .filter(image_variant::Column::Id.eq(id))
            .filter(image_variant::Column::ImageId.eq(image_id))
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected > 0)
    }
}

fn meta_active_model(
    content_id: Uuid,
    meta: &MetaInfo,
    actor: Uuid,
    now: DateTime<Utc>,
) -> meta::ActiveModel {
    meta::ActiveModel {
        id: Set(Uuid::now_v7()),
        short_id: Set(slug::short_id()),
        content_id: Set(content_id),
        description: Set(meta.description.clone()),
        keywords: Set(meta.keywords.clone()),
        robots: Set(meta.robots.clone()),
        canonical_url: Set(meta.canonical_url.clone()),
        sitemap: Set(meta.sitemap.clone()),
        table_of_contents: Set(meta.table_of_contents),
        share: Set(meta.share),
        comments: Set(meta.comments),
        created_by: Set(actor),
        updated_by: Set(actor),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

const JOINED_CONTENT_SQL: &str = "\
SELECT c.id, c.short_id, c.user_id, c.section_id, \
       s.name AS section_name, s.path AS section_path, \
       c.kind, c.heading, c.summary, c.body, c.draft, c.featured, \
       c.series, c.series_order, c.published_at, c.created_at, c.updated_at, \
       m.description AS meta_description, m.keywords AS meta_keywords, \
       m.robots AS meta_robots, m.canonical_url AS meta_canonical_url, \
       m.sitemap AS meta_sitemap, m.table_of_contents AS meta_table_of_contents, \
       m.share AS meta_share, m.comments AS meta_comments, \
       t.id AS tag_id, t.name AS tag_name, \
       ci.purpose AS image_purpose, i.file_path AS image_path, \
       i.alt_text AS image_alt, i.long_description AS image_long_description \
FROM content c \
JOIN section s ON s.id = c.section_id \
LEFT JOIN meta m ON m.content_id = c.id \
LEFT JOIN content_tag ct ON ct.content_id = c.id \
LEFT JOIN tag t ON t.id = ct.tag_id \
LEFT JOIN content_image ci ON ci.content_id = c.id AND ci.active = ? \
LEFT JOIN image i ON i.id = ci.image_id";

#[derive(Debug, FromQueryResult)]
struct ContentRow {
    id: Uuid,
    short_id: String,
    user_id: Uuid,
    section_id: Uuid,
    section_name: String,
    section_path: String,
    kind: String,
    heading: String,
    summary: String,
    body: String,
    draft: bool,
    featured: bool,
    series: String,
    series_order: i32,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    meta_description: Option<String>,
    meta_keywords: Option<String>,
    meta_robots: Option<String>,
    meta_canonical_url: Option<String>,
    meta_sitemap: Option<String>,
    meta_table_of_contents: Option<bool>,
    meta_share: Option<bool>,
    meta_comments: Option<bool>,
    tag_id: Option<Uuid>,
    tag_name: Option<String>,
    image_purpose: Option<String>,
    image_path: Option<String>,
    image_alt: Option<String>,
    image_long_description: Option<String>,
}

impl ContentRow {
    fn to_item(&self) -> Result<ContentItem> {
        Ok(ContentItem {
            id: self.id,
            short_id: self.short_id.clone(),
            user_id: self.user_id,
            section_id: self.section_id,
            section_name: self.section_name.clone(),
            section_path: self.section_path.clone(),
            kind: self.kind.parse()?,
            heading: self.heading.clone(),
            summary: self.summary.clone(),
            body: self.body.clone(),
            draft: self.draft,
            featured: self.featured,
            series: self.series.clone(),
            series_order: self.series_order,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tags: Vec::new(),
            meta: MetaInfo {
                description: self.meta_description.clone().unwrap_or_default(),
                keywords: self.meta_keywords.clone().unwrap_or_default(),
                robots: self.meta_robots.clone().unwrap_or_default(),
                canonical_url: self.meta_canonical_url.clone().unwrap_or_default(),
                sitemap: self.meta_sitemap.clone().unwrap_or_default(),
                table_of_contents: self.meta_table_of_contents.unwrap_or(false),
                share: self.meta_share.unwrap_or(false),
                comments: self.meta_comments.unwrap_or(false),
            },
            thumbnail_url: String::new(),
            header_image_url: String::new(),
            header_image_alt: String::new(),
            header_image_caption: String::new(),
        })
    }
}

/// Fold the tag × image cartesian rows back into one item per content.
fn assemble(rows: Vec<ContentRow>) -> Result<Vec<ContentItem>> {
    let mut items: Vec<ContentItem> = Vec::new();
    let mut by_id: HashMap<Uuid, usize> = HashMap::new();
    let mut fallback_thumbs: HashMap<Uuid, String> = HashMap::new();

    for row in rows {
        let idx = match by_id.get(&row.id) {
            Some(&idx) => idx,
            None => {
                items.push(row.to_item()?);
                by_id.insert(row.id, items.len() - 1);
                items.len() - 1
            }
        };
        let item = &mut items[idx];

        if let (Some(tag_id), Some(tag_name)) = (row.tag_id, row.tag_name.as_ref())
            && !item.tags.iter().any(|t| t.id == tag_id)
        {
            item.tags.push(TagRef {
                id: tag_id,
                name: tag_name.clone(),
            });
        }

        let (Some(purpose), Some(path)) = (row.image_purpose.as_deref(), row.image_path.as_deref())
        else {
            continue;
        };
        match purpose {
            "header" if item.header_image_url.is_empty() => {
                item.header_image_url = paths::image_url(path);
                item.header_image_alt = row.image_alt.clone().unwrap_or_default();
                item.header_image_caption = row.image_long_description.clone().unwrap_or_default();
            }
            "thumbnail" if item.thumbnail_url.is_empty() => {
                item.thumbnail_url = paths::image_url(path);
            }
            "content" => {
                fallback_thumbs
                    .entry(row.id)
                    .or_insert_with(|| paths::image_url(path));
            }
            _ => {}
        }
    }

    for item in &mut items {
        if item.thumbnail_url.is_empty()
            && let Some(url) = fallback_thumbs.remove(&item.id)
        {
            item.thumbnail_url = url;
        }
    }

    Ok(items)
}
