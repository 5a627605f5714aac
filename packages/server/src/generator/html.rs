use std::collections::{HashMap, HashSet};
use std::path::Path;

use folio_common::blocks::{Blocks, build_blocks};
use folio_common::index::{IndexKind, IndexPage, build_indexes};
use folio_common::markdown::{self, ImageContext, ImageMeta};
use folio_common::{ContentItem, ContentKind, SectionRef, SiteMode, paths};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::assets::copy_tree;
use super::templates::Templates;
use super::{GenerateReport, SiteBuild};
use crate::cancel::checkpoint;
use crate::error::Result;
use crate::params::SearchSettings;

pub const DEFAULT_HEADER_IMAGE: &str = "/static/img/header.png";
const ASSET_PATH: &str = "/";
const STATIC_DIR: &str = "static";
const IMAGES_DIR: &str = "images";

/// A content item as listed on a page, with its resolved URL.
#[derive(Serialize)]
pub struct Entry<'a> {
    pub url: String,
    pub slug: String,
    #[serde(flatten)]
    pub item: &'a ContentItem,
}

fn entry(item: &ContentItem, mode: SiteMode) -> Entry<'_> {
    Entry {
        url: paths::content_url(item, mode),
        slug: item.slug(),
        item,
    }
}

fn entries(items: &[ContentItem], mode: SiteMode) -> Vec<Entry<'_>> {
    items.iter().map(|c| entry(c, mode)).collect()
}

#[derive(Serialize)]
pub struct BlocksView<'a> {
    pub article_tag_related_same_section: Vec<Entry<'a>>,
    pub article_recent_same_section: Vec<Entry<'a>>,
    pub article_tag_related_other_sections: Vec<Entry<'a>>,
    pub article_recent_other_sections: Vec<Entry<'a>>,
    pub blog_tag_related: Vec<Entry<'a>>,
    pub blog_recent: Vec<Entry<'a>>,
    pub series_prev: Option<Entry<'a>>,
    pub series_next: Option<Entry<'a>>,
    pub series_index_forward: Vec<Entry<'a>>,
    pub series_index_backward: Vec<Entry<'a>>,
}

impl<'a> BlocksView<'a> {
    fn new(blocks: &'a Blocks, mode: SiteMode) -> Self {
        Self {
            article_tag_related_same_section: entries(&blocks.article_tag_related_same_section, mode),
            article_recent_same_section: entries(&blocks.article_recent_same_section, mode),
            article_tag_related_other_sections: entries(&blocks.article_tag_related_other_sections, mode),
            article_recent_other_sections: entries(&blocks.article_recent_other_sections, mode),
            blog_tag_related: entries(&blocks.blog_tag_related, mode),
            blog_recent: entries(&blocks.blog_recent, mode),
            series_prev: blocks.series_prev.as_ref().map(|c| entry(c, mode)),
            series_next: blocks.series_next.as_ref().map(|c| entry(c, mode)),
            series_index_forward: entries(&blocks.series_index_forward, mode),
            series_index_backward: entries(&blocks.series_index_backward, mode),
        }
    }
}

#[derive(Serialize)]
pub struct PageContent {
    pub heading: String,
    pub header_image: String,
    pub header_image_alt: String,
    pub header_image_caption: String,
    pub body: String,
    pub kind: ContentKind,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PaginationData {
    pub current_page: usize,
    pub total_pages: usize,
    pub prev_page_url: String,
    pub next_page_url: String,
}

impl PaginationData {
    fn new(index_path: &str, page: usize, total_pages: usize) -> Self {
        Self {
            current_page: page,
            total_pages,
            prev_page_url: if page > 1 {
                paths::page_url(index_path, page - 1)
            } else {
                String::new()
            },
            next_page_url: if page < total_pages {
                paths::page_url(index_path, page + 1)
            } else {
                String::new()
            },
        }
    }
}

/// Rendering context of one output file.
#[derive(Serialize)]
pub struct PageData<'a> {
    pub header_style: &'static str,
    pub asset_path: &'static str,
    pub menu: &'a [SectionRef],
    pub is_index: bool,
    pub index_title: String,
    pub list_page_content: Vec<Entry<'a>>,
    pub content: Option<PageContent>,
    pub blocks: Option<BlocksView<'a>>,
    pub pagination: Option<PaginationData>,
    pub search: &'a SearchSettings,
    pub section_header_image: String,
}

struct Run<'a> {
    build: &'a SiteBuild<'a>,
    templates: Templates,
    menu: Vec<SectionRef>,
    sections: Vec<SectionRef>,
    search: SearchSettings,
    header_style: folio_common::HeaderStyle,
    blocks_max: usize,
}

/// Render the HTML tree of a site from a single content snapshot.
#[instrument(skip_all, fields(slug = build.repo.slug()))]
pub async fn generate(build: &SiteBuild<'_>, cancel: &CancellationToken) -> Result<GenerateReport> {
    info!("Starting HTML generation");
    let mut report = GenerateReport::default();

    let published: Vec<ContentItem> = build
        .repo
        .all_content_with_meta()
        .await?
        .into_iter()
        .filter(|c| !c.draft)
        .collect();

    let sections = build.repo.section_refs().await?;
    let menu: Vec<SectionRef> = sections.iter().filter(|s| !s.is_root()).cloned().collect();
    let templates = Templates::load(build.layout_file.as_deref(), &section_layouts(build).await?).await?;
    checkpoint(cancel)?;

    let html_root = &build.paths.html;
    let static_root = html_root.join(STATIC_DIR);
    report.assets += copy_tree(&build.static_assets, &static_root, cancel).await?;
    report.assets += copy_tree(&build.paths.images, &static_root.join(IMAGES_DIR), cancel).await?;

    let run = Run {
        build,
        templates,
        menu,
        sections,
        search: build.params.search(),
        header_style: build.params.header_style(),
        blocks_max: build.params.blocks_max_items(),
    };

    for item in &published {
        checkpoint(cancel)?;
        match run.render_content(item, &published).await {
            Ok(()) => report.pages += 1,
            Err(e) => report.fail(item.slug(), e),
        }
    }

    let manual = manual_index_paths(&published);
    let per_page = build.params.index_max_items();
    for index in build_indexes(&published, &run.sections, build.mode) {
        if manual.contains(&index.path) {
            debug!(path = %index.path, "Manual index page present, skipping generated index");
            continue;
        }
        let total_pages = index.items.len().div_ceil(per_page).max(1);
        for page in 1..=total_pages {
            checkpoint(cancel)?;
            match run.render_index(&index, page, total_pages, per_page).await {
                Ok(()) => report.index_pages += 1,
                Err(e) => report.fail(paths::page_url(&index.path, page), e),
            }
        }
    }

    info!(
        pages = report.pages,
        index_pages = report.index_pages,
        assets = report.assets,
        failed = report.failures.len(),
        "HTML generation finished"
    );
    Ok(report)
}

/// Custom layout code per section, for sections whose layout has any.
async fn section_layouts(build: &SiteBuild<'_>) -> Result<HashMap<Uuid, String>> {
    let layouts: HashMap<Uuid, String> = build
        .repo
        .list_layouts()
        .await?
        .into_iter()
        .filter(|l| !l.code.trim().is_empty())
        .map(|l| (l.id, l.code))
        .collect();
    Ok(build
        .repo
        .list_sections()
        .await?
        .into_iter()
        .filter_map(|s| {
            let code = layouts.get(&s.layout_id?)?;
            Some((s.id, code.clone()))
        })
        .collect())
}

/// Index paths replaced by a hand-written `index` page in that section.
fn manual_index_paths(contents: &[ContentItem]) -> HashSet<String> {
    contents
        .iter()
        .filter(|c| c.is_manual_index())
        .map(|c| paths::dir_path(&c.section_path))
        .collect()
}

async fn write_page(path: &Path, html: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await?;
    Ok(())
}

impl Run<'_> {
    fn mode(&self) -> SiteMode {
        self.build.mode
    }

    async fn image_context(&self, item: &ContentItem) -> Result<ImageContext> {
        let mut ctx = ImageContext::new();
        for (_, img) in self.build.repo.content_images(item.id).await? {
            ctx.insert(
                &paths::image_url(&img.file_path),
                ImageMeta {
                    alt_text: img.alt_text,
                    caption: img.caption,
                    long_description: img.long_description,
                    title: img.title,
                    decorative: img.decorative,
                },
            );
        }
        Ok(ctx)
    }

    async fn render_content(&self, item: &ContentItem, corpus: &[ContentItem]) -> Result<()> {
        let images = self.image_context(item).await?;
        let mut body = markdown::render(&item.body, &images);
        if self.header_style.strips_first_heading() {
            body = markdown::strip_first_h1(&body);
        }

        let header_image = if item.header_image_url.is_empty() {
            DEFAULT_HEADER_IMAGE.to_string()
        } else {
            item.header_image_url.clone()
        };
        let blocks = build_blocks(item, corpus, self.blocks_max);

        let data = PageData {
            header_style: self.header_style.as_str(),
            asset_path: ASSET_PATH,
            menu: &self.menu,
            is_index: false,
            index_title: String::new(),
            list_page_content: Vec::new(),
            content: Some(PageContent {
                heading: item.heading.clone(),
                header_image,
                header_image_alt: item.header_image_alt.clone(),
                header_image_caption: item.header_image_caption.clone(),
                body,
                kind: item.kind,
            }),
            blocks: Some(BlocksView::new(&blocks, self.mode())),
            pagination: None,
            search: &self.search,
            section_header_image: String::new(),
        };
        let html = self.templates.render(Some(item.section_id), &data)?;

        write_page(&paths::content_file_path(&self.build.paths.html, item, self.mode()), html.clone()).await?;
        if item.is_manual_index() {
            let index_path = paths::dir_path(&item.section_path);
            write_page(&paths::index_file_path(&self.build.paths.html, &index_path), html).await?;
        }
        Ok(())
    }

    /// The section an index belongs to and the header image it shows.
    fn index_header(&self, index: &IndexPage) -> (String, String) {
        for section in &self.sections {
            let section_path = paths::dir_path(&section.path);
            match index.kind {
                IndexKind::Section if section_path == index.path => {
                    return (section.name.clone(), section.header_image_url.clone());
                }
                IndexKind::Blog
                    if paths::index_url(&section_path, ContentKind::Blog, self.mode()) == index.path =>
                {
                    return (section.name.clone(), section.blog_header_image_url.clone());
                }
                _ => {}
            }
        }
        (index.path.trim_matches('/').to_string(), String::new())
    }

    async fn render_index(
        &self,
        index: &IndexPage,
        page: usize,
        total_pages: usize,
        per_page: usize,
    ) -> Result<()> {
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(index.items.len());
        let (title, header_image) = self.index_header(index);

        let data = PageData {
            header_style: self.header_style.as_str(),
            asset_path: ASSET_PATH,
            menu: &self.menu,
            is_index: true,
            index_title: title,
            list_page_content: entries(&index.items[start.min(end)..end], self.mode()),
            content: None,
            blocks: None,
            pagination: Some(PaginationData::new(&index.path, page, total_pages)),
            search: &self.search,
            section_header_image: header_image,
        };
        let html = self.templates.render(None, &data)?;

        let url = paths::page_url(&index.path, page);
        write_page(&paths::index_file_path(&self.build.paths.html, &url), html).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use folio_common::ImagePurpose;

    use super::*;
    use crate::generator::assets::relative_files;
    use crate::generator::tests::{TestSite, seeded_site, seeded_site_with_mode};
    use crate::params::keys;
    use crate::repo::site::{ContentInput, ImageInput, ParamInput, SectionInput};
    use folio_common::MetaInfo;

    async fn set_param(site: &TestSite, key: &str, value: &str) {
        let existing = site.repo.param_by_ref(key).await.unwrap().unwrap();
        let input = ParamInput {
            name: existing.name.clone(),
            description: existing.description.clone(),
            value: value.into(),
            ref_key: existing.ref_key.clone(),
            system: existing.system,
        };
        site.repo.update_param(existing, &input, Uuid::nil()).await.unwrap();
    }

    async fn add_content(site: &TestSite, section_id: Uuid, kind: ContentKind, heading: &str, day: u32) {
        let author = site.repo.user_by_username("admin").await.unwrap().unwrap();
        site.repo
            .create_content(
                &ContentInput {
                    user_id: author.id,
                    section_id,
                    kind,
                    heading: heading.into(),
                    summary: String::new(),
                    body: format!("# {heading}\n\nBody of {heading}."),
                    draft: false,
                    featured: false,
                    series: String::new(),
                    series_order: 0,
                    published_at: Some(Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap()),
                },
                &MetaInfo::default(),
                Uuid::nil(),
            )
            .await
            .unwrap();
    }

    #[test]
    fn pagination_links() {
        let first = PaginationData::new("/news/", 1, 3);
        assert_eq!(first.prev_page_url, "");
        assert_eq!(first.next_page_url, "/news/page/2/");

        let second = PaginationData::new("/news/", 2, 3);
        assert_eq!(second.prev_page_url, "/news/");
        assert_eq!(second.next_page_url, "/news/page/3/");

        let last = PaginationData::new("/news/", 3, 3);
        assert_eq!(last.prev_page_url, "/news/page/2/");
        assert_eq!(last.next_page_url, "");
    }

    #[tokio::test]
    async fn renders_pages_indexes_and_assets() {
        let site = seeded_site().await;
        let build = site.build().await;
        let report = generate(&build, &CancellationToken::new()).await.unwrap();

        assert_eq!(report.pages, 2);
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert!(report.assets >= 2);

        let html = &build.paths.html;
        assert!(html.join("static/css/main.css").is_file());
        assert!(html.join("index.html").is_file());
        assert!(html.join("blog/index.html").is_file());

        let items = site.repo.all_content_with_meta().await.unwrap();
        let welcome = items.iter().find(|c| c.heading == "Welcome").unwrap();
        let page = tokio::fs::read_to_string(paths::content_file_path(html, welcome, SiteMode::Structured))
            .await
            .unwrap();
        assert!(page.contains(DEFAULT_HEADER_IMAGE));
        // Boxed header style renders the heading in the layout, not the body.
        assert_eq!(page.matches("<h1").count(), 1);
        assert!(page.contains("prose-ul"));
    }

    #[tokio::test]
    async fn plain_header_style_keeps_body_heading() {
        let site = seeded_site().await;
        set_param(&site, keys::HEADER_STYLE, "plain").await;
        let build = site.build().await;
        generate(&build, &CancellationToken::new()).await.unwrap();

        let items = site.repo.all_content_with_meta().await.unwrap();
        let about = items.iter().find(|c| c.heading == "About").unwrap();
        let page = tokio::fs::read_to_string(paths::content_file_path(&build.paths.html, about, SiteMode::Structured))
            .await
            .unwrap();
        assert!(page.contains("<h1 class=\"prose-h1\">About</h1>"));
    }

    #[tokio::test]
    async fn drafts_are_not_rendered() {
        let site = seeded_site().await;
        let items = site.repo.all_content_with_meta().await.unwrap();
        let about = items.iter().find(|c| c.heading == "About").unwrap();
        let content = site.repo.content(about.id).await.unwrap();
        let input = ContentInput {
            user_id: content.user_id,
            section_id: content.section_id,
            kind: ContentKind::Page,
            heading: content.heading.clone(),
            summary: content.summary.clone(),
            body: content.body.clone(),
            draft: true,
            featured: false,
            series: String::new(),
            series_order: 0,
            published_at: None,
        };
        site.repo
            .update_content(about.id, &input, &about.meta, Uuid::nil())
            .await
            .unwrap();

        let build = site.build().await;
        let report = generate(&build, &CancellationToken::new()).await.unwrap();
        assert_eq!(report.pages, 1);
        assert!(!paths::content_file_path(&build.paths.html, about, SiteMode::Structured).exists());
    }

    #[tokio::test]
    async fn paginates_indexes() {
        let site = seeded_site().await;
        set_param(&site, keys::INDEX_MAX_ITEMS, "2").await;
        let root = site.repo.root_section().await.unwrap().unwrap();
        for day in 1..=4 {
            add_content(&site, root.id, ContentKind::Blog, &format!("Post {day}"), day).await;
        }
        let build = site.build().await;
        generate(&build, &CancellationToken::new()).await.unwrap();

        // Five blog posts at two per page.
        let html = &build.paths.html;
        assert!(html.join("blog/index.html").is_file());
        assert!(html.join("blog/page/2/index.html").is_file());
        assert!(html.join("blog/page/3/index.html").is_file());
        assert!(!html.join("blog/page/4/index.html").exists());

        let second = tokio::fs::read_to_string(html.join("blog/page/2/index.html")).await.unwrap();
        assert!(second.contains("href=\"/blog/\""));
        assert!(second.contains("href=\"/blog/page/3/\""));
    }

    #[tokio::test]
    async fn manual_index_page_replaces_generated_index() {
        let site = seeded_site().await;
        let section = site
            .repo
            .create_section(
                &SectionInput {
                    name: "news".into(),
                    description: String::new(),
                    path: "/news/".into(),
                    layout_id: None,
                },
                Uuid::nil(),
            )
            .await
            .unwrap();
        add_content(&site, section.id, ContentKind::Article, "Story", 3).await;
        add_content(&site, section.id, ContentKind::Page, "Index", 4).await;

        let build = site.build().await;
        generate(&build, &CancellationToken::new()).await.unwrap();

        let index = tokio::fs::read_to_string(build.paths.html.join("news/index.html")).await.unwrap();
        assert!(index.contains("Body of Index."));
        assert!(!index.contains("content-list"));
    }

    #[tokio::test]
    async fn content_images_get_accessible_markup() {
        let site = seeded_site().await;
        let items = site.repo.all_content_with_meta().await.unwrap();
        let welcome = items.iter().find(|c| c.heading == "Welcome").unwrap();

        let image = site
            .repo
            .insert_image(
                &ImageInput {
                    file_name: "pic.png".into(),
                    file_path: "welcome/pic.png".into(),
                    file_hash: String::new(),
                    mime: "image/png".into(),
                    size: 3,
                    width: 0,
                    height: 0,
                    title: String::new(),
                    alt_text: "A picture".into(),
                    long_description: "A longer description".into(),
                    caption: String::new(),
                    decorative: false,
                },
                Uuid::nil(),
            )
            .await
            .unwrap();
        site.repo
            .insert_content_image(welcome.id, image.id, ImagePurpose::Content.as_str(), 0)
            .await
            .unwrap();

        let content = site.repo.content(welcome.id).await.unwrap();
        let input = ContentInput {
            user_id: content.user_id,
            section_id: content.section_id,
            kind: ContentKind::Blog,
            heading: content.heading.clone(),
            summary: content.summary.clone(),
            body: "![](/static/images/welcome/pic.png)".into(),
            draft: false,
            featured: content.featured,
            series: String::new(),
            series_order: 0,
            published_at: content.published_at,
        };
        site.repo
            .update_content(welcome.id, &input, &welcome.meta, Uuid::nil())
            .await
            .unwrap();

        let build = site.build().await;
        generate(&build, &CancellationToken::new()).await.unwrap();
        let page = tokio::fs::read_to_string(paths::content_file_path(&build.paths.html, welcome, SiteMode::Structured))
            .await
            .unwrap();
        assert!(page.contains("alt=\"A picture\""));
        assert!(page.contains("<figcaption class=\"prose-figcaption\">A longer description</figcaption>"));
    }

    #[tokio::test]
    async fn output_is_repeatable() {
        let site = seeded_site_with_mode("blog").await;
        let build = site.build().await;
        generate(&build, &CancellationToken::new()).await.unwrap();
        let html = &build.paths.html;
        let mut first = Vec::new();
        for rel in relative_files(html) {
            first.push((rel.clone(), tokio::fs::read(html.join(&rel)).await.unwrap()));
        }

        generate(&build, &CancellationToken::new()).await.unwrap();
        for (rel, bytes) in first {
            assert_eq!(tokio::fs::read(html.join(&rel)).await.unwrap(), bytes, "{}", rel.display());
        }
    }
}
