//! URL and filesystem path resolution.
//!
//! Everything here is pure string/path manipulation; nothing touches the disk.

use std::path::{Path, PathBuf};

use crate::model::{ContentItem, ContentKind, SiteMode};
use crate::slug;

pub const INDEX_FILE: &str = "index.html";
pub const DB_FILE: &str = "clio.db";
pub const STATIC_IMAGES_URL: &str = "/static/images";

/// Normalize a section path to the `/a/b/` form. Empty input and `/` yield `/`.
pub fn dir_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Canonical stored form of a section path: every segment slug-normalized,
/// empty segments dropped, e.g. `My Tech/Go` becomes `/my-tech/go/`.
pub fn section_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split(['/', '\\'])
        .map(slug::normalize)
        .filter(|s| !s.is_empty())
        .collect();
    dir_path(&segments.join("/"))
}

fn is_root(path: &str) -> bool {
    dir_path(path) == "/"
}

/// URL of a single content page.
pub fn content_url(content: &ContentItem, mode: SiteMode) -> String {
    match mode {
        SiteMode::Blog => format!("/{}/", content.slug()),
        SiteMode::Structured => format!("{}{}/", dir_path(&content.section_path), content.slug()),
    }
}

/// URL of the index page a content kind is listed on.
pub fn index_url(section_path: &str, kind: ContentKind, mode: SiteMode) -> String {
    match mode {
        SiteMode::Blog => "/".to_string(),
        SiteMode::Structured if kind == ContentKind::Blog => {
            if is_root(section_path) {
                "/blog/".to_string()
            } else {
                format!("{}blog/", dir_path(section_path))
            }
        }
        SiteMode::Structured => dir_path(section_path),
    }
}

/// URL of the series index for `series` inside a section.
pub fn series_url(section_path: &str, series: &str) -> String {
    format!("{}{}/", dir_path(section_path), series.trim_matches('/'))
}

/// Page 1 is the index itself; later pages live under `page/{n}/`.
pub fn page_url(index_url: &str, page: usize) -> String {
    let base = dir_path(index_url);
    if page <= 1 {
        base
    } else {
        format!("{base}page/{page}/")
    }
}

/// Join a URL path onto a filesystem root, ignoring the leading slash.
fn join_url(root: &Path, url: &str) -> PathBuf {
    url.split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |acc, seg| acc.join(seg))
}

pub fn content_file_path(html_root: &Path, content: &ContentItem, mode: SiteMode) -> PathBuf {
    join_url(html_root, &content_url(content, mode)).join(INDEX_FILE)
}

pub fn index_file_path(html_root: &Path, index_url: &str) -> PathBuf {
    join_url(html_root, index_url).join(INDEX_FILE)
}

/// `{markdown-root}{section-path}{content-slug}.md`
pub fn markdown_file_path(markdown_root: &Path, content: &ContentItem) -> PathBuf {
    join_url(markdown_root, &content.section_path).join(format!("{}.md", content.slug()))
}

/// Directory (relative to the images root) that holds a content item's images.
pub fn content_image_dir(section_path: &str, content_slug: &str) -> PathBuf {
    join_url(Path::new(""), section_path).join(content_slug)
}

pub fn section_image_dir(section_path: &str) -> PathBuf {
    join_url(Path::new(""), section_path)
}

pub fn blog_header_dir(section_path: &str) -> PathBuf {
    join_url(Path::new(""), section_path).join("blog")
}

/// Sanitize a stored file path for use in a URL.
///
/// Each segment is lowercased, characters outside `[a-z0-9._-]` become `-`,
/// hyphen runs collapse and edge hyphens are trimmed. Separators are kept.
pub fn sanitize_url_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let leading = normalized.starts_with('/');
    let segments: Vec<String> = normalized
        .split('/')
        .filter(|s| !s.is_empty())
        .map(sanitize_segment)
        .filter(|s| !s.is_empty())
        .collect();
    let joined = segments.join("/");
    if leading { format!("/{joined}") } else { joined }
}

fn sanitize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Public URL of an image stored at `file_path` relative to the images root.
pub fn image_url(file_path: &str) -> String {
    let clean = sanitize_url_path(file_path);
    format!("{}/{}", STATIC_IMAGES_URL, clean.trim_start_matches('/'))
}

/// Names of the per-site document directories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocsLayout {
    pub docs: String,
    pub markdown: String,
    pub html: String,
    pub assets: String,
    pub images: String,
}

impl Default for DocsLayout {
    fn default() -> Self {
        Self {
            docs: "documents".to_string(),
            markdown: "markdown".to_string(),
            html: "html".to_string(),
            assets: "assets".to_string(),
            images: "images".to_string(),
        }
    }
}

/// Resolved on-disk locations for one site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SitePaths {
    pub root: PathBuf,
    pub db_dir: PathBuf,
    pub db_file: PathBuf,
    pub docs: PathBuf,
    pub markdown: PathBuf,
    pub html: PathBuf,
    pub assets: PathBuf,
    pub images: PathBuf,
}

impl SitePaths {
    pub fn resolve(sites_base: &Path, db_base: &Path, slug: &str, layout: &DocsLayout) -> Self {
        let root = sites_base.join(slug);
        let docs = root.join(&layout.docs);
        let assets = docs.join(&layout.assets);
        let db_dir = db_base.join(slug);
        Self {
            db_file: db_dir.join(DB_FILE),
            db_dir,
            markdown: docs.join(&layout.markdown),
            html: docs.join(&layout.html),
            images: assets.join(&layout.images),
            assets,
            docs,
            root,
        }
    }

    /// Directories created for a new site, parents first.
    pub fn directories(&self) -> [&Path; 5] {
        [
            self.db_dir.as_path(),
            self.markdown.as_path(),
            self.html.as_path(),
            self.assets.as_path(),
            self.images.as_path(),
        ]
    }
}
