use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;
use crate::slug;

/// Name and path of the distinguished root section.
pub const ROOT_SECTION_NAME: &str = "root";
pub const ROOT_SECTION_PATH: &str = "/";

/// How a site lays out its URLs and indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteMode {
    /// Multiple sections with multi-level navigation.
    Structured,
    /// A single flat stream at the root.
    Blog,
}

impl SiteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteMode::Structured => "structured",
            SiteMode::Blog => "blog",
        }
    }
}

impl FromStr for SiteMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(SiteMode::Structured),
            "blog" => Ok(SiteMode::Blog),
            _ => Err(ModelError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for SiteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Blog,
    Series,
    Page,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Blog => "blog",
            ContentKind::Series => "series",
            ContentKind::Page => "page",
        }
    }

    /// Only these kinds are ever listed on index pages.
    pub fn is_indexable(&self) -> bool {
        matches!(
            self,
            ContentKind::Article | ContentKind::Blog | ContentKind::Series
        )
    }
}

impl FromStr for ContentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "article" => Ok(ContentKind::Article),
            "blog" => Ok(ContentKind::Blog),
            "series" => Ok(ContentKind::Series),
            "page" => Ok(ContentKind::Page),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controls whether the first `<h1>` of a rendered body is stripped before layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    #[default]
    Boxed,
    Overlay,
    Plain,
}

impl HeaderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderStyle::Boxed => "boxed",
            HeaderStyle::Overlay => "overlay",
            HeaderStyle::Plain => "plain",
        }
    }

    /// Boxed and overlay layouts render the heading themselves.
    pub fn strips_first_heading(&self) -> bool {
        matches!(self, HeaderStyle::Boxed | HeaderStyle::Overlay)
    }
}

impl FromStr for HeaderStyle {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boxed" => Ok(HeaderStyle::Boxed),
            "overlay" => Ok(HeaderStyle::Overlay),
            "plain" => Ok(HeaderStyle::Plain),
            _ => Err(ModelError::UnknownHeaderStyle(s.to_string())),
        }
    }
}

/// Upload purpose of an image. Stored on relation rows, never on the image itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePurpose {
    Content,
    Header,
    Thumbnail,
    SectionHeader,
    BlogHeader,
}

impl ImagePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePurpose::Content => "content",
            ImagePurpose::Header => "header",
            ImagePurpose::Thumbnail => "thumbnail",
            ImagePurpose::SectionHeader => "section_header",
            ImagePurpose::BlogHeader => "blog_header",
        }
    }

    /// Header-style purposes keep a single file per directory.
    pub fn is_single_instance(&self) -> bool {
        !matches!(self, ImagePurpose::Content)
    }

    pub fn is_section_purpose(&self) -> bool {
        matches!(self, ImagePurpose::SectionHeader | ImagePurpose::BlogHeader)
    }

    /// Purpose value recorded on a relation row. Section headers are stored as `header`.
    pub fn relation_purpose(&self) -> &'static str {
        match self {
            ImagePurpose::SectionHeader => "header",
            other => other.as_str(),
        }
    }
}

impl FromStr for ImagePurpose {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(ImagePurpose::Content),
            "header" => Ok(ImagePurpose::Header),
            "thumbnail" => Ok(ImagePurpose::Thumbnail),
            "section_header" => Ok(ImagePurpose::SectionHeader),
            "blog_header" => Ok(ImagePurpose::BlogHeader),
            _ => Err(ModelError::UnknownPurpose(s.to_string())),
        }
    }
}

impl fmt::Display for ImagePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub path: String,
    pub header_image_url: String,
    pub blog_header_image_url: String,
}

impl SectionRef {
    pub fn is_root(&self) -> bool {
        self.name == ROOT_SECTION_NAME || self.path == ROOT_SECTION_PATH
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

/// SEO and page-control sidecar of a content item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub description: String,
    pub keywords: String,
    pub robots: String,
    pub canonical_url: String,
    pub sitemap: String,
    pub table_of_contents: bool,
    pub share: bool,
    pub comments: bool,
}

/// A fully assembled content item as read for generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub short_id: String,
    pub user_id: Uuid,
    pub section_id: Uuid,
    pub section_name: String,
    pub section_path: String,
    pub kind: ContentKind,
    pub heading: String,
    pub summary: String,
    pub body: String,
    pub draft: bool,
    pub featured: bool,
    pub series: String,
    pub series_order: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<TagRef>,
    pub meta: MetaInfo,
    pub thumbnail_url: String,
    pub header_image_url: String,
    pub header_image_alt: String,
    pub header_image_caption: String,
}

impl ContentItem {
    /// URL-safe slug: normalized heading plus the short identifier.
    pub fn slug(&self) -> String {
        slug::content_slug(&self.heading, &self.short_id)
    }

    /// Normalized heading without the short identifier.
    pub fn base_slug(&self) -> String {
        slug::normalize(&self.heading)
    }

    pub fn in_root_section(&self) -> bool {
        self.section_path.is_empty() || self.section_path == ROOT_SECTION_PATH
    }

    /// A `page` whose heading normalizes to `index` replaces its section's generated index.
    pub fn is_manual_index(&self) -> bool {
        self.kind == ContentKind::Page && self.base_slug() == "index"
    }

    pub fn shares_tag_with(&self, other: &ContentItem) -> bool {
        self.tags
            .iter()
            .any(|t| other.tags.iter().any(|o| o.id == t.id))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub fn content(kind: ContentKind, heading: &str, section: &SectionRef) -> ContentItem {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ContentItem {
            id: Uuid::new_v4(),
            short_id: "abc123def456".to_string(),
            user_id: Uuid::nil(),
            section_id: section.id,
            section_name: section.name.clone(),
            section_path: section.path.clone(),
            kind,
            heading: heading.to_string(),
            summary: String::new(),
            body: String::new(),
            draft: false,
            featured: false,
            series: String::new(),
            series_order: 0,
            published_at: None,
            created_at: created,
            updated_at: created,
            tags: Vec::new(),
            meta: MetaInfo::default(),
            thumbnail_url: String::new(),
            header_image_url: String::new(),
            header_image_alt: String::new(),
            header_image_caption: String::new(),
        }
    }

    pub fn section(name: &str, path: &str) -> SectionRef {
        SectionRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            path: path.to_string(),
            header_image_url: String::new(),
            blog_header_image_url: String::new(),
        }
    }

    pub fn day(d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap())
    }
}
