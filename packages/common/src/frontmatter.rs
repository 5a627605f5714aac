use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ContentItem;

pub const DELIMITER: &str = "---\n";

/// YAML frontmatter of a generated Markdown file.
///
/// Keys serialize in declaration order. `tags` is the only key that may be absent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Frontmatter {
    pub title: String,
    pub slug: String,
    pub permalink: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub layout: String,
    pub draft: bool,
    pub featured: bool,
    pub excerpt: String,
    pub summary: String,
    pub description: String,
    pub image: String,
    pub social_image: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub robots: String,
    pub keywords: String,
    pub canonical_url: String,
    pub sitemap: String,
    pub table_of_contents: bool,
    pub comments: bool,
    pub share: bool,
    pub locale: String,
}

impl Frontmatter {
    pub fn from_content(content: &ContentItem, permalink: &str) -> Self {
        Self {
            title: content.heading.clone(),
            slug: content.slug(),
            permalink: permalink.to_string(),
            tags: content.tags.iter().map(|t| t.name.clone()).collect(),
            layout: content.section_name.clone(),
            draft: content.draft,
            featured: content.featured,
            excerpt: content.meta.description.clone(),
            summary: content.summary.clone(),
            description: content.meta.description.clone(),
            image: content.header_image_url.clone(),
            social_image: content.thumbnail_url.clone(),
            published_at: content.published_at,
            created_at: content.created_at,
            updated_at: content.updated_at,
            robots: content.meta.robots.clone(),
            keywords: content.meta.keywords.clone(),
            canonical_url: content.meta.canonical_url.clone(),
            sitemap: content.meta.sitemap.clone(),
            table_of_contents: content.meta.table_of_contents,
            comments: content.meta.comments,
            share: content.meta.share,
            locale: String::new(),
        }
    }
}

/// `---\n{yaml}---\n{body}`
pub fn render_document(frontmatter: &Frontmatter, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    let mut doc = String::with_capacity(yaml.len() + body.len() + 8);
    doc.push_str(DELIMITER);
    doc.push_str(&yaml);
    if !yaml.ends_with('\n') {
        doc.push('\n');
    }
    doc.push_str(DELIMITER);
    doc.push_str(body);
    Ok(doc)
}
