use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::model::{ContentItem, ContentKind, SectionRef, SiteMode};
use crate::paths;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Section,
    Blog,
    Series,
}

/// One generated listing page before pagination.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexPage {
    pub path: String,
    pub kind: IndexKind,
    pub items: Vec<ContentItem>,
}

/// Accumulates index pages keyed by path while keeping first-seen order.
struct IndexSet {
    pages: Vec<IndexPage>,
    by_path: HashMap<String, usize>,
}

impl IndexSet {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    fn ensure(&mut self, path: &str, kind: IndexKind) -> usize {
        if let Some(&idx) = self.by_path.get(path) {
            return idx;
        }
        self.pages.push(IndexPage {
            path: path.to_string(),
            kind,
            items: Vec::new(),
        });
        let idx = self.pages.len() - 1;
        self.by_path.insert(path.to_string(), idx);
        idx
    }

    fn push_existing(&mut self, path: &str, item: &ContentItem) {
        if let Some(&idx) = self.by_path.get(path) {
            self.pages[idx].items.push(item.clone());
        }
    }

    fn push(&mut self, path: &str, kind: IndexKind, item: &ContentItem) {
        let idx = self.ensure(path, kind);
        self.pages[idx].items.push(item.clone());
    }
}

/// Newest first; items without a publication date go last. Stable.
pub fn sort_by_published_desc(items: &mut [ContentItem]) {
    items.sort_by(|a, b| match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Ascending by series order. Stable.
pub fn sort_by_series_order(items: &mut [ContentItem]) {
    items.sort_by_key(|c| c.series_order);
}

/// Distribute content into the global, section, blog and series indexes.
///
/// The root index is always present. Any other index is returned only when it
/// lists at least one item. Order of the result is root first, then section
/// indexes in section order, then synthetic indexes in first-seen order.
pub fn build_indexes(
    contents: &[ContentItem],
    sections: &[SectionRef],
    mode: SiteMode,
) -> Vec<IndexPage> {
    let mut set = IndexSet::new();
    set.ensure("/", IndexKind::Section);

    if mode == SiteMode::Structured {
        for section in sections {
            set.ensure(&paths::dir_path(&section.path), IndexKind::Section);
        }
    }

    for content in contents.iter().filter(|c| c.kind.is_indexable()) {
        let section_path = paths::dir_path(&content.section_path);
        match mode {
            SiteMode::Blog => {
                if content.kind == ContentKind::Blog && content.in_root_section() {
                    set.push_existing("/", content);
                }
            }
            SiteMode::Structured => {
                set.push_existing(&section_path, content);
                if !content.in_root_section() {
                    set.push_existing("/", content);
                }
                if content.kind == ContentKind::Blog {
                    let blog = paths::index_url(&section_path, ContentKind::Blog, mode);
                    set.push(&blog, IndexKind::Blog, content);
                }
                if content.kind == ContentKind::Series && !content.series.is_empty() {
                    let series = paths::series_url(&section_path, &content.series);
                    set.push(&series, IndexKind::Series, content);
                }
            }
        }
    }

    let mut pages = set.pages;
    for page in &mut pages {
        match page.kind {
            IndexKind::Series => sort_by_series_order(&mut page.items),
            _ => sort_by_published_desc(&mut page.items),
        }
    }

    pages
        .into_iter()
        .filter(|p| p.path == "/" || !p.items.is_empty())
        .collect()
}
