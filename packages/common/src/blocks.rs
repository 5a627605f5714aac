use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::index::{sort_by_published_desc, sort_by_series_order};
use crate::model::{ContentItem, ContentKind};

/// Related-content lists rendered next to a single page.
///
/// Within one `Blocks` value no content id appears in more than one list and
/// the current item never appears at all. `series_prev` and `series_next`
/// are navigation links, not lists, and may repeat an entry of the series
/// index lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Blocks {
    pub article_tag_related_same_section: Vec<ContentItem>,
    pub article_recent_same_section: Vec<ContentItem>,
    pub article_tag_related_other_sections: Vec<ContentItem>,
    pub article_recent_other_sections: Vec<ContentItem>,

    pub blog_tag_related: Vec<ContentItem>,
    pub blog_recent: Vec<ContentItem>,

    pub series_prev: Option<ContentItem>,
    pub series_next: Option<ContentItem>,
    pub series_index_forward: Vec<ContentItem>,
    pub series_index_backward: Vec<ContentItem>,
}

impl Blocks {
    pub fn is_empty(&self) -> bool {
        self.article_tag_related_same_section.is_empty()
            && self.article_recent_same_section.is_empty()
            && self.article_tag_related_other_sections.is_empty()
            && self.article_recent_other_sections.is_empty()
            && self.blog_tag_related.is_empty()
            && self.blog_recent.is_empty()
            && self.series_prev.is_none()
            && self.series_next.is_none()
            && self.series_index_forward.is_empty()
            && self.series_index_backward.is_empty()
    }
}

/// Tracks ids already placed so that general blocks skip items claimed by specific ones.
struct Placement {
    taken: HashSet<Uuid>,
}

impl Placement {
    fn new(current: &ContentItem) -> Self {
        Self {
            taken: HashSet::from([current.id]),
        }
    }

    fn collect<'a, F>(&mut self, corpus: &'a [ContentItem], pred: F) -> Vec<ContentItem>
    where
        F: Fn(&'a ContentItem) -> bool,
    {
        let mut out = Vec::new();
        for item in corpus {
            if pred(item) && self.taken.insert(item.id) {
                out.push(item.clone());
            }
        }
        out
    }
}

fn cap(mut items: Vec<ContentItem>, max_items: usize) -> Vec<ContentItem> {
    items.truncate(max_items);
    items
}

pub fn build_blocks(current: &ContentItem, corpus: &[ContentItem], max_items: usize) -> Blocks {
    let mut blocks = Blocks::default();
    match current.kind {
        ContentKind::Article => article_blocks(&mut blocks, current, corpus, max_items),
        ContentKind::Blog => blog_blocks(&mut blocks, current, corpus, max_items),
        ContentKind::Series => series_blocks(&mut blocks, current, corpus, max_items),
        ContentKind::Page => {}
    }
    blocks
}

fn article_blocks(blocks: &mut Blocks, current: &ContentItem, corpus: &[ContentItem], max: usize) {
    let mut placed = Placement::new(current);
    let is_article = |c: &ContentItem| c.kind == ContentKind::Article;
    let same_section = |c: &ContentItem| c.section_id == current.section_id;

    let tag_same = placed.collect(corpus, |c| {
        is_article(c) && same_section(c) && current.shares_tag_with(c)
    });
    let mut recent_same = placed.collect(corpus, |c| is_article(c) && same_section(c));
    let tag_other = placed.collect(corpus, |c| {
        is_article(c) && !same_section(c) && current.shares_tag_with(c)
    });
    let mut recent_other = placed.collect(corpus, |c| is_article(c) && !same_section(c));

    sort_by_published_desc(&mut recent_same);
    sort_by_published_desc(&mut recent_other);

    blocks.article_tag_related_same_section = cap(tag_same, max);
    blocks.article_recent_same_section = cap(recent_same, max);
    blocks.article_tag_related_other_sections = cap(tag_other, max);
    blocks.article_recent_other_sections = cap(recent_other, max);
}

fn blog_blocks(blocks: &mut Blocks, current: &ContentItem, corpus: &[ContentItem], max: usize) {
    let mut placed = Placement::new(current);
    let candidate =
        |c: &ContentItem| c.kind == ContentKind::Blog && c.section_id == current.section_id;

    let tagged = placed.collect(corpus, |c| candidate(c) && current.shares_tag_with(c));
    let mut recent = placed.collect(corpus, candidate);
    sort_by_published_desc(&mut recent);

    blocks.blog_tag_related = cap(tagged, max);
    blocks.blog_recent = cap(recent, max);
}

fn series_blocks(blocks: &mut Blocks, current: &ContentItem, corpus: &[ContentItem], max: usize) {
    if current.series.is_empty() {
        return;
    }

    let mut series: Vec<ContentItem> = corpus
        .iter()
        .filter(|c| c.kind == ContentKind::Series && c.series == current.series)
        .cloned()
        .collect();
    if !series.iter().any(|c| c.id == current.id) {
        series.push(current.clone());
    }
    sort_by_series_order(&mut series);

    let Some(pos) = series.iter().position(|c| c.id == current.id) else {
        return;
    };

    if pos > 0 {
        blocks.series_prev = Some(series[pos - 1].clone());
    }
    blocks.series_next = series.get(pos + 1).cloned();

    let forward = series[pos + 1..].to_vec();
    let backward: Vec<ContentItem> = series[..pos].iter().rev().cloned().collect();

    blocks.series_index_forward = cap(forward, max);
    blocks.series_index_backward = cap(backward, max);
}
