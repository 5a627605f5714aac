//! Markdown to HTML with fixed `prose-*` class names and accessible images.

use std::collections::HashMap;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::paths::STATIC_IMAGES_URL;

/// Separator inside Markdown alt text: `alt ||| long description`.
pub const ALT_SEPARATOR: &str = "|||";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageMeta {
    pub alt_text: String,
    pub caption: String,
    pub long_description: String,
    pub title: String,
    pub decorative: bool,
}

/// Accessibility metadata keyed by image path relative to `/static/images/`.
#[derive(Clone, Debug, Default)]
pub struct ImageContext {
    images: HashMap<String, ImageMeta>,
}

impl ImageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, meta: ImageMeta) {
        self.images.insert(context_key(path), meta);
    }

    pub fn get(&self, src: &str) -> Option<&ImageMeta> {
        self.images.get(&context_key(src))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Normalize an image source or stored path into a context key.
pub fn context_key(src: &str) -> String {
    let stripped = src
        .strip_prefix(STATIC_IMAGES_URL)
        .unwrap_or(src)
        .replace("//", "/");
    stripped.trim_start_matches('/').to_string()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Alt text captured while inside an image tag.
struct PendingImage {
    src: String,
    title: String,
    alt: String,
    depth: usize,
}

/// Render Markdown into HTML, consulting `images` for accessibility metadata.
pub fn render(markdown: &str, images: &ImageContext) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    let mut pending: Option<PendingImage> = None;
    let mut in_table_head = false;

    for event in Parser::new_ext(markdown, options()) {
        if let Some(img) = pending.as_mut() {
            let finished = match event {
                Event::Start(Tag::Image { .. }) => {
                    img.depth += 1;
                    false
                }
                Event::End(TagEnd::Image) if img.depth > 0 => {
                    img.depth -= 1;
                    false
                }
                Event::End(TagEnd::Image) => true,
                Event::Text(t) | Event::Code(t) => {
                    img.alt.push_str(&t);
                    false
                }
                Event::SoftBreak | Event::HardBreak => {
                    img.alt.push(' ');
                    false
                }
                _ => false,
            };
            if finished && let Some(img) = pending.take() {
                render_image(&mut out, &img, images);
            }
            continue;
        }

        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => out.push_str("<p class=\"prose-p\">"),
                Tag::Heading { level, .. } => {
                    let n = level as u8;
                    out.push_str(&format!("<h{n} class=\"prose-h{n}\">"));
                }
                Tag::BlockQuote(_) => out.push_str("<blockquote class=\"prose-blockquote\">\n"),
                Tag::CodeBlock(_) => out.push_str("<pre class=\"prose-pre\"><code>"),
                Tag::List(Some(1)) => out.push_str("<ol class=\"prose-ul\">\n"),
                Tag::List(Some(start)) => {
                    out.push_str(&format!("<ol class=\"prose-ul\" start=\"{start}\">\n"));
                }
                Tag::List(None) => out.push_str("<ul class=\"prose-ul\">\n"),
                Tag::Item => out.push_str("<li class=\"prose-li\">"),
                Tag::Table(_) => out.push_str("<table class=\"prose-table\">"),
                Tag::TableHead => {
                    in_table_head = true;
                    out.push_str("<thead><tr>");
                }
                Tag::TableRow => out.push_str("<tr>"),
                Tag::TableCell if in_table_head => out.push_str("<th>"),
                Tag::TableCell => out.push_str("<td>"),
                Tag::Emphasis => out.push_str("<em class=\"prose-em\">"),
                Tag::Strong => out.push_str("<strong class=\"prose-strong\">"),
                Tag::Strikethrough => out.push_str("<del class=\"prose-del\">"),
                Tag::Link {
                    dest_url, title, ..
                } => {
                    out.push_str(&format!("<a href=\"{}\"", escape_html(&dest_url)));
                    if !title.is_empty() {
                        out.push_str(&format!(" title=\"{}\"", escape_html(&title)));
                    }
                    out.push_str(" class=\"prose-a\">");
                }
                Tag::Image {
                    dest_url, title, ..
                } => {
                    pending = Some(PendingImage {
                        src: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                        depth: 0,
                    });
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph => out.push_str("</p>\n"),
                TagEnd::Heading(level) => out.push_str(&format!("</h{}>\n", level as u8)),
                TagEnd::BlockQuote(_) => out.push_str("</blockquote>\n"),
                TagEnd::CodeBlock => out.push_str("</code></pre>\n"),
                TagEnd::List(true) => out.push_str("</ol>\n"),
                TagEnd::List(false) => out.push_str("</ul>\n"),
                TagEnd::Item => out.push_str("</li>\n"),
                TagEnd::Table => out.push_str("</tbody></table>\n"),
                TagEnd::TableHead => {
                    in_table_head = false;
                    out.push_str("</tr></thead>\n<tbody>\n");
                }
                TagEnd::TableRow => out.push_str("</tr>\n"),
                TagEnd::TableCell if in_table_head => out.push_str("</th>"),
                TagEnd::TableCell => out.push_str("</td>"),
                TagEnd::Emphasis => out.push_str("</em>"),
                TagEnd::Strong => out.push_str("</strong>"),
                TagEnd::Strikethrough => out.push_str("</del>"),
                TagEnd::Link => out.push_str("</a>"),
                _ => {}
            },
            Event::Text(text) => out.push_str(&escape_html(&text)),
            Event::Code(code) => {
                out.push_str("<code class=\"prose-code\">");
                out.push_str(&escape_html(&code));
                out.push_str("</code>");
            }
            Event::Html(html) | Event::InlineHtml(html) => out.push_str(&html),
            Event::SoftBreak => out.push('\n'),
            Event::HardBreak => out.push_str("<br>\n"),
            Event::Rule => out.push_str("<hr class=\"prose-hr\">\n"),
            Event::TaskListMarker(true) => {
                out.push_str("<input type=\"checkbox\" disabled checked> ");
            }
            Event::TaskListMarker(false) => out.push_str("<input type=\"checkbox\" disabled> "),
            _ => {}
        }
    }

    out
}

/// Split Markdown alt text on the first `|||` into (alt, long description).
pub fn split_alt(raw: &str) -> (String, String) {
    match raw.split_once(ALT_SEPARATOR) {
        Some((alt, long)) => (alt.trim().to_string(), long.trim().to_string()),
        None => (raw.to_string(), String::new()),
    }
}

fn render_image(out: &mut String, img: &PendingImage, images: &ImageContext) {
    let (md_alt, md_long) = split_alt(&img.alt);

    let (alt, caption, title) = match images.get(&img.src) {
        Some(meta) => {
            let alt = if meta.decorative {
                String::new()
            } else if meta.alt_text.is_empty() {
                md_alt
            } else {
                meta.alt_text.clone()
            };
            let title = if meta.title.is_empty() {
                img.title.clone()
            } else {
                meta.title.clone()
            };
            (alt, meta.long_description.clone(), title)
        }
        None => (md_alt, md_long, img.title.clone()),
    };

    let figure = !caption.is_empty();
    if figure {
        out.push_str("<figure class=\"prose-figure\">");
    }
    out.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\"",
        escape_html(&img.src),
        escape_html(&alt)
    ));
    if !title.is_empty() {
        out.push_str(&format!(" title=\"{}\"", escape_html(&title)));
    }
    out.push_str(" class=\"prose-img\">");
    if figure {
        out.push_str(&format!(
            "<figcaption class=\"prose-figcaption\">{}</figcaption></figure>",
            escape_html(&caption)
        ));
    }
}

/// Remove the first `<h1 ...>...</h1>` found on a single line, case-insensitively.
pub fn strip_first_h1(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("<h1") {
        let start = from + rel;
        let after = lower.as_bytes().get(start + 3).copied();
        if !matches!(after, Some(b'>') | Some(b' ') | Some(b'\t')) {
            from = start + 3;
            continue;
        }
        let Some(close_rel) = lower[start..].find("</h1>") else {
            break;
        };
        let end = start + close_rel + "</h1>".len();
        if html[start..end].contains('\n') {
            from = start + 3;
            continue;
        }
        return format!("{}{}", &html[..start], &html[end..]);
    }
    html.to_string()
}
