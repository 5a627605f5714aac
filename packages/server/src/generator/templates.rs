use std::collections::HashMap;
use std::path::Path;

use minijinja::{AutoEscape, Environment, ErrorKind, Output, State, Value, escape_formatter};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

pub const LAYOUT: &str = "layout.html";

const BUNDLED_LAYOUT: &str = include_str!("../../templates/layout.html");

const PARTIALS: [(&str, &str); 7] = [
    ("list.html", include_str!("../../templates/list.html")),
    ("blocks.html", include_str!("../../templates/blocks.html")),
    ("article-blocks.html", include_str!("../../templates/article-blocks.html")),
    ("blog-blocks.html", include_str!("../../templates/blog-blocks.html")),
    ("series-blocks.html", include_str!("../../templates/series-blocks.html")),
    ("pagination.html", include_str!("../../templates/pagination.html")),
    ("search.html", include_str!("../../templates/search.html")),
];

/// HTML auto-escaping that leaves `/` alone so URLs render as written.
fn html_formatter(
    out: &mut Output,
    state: &State,
    value: &Value,
) -> std::result::Result<(), minijinja::Error> {
    let text = match value.as_str() {
        Some(text) if state.auto_escape() == AutoEscape::Html && !value.is_safe() => text,
        _ => return escape_formatter(out, state, value),
    };

    let mut last = 0;
    for (i, b) in text.bytes().enumerate() {
        let entity = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#x27;",
            _ => continue,
        };
        out.write_str(&text[last..i])
            .and_then(|_| out.write_str(entity))
            .map_err(|_| minijinja::Error::from(ErrorKind::WriteFailure))?;
        last = i + 1;
    }
    out.write_str(&text[last..])
        .map_err(|_| minijinja::Error::from(ErrorKind::WriteFailure))
}

fn section_layout_name(section_id: Uuid) -> String {
    format!("layout-{section_id}.html")
}

/// The layout plus the fixed partial set, parsed once per generation run.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// The site layout comes from `layout_file` when it exists, else the bundled one.
    /// Non-empty section layouts are registered on top; one that fails to parse is skipped.
    pub async fn load(
        layout_file: Option<&Path>,
        section_layouts: &HashMap<Uuid, String>,
    ) -> Result<Self> {
        let mut env = Environment::new();
        env.set_formatter(html_formatter);
        for (name, source) in PARTIALS {
            env.add_template(name, source)?;
        }

        let layout = match layout_file {
            Some(path) if tokio::fs::try_exists(path).await? => {
                tokio::fs::read_to_string(path).await?
            }
            _ => BUNDLED_LAYOUT.to_string(),
        };
        env.add_template_owned(LAYOUT, layout)?;

        for (section_id, code) in section_layouts {
            if code.trim().is_empty() {
                continue;
            }
            if let Err(e) = env.add_template_owned(section_layout_name(*section_id), code.clone()) {
                warn!(section_id = %section_id, error = %e, "Ignoring section layout");
            }
        }

        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, section_id: Option<Uuid>, ctx: &S) -> Result<String> {
        let custom = section_id
            .map(section_layout_name)
            .and_then(|name| self.env.get_template(&name).ok());
        let template = match custom {
            Some(t) => t,
            None => self.env.get_template(LAYOUT)?,
        };
        Ok(template.render(ctx)?)
    }
}
