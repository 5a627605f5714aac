use uuid::Uuid;

/// Length of the short identifier appended to content slugs.
pub const SHORT_ID_LEN: usize = 12;

/// Normalize arbitrary text into a URL-safe slug.
///
/// Lowercases, turns spaces into hyphens, drops everything outside
/// `[a-z0-9-]`, collapses hyphen runs and trims hyphens at both ends.
/// The result is either empty or matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        let c = if c == ' ' { '-' } else { c };
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if c == '-' && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Returns true when `slug` is already in canonical form and non-empty.
pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty() && normalize(slug) == slug
}

/// A fresh 12-character lowercase hex identifier.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

pub fn content_slug(heading: &str, short_id: &str) -> String {
    let base = normalize(heading);
    match (base.is_empty(), short_id.is_empty()) {
        (_, true) => base,
        (true, false) => short_id.to_string(),
        (false, false) => format!("{base}-{short_id}"),
    }
}
