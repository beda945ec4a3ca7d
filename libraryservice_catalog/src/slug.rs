/// Lowercases and keeps ASCII alphanumerics, collapsing runs of whitespace,
/// hyphens and underscores into a single `-`. Everything else is dropped.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_separator = true;
        }
    }
    out
}

/// Slug base for a title. Titles that slugify to nothing (all punctuation)
/// get a fixed fallback so slugs are never empty.
pub fn slug_base(title: &str) -> String {
    let base = slugify(title);
    if base.is_empty() {
        "book".to_string()
    } else {
        base
    }
}
