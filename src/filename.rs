/// Slug used when the source has no ASCII letters or digits.
pub const UNKNOWN_SOURCE_SLUG: &str = "unknown-source";

/// Lowercases `raw` and collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, trimming separators at both ends.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// `<product>-<source-slug>-<timestamp-ms>.pdf`
pub fn report_filename(product: &str, source: &str, timestamp_ms: i64) -> String {
    let product = match slugify(product) {
        slug if slug.is_empty() => "report".to_string(),
        slug => slug,
    };
    let source = match slugify(source) {
        slug if slug.is_empty() => UNKNOWN_SOURCE_SLUG.to_string(),
        slug => slug,
    };
    format!("{}-{}-{}.pdf", product, source, timestamp_ms)
}
