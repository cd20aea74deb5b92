use url::Url;

/// Resolve `href` against the page it was found on.
///
/// Malformed input never fails: the href is handed back untouched when the
/// base does not parse, when the join fails, or when the href looks like a
/// scheme-qualified URL that is not valid (a relative reference may not carry
/// a colon in its first path segment).
pub fn resolve_link(base: &str, href: &str) -> String {
    if has_invalid_scheme(href) {
        return href.to_string();
    }

    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

fn has_invalid_scheme(href: &str) -> bool {
    let first_segment = href.split(['/', '?', '#']).next().unwrap_or_default();
    first_segment.contains(':') && Url::parse(href).is_err()
}
