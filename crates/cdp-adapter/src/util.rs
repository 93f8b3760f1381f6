use url::Url;

fn normalized(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw).ok()?;
    url.set_fragment(None);
    Some(url)
}

/// `data:`, `about:` and similar URLs get a fresh opaque origin on every
/// parse, so they can only be compared by their serialization.
fn opaque_equal(a: &Url, b: &Url) -> Option<bool> {
    if a.origin().is_tuple() && b.origin().is_tuple() {
        return None;
    }
    Some(a.as_str().trim_end_matches('/') == b.as_str().trim_end_matches('/'))
}

/// Whether the surface's `current` URL confirms a navigation to `target`.
///
/// Trailing slashes and fragments are ignored; a `current` URL nested under
/// `target` (same origin, path extending the target path) also confirms it,
/// since the remote interface may append a thread id on load.
pub fn url_matches(target: &str, current: &str) -> bool {
    match (normalized(target), normalized(current)) {
        (Some(target), Some(current)) => {
            if let Some(equal) = opaque_equal(&target, &current) {
                return equal;
            }
            if target.origin() != current.origin() {
                return false;
            }
            let target_path = target.path().trim_end_matches('/');
            let current_path = current.path().trim_end_matches('/');
            if current_path == target_path {
                return target.query().is_none() || target.query() == current.query();
            }
            current_path.starts_with(&format!("{target_path}/"))
        }
        _ => target.trim_end_matches('/') == current.trim_end_matches('/'),
    }
}

/// Strict location equality: same origin, path and query. Fragments and a
/// trailing slash are ignored.
pub fn same_location(a: &str, b: &str) -> bool {
    match (normalized(a), normalized(b)) {
        (Some(a), Some(b)) => {
            if let Some(equal) = opaque_equal(&a, &b) {
                return equal;
            }
            a.origin() == b.origin()
                && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
                && a.query() == b.query()
        }
        _ => a.trim_end_matches('/') == b.trim_end_matches('/'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_trailing_slash() {
        assert!(url_matches("https://x/thread", "https://x/thread"));
        assert!(url_matches("https://x/thread/", "https://x/thread"));
        assert!(url_matches("https://x/thread", "https://x/thread#top"));
    }

    #[test]
    fn nested_thread_confirms_target() {
        assert!(url_matches("https://x/thread", "https://x/thread/abc"));
        assert!(!url_matches("https://x/thread", "https://x/threads"));
    }

    #[test]
    fn different_origin_or_path_rejected() {
        assert!(!url_matches("https://x/thread", "https://y/thread"));
        assert!(!url_matches("https://x/thread", "about:blank"));
        assert!(!url_matches("https://x/a?q=1", "https://x/a?q=2"));
    }

    #[test]
    fn opaque_urls_compare_by_serialization() {
        let page = "data:text/html,<textarea id=\"prompt\"></textarea>";
        assert!(url_matches(page, page));
        assert!(!url_matches(page, "data:text/html,<p>other</p>"));
        assert!(url_matches("about:blank", "about:blank"));
        assert!(same_location("about:blank", "about:blank"));
        assert!(same_location(page, page));
        assert!(!same_location("about:blank", "https://x/thread"));
    }

    #[test]
    fn same_location_is_strict_about_nesting() {
        assert!(same_location("https://x/thread/", "https://x/thread#a"));
        assert!(!same_location("https://x/thread", "https://x/thread/c/1"));
        assert!(!same_location("https://x/thread", "about:blank"));
    }
}
