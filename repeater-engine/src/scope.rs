use repeater_common::RequestRecord;
use tracing::debug;

use crate::matcher::matches;

/// Extract path and query from URL, without scheme, host or fragment
fn extract_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }
    Some(path)
}

/// Check if URL is out of scope
///
/// Rules:
/// 1. Unparseable URLs are never out of scope
/// 2. A match on any in-scope pattern wins over every OOS pattern
/// 3. Otherwise out of scope iff any OOS pattern matches
pub fn classify<S: AsRef<str>>(url: &str, oos_patterns: &[S], in_scope_patterns: &[S]) -> bool {
    let Some(path) = extract_path(url) else {
        debug!("Unparseable URL '{}' treated as in scope", url);
        return false;
    };

    if matches(&path, in_scope_patterns) {
        return false;
    }

    matches(&path, oos_patterns)
}

/// Recompute `is_oos` for every record in place, keeping order
pub fn reclassify_all<S: AsRef<str>>(
    requests: &mut [RequestRecord],
    oos_patterns: &[S],
    in_scope_patterns: &[S],
) {
    let mut flagged = 0usize;
    for request in requests.iter_mut() {
        request.is_oos = classify(&request.url, oos_patterns, in_scope_patterns);
        if request.is_oos {
            flagged += 1;
        }
    }
    debug!(total = requests.len(), out_of_scope = flagged, "Reclassified requests");
}
