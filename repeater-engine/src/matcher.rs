//! Regex pattern matching against URL paths

use dashmap::DashMap;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::error::{RepeaterError, RepeaterResult};

/// Compiled patterns keyed by source. Failed compilations are cached as
/// `None` so a bad pattern is reported once rather than on every request.
fn cache() -> &'static DashMap<String, Option<Regex>> {
    static CACHE: OnceLock<DashMap<String, Option<Regex>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

fn compiled(pattern: &str) -> Option<Regex> {
    if let Some(entry) = cache().get(pattern) {
        return entry.value().clone();
    }

    let compiled = match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid regex pattern '{}': {}", pattern, e);
            None
        }
    };

    // Two callers racing here compile the same source to the same result
    cache()
        .entry(pattern.to_string())
        .or_insert(compiled)
        .value()
        .clone()
}

/// Check whether any pattern matches anywhere within `path`
///
/// No anchoring is added; patterns carry their own `^`/`$`. Patterns that
/// fail to compile are skipped.
pub fn matches<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| {
        compiled(pattern.as_ref())
            .map(|re| re.is_match(path))
            .unwrap_or(false)
    })
}

/// Validate a pattern before it is accepted into a pattern list
pub fn validate_pattern(pattern: &str) -> RepeaterResult<()> {
    if pattern.trim().is_empty() {
        return Err(RepeaterError::validation("pattern", "pattern must not be empty"));
    }
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| RepeaterError::invalid_pattern(pattern, e))
}
