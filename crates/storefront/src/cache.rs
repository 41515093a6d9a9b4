//! Language-aware response cache for catalog reads.
//!
//! Entries are keyed by endpoint plus canonicalized query parameters and
//! remember the language they were fetched in. A lookup under a different
//! language is a plain miss; the entry stays for its own language. Entries
//! older than the TTL (10 minutes by default) are evicted on lookup.
//!
//! This is a freshness cache, not an LRU: there is no capacity bound and no
//! eviction besides expiry and explicit invalidation.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use grubline_core::{Clock, Language};
use moka::sync::Cache;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Default freshness window, in seconds.
pub const DEFAULT_TTL_SECS: i64 = 600;

/// Query parameters of a request, in insertion order.
///
/// `None` values are kept so callers can pass optional filters straight
/// through; they are dropped from both the cache key and the request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, Option<String>)>);

impl QueryParams {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style parameter.
    #[must_use]
    pub fn with(mut self, name: &str, value: Option<impl Display>) -> Self {
        self.0.push((name.to_owned(), value.map(|v| v.to_string())));
        self
    }

    /// Parameters with a value, sorted by name.
    ///
    /// The sort is stable, so repeated names keep their relative order.
    #[must_use]
    pub fn present_sorted(&self) -> Vec<(&str, &str)> {
        let mut present: Vec<(&str, &str)> = self
            .0
            .iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name.as_str(), v)))
            .collect();
        present.sort_by(|a, b| a.0.cmp(b.0));
        present
    }
}

/// Canonical cache key: `endpoint?a=1&b=2`.
///
/// Absent parameters are dropped and the rest sorted by name, so callers
/// that build the same parameters in a different order share one entry.
#[must_use]
pub fn make_key(endpoint: &str, params: &QueryParams) -> String {
    let query = params
        .present_sorted()
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{endpoint}?{query}")
}

/// A cached response.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    written_at: DateTime<Utc>,
    language: Language,
}

/// Process-wide response cache.
///
/// Cheap to clone; clones share entries.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Cache<String, CacheEntry>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create an unbounded cache with the given freshness window.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().build(),
            clock,
            ttl,
        }
    }

    /// Fresh value for `key` written in `language`.
    ///
    /// Misses when the key is absent, was written in another language, or is
    /// older than the TTL. Only the expiry miss evicts.
    #[must_use]
    pub fn get(&self, key: &str, language: Language) -> Option<Value> {
        let entry = self.entries.get(key)?;

        if entry.language != language {
            debug!(key, cached = %entry.language, requested = %language, "Cache language miss");
            return None;
        }

        if self.clock.now() - entry.written_at > self.ttl {
            debug!(key, "Cache entry expired");
            self.entries.invalidate(key);
            return None;
        }

        Some(entry.data)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: String, value: Value, language: Language) {
        let entry = CacheEntry {
            data: value,
            written_at: self.clock.now(),
            language,
        };
        self.entries.insert(key, entry);
    }

    /// Remove every entry whose key matches `pattern`. Returns how many.
    pub fn invalidate(&self, pattern: &Regex) -> usize {
        self.invalidate_where(|key, _| pattern.is_match(key))
    }

    /// Remove every entry written in `language`. Returns how many.
    pub fn invalidate_for_language(&self, language: Language) -> usize {
        self.invalidate_where(|_, entry| entry.language == language)
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Whether an entry exists for `key`, regardless of freshness or language.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().count()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().next().is_none()
    }

    fn invalidate_where(&self, predicate: impl Fn(&str, &CacheEntry) -> bool) -> usize {
        let doomed: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(key, entry)| predicate(key.as_str(), entry))
            .map(|(key, _)| key)
            .collect();

        for key in &doomed {
            self.entries.invalidate(key.as_str());
        }

        debug!(count = doomed.len(), "Invalidated cache entries");
        doomed.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grubline_core::ManualClock;
    use serde_json::json;

    use super::*;

    fn cache() -> (ResponseCache, ManualClock) {
        let clock = ManualClock::default();
        let ttl = Duration::seconds(DEFAULT_TTL_SECS);
        (ResponseCache::new(Arc::new(clock.clone()), ttl), clock)
    }

    #[test]
    fn test_make_key_is_order_insensitive() {
        let a = QueryParams::new().with("b", Some(2)).with("a", Some(1));
        let b = QueryParams::new().with("a", Some(1)).with("b", Some(2));
        assert_eq!(make_key("/x", &a), make_key("/x", &b));
        assert_eq!(make_key("/x", &a), "/x?a=1&b=2");
    }

    #[test]
    fn test_make_key_drops_absent_params() {
        let with_none = QueryParams::new().with("a", None::<i32>).with("b", Some(2));
        let without = QueryParams::new().with("b", Some(2));
        assert_eq!(make_key("/x", &with_none), make_key("/x", &without));
    }

    #[test]
    fn test_make_key_without_params() {
        assert_eq!(make_key("/categories", &QueryParams::new()), "/categories?");
    }

    #[test]
    fn test_get_returns_fresh_value() {
        let (cache, clock) = cache();
        cache.put("k".to_string(), json!({"a": 1}), Language::En);

        clock.advance(Duration::milliseconds(600_000));

        assert_eq!(cache.get("k", Language::En), Some(json!({"a": 1})));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let (cache, clock) = cache();
        cache.put("k".to_string(), json!(1), Language::En);

        clock.advance(Duration::milliseconds(600_001));

        assert_eq!(cache.get("k", Language::En), None);
        assert!(!cache.contains("k"));
    }

    #[test]
    fn test_language_miss_keeps_entry() {
        let (cache, _clock) = cache();
        cache.put("k".to_string(), json!("v"), Language::En);

        assert_eq!(cache.get("k", Language::Ko), None);
        assert!(cache.contains("k"));
        assert_eq!(cache.get("k", Language::En), Some(json!("v")));
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let (cache, clock) = cache();
        cache.put("k".to_string(), json!(1), Language::En);
        clock.advance(Duration::minutes(9));
        cache.put("k".to_string(), json!(2), Language::Ko);
        clock.advance(Duration::minutes(9));

        assert_eq!(cache.get("k", Language::Ko), Some(json!(2)));
        assert_eq!(cache.get("k", Language::En), None);
    }

    #[test]
    fn test_invalidate_by_pattern() {
        let (cache, _clock) = cache();
        cache.put("/addresses?lang=en".to_string(), json!([]), Language::En);
        cache.put("/restaurants/1?lang=en".to_string(), json!({}), Language::En);

        let removed = cache.invalidate(&Regex::new("^/addresses").unwrap());

        assert_eq!(removed, 1);
        assert!(!cache.contains("/addresses?lang=en"));
        assert!(cache.contains("/restaurants/1?lang=en"));
    }

    #[test]
    fn test_invalidate_for_language() {
        let (cache, _clock) = cache();
        cache.put("a".to_string(), json!(1), Language::En);
        cache.put("b".to_string(), json!(2), Language::Ko);
        cache.put("c".to_string(), json!(3), Language::En);

        assert_eq!(cache.invalidate_for_language(Language::En), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = cache();
        cache.put("a".to_string(), json!(1), Language::En);
        cache.clear();
        assert!(!cache.contains("a"));
    }
}
